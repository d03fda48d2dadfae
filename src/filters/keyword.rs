//! Keyword filtering over item and brand.

use super::Filter;
use crate::tilbudsugen::Offer;

/// Filters offers by keywords in the item name or brand.
pub struct KeywordFilter {
    /// Keywords that must appear.
    required: Vec<String>,
    /// Keywords that must NOT appear.
    excluded: Vec<String>,
}

impl KeywordFilter {
    /// Creates a new keyword filter.
    pub fn new(required: Vec<String>, excluded: Vec<String>) -> Self {
        Self {
            required: required.into_iter().map(|k| k.to_lowercase()).collect(),
            excluded: excluded.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Creates a filter with only required keywords.
    pub fn required(keywords: Vec<String>) -> Self {
        Self::new(keywords, Vec::new())
    }

    /// Creates a filter with only excluded keywords.
    pub fn excluded(keywords: Vec<String>) -> Self {
        Self::new(Vec::new(), keywords)
    }
}

impl Filter for KeywordFilter {
    fn matches(&self, offer: &Offer) -> bool {
        let text = format!("{} {}", offer.item, offer.brand).to_lowercase();

        self.required.iter().all(|keyword| text.contains(keyword))
            && !self.excluded.iter().any(|keyword| text.contains(keyword))
    }

    fn description(&self) -> String {
        let mut parts = Vec::new();

        if !self.required.is_empty() {
            parts.push(format!("Must contain: {}", self.required.join(", ")));
        }

        if !self.excluded.is_empty() {
            parts.push(format!("Must not contain: {}", self.excluded.join(", ")));
        }

        if parts.is_empty() {
            "Keywords: any".to_string()
        } else {
            parts.join("; ")
        }
    }
}
