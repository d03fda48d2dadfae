//! Store filter.

use super::Filter;
use crate::tilbudsugen::Offer;

/// Filters offers by store: either any recognised chain, or an explicit list.
pub struct StoreFilter {
    /// Lowercased canonical names; empty means "any known store".
    allowed: Vec<String>,
}

impl StoreFilter {
    /// Only offers from the listed stores (case-insensitive).
    pub fn allowed(stores: Vec<String>) -> Self {
        Self { allowed: stores.into_iter().map(|s| s.trim().to_lowercase()).collect() }
    }

    /// Only offers whose store was recognised.
    pub fn known() -> Self {
        Self { allowed: Vec::new() }
    }
}

impl Filter for StoreFilter {
    fn matches(&self, offer: &Offer) -> bool {
        if !offer.has_store() {
            return false;
        }

        if self.allowed.is_empty() {
            return true;
        }

        let store = offer.store.to_lowercase();
        self.allowed.iter().any(|allowed| *allowed == store)
    }

    fn description(&self) -> String {
        if self.allowed.is_empty() {
            "Store: known".to_string()
        } else {
            format!("Store: {}", self.allowed.join(", "))
        }
    }
}
