//! Price-per-unit filter.

use super::Filter;
use crate::tilbudsugen::Offer;

/// Filters offers by price per unit.
///
/// A zero price means the cell could not be parsed; such offers pass the
/// range check unless `require_known` is set.
pub struct PriceFilter {
    min: Option<f64>,
    max: Option<f64>,
    require_known: bool,
}

impl PriceFilter {
    /// Creates a new price filter with optional min/max bounds.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max, require_known: false }
    }

    /// Creates a filter with both min and max.
    pub fn range(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// Creates a filter that only drops offers without a parsed price.
    pub fn known_only() -> Self {
        Self { min: None, max: None, require_known: true }
    }
}

impl Filter for PriceFilter {
    fn matches(&self, offer: &Offer) -> bool {
        if !offer.has_price() {
            return !self.require_known;
        }

        if let Some(min) = self.min {
            if offer.price_per < min {
                return false;
            }
        }

        if let Some(max) = self.max {
            if offer.price_per > max {
                return false;
            }
        }

        true
    }

    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("Price: {:.2} - {:.2} kr", min, max),
            (Some(min), None) => format!("Price: >= {:.2} kr", min),
            (None, Some(max)) => format!("Price: <= {:.2} kr", max),
            (None, None) if self.require_known => "Price: known".to_string(),
            (None, None) => "Price: any".to_string(),
        }
    }
}
