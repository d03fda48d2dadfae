//! Data model for extracted offers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One price-comparison record: an item offered by a store for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Item name as shown in the result table
    pub item: String,
    /// Brand name (may be empty)
    pub brand: String,
    /// Canonical store name, empty if the chain was not recognised
    pub store: String,
    /// Price per unit; 0.0 when the cell could not be parsed
    pub price_per: f64,
    /// Unit the price refers to (kg, l, stk...), possibly empty
    pub unit: String,
    /// First day the offer is valid
    pub duration_start: NaiveDate,
    /// Last day the offer is valid
    pub duration_end: NaiveDate,
}

impl Offer {
    /// Returns true if the store cell matched a known chain.
    pub fn has_store(&self) -> bool {
        !self.store.is_empty()
    }

    /// Returns true if a non-zero price was parsed.
    pub fn has_price(&self) -> bool {
        self.price_per > 0.0
    }

    /// Returns true if `date` falls inside the validity interval (inclusive).
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.duration_start <= date && date <= self.duration_end
    }
}
