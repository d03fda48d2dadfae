//! Offer filtering system with composable filters.

pub mod keyword;
pub mod price;
pub mod store;

use crate::config::Config;
use crate::tilbudsugen::Offer;

pub use keyword::KeywordFilter;
pub use price::PriceFilter;
pub use store::StoreFilter;

/// Trait for filtering offers.
pub trait Filter: Send + Sync {
    /// Returns true if the offer passes the filter.
    fn matches(&self, offer: &Offer) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;
}

/// A chain of filters that must all pass.
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Creates an empty filter chain.
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Adds a filter to the chain.
    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Checks if an offer passes all filters.
    pub fn matches(&self, offer: &Offer) -> bool {
        self.filters.iter().all(|f| f.matches(offer))
    }

    /// Filters a collection of offers, preserving order.
    pub fn apply(&self, offers: Vec<Offer>) -> Vec<Offer> {
        offers.into_iter().filter(|o| self.matches(o)).collect()
    }

    /// Returns true if no filters are configured.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns descriptions of all filters.
    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.description()).collect()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a FilterChain from configuration.
pub struct FilterChainBuilder {
    chain: FilterChain,
}

impl FilterChainBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self { chain: FilterChain::new() }
    }

    /// Builds the chain described by the filter section of a config.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .price_range(config.min_price, config.max_price)
            .require_price(config.require_price)
            .stores(config.stores.clone())
            .known_store_only(config.known_store_only)
            .keywords(config.keywords.clone())
            .exclude_keywords(config.exclude_keywords.clone())
    }

    /// Adds a price range filter.
    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some() || max.is_some() {
            self.chain.add(PriceFilter::new(min, max));
        }
        self
    }

    /// Drops offers whose price could not be parsed.
    pub fn require_price(mut self, enabled: bool) -> Self {
        if enabled {
            self.chain.add(PriceFilter::known_only());
        }
        self
    }

    /// Adds an allowed-stores filter.
    pub fn stores(mut self, stores: Vec<String>) -> Self {
        if !stores.is_empty() {
            self.chain.add(StoreFilter::allowed(stores));
        }
        self
    }

    /// Drops offers whose store was not recognised.
    pub fn known_store_only(mut self, enabled: bool) -> Self {
        if enabled {
            self.chain.add(StoreFilter::known());
        }
        self
    }

    /// Adds required keywords filter.
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        if !keywords.is_empty() {
            self.chain.add(KeywordFilter::required(keywords));
        }
        self
    }

    /// Adds excluded keywords filter.
    pub fn exclude_keywords(mut self, keywords: Vec<String>) -> Self {
        if !keywords.is_empty() {
            self.chain.add(KeywordFilter::excluded(keywords));
        }
        self
    }

    /// Builds the filter chain.
    pub fn build(self) -> FilterChain {
        self.chain
    }
}

impl Default for FilterChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
