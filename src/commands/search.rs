//! Search command implementation.

use crate::config::Config;
use crate::filters::FilterChainBuilder;
use crate::format::Formatter;
use crate::tilbudsugen::{Extractor, OfferSource, TilbudClient};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Fetches, extracts and prints the offers for a single term.
pub struct SearchCommand {
    config: Config,
    extractor: Extractor,
}

impl SearchCommand {
    /// Creates a new search command anchored to today's date.
    pub fn new(config: Config) -> Self {
        Self { config, extractor: Extractor::today_local() }
    }

    /// Replaces the extractor (for a fixed date anchor).
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, term: &str) -> Result<String> {
        let client =
            TilbudClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_source(&client, term).await
    }

    /// Executes the search with a provided source (for testing).
    pub async fn execute_with_source(&self, source: &impl OfferSource, term: &str) -> Result<String> {
        info!("Searching for: {}", term);

        let filters = FilterChainBuilder::from_config(&self.config).build();
        if !filters.is_empty() {
            debug!("Active filters: {}", filters.descriptions().join(", "));
        }

        let html = source
            .fetch(term)
            .await
            .with_context(|| format!("Failed to fetch offers for '{}'", term))?;

        let offers = self.extractor.extract(&html, term);
        let extracted = offers.len();
        let offers = filters.apply(offers);
        debug!("{} of {} offers passed the filters", offers.len(), extracted);

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_offers(&offers))
    }
}
