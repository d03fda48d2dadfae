//! Batch run: every term from the term file, delivered to the ingestion API.

use crate::config::Config;
use crate::delivery::{deliver_all, DeliveryReport, IngestClient, OfferSink};
use crate::filters::FilterChainBuilder;
use crate::format::Formatter;
use crate::input;
use crate::tilbudsugen::{Extractor, Offer, OfferSource, TilbudClient};
use anyhow::{Context, Result};
use std::fmt;
use tracing::{debug, info, warn};

/// Counters describing one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Terms read from the input.
    pub terms: usize,
    /// Terms whose fetch failed and were skipped.
    pub fetch_failures: usize,
    /// Offers extracted before filtering.
    pub extracted: usize,
    /// Offers left after filtering.
    pub kept: usize,
    /// Delivery outcome; `None` on a dry run.
    pub delivery: Option<DeliveryReport>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Terms: {} ({} failed), offers: {} extracted, {} kept",
            self.terms, self.fetch_failures, self.extracted, self.kept
        )?;
        match self.delivery {
            Some(report) => {
                write!(f, ", delivered: {}, failed: {}", report.delivered, report.failed)
            }
            None => write!(f, ", dry run"),
        }
    }
}

/// Fetches every term, extracts and filters the offers, then delivers them.
pub struct RunCommand {
    config: Config,
    extractor: Extractor,
    dry_run: bool,
}

impl RunCommand {
    /// Creates a new run command anchored to today's date.
    pub fn new(config: Config) -> Self {
        Self { config, extractor: Extractor::today_local(), dry_run: false }
    }

    /// Replaces the extractor (for a fixed date anchor).
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Prints offers instead of delivering them.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Executes the run against the live site and ingestion API.
    ///
    /// Returns the summary line, or the formatted offers on a dry run.
    pub async fn execute(&self) -> Result<String> {
        let path = self
            .config
            .terms_path
            .as_deref()
            .context("No search term file configured. Set SEARCHTERMPATH or --terms.")?;
        let terms = input::load_terms(path)?;

        let source =
            TilbudClient::new(&self.config).await.context("Failed to create HTTP client")?;

        if self.dry_run {
            let (offers, summary) = self.collect(&source, &terms).await;
            info!("{}", summary);
            return Ok(Formatter::new(self.config.format).format_offers(&offers));
        }

        let sink = IngestClient::new(&self.config).context("Failed to create ingestion client")?;
        let summary = self.execute_with(&source, &sink, &terms).await;
        Ok(summary.to_string())
    }

    /// Runs every term through `source` and delivers the kept offers to `sink`.
    pub async fn execute_with(
        &self,
        source: &impl OfferSource,
        sink: &impl OfferSink,
        terms: &[String],
    ) -> RunSummary {
        let (offers, mut summary) = self.collect(source, terms).await;

        summary.delivery = Some(deliver_all(sink, &offers).await);
        info!("{}", summary);
        summary
    }

    /// Fetches, extracts and filters every term. Failed fetches are skipped.
    pub async fn collect(
        &self,
        source: &impl OfferSource,
        terms: &[String],
    ) -> (Vec<Offer>, RunSummary) {
        let filters = FilterChainBuilder::from_config(&self.config).build();
        if !filters.is_empty() {
            debug!("Active filters: {}", filters.descriptions().join(", "));
        }

        let mut summary = RunSummary { terms: terms.len(), ..RunSummary::default() };
        let mut kept = Vec::new();

        for term in terms {
            let html = match source.fetch(term).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping '{}': {:#}", term, e);
                    summary.fetch_failures += 1;
                    continue;
                }
            };

            let offers = self.extractor.extract(&html, term);
            summary.extracted += offers.len();
            kept.extend(filters.apply(offers));
        }

        summary.kept = kept.len();
        (kept, summary)
    }
}
