//! HTTP client fetching tilbudsugen.dk search results using wreq.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Default origin of the search endpoint.
pub const DEFAULT_SOURCE_URL: &str = "http://www.tilbudsugen.dk";

/// Path of the AJAX endpoint that renders the result table.
pub const SEARCH_PATH: &str = "/ajax_getSearch.php";

/// Trait for fetching raw result markup - enables mocking for tests.
#[async_trait]
pub trait OfferSource: Send + Sync {
    /// Fetches the fully buffered result markup for one search term.
    async fn fetch(&self, term: &str) -> Result<String>;
}

/// tilbudsugen.dk HTTP client with browser emulation and polite delays.
pub struct TilbudClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl TilbudClient {
    /// Creates a new client from configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let base_url = config.source_url.clone();
        Self::with_base_url(config, base_url).await
    }

    /// Creates a new client against a custom origin (for testing).
    pub async fn with_base_url(config: &Config, base_url: String) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: config.source_token.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Builds the search URL for a term.
    pub fn search_url(&self, term: &str) -> String {
        format!(
            "{}{}?chains_string=alle&search_item={}&organic_get_val=off&key_hole_get_val=off\
             &border_get_val=off&order_by=price_quantity_mult",
            self.base_url,
            SEARCH_PATH,
            urlencoding::encode(term)
        )
    }

    async fn get(&self, url: &str) -> Result<String> {
        self.delay().await;

        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,*/*;q=0.8")
            .header("Accept-Language", "da-DK,da;q=0.9,en;q=0.8")
            .header("X-Requested-With", "XMLHttpRequest");

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 || status == 503 {
            warn!("Rate limited ({}). Consider increasing the delay.", status);
            anyhow::bail!("Rate limited by tilbudsugen.dk ({}). Try increasing --delay.", status);
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }

    /// Adds a random delay between requests.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl OfferSource for TilbudClient {
    async fn fetch(&self, term: &str) -> Result<String> {
        let url = self.search_url(term);

        info!("Fetching offers for: {}", term);
        self.get(&url).await
    }
}
