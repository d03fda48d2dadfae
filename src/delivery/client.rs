//! HTTP client posting offers to the ingestion API.

use super::error::DeliveryError;
use crate::config::Config;
use crate::tilbudsugen::Offer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Path records are posted to.
pub const INSERT_PATH: &str = "/insert";

/// JSON body of one insert request. Empty text and a zero price are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct OfferPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub priceper: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit: String,
    pub duration_start: DateTime<Utc>,
    pub duration_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub brand: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub store: String,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl From<&Offer> for OfferPayload {
    fn from(offer: &Offer) -> Self {
        Self {
            item: offer.item.clone(),
            priceper: offer.price_per,
            unit: offer.unit.clone(),
            duration_start: midnight_utc(offer.duration_start),
            duration_end: midnight_utc(offer.duration_end),
            brand: offer.brand.clone(),
            store: offer.store.clone(),
        }
    }
}

/// Trait for delivering offers downstream - enables mocking for tests.
#[async_trait]
pub trait OfferSink: Send + Sync {
    /// Delivers one offer.
    async fn deliver(&self, offer: &Offer) -> Result<(), DeliveryError>;
}

/// Outcome of delivering a batch of offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn total(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Delivers every offer in order. Failures are logged and counted; they never
/// stop the remaining deliveries.
pub async fn deliver_all(sink: &impl OfferSink, offers: &[Offer]) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for offer in offers {
        match sink.deliver(offer).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!("Failed to deliver '{}' ({}): {}", offer.item, offer.store, e);
                report.failed += 1;
            }
        }
    }

    info!("Delivered {} of {} offers", report.delivered, report.total());
    report
}

/// Ingestion API client.
pub struct IngestClient {
    client: Client,
    endpoint: String,
}

impl IngestClient {
    /// Creates a client for `http://{api_address}:{api_port}`.
    pub fn new(config: &Config) -> Result<Self> {
        let address = config
            .api_address
            .as_deref()
            .context("No ingestion API address configured. Set APIADDRESS or --api-address.")?;

        Self::with_base_url(format!("http://{}:{}", address, config.api_port))
    }

    /// Creates a client against a custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), INSERT_PATH);
        Ok(Self { client, endpoint })
    }

    /// Returns the full insert URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OfferSink for IngestClient {
    async fn deliver(&self, offer: &Offer) -> Result<(), DeliveryError> {
        let body = serde_json::to_string(&OfferPayload::from(offer))?;
        debug!("POST {} {}", self.endpoint, body);

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status: status.as_u16(), body });
        }

        debug!("Delivered '{}' ({})", offer.item, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_offer(item: &str) -> Offer {
        Offer {
            item: item.to_string(),
            brand: "Arla".to_string(),
            store: "Netto".to_string(),
            price_per: 5.95,
            unit: "l".to_string(),
            duration_start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            duration_end: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        }
    }

    /// Records deliveries and fails for items listed in `reject`.
    struct MockSink {
        reject: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    impl MockSink {
        fn new(reject: &[&str]) -> Self {
            Self {
                reject: reject.iter().map(|s| s.to_string()).collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OfferSink for MockSink {
        async fn deliver(&self, offer: &Offer) -> Result<(), DeliveryError> {
            self.seen.lock().unwrap().push(offer.item.clone());
            if self.reject.contains(&offer.item) {
                Err(DeliveryError::Status { status: 500, body: String::new() })
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_payload_full() {
        let json = serde_json::to_value(OfferPayload::from(&make_offer("Mælk"))).unwrap();
        assert_eq!(json["item"], "Mælk");
        assert_eq!(json["priceper"], 5.95);
        assert_eq!(json["unit"], "l");
        assert_eq!(json["brand"], "Arla");
        assert_eq!(json["store"], "Netto");
        assert_eq!(json["duration_start"], "2024-03-01T00:00:00Z");
        assert_eq!(json["duration_end"], "2024-03-07T00:00:00Z");
    }

    #[test]
    fn test_payload_omits_empty_fields() {
        let mut offer = make_offer("");
        offer.brand.clear();
        offer.store.clear();
        offer.unit.clear();
        offer.price_per = 0.0;

        let json = serde_json::to_value(OfferPayload::from(&offer)).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("item"));
        assert!(!object.contains_key("priceper"));
        assert!(!object.contains_key("unit"));
        assert!(!object.contains_key("brand"));
        assert!(!object.contains_key("store"));
        assert!(object.contains_key("duration_start"));
        assert!(object.contains_key("duration_end"));
    }

    #[test]
    fn test_deliver_all_continues_after_failure() {
        let sink = MockSink::new(&["Smør"]);
        let offers = vec![make_offer("Mælk"), make_offer("Smør"), make_offer("Æg")];

        let report = tokio_test::block_on(deliver_all(&sink, &offers));

        assert_eq!(report, DeliveryReport { delivered: 2, failed: 1 });
        assert_eq!(report.total(), 3);
        assert_eq!(*sink.seen.lock().unwrap(), vec!["Mælk", "Smør", "Æg"]);
    }

    #[test]
    fn test_deliver_all_empty() {
        let sink = MockSink::new(&[]);
        let report = tokio_test::block_on(deliver_all(&sink, &[]));
        assert_eq!(report, DeliveryReport::default());
    }

    #[test]
    fn test_new_requires_address() {
        let config = Config::default();
        let result = IngestClient::new(&config);
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("APIADDRESS"));
    }

    #[test]
    fn test_new_builds_endpoint() {
        let config = Config { api_address: Some("ingest.local".to_string()), ..Config::default() };
        let client = IngestClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://ingest.local:8080/insert");
    }

    #[tokio::test]
    async fn test_deliver_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INSERT_PATH))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({
                "item": "Mælk",
                "priceper": 5.95,
                "unit": "l",
                "duration_start": "2024-03-01T00:00:00Z",
                "duration_end": "2024-03-07T00:00:00Z",
                "brand": "Arla",
                "store": "Netto"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = IngestClient::with_base_url(mock_server.uri()).unwrap();
        assert!(client.deliver(&make_offer("Mælk")).await.is_ok());
    }

    #[tokio::test]
    async fn test_deliver_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INSERT_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
            .mount(&mock_server)
            .await;

        let client = IngestClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.deliver(&make_offer("Mælk")).await.unwrap_err();

        match err {
            DeliveryError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "database down");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_deliver_transport_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = IngestClient::with_base_url("http://127.0.0.1:9".to_string()).unwrap();
        let err = client.deliver(&make_offer("Mælk")).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }

    #[tokio::test]
    async fn test_deliver_all_over_http() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INSERT_PATH))
            .respond_with(ResponseTemplate::new(201))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = IngestClient::with_base_url(mock_server.uri()).unwrap();
        let offers = vec![make_offer("a"), make_offer("b"), make_offer("c")];
        let report = deliver_all(&client, &offers).await;

        assert_eq!(report.delivered, 3);
        assert_eq!(report.failed, 0);
    }
}
