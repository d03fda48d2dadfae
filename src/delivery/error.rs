//! Errors raised while forwarding offers to the ingestion API.

use thiserror::Error;

/// Failure to deliver a single offer.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to serialize offer: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to reach ingestion API: {0}")]
    Transport(String),

    #[error("Ingestion API returned status {status}: {body}")]
    Status { status: u16, body: String },
}
