//! Delivery of extracted offers to the downstream ingestion API.

mod client;
mod error;

pub use client::{deliver_all, DeliveryReport, IngestClient, OfferPayload, OfferSink, INSERT_PATH};
pub use error::DeliveryError;
