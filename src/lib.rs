//! tilbud-scraper - Weekly grocery offers from tilbudsugen.dk
//!
//! Fetches the search result table for each term, extracts one offer per
//! table row with a streaming tokenizer, and forwards the offers to an
//! ingestion API.

pub mod commands;
pub mod config;
pub mod delivery;
pub mod filters;
pub mod format;
pub mod input;
pub mod tilbudsugen;

pub use config::Config;
pub use tilbudsugen::{Extractor, Offer};
