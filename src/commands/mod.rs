//! CLI command implementations.

pub mod run;
pub mod search;

pub use run::{RunCommand, RunSummary};
pub use search::SearchCommand;
