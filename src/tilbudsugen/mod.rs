//! tilbudsugen.dk specific modules: fetching, table layout, normalizers and
//! the token-stream extractor.

pub mod client;
pub mod cursor;
pub mod layout;
pub mod models;
pub mod normalize;
pub mod walker;

pub use client::{OfferSource, TilbudClient};
pub use cursor::{Cursor, Phase, RowEvent};
pub use models::Offer;
pub use walker::{Extractor, Walker};
