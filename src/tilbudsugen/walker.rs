//! Token-stream walker over the result table markup.
//!
//! No DOM is built: `quick-xml` yields start/end/text tokens in document
//! order, each token is reduced to a [`RowEvent`] and folded through a fresh
//! [`Cursor`]. The reader runs in a lenient mode because the source is HTML,
//! not XML: end tags need not match, void elements never close, and named
//! HTML5 entities are resolved.

use super::cursor::{Cursor, RowEvent};
use super::layout::{self, CELL_TAG, ROW_TAG};
use super::models::Offer;
use chrono::{Local, NaiveDate};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Walks one markup document and collects the offers it contains.
///
/// Every call to [`Walker::walk`] starts from a baseline cursor, so a walker
/// can be reused for any number of documents without state leaking between
/// them.
#[derive(Debug, Clone, Copy)]
pub struct Walker {
    today: NaiveDate,
}

impl Walker {
    /// Creates a walker whose date ranges resolve against `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Extracts every completed row of `html`, in document order.
    ///
    /// Markup the tokenizer rejects is dropped up to its closing `>`, the way
    /// an HTML tokenizer swallows a bogus comment, and reading resumes after
    /// it with the same cursor.
    pub fn walk(&self, html: &str) -> Vec<Offer> {
        let mut cursor = Cursor::new(self.today);
        let mut offers = Vec::new();
        let mut offset = 0;

        loop {
            let (next, failed_at) = fold(&html[offset..], cursor, &mut offers);
            cursor = next;

            let Some(failed_at) = failed_at else { break };
            let failed_at = offset + failed_at;

            match html.as_bytes()[failed_at..].iter().position(|&b| b == b'>') {
                Some(end) => {
                    offset = failed_at + end + 1;
                    trace!("Resuming after malformed markup at byte {}", offset);
                }
                None => {
                    debug!("Unterminated markup at byte {}, stopping", failed_at);
                    break;
                }
            }
        }

        let cursor = cursor.finish();
        debug!("Walk finished at depth {} with {} offers", cursor.depth(), offers.len());
        offers
    }
}

fn reader(html: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Folds tokens through `cursor` until end of input or a tokenizer error.
///
/// On error, returns the byte offset (within `html`) where the failing token
/// started. The reader cannot continue past a syntax error.
fn fold(html: &str, mut cursor: Cursor, offers: &mut Vec<Offer>) -> (Cursor, Option<usize>) {
    let mut reader = reader(html);

    loop {
        let token_start = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(Event::Eof) => return (cursor, None),
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed markup at byte {}: {}", token_start, e);
                return (cursor, Some(token_start));
            }
        };

        cursor = match &event {
            Event::Start(tag) => {
                let name = tag.name();
                if layout::tag_is(name.as_ref(), ROW_TAG) {
                    advance(cursor, RowEvent::RowOpen, offers)
                } else if layout::tag_is(name.as_ref(), CELL_TAG) {
                    advance(cursor, RowEvent::CellOpen, offers)
                } else {
                    cursor
                }
            }
            Event::End(tag) => {
                let name = tag.name();
                let counts = !layout::UNCOUNTED_CLOSE_TAGS
                    .iter()
                    .any(|uncounted| layout::tag_is(name.as_ref(), uncounted));
                advance(cursor, RowEvent::Close { counts }, offers)
            }
            Event::Empty(tag) => {
                let markup = String::from_utf8_lossy(tag);
                advance(cursor, RowEvent::Markup(&markup), offers)
            }
            Event::Text(text) => match text.unescape_with(resolve_html5_entity) {
                Ok(decoded) => advance(cursor, RowEvent::Text(&decoded), offers),
                Err(e) => {
                    // A bare `&` is common in item names; keep the raw text.
                    trace!("Keeping undecoded text: {}", e);
                    let raw = String::from_utf8_lossy(text);
                    advance(cursor, RowEvent::Text(&raw), offers)
                }
            },
            Event::CData(data) => {
                let text = String::from_utf8_lossy(data);
                advance(cursor, RowEvent::Text(&text), offers)
            }
            _ => cursor,
        };
    }
}

fn advance(cursor: Cursor, event: RowEvent<'_>, offers: &mut Vec<Offer>) -> Cursor {
    let (cursor, offer) = cursor.step(event);
    if let Some(offer) = offer {
        trace!("Committed offer: {} ({})", offer.item, offer.store);
        offers.push(offer);
    }
    cursor
}

/// Extraction entry point: one walker run per search term.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    today: NaiveDate,
}

impl Extractor {
    /// Creates an extractor anchored to a fixed date.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Creates an extractor anchored to the local calendar date.
    pub fn today_local() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// The date whose year anchors every date range, and which stands in for
    /// any date that failed to parse.
    pub fn anchor(&self) -> NaiveDate {
        self.today
    }

    /// Extracts the offers in `html`, fetched for `term`.
    pub fn extract(&self, html: &str, term: &str) -> Vec<Offer> {
        let started = Instant::now();
        let offers = Walker::new(self.today).walk(html);
        info!("Extracted {} offers for '{}' in {:?}", offers.len(), term, started.elapsed());
        offers
    }
}
