//! Per-run parse cursor and its transition function.
//!
//! The walker reduces the markup to a handful of [`RowEvent`]s and folds them
//! through [`Cursor::step`], so the row state machine can be tested one event
//! at a time without any markup at all.

use super::layout::{self, Field};
use super::models::Offer;
use super::normalize;
use chrono::NaiveDate;
use tracing::trace;

/// Token-level events the cursor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEvent<'a> {
    /// A `<tr>` start tag.
    RowOpen,
    /// A `<td>` start tag.
    CellOpen,
    /// Any end tag; `counts` is false for tags that never opened a level.
    Close { counts: bool },
    /// Decoded text content.
    Text(&'a str),
    /// Raw inline markup of a self-closing tag, e.g. `img src="netto.png"`.
    Markup(&'a str),
}

/// Where the cursor is relative to the table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Between rows, or after the current row committed.
    Idle,
    /// Inside a row, counting cells.
    InRow,
    /// Input exhausted.
    Done,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Scratch {
    store: String,
    item: String,
    brand: String,
    price_per: f64,
    unit: String,
}

/// Ephemeral state of one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    phase: Phase,
    depth: usize,
    column: usize,
    today: NaiveDate,
    scratch: Scratch,
}

impl Cursor {
    /// Creates a baseline cursor whose dates are anchored to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self { phase: Phase::Idle, depth: 0, column: 0, today, scratch: Scratch::default() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current nesting depth (never negative).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 1-based index of the current cell within the row; 0 before the first cell.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Applies one event and returns the next cursor, plus an offer if the
    /// event completed a row.
    pub fn step(mut self, event: RowEvent<'_>) -> (Self, Option<Offer>) {
        if self.phase == Phase::Done {
            return (self, None);
        }

        match event {
            RowEvent::RowOpen => {
                self.depth += 1;
                self.column = 0;
                self.scratch = Scratch::default();
                self.phase = Phase::InRow;
                (self, None)
            }
            RowEvent::CellOpen => {
                self.depth += 1;
                if self.phase == Phase::InRow {
                    self.column += 1;
                }
                (self, None)
            }
            RowEvent::Close { counts } => {
                if counts {
                    self.depth = self.depth.saturating_sub(1);
                }
                (self, None)
            }
            RowEvent::Text(text) => self.content(text, false),
            RowEvent::Markup(markup) => self.content(markup, true),
        }
    }

    /// Marks the input as exhausted.
    pub fn finish(mut self) -> Self {
        self.phase = Phase::Done;
        self
    }

    fn content(mut self, text: &str, is_markup: bool) -> (Self, Option<Offer>) {
        if self.phase != Phase::InRow {
            return (self, None);
        }

        let Some(field) = layout::field_for(self.column) else {
            return (self, None);
        };

        if is_markup && !field.accepts_markup() {
            return (self, None);
        }

        trace!("Column {} ({:?}): {:?}", self.column, field, text);

        match field {
            Field::Store => {
                // A logo matched earlier in the cell must survive trailing text.
                let store = normalize::classify_store(text);
                if !store.is_empty() {
                    self.scratch.store = store;
                }
            }
            Field::Item => self.scratch.item = text.to_string(),
            Field::Brand => self.scratch.brand = text.to_string(),
            Field::PricePerUnit => {
                let (price_per, unit) = normalize::split_price_unit(text);
                self.scratch.price_per = price_per;
                self.scratch.unit = unit;
            }
            Field::Validity => {
                let (duration_start, duration_end) =
                    normalize::split_date_range(text, self.today);
                let scratch = std::mem::take(&mut self.scratch);
                let offer = Offer {
                    item: scratch.item,
                    brand: scratch.brand,
                    store: scratch.store,
                    price_per: scratch.price_per,
                    unit: scratch.unit,
                    duration_start,
                    duration_end,
                };
                self.phase = Phase::Idle;
                return (self, Some(offer));
            }
        }

        (self, None)
    }
}
