//! Text normalizers turning raw cell text into typed values.
//!
//! None of these fail: unparseable input degrades to an empty string, zero,
//! or the run's anchor date, and the miss is logged.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

/// Case-insensitive substring keys and the canonical chain names they map to.
///
/// Order matters: the first key found in the cell text wins.
pub const STORES: &[(&str, &str)] = &[
    ("netto", "Netto"),
    ("foetex", "Fotex"),
    ("rema1000", "Rema 1000"),
    ("fakta", "Fakta"),
    ("lidl", "Lidl"),
    ("matas", "Matas"),
    ("superbrugsen", "Super Brugsen"),
    ("coop", "Coop"),
    ("bilka", "Bilka"),
    ("kvickly", "Kvickly"),
    ("dagli_brugsen", "Daglig Brugsen"),
    ("lokalbrugsen", "Lokalbrugsen"),
    ("kiwi", "Kiwi"),
    ("nemlig", "Nemlig"),
];

/// Canonical names of every recognised chain, in matching order.
pub fn known_stores() -> impl Iterator<Item = &'static str> {
    STORES.iter().map(|(_, name)| *name)
}

/// Maps raw store cell text to a canonical chain name, or "" if none matches.
pub fn classify_store(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    STORES
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, name)| name.to_string())
        .unwrap_or_default()
}

/// Splits "12,50/kg" into (12.5, "kg").
///
/// Without a `/` the whole text is the number and the unit is empty. An
/// unparseable number becomes 0.0.
pub fn split_price_unit(raw: &str) -> (f64, String) {
    let mut parts = raw.split('/');
    let number = parts.next().unwrap_or_default();
    let unit = parts.next().unwrap_or_default().to_string();

    let normalized = number.trim().replace(',', ".");
    let price = match normalized.parse::<f64>() {
        Ok(price) => price,
        Err(e) => {
            debug!("Could not parse price '{}': {}", raw, e);
            0.0
        }
    };

    (price, unit)
}

/// Splits "01/03 - 07/03" into start and end dates in `today`'s year.
///
/// A side that fails to parse keeps `today` as its value; callers that need
/// strict validation can compare against the anchor.
pub fn split_date_range(raw: &str, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = today.year();
    let mut sides = raw.split('-');

    let mut resolve = |label: &str| match sides.next() {
        Some(side) => parse_day_month(side.trim(), year).unwrap_or_else(|| {
            warn!("Could not parse {} date '{}' in '{}'", label, side.trim(), raw);
            today
        }),
        None => {
            warn!("Missing {} date in '{}'", label, raw);
            today
        }
    };

    let start = resolve("start");
    let end = resolve("end");
    (start, end)
}

/// Parses "DD/MM" (one or two digits each) into a date in `year`.
fn parse_day_month(text: &str, year: i32) -> Option<NaiveDate> {
    let (day, month) = text.split_once('/')?;
    let day = parse_component(day)?;
    let month = parse_component(month)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_component(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || text.len() > 2 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
