//! Output formatting for offers (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::tilbudsugen::Offer;

/// Formats offers for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a list of offers.
    pub fn format_offers(&self, offers: &[Offer]) -> String {
        if offers.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_header(),
                _ => "No offers found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => Self::json_offers(offers),
            OutputFormat::Table => Self::table_offers(offers),
            OutputFormat::Markdown => Self::markdown_offers(offers),
            OutputFormat::Csv => Self::csv_offers(offers),
        }
    }

    /// Formats the list of recognised store names.
    pub fn format_stores(&self, stores: &[&str]) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(stores).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Markdown => {
                stores.iter().map(|s| format!("- {}", s)).collect::<Vec<_>>().join("\n")
            }
            OutputFormat::Csv => {
                let mut lines = vec!["store".to_string()];
                lines.extend(stores.iter().map(|s| Self::csv_escape(s)));
                lines.join("\n")
            }
            OutputFormat::Table => stores.join("\n"),
        }
    }

    fn json_offers(offers: &[Offer]) -> String {
        serde_json::to_string_pretty(offers).unwrap_or_else(|_| "[]".to_string())
    }

    fn price_str(offer: &Offer) -> String {
        if offer.has_price() {
            format!("{:.2}", offer.price_per)
        } else {
            "N/A".to_string()
        }
    }

    fn store_str(offer: &Offer) -> &str {
        if offer.has_store() {
            &offer.store
        } else {
            "?"
        }
    }

    fn validity_str(offer: &Offer) -> String {
        format!(
            "{} - {}",
            offer.duration_start.format("%d/%m"),
            offer.duration_end.format("%d/%m")
        )
    }

    fn describe(offer: &Offer) -> String {
        if offer.brand.is_empty() {
            offer.item.clone()
        } else {
            format!("{} ({})", offer.item, offer.brand)
        }
    }

    /// Truncates on character boundaries; item names are rarely ASCII-only.
    fn truncate(s: &str, max: usize) -> String {
        if s.chars().count() > max {
            let head: String = s.chars().take(max - 3).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        }
    }

    fn table_offers(offers: &[Offer]) -> String {
        let store_width = 12;
        let price_width = 10;
        let unit_width = 6;
        let valid_width = 13;
        let item_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<store_width$}  {:>price_width$}  {:<unit_width$}  {:<valid_width$}  {}",
            "Store", "Price", "Unit", "Valid", "Item"
        ));
        lines.push(format!(
            "{:-<store_width$}  {:-<price_width$}  {:-<unit_width$}  {:-<valid_width$}  {:-<item_width$}",
            "", "", "", "", ""
        ));

        for offer in offers {
            lines.push(format!(
                "{:<store_width$}  {:>price_width$}  {:<unit_width$}  {:<valid_width$}  {}",
                Self::store_str(offer),
                Self::price_str(offer),
                Self::truncate(&offer.unit, unit_width),
                Self::validity_str(offer),
                Self::truncate(&Self::describe(offer), item_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} offers", offers.len()));

        lines.join("\n")
    }

    fn markdown_offers(offers: &[Offer]) -> String {
        let mut lines = Vec::new();

        lines.push("| Store | Price | Unit | Valid | Item | Brand |".to_string());
        lines.push("|-------|-------|------|-------|------|-------|".to_string());

        for offer in offers {
            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} |",
                Self::store_str(offer),
                Self::price_str(offer),
                offer.unit,
                Self::validity_str(offer),
                offer.item.replace('|', "\\|"),
                offer.brand.replace('|', "\\|")
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} offers found*", offers.len()));

        lines.join("\n")
    }

    fn csv_header() -> String {
        "store,item,brand,price_per,unit,duration_start,duration_end".to_string()
    }

    fn csv_offers(offers: &[Offer]) -> String {
        let mut lines = Vec::new();
        lines.push(Self::csv_header());

        for offer in offers {
            lines.push(format!(
                "{},{},{},{},{},{},{}",
                Self::csv_escape(&offer.store),
                Self::csv_escape(&offer.item),
                Self::csv_escape(&offer.brand),
                offer.price_per,
                Self::csv_escape(&offer.unit),
                offer.duration_start,
                offer.duration_end
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
