//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::tilbudsugen::client::DEFAULT_SOURCE_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the search endpoint
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Optional bearer token sent with search requests
    #[serde(default)]
    pub source_token: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between search requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Host of the ingestion API
    #[serde(default)]
    pub api_address: Option<String>,

    /// Port of the ingestion API
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// File with one search term per line
    #[serde(default)]
    pub terms_path: Option<PathBuf>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Filter: minimum price per unit
    #[serde(default)]
    pub min_price: Option<f64>,

    /// Filter: maximum price per unit
    #[serde(default)]
    pub max_price: Option<f64>,

    /// Filter: drop offers whose price could not be parsed
    #[serde(default)]
    pub require_price: bool,

    /// Filter: only these stores (canonical names)
    #[serde(default)]
    pub stores: Vec<String>,

    /// Filter: drop offers from unrecognised stores
    #[serde(default)]
    pub known_store_only: bool,

    /// Filter: words that must appear in item or brand
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Filter: words that must NOT appear in item or brand
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1000
}

fn default_api_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            source_token: None,
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            api_address: None,
            api_port: default_api_port(),
            terms_path: None,
            format: OutputFormat::Table,
            min_price: None,
            max_price: None,
            require_price: false,
            stores: Vec::new(),
            known_store_only: false,
            keywords: Vec::new(),
            exclude_keywords: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("tilbud-scraper").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(address) = std::env::var("APIADDRESS") {
            if !address.trim().is_empty() {
                self.api_address = Some(address.trim().to_string());
            }
        }

        if let Ok(path) = std::env::var("SEARCHTERMPATH") {
            if !path.trim().is_empty() {
                self.terms_path = Some(PathBuf::from(path.trim()));
            }
        }

        if let Ok(url) = std::env::var("TILBUD_SOURCE_URL") {
            self.source_url = url;
        }

        if let Ok(proxy) = std::env::var("TILBUD_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("TILBUD_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source_url, "http://www.tilbudsugen.dk");
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.delay_jitter_ms, 1000);
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.api_address.is_none());
        assert!(config.terms_path.is_none());
        assert!(config.source_token.is_none());
        assert!(config.proxy.is_none());
        assert!(config.min_price.is_none());
        assert!(!config.require_price);
        assert!(!config.known_store_only);
        assert!(config.stores.is_empty());
        assert!(config.keywords.is_empty());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            api_address = "ingest.internal"
            api_port = 9090
            terms_path = "/etc/tilbud/terms.txt"
            delay_ms = 0
            format = "json"
            stores = ["Netto", "Lidl"]
            known_store_only = true
            min_price = 1.5
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api_address.as_deref(), Some("ingest.internal"));
        assert_eq!(config.api_port, 9090);
        assert_eq!(config.terms_path, Some(PathBuf::from("/etc/tilbud/terms.txt")));
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.stores, vec!["Netto", "Lidl"]);
        assert!(config.known_store_only);
        assert_eq!(config.min_price, Some(1.5));
        // Unset fields keep their defaults
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.delay_jitter_ms, 1000);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            source_url = "http://mirror.local"
            source_token = "abc"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.source_url, "http://mirror.local");
        assert_eq!(config.source_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_config_from_file_not_found() {
        let err = Config::from_file("/nonexistent/path/config.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_port = 1234").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api_port, 1234);
    }

    #[test]
    fn test_config_with_env() {
        let keys = ["APIADDRESS", "SEARCHTERMPATH", "TILBUD_PROXY", "TILBUD_DELAY"];
        let saved: Vec<_> = keys.iter().map(|k| std::env::var(k).ok()).collect();

        std::env::set_var("APIADDRESS", " 10.0.0.5 ");
        std::env::set_var("SEARCHTERMPATH", "/data/terms.txt");
        std::env::set_var("TILBUD_PROXY", "http://proxy:8080");
        std::env::set_var("TILBUD_DELAY", "250");

        let config = Config::new().with_env();
        assert_eq!(config.api_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(config.terms_path, Some(PathBuf::from("/data/terms.txt")));
        assert_eq!(config.proxy.as_deref(), Some("http://proxy:8080"));
        assert_eq!(config.delay_ms, 250);

        // Invalid or blank values are ignored
        std::env::set_var("APIADDRESS", "   ");
        std::env::set_var("TILBUD_DELAY", "soon");
        let config = Config::new().with_env();
        assert!(config.api_address.is_none());
        assert_eq!(config.delay_ms, 1000);

        for (key, value) in keys.iter().zip(saved) {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            api_address: Some("localhost".to_string()),
            stores: vec!["Bilka".to_string()],
            min_price: Some(2.0),
            format: OutputFormat::Csv,
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.api_address, config.api_address);
        assert_eq!(parsed.stores, config.stores);
        assert_eq!(parsed.min_price, config.min_price);
        assert_eq!(parsed.format, config.format);
    }
}
