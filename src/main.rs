//! tilbud-scraper - Weekly grocery offers from tilbudsugen.dk

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tilbud_scraper::commands::{RunCommand, SearchCommand};
use tilbud_scraper::config::{Config, OutputFormat};
use tilbud_scraper::format::Formatter;
use tilbud_scraper::tilbudsugen::normalize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tilbud-scraper",
    version,
    about = "Weekly grocery offers from tilbudsugen.dk",
    long_about = "Searches tilbudsugen.dk for each term in a term file, extracts the offer table and posts every offer to an ingestion API."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "TILBUD_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "TILBUD_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Filter flags shared by `run` and `search`.
#[derive(Args)]
struct FilterArgs {
    /// Minimum price per unit
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum price per unit
    #[arg(long)]
    max_price: Option<f64>,

    /// Drop offers whose price could not be read
    #[arg(long)]
    require_price: bool,

    /// Only these stores (comma-separated)
    #[arg(long, value_delimiter = ',')]
    stores: Option<Vec<String>>,

    /// Drop offers from unrecognised stores
    #[arg(long)]
    known_store_only: bool,

    /// Required keywords in item or brand (comma-separated)
    #[arg(long, value_delimiter = ',')]
    keywords: Option<Vec<String>>,

    /// Excluded keywords in item or brand (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,
}

impl FilterArgs {
    fn apply(self, config: &mut Config) {
        if self.min_price.is_some() {
            config.min_price = self.min_price;
        }
        if self.max_price.is_some() {
            config.max_price = self.max_price;
        }
        config.require_price |= self.require_price;
        config.known_store_only |= self.known_store_only;

        if let Some(stores) = self.stores {
            config.stores = stores;
        }
        if let Some(kw) = self.keywords {
            config.keywords = kw;
        }
        if let Some(ex) = self.exclude {
            config.exclude_keywords = ex;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search every term in the term file and deliver the offers
    #[command(alias = "r")]
    Run {
        /// File with one search term per line
        #[arg(short, long, env = "SEARCHTERMPATH")]
        terms: Option<PathBuf>,

        /// Host of the ingestion API
        #[arg(long, env = "APIADDRESS")]
        api_address: Option<String>,

        /// Port of the ingestion API
        #[arg(long)]
        api_port: Option<u16>,

        /// Print offers instead of delivering them
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Search a single term and print the offers
    #[command(alias = "s")]
    Search {
        /// Search term
        term: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List recognised stores
    Stores,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Run { terms, api_address, api_port, dry_run, filters } => {
            if let Some(path) = terms {
                config.terms_path = Some(path);
            }
            if let Some(address) = api_address {
                config.api_address = Some(address);
            }
            if let Some(port) = api_port {
                config.api_port = port;
            }
            filters.apply(&mut config);

            let cmd = RunCommand::new(config).dry_run(dry_run);
            let output = cmd.execute().await?;
            println!("{}", output);
        }

        Commands::Search { term, filters } => {
            filters.apply(&mut config);

            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&term).await?;
            println!("{}", output);
        }

        Commands::Stores => {
            let stores: Vec<&str> = normalize::known_stores().collect();
            println!("{}", Formatter::new(config.format).format_stores(&stores));
        }
    }

    Ok(())
}
