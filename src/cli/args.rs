//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Entitle - In-app purchase entitlement engine
///
/// Checks ownership, looks up prices and buys products against a storefront
/// backend, caching catalog and ownership answers.
#[derive(Parser, Debug)]
#[command(name = "entitle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ENTITLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store fixture served by the in-memory backend
    #[arg(long, global = true, env = "ENTITLE_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether products are owned
    Owned(OwnedArgs),

    /// Show the price of a product
    Price(PriceArgs),

    /// Buy a product
    Buy(BuyArgs),

    /// Show storefront connectivity and premium status
    Status,

    /// List the latest version of every catalog product
    Catalog(CatalogArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the owned command
#[derive(Parser, Debug)]
pub struct OwnedArgs {
    /// Product ids or subscription prefixes to check
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the price command
#[derive(Parser, Debug)]
pub struct PriceArgs {
    /// Product id
    pub id: String,

    /// Price the highest listed version of the id's family
    #[arg(short, long)]
    pub latest: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the buy command
#[derive(Parser, Debug)]
pub struct BuyArgs {
    /// Product id
    pub id: String,

    /// Buy the highest listed version of the id's family
    #[arg(short, long)]
    pub latest: bool,

    /// Record ownership under this id instead
    #[arg(long, value_name = "ID")]
    pub cache_as: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the catalog command
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., store.subscription_prefixes)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
