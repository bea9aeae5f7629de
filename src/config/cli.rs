use crate::config::toml_config::{ClientConfig, DEFAULT_BASE_URL};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "kayit-client")]
#[command(about = "Headless client for the record application's pages")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Server page URL, overrides the configuration file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check an identity number against its checksum rules
    Validate { number: String },

    /// Format a phone number as (XXX) XXX XX XX
    FormatPhone { input: String },

    /// Complete nine leading digits into a valid identity number
    Generate { first_nine: String },

    /// Print what the client sees on the page as JSON
    Inspect,

    /// Follow the dashboard statistics until interrupted
    Watch,

    /// Type the given values into the name search, one keystroke each
    Search {
        #[arg(required = true)]
        keystrokes: Vec<String>,

        /// Delay between keystrokes in milliseconds
        #[arg(long, default_value = "100")]
        typing_delay_ms: u64,
    },

    /// Download an export link from the page
    Export { href: String },
}

impl Cli {
    /// Configuration file (if any) with command line overrides applied.
    pub fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::with_base_url(DEFAULT_BASE_URL),
        };
        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        Ok(config)
    }
}
