//! # imgdesk CLI
//!
//! Command-line interface for imgdesk - search an exported image library the
//! way the admin console's search box does.
//!
//! ## Usage
//!
//! - `imgdesk search "[hero]^banners/"` - One-shot search
//! - `imgdesk tags` - List tags with image counts
//! - `imgdesk normalize "Ảnh Bìa"` - Show the normalized form of a name
//! - `imgdesk interactive` - Debounced search fed from stdin

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{interactive_command, normalize_command, search_command, tags_command};
use config::CliConfigLoader;
use output::OutputFormat;

/// imgdesk - Image library search
#[derive(Parser)]
#[command(name = "imgdesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search, filter and sort an image library catalog")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog file override
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Debounce quantum override in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog once and print the matches
    Search {
        /// Search text, optionally starting with a [tag1,tag2] expression
        query: Option<String>,

        /// Required tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Sort field (filename, at, width, height, disk-size)
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction (asc, desc)
        #[arg(long)]
        direction: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Maximum number of results to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List every tag with its image count
    Tags {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the normalized form of a name
    Normalize {
        /// Text to normalize
        text: String,

        /// Keep `/` separators
        #[arg(long)]
        path: bool,
    },

    /// Read search text from stdin, one line per keystroke batch
    Interactive {
        /// Maximum number of results to print per state
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(catalog) = &cli.catalog {
        loader = loader.with_catalog_override(catalog.clone());
    }

    if let Some(debounce_ms) = cli.debounce_ms {
        loader = loader.with_debounce_override(debounce_ms);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    imgdesk_core::init_tracing_with_debug(cli.verbose);

    // Build configuration loader
    let mut config_loader = build_config_loader(&cli);

    match cli.command {
        Commands::Search {
            query,
            tags,
            sort_by,
            direction,
            format,
            limit,
        } => {
            if let Some(sort_by) = sort_by {
                config_loader = config_loader.with_sort_by_override(sort_by);
            }
            if let Some(direction) = direction {
                config_loader = config_loader.with_direction_override(direction);
            }
            search_command(config_loader, query, tags, format, limit).await
        }
        Commands::Tags { format } => tags_command(config_loader, format).await,
        Commands::Normalize { text, path } => normalize_command(text, path).await,
        Commands::Interactive { limit } => interactive_command(config_loader, limit).await,
    }
}
