//! CLI-specific output implementations
//!
//! Search results and tag listings are rendered either as an aligned text
//! table for the terminal or as JSON for scripts.

pub mod formatters;

pub use formatters::{ImageFormatter, TagFormatter};

use clap::ValueEnum;

/// Output format for result listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}
