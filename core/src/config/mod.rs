//! Minimal configuration module for imgdesk core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{PatternOptions, SearchSettings, SortDirection, SortField, SortSpec};
