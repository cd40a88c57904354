//! Minimal configuration types for imgdesk core
//!
//! Core only accepts fully resolved, validated settings.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default debounce quantum in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Largest accepted debounce quantum in milliseconds
pub const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Default compiled-regex size limit (bytes)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Default longest candidate name a pattern is evaluated against
pub const DEFAULT_MAX_MATCH_LEN: usize = 4096;

/// Field an image list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    /// Full path name, raw lexicographic order
    #[default]
    Filename,
    /// Creation timestamp
    At,
    Width,
    Height,
    /// Storage size on disk
    DiskSize,
}

impl SortField {
    /// All fields, in the order a picker would offer them
    pub const ALL: [SortField; 5] = [
        SortField::Filename,
        SortField::At,
        SortField::Width,
        SortField::Height,
        SortField::DiskSize,
    ];

    /// Get the field name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Filename => "filename",
            SortField::At => "at",
            SortField::Width => "width",
            SortField::Height => "height",
            SortField::DiskSize => "disk-size",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filename" | "name" | "fullname" => Ok(SortField::Filename),
            "at" | "date" | "time" => Ok(SortField::At),
            "width" => Ok(SortField::Width),
            "height" => Ok(SortField::Height),
            "disk-size" | "disksize" | "disk_size" | "size" => Ok(SortField::DiskSize),
            other => Err(ConfigError::InvalidValue {
                field: "sort_by".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Get the direction name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(ConfigError::InvalidValue {
                field: "direction".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Sort field plus direction, as chosen in the list footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(default)]
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a new sort spec
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Limits applied when compiling and evaluating search patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOptions {
    /// Size limit handed to the regex compiler
    pub size_limit: usize,
    /// Candidates longer than this (in bytes) fail to match
    pub max_match_len: usize,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            max_match_len: DEFAULT_MAX_MATCH_LEN,
        }
    }
}

/// Fully resolved search settings ready for use by core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Catalog file holding the image collection
    pub catalog: Option<PathBuf>,
    /// Debounce quantum
    pub debounce: Duration,
    /// Initial sort order
    #[serde(default)]
    pub sort: SortSpec,
    /// Pattern compile/evaluation limits
    #[serde(default)]
    pub pattern: PatternOptions,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            catalog: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            sort: SortSpec::default(),
            pattern: PatternOptions::default(),
        }
    }
}

impl SearchSettings {
    /// Set the catalog path
    pub fn with_catalog(mut self, path: PathBuf) -> Self {
        self.catalog = Some(path);
        self
    }

    /// Set the debounce quantum
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the initial sort order
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Set pattern limits
    pub fn with_pattern_options(mut self, pattern: PatternOptions) -> Self {
        self.pattern = pattern;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let debounce_ms = self.debounce.as_millis();
        if debounce_ms == 0 || debounce_ms > u128::from(MAX_DEBOUNCE_MS) {
            return Err(ConfigError::InvalidValue {
                field: "debounce_ms".to_string(),
                value: debounce_ms.to_string(),
            });
        }

        if self.pattern.size_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "regex_size_limit".to_string(),
                value: "0".to_string(),
            });
        }

        if self.pattern.max_match_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_match_len".to_string(),
                value: "0".to_string(),
            });
        }

        if let Some(catalog) = &self.catalog {
            if catalog.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "catalog".to_string(),
                    value: String::new(),
                });
            }
        }

        Ok(())
    }

    /// Get the catalog path or fail with a missing-field error
    pub fn require_catalog(&self) -> Result<&PathBuf, ConfigError> {
        self.catalog.as_ref().ok_or_else(|| ConfigError::MissingField {
            field: "catalog".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("filename".parse::<SortField>().unwrap(), SortField::Filename);
        assert_eq!("AT".parse::<SortField>().unwrap(), SortField::At);
        assert_eq!("diskSize".parse::<SortField>().unwrap(), SortField::DiskSize);
        assert_eq!("disk-size".parse::<SortField>().unwrap(), SortField::DiskSize);
        assert!("color".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_direction_toggle() {
        assert_eq!(SortDirection::Asc.toggle(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggle(), SortDirection::Asc);
        assert_eq!("descending".parse::<SortDirection>().unwrap(), SortDirection::Desc);
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = SearchSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.debounce, Duration::from_millis(DEFAULT_DEBOUNCE_MS));
        assert!(settings.require_catalog().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_debounce() {
        let settings = SearchSettings::default().with_debounce(Duration::ZERO);
        assert_eq!(
            settings.validate(),
            Err(ConfigError::InvalidValue {
                field: "debounce_ms".to_string(),
                value: "0".to_string(),
            })
        );
    }

    #[test]
    fn test_sort_spec_serde() {
        let spec: SortSpec =
            serde_json::from_str(r#"{"field":"disk-size","direction":"desc"}"#).unwrap();
        assert_eq!(spec, SortSpec::new(SortField::DiskSize, SortDirection::Desc));

        let spec: SortSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, SortSpec::default());
    }
}
