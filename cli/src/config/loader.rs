//! Simple CLI configuration loader for imgdesk
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./imgdesk.json or ./.imgdesk/config.json
//! 3. Git repository root: <repo_root>/.imgdesk/config.json
//! 4. XDG config: $XDG_CONFIG_HOME/imgdesk/config.json or ~/.config/imgdesk/config.json
//! 5. Defaults only (no files)
//!
//! Environment variables (`IMGDESK_CATALOG`, `IMGDESK_DEBOUNCE_MS`) override the
//! file, and flags override both.

use anyhow::{anyhow, Context, Result};
use imgdesk_core::config::{PatternOptions, SearchSettings, SortSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the catalog file
pub const ENV_CATALOG: &str = "IMGDESK_CATALOG";

/// Environment variable holding the debounce quantum in milliseconds
pub const ENV_DEBOUNCE_MS: &str = "IMGDESK_DEBOUNCE_MS";

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Catalog file; relative paths resolve against the config file's directory
    pub catalog: Option<PathBuf>,
    /// Debounce quantum in milliseconds
    pub debounce_ms: Option<u64>,
    /// Initial sort field (filename, at, width, height, disk-size)
    pub sort_by: Option<String>,
    /// Initial sort direction (asc, desc)
    pub direction: Option<String>,
    /// Compiled regex size limit in bytes
    pub regex_size_limit: Option<usize>,
    /// Longest name a pattern is evaluated against
    pub max_match_len: Option<usize>,
}

/// CLI configuration loader
#[derive(Debug, Clone, Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    catalog_override: Option<PathBuf>,
    debounce_override: Option<u64>,
    sort_by_override: Option<String>,
    direction_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set catalog override
    pub fn with_catalog_override(mut self, path: PathBuf) -> Self {
        self.catalog_override = Some(path);
        self
    }

    /// Set debounce override
    pub fn with_debounce_override(mut self, debounce_ms: u64) -> Self {
        self.debounce_override = Some(debounce_ms);
        self
    }

    /// Set sort field override
    pub fn with_sort_by_override(mut self, sort_by: String) -> Self {
        self.sort_by_override = Some(sort_by);
        self
    }

    /// Set sort direction override
    pub fn with_direction_override(mut self, direction: String) -> Self {
        self.direction_override = Some(direction);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<SearchSettings> {
        // Step 1: Find and load base configuration
        let config = if let Some(override_path) = &self.config_override {
            // Use explicit config override
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            // Search in priority order
            self.search_and_load().await?
        };

        // Step 2: Apply environment and flag overrides
        let config = apply_env(config, |key| std::env::var(key).ok())?;
        let config = self.apply_flags(config);

        // Step 3: Resolve to final settings
        resolve_config(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<RawConfig> {
        // 1. Current working directory
        if let Some(config) = self.try_load_cwd().await? {
            return Ok(config);
        }

        // 2. Git repository root
        if let Some(config) = self.try_load_git_root().await? {
            return Ok(config);
        }

        // 3. XDG config directory
        if let Some(config) = self.try_load_xdg().await? {
            return Ok(config);
        }

        // 4. Defaults
        debug!("No config file found, using defaults");
        Ok(RawConfig::default())
    }

    /// Try loading from current working directory
    async fn try_load_cwd(&self) -> Result<Option<RawConfig>> {
        let cwd = std::env::current_dir()?;

        // Try ./imgdesk.json first
        let imgdesk_json = cwd.join("imgdesk.json");
        if imgdesk_json.exists() {
            return Ok(Some(self.load_file(&imgdesk_json).await?));
        }

        // Try ./.imgdesk/config.json
        let dir_config = cwd.join(".imgdesk").join("config.json");
        if dir_config.exists() {
            return Ok(Some(self.load_file(&dir_config).await?));
        }

        Ok(None)
    }

    /// Try loading from git repository root
    async fn try_load_git_root(&self) -> Result<Option<RawConfig>> {
        if let Some(git_root) = self.find_git_root()? {
            let config_path = git_root.join(".imgdesk").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Try loading from XDG config directory
    async fn try_load_xdg(&self) -> Result<Option<RawConfig>> {
        if let Some(config_dir) = self.get_xdg_config_dir() {
            let config_path = config_dir.join("imgdesk").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            // Try config.json in the directory
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: RawConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let (Some(catalog), Some(base)) = (&config.catalog, path.parent()) {
            if catalog.is_relative() {
                config.catalog = Some(base.join(catalog));
            }
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Find git repository root
    fn find_git_root(&self) -> Result<Option<PathBuf>> {
        let mut current = std::env::current_dir()?;

        loop {
            if current.join(".git").exists() {
                return Ok(Some(current));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Get XDG config directory
    fn get_xdg_config_dir(&self) -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(xdg_config))
        } else {
            dirs::config_dir()
        }
    }

    /// Apply flag overrides on top of the loaded config
    fn apply_flags(&self, mut config: RawConfig) -> RawConfig {
        if let Some(catalog) = &self.catalog_override {
            config.catalog = Some(catalog.clone());
        }
        if let Some(debounce_ms) = self.debounce_override {
            config.debounce_ms = Some(debounce_ms);
        }
        if let Some(sort_by) = &self.sort_by_override {
            config.sort_by = Some(sort_by.clone());
        }
        if let Some(direction) = &self.direction_override {
            config.direction = Some(direction.clone());
        }
        config
    }
}

/// Apply environment overrides, reading variables through `lookup`
fn apply_env(
    mut config: RawConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<RawConfig> {
    if let Some(catalog) = lookup(ENV_CATALOG).filter(|v| !v.is_empty()) {
        config.catalog = Some(PathBuf::from(catalog));
    }

    if let Some(debounce) = lookup(ENV_DEBOUNCE_MS).filter(|v| !v.is_empty()) {
        let debounce_ms = debounce
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{} is not a number: {}", ENV_DEBOUNCE_MS, debounce))?;
        config.debounce_ms = Some(debounce_ms);
    }

    Ok(config)
}

/// Resolve raw config to SearchSettings
fn resolve_config(config: RawConfig) -> Result<SearchSettings> {
    let defaults = SearchSettings::default();

    let mut sort = SortSpec::default();
    if let Some(sort_by) = &config.sort_by {
        sort.field = sort_by.parse()?;
    }
    if let Some(direction) = &config.direction {
        sort.direction = direction.parse()?;
    }

    let pattern = PatternOptions {
        size_limit: config
            .regex_size_limit
            .unwrap_or(defaults.pattern.size_limit),
        max_match_len: config
            .max_match_len
            .unwrap_or(defaults.pattern.max_match_len),
    };

    let debounce = config
        .debounce_ms
        .map(Duration::from_millis)
        .unwrap_or(defaults.debounce);

    let mut settings = SearchSettings::default()
        .with_debounce(debounce)
        .with_sort(sort)
        .with_pattern_options(pattern);
    if let Some(catalog) = config.catalog {
        settings = settings.with_catalog(catalog);
    }

    // Validate
    settings
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    Ok(settings)
}
