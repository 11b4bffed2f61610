//! Application configuration for DeepBrief.
//!
//! User config lives at `~/.deepbrief/deepbrief.toml`.
//! Caller-supplied values override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeepBriefError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "deepbrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".deepbrief";

// ---------------------------------------------------------------------------
// Config structs (matching deepbrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Fetch policies.
    #[serde(default)]
    pub fetch: FetchSettings,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default number of documents a run tries to collect.
    #[serde(default = "default_result_count")]
    pub result_count: usize,

    /// Skip the expensive fetch/summarize branch by default.
    #[serde(default)]
    pub skip_content_fetch: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            result_count: default_result_count(),
            skip_content_fetch: false,
        }
    }
}

fn default_result_count() -> usize {
    5
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Maximum concurrent page fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_concurrency() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + caller overrides)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration consumed by the content collector.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum concurrent page fetches.
    pub concurrency: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: config.fetch.concurrency,
            timeout_secs: config.fetch.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.deepbrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DeepBriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.deepbrief/deepbrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DeepBriefError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DeepBriefError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DeepBriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DeepBriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DeepBriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("result_count"));
        assert!(toml_str.contains("concurrency"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.result_count, 5);
        assert_eq!(parsed.fetch.timeout_secs, 30);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml_str = r#"
[fetch]
concurrency = 4
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.defaults.result_count, 5);
    }

    #[test]
    fn fetch_config_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.concurrency, 10);
        assert_eq!(fetch.timeout_secs, 30);
    }
}
