use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::feed::mapping::PackageSourceMapping;
use crate::feed::source::PackageSource;

// =============================================================================
// HTTP-related constants
// =============================================================================

/// Timeout for feed requests in milliseconds (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// User agent sent to package feeds
pub const DEFAULT_USER_AGENT: &str = "version-finder";

/// Finder configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FinderConfig {
    pub package_sources: Vec<PackageSource>,
    pub package_source_mapping: PackageSourceMapping,
    pub http: HttpConfig,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            package_sources: vec![PackageSource::nuget_org()],
            package_source_mapping: PackageSourceMapping::default(),
            http: HttpConfig::default(),
        }
    }
}

impl FinderConfig {
    /// Read a JSON configuration file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Returns the path to the data directory for version-finder.
/// Uses $XDG_DATA_HOME/version-finder if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/version-finder,
/// or ./version-finder if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("version-finder.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-finder")
}
