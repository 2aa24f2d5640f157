//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `ACTON_PAGINATION_`, `__` separates sections)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/acton-pagination/config.toml
//! 4. System directory: /etc/acton-pagination/config.toml
//! 5. Default values
//!
//! ```toml
//! [limit_offset]
//! default_limit = 10
//! max_limit = 100
//!
//! [cursor]
//! query_param = "cursor"
//! page_size = 10
//! offset_cutoff = 1000
//! max_token_len = 4096
//!
//! [logging]
//! level = "info"
//! json = true
//! ```
//!
//! `ACTON_PAGINATION_CURSOR__PAGE_SIZE=25` overrides `cursor.page_size`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

const ENV_PREFIX: &str = "ACTON_PAGINATION_";
const XDG_PREFIX: &str = "acton-pagination";

/// Main configuration structure
///
/// Loaded once at startup and passed to paginators by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Limit/offset pagination defaults
    #[serde(default)]
    pub limit_offset: LimitOffsetConfig,

    /// Cursor pagination defaults
    #[serde(default)]
    pub cursor: CursorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Limit/offset pagination configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOffsetConfig {
    /// Limit used when the request gives none or an unparsable one
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Upper bound applied to any requested limit
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

/// Cursor pagination configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorConfig {
    /// Query parameter carrying the cursor token
    #[serde(default = "default_cursor_param")]
    pub query_param: String,

    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Upper bound on the offset a decoded cursor may carry
    #[serde(default = "default_offset_cutoff")]
    pub offset_cutoff: u64,

    /// Longest token accepted for decoding, in bytes
    #[serde(default = "default_max_token_len")]
    pub max_token_len: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default = "default_true")]
    pub json: bool,
}

fn default_limit() -> u64 {
    10
}

fn default_max_limit() -> u64 {
    100
}

fn default_cursor_param() -> String {
    "cursor".to_string()
}

fn default_page_size() -> u64 {
    10
}

fn default_offset_cutoff() -> u64 {
    1000
}

fn default_max_token_len() -> usize {
    4096
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LimitOffsetConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            query_param: default_cursor_param(),
            page_size: default_page_size(),
            offset_cutoff: default_offset_cutoff(),
            max_token_len: default_max_token_len(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_true(),
        }
    }
}

impl PaginationConfig {
    /// Load configuration from the standard locations
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        // lowest priority first
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file, plus environment overrides
    ///
    /// A missing file contributes nothing.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Candidate config files, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(XDG_PREFIX);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(XDG_PREFIX).join("config.toml"));
        paths
    }
}
