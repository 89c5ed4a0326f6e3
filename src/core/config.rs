//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.querybox/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QueryboxConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub query_path: Option<String>,
    pub feedback_path: Option<String>,
    pub resummarize_path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_QUERY_PATH: &str = "/query";
pub const DEFAULT_FEEDBACK_PATH: &str = "/feedback";
pub use crate::backend::client::DEFAULT_RESUMMARIZE_PATH;
pub const DEFAULT_LOG_FILE: &str = "querybox.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub query_path: String,
    pub feedback_path: String,
    pub resummarize_path: String,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => e,
            ConfigError::Parse(e) => std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Where the loaded config came from.
///
/// Loading runs before the file logger exists, so the outcome is handed back
/// to the caller and logged with [`ConfigSource::log`] once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Read from an existing file.
    File(PathBuf),
    /// No file existed; a commented default was written there.
    Generated(PathBuf),
    /// No file existed and writing the default failed.
    GenerateFailed { path: PathBuf, error: String },
    /// No home directory, so there is nowhere to look.
    NoHomeDir,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "Loaded config from {}", path.display()),
            ConfigSource::Generated(path) => {
                write!(f, "No config file found, generated default at {}", path.display())
            }
            ConfigSource::GenerateFailed { path, error } => write!(
                f,
                "No config file found, failed to write default at {}: {}",
                path.display(),
                error
            ),
            ConfigSource::NoHomeDir => {
                write!(f, "Could not determine home directory, using default config")
            }
        }
    }
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(_) | ConfigSource::Generated(_) => info!("{self}"),
            ConfigSource::GenerateFailed { .. } | ConfigSource::NoHomeDir => warn!("{self}"),
        }
    }
}

/// Returns the path to `~/.querybox/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".querybox").join("config.toml"))
}

/// Load config from `~/.querybox/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `QueryboxConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<(QueryboxConfig, ConfigSource), ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok((QueryboxConfig::default(), ConfigSource::NoHomeDir)),
    }
}

pub fn load_config_from(path: &Path) -> Result<(QueryboxConfig, ConfigSource), ConfigError> {
    if !path.exists() {
        let source = match generate_default_config(path) {
            Ok(()) => ConfigSource::Generated(path.to_path_buf()),
            Err(e) => ConfigSource::GenerateFailed {
                path: path.to_path_buf(),
                error: e.to_string(),
            },
        };
        return Ok((QueryboxConfig::default(), source));
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: QueryboxConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok((config, ConfigSource::File(path.to_path_buf())))
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# querybox configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "http://localhost:8000"   # Or set QUERYBOX_BASE_URL / API_BASE_URL
# query_path = "/query"
# feedback_path = "/feedback"
# resummarize_path = "/resummarize"

# [logging]
# file = "querybox.log"
# level = "debug"                      # "off", "error", "warn", "info", "debug", "trace"
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &QueryboxConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], with the environment lookup injected.
pub fn resolve_with_env(
    config: &QueryboxConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env("QUERYBOX_BASE_URL"))
        .or_else(|| env("API_BASE_URL"))
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let query_path = config
        .backend
        .query_path
        .clone()
        .unwrap_or_else(|| DEFAULT_QUERY_PATH.to_string());

    let feedback_path = config
        .backend
        .feedback_path
        .clone()
        .unwrap_or_else(|| DEFAULT_FEEDBACK_PATH.to_string());

    let resummarize_path = config
        .backend
        .resummarize_path
        .clone()
        .unwrap_or_else(|| DEFAULT_RESUMMARIZE_PATH.to_string());

    let log_file = env("QUERYBOX_LOG_FILE")
        .or_else(|| config.logging.file.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    // Level: CLI → env → config → default. Unknown names fall back to the default.
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| env("QUERYBOX_LOG_LEVEL"))
        .or_else(|| config.logging.level.clone())
        .and_then(|name| parse_level(&name))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        base_url,
        query_path,
        feedback_path,
        resummarize_path,
        log_file,
        log_level,
    }
}

fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}
