//! Application configuration for Freshwire.
//!
//! User config lives at `~/.freshwire/freshwire.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FreshwireError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "freshwire.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".freshwire";

// ---------------------------------------------------------------------------
// Config structs (matching freshwire.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fetch/retrieval settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Monitored sources.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// `[fetch]` section — the immutable retrieval configuration.
///
/// Built once at startup and passed by value into the fetcher and pipeline
/// constructors; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum spacing in ms between request dispatches (global, not per-host).
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum fetch attempts per URL.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Maximum declared content length in bytes.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: u64,

    /// Maximum concurrent in-flight fetches.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Content types accepted from responses (substring match).
    #[serde(default = "default_accepted_content_types")]
    pub accepted_content_types: Vec<String>,

    /// Maximum post links followed from a single index page.
    #[serde(default = "default_max_blog_posts")]
    pub max_blog_posts: usize,

    /// Maximum entries processed from a single feed.
    #[serde(default = "default_max_feed_entries")]
    pub max_feed_entries: usize,

    /// Whether to check robots.txt before fetching.
    #[serde(default = "default_true")]
    pub respect_robots_txt: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_content_length: default_max_content_length(),
            max_concurrent: default_max_concurrent(),
            accepted_content_types: default_accepted_content_types(),
            max_blog_posts: default_max_blog_posts(),
            max_feed_entries: default_max_feed_entries(),
            respect_robots_txt: default_true(),
        }
    }
}

impl FetchConfig {
    /// Validate the configuration. Must pass before any fetch is dispatched.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(FreshwireError::config("max_concurrent must be at least 1"));
        }
        if self.max_retries == 0 {
            return Err(FreshwireError::config("max_retries must be at least 1"));
        }
        if self.accepted_content_types.is_empty() {
            return Err(FreshwireError::config(
                "accepted_content_types must not be empty",
            ));
        }
        Ok(())
    }
}

fn default_user_agent() -> String {
    concat!("Freshwire/", env!("CARGO_PKG_VERSION")).into()
}
fn default_request_delay_ms() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_max_content_length() -> u64 {
    1024 * 1024
}
fn default_max_concurrent() -> usize {
    5
}
fn default_accepted_content_types() -> Vec<String> {
    [
        "text/html",
        "text/plain",
        "application/xhtml+xml",
        "application/xml",
        "application/rss+xml",
        "application/atom+xml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_max_blog_posts() -> usize {
    10
}
fn default_max_feed_entries() -> usize {
    10
}
fn default_true() -> bool {
    true
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the content database.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.freshwire/freshwire.db".into()
}

/// `[sources]` section — seed URLs monitored by the `run` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Seed URLs to retrieve on each run.
    #[serde(default)]
    pub urls: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.freshwire/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FreshwireError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.freshwire/freshwire.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| FreshwireError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FreshwireError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FreshwireError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FreshwireError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FreshwireError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
