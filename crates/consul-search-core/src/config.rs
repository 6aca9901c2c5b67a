//! Configuration types for consul-search.
//!
//! [`Settings::load`] layers an optional user file and `CONSUL_SEARCH__*`
//! environment overrides on top of the built-in defaults. [`Settings::defaults`]
//! returns the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[consul]
scheme       = "http"
cache_ttl    = 600
timeout_secs = 30

[search]
root  = ""
limit = 10
regex = false
cache = ".cache"
"#;

const ENV_PREFIX: &str = "CONSUL_SEARCH";

/// Host used in cache keys when none is configured.
pub const CACHE_KEY_DEFAULT_HOST: &str = "";
/// Port used in cache keys when none is configured.
pub const CACHE_KEY_DEFAULT_PORT: u16 = 80;

/// Host the client connects to when none is configured.
pub const AGENT_DEFAULT_HOST: &str = "127.0.0.1";
/// Port the client connects to when none is configured.
pub const AGENT_DEFAULT_PORT: u16 = 8500;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level settings, constructed once at process start and passed down.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub consul: ConsulConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[consul]` section: where the KV store lives and how long fetches stay cached.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsulConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub datacenter: Option<String>,
    /// Seconds a fetched snapshot stays valid. Zero or negative disables reuse.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: i64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_scheme() -> String { "http".to_string() }
fn default_cache_ttl() -> i64 { 600 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            scheme: default_scheme(),
            token: None,
            datacenter: None,
            cache_ttl: default_cache_ttl(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConsulConfig {
    /// The connection target as it appears in cache keys.
    pub fn cache_target(&self) -> (&str, u16) {
        (
            self.host.as_deref().unwrap_or(CACHE_KEY_DEFAULT_HOST),
            self.port.unwrap_or(CACHE_KEY_DEFAULT_PORT),
        )
    }

    /// The host and port the HTTP client actually dials.
    pub fn agent_address(&self) -> (&str, u16) {
        (
            self.host.as_deref().unwrap_or(AGENT_DEFAULT_HOST),
            self.port.unwrap_or(AGENT_DEFAULT_PORT),
        )
    }
}

/// `[search]` section: defaults for each search invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub root: String,
    /// Signed so that negative values coming from files or the environment
    /// are accepted and clamped by [`coerce_limit`] instead of rejected.
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub regex: bool,
    /// Directory holding the result cache database.
    #[serde(default = "default_cache_dir")]
    pub cache: PathBuf,
}

fn default_limit() -> i64 { 10 }
fn default_cache_dir() -> PathBuf { PathBuf::from(".cache") }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            limit: default_limit(),
            regex: false,
            cache: default_cache_dir(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Settings {
    /// Load settings from the built-in defaults, then `path` (if given), then
    /// `CONSUL_SEARCH__SECTION__KEY` environment variables.
    ///
    /// The file format is inferred from its extension (TOML, YAML or JSON).
    /// A path that is given but does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

/// Clamp a configured or user-supplied limit to the engine's domain.
/// Anything at or below zero means "no results".
pub fn coerce_limit(raw: i64) -> usize {
    usize::try_from(raw).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
