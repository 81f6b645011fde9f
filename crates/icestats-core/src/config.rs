//! Configuration types for icestats.
//!
//! Settings are layered: the embedded defaults below, then an optional TOML /
//! YAML / JSON file, then `ICESTATS__SECTION__KEY` environment variables.
//! [`Config::defaults`] returns the embedded layer alone without touching the
//! filesystem or the environment (useful in tests).

use serde::Deserialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[feed]
flush_on_close   = false
read_buffer_size = 8192

[log]
filter = "info"
"#;

/// Prefix of environment overrides, e.g. `ICESTATS__FEED__FLUSH_ON_CLOSE`.
pub const ENV_PREFIX: &str = "ICESTATS";

const MIN_READ_BUFFER: usize = 64;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// `[feed]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Decode a trailing unterminated line when the feed closes instead of
    /// dropping it.
    #[serde(default = "default_flush_on_close")]
    pub flush_on_close: bool,
    /// Bytes requested from the transport per read.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

fn default_flush_on_close() -> bool { false }
fn default_read_buffer_size() -> usize { 8192 }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            flush_on_close: default_flush_on_close(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "info".to_string() }

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load the layered configuration. `path`, when given, must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let cfg: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap_or_default()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.feed.read_buffer_size < MIN_READ_BUFFER {
            anyhow::bail!(
                "feed.read_buffer_size must be at least {MIN_READ_BUFFER}, got {}",
                self.feed.read_buffer_size
            );
        }
        if self.log.filter.trim().is_empty() {
            anyhow::bail!("log.filter must not be empty");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
