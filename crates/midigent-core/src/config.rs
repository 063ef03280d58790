//! Configuration management for MidiGent services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (MIDIGENT__ prefix)
//! 2. Config file (midigent.toml)
//! 3. Defaults
//!
//! The scoring constants (similarity weights, thresholds, score floor) are
//! fixed and deliberately absent from this struct.

use serde::Deserialize;

use crate::error::Result;

/// Top-level MidiGent configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MidigentConfig {
    /// Session identifier used to derive generation seeds. Generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,

    /// Optional sidecar JSON genre table replacing the embedded one.
    #[serde(default)]
    pub genre_table_path: Option<String>,

    /// Fallback tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for MidigentConfig {
    fn default() -> Self {
        Self {
            session_id: None,
            genre_table_path: None,
            log_filter: default_log_filter(),
        }
    }
}

impl MidigentConfig {
    /// Load configuration from `<file_prefix>.toml` and `MIDIGENT__` env vars.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("MIDIGENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: MidigentConfig = cfg.try_deserialize()?;
        tracing::debug!(file_prefix, ?config, "Configuration loaded");
        Ok(config)
    }
}
