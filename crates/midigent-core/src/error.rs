use thiserror::Error;

/// Top-level error type for the MidiGent analysis crates.
///
/// Only `InvalidArgument` is raised by the scoring and randomness layers;
/// every other condition they meet degrades to a neutral result instead.
#[derive(Error, Debug)]
pub enum MidigentError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Genre table error: {0}")]
    GenreTable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for MidigentError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MidigentError>;
