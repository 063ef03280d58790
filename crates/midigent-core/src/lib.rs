//! midigent-core: Shared types, configuration, and error handling for MidiGent.
//!
//! This crate provides the foundational types used by the analysis crates:
//! - Composition value types (notes, tracks, compositions) handed over by the
//!   generation pipeline
//! - Configuration management
//! - The common error type

pub mod config;
pub mod error;
pub mod types;

pub use config::MidigentConfig;
pub use error::{MidigentError, Result};
pub use types::{Composition, Note, Track};
