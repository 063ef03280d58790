//! Error types for the midigent-audit crate.

use midigent_core::MidigentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Composition generator failed: {0}")]
    Generator(#[source] MidigentError),

    #[error(transparent)]
    Core(#[from] MidigentError),
}

pub type Result<T> = std::result::Result<T, AuditError>;
