//! midigent-audit: The per-session analysis pipeline.
//!
//! Ties the variation engine, the repetition guarantee and the genre
//! validator together behind one lock per session, so that
//! "seed → generate → fingerprint → check" runs as a single step even when
//! several threads share a session.

pub mod error;
pub mod session;

pub use error::AuditError;
pub use session::{GenerationOutcome, GenerationSession};
