//! midigent-authenticity: Genre authenticity scoring.
//!
//! Scores a finished composition's tempo and note density against a static
//! table of genre conventions and produces strengths, issues,
//! recommendations and hard violations. Scoring is advisory: unknown genres
//! and empty compositions yield neutral reports, never errors.

pub mod report;
pub mod rules;
pub mod validator;

pub use report::AuthenticityReport;
pub use rules::{GenreRule, GenreRuleTable};
pub use validator::{FixCategory, GenreAuthenticityValidator};
