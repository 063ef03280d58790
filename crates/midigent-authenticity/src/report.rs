//! Authenticity report value object.

use serde::{Deserialize, Serialize};

/// Outcome of validating one composition against its genre's conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticityReport {
    /// Genre label exactly as requested (not lower-cased).
    pub genre: String,
    /// Heuristic score; `[0.4, 1.0]` for known genres, 0.5 for unknown ones.
    pub authenticity_score: f64,
    pub strengths: Vec<String>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    /// Hard rule breaches, e.g. `TEMPO: 200 > 90`.
    pub technical_violations: Vec<String>,
}

impl AuthenticityReport {
    /// Neutral report for a genre missing from the rule table.
    pub fn unknown_genre(genre: &str) -> Self {
        Self {
            genre: genre.to_string(),
            authenticity_score: 0.5,
            strengths: Vec::new(),
            issues: vec![format!("Unknown genre: {genre}")],
            recommendations: vec![format!("Add {genre} to genre database")],
            technical_violations: Vec::new(),
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.technical_violations.is_empty()
    }
}
