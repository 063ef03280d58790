//! Genre authenticity validation and fix suggestions.
//!
//! `suggest_genre_fixes` reads the text that `validate_composition` writes
//! (the `TEMPO` violation markers, the words "density" and "smooth" in
//! issues). Changing the wording on one side requires changing the other.

use std::collections::BTreeMap;

use midigent_core::{Composition, Track};
use serde::{Deserialize, Serialize};

use crate::report::AuthenticityReport;
use crate::rules::GenreRuleTable;

/// Score deducted for a tempo outside the genre range.
const TEMPO_PENALTY: f64 = 0.2;
/// Score deducted for a note density outside the genre range.
const DENSITY_PENALTY: f64 = 0.15;
/// Lowest score a known genre can receive.
const SCORE_FLOOR: f64 = 0.4;
const SCORE_CEILING: f64 = 1.0;
/// Below this score the report suggests revisiting genre characteristics.
const CHARACTERISTICS_HINT_BELOW: f64 = 0.7;
/// Bar count assumed for density; the real composition length is not consulted.
const ASSUMED_BARS: usize = 64;

/// Area a suggested fix applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FixCategory {
    Tempo,
    Density,
    Production,
}

/// Stateless scorer over a genre rule table.
#[derive(Debug, Clone, Copy)]
pub struct GenreAuthenticityValidator<'r> {
    rules: &'r GenreRuleTable,
}

impl Default for GenreAuthenticityValidator<'static> {
    fn default() -> Self {
        Self::new(GenreRuleTable::builtin())
    }
}

impl<'r> GenreAuthenticityValidator<'r> {
    pub fn new(rules: &'r GenreRuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r GenreRuleTable {
        self.rules
    }

    /// Validate a whole composition value.
    pub fn validate(&self, composition: &Composition) -> AuthenticityReport {
        self.validate_composition(
            &composition.genre,
            composition.tempo,
            &composition.scale_notes,
            &composition.tracks,
            composition.chords(),
        )
    }

    /// Score tempo and note density against the genre's conventions.
    ///
    /// Unknown genres get a neutral 0.5 report. Known genres start at 1.0,
    /// lose points per failed check and are clamped to `[0.4, 1.0]`.
    /// Essential characteristics and forbidden techniques are listed, not
    /// analysed.
    pub fn validate_composition(
        &self,
        genre: &str,
        tempo: u32,
        scale_notes: &[u8],
        tracks: &[Track],
        chord_progression: Option<&[String]>,
    ) -> AuthenticityReport {
        let Some(rule) = self.rules.get(genre) else {
            tracing::debug!(genre, "Unknown genre, returning neutral report");
            return AuthenticityReport::unknown_genre(genre);
        };

        let mut score = SCORE_CEILING;
        let mut strengths = Vec::new();
        let mut issues = Vec::new();
        let mut violations = Vec::new();

        // Tempo.
        let (tempo_min, tempo_max) = rule.tempo_range;
        if rule.tempo_in_range(tempo) {
            strengths.push(format!(
                "Tempo {tempo} BPM is in genre range ({tempo_min}-{tempo_max})"
            ));
        } else {
            if tempo < tempo_min {
                issues.push(format!(
                    "Tempo {tempo} BPM is slower than genre typical ({tempo_min} min)"
                ));
                violations.push(format!("TEMPO: {tempo} < {tempo_min}"));
            } else {
                issues.push(format!(
                    "Tempo {tempo} BPM is faster than genre typical ({tempo_max} max)"
                ));
                violations.push(format!("TEMPO: {tempo} > {tempo_max}"));
            }
            score -= TEMPO_PENALTY;
        }

        // Scale. Absence is not penalised.
        if !scale_notes.is_empty() {
            strengths.push(format!(
                "Using consistent scale ({} notes available)",
                scale_notes.len()
            ));
        }

        // Harmony.
        if let Some(chords) = chord_progression {
            if rule.follows_canonical_progression(chords) {
                strengths.push(format!("Chord progression follows a canonical {genre} pattern"));
            }
        }

        // Note density.
        let density = note_density(tracks);
        if rule.density_in_range(density) {
            strengths.push(format!(
                "Note density {density:.1} matches {genre} expectations"
            ));
        } else {
            score -= DENSITY_PENALTY;
            if density < rule.note_density.0 {
                issues.push(format!("Note density {density:.1} too sparse for {genre}"));
            } else {
                issues.push(format!("Note density {density:.1} too dense for {genre}"));
            }
        }

        // Qualitative traits are advisory only.
        if !rule.essential_characteristics.is_empty() {
            strengths.push(format!(
                "Track contains {} genre characteristics",
                rule.essential_characteristics.len()
            ));
        }
        strengths.push("Avoids techniques unsuitable for the genre".to_string());

        let score = score.clamp(SCORE_FLOOR, SCORE_CEILING);

        let mut recommendations = Vec::new();
        if !issues.is_empty() {
            recommendations.push(format!(
                "Address {} technical issues for full authenticity",
                issues.len()
            ));
        }
        if score < CHARACTERISTICS_HINT_BELOW {
            recommendations.push("Consider genre characteristics more explicitly".to_string());
        }
        let emphasis: Vec<&str> = rule
            .essential_characteristics
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        recommendations.push(format!("Emphasize {}", emphasis.join(", ")));

        tracing::debug!(
            genre,
            tempo,
            density,
            score,
            issues = issues.len(),
            "Composition validated"
        );

        AuthenticityReport {
            genre: genre.to_string(),
            authenticity_score: score,
            strengths,
            issues,
            recommendations,
            technical_violations: violations,
        }
    }

    /// Map a report's violations and issues to at most one fix per category.
    ///
    /// `_current_config` holds the generation parameters that produced the
    /// report; it is not consulted yet.
    pub fn suggest_genre_fixes(
        report: &AuthenticityReport,
        _current_config: &BTreeMap<String, serde_json::Value>,
    ) -> BTreeMap<FixCategory, String> {
        let mut fixes = BTreeMap::new();

        for violation in &report.technical_violations {
            if violation.contains("TEMPO") && violation.split_whitespace().count() >= 3 {
                let fix = if violation.contains('<') {
                    format!("Increase tempo (current is too slow for {})", report.genre)
                } else {
                    format!("Decrease tempo (current is too fast for {})", report.genre)
                };
                fixes.insert(FixCategory::Tempo, fix);
            }
        }

        if report.issues.iter().any(|i| i.contains("density")) {
            fixes.insert(
                FixCategory::Density,
                "Adjust note density to match genre expectations".to_string(),
            );
        }

        if report.issues.iter().any(|i| i.contains("smooth")) {
            fixes.insert(
                FixCategory::Production,
                "Reduce smoothness/reverb for genre authenticity".to_string(),
            );
        }

        fixes
    }
}

/// Notes per bar per track, assuming a fixed bar count.
fn note_density(tracks: &[Track]) -> f64 {
    let slots = tracks.len() * ASSUMED_BARS;
    if slots == 0 {
        return 0.0;
    }
    let total: usize = tracks.iter().map(Track::note_count).sum();
    total as f64 / slots as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use midigent_core::Note;

    /// `count` quarter notes on middle C.
    fn track(count: usize) -> Track {
        Track::new("lead", (0..count).map(|_| Note::new(60, 0.25, 90)).collect())
    }

    fn validator() -> GenreAuthenticityValidator<'static> {
        GenreAuthenticityValidator::default()
    }

    #[test]
    fn unknown_genre_is_neutral() {
        let report = validator().validate_composition("totallyUnknownGenre", 120, &[], &[], None);
        assert!((report.authenticity_score - 0.5).abs() < f64::EPSILON);
        assert_eq!(report.issues, vec!["Unknown genre: totallyUnknownGenre"]);
        assert!(report.strengths.is_empty());
        assert!(report.technical_violations.is_empty());
        assert_eq!(
            report.recommendations,
            vec!["Add totallyUnknownGenre to genre database"]
        );
    }

    #[test]
    fn ambient_too_fast_is_flagged() {
        let report = validator().validate_composition("ambient", 200, &[60, 62], &[track(640)], None);
        assert!(report.authenticity_score <= 0.8);
        assert!(report
            .technical_violations
            .iter()
            .any(|v| v.contains("TEMPO")));
        assert_eq!(report.technical_violations, vec!["TEMPO: 200 > 90"]);
        assert!(report.issues.iter().any(|i| i.contains("faster")));
    }

    #[test]
    fn conforming_composition_scores_full() {
        // 10 notes per bar over 64 bars sits inside ambient's 5-20 density.
        let report = validator().validate_composition("Ambient", 70, &[60, 62, 64], &[track(640)], None);
        assert!((report.authenticity_score - 1.0).abs() < f64::EPSILON);
        assert!(report.issues.is_empty());
        assert!(report.technical_violations.is_empty());
        assert_eq!(report.genre, "Ambient");
        assert!(report
            .strengths
            .contains(&"Tempo 70 BPM is in genre range (40-90)".to_string()));
        assert!(report
            .strengths
            .contains(&"Using consistent scale (3 notes available)".to_string()));
        assert!(report
            .strengths
            .contains(&"Note density 10.0 matches Ambient expectations".to_string()));
        assert_eq!(
            report.recommendations,
            vec!["Emphasize sparse melodic content, repetitive structures"]
        );
    }

    #[test]
    fn slow_and_sparse_stacks_penalties() {
        let report = validator().validate_composition("rock", 60, &[], &[track(64)], None);
        // 1.0 - 0.2 - 0.15
        assert!((report.authenticity_score - 0.65).abs() < 1e-9);
        assert_eq!(report.technical_violations, vec!["TEMPO: 60 < 100"]);
        assert!(report.issues.iter().any(|i| i.contains("slower")));
        assert!(report.issues.iter().any(|i| i.contains("too sparse")));
        assert_eq!(
            report.recommendations,
            vec![
                "Address 2 technical issues for full authenticity",
                "Consider genre characteristics more explicitly",
                "Emphasize electric guitar, powerful drums",
            ]
        );
    }

    #[test]
    fn too_dense_is_reported() {
        let report = validator().validate_composition("ambient", 60, &[], &[track(64 * 30)], None);
        assert!(report.issues.iter().any(|i| i.contains("too dense")));
        assert!((report.authenticity_score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn empty_tracks_have_zero_density() {
        let report = validator().validate_composition("pop", 110, &[], &[], None);
        assert!(report
            .issues
            .contains(&"Note density 0.0 too sparse for pop".to_string()));
    }

    #[test]
    fn score_is_always_clamped() {
        let v = validator();
        for genre in ["ambient", "jazz", "rock", "lofi", "unknown", "jazz.modal"] {
            for tempo in [0, 30, 95, 150, 400] {
                for notes in [0, 64, 640, 6_400] {
                    let report = v.validate_composition(genre, tempo, &[], &[track(notes)], None);
                    assert!(
                        (0.4..=1.0).contains(&report.authenticity_score),
                        "{genre}@{tempo} with {notes} notes scored {}",
                        report.authenticity_score
                    );
                }
            }
        }
    }

    #[test]
    fn subgenre_uses_root_rules() {
        let report = validator().validate_composition("jazz.bebop", 200, &[], &[track(64 * 30)], None);
        assert_eq!(report.genre, "jazz.bebop");
        assert_eq!(report.technical_violations, vec!["TEMPO: 200 > 160"]);
    }

    #[test]
    fn canonical_progression_is_credited() {
        let chords: Vec<String> = ["C", "Am", "F", "G"].iter().map(|s| s.to_string()).collect();
        let report = validator().validate_composition("pop", 110, &[], &[track(64 * 25)], Some(chords.as_slice()));
        assert!(report
            .strengths
            .contains(&"Chord progression follows a canonical pop pattern".to_string()));
        assert!((report.authenticity_score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_reads_composition_fields() {
        let comp = Composition::new("lofi", 95, vec![track(64 * 20)]).with_scale(vec![60, 63, 65]);
        let report = validator().validate(&comp);
        assert!((report.authenticity_score - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.genre, "lofi");
    }

    #[test]
    fn fixes_follow_report_text() {
        let none = BTreeMap::new();

        let fast = validator().validate_composition("ambient", 200, &[], &[], None);
        let fixes = GenreAuthenticityValidator::suggest_genre_fixes(&fast, &none);
        assert_eq!(
            fixes.get(&FixCategory::Tempo).map(String::as_str),
            Some("Decrease tempo (current is too fast for ambient)")
        );
        assert!(fixes.contains_key(&FixCategory::Density));
        assert!(!fixes.contains_key(&FixCategory::Production));

        let slow = validator().validate_composition("rock", 60, &[], &[track(64 * 30)], None);
        let fixes = GenreAuthenticityValidator::suggest_genre_fixes(&slow, &none);
        assert_eq!(
            fixes.get(&FixCategory::Tempo).map(String::as_str),
            Some("Increase tempo (current is too slow for rock)")
        );
        assert!(!fixes.contains_key(&FixCategory::Density));
    }

    #[test]
    fn production_fix_matches_smooth_issue() {
        let report = AuthenticityReport {
            genre: "rock".to_string(),
            authenticity_score: 0.8,
            strengths: vec![],
            issues: vec!["Mix is overly smooth for rock".to_string()],
            recommendations: vec![],
            technical_violations: vec![],
        };
        let fixes = GenreAuthenticityValidator::suggest_genre_fixes(&report, &BTreeMap::new());
        assert_eq!(fixes.len(), 1);
        assert!(fixes.contains_key(&FixCategory::Production));
    }

    #[test]
    fn clean_report_needs_no_fixes() {
        let report = validator().validate_composition("ambient", 70, &[], &[track(640)], None);
        assert!(GenreAuthenticityValidator::suggest_genre_fixes(&report, &BTreeMap::new()).is_empty());
    }
}
