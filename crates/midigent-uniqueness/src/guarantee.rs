//! Session-scoped composition history and duplicate detection.
//!
//! Similarity between two signatures is a weighted sum over binary component
//! matches:
//!
//! | factor | weight | match | mismatch |
//! |---|---|---|---|
//! | melody hash | 0.4 | 1.0 | 0.3 |
//! | harmony hash | 0.3 | 1.0 | 0.3 |
//! | rhythm hash | 0.2 | 1.0 | 0.3 |
//! | genre + tempo | 0.1 | mean of genre (0.5/0.1) and tempo within 10 BPM (0.5/0.1) |
//!
//! Identical overall hashes score exactly 1.0.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fmt::Write as _;

use midigent_core::{Composition, Track};
use serde::{Deserialize, Serialize};

use crate::signature::CompositionSignature;

/// Scores above this count as "similar".
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

const MELODY_WEIGHT: f64 = 0.4;
const HARMONY_WEIGHT: f64 = 0.3;
const RHYTHM_WEIGHT: f64 = 0.2;
const CONTEXT_WEIGHT: f64 = 0.1;
/// Credit a mismatched component still earns.
const PARTIAL_CREDIT: f64 = 0.3;
const CONTEXT_MATCH: f64 = 0.5;
const CONTEXT_MISMATCH: f64 = 0.1;
const TEMPO_TOLERANCE_BPM: u32 = 10;
/// Confidence lost per similar composition.
const CONFIDENCE_STEP: f64 = 0.2;
/// Entries listed by the history summary.
const SUMMARY_WINDOW: usize = 10;

/// Similarity of the candidate to one history entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityScore {
    pub generation: String,
    pub score: f64,
}

/// Result of comparing one signature against the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniquenessAnalysis {
    pub is_unique: bool,
    /// History entries with the same overall hash.
    pub duplicate_count: usize,
    /// Non-identical entries scoring above [`SIMILARITY_THRESHOLD`].
    pub similar_count: usize,
    /// Last exact duplicate, else the first similar entry.
    pub most_similar: Option<String>,
    /// One score per non-identical entry, in history order.
    pub similarity_scores: Vec<SimilarityScore>,
    /// `0.0` when a duplicate exists, else `max(0, 1 - 0.2 * similar_count)`.
    pub uniqueness_confidence: f64,
}

impl Default for UniquenessAnalysis {
    fn default() -> Self {
        Self {
            is_unique: true,
            duplicate_count: 0,
            similar_count: 0,
            most_similar: None,
            similarity_scores: Vec::new(),
            uniqueness_confidence: 1.0,
        }
    }
}

/// Whether the whole history is free of exact duplicates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GuaranteeStatus {
    #[serde(rename = "100% UNIQUE")]
    Unique,
    #[serde(rename = "DUPLICATES DETECTED")]
    DuplicatesDetected,
}

impl GuaranteeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "100% UNIQUE",
            Self::DuplicatesDetected => "DUPLICATES DETECTED",
        }
    }
}

impl fmt::Display for GuaranteeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate statistics over the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniquenessReport {
    pub total_generations: usize,
    pub unique_compositions: usize,
    pub duplicate_count: usize,
    /// Distinct genres per generation.
    pub diversity_score: f64,
    pub genre_distribution: BTreeMap<String, usize>,
    pub guarantee_status: GuaranteeStatus,
}

/// Append-only history of composition signatures for one session.
#[derive(Debug, Default)]
pub struct ZeroRepetitionGuarantee {
    composition_history: Vec<CompositionSignature>,
    generation_count: u64,
}

impl ZeroRepetitionGuarantee {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[CompositionSignature] {
        &self.composition_history
    }

    pub fn len(&self) -> usize {
        self.composition_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composition_history.is_empty()
    }

    /// Fingerprint a composition and append it to the history.
    ///
    /// Always records, duplicates included. Without a `generation_id` one is
    /// assigned from the session counter (`gen_00000`, `gen_00001`, ...).
    pub fn create_signature(
        &mut self,
        tracks: &[Track],
        genre: &str,
        tempo: u32,
        chords: Option<&[String]>,
        generation_id: Option<String>,
        parameters: Option<BTreeMap<String, serde_json::Value>>,
    ) -> CompositionSignature {
        let generation_id =
            generation_id.unwrap_or_else(|| format!("gen_{:05}", self.generation_count));
        self.generation_count += 1;

        let signature = CompositionSignature::compute(
            generation_id,
            tracks,
            genre,
            tempo,
            chords,
            parameters.unwrap_or_default(),
        );

        tracing::debug!(
            generation_id = %signature.generation_id,
            overall_hash = %signature.overall_hash,
            history_len = self.composition_history.len() + 1,
            "Composition signature recorded"
        );

        self.composition_history.push(signature.clone());
        signature
    }

    /// [`create_signature`](Self::create_signature) for a composition value.
    pub fn record(&mut self, composition: &Composition) -> CompositionSignature {
        self.create_signature(
            &composition.tracks,
            &composition.genre,
            composition.tempo,
            composition.chords(),
            composition.generation_id.clone(),
            Some(composition.parameters.clone()),
        )
    }

    /// Compare a signature against every previously stored one.
    ///
    /// When the most recent history entry is the candidate itself (same id,
    /// overall hash and timestamp) that one entry is skipped, so checking a
    /// freshly recorded signature reports on the compositions before it.
    /// Earlier entries sharing the candidate's id still count.
    pub fn check_uniqueness(
        &self,
        new_signature: &CompositionSignature,
    ) -> (bool, UniquenessAnalysis) {
        let mut analysis = UniquenessAnalysis::default();

        let earlier = match self.composition_history.split_last() {
            Some((last, rest)) if Self::is_same_record(last, new_signature) => rest,
            _ => self.composition_history.as_slice(),
        };

        for existing in earlier {
            if existing.overall_hash == new_signature.overall_hash {
                analysis.duplicate_count += 1;
                analysis.is_unique = false;
                analysis.most_similar = Some(existing.generation_id.clone());
                continue;
            }

            let score = Self::calculate_similarity(new_signature, existing);
            analysis.similarity_scores.push(SimilarityScore {
                generation: existing.generation_id.clone(),
                score,
            });

            if score > SIMILARITY_THRESHOLD {
                analysis.similar_count += 1;
                if analysis.most_similar.is_none() {
                    analysis.most_similar = Some(existing.generation_id.clone());
                }
            }
        }

        analysis.uniqueness_confidence = if analysis.duplicate_count > 0 {
            0.0
        } else {
            (1.0 - analysis.similar_count as f64 * CONFIDENCE_STEP).max(0.0)
        };

        if !analysis.is_unique {
            tracing::warn!(
                generation_id = %new_signature.generation_id,
                duplicates = analysis.duplicate_count,
                most_similar = ?analysis.most_similar,
                "Duplicate composition detected"
            );
        }

        (analysis.is_unique, analysis)
    }

    /// Whether `entry` is the very record `candidate` was cloned from.
    fn is_same_record(entry: &CompositionSignature, candidate: &CompositionSignature) -> bool {
        entry.generation_id == candidate.generation_id
            && entry.overall_hash == candidate.overall_hash
            && entry.timestamp == candidate.timestamp
    }

    /// Symmetric similarity in `[0, 1]`; 1.0 only for identical overall hashes.
    pub fn calculate_similarity(a: &CompositionSignature, b: &CompositionSignature) -> f64 {
        if a.overall_hash == b.overall_hash {
            return 1.0;
        }

        let component = |same: bool| if same { 1.0 } else { PARTIAL_CREDIT };
        let context = |same: bool| if same { CONTEXT_MATCH } else { CONTEXT_MISMATCH };

        let melody = component(a.melody_hash == b.melody_hash) * MELODY_WEIGHT;
        let harmony = component(a.harmony_hash == b.harmony_hash) * HARMONY_WEIGHT;
        let rhythm = component(a.rhythm_hash == b.rhythm_hash) * RHYTHM_WEIGHT;

        let same_genre = context(a.genre == b.genre);
        let same_tempo = context(a.tempo.abs_diff(b.tempo) <= TEMPO_TOLERANCE_BPM);
        let setting = (same_genre + same_tempo) / 2.0 * CONTEXT_WEIGHT;

        melody + harmony + rhythm + setting
    }

    pub fn generate_uniqueness_report(&self) -> UniquenessReport {
        let total = self.composition_history.len();
        let unique = self
            .composition_history
            .iter()
            .map(|s| s.overall_hash.as_str())
            .collect::<HashSet<_>>()
            .len();
        let genres = self
            .composition_history
            .iter()
            .map(|s| s.genre.as_str())
            .collect::<HashSet<_>>()
            .len();

        UniquenessReport {
            total_generations: total,
            unique_compositions: unique,
            duplicate_count: total - unique,
            diversity_score: genres as f64 / total.max(1) as f64,
            genre_distribution: self.genre_distribution(),
            guarantee_status: if unique == total {
                GuaranteeStatus::Unique
            } else {
                GuaranteeStatus::DuplicatesDetected
            },
        }
    }

    fn genre_distribution(&self) -> BTreeMap<String, usize> {
        let mut dist = BTreeMap::new();
        for sig in &self.composition_history {
            *dist.entry(sig.genre.clone()).or_insert(0) += 1;
        }
        dist
    }

    /// Human-readable listing of the last ten entries plus the report.
    pub fn get_history_summary(&self) -> String {
        if self.composition_history.is_empty() {
            return "No compositions generated yet".to_string();
        }

        let total = self.composition_history.len();
        let rule = "-".repeat(60);
        let mut summary = format!("Generation History ({total} total):\n{rule}\n");

        for sig in &self.composition_history[total.saturating_sub(SUMMARY_WINDOW)..] {
            let _ = writeln!(
                summary,
                "  {}: {} @ {} BPM",
                sig.generation_id,
                capitalize(&sig.genre),
                sig.tempo
            );
        }
        if total > SUMMARY_WINDOW {
            let _ = writeln!(summary, "  ... and {} more", total - SUMMARY_WINDOW);
        }

        let report = self.generate_uniqueness_report();
        let _ = writeln!(summary, "{rule}");
        let _ = writeln!(summary, "Uniqueness: {}", report.guarantee_status);
        let _ = writeln!(
            summary,
            "Unique compositions: {}/{}",
            report.unique_compositions, report.total_generations
        );

        summary
    }

    /// Drop all history and restart generation ids at `gen_00000`.
    pub fn clear_history(&mut self) {
        tracing::info!(cleared = self.composition_history.len(), "Composition history cleared");
        self.composition_history.clear();
        self.generation_count = 0;
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
