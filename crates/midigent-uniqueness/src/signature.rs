//! Composition signature value object.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use midigent_core::{Composition, Track};
use serde::{Deserialize, Serialize};

use crate::hash;

/// Fingerprint of one composition.
///
/// Equality and hashing consider `overall_hash` only: two signatures with the
/// same key describe the same composition whatever their ids or timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionSignature {
    pub generation_id: String,
    pub genre: String,
    pub tempo: u32,
    pub melody_hash: String,
    pub harmony_hash: String,
    pub rhythm_hash: String,
    pub structure_hash: String,
    pub overall_hash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl CompositionSignature {
    /// Fingerprint raw composition parts without recording them anywhere.
    pub fn compute(
        generation_id: impl Into<String>,
        tracks: &[Track],
        genre: &str,
        tempo: u32,
        chords: Option<&[String]>,
        parameters: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        let melody_hash = hash::melody_hash(tracks);
        let harmony_hash = hash::harmony_hash(chords);
        let rhythm_hash = hash::rhythm_hash(tracks);
        let structure_hash = hash::structure_hash(genre, tempo, tracks.len());
        let overall_hash =
            hash::overall_hash(&melody_hash, &harmony_hash, &rhythm_hash, &structure_hash);

        Self {
            generation_id: generation_id.into(),
            genre: genre.to_string(),
            tempo,
            melody_hash,
            harmony_hash,
            rhythm_hash,
            structure_hash,
            overall_hash,
            timestamp: Utc::now(),
            parameters,
        }
    }

    /// Fingerprint a composition value.
    pub fn of(generation_id: impl Into<String>, composition: &Composition) -> Self {
        Self::compute(
            generation_id,
            &composition.tracks,
            &composition.genre,
            composition.tempo,
            composition.chords(),
            composition.parameters.clone(),
        )
    }
}

impl PartialEq for CompositionSignature {
    fn eq(&self, other: &Self) -> bool {
        self.overall_hash == other.overall_hash
    }
}

impl Eq for CompositionSignature {}

impl Hash for CompositionSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.overall_hash.hash(state);
    }
}
