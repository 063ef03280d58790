//! Genre rule table.
//!
//! The table is authored data, embedded from `data/genres.json` and parsed
//! once on first use. A sidecar file with the same schema can replace it.
//!
//! The embedded `ambient` entry spells its forbidden list
//! `forbiddentechniques`. The key is kept as authored: it lands in
//! [`GenreRule::unrecognized`] and `ambient` reports no forbidden
//! techniques. Loading logs a warning for every such key.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use midigent_core::{MidigentError, Result};
use serde::{Deserialize, Serialize};

const BUILTIN_TABLE: &str = include_str!("../data/genres.json");

static BUILTIN: OnceLock<GenreRuleTable> = OnceLock::new();

/// Conventions for a single genre.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreRule {
    /// Inclusive BPM range.
    pub tempo_range: (u32, u32),
    #[serde(default)]
    pub common_keys: Vec<String>,
    #[serde(default)]
    pub chord_progressions: Vec<Vec<String>>,
    /// Notes per bar per track, inclusive.
    pub note_density: (f64, f64),
    pub rhythm_regularity: (f64, f64),
    pub dissonance_tolerance: (f64, f64),
    #[serde(default)]
    pub essential_characteristics: Vec<String>,
    #[serde(default)]
    pub forbidden_techniques: Vec<String>,
    /// Keys present in the source data that no field above claims.
    #[serde(flatten)]
    pub unrecognized: BTreeMap<String, serde_json::Value>,
}

impl GenreRule {
    pub fn tempo_in_range(&self, tempo: u32) -> bool {
        let (min, max) = self.tempo_range;
        (min..=max).contains(&tempo)
    }

    pub fn density_in_range(&self, density: f64) -> bool {
        let (min, max) = self.note_density;
        min <= density && density <= max
    }

    /// Whether `chords` opens with one of the canonical progressions.
    pub fn follows_canonical_progression(&self, chords: &[String]) -> bool {
        self.chord_progressions
            .iter()
            .any(|prog| !prog.is_empty() && chords.starts_with(prog))
    }

    fn check_ranges(&self, genre: &str) -> Result<()> {
        let ranges = [
            ("tempo_range", f64::from(self.tempo_range.0), f64::from(self.tempo_range.1)),
            ("note_density", self.note_density.0, self.note_density.1),
            ("rhythm_regularity", self.rhythm_regularity.0, self.rhythm_regularity.1),
            ("dissonance_tolerance", self.dissonance_tolerance.0, self.dissonance_tolerance.1),
        ];
        for (field, min, max) in ranges {
            if min > max {
                return Err(MidigentError::GenreTable(format!(
                    "{genre}.{field}: min {min} exceeds max {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Immutable mapping from lower-case genre name to its conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GenreRuleTable {
    genres: BTreeMap<String, GenreRule>,
}

impl GenreRuleTable {
    /// The embedded table, parsed on first access.
    pub fn builtin() -> &'static GenreRuleTable {
        BUILTIN.get_or_init(|| {
            GenreRuleTable::from_json(BUILTIN_TABLE).expect("embedded genre table should be valid")
        })
    }

    /// Parse and check a table in the embedded JSON schema.
    ///
    /// Genre names are lower-cased so lookups stay case-insensitive.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, GenreRule> = serde_json::from_str(json)?;

        let mut genres = BTreeMap::new();
        for (name, rule) in raw {
            let name = name.to_lowercase();
            rule.check_ranges(&name)?;
            for key in rule.unrecognized.keys() {
                tracing::warn!(genre = %name, key = %key, "Unrecognized genre table key ignored");
            }
            if genres.insert(name.clone(), rule).is_some() {
                return Err(MidigentError::GenreTable(format!(
                    "genre {name} defined more than once"
                )));
            }
        }

        Ok(Self { genres })
    }

    /// Load a sidecar table from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), genres = table.len(), "Genre table loaded");
        Ok(table)
    }

    /// Case-insensitive lookup. `root.sub` falls back to `root` when the
    /// sub-genre has no entry of its own.
    pub fn get(&self, genre: &str) -> Option<&GenreRule> {
        let genre = genre.to_lowercase();
        self.genres.get(&genre).or_else(|| {
            genre
                .split_once('.')
                .and_then(|(root, _)| self.genres.get(root))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.genres.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenreRule)> {
        self.genres.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

impl Default for GenreRuleTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
