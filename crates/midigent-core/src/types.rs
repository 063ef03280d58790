//! Composition value types exchanged with the generation pipeline.
//!
//! The analysis crates never build these themselves: a composition arrives
//! from the (external) note/harmony/rhythm generator and is only read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single pitched note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// MIDI pitch (0–127).
    pub pitch: u8,
    /// Length in beats.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// MIDI velocity (0–127).
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: u8, duration: f64, velocity: u8) -> Self {
        Self {
            pitch,
            duration,
            velocity,
        }
    }
}

fn default_duration() -> f64 {
    0.5
}

fn default_velocity() -> u8 {
    100
}

/// One instrument track: an ordered list of notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Track {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(name: impl Into<String>, notes: Vec<Note>) -> Self {
        Self {
            name: name.into(),
            notes,
        }
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }
}

/// A finished multi-track composition plus the request fields echoed with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Composition {
    pub genre: String,
    /// Tempo in BPM.
    pub tempo: u32,
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Chord symbols in playing order, if the generator produced any.
    #[serde(default)]
    pub chord_progression: Option<Vec<String>>,
    /// MIDI pitches of the scale the generator drew from.
    #[serde(default)]
    pub scale_notes: Vec<u8>,
    /// Caller-assigned identifier; auto-assigned on fingerprinting when absent.
    #[serde(default)]
    pub generation_id: Option<String>,
    /// Extra generation parameters, carried through to the fingerprint.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl Composition {
    pub fn new(genre: impl Into<String>, tempo: u32, tracks: Vec<Track>) -> Self {
        Self {
            genre: genre.into(),
            tempo,
            tracks,
            chord_progression: None,
            scale_notes: Vec::new(),
            generation_id: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_chords<S: Into<String>>(mut self, chords: impl IntoIterator<Item = S>) -> Self {
        self.chord_progression = Some(chords.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_scale(mut self, scale_notes: Vec<u8>) -> Self {
        self.scale_notes = scale_notes;
        self
    }

    /// Total note count across all tracks.
    pub fn total_notes(&self) -> usize {
        self.tracks.iter().map(Track::note_count).sum()
    }

    pub fn chords(&self) -> Option<&[String]> {
        self.chord_progression.as_deref()
    }
}
