//! Feature hashing for composition fingerprints.
//!
//! Component hashes are 64-bit FNV-1a over the comma-joined textual form of
//! a feature sequence, rendered as 16 hex characters. The overall key is the
//! BLAKE3 hash of the four component hashes, truncated to 24 hex characters.

use std::fmt::Display;

use midigent_core::Track;

/// Melody hash used when no track carries any notes.
pub const NO_MELODY: &str = "nomelody";
/// Harmony hash used when no chord progression was supplied.
pub const NO_HARMONY: &str = "noharmony";

const MELODY_WINDOW: usize = 64;
const HARMONY_WINDOW: usize = 32;
const RHYTHM_WINDOW: usize = 32;
const OVERALL_HEX_LEN: usize = 24;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash a sequence by its comma-joined textual form.
pub fn hash_sequence<T: Display>(sequence: &[T]) -> String {
    let joined = sequence
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{:016x}", fnv1a(joined.as_bytes()))
}

/// Pitches of the first 64 notes of the busiest track.
///
/// Ties go to the earliest track.
pub fn melody_hash(tracks: &[Track]) -> String {
    let mut main: Option<&Track> = None;
    for track in tracks {
        if track.note_count() > main.map_or(0, Track::note_count) {
            main = Some(track);
        }
    }

    match main {
        Some(track) => {
            let pitches: Vec<u8> = track
                .notes
                .iter()
                .take(MELODY_WINDOW)
                .map(|n| n.pitch)
                .collect();
            hash_sequence(&pitches)
        }
        None => NO_MELODY.to_string(),
    }
}

/// The first 32 chord symbols.
pub fn harmony_hash(chords: Option<&[String]>) -> String {
    match chords {
        Some(chords) if !chords.is_empty() => {
            hash_sequence(&chords[..chords.len().min(HARMONY_WINDOW)])
        }
        _ => NO_HARMONY.to_string(),
    }
}

/// Durations in hundredths of a beat (truncated), up to 32 notes per track,
/// first 32 values overall.
pub fn rhythm_hash(tracks: &[Track]) -> String {
    let rhythms: Vec<i64> = tracks
        .iter()
        .flat_map(|t| t.notes.iter().take(RHYTHM_WINDOW))
        .map(|n| (n.duration * 100.0) as i64)
        .take(RHYTHM_WINDOW)
        .collect();
    hash_sequence(&rhythms)
}

pub fn structure_hash(genre: &str, tempo: u32, track_count: usize) -> String {
    hash_sequence(&[genre.to_string(), tempo.to_string(), track_count.to_string()])
}

/// Deduplication key over the four component hashes.
pub fn overall_hash(melody: &str, harmony: &str, rhythm: &str, structure: &str) -> String {
    let combined = format!("{melody}_{harmony}_{rhythm}_{structure}");
    let hex = blake3::hash(combined.as_bytes()).to_hex();
    hex[..OVERALL_HEX_LEN].to_string()
}
