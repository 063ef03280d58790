//! Seed derivation for generation sessions.
//!
//! A generation seed is the sum of three entropy sources:
//! `timestamp_ns + session_digest + generation_count * 1_000_000`.
//! The counter term keeps seeds distinct for calls landing on the same
//! clock reading; the session digest separates sessions started together.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Seed spacing contributed by each generation in a session.
pub const GENERATION_STRIDE: i128 = 1_000_000;

/// Numeric digest of a session id: the first 8 hex digits of its BLAKE3 hash.
pub fn session_digest(session_id: &str) -> i128 {
    let hash = blake3::hash(session_id.as_bytes());
    let bytes: [u8; 4] = [
        hash.as_bytes()[0],
        hash.as_bytes()[1],
        hash.as_bytes()[2],
        hash.as_bytes()[3],
    ];
    // Big-endian so the value equals the leading 8 hex characters.
    i128::from(u32::from_be_bytes(bytes))
}

/// Combine the entropy sources into a generation seed.
pub fn compose_seed(timestamp_ns: i128, session_digest: i128, generation_count: u64) -> i128 {
    timestamp_ns + session_digest + i128::from(generation_count) * GENERATION_STRIDE
}

/// Nanoseconds since the Unix epoch. A clock set before 1970 reads as 0.
pub fn now_ns() -> i128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i128)
        .unwrap_or(0)
}

/// Creates a PCG32 stream from a generation seed.
///
/// The 128-bit seed is folded to 64 bits by XOR-ing its halves before it is
/// expanded into PCG32 state.
pub fn create_rng(seed: i128) -> Pcg32 {
    let bits = seed as u128;
    let folded = (bits as u64) ^ ((bits >> 64) as u64);
    Pcg32::seed_from_u64(folded)
}
