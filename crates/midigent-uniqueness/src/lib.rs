//! midigent-uniqueness: Composition fingerprints and repetition tracking.
//!
//! Each finished composition is reduced to a [`CompositionSignature`]: four
//! short feature hashes (melody, harmony, rhythm, structure) plus an overall
//! BLAKE3-derived key. A [`ZeroRepetitionGuarantee`] keeps every signature
//! created in a session and reports exact and near duplicates against that
//! history. Detection is advisory; nothing is ever rejected.

pub mod guarantee;
pub mod hash;
pub mod signature;

pub use guarantee::{
    GuaranteeStatus, SimilarityScore, UniquenessAnalysis, UniquenessReport,
    ZeroRepetitionGuarantee,
};
pub use signature::CompositionSignature;
