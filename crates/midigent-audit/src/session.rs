//! Generation sessions.
//!
//! A [`GenerationSession`] owns one variation engine and one composition
//! history. Both sit behind a single mutex: a generation seeds the engine,
//! runs the caller's generator against it, fingerprints the result and
//! scans the history without another generation interleaving.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use midigent_authenticity::{
    AuthenticityReport, FixCategory, GenreAuthenticityValidator, GenreRuleTable,
};
use midigent_core::{Composition, MidigentConfig};
use midigent_uniqueness::{
    CompositionSignature, UniquenessAnalysis, UniquenessReport, ZeroRepetitionGuarantee,
};
use midigent_variation::{SeedInfo, VariationEngine};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AuditError, Result};

/// Everything the pipeline learned about one generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub seed: i128,
    pub signature: CompositionSignature,
    pub is_unique: bool,
    pub uniqueness: UniquenessAnalysis,
    pub authenticity: AuthenticityReport,
    pub fixes: BTreeMap<FixCategory, String>,
}

struct SessionState {
    variation: VariationEngine,
    guarantee: ZeroRepetitionGuarantee,
}

/// One caller session: seeded randomness, history and genre rules.
pub struct GenerationSession {
    session_id: String,
    rules: GenreRuleTable,
    state: Mutex<SessionState>,
}

impl GenerationSession {
    /// Start a session scored against the embedded genre table.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::with_rules(session_id, GenreRuleTable::builtin().clone())
    }

    pub fn with_rules(session_id: impl Into<String>, rules: GenreRuleTable) -> Self {
        let session_id = session_id.into();
        tracing::info!(session_id = %session_id, genres = rules.len(), "Generation session started");
        Self {
            state: Mutex::new(SessionState {
                variation: VariationEngine::new(session_id.clone()),
                guarantee: ZeroRepetitionGuarantee::new(),
            }),
            session_id,
            rules,
        }
    }

    /// Build a session from configuration: the configured session id (or a
    /// fresh UUID) and the sidecar genre table when one is set.
    pub fn from_config(config: &MidigentConfig) -> Result<Self> {
        let session_id = config
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let rules = match &config.genre_table_path {
            Some(path) => GenreRuleTable::from_path(path)?,
            None => GenreRuleTable::builtin().clone(),
        };
        Ok(Self::with_rules(session_id, rules))
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn rules(&self) -> &GenreRuleTable {
        &self.rules
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Every mutation leaves the state consistent, so a poisoned lock is
        // still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a generation, run `generator` with the seeded engine, then
    /// fingerprint and score what it produced.
    ///
    /// The composition is recorded in the history even if it duplicates an
    /// earlier one.
    pub fn generate<F>(&self, generator: F) -> Result<GenerationOutcome>
    where
        F: FnOnce(&mut VariationEngine) -> midigent_core::Result<Composition>,
    {
        let mut state = self.lock();
        let seed = state.variation.initialize_generation();
        let composition = generator(&mut state.variation).map_err(AuditError::Generator)?;
        Ok(self.evaluate(&mut state, seed, &composition))
    }

    /// Score a composition produced outside the session.
    ///
    /// A generation seed is still drawn so the session's seed history lines
    /// up with its composition history.
    pub fn audit(&self, composition: &Composition) -> GenerationOutcome {
        let mut state = self.lock();
        let seed = state.variation.initialize_generation();
        self.evaluate(&mut state, seed, composition)
    }

    fn evaluate(
        &self,
        state: &mut SessionState,
        seed: i128,
        composition: &Composition,
    ) -> GenerationOutcome {
        let signature = state.guarantee.record(composition);
        let (is_unique, uniqueness) = state.guarantee.check_uniqueness(&signature);

        let authenticity = GenreAuthenticityValidator::new(&self.rules).validate(composition);
        let fixes =
            GenreAuthenticityValidator::suggest_genre_fixes(&authenticity, &composition.parameters);

        tracing::info!(
            session_id = %self.session_id,
            generation_id = %signature.generation_id,
            is_unique,
            confidence = uniqueness.uniqueness_confidence,
            authenticity = authenticity.authenticity_score,
            "Generation evaluated"
        );

        GenerationOutcome {
            seed,
            signature,
            is_unique,
            uniqueness,
            authenticity,
            fixes,
        }
    }

    pub fn uniqueness_report(&self) -> UniquenessReport {
        self.lock().guarantee.generate_uniqueness_report()
    }

    pub fn history_summary(&self) -> String {
        self.lock().guarantee.get_history_summary()
    }

    pub fn seed_info(&self) -> SeedInfo {
        self.lock().variation.get_seed_info()
    }

    /// Forget all compositions and seeds recorded so far.
    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.guarantee.clear_history();
        state.variation.clear_history();
    }
}
