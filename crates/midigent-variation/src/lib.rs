//! midigent-variation: Seeded randomness for one generation session.
//!
//! Every generation starts with [`VariationEngine::initialize_generation`],
//! which reseeds the engine's own PCG32 stream from the wall clock, the
//! session id and the generation counter. All stochastic decisions the
//! composition generator makes afterwards (weighted choices, jitter,
//! shuffles) must be drawn from the same engine so that repeated prompts
//! never collapse onto identical output.
//!
//! The stream is owned by the engine rather than shared process-wide, so
//! concurrent sessions need one engine each. A single engine must not have
//! two generations in flight at once.

pub mod seed;

use std::collections::VecDeque;

use midigent_core::{MidigentError, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// How many recent seeds [`VariationEngine::get_seed_info`] reports.
pub const SEED_REPORT_WINDOW: usize = 10;

/// Jitter fraction used by [`VariationEngine::variation_factor`].
pub const DEFAULT_VARIANCE: f64 = 0.2;

/// Introspection snapshot of an engine's seeding state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedInfo {
    pub current_seed: Option<i128>,
    pub generation_count: u64,
    /// Most recent seeds, oldest first.
    pub previous_seeds: Vec<i128>,
    pub session_id: String,
}

/// Owner of the pseudo-random stream for one generation session.
pub struct VariationEngine {
    session_id: String,
    session_digest: i128,
    generation_count: u64,
    current_seed: Option<i128>,
    seed_history: VecDeque<i128>,
    rng: Pcg32,
}

impl VariationEngine {
    /// Create an engine for a session.
    ///
    /// Until the first [`initialize_generation`](Self::initialize_generation)
    /// the stream is seeded from the session digest alone.
    pub fn new(session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        let session_digest = seed::session_digest(&session_id);
        Self {
            session_id,
            session_digest,
            generation_count: 0,
            current_seed: None,
            seed_history: VecDeque::with_capacity(SEED_REPORT_WINDOW),
            rng: seed::create_rng(session_digest),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn generation_count(&self) -> u64 {
        self.generation_count
    }

    pub fn current_seed(&self) -> Option<i128> {
        self.current_seed
    }

    /// Derive and apply a fresh seed for the next generation.
    ///
    /// Must be called once per generation, before any other stochastic call.
    pub fn initialize_generation(&mut self) -> i128 {
        self.initialize_generation_at(seed::now_ns())
    }

    /// Like [`initialize_generation`](Self::initialize_generation) with an
    /// explicit clock reading in nanoseconds.
    pub fn initialize_generation_at(&mut self, timestamp_ns: i128) -> i128 {
        self.generation_count += 1;
        let seed = seed::compose_seed(timestamp_ns, self.session_digest, self.generation_count);

        self.rng = seed::create_rng(seed);
        self.current_seed = Some(seed);
        if self.seed_history.len() == SEED_REPORT_WINDOW {
            self.seed_history.pop_front();
        }
        self.seed_history.push_back(seed);

        tracing::info!(
            session_id = %self.session_id,
            generation = self.generation_count,
            seed = %seed,
            "Generation seeded"
        );

        seed
    }

    /// Jitter `base_value` by a uniform fraction drawn from `[-variance, variance]`.
    ///
    /// `variance` is not range-checked.
    pub fn get_variation_factor(&mut self, base_value: f64, variance: f64) -> f64 {
        let variation = self.random_float(-variance, variance);
        base_value * (1.0 + variation)
    }

    /// [`get_variation_factor`](Self::get_variation_factor) with
    /// [`DEFAULT_VARIANCE`].
    pub fn variation_factor(&mut self, base_value: f64) -> f64 {
        self.get_variation_factor(base_value, DEFAULT_VARIANCE)
    }

    /// Pick one option, weighted by `weights` (equiprobable when `None`).
    pub fn choose_weighted<'a, T>(
        &mut self,
        options: &'a [T],
        weights: Option<&[f64]>,
    ) -> Result<&'a T> {
        if options.is_empty() {
            return Err(MidigentError::InvalidArgument(
                "Cannot choose from an empty option list".to_string(),
            ));
        }

        let Some(weights) = weights else {
            return self.random_choice(options);
        };

        if options.len() != weights.len() {
            return Err(MidigentError::InvalidArgument(format!(
                "Options ({}) and weights ({}) must have same length",
                options.len(),
                weights.len()
            )));
        }

        let dist = WeightedIndex::<f64>::new(weights)
            .map_err(|e| MidigentError::InvalidArgument(format!("Invalid weights: {e}")))?;
        Ok(&options[dist.sample(&mut self.rng)])
    }

    /// Bernoulli draw with the given probability of `true`.
    pub fn should_trigger(&mut self, probability: f64) -> Result<bool> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(MidigentError::InvalidArgument(format!(
                "Probability must be 0.0-1.0, got {probability}"
            )));
        }
        Ok(self.rng.gen::<f64>() < probability)
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    pub fn random_int(&mut self, min: i64, max: i64) -> Result<i64> {
        if min > max {
            return Err(MidigentError::InvalidArgument(format!(
                "Empty integer range: {min} > {max}"
            )));
        }
        Ok(self.rng.gen_range(min..=max))
    }

    /// Uniform float between `min` and `max`. The bounds may be given in
    /// either order.
    pub fn random_float(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.rng.gen::<f64>()
    }

    /// Uniform pick from `options`.
    pub fn random_choice<'a, T>(&mut self, options: &'a [T]) -> Result<&'a T> {
        options.choose(&mut self.rng).ok_or_else(|| {
            MidigentError::InvalidArgument("Cannot choose from an empty option list".to_string())
        })
    }

    /// Shuffled copy of `items`; the input is left untouched.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut shuffled = items.to_vec();
        shuffled.shuffle(&mut self.rng);
        shuffled
    }

    /// The underlying stream, for generators that sample distributions directly.
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn get_seed_info(&self) -> SeedInfo {
        SeedInfo {
            current_seed: self.current_seed,
            generation_count: self.generation_count,
            previous_seeds: self.seed_history.iter().copied().collect(),
            session_id: self.session_id.clone(),
        }
    }

    /// Forget seed history and restart the generation counter.
    pub fn clear_history(&mut self) {
        self.generation_count = 0;
        self.current_seed = None;
        self.seed_history.clear();
        self.rng = seed::create_rng(self.session_digest);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seeded(session: &str) -> VariationEngine {
        let mut engine = VariationEngine::new(session);
        engine.initialize_generation();
        engine
    }

    #[test]
    fn seeds_are_distinct_over_many_generations() {
        let mut engine = VariationEngine::new("session-distinct");
        let seeds: HashSet<i128> = (0..1_000).map(|_| engine.initialize_generation()).collect();
        assert_eq!(seeds.len(), 1_000);
        assert_eq!(engine.generation_count(), 1_000);
    }

    #[test]
    fn seeds_differ_even_on_identical_clock_readings() {
        let mut engine = VariationEngine::new("session-clock");
        let first = engine.initialize_generation_at(1_000);
        let second = engine.initialize_generation_at(1_000);
        assert_eq!(second - first, seed::GENERATION_STRIDE);
    }

    #[test]
    fn seed_follows_additive_formula() {
        let mut engine = VariationEngine::new("formula");
        let seed = engine.initialize_generation_at(5_000);
        assert_eq!(seed, 5_000 + seed::session_digest("formula") + 1_000_000);
        assert_eq!(engine.current_seed(), Some(seed));
    }

    #[test]
    fn same_seed_replays_same_stream() {
        let mut a = VariationEngine::new("replay");
        let mut b = VariationEngine::new("replay");
        a.initialize_generation_at(42);
        b.initialize_generation_at(42);

        let xs: Vec<i64> = (0..20).map(|_| a.random_int(0, 1_000).unwrap()).collect();
        let ys: Vec<i64> = (0..20).map(|_| b.random_int(0, 1_000).unwrap()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn zero_weights_never_win() {
        let mut engine = seeded("weights");
        let options = ['a', 'b', 'c'];
        for _ in 0..1_000 {
            let picked = engine
                .choose_weighted(&options, Some(&[0.0, 0.0, 1.0][..]))
                .unwrap();
            assert_eq!(*picked, 'c');
        }
    }

    #[test]
    fn unweighted_choice_returns_an_option() {
        let mut engine = seeded("unweighted");
        let options = [1, 2, 3];
        let picked = engine.choose_weighted(&options, None).unwrap();
        assert!(options.contains(picked));
    }

    #[test]
    fn mismatched_weights_are_rejected() {
        let mut engine = seeded("mismatch");
        let result = engine.choose_weighted(&['a', 'b', 'c'], Some(&[0.5, 0.5][..]));
        assert!(matches!(result, Err(MidigentError::InvalidArgument(_))));
    }

    #[test]
    fn degenerate_weights_are_rejected() {
        let mut engine = seeded("degenerate");
        let all_zero = engine.choose_weighted(&['a', 'b'], Some(&[0.0, 0.0][..]));
        assert!(matches!(all_zero, Err(MidigentError::InvalidArgument(_))));

        let negative = engine.choose_weighted(&['a', 'b'], Some(&[1.0, -1.0][..]));
        assert!(matches!(negative, Err(MidigentError::InvalidArgument(_))));

        let empty: [char; 0] = [];
        assert!(matches!(
            engine.choose_weighted(&empty, None),
            Err(MidigentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn trigger_extremes_are_certain() {
        let mut engine = seeded("trigger");
        for _ in 0..10_000 {
            assert!(!engine.should_trigger(0.0).unwrap());
        }
        for _ in 0..10_000 {
            assert!(engine.should_trigger(1.0).unwrap());
        }
    }

    #[test]
    fn trigger_rejects_out_of_range_probability() {
        let mut engine = seeded("range");
        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                engine.should_trigger(p),
                Err(MidigentError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn variation_factor_stays_within_variance() {
        let mut engine = seeded("jitter");
        for _ in 0..1_000 {
            let v = engine.get_variation_factor(100.0, 0.2);
            assert!((80.0..=120.0).contains(&v), "{v} outside ±20%");
        }
        assert_eq!(engine.get_variation_factor(100.0, 0.0), 100.0);
    }

    #[test]
    fn default_variation_is_twenty_percent() {
        assert_eq!(DEFAULT_VARIANCE, 0.2);

        let mut a = VariationEngine::new("default-variance");
        let mut b = VariationEngine::new("default-variance");
        a.initialize_generation_at(7);
        b.initialize_generation_at(7);
        for _ in 0..1_000 {
            let v = a.variation_factor(50.0);
            assert_eq!(v, b.get_variation_factor(50.0, 0.2));
            assert!((40.0..=60.0).contains(&v), "{v} outside ±20%");
        }
    }

    #[test]
    fn random_int_is_inclusive() {
        let mut engine = seeded("ints");
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            let n = engine.random_int(1, 3).unwrap();
            assert!((1..=3).contains(&n));
            seen.insert(n);
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(engine.random_int(7, 7).unwrap(), 7);
        assert!(engine.random_int(5, 4).is_err());
    }

    #[test]
    fn random_float_stays_in_bounds() {
        let mut engine = seeded("floats");
        for _ in 0..1_000 {
            let x = engine.random_float(-2.0, 3.0);
            assert!((-2.0..=3.0).contains(&x));
        }
    }

    #[test]
    fn shuffle_returns_permutation_without_mutating_input() {
        let mut engine = seeded("shuffle");
        let items: Vec<u32> = (0..32).collect();
        let shuffled = engine.shuffle(&items);

        assert_eq!(items, (0..32).collect::<Vec<_>>());
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);
    }

    #[test]
    fn seed_info_reports_last_ten_seeds() {
        let mut engine = VariationEngine::new("info");
        let seeds: Vec<i128> = (0..15)
            .map(|i| engine.initialize_generation_at(i * 10))
            .collect();

        let info = engine.get_seed_info();
        assert_eq!(info.generation_count, 15);
        assert_eq!(info.current_seed, seeds.last().copied());
        assert_eq!(info.previous_seeds, seeds[5..].to_vec());
        assert_eq!(info.session_id, "info");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["generation_count"], 15);
    }

    #[test]
    fn clear_history_restarts_counter() {
        let mut engine = seeded("clear");
        engine.clear_history();
        let info = engine.get_seed_info();
        assert_eq!(info.generation_count, 0);
        assert!(info.previous_seeds.is_empty());
        assert_eq!(info.current_seed, None);
    }
}
