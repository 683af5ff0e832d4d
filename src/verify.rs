//! # Verify — Existence Simulation
//!
//! A probabilistic stand-in for a real number-verification service: each call
//! is an independent Bernoulli trial with a fixed probability, regardless of
//! the number's content. The RNG is injected so tests run on a seeded stream
//! and check the hit rate statistically rather than bit-exactly.

use rand::Rng;

/// Share of synthesized numbers that "exist" under the default simulation.
pub const DEFAULT_EXISTENCE_PROBABILITY: f64 = 0.3;

pub struct ExistenceSimulator<R: Rng> {
    probability: f64,
    rng: R,
}

impl<R: Rng> ExistenceSimulator<R> {
    pub fn new(rng: R) -> Self {
        Self::with_probability(DEFAULT_EXISTENCE_PROBABILITY, rng)
    }

    /// `probability` must lie in `[0, 1]`.
    pub fn with_probability(probability: f64, rng: R) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability),
            "existence probability {} outside [0, 1]",
            probability
        );
        ExistenceSimulator { probability, rng }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Decide whether `number` "exists". The argument is unused today; it
    /// keeps the signature compatible with a real verifier.
    pub fn verify(&mut self, _number: &str) -> bool {
        self.rng.random_bool(self.probability)
    }
}

impl ExistenceSimulator<rand::rngs::StdRng> {
    pub fn from_os_rng() -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::from_os_rng())
    }
}
