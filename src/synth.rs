//! # Synth — Plausible Phone Number Synthesis
//!
//! Produces syntactically valid, run-unique phone number strings for a
//! configured country: a uniformly drawn area code, a uniformly drawn local
//! number of the profile's digit length, formatted `"{prefix} {area} {local}"`.
//!
//! ## Uniqueness
//!
//! A per-run set holds every issued string; collisions trigger a redraw. Two
//! guards keep the redraw loop from running forever on small number spaces:
//! an upfront capacity check (issued count vs. `area_codes × digit span`)
//! that fails fast once a country is fully consumed, and a bounded redraw
//! count as a backstop against pathological clustering. Both surface as
//! `SynthesisError::ExhaustedNumberSpace`.

use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::countries::{CountryProfile, CountryStore};
use crate::local_number_span;

/// Redraws attempted per call before giving up. With the capacity fast-fail
/// in place this only trips when the remaining space is badly clustered.
pub const MAX_REDRAWS: u32 = 1024;

/// One synthesized number and the parts it was assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedNumber {
    pub full: String,
    pub country: String,
    pub area_code: u32,
    pub local_number: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("no profile registered for country {0:?}")]
    UnknownCountry(String),
    #[error("number space for {country:?} exhausted ({issued} of {capacity} issued)")]
    ExhaustedNumberSpace {
        country: String,
        issued: u64,
        capacity: u64,
    },
}

/// Per-run synthesizer. Owns the uniqueness set; dies with the run.
pub struct Synthesizer<'a, R: Rng> {
    store: &'a CountryStore,
    issued: HashSet<String>,
    issued_per_country: HashMap<String, u64>,
    rng: R,
}

/// Theoretical number-space size for a profile: every (area code, local
/// number) pair, local numbers having exactly `phone_length` digits.
pub fn capacity(profile: &CountryProfile) -> u64 {
    let (lo, hi) = local_number_span(profile.phone_length);
    (profile.area_codes.len() as u64).saturating_mul(hi - lo)
}

impl<'a, R: Rng> Synthesizer<'a, R> {
    pub fn with_rng(store: &'a CountryStore, rng: R) -> Self {
        Synthesizer {
            store,
            issued: HashSet::new(),
            issued_per_country: HashMap::new(),
            rng,
        }
    }

    pub fn store(&self) -> &CountryStore {
        self.store
    }

    /// Count of numbers issued so far across all countries this run.
    pub fn issued_count(&self) -> u64 {
        self.issued.len() as u64
    }

    /// Synthesize one run-unique number for `country`.
    pub fn synthesize(&mut self, country: &str) -> Result<SynthesizedNumber, SynthesisError> {
        let profile = self
            .store
            .get(country)
            .ok_or_else(|| SynthesisError::UnknownCountry(country.to_string()))?;

        let capacity = capacity(profile);
        let issued = self
            .issued_per_country
            .get(country)
            .copied()
            .unwrap_or_default();
        if issued >= capacity {
            return Err(SynthesisError::ExhaustedNumberSpace {
                country: country.to_string(),
                issued,
                capacity,
            });
        }

        let (lo, hi) = local_number_span(profile.phone_length);
        for _ in 0..MAX_REDRAWS {
            let idx = self.rng.random_range(0..profile.area_codes.len());
            let area_code = profile.area_codes[idx];
            let local_number = self.rng.random_range(lo..hi);
            let full = format!("{} {} {}", profile.prefix, area_code, local_number);

            if self.issued.insert(full.clone()) {
                *self.issued_per_country.entry(country.to_string()).or_default() += 1;
                return Ok(SynthesizedNumber {
                    full,
                    country: country.to_string(),
                    area_code,
                    local_number,
                });
            }
        }

        warn!(country, issued, capacity, "redraw bound hit before finding a novel number");
        Err(SynthesisError::ExhaustedNumberSpace {
            country: country.to_string(),
            issued,
            capacity,
        })
    }
}

impl<'a> Synthesizer<'a, rand::rngs::StdRng> {
    /// OS-seeded synthesizer for production use.
    pub fn new(store: &'a CountryStore) -> Self {
        use rand::SeedableRng;
        Self::with_rng(store, rand::rngs::StdRng::from_os_rng())
    }
}
