//! Property-based tests for dialforge's core invariants.
//!
//! These tests use the `proptest` framework to verify invariants across many
//! randomly generated inputs rather than hand-picked examples:
//!
//! - **Synth**: every number in a run is distinct and matches the profile's
//!   `"{prefix} {area} {local}"` shape.
//! - **Batch**: `valid + invalid == total <= size` for every completed batch.
//! - **Analyzer**: memoization — a repeated input never re-invokes the
//!   provider and always returns the identical record.
//! - **History**: snapshot save/load is a field-for-field round trip.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use dialforge::analyzer::{AnalysisRecord, LineType, PhoneAnalyzer, RequestContext};
use dialforge::batch::{self, NeverStop, NoopPacer};
use dialforge::countries::{CountryProfile, CountryStore};
use dialforge::history::{HistoryEntry, HistoryStore};
use dialforge::synth::Synthesizer;
use dialforge::verify::ExistenceSimulator;
use dialforge::{MetadataProvider, ParseFailure, ParsedNumber, ProviderFault};

fn spain_store() -> CountryStore {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "España".to_string(),
        CountryProfile {
            prefix: "+34".into(),
            area_codes: vec![91, 93],
            phone_length: 8,
        },
    );
    CountryStore::from_profiles(profiles).unwrap()
}

proptest! {
    /// Every number synthesized in one run is pairwise distinct and has the
    /// shape `+34 (91|93) \d{8}` for the two-area-code Spanish profile.
    #[test]
    fn prop_synthesis_unique_and_well_formed(seed in any::<u64>(), n in 1usize..300) {
        let store = spain_store();
        let mut synth = Synthesizer::with_rng(&store, StdRng::seed_from_u64(seed));
        let mut seen = HashSet::new();

        for _ in 0..n {
            let number = synth.synthesize("España").unwrap();
            prop_assert!(seen.insert(number.full.clone()), "duplicate {}", number.full);

            let parts: Vec<&str> = number.full.split(' ').collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert_eq!(parts[0], "+34");
            prop_assert!(parts[1] == "91" || parts[1] == "93");
            prop_assert_eq!(parts[2].len(), 8);
            prop_assert!(parts[2].bytes().all(|b| b.is_ascii_digit()));
            prop_assert!(!parts[2].starts_with('0'));
        }
    }

    /// For any batch, counted outcomes sum to the total and the total never
    /// exceeds the requested size.
    #[test]
    fn prop_batch_counts_sum_to_total(seed in any::<u64>(), size in 0u64..64) {
        let store = spain_store();
        let mut synth = Synthesizer::with_rng(&store, StdRng::seed_from_u64(seed));
        let mut simulator = ExistenceSimulator::new(StdRng::seed_from_u64(seed ^ 0xBEEF));
        let mut sink = |_p: batch::BatchProgress<'_>| {};

        let stats = batch::run_batch(
            &mut synth,
            &mut simulator,
            "España",
            size,
            Duration::ZERO,
            &NoopPacer,
            &NeverStop,
            &mut sink,
        ).unwrap();

        prop_assert_eq!(stats.valid_count + stats.invalid_count, stats.total_generated);
        prop_assert!(stats.total_generated <= size);
    }
}

// == Analyzer Memoization ======================================================

/// Provider that accepts any `+<digits>` input and counts invocations.
struct CountingProvider {
    calls: Cell<u64>,
}

impl CountingProvider {
    fn new() -> Self {
        CountingProvider { calls: Cell::new(0) }
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl MetadataProvider for CountingProvider {
    fn parse(&self, raw: &str) -> Result<ParsedNumber, ParseFailure> {
        self.tick();
        Ok(ParsedNumber {
            canonical: raw.to_string(),
            national: raw.trim_start_matches('+').to_string(),
            international: raw.to_string(),
            calling_code: 34,
        })
    }

    fn is_valid(&self, _c: &str) -> Result<bool, ProviderFault> {
        self.tick();
        Ok(true)
    }

    fn is_possible(&self, _c: &str) -> Result<bool, ProviderFault> {
        self.tick();
        Ok(true)
    }

    fn number_type(&self, _c: &str) -> Result<String, ProviderFault> {
        self.tick();
        Ok("mobile".into())
    }

    fn country_for(&self, _c: &str) -> Result<String, ProviderFault> {
        self.tick();
        Ok("España".into())
    }

    fn carrier_for(&self, _c: &str) -> Result<String, ProviderFault> {
        self.tick();
        Ok("Movistar".into())
    }

    fn time_zones_for(&self, _c: &str) -> Result<Vec<String>, ProviderFault> {
        self.tick();
        Ok(vec!["Europe/Madrid".into()])
    }
}

proptest! {
    /// Analyzing the same input twice returns identical records and makes no
    /// provider calls on the second pass, whatever the input string.
    #[test]
    fn prop_repeat_analysis_is_memoized(digits in "[0-9]{1,12}") {
        let raw = format!("+{}", digits);
        let mut analyzer = PhoneAnalyzer::new(CountingProvider::new());

        let ctx_a = RequestContext::new("first", Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let ctx_b = RequestContext::new("second", Utc.timestamp_opt(1_800_000_000, 0).unwrap());

        let first = analyzer.analyze(&raw, &ctx_a).unwrap();
        let calls_after_first = analyzer.provider().calls.get();
        let second = analyzer.analyze(&raw, &ctx_b).unwrap();
        let calls_after_second = analyzer.provider().calls.get();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(second.requesting_user.as_str(), "first");
        prop_assert_eq!(calls_after_first, calls_after_second);
    }
}

// == History Round Trip ========================================================

fn arb_line_type() -> impl Strategy<Value = LineType> {
    prop::sample::select(vec![
        LineType::Mobile,
        LineType::FixedLine,
        LineType::FixedOrMobile,
        LineType::TollFree,
        LineType::PremiumRate,
        LineType::SharedCost,
        LineType::Voip,
        LineType::Personal,
        LineType::Pager,
        LineType::Uan,
        LineType::Unknown,
    ])
}

prop_compose! {
    fn arb_record()(
        input in "[+][0-9]{4,14}",
        country in "[A-Za-zñÑáéíóú ]{1,16}",
        carrier in "[A-Za-z]{0,10}",
        code in 1u16..999,
        zones in prop::collection::vec("[A-Za-z_/]{3,20}", 0..4),
        line_type in arb_line_type(),
        valid in any::<bool>(),
        possible in any::<bool>(),
        secs in 0i64..2_000_000_000,
        user in "[a-z]{1,12}",
    ) -> AnalysisRecord {
        AnalysisRecord {
            original_input: input.clone(),
            formatted_national: input.trim_start_matches('+').to_string(),
            formatted_international: input,
            country_name: country,
            country_calling_code: code,
            carrier_name: carrier,
            time_zones: zones,
            line_type,
            is_valid: valid,
            is_possible: possible,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            requesting_user: user,
        }
    }
}

fn arb_entry() -> impl Strategy<Value = HistoryEntry> {
    prop_oneof![
        arb_record().prop_map(HistoryEntry::Record),
        "[ -~]{1,40}".prop_map(|error| HistoryEntry::Failure { error }),
    ]
}

proptest! {
    /// Saving and reloading a snapshot reproduces the same ordered sequence
    /// of entries, field for field, for any mix of records and failures.
    #[test]
    fn prop_history_snapshot_roundtrip(entries in prop::collection::vec(arb_entry(), 0..12)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::new();
        for entry in &entries {
            store.record(entry.clone());
        }
        store.save(&path).unwrap();

        let loaded = HistoryStore::load(&path).unwrap();
        prop_assert_eq!(loaded, entries);
    }
}
