//! # Batch — Synthesis/Verification Batch Orchestration
//!
//! Drives N synthesize→verify cycles for one country, pausing between
//! iterations, reporting per-item progress to an observer, and computing
//! aggregate statistics at the end.
//!
//! ## Cancellation
//!
//! The loop polls a `StopSignal` between iterations and the `Pacer` polls it
//! inside the pause, so an interrupt raised during the delay is observed
//! promptly. Cancellation never discards work: statistics over the completed
//! iterations are computed and returned as usual.
//!
//! ## Failure Policy
//!
//! An unknown country is surfaced before the loop starts. A per-iteration
//! synthesis failure (exhausted number space) is logged and skipped without
//! counting, so `valid + invalid == total_generated` always holds.

use rand::Rng;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::synth::{SynthesisError, SynthesizedNumber, Synthesizer};
use crate::verify::ExistenceSimulator;

/// Aggregate result of a completed or cancelled batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchStatistics {
    pub total_generated: u64,
    pub valid_count: u64,
    pub invalid_count: u64,
    pub duration_seconds: f64,
    pub rate: f64,
}

impl BatchStatistics {
    fn zero() -> Self {
        BatchStatistics {
            total_generated: 0,
            valid_count: 0,
            invalid_count: 0,
            duration_seconds: 0.0,
            rate: 0.0,
        }
    }
}

/// Cooperative cancellation check, polled between iterations and during
/// pauses. The CLI backs this with a SIGINT flag; tests script it.
pub trait StopSignal {
    fn is_stop_requested(&self) -> bool;
}

/// Never cancels.
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn is_stop_requested(&self) -> bool {
        false
    }
}

impl StopSignal for std::sync::atomic::AtomicBool {
    fn is_stop_requested(&self) -> bool {
        self.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// The inter-iteration suspension point, extracted so tests run without
/// wall-clock delay and cancellation behavior stays testable.
pub trait Pacer {
    fn pause(&self, delay: Duration, stop: &dyn StopSignal);
}

/// Real sleeping pacer. Sleeps in short slices so a stop request raised
/// mid-delay wakes the loop within ~50ms.
pub struct WallClockPacer;

const PAUSE_SLICE: Duration = Duration::from_millis(50);

impl Pacer for WallClockPacer {
    fn pause(&self, delay: Duration, stop: &dyn StopSignal) {
        let deadline = Instant::now() + delay;
        loop {
            if stop.is_stop_requested() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            std::thread::sleep(PAUSE_SLICE.min(deadline - now));
        }
    }
}

/// No-op pacer for tests and zero-delay runs.
pub struct NoopPacer;

impl Pacer for NoopPacer {
    fn pause(&self, _delay: Duration, _stop: &dyn StopSignal) {}
}

/// One completed iteration, as seen by the progress observer.
#[derive(Debug)]
pub struct BatchProgress<'a> {
    /// Iterations completed so far, 1-based.
    pub completed: u64,
    pub size: u64,
    pub percent: f64,
    pub number: &'a SynthesizedNumber,
    pub exists: bool,
}

/// Receives one observation per counted iteration.
pub trait ProgressSink {
    fn on_item(&mut self, progress: BatchProgress<'_>);
}

impl<F: FnMut(BatchProgress<'_>)> ProgressSink for F {
    fn on_item(&mut self, progress: BatchProgress<'_>) {
        self(progress)
    }
}

/// Run `size` synthesis+verification cycles for `country`.
///
/// `size == 0` returns zero statistics without error. The 1..=1000 bound on
/// `size` is the CLI prompt's contract, not enforced here.
#[allow(clippy::too_many_arguments)]
pub fn run_batch<R: Rng, V: Rng>(
    synth: &mut Synthesizer<'_, R>,
    simulator: &mut ExistenceSimulator<V>,
    country: &str,
    size: u64,
    delay: Duration,
    pacer: &dyn Pacer,
    stop: &dyn StopSignal,
    sink: &mut dyn ProgressSink,
) -> Result<BatchStatistics, SynthesisError> {
    if !synth.store().contains(country) {
        return Err(SynthesisError::UnknownCountry(country.to_string()));
    }
    if size == 0 {
        return Ok(BatchStatistics::zero());
    }

    info!(country, size, delay_secs = delay.as_secs_f64(), "batch starting");
    let start = Instant::now();
    let mut valid_count = 0u64;
    let mut invalid_count = 0u64;
    let mut cancelled = false;

    for i in 0..size {
        if stop.is_stop_requested() {
            cancelled = true;
            break;
        }

        match synth.synthesize(country) {
            Ok(number) => {
                let exists = simulator.verify(&number.full);
                if exists {
                    valid_count += 1;
                } else {
                    invalid_count += 1;
                }
                sink.on_item(BatchProgress {
                    completed: i + 1,
                    size,
                    percent: (i + 1) as f64 / size as f64 * 100.0,
                    number: &number,
                    exists,
                });
            }
            // Skipped, not counted: the space is used up but the batch goes on.
            Err(err @ SynthesisError::ExhaustedNumberSpace { .. }) => {
                warn!(country, iteration = i, %err, "synthesis failed, skipping");
            }
            Err(err @ SynthesisError::UnknownCountry(_)) => return Err(err),
        }

        if i + 1 < size {
            pacer.pause(delay, stop);
        }
    }

    let duration_seconds = start.elapsed().as_secs_f64();
    let total_generated = valid_count + invalid_count;
    let rate = if duration_seconds > 0.0 {
        total_generated as f64 / duration_seconds
    } else {
        0.0
    };

    let stats = BatchStatistics {
        total_generated,
        valid_count,
        invalid_count,
        duration_seconds,
        rate,
    };
    info!(
        country,
        total = stats.total_generated,
        valid = stats.valid_count,
        invalid = stats.invalid_count,
        cancelled,
        "batch finished"
    );
    Ok(stats)
}
