use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dialforge::countries::CountryStore;
use dialforge::synth::Synthesizer;
use dialforge::verify::ExistenceSimulator;

fn bench_synthesize_1000(c: &mut Criterion) {
    let store = CountryStore::builtin();
    c.bench_function("synthesize(España) x1000", |b| {
        b.iter_batched(
            || Synthesizer::with_rng(&store, StdRng::seed_from_u64(0xD1A1)),
            |mut synth| {
                for _ in 0..1000 {
                    black_box(synth.synthesize(black_box("España")).unwrap());
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_verify_1000(c: &mut Criterion) {
    c.bench_function("verify x1000", |b| {
        b.iter_batched(
            || ExistenceSimulator::new(StdRng::seed_from_u64(7)),
            |mut sim| {
                for _ in 0..1000 {
                    black_box(sim.verify(black_box("+34 91 12345678")));
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_synthesize_1000, bench_verify_1000);
criterion_main!(benches);
