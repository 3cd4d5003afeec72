use criterion::{BatchSize, Criterion};
use neatwork::{new_t, Config, Genome, InnovationRegistry, WyRng};

fn bench_mutate(bench: &mut Criterion) {
    let mut rng = WyRng::seeded(0);
    let mut registry = InnovationRegistry::new();
    let config = new_t!(Config, num_inputs = 8, num_outputs = 4);
    let genome = Genome::initial(&config, &mut registry, &mut rng);
    let mut bisected = genome.clone();
    bisected.add_node(&config, &mut registry, &mut rng);

    bench.bench_function("genome-mutate", |b| {
        b.iter_batched(
            || genome.clone(),
            |mut g| g.mutate(&config, &mut registry, &mut rng),
            BatchSize::SmallInput,
        )
    });

    bench.bench_function("genome-mutate-bisection", |b| {
        b.iter_batched(
            || genome.clone(),
            |mut g| g.add_node(&config, &mut registry, &mut rng),
            BatchSize::SmallInput,
        )
    });

    bench.bench_function("genome-mutate-connection", |b| {
        b.iter_batched(
            || bisected.clone(),
            |mut g| g.add_connection(&config, &mut registry, &mut rng),
            BatchSize::SmallInput,
        )
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(1000)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_mutate(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
