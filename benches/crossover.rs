use criterion::Criterion;
use neatwork::{new_t, Config, Genome, InnovationRegistry, WyRng};

fn grown(config: &Config, registry: &mut InnovationRegistry, rng: &mut WyRng) -> Genome {
    let mut genome = Genome::initial(config, registry, rng);
    for _ in 0..100 {
        genome.mutate(config, registry, rng);
    }
    genome
}

fn bench_crossover(bench: &mut Criterion) {
    let mut rng = WyRng::seeded(0);
    let mut registry = InnovationRegistry::new();
    let config = new_t!(Config, num_inputs = 8, num_outputs = 4, node_add_prob = 0.3);
    let l = grown(&config, &mut registry, &mut rng);
    let r = grown(&config, &mut registry, &mut rng);
    let same = l.clone();

    bench.bench_function("crossover-eq", |b| b.iter(|| l.crossover(&same, &mut rng)));
    bench.bench_function("crossover-ne", |b| b.iter(|| l.crossover(&r, &mut rng)));
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
    bench_crossover(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
