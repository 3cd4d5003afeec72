use criterion::Criterion;
use neatwork::{
    crossover::{avg_param_diff, disjoint_excess_count},
    new_t,
    specie::speciate,
    Config, Genome, InnovationRegistry, WyRng,
};

fn population(n: usize, config: &Config) -> Vec<Genome> {
    let mut rng = WyRng::seeded(0);
    let mut registry = InnovationRegistry::new();
    (0..n)
        .map(|_| {
            let mut genome = Genome::initial(config, &mut registry, &mut rng);
            for _ in 0..30 {
                genome.mutate(config, &mut registry, &mut rng);
            }
            genome
        })
        .collect()
}

fn bench_distance(bench: &mut Criterion) {
    let config = new_t!(Config, num_inputs = 8, num_outputs = 4, node_add_prob = 0.3);
    let pair = population(2, &config);
    let (l, r) = (pair[0].connections(), pair[1].connections());

    bench.bench_function("disjoint-excess-count", |b| {
        b.iter(|| disjoint_excess_count(l, r))
    });

    bench.bench_function("avg-weight-diff", |b| b.iter(|| avg_param_diff(l, r)));
}

fn bench_speciate(bench: &mut Criterion) {
    let config = new_t!(Config, population_size = 100);
    let genomes = population(100, &config);
    bench.bench_function("speciate", |b| {
        b.iter(|| {
            let mut species = Vec::new();
            speciate(&mut species, &genomes, &config);
            species
        })
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
    bench_distance(&mut criterion);
    bench_speciate(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
