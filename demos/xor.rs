use approx::relative_eq;
use core::{f64, ops::ControlFlow};
use neatwork::{Config, Genome, Outcome, Population, Scenario, Stats};

const CONFIG: &str = r#"
# NEAT
population_size = 150
fitness_threshold = 3.9

# GENOME
num_inputs = 2
num_outputs = 1
activation_default = sigmoid
conn_add_prob = 0.5
node_add_prob = 0.2
weight_mutate_rate = 0.8

# SPECIES
compatibility_threshold = 3.0
max_stagnation = 20
"#;

struct Xor;

impl Scenario for Xor {
    fn io(&self) -> (usize, usize) {
        (2, 1)
    }

    fn eval(&self, genome: &mut Genome, _: usize) -> f64 {
        let mut fit = 4.;
        for (pair, want) in [([0., 0.], 0.), ([1., 1.], 0.), ([1., 0.], 1.), ([0., 1.], 1.)] {
            match genome.feed_forward(&pair) {
                Ok(out) => fit -= (want - out[0]).powi(2),
                Err(_) => return 0.,
            }
        }
        fit
    }
}

fn hook(stats: &Stats) -> ControlFlow<()> {
    if stats.generation % 10 == 0 {
        println!(
            "fittest of gen {}: {:.4} (of {} species)",
            stats.generation,
            stats.fittest().map_or(f64::NAN, |g| g.fitness),
            stats.species
        );
    }

    ControlFlow::Continue(())
}

fn main() {
    let mut population = match Population::new(Config::from_str(CONFIG)) {
        Ok(population) => population,
        Err(e) => {
            eprintln!("bad config: {e}");
            return;
        }
    };

    match population.evolve(&Xor, 500, hook) {
        Ok(Outcome::FitnessReached) => {
            let mut best = population.best_genome().cloned().unwrap();
            println!(
                "target met in gen {}: {:.4}",
                population.generation(),
                best.fitness
            );
            for pair in [[0., 0.], [1., 1.], [1., 0.], [0., 1.]] {
                let out = best.feed_forward(&pair).unwrap()[0];
                let want = (pair[0] != pair[1]) as u8 as f64;
                println!("{pair:?} -> {out:.3} ({})", relative_eq!(out.round(), want));
            }
            best.to_file(format!("output/xor-{}.json", population.generation()))
                .unwrap();
        }
        Ok(outcome) => println!("stopped without a solution: {outcome:?}"),
        Err(e) => eprintln!("run failed: {e}"),
    }
}
