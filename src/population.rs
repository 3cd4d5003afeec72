//! The generational loop: evaluate, speciate, rank, cull, reproduce.

use crate::{
    config::Config,
    error::Error,
    genome::Genome,
    innovation::InnovationRegistry,
    random::{seed, WyRng},
    reproduce::population_reproduce,
    scenario::{Cancel, Outcome, Scenario, Stats},
    specie::{fitness_desc, speciate, Specie},
};
use core::ops::ControlFlow;

fn keep_going(_: &Stats) -> ControlFlow<()> {
    ControlFlow::Continue(())
}

/// Everything a run owns: the genomes, the species they fall into, and the one innovation
/// registry and random source every mutation draws from.
#[derive(Debug)]
pub struct Population {
    config: Config,
    genomes: Vec<Genome>,
    species: Vec<Specie>,
    registry: InnovationRegistry,
    rng: WyRng,
    generation: usize,
    best: Option<Genome>,
    best_fitness: f64,
    average_fitness: f64,
    cancel: Cancel,
}

impl Population {
    /// A population of fresh genomes. Seeded from `config.seed` when set.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let mut population = Self {
            rng: WyRng::seeded(config.seed.unwrap_or_else(seed)),
            config,
            genomes: Vec::new(),
            species: Vec::new(),
            registry: InnovationRegistry::new(),
            generation: 0,
            best: None,
            best_fitness: f64::NEG_INFINITY,
            average_fitness: 0.,
            cancel: Cancel::new(),
        };
        population.genomes = population.fresh_genomes();
        Ok(population)
    }

    fn fresh_genomes(&mut self) -> Vec<Genome> {
        (0..self.config.population_size)
            .map(|_| Genome::initial(&self.config, &mut self.registry, &mut self.rng))
            .collect()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    #[inline]
    pub fn species(&self) -> &[Specie] {
        &self.species
    }

    #[inline]
    pub fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }

    /// Number of generations completed
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fittest genome seen over the whole run
    #[inline]
    pub fn best_genome(&self) -> Option<&Genome> {
        self.best.as_ref()
    }

    /// Fitness of [Population::best_genome], or 0 before anything was evaluated
    #[inline]
    pub fn best_fitness(&self) -> f64 {
        if self.best.is_some() {
            self.best_fitness
        } else {
            0.
        }
    }

    /// Mean fitness of the last evaluated generation
    #[inline]
    pub fn average_fitness(&self) -> f64 {
        self.average_fitness
    }

    pub fn get_genome(&self, id: &str) -> Option<&Genome> {
        self.genomes.iter().find(|g| g.id == id)
    }

    /// A handle that stops this population from another thread, or from inside an evaluation
    pub fn cancel_handle(&self) -> Cancel {
        self.cancel.clone()
    }

    /// Run up to `generations` generations. `evaluate` is expected to write each genome's
    /// fitness, and `hook` sees every finished generation.
    pub fn run<F, H>(
        &mut self,
        evaluate: F,
        generations: usize,
        mut hook: H,
    ) -> Result<Outcome, Error>
    where
        F: Fn(&mut Genome, usize) + Sync + Send,
        H: FnMut(&Stats) -> ControlFlow<()>,
    {
        for _ in 0..generations {
            if let Some(outcome) = self.generation_with(&evaluate, &mut hook)? {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Exhausted)
    }

    /// Run exactly one generation
    pub fn step<F>(&mut self, evaluate: F) -> Result<Option<Outcome>, Error>
    where
        F: Fn(&mut Genome, usize) + Sync + Send,
    {
        self.generation_with(&evaluate, &mut keep_going)
    }

    /// [Population::run] against a [Scenario] that returns fitness instead of writing it
    pub fn evolve<S, H>(
        &mut self,
        scenario: &S,
        generations: usize,
        hook: H,
    ) -> Result<Outcome, Error>
    where
        S: Scenario,
        H: FnMut(&Stats) -> ControlFlow<()>,
    {
        let io = scenario.io();
        if io != (self.config.num_inputs, self.config.num_outputs) {
            return Err(Error::InvalidConfig(format!(
                "scenario wants {io:?} inputs and outputs, config has ({}, {})",
                self.config.num_inputs, self.config.num_outputs
            )));
        }

        self.run(
            |genome, generation| genome.fitness = scenario.eval(genome, generation),
            generations,
            hook,
        )
    }

    fn evaluate<F>(&mut self, evaluate: &F)
    where
        F: Fn(&mut Genome, usize) + Sync + Send,
    {
        let generation = self.generation;
        let cancel = &self.cancel;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.genomes.par_iter_mut().for_each(|genome| {
                if !cancel.is_cancelled() {
                    evaluate(genome, generation)
                }
            });
        }

        #[cfg(not(feature = "parallel"))]
        self.genomes.iter_mut().for_each(|genome| {
            if !cancel.is_cancelled() {
                evaluate(genome, generation)
            }
        });
    }

    fn set_best(&mut self) {
        let Some(champion) = self
            .species
            .first()
            .and_then(Specie::champion)
            .map(|idx| &self.genomes[idx])
        else {
            return;
        };

        if self.best.is_none() || champion.fitness > self.best_fitness {
            self.best_fitness = champion.fitness;
            self.best = Some(champion.clone());
        }
    }

    fn set_average(&mut self) {
        self.average_fitness = if self.genomes.is_empty() {
            0.
        } else {
            self.genomes.iter().map(|g| g.fitness).sum::<f64>() / self.genomes.len() as f64
        };
    }

    /// Drop species that haven't improved in `max_stagnation` generations, sparing the best
    /// `species_elitism` of them
    fn kill_stagnant(&mut self) {
        let (elitism, max) = (self.config.species_elitism, self.config.max_stagnation);
        let mut idx = 0;
        self.species.retain(|specie| {
            let keep = idx < elitism || specie.stagnation < max;
            if !keep {
                log::debug!(
                    "dropping specie of {} after {} stagnant generations",
                    specie.len(),
                    specie.stagnation
                );
            }
            idx += 1;
            keep
        });
    }

    /// Drop species whose average fitness falls too far below the mean, sparing the best
    fn kill_bad(&mut self) {
        if self.species.is_empty() {
            return;
        }
        let mean = self.species.iter().map(|s| s.average_fitness).sum::<f64>()
            / self.species.len() as f64;
        let threshold = mean * self.config.bad_species_threshold;

        let mut idx = 0;
        self.species.retain(|specie| {
            let keep = idx == 0 || specie.average_fitness >= threshold;
            if !keep {
                log::debug!(
                    "dropping specie of {} averaging {:.4} under {threshold:.4}",
                    specie.len(),
                    specie.average_fitness
                );
            }
            idx += 1;
            keep
        });
    }

    fn rank(&mut self) {
        let genomes = &self.genomes;
        for specie in self.species.iter_mut() {
            specie.sort_members(genomes);
        }

        // by this generation's champion, not the all-time best
        let champion_fitness =
            |s: &Specie| s.champion().map_or(f64::NAN, |idx| genomes[idx].fitness);
        self.species
            .sort_by(|l, r| fitness_desc(champion_fitness(l), champion_fitness(r)));

        for specie in self.species.iter_mut() {
            specie.kill_genomes(&self.config);
            specie.fitness_sharing(genomes);
            specie.set_average();
        }
    }

    fn generation_with<F, H>(
        &mut self,
        evaluate: &F,
        hook: &mut H,
    ) -> Result<Option<Outcome>, Error>
    where
        F: Fn(&mut Genome, usize) + Sync + Send,
        H: FnMut(&Stats) -> ControlFlow<()>,
    {
        if self.cancel.is_cancelled() {
            return Ok(Some(Outcome::Cancelled));
        }

        self.evaluate(evaluate);
        if self.cancel.is_cancelled() {
            return Ok(Some(Outcome::Cancelled));
        }

        speciate(&mut self.species, &self.genomes, &self.config);
        self.rank();
        self.set_best();
        self.set_average();
        self.kill_stagnant();
        self.kill_bad();

        let mut next = population_reproduce(
            &self.species,
            &self.genomes,
            &self.config,
            &mut self.registry,
            &mut self.rng,
        );
        if next.is_empty() {
            if !self.config.reset_on_extinction {
                return Err(Error::Extinction(self.generation));
            }
            log::warn!(
                "every specie died out in generation {}, reseeding",
                self.generation
            );
            self.species.clear();
            next = self.fresh_genomes();
        }

        for specie in self.species.iter_mut() {
            specie.clear();
        }
        let evaluated = std::mem::replace(&mut self.genomes, next);

        log::info!(
            "generation {}: best {:.4}, average {:.4}, {} species",
            self.generation,
            self.best_fitness(),
            self.average_fitness,
            self.species.len()
        );

        let stats = Stats {
            generation: self.generation,
            best_fitness: self.best_fitness(),
            average_fitness: self.average_fitness,
            species: self.species.len(),
            genomes: &evaluated,
        };
        let halted = hook(&stats).is_break();
        self.generation += 1;

        if !self.config.no_fitness_termination
            && self.best_fitness() > self.config.fitness_threshold
        {
            Ok(Some(Outcome::FitnessReached))
        } else if halted {
            Ok(Some(Outcome::Halted))
        } else {
            Ok(None)
        }
    }
}
