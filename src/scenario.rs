use crate::genome::Genome;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A problem to evolve against. Hosts that would rather write fitness themselves use
/// [crate::Population::run] directly.
pub trait Scenario: Sync {
    /// number of sensory and action nodes a genome needs to be scored here
    fn io(&self) -> (usize, usize);

    /// score a genome during generation `generation`
    fn eval(&self, genome: &mut Genome, generation: usize) -> f64;
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// ran every generation it was given
    Exhausted,
    /// best fitness went past `fitness_threshold`
    FitnessReached,
    /// a hook returned `ControlFlow::Break`
    Halted,
    Cancelled,
}

/// Cooperative cancellation shared between a running population and whoever wants it stopped
#[derive(Debug, Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear a previous cancellation so the population can run again
    #[inline]
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Summary of a finished generation, handed to hooks
#[derive(Debug)]
pub struct Stats<'a> {
    pub generation: usize,
    /// best fitness seen over the whole run
    pub best_fitness: f64,
    /// mean fitness of this generation
    pub average_fitness: f64,
    pub species: usize,
    /// the genomes as they were evaluated this generation
    pub genomes: &'a [Genome],
}

impl Stats<'_> {
    pub fn fittest(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .filter(|g| !g.fitness.is_nan())
            .max_by(|l, r| l.fitness.total_cmp(&r.fitness))
    }

    pub fn any_fitter_than(&self, target: f64) -> bool {
        self.genomes.iter().any(|g| g.fitness > target)
    }
}
