//! Centralized constants for neatwork evolution parameters.
//!
//! Every configuration key has its default here with the `NEATWORK_` prefix, next to the few
//! values the algorithm fixes outright.

// ============================================================================
// Population Parameters
// ============================================================================

pub const NEATWORK_POPULATION_SIZE: usize = 150;

/// Best fitness a run must exceed before it stops early
pub const NEATWORK_FITNESS_THRESHOLD: f64 = 100.0;

pub const NEATWORK_NO_FITNESS_TERMINATION: bool = false;

/// Reseed with fresh genomes when every species dies out
pub const NEATWORK_RESET_ON_EXTINCTION: bool = true;

pub const NEATWORK_NUM_INPUTS: usize = 2;

pub const NEATWORK_NUM_OUTPUTS: usize = 1;

// ============================================================================
// Node Parameters
// ============================================================================

pub const NEATWORK_ACTIVATION_MUTATE_RATE: f64 = 0.0;

pub const NEATWORK_BIAS_INIT_MEAN: f64 = 0.0;

pub const NEATWORK_BIAS_INIT_STDEV: f64 = 1.0;

pub const NEATWORK_BIAS_MIN_VALUE: f64 = -30.0;

pub const NEATWORK_BIAS_MAX_VALUE: f64 = 30.0;

pub const NEATWORK_BIAS_MUTATE_RATE: f64 = 0.7;

pub const NEATWORK_BIAS_REPLACE_RATE: f64 = 0.1;

// ============================================================================
// Connection Parameters
// ============================================================================

pub const NEATWORK_WEIGHT_INIT_MEAN: f64 = 0.0;

pub const NEATWORK_WEIGHT_INIT_STDEV: f64 = 1.0;

pub const NEATWORK_WEIGHT_MIN_VALUE: f64 = -30.0;

pub const NEATWORK_WEIGHT_MAX_VALUE: f64 = 30.0;

pub const NEATWORK_WEIGHT_MUTATE_RATE: f64 = 0.8;

pub const NEATWORK_WEIGHT_REPLACE_RATE: f64 = 0.1;

pub const NEATWORK_ENABLED_DEFAULT: bool = true;

/// Probability that mutation forces a connection off
pub const NEATWORK_ENABLED_MUTATE_RATE: f64 = 0.01;

/// Factor for parameter perturbation (multiplied with a sample of the init distribution)
pub const NEATWORK_PARAM_PERTURB_FACTOR: f64 = 1. / 50.;

// ============================================================================
// Genome Mutation Parameters
// ============================================================================

pub const NEATWORK_CONN_ADD_PROB: f64 = 0.3;

pub const NEATWORK_CONN_DELETE_PROB: f64 = 0.05;

pub const NEATWORK_NODE_ADD_PROB: f64 = 0.1;

pub const NEATWORK_NODE_DELETE_PROB: f64 = 0.02;

// ============================================================================
// Crossover
// ============================================================================

/// Probability of picking the gene from the less fit parent when both carry it
pub const NEATWORK_CROSSOVER_PICK_LESS_FIT_PROB: f64 = 0.5;

/// Probability a matching gene stays disabled when either parent has it disabled
pub const NEATWORK_CROSSOVER_KEEP_DISABLED_PROB: f64 = 0.75;

// ============================================================================
// Speciation
// ============================================================================

pub const NEATWORK_COMPATIBILITY_DISJOINT_COEFFICIENT: f64 = 1.0;

pub const NEATWORK_COMPATIBILITY_WEIGHT_COEFFICIENT: f64 = 0.5;

/// Genetic distance threshold for speciation
pub const NEATWORK_COMPATIBILITY_THRESHOLD: f64 = 3.0;

/// Number of generations without improvement before a species is dropped
pub const NEATWORK_MAX_STAGNATION: usize = 15;

/// Number of top species immune to stagnation
pub const NEATWORK_SPECIES_ELITISM: usize = 2;

/// Fraction of the mean species fitness a species must reach to keep reproducing
pub const NEATWORK_BAD_SPECIES_THRESHOLD: f64 = 0.25;

// ============================================================================
// Reproduction Parameters
// ============================================================================

/// Number of best individuals per species preserved unchanged each generation
pub const NEATWORK_ELITISM: usize = 1;

pub const NEATWORK_SURVIVAL_THRESHOLD: f64 = 0.2;

pub const NEATWORK_MIN_SPECIES_SIZE: usize = 2;

/// Share of offspring produced by mutating a copy instead of crossover
pub const NEATWORK_REPRODUCTION_COPY_PROB: f64 = 0.25;

/// Length of a genome's string id
pub const NEATWORK_GENOME_ID_LEN: usize = 8;
