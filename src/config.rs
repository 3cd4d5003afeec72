//! Run configuration, and the line-oriented `key = value` format it is usually read from.
//!
//! ```text
//! # NEAT
//! population_size = 50
//! fitness_threshold = 3.9
//!
//! # GENOME
//! num_inputs = 2
//! num_outputs = 1
//! weight_init_type = uniform
//! ```
//!
//! Unknown keys and unparsable values are reported through [log] and otherwise ignored, so a
//! config written for a newer version of the engine still loads.

use crate::{activate::Activation, constants::*, error::Error, random::Happens};
use core::str::FromStr;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Distribution new parameters are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitKind {
    #[default]
    Normal,
    Uniform,
}

impl FromStr for InitKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "uniform" => Ok(Self::Uniform),
            _ => Err(()),
        }
    }
}

/// Whether fresh genomes start with every input and the bias wired to every output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialConnections {
    #[default]
    Full,
    None,
}

impl FromStr for InitialConnections {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// How one kind of scalar gene parameter (bias or weight) is initialized and mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamConfig {
    pub init_type: InitKind,
    pub init_mean: f64,
    pub init_stdev: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub mutate_rate: f64,
    pub replace_rate: f64,
}

impl ParamConfig {
    /// Keep `v` within bounds. Unlike [f64::clamp] this never panics on odd bounds.
    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.min_value).min(self.max_value)
    }

    fn gaussian(&self, rng: &mut impl Rng) -> f64 {
        Normal::new(self.init_mean, self.init_stdev)
            .map(|d| d.sample(rng))
            .unwrap_or(self.init_mean)
    }

    fn uniform(&self, rng: &mut impl Rng) -> f64 {
        Uniform::new_inclusive(self.min_value, self.max_value)
            .map(|d| d.sample(rng))
            .unwrap_or(self.min_value)
    }

    /// A new value from the configured initializer, within bounds
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self.init_type {
            InitKind::Normal => self.clamp(self.gaussian(rng)),
            InitKind::Uniform => self.uniform(rng),
        }
    }

    /// Either replace `v` outright, perturb it, or leave it be
    pub fn mutate(&self, v: f64, rng: &mut impl Rng) -> f64 {
        if rng.happens(self.replace_rate) {
            self.uniform(rng)
        } else if rng.happens(self.mutate_rate) {
            self.clamp(v + self.gaussian(rng) * NEATWORK_PARAM_PERTURB_FACTOR)
        } else {
            v
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub population_size: usize,
    pub fitness_threshold: f64,
    pub no_fitness_termination: bool,
    pub reset_on_extinction: bool,
    /// Seed for the run's only random source. Unset draws one from the OS.
    pub seed: Option<u64>,

    pub num_inputs: usize,
    pub num_outputs: usize,
    pub activation_default: Activation,
    pub activation_mutate_rate: f64,
    pub bias: ParamConfig,
    pub weight: ParamConfig,
    pub enabled_default: bool,
    pub enabled_mutate_rate: f64,
    pub initial_connections: InitialConnections,

    pub conn_add_prob: f64,
    pub conn_delete_prob: f64,
    pub node_add_prob: f64,
    pub node_delete_prob: f64,

    pub compatibility_disjoint_coefficient: f64,
    pub compatibility_weight_coefficient: f64,
    pub compatibility_threshold: f64,
    pub max_stagnation: usize,
    pub species_elitism: usize,
    pub bad_species_threshold: f64,

    pub elitism: usize,
    pub survival_threshold: f64,
    pub min_species_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population_size: NEATWORK_POPULATION_SIZE,
            fitness_threshold: NEATWORK_FITNESS_THRESHOLD,
            no_fitness_termination: NEATWORK_NO_FITNESS_TERMINATION,
            reset_on_extinction: NEATWORK_RESET_ON_EXTINCTION,
            seed: None,
            num_inputs: NEATWORK_NUM_INPUTS,
            num_outputs: NEATWORK_NUM_OUTPUTS,
            activation_default: Activation::default(),
            activation_mutate_rate: NEATWORK_ACTIVATION_MUTATE_RATE,
            bias: ParamConfig {
                init_type: InitKind::Normal,
                init_mean: NEATWORK_BIAS_INIT_MEAN,
                init_stdev: NEATWORK_BIAS_INIT_STDEV,
                min_value: NEATWORK_BIAS_MIN_VALUE,
                max_value: NEATWORK_BIAS_MAX_VALUE,
                mutate_rate: NEATWORK_BIAS_MUTATE_RATE,
                replace_rate: NEATWORK_BIAS_REPLACE_RATE,
            },
            weight: ParamConfig {
                init_type: InitKind::Normal,
                init_mean: NEATWORK_WEIGHT_INIT_MEAN,
                init_stdev: NEATWORK_WEIGHT_INIT_STDEV,
                min_value: NEATWORK_WEIGHT_MIN_VALUE,
                max_value: NEATWORK_WEIGHT_MAX_VALUE,
                mutate_rate: NEATWORK_WEIGHT_MUTATE_RATE,
                replace_rate: NEATWORK_WEIGHT_REPLACE_RATE,
            },
            enabled_default: NEATWORK_ENABLED_DEFAULT,
            enabled_mutate_rate: NEATWORK_ENABLED_MUTATE_RATE,
            initial_connections: InitialConnections::default(),
            conn_add_prob: NEATWORK_CONN_ADD_PROB,
            conn_delete_prob: NEATWORK_CONN_DELETE_PROB,
            node_add_prob: NEATWORK_NODE_ADD_PROB,
            node_delete_prob: NEATWORK_NODE_DELETE_PROB,
            compatibility_disjoint_coefficient: NEATWORK_COMPATIBILITY_DISJOINT_COEFFICIENT,
            compatibility_weight_coefficient: NEATWORK_COMPATIBILITY_WEIGHT_COEFFICIENT,
            compatibility_threshold: NEATWORK_COMPATIBILITY_THRESHOLD,
            max_stagnation: NEATWORK_MAX_STAGNATION,
            species_elitism: NEATWORK_SPECIES_ELITISM,
            bad_species_threshold: NEATWORK_BAD_SPECIES_THRESHOLD,
            elitism: NEATWORK_ELITISM,
            survival_threshold: NEATWORK_SURVIVAL_THRESHOLD,
            min_species_size: NEATWORK_MIN_SPECIES_SIZE,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value.parse().map_err(|_| Error::InvalidValue {
        key: key.into(),
        value: value.into(),
    })
}

impl Config {
    /// Set a single key from its textual value
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let v = value.trim();
        match key.trim() {
            k @ "population_size" => self.population_size = parse(k, v)?,
            k @ "fitness_threshold" => self.fitness_threshold = parse(k, v)?,
            k @ "no_fitness_termination" => self.no_fitness_termination = parse(k, v)?,
            k @ "reset_on_extinction" => self.reset_on_extinction = parse(k, v)?,
            k @ "seed" => self.seed = Some(parse(k, v)?),
            k @ "num_inputs" => self.num_inputs = parse(k, v)?,
            k @ "num_outputs" => self.num_outputs = parse(k, v)?,
            k @ "activation_default" => self.activation_default = parse(k, v)?,
            k @ "activation_mutate_rate" => self.activation_mutate_rate = parse(k, v)?,
            k @ "bias_init_type" => self.bias.init_type = parse(k, v)?,
            k @ "bias_init_mean" => self.bias.init_mean = parse(k, v)?,
            k @ "bias_init_stdev" => self.bias.init_stdev = parse(k, v)?,
            k @ "bias_min_value" => self.bias.min_value = parse(k, v)?,
            k @ "bias_max_value" => self.bias.max_value = parse(k, v)?,
            k @ "bias_mutate_rate" => self.bias.mutate_rate = parse(k, v)?,
            k @ "bias_replace_rate" => self.bias.replace_rate = parse(k, v)?,
            k @ "weight_init_type" => self.weight.init_type = parse(k, v)?,
            k @ "weight_init_mean" => self.weight.init_mean = parse(k, v)?,
            k @ "weight_init_stdev" => self.weight.init_stdev = parse(k, v)?,
            k @ "weight_min_value" => self.weight.min_value = parse(k, v)?,
            k @ "weight_max_value" => self.weight.max_value = parse(k, v)?,
            k @ "weight_mutate_rate" => self.weight.mutate_rate = parse(k, v)?,
            k @ "weight_replace_rate" => self.weight.replace_rate = parse(k, v)?,
            k @ "enabled_default" => self.enabled_default = parse(k, v)?,
            k @ "enabled_mutate_rate" => self.enabled_mutate_rate = parse(k, v)?,
            k @ "initial_connections" => self.initial_connections = parse(k, v)?,
            k @ "conn_add_prob" => self.conn_add_prob = parse(k, v)?,
            k @ "conn_delete_prob" => self.conn_delete_prob = parse(k, v)?,
            k @ "node_add_prob" => self.node_add_prob = parse(k, v)?,
            k @ "node_delete_prob" => self.node_delete_prob = parse(k, v)?,
            k @ "compatibility_disjoint_coefficient" => {
                self.compatibility_disjoint_coefficient = parse(k, v)?
            }
            k @ "compatibility_weight_coefficient" => {
                self.compatibility_weight_coefficient = parse(k, v)?
            }
            k @ "compatibility_threshold" => self.compatibility_threshold = parse(k, v)?,
            k @ "max_stagnation" => self.max_stagnation = parse(k, v)?,
            k @ "species_elitism" => self.species_elitism = parse(k, v)?,
            k @ "bad_species_threshold" => self.bad_species_threshold = parse(k, v)?,
            k @ "elitism" => self.elitism = parse(k, v)?,
            k @ "survival_threshold" => self.survival_threshold = parse(k, v)?,
            k @ "min_species_size" => self.min_species_size = parse(k, v)?,
            k => return Err(Error::UnknownKey(k.into())),
        }
        Ok(())
    }

    /// Parse config text over the defaults. Never fails; every line it can't use is logged and
    /// skipped.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        let mut config = Self::default();
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((k, v)) => {
                    if let Err(e) = config.set(k, v) {
                        log::warn!("config line {}: {e}, keeping default", idx + 1);
                    }
                }
                None => log::warn!("config line {}: expected `key = value`: {line}", idx + 1),
            }
        }
        config
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        fs::read_to_string(path)
            .map(|s| Self::from_str(&s))
            .map_err(|e| Error::io(path, e))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig("population_size must be positive".into()));
        }
        if self.num_outputs == 0 {
            return Err(Error::InvalidConfig("num_outputs must be positive".into()));
        }
        for (name, p) in [("bias", &self.bias), ("weight", &self.weight)] {
            if !(p.min_value <= p.max_value) {
                return Err(Error::InvalidConfig(format!(
                    "{name}_min_value {} exceeds {name}_max_value {}",
                    p.min_value, p.max_value
                )));
            }
        }
        if !(self.survival_threshold > 0. && self.survival_threshold <= 1.) {
            return Err(Error::InvalidConfig(format!(
                "survival_threshold {} outside (0, 1]",
                self.survival_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, new_t, random::WyRng};

    const FULL: &str = r#"
        # NEAT Configuration File

        # NEAT
        population_size = 50
        fitness_threshold = 100
        no_fitness_termination = true
        reset_on_extinction = false
        seed = 1234

        # GENOME
        activation_default = relu
        activation_mutate_rate = 0.1
        num_inputs = 10
        num_outputs = 2
        bias_init_mean = 0.0
        bias_init_type = normal
        bias_init_stdev = 1.0
        bias_max_value = 1.0
        bias_min_value = -1.0
        bias_mutate_rate = 0.5
        bias_replace_rate = 0.1
        compatibility_disjoint_coefficient = 1.0
        compatibility_weight_coefficient = 0.5
        conn_add_prob = 0.1
        conn_delete_prob = 0.0
        enabled_default = true
        enabled_mutate_rate = 0.1
        initial_connections = none
        node_add_prob = 0.1
        node_delete_prob = 0.0
        weight_init_mean = 0.0
        weight_init_stdev = 1.0
        weight_init_type = uniform
        weight_max_value = 1.0
        weight_min_value = -1.0
        weight_mutate_rate = 0.9
        weight_replace_rate = 0.1

        # STAGNATION
        max_stagnation = 15
        species_elitism = 2

        # REPRODUCTION
        elitism = 2
        survival_threshold = 0.2
        min_species_size = 2

        # SPECIES
        compatibility_threshold = 3.0
        bad_species_threshold = 0.25
    "#;

    #[test]
    fn test_from_str_full() {
        let config = Config::from_str(FULL);
        assert_eq!(config.population_size, 50);
        assert_f64_approx!(config.fitness_threshold, 100.);
        assert!(config.no_fitness_termination);
        assert!(!config.reset_on_extinction);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.activation_default, Activation::Relu);
        assert_f64_approx!(config.activation_mutate_rate, 0.1);
        assert_eq!(config.num_inputs, 10);
        assert_eq!(config.num_outputs, 2);
        assert_eq!(config.bias.init_type, InitKind::Normal);
        assert_f64_approx!(config.bias.max_value, 1.);
        assert_f64_approx!(config.bias.min_value, -1.);
        assert_f64_approx!(config.bias.mutate_rate, 0.5);
        assert_f64_approx!(config.compatibility_weight_coefficient, 0.5);
        assert_f64_approx!(config.conn_add_prob, 0.1);
        assert_f64_approx!(config.conn_delete_prob, 0.);
        assert!(config.enabled_default);
        assert_f64_approx!(config.enabled_mutate_rate, 0.1);
        assert_eq!(config.initial_connections, InitialConnections::None);
        assert_eq!(config.weight.init_type, InitKind::Uniform);
        assert_f64_approx!(config.weight.mutate_rate, 0.9);
        assert_eq!(config.max_stagnation, 15);
        assert_eq!(config.species_elitism, 2);
        assert_eq!(config.elitism, 2);
        assert_f64_approx!(config.survival_threshold, 0.2);
        assert_eq!(config.min_species_size, 2);
        assert_f64_approx!(config.compatibility_threshold, 3.);
        assert_f64_approx!(config.bad_species_threshold, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_keeps_defaults() {
        let config = Config::from_str("unknown_key = 42\npopulation_size = 7\nnot a pair");
        assert_eq!(config.population_size, 7);
        assert_eq!(
            Config {
                population_size: NEATWORK_POPULATION_SIZE,
                ..config
            },
            Config::default()
        );
    }

    #[test]
    fn test_set_errors() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("unknown_key", "1"),
            Err(Error::UnknownKey(k)) if k == "unknown_key"
        ));
        assert!(matches!(
            config.set("population_size", "many"),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("activation_default", "gelu"),
            Err(Error::InvalidValue { .. })
        ));
        assert!(config.set("weight_init_type", "uniform").is_ok());
        assert_eq!(config.weight.init_type, InitKind::Uniform);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Config::from_file("/nonexistent/neatwork.cfg"),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());
        assert!(new_t!(Config, population_size = 0).validate().is_err());
        assert!(new_t!(Config, num_outputs = 0).validate().is_err());
        assert!(new_t!(Config, survival_threshold = 0.).validate().is_err());

        let mut config = Config::default();
        config.weight.min_value = 2.;
        config.weight.max_value = 1.;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_param_sample_within_bounds() {
        let mut rng = WyRng::seeded(11);
        for init_type in [InitKind::Normal, InitKind::Uniform] {
            let p = ParamConfig {
                init_type,
                init_mean: 0.,
                init_stdev: 5.,
                min_value: -1.,
                max_value: 1.,
                mutate_rate: 1.,
                replace_rate: 0.,
            };
            for _ in 0..1_000 {
                let v = p.sample(&mut rng);
                assert!((-1. ..=1.).contains(&v), "{v} out of bounds");
                let m = p.mutate(v, &mut rng);
                assert!((-1. ..=1.).contains(&m), "{m} out of bounds");
            }
        }
    }

    #[test]
    fn test_param_mutate_rates() {
        let mut rng = WyRng::seeded(5);
        let mut p = Config::default().weight;
        p.replace_rate = 0.;
        p.mutate_rate = 0.;
        assert_f64_approx!(p.mutate(0.5, &mut rng), 0.5);

        p.mutate_rate = 1.;
        assert!(p.mutate(0.5, &mut rng) != 0.5);
    }
}
