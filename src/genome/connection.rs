use crate::{config::Config, random::Happens};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A weighted edge between two node ids, identified across genomes by `inno`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub inno: usize,
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    pub enabled: bool,
}

impl Connection {
    pub fn new(inno: usize, from: usize, to: usize, weight: f64, enabled: bool) -> Self {
        Self {
            inno,
            from,
            to,
            weight,
            enabled,
        }
    }

    #[inline]
    pub fn path(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    #[inline]
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    #[inline]
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// difference of weight between this and another connection with the same innovation id
    #[inline]
    pub fn param_diff(&self, other: &Self) -> f64 {
        (self.weight - other.weight).abs()
    }

    /// Copy of this gene pointing at new endpoints
    pub fn rebound(&self, from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            ..self.clone()
        }
    }

    /// Mutate the weight, then roll to switch this connection off. A disabled connection is
    /// never switched back on here.
    pub fn mutate(&mut self, config: &Config, rng: &mut impl Rng) {
        self.weight = config.weight.mutate(self.weight, rng);
        if rng.happens(config.enabled_mutate_rate) {
            self.disable();
        }
    }
}
