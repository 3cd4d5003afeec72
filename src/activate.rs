//! Scalar activation functions, and the closed set of kinds a node may carry.

use crate::error::Error;
use core::{f64::consts::E, fmt, str::FromStr};
use rand::Rng;
use serde::{Deserialize, Serialize};

const LEAK: f64 = 0.01;

pub fn step(x: f64) -> f64 {
    if x > 0. {
        1.
    } else {
        0.
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1. / (1. + E.powf(-x))
}

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

pub fn relu(x: f64) -> f64 {
    if x < 0. {
        0.
    } else {
        x
    }
}

pub fn leaky_relu(x: f64) -> f64 {
    if x > 0. {
        x
    } else {
        LEAK * x
    }
}

pub fn elu(x: f64) -> f64 {
    if x > 0. {
        x
    } else {
        x.exp() - 1.
    }
}

pub fn linear(x: f64) -> f64 {
    x
}

pub fn swish(x: f64) -> f64 {
    x * sigmoid(x)
}

/// Activation carried by a node. Sensory and bias nodes hold one too, but never apply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Step,
    #[default]
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu,
    Prelu,
    Elu,
    Softmax,
    Linear,
    Swish,
}

impl Activation {
    pub const ALL: [Activation; 10] = [
        Activation::Step,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Relu,
        Activation::LeakyRelu,
        Activation::Prelu,
        Activation::Elu,
        Activation::Softmax,
        Activation::Linear,
        Activation::Swish,
    ];

    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Step => step(x),
            // a single neuron has nothing to normalize against, so softmax collapses to sigmoid
            Self::Sigmoid | Self::Softmax => sigmoid(x),
            Self::Tanh => tanh(x),
            Self::Relu => relu(x),
            Self::LeakyRelu | Self::Prelu => leaky_relu(x),
            Self::Elu => elu(x),
            Self::Linear => linear(x),
            Self::Swish => swish(x),
        }
    }

    /// Uniform pick among all kinds, which may be the kind already held
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Relu => "relu",
            Self::LeakyRelu => "leaky_relu",
            Self::Prelu => "prelu",
            Self::Elu => "elu",
            Self::Softmax => "softmax",
            Self::Linear => "linear",
            Self::Swish => "swish",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| Error::InvalidValue {
                key: "activation".into(),
                value: s.into(),
            })
    }
}
