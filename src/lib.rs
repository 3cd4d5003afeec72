//! NeuroEvolution of Augmenting Topologies over layered feed-forward networks.
//!
//! A [Population] owns the genomes of a run along with the one [InnovationRegistry] and random
//! source every mutation goes through. Hosts supply an evaluation that writes each genome's
//! fitness, and get back the fittest network found.

mod macros;

pub mod activate;
pub mod config;
pub mod constants;
pub mod crossover;
pub mod error;
pub mod genome;
pub mod innovation;
pub mod population;
pub mod random;
pub mod reproduce;
pub mod scenario;
pub mod serialize;
pub mod specie;

pub use activate::Activation;
pub use config::Config;
pub use error::Error;
pub use genome::{Connection, Genome, Node, NodeKind};
pub use innovation::InnovationRegistry;
pub use population::Population;
pub use random::{Happens, WyRng};
pub use scenario::{Cancel, Outcome, Scenario, Stats};
pub use specie::Specie;
