//! Versioned on-disk form of a single [Genome].
//!
//! ```json
//! {
//!   "version": 1,
//!   "id": "x7Gq2LpA",
//!   "fitness": 3.2,
//!   "num_inputs": 2,
//!   "num_outputs": 1,
//!   "layers": 3,
//!   "nodes": [{ "id": 0, "layer": 0, "activation": "sigmoid" }, ...],
//!   "connections": [{ "from": 0, "to": 4, "weight": 1.0, "inno": 3, "enabled": true }, ...]
//! }
//! ```
//!
//! Node kinds are not stored. They follow from the id layout every genome shares.

use crate::{
    activate::Activation,
    error::Error,
    genome::{Connection, Genome, Node, NodeKind},
};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: usize,
    pub layer: usize,
    pub activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    pub inno: usize,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub version: u32,
    pub id: String,
    pub fitness: f64,
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub layers: usize,
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
}

impl From<&Genome> for GenomeRecord {
    fn from(genome: &Genome) -> Self {
        Self {
            version: SCHEMA_VERSION,
            id: genome.id.clone(),
            // json has no room for NaN or infinities
            fitness: if genome.fitness.is_finite() {
                genome.fitness
            } else {
                0.
            },
            num_inputs: genome.sensory(),
            num_outputs: genome.action(),
            layers: genome.layers(),
            nodes: genome
                .nodes()
                .iter()
                .map(|n| NodeRecord {
                    id: n.id,
                    layer: n.layer,
                    activation: n.activation,
                })
                .collect(),
            connections: genome
                .connections()
                .iter()
                .map(|c| ConnectionRecord {
                    from: c.from,
                    to: c.to,
                    weight: c.weight,
                    inno: c.inno,
                    enabled: c.enabled,
                })
                .collect(),
        }
    }
}

fn kind_of(id: usize, sensory: usize, action: usize) -> NodeKind {
    if id < sensory {
        NodeKind::Sensory
    } else if id < sensory + action {
        NodeKind::Action
    } else if id == sensory + action {
        NodeKind::Static
    } else {
        NodeKind::Internal
    }
}

impl TryFrom<GenomeRecord> for Genome {
    type Error = Error;

    fn try_from(record: GenomeRecord) -> Result<Self, Self::Error> {
        if record.version != SCHEMA_VERSION {
            return Err(Error::SchemaVersion(record.version));
        }

        let (sensory, action) = (record.num_inputs, record.num_outputs);
        let fixed = sensory + action + 1;

        let mut layers = FxHashMap::default();
        for n in record.nodes.iter() {
            if layers.insert(n.id, n.layer).is_some() {
                return Err(Error::InvalidGenome(format!("duplicate node {}", n.id)));
            }
        }

        for id in 0..fixed {
            let kind = kind_of(id, sensory, action);
            match layers.get(&id) {
                None => return Err(Error::InvalidGenome(format!("missing {kind:?} node {id}"))),
                Some(&layer) if layer != 0 && kind != NodeKind::Action => {
                    return Err(Error::InvalidGenome(format!(
                        "{kind:?} node {id} on layer {layer}"
                    )))
                }
                _ => {}
            }
        }

        let max_layer = layers.values().copied().max().unwrap_or(0);
        if record.layers <= max_layer {
            return Err(Error::InvalidGenome(format!(
                "{} layers, but a node sits on layer {max_layer}",
                record.layers
            )));
        }

        for c in record.connections.iter() {
            let (Some(&from), Some(&to)) = (layers.get(&c.from), layers.get(&c.to)) else {
                return Err(Error::InvalidGenome(format!(
                    "connection {} joins unknown nodes {} -> {}",
                    c.inno, c.from, c.to
                )));
            };
            // disabled genes may be re-enabled by crossover, so they are held to layering too
            if from >= to {
                return Err(Error::InvalidGenome(format!(
                    "connection {} runs from layer {from} to layer {to}",
                    c.inno
                )));
            }
        }

        let mut nodes = record
            .nodes
            .into_iter()
            .map(|n| Node::new(n.id, n.layer, kind_of(n.id, sensory, action), n.activation))
            .collect::<Vec<_>>();
        // fixed nodes first and in id order, internal nodes after as they were stored
        nodes.sort_by_key(|n| n.id.min(fixed));

        let connections = record
            .connections
            .into_iter()
            .map(|c| Connection::new(c.inno, c.from, c.to, c.weight, c.enabled))
            .collect();

        Ok(Genome::from_parts(
            record.id,
            record.fitness,
            (sensory, action),
            record.layers,
            nodes,
            connections,
        ))
    }
}

impl Genome {
    pub fn to_record(&self) -> GenomeRecord {
        self.into()
    }

    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, Error> {
        serde_json::from_str::<GenomeRecord>(s)?.try_into()
    }

    /// Write this genome to `path`, creating missing parent directories
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, self.to_string()?).map_err(|e| Error::io(path, e))?;
        log::info!("saved genome {} to {}", self.id, path.display());
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let genome = Self::from_str(&fs::read_to_string(path).map_err(|e| Error::io(path, e))?)?;
        log::info!("loaded genome {} from {}", genome.id, path.display());
        Ok(genome)
    }
}
