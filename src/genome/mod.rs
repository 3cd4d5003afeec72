pub mod connection;
pub mod node;

pub use connection::Connection;
pub use node::{Node, NodeKind};

use crate::{
    config::{Config, InitialConnections},
    constants::{
        NEATWORK_CROSSOVER_KEEP_DISABLED_PROB, NEATWORK_CROSSOVER_PICK_LESS_FIT_PROB,
        NEATWORK_GENOME_ID_LEN,
    },
    error::Error,
    innovation::InnovationRegistry,
    random::Happens,
};
use fxhash::FxHashMap;
use rand::{distr::Alphanumeric, Rng};

/// A fresh alphanumeric genome id
pub fn new_id(rng: &mut impl Rng) -> String {
    (0..NEATWORK_GENOME_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// A layered feed-forward network and the genes describing it.
///
/// Node ids are laid out as sensory `0..sensory`, action `sensory..sensory + action`, the bias
/// right after, and internal nodes above that. The node vector keeps the same order, so the
/// first `sensory + action + 1` entries are always the fixed nodes.
#[derive(Debug)]
pub struct Genome {
    pub id: String,
    pub fitness: f64,
    sensory: usize,
    action: usize,
    layers: usize,
    next_node: usize,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    lookup: FxHashMap<usize, usize>,
    order: Vec<usize>,
}

impl Genome {
    /// A genome with its sensory, action and bias nodes, and no connections
    pub fn new(config: &Config, rng: &mut impl Rng) -> Self {
        let (sensory, action) = (config.num_inputs, config.num_outputs);
        let act = config.activation_default;
        let nodes = (0..sensory)
            .map(|id| Node::new(id, 0, NodeKind::Sensory, act))
            .chain((sensory..sensory + action).map(|id| Node::new(id, 1, NodeKind::Action, act)))
            .chain([Node::new(sensory + action, 0, NodeKind::Static, act)])
            .collect();

        let mut genome = Self {
            id: new_id(rng),
            fitness: 0.,
            sensory,
            action,
            layers: 2,
            next_node: sensory + action + 1,
            nodes,
            connections: Vec::new(),
            lookup: FxHashMap::default(),
            order: Vec::new(),
        };
        genome.generate_network();
        genome
    }

    /// A fresh genome, wired up if the config asks for it
    pub fn initial(config: &Config, registry: &mut InnovationRegistry, rng: &mut impl Rng) -> Self {
        let mut genome = Self::new(config, rng);
        if config.initial_connections == InitialConnections::Full {
            genome.fully_connect(config, registry, rng);
        }
        genome
    }

    /// Assemble a genome from already validated parts
    pub(crate) fn from_parts(
        id: String,
        fitness: f64,
        (sensory, action): (usize, usize),
        layers: usize,
        nodes: Vec<Node>,
        connections: Vec<Connection>,
    ) -> Self {
        let next_node = nodes
            .iter()
            .map(|n| n.id + 1)
            .max()
            .unwrap_or(0)
            .max(sensory + action + 1);
        let mut genome = Self {
            id,
            fitness,
            sensory,
            action,
            layers,
            next_node,
            nodes,
            connections,
            lookup: FxHashMap::default(),
            order: Vec::new(),
        };
        genome.generate_network();
        genome
    }

    #[inline]
    pub fn sensory(&self) -> usize {
        self.sensory
    }

    #[inline]
    pub fn action(&self) -> usize {
        self.action
    }

    #[inline]
    pub fn bias_id(&self) -> usize {
        self.sensory + self.action
    }

    #[inline]
    pub fn layers(&self) -> usize {
        self.layers
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[inline]
    pub fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    #[inline]
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.lookup.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Node indices in evaluation order
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Innovation ids of every gene this genome carries, enabled or not
    pub fn inno_signature(&self) -> Vec<usize> {
        self.connections.iter().map(|c| c.inno).collect()
    }

    pub fn matching_gene(&self, inno: usize) -> Option<&Connection> {
        self.connections.iter().find(|c| c.inno == inno)
    }

    fn layer_of(&self, id: usize) -> usize {
        self.node(id).map_or(0, |n| n.layer)
    }

    fn is_connected(&self, from: usize, to: usize) -> bool {
        self.connections
            .iter()
            .any(|c| c.path() == (from, to) || c.path() == (to, from))
    }

    /// Push a new gene, resolving its innovation id against the genes already present
    fn push_connection(
        &mut self,
        (from, to): (usize, usize),
        weight: f64,
        config: &Config,
        registry: &mut InnovationRegistry,
    ) -> usize {
        let inno = registry.lookup_or_create(from, to, &self.inno_signature());
        self.connections.push(Connection::new(
            inno,
            from,
            to,
            weight,
            config.enabled_default,
        ));
        inno
    }

    /// Rebuild the id lookup, per-node adjacency and evaluation order from the gene list
    pub fn generate_network(&mut self) {
        self.lookup = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id, idx))
            .collect();

        for node in self.nodes.iter_mut() {
            node.outgoing.clear();
        }

        for (c_idx, c) in self.connections.iter().enumerate() {
            if !c.enabled {
                continue;
            }
            if let (Some(&from), Some(&to)) = (self.lookup.get(&c.from), self.lookup.get(&c.to)) {
                self.nodes[from].outgoing.push((to, c_idx));
            }
        }

        let mut order = (0..self.nodes.len()).collect::<Vec<_>>();
        order.sort_by_key(|&idx| self.nodes[idx].layer);
        self.order = order;
    }

    /// Evaluate the network on `inputs`. Accumulators are cleared afterwards whatever happens.
    pub fn feed_forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, Error> {
        if inputs.len() != self.sensory {
            return Err(Error::Arity {
                expected: self.sensory,
                got: inputs.len(),
            });
        }

        for (node, &x) in self.nodes[..self.sensory].iter_mut().zip(inputs) {
            node.output = x;
        }
        self.nodes[self.sensory + self.action].output = 1.;

        let mut pending = Vec::new();
        for &idx in self.order.iter() {
            self.nodes[idx].activate();
            pending.extend(self.nodes[idx].propagate_output(&self.connections));
            for (target, v) in pending.drain(..) {
                self.nodes[target].input_sum += v;
            }
        }

        let outputs = self.nodes[self.sensory..self.sensory + self.action]
            .iter()
            .map(|n| n.output)
            .collect::<Vec<_>>();

        for node in self.nodes.iter_mut() {
            node.input_sum = 0.;
        }

        if outputs.iter().all(|v| v.is_finite()) {
            Ok(outputs)
        } else {
            Err(Error::NumericFault)
        }
    }

    /// Connect every sensory node and the bias to every action node
    pub fn fully_connect(
        &mut self,
        config: &Config,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) {
        let bias = self.bias_id();
        let sources = (0..self.sensory).chain([bias]).collect::<Vec<_>>();
        for from in sources {
            for to in self.sensory..self.sensory + self.action {
                if !self.is_connected(from, to) {
                    let weight = config.weight.sample(rng);
                    self.push_connection((from, to), weight, config, registry);
                }
            }
        }
        self.generate_network();
    }

    /// Whether every pair of nodes in distinct layers is already joined
    pub fn fully_connected(&self) -> bool {
        let mut per_layer = Vec::<usize>::new();
        for node in self.nodes.iter() {
            if node.layer >= per_layer.len() {
                per_layer.resize(node.layer + 1, 0);
            }
            per_layer[node.layer] += 1;
        }

        let mut above = self.nodes.len();
        let mut max = 0;
        for count in per_layer {
            above -= count;
            max += count * above;
        }

        self.connections.len() >= max
    }

    /// Join two unconnected nodes in distinct layers, chosen uniformly among all such pairs
    pub fn add_connection(
        &mut self,
        config: &Config,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) {
        if self.fully_connected() {
            return;
        }

        let candidates = self
            .nodes
            .iter()
            .flat_map(|l| self.nodes.iter().map(move |r| (l, r)))
            .filter(|(l, r)| l.layer < r.layer && !self.is_connected(l.id, r.id))
            .map(|(l, r)| (l.id, r.id))
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            return;
        }

        let (from, to) = candidates[rng.random_range(0..candidates.len())];
        let weight = config.weight.sample(rng);
        self.push_connection((from, to), weight, config, registry);
        self.generate_network();
    }

    pub fn remove_connection(&mut self, rng: &mut impl Rng) {
        if self.connections.is_empty() {
            return;
        }
        let idx = rng.random_range(0..self.connections.len());
        self.connections.remove(idx);
        self.generate_network();
    }

    /// Split an enabled connection with a new internal node.
    ///
    /// The split connection is disabled and replaced by `from -{1}> new -{w}> to`, and the bias
    /// is wired into the new node. Connections leaving the bias are only split when nothing else
    /// is enabled. If the new node would share a layer with the old target, every node at or
    /// above that layer moves up one.
    pub fn add_node(
        &mut self,
        config: &Config,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) {
        let bias = self.bias_id();
        let enabled = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.enabled)
            .map(|(idx, c)| (idx, c.from))
            .collect::<Vec<_>>();
        if enabled.is_empty() {
            self.add_connection(config, registry, rng);
            return;
        }

        let preferred = enabled
            .iter()
            .filter(|(_, from)| *from != bias)
            .map(|(idx, _)| *idx)
            .collect::<Vec<_>>();
        let split = if preferred.is_empty() {
            enabled[rng.random_range(0..enabled.len())].0
        } else {
            preferred[rng.random_range(0..preferred.len())]
        };

        self.connections[split].disable();
        let Connection {
            from, to, weight, ..
        } = self.connections[split];

        let center = self.next_node;
        self.next_node += 1;
        let layer = self.layer_of(from) + 1;
        let target_layer = self.layer_of(to);

        if layer == target_layer {
            for node in self.nodes.iter_mut().filter(|n| n.layer >= layer) {
                node.layer += 1;
            }
            self.layers += 1;
        }

        self.nodes.push(Node::new(
            center,
            layer,
            NodeKind::Internal,
            config.activation_default,
        ));
        self.lookup.insert(center, self.nodes.len() - 1);

        self.push_connection((from, center), 1., config, registry);
        self.push_connection((center, to), weight, config, registry);
        if from != bias {
            let bias_weight = config.bias.sample(rng);
            self.push_connection((bias, center), bias_weight, config, registry);
        }

        self.generate_network();
    }

    /// Drop a random internal node along with every connection touching it
    pub fn remove_node(&mut self, rng: &mut impl Rng) {
        let internal = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind == NodeKind::Internal)
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();
        if internal.is_empty() {
            return;
        }

        let idx = internal[rng.random_range(0..internal.len())];
        let id = self.nodes.remove(idx).id;
        self.connections.retain(|c| c.from != id && c.to != id);
        self.generate_network();
    }

    /// Mutate every node and connection, then roll for each structural mutation independently
    pub fn mutate(
        &mut self,
        config: &Config,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) {
        if self.connections.is_empty() {
            self.add_connection(config, registry, rng);
        }

        let bias = self.bias_id();
        for node in self.nodes.iter_mut() {
            let is_bias = node.id == bias;
            node.mutate(config, is_bias, rng);
        }
        for connection in self.connections.iter_mut() {
            connection.mutate(config, rng);
        }

        if rng.happens(config.conn_add_prob) {
            self.add_connection(config, registry, rng);
        }
        if rng.happens(config.conn_delete_prob) {
            self.remove_connection(rng);
        }
        if rng.happens(config.node_add_prob) {
            self.add_node(config, registry, rng);
        }
        if rng.happens(config.node_delete_prob) {
            self.remove_node(rng);
        }

        self.generate_network();
    }

    /// Cross `self`, the fitter or equally fit parent, with `other`.
    ///
    /// The child takes its topology from `self`. Genes both parents carry are picked from either
    /// at random, and stay off most of the time if either copy is off. Genes only `self` carries
    /// are inherited as they are.
    pub fn crossover(&self, other: &Self, rng: &mut impl Rng) -> Self {
        let connections = self
            .connections
            .iter()
            .map(|gene| match other.matching_gene(gene.inno) {
                Some(theirs) => {
                    let disable = (!gene.enabled || !theirs.enabled)
                        && rng.happens(NEATWORK_CROSSOVER_KEEP_DISABLED_PROB);
                    let pick = if rng.happens(NEATWORK_CROSSOVER_PICK_LESS_FIT_PROB) {
                        theirs
                    } else {
                        gene
                    };
                    Connection {
                        enabled: !disable,
                        ..pick.rebound(gene.from, gene.to)
                    }
                }
                None => gene.clone(),
            })
            .collect();

        let mut child = Self {
            id: new_id(rng),
            fitness: 0.,
            sensory: self.sensory,
            action: self.action,
            layers: self.layers,
            next_node: self.next_node,
            nodes: self.nodes.to_vec(),
            connections,
            lookup: FxHashMap::default(),
            order: Vec::new(),
        };
        child.generate_network();
        child
    }
}

/// Deep copy with the same id. Accumulators start cleared.
impl Clone for Genome {
    fn clone(&self) -> Self {
        let mut genome = Self {
            id: self.id.clone(),
            fitness: self.fitness,
            sensory: self.sensory,
            action: self.action,
            layers: self.layers,
            next_node: self.next_node,
            nodes: self.nodes.to_vec(),
            connections: self.connections.to_vec(),
            lookup: FxHashMap::default(),
            order: Vec::new(),
        };
        genome.generate_network();
        genome
    }
}
