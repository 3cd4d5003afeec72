use super::Connection;
use crate::{activate::Activation, config::Config, random::Happens};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Sensory,
    Action,
    Internal,
    /// the bias, whose output is fixed at 1 during a pass
    Static,
}

#[derive(Debug, PartialEq)]
pub struct Node {
    pub id: usize,
    pub layer: usize,
    pub kind: NodeKind,
    pub activation: Activation,
    pub input_sum: f64,
    pub output: f64,
    /// (target node index, connection index) for each enabled outgoing edge
    pub(crate) outgoing: Vec<(usize, usize)>,
}

impl Node {
    pub fn new(id: usize, layer: usize, kind: NodeKind, activation: Activation) -> Self {
        Self {
            id,
            layer,
            kind,
            activation,
            input_sum: 0.,
            output: if kind == NodeKind::Static { 1. } else { 0. },
            outgoing: Vec::new(),
        }
    }

    /// Sensory and bias nodes carry whatever output was set on them
    #[inline]
    pub fn is_passthrough(&self) -> bool {
        matches!(self.kind, NodeKind::Sensory | NodeKind::Static)
    }

    #[inline]
    pub fn activate(&mut self) {
        if !self.is_passthrough() {
            self.output = self.activation.apply(self.input_sum);
        }
    }

    /// Contribution of this node to each target it feeds, as (target index, weight * output)
    pub fn propagate_output<'a>(
        &'a self,
        connections: &'a [Connection],
    ) -> impl Iterator<Item = (usize, f64)> + 'a {
        self.outgoing
            .iter()
            .map(move |&(target, conn)| (target, &connections[conn]))
            .filter(|(_, c)| c.enabled)
            .map(move |(target, c)| (target, c.weight * self.output))
    }

    /// Perturb the resting value of the bias node, and maybe swap the activation of any node.
    /// The bias value is reset to 1 on every [crate::Genome::feed_forward], so only the weights
    /// of its edges carry a learned bias.
    pub fn mutate(&mut self, config: &Config, is_bias: bool, rng: &mut impl Rng) {
        if is_bias {
            self.output = config.bias.mutate(self.output, rng);
        }

        if rng.happens(config.activation_mutate_rate) {
            self.activation = Activation::random(rng);
        }
    }
}

/// Identity, layer and activation only. Accumulators reset, adjacency is left for the owning
/// genome to rebuild.
impl Clone for Node {
    fn clone(&self) -> Self {
        Self::new(self.id, self.layer, self.kind, self.activation)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, new_t, random::WyRng};

    #[test]
    fn test_activate() {
        let mut sensory = Node::new(0, 0, NodeKind::Sensory, Activation::Sigmoid);
        sensory.input_sum = 3.;
        sensory.output = 0.25;
        sensory.activate();
        assert_f64_approx!(sensory.output, 0.25);

        let mut bias = Node::new(3, 0, NodeKind::Static, Activation::Sigmoid);
        bias.activate();
        assert_f64_approx!(bias.output, 1.);

        let mut action = Node::new(2, 1, NodeKind::Action, Activation::Sigmoid);
        action.activate();
        assert_f64_approx!(action.output, 0.5);
    }

    #[test]
    fn test_propagate_skips_disabled() {
        let connections = vec![
            Connection::new(0, 0, 1, 2., true),
            Connection::new(1, 0, 2, 3., false),
        ];
        let mut node = Node::new(0, 0, NodeKind::Sensory, Activation::Linear);
        node.output = 0.5;
        node.outgoing = vec![(1, 0), (2, 1)];
        assert_eq!(
            node.propagate_output(&connections).collect::<Vec<_>>(),
            vec![(1, 1.)]
        );
    }

    #[test]
    fn test_clone_resets() {
        let mut node = Node::new(5, 2, NodeKind::Internal, Activation::Relu);
        node.input_sum = 4.;
        node.output = 4.;
        node.outgoing.push((1, 1));
        let clone = node.clone();
        assert_eq!(clone.id, 5);
        assert_eq!(clone.layer, 2);
        assert_eq!(clone.activation, Activation::Relu);
        assert_f64_approx!(clone.input_sum, 0.);
        assert!(clone.outgoing.is_empty());
    }

    #[test]
    fn test_mutate_activation() {
        let mut rng = WyRng::seeded(2);
        let config = new_t!(Config, activation_mutate_rate = 1.);
        let mut seen = std::collections::HashSet::new();
        let mut node = Node::new(5, 1, NodeKind::Internal, Activation::Sigmoid);
        for _ in 0..500 {
            node.mutate(&config, false, &mut rng);
            seen.insert(node.activation);
        }
        assert_eq!(seen.len(), Activation::ALL.len());
    }

    #[test]
    fn test_mutate_bias_within_bounds() {
        let mut rng = WyRng::seeded(9);
        let mut config = new_t!(Config, activation_mutate_rate = 0.);
        config.bias.min_value = -2.;
        config.bias.max_value = 2.;
        config.bias.replace_rate = 0.5;
        let mut bias = Node::new(3, 0, NodeKind::Static, Activation::Sigmoid);
        for _ in 0..1_000 {
            bias.mutate(&config, true, &mut rng);
            assert!((-2. ..=2.).contains(&bias.output));
        }

        let mut hidden = Node::new(4, 1, NodeKind::Internal, Activation::Sigmoid);
        hidden.mutate(&config, false, &mut rng);
        assert_f64_approx!(hidden.output, 0.);
        assert_eq!(hidden.activation, Activation::Sigmoid);
    }
}
