use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::domain::Item;
use crate::mining::RuleSet;

/// Undirected, lift-weighted link between two items.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkEdge {
    pub source: Item,
    pub target: Item,
    pub weight: f64,
}

/// Item relationship graph extracted from the strongest rules.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ServiceNetwork {
    nodes: Vec<Item>,
    edges: Vec<NetworkEdge>,
}

impl ServiceNetwork {
    /// Takes the first `max_connections` rules with lift of at least
    /// `min_lift` and links the first antecedent item to the first consequent
    /// item. A pair already linked keeps its earlier, higher weight.
    pub fn from_rules(rules: &RuleSet, min_lift: f64, max_connections: usize) -> Self {
        let mut nodes = BTreeSet::new();
        let mut linked: HashSet<(&Item, &Item)> = HashSet::new();
        let mut edges = Vec::new();

        for rule in rules.iter().filter(|rule| rule.lift >= min_lift).take(max_connections) {
            let (Some(source), Some(target)) = (rule.antecedent.first(), rule.consequent.first()) else {
                continue;
            };

            let key = if source <= target { (source, target) } else { (target, source) };
            if !linked.insert(key) {
                continue;
            }

            nodes.insert(source.clone());
            nodes.insert(target.clone());
            edges.push(NetworkEdge { source: source.clone(), target: target.clone(), weight: rule.lift });
        }

        tracing::debug!(
            event_name = "analysis.network.built",
            nodes = nodes.len(),
            edges = edges.len(),
            min_lift,
            max_connections,
            "service network built"
        );

        Self { nodes: nodes.into_iter().collect(), edges }
    }

    pub fn nodes(&self) -> &[Item] {
        &self.nodes
    }

    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    /// Weight of the edge between two items, in either direction.
    pub fn weight(&self, a: &Item, b: &Item) -> Option<f64> {
        self.edges
            .iter()
            .find(|edge| (&edge.source == a && &edge.target == b) || (&edge.source == b && &edge.target == a))
            .map(|edge| edge.weight)
    }
}
