//! # Comparison
//!
//! Pure set-difference classification of two graphs.
//!
//! Nodes are compared by identifier, edges by ordered (source, target) pair
//! regardless of effect. Pairs present in both graphs with different
//! primary effects are additionally listed by `conflicting_edges`.

use crate::{Accession, Graph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where an element occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    OnlyFirst,
    OnlySecond,
    Common,
}

/// Node and edge classification of two graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub nodes: BTreeMap<Accession, Membership>,
    pub edges: BTreeMap<(Accession, Accession), Membership>,
    conflicts: Vec<(Accession, Accession)>,
}

impl Comparison {
    /// Node identifiers with the given membership, in identifier order.
    #[must_use]
    pub fn nodes_with(&self, membership: Membership) -> Vec<&Accession> {
        self.nodes
            .iter()
            .filter(|(_, m)| **m == membership)
            .map(|(id, _)| id)
            .collect()
    }

    /// Ordered pairs with the given membership.
    #[must_use]
    pub fn edges_with(&self, membership: Membership) -> Vec<&(Accession, Accession)> {
        self.edges
            .iter()
            .filter(|(_, m)| **m == membership)
            .map(|(pair, _)| pair)
            .collect()
    }

    /// Common ordered pairs whose primary effects differ.
    #[must_use]
    pub fn conflicting_edges(&self) -> &[(Accession, Accession)] {
        &self.conflicts
    }
}

/// Classify the nodes and edges of `first` against `second`.
#[must_use]
pub fn compare(first: &Graph, second: &Graph) -> Comparison {
    let mut comparison = Comparison::default();

    for node in first.nodes() {
        let membership = if second.contains_node(&node.id) {
            Membership::Common
        } else {
            Membership::OnlyFirst
        };
        comparison.nodes.insert(node.id.clone(), membership);
    }
    for node in second.nodes() {
        comparison
            .nodes
            .entry(node.id.clone())
            .or_insert(Membership::OnlySecond);
    }

    for edge in first.edges() {
        let pair = (edge.source.clone(), edge.target.clone());
        let membership = match second.edge(&edge.source, &edge.target) {
            Some(other) => {
                if other.primary_effect() != edge.primary_effect() {
                    comparison.conflicts.push(pair.clone());
                }
                Membership::Common
            }
            None => Membership::OnlyFirst,
        };
        comparison.edges.insert(pair, membership);
    }
    for edge in second.edges() {
        comparison
            .edges
            .entry((edge.source.clone(), edge.target.clone()))
            .or_insert(Membership::OnlySecond);
    }

    comparison.conflicts.sort();
    comparison
}
