//! # Graph Store
//!
//! The node and edge store of a Network.
//!
//! All data structures use `BTreeMap` for deterministic ordering; a separate
//! insertion-order index backs `nodes()` / `edges()` for display.
//!
//! Invariants:
//! - Node identifiers are unique.
//! - Every edge's endpoints exist in the node set.
//! - At most one `Edge` per ordered pair; contradicting evidence becomes
//!   additional `EffectRecord`s on that edge.

use crate::{Accession, Edge, EdgeMerge, Effect, EffectRecord, NetworkError, Node, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Whether `add_edge` may create missing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointPolicy {
    /// Fail with `InvalidEdge` when an endpoint is unknown.
    #[default]
    Require,
    /// Create unknown endpoints with default label and inferred kind.
    Create,
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The main Graph structure.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
/// No `HashMap` allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    /// Node storage: Accession -> Node
    nodes: BTreeMap<Accession, Node>,

    /// Node insertion order.
    node_order: Vec<Accession>,

    /// Adjacency list: source -> (target -> Edge)
    edges: BTreeMap<Accession, BTreeMap<Accession, Edge>>,

    /// Edge insertion order.
    edge_order: Vec<(Accession, Accession)>,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    /// Add a node. Idempotent: an existing node is returned untouched.
    pub fn add_node(
        &mut self,
        id: Accession,
        label: Option<String>,
        kind: Option<NodeKind>,
    ) -> &Node {
        if !self.nodes.contains_key(&id) {
            self.node_order.push(id.clone());
        }
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| Node::new(id, label, kind))
    }

    /// Remove a node and every incident edge (both directions).
    ///
    /// Returns `false` if the node was not present.
    pub fn remove_node(&mut self, id: &Accession) -> bool {
        if self.nodes.remove(id).is_none() {
            return false;
        }
        self.node_order.retain(|n| n != id);

        self.edges.remove(id);
        for targets in self.edges.values_mut() {
            targets.remove(id);
        }
        self.edges.retain(|_, targets| !targets.is_empty());
        self.edge_order.retain(|(s, t)| s != id && t != id);
        true
    }

    /// Lookup a node.
    #[must_use]
    pub fn node(&self, id: &Accession) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Check if the graph contains a node.
    #[must_use]
    pub fn contains_node(&self, id: &Accession) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Node identifiers in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &Accession> + '_ {
        self.node_order.iter()
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Replace a node's display label. Returns `false` if the node is absent.
    pub fn set_label(&mut self, id: &Accession, label: impl Into<String>) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Move a node and every incident edge to a new identifier.
    /// Insertion order is preserved.
    ///
    /// Returns `Ok(false)` if `old` is absent. Fails with `NodeExists`
    /// when `new` already names another node.
    pub fn rename_node(&mut self, old: &Accession, new: &Accession) -> Result<bool, NetworkError> {
        if !self.nodes.contains_key(old) {
            return Ok(false);
        }
        if old == new {
            return Ok(true);
        }
        if self.nodes.contains_key(new) {
            return Err(NetworkError::NodeExists(new.to_string()));
        }

        if let Some(mut node) = self.nodes.remove(old) {
            node.id = new.clone();
            self.nodes.insert(new.clone(), node);
        }
        for id in &mut self.node_order {
            if id == old {
                *id = new.clone();
            }
        }

        if let Some(outgoing) = self.edges.remove(old) {
            let moved = outgoing
                .into_iter()
                .map(|(target, mut edge)| {
                    edge.source = new.clone();
                    (target, edge)
                })
                .collect();
            self.edges.insert(new.clone(), moved);
        }
        for targets in self.edges.values_mut() {
            if let Some(mut edge) = targets.remove(old) {
                edge.target = new.clone();
                targets.insert(new.clone(), edge);
            }
        }
        for (source, target) in &mut self.edge_order {
            if source == old {
                *source = new.clone();
            }
            if target == old {
                *target = new.clone();
            }
        }
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Edges
    // -------------------------------------------------------------------------

    /// Add evidence for the directed edge `source -> target`.
    ///
    /// Same effect as an existing record: evidence is unioned.
    /// Different effect: a new record is appended to the edge.
    pub fn add_edge(
        &mut self,
        source: &Accession,
        target: &Accession,
        record: EffectRecord,
        policy: EndpointPolicy,
    ) -> Result<EdgeMerge, NetworkError> {
        for endpoint in [source, target] {
            if self.contains_node(endpoint) {
                continue;
            }
            match policy {
                EndpointPolicy::Create => {
                    let kind = NodeKind::infer(endpoint);
                    self.add_node(endpoint.clone(), None, Some(kind));
                }
                EndpointPolicy::Require => {
                    return Err(NetworkError::InvalidEdge {
                        from: source.to_string(),
                        to: target.to_string(),
                        missing: endpoint.to_string(),
                    });
                }
            }
        }

        let targets = self.edges.entry(source.clone()).or_default();
        if let Some(edge) = targets.get_mut(target) {
            return Ok(edge.merge(record));
        }
        targets.insert(
            target.clone(),
            Edge::new(source.clone(), target.clone(), record),
        );
        self.edge_order.push((source.clone(), target.clone()));
        Ok(EdgeMerge::Created)
    }

    /// Remove the edge for an ordered pair with all its records.
    ///
    /// Returns `false` if no such edge existed.
    pub fn remove_edge(&mut self, source: &Accession, target: &Accession) -> bool {
        let Some(targets) = self.edges.get_mut(source) else {
            return false;
        };
        if targets.remove(target).is_none() {
            return false;
        }
        if targets.is_empty() {
            self.edges.remove(source);
        }
        self.edge_order.retain(|(s, t)| !(s == source && t == target));
        true
    }

    /// Lookup the edge for an ordered pair.
    #[must_use]
    pub fn edge(&self, source: &Accession, target: &Accession) -> Option<&Edge> {
        self.edges.get(source)?.get(target)
    }

    /// Check if the graph contains an edge for an ordered pair.
    #[must_use]
    pub fn contains_edge(&self, source: &Accession, target: &Accession) -> bool {
        self.edge(source, target).is_some()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_order.iter().filter_map(|(s, t)| self.edge(s, t))
    }

    /// Edges with a provenance entry containing `keyword`, in insertion order.
    pub fn edges_with_provenance<'a, 'k>(
        &'a self,
        keyword: &'k str,
    ) -> impl Iterator<Item = &'a Edge> {
        self.edges()
            .filter(move |edge| edge.provenance().iter().any(|p| p.contains(keyword)))
    }

    /// Remove the edges joining consecutive nodes of `path`.
    ///
    /// Missing edges are skipped. Returns the number of edges removed.
    pub fn remove_path(&mut self, path: &[Accession]) -> usize {
        path.windows(2)
            .filter(|pair| match pair {
                [source, target] => self.remove_edge(source, target),
                _ => false,
            })
            .count()
    }

    /// Get the total number of edges (ordered pairs).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    /// Targets of outgoing edges, in identifier order.
    pub fn successors(&self, id: &Accession) -> impl Iterator<Item = &Accession> + '_ {
        self.edges
            .get(id)
            .into_iter()
            .flat_map(|targets| targets.keys())
    }

    /// Sources of incoming edges, in identifier order.
    #[must_use]
    pub fn predecessors(&self, id: &Accession) -> Vec<&Accession> {
        self.edges
            .iter()
            .filter(|(_, targets)| targets.contains_key(id))
            .map(|(source, _)| source)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------------

    /// Drop every record carrying `effect`; edges left without records are removed.
    ///
    /// Returns the number of edges removed.
    pub fn remove_effect(&mut self, effect: Effect) -> usize {
        let mut emptied = Vec::new();
        for (source, targets) in &mut self.edges {
            for (target, edge) in targets.iter_mut() {
                edge.records.retain(|r| r.effect != effect);
                if edge.records.is_empty() {
                    emptied.push((source.clone(), target.clone()));
                }
            }
        }
        for (source, target) in &emptied {
            self.remove_edge(source, target);
        }
        emptied.len()
    }

    /// Remove nodes with no incident edge, except those in `keep`.
    ///
    /// Returns the number of nodes removed.
    pub fn remove_disconnected_nodes(&mut self, keep: &BTreeSet<Accession>) -> usize {
        let mut linked: BTreeSet<&Accession> = BTreeSet::new();
        for (source, targets) in &self.edges {
            linked.insert(source);
            linked.extend(targets.keys());
        }
        let isolated: Vec<Accession> = self
            .node_order
            .iter()
            .filter(|id| !linked.contains(id) && !keep.contains(*id))
            .cloned()
            .collect();
        for id in &isolated {
            self.remove_node(id);
        }
        isolated.len()
    }

    // -------------------------------------------------------------------------
    // Reachability
    // -------------------------------------------------------------------------

    /// Check whether a directed path of at most `max_len` hops exists
    /// from `source` to `target` over the edges already in the graph.
    #[must_use]
    pub fn has_path_within(
        &self,
        source: &Accession,
        target: &Accession,
        max_len: usize,
        signed_only: bool,
    ) -> bool {
        if !self.contains_node(source) || !self.contains_node(target) {
            return false;
        }

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(source);
        queue.push_back((source, 0usize));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_len {
                continue;
            }
            let Some(targets) = self.edges.get(current) else {
                continue;
            };
            for (next, edge) in targets {
                if signed_only && !edge.is_signed() {
                    continue;
                }
                if next == target {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back((next, depth.saturating_add(1)));
                }
            }
        }
        false
    }

    /// Undirected connected components.
    ///
    /// Components are ordered by the insertion position of their first
    /// member; members keep insertion order.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<Accession>> {
        let mut undirected: BTreeMap<&Accession, BTreeSet<&Accession>> = BTreeMap::new();
        for (source, targets) in &self.edges {
            for target in targets.keys() {
                undirected.entry(source).or_default().insert(target);
                undirected.entry(target).or_default().insert(source);
            }
        }

        let mut assigned: BTreeMap<&Accession, usize> = BTreeMap::new();
        let mut components: Vec<Vec<Accession>> = Vec::new();

        for start in &self.node_order {
            if assigned.contains_key(start) {
                continue;
            }
            let index = components.len();
            let mut queue = VecDeque::from([start]);
            assigned.insert(start, index);
            while let Some(current) = queue.pop_front() {
                for &next in undirected.get(current).into_iter().flatten() {
                    if !assigned.contains_key(next) {
                        assigned.insert(next, index);
                        queue.push_back(next);
                    }
                }
            }
            components.push(Vec::new());
        }

        for id in &self.node_order {
            if let Some(&index) = assigned.get(id) {
                if let Some(component) = components.get_mut(index) {
                    component.push(id.clone());
                }
            }
        }
        components
    }

    /// A graph is connected when it has at most one undirected component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Serializable representation of the graph for persistence.
///
/// Nodes and edges are listed in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl From<&Graph> for SerializableGraph {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().cloned().collect(),
        }
    }
}

impl TryFrom<SerializableGraph> for Graph {
    type Error = NetworkError;

    /// Rebuild a graph, rejecting duplicate nodes, duplicate ordered pairs,
    /// dangling endpoints and edges without records.
    fn try_from(sg: SerializableGraph) -> Result<Self, Self::Error> {
        let mut graph = Graph::new();

        for node in sg.nodes {
            if graph.contains_node(&node.id) {
                return Err(NetworkError::MalformedSnapshot(format!(
                    "duplicate node {}",
                    node.id
                )));
            }
            graph.node_order.push(node.id.clone());
            graph.nodes.insert(node.id.clone(), node);
        }

        for edge in sg.edges {
            if edge.records.is_empty() {
                return Err(NetworkError::MalformedSnapshot(format!(
                    "edge {} -> {} has no effect record",
                    edge.source, edge.target
                )));
            }
            if graph.contains_edge(&edge.source, &edge.target) {
                return Err(NetworkError::MalformedSnapshot(format!(
                    "duplicate edge {} -> {}",
                    edge.source, edge.target
                )));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !graph.contains_node(endpoint) {
                    return Err(NetworkError::MalformedSnapshot(format!(
                        "edge {} -> {} references unknown node {}",
                        edge.source, edge.target, endpoint
                    )));
                }
            }
            graph
                .edge_order
                .push((edge.source.clone(), edge.target.clone()));
            graph
                .edges
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone(), edge);
        }

        Ok(graph)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(s: &str) -> Accession {
        Accession::parse(s).expect("valid accession")
    }

    fn stim() -> EffectRecord {
        EffectRecord::new(Effect::Stimulation).with_reference("PMID:1")
    }

    fn graph_with(nodes: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for n in nodes {
            graph.add_node(acc(n), None, None);
        }
        graph
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut graph = Graph::new();
        graph.add_node(acc("P31749"), Some("AKT1".to_string()), Some(NodeKind::Gene));
        let again = graph.add_node(acc("P31749"), Some("other".to_string()), None);

        assert_eq!(again.label, "AKT1");
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph
            .add_edge(&acc("A"), &acc("B"), stim(), EndpointPolicy::Require)
            .expect("edge");
        graph
            .add_edge(&acc("B"), &acc("C"), stim(), EndpointPolicy::Require)
            .expect("edge");

        assert!(graph.remove_node(&acc("B")));
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.predecessors(&acc("C")).is_empty());

        // Absent identifier: explicit not-found signal, repeated removal is a no-op
        assert!(!graph.remove_node(&acc("B")));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn add_edge_requires_endpoints_under_require_policy() {
        let mut graph = graph_with(&["A"]);
        let result = graph.add_edge(&acc("A"), &acc("B"), stim(), EndpointPolicy::Require);

        assert!(matches!(result, Err(NetworkError::InvalidEdge { .. })));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn add_edge_creates_endpoints_under_create_policy() {
        let mut graph = Graph::new();
        let outcome = graph
            .add_edge(
                &acc("A"),
                &acc("COMPLEX:B_C"),
                stim(),
                EndpointPolicy::Create,
            )
            .expect("edge");

        assert_eq!(outcome, EdgeMerge::Created);
        assert_eq!(
            graph.node(&acc("COMPLEX:B_C")).and_then(|n| n.kind),
            Some(NodeKind::Complex)
        );
    }

    #[test]
    fn repeated_evidence_is_merged_not_duplicated() {
        let mut graph = graph_with(&["A", "B"]);
        let (a, b) = (acc("A"), acc("B"));
        graph
            .add_edge(&a, &b, stim(), EndpointPolicy::Require)
            .expect("edge");
        let second = graph
            .add_edge(&a, &b, stim(), EndpointPolicy::Require)
            .expect("edge");
        let third = graph
            .add_edge(
                &a,
                &b,
                EffectRecord::new(Effect::Inhibition),
                EndpointPolicy::Require,
            )
            .expect("edge");

        assert_eq!(second, EdgeMerge::Unchanged);
        assert_eq!(third, EdgeMerge::NewEffect);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edge(&a, &b).map(Edge::primary_effect),
            Some(Effect::Bimodal)
        );
    }

    #[test]
    fn rename_moves_node_and_incident_edges() {
        let mut graph = graph_with(&["A", "B", "C"]);
        let (a, b, c, x) = (acc("A"), acc("B"), acc("C"), acc("X"));
        graph.add_edge(&a, &b, stim(), EndpointPolicy::Require).expect("edge");
        graph.add_edge(&b, &c, stim(), EndpointPolicy::Require).expect("edge");
        graph.add_edge(&b, &b, stim(), EndpointPolicy::Require).expect("edge");

        assert!(graph.rename_node(&b, &x).expect("rename"));
        assert!(!graph.contains_node(&b));
        assert_eq!(graph.node(&x).map(|n| &n.id), Some(&x));
        assert!(graph.contains_edge(&a, &x));
        assert!(graph.contains_edge(&x, &c));
        assert!(graph.contains_edge(&x, &x));
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(
            graph.node_ids().map(Accession::as_str).collect::<Vec<_>>(),
            vec!["A", "X", "C"]
        );
        assert!(graph.edges().all(|e| e.source != b && e.target != b));

        assert!(!graph.rename_node(&b, &acc("Y")).expect("absent"));
        assert!(matches!(
            graph.rename_node(&a, &c),
            Err(NetworkError::NodeExists(_))
        ));
    }

    #[test]
    fn set_label_reports_absent_nodes() {
        let mut graph = graph_with(&["A"]);
        assert!(graph.set_label(&acc("A"), "AKT1"));
        assert_eq!(graph.node(&acc("A")).map(|n| n.label.as_str()), Some("AKT1"));
        assert!(!graph.set_label(&acc("B"), "AKT2"));
    }

    #[test]
    fn remove_path_drops_consecutive_edges_only() {
        let mut graph = graph_with(&["A", "B", "C"]);
        let (a, b, c) = (acc("A"), acc("B"), acc("C"));
        graph.add_edge(&a, &b, stim(), EndpointPolicy::Require).expect("edge");
        graph.add_edge(&b, &c, stim(), EndpointPolicy::Require).expect("edge");
        graph.add_edge(&a, &c, stim(), EndpointPolicy::Require).expect("edge");

        assert_eq!(graph.remove_path(&[a.clone(), b.clone(), c.clone()]), 2);
        assert!(graph.contains_edge(&a, &c));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.remove_path(&[a.clone(), b]), 0);
    }

    #[test]
    fn provenance_filter_matches_substrings() {
        let mut graph = graph_with(&["A", "B", "C"]);
        let (a, b, c) = (acc("A"), acc("B"), acc("C"));
        let radial = stim().with_provenance("connect_network_radially(max_len=2)");
        let manual = stim().with_provenance("add_edge(source=B, target=C)");
        graph.add_edge(&a, &b, radial, EndpointPolicy::Require).expect("edge");
        graph.add_edge(&b, &c, manual, EndpointPolicy::Require).expect("edge");

        let found: Vec<_> = graph.edges_with_provenance("radially").collect();
        assert_eq!(found.len(), 1);
        assert_eq!((&found[0].source, &found[0].target), (&a, &b));
        assert_eq!(graph.edges_with_provenance("connect").count(), 1);
        assert_eq!(graph.edges_with_provenance("prune").count(), 0);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut graph = graph_with(&["Z", "A", "M"]);
        graph
            .add_edge(&acc("Z"), &acc("A"), stim(), EndpointPolicy::Require)
            .expect("edge");
        graph
            .add_edge(&acc("A"), &acc("M"), stim(), EndpointPolicy::Require)
            .expect("edge");

        let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A", "M"]);

        let pairs: Vec<(&str, &str)> = graph
            .edges()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("Z", "A"), ("A", "M")]);

        // Restartable
        assert_eq!(graph.nodes().count(), 3);
    }

    #[test]
    fn remove_effect_drops_emptied_edges() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph
            .add_edge(
                &acc("A"),
                &acc("B"),
                EffectRecord::new(Effect::Undefined),
                EndpointPolicy::Require,
            )
            .expect("edge");
        graph
            .add_edge(&acc("B"), &acc("C"), stim(), EndpointPolicy::Require)
            .expect("edge");
        graph
            .add_edge(
                &acc("B"),
                &acc("C"),
                EffectRecord::new(Effect::Undefined),
                EndpointPolicy::Require,
            )
            .expect("edge");

        assert_eq!(graph.remove_effect(Effect::Undefined), 1);
        assert!(!graph.contains_edge(&acc("A"), &acc("B")));
        assert_eq!(
            graph.edge(&acc("B"), &acc("C")).map(|e| e.records.len()),
            Some(1)
        );
    }

    #[test]
    fn remove_disconnected_keeps_listed_nodes() {
        let mut graph = graph_with(&["A", "B", "C", "D"]);
        graph
            .add_edge(&acc("A"), &acc("B"), stim(), EndpointPolicy::Require)
            .expect("edge");

        let keep = BTreeSet::from([acc("C")]);
        assert_eq!(graph.remove_disconnected_nodes(&keep), 1);
        assert!(graph.contains_node(&acc("C")));
        assert!(!graph.contains_node(&acc("D")));
    }

    #[test]
    fn path_within_respects_bound() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph
            .add_edge(&acc("A"), &acc("B"), stim(), EndpointPolicy::Require)
            .expect("edge");
        graph
            .add_edge(&acc("B"), &acc("C"), stim(), EndpointPolicy::Require)
            .expect("edge");

        assert!(graph.has_path_within(&acc("A"), &acc("C"), 2, false));
        assert!(!graph.has_path_within(&acc("A"), &acc("C"), 1, false));
        assert!(!graph.has_path_within(&acc("C"), &acc("A"), 2, false));
    }

    #[test]
    fn components_are_undirected() {
        let mut graph = graph_with(&["A", "B", "C", "D"]);
        graph
            .add_edge(&acc("B"), &acc("A"), stim(), EndpointPolicy::Require)
            .expect("edge");

        let components = graph.components();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0], vec![acc("A"), acc("B")]);
        assert!(!graph.is_connected());

        graph
            .add_edge(&acc("C"), &acc("B"), stim(), EndpointPolicy::Require)
            .expect("edge");
        graph
            .add_edge(&acc("D"), &acc("C"), stim(), EndpointPolicy::Require)
            .expect("edge");
        assert!(graph.is_connected());
    }

    #[test]
    fn serialization_roundtrip_preserves_order() {
        let mut graph = graph_with(&["B", "A"]);
        graph
            .add_edge(&acc("B"), &acc("A"), stim(), EndpointPolicy::Require)
            .expect("edge");

        let restored = Graph::try_from(SerializableGraph::from(&graph)).expect("restore");
        assert_eq!(restored, graph);
    }

    #[test]
    fn dangling_edge_is_malformed() {
        let sg = SerializableGraph {
            nodes: vec![Node::new(acc("A"), None, None)],
            edges: vec![Edge::new(acc("A"), acc("B"), stim())],
        };
        assert!(matches!(
            Graph::try_from(sg),
            Err(NetworkError::MalformedSnapshot(_))
        ));
    }
}
