//! # History Manager
//!
//! Branching tree of immutable graph snapshots.
//!
//! Snapshots live in an arena keyed by `SnapshotId`; parent and child links
//! are ids, and the current position is an id. Snapshot ids follow creation
//! order and are never reused.
//!
//! Navigation:
//! - `commit` adds a child of the current snapshot and moves to it
//! - `undo` / `redo` walk to the parent / a child
//! - `checkout` jumps anywhere in the tree
//!
//! Pruning removes the oldest leaves first and never touches the path from
//! the root to the current snapshot.

use crate::graph::SerializableGraph;
use crate::{Graph, NetworkError, SnapshotId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// CAUSE
// =============================================================================

/// The operation that produced a snapshot, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    pub operation: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl Cause {
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }
}

impl fmt::Display for Cause {
    /// `operation(key=value, ...)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operation)?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// An immutable copy of the graph with its place in the history tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    id: SnapshotId,
    parent: Option<SnapshotId>,
    children: Vec<SnapshotId>,
    cause: Cause,
    created_at: DateTime<Utc>,
    graph: Graph,
}

impl Snapshot {
    #[must_use]
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<SnapshotId> {
        self.parent
    }

    /// Children in creation order.
    #[must_use]
    pub fn children(&self) -> &[SnapshotId] {
        &self.children
    }

    #[must_use]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Metadata summary without the graph.
    #[must_use]
    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            id: self.id,
            parent: self.parent,
            children: self.children.clone(),
            cause: self.cause.clone(),
            created_at: self.created_at,
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        }
    }
}

/// Snapshot metadata as returned by `History::list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub id: SnapshotId,
    pub parent: Option<SnapshotId>,
    pub children: Vec<SnapshotId>,
    pub cause: Cause,
    pub created_at: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
}

// =============================================================================
// HISTORY
// =============================================================================

/// The snapshot arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    snapshots: BTreeMap<SnapshotId, Snapshot>,
    root: SnapshotId,
    current: SnapshotId,
    next_id: u64,
    max_history: Option<usize>,
}

impl History {
    /// Start a history whose root holds `graph`.
    #[must_use]
    pub fn new(cause: Cause, graph: &Graph) -> Self {
        let root = SnapshotId(0);
        let snapshot = Snapshot {
            id: root,
            parent: None,
            children: Vec::new(),
            cause,
            created_at: Utc::now(),
            graph: graph.clone(),
        };
        Self {
            snapshots: BTreeMap::from([(root, snapshot)]),
            root,
            current: root,
            next_id: 1,
            max_history: None,
        }
    }

    #[must_use]
    pub fn root_id(&self) -> SnapshotId {
        self.root
    }

    #[must_use]
    pub fn current_id(&self) -> SnapshotId {
        self.current
    }

    /// The current snapshot.
    pub fn current(&self) -> Result<&Snapshot, NetworkError> {
        self.get(self.current)
    }

    pub fn get(&self, id: SnapshotId) -> Result<&Snapshot, NetworkError> {
        self.snapshots
            .get(&id)
            .ok_or(NetworkError::SnapshotNotFound(id))
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// A history always retains at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn max_history(&self) -> Option<usize> {
        self.max_history
    }

    /// Snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.snapshots.values()
    }

    /// Metadata of every snapshot in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<SnapshotInfo> {
        self.iter().map(Snapshot::info).collect()
    }

    /// Record `graph` as a new child of the current snapshot and move to it.
    pub fn commit(&mut self, cause: Cause, graph: &Graph) -> SnapshotId {
        let id = SnapshotId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let parent = self.current;
        if let Some(snapshot) = self.snapshots.get_mut(&parent) {
            snapshot.children.push(id);
        }
        tracing::debug!(snapshot = %id, parent = %parent, cause = %cause, "snapshot committed");
        self.snapshots.insert(
            id,
            Snapshot {
                id,
                parent: Some(parent),
                children: Vec::new(),
                cause,
                created_at: Utc::now(),
                graph: graph.clone(),
            },
        );
        self.current = id;
        self.prune();
        id
    }

    /// Move to the parent snapshot and return its graph.
    pub fn undo(&mut self) -> Result<&Graph, NetworkError> {
        let parent = self
            .current()?
            .parent
            .ok_or(NetworkError::HistoryBoundary(self.current))?;
        self.move_to(parent)
    }

    /// Move to a child snapshot and return its graph.
    ///
    /// `branch` indexes the children in creation order and may be omitted
    /// when there is exactly one child.
    pub fn redo(&mut self, branch: Option<usize>) -> Result<&Graph, NetworkError> {
        let at = self.current;
        let children = &self.current()?.children;
        let child = match (branch, children.as_slice()) {
            (_, []) => return Err(NetworkError::HistoryBoundary(at)),
            (None, [only]) => *only,
            (None, many) => {
                return Err(NetworkError::AmbiguousRedo {
                    at,
                    branches: many.len(),
                });
            }
            (Some(index), all) => *all.get(index).ok_or(NetworkError::HistoryBoundary(at))?,
        };
        self.move_to(child)
    }

    /// Jump to any retained snapshot and return its graph.
    pub fn checkout(&mut self, id: SnapshotId) -> Result<&Graph, NetworkError> {
        self.move_to(id)
    }

    fn move_to(&mut self, id: SnapshotId) -> Result<&Graph, NetworkError> {
        let snapshot = self
            .snapshots
            .get(&id)
            .ok_or(NetworkError::SnapshotNotFound(id))?;
        self.current = id;
        Ok(&snapshot.graph)
    }

    /// Ids from the root down to `id`.
    #[must_use]
    pub fn lineage(&self, id: SnapshotId) -> Vec<SnapshotId> {
        let mut lineage = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(snapshot) = self.snapshots.get(&current) else {
                break;
            };
            lineage.push(current);
            cursor = snapshot.parent;
        }
        lineage.reverse();
        lineage
    }

    /// Set (or clear) the retention limit and prune immediately.
    ///
    /// Returns the ids pruned.
    pub fn set_max_history(&mut self, limit: Option<usize>) -> Vec<SnapshotId> {
        self.max_history = limit;
        self.prune()
    }

    /// Remove the oldest leaves outside the root-to-current path until the
    /// limit is met or only protected snapshots remain.
    fn prune(&mut self) -> Vec<SnapshotId> {
        let Some(limit) = self.max_history else {
            return Vec::new();
        };
        let protected: BTreeSet<SnapshotId> = self.lineage(self.current).into_iter().collect();
        let mut pruned = Vec::new();

        while self.snapshots.len() > limit {
            let victim = self
                .snapshots
                .values()
                .find(|s| s.children.is_empty() && !protected.contains(&s.id))
                .map(|s| (s.id, s.parent));
            let Some((victim, parent)) = victim else {
                break;
            };
            self.snapshots.remove(&victim);
            if let Some(parent) = parent.and_then(|p| self.snapshots.get_mut(&p)) {
                parent.children.retain(|c| *c != victim);
            }
            pruned.push(victim);
        }

        if !pruned.is_empty() {
            tracing::debug!(pruned = pruned.len(), limit, "history pruned");
        }
        pruned
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render the tree as Graphviz DOT. The current snapshot is highlighted.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph history {\n");
        dot.push_str("    rankdir=TB;\n");
        dot.push_str("    node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");

        for snapshot in self.snapshots.values() {
            let mut attributes = format!(
                "label=\"State {}\\n{} nodes, {} edges\\n{}\"",
                snapshot.id,
                snapshot.graph.node_count(),
                snapshot.graph.edge_count(),
                snapshot.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            if snapshot.id == self.current {
                attributes.push_str(", style=\"rounded,filled\", fillcolor=\"lightblue\"");
            }
            dot.push_str(&format!("    \"{}\" [{}];\n", snapshot.id, attributes));
        }

        for snapshot in self.snapshots.values() {
            if let Some(parent) = snapshot.parent {
                dot.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    parent,
                    snapshot.id,
                    escape(&snapshot.cause.to_string())
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    /// Persistable form of the whole tree.
    #[must_use]
    pub fn to_record(&self) -> HistoryRecord {
        HistoryRecord {
            root: self.root,
            current: self.current,
            next_id: self.next_id,
            max_history: self.max_history,
            snapshots: self
                .snapshots
                .values()
                .map(|s| SnapshotRecord {
                    id: s.id,
                    parent: s.parent,
                    cause: s.cause.clone(),
                    created_at: s.created_at,
                    graph: SerializableGraph::from(&s.graph),
                })
                .collect(),
        }
    }

    /// Rebuild a history, validating the tree structure.
    pub fn from_record(record: HistoryRecord) -> Result<Self, NetworkError> {
        let malformed = |message: String| NetworkError::MalformedSnapshot(message);
        let mut snapshots: BTreeMap<SnapshotId, Snapshot> = BTreeMap::new();

        for entry in record.snapshots {
            if entry.id.0 >= record.next_id {
                return Err(malformed(format!(
                    "snapshot {} not below next id {}",
                    entry.id, record.next_id
                )));
            }
            let is_root = entry.id == record.root;
            if is_root != entry.parent.is_none() {
                return Err(malformed(format!(
                    "snapshot {} has inconsistent root status",
                    entry.id
                )));
            }
            let snapshot = Snapshot {
                id: entry.id,
                parent: entry.parent,
                children: Vec::new(),
                cause: entry.cause,
                created_at: entry.created_at,
                graph: Graph::try_from(entry.graph)?,
            };
            if snapshots.insert(entry.id, snapshot).is_some() {
                return Err(malformed(format!("duplicate snapshot {}", entry.id)));
            }
        }

        let links: Vec<(SnapshotId, SnapshotId)> = snapshots
            .values()
            .filter_map(|s| s.parent.map(|p| (p, s.id)))
            .collect();
        for (parent, child) in links {
            if parent >= child {
                return Err(malformed(format!(
                    "snapshot {child} is not newer than its parent {parent}"
                )));
            }
            snapshots
                .get_mut(&parent)
                .ok_or_else(|| malformed(format!("snapshot {child} has missing parent {parent}")))?
                .children
                .push(child);
        }

        if !snapshots.contains_key(&record.root) {
            return Err(malformed(format!("missing root {}", record.root)));
        }
        if !snapshots.contains_key(&record.current) {
            return Err(malformed(format!("missing current {}", record.current)));
        }

        Ok(Self {
            snapshots,
            root: record.root,
            current: record.current,
            next_id: record.next_id,
            max_history: record.max_history,
        })
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Persistable snapshot: graph contents plus tree metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: SnapshotId,
    pub parent: Option<SnapshotId>,
    pub cause: Cause,
    pub created_at: DateTime<Utc>,
    pub graph: SerializableGraph,
}

/// Persistable history tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub root: SnapshotId,
    pub current: SnapshotId,
    pub next_id: u64,
    pub max_history: Option<usize>,
    pub snapshots: Vec<SnapshotRecord>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Accession;

    fn graph_with(nodes: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for n in nodes {
            graph.add_node(Accession::parse(n).expect("valid"), None, None);
        }
        graph
    }

    fn linear(steps: usize) -> History {
        let mut history = History::new(Cause::new("init"), &Graph::new());
        let names = ["A", "B", "C", "D", "E", "F"];
        for i in 1..=steps {
            history.commit(Cause::new("add_node"), &graph_with(&names[..i]));
        }
        history
    }

    #[test]
    fn commit_then_undo_redo() {
        let mut history = linear(2);
        assert_eq!(history.current_id(), SnapshotId(2));

        let graph = history.undo().expect("undo").clone();
        assert_eq!(graph, graph_with(&["A"]));
        let graph = history.redo(None).expect("redo").clone();
        assert_eq!(graph, graph_with(&["A", "B"]));
    }

    #[test]
    fn undo_at_root_is_boundary() {
        let mut history = linear(0);
        assert_eq!(
            history.undo(),
            Err(NetworkError::HistoryBoundary(SnapshotId(0)))
        );
        assert_eq!(
            history.redo(None),
            Err(NetworkError::HistoryBoundary(SnapshotId(0)))
        );
    }

    #[test]
    fn branching_keeps_sibling() {
        let mut history = linear(1);
        history.undo().expect("undo");
        history.commit(Cause::new("add_node"), &graph_with(&["Z"]));

        let root = history.get(SnapshotId(0)).expect("root");
        assert_eq!(root.children(), &[SnapshotId(1), SnapshotId(2)]);
        assert_eq!(
            history.get(SnapshotId(1)).expect("sibling").graph(),
            &graph_with(&["A"])
        );

        history.undo().expect("undo");
        assert_eq!(
            history.redo(None),
            Err(NetworkError::AmbiguousRedo {
                at: SnapshotId(0),
                branches: 2
            })
        );
        let graph = history.redo(Some(0)).expect("redo").clone();
        assert_eq!(graph, graph_with(&["A"]));
    }

    #[test]
    fn checkout_unknown_snapshot_fails() {
        let mut history = linear(1);
        assert_eq!(
            history.checkout(SnapshotId(9)),
            Err(NetworkError::SnapshotNotFound(SnapshotId(9)))
        );
        history.checkout(SnapshotId(0)).expect("checkout");
        assert_eq!(history.current_id(), SnapshotId(0));
    }

    #[test]
    fn pruning_never_removes_current_lineage() {
        let mut history = linear(3);
        let pruned = history.set_max_history(Some(1));
        assert!(pruned.is_empty());
        assert_eq!(history.len(), 4);

        // Branch off the root; the old branch becomes prunable leaf by leaf
        history.checkout(SnapshotId(0)).expect("checkout");
        history.commit(Cause::new("add_node"), &graph_with(&["Z"]));
        assert_eq!(
            history.lineage(history.current_id()),
            vec![SnapshotId(0), SnapshotId(4)]
        );
        assert_eq!(history.len(), 2);
        assert!(history.get(SnapshotId(1)).is_err());
    }

    #[test]
    fn pruning_removes_oldest_leaf_first() {
        let mut history = History::new(Cause::new("init"), &Graph::new());
        history.commit(Cause::new("a"), &graph_with(&["A"]));
        history.undo().expect("undo");
        history.commit(Cause::new("b"), &graph_with(&["B"]));
        history.undo().expect("undo");
        history.commit(Cause::new("c"), &graph_with(&["C"]));

        let pruned = history.set_max_history(Some(3));
        assert_eq!(pruned, vec![SnapshotId(1)]);
    }

    #[test]
    fn dot_labels_states_and_causes() {
        let mut history = History::new(Cause::new("init"), &Graph::new());
        history.commit(
            Cause::new("add_node").with("identifier", "P31749"),
            &graph_with(&["P31749"]),
        );
        let dot = history.to_dot();

        assert!(dot.starts_with("digraph history {"));
        assert!(dot.contains("State 0"));
        assert!(dot.contains("\"0\" -> \"1\" [label=\"add_node(identifier=P31749)\"]"));
        assert!(dot.contains("fillcolor=\"lightblue\""));
    }

    #[test]
    fn dot_writes_one_statement_per_line() {
        let dot = linear(2).to_dot();
        let statements: Vec<&str> = dot.lines().map(str::trim).collect();

        // header, three states, two transitions, closing brace
        assert_eq!(statements.len(), 9);
        assert_eq!(statements.iter().filter(|l| l.contains("->")).count(), 2);
        assert_eq!(statements.last(), Some(&"}"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn record_roundtrip_rebuilds_children() {
        let mut history = linear(1);
        history.undo().expect("undo");
        history.commit(Cause::new("b"), &graph_with(&["B"]));

        let restored = History::from_record(history.to_record()).expect("restore");
        assert_eq!(restored, history);
    }

    #[test]
    fn record_with_orphan_is_malformed() {
        let mut record = linear(1).to_record();
        if let Some(entry) = record.snapshots.get_mut(1) {
            entry.parent = Some(SnapshotId(7));
        }
        assert!(matches!(
            History::from_record(record),
            Err(NetworkError::MalformedSnapshot(_))
        ));
    }
}
