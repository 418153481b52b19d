//! # Core Type Definitions
//!
//! This module contains the core types of the Signet network engine:
//! - Identifiers (`Accession`, `SnapshotId`, `Confidence`)
//! - Interaction semantics (`Effect`, `EffectRecord`)
//! - Graph elements (`Node`, `NodeKind`, `Edge`)
//! - Error types (`NetworkError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they key a `BTreeMap`/`BTreeSet`
//! - Use saturating arithmetic for counters to prevent overflow

use crate::primitives::MAX_IDENTIFIER_LENGTH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// A normalized, stable accession identifying a node (protein, gene,
/// complex or phenotype).
///
/// Accessions are validated on construction: non-empty, at most
/// `MAX_IDENTIFIER_LENGTH` bytes, no whitespace and no control characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Accession(pub(crate) String);

impl Accession {
    /// Parse and validate a raw identifier.
    ///
    /// Surrounding whitespace is trimmed before validation.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, NetworkError> {
        let raw = raw.as_ref();
        let trimmed = raw.trim();
        let malformed = trimmed.is_empty()
            || trimmed.len() > MAX_IDENTIFIER_LENGTH
            || trimmed.chars().any(|c| c.is_whitespace() || c.is_control());
        if malformed {
            return Err(NetworkError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the accession as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequence identifier of a snapshot in the history tree.
/// Assigned in creation order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Confidence of a resource interaction, expressed as the number of
/// independent evidence items supporting it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Confidence(pub u32);

impl Confidence {
    /// Create a confidence with the given evidence count.
    #[must_use]
    pub const fn new(evidence: u32) -> Self {
        Self(evidence)
    }

    /// Add one supporting evidence item using saturating arithmetic.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Get the raw evidence count.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

// =============================================================================
// EFFECT
// =============================================================================

/// The regulatory effect of a directed interaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Stimulation,
    Inhibition,
    Bimodal,
    #[default]
    Undefined,
}

impl Effect {
    /// An effect is signed when it is a stimulation or an inhibition.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Effect::Stimulation | Effect::Inhibition)
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Effect::Stimulation => "stimulation",
            Effect::Inhibition => "inhibition",
            Effect::Bimodal => "bimodal",
            Effect::Undefined => "undefined",
        }
    }

    /// Derive an effect from stimulation/inhibition flags.
    /// Both flags set is bimodal, neither is undefined.
    #[must_use]
    pub const fn from_flags(stimulation: bool, inhibition: bool) -> Self {
        match (stimulation, inhibition) {
            (true, true) => Effect::Bimodal,
            (true, false) => Effect::Stimulation,
            (false, true) => Effect::Inhibition,
            (false, false) => Effect::Undefined,
        }
    }

    /// Map a free-form interaction label (SIF verbs, arrows, signs) to an effect.
    /// Unrecognised labels map to `Undefined`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "1" | "+" | "->" | "activate" | "activates" | "stimulate" | "stimulates"
            | "stimulation" => Effect::Stimulation,
            "-1" | "-" | "-|" | "inhibit" | "inhibits" | "block" | "inhibition" => {
                Effect::Inhibition
            }
            "bimodal" | "both" => Effect::Bimodal,
            _ => Effect::Undefined,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NODE
// =============================================================================

/// Type tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Gene,
    Phenotype,
    Complex,
}

impl NodeKind {
    /// Infer the kind of a resource identifier: `COMPLEX:` prefixed
    /// accessions are complexes, everything else is a gene product.
    #[must_use]
    pub fn infer(id: &Accession) -> Self {
        if id.as_str().starts_with("COMPLEX:") {
            NodeKind::Complex
        } else {
            NodeKind::Gene
        }
    }
}

/// A node of the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The unique identifier.
    pub id: Accession,
    /// Display label (gene symbol, phenotype name).
    pub label: String,
    /// Optional type tag.
    pub kind: Option<NodeKind>,
}

impl Node {
    /// Create a node. The label defaults to the identifier.
    #[must_use]
    pub fn new(id: Accession, label: Option<String>, kind: Option<NodeKind>) -> Self {
        let label = label.unwrap_or_else(|| id.as_str().to_string());
        Self { id, label, kind }
    }
}

// =============================================================================
// EDGE
// =============================================================================

/// One piece of evidence for an edge: an effect together with the
/// interaction types, references and resource tags that support it.
///
/// `provenance` names the operations that contributed the evidence, e.g.
/// `complete_connection(max_len=2, ...)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectRecord {
    pub effect: Effect,
    #[serde(default)]
    pub interaction_types: BTreeSet<String>,
    #[serde(default)]
    pub references: BTreeSet<String>,
    #[serde(default)]
    pub sources: BTreeSet<String>,
    #[serde(default)]
    pub provenance: BTreeSet<String>,
}

impl EffectRecord {
    /// Create a bare record for an effect.
    #[must_use]
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            ..Self::default()
        }
    }

    /// Attach a reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.insert(reference.into());
        self
    }

    /// Attach an interaction type annotation.
    #[must_use]
    pub fn with_type(mut self, interaction_type: impl Into<String>) -> Self {
        self.interaction_types.insert(interaction_type.into());
        self
    }

    /// Attach a resource/source tag.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.insert(source.into());
        self
    }

    /// Record the operation that produced this evidence.
    #[must_use]
    pub fn with_provenance(mut self, operation: impl Into<String>) -> Self {
        self.provenance.insert(operation.into());
        self
    }

    /// Union another record's evidence into this one.
    /// Returns `true` if anything new was added.
    fn absorb(&mut self, other: EffectRecord) -> bool {
        let before = self.evidence_len();
        self.interaction_types.extend(other.interaction_types);
        self.references.extend(other.references);
        self.sources.extend(other.sources);
        self.provenance.extend(other.provenance);
        self.evidence_len() != before
    }

    fn evidence_len(&self) -> usize {
        self.interaction_types.len()
            + self.references.len()
            + self.sources.len()
            + self.provenance.len()
    }
}

/// Outcome of merging evidence into the edge store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMerge {
    /// A new edge was created for the ordered pair.
    Created,
    /// Evidence was unioned into an existing record with the same effect.
    Merged,
    /// The edge existed with a different effect; a new record was appended.
    NewEffect,
    /// Everything was already known.
    Unchanged,
}

/// A directed edge with its accumulated evidence.
///
/// Contradicting effects are kept as separate records, never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: Accession,
    pub target: Accession,
    pub records: Vec<EffectRecord>,
}

impl Edge {
    /// Create an edge from its first evidence record.
    #[must_use]
    pub fn new(source: Accession, target: Accession, record: EffectRecord) -> Self {
        Self {
            source,
            target,
            records: vec![record],
        }
    }

    /// Merge an evidence record into this edge.
    pub fn merge(&mut self, record: EffectRecord) -> EdgeMerge {
        match self.records.iter_mut().find(|r| r.effect == record.effect) {
            Some(existing) => {
                if existing.absorb(record) {
                    EdgeMerge::Merged
                } else {
                    EdgeMerge::Unchanged
                }
            }
            None => {
                self.records.push(record);
                EdgeMerge::NewEffect
            }
        }
    }

    /// All distinct effects recorded for this edge.
    #[must_use]
    pub fn effects(&self) -> BTreeSet<Effect> {
        self.records.iter().map(|r| r.effect).collect()
    }

    /// Check whether a specific effect has been recorded.
    #[must_use]
    pub fn has_effect(&self, effect: Effect) -> bool {
        self.records.iter().any(|r| r.effect == effect)
    }

    /// The single effect label summarising all records.
    ///
    /// Stimulation and inhibition evidence together reconcile to bimodal.
    #[must_use]
    pub fn primary_effect(&self) -> Effect {
        let stimulation = self.has_effect(Effect::Stimulation);
        let inhibition = self.has_effect(Effect::Inhibition);
        if stimulation || inhibition {
            return Effect::from_flags(stimulation, inhibition);
        }
        if self.has_effect(Effect::Bimodal) {
            Effect::Bimodal
        } else {
            Effect::Undefined
        }
    }

    /// An edge is signed when its primary effect is signed.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.primary_effect().is_signed()
    }

    /// Union of references over all records.
    #[must_use]
    pub fn references(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| r.references.iter().map(String::as_str))
            .collect()
    }

    /// Union of provenance entries over all records.
    #[must_use]
    pub fn provenance(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| r.provenance.iter().map(String::as_str))
            .collect()
    }

    /// Union of interaction type annotations over all records.
    #[must_use]
    pub fn interaction_types(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| r.interaction_types.iter().map(String::as_str))
            .collect()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Signet engine.
///
/// - No silent failures
/// - Use `Result<T, NetworkError>` for fallible operations
/// - Per-identifier failures during multi-seed work are collected into a
///   `ConnectionReport` instead of aborting the operation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum NetworkError {
    /// The identifier cannot be normalized into an accession.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The identifier translation collaborator could not resolve the identifier.
    #[error("Unresolved identifier: {0}")]
    UnresolvedIdentifier(String),

    /// The seed is unknown to the interaction resource.
    #[error("Invalid seed (not present in the interaction resource): {0}")]
    InvalidSeed(String),

    /// An edge endpoint is missing and implicit node creation is disabled.
    #[error("Invalid edge {from} -> {to}: endpoint {missing} is not in the network")]
    InvalidEdge {
        from: String,
        to: String,
        missing: String,
    },

    /// A rename target already names another node.
    #[error("Node already exists: {0}")]
    NodeExists(String),

    /// Undo past the root, or redo from a snapshot without children.
    #[error("History boundary reached at snapshot {0}")]
    HistoryBoundary(SnapshotId),

    /// Redo from a branch point without a branch selector.
    #[error("Ambiguous redo from snapshot {at}: {branches} branches, select one")]
    AmbiguousRedo { at: SnapshotId, branches: usize },

    /// The requested snapshot does not exist (never created or pruned).
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),

    /// A persisted snapshot or history tree violates a structural invariant.
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// The ontology term is unknown to the ontology collaborator.
    #[error("Unknown ontology term: {0}")]
    UnknownTerm(String),

    /// The operation needs a collaborator that was not configured.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
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

    #[test]
    fn accession_trims_and_validates() {
        assert_eq!(acc("  P31749 ").as_str(), "P31749");
        assert!(matches!(
            Accession::parse(""),
            Err(NetworkError::InvalidIdentifier(_))
        ));
        assert!(Accession::parse("TP 53").is_err());
        assert!(Accession::parse("x".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_err());
    }

    #[test]
    fn effect_labels_map_to_effects() {
        assert_eq!(Effect::from_label("->"), Effect::Stimulation);
        assert_eq!(Effect::from_label("inhibit"), Effect::Inhibition);
        assert_eq!(Effect::from_label("both"), Effect::Bimodal);
        assert_eq!(Effect::from_label("phosphorylate"), Effect::Undefined);
        assert!(Effect::Stimulation.is_signed());
        assert!(!Effect::Bimodal.is_signed());
    }

    #[test]
    fn merge_same_effect_unions_evidence() {
        let mut edge = Edge::new(
            acc("A"),
            acc("B"),
            EffectRecord::new(Effect::Stimulation).with_reference("PMID:1"),
        );
        let outcome = edge.merge(EffectRecord::new(Effect::Stimulation).with_reference("PMID:2"));
        assert_eq!(outcome, EdgeMerge::Merged);
        assert_eq!(edge.records.len(), 1);
        assert_eq!(edge.references().len(), 2);

        let again = edge.merge(EffectRecord::new(Effect::Stimulation).with_reference("PMID:2"));
        assert_eq!(again, EdgeMerge::Unchanged);
    }

    #[test]
    fn contradicting_effects_are_both_retained() {
        let mut edge = Edge::new(acc("A"), acc("B"), EffectRecord::new(Effect::Stimulation));
        let outcome = edge.merge(EffectRecord::new(Effect::Inhibition));

        assert_eq!(outcome, EdgeMerge::NewEffect);
        assert_eq!(edge.records.len(), 2);
        assert_eq!(edge.primary_effect(), Effect::Bimodal);
        assert!(!edge.is_signed());
    }

    #[test]
    fn confidence_saturating_increment() {
        assert_eq!(Confidence::new(u32::MAX).increment().value(), u32::MAX);
        assert_eq!(Confidence::new(1).increment().value(), 2);
    }

    #[test]
    fn complex_kind_inferred_from_prefix() {
        assert_eq!(NodeKind::infer(&acc("COMPLEX:P1_P2")), NodeKind::Complex);
        assert_eq!(NodeKind::infer(&acc("P31749")), NodeKind::Gene);
    }
}
