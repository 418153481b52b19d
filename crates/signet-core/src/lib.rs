//! # signet-core
//!
//! The network construction engine for Signet.
//!
//! Signet grows a signed, directed molecular interaction network around a
//! set of seed entities by querying a read-only interaction resource, and
//! keeps every intermediate state in a branching history tree.
//!
//! ## Layout
//!
//! - `types` / `graph`: identifiers, effects, and the node/edge store
//! - `resource`, `ontology`, `translate`: collaborator capabilities
//! - `connect`: Reciprocal Pathway Extension, Iterative Neighbor Expansion,
//!   component, phenotype and topological (ATOPO) connection
//! - `history`: snapshots, undo/redo across branches, pruning
//! - `compare`: set-difference classification of two graphs
//! - `network`: the facade that stages, commits and logs every operation
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Deterministic: ordered collections only, no floats
//! - Collaborators are never mutated by the engine

// =============================================================================
// MODULES
// =============================================================================

pub mod compare;
pub mod config;
pub mod connect;
pub mod formats;
pub mod graph;
pub mod history;
pub mod network;
pub mod ontology;
pub mod primitives;
pub mod resource;
pub mod translate;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Accession, Confidence, Edge, EdgeMerge, Effect, EffectRecord, NetworkError, Node, NodeKind,
    SnapshotId,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use compare::{Comparison, Membership, compare};
pub use config::EngineConfig;
pub use connect::{
    Algorithm, AtopoStrategy, BiasPriority, ComponentMode, ConnectOptions, ConnectionReport, PhenotypeRequest,
    RadialDirection, SearchMode, SkippedIdentifier,
};
pub use graph::{EndpointPolicy, Graph, SerializableGraph};
pub use history::{Cause, History, HistoryRecord, Snapshot, SnapshotInfo, SnapshotRecord};
pub use network::{NameTarget, Network, NetworkBuilder};
pub use ontology::{Ontology, StaticOntology};
pub use resource::{Interaction, InteractionResource, ResourceQuery, TableResource};
pub use translate::{IdentifierTranslator, IdentityTranslator, TableTranslator};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{
    PersistenceHeader, graph_from_bytes, graph_to_bytes, history_from_bytes, history_to_bytes,
};
