//! # Connection Engine
//!
//! Expands a graph against an `InteractionResource`.
//!
//! - `complete`: Reciprocal Pathway Extension (RPE) between seed pairs, and
//!   basic connection between nodes already present
//! - `radial`: Iterative Neighbor Expansion (INE)
//! - `component`: subgroup and disconnected-component connection
//! - `phenotype`: phenotype attachment with optional compression
//! - `upstream`: greedy upstream regulator collection
//! - `atopo`: seeds linked to output nodes through upstream regulators
//!
//! Every routine here works on a staged `Graph`; the `Network` facade
//! decides whether the staged graph replaces the live one.

pub(crate) mod atopo;
pub(crate) mod complete;
pub(crate) mod component;
mod path;
pub(crate) mod phenotype;
pub(crate) mod radial;
pub(crate) mod upstream;

pub use atopo::AtopoStrategy;
pub use phenotype::PhenotypeRequest;

use crate::history::Cause;
use crate::ontology::Ontology;
use crate::primitives::DEFAULT_MAX_LEN;
use crate::resource::{Interaction, InteractionResource};
use crate::translate::IdentifierTranslator;
use crate::{Accession, EndpointPolicy, Graph, NetworkError, NodeKind};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

// =============================================================================
// OPTIONS
// =============================================================================

/// Path search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Shortest path; first discovered at minimal depth.
    #[default]
    Bfs,
    /// First path along the first successfully extended branch.
    Dfs,
}

/// Precedence between the consensus filter and the confidence bias when
/// both are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BiasPriority {
    /// Consensus stays a hard filter; bias only orders consensus hops.
    #[default]
    ConsensusFirst,
    /// High-confidence hops are admitted without consensus and ranked
    /// ahead of lower-confidence consensus hops.
    ConfidenceFirst,
}

/// Expansion algorithm for subgroup and component connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Rpe,
    Ine,
}

/// Neighbor direction queried by radial expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadialDirection {
    Out,
    In,
    #[default]
    Both,
}

/// Direction of paths searched between two components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentMode {
    /// From the first component to the second.
    Out,
    /// From the second component to the first.
    In,
    /// Both directions.
    #[default]
    All,
}

/// Parameters shared by every connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    /// Maximum path length in hops (radial rounds for INE).
    pub max_len: usize,
    pub search_mode: SearchMode,
    /// Discard interactions whose effect is undefined or bimodal.
    pub only_signed: bool,
    /// Require the resource consensus marker.
    pub consensus: bool,
    /// Prefer curated / high-confidence next hops.
    pub connect_with_bias: bool,
    pub bias_priority: BiasPriority,
    pub direction: RadialDirection,
    /// Admit self-interactions.
    pub loops: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            search_mode: SearchMode::default(),
            only_signed: false,
            consensus: false,
            connect_with_bias: false,
            bias_priority: BiasPriority::default(),
            direction: RadialDirection::default(),
            loops: false,
        }
    }
}

impl ConnectOptions {
    /// Record these options as cause parameters.
    #[must_use]
    pub fn annotate(&self, cause: Cause) -> Cause {
        cause
            .with("max_len", self.max_len)
            .with("search_mode", format!("{:?}", self.search_mode).to_lowercase())
            .with("only_signed", self.only_signed)
            .with("consensus", self.consensus)
            .with("connect_with_bias", self.connect_with_bias)
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// An identifier that could not be used, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedIdentifier {
    pub identifier: String,
    pub reason: NetworkError,
}

/// Aggregate outcome of a connection request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    /// Every path merged into the graph, as node sequences.
    pub paths: Vec<Vec<Accession>>,
    /// Ordered pairs for which no path exists within the bound.
    pub unconnected: Vec<(Accession, Accession)>,
    /// Identifiers skipped during resolution.
    pub skipped: Vec<SkippedIdentifier>,
    pub nodes_added: usize,
    pub edges_added: usize,
}

impl ConnectionReport {
    pub(crate) fn skip(&mut self, identifier: &str, reason: NetworkError) {
        tracing::warn!(identifier, reason = %reason, "identifier skipped");
        self.skipped.push(SkippedIdentifier {
            identifier: identifier.to_string(),
            reason,
        });
    }
}

// =============================================================================
// FILTERING AND RANKING
// =============================================================================

/// Per-interaction admission policy and next-hop ranking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InteractionFilter {
    only_signed: bool,
    consensus: bool,
    bias: bool,
    priority: BiasPriority,
    loops: bool,
}

impl InteractionFilter {
    pub(crate) fn new(options: &ConnectOptions) -> Self {
        Self {
            only_signed: options.only_signed,
            consensus: options.consensus,
            bias: options.connect_with_bias,
            priority: options.bias_priority,
            loops: options.loops,
        }
    }

    pub(crate) fn admits(&self, interaction: &Interaction) -> bool {
        if !self.loops && interaction.source == interaction.target {
            return false;
        }
        if self.only_signed && !interaction.is_signed() {
            return false;
        }
        if self.consensus && !interaction.consensus {
            return self.bias
                && self.priority == BiasPriority::ConfidenceFirst
                && interaction.is_high_confidence();
        }
        true
    }

    /// Larger is preferred.
    fn preference(&self, interaction: &Interaction) -> (bool, bool, u32) {
        let high = interaction.is_high_confidence();
        let evidence = interaction.confidence.value();
        match self.priority {
            BiasPriority::ConsensusFirst => (interaction.consensus, high, evidence),
            BiasPriority::ConfidenceFirst => (high, interaction.consensus, evidence),
        }
    }
}

/// Direction of a resource query relative to the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Out,
    In,
}

/// One candidate step: the neighbor and every admitted interaction
/// supporting the step.
#[derive(Debug, Clone)]
pub(crate) struct Hop {
    pub(crate) neighbor: Accession,
    pub(crate) interactions: Vec<Interaction>,
}

/// Filtered, ranked view of the resource.
pub(crate) struct Explorer<'a> {
    resource: &'a dyn InteractionResource,
    filter: InteractionFilter,
}

impl<'a> Explorer<'a> {
    pub(crate) fn new(resource: &'a dyn InteractionResource, options: &ConnectOptions) -> Self {
        Self {
            resource,
            filter: InteractionFilter::new(options),
        }
    }

    /// Admitted neighbors of `node`, ordered by identifier, or by
    /// preference first when bias is enabled.
    pub(crate) fn hops(&self, node: &Accession, direction: Direction) -> Vec<Hop> {
        let interactions = match direction {
            Direction::Out => self.resource.outgoing(node),
            Direction::In => self.resource.incoming(node),
        };

        let mut grouped: BTreeMap<Accession, Vec<Interaction>> = BTreeMap::new();
        for interaction in interactions {
            if !self.filter.admits(&interaction) {
                continue;
            }
            let neighbor = match direction {
                Direction::Out => interaction.target.clone(),
                Direction::In => interaction.source.clone(),
            };
            grouped.entry(neighbor).or_default().push(interaction);
        }

        let mut hops: Vec<Hop> = grouped
            .into_iter()
            .map(|(neighbor, interactions)| Hop {
                neighbor,
                interactions,
            })
            .collect();

        if self.filter.bias {
            // Stable sort keeps identifier order among equals
            hops.sort_by_key(|hop| {
                Reverse(
                    hop.interactions
                        .iter()
                        .map(|i| self.filter.preference(i))
                        .max(),
                )
            });
        }
        hops
    }
}

/// A resource path: `nodes[i] -> nodes[i + 1]` is supported by `steps[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Path {
    pub(crate) nodes: Vec<Accession>,
    pub(crate) steps: Vec<Vec<Interaction>>,
}

// =============================================================================
// MERGE CONTEXT
// =============================================================================

/// Collaborators available to a connection routine.
#[derive(Clone, Copy)]
pub(crate) struct Context<'a> {
    pub(crate) resource: &'a dyn InteractionResource,
    pub(crate) translator: &'a dyn IdentifierTranslator,
    pub(crate) ontology: Option<&'a dyn Ontology>,
    /// Stamped on every merged effect record.
    pub(crate) provenance: Option<&'a str>,
}

impl<'a> Context<'a> {
    pub(crate) fn explorer(&self, options: &ConnectOptions) -> Explorer<'a> {
        Explorer::new(self.resource, options)
    }

    /// Add a resource entity with its translated label and inferred kind.
    pub(crate) fn ensure_node(&self, graph: &mut Graph, id: &Accession) {
        if !graph.contains_node(id) {
            let label = self.translator.label_for(id);
            graph.add_node(id.clone(), label, Some(NodeKind::infer(id)));
        }
    }

    pub(crate) fn merge_interactions(
        &self,
        graph: &mut Graph,
        interactions: &[Interaction],
    ) -> Result<(), NetworkError> {
        for interaction in interactions {
            self.ensure_node(graph, &interaction.source);
            self.ensure_node(graph, &interaction.target);
            let mut record = interaction.to_record();
            if let Some(operation) = self.provenance {
                record = record.with_provenance(operation);
            }
            graph.add_edge(
                &interaction.source,
                &interaction.target,
                record,
                EndpointPolicy::Require,
            )?;
        }
        Ok(())
    }

    pub(crate) fn merge_path(&self, graph: &mut Graph, path: &Path) -> Result<(), NetworkError> {
        tracing::debug!(hops = path.steps.len(), path = ?path.nodes, "merging path");
        for node in &path.nodes {
            self.ensure_node(graph, node);
        }
        for step in &path.steps {
            self.merge_interactions(graph, step)?;
        }
        Ok(())
    }

    /// Resolve a seed: translate it and require the resource to know it.
    pub(crate) fn resolve_seed(&self, raw: &str, report: &mut ConnectionReport) -> Option<Accession> {
        match self.translator.to_canonical(raw) {
            Ok(id) if self.resource.knows(&id) => Some(id),
            Ok(id) => {
                report.skip(raw, NetworkError::InvalidSeed(id.to_string()));
                None
            }
            Err(error) => {
                report.skip(raw, error);
                None
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Effect;
    use crate::resource::TableResource;

    fn acc(s: &str) -> Accession {
        Accession::parse(s).expect("valid accession")
    }

    fn options(consensus: bool, bias: bool, priority: BiasPriority) -> ConnectOptions {
        ConnectOptions {
            consensus,
            connect_with_bias: bias,
            bias_priority: priority,
            ..ConnectOptions::default()
        }
    }

    fn curated_only() -> Interaction {
        Interaction::new(acc("A"), acc("B"), Effect::Stimulation).with_curated(true)
    }

    #[test]
    fn consensus_first_keeps_consensus_a_hard_filter() {
        let filter = InteractionFilter::new(&options(true, true, BiasPriority::ConsensusFirst));
        assert!(!filter.admits(&curated_only()));
    }

    #[test]
    fn confidence_first_admits_curated_non_consensus() {
        let filter = InteractionFilter::new(&options(true, true, BiasPriority::ConfidenceFirst));
        assert!(filter.admits(&curated_only()));

        let weak = Interaction::new(acc("A"), acc("B"), Effect::Stimulation);
        assert!(!filter.admits(&weak));
    }

    #[test]
    fn only_signed_and_loops_filtering() {
        let filter = InteractionFilter::new(&ConnectOptions {
            only_signed: true,
            ..ConnectOptions::default()
        });
        assert!(!filter.admits(&Interaction::new(acc("A"), acc("B"), Effect::Bimodal)));
        assert!(!filter.admits(&Interaction::new(acc("A"), acc("A"), Effect::Stimulation)));
        assert!(filter.admits(&Interaction::new(acc("A"), acc("B"), Effect::Inhibition)));
    }

    #[test]
    fn bias_reorders_hops_by_preference() {
        let table: TableResource = [
            Interaction::new(acc("S"), acc("A"), Effect::Stimulation),
            Interaction::new(acc("S"), acc("B"), Effect::Stimulation).with_curated(true),
        ]
        .into_iter()
        .collect();

        let plain = Explorer::new(&table, &ConnectOptions::default());
        let order: Vec<Accession> = plain
            .hops(&acc("S"), Direction::Out)
            .into_iter()
            .map(|h| h.neighbor)
            .collect();
        assert_eq!(order, vec![acc("A"), acc("B")]);

        let biased = Explorer::new(&table, &options(false, true, BiasPriority::ConsensusFirst));
        let order: Vec<Accession> = biased
            .hops(&acc("S"), Direction::Out)
            .into_iter()
            .map(|h| h.neighbor)
            .collect();
        assert_eq!(order, vec![acc("B"), acc("A")]);
    }

    #[test]
    fn hops_group_parallel_interactions() {
        let table: TableResource = [
            Interaction::new(acc("A"), acc("B"), Effect::Stimulation).with_reference("PMID:1"),
            Interaction::new(acc("A"), acc("B"), Effect::Inhibition).with_reference("PMID:2"),
        ]
        .into_iter()
        .collect();

        let hops = Explorer::new(&table, &ConnectOptions::default()).hops(&acc("B"), Direction::In);
        assert_eq!(hops.len(), 1);
        assert_eq!(hops.first().map(|h| h.interactions.len()), Some(2));
    }
}
