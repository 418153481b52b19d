//! # Network
//!
//! The facade owning one graph, its history tree and the read-only
//! collaborators it is expanded against.
//!
//! Every mutating operation is staged on a copy of the graph and swapped in
//! only on success. When history tracking is on and the live graph differs
//! from the current snapshot, a snapshot is committed, so the live graph
//! equals the current snapshot after every tracked call. A call that leaves
//! the graph unchanged commits nothing.

use crate::compare::{Comparison, compare};
use crate::config::EngineConfig;
use crate::connect::{
    Algorithm, AtopoStrategy, ComponentMode, ConnectOptions, ConnectionReport, Context, PhenotypeRequest,
    SkippedIdentifier, atopo, complete, component, phenotype, radial, upstream,
};
use crate::history::{Cause, History, SnapshotInfo};
use crate::ontology::Ontology;
use crate::resource::InteractionResource;
use crate::translate::{IdentifierTranslator, IdentityTranslator};
use crate::{
    Accession, Edge, EdgeMerge, Effect, EffectRecord, EndpointPolicy, Graph, NetworkError, NodeKind,
    SnapshotId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// =============================================================================
// BUILDER
// =============================================================================

/// Configures and creates a `Network`.
#[derive(Debug)]
pub struct NetworkBuilder {
    resource: Arc<dyn InteractionResource>,
    translator: Arc<dyn IdentifierTranslator>,
    ontology: Option<Arc<dyn Ontology>>,
    config: EngineConfig,
    seeds: Vec<String>,
}

impl NetworkBuilder {
    #[must_use]
    pub fn translator(mut self, translator: Arc<dyn IdentifierTranslator>) -> Self {
        self.translator = translator;
        self
    }

    #[must_use]
    pub fn ontology(mut self, ontology: Arc<dyn Ontology>) -> Self {
        self.ontology = Some(ontology);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed identifiers. Identifiers that cannot be translated or are
    /// unknown to the resource are skipped and listed by
    /// `Network::skipped_seeds`.
    #[must_use]
    pub fn seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seeds = seeds.into_iter().map(Into::into).collect();
        self
    }

    /// Create the network. The history root holds the seeded graph.
    #[must_use]
    pub fn build(self) -> Network {
        let mut graph = Graph::new();
        let mut report = ConnectionReport::default();
        let mut seeds = Vec::new();
        {
            let ctx = Context {
                resource: self.resource.as_ref(),
                translator: self.translator.as_ref(),
                ontology: self.ontology.as_deref(),
                provenance: None,
            };
            for raw in &self.seeds {
                if let Some(id) = ctx.resolve_seed(raw, &mut report) {
                    ctx.ensure_node(&mut graph, &id);
                    if !seeds.contains(&id) {
                        seeds.push(id);
                    }
                }
            }
        }

        let cause = Cause::new("init").with("seeds", seeds.len());
        let mut history = History::new(cause, &graph);
        history.set_max_history(self.config.max_history);
        tracing::info!(
            seeds = seeds.len(),
            skipped = report.skipped.len(),
            "network created"
        );

        Network {
            graph,
            history,
            resource: self.resource,
            translator: self.translator,
            ontology: self.ontology,
            seeds,
            skipped: report.skipped,
            config: self.config,
            tracking: true,
        }
    }

    /// Resume a network from a persisted history tree. The live graph is
    /// the history's current snapshot; the restored network has no seeds.
    pub fn build_from_history(self, mut history: History) -> Result<Network, NetworkError> {
        let graph = history.current()?.graph().clone();
        if self.config.max_history.is_some() {
            history.set_max_history(self.config.max_history);
        }
        Ok(Network {
            graph,
            history,
            resource: self.resource,
            translator: self.translator,
            ontology: self.ontology,
            seeds: Vec::new(),
            skipped: Vec::new(),
            config: self.config,
            tracking: true,
        })
    }
}

// =============================================================================
// NETWORK
// =============================================================================

/// What `Network::modify_node_name` changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameTarget {
    /// The display label only.
    Label,
    /// The identifier, moving incident edges with it.
    Identifier,
    /// The label, and the identifier the translator gives for the new name.
    Both,
}

/// A signed interaction network under construction.
#[derive(Debug)]
pub struct Network {
    graph: Graph,
    history: History,
    resource: Arc<dyn InteractionResource>,
    translator: Arc<dyn IdentifierTranslator>,
    ontology: Option<Arc<dyn Ontology>>,
    seeds: Vec<Accession>,
    skipped: Vec<SkippedIdentifier>,
    config: EngineConfig,
    tracking: bool,
}

impl Network {
    /// Start configuring a network over `resource`.
    #[must_use]
    pub fn builder(resource: Arc<dyn InteractionResource>) -> NetworkBuilder {
        NetworkBuilder {
            resource,
            translator: Arc::new(IdentityTranslator),
            ontology: None,
            config: EngineConfig::default(),
            seeds: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn seeds(&self) -> &[Accession] {
        &self.seeds
    }

    /// Seeds rejected at construction.
    #[must_use]
    pub fn skipped_seeds(&self) -> &[SkippedIdentifier] {
        &self.skipped
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Connection options derived from the engine configuration.
    #[must_use]
    pub fn default_options(&self) -> ConnectOptions {
        self.config.connect_options()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.graph.is_connected()
    }

    /// Compare this network's graph with another's.
    #[must_use]
    pub fn compare_with(&self, other: &Network) -> Comparison {
        compare(&self.graph, &other.graph)
    }

    /// Tissue expression of the given nodes (all nodes when `None`).
    pub fn tissue_annotation(
        &self,
        tissue: &str,
        nodes: Option<&[&str]>,
    ) -> Result<BTreeMap<Accession, bool>, NetworkError> {
        let ontology = self
            .ontology
            .as_deref()
            .ok_or_else(|| NetworkError::MissingCollaborator("ontology".to_string()))?;
        let genes = match nodes {
            Some(raw) => raw
                .iter()
                .map(|r| self.translator.to_canonical(r))
                .collect::<Result<Vec<_>, _>>()?,
            None => self.graph.node_ids().cloned().collect(),
        };
        Ok(ontology.check_tissue_annotation(&genes, tissue))
    }

    /// Operations that contributed evidence to `source -> target`, or
    /// `None` when the edge is absent.
    pub fn edge_provenance(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Option<BTreeSet<String>>, NetworkError> {
        let source = self.canonical(source)?;
        let target = self.canonical(target)?;
        Ok(self
            .graph
            .edge(&source, &target)
            .map(|edge| edge.provenance().into_iter().map(str::to_string).collect()))
    }

    /// Edges whose provenance mentions `keyword`.
    #[must_use]
    pub fn filter_edges_by_provenance(&self, keyword: &str) -> Vec<&Edge> {
        self.graph.edges_with_provenance(keyword).collect()
    }

    // -------------------------------------------------------------------------
    // Staging
    // -------------------------------------------------------------------------

    fn stage<T>(
        &mut self,
        cause: Cause,
        op: impl FnOnce(&Context<'_>, &mut Graph) -> Result<T, NetworkError>,
    ) -> Result<T, NetworkError> {
        let provenance = cause.to_string();
        let ctx = Context {
            resource: self.resource.as_ref(),
            translator: self.translator.as_ref(),
            ontology: self.ontology.as_deref(),
            provenance: Some(&provenance),
        };
        let mut staged = self.graph.clone();
        let outcome = op(&ctx, &mut staged)?;

        if staged != self.graph {
            self.graph = staged;
        }

        // Changes made while tracking was suspended are committed here too.
        let recorded = self
            .history
            .current()
            .is_ok_and(|snapshot| snapshot.graph() == &self.graph);
        if self.tracking && !recorded {
            self.history.commit(cause, &self.graph);
        } else {
            tracing::debug!(operation = %cause.operation, "nothing committed");
        }
        Ok(outcome)
    }

    fn connect(
        &mut self,
        cause: Cause,
        op: impl FnOnce(&Context<'_>, &mut Graph, &mut ConnectionReport) -> Result<(), NetworkError>,
    ) -> Result<ConnectionReport, NetworkError> {
        let operation = cause.operation.clone();
        let nodes_before = self.graph.node_count();
        let edges_before = self.graph.edge_count();

        let mut report = self.stage(cause, |ctx, graph| {
            let mut report = ConnectionReport::default();
            op(ctx, graph, &mut report)?;
            Ok(report)
        })?;

        report.nodes_added = self.graph.node_count().saturating_sub(nodes_before);
        report.edges_added = self.graph.edge_count().saturating_sub(edges_before);
        tracing::info!(
            operation = %operation,
            paths = report.paths.len(),
            unconnected = report.unconnected.len(),
            skipped = report.skipped.len(),
            nodes_added = report.nodes_added,
            edges_added = report.edges_added,
            "connection finished"
        );
        Ok(report)
    }

    fn canonical(&self, identifier: &str) -> Result<Accession, NetworkError> {
        self.translator.to_canonical(identifier)
    }

    // -------------------------------------------------------------------------
    // Graph Store operations
    // -------------------------------------------------------------------------

    /// Add a node. Idempotent: an existing node keeps its label and kind.
    ///
    /// Without a label the translator's label (or the accession) is used;
    /// without a kind it is inferred from the accession.
    pub fn add_node(
        &mut self,
        identifier: &str,
        label: Option<&str>,
        kind: Option<NodeKind>,
    ) -> Result<Accession, NetworkError> {
        let id = self.canonical(identifier)?;
        self.stage(Cause::new("add_node").with("identifier", &id), |ctx, graph| {
            if !graph.contains_node(&id) {
                let label = label
                    .map(str::to_string)
                    .or_else(|| ctx.translator.label_for(&id));
                let kind = kind.unwrap_or_else(|| NodeKind::infer(&id));
                graph.add_node(id.clone(), label, Some(kind));
            }
            Ok(())
        })?;
        Ok(id)
    }

    /// Add a node as a seed; the resource must know it.
    pub fn add_seed(&mut self, identifier: &str) -> Result<Accession, NetworkError> {
        let id = self.canonical(identifier)?;
        if !self.resource.knows(&id) {
            return Err(NetworkError::InvalidSeed(id.to_string()));
        }
        self.stage(Cause::new("add_seed").with("identifier", &id), |ctx, graph| {
            ctx.ensure_node(graph, &id);
            Ok(())
        })?;
        if !self.seeds.contains(&id) {
            self.seeds.push(id.clone());
        }
        Ok(id)
    }

    /// Remove a node and its incident edges.
    ///
    /// Returns `Ok(false)` if the node was not present.
    pub fn remove_node(&mut self, identifier: &str) -> Result<bool, NetworkError> {
        let id = self.canonical(identifier)?;
        self.stage(Cause::new("remove_node").with("identifier", &id), |_, graph| {
            Ok(graph.remove_node(&id))
        })
    }

    /// Add edge evidence between two identifiers.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        record: EffectRecord,
        policy: EndpointPolicy,
    ) -> Result<EdgeMerge, NetworkError> {
        let source = self.canonical(source)?;
        let target = self.canonical(target)?;
        let cause = Cause::new("add_edge")
            .with("source", &source)
            .with("target", &target)
            .with("effect", record.effect);
        let record = record.with_provenance(cause.to_string());
        self.stage(cause, |_, graph| {
            graph.add_edge(&source, &target, record, policy)
        })
    }

    /// Remove the edge for an ordered pair.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<bool, NetworkError> {
        let source = self.canonical(source)?;
        let target = self.canonical(target)?;
        let cause = Cause::new("remove_edge")
            .with("source", &source)
            .with("target", &target);
        self.stage(cause, |_, graph| Ok(graph.remove_edge(&source, &target)))
    }

    /// Remove nodes without edges, keeping seeds.
    pub fn remove_disconnected_nodes(&mut self) -> Result<usize, NetworkError> {
        let keep: BTreeSet<Accession> = self.seeds.iter().cloned().collect();
        self.stage(Cause::new("remove_disconnected_nodes"), |_, graph| {
            Ok(graph.remove_disconnected_nodes(&keep))
        })
    }

    /// Drop all evidence with the given effect (e.g. undefined or bimodal).
    pub fn remove_effect(&mut self, effect: Effect) -> Result<usize, NetworkError> {
        self.stage(
            Cause::new("remove_effect").with("effect", effect),
            |_, graph| Ok(graph.remove_effect(effect)),
        )
    }

    /// Remove the edges between consecutive nodes of `path`.
    pub fn remove_path(&mut self, path: &[&str]) -> Result<usize, NetworkError> {
        let ids = path
            .iter()
            .map(|raw| self.canonical(raw))
            .collect::<Result<Vec<_>, _>>()?;
        self.stage(
            Cause::new("remove_path").with("path", path.join(",")),
            |_, graph| Ok(graph.remove_path(&ids)),
        )
    }

    /// Rename a node's label, identifier, or both.
    ///
    /// Returns `Ok(false)` if the node was not present. Renaming onto an
    /// existing identifier fails with `NodeExists`.
    pub fn modify_node_name(
        &mut self,
        old: &str,
        new: &str,
        target: NameTarget,
    ) -> Result<bool, NetworkError> {
        let old_id = self.canonical(old)?;
        let new_id = match target {
            NameTarget::Label => None,
            NameTarget::Identifier => Some(Accession::parse(new)?),
            NameTarget::Both => Some(
                self.translator
                    .to_canonical(new)
                    .or_else(|_| Accession::parse(new))?,
            ),
        };
        let cause = Cause::new("modify_node_name")
            .with("old", &old_id)
            .with("new", new)
            .with("target", format!("{target:?}").to_lowercase());

        let renamed = self.stage(cause, |_, graph| {
            let found = match &new_id {
                Some(id) => graph.rename_node(&old_id, id)?,
                None => graph.contains_node(&old_id),
            };
            if found && target != NameTarget::Identifier {
                let at = new_id.as_ref().unwrap_or(&old_id);
                graph.set_label(at, new);
            }
            Ok(found)
        })?;

        if let (true, Some(new_id)) = (renamed, new_id) {
            for seed in &mut self.seeds {
                if *seed == old_id {
                    *seed = new_id.clone();
                }
            }
        }
        Ok(renamed)
    }

    // -------------------------------------------------------------------------
    // Connection Engine operations
    // -------------------------------------------------------------------------

    /// Reciprocal Pathway Extension between every pair of seeds.
    ///
    /// `None` uses every node currently in the network.
    pub fn complete_connection(
        &mut self,
        seeds: Option<&[&str]>,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let cause = options
            .annotate(Cause::new("complete_connection"))
            .with("seeds", describe(seeds));
        self.connect(cause, |ctx, graph, report| {
            let seeds = resolve_or_all(ctx, graph, seeds, report);
            complete::complete_connection(ctx, graph, &seeds, options, report)
        })
    }

    /// Iterative Neighbor Expansion from every node in the network.
    pub fn connect_network_radially(
        &mut self,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let cause = options
            .annotate(Cause::new("connect_network_radially"))
            .with("direction", format!("{:?}", options.direction).to_lowercase())
            .with("loops", options.loops);
        self.connect(cause, |ctx, graph, _| {
            let frontier: Vec<Accession> = graph.node_ids().cloned().collect();
            radial::expand(ctx, graph, frontier, options)
        })
    }

    /// Run RPE or INE restricted to a subset of nodes.
    pub fn connect_subgroup(
        &mut self,
        nodes: &[&str],
        algorithm: Algorithm,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let cause = options
            .annotate(Cause::new("connect_subgroup"))
            .with("nodes", describe(Some(nodes)))
            .with("algorithm", format!("{algorithm:?}").to_lowercase());
        self.connect(cause, |ctx, graph, report| {
            let subset = resolve_or_all(ctx, graph, Some(nodes), report);
            match algorithm {
                Algorithm::Rpe => complete::complete_connection(ctx, graph, &subset, options, report),
                Algorithm::Ine => {
                    for id in &subset {
                        ctx.ensure_node(graph, id);
                    }
                    radial::expand(ctx, graph, subset, options)
                }
            }
        })
    }

    /// Connect the disconnected components of the network.
    pub fn connect_component(
        &mut self,
        algorithm: Algorithm,
        mode: ComponentMode,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let cause = options
            .annotate(Cause::new("connect_component"))
            .with("algorithm", format!("{algorithm:?}").to_lowercase())
            .with("mode", format!("{mode:?}").to_lowercase());
        self.connect(cause, |ctx, graph, report| {
            component::connect_components(ctx, graph, algorithm, mode, options, report)
        })
    }

    /// Search paths between two explicit node groups.
    pub fn connect_component_pair(
        &mut self,
        first: &[&str],
        second: &[&str],
        mode: ComponentMode,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let cause = options
            .annotate(Cause::new("connect_component_pair"))
            .with("first", describe(Some(first)))
            .with("second", describe(Some(second)))
            .with("mode", format!("{mode:?}").to_lowercase());
        self.connect(cause, |ctx, graph, report| {
            let first = resolve_or_all(ctx, graph, Some(first), report);
            let second = resolve_or_all(ctx, graph, Some(second), report);
            component::connect_component_pair(ctx, graph, &first, &second, mode, options, report)
                .map(|_| ())
        })
    }

    /// Attach the genes annotated with an ontology term, or a phenotype
    /// node standing for them when compressing.
    pub fn connect_genes_to_phenotype(
        &mut self,
        request: &PhenotypeRequest,
    ) -> Result<ConnectionReport, NetworkError> {
        let options = ConnectOptions {
            max_len: request.max_len,
            only_signed: request.only_signed,
            ..self.config.connect_options()
        };
        let cause = Cause::new("connect_genes_to_phenotype")
            .with("term", &request.term)
            .with("max_len", request.max_len)
            .with("only_signed", request.only_signed)
            .with("compress", request.compress);
        self.connect(cause, |ctx, graph, report| {
            phenotype::connect_genes_to_phenotype(ctx, graph, request, &options, report)
        })
    }

    /// Add every admitted resource interaction between nodes already present.
    pub fn connect_nodes(
        &mut self,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let cause = options.annotate(Cause::new("connect_nodes"));
        self.connect(cause, |ctx, graph, _| {
            complete::connect_nodes(ctx, graph, options)
        })
    }

    /// Collect upstream regulators of `targets` (all nodes when `None`).
    pub fn connect_to_upstream_nodes(
        &mut self,
        targets: Option<&[&str]>,
        depth: usize,
        rank: usize,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let cause = options
            .annotate(Cause::new("connect_to_upstream_nodes"))
            .with("targets", describe(targets))
            .with("depth", depth)
            .with("rank", rank);
        self.connect(cause, |ctx, graph, report| {
            let targets = resolve_or_all(ctx, graph, targets, report);
            upstream::connect_to_upstream_nodes(ctx, graph, targets, depth, rank, options)
        })
    }

    /// Expand around the seeds with `strategy`, then link `outputs` to the
    /// network through upstream regulators and prune nodes nothing
    /// regulates. Seeds are the network's seeds, or every node when it has
    /// none.
    pub fn connect_as_atopo(
        &mut self,
        strategy: Option<AtopoStrategy>,
        outputs: Option<&[&str]>,
        options: &ConnectOptions,
    ) -> Result<ConnectionReport, NetworkError> {
        let strategy_name = strategy
            .map_or_else(|| "none".to_string(), |s| format!("{s:?}").to_lowercase());
        let cause = options
            .annotate(Cause::new("connect_as_atopo"))
            .with("strategy", strategy_name)
            .with("outputs", outputs.map_or_else(|| "none".to_string(), |o| o.join(",")));
        let seeds = self.seeds.clone();
        self.connect(cause, |ctx, graph, report| {
            let seeds = if seeds.is_empty() {
                graph.node_ids().cloned().collect()
            } else {
                seeds
            };
            let outputs = match outputs {
                Some(raw) => resolve_or_all(ctx, graph, Some(raw), report),
                None => Vec::new(),
            };
            atopo::connect_as_atopo(ctx, graph, &seeds, strategy, &outputs, options, report)
        })
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn current_snapshot_id(&self) -> SnapshotId {
        self.history.current_id()
    }

    #[must_use]
    pub fn root_snapshot_id(&self) -> SnapshotId {
        self.history.root_id()
    }

    /// Restore the parent snapshot.
    pub fn undo(&mut self) -> Result<SnapshotId, NetworkError> {
        self.graph = self.history.undo()?.clone();
        Ok(self.history.current_id())
    }

    /// Restore a child snapshot; `branch` selects among several children.
    pub fn redo(&mut self, branch: Option<usize>) -> Result<SnapshotId, NetworkError> {
        self.graph = self.history.redo(branch)?.clone();
        Ok(self.history.current_id())
    }

    /// Restore any retained snapshot.
    pub fn checkout(&mut self, id: SnapshotId) -> Result<(), NetworkError> {
        self.graph = self.history.checkout(id)?.clone();
        Ok(())
    }

    /// Limit retained snapshots. Returns the pruned ids.
    pub fn set_max_history(&mut self, limit: Option<usize>) -> Vec<SnapshotId> {
        self.config.max_history = limit;
        self.history.set_max_history(limit)
    }

    /// Turn snapshot capture on or off. While off, mutations change the
    /// live graph without committing; the next tracked mutation commits
    /// the accumulated state.
    pub fn set_history_tracking(&mut self, enabled: bool) {
        self.tracking = enabled;
    }

    #[must_use]
    pub fn is_tracking_history(&self) -> bool {
        self.tracking
    }

    /// Run `f` with snapshot capture suspended, restoring the previous
    /// tracking state afterwards.
    pub fn with_history_suspended<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.tracking;
        self.tracking = false;
        let outcome = f(self);
        self.tracking = previous;
        outcome
    }

    /// Metadata of every retained snapshot in creation order.
    #[must_use]
    pub fn list_states(&self) -> Vec<SnapshotInfo> {
        self.history.list()
    }

    /// Compare the graphs of two snapshots.
    pub fn compare_states(
        &self,
        first: SnapshotId,
        second: SnapshotId,
    ) -> Result<Comparison, NetworkError> {
        let first = self.history.get(first)?;
        let second = self.history.get(second)?;
        Ok(compare(first.graph(), second.graph()))
    }

    /// Graphviz DOT rendering of the history tree.
    #[must_use]
    pub fn history_dot(&self) -> String {
        self.history.to_dot()
    }
}

/// Resolve raw identifiers as seeds, or take every node of the graph.
fn resolve_or_all(
    ctx: &Context<'_>,
    graph: &Graph,
    raw: Option<&[&str]>,
    report: &mut ConnectionReport,
) -> Vec<Accession> {
    match raw {
        Some(raw) => raw
            .iter()
            .filter_map(|r| ctx.resolve_seed(r, report))
            .collect(),
        None => graph.node_ids().cloned().collect(),
    }
}

fn describe(raw: Option<&[&str]>) -> String {
    match raw {
        Some(raw) => raw.join(","),
        None => "all".to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
