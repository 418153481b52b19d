//! Phenotype attachment.
//!
//! Network nodes are connected to the genes annotated with an ontology
//! term. With compression, the annotated genes themselves are replaced by
//! a single phenotype node.

use super::{ConnectOptions, ConnectionReport, Context, Direction, Explorer, Path};
use crate::primitives::DEFAULT_MAX_LEN;
use crate::{
    Accession, Effect, EffectRecord, EndpointPolicy, Graph, NetworkError, Node, NodeKind,
};
use std::collections::{BTreeMap, BTreeSet};

/// Parameters of `connect_genes_to_phenotype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhenotypeRequest {
    /// Ontology term (e.g. "GO:0006915").
    pub term: String,
    /// Phenotype display label. Defaults to the ontology label, then the term.
    pub label: Option<String>,
    pub only_signed: bool,
    /// Replace annotated genes by one phenotype node.
    pub compress: bool,
    pub max_len: usize,
    /// Restrict the nodes connected to the phenotype. `None` means every
    /// node of the network.
    pub sub_genes: Option<Vec<String>>,
}

impl PhenotypeRequest {
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            label: None,
            only_signed: false,
            compress: false,
            max_len: DEFAULT_MAX_LEN,
            sub_genes: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn signed_only(mut self) -> Self {
        self.only_signed = true;
        self
    }

    #[must_use]
    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    #[must_use]
    pub fn with_sub_genes<I, S>(mut self, genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_genes = Some(genes.into_iter().map(Into::into).collect());
        self
    }
}

/// Distances to the nearest pool member over the filtered resource graph.
///
/// Every node's next hop is a successor one step closer, so the path from
/// an intermediate node is always a suffix of any path through it.
struct ShortestPathTree {
    distance: BTreeMap<Accession, usize>,
}

impl ShortestPathTree {
    /// Reverse breadth-first search from the pool.
    fn toward(explorer: &Explorer<'_>, pool: &BTreeSet<Accession>, max_len: usize) -> Self {
        let mut distance: BTreeMap<Accession, usize> =
            pool.iter().map(|gene| (gene.clone(), 0)).collect();
        let mut frontier: Vec<Accession> = pool.iter().cloned().collect();

        for depth in 1..=max_len {
            let mut next = Vec::new();
            for node in &frontier {
                for hop in explorer.hops(node, Direction::In) {
                    if !distance.contains_key(&hop.neighbor) {
                        distance.insert(hop.neighbor.clone(), depth);
                        next.push(hop.neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        Self { distance }
    }

    fn path_from(&self, explorer: &Explorer<'_>, source: &Accession) -> Option<Path> {
        let mut remaining = *self.distance.get(source)?;
        let mut path = Path {
            nodes: vec![source.clone()],
            steps: Vec::new(),
        };
        while remaining > 0 {
            let wanted = remaining.saturating_sub(1);
            let current = path.nodes.last()?;
            let hop = explorer
                .hops(current, Direction::Out)
                .into_iter()
                .find(|hop| self.distance.get(&hop.neighbor) == Some(&wanted))?;
            path.nodes.push(hop.neighbor);
            path.steps.push(hop.interactions);
            remaining = wanted;
        }
        if path.steps.is_empty() {
            None
        } else {
            Some(path)
        }
    }
}

/// Connect network nodes to the genes annotated with `request.term`.
pub(crate) fn connect_genes_to_phenotype(
    ctx: &Context<'_>,
    graph: &mut Graph,
    request: &PhenotypeRequest,
    options: &ConnectOptions,
    report: &mut ConnectionReport,
) -> Result<(), NetworkError> {
    let ontology = ctx
        .ontology
        .ok_or_else(|| NetworkError::MissingCollaborator("ontology".to_string()))?;

    let mut annotated = BTreeSet::new();
    for raw in ontology.genes_for_term(&request.term)? {
        match ctx.translator.to_canonical(&raw) {
            Ok(id) => {
                annotated.insert(id);
            }
            Err(error) => report.skip(&raw, error),
        }
    }

    let label = request
        .label
        .clone()
        .or_else(|| ontology.term_label(&request.term))
        .unwrap_or_else(|| request.term.clone());
    let phenotype = Node::new(
        Accession::parse(label.replace(' ', "_"))?,
        Some(label),
        Some(NodeKind::Phenotype),
    );

    let pool: BTreeSet<Accession> = annotated
        .iter()
        .filter(|gene| !graph.contains_node(gene))
        .cloned()
        .collect();

    let sources: Vec<Accession> = match &request.sub_genes {
        Some(raw_genes) => raw_genes
            .iter()
            .filter_map(|raw| match ctx.translator.to_canonical(raw) {
                Ok(id) => Some(id),
                Err(error) => {
                    report.skip(raw, error);
                    None
                }
            })
            .filter(|id| graph.contains_node(id))
            .collect(),
        None => graph.node_ids().cloned().collect(),
    };
    let sources: Vec<Accession> = sources
        .into_iter()
        .filter(|id| *id != phenotype.id)
        .collect();

    let explorer = ctx.explorer(options);
    let tree = ShortestPathTree::toward(&explorer, &pool, options.max_len);

    for source in &sources {
        let Some(path) = tree.path_from(&explorer, source) else {
            tracing::debug!(source = %source, term = %request.term, "no annotated gene within bound");
            continue;
        };
        if request.compress {
            merge_compressed(ctx, graph, &path, &phenotype)?;
        } else {
            ctx.merge_path(graph, &path)?;
        }
        report.paths.push(path.nodes);
    }

    if request.compress {
        for source in sources.iter().filter(|id| annotated.contains(*id)) {
            ensure_phenotype(graph, &phenotype);
            graph.add_edge(
                source,
                &phenotype.id,
                EffectRecord::new(Effect::Stimulation)
                    .with_type("annotation")
                    .with_reference(request.term.clone())
                    .with_source("ontology"),
                EndpointPolicy::Require,
            )?;
        }
    }

    tracing::info!(
        term = %request.term,
        pool = pool.len(),
        sources = sources.len(),
        compress = request.compress,
        "phenotype attached"
    );
    Ok(())
}

fn ensure_phenotype(graph: &mut Graph, phenotype: &Node) {
    if !graph.contains_node(&phenotype.id) {
        graph.add_node(
            phenotype.id.clone(),
            Some(phenotype.label.clone()),
            phenotype.kind,
        );
    }
}

/// Merge a path whose final step is redirected to the phenotype node.
fn merge_compressed(
    ctx: &Context<'_>,
    graph: &mut Graph,
    path: &Path,
    phenotype: &Node,
) -> Result<(), NetworkError> {
    let Some((last, leading)) = path.steps.split_last() else {
        return Ok(());
    };
    for step in leading {
        ctx.merge_interactions(graph, step)?;
    }
    ensure_phenotype(graph, phenotype);
    for interaction in last {
        ctx.ensure_node(graph, &interaction.source);
        graph.add_edge(
            &interaction.source,
            &phenotype.id,
            interaction.to_record(),
            EndpointPolicy::Require,
        )?;
    }
    Ok(())
}
