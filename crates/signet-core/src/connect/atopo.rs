//! Topological connection of seeds to output nodes.

use super::{
    ConnectOptions, ConnectionReport, Context, RadialDirection, complete, radial, upstream,
};
use crate::primitives::ATOPO_MAX_DEPTH;
use crate::{Accession, Graph, NetworkError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Expansion run around the seeds before outputs are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtopoStrategy {
    /// Radial expansion in both directions from every node.
    Radial,
    /// Complete connection of the seeds, without bias.
    Complete,
}

/// Build a network flowing from `seeds` towards `outputs`.
///
/// After the optional strategy, outputs are added and upstream regulators
/// of the outputs are collected one level deeper per attempt (up to
/// `ATOPO_MAX_DEPTH`) until the graph is connected. Regulators added by an
/// attempt that nothing regulates are dropped. Finally nodes other than the
/// seeds that are not the target of any edge are pruned until none remain.
pub(crate) fn connect_as_atopo(
    ctx: &Context<'_>,
    graph: &mut Graph,
    seeds: &[Accession],
    strategy: Option<AtopoStrategy>,
    outputs: &[Accession],
    options: &ConnectOptions,
    report: &mut ConnectionReport,
) -> Result<(), NetworkError> {
    let initial: BTreeSet<Accession> = seeds.iter().cloned().collect();

    match strategy {
        Some(AtopoStrategy::Radial) => {
            let options = ConnectOptions {
                direction: RadialDirection::Both,
                ..*options
            };
            let frontier: Vec<Accession> = graph.node_ids().cloned().collect();
            radial::expand(ctx, graph, frontier, &options)?;
        }
        Some(AtopoStrategy::Complete) => {
            let options = ConnectOptions {
                connect_with_bias: false,
                ..*options
            };
            complete::complete_connection(ctx, graph, seeds, &options, report)?;
        }
        None => {}
    }

    if outputs.is_empty() {
        return Ok(());
    }

    let starting: BTreeSet<Accession> = graph.node_ids().cloned().collect();
    for output in outputs {
        ctx.ensure_node(graph, output);
    }
    let output_set: BTreeSet<&Accession> = outputs.iter().collect();

    for depth in 1..=ATOPO_MAX_DEPTH {
        if graph.is_connected() {
            break;
        }
        upstream::connect_to_upstream_nodes(
            ctx,
            graph,
            outputs.to_vec(),
            depth,
            outputs.len(),
            options,
        )?;

        let added: Vec<Accession> = graph
            .node_ids()
            .filter(|id| !starting.contains(*id) && !output_set.contains(id))
            .cloned()
            .collect();
        for node in added {
            if graph.predecessors(&node).is_empty() {
                graph.remove_node(&node);
            }
        }
        tracing::debug!(depth, connected = graph.is_connected(), "upstream attempt finished");
    }

    let pruned = prune_unregulated(graph, &initial);
    tracing::debug!(pruned, "unregulated nodes pruned");
    Ok(())
}

/// Repeatedly remove nodes outside `keep` that no edge targets.
fn prune_unregulated(graph: &mut Graph, keep: &BTreeSet<Accession>) -> usize {
    let mut removed = 0;
    loop {
        let dangling: Vec<Accession> = graph
            .node_ids()
            .filter(|id| !keep.contains(*id) && graph.predecessors(id).is_empty())
            .cloned()
            .collect();
        if dangling.is_empty() {
            return removed;
        }
        for node in &dangling {
            graph.remove_node(node);
        }
        removed += dangling.len();
    }
}
