//! Reciprocal Pathway Extension and basic connection.

use super::{ConnectOptions, ConnectionReport, Context};
use crate::{Accession, Graph, NetworkError};
use std::collections::BTreeSet;

/// Connect every unordered seed pair in both directions with a path of at
/// most `max_len` hops. Directions already connected within the bound by
/// the current graph are skipped.
///
/// Interactions between nodes already in the graph are merged afterwards
/// by `connect_nodes`: once at the end, or after every merged path when
/// bias is enabled so later searches see the biased edges.
pub(crate) fn complete_connection(
    ctx: &Context<'_>,
    graph: &mut Graph,
    seeds: &[Accession],
    options: &ConnectOptions,
    report: &mut ConnectionReport,
) -> Result<(), NetworkError> {
    let max_len = options.max_len;
    let explorer = ctx.explorer(options);

    let mut seen = BTreeSet::new();
    let seeds: Vec<&Accession> = seeds.iter().filter(|s| seen.insert(*s)).collect();
    for seed in &seeds {
        ctx.ensure_node(graph, seed);
    }

    for (i, a) in seeds.iter().enumerate() {
        for b in seeds.iter().skip(i.saturating_add(1)) {
            for (from, to) in [(*a, *b), (*b, *a)] {
                if graph.has_path_within(from, to, max_len, options.only_signed) {
                    tracing::debug!(from = %from, to = %to, "already connected within bound");
                    continue;
                }
                match explorer.find_path(from, to, max_len, options.search_mode) {
                    Some(path) => {
                        ctx.merge_path(graph, &path)?;
                        report.paths.push(path.nodes);
                        if options.connect_with_bias {
                            connect_nodes(ctx, graph, options)?;
                        }
                    }
                    None => {
                        tracing::warn!(from = %from, to = %to, max_len, "no path found within bound");
                        report.unconnected.push((from.clone(), to.clone()));
                    }
                }
            }
        }
    }

    if !options.connect_with_bias {
        connect_nodes(ctx, graph, options)?;
    }
    Ok(())
}

/// Merge every admitted resource interaction between two nodes already in
/// the graph.
pub(crate) fn connect_nodes(
    ctx: &Context<'_>,
    graph: &mut Graph,
    options: &ConnectOptions,
) -> Result<(), NetworkError> {
    let explorer = ctx.explorer(options);
    let nodes: Vec<Accession> = graph.node_ids().cloned().collect();
    for node in &nodes {
        for hop in explorer.hops(node, super::Direction::Out) {
            if graph.contains_node(&hop.neighbor) {
                ctx.merge_interactions(graph, &hop.interactions)?;
            }
        }
    }
    Ok(())
}
