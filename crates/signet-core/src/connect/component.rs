//! Subgroup and disconnected-component connection.

use super::radial::RadialExpansion;
use super::{Algorithm, ComponentMode, ConnectOptions, ConnectionReport, Context};
use crate::{Accession, Graph, NetworkError};
use std::collections::BTreeSet;

/// Search paths between two node groups. Returns the number of paths merged.
pub(crate) fn connect_component_pair(
    ctx: &Context<'_>,
    graph: &mut Graph,
    first: &[Accession],
    second: &[Accession],
    mode: ComponentMode,
    options: &ConnectOptions,
    report: &mut ConnectionReport,
) -> Result<usize, NetworkError> {
    let explorer = ctx.explorer(options);
    let max_len = options.max_len;
    let directions: Vec<(&[Accession], &[Accession])> = match mode {
        ComponentMode::Out => vec![(first, second)],
        ComponentMode::In => vec![(second, first)],
        ComponentMode::All => vec![(first, second), (second, first)],
    };

    let mut merged = 0usize;
    for (sources, targets) in directions {
        let targets: BTreeSet<Accession> = targets.iter().cloned().collect();
        for source in sources {
            if targets.contains(source) {
                continue;
            }
            match explorer.find_path_to_any(source, &targets, max_len, options.search_mode) {
                Some(path) => {
                    ctx.merge_path(graph, &path)?;
                    report.paths.push(path.nodes);
                    merged = merged.saturating_add(1);
                }
                None => {
                    tracing::debug!(source = %source, max_len, "no path into component");
                }
            }
        }
    }
    Ok(merged)
}

/// Connect the undirected components of the graph.
///
/// RPE searches between every pair of components not yet joined. INE
/// expands radially from every node outside the largest component until
/// the graph is connected or the bound is spent.
pub(crate) fn connect_components(
    ctx: &Context<'_>,
    graph: &mut Graph,
    algorithm: Algorithm,
    mode: ComponentMode,
    options: &ConnectOptions,
    report: &mut ConnectionReport,
) -> Result<(), NetworkError> {
    let components = graph.components();
    if components.len() <= 1 {
        tracing::debug!("graph already connected");
        return Ok(());
    }

    match algorithm {
        Algorithm::Rpe => {
            // group[i]: label of the joined set component i belongs to
            let mut group: Vec<usize> = (0..components.len()).collect();
            for (i, first) in components.iter().enumerate() {
                for (j, second) in components.iter().enumerate().skip(i.saturating_add(1)) {
                    let (gi, gj) = (group[i], group[j]);
                    if gi == gj {
                        continue;
                    }
                    let merged =
                        connect_component_pair(ctx, graph, first, second, mode, options, report)?;
                    if merged > 0 {
                        for label in &mut group {
                            if *label == gj {
                                *label = gi;
                            }
                        }
                    }
                }
            }
        }
        Algorithm::Ine => {
            let main = largest(&components);
            let frontier: Vec<Accession> = components
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != main)
                .flat_map(|(_, component)| component.iter().cloned())
                .collect();

            let mut expansion = RadialExpansion::new(ctx, frontier, options);
            for round in 0..options.max_len {
                if graph.is_connected() || expansion.is_exhausted() {
                    break;
                }
                let added = expansion.step(ctx, graph)?;
                tracing::debug!(round, added, "component radial round complete");
            }
        }
    }

    if !graph.is_connected() {
        tracing::warn!(
            components = graph.components().len(),
            "graph still disconnected within bound"
        );
    }
    Ok(())
}

/// Index of the largest component, first one on ties.
fn largest(components: &[Vec<Accession>]) -> usize {
    let mut best = 0usize;
    let mut best_len = 0usize;
    for (i, component) in components.iter().enumerate() {
        if component.len() > best_len {
            best = i;
            best_len = component.len();
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Interaction, TableResource};
    use crate::translate::IdentityTranslator;
    use crate::{Effect, EffectRecord, EndpointPolicy};

    fn acc(s: &str) -> Accession {
        Accession::parse(s).expect("valid accession")
    }

    /// Network: A -> B and C (isolated). Resource bridges B -> X -> C.
    fn split_graph() -> Graph {
        let mut graph = Graph::new();
        for n in ["A", "B", "C"] {
            graph.add_node(acc(n), None, None);
        }
        graph
            .add_edge(
                &acc("A"),
                &acc("B"),
                EffectRecord::new(Effect::Stimulation),
                EndpointPolicy::Require,
            )
            .expect("edge");
        graph
    }

    fn bridge() -> TableResource {
        [
            Interaction::new(acc("B"), acc("X"), Effect::Stimulation),
            Interaction::new(acc("X"), acc("C"), Effect::Stimulation),
        ]
        .into_iter()
        .collect()
    }

    fn ctx(table: &TableResource) -> Context<'_> {
        Context {
            resource: table,
            translator: &IdentityTranslator,
            ontology: None,
            provenance: None,
        }
    }

    #[test]
    fn rpe_joins_components() {
        let table = bridge();
        let mut graph = split_graph();
        let mut report = ConnectionReport::default();
        connect_components(
            &ctx(&table),
            &mut graph,
            Algorithm::Rpe,
            ComponentMode::All,
            &ConnectOptions::default(),
            &mut report,
        )
        .expect("connect");

        assert!(graph.is_connected());
        assert!(graph.contains_node(&acc("X")));
    }

    #[test]
    fn pair_mode_in_searches_reverse_direction_only() {
        let table = bridge();
        let mut graph = split_graph();
        let mut report = ConnectionReport::default();
        let merged = connect_component_pair(
            &ctx(&table),
            &mut graph,
            &[acc("A"), acc("B")],
            &[acc("C")],
            ComponentMode::In,
            &ConnectOptions::default(),
            &mut report,
        )
        .expect("connect");

        assert_eq!(merged, 0);
        assert!(!graph.is_connected());
    }

    #[test]
    fn ine_expands_from_minor_components() {
        let table = bridge();
        let mut graph = split_graph();
        let mut report = ConnectionReport::default();
        connect_components(
            &ctx(&table),
            &mut graph,
            Algorithm::Ine,
            ComponentMode::All,
            &ConnectOptions::default(),
            &mut report,
        )
        .expect("connect");

        assert!(graph.is_connected());
        assert!(graph.contains_edge(&acc("B"), &acc("X")));
    }
}
