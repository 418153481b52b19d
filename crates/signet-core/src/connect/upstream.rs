//! Greedy upstream regulator collection.

use super::{ConnectOptions, Context, Direction};
use crate::resource::Interaction;
use crate::{Accession, Graph, NetworkError};
use std::collections::{BTreeMap, BTreeSet};

/// regulator -> (target -> admitted interactions)
type Regulators = BTreeMap<Accession, BTreeMap<Accession, Vec<Interaction>>>;

/// Collect regulators of `targets` level by level, up to `depth` levels.
///
/// At each level the regulators with the `rank` largest target coverages
/// are selected, their regulator -> target interactions merged, and they
/// become the targets of the next level.
pub(crate) fn connect_to_upstream_nodes(
    ctx: &Context<'_>,
    graph: &mut Graph,
    targets: Vec<Accession>,
    depth: usize,
    rank: usize,
    options: &ConnectOptions,
) -> Result<(), NetworkError> {
    let explorer = ctx.explorer(options);
    let rank = rank.max(1);

    let mut seen: BTreeSet<Accession> = targets.iter().cloned().collect();
    let mut level_targets = targets;

    for level in 0..depth {
        if level_targets.is_empty() {
            break;
        }

        let mut regulators: Regulators = BTreeMap::new();
        for target in &level_targets {
            for hop in explorer.hops(target, Direction::In) {
                regulators
                    .entry(hop.neighbor)
                    .or_default()
                    .insert(target.clone(), hop.interactions);
            }
        }

        let selected = select_covering(&regulators, rank);
        for regulator in &selected {
            for interactions in regulators.get(regulator).into_iter().flat_map(BTreeMap::values) {
                ctx.merge_interactions(graph, interactions)?;
            }
        }
        tracing::debug!(level, selected = selected.len(), "upstream regulators selected");

        level_targets = selected
            .into_iter()
            .filter(|r| seen.insert(r.clone()))
            .collect();
    }
    Ok(())
}

/// Greedy cover: each round picks every regulator whose coverage size is
/// among the `rank` largest, then drops candidates overlapping what was
/// just covered.
fn select_covering(regulators: &Regulators, rank: usize) -> Vec<Accession> {
    let mut candidates: BTreeMap<&Accession, BTreeSet<&Accession>> = regulators
        .iter()
        .map(|(regulator, targets)| (regulator, targets.keys().collect()))
        .collect();
    let mut selected = Vec::new();

    while !candidates.is_empty() {
        let mut sizes: Vec<usize> = candidates.values().map(BTreeSet::len).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();
        sizes.truncate(rank);

        let chosen: Vec<&Accession> = candidates
            .iter()
            .filter(|(_, covered)| sizes.contains(&covered.len()))
            .map(|(regulator, _)| *regulator)
            .collect();

        let mut covered: BTreeSet<&Accession> = BTreeSet::new();
        for regulator in &chosen {
            if let Some(targets) = candidates.get(regulator) {
                covered.extend(targets.iter().copied());
            }
        }

        candidates.retain(|regulator, targets| {
            !chosen.contains(regulator) && targets.is_disjoint(&covered)
        });
        selected.extend(chosen.into_iter().cloned());
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Effect;
    use crate::resource::TableResource;
    use crate::translate::IdentityTranslator;

    fn acc(s: &str) -> Accession {
        Accession::parse(s).expect("valid accession")
    }

    fn stim(s: &str, t: &str) -> Interaction {
        Interaction::new(acc(s), acc(t), Effect::Stimulation)
    }

    #[test]
    fn broadest_regulator_is_selected() {
        // R1 covers T1,T2; R2 covers T2 only; U regulates R1
        let table: TableResource = [
            stim("R1", "T1"),
            stim("R1", "T2"),
            stim("R2", "T2"),
            stim("U", "R1"),
        ]
        .into_iter()
        .collect();
        let ctx = Context {
            resource: &table,
            translator: &IdentityTranslator,
            ontology: None,
            provenance: None,
        };
        let mut graph = Graph::new();
        connect_to_upstream_nodes(
            &ctx,
            &mut graph,
            vec![acc("T1"), acc("T2")],
            2,
            1,
            &ConnectOptions::default(),
        )
        .expect("upstream");

        assert!(graph.contains_edge(&acc("R1"), &acc("T1")));
        assert!(graph.contains_edge(&acc("R1"), &acc("T2")));
        assert!(!graph.contains_node(&acc("R2")));
        assert!(graph.contains_edge(&acc("U"), &acc("R1")));
    }

    #[test]
    fn depth_limits_levels() {
        let table: TableResource = [stim("R", "T"), stim("U", "R")].into_iter().collect();
        let ctx = Context {
            resource: &table,
            translator: &IdentityTranslator,
            ontology: None,
            provenance: None,
        };
        let mut graph = Graph::new();
        connect_to_upstream_nodes(
            &ctx,
            &mut graph,
            vec![acc("T")],
            1,
            1,
            &ConnectOptions::default(),
        )
        .expect("upstream");

        assert!(graph.contains_node(&acc("R")));
        assert!(!graph.contains_node(&acc("U")));
    }
}
