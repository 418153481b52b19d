//! Iterative Neighbor Expansion.

use super::{ConnectOptions, Context, Direction, Explorer, RadialDirection};
use crate::primitives::RADIAL_SAFE_DEPTH;
use crate::{Accession, Graph, NetworkError};

/// Round-by-round radial expansion state.
///
/// Each round queries the neighbors of the frontier, merges every admitted
/// interaction, and makes the newly added nodes the next frontier.
/// A node is queried at most once.
pub(crate) struct RadialExpansion<'a> {
    explorer: Explorer<'a>,
    frontier: Vec<Accession>,
    direction: RadialDirection,
}

impl<'a> RadialExpansion<'a> {
    pub(crate) fn new(
        ctx: &Context<'a>,
        frontier: Vec<Accession>,
        options: &ConnectOptions,
    ) -> Self {
        Self {
            explorer: ctx.explorer(options),
            frontier,
            direction: options.direction,
        }
    }

    fn directions(&self) -> &'static [Direction] {
        match self.direction {
            RadialDirection::Out => &[Direction::Out],
            RadialDirection::In => &[Direction::In],
            RadialDirection::Both => &[Direction::Out, Direction::In],
        }
    }

    /// Run one round. Returns the number of nodes added.
    pub(crate) fn step(
        &mut self,
        ctx: &Context<'_>,
        graph: &mut Graph,
    ) -> Result<usize, NetworkError> {
        let frontier = std::mem::take(&mut self.frontier);
        let mut discovered = Vec::new();

        for node in &frontier {
            for &direction in self.directions() {
                for hop in self.explorer.hops(node, direction) {
                    if !graph.contains_node(&hop.neighbor) {
                        ctx.ensure_node(graph, &hop.neighbor);
                        discovered.push(hop.neighbor.clone());
                    }
                    ctx.merge_interactions(graph, &hop.interactions)?;
                }
            }
        }

        let added = discovered.len();
        self.frontier = discovered;
        Ok(added)
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }
}

/// Expand radially from `frontier` for `max_len` rounds.
pub(crate) fn expand(
    ctx: &Context<'_>,
    graph: &mut Graph,
    frontier: Vec<Accession>,
    options: &ConnectOptions,
) -> Result<(), NetworkError> {
    let rounds = options.max_len;
    if rounds > RADIAL_SAFE_DEPTH {
        tracing::warn!(
            max_len = rounds,
            "radial expansion beyond depth {} can explode around hub nodes",
            RADIAL_SAFE_DEPTH
        );
    }

    let mut expansion = RadialExpansion::new(ctx, frontier, options);
    for round in 0..rounds {
        let added = expansion.step(ctx, graph)?;
        tracing::debug!(round, added, "radial round complete");
        if expansion.is_exhausted() {
            break;
        }
    }
    Ok(())
}
