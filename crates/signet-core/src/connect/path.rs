//! Bounded path search over the filtered resource graph.

use super::{Direction, Explorer, Hop, Path, SearchMode};
use crate::Accession;
use crate::resource::Interaction;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

impl Explorer<'_> {
    /// Find a path `from -> to` of at most `max_len` hops.
    pub(crate) fn find_path(
        &self,
        from: &Accession,
        to: &Accession,
        max_len: usize,
        mode: SearchMode,
    ) -> Option<Path> {
        if from == to {
            return None;
        }
        let targets = BTreeSet::from([to.clone()]);
        self.find_path_to_any(from, &targets, max_len, mode)
    }

    /// Find a path from `from` to any member of `targets`.
    pub(crate) fn find_path_to_any(
        &self,
        from: &Accession,
        targets: &BTreeSet<Accession>,
        max_len: usize,
        mode: SearchMode,
    ) -> Option<Path> {
        match mode {
            SearchMode::Bfs => self.shortest_path(from, targets, max_len),
            SearchMode::Dfs => self.first_path(from, targets, max_len),
        }
    }

    fn shortest_path(
        &self,
        from: &Accession,
        targets: &BTreeSet<Accession>,
        max_len: usize,
    ) -> Option<Path> {
        let mut parents: BTreeMap<Accession, (Accession, Vec<Interaction>)> = BTreeMap::new();
        let mut visited = BTreeSet::from([from.clone()]);
        let mut queue = VecDeque::from([(from.clone(), 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_len {
                continue;
            }
            for Hop {
                neighbor,
                interactions,
            } in self.hops(&current, Direction::Out)
            {
                if !visited.insert(neighbor.clone()) {
                    continue;
                }
                parents.insert(neighbor.clone(), (current.clone(), interactions));
                if targets.contains(&neighbor) {
                    return unwind(parents, from, neighbor);
                }
                queue.push_back((neighbor, depth.saturating_add(1)));
            }
        }
        None
    }

    fn first_path(
        &self,
        from: &Accession,
        targets: &BTreeSet<Accession>,
        max_len: usize,
    ) -> Option<Path> {
        let mut path = Path {
            nodes: vec![from.clone()],
            steps: Vec::new(),
        };
        let mut on_path = BTreeSet::from([from.clone()]);
        if self.extend(&mut path, &mut on_path, targets, max_len) {
            Some(path)
        } else {
            None
        }
    }

    fn extend(
        &self,
        path: &mut Path,
        on_path: &mut BTreeSet<Accession>,
        targets: &BTreeSet<Accession>,
        max_len: usize,
    ) -> bool {
        if path.steps.len() >= max_len {
            return false;
        }
        let Some(current) = path.nodes.last().cloned() else {
            return false;
        };

        for Hop {
            neighbor,
            interactions,
        } in self.hops(&current, Direction::Out)
        {
            if on_path.contains(&neighbor) {
                continue;
            }
            let reached = targets.contains(&neighbor);
            on_path.insert(neighbor.clone());
            path.nodes.push(neighbor.clone());
            path.steps.push(interactions);

            if reached || self.extend(path, on_path, targets, max_len) {
                return true;
            }

            path.nodes.pop();
            path.steps.pop();
            on_path.remove(&neighbor);
        }
        false
    }
}

/// Rebuild the path ending at `end` from BFS parent links.
fn unwind(
    mut parents: BTreeMap<Accession, (Accession, Vec<Interaction>)>,
    from: &Accession,
    end: Accession,
) -> Option<Path> {
    let mut nodes = vec![end];
    let mut steps = Vec::new();
    loop {
        let current = nodes.last()?;
        if current == from {
            break;
        }
        let (parent, interactions) = parents.remove(current)?;
        nodes.push(parent);
        steps.push(interactions);
    }
    nodes.reverse();
    steps.reverse();
    Some(Path { nodes, steps })
}
