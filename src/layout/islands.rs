use std::collections::VecDeque;

use tracing::debug;

use super::skyline::Skyline;
use super::topology::Topology;

/// Connected components under undirected adjacency, each sorted by input
/// index. Components are discovered by breadth-first search seeded in input
/// order.
pub(super) fn detect_islands(topo: &Topology) -> Vec<Vec<usize>> {
    let mut visited = vec![false; topo.len()];
    let mut islands = Vec::new();
    for seed in 0..topo.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut queue = VecDeque::from([seed]);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            members.push(node);
            let info = &topo.nodes[node];
            for &next in info.parents.iter().chain(&info.children) {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        members.sort_unstable();
        islands.push(members);
    }
    islands
}

/// One component laid out on its own. `members` are global node indices;
/// `xs`, `ys` and `rows` are indexed like `members`.
#[derive(Debug, Clone)]
pub(super) struct Island {
    pub members: Vec<usize>,
    /// Global index of the root that anchors this island.
    pub anchor: usize,
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    pub rows: Vec<usize>,
}

/// Orders islands by their anchor's original top-left corner and pushes each
/// one down, rigidly, until it clears every island placed before it. The
/// first island never moves.
pub(super) fn resolve_islands(topo: &Topology, islands: &mut [Island], gap: f32) {
    islands.sort_by(|a, b| topo.cmp_top_left(a.anchor, b.anchor));

    let mut skyline = Skyline::new();
    for (idx, island) in islands.iter_mut().enumerate() {
        let shift = island
            .members
            .iter()
            .enumerate()
            .filter_map(|(local, &node)| {
                let left = island.xs[local];
                let right = left + topo.nodes[node].width;
                skyline
                    .max_in(left, right)
                    .map(|bottom| bottom + gap - island.ys[local])
            })
            .fold(0.0f32, f32::max);

        if shift > 0.0 {
            for y in &mut island.ys {
                *y += shift;
            }
        }
        debug!(
            island = idx,
            anchor = %topo.nodes[island.anchor].id,
            nodes = island.members.len(),
            shift,
            "island placed"
        );

        for (local, &node) in island.members.iter().enumerate() {
            let info = &topo.nodes[node];
            let left = island.xs[local];
            skyline.insert(left, left + info.width, island.ys[local] + info.height);
        }
    }
}
