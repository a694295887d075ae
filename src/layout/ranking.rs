use std::collections::VecDeque;

use super::topology::{ChainMap, Topology};

/// Kahn's algorithm with FIFO tie-breaking: zero in-degree nodes are seeded
/// in input order and children are released in adjacency order.
///
/// Nodes on a cycle never reach zero in-degree and are left out, so a short
/// result means the graph is cyclic.
pub(super) fn topological_order(topo: &Topology) -> Vec<usize> {
    let mut indeg: Vec<usize> = topo.nodes.iter().map(|info| info.parents.len()).collect();
    let mut ready: VecDeque<usize> = (0..topo.len()).filter(|&idx| indeg[idx] == 0).collect();

    let mut order = Vec::with_capacity(topo.len());
    while let Some(node) = ready.pop_front() {
        order.push(node);
        for &child in &topo.nodes[node].children {
            indeg[child] = indeg[child].saturating_sub(1);
            if indeg[child] == 0 {
                ready.push_back(child);
            }
        }
    }
    order
}

/// The root that anchors an island: topmost, then leftmost, then first in
/// input order.
pub(super) fn primary_root(topo: &Topology) -> Option<usize> {
    (0..topo.len())
        .filter(|&idx| topo.nodes[idx].is_root())
        .min_by(|&a, &b| topo.cmp_top_left(a, b))
}

/// Priority class per node. Row 0 is the topmost, highest-priority row.
#[derive(Debug, Clone, Default)]
pub(super) struct RowAssignment {
    rows: Vec<usize>,
    count: usize,
}

impl RowAssignment {
    pub fn assign(topo: &Topology, chains: &ChainMap, order: &[usize]) -> Self {
        let (rows, mut count) = claim_rows(topo, chains, order);
        debug_assert!(rows.iter().all(Option::is_some), "every node belongs to a row");
        // Every node is a boundary or sits on a chain out of one, so nothing is
        // left unclaimed. Should that break, the node still gets a row to itself.
        let rows = rows
            .into_iter()
            .map(|row| {
                row.unwrap_or_else(|| {
                    count += 1;
                    count - 1
                })
            })
            .collect();
        Self { rows, count }
    }

    pub fn row(&self, node: usize) -> usize {
        self.rows[node]
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Walks boundaries in topological order and hands out rows. A merge moves up
/// when a higher-priority chain reaches it.
fn claim_rows(
    topo: &Topology,
    chains: &ChainMap,
    order: &[usize],
) -> (Vec<Option<usize>>, usize) {
    let mut rows: Vec<Option<usize>> = vec![None; topo.len()];
    let mut count = 0usize;
    let mut fresh = || {
        let row = count;
        count += 1;
        row
    };

    for &node in order {
        let info = &topo.nodes[node];
        if !info.role.is_boundary() {
            continue;
        }
        let current = match rows[node] {
            Some(row) => row,
            None => {
                let row = fresh();
                rows[node] = Some(row);
                row
            }
        };

        let mut outgoing: Vec<&[usize]> = info
            .children
            .iter()
            .filter_map(|&child| chains.get(node, child))
            .collect();
        outgoing.sort_by(|a, b| topo.cmp_original_y(a[1], b[1]));

        let mut spine_open = true;
        for chain in outgoing {
            let end = chain[chain.len() - 1];
            let interior = &chain[1..chain.len() - 1];
            let end_is_merge = topo.nodes[end].role.is_merge();
            let eligible = match rows[end] {
                None => true,
                Some(end_row) => end_is_merge && current < end_row,
            };

            let chain_row = if spine_open && eligible {
                spine_open = false;
                current
            } else if !interior.is_empty() || rows[end].is_none() {
                fresh()
            } else {
                continue;
            };

            for &member in interior {
                rows[member] = Some(chain_row);
            }
            match rows[end] {
                None => rows[end] = Some(chain_row),
                Some(end_row) if end_is_merge && chain_row < end_row => {
                    rows[end] = Some(chain_row);
                }
                _ => {}
            }
        }
    }

    (rows, count)
}
