//! Horizontal placement.
//!
//! Four passes, each returning a fresh coordinate vector:
//! 1. [`initial_x`] lays nodes out left to right with anchor, merge alignment
//!    and sequential rules.
//! 2. [`resolve_split_pulls`] slides splits and secondary roots right (or, for
//!    roots, left) so their branches arrive at a downstream merge just in
//!    time.
//! 3. [`approach_nodes`] picks chain tails that should hug the higher-priority
//!    merge they feed.
//! 4. [`reconcile`] recomputes everything that is not fixed against the
//!    final upstream positions.

use std::collections::BTreeMap;

use tracing::trace;

use super::ranking::RowAssignment;
use super::topology::{Ancestors, ChainMap, Topology};
use super::types::Role;

/// Read-only facts shared by every horizontal pass of one island.
pub(super) struct XContext<'a> {
    pub topo: &'a Topology,
    pub chains: &'a ChainMap,
    pub order: &'a [usize],
    pub ancestors: &'a Ancestors,
    pub rows: &'a RowAssignment,
    pub primary: usize,
    pub gap: f32,
    /// Position of each node inside `order`.
    position: Vec<usize>,
}

impl<'a> XContext<'a> {
    pub fn new(
        topo: &'a Topology,
        chains: &'a ChainMap,
        order: &'a [usize],
        ancestors: &'a Ancestors,
        rows: &'a RowAssignment,
        primary: usize,
        gap: f32,
    ) -> Self {
        let mut position = vec![0; topo.len()];
        for (pos, &node) in order.iter().enumerate() {
            position[node] = pos;
        }
        Self {
            topo,
            chains,
            order,
            ancestors,
            rows,
            primary,
            gap,
            position,
        }
    }

    fn sequential(&self, node: usize, xs: &[f32]) -> f32 {
        match self.topo.nodes[node].parents.first() {
            Some(&parent) => self.topo.right(parent, xs) + self.gap,
            None => xs[node],
        }
    }

    /// Left edge that clears the right edge of every listed parent.
    fn aligned_after(&self, parents: impl IntoIterator<Item = usize>, xs: &[f32]) -> Option<f32> {
        parents
            .into_iter()
            .map(|parent| self.topo.right(parent, xs))
            .reduce(f32::max)
            .map(|right| right + self.gap)
    }

    fn split_floor(&self, node: usize, xs: &[f32], pull: Option<f32>) -> f32 {
        let floor = self.sequential(node, xs);
        pull.map_or(floor, |pull| floor.max(pull))
    }

    /// Alignment of `merge` counting only parents outside the forward reach
    /// of `puller`.
    fn independent_merge_x(&self, merge: usize, puller: usize, xs: &[f32]) -> Option<f32> {
        let parents = self.topo.nodes[merge]
            .parents
            .iter()
            .copied()
            .filter(|&parent| parent != puller && !self.ancestors.is_descendant(parent, puller));
        self.aligned_after(parents, xs)
    }
}

pub(super) fn initial_x(ctx: &XContext) -> Vec<f32> {
    let mut xs = vec![0.0; ctx.topo.len()];
    for &node in ctx.order {
        let info = &ctx.topo.nodes[node];
        let x = if node == ctx.primary {
            info.initial_x
        } else if info.role.is_merge() {
            ctx.aligned_after(info.parents.iter().copied(), &xs)
                .unwrap_or(0.0)
        } else if info.parents.len() == 1 {
            ctx.sequential(node, &xs)
        } else {
            // Secondary root: provisional until split-pull places it.
            0.0
        };
        xs[node] = x;
    }
    xs
}

#[derive(Debug, Clone)]
pub(super) struct PullResolution {
    pub xs: Vec<f32>,
    /// Chosen pull per split or secondary root, `None` when no target exists.
    pub pulls: Vec<Option<f32>>,
}

pub(super) fn resolve_split_pulls(ctx: &XContext, xs: Vec<f32>) -> PullResolution {
    let topo = ctx.topo;
    let mut xs = xs;
    let mut pulls = vec![None; topo.len()];

    let splits: Vec<usize> = ctx
        .order
        .iter()
        .rev()
        .copied()
        .filter(|&node| {
            node != ctx.primary
                && topo.nodes[node].role == Role::Split
                && !topo.nodes[node].is_root()
        })
        .collect();
    for split in splits {
        let pull = pull_target(ctx, split, &xs);
        pulls[split] = pull;
        xs[split] = ctx.split_floor(split, &xs, pull);
        propagate_chains(ctx, split, &mut xs);
    }

    let mut roots: Vec<usize> = (0..topo.len())
        .filter(|&node| node != ctx.primary && topo.nodes[node].is_root())
        .collect();
    roots.sort_by(|&a, &b| topo.cmp_top_left(a, b));
    for root in roots {
        let pull = pull_target(ctx, root, &xs);
        pulls[root] = pull;
        // Roots are not anchored: the pull is taken verbatim, even if negative.
        xs[root] = pull.unwrap_or(0.0);
        propagate_chains(ctx, root, &mut xs);
    }

    PullResolution { xs, pulls }
}

/// Finds the most constraining merge downstream of `puller`.
///
/// Boundary nodes are expanded in topological order, so each one is reached
/// with its longest cumulative width before it is examined. A target in a
/// higher-priority row ends its path; any other independent merge is kept
/// as a fallback and traversed through.
fn pull_target(ctx: &XContext, puller: usize, xs: &[f32]) -> Option<f32> {
    let topo = ctx.topo;
    let puller_row = ctx.rows.row(puller);
    let mut frontier: BTreeMap<usize, (usize, f32)> = BTreeMap::new();
    frontier.insert(ctx.position[puller], (puller, 0.0));

    let mut primary: Option<f32> = None;
    let mut fallback: Option<f32> = None;
    while let Some((_, (node, cumulative))) = frontier.pop_first() {
        if node != puller && topo.nodes[node].role.is_merge() {
            if let Some(target) = ctx.independent_merge_x(node, puller, xs) {
                let value = target - cumulative;
                if ctx.rows.row(node) < puller_row {
                    trace!(puller = %topo.nodes[puller].id, merge = %topo.nodes[node].id, value, "primary pull target");
                    primary = Some(primary.map_or(value, |best: f32| best.min(value)));
                    continue;
                }
                trace!(puller = %topo.nodes[puller].id, merge = %topo.nodes[node].id, value, "fallback pull target");
                fallback = Some(fallback.map_or(value, |best: f32| best.min(value)));
            }
        }

        let base = cumulative + topo.nodes[node].width + ctx.gap;
        for chain in ctx.chains.starting_at(node) {
            let end = chain[chain.len() - 1];
            let reach = base
                + chain[1..chain.len() - 1]
                    .iter()
                    .map(|&member| topo.nodes[member].width + ctx.gap)
                    .sum::<f32>();
            let slot = frontier.entry(ctx.position[end]).or_insert((end, reach));
            slot.1 = slot.1.max(reach);
        }
    }

    primary.or(fallback)
}

/// Re-lays the simple runs (and leaf ends) hanging off `start`. The next
/// boundary keeps its own rule.
fn propagate_chains(ctx: &XContext, start: usize, xs: &mut [f32]) {
    for chain in ctx.chains.starting_at(start) {
        for pair in chain.windows(2) {
            let (prev, node) = (pair[0], pair[1]);
            if !matches!(ctx.topo.nodes[node].role, Role::Simple | Role::Leaf) {
                break;
            }
            let x = ctx.topo.right(prev, xs) + ctx.gap;
            xs[node] = x;
        }
    }
}

/// Maps each approach node to the merge it leans toward: the last interior
/// node of a chain whose end merge sits in a strictly higher-priority row
/// than the chain's start.
pub(super) fn approach_nodes(ctx: &XContext) -> BTreeMap<usize, usize> {
    let mut approach = BTreeMap::new();
    for chain in ctx.chains.iter() {
        if chain.len() < 3 {
            continue;
        }
        let start = chain[0];
        let end = chain[chain.len() - 1];
        if ctx.topo.nodes[end].role.is_merge() && ctx.rows.row(end) < ctx.rows.row(start) {
            approach.insert(chain[chain.len() - 2], end);
        }
    }
    approach
}

/// Final topological pass. The primary root and secondary roots are fixed;
/// splits re-apply their pull floor; approach nodes are resolved right before
/// the merge they feed; merges re-align; everything else is sequential.
pub(super) fn reconcile(
    ctx: &XContext,
    resolution: &PullResolution,
    approach: &BTreeMap<usize, usize>,
) -> Vec<f32> {
    let mut xs = resolution.xs.clone();
    for &node in ctx.order {
        let info = &ctx.topo.nodes[node];
        if node == ctx.primary || info.is_root() || approach.contains_key(&node) {
            continue;
        }
        let x = match info.role {
            Role::Split => ctx.split_floor(node, &xs, resolution.pulls[node]),
            Role::Merge | Role::MergeSplit => {
                resolve_approaches(ctx, node, approach, &mut xs);
                ctx.aligned_after(info.parents.iter().copied(), &xs)
                    .unwrap_or(xs[node])
            }
            _ => ctx.sequential(node, &xs),
        };
        xs[node] = x;
    }
    xs
}

fn resolve_approaches(
    ctx: &XContext,
    merge: usize,
    approach: &BTreeMap<usize, usize>,
    xs: &mut [f32],
) {
    let parents = &ctx.topo.nodes[merge].parents;
    let approaching: Vec<usize> = parents
        .iter()
        .copied()
        .filter(|parent| approach.get(parent) == Some(&merge))
        .collect();
    if approaching.is_empty() {
        return;
    }

    // Sibling approach nodes count at their sequential base so no pair of
    // them depends on each other.
    for &node in &approaching {
        let base = ctx.sequential(node, xs);
        xs[node] = base;
    }
    let resolved: Vec<(usize, f32)> = approaching
        .iter()
        .map(|&node| {
            let base = xs[node];
            let others = parents.iter().copied().filter(|&parent| parent != node);
            let x = match ctx.aligned_after(others, xs) {
                Some(target) => base.max(target - ctx.topo.nodes[node].width - ctx.gap),
                None => base,
            };
            (node, x)
        })
        .collect();
    for (node, x) in resolved {
        xs[node] = x;
    }
}
