mod islands;
mod placement;
mod ranking;
mod rows;
mod skyline;
mod topology;
pub(crate) mod types;
pub use types::*;

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::ir::Graph;

use islands::{Island, detect_islands, resolve_islands};
use placement::{XContext, approach_nodes, initial_x, reconcile, resolve_split_pulls};
use ranking::{RowAssignment, primary_root, topological_order};
use rows::place_rows;
use topology::{Ancestors, ChainMap, Topology};

/// Computes a tidy position for every node of `graph`.
///
/// The input is left untouched. Feeding the result back in (see
/// [`Graph::apply_positions`]) reproduces it for any connected tree whose
/// nodes all have a width. Elsewhere a second pass can still settle things:
/// siblings that land on the same y fall back to input order when rows are
/// handed out again, and a secondary root level with the anchor but further
/// left becomes the anchor next time.
pub fn compute_layout(graph: &Graph, config: &LayoutConfig) -> Result<Positions, LayoutError> {
    compute_layout_detailed(graph, config).map(|layout| layout.positions())
}

/// Like [`compute_layout`], but keeps the role, row and island each node was
/// placed with.
pub fn compute_layout_detailed(
    graph: &Graph,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    let topo = Topology::build(graph).inspect_err(|err| warn!(%err, "graph rejected"))?;
    if topo.nodes.is_empty() {
        return Ok(Layout::default());
    }

    let order = topological_order(&topo);
    if order.len() < topo.len() {
        let mut sorted = vec![false; topo.len()];
        for &node in &order {
            sorted[node] = true;
        }
        let nodes = topo
            .nodes
            .iter()
            .zip(sorted)
            .filter(|(_, sorted)| !sorted)
            .map(|(info, _)| info.id.clone())
            .collect();
        let err = LayoutError::Cycle { nodes };
        warn!(%err, "graph rejected");
        return Err(err);
    }

    let gap = config.gap;
    let mut islands = detect_islands(&topo)
        .into_iter()
        .map(|members| layout_island(&topo, members, gap))
        .collect::<Result<Vec<_>, _>>()?;
    resolve_islands(&topo, &mut islands, gap);

    let layout = assemble(&topo, &islands);
    debug!(
        nodes = layout.nodes.len(),
        islands = layout.islands,
        width = layout.width,
        height = layout.height,
        "layout complete"
    );
    Ok(layout)
}

fn layout_island(topo: &Topology, members: Vec<usize>, gap: f32) -> Result<Island, LayoutError> {
    let local = topo.subset(&members);
    let order = topological_order(&local);
    let Some(primary) = primary_root(&local) else {
        // A component without a root is cyclic all the way round.
        return Err(LayoutError::Cycle {
            nodes: local.nodes.iter().map(|info| info.id.clone()).collect(),
        });
    };

    let chains = ChainMap::trace(&local);
    let ancestors = Ancestors::build(&local, &order);
    let rows = RowAssignment::assign(&local, &chains, &order);
    debug!(
        anchor = %local.nodes[primary].id,
        nodes = local.len(),
        rows = rows.count(),
        "rows assigned"
    );

    let ctx = XContext::new(&local, &chains, &order, &ancestors, &rows, primary, gap);
    let pulled = resolve_split_pulls(&ctx, initial_x(&ctx));
    let approach = approach_nodes(&ctx);
    let xs = reconcile(&ctx, &pulled, &approach);
    debug!(
        anchor = %local.nodes[primary].id,
        pulled = pulled.pulls.iter().filter(|pull| pull.is_some()).count(),
        approach = approach.len(),
        "columns resolved"
    );

    let ys = place_rows(&local, &rows, &xs, primary, gap);
    Ok(Island {
        anchor: members[primary],
        rows: (0..local.len()).map(|node| rows.row(node)).collect(),
        members,
        xs,
        ys,
    })
}

fn assemble(topo: &Topology, islands: &[Island]) -> Layout {
    let mut layout = Layout {
        islands: islands.len(),
        ..Layout::default()
    };
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for (island_idx, island) in islands.iter().enumerate() {
        for (local, &node) in island.members.iter().enumerate() {
            let info = &topo.nodes[node];
            let (x, y) = (island.xs[local], island.ys[local]);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x + info.width);
            max_y = max_y.max(y + info.height);
            layout.nodes.insert(
                info.id.clone(),
                NodeLayout {
                    id: info.id.clone(),
                    x,
                    y,
                    width: info.width,
                    height: info.height,
                    role: info.role,
                    row: island.rows[local],
                    island: island_idx,
                },
            );
        }
    }

    if !layout.nodes.is_empty() {
        layout.width = max_x - min_x;
        layout.height = max_y - min_y;
    }
    layout
}
