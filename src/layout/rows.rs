use super::ranking::RowAssignment;
use super::skyline::Skyline;
use super::topology::Topology;

/// Order in which rows claim vertical space.
///
/// Depth-first from the primary root with children visited top to bottom by
/// their original y, then from every secondary root in top-left order. A row
/// is placed the first time any of its members is reached.
pub(super) fn row_visit_order(topo: &Topology, rows: &RowAssignment, primary: usize) -> Vec<usize> {
    let mut starts = vec![primary];
    let mut secondary: Vec<usize> = (0..topo.len())
        .filter(|&node| node != primary && topo.nodes[node].is_root())
        .collect();
    secondary.sort_by(|&a, &b| topo.cmp_top_left(a, b));
    starts.extend(secondary);

    let mut visited = vec![false; topo.len()];
    let mut seen_rows = vec![false; rows.count()];
    let mut order = Vec::new();
    for start in starts {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            let row = rows.row(node);
            if !seen_rows[row] {
                seen_rows[row] = true;
                order.push(row);
            }
            let mut children = topo.nodes[node].children.clone();
            children.sort_by(|&a, &b| topo.cmp_original_y(a, b));
            stack.extend(children.into_iter().rev().filter(|&child| !visited[child]));
        }
    }
    order
}

/// Assigns a y to every node, one row at a time. Each row drops just below
/// the lowest footprint it would overlap; the first row lands on the primary
/// root's original y.
pub(super) fn place_rows(
    topo: &Topology,
    rows: &RowAssignment,
    xs: &[f32],
    primary: usize,
    gap: f32,
) -> Vec<f32> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); rows.count()];
    for node in 0..topo.len() {
        members[rows.row(node)].push(node);
    }

    let top = topo.nodes[primary].initial_y;
    let seed = top - gap;
    let mut skyline = Skyline::new();
    let mut ys = vec![0.0; topo.len()];
    for row in row_visit_order(topo, rows, primary) {
        let nodes = &members[row];
        let Some(left) = nodes.iter().map(|&node| xs[node]).reduce(f32::min) else {
            continue;
        };
        let right = nodes
            .iter()
            .map(|&node| topo.right(node, xs))
            .fold(left, f32::max);

        // Rows that clear everything above land exactly on the anchor's y.
        let y = match skyline.max_in(left, right) {
            Some(bottom) if bottom > seed => bottom + gap,
            _ => top,
        };
        for &node in nodes {
            ys[node] = y;
            skyline.insert(xs[node], topo.right(node, xs), y + topo.nodes[node].height);
        }
    }
    ys
}
