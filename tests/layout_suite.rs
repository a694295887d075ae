use std::path::Path;

use graph_tidy::{
    Edge, Graph, LayoutConfig, LayoutError, Positions, Role, compute_layout,
    compute_layout_detailed,
};
use proptest::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Fixture {
    graph: Graph,
    expected: Positions,
}

fn load_fixture(name: &str) -> Fixture {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    serde_json::from_str(&input).expect("fixture parse failed")
}

fn layout(graph: &Graph) -> Positions {
    compute_layout(graph, &LayoutConfig::default()).expect("layout failed")
}

fn assert_no_overlap(graph: &Graph, positions: &Positions, context: &str) {
    for (i, a) in graph.nodes.iter().enumerate() {
        for b in &graph.nodes[i + 1..] {
            let (pa, pb) = (positions[&a.id], positions[&b.id]);
            let x_overlap = pa.x < pb.x + b.width && pb.x < pa.x + a.width;
            let y_overlap = pa.y < pb.y + b.height && pb.y < pa.y + a.height;
            assert!(
                !(x_overlap && y_overlap),
                "{context}: {} at {:?} overlaps {} at {:?}",
                a.id,
                pa,
                b.id,
                pb
            );
        }
    }
}

fn assert_merges_aligned(graph: &Graph, config: &LayoutConfig, context: &str) {
    let detailed = compute_layout_detailed(graph, config).expect("layout failed");
    for (id, node) in &detailed.nodes {
        if !matches!(node.role, Role::Merge | Role::MergeSplit) {
            continue;
        }
        let rightmost = graph
            .edges
            .iter()
            .filter(|edge| edge.to() == id)
            .map(|edge| {
                let parent = &detailed.nodes[edge.from()];
                parent.x + parent.width
            })
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(node.x, rightmost + config.gap, "{context}: merge {id} misaligned");
    }
}

// Keep this list explicit so new scenarios must be added intentionally.
const FIXTURES: [&str; 7] = [
    "root_split.json",
    "fan_out.json",
    "merge_promotion.json",
    "secondary_root.json",
    "split_pull.json",
    "islands.json",
    "zero_width.json",
];

#[test]
fn layout_all_fixtures() {
    for name in FIXTURES {
        let fixture = load_fixture(name);
        let positions = layout(&fixture.graph);
        assert_eq!(positions, fixture.expected, "fixture {name}");
        assert_no_overlap(&fixture.graph, &positions, name);
        assert_merges_aligned(&fixture.graph, &LayoutConfig::default(), name);
    }
}

#[test]
fn tidy_is_idempotent() {
    for name in FIXTURES {
        let fixture = load_fixture(name);
        let first = layout(&fixture.graph);
        let second = layout(&fixture.graph.apply_positions(&first));
        assert_eq!(first, second, "fixture {name} moved on the second pass");
    }
}

#[test]
fn level_siblings_can_settle_on_second_pass() {
    // n1 and n3 both end up level with n0. On the way back in that tie falls
    // to input order, so n1's chain takes the row n3 had and n2 moves up once.
    let mut graph = Graph::new();
    for (id, y) in [("n0", 0.0), ("n1", 0.0), ("n2", -1.0), ("n3", -2.0), ("n4", 0.0)] {
        graph.ensure_node(id, 0.0, y, 1.0, 1.0);
    }
    for (from, to) in [
        ("n0", "n2"),
        ("n0", "n1"),
        ("n0", "n3"),
        ("n2", "n3"),
        ("n1", "n2"),
        ("n2", "n4"),
    ] {
        graph.connect(from, to);
    }

    let first = layout(&graph);
    assert_eq!((first["n2"].x, first["n2"].y), (62.0, 31.0));
    assert_eq!((first["n1"].y, first["n3"].y), (0.0, 0.0));

    let second = layout(&graph.apply_positions(&first));
    assert_eq!((second["n2"].x, second["n2"].y), (62.0, 0.0));
    assert_eq!((second["n4"].x, second["n4"].y), (93.0, 31.0));

    let third = layout(&graph.apply_positions(&second));
    assert_eq!(third, second);
}

#[test]
fn input_graph_is_not_mutated() {
    let fixture = load_fixture("split_pull.json");
    let before = fixture.graph.clone();
    let _ = layout(&fixture.graph);
    assert_eq!(fixture.graph, before);
}

#[test]
fn primary_root_is_anchored() {
    let mut fixture = load_fixture("merge_promotion.json");
    fixture.graph.ensure_node("R", -75.5, 412.25, 100.0, 80.0);
    let positions = layout(&fixture.graph);
    assert_eq!(positions["R"].x, -75.5);
    assert_eq!(positions["R"].y, 412.25);
    assert_eq!(positions["P"].y, 412.25);
    assert_eq!(positions["M"].y, 412.25 + 220.0);
}

#[test]
fn disconnected_island_only_shifts_down() {
    let mut alone = Graph::new();
    alone.ensure_node("P", 40.0, 60.0, 100.0, 80.0);
    alone.ensure_node("Q", 300.0, 60.0, 100.0, 80.0);
    alone.connect("P", "Q");
    let solo = layout(&alone);

    let combined = layout_fixture_graph("islands.json");
    let shift = combined["P"].y - solo["P"].y;
    assert!(shift >= 0.0);
    for id in ["P", "Q"] {
        assert_eq!(combined[id].x, solo[id].x, "{id} moved sideways");
        assert_eq!(combined[id].y, solo[id].y + shift, "{id} was distorted");
    }

    // The topmost island is untouched by the one below it.
    let mut top = Graph::new();
    top.ensure_node("A", 0.0, 0.0, 100.0, 80.0);
    top.ensure_node("B", 250.0, 20.0, 100.0, 80.0);
    top.connect("A", "B");
    let top_solo = layout(&top);
    for id in ["A", "B"] {
        assert_eq!(combined[id], top_solo[id]);
    }
}

fn layout_fixture_graph(name: &str) -> Positions {
    layout(&load_fixture(name).graph)
}

#[test]
fn custom_gap_scales_spacing() {
    let fixture = load_fixture("root_split.json");
    let config = LayoutConfig { gap: 10.0 };
    let positions = compute_layout(&fixture.graph, &config).unwrap();
    assert_eq!(positions["B"].x, 110.0);
    assert_eq!(positions["C"].y, 90.0);
}

#[test]
fn empty_graph_yields_no_positions() {
    let graph: Graph = serde_json::from_str(r#"{"nodes": {}, "edges": []}"#).unwrap();
    assert!(layout(&graph).is_empty());
}

#[test]
fn rejects_edges_to_unknown_nodes() {
    let mut fixture = load_fixture("root_split.json");
    fixture.graph.connect("C", "ghost");
    let err = compute_layout(&fixture.graph, &LayoutConfig::default()).unwrap_err();
    assert_eq!(
        err,
        LayoutError::UnknownNode {
            edge: 2,
            node: "ghost".to_string()
        }
    );
}

#[test]
fn rejects_cycles() {
    let mut fixture = load_fixture("merge_promotion.json");
    fixture.graph.connect("M", "R");
    let err = compute_layout(&fixture.graph, &LayoutConfig::default()).unwrap_err();
    assert!(err.is_cycle());
    assert!(err.to_string().contains("7 node(s)"));
}

#[test]
fn rejects_negative_sizes_from_json() {
    let src = r#"{"nodes": {"A": {"x": 0, "y": 0, "width": -5, "height": 10}}}"#;
    let graph: Graph = serde_json::from_str(src).unwrap();
    assert!(matches!(
        compute_layout(&graph, &LayoutConfig::default()),
        Err(LayoutError::InvalidGeometry { .. })
    ));
}

/// Sizes lean towards zero often enough that flat and empty nodes end up
/// next to and under wide ones.
fn size(max: i32) -> impl Strategy<Value = i32> {
    prop_oneof![1 => Just(0), 4 => 1..max]
}

/// Random DAGs: edges always run from a lower to a higher node index, with a
/// handful of port names so parallel edges between one pair show up.
fn dag() -> impl Strategy<Value = Graph> {
    (1usize..9)
        .prop_flat_map(|count| {
            let nodes = prop::collection::vec(
                (-300i32..300, -300i32..300, size(160), size(120)),
                count,
            );
            let edges = prop::collection::vec((0..count, 0..count, 0u8..3), 0..count * 2);
            (nodes, edges)
        })
        .prop_map(|(nodes, edges)| {
            let mut graph = Graph::new();
            for (idx, (x, y, width, height)) in nodes.into_iter().enumerate() {
                graph.ensure_node(
                    &format!("n{idx}"),
                    x as f32,
                    y as f32,
                    width as f32,
                    height as f32,
                );
            }
            for (a, b, port) in edges {
                if a == b {
                    continue;
                }
                let (from, to) = (a.min(b), a.max(b));
                graph.edges.push(Edge::new(
                    &format!("n{from}"),
                    &format!("out{port}"),
                    &format!("n{to}"),
                    "in",
                ));
            }
            graph
        })
}

/// Random connected trees: every node after the first hangs off an earlier
/// one. Widths stay positive so siblings always share a column.
fn tree() -> impl Strategy<Value = Graph> {
    (1usize..10)
        .prop_flat_map(|count| {
            let nodes = prop::collection::vec(
                (-300i32..300, -300i32..300, 1i32..160, size(120)),
                count,
            );
            let parents: Vec<_> = (1..count).map(|idx| 0..idx).collect();
            (nodes, parents)
        })
        .prop_map(|(nodes, parents)| {
            let mut graph = Graph::new();
            for (idx, (x, y, width, height)) in nodes.into_iter().enumerate() {
                graph.ensure_node(
                    &format!("n{idx}"),
                    x as f32,
                    y as f32,
                    width as f32,
                    height as f32,
                );
            }
            for (idx, parent) in parents.into_iter().enumerate() {
                graph.connect(&format!("n{parent}"), &format!("n{}", idx + 1));
            }
            graph
        })
}

fn dag_with_shuffled_edges() -> impl Strategy<Value = (Graph, Vec<Edge>)> {
    dag().prop_flat_map(|graph| {
        let edges = graph.edges.clone();
        (Just(graph), Just(edges).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn edge_order_does_not_matter((graph, shuffled) in dag_with_shuffled_edges()) {
        let mut permuted = graph.clone();
        permuted.edges = shuffled;
        if let Some(first) = graph.edges.first() {
            // The same adjacency again through another port.
            permuted.edges.push(Edge::new(first.from(), "extra", first.to(), "extra"));
        }
        prop_assert_eq!(layout(&graph), layout(&permuted));
    }

    #[test]
    fn nodes_never_overlap(graph in dag()) {
        let positions = layout(&graph);
        prop_assert_eq!(positions.len(), graph.nodes.len());
        assert_no_overlap(&graph, &positions, "random dag");
    }

    #[test]
    fn merges_sit_right_of_every_parent(graph in dag()) {
        assert_merges_aligned(&graph, &LayoutConfig::default(), "random dag");
    }

    #[test]
    fn trees_are_idempotent(graph in tree()) {
        let first = layout(&graph);
        let second = layout(&graph.apply_positions(&first));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn topmost_root_keeps_its_place(graph in dag()) {
        let positions = layout(&graph);
        let anchor = graph
            .nodes
            .iter()
            .filter(|node| graph.edges.iter().all(|edge| edge.to() != node.id))
            .min_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))
            .expect("a DAG has a root");
        prop_assert_eq!(positions[&anchor.id].x, anchor.x);
        prop_assert_eq!(positions[&anchor.id].y, anchor.y);
    }
}
