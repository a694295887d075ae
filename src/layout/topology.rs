use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::LayoutError;
use crate::ir::Graph;

use super::types::Role;

#[derive(Debug, Clone)]
pub(super) struct NodeInfo {
    pub id: String,
    pub role: Role,
    /// Deduplicated, sorted by input order.
    pub parents: Vec<usize>,
    /// Deduplicated, sorted by input order.
    pub children: Vec<usize>,
    pub initial_x: f32,
    pub initial_y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeInfo {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Adjacency snapshot of a graph. Node indices follow input order, so index
/// comparison doubles as the "input order" tie-break.
#[derive(Debug, Clone, Default)]
pub(super) struct Topology {
    pub nodes: Vec<NodeInfo>,
}

impl Topology {
    pub fn build(graph: &Graph) -> Result<Self, LayoutError> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(graph.nodes.len());
        for (idx, node) in graph.nodes.iter().enumerate() {
            validate_geometry(&node.id, node.x, node.y, node.width, node.height)?;
            index.insert(node.id.as_str(), idx);
        }

        let count = graph.nodes.len();
        let mut parents: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
        let mut children: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
        for (edge_idx, edge) in graph.edges.iter().enumerate() {
            let lookup = |id: &str| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| LayoutError::UnknownNode {
                        edge: edge_idx,
                        node: id.to_string(),
                    })
            };
            let from = lookup(edge.from())?;
            let to = lookup(edge.to())?;
            children[from].insert(to);
            parents[to].insert(from);
        }

        let nodes = graph
            .nodes
            .iter()
            .zip(parents.into_iter().zip(children))
            .map(|(node, (parents, children))| NodeInfo {
                id: node.id.clone(),
                role: Role::classify(parents.len(), children.len()),
                parents: parents.into_iter().collect(),
                children: children.into_iter().collect(),
                initial_x: node.x,
                initial_y: node.y,
                width: node.width,
                height: node.height,
            })
            .collect();

        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Re-indexes a connected subset. `members` must be sorted and closed
    /// under adjacency.
    pub fn subset(&self, members: &[usize]) -> Topology {
        let mut local: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for (new_idx, &old_idx) in members.iter().enumerate() {
            local[old_idx] = Some(new_idx);
        }
        let remap = |list: &[usize]| -> Vec<usize> {
            list.iter().filter_map(|&old| local[old]).collect()
        };
        let nodes = members
            .iter()
            .map(|&old_idx| {
                let info = &self.nodes[old_idx];
                NodeInfo {
                    parents: remap(&info.parents),
                    children: remap(&info.children),
                    ..info.clone()
                }
            })
            .collect();
        Topology { nodes }
    }

    pub fn right(&self, node: usize, xs: &[f32]) -> f32 {
        xs[node] + self.nodes[node].width
    }

    /// Orders nodes top-left first on the user's original coordinates,
    /// falling back to input order.
    pub fn cmp_top_left(&self, a: usize, b: usize) -> Ordering {
        let (na, nb) = (&self.nodes[a], &self.nodes[b]);
        na.initial_y
            .total_cmp(&nb.initial_y)
            .then(na.initial_x.total_cmp(&nb.initial_x))
            .then(a.cmp(&b))
    }

    /// Orders nodes by original y only, falling back to input order.
    pub fn cmp_original_y(&self, a: usize, b: usize) -> Ordering {
        self.nodes[a]
            .initial_y
            .total_cmp(&self.nodes[b].initial_y)
            .then(a.cmp(&b))
    }
}

fn validate_geometry(
    id: &str,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> Result<(), LayoutError> {
    let invalid = |reason: String| LayoutError::InvalidGeometry {
        node: id.to_string(),
        reason,
    };
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid(format!("position ({x}, {y}) is not finite")));
    }
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(invalid(format!(
            "size {width}x{height} must be finite and non-negative"
        )));
    }
    Ok(())
}

/// Precomputed chains, keyed by `(start_boundary, first_child)`.
#[derive(Debug, Clone, Default)]
pub(super) struct ChainMap {
    chains: BTreeMap<(usize, usize), Vec<usize>>,
}

impl ChainMap {
    pub fn trace(topo: &Topology) -> Self {
        let mut chains = BTreeMap::new();
        for (start, info) in topo.nodes.iter().enumerate() {
            if !info.role.is_boundary() {
                continue;
            }
            for &child in &info.children {
                let mut path = vec![start, child];
                let mut current = child;
                while topo.nodes[current].role == Role::Simple {
                    let Some(&next) = topo.nodes[current].children.first() else {
                        break;
                    };
                    path.push(next);
                    current = next;
                }
                chains.insert((start, child), path);
            }
        }
        Self { chains }
    }

    pub fn get(&self, start: usize, first_child: usize) -> Option<&[usize]> {
        self.chains.get(&(start, first_child)).map(Vec::as_slice)
    }

    /// Chains leaving `start`, in child order.
    pub fn starting_at(&self, start: usize) -> impl Iterator<Item = &[usize]> {
        self.chains
            .range((start, 0)..=(start, usize::MAX))
            .map(|(_, path)| path.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.chains.values().map(Vec::as_slice)
    }
}

/// Full ancestor closure per node, built in one topological pass.
#[derive(Debug, Clone, Default)]
pub(super) struct Ancestors {
    sets: Vec<BTreeSet<usize>>,
}

impl Ancestors {
    pub fn build(topo: &Topology, order: &[usize]) -> Self {
        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); topo.len()];
        for &node in order {
            let mut set = BTreeSet::new();
            for &parent in &topo.nodes[node].parents {
                set.insert(parent);
                set.extend(sets[parent].iter().copied());
            }
            sets[node] = set;
        }
        Self { sets }
    }

    /// True when `node` is reachable forward from `source`.
    pub fn is_descendant(&self, node: usize, source: usize) -> bool {
        self.sets[node].contains(&source)
    }
}
