use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

pub type Positions = BTreeMap<String, Position>;

/// Structural role of a node, derived purely from its in/out degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// No parents and at most one child.
    Root,
    /// One parent and no children.
    Leaf,
    /// Exactly one parent and one child.
    Simple,
    /// At most one parent and several children.
    Split,
    /// Several parents and at most one child.
    Merge,
    MergeSplit,
}

impl Role {
    pub fn classify(parents: usize, children: usize) -> Self {
        match (parents, children) {
            (0, 0 | 1) => Role::Root,
            (0 | 1, _) if children > 1 => Role::Split,
            (1, 0) => Role::Leaf,
            (1, _) => Role::Simple,
            (_, 0 | 1) => Role::Merge,
            _ => Role::MergeSplit,
        }
    }

    pub fn is_boundary(self) -> bool {
        self != Role::Simple
    }

    pub fn is_merge(self) -> bool {
        matches!(self, Role::Merge | Role::MergeSplit)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Leaf => "leaf",
            Role::Simple => "simple",
            Role::Split => "split",
            Role::Merge => "merge",
            Role::MergeSplit => "merge-split",
        }
    }
}

/// Final placement of one node together with the intermediate facts that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub role: Role,
    pub row: usize,
    pub island: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub islands: usize,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn positions(&self) -> Positions {
        self.nodes
            .iter()
            .map(|(id, node)| (id.clone(), Position { x: node.x, y: node.y }))
            .collect()
    }
}
