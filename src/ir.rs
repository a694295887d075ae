use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::layout::Position;

/// A node as the editor stores it: user-chosen position plus measured size.
/// Any other fields ride along in `extra` and are written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip)]
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: String,
    #[serde(default)]
    pub port: String,
}

/// A port-level connection. Several edges between the same pair of nodes
/// collapse to one structural adjacency during layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub output: Endpoint,
    pub input: Endpoint,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(from: &str, from_port: &str, to: &str, to_port: &str) -> Self {
        Self {
            output: Endpoint {
                node: from.to_string(),
                port: from_port.to_string(),
            },
            input: Endpoint {
                node: to.to_string(),
                port: to_port.to_string(),
            },
            extra: Map::new(),
        }
    }

    pub fn from(&self) -> &str {
        &self.output.node
    }

    pub fn to(&self) -> &str {
        &self.input.node
    }
}

/// Input graph. `nodes` keeps insertion order, which is the tie-break for
/// every "first encountered" decision in the layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(with = "ordered_nodes")]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, or replaces the geometry of an existing one in place.
    /// An existing node keeps its payload.
    pub fn ensure_node(&mut self, id: &str, x: f32, y: f32, width: f32, height: f32) {
        match self.nodes.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => {
                existing.x = x;
                existing.y = y;
                existing.width = width;
                existing.height = height;
            }
            None => self.nodes.push(Node {
                id: id.to_string(),
                x,
                y,
                width,
                height,
                extra: Map::new(),
            }),
        }
    }

    /// Adds a single-port edge `from -> to`.
    pub fn connect(&mut self, from: &str, to: &str) {
        self.edges.push(Edge::new(from, "out", to, "in"));
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a copy with `positions` overlaid. Nodes missing from the map
    /// keep their current coordinates.
    pub fn apply_positions(&self, positions: &BTreeMap<String, Position>) -> Graph {
        let mut out = self.clone();
        for node in &mut out.nodes {
            if let Some(pos) = positions.get(&node.id) {
                node.x = pos.x;
                node.y = pos.y;
            }
        }
        out
    }
}

mod ordered_nodes {
    use super::*;

    pub fn serialize<S>(nodes: &[Node], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(nodes.len()))?;
        for node in nodes {
            map.serialize_entry(&node.id, node)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Node>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(NodeMapVisitor)
    }

    struct NodeMapVisitor;

    impl<'de> Visitor<'de> for NodeMapVisitor {
        type Value = Vec<Node>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of node id to {x, y, width, height}")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut nodes: Vec<Node> = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, mut node)) = access.next_entry::<String, Node>()? {
                node.id = id;
                // Later duplicates win, matching plain JSON object semantics.
                match nodes.iter_mut().find(|existing| existing.id == node.id) {
                    Some(existing) => *existing = node,
                    None => nodes.push(node),
                }
            }
            Ok(nodes)
        }
    }
}
