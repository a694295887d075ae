use crate::ir::Graph;
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub islands: usize,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub role: String,
    pub row: usize,
    pub island: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Position the node had before layout.
    pub original: [f32; 2],
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub from_port: String,
    pub to: String,
    pub to_port: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, graph: &Graph) -> Self {
        // Graph order, so the dump diffs cleanly against the input file.
        let nodes = graph
            .nodes
            .iter()
            .filter_map(|input| {
                let node = layout.nodes.get(&input.id)?;
                Some(NodeDump {
                    id: node.id.clone(),
                    role: node.role.as_str().to_string(),
                    row: node.row,
                    island: node.island,
                    x: node.x,
                    y: node.y,
                    width: node.width,
                    height: node.height,
                    original: [input.x, input.y],
                })
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.output.node.clone(),
                from_port: edge.output.port.clone(),
                to: edge.input.node.clone(),
                to_port: edge.input.port.clone(),
            })
            .collect();

        LayoutDump {
            islands: layout.islands,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, graph: &Graph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
