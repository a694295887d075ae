use thiserror::Error;

/// Reasons a graph is rejected before any layout pass runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("edge #{edge} references unknown node `{node}`")]
    UnknownNode { edge: usize, node: String },

    #[error("node `{node}` has invalid geometry: {reason}")]
    InvalidGeometry { node: String, reason: String },

    #[error("graph contains a cycle through {} node(s): {}", .nodes.len(), .nodes.join(", "))]
    Cycle { nodes: Vec<String> },
}

impl LayoutError {
    pub fn is_cycle(&self) -> bool {
        matches!(self, LayoutError::Cycle { .. })
    }
}
