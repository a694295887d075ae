#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use error::LayoutError;
pub use ir::{Edge, Endpoint, Graph, Node};
pub use layout::{Layout, NodeLayout, Position, Positions, Role, compute_layout, compute_layout_detailed};
