mod component;
mod render;
mod state;
mod store;
mod types;
mod viewport;

pub use component::WorkflowCanvas;
pub use store::new_node_id;
pub use types::{Connection, Point, Port, PortDataType, WorkflowGraph, WorkflowNode};
