//! Mutations over the node and connection collections.

use uuid::Uuid;

use super::types::{Connection, Point, PortRef, WorkflowGraph, WorkflowNode};
use super::viewport::snap_to_grid;

pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Result of deleting a node together with every edge touching it.
#[derive(Clone, Debug, PartialEq)]
pub struct Removal {
	pub node: WorkflowNode,
	pub connections: Vec<Connection>,
}

pub fn new_node_id(node_type: &str) -> String {
	format!("{}_{}", node_type, Uuid::new_v4().simple())
}

pub fn new_connection_id() -> String {
	format!("conn_{}", Uuid::new_v4().simple())
}

impl WorkflowGraph {
	pub fn node(&self, node_id: &str) -> Option<&WorkflowNode> {
		self.nodes.iter().find(|n| n.id == node_id)
	}

	/// Writes a grid-snapped position. Returns the stored position, or `None`
	/// when no node has `node_id`.
	pub fn move_node(&mut self, node_id: &str, x: f64, y: f64, grid_size: f64) -> Option<Point> {
		let node = self.nodes.iter_mut().find(|n| n.id == node_id)?;
		let snapped = Point::new(snap_to_grid(x, grid_size), snap_to_grid(y, grid_size));
		node.position = snapped;
		Some(snapped)
	}

	/// Appends an edge without checking for duplicates or data types.
	pub fn add_connection(&mut self, from: PortRef, to: PortRef) -> Connection {
		let connection = Connection {
			id: new_connection_id(),
			from_node: from.node_id,
			from_port: from.port_id,
			to_node: to.node_id,
			to_port: to.port_id,
			animated: false,
		};
		self.connections.push(connection.clone());
		connection
	}

	pub fn remove_node_cascade(&mut self, node_id: &str) -> Option<Removal> {
		let index = self.nodes.iter().position(|n| n.id == node_id)?;
		let node = self.nodes.remove(index);
		let (removed, kept): (Vec<Connection>, Vec<Connection>) =
			std::mem::take(&mut self.connections)
				.into_iter()
				.partition(|c| c.touches(node_id));
		self.connections = kept;
		Some(Removal {
			node,
			connections: removed,
		})
	}
}
