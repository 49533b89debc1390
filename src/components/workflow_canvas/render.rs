//! Pure scene construction: everything the component draws is derived here
//! from the graph and controller on every change.

use super::state::{CanvasController, Interaction};
use super::types::{Point, PortDataType, PortDirection, Size, WorkflowGraph, WorkflowNode};
use super::viewport::Viewport;

pub const NODE_WIDTH: f64 = 180.0;
pub const NODE_HEIGHT: f64 = 80.0;
pub const COMPACT_NODE_HEIGHT: f64 = 56.0;
pub const MIN_CONTROL_OFFSET: f64 = 50.0;
const CONTROL_OFFSET_FACTOR: f64 = 0.4;
const GRID_DOT_COLOR: &str = "rgba(148, 163, 184, 0.18)";

/// Nodes with at most one port per side fall back to the compact height.
pub fn node_size(node: &WorkflowNode) -> Size {
	node.size.unwrap_or_else(|| {
		let ports = node.inputs.len().max(node.outputs.len());
		Size {
			width: NODE_WIDTH,
			height: if ports > 1 {
				NODE_HEIGHT
			} else {
				COMPACT_NODE_HEIGHT
			},
		}
	})
}

/// Vertical offset of port `index` out of `count`, evenly spaced and never
/// flush with the top or bottom edge.
pub fn port_offset_y(index: usize, count: usize, node_height: f64) -> f64 {
	node_height / (count as f64 + 1.0) * (index as f64 + 1.0)
}

/// Canvas-space centre of a port on its node's left (input) or right
/// (output) edge.
pub fn port_position(
	node: &WorkflowNode,
	direction: PortDirection,
	port_id: &str,
) -> Option<Point> {
	let (index, _) = node.port(direction, port_id)?;
	let size = node_size(node);
	let dx = match direction {
		PortDirection::Input => 0.0,
		PortDirection::Output => size.width,
	};
	let dy = port_offset_y(index, node.ports(direction).len(), size.height);
	Some(node.position.offset(dx, dy))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
	pub from: Point,
	pub c1: Point,
	pub c2: Point,
	pub to: Point,
}

impl CubicBezier {
	/// S-curve that leaves `from` and enters `to` horizontally.
	pub fn connecting(from: Point, to: Point) -> Self {
		let control = MIN_CONTROL_OFFSET.max((to.x - from.x).abs() * CONTROL_OFFSET_FACTOR);
		Self {
			from,
			c1: from.offset(control, 0.0),
			c2: to.offset(-control, 0.0),
			to,
		}
	}

	/// Preview for a half-made connection. A drag from an input port runs the
	/// curve from the pointer into the anchor.
	pub fn preview(anchor: Point, pointer: Point, anchor_direction: PortDirection) -> Self {
		match anchor_direction {
			PortDirection::Output => Self::connecting(anchor, pointer),
			PortDirection::Input => Self::connecting(pointer, anchor),
		}
	}

	pub fn svg_path(&self) -> String {
		format!(
			"M {} {} C {} {}, {} {}, {} {}",
			self.from.x,
			self.from.y,
			self.c1.x,
			self.c1.y,
			self.c2.x,
			self.c2.y,
			self.to.x,
			self.to.y
		)
	}
}

/// Dotted background that scrolls and scales with the viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct GridStyle {
	pub spacing: f64,
	pub offset: Point,
}

impl GridStyle {
	pub fn new(viewport: &Viewport, grid_size: f64) -> Self {
		let spacing = (grid_size * viewport.zoom).max(1.0);
		Self {
			spacing,
			offset: Point::new(
				viewport.pan.x.rem_euclid(spacing),
				viewport.pan.y.rem_euclid(spacing),
			),
		}
	}

	pub fn css(&self) -> String {
		format!(
			"background-image: radial-gradient(circle, {GRID_DOT_COLOR} 1px, transparent 1px); \
			 background-size: {s}px {s}px; background-position: {x}px {y}px;",
			s = self.spacing,
			x = self.offset.x,
			y = self.offset.y,
		)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionShape {
	pub id: String,
	pub path: String,
	pub color: String,
	pub animated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortMarker {
	pub id: String,
	pub label: String,
	pub direction: PortDirection,
	pub color: String,
	/// Offset from the node's top-left corner.
	pub offset: Point,
	/// This port is the fixed end of the connection being drawn.
	pub active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeCard {
	pub id: String,
	pub title: String,
	pub icon: String,
	pub color: String,
	pub position: Point,
	pub size: Size,
	pub selected: bool,
	pub ports: Vec<PortMarker>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub world_transform: String,
	pub grid: GridStyle,
	pub connections: Vec<ConnectionShape>,
	pub preview: Option<ConnectionShape>,
	pub nodes: Vec<NodeCard>,
}

impl Scene {
	pub fn node(&self, node_id: &str) -> Option<&NodeCard> {
		self.nodes.iter().find(|n| n.id == node_id)
	}
}

fn data_color(data_type: PortDataType, accent: &str) -> String {
	match data_type {
		PortDataType::Any => accent.to_string(),
		other => other.color().to_string(),
	}
}

fn locate(
	graph: &WorkflowGraph,
	node_id: &str,
	direction: PortDirection,
	port_id: &str,
) -> Option<Point> {
	graph
		.node(node_id)
		.and_then(|n| port_position(n, direction, port_id))
}

pub fn build_scene(graph: &WorkflowGraph, controller: &CanvasController, accent: &str) -> Scene {
	let connections = graph
		.connections
		.iter()
		.filter_map(|c| {
			let source = graph.node(&c.from_node)?;
			let (_, port) = source.port(PortDirection::Output, &c.from_port)?;
			let from = port_position(source, PortDirection::Output, &c.from_port)?;
			let to = locate(graph, &c.to_node, PortDirection::Input, &c.to_port)?;
			Some(ConnectionShape {
				id: c.id.clone(),
				path: CubicBezier::connecting(from, to).svg_path(),
				color: data_color(port.data_type, accent),
				animated: c.animated,
			})
		})
		.collect();

	let anchor = controller.connecting_from();
	let preview = match &controller.interaction {
		Interaction::ConnectingFrom {
			anchor,
			pointer: Some(pointer),
		} => locate(graph, &anchor.node_id, anchor.direction, &anchor.port_id).map(|start| {
			ConnectionShape {
				id: "preview".to_string(),
				path: CubicBezier::preview(start, *pointer, anchor.direction).svg_path(),
				color: accent.to_string(),
				animated: true,
			}
		}),
		_ => None,
	};

	let nodes = graph
		.nodes
		.iter()
		.map(|node| {
			let size = node_size(node);
			let ports = [PortDirection::Input, PortDirection::Output]
				.into_iter()
				.flat_map(|direction| {
					let ports = node.ports(direction);
					let x = match direction {
						PortDirection::Input => 0.0,
						PortDirection::Output => size.width,
					};
					ports.iter().enumerate().map(move |(i, port)| PortMarker {
						id: port.id.clone(),
						label: port.label.clone(),
						direction,
						color: data_color(port.data_type, accent),
						offset: Point::new(x, port_offset_y(i, ports.len(), size.height)),
						active: anchor.is_some_and(|a| {
							a.node_id == node.id && a.port_id == port.id && a.direction == direction
						}),
					})
				})
				.collect();
			NodeCard {
				id: node.id.clone(),
				title: node.title.clone(),
				icon: node.icon.clone(),
				color: if node.color.is_empty() {
					accent.to_string()
				} else {
					node.color.clone()
				},
				position: node.position,
				size,
				selected: controller.selected.as_deref() == Some(node.id.as_str()),
				ports,
			}
		})
		.collect();

	Scene {
		world_transform: controller.viewport.transform(),
		grid: GridStyle::new(&controller.viewport, controller.grid_size),
		connections,
		preview,
		nodes,
	}
}
