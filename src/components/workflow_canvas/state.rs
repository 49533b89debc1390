use log::{debug, info};

use super::store::{DEFAULT_GRID_SIZE, Removal};
use super::types::{Connection, Point, PortDirection, PortRef, WorkflowGraph, WorkflowNode};
use super::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
	Primary,
	Middle,
	Secondary,
	Other,
}

impl MouseButton {
	/// Maps `MouseEvent.button` codes.
	pub fn from_code(code: i16) -> Self {
		match code {
			0 => MouseButton::Primary,
			1 => MouseButton::Middle,
			2 => MouseButton::Secondary,
			_ => MouseButton::Other,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
	/// Pointer position in client (screen) pixels.
	pub client: Point,
	/// Top-left of the canvas element in client pixels.
	pub origin: Point,
	pub button: MouseButton,
	pub alt_key: bool,
}

/// What a mousedown landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget {
	Canvas,
	Node(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortAnchor {
	pub node_id: String,
	pub port_id: String,
	pub direction: PortDirection,
}

impl PortAnchor {
	pub fn new(node_id: &str, port_id: &str, direction: PortDirection) -> Self {
		Self {
			node_id: node_id.to_string(),
			port_id: port_id.to_string(),
			direction,
		}
	}

	fn port_ref(&self) -> PortRef {
		PortRef::new(&self.node_id, &self.port_id)
	}
}

/// The single pointer mode of the canvas.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	#[default]
	Idle,
	Panning {
		last: Point,
	},
	DraggingNode {
		node_id: String,
		grab_offset: Point,
	},
	ConnectingFrom {
		anchor: PortAnchor,
		/// Live pointer in canvas space; `None` until the pointer moves.
		pointer: Option<Point>,
	},
}

/// Side effects the host is told about.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
	NodeSelected(Option<String>),
	NodeMoved { node_id: String, position: Point },
	ConnectionCreated(Connection),
	NodeDeleted(Removal),
}

impl CanvasEvent {
	pub fn changes_nodes(&self) -> bool {
		matches!(self, CanvasEvent::NodeMoved { .. } | CanvasEvent::NodeDeleted(_))
	}

	pub fn changes_connections(&self) -> bool {
		match self {
			CanvasEvent::ConnectionCreated(_) => true,
			CanvasEvent::NodeDeleted(removal) => !removal.connections.is_empty(),
			_ => false,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanvasController {
	pub viewport: Viewport,
	pub interaction: Interaction,
	pub selected: Option<String>,
	pub grid_size: f64,
}

impl Default for CanvasController {
	fn default() -> Self {
		Self::new(DEFAULT_GRID_SIZE)
	}
}

impl CanvasController {
	pub fn new(grid_size: f64) -> Self {
		Self {
			viewport: Viewport::default(),
			interaction: Interaction::Idle,
			selected: None,
			grid_size,
		}
	}

	pub fn set_selection(&mut self, node_id: Option<String>) {
		self.selected = node_id;
	}

	pub fn connecting_from(&self) -> Option<&PortAnchor> {
		match &self.interaction {
			Interaction::ConnectingFrom { anchor, .. } => Some(anchor),
			_ => None,
		}
	}

	pub fn pointer_down(
		&mut self,
		graph: &WorkflowGraph,
		target: PointerTarget,
		input: PointerInput,
	) -> Vec<CanvasEvent> {
		let mut events = Vec::new();
		let canvas_pos = self.viewport.screen_to_canvas(input.client, input.origin);

		match target {
			PointerTarget::Node(node_id) => {
				if input.button != MouseButton::Primary || !self.is_idle() {
					return events;
				}
				let Some(node) = graph.node(&node_id) else {
					return events;
				};
				let grab_offset = canvas_pos.sub(node.position);
				debug!("drag start {} grab={:?}", node_id, grab_offset);
				self.selected = Some(node_id.clone());
				events.push(CanvasEvent::NodeSelected(Some(node_id.clone())));
				self.interaction = Interaction::DraggingNode {
					node_id,
					grab_offset,
				};
			}
			PointerTarget::Canvas => {
				let pan_gesture = input.button == MouseButton::Middle
					|| (input.button == MouseButton::Primary && input.alt_key);
				if pan_gesture {
					if self.is_idle() {
						debug!("pan start");
						self.interaction = Interaction::Panning { last: input.client };
					}
				} else if input.button == MouseButton::Primary {
					if self.connecting_from().is_some() {
						debug!("connection cancelled by canvas click");
					}
					self.interaction = Interaction::Idle;
					self.selected = None;
					events.push(CanvasEvent::NodeSelected(None));
				}
			}
		}
		events
	}

	pub fn pointer_move(
		&mut self,
		graph: &mut WorkflowGraph,
		input: PointerInput,
	) -> Vec<CanvasEvent> {
		let mut events = Vec::new();
		let canvas_pos = self.viewport.screen_to_canvas(input.client, input.origin);

		match &mut self.interaction {
			Interaction::Idle => {}
			Interaction::Panning { last } => {
				let (dx, dy) = (input.client.x - last.x, input.client.y - last.y);
				*last = input.client;
				self.viewport.pan(dx, dy);
			}
			Interaction::DraggingNode {
				node_id,
				grab_offset,
			} => {
				let target = canvas_pos.sub(*grab_offset);
				let previous = graph.node(node_id).map(|n| n.position);
				if let Some(position) = graph.move_node(node_id, target.x, target.y, self.grid_size)
				{
					if previous != Some(position) {
						events.push(CanvasEvent::NodeMoved {
							node_id: node_id.clone(),
							position,
						});
					}
				}
			}
			Interaction::ConnectingFrom { pointer, .. } => {
				*pointer = Some(canvas_pos);
			}
		}
		events
	}

	/// Mouseup and mouseleave both end drag and pan gestures.
	pub fn release(&mut self) {
		if matches!(
			self.interaction,
			Interaction::Panning { .. } | Interaction::DraggingNode { .. }
		) {
			debug!("gesture end");
			self.interaction = Interaction::Idle;
		}
	}

	/// Two-click connect gesture. The output side always becomes the source
	/// of the new connection, whichever port was clicked first.
	pub fn port_click(
		&mut self,
		graph: &mut WorkflowGraph,
		clicked: PortAnchor,
	) -> Vec<CanvasEvent> {
		let mut events = Vec::new();
		match std::mem::take(&mut self.interaction) {
			Interaction::Idle => {
				debug!(
					"connect start {}.{} ({:?})",
					clicked.node_id, clicked.port_id, clicked.direction
				);
				self.interaction = Interaction::ConnectingFrom {
					anchor: clicked,
					pointer: None,
				};
			}
			Interaction::ConnectingFrom { anchor, .. } => {
				if anchor.node_id == clicked.node_id || anchor.direction == clicked.direction {
					debug!(
						"connect rejected {}.{} -> {}.{}",
						anchor.node_id, anchor.port_id, clicked.node_id, clicked.port_id
					);
					return events;
				}
				let resolvable = graph.node(&anchor.node_id).is_some()
					&& graph.node(&clicked.node_id).is_some();
				if !resolvable {
					debug!(
						"connect dropped, {} or {} is gone",
						anchor.node_id, clicked.node_id
					);
					return events;
				}
				let (from, to) = match anchor.direction {
					PortDirection::Output => (anchor.port_ref(), clicked.port_ref()),
					PortDirection::Input => (clicked.port_ref(), anchor.port_ref()),
				};
				let connection = graph.add_connection(from, to);
				info!(
					"connection {} created {}.{} -> {}.{}",
					connection.id,
					connection.from_node,
					connection.from_port,
					connection.to_node,
					connection.to_port
				);
				events.push(CanvasEvent::ConnectionCreated(connection));
			}
			other => self.interaction = other,
		}
		events
	}

	/// Drops a drag or pending connection whose node is no longer in
	/// `nodes`, e.g. after the host swapped its collections. Returns whether
	/// anything changed.
	pub fn reconcile(&mut self, nodes: &[WorkflowNode]) -> bool {
		let node_id = match &self.interaction {
			Interaction::DraggingNode { node_id, .. } => node_id,
			Interaction::ConnectingFrom { anchor, .. } => &anchor.node_id,
			Interaction::Idle | Interaction::Panning { .. } => return false,
		};
		if nodes.iter().any(|n| &n.id == node_id) {
			return false;
		}
		debug!("gesture on {} dropped, node is gone", node_id);
		self.interaction = Interaction::Idle;
		true
	}

	/// Applies regardless of the current mode.
	pub fn wheel(&mut self, delta_y: f64) {
		self.viewport.apply_zoom(delta_y);
	}

	pub fn key_down(
		&mut self,
		graph: &mut WorkflowGraph,
		key: &str,
		focus_in_text_input: bool,
	) -> Vec<CanvasEvent> {
		if focus_in_text_input {
			return Vec::new();
		}
		match key {
			"Delete" | "Backspace" => match self.selected.clone() {
				Some(node_id) => self.delete_node(graph, &node_id),
				None => Vec::new(),
			},
			"Escape" => {
				if self.connecting_from().is_some() {
					debug!("connection cancelled by escape");
					self.interaction = Interaction::Idle;
				}
				Vec::new()
			}
			_ => Vec::new(),
		}
	}

	/// Removes a node and every connection touching it in one step.
	pub fn delete_node(&mut self, graph: &mut WorkflowGraph, node_id: &str) -> Vec<CanvasEvent> {
		let Some(removal) = graph.remove_node_cascade(node_id) else {
			return Vec::new();
		};
		info!(
			"node {} deleted with {} connection(s)",
			node_id,
			removal.connections.len()
		);
		self.interaction = Interaction::Idle;
		let mut events = vec![CanvasEvent::NodeDeleted(removal)];
		if self.selected.as_deref() == Some(node_id) {
			self.selected = None;
			events.push(CanvasEvent::NodeSelected(None));
		}
		events
	}

	fn is_idle(&self) -> bool {
		self.interaction == Interaction::Idle
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::workflow_canvas::store::tests::node;

	fn input(x: f64, y: f64) -> PointerInput {
		PointerInput {
			client: Point::new(x, y),
			origin: Point::default(),
			button: MouseButton::Primary,
			alt_key: false,
		}
	}

	fn with_button(x: f64, y: f64, button: MouseButton, alt_key: bool) -> PointerInput {
		PointerInput {
			button,
			alt_key,
			..input(x, y)
		}
	}

	fn pair() -> WorkflowGraph {
		WorkflowGraph {
			nodes: vec![
				node("A", 0.0, 0.0, &["a_in"], &["o1", "o2"]),
				node("B", 300.0, 0.0, &["i1", "i2"], &["b_out"]),
			],
			connections: vec![],
		}
	}

	#[test]
	fn drag_scenario_snaps_to_grid() {
		let mut graph = WorkflowGraph {
			nodes: vec![node("n", 100.0, 100.0, &[], &[])],
			connections: vec![],
		};
		let mut ctl = CanvasController::new(20.0);
		let events = ctl.pointer_down(&graph, PointerTarget::Node("n".into()), input(110.0, 110.0));
		assert_eq!(events, vec![CanvasEvent::NodeSelected(Some("n".into()))]);
		assert_eq!(
			ctl.interaction,
			Interaction::DraggingNode {
				node_id: "n".into(),
				grab_offset: Point::new(10.0, 10.0)
			}
		);

		let events = ctl.pointer_move(&mut graph, input(147.0, 98.0));
		assert_eq!(graph.nodes[0].position, Point::new(140.0, 80.0));
		assert_eq!(
			events,
			vec![CanvasEvent::NodeMoved {
				node_id: "n".into(),
				position: Point::new(140.0, 80.0)
			}]
		);

		ctl.release();
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn drag_respects_zoom_and_pan() {
		let mut graph = WorkflowGraph {
			nodes: vec![node("n", 0.0, 0.0, &[], &[])],
			connections: vec![],
		};
		let mut ctl = CanvasController::new(20.0);
		ctl.viewport = Viewport {
			pan: Point::new(100.0, 100.0),
			zoom: 2.0,
		};
		ctl.pointer_down(&graph, PointerTarget::Node("n".into()), input(100.0, 100.0));
		ctl.pointer_move(&mut graph, input(180.0, 140.0));
		assert_eq!(graph.nodes[0].position, Point::new(40.0, 20.0));
	}

	#[test]
	fn no_moved_event_when_snapped_position_is_unchanged() {
		let mut graph = WorkflowGraph {
			nodes: vec![node("n", 100.0, 100.0, &[], &[])],
			connections: vec![],
		};
		let mut ctl = CanvasController::default();
		ctl.pointer_down(&graph, PointerTarget::Node("n".into()), input(100.0, 100.0));
		assert!(ctl.pointer_move(&mut graph, input(103.0, 96.0)).is_empty());
	}

	#[test]
	fn secondary_button_does_not_start_drag() {
		let graph = pair();
		let mut ctl = CanvasController::default();
		let events = ctl.pointer_down(
			&graph,
			PointerTarget::Node("A".into()),
			with_button(5.0, 5.0, MouseButton::Secondary, false),
		);
		assert!(events.is_empty());
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn middle_button_and_alt_primary_pan() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.pointer_down(
			&graph,
			PointerTarget::Canvas,
			with_button(10.0, 10.0, MouseButton::Middle, false),
		);
		ctl.pointer_move(&mut graph, input(30.0, 5.0));
		ctl.pointer_move(&mut graph, input(40.0, 15.0));
		assert_eq!(ctl.viewport.pan, Point::new(30.0, 5.0));
		ctl.release();

		ctl.pointer_down(
			&graph,
			PointerTarget::Canvas,
			with_button(0.0, 0.0, MouseButton::Primary, true),
		);
		assert!(matches!(ctl.interaction, Interaction::Panning { .. }));
		ctl.pointer_move(&mut graph, input(-10.0, 0.0));
		ctl.release();
		assert_eq!(ctl.viewport.pan, Point::new(20.0, 5.0));
		assert_eq!(graph, pair());
	}

	#[test]
	fn plain_canvas_click_clears_selection_and_connection() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.set_selection(Some("A".into()));
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		let events = ctl.pointer_down(&graph, PointerTarget::Canvas, input(500.0, 500.0));
		assert_eq!(events, vec![CanvasEvent::NodeSelected(None)]);
		assert_eq!(ctl.selected, None);
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn connect_output_then_input() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		assert!(
			ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output))
				.is_empty()
		);
		let events = ctl.port_click(&mut graph, PortAnchor::new("B", "i1", PortDirection::Input));
		assert_eq!(graph.connections.len(), 1);
		let c = &graph.connections[0];
		assert_eq!((c.from_node.as_str(), c.from_port.as_str()), ("A", "o1"));
		assert_eq!((c.to_node.as_str(), c.to_port.as_str()), ("B", "i1"));
		assert_eq!(events, vec![CanvasEvent::ConnectionCreated(c.clone())]);
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn connect_input_first_still_flows_output_to_input() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("B", "i2", PortDirection::Input));
		ctl.port_click(&mut graph, PortAnchor::new("A", "o2", PortDirection::Output));
		let c = &graph.connections[0];
		assert_eq!((c.from_node.as_str(), c.from_port.as_str()), ("A", "o2"));
		assert_eq!((c.to_node.as_str(), c.to_port.as_str()), ("B", "i2"));
	}

	#[test]
	fn same_node_ports_never_connect() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		let events = ctl.port_click(&mut graph, PortAnchor::new("A", "a_in", PortDirection::Input));
		assert!(events.is_empty());
		assert!(graph.connections.is_empty());
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn same_direction_ports_never_connect() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		ctl.port_click(&mut graph, PortAnchor::new("B", "b_out", PortDirection::Output));
		ctl.port_click(&mut graph, PortAnchor::new("A", "a_in", PortDirection::Input));
		ctl.port_click(&mut graph, PortAnchor::new("B", "i1", PortDirection::Input));
		assert!(graph.connections.is_empty());
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn connecting_tracks_pointer_and_escape_cancels() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		ctl.pointer_move(&mut graph, input(42.0, 24.0));
		let Interaction::ConnectingFrom { pointer, .. } = &ctl.interaction else {
			panic!("expected connecting state, got {:?}", ctl.interaction);
		};
		assert_eq!(*pointer, Some(Point::new(42.0, 24.0)));
		ctl.key_down(&mut graph, "Escape", false);
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn pending_connection_into_a_replaced_graph_is_dropped() {
		let mut graph = WorkflowGraph {
			nodes: vec![
				node("X", 0.0, 0.0, &[], &["x_out"]),
				node("B", 300.0, 0.0, &["i1"], &[]),
			],
			connections: vec![],
		};
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("X", "x_out", PortDirection::Output));

		let mut replaced = WorkflowGraph {
			nodes: vec![node("B", 300.0, 0.0, &["i1"], &[])],
			connections: vec![],
		};
		let second = PortAnchor::new("B", "i1", PortDirection::Input);
		let events = ctl.port_click(&mut replaced, second);
		assert!(events.is_empty());
		assert!(replaced.connections.is_empty());
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn reconcile_ends_gestures_on_missing_nodes_only() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		assert!(!ctl.reconcile(&graph.nodes));
		assert!(ctl.connecting_from().is_some());

		let only_b = vec![node("B", 300.0, 0.0, &["i1"], &[])];
		assert!(ctl.reconcile(&only_b));
		assert_eq!(ctl.interaction, Interaction::Idle);
		assert!(!ctl.reconcile(&only_b));

		ctl.pointer_down(&graph, PointerTarget::Node("B".into()), input(310.0, 10.0));
		assert!(!ctl.reconcile(&only_b));
		assert!(matches!(ctl.interaction, Interaction::DraggingNode { .. }));
		assert!(ctl.reconcile(&[]));
		assert_eq!(ctl.interaction, Interaction::Idle);
	}

	#[test]
	fn node_press_while_connecting_keeps_gesture() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		let events = ctl.pointer_down(&graph, PointerTarget::Node("B".into()), input(310.0, 10.0));
		assert!(events.is_empty());
		assert!(ctl.connecting_from().is_some());
	}

	#[test]
	fn wheel_zooms_during_drag_without_interrupting() {
		let graph = pair();
		let mut ctl = CanvasController::default();
		ctl.pointer_down(&graph, PointerTarget::Node("A".into()), input(5.0, 5.0));
		ctl.wheel(-1.0);
		assert!(matches!(ctl.interaction, Interaction::DraggingNode { .. }));
		assert!(ctl.viewport.zoom > 1.0);
	}

	#[test]
	fn delete_key_cascades_on_selection() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		ctl.port_click(&mut graph, PortAnchor::new("B", "i1", PortDirection::Input));
		assert_eq!(graph.connections.len(), 1);

		ctl.pointer_down(&graph, PointerTarget::Node("A".into()), input(5.0, 5.0));
		ctl.release();
		let events = ctl.key_down(&mut graph, "Delete", false);
		assert!(graph.node("A").is_none());
		assert!(graph.node("B").is_some());
		assert!(graph.connections.is_empty());
		assert!(events[0].changes_nodes() && events[0].changes_connections());
		assert_eq!(events[1], CanvasEvent::NodeSelected(None));
		assert_eq!(ctl.selected, None);
	}

	#[test]
	fn delete_key_ignored_while_typing_or_without_selection() {
		let mut graph = pair();
		let mut ctl = CanvasController::default();
		assert!(ctl.key_down(&mut graph, "Backspace", false).is_empty());
		ctl.set_selection(Some("B".into()));
		assert!(ctl.key_down(&mut graph, "Backspace", true).is_empty());
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(ctl.key_down(&mut graph, "Backspace", false).len(), 2);
		assert_eq!(graph.nodes.len(), 1);
	}

	#[test]
	fn connect_then_delete_scenario() {
		let mut graph = WorkflowGraph {
			nodes: vec![
				node("A", 0.0, 0.0, &[], &["o1"]),
				node("B", 300.0, 0.0, &["i1"], &[]),
			],
			connections: vec![],
		};
		let mut ctl = CanvasController::default();
		ctl.port_click(&mut graph, PortAnchor::new("A", "o1", PortDirection::Output));
		ctl.port_click(&mut graph, PortAnchor::new("B", "i1", PortDirection::Input));
		assert_eq!(graph.connections.len(), 1);

		ctl.delete_node(&mut graph, "A");
		assert!(graph.nodes.iter().all(|n| n.id != "A"));
		assert!(graph.connections.is_empty());
		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.nodes[0].id, "B");
	}
}
