use leptos::ev;
use leptos::prelude::*;
use web_sys::{KeyboardEvent, MouseEvent, WheelEvent};

use super::render::{ConnectionShape, NodeCard, PortMarker, build_scene};
use super::state::{
	CanvasController, CanvasEvent, Interaction, MouseButton, PointerInput, PointerTarget,
	PortAnchor,
};
use super::store::DEFAULT_GRID_SIZE;
use super::types::{Connection, Point, PortDirection, WorkflowGraph, WorkflowNode};

pub const DEFAULT_ACCENT: &str = "#a855f7";
const WIRE_LAYER_STYLE: &str =
	"position: absolute; left: 0; top: 0; overflow: visible; pointer-events: none;";

/// Handles shared by every event listener of one canvas instance.
#[derive(Clone, Copy)]
struct CanvasHost {
	nodes: Signal<Vec<WorkflowNode>>,
	connections: Signal<Vec<Connection>>,
	controller: RwSignal<CanvasController>,
	on_nodes_change: Callback<Vec<WorkflowNode>>,
	on_connections_change: Callback<Vec<Connection>>,
	on_node_select: Option<Callback<Option<WorkflowNode>>>,
}

impl CanvasHost {
	fn graph(&self) -> WorkflowGraph {
		WorkflowGraph {
			nodes: self.nodes.get_untracked(),
			connections: self.connections.get_untracked(),
		}
	}

	/// Runs one controller step against a snapshot of the host's collections
	/// and reports every resulting change back through the callbacks.
	fn apply(
		&self,
		step: impl FnOnce(&mut CanvasController, &mut WorkflowGraph) -> Vec<CanvasEvent>,
	) {
		let mut graph = self.graph();
		let events = self
			.controller
			.try_update(|c| step(c, &mut graph))
			.unwrap_or_default();
		if events.is_empty() {
			return;
		}

		for event in &events {
			if let (CanvasEvent::NodeSelected(id), Some(cb)) = (event, self.on_node_select) {
				cb.run(id.as_deref().and_then(|id| graph.node(id)).cloned());
			}
		}

		// A cascade delete reports both collections from the same snapshot.
		let nodes_changed = events.iter().any(CanvasEvent::changes_nodes);
		let connections_changed = events.iter().any(CanvasEvent::changes_connections);
		let WorkflowGraph { nodes, connections } = graph;
		if nodes_changed {
			self.on_nodes_change.run(nodes);
		}
		if connections_changed {
			self.on_connections_change.run(connections);
		}
	}
}

fn focus_in_text_input() -> bool {
	let Some(active) = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.active_element())
	else {
		return false;
	};
	matches!(active.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
		|| active
			.get_attribute("contenteditable")
			.is_some_and(|v| v != "false")
}

fn node_style(card: &NodeCard) -> String {
	format!(
		"position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; --node-color: {};",
		card.position.x, card.position.y, card.size.width, card.size.height, card.color
	)
}

fn wire_view(shape: ConnectionShape, dashed: bool) -> impl IntoView {
	let class = if shape.animated {
		"workflow-wire workflow-wire--animated"
	} else {
		"workflow-wire"
	};
	view! {
		<g class=class data-connection=shape.id>
			<path
				class="workflow-wire__glow"
				d=shape.path.clone()
				stroke=shape.color.clone()
				stroke-width="8"
				stroke-opacity="0.18"
				fill="none"
			/>
			<path
				class="workflow-wire__line"
				d=shape.path
				stroke=shape.color
				stroke-width="2"
				stroke-dasharray=dashed.then_some("6 4")
				fill="none"
			/>
		</g>
	}
}

#[component]
pub fn WorkflowCanvas(
	#[prop(into)] nodes: Signal<Vec<WorkflowNode>>,
	#[prop(into)] connections: Signal<Vec<Connection>>,
	#[prop(into)] on_nodes_change: Callback<Vec<WorkflowNode>>,
	#[prop(into)] on_connections_change: Callback<Vec<Connection>>,
	#[prop(into, optional)] selected_node_id: MaybeProp<String>,
	#[prop(into, optional)] on_node_select: Option<Callback<Option<WorkflowNode>>>,
	#[prop(into, optional)] on_node_double_click: Option<Callback<WorkflowNode>>,
	#[prop(default = DEFAULT_GRID_SIZE)] grid_size: f64,
	#[prop(into, default = DEFAULT_ACCENT.to_string())] accent_color: String,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let controller = RwSignal::new(CanvasController::new(grid_size));
	let host = CanvasHost {
		nodes,
		connections,
		controller,
		on_nodes_change,
		on_connections_change,
		on_node_select,
	};

	Effect::new(move |_| {
		let selected = selected_node_id.get();
		controller.update(|c| c.set_selection(selected));
	});

	// The host may replace its collections mid-gesture (reset, reload).
	Effect::new(move |_| {
		nodes.with(|ns| controller.maybe_update(|c| c.reconcile(ns)));
	});

	let scene = Memo::new(move |_| {
		let graph = WorkflowGraph {
			nodes: nodes.get(),
			connections: connections.get(),
		};
		controller.with(|c| build_scene(&graph, c, &accent_color))
	});

	let pointer_input = move |ev: &MouseEvent| -> Option<PointerInput> {
		let canvas = container_ref.get_untracked()?;
		let rect = canvas.get_bounding_client_rect();
		Some(PointerInput {
			client: Point::new(ev.client_x() as f64, ev.client_y() as f64),
			origin: Point::new(rect.left(), rect.top()),
			button: MouseButton::from_code(ev.button()),
			alt_key: ev.alt_key(),
		})
	};

	let on_mousedown = move |ev: MouseEvent| {
		let Some(input) = pointer_input(&ev) else {
			return;
		};
		if input.button == MouseButton::Middle {
			ev.prevent_default();
		}
		host.apply(|c, graph| c.pointer_down(graph, PointerTarget::Canvas, input));
	};

	let on_mousemove = move |ev: MouseEvent| {
		if controller.with_untracked(|c| c.interaction == Interaction::Idle) {
			return;
		}
		let Some(input) = pointer_input(&ev) else {
			return;
		};
		host.apply(|c, graph| c.pointer_move(graph, input));
	};

	let on_release = move |_: MouseEvent| {
		if controller.with_untracked(|c| {
			matches!(
				c.interaction,
				Interaction::Panning { .. } | Interaction::DraggingNode { .. }
			)
		}) {
			controller.update(|c| c.release());
		}
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		controller.update(|c| c.wheel(ev.delta_y()));
	};

	let key_handle = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
		let typing = focus_in_text_input();
		let key = ev.key();
		host.apply(|c, graph| c.key_down(graph, &key, typing));
	});
	on_cleanup(move || key_handle.remove());

	let on_node_mousedown = move |ev: MouseEvent, node_id: String| {
		ev.stop_propagation();
		let Some(input) = pointer_input(&ev) else {
			return;
		};
		host.apply(|c, graph| c.pointer_down(graph, PointerTarget::Node(node_id), input));
	};

	let on_port_click = move |anchor: PortAnchor| {
		host.apply(|c, graph| c.port_click(graph, anchor));
	};

	let on_node_delete = move |node_id: String| {
		host.apply(|c, graph| c.delete_node(graph, &node_id));
	};

	let on_node_dblclick = move |node_id: String| {
		let Some(cb) = on_node_double_click else {
			return;
		};
		let node = nodes.with_untracked(|ns| ns.iter().find(|n| n.id == node_id).cloned());
		if let Some(node) = node {
			cb.run(node);
		}
	};

	let cursor = move || {
		controller.with(|c| match c.interaction {
			Interaction::Idle => "default",
			Interaction::Panning { .. } | Interaction::DraggingNode { .. } => "grabbing",
			Interaction::ConnectingFrom { .. } => "crosshair",
		})
	};

	let port_view = move |node_id: String, port: PortMarker| {
		let anchor = PortAnchor::new(&node_id, &port.id, port.direction);
		let side = match port.direction {
			PortDirection::Input => "input",
			PortDirection::Output => "output",
		};
		let class = format!(
			"workflow-port workflow-port--{}{}",
			side,
			if port.active { " is-active" } else { "" }
		);
		let style = format!(
			"position: absolute; left: {}px; top: {}px; --port-color: {};",
			port.offset.x, port.offset.y, port.color
		);
		let label = port.label;
		let title = label.clone();
		view! {
			<div
				class=class
				style=style
				title=title
				on:mousedown=move |ev: MouseEvent| ev.stop_propagation()
				on:click=move |ev: MouseEvent| {
					ev.stop_propagation();
					on_port_click(anchor.clone());
				}
			>
				<span class="workflow-port__dot"></span>
				<span class="workflow-port__label">{label}</span>
			</div>
		}
	};

	let node_view = move |node_id: String| {
		let id = StoredValue::new(node_id.clone());
		let card = Memo::new(move |_| scene.with(|s| s.node(&node_id).cloned()));
		view! {
			<div
				class="workflow-node"
				class:selected=move || card.with(|c| c.as_ref().is_some_and(|c| c.selected))
				style=move || card.with(|c| c.as_ref().map(node_style).unwrap_or_default())
				on:mousedown=move |ev: MouseEvent| on_node_mousedown(ev, id.get_value())
				on:dblclick=move |ev: MouseEvent| {
					ev.stop_propagation();
					on_node_dblclick(id.get_value());
				}
			>
				<div class="workflow-node__header">
					<span class="workflow-node__icon">
						{move || card.with(|c| c.as_ref().map(|c| c.icon.clone()))}
					</span>
					<span class="workflow-node__title">
						{move || card.with(|c| c.as_ref().map(|c| c.title.clone()))}
					</span>
					<button
						class="workflow-node__delete"
						title="Delete node"
						on:mousedown=move |ev: MouseEvent| ev.stop_propagation()
						on:click=move |ev: MouseEvent| {
							ev.stop_propagation();
							on_node_delete(id.get_value());
						}
					>
						"×"
					</button>
				</div>
				{move || {
					card.with(|c| c.as_ref().map(|c| c.ports.clone()).unwrap_or_default())
						.into_iter()
						.map(|port| port_view(id.get_value(), port))
						.collect_view()
				}}
			</div>
		}
	};

	view! {
		<div
			node_ref=container_ref
			class="workflow-canvas"
			style=move || {
				format!(
					"position: relative; overflow: hidden; width: 100%; height: 100%; \
					 cursor: {}; {}",
					cursor(),
					scene.with(|s| s.grid.css()),
				)
			}
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_release
			on:mouseleave=on_release
			on:wheel=on_wheel
		>
			<div
				class="workflow-canvas__world"
				style=move || {
					format!(
						"position: absolute; left: 0; top: 0; transform-origin: 0 0; \
						 transform: {};",
						scene.with(|s| s.world_transform.clone()),
					)
				}
			>
				<svg
					class="workflow-canvas__wires"
					width="1"
					height="1"
					style=WIRE_LAYER_STYLE
				>
					{move || {
						scene.with(|s| s.connections.clone())
							.into_iter()
							.map(|shape| wire_view(shape, false))
							.collect_view()
					}}
					{move || scene.with(|s| s.preview.clone()).map(|shape| wire_view(shape, true))}
				</svg>
				<For
					each=move || {
						scene.with(|s| s.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>())
					}
					key=|id| id.clone()
					children=node_view
				/>
			</div>
		</div>
	}
}
