use leptos::ev;
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;
use log::{debug, info, warn};
use reqwest::Client;

use crate::catalog::{NodeTemplate, WorkflowKind, stagger};
use crate::components::workflow_canvas::{
	Connection, Port, WorkflowCanvas, WorkflowGraph, WorkflowNode,
};
use crate::jobs::{self, PendingJob};
use crate::pages::not_found::NotFound;
use crate::poll::{PollConfig, PollError, PollHandle, spawn_poll};
use crate::storage;

/// Routes `/workflow/:kind` to the matching editor.
#[component]
pub fn Editor() -> impl IntoView {
	let params = use_params_map();
	let kind = Memo::new(move |_| {
		params.with(|p| p.get("kind").and_then(|slug| WorkflowKind::from_slug(&slug)))
	});

	move || match kind.get() {
		Some(kind) => view! { <WorkflowEditor kind=kind /> }.into_any(),
		None => view! { <NotFound /> }.into_any(),
	}
}

fn initial_graph(kind: WorkflowKind) -> WorkflowGraph {
	match storage::load(kind) {
		Ok(Some(graph)) => {
			info!(
				"restored {} workflow: {} nodes, {} connections",
				kind.slug(),
				graph.nodes.len(),
				graph.connections.len()
			);
			graph
		}
		Ok(None) => kind.seed(),
		Err(err) => {
			warn!("could not restore {} workflow, using seed: {}", kind.slug(), err);
			kind.seed()
		}
	}
}

fn port_list(ports: &[Port]) -> String {
	if ports.is_empty() {
		return "—".to_string();
	}
	ports
		.iter()
		.map(|p| format!("{} ({})", p.label, p.data_type.label()))
		.collect::<Vec<_>>()
		.join(", ")
}

fn page_origin() -> Option<String> {
	web_sys::window().and_then(|w| w.location().origin().ok())
}

/// Polls `job` until it settles and records the outcome on its node.
fn watch_job(job: PendingJob, nodes: RwSignal<Vec<WorkflowNode>>, client: Client) -> PollHandle {
	info!("watching {} job {}", job.node_id, job.job_id);
	let target = job.clone();
	let check = move |attempt: u32| {
		let client = client.clone();
		let job = target.clone();
		async move {
			debug!("status check {} for job {}", attempt, job.job_id);
			jobs::check_status(&client, &job).await
		}
	};
	spawn_poll(PollConfig::default(), check, move |outcome| {
		match &outcome {
			Err(PollError::Cancelled) => return,
			Ok(_) => info!("job {} on {} complete", job.job_id, job.node_id),
			Err(err) => warn!("job {} on {}: {}", job.job_id, job.node_id, err),
		}
		nodes.maybe_update(|ns| {
			ns.iter_mut()
				.find(|n| n.id == job.node_id)
				.is_some_and(|n| jobs::record_outcome(&mut n.data, outcome))
		});
	})
}

#[component]
fn WorkflowEditor(kind: WorkflowKind) -> impl IntoView {
	let initial = initial_graph(kind);
	let nodes = RwSignal::new(initial.nodes);
	let connections = RwSignal::new(initial.connections);
	let selected = RwSignal::new(None::<String>);
	let inspector_open = RwSignal::new(false);
	let added = StoredValue::new(0usize);

	Effect::new(move |_| {
		let graph = WorkflowGraph {
			nodes: nodes.get(),
			connections: connections.get(),
		};
		if let Err(err) = storage::save(kind, &graph) {
			warn!("could not save {} workflow: {}", kind.slug(), err);
		}
	});

	let add_node = move |template: &'static NodeTemplate| {
		let index = added.get_value();
		added.set_value(index + 1);
		let node = template.instantiate(stagger(index));
		info!("added {} node {}", template.node_type, node.id);
		selected.set(Some(node.id.clone()));
		nodes.update(|ns| ns.push(node));
	};

	let reset = move |_: ev::MouseEvent| {
		if let Err(err) = storage::clear(kind) {
			warn!("could not clear {} workflow: {}", kind.slug(), err);
		}
		let seed = kind.seed();
		nodes.set(seed.nodes);
		connections.set(seed.connections);
		selected.set(None);
		inspector_open.set(false);
	};

	let inspected = Memo::new(move |_| {
		let id = selected.get()?;
		nodes.with(|ns| ns.iter().find(|n| n.id == id).cloned())
	});

	let client = Client::new();
	let job_poll = StoredValue::new(None::<PollHandle>);
	let pending_job = Memo::new(move |_| {
		let origin = page_origin()?;
		inspected.with(|node| node.as_ref().and_then(|n| PendingJob::from_node(n, &origin)))
	});
	Effect::new(move |_| {
		let next = pending_job.get().map(|job| watch_job(job, nodes, client.clone()));
		job_poll.update_value(|slot| {
			if let Some(previous) = slot.take() {
				previous.cancel();
			}
			*slot = next;
		});
	});

	let set_job_id = move |node_id: String, job_id: String| {
		nodes.update(|ns| {
			if let Some(node) = ns.iter_mut().find(|n| n.id == node_id) {
				jobs::assign_job(&mut node.data, &job_id);
			}
		});
	};

	let palette = kind
		.templates()
		.iter()
		.map(|template| {
			let style = format!("--node-color: {};", template.color);
			view! {
				<button class="palette__item" style=style on:click=move |_| add_node(template)>
					<span class="palette__icon">{template.icon}</span>
					{template.title}
				</button>
			}
		})
		.collect_view();

	let inspector = move || {
		let node = inspected.get()?;
		let payload = serde_json::to_string_pretty(&node.data).unwrap_or_default();
		let job = jobs::is_async_provider(&node.node_type).then(|| {
			let node_id = node.id.clone();
			let current = jobs::job_id(&node.data).unwrap_or_default().to_string();
			view! {
				<dt>"Job"</dt>
				<dd>
					<input
						class="inspector__job"
						placeholder="provider job id"
						prop:value=current
						on:change=move |ev| set_job_id(node_id.clone(), event_target_value(&ev))
					/>
					<span class="inspector__job-status">{jobs::describe_job(&node.data)}</span>
				</dd>
			}
		});
		Some(view! {
			<aside class="inspector" class:expanded=move || inspector_open.get()>
				<header class="inspector__header">
					<span>{node.icon.clone()}" "{node.title.clone()}</span>
					<button
						class="inspector__toggle"
						on:click=move |_| inspector_open.update(|open| *open = !*open)
					>
						{move || if inspector_open.get() { "Less" } else { "More" }}
					</button>
				</header>
				<dl>
					<dt>"Type"</dt>
					<dd>{node.node_type.clone()}</dd>
					<dt>"Inputs"</dt>
					<dd>{port_list(&node.inputs)}</dd>
					<dt>"Outputs"</dt>
					<dd>{port_list(&node.outputs)}</dd>
					<dt>"Position"</dt>
					<dd>{format!("{}, {}", node.position.x, node.position.y)}</dd>
					{job}
				</dl>
				<Show when=move || inspector_open.get()>
					<pre class="inspector__data">{payload.clone()}</pre>
				</Show>
			</aside>
		})
	};

	view! {
		<div class="editor" style=format!("--accent: {};", kind.accent())>
			<nav class="editor__toolbar">
				<A href="/">"←"</A>
				<h1>{kind.title()}</h1>
				<span class="editor__stats">
					{move || {
						format!(
							"{} nodes · {} connections",
							nodes.with(Vec::len),
							connections.with(Vec::len),
						)
					}}
				</span>
				<button class="editor__reset" on:click=reset>
					"Reset"
				</button>
			</nav>
			<div class="editor__body">
				<div class="palette">{palette}</div>
				<div class="editor__canvas">
					<WorkflowCanvas
						nodes=nodes
						connections=connections
						on_nodes_change={move |ns: Vec<WorkflowNode>| nodes.set(ns)}
						on_connections_change={move |cs: Vec<Connection>| connections.set(cs)}
						selected_node_id=Signal::derive(move || selected.get())
						on_node_select={move |node: Option<WorkflowNode>| {
							selected.set(node.map(|n| n.id))
						}}
						on_node_double_click={move |node: WorkflowNode| {
							selected.set(Some(node.id));
							inspector_open.set(true);
						}}
						accent_color=kind.accent()
					/>
				</div>
				{inspector}
			</div>
		</div>
	}
}
