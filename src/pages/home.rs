use leptos::prelude::*;
use leptos_router::components::A;

use crate::catalog::WorkflowKind;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let cards = WorkflowKind::ALL
		.into_iter()
		.map(|kind| {
			let href = format!("/workflow/{}", kind.slug());
			let style = format!("--accent: {};", kind.accent());
			let palette = kind
				.templates()
				.iter()
				.map(|t| t.title)
				.collect::<Vec<_>>()
				.join(" · ");
			view! {
				<A href=href>
					<div class="workflow-card" style=style>
						<h2>{kind.title()}</h2>
						<p>{palette}</p>
					</div>
				</A>
			}
		})
		.collect_view();

	view! {
		<div class="page">
			<header class="page__header">
				<h1>"Solus Forge"</h1>
				<p class="subtitle">
					"Pick a workflow. Drag nodes to move them, click an output then an input \
					 to connect, Alt+drag or middle-drag to pan, scroll to zoom, Delete to \
					 remove the selected node."
				</p>
			</header>
			<div class="workflow-grid">{cards}</div>
		</div>
	}
}
