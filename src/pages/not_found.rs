use leptos::prelude::*;
use leptos_router::components::A;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="page page--centered">
			<h1>"Nothing here"</h1>
			<p class="subtitle">"That workflow does not exist."</p>
			<A href="/">"Back to workflows"</A>
		</div>
	}
}
