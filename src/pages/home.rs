use leptos::prelude::*;
use log::error;

use crate::components::ecosystem::EcosystemCanvas;
use crate::ecosystem::EcosystemDefinition;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let community = EcosystemDefinition::community();
	if let Err(e) = &community {
		error!("bundled community layout is invalid: {e}");
	}

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{community
				.map(|definition| {
					view! {
						<div class="fullscreen-graph">
							<EcosystemCanvas definition=definition fullscreen=true />
							<div class="graph-overlay">
								<h1>"Creative Ecosystem"</h1>
								<p class="subtitle">
									"Click a hub to add a person. Click a connection to strengthen it."
								</p>
							</div>
						</div>
					}
				})}
		</ErrorBoundary>
	}
}
