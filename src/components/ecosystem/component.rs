use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::render;
use super::state::CanvasState;
use crate::ecosystem::{EcosystemDefinition, Simulation, SimulationConfig};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn now() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map_or(0.0, |p| p.now())
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		f64::from(ev.client_x()) - rect.left(),
		f64::from(ev.client_y()) - rect.top(),
	))
}

/// Canvas that runs one ecosystem simulation and paints it every frame.
///
/// Clicking a hub adds a dot there, clicking an edge strengthens it, and the
/// overlay panel queues batches of dots.
#[component]
pub fn EcosystemCanvas(
	definition: EcosystemDefinition,
	#[prop(optional)] config: Option<SimulationConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let disposed = Arc::new(AtomicBool::new(false));

	let hub_options: Vec<(String, String)> = definition
		.hubs
		.iter()
		.map(|hub| (hub.id.to_string(), hub.name.clone()))
		.collect();

	let (state_init, animate_init, resize_cb_init, disposed_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), disposed.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window; ecosystem canvas not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map_or(800.0, |p| f64::from(p.client_width()))
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map_or(600.0, |p| f64::from(p.client_height()))
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("2d context has an unexpected type");
					return;
				}
			},
			_ => {
				error!("canvas has no 2d context");
				return;
			}
		};

		let config = config.clone().unwrap_or_else(|| SimulationConfig {
			seed: (js_sys::Math::random() * 2f64.powi(53)) as u64,
			..SimulationConfig::default()
		});
		let sim = match Simulation::new(&definition, config, now()) {
			Ok(sim) => sim,
			Err(e) => {
				error!("could not start ecosystem: {e}");
				return;
			}
		};
		*state_init.borrow_mut() = Some(CanvasState::new(sim, w, h));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, resize_inner, disposed_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			disposed_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if disposed_anim.load(Ordering::Acquire) {
				if let Some(ref mut s) = *state_anim.borrow_mut() {
					s.sim.dispose();
				}
				if let (Some(win), Some(cb)) = (web_sys::window(), resize_inner.borrow_mut().take()) {
					let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				// drops this closure once it returns
				drop(animate_inner.borrow_mut().take());
				info!("ecosystem canvas torn down");
				return;
			}

			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.sim.tick(now());
				render::render(s, &ctx);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let disposed_cleanup = disposed.clone();
	on_cleanup(move || disposed_cleanup.store(true, Ordering::Release));

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Err(e) = s.press(x, y, now()) {
				warn!("click ignored: {e}");
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.hover = s.target_at(x, y);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.hover = None;
		}
	};

	let (target, set_target) = signal(String::from("all"));
	let (count, set_count) = signal(5u32);
	let state_add = state.clone();
	let on_add = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_add.borrow_mut() {
			if let Err(e) = s.request_dots(&target.get_untracked(), count.get_untracked(), now()) {
				warn!("dot request ignored: {e}");
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="ecosystem-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			style="display: block; cursor: pointer;"
		/>
		<div class="ecosystem-controls">
			<select on:change=move |ev| set_target.set(event_target_value(&ev))>
				<option value="all">"All hubs"</option>
				{hub_options
					.into_iter()
					.map(|(id, name)| view! { <option value=id>{name}</option> })
					.collect_view()}
			</select>
			<input
				type="number"
				min="1"
				max="20"
				prop:value=move || count.get().to_string()
				on:input=move |ev| {
					if let Ok(n) = event_target_value(&ev).parse::<u32>() {
						set_count.set(n);
					}
				}
			/>
			<button on:click=on_add>"Add"</button>
		</div>
	}
}
