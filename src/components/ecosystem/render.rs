use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{CanvasState, HUB_RADIUS, PARTICLE_RADIUS, Target, ViewTransform};
use crate::ecosystem::{EdgeCategory, PeopleCounter, Rgb, Snapshot};

const BACKGROUND: &str = "#1a1a2e";
const SILHOUETTES_PER_ROW: u32 = 30;

fn category_color(category: EdgeCategory) -> Rgb {
	match category {
		EdgeCategory::Inspire => Rgb::new(244, 67, 54),
		EdgeCategory::Equip => Rgb::new(76, 175, 80),
	}
}

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let snapshot = state.sim.snapshot();
	let t = &state.transform;

	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	draw_edges(state, snapshot, ctx);
	draw_pulses(t, snapshot, ctx);
	draw_effects(t, snapshot, ctx);
	draw_hubs(state, snapshot, ctx);
	draw_particles(t, snapshot, ctx);
	draw_celebrations(t, snapshot, ctx);
	draw_counter(state, &snapshot.counter, ctx);
	draw_legend(state, ctx);
}

fn draw_edges(state: &CanvasState, snapshot: &Snapshot, ctx: &CanvasRenderingContext2d) {
	let t = &state.transform;
	let arrow = 8.0;
	for edge in &snapshot.edges {
		let (x1, y1) = t.to_screen(edge.from);
		let (x2, y2) = t.to_screen(edge.to);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let hovered = state.hover == Some(Target::Edge(edge.index));
		let alpha = if hovered { 0.9 } else { 0.45 };
		let color = category_color(edge.category);
		let radius = HUB_RADIUS * t.k;

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.set_stroke_style_str(&color.to_css(alpha));
		ctx.set_line_width(edge.thickness * t.k.max(0.5) * if hovered { 1.5 } else { 1.0 });
		ctx.begin_path();
		ctx.move_to(x1 + ux * radius, y1 + uy * radius);
		ctx.line_to(x2 - ux * (radius + arrow), y2 - uy * (radius + arrow));
		ctx.stroke();

		ctx.set_fill_style_str(&color.to_css(alpha));
		let (tip_x, tip_y) = (x2 - ux * radius, y2 - uy * radius);
		let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
		let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_pulses(t: &ViewTransform, snapshot: &Snapshot, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_cap("round");
	for pulse in &snapshot.pulses {
		let (x1, y1) = t.to_screen(pulse.start);
		let (x2, y2) = t.to_screen(pulse.end);
		for (width, alpha) in [
			(pulse.glow_thickness, pulse.glow_opacity),
			(pulse.thickness, pulse.opacity),
		] {
			ctx.set_stroke_style_str(&pulse.color.to_css(alpha));
			ctx.set_line_width(width * t.k.max(0.5));
			ctx.begin_path();
			ctx.move_to(x1, y1);
			ctx.line_to(x2, y2);
			ctx.stroke();
		}
	}
	ctx.set_line_cap("butt");
}

fn draw_effects(t: &ViewTransform, snapshot: &Snapshot, ctx: &CanvasRenderingContext2d) {
	for effect in &snapshot.effects {
		let (x, y) = t.to_screen(effect.position);
		ctx.begin_path();
		let _ = ctx.arc(x, y, HUB_RADIUS * effect.scale * t.k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&effect.color.to_css(effect.opacity));
		ctx.set_line_width(2.0);
		ctx.stroke();
		ctx.set_fill_style_str(&effect.color.to_css(effect.opacity * 0.25));
		ctx.fill();
	}
}

fn draw_hubs(state: &CanvasState, snapshot: &Snapshot, ctx: &CanvasRenderingContext2d) {
	let t = &state.transform;
	let radius = HUB_RADIUS * t.k;
	ctx.set_font(&format!("{}px sans-serif", (12.0 * t.k.max(0.8)).round()));
	ctx.set_text_align("center");

	for hub in &snapshot.hubs {
		let (x, y) = t.to_screen(hub.position);
		let hovered = state.hover.as_ref() == Some(&Target::Hub(hub.id.clone()));

		if hovered {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius * 1.6, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&hub.color.to_css(0.2));
			ctx.fill();
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&hub.color.to_css(1.0));
		ctx.fill();

		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		let _ = ctx.fill_text(&hub.display_name, x, y + radius + 14.0);
		let _ = ctx.fill_text(&hub.population.to_string(), x, y + 4.0);
	}
	ctx.set_text_align("start");
}

fn draw_particles(t: &ViewTransform, snapshot: &Snapshot, ctx: &CanvasRenderingContext2d) {
	let radius = (PARTICLE_RADIUS * t.k).max(1.5);
	for particle in &snapshot.particles {
		if particle.opacity <= 0.0 {
			continue;
		}
		let (x, y) = t.to_screen(particle.position);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&particle.color.to_css(particle.opacity));
		ctx.fill();
	}
}

fn draw_celebrations(t: &ViewTransform, snapshot: &Snapshot, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("bold 14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_fill_style_str("#ffffff");
	for celebration in &snapshot.celebrations {
		let (x, y) = t.to_screen(celebration.position);
		let _ = ctx.fill_text(&celebration.text, x, y - 10.0);
	}
	ctx.set_text_align("start");
}

fn draw_silhouette(ctx: &CanvasRenderingContext2d, x: f64, y: f64, color: &str) {
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	let _ = ctx.arc(x, y, 2.5, 0.0, 2.0 * PI);
	ctx.fill();
	ctx.begin_path();
	let _ = ctx.arc(x, y + 7.0, 4.0, PI, 2.0 * PI);
	ctx.fill();
}

/// Rows of people, `SILHOUETTES_PER_ROW` wide, under a caption.
fn draw_people_row(ctx: &CanvasRenderingContext2d, caption: &str, count: u32, color: &str, top: f64) -> f64 {
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
	let _ = ctx.fill_text(&format!("{caption}: {count}"), 16.0, top);
	let mut y = top + 12.0;
	for row_start in (0..count).step_by(SILHOUETTES_PER_ROW as usize) {
		let in_row = (count - row_start).min(SILHOUETTES_PER_ROW);
		for i in 0..in_row {
			draw_silhouette(ctx, 20.0 + f64::from(i) * 10.0, y, color);
		}
		y += 14.0;
	}
	y + 10.0
}

fn draw_counter(state: &CanvasState, counter: &PeopleCounter, ctx: &CanvasRenderingContext2d) {
	let origin_color = state
		.sim
		.hub(state.sim.graph().origin())
		.map_or_else(|| "#FF9800".to_owned(), |hub| hub.color.to_string());
	ctx.set_font("12px sans-serif");
	let next = draw_people_row(ctx, "Creators", counter.creators, &origin_color, 24.0);
	draw_people_row(ctx, "Inspired", counter.inspired, "rgba(200, 220, 255, 0.9)", next);
}

fn draw_legend(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("12px sans-serif");
	let base = state.height - 16.0 - 18.0;
	for (i, category) in [EdgeCategory::Inspire, EdgeCategory::Equip].into_iter().enumerate() {
		let y = base + i as f64 * 18.0;
		ctx.set_stroke_style_str(&category_color(category).to_css(0.9));
		ctx.set_line_width(3.0);
		ctx.begin_path();
		ctx.move_to(16.0, y);
		ctx.line_to(40.0, y);
		ctx.stroke();
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		let _ = ctx.fill_text(category.legend(), 48.0, y + 4.0);
	}
}
