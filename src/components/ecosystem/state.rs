use log::debug;

use crate::ecosystem::{DotTarget, HubId, Point, SimError, Simulation};

/// Half the width of the world area kept in view, in world units.
pub const WORLD_EXTENT: f64 = 385.0;
pub const HUB_RADIUS: f64 = 15.0;
pub const PARTICLE_RADIUS: f64 = 3.0;
/// Pointer distance that still counts as a hub hit, in world units.
pub const HUB_HIT_RADIUS: f64 = 20.0;
/// Pointer distance that still counts as an edge hit, in world units.
pub const EDGE_HIT_DISTANCE: f64 = 8.0;

/// World to screen mapping: world origin at (`x`, `y`), `k` pixels per unit,
/// world y pointing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	/// Center the world in a `width` x `height` canvas.
	pub fn fit(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: (width.min(height) / (2.0 * WORLD_EXTENT)).max(f64::EPSILON),
		}
	}

	pub fn to_screen(&self, p: Point) -> (f64, f64) {
		(self.x + p.x * self.k, self.y - p.y * self.k)
	}

	pub fn to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (self.y - sy) / self.k)
	}
}

/// What the pointer is over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
	Hub(HubId),
	Edge(usize),
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq <= 0.0 {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	p.distance(a.lerp(b, t))
}

pub struct CanvasState {
	pub sim: Simulation,
	pub transform: ViewTransform,
	pub hover: Option<Target>,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(sim: Simulation, width: f64, height: f64) -> Self {
		Self {
			sim,
			transform: ViewTransform::fit(width, height),
			hover: None,
			width,
			height,
		}
	}

	/// Hub under the pointer first, then the nearest edge within reach.
	pub fn target_at(&self, sx: f64, sy: f64) -> Option<Target> {
		let p = self.transform.to_world(sx, sy);
		if let Some(hub) = self
			.sim
			.hubs()
			.iter()
			.find(|hub| hub.position.distance(p) <= HUB_HIT_RADIUS)
		{
			return Some(Target::Hub(hub.id.clone()));
		}

		self.sim
			.edges()
			.iter()
			.enumerate()
			.filter_map(|(index, edge)| {
				let (from, to) = self.sim.graph().edge_endpoints(edge)?;
				Some((index, distance_to_segment(p, from, to)))
			})
			.filter(|&(_, d)| d <= EDGE_HIT_DISTANCE)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(index, _)| Target::Edge(index))
	}

	/// Hubs gain a dot, edges get stronger.
	pub fn press(&mut self, sx: f64, sy: f64, now: f64) -> Result<(), SimError> {
		match self.target_at(sx, sy) {
			Some(Target::Hub(hub)) => {
				self.sim.add_dot(&hub, now)?;
			}
			Some(Target::Edge(index)) => {
				self.sim.strengthen_edge(index, now)?;
			}
			None => {}
		}
		Ok(())
	}

	/// Request from the control panel; `hub` empty or `"all"` spreads over every hub.
	pub fn request_dots(&mut self, hub: &str, count: u32, now: f64) -> Result<u32, SimError> {
		let target = match hub {
			"" | "all" => DotTarget::All,
			id => DotTarget::Hub(id.into()),
		};
		debug!("dot request: {target:?} x{count}");
		self.sim.add_dots(target, count, now)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.transform = ViewTransform::fit(width, height);
	}
}
