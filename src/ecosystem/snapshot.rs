//! Read-only picture of one tick, handed to the renderer.

use super::particle::ParticleId;
use super::pulse::PulseId;
use super::scheduler::CelebrationId;
use super::types::{EdgeCategory, HubId, Point, Rgb};

/// Opacity of a pulse's main stroke.
pub const PULSE_OPACITY: f64 = 0.8;
/// Opacity of a pulse's glow stroke.
pub const PULSE_GLOW_OPACITY: f64 = 0.2;
/// Glow stroke weight relative to the main stroke.
pub const PULSE_GLOW_SCALE: f64 = 1.5;

/// A hub as drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct HubView {
	/// Stable identity across ticks.
	pub id: HubId,
	/// Label shown under the hub.
	pub display_name: String,
	/// World position.
	pub position: Point,
	/// Fill color.
	pub color: Rgb,
	/// Authoritative headcount, drawn inside the hub.
	pub population: u32,
}

/// An edge between two resolved hub positions.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView {
	/// Position of the edge in the definition; used for hit-testing.
	pub index: usize,
	/// Source hub position.
	pub from: Point,
	/// Target hub position.
	pub to: Point,
	/// Color of the source hub.
	pub color: Rgb,
	/// Relationship category; picks the stroke color.
	pub category: EdgeCategory,
	/// Current line weight.
	pub thickness: f64,
}

/// A dot, orbiting or in transit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleView {
	/// Stable identity across ticks.
	pub id: ParticleId,
	/// World position.
	pub position: Point,
	/// Home hub color, or the blend between hubs while in transit.
	pub color: Rgb,
	/// Fade-in opacity in `[0, 1]`.
	pub opacity: f64,
}

/// The lit part of an edge plus its glow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseView {
	/// Stable identity across ticks.
	pub id: PulseId,
	/// Trailing end of the lit chunk.
	pub start: Point,
	/// Leading end of the lit chunk.
	pub end: Point,
	/// Color of the hub the pulse left.
	pub color: Rgb,
	/// Main stroke weight.
	pub thickness: f64,
	/// Main stroke opacity, [`PULSE_OPACITY`].
	pub opacity: f64,
	/// Glow stroke weight, [`PULSE_GLOW_SCALE`] times the main one.
	pub glow_thickness: f64,
	/// Glow stroke opacity, [`PULSE_GLOW_OPACITY`].
	pub glow_opacity: f64,
}

/// An expansion ring around a hub a pulse just reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectView {
	/// Center of the ring.
	pub position: Point,
	/// Color of the hub the pulse came from.
	pub color: Rgb,
	/// Ring radius relative to the hub radius.
	pub scale: f64,
	/// Opacity in `[0, 1]`.
	pub opacity: f64,
}

/// Floating text over a strengthened edge.
#[derive(Clone, Debug, PartialEq)]
pub struct CelebrationView {
	/// Stable identity across ticks.
	pub id: CelebrationId,
	/// Text to draw.
	pub text: String,
	/// Midpoint of the edge.
	pub position: Point,
}

/// Headcounts shown next to the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeopleCounter {
	/// Dots at the origin hub.
	pub creators: u32,
	/// Dots at hubs the origin directly inspires.
	pub inspired: u32,
}

/// Everything the renderer draws for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
	/// Tick time the snapshot was taken at.
	pub time: f64,
	/// Hubs in definition order.
	pub hubs: Vec<HubView>,
	/// Edges whose endpoints both resolve.
	pub edges: Vec<EdgeView>,
	/// Live dots.
	pub particles: Vec<ParticleView>,
	/// Pulses with a visible chunk this tick.
	pub pulses: Vec<PulseView>,
	/// Rings still growing or fading.
	pub effects: Vec<EffectView>,
	/// Celebrations not yet expired.
	pub celebrations: Vec<CelebrationView>,
	/// People counter for the overlay.
	pub counter: PeopleCounter,
}
