//! Dots and their migration state machine.
//!
//! A dot is either orbiting its home hub or flying in a straight line to a
//! new one. While it flies it still counts towards the hub it left; the
//! population moves over only when the flight is finalized.

use log::{debug, warn};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::config::SimulationConfig;
use super::error::SimError;
use super::graph::HubGraph;
use super::orbit::{Orbit, compute_fade_opacity, compute_orbit_position};
use super::types::{HubId, Point, Rgb};

/// Identifier of a dot, unique within one simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

/// A straight-line flight between two hubs.
#[derive(Clone, Debug, PartialEq)]
pub struct Transit {
	/// Center of the hub being left.
	pub old_pos: Point,
	/// Center of the destination hub.
	pub new_pos: Point,
	/// When the flight started.
	pub start: f64,
	/// How long the flight takes.
	pub duration: f64,
	/// Color at departure.
	pub from_color: Rgb,
	/// Color on arrival.
	pub to_color: Rgb,
	/// Where the dot is going.
	pub destination: HubId,
	overrun_reported: bool,
}

impl Transit {
	/// Fraction of the flight completed at `now`, in `[0, 1]`.
	pub fn progress(&self, now: f64) -> f64 {
		if self.duration <= 0.0 {
			return 1.0;
		}
		((now - self.start) / self.duration).clamp(0.0, 1.0)
	}

	/// Interpolated position at `now`.
	pub fn position(&self, now: f64) -> Point {
		self.old_pos.lerp(self.new_pos, self.progress(now))
	}

	/// Interpolated color at `now`.
	pub fn color(&self, now: f64) -> Rgb {
		self.from_color.lerp(self.to_color, self.progress(now))
	}

	/// Whether the flight has been running for more than twice its duration.
	pub fn is_overrun(&self, now: f64) -> bool {
		now - self.start > 2.0 * self.duration
	}
}

/// Where a dot is in its lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum ParticleState {
	/// Circling the home hub.
	Orbiting,
	/// Flying to another hub.
	Transiting(Transit),
}

/// A dot.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	/// Identifier.
	pub id: ParticleId,
	/// Hub this dot currently belongs to.
	pub home: HubId,
	/// Orbit around `home`.
	pub orbit: Orbit,
	/// When the dot was created; drives the fade-in.
	pub spawn_time: f64,
	/// Lifecycle state.
	pub state: ParticleState,
}

/// What the renderer needs to draw one dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleVisual {
	/// Current position.
	pub position: Point,
	/// Current color.
	pub color: Rgb,
	/// Current opacity.
	pub opacity: f64,
}

impl Particle {
	/// Whether the dot is mid-flight.
	pub fn is_transiting(&self) -> bool {
		matches!(self.state, ParticleState::Transiting(_))
	}

	/// The in-flight record, if any.
	pub fn transit(&self) -> Option<&Transit> {
		match &self.state {
			ParticleState::Transiting(transit) => Some(transit),
			ParticleState::Orbiting => None,
		}
	}

	/// Opacity of the fade-in at `now`.
	pub fn opacity(&self, now: f64, config: &SimulationConfig) -> f64 {
		compute_fade_opacity(self.spawn_time, now, config.fade_duration, config.steady_opacity)
	}

	/// Position, color and opacity at `now`. `None` if the home hub does not resolve.
	pub fn visual(&self, graph: &HubGraph, now: f64, config: &SimulationConfig) -> Option<ParticleVisual> {
		let (position, color) = match &self.state {
			ParticleState::Transiting(transit) => (transit.position(now), transit.color(now)),
			ParticleState::Orbiting => {
				let hub = graph.hub(&self.home)?;
				let elapsed = self.orbit.elapsed_since_arrival(now);
				(compute_orbit_position(hub.position, &self.orbit, elapsed), hub.color)
			}
		};
		Some(ParticleVisual {
			position,
			color,
			opacity: self.opacity(now, config),
		})
	}
}

/// Migration odds for one tick that covered `elapsed` milliseconds.
///
/// `config.migration_chance` is the chance per reference frame; it is
/// compounded over the frames the tick stands for, so a 30 Hz host migrates
/// dots as often per second as a 120 Hz one.
pub fn migration_chance(elapsed: f64, config: &SimulationConfig) -> f64 {
	let base = config.migration_chance.clamp(0.0, 1.0);
	if config.reference_frame <= 0.0 {
		return base;
	}
	let frames = elapsed.clamp(0.0, config.max_migration_step) / config.reference_frame;
	1.0 - (1.0 - base).powf(frames)
}

/// Pick where a dot homed at `home` would migrate to.
///
/// With probability `neighbor_bias` a graph neighbor is chosen (when the hub
/// has any), otherwise any other hub. `None` when the pick lands on `home`,
/// which only happens for self-loops in the edge list.
pub fn choose_destination(
	home: &HubId,
	graph: &HubGraph,
	neighbor_bias: f64,
	rng: &mut impl Rng,
) -> Option<HubId> {
	let neighbors: Vec<&HubId> = graph.neighbors(home).collect();
	let roll: f64 = rng.random();
	let candidate = if !neighbors.is_empty() && roll < neighbor_bias {
		neighbors.choose(rng).copied()
	} else {
		let others: Vec<&HubId> = graph
			.hubs()
			.iter()
			.map(|hub| &hub.id)
			.filter(|id| *id != home)
			.collect();
		others.choose(rng).copied()
	}?;
	(candidate != home).then(|| candidate.clone())
}

/// Put an orbiting dot on a flight to `destination`.
///
/// Returns `Ok(false)` without touching the dot when it is already flying or
/// `destination` is its home. Populations are left alone.
pub fn begin_transit(
	particle: &mut Particle,
	destination: &HubId,
	graph: &HubGraph,
	now: f64,
	duration: f64,
) -> Result<bool, SimError> {
	if particle.is_transiting() || *destination == particle.home {
		return Ok(false);
	}
	let from = graph
		.hub(&particle.home)
		.ok_or_else(|| SimError::UnknownHub(particle.home.clone()))?;
	let to = graph
		.hub(destination)
		.ok_or_else(|| SimError::UnknownHub(destination.clone()))?;
	particle.state = ParticleState::Transiting(Transit {
		old_pos: from.position,
		new_pos: to.position,
		start: now,
		duration,
		from_color: from.color,
		to_color: to.color,
		destination: destination.clone(),
		overrun_reported: false,
	});
	debug!("dot {} leaving {} for {}", particle.id.0, from.id, to.id);
	Ok(true)
}

/// Outcome of advancing a dot's flight by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitStep {
	/// The dot is not flying.
	Idle,
	/// Still on the way.
	InFlight,
	/// Landed and re-homed.
	Arrived,
	/// The flight could not be resolved and was dropped.
	Aborted,
}

/// Advance a flying dot: warn on overrun, finalize on arrival.
///
/// Finalizing moves one unit of population from origin to destination,
/// re-homes the dot and restarts its orbit with a fly-out from the new hub's
/// center. An unresolvable hub aborts the flight and leaves the dot orbiting
/// its old home with populations untouched.
pub fn step_transit(
	particle: &mut Particle,
	graph: &mut HubGraph,
	now: f64,
	config: &SimulationConfig,
	rng: &mut impl Rng,
) -> TransitStep {
	let ParticleState::Transiting(transit) = &mut particle.state else {
		return TransitStep::Idle;
	};

	if transit.is_overrun(now) && !transit.overrun_reported {
		warn!(
			"dot {} has been in transit for {:.0}ms (configured {:.0}ms); is the frame driver stalled?",
			particle.id.0,
			now - transit.start,
			transit.duration
		);
		transit.overrun_reported = true;
	}

	if transit.progress(now) < 1.0 {
		return TransitStep::InFlight;
	}

	let (old_pos, new_pos) = (transit.old_pos, transit.new_pos);
	let destination = transit.destination.clone();
	match graph.transfer_population(&particle.home, &destination) {
		Ok(()) => {
			debug!("dot {} arrived at {}", particle.id.0, destination);
			particle.home = destination;
			particle.orbit.arrive(old_pos, new_pos, now, config, rng);
			particle.state = ParticleState::Orbiting;
			TransitStep::Arrived
		}
		Err(e) => {
			warn!("dropping migration of dot {}: {e}", particle.id.0);
			particle.state = ParticleState::Orbiting;
			TransitStep::Aborted
		}
	}
}
