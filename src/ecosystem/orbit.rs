//! Orbit math: where a dot sits around its hub and how visible it is.

use std::f64::consts::TAU;

use rand::Rng;

use super::config::SimulationConfig;
use super::types::Point;

/// Cubic ease-out: fast start, gentle landing.
pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Spin direction around the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	/// Counter-clockwise in world space.
	Forward,
	/// Clockwise in world space.
	Reverse,
}

impl Direction {
	/// `+1` or `-1`.
	pub const fn sign(self) -> f64 {
		match self {
			Direction::Forward => 1.0,
			Direction::Reverse => -1.0,
		}
	}
}

/// Radial easing applied shortly after a dot arrives at a hub.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightIn {
	/// Radius the flight starts from.
	pub initial_distance: f64,
	/// How long the flight lasts.
	pub duration: f64,
}

/// Per-dot orbit parameters around its current home hub.
#[derive(Clone, Debug, PartialEq)]
pub struct Orbit {
	/// Resting radius.
	pub distance: f64,
	/// Radians per millisecond.
	pub angular_speed: f64,
	/// Angle at arrival.
	pub phase: f64,
	/// Spin direction.
	pub direction: Direction,
	/// Radial wobble amplitude.
	pub drift_amplitude: f64,
	/// Radial wobble frequency, radians per millisecond.
	pub drift_speed: f64,
	/// Fly-in easing, if the dot is (or was recently) flying in.
	pub flight_in: Option<FlightIn>,
	/// When the dot started orbiting its current hub.
	pub arrival_time: f64,
}

impl Orbit {
	/// Parameters for the `index`-th dot of a hub that will hold `of` dots.
	///
	/// Speed class, direction and phase derive from the index so that a hub's
	/// dots fan out evenly; radius and drift are random.
	pub fn spawn(
		index: u32,
		of: u32,
		now: f64,
		config: &SimulationConfig,
		rng: &mut impl Rng,
	) -> Self {
		let class = index % config.angular_speed_classes.max(1);
		Self {
			distance: random_between(rng, config.orbit_distance_min, config.orbit_distance_max),
			angular_speed: config.angular_speed_base + f64::from(class) * config.angular_speed_step,
			phase: f64::from(index) / f64::from(of.max(1)) * TAU,
			direction: if index % 2 == 0 {
				Direction::Forward
			} else {
				Direction::Reverse
			},
			drift_amplitude: random_between(
				rng,
				config.drift_amplitude_min,
				config.drift_amplitude_max,
			),
			drift_speed: random_between(rng, config.drift_speed_min, config.drift_speed_max),
			flight_in: Some(FlightIn {
				initial_distance: config.fly_in_distance,
				duration: config.fly_in_duration,
			}),
			arrival_time: now,
		}
	}

	/// Re-home this orbit after a migration that ended at the new hub's center.
	///
	/// The flight starts at radius zero, which is exactly where the transit
	/// left the dot, and heads out along the direction of travel.
	pub fn arrive(
		&mut self,
		travelled_from: Point,
		arrived_at: Point,
		now: f64,
		config: &SimulationConfig,
		rng: &mut impl Rng,
	) {
		self.distance = random_between(rng, config.orbit_distance_min, config.orbit_distance_max);
		self.phase = if travelled_from == arrived_at {
			self.phase
		} else {
			travelled_from.angle_to(arrived_at)
		};
		self.flight_in = Some(FlightIn {
			initial_distance: 0.0,
			duration: config.arrival_flight_duration,
		});
		self.arrival_time = now;
	}

	/// Time spent orbiting the current hub.
	pub fn elapsed_since_arrival(&self, now: f64) -> f64 {
		(now - self.arrival_time).max(0.0)
	}
}

fn random_between(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
	if max > min {
		rng.random_range(min..max)
	} else {
		min
	}
}

/// Position of a dot orbiting `center`, `elapsed` milliseconds after arrival.
pub fn compute_orbit_position(center: Point, orbit: &Orbit, elapsed: f64) -> Point {
	let eased_distance = match orbit.flight_in {
		Some(flight) if elapsed < flight.duration && flight.duration > 0.0 => {
			let e = ease_out_cubic(elapsed / flight.duration);
			flight.initial_distance + (orbit.distance - flight.initial_distance) * e
		}
		_ => orbit.distance,
	};
	let drift = orbit.drift_amplitude * (orbit.drift_speed * elapsed).sin();
	let actual_distance = eased_distance + drift;
	let angle = elapsed * orbit.angular_speed * orbit.direction.sign() + orbit.phase;
	Point::new(
		center.x + angle.cos() * actual_distance,
		center.y + angle.sin() * actual_distance,
	)
}

/// Linear fade-in from 0 to `steady` over `fade_duration` after `spawn_time`.
pub fn compute_fade_opacity(spawn_time: f64, now: f64, fade_duration: f64, steady: f64) -> f64 {
	if fade_duration <= 0.0 {
		return steady;
	}
	let t = ((now - spawn_time) / fade_duration).clamp(0.0, 1.0);
	steady * t
}
