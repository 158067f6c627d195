//! Tunable constants of the simulation.
//!
//! All durations are in milliseconds, all distances in world units.

use serde::Deserialize;

/// Every knob of the simulation. `Default` reproduces the community layout's
/// look and feel; `#[serde(default)]` lets a partial document override it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Seed of the instance RNG.
	pub seed: u64,

	/// Time a freshly spawned dot takes to fade in.
	pub fade_duration: f64,
	/// Opacity of a fully faded-in dot.
	pub steady_opacity: f64,

	/// Smallest resting orbit radius.
	pub orbit_distance_min: f64,
	/// Largest resting orbit radius.
	pub orbit_distance_max: f64,
	/// Radius a spawned dot flies in from.
	pub fly_in_distance: f64,
	/// Length of the spawn fly-in.
	pub fly_in_duration: f64,
	/// Length of the fly-out after arriving at a new hub.
	pub arrival_flight_duration: f64,
	/// Angular speed of the slowest dot, radians per millisecond.
	pub angular_speed_base: f64,
	/// Extra angular speed per speed class.
	pub angular_speed_step: f64,
	/// Number of speed classes dots cycle through.
	pub angular_speed_classes: u32,
	/// Smallest radial drift.
	pub drift_amplitude_min: f64,
	/// Largest radial drift.
	pub drift_amplitude_max: f64,
	/// Slowest drift frequency, radians per millisecond.
	pub drift_speed_min: f64,
	/// Fastest drift frequency.
	pub drift_speed_max: f64,

	/// Chance that an orbiting dot starts migrating during one reference frame.
	pub migration_chance: f64,
	/// Length of the frame `migration_chance` is expressed against.
	pub reference_frame: f64,
	/// Longest frame gap that still counts towards migration odds.
	pub max_migration_step: f64,
	/// Probability of preferring a graph neighbor as destination.
	pub neighbor_bias: f64,
	/// Duration of the straight flight between hubs.
	pub transit_duration: f64,

	/// Period of the pulse progress timer.
	pub pulse_tick: f64,
	/// Batch interval at the reference population.
	pub batch_interval_base: f64,
	/// Interval shaved off per dot of average hub population.
	pub batch_interval_step: f64,
	/// Floor of the population-scaled interval.
	pub batch_interval_min: f64,
	/// Interval used once the medium tier is crossed.
	pub batch_interval_medium: f64,
	/// Interval used once the large tier is crossed.
	pub batch_interval_large: f64,
	/// Population above which the large interval applies.
	pub batch_large_tier: u32,
	/// Global multiplier applied to the batch interval.
	pub batch_interval_scale: f64,
	/// Up to this total population every non-origin edge pulses.
	pub small_population: u32,
	/// Up to this total population `medium_edge_cap` edges pulse.
	pub medium_population: u32,
	/// Non-origin edges per batch in the medium tier.
	pub medium_edge_cap: usize,
	/// Non-origin edges per batch above the medium tier.
	pub large_edge_cap: usize,

	/// Hub population the pulse curves are centered on.
	pub reference_population: f64,
	/// Pulse travel time at the reference population.
	pub pulse_duration_base: f64,
	/// Travel time removed per extra dot at the source.
	pub pulse_duration_step: f64,
	/// Fastest pulse travel time.
	pub pulse_duration_min: f64,
	/// Global multiplier applied to pulse travel time.
	pub pulse_duration_scale: f64,
	/// Thickness bonus at the reference population.
	pub pulse_thickness_bonus: f64,
	/// Source dots per extra unit of thickness.
	pub pulse_thickness_per: f64,
	/// Largest thickness bonus.
	pub pulse_thickness_max_bonus: f64,
	/// Share of the edge covered by the traveling chunk at the reference population.
	pub segment_share_base: f64,
	/// Share added per extra dot at the source.
	pub segment_share_step: f64,
	/// Smallest chunk share.
	pub segment_share_min: f64,
	/// Largest chunk share.
	pub segment_share_max: f64,

	/// Lifetime of an impact expansion.
	pub expansion_duration: f64,
	/// Fraction of the lifetime spent growing.
	pub expansion_growth_ratio: f64,
	/// Scale an expansion starts and ends at.
	pub expansion_start_scale: f64,
	/// Peak scale for a thickness-1 pulse.
	pub expansion_base_scale: f64,
	/// Opacity at the moment of impact.
	pub expansion_opacity: f64,

	/// Thickness added per strengthen interaction.
	pub strengthen_step: f64,
	/// Lifetime of the celebratory message.
	pub celebration_lifetime: f64,

	/// Upper bound of one batched dot request.
	pub max_dots_per_request: u32,
	/// Dots per batch when a request targets a single hub.
	pub single_hub_batch: u32,
	/// Dots per hub per batch when a request targets every hub.
	pub all_hubs_batch: u32,
	/// Delay between consecutive batches.
	pub batch_delay: f64,
	/// Extra delay per hub when a request targets every hub.
	pub hub_stagger: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			seed: 0x5EED,

			fade_duration: 200.0,
			steady_opacity: 0.7,

			orbit_distance_min: 50.0,
			orbit_distance_max: 100.0,
			fly_in_distance: 500.0,
			fly_in_duration: 1000.0,
			arrival_flight_duration: 1000.0,
			angular_speed_base: 0.0005,
			angular_speed_step: 0.0002,
			angular_speed_classes: 5,
			drift_amplitude_min: 10.0,
			drift_amplitude_max: 40.0,
			drift_speed_min: 0.001,
			drift_speed_max: 0.003,

			migration_chance: 0.0005,
			reference_frame: 1000.0 / 60.0,
			max_migration_step: 250.0,
			neighbor_bias: 0.7,
			transit_duration: 2000.0,

			pulse_tick: 50.0,
			batch_interval_base: 2000.0,
			batch_interval_step: 60.0,
			batch_interval_min: 800.0,
			batch_interval_medium: 2500.0,
			batch_interval_large: 3000.0,
			batch_large_tier: 150,
			batch_interval_scale: 1.5,
			small_population: 50,
			medium_population: 100,
			medium_edge_cap: 6,
			large_edge_cap: 3,

			reference_population: 10.0,
			pulse_duration_base: 3000.0,
			pulse_duration_step: 75.0,
			pulse_duration_min: 1500.0,
			pulse_duration_scale: 1.5,
			pulse_thickness_bonus: 2.0,
			pulse_thickness_per: 4.0,
			pulse_thickness_max_bonus: 5.0,
			segment_share_base: 0.15,
			segment_share_step: 0.01,
			segment_share_min: 0.05,
			segment_share_max: 0.35,

			expansion_duration: 1000.0,
			expansion_growth_ratio: 0.3,
			expansion_start_scale: 0.5,
			expansion_base_scale: 1.5,
			expansion_opacity: 0.7,

			strengthen_step: 0.5,
			celebration_lifetime: 2000.0,

			max_dots_per_request: 20,
			single_hub_batch: 5,
			all_hubs_batch: 3,
			batch_delay: 500.0,
			hub_stagger: 300.0,
		}
	}
}

impl SimulationConfig {
	/// Parse a (possibly partial) JSON override of the defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}
