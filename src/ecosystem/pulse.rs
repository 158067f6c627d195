//! Pulses: short chunks of light that travel along edges.
//!
//! Batches are spawned on an adaptive timer, progress is advanced on a fixed
//! one, and a pulse impacts its destination exactly once, when the leading
//! edge of its chunk reaches the far hub.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::config::SimulationConfig;
use super::graph::HubGraph;
use super::types::{Edge, Hub, HubId, Point, Rgb};

/// Identifier of a pulse, unique within one simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PulseId(pub u64);

/// A chunk traveling along one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
	/// Identifier.
	pub id: PulseId,
	/// Index of the edge it travels along.
	pub edge: usize,
	/// Hub it left.
	pub source: HubId,
	/// Hub it is heading to.
	pub destination: HubId,
	/// Fraction of the trip done, in `[0, 1]`.
	pub progress: f64,
	/// Color, taken from the source hub.
	pub color: Rgb,
	/// Line weight.
	pub thickness: f64,
	/// Time to go from `progress = 0` to `progress = 1`.
	pub duration: f64,
	/// Source population at spawn; sizes the traveling chunk.
	pub source_population: u32,
	/// Whether the impact has fired.
	pub has_impacted: bool,
	/// Set once its lifetime timer fired; the pulse goes away at `progress = 1`.
	pub expired: bool,
	last_advance: f64,
}

impl Pulse {
	/// A pulse leaving `source` along edge `index` at `now`. Its duration,
	/// weight and chunk size follow the source's current population.
	pub fn spawn(
		id: PulseId,
		index: usize,
		edge: &Edge,
		source: &Hub,
		now: f64,
		config: &SimulationConfig,
	) -> Self {
		let population = source.population;
		Self {
			id,
			edge: index,
			source: source.id.clone(),
			destination: edge.target.clone(),
			progress: 0.0,
			color: source.color,
			thickness: edge.thickness + thickness_bonus(population, config),
			duration: pulse_duration(population, config),
			source_population: population,
			has_impacted: false,
			expired: false,
			last_advance: now,
		}
	}

	/// Advance progress by the time elapsed since the previous advance, scaled
	/// so the pulse covers the whole edge in `duration` whatever the timer
	/// period. Never decreases and saturates at 1.
	pub fn advance_to(&mut self, now: f64) {
		let elapsed = (now - self.last_advance).max(0.0);
		self.last_advance = self.last_advance.max(now);
		let step = if self.duration > 0.0 {
			elapsed / self.duration
		} else {
			1.0
		};
		self.progress = (self.progress + step).min(1.0);
	}

	/// Whether the pulse can be dropped.
	pub fn is_done(&self) -> bool {
		self.expired && self.progress >= 1.0
	}

	/// Fire the impact if the chunk's leading edge has reached `to`.
	///
	/// Returns `true` at most once per pulse. Zero-length edges never impact.
	pub fn take_impact(&mut self, from: Point, to: Point, config: &SimulationConfig) -> bool {
		if self.has_impacted {
			return false;
		}
		let Some(chunk) = Chunk::along(self, from, to, config) else {
			return false;
		};
		if chunk.end >= chunk.line_length {
			self.has_impacted = true;
			return true;
		}
		false
	}

	/// Stroke weight of the main segment; swells as the pulse travels.
	pub fn stroke_thickness(&self) -> f64 {
		self.thickness * 1.2 * (0.5 + 0.5 * self.progress)
	}
}

/// The part of an edge a pulse currently lights up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisibleSegment {
	/// Nothing to draw.
	Hidden,
	/// Draw a stroke from `start` to `end`.
	Visible {
		/// Trailing end.
		start: Point,
		/// Leading end.
		end: Point,
	},
}

impl VisibleSegment {
	/// Whether there is anything to draw.
	pub fn is_valid(&self) -> bool {
		matches!(self, VisibleSegment::Visible { .. })
	}
}

struct Chunk {
	line_length: f64,
	start: f64,
	end: f64,
}

impl Chunk {
	/// Chunk extent along the edge, in world units from `from`.
	fn along(pulse: &Pulse, from: Point, to: Point, config: &SimulationConfig) -> Option<Chunk> {
		let line_length = from.distance(to);
		if line_length <= 0.0 {
			return None;
		}
		let segment_length = line_length * segment_share(pulse.source_population, config);
		let travelled = pulse.progress * (line_length + segment_length);
		Some(Chunk {
			line_length,
			start: (travelled - segment_length).max(0.0),
			end: travelled.min(line_length),
		})
	}
}

/// Part of the edge a pulse lights up at its current progress.
///
/// Progress is mapped onto `edge length + chunk length` so the chunk slides
/// fully onto the edge and then fully off it.
pub fn compute_visible_segment(pulse: &Pulse, from: Point, to: Point, config: &SimulationConfig) -> VisibleSegment {
	let Some(chunk) = Chunk::along(pulse, from, to, config) else {
		return VisibleSegment::Hidden;
	};
	if chunk.start >= chunk.line_length || chunk.end <= 0.0 {
		return VisibleSegment::Hidden;
	}
	VisibleSegment::Visible {
		start: from.lerp(to, chunk.start / chunk.line_length),
		end: from.lerp(to, chunk.end / chunk.line_length),
	}
}

fn population_offset(population: u32, config: &SimulationConfig) -> f64 {
	f64::from(population) - config.reference_population
}

/// Share of the edge covered by the chunk; grows with the source population.
pub fn segment_share(source_population: u32, config: &SimulationConfig) -> f64 {
	(config.segment_share_base + population_offset(source_population, config) * config.segment_share_step)
		.clamp(config.segment_share_min, config.segment_share_max)
}

/// Travel time of a pulse; busier sources send faster pulses.
pub fn pulse_duration(source_population: u32, config: &SimulationConfig) -> f64 {
	let base = config.pulse_duration_base - population_offset(source_population, config) * config.pulse_duration_step;
	base.max(config.pulse_duration_min) * config.pulse_duration_scale
}

/// Extra line weight of a pulse; busier sources send thicker pulses.
pub fn thickness_bonus(source_population: u32, config: &SimulationConfig) -> f64 {
	let steps = if config.pulse_thickness_per > 0.0 {
		(population_offset(source_population, config) / config.pulse_thickness_per).floor()
	} else {
		0.0
	};
	(config.pulse_thickness_bonus + steps).clamp(0.0, config.pulse_thickness_max_bonus)
}

/// Delay until the next batch.
///
/// Shrinks as the average hub fills up, down to a floor, then steps back up
/// once the total population crosses the medium and large tiers.
pub fn batch_interval(graph: &HubGraph, config: &SimulationConfig) -> f64 {
	let total = graph.total_population();
	let average = graph.average_population();
	let mut interval = (config.batch_interval_base
		- (average - config.reference_population) * config.batch_interval_step)
		.max(config.batch_interval_min);
	if total > config.medium_population {
		interval = config.batch_interval_medium;
	}
	if total > config.batch_large_tier {
		interval = config.batch_interval_large;
	}
	interval * config.batch_interval_scale
}

/// Edge indices that pulse in the next batch.
///
/// Edges leaving the origin hub always pulse. The rest are sampled without
/// replacement, capped by how crowded the ecosystem is.
pub fn select_batch_edges(graph: &HubGraph, config: &SimulationConfig, rng: &mut impl Rng) -> Vec<usize> {
	let (origin_edges, others): (Vec<usize>, Vec<usize>) = (0..graph.edges().len())
		.partition(|&i| graph.edge(i).is_some_and(|edge| &edge.source == graph.origin()));

	let total = graph.total_population();
	let cap = if total <= config.small_population {
		others.len()
	} else if total <= config.medium_population {
		config.medium_edge_cap
	} else {
		config.large_edge_cap
	};

	let mut selected = origin_edges;
	selected.extend(others.choose_multiple(rng, cap).copied());
	selected
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::ecosystem::definition::EcosystemDefinition;
	use crate::ecosystem::types::EdgeCategory;

	fn pulse(population: u32, progress: f64) -> Pulse {
		let source = Hub {
			id: "a".into(),
			display_name: "A".to_owned(),
			position: Point::new(0.0, 0.0),
			color: Rgb::new(255, 0, 0),
			population,
		};
		let edge = Edge {
			source: "a".into(),
			target: "b".into(),
			category: EdgeCategory::Inspire,
			label: String::new(),
			thickness: 1.0,
		};
		let mut p = Pulse::spawn(PulseId(1), 0, &edge, &source, 0.0, &SimulationConfig::default());
		p.duration = 1000.0;
		p.thickness = 3.0;
		p.progress = progress;
		p
	}

	#[test]
	fn spawn_sizes_the_pulse_from_its_source() {
		let source = Hub {
			id: "a".into(),
			display_name: "A".to_owned(),
			position: Point::new(0.0, 0.0),
			color: Rgb::new(0, 128, 255),
			population: 18,
		};
		let edge = Edge {
			source: "a".into(),
			target: "b".into(),
			category: EdgeCategory::Equip,
			label: String::new(),
			thickness: 1.5,
		};
		let config = SimulationConfig::default();
		let p = Pulse::spawn(PulseId(7), 4, &edge, &source, 250.0, &config);
		assert_eq!(p.edge, 4);
		assert_eq!(p.destination, HubId::from("b"));
		assert_eq!(p.color, source.color);
		assert_eq!(p.source_population, 18);
		assert!((p.thickness - (1.5 + 4.0)).abs() < 1e-12);
		assert!((p.duration - 1.5 * 2400.0).abs() < 1e-9);
		assert_eq!(p.progress, 0.0);
		assert!(!p.has_impacted && !p.expired);
	}

	#[test]
	fn progress_is_monotonic_and_saturates() {
		let mut p = pulse(10, 0.0);
		let mut last = 0.0;
		for now in (0..15).map(|i| f64::from(i) * 50.0) {
			p.advance_to(now);
			assert!(p.progress >= last);
			last = p.progress;
		}
		assert!((p.progress - 0.7).abs() < 1e-9);
		p.advance_to(5000.0);
		assert_eq!(p.progress, 1.0);
		p.advance_to(100.0);
		assert_eq!(p.progress, 1.0);
	}

	#[test]
	fn progress_rate_ignores_timer_period() {
		let mut coarse = pulse(10, 0.0);
		let mut fine = pulse(10, 0.0);
		coarse.advance_to(400.0);
		for i in 1..=40 {
			fine.advance_to(f64::from(i) * 10.0);
		}
		assert!((coarse.progress - 0.4).abs() < 1e-9);
		assert!((fine.progress - 0.4).abs() < 1e-9);
	}

	#[test]
	fn chunk_enters_then_leaves() {
		let config = SimulationConfig::default();
		let (from, to) = (Point::new(0.0, 0.0), Point::new(100.0, 0.0));

		assert_eq!(compute_visible_segment(&pulse(10, 0.0), from, to, &config), VisibleSegment::Hidden);

		let VisibleSegment::Visible { start, end } = compute_visible_segment(&pulse(10, 0.1), from, to, &config) else {
			panic!("chunk should be entering");
		};
		assert_eq!(start, from);
		assert!((end.x - 11.5).abs() < 1e-9);

		let VisibleSegment::Visible { start, end } = compute_visible_segment(&pulse(10, 0.5), from, to, &config) else {
			panic!("chunk should be mid-edge");
		};
		assert!((start.x - 42.5).abs() < 1e-9);
		assert!((end.x - 57.5).abs() < 1e-9);

		assert_eq!(compute_visible_segment(&pulse(10, 1.0), from, to, &config), VisibleSegment::Hidden);
	}

	#[test]
	fn impact_fires_once_when_leading_edge_arrives() {
		let config = SimulationConfig::default();
		let (from, to) = (Point::new(0.0, 0.0), Point::new(100.0, 0.0));
		let mut p = pulse(10, 0.8);
		assert!(!p.take_impact(from, to, &config));
		p.progress = 0.9;
		assert!(p.take_impact(from, to, &config));
		assert!(p.has_impacted);
		assert!(!p.take_impact(from, to, &config));
		p.progress = 1.0;
		assert!(!p.take_impact(from, to, &config));
	}

	#[test]
	fn impact_is_not_missed_when_progress_jumps_to_the_end() {
		let config = SimulationConfig::default();
		let mut p = pulse(10, 1.0);
		assert!(p.take_impact(Point::new(0.0, 0.0), Point::new(0.0, 50.0), &config));
	}

	#[test]
	fn zero_length_edges_stay_dark() {
		let config = SimulationConfig::default();
		let here = Point::new(5.0, 5.0);
		for progress in [0.0, 0.3, 0.87, 1.0] {
			let mut p = pulse(10, progress);
			assert!(!compute_visible_segment(&p, here, here, &config).is_valid());
			assert!(!p.take_impact(here, here, &config));
		}
	}

	#[test]
	fn population_curves() {
		let config = SimulationConfig::default();
		assert_eq!(pulse_duration(10, &config), 4500.0);
		assert_eq!(pulse_duration(14, &config), 4050.0);
		assert_eq!(pulse_duration(100, &config), 2250.0);
		assert!(pulse_duration(20, &config) < pulse_duration(10, &config));

		assert_eq!(thickness_bonus(10, &config), 2.0);
		assert_eq!(thickness_bonus(13, &config), 2.0);
		assert_eq!(thickness_bonus(14, &config), 3.0);
		assert_eq!(thickness_bonus(200, &config), 5.0);
		assert_eq!(thickness_bonus(0, &config), 0.0);

		assert!((segment_share(10, &config) - 0.15).abs() < 1e-12);
		assert!((segment_share(15, &config) - 0.20).abs() < 1e-12);
		assert_eq!(segment_share(100, &config), 0.35);
		assert!((segment_share(0, &config) - 0.05).abs() < 1e-12);
	}

	fn community(population_per_hub: u32) -> HubGraph {
		let mut graph = EcosystemDefinition::community()
			.and_then(|def| HubGraph::from_definition(&def))
			.unwrap_or_else(|e| panic!("{e}"));
		let ids: Vec<HubId> = graph.hubs().iter().map(|h| h.id.clone()).collect();
		for id in ids {
			if let Some(hub) = graph.hub_mut(&id) {
				hub.population = population_per_hub;
			}
		}
		graph
	}

	#[test]
	fn batch_interval_tiers() {
		let config = SimulationConfig::default();
		assert_eq!(batch_interval(&community(10), &config), 3000.0);
		assert_eq!(batch_interval(&community(15), &config), 2550.0);
		assert_eq!(batch_interval(&community(16), &config), 2460.0);
		assert_eq!(batch_interval(&community(17), &config), 3750.0);
		assert_eq!(batch_interval(&community(30), &config), 4500.0);
	}

	#[test]
	fn batches_always_include_origin_edges_and_cap_the_rest() {
		let config = SimulationConfig::default();
		let mut rng = SmallRng::seed_from_u64(9);

		for (per_hub, expected_rest) in [(5, 5), (10, 5), (17, 3)] {
			let graph = community(per_hub);
			for _ in 0..20 {
				let batch = select_batch_edges(&graph, &config, &mut rng);
				let from_origin = batch
					.iter()
					.filter(|&&i| graph.edge(i).is_some_and(|e| &e.source == graph.origin()))
					.count();
				assert_eq!(from_origin, 5);
				assert_eq!(batch.len() - from_origin, expected_rest);
				let mut unique = batch.clone();
				unique.sort_unstable();
				unique.dedup();
				assert_eq!(unique.len(), batch.len());
			}
		}
	}
}
