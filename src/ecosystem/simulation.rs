//! One running ecosystem: owns every hub, dot, pulse, ring and timer, and
//! moves them forward from [`Simulation::tick`].

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::config::SimulationConfig;
use super::definition::EcosystemDefinition;
use super::effect::{EffectId, ExpansionEffect};
use super::error::SimError;
use super::graph::HubGraph;
use super::orbit::Orbit;
use super::particle::{
	Particle, ParticleId, ParticleState, TransitStep, begin_transit, choose_destination, migration_chance,
	step_transit,
};
use super::pulse::{
	Pulse, PulseId, VisibleSegment, batch_interval, compute_visible_segment, select_batch_edges,
};
use super::scheduler::{CelebrationId, Scheduler, Task, TimerId};
use super::snapshot::{
	CelebrationView, EdgeView, EffectView, HubView, PULSE_GLOW_OPACITY, PULSE_GLOW_SCALE, PULSE_OPACITY,
	ParticleView, PeopleCounter, PulseView, Snapshot,
};
use super::types::{Edge, Hub, HubId, Point};

/// A short message shown where an edge was strengthened.
#[derive(Clone, Debug, PartialEq)]
pub struct Celebration {
	/// Identifier.
	pub id: CelebrationId,
	/// Message text.
	pub text: String,
	/// Midpoint of the strengthened edge.
	pub anchor: Point,
	/// When the message should disappear.
	pub expires_at: f64,
}

/// Where a batched dot request goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DotTarget {
	/// Spread over every hub.
	All,
	/// A single hub.
	Hub(HubId),
}

/// Running totals, mostly useful for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationStats {
	/// Pulses created so far.
	pub pulses_spawned: u64,
	/// Impacts fired so far.
	pub impacts: u64,
	/// Migrations that landed.
	pub migrations: u64,
	/// Migrations dropped because a hub did not resolve.
	pub aborted_migrations: u64,
}

/// An ecosystem simulation instance.
///
/// Single-threaded: the host calls [`tick`](Self::tick) once per frame and the
/// interaction methods from its event handlers, never concurrently. Pulse
/// spawning, pulse progress and every expiry run off the instance's own
/// [`Scheduler`], polled from `tick`.
pub struct Simulation {
	config: SimulationConfig,
	graph: HubGraph,
	particles: BTreeMap<ParticleId, Particle>,
	pulses: Vec<Pulse>,
	effects: Vec<ExpansionEffect>,
	celebrations: Vec<Celebration>,
	scheduler: Scheduler,
	rng: SmallRng,
	next_id: u64,
	last_tick: Option<f64>,
	spawn_timer: Option<TimerId>,
	advance_timer: Option<TimerId>,
	stats: SimulationStats,
	snapshot: Snapshot,
	disposed: bool,
}

fn bump(counter: &mut u64) -> u64 {
	let id = *counter;
	*counter += 1;
	id
}

impl Simulation {
	/// Build a simulation from a definition, spawning each hub's initial dots
	/// at `now` and arming the pulse timers.
	pub fn new(definition: &EcosystemDefinition, config: SimulationConfig, now: f64) -> Result<Self, SimError> {
		let graph = HubGraph::from_definition(definition)?;
		let rng = SmallRng::seed_from_u64(config.seed);
		let mut sim = Self {
			config,
			graph,
			particles: BTreeMap::new(),
			pulses: Vec::new(),
			effects: Vec::new(),
			celebrations: Vec::new(),
			scheduler: Scheduler::new(),
			rng,
			next_id: 0,
			last_tick: None,
			spawn_timer: None,
			advance_timer: None,
			stats: SimulationStats::default(),
			snapshot: Snapshot::default(),
			disposed: false,
		};

		for hub in &definition.hubs {
			for index in 0..hub.dots {
				sim.spawn_particle(&hub.id, index, hub.dots, now)?;
			}
		}

		let tick = sim.config.pulse_tick;
		sim.spawn_timer = Some(sim.scheduler.once(now, Task::SpawnPulses));
		sim.advance_timer = Some(sim.scheduler.every(now + tick, tick, Task::AdvancePulses));
		sim.snapshot = sim.build_snapshot(now);

		info!(
			"ecosystem started: {} hubs, {} edges, {} dots",
			sim.graph.hubs().len(),
			sim.graph.edges().len(),
			sim.particles.len()
		);
		Ok(sim)
	}

	fn spawn_particle(&mut self, hub_id: &HubId, index: u32, of: u32, now: f64) -> Result<ParticleId, SimError> {
		let Some(hub) = self.graph.hub_mut(hub_id) else {
			return Err(SimError::UnknownHub(hub_id.clone()));
		};
		hub.population += 1;
		let id = ParticleId(bump(&mut self.next_id));
		let orbit = Orbit::spawn(index, of, now, &self.config, &mut self.rng);
		self.particles.insert(
			id,
			Particle {
				id,
				home: hub_id.clone(),
				orbit,
				spawn_time: now,
				state: ParticleState::Orbiting,
			},
		);
		Ok(id)
	}

	fn ensure_live(&self) -> Result<(), SimError> {
		if self.disposed {
			debug!("ignoring call on a disposed simulation");
			return Err(SimError::Disposed);
		}
		Ok(())
	}

	/// Spawn one dot at `hub_id`, flying in from afar.
	///
	/// The hub's population goes up immediately. Unknown hubs are logged and
	/// leave the simulation untouched.
	pub fn add_dot(&mut self, hub_id: &HubId, now: f64) -> Result<ParticleId, SimError> {
		self.ensure_live()?;
		let Some(hub) = self.graph.hub(hub_id) else {
			warn!("add_dot: unknown hub {hub_id}");
			return Err(SimError::UnknownHub(hub_id.clone()));
		};
		let index = hub.population;
		self.spawn_particle(hub_id, index, index + 1, now)
	}

	/// Queue `count` dots (clamped to `1..=max_dots_per_request`) for `target`,
	/// released in staggered batches. Returns the clamped count per hub.
	pub fn add_dots(&mut self, target: DotTarget, count: u32, now: f64) -> Result<u32, SimError> {
		self.ensure_live()?;
		let count = count.clamp(1, self.config.max_dots_per_request.max(1));
		match target {
			DotTarget::Hub(hub_id) => {
				if self.graph.hub(&hub_id).is_none() {
					warn!("add_dots: unknown hub {hub_id}");
					return Err(SimError::UnknownHub(hub_id));
				}
				let batch = self.config.single_hub_batch;
				self.schedule_dot_batches(hub_id, count, batch, now);
			}
			DotTarget::All => {
				let ids: Vec<HubId> = self.graph.hubs().iter().map(|hub| hub.id.clone()).collect();
				let batch = self.config.all_hubs_batch;
				for (i, hub_id) in ids.into_iter().enumerate() {
					let start = now + i as f64 * self.config.hub_stagger;
					self.schedule_dot_batches(hub_id, count, batch, start);
				}
			}
		}
		Ok(count)
	}

	fn schedule_dot_batches(&mut self, hub: HubId, count: u32, batch: u32, start: f64) {
		let batch = batch.max(1);
		let mut remaining = count;
		let mut due = start;
		while remaining > 0 {
			let size = remaining.min(batch);
			self.scheduler.once(
				due,
				Task::AddDots {
					hub: hub.clone(),
					count: size,
				},
			);
			remaining -= size;
			due += self.config.batch_delay;
		}
	}

	/// Thicken edge `index` and return a celebratory message anchored at its
	/// midpoint. The message also stays in the snapshot until it expires.
	pub fn strengthen_edge(&mut self, index: usize, now: f64) -> Result<Celebration, SimError> {
		self.ensure_live()?;
		let step = self.config.strengthen_step;
		let Some(edge) = self.graph.edge_mut(index) else {
			warn!("strengthen_edge: unknown edge {index}");
			return Err(SimError::UnknownEdge(index));
		};
		edge.thickness += step;
		let edge = edge.clone();

		let (from, to) = match (self.graph.hub(&edge.source), self.graph.hub(&edge.target)) {
			(Some(from), Some(to)) => (from.clone(), to.clone()),
			_ => return Err(SimError::UnknownEdge(index)),
		};
		let messages = [
			"Connection strengthened!".to_owned(),
			format!("{} → {}", from.display_name, to.display_name),
			"Relationship growing!".to_owned(),
			"Building bridges!".to_owned(),
			"Stronger together!".to_owned(),
		];
		let text = messages.choose(&mut self.rng).cloned().unwrap_or_default();

		let id = CelebrationId(bump(&mut self.next_id));
		let expires_at = now + self.config.celebration_lifetime;
		self.scheduler.once(expires_at, Task::ExpireCelebration(id));
		let celebration = Celebration {
			id,
			text,
			anchor: from.position.midpoint(to.position),
			expires_at,
		};
		self.celebrations.push(celebration.clone());
		debug!("edge {index} strengthened to {:.1}", edge.thickness);
		Ok(celebration)
	}

	/// Send dot `id` towards `destination` right away, bypassing the random
	/// trial. `Ok(false)` if it is already flying or `destination` is its home.
	pub fn begin_migration(&mut self, id: ParticleId, destination: &HubId, now: f64) -> Result<bool, SimError> {
		self.ensure_live()?;
		let Some(particle) = self.particles.get_mut(&id) else {
			warn!("begin_migration: unknown dot {}", id.0);
			return Err(SimError::UnknownParticle(id.0));
		};
		begin_transit(particle, destination, &self.graph, now, self.config.transit_duration)
			.inspect_err(|e| warn!("begin_migration: {e}"))
	}

	/// Advance everything to `now` and publish a fresh snapshot.
	///
	/// Due timers run first (pulse batches, pulse progress, expiries, queued
	/// dots), then every dot migrates or orbits, then pulse impacts fire. `now`
	/// must not go backwards.
	pub fn tick(&mut self, now: f64) {
		if self.disposed {
			return;
		}
		let elapsed = match self.last_tick {
			Some(last) => (now - last).max(0.0),
			None => self.config.reference_frame,
		};
		self.last_tick = Some(now);

		for task in self.scheduler.poll(now) {
			self.run(task, now);
		}
		self.step_particles(now, elapsed);
		self.collect_impacts(now);
		self.snapshot = self.build_snapshot(now);
	}

	fn run(&mut self, task: Task, now: f64) {
		match task {
			Task::SpawnPulses => {
				self.spawn_batch(now);
				let interval = batch_interval(&self.graph, &self.config);
				self.spawn_timer = Some(self.scheduler.once(now + interval, Task::SpawnPulses));
			}
			Task::AdvancePulses => {
				for pulse in &mut self.pulses {
					pulse.advance_to(now);
				}
				self.sweep_pulses(now);
			}
			Task::RetirePulse(id) => {
				if let Some(pulse) = self.pulses.iter_mut().find(|pulse| pulse.id == id) {
					pulse.expired = true;
				}
				self.sweep_pulses(now);
			}
			Task::RemoveEffect(id) => self.effects.retain(|effect| effect.id != id),
			Task::ExpireCelebration(id) => self.celebrations.retain(|c| c.id != id),
			Task::AddDots { hub, count } => {
				for _ in 0..count {
					if self.add_dot(&hub, now).is_err() {
						break;
					}
				}
			}
		}
	}

	fn spawn_batch(&mut self, now: f64) {
		let selected = select_batch_edges(&self.graph, &self.config, &mut self.rng);
		let mut spawned = 0;
		for index in selected {
			let Some(edge) = self.graph.edge(index) else {
				continue;
			};
			let Some(source) = self.graph.hub(&edge.source) else {
				warn!("edge {index} has an unresolvable source; skipping pulse");
				continue;
			};
			if self.graph.hub(&edge.target).is_none() {
				warn!("edge {index} has an unresolvable target; skipping pulse");
				continue;
			}
			let pulse = Pulse::spawn(PulseId(bump(&mut self.next_id)), index, edge, source, now, &self.config);
			self.scheduler.once(now + pulse.duration, Task::RetirePulse(pulse.id));
			self.pulses.push(pulse);
			spawned += 1;
		}
		self.stats.pulses_spawned += spawned;
		debug!("spawned {spawned} pulses, {} live", self.pulses.len());
	}

	fn step_particles(&mut self, now: f64, elapsed: f64) {
		let chance = migration_chance(elapsed, &self.config);
		let Self {
			particles,
			graph,
			rng,
			config,
			stats,
			..
		} = self;

		for particle in particles.values_mut() {
			match particle.state {
				ParticleState::Orbiting => {
					if rng.random::<f64>() >= chance {
						continue;
					}
					let Some(destination) = choose_destination(&particle.home, graph, config.neighbor_bias, rng)
					else {
						continue;
					};
					if let Err(e) = begin_transit(particle, &destination, graph, now, config.transit_duration) {
						warn!("dot {} could not start migrating: {e}", particle.id.0);
					}
				}
				ParticleState::Transiting(_) => match step_transit(particle, graph, now, config, rng) {
					TransitStep::Arrived => stats.migrations += 1,
					TransitStep::Aborted => stats.aborted_migrations += 1,
					TransitStep::Idle | TransitStep::InFlight => {}
				},
			}
		}
	}

	/// Drop finished pulses, firing any impact they reached first.
	fn sweep_pulses(&mut self, now: f64) {
		self.collect_impacts(now);
		self.pulses.retain(|pulse| !pulse.is_done());
	}

	fn collect_impacts(&mut self, now: f64) {
		for pulse in &mut self.pulses {
			let Some((from, to)) = self
				.graph
				.edge(pulse.edge)
				.and_then(|edge| self.graph.edge_endpoints(edge))
			else {
				continue;
			};
			if !pulse.take_impact(from, to, &self.config) {
				continue;
			}
			let effect = ExpansionEffect::new(
				EffectId(bump(&mut self.next_id)),
				pulse.destination.clone(),
				to,
				pulse.color,
				pulse.thickness,
				now,
				&self.config,
			);
			self.scheduler.once(now + effect.duration, Task::RemoveEffect(effect.id));
			self.effects.push(effect);
			self.stats.impacts += 1;
		}
	}

	fn build_snapshot(&self, now: f64) -> Snapshot {
		let hubs = self
			.graph
			.hubs()
			.iter()
			.map(|hub| HubView {
				id: hub.id.clone(),
				display_name: hub.display_name.clone(),
				position: hub.position,
				color: hub.color,
				population: hub.population,
			})
			.collect();

		let edges = self
			.graph
			.edges()
			.iter()
			.enumerate()
			.filter_map(|(index, edge)| {
				let (from, to) = self.graph.edge_endpoints(edge)?;
				Some(EdgeView {
					index,
					from,
					to,
					color: self.graph.hub(&edge.source)?.color,
					category: edge.category,
					thickness: edge.thickness,
				})
			})
			.collect();

		let particles = self
			.particles
			.values()
			.filter_map(|particle| {
				let visual = particle.visual(&self.graph, now, &self.config)?;
				Some(ParticleView {
					id: particle.id,
					position: visual.position,
					color: visual.color,
					opacity: visual.opacity,
				})
			})
			.collect();

		let pulses = self
			.pulses
			.iter()
			.filter_map(|pulse| {
				let edge = self.graph.edge(pulse.edge)?;
				let (from, to) = self.graph.edge_endpoints(edge)?;
				let VisibleSegment::Visible { start, end } = compute_visible_segment(pulse, from, to, &self.config)
				else {
					return None;
				};
				let thickness = pulse.stroke_thickness();
				Some(PulseView {
					id: pulse.id,
					start,
					end,
					color: pulse.color,
					thickness,
					opacity: PULSE_OPACITY,
					glow_thickness: thickness * PULSE_GLOW_SCALE,
					glow_opacity: PULSE_GLOW_OPACITY,
				})
			})
			.collect();

		let effects = self
			.effects
			.iter()
			.map(|effect| EffectView {
				position: effect.position,
				color: effect.source_color,
				scale: effect.scale(now),
				opacity: effect.opacity(now),
			})
			.collect();

		let celebrations = self
			.celebrations
			.iter()
			.map(|c| CelebrationView {
				id: c.id,
				text: c.text.clone(),
				position: c.anchor,
			})
			.collect();

		Snapshot {
			time: now,
			hubs,
			edges,
			particles,
			pulses,
			effects,
			celebrations,
			counter: self.counter(),
		}
	}

	/// Release every timer and transient object. Later calls are no-ops or
	/// return [`SimError::Disposed`].
	pub fn dispose(&mut self) {
		if self.disposed {
			return;
		}
		let released = self.scheduler.len();
		self.scheduler.cancel_all();
		self.spawn_timer = None;
		self.advance_timer = None;
		self.pulses.clear();
		self.effects.clear();
		self.celebrations.clear();
		self.disposed = true;
		info!("ecosystem disposed, released {released} timers");
	}

	/// Whether [`dispose`](Self::dispose) has been called.
	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	/// The snapshot published by the last tick.
	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	/// Creator and inspired headcounts.
	pub fn counter(&self) -> PeopleCounter {
		let creators = self
			.graph
			.hub(self.graph.origin())
			.map_or(0, |hub| hub.population);
		let inspired = self
			.graph
			.inspired_hubs()
			.into_iter()
			.filter_map(|id| self.graph.hub(id))
			.map(|hub| hub.population)
			.sum();
		PeopleCounter { creators, inspired }
	}

	/// Tunables this instance runs with.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Hubs in definition order.
	pub fn hubs(&self) -> &[Hub] {
		self.graph.hubs()
	}

	/// Look up a hub.
	pub fn hub(&self, id: &HubId) -> Option<&Hub> {
		self.graph.hub(id)
	}

	/// Edges in definition order.
	pub fn edges(&self) -> &[Edge] {
		self.graph.edges()
	}

	/// The hub graph.
	pub fn graph(&self) -> &HubGraph {
		&self.graph
	}

	/// Every dot, orbiting or flying.
	pub fn particles(&self) -> impl Iterator<Item = &Particle> {
		self.particles.values()
	}

	/// Look up a dot.
	pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
		self.particles.get(&id)
	}

	/// Live pulses.
	pub fn pulses(&self) -> &[Pulse] {
		&self.pulses
	}

	/// Live expansion rings.
	pub fn effects(&self) -> &[ExpansionEffect] {
		&self.effects
	}

	/// Celebratory messages that have not expired yet.
	pub fn celebrations(&self) -> &[Celebration] {
		&self.celebrations
	}

	/// Running totals.
	pub fn stats(&self) -> SimulationStats {
		self.stats
	}

	/// Number of timers still pending, pulse timers included.
	pub fn pending_timers(&self) -> usize {
		self.scheduler.len()
	}

	/// Whether the repeating pulse timers are armed.
	pub fn timers_armed(&self) -> bool {
		let armed = |id: Option<TimerId>| id.is_some_and(|id| self.scheduler.is_pending(id));
		armed(self.spawn_timer) && armed(self.advance_timer)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::ecosystem::types::EdgeCategory;

	const FRAME: f64 = 16.0;

	fn quiet() -> SimulationConfig {
		SimulationConfig {
			migration_chance: 0.0,
			..SimulationConfig::default()
		}
	}

	fn sim(json: &str, config: SimulationConfig) -> Simulation {
		EcosystemDefinition::from_json(json)
			.and_then(|def| Simulation::new(&def, config, 0.0))
			.unwrap_or_else(|e| panic!("fixture failed: {e}"))
	}

	fn community(config: SimulationConfig) -> Simulation {
		EcosystemDefinition::community()
			.and_then(|def| Simulation::new(&def, config, 0.0))
			.unwrap_or_else(|e| panic!("community failed: {e}"))
	}

	fn population(sim: &Simulation, id: &str) -> u32 {
		sim.hub(&id.into()).map_or(u32::MAX, |hub| hub.population)
	}

	fn assert_population_conserved(sim: &Simulation, expected_total: usize) {
		let mut homed: HashMap<&HubId, u32> = HashMap::new();
		for particle in sim.particles() {
			*homed.entry(&particle.home).or_default() += 1;
		}
		for hub in sim.hubs() {
			assert_eq!(
				hub.population,
				homed.get(&hub.id).copied().unwrap_or(0),
				"population of {} drifted",
				hub.id
			);
		}
		assert_eq!(sim.particles().count(), expected_total);
		assert_eq!(sim.graph().total_population() as usize, expected_total);
	}

	const PAIR: &str = r##"{
		"origin": "A",
		"hubs": [
			{ "id": "A", "name": "Alpha", "x": 0, "y": 0, "color": "#FF9800", "dots": 10 },
			{ "id": "B", "name": "Beta", "x": 200, "y": 0, "color": "#4285F4", "dots": 0 }
		],
		"edges": [{ "from": "A", "to": "B", "category": "inspire", "label": "Inform & inspire" }]
	}"##;

	const TRIO: &str = r##"{
		"origin": "A",
		"hubs": [
			{ "id": "A", "name": "Alpha", "x": 0, "y": 0, "color": "#FF9800", "dots": 3 },
			{ "id": "B", "name": "Beta", "x": 200, "y": 0, "color": "#4285F4", "dots": 3 },
			{ "id": "C", "name": "Gamma", "x": 0, "y": 200, "color": "#4CAF50", "dots": 3 }
		],
		"edges": [{ "from": "A", "to": "B", "category": "equip" }]
	}"##;

	#[test]
	fn community_starts_with_its_initial_dots() {
		let sim = community(SimulationConfig::default());
		assert_population_conserved(&sim, 62);
		assert_eq!(population(&sim, "artists"), 12);
		assert_eq!(sim.counter(), PeopleCounter { creators: 12, inspired: 50 });
		assert!(sim.timers_armed());
		assert_eq!(sim.snapshot().hubs.len(), 6);
		assert_eq!(sim.snapshot().particles.len(), 62);
		assert!(sim.snapshot().particles.iter().all(|p| p.opacity == 0.0));
	}

	#[test]
	fn every_pulse_reaching_its_destination_impacts_once() {
		let mut sim = sim(PAIR, quiet());
		let mut now = 0.0;
		while sim.stats().pulses_spawned < 50 {
			sim.tick(now);
			assert!(sim.effects().len() as u64 <= sim.stats().impacts);
			now += FRAME;
			assert!(now < 400_000.0, "batches stopped spawning");
		}
		// let the last batch land
		let end = now + 10_000.0;
		while now < end {
			sim.tick(now);
			now += FRAME;
		}
		let stats = sim.stats();
		let unimpacted = sim.pulses().iter().filter(|p| !p.has_impacted).count() as u64;
		assert!(stats.pulses_spawned >= 50);
		assert_eq!(stats.impacts + unimpacted, stats.pulses_spawned);
		assert!(stats.impacts >= 50);
		assert_population_conserved(&sim, 10);
	}

	#[test]
	fn add_dot_is_population_authoritative_and_fades_in() {
		let mut sim = sim(PAIR, quiet());
		sim.tick(0.0);
		let before = population(&sim, "A");
		let id = sim.add_dot(&"A".into(), 1000.0).unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(population(&sim, "A"), before + 1);
		assert_population_conserved(&sim, 11);

		let Some(particle) = sim.particle(id) else {
			panic!("new dot missing");
		};
		assert_eq!(particle.home, HubId::from("A"));
		assert_eq!(particle.opacity(1000.0, sim.config()), 0.0);
		assert!((particle.opacity(1200.0, sim.config()) - 0.7).abs() < 1e-12);

		sim.tick(1000.0);
		let view = sim.snapshot().particles.iter().find(|p| p.id == id).copied();
		assert_eq!(view.map(|v| v.opacity), Some(0.0));
		sim.tick(1200.0);
		let view = sim.snapshot().particles.iter().find(|p| p.id == id).copied();
		assert!(view.is_some_and(|v| (v.opacity - 0.7).abs() < 1e-12));
	}

	#[test]
	fn strengthening_an_edge_thickens_it_by_fixed_steps() {
		let mut sim = community(quiet());
		let step = sim.config().strengthen_step;
		for i in 0..3 {
			let celebration = sim
				.strengthen_edge(0, f64::from(i) * 100.0)
				.unwrap_or_else(|e| panic!("{e}"));
			assert!(!celebration.text.is_empty());
			assert_eq!(celebration.expires_at, f64::from(i) * 100.0 + 2000.0);
		}
		assert!((sim.edges()[0].thickness - (1.0 + 3.0 * step)).abs() < 1e-12);
		assert!(sim.edges()[1..].iter().all(|e| e.thickness == 1.0));

		sim.tick(300.0);
		assert_eq!(sim.snapshot().celebrations.len(), 3);
		sim.tick(2150.0);
		assert_eq!(sim.snapshot().celebrations.len(), 1);
		sim.tick(2300.0);
		assert!(sim.snapshot().celebrations.is_empty());
	}

	#[test]
	fn forced_migration_moves_exactly_one_unit() {
		let mut sim = sim(TRIO, quiet());
		sim.tick(0.0);
		let Some(id) = sim.particles().find(|p| p.home.as_str() == "A").map(|p| p.id) else {
			panic!("no dot at A");
		};
		assert_eq!(sim.graph().neighbors(&"A".into()).count(), 1);
		assert_eq!(sim.begin_migration(id, &"C".into(), 100.0).ok(), Some(true));

		sim.tick(1100.0);
		assert_eq!(population(&sim, "A"), 3);
		assert_eq!(population(&sim, "C"), 3);
		assert!(sim.particle(id).is_some_and(Particle::is_transiting));
		assert_population_conserved(&sim, 9);

		sim.tick(2100.0);
		assert_eq!(population(&sim, "A"), 2);
		assert_eq!(population(&sim, "C"), 4);
		assert_eq!(sim.particle(id).map(|p| p.home.clone()), Some("C".into()));
		assert_eq!(sim.stats().migrations, 1);
		assert_population_conserved(&sim, 9);

		let landed = sim.snapshot().particles.iter().find(|p| p.id == id).map(|p| p.position);
		assert!(landed.is_some_and(|p| p.distance(Point::new(0.0, 200.0)) < 1e-9));
	}

	#[test]
	fn stalled_frames_still_impact_before_the_pulse_is_dropped() {
		let mut sim = sim(PAIR, quiet());
		sim.tick(0.0);
		sim.tick(16.0);
		let Some(first) = sim.pulses().first().map(|p| (p.id, p.duration)) else {
			panic!("no pulse spawned");
		};
		assert_eq!(first.1, 4500.0);

		// one frame long after the pulse should have landed and retired
		sim.tick(6000.0);
		assert!(sim.pulses().iter().all(|p| p.id != first.0));
		assert_eq!(sim.stats().impacts, 1);
		assert_eq!(sim.effects().len(), 1);
		assert_eq!(sim.effects()[0].hub, HubId::from("B"));
		assert_eq!(sim.snapshot().effects.len(), 1);
	}

	#[test]
	fn self_loop_migrations_are_silent_no_ops() {
		let json = r##"{
			"origin": "A",
			"hubs": [
				{ "id": "A", "name": "Alpha", "x": 0, "y": 0, "color": "#FF9800", "dots": 4 },
				{ "id": "B", "name": "Beta", "x": 200, "y": 0, "color": "#4285F4", "dots": 0 }
			],
			"edges": [{ "from": "A", "to": "A", "category": "inspire" }]
		}"##;
		let mut sim = sim(
			json,
			SimulationConfig {
				migration_chance: 1.0,
				neighbor_bias: 1.0,
				..SimulationConfig::default()
			},
		);
		let mut now = 0.0;
		while now < 5000.0 {
			sim.tick(now);
			assert!(sim.particles().all(|p| !p.is_transiting() && p.home.as_str() == "A"));
			now += FRAME;
		}
		assert_eq!((population(&sim, "A"), population(&sim, "B")), (4, 0));
		assert_eq!(sim.stats().migrations, 0);
		assert_population_conserved(&sim, 4);
	}

	#[test]
	fn zero_length_edges_never_show_or_impact() {
		let json = PAIR.replace(r#""x": 200"#, r#""x": 0"#);
		let mut sim = sim(&json, quiet());
		let mut now = 0.0;
		while now < 30_000.0 {
			sim.tick(now);
			assert!(sim.snapshot().pulses.is_empty());
			assert!(sim.effects().is_empty());
			now += FRAME;
		}
		assert!(sim.stats().pulses_spawned > 0);
		assert_eq!(sim.stats().impacts, 0);
	}

	#[test]
	fn random_migration_conserves_population() {
		let mut sim = community(SimulationConfig {
			migration_chance: 0.01,
			seed: 1234,
			..SimulationConfig::default()
		});
		let mut now = 0.0;
		while now < 60_000.0 {
			sim.tick(now);
			assert_population_conserved(&sim, 62);
			now += FRAME;
		}
		assert!(sim.stats().migrations > 0);
		assert_eq!(sim.stats().aborted_migrations, 0);
	}

	#[test]
	fn pulse_progress_never_goes_backwards() {
		let mut sim = community(quiet());
		let mut seen: HashMap<PulseId, f64> = HashMap::new();
		let mut now = 0.0;
		while now < 20_000.0 {
			sim.tick(now);
			for pulse in sim.pulses() {
				let last = seen.insert(pulse.id, pulse.progress).unwrap_or(0.0);
				assert!(pulse.progress >= last);
				assert!(pulse.progress <= 1.0);
			}
			now += FRAME;
		}
		assert!(!seen.is_empty());
	}

	#[test]
	fn invalid_references_are_no_ops() {
		let mut sim = community(quiet());
		let total = sim.graph().total_population();
		assert!(matches!(sim.add_dot(&"nobody".into(), 0.0), Err(SimError::UnknownHub(_))));
		assert!(matches!(sim.strengthen_edge(99, 0.0), Err(SimError::UnknownEdge(99))));
		assert!(matches!(
			sim.begin_migration(ParticleId(9999), &"artists".into(), 0.0),
			Err(SimError::UnknownParticle(9999))
		));
		assert!(matches!(
			sim.add_dots(DotTarget::Hub("nobody".into()), 3, 0.0),
			Err(SimError::UnknownHub(_))
		));
		assert_eq!(sim.graph().total_population(), total);
		assert!(sim.celebrations().is_empty());
	}

	#[test]
	fn batched_requests_release_dots_over_time() {
		let mut sim = sim(PAIR, quiet());
		assert_eq!(sim.add_dots(DotTarget::Hub("B".into()), 12, 0.0).ok(), Some(12));
		sim.tick(0.0);
		assert_eq!(population(&sim, "B"), 5);
		sim.tick(499.0);
		assert_eq!(population(&sim, "B"), 5);
		sim.tick(500.0);
		assert_eq!(population(&sim, "B"), 10);
		sim.tick(1000.0);
		assert_eq!(population(&sim, "B"), 12);

		assert_eq!(sim.add_dots(DotTarget::Hub("B".into()), 500, 2000.0).ok(), Some(20));
		assert_eq!(sim.add_dots(DotTarget::Hub("B".into()), 0, 2000.0).ok(), Some(1));
	}

	#[test]
	fn spreading_a_request_staggers_hubs() {
		let mut sim = sim(PAIR, quiet());
		assert_eq!(sim.add_dots(DotTarget::All, 4, 0.0).ok(), Some(4));
		sim.tick(0.0);
		assert_eq!((population(&sim, "A"), population(&sim, "B")), (13, 0));
		sim.tick(300.0);
		assert_eq!((population(&sim, "A"), population(&sim, "B")), (13, 3));
		sim.tick(500.0);
		assert_eq!((population(&sim, "A"), population(&sim, "B")), (14, 3));
		sim.tick(800.0);
		assert_eq!((population(&sim, "A"), population(&sim, "B")), (14, 4));
		assert_population_conserved(&sim, 18);
	}

	#[test]
	fn disposal_releases_every_timer() {
		let mut sim = community(SimulationConfig::default());
		sim.tick(0.0);
		let _ = sim.strengthen_edge(2, 0.0);
		let _ = sim.add_dots(DotTarget::All, 10, 0.0);
		assert!(sim.pending_timers() > 2);

		sim.dispose();
		assert!(sim.is_disposed());
		assert_eq!(sim.pending_timers(), 0);
		assert!(!sim.timers_armed());
		assert!(sim.pulses().is_empty());

		let frozen = sim.snapshot().time;
		sim.tick(5000.0);
		assert_eq!(sim.snapshot().time, frozen);
		assert!(matches!(sim.add_dot(&"artists".into(), 0.0), Err(SimError::Disposed)));
		assert!(matches!(sim.strengthen_edge(0, 0.0), Err(SimError::Disposed)));
		sim.dispose();
	}

	#[test]
	fn snapshot_carries_edge_categories_and_pulse_glow() {
		let mut sim = community(quiet());
		sim.tick(0.0);
		sim.tick(500.0);
		let snapshot = sim.snapshot();
		assert_eq!(snapshot.edges.len(), 10);
		assert_eq!(
			snapshot.edges.iter().filter(|e| e.category == EdgeCategory::Inspire).count(),
			7
		);
		assert!(!snapshot.pulses.is_empty());
		for pulse in &snapshot.pulses {
			assert!((pulse.glow_thickness - pulse.thickness * PULSE_GLOW_SCALE).abs() < 1e-12);
			assert_eq!(pulse.opacity, PULSE_OPACITY);
		}
	}
}
