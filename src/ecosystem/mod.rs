//! Renderer-agnostic ecosystem simulation.
//!
//! Hubs sit at fixed positions, dots orbit them and occasionally migrate along
//! or across the hub graph, and pulses travel along edges out of the origin
//! hub and burst into rings on arrival. [`Simulation::tick`] advances all of it
//! and publishes a [`Snapshot`] for whatever draws it.

mod config;
mod definition;
mod effect;
mod error;
mod graph;
mod orbit;
mod particle;
mod pulse;
mod scheduler;
mod simulation;
mod snapshot;
mod types;

pub use config::SimulationConfig;
pub use definition::{EcosystemDefinition, EdgeDefinition, HubDefinition};
pub use effect::{EffectId, ExpansionEffect};
pub use error::SimError;
pub use graph::{AdjacencyGraph, HubGraph, build_adjacency};
pub use orbit::{Direction, FlightIn, Orbit, compute_fade_opacity, compute_orbit_position};
pub use particle::{Particle, ParticleId, ParticleState, ParticleVisual, Transit, TransitStep};
pub use pulse::{Pulse, PulseId, VisibleSegment, compute_visible_segment};
pub use scheduler::{CelebrationId, Scheduler, Task, TimerId};
pub use simulation::{Celebration, DotTarget, Simulation, SimulationStats};
pub use snapshot::{
	CelebrationView, EdgeView, EffectView, HubView, ParticleView, PeopleCounter, PulseView, Snapshot,
};
pub use types::{Edge, EdgeCategory, Hub, HubId, Point, Rgb};
