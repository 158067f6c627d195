//! Error type shared by the simulation core.

use super::types::HubId;

/// Everything that can go wrong while building or driving a [`Simulation`].
///
/// None of these are fatal: the simulation logs them and leaves its state
/// untouched.
///
/// [`Simulation`]: super::Simulation
#[derive(Debug, thiserror::Error)]
pub enum SimError {
	/// A hub id did not resolve to a hub in this ecosystem.
	#[error("unknown hub: {0}")]
	UnknownHub(HubId),

	/// A particle id did not resolve to a live particle.
	#[error("unknown particle: {0}")]
	UnknownParticle(u64),

	/// An edge index was out of range.
	#[error("unknown edge index: {0}")]
	UnknownEdge(usize),

	/// Two hubs in a definition share the same id.
	#[error("duplicate hub id: {0}")]
	DuplicateHub(HubId),

	/// An edge in a definition references a hub that does not exist.
	#[error("edge {index} references unknown hub {hub}")]
	DanglingEdge {
		/// Position of the edge in the definition.
		index: usize,
		/// The unresolved endpoint.
		hub: HubId,
	},

	/// The definition's origin hub is not one of its hubs.
	#[error("origin hub {0} is not defined")]
	UnknownOriginHub(HubId),

	/// A definition without any hubs.
	#[error("ecosystem has no hubs")]
	EmptyEcosystem,

	/// A color that is not a `#rrggbb` hex string.
	#[error("invalid color: {0:?}")]
	InvalidColor(String),

	/// The definition document could not be parsed.
	#[error("invalid ecosystem definition: {0}")]
	Definition(#[from] serde_json::Error),

	/// The simulation has already been disposed.
	#[error("simulation has been disposed")]
	Disposed,
}
