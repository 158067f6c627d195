//! Serialized description of an ecosystem: its hubs, edges and origin hub.

use serde::Deserialize;

use super::error::SimError;
use super::types::{EdgeCategory, HubId, Rgb};

const COMMUNITY: &str = include_str!("community.json");

/// One hub as written in a definition document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HubDefinition {
	/// Identifier, unique within the document.
	pub id: HubId,
	/// Label shown next to the hub.
	pub name: String,
	/// World x coordinate.
	pub x: f64,
	/// World y coordinate.
	pub y: f64,
	/// Hub color.
	pub color: Rgb,
	/// Number of dots orbiting the hub at start.
	#[serde(default)]
	pub dots: u32,
}

/// One directed edge as written in a definition document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeDefinition {
	/// Source hub id.
	pub from: HubId,
	/// Target hub id.
	pub to: HubId,
	/// Relationship category.
	pub category: EdgeCategory,
	/// Relationship label.
	#[serde(default)]
	pub label: String,
	/// Initial line weight.
	#[serde(default = "default_thickness")]
	pub thickness: f64,
}

const fn default_thickness() -> f64 {
	1.0
}

/// The fixed `(hubs, edges)` input a simulation is built from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EcosystemDefinition {
	/// Hub whose outgoing edges pulse in every batch.
	pub origin: HubId,
	/// Hubs in display order.
	pub hubs: Vec<HubDefinition>,
	/// Directed edges; their index is the edge id used by the interaction API.
	pub edges: Vec<EdgeDefinition>,
}

impl EcosystemDefinition {
	/// Parse a definition document.
	pub fn from_json(json: &str) -> Result<Self, SimError> {
		Ok(serde_json::from_str(json)?)
	}

	/// The six-hub creative community layout shipped with the site.
	pub fn community() -> Result<Self, SimError> {
		Self::from_json(COMMUNITY)
	}
}
