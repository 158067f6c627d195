//! Hubs, edges and the undirected adjacency derived from them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::definition::EcosystemDefinition;
use super::error::SimError;
use super::types::{Edge, EdgeCategory, Hub, HubId, Point};

/// Undirected neighbor relation, keyed by hub id. Ordered so that seeded runs
/// pick the same neighbors.
pub type AdjacencyGraph = BTreeMap<HubId, BTreeSet<HubId>>;

/// Derive the undirected adjacency from a directed edge list.
///
/// Every hub gets an entry, isolated ones included. Parallel and reversed
/// edges between the same pair collapse into a single neighbor entry.
pub fn build_adjacency(hubs: &[Hub], edges: &[Edge]) -> AdjacencyGraph {
	let mut adjacency: AdjacencyGraph = hubs
		.iter()
		.map(|hub| (hub.id.clone(), BTreeSet::new()))
		.collect();
	for edge in edges {
		adjacency
			.entry(edge.source.clone())
			.or_default()
			.insert(edge.target.clone());
		adjacency
			.entry(edge.target.clone())
			.or_default()
			.insert(edge.source.clone());
	}
	adjacency
}

/// The closed set of hubs and edges a simulation runs on.
#[derive(Clone, Debug)]
pub struct HubGraph {
	hubs: Vec<Hub>,
	index: HashMap<HubId, usize>,
	edges: Vec<Edge>,
	adjacency: AdjacencyGraph,
	origin: HubId,
}

impl HubGraph {
	/// Validate a definition and build the graph. Populations start at zero;
	/// the simulation raises them as it spawns the initial dots.
	pub fn from_definition(def: &EcosystemDefinition) -> Result<Self, SimError> {
		if def.hubs.is_empty() {
			return Err(SimError::EmptyEcosystem);
		}

		let mut hubs = Vec::with_capacity(def.hubs.len());
		let mut index = HashMap::with_capacity(def.hubs.len());
		for hub in &def.hubs {
			if index.insert(hub.id.clone(), hubs.len()).is_some() {
				return Err(SimError::DuplicateHub(hub.id.clone()));
			}
			hubs.push(Hub {
				id: hub.id.clone(),
				display_name: hub.name.clone(),
				position: Point::new(hub.x, hub.y),
				color: hub.color,
				population: 0,
			});
		}

		if !index.contains_key(&def.origin) {
			return Err(SimError::UnknownOriginHub(def.origin.clone()));
		}

		let mut edges = Vec::with_capacity(def.edges.len());
		for (i, edge) in def.edges.iter().enumerate() {
			for end in [&edge.from, &edge.to] {
				if !index.contains_key(end) {
					return Err(SimError::DanglingEdge {
						index: i,
						hub: end.clone(),
					});
				}
			}
			edges.push(Edge {
				source: edge.from.clone(),
				target: edge.to.clone(),
				category: edge.category,
				label: edge.label.clone(),
				thickness: edge.thickness,
			});
		}

		let adjacency = build_adjacency(&hubs, &edges);
		Ok(Self {
			hubs,
			index,
			edges,
			adjacency,
			origin: def.origin.clone(),
		})
	}

	/// All hubs in definition order.
	pub fn hubs(&self) -> &[Hub] {
		&self.hubs
	}

	/// Look up a hub by id.
	pub fn hub(&self, id: &HubId) -> Option<&Hub> {
		self.index.get(id).and_then(|&i| self.hubs.get(i))
	}

	/// Mutable hub lookup.
	pub fn hub_mut(&mut self, id: &HubId) -> Option<&mut Hub> {
		self.index.get(id).and_then(|&i| self.hubs.get_mut(i))
	}

	/// All edges; the index is the edge id.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Look up an edge by index.
	pub fn edge(&self, index: usize) -> Option<&Edge> {
		self.edges.get(index)
	}

	/// Mutable edge lookup.
	pub fn edge_mut(&mut self, index: usize) -> Option<&mut Edge> {
		self.edges.get_mut(index)
	}

	/// The distinguished origin hub.
	pub fn origin(&self) -> &HubId {
		&self.origin
	}

	/// Neighbors of `id` in the undirected adjacency; empty for unknown hubs.
	pub fn neighbors(&self, id: &HubId) -> impl Iterator<Item = &HubId> {
		self.adjacency.get(id).into_iter().flatten()
	}

	/// The full neighbor relation.
	pub fn adjacency(&self) -> &AdjacencyGraph {
		&self.adjacency
	}

	/// Endpoint positions of an edge.
	pub fn edge_endpoints(&self, edge: &Edge) -> Option<(Point, Point)> {
		Some((self.hub(&edge.source)?.position, self.hub(&edge.target)?.position))
	}

	/// Sum of all hub populations.
	pub fn total_population(&self) -> u32 {
		self.hubs.iter().map(|hub| hub.population).sum()
	}

	/// Mean population per hub.
	pub fn average_population(&self) -> f64 {
		f64::from(self.total_population()) / self.hubs.len().max(1) as f64
	}

	/// Hubs receiving creative influence straight from the origin hub.
	pub fn inspired_hubs(&self) -> BTreeSet<&HubId> {
		self.edges
			.iter()
			.filter(|edge| edge.source == self.origin && edge.category == EdgeCategory::Inspire)
			.map(|edge| &edge.target)
			.collect()
	}

	/// Move one unit of population from `from` to `to`. Both hubs are resolved
	/// before anything is written, so the move is all-or-nothing.
	pub fn transfer_population(&mut self, from: &HubId, to: &HubId) -> Result<(), SimError> {
		let from_idx = *self
			.index
			.get(from)
			.ok_or_else(|| SimError::UnknownHub(from.clone()))?;
		let to_idx = *self
			.index
			.get(to)
			.ok_or_else(|| SimError::UnknownHub(to.clone()))?;
		if from_idx == to_idx {
			return Ok(());
		}
		if let Some(hub) = self.hubs.get_mut(from_idx) {
			hub.population = hub.population.saturating_sub(1);
		}
		if let Some(hub) = self.hubs.get_mut(to_idx) {
			hub.population += 1;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ecosystem::definition::EcosystemDefinition;

	fn def(json: &str) -> EcosystemDefinition {
		match EcosystemDefinition::from_json(json) {
			Ok(def) => def,
			Err(e) => panic!("bad fixture: {e}"),
		}
	}

	const TRIANGLE: &str = r##"{
		"origin": "a",
		"hubs": [
			{ "id": "a", "name": "A", "x": 0, "y": 0, "color": "#FF0000" },
			{ "id": "b", "name": "B", "x": 10, "y": 0, "color": "#00FF00" },
			{ "id": "c", "name": "C", "x": 0, "y": 10, "color": "#0000FF" },
			{ "id": "d", "name": "D", "x": 5, "y": 5, "color": "#FFFFFF" }
		],
		"edges": [
			{ "from": "a", "to": "b", "category": "inspire" },
			{ "from": "b", "to": "a", "category": "equip" },
			{ "from": "a", "to": "b", "category": "inspire" },
			{ "from": "b", "to": "c", "category": "equip" }
		]
	}"##;

	#[test]
	fn adjacency_is_undirected_and_deduplicated() {
		let graph = HubGraph::from_definition(&def(TRIANGLE)).unwrap_or_else(|e| panic!("{e}"));
		let a: Vec<_> = graph.neighbors(&"a".into()).map(HubId::as_str).collect();
		let b: Vec<_> = graph.neighbors(&"b".into()).map(HubId::as_str).collect();
		let c: Vec<_> = graph.neighbors(&"c".into()).map(HubId::as_str).collect();
		assert_eq!(a, ["b"]);
		assert_eq!(b, ["a", "c"]);
		assert_eq!(c, ["b"]);
		assert_eq!(graph.neighbors(&"d".into()).count(), 0);
		assert!(graph.adjacency().contains_key(&HubId::from("d")));
		assert_eq!(graph.neighbors(&"missing".into()).count(), 0);
	}

	#[test]
	fn rejects_inconsistent_definitions() {
		let duplicate = TRIANGLE.replace(r#""id": "d""#, r#""id": "a""#);
		assert!(matches!(
			HubGraph::from_definition(&def(&duplicate)),
			Err(SimError::DuplicateHub(_))
		));

		let dangling = TRIANGLE.replace(r#""to": "c""#, r#""to": "z""#);
		assert!(matches!(
			HubGraph::from_definition(&def(&dangling)),
			Err(SimError::DanglingEdge { index: 3, .. })
		));

		let origin = TRIANGLE.replace(r#""origin": "a""#, r#""origin": "z""#);
		assert!(matches!(
			HubGraph::from_definition(&def(&origin)),
			Err(SimError::UnknownOriginHub(_))
		));

		let empty = r#"{ "origin": "a", "hubs": [], "edges": [] }"#;
		assert!(matches!(
			HubGraph::from_definition(&def(empty)),
			Err(SimError::EmptyEcosystem)
		));
	}

	#[test]
	fn transfer_is_all_or_nothing() {
		let mut graph = HubGraph::from_definition(&def(TRIANGLE)).unwrap_or_else(|e| panic!("{e}"));
		if let Some(hub) = graph.hub_mut(&"a".into()) {
			hub.population = 2;
		}
		assert!(graph.transfer_population(&"a".into(), &"c".into()).is_ok());
		assert_eq!(graph.hub(&"a".into()).map(|h| h.population), Some(1));
		assert_eq!(graph.hub(&"c".into()).map(|h| h.population), Some(1));

		assert!(graph.transfer_population(&"a".into(), &"nowhere".into()).is_err());
		assert_eq!(graph.total_population(), 2);
		assert_eq!(graph.hub(&"a".into()).map(|h| h.population), Some(1));
	}

	#[test]
	fn inspired_hubs_follow_origin_inspire_edges() {
		let graph = HubGraph::from_definition(&def(TRIANGLE)).unwrap_or_else(|e| panic!("{e}"));
		let inspired: Vec<_> = graph.inspired_hubs().into_iter().map(HubId::as_str).collect();
		assert_eq!(inspired, ["b"]);
	}
}
