//! Routing graph keyed by node id.
//!
//! Nodes live in a `Vec` in insertion order and edges refer to them by
//! position; `index` maps each id onto that position.

use fnv::FnvHashMap;
use hashbrown::HashSet;
use tracing::debug;

use crate::error::{PathError, PathResult};
use crate::geo::{distance, Coordinate};
use crate::queue::{Cost, NodeIndex};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub to: NodeIndex,
    pub distance: Cost,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub location: Coordinate,
    pub neighbors: Vec<Edge>,
}

/// What `build_graph_with` does when two destinations share an id.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The later destination replaces the earlier one.
    #[default]
    Overwrite,
    /// Fail with `InvalidInput`.
    Reject,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: FnvHashMap<String, NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index: FnvHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.neighbors.len()).sum()
    }

    /// Adds a node, or replaces the node with the same id. A replaced node
    /// keeps its position and loses its outbound edges.
    pub fn insert_node(&mut self, location: Coordinate) -> NodeIndex {
        if let Some(&idx) = self.index.get(&location.id) {
            let node = &mut self.nodes[idx];
            node.location = location;
            node.neighbors.clear();
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(location.id.clone(), idx);
        self.nodes.push(Node {
            location,
            neighbors: Vec::new(),
        });
        idx
    }

    /// Sets the directed edge `from → to`. An existing edge between the same
    /// pair keeps its place in the neighbor list and takes the new distance.
    pub fn add_edge(&mut self, from: &str, to: &str, distance: Cost) -> PathResult<()> {
        if distance.is_nan() || distance < 0.0 {
            return Err(PathError::InvalidInput(format!(
                "edge {from} -> {to} has invalid weight {distance}"
            )));
        }
        let from_idx = self.require(from)?;
        let to_idx = self.require(to)?;
        let neighbors = &mut self.nodes[from_idx].neighbors;
        match neighbors.iter_mut().find(|e| e.to == to_idx) {
            Some(edge) => edge.distance = distance,
            None => neighbors.push(Edge {
                to: to_idx,
                distance,
            }),
        }
        Ok(())
    }

    fn require(&self, id: &str) -> PathResult<NodeIndex> {
        self.index_of(id)
            .ok_or_else(|| PathError::InvalidInput(format!("unknown node {id}")))
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx]
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.location.id.as_str())
    }

    /// Outbound `(neighbor id, distance)` pairs of `id`, in insertion order.
    pub fn neighbors(&self, id: &str) -> impl Iterator<Item = (&str, Cost)> {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.neighbors.iter())
            .map(move |e| (self.nodes[e.to].location.id.as_str(), e.distance))
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<Cost> {
        let to_idx = self.index_of(to)?;
        self.node(from)?
            .neighbors
            .iter()
            .find(|e| e.to == to_idx)
            .map(|e| e.distance)
    }
}

/// Star graph from `source` to every destination, duplicates overwritten.
pub fn build_graph(source: &Coordinate, destinations: &[Coordinate]) -> PathResult<Graph> {
    build_graph_with(source, destinations, DuplicatePolicy::Overwrite)
}

/// Builds a star graph: one node per location and one edge from `source` to
/// each destination, weighted by haversine distance in meters.
pub fn build_graph_with(
    source: &Coordinate,
    destinations: &[Coordinate],
    policy: DuplicatePolicy,
) -> PathResult<Graph> {
    source.validate()?;
    let mut graph = Graph::with_capacity(destinations.len() + 1);
    graph.insert_node(source.clone());

    let mut seen: HashSet<&str> = HashSet::with_capacity(destinations.len());
    for destination in destinations {
        destination.validate()?;
        if destination.id == source.id {
            return Err(PathError::InvalidInput(format!(
                "destination id {} collides with the source",
                destination.id
            )));
        }
        if !seen.insert(destination.id.as_str()) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(PathError::InvalidInput(format!(
                        "duplicate destination id {}",
                        destination.id
                    )));
                }
                DuplicatePolicy::Overwrite => {
                    debug!(id = %destination.id, "overwriting duplicate destination");
                }
            }
        }
        graph.insert_node(destination.clone());
        graph.add_edge(&source.id, &destination.id, distance(source, destination))?;
    }

    debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        "built graph from {}",
        source.id
    );
    Ok(graph)
}
