use tracing::debug;

use crate::error::{PathError, PathResult};
use crate::geo::Coordinate;
use crate::graph::Graph;
use crate::queue::{Cost, MinQueue, NodeIndex};

/// A point on a route with the cost of reaching it from the start.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub location: Coordinate,
    pub cost_m: Cost,
}

/// Ordered start → end sequence of locations.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn coordinates(&self) -> impl Iterator<Item = &Coordinate> {
        self.waypoints.iter().map(|w| &w.location)
    }

    /// Total cost in meters, 0 for an empty or single-point route.
    pub fn total_m(&self) -> Cost {
        self.waypoints.last().map(|w| w.cost_m).unwrap_or(0.0)
    }

    /// `true` if start and end are the same node.
    pub fn is_trivial(&self) -> bool {
        self.waypoints.len() <= 1
    }

    /// `[lat, lon]` pairs, the shape a map polyline takes.
    pub fn lat_lngs(&self) -> Vec<[f64; 2]> {
        self.coordinates()
            .map(|c| [c.latitude, c.longitude])
            .collect()
    }
}

/// Distances and predecessors left behind by one Dijkstra run.
///
/// Only settled nodes carry final distances. A search that stopped early at
/// its target leaves relaxed-but-unsettled nodes behind; those are reported
/// as unknown rather than with their tentative cost.
#[derive(Debug)]
pub struct SearchTree<'g> {
    graph: &'g Graph,
    start: NodeIndex,
    dist: Vec<Cost>,
    prev: Vec<Option<NodeIndex>>,
    settled: Vec<bool>,
}

impl<'g> SearchTree<'g> {
    fn settled_index(&self, id: &str) -> Option<NodeIndex> {
        self.graph.index_of(id).filter(|&idx| self.settled[idx])
    }

    /// Shortest distance to `id`, or `None` if the search did not settle it.
    pub fn distance(&self, id: &str) -> Option<Cost> {
        self.settled_index(id).map(|idx| self.dist[idx])
    }

    /// Predecessor of a settled node on its shortest path.
    pub fn previous(&self, id: &str) -> Option<&'g str> {
        let graph = self.graph;
        let idx = self.settled_index(id)?;
        self.prev[idx].map(|p| graph.node_at(p).location.id.as_str())
    }

    /// Walks the predecessor links back from `end_id` to the start. Fails
    /// with `PathNotFound` unless the search settled `end_id`.
    pub fn path_to(&self, end_id: &str) -> PathResult<Route> {
        let end = self
            .settled_index(end_id)
            .ok_or_else(|| self.not_found(end_id))?;
        reconstruct_path(self.graph, &self.prev, &self.dist, self.start, end)
    }

    fn not_found(&self, end_id: &str) -> PathError {
        PathError::PathNotFound {
            from: self.graph.node_at(self.start).location.id.clone(),
            to: end_id.to_string(),
        }
    }
}

/// Dijkstra from `start_id`. With `end_id` the search stops as soon as that
/// node is settled; without it every reachable node is settled.
pub fn search<'g>(
    graph: &'g Graph,
    start_id: &str,
    end_id: Option<&str>,
) -> PathResult<SearchTree<'g>> {
    let start = graph
        .index_of(start_id)
        .ok_or_else(|| PathError::InvalidInput(format!("start node {start_id} not in graph")))?;
    let end = end_id.and_then(|id| graph.index_of(id));

    let n = graph.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<NodeIndex>> = vec![None; n];
    let mut settled = vec![false; n];
    dist[start] = 0.0;

    // Every node starts queued, in insertion order, at its initial distance.
    let mut queue = MinQueue::with_capacity(n);
    for (idx, &d) in dist.iter().enumerate() {
        queue.push_or_decrease(idx, d);
    }

    let mut settled_count = 0usize;
    while let Some((node, cost)) = queue.pop() {
        // Everything left is unreachable.
        if cost.is_infinite() {
            break;
        }
        if cost > dist[node] {
            continue;
        }
        settled[node] = true;
        settled_count += 1;
        if Some(node) == end {
            break;
        }

        for edge in &graph.node_at(node).neighbors {
            let next_cost = cost + edge.distance;
            if next_cost < dist[edge.to] {
                dist[edge.to] = next_cost;
                prev[edge.to] = Some(node);
                queue.push_or_decrease(edge.to, next_cost);
            }
        }
    }

    debug!(nodes = n, settled = settled_count, "dijkstra from {}", start_id);
    Ok(SearchTree {
        graph,
        start,
        dist,
        prev,
        settled,
    })
}

/// Shortest path from `start_id` to `end_id`, both ends included.
///
/// An unknown start is `InvalidInput`; an unknown or unreachable end is
/// `PathNotFound`.
pub fn shortest_path(graph: &Graph, start_id: &str, end_id: &str) -> PathResult<Route> {
    let tree = search(graph, start_id, Some(end_id))?;
    tree.path_to(end_id)
}

/// Dijkstra from `start_id` to all nodes. Returns `(id, meters)` in node
/// order, `f64::INFINITY` when unreachable.
pub fn distances_from<'g>(graph: &'g Graph, start_id: &str) -> PathResult<Vec<(&'g str, Cost)>> {
    let tree = search(graph, start_id, None)?;
    Ok(graph
        .ids()
        .map(|id| (id, tree.distance(id).unwrap_or(f64::INFINITY)))
        .collect())
}

// The walk is bounded by the node count, so a corrupt predecessor cycle
// cannot spin forever.
fn reconstruct_path(
    graph: &Graph,
    prev: &[Option<NodeIndex>],
    dist: &[Cost],
    start: NodeIndex,
    end: NodeIndex,
) -> PathResult<Route> {
    let not_found = || PathError::PathNotFound {
        from: graph.node_at(start).location.id.clone(),
        to: graph.node_at(end).location.id.clone(),
    };

    let mut waypoints = Vec::new();
    let mut cur = end;
    for _ in 0..prev.len() {
        waypoints.push(Waypoint {
            location: graph.node_at(cur).location.clone(),
            cost_m: dist[cur],
        });
        if cur == start {
            waypoints.reverse();
            return Ok(Route { waypoints });
        }
        cur = prev[cur].ok_or_else(not_found)?;
    }
    Err(not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance;
    use crate::graph::build_graph;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn origin() -> Coordinate {
        Coordinate::new("current", 0.0, 0.0)
    }

    #[test]
    fn single_destination_at_equator() {
        let graph = build_graph(&origin(), &[Coordinate::new("d1", 0.0, 1.0)]).unwrap();
        let route = shortest_path(&graph, "current", "d1").unwrap();
        assert_eq!(route.lat_lngs(), vec![[0.0, 0.0], [0.0, 1.0]]);
        assert!((route.total_m() - 111_195.0).abs() < 1.0);
        assert!(!route.is_trivial());
    }

    #[test]
    fn start_equals_end() {
        let graph = build_graph(&origin(), &[]).unwrap();
        let route = shortest_path(&graph, "current", "current").unwrap();
        assert_eq!(route.lat_lngs(), vec![[0.0, 0.0]]);
        assert_eq!(route.total_m(), 0.0);
        assert!(route.is_trivial());
    }

    #[test]
    fn unknown_end_is_path_not_found() {
        let graph = build_graph(&origin(), &[Coordinate::new("d1", 0.0, 1.0)]).unwrap();
        let result = shortest_path(&graph, "current", "nowhere");
        assert!(matches!(result, Err(PathError::PathNotFound { .. })));
    }

    #[test]
    fn unknown_start_is_invalid_input() {
        let graph = build_graph(&origin(), &[]).unwrap();
        let result = shortest_path(&graph, "ghost", "current");
        assert!(matches!(result, Err(PathError::InvalidInput(_))));
    }

    #[test]
    fn empty_star_leaves_everything_else_unreachable() {
        let mut graph = build_graph(&origin(), &[]).unwrap();
        graph.insert_node(Coordinate::new("island", 1.0, 1.0));
        let result = shortest_path(&graph, "current", "island");
        assert!(matches!(result, Err(PathError::PathNotFound { .. })));
    }

    #[test]
    fn destinations_are_not_sources() {
        let graph = build_graph(&origin(), &[Coordinate::new("d1", 0.0, 1.0)]).unwrap();
        let result = shortest_path(&graph, "d1", "current");
        assert!(matches!(result, Err(PathError::PathNotFound { .. })));
    }

    #[test]
    fn duplicate_destination_routes_to_last_location() {
        let destinations = vec![
            Coordinate::new("destination", 0.0, 1.0),
            Coordinate::new("destination", 0.0, 2.0),
        ];
        let graph = build_graph(&origin(), &destinations).unwrap();
        let route = shortest_path(&graph, "current", "destination").unwrap();
        assert_eq!(route.lat_lngs(), vec![[0.0, 0.0], [0.0, 2.0]]);
        let expected = distance(&origin(), &Coordinate::new("x", 0.0, 2.0));
        assert_eq!(route.total_m(), expected);
    }

    #[test]
    fn prefers_cheaper_multi_hop_route() {
        // a→b→c→e costs 3, a→d→e costs 6, a→e costs 10.
        let mut graph = Graph::new();
        for (id, lon) in [("a", 0.0), ("b", 1.0), ("c", 2.0), ("d", 3.0), ("e", 4.0)] {
            graph.insert_node(Coordinate::new(id, 0.0, lon));
        }
        for (from, to, w) in [
            ("a", "b", 1.0),
            ("b", "c", 1.0),
            ("c", "e", 1.0),
            ("a", "d", 5.0),
            ("d", "e", 1.0),
            ("a", "e", 10.0),
        ] {
            graph.add_edge(from, to, w).unwrap();
        }
        let route = shortest_path(&graph, "a", "e").unwrap();
        let ids: Vec<_> = route.coordinates().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "e"]);
        assert_eq!(route.total_m(), 3.0);
        let costs: Vec<_> = route.waypoints.iter().map(|w| w.cost_m).collect();
        assert_eq!(costs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn distances_from_reports_unreachable_as_infinity() {
        let mut graph = Graph::new();
        for id in ["a", "b", "c"] {
            graph.insert_node(Coordinate::new(id, 0.0, 0.0));
        }
        graph.add_edge("a", "b", 2.5).unwrap();
        let dist = distances_from(&graph, "a").unwrap();
        assert_eq!(dist, vec![("a", 0.0), ("b", 2.5), ("c", f64::INFINITY)]);
    }

    #[test]
    fn search_tree_exposes_predecessors() {
        let graph = build_graph(&origin(), &[Coordinate::new("d1", 0.0, 1.0)]).unwrap();
        let tree = search(&graph, "current", None).unwrap();
        assert_eq!(tree.previous("d1"), Some("current"));
        assert_eq!(tree.previous("current"), None);
        assert_eq!(tree.distance("current"), Some(0.0));
        assert_eq!(tree.distance("missing"), None);
    }

    #[test]
    fn early_exit_leaves_unsettled_nodes_unknown() {
        // b is first relaxed to 10 via a→b; its real distance is 2 via c.
        // The search toward x stops before b or c are settled.
        let mut graph = Graph::new();
        for id in ["a", "b", "c", "x"] {
            graph.insert_node(Coordinate::new(id, 0.0, 0.0));
        }
        for (from, to, w) in [("a", "b", 10.0), ("a", "c", 1.0), ("c", "b", 1.0), ("a", "x", 0.5)] {
            graph.add_edge(from, to, w).unwrap();
        }

        let tree = search(&graph, "a", Some("x")).unwrap();
        assert_eq!(tree.distance("x"), Some(0.5));
        assert_eq!(tree.path_to("x").unwrap().total_m(), 0.5);
        assert_eq!(tree.distance("b"), None);
        assert_eq!(tree.previous("b"), None);
        assert!(matches!(tree.path_to("b"), Err(PathError::PathNotFound { .. })));

        let route = shortest_path(&graph, "a", "b").unwrap();
        assert_eq!(route.total_m(), 2.0);
        let full = search(&graph, "a", None).unwrap();
        assert_eq!(full.path_to("b").unwrap().total_m(), 2.0);
    }

    #[test]
    fn reconstruction_stops_on_predecessor_cycle() {
        let mut graph = Graph::new();
        for id in ["s", "x", "y"] {
            graph.insert_node(Coordinate::new(id, 0.0, 0.0));
        }
        // x and y point at each other and never reach s.
        let prev = vec![None, Some(2), Some(1)];
        let dist = vec![0.0, 1.0, 1.0];
        let result = reconstruct_path(&graph, &prev, &dist, 0, 1);
        assert!(matches!(result, Err(PathError::PathNotFound { .. })));
    }

    // Bellman-Ford as an independent reference.
    fn reference_distances(n: usize, edges: &[(usize, usize, f64)], start: usize) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; n];
        dist[start] = 0.0;
        for _ in 0..n {
            for &(u, v, w) in edges {
                if dist[u] + w < dist[v] {
                    dist[v] = dist[u] + w;
                }
            }
        }
        dist
    }

    #[test]
    fn matches_bellman_ford_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let n = rng.gen_range(2..12);
            let mut graph = Graph::new();
            for i in 0..n {
                graph.insert_node(Coordinate::new(format!("n{i}"), 0.0, 0.0));
            }
            let mut edges = Vec::new();
            for _ in 0..rng.gen_range(0..n * 3) {
                let (u, v) = (rng.gen_range(0..n), rng.gen_range(0..n));
                let w = rng.gen_range(0..100) as f64;
                graph.add_edge(&format!("n{u}"), &format!("n{v}"), w).unwrap();
                // add_edge replaces an existing u→v edge, mirror that here.
                edges.retain(|&(a, b, _)| (a, b) != (u, v));
                edges.push((u, v, w));
            }
            let expected = reference_distances(n, &edges, 0);

            for end in 0..n {
                let end_id = format!("n{end}");
                match shortest_path(&graph, "n0", &end_id) {
                    Ok(route) => {
                        assert_eq!(route.total_m(), expected[end]);
                        let first = route.waypoints.first().unwrap();
                        let last = route.waypoints.last().unwrap();
                        assert_eq!(first.location.id, "n0");
                        assert_eq!(last.location.id, end_id);
                        let mut total = 0.0;
                        for pair in route.waypoints.windows(2) {
                            let w = graph
                                .edge_weight(&pair[0].location.id, &pair[1].location.id)
                                .expect("consecutive waypoints must share an edge");
                            total += w;
                            assert_eq!(pair[1].cost_m, total);
                        }
                        assert_eq!(total, expected[end]);
                    }
                    Err(PathError::PathNotFound { .. }) => {
                        assert!(expected[end].is_infinite(), "n{end} should be reachable");
                    }
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
    }
}
