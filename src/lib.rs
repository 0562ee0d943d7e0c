//! Shortest haversine path from a live position to a geocoded destination.
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`geo`]      | `Coordinate`, `LatLng`, haversine `distance`          |
//! | [`graph`]    | `Graph`, star-graph `build_graph`, `DuplicatePolicy`  |
//! | [`queue`]    | `MinQueue`, min-priority queue with decrease-key      |
//! | [`dijkstra`] | `search`, `shortest_path`, `Route`                    |
//! | [`geocode`]  | `Geocoder` trait, `NominatimGeocoder`                 |
//! | [`planner`]  | `PathFinder`, the cancellable find-path request       |
//! | [`output`]   | CSV and JSON polyline writers                         |
//! | [`error`]    | `PathError`, `GeocodeError`                           |

pub mod dijkstra;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod graph;
pub mod output;
pub mod planner;
pub mod queue;

pub use dijkstra::{distances_from, search, shortest_path, Route, SearchTree, Waypoint};
pub use error::{GeocodeError, PathError, PathResult};
pub use geo::{distance, haversine_meters, Coordinate, LatLng};
pub use geocode::{Geocoder, GeocoderConfig, NominatimGeocoder};
pub use graph::{build_graph, build_graph_with, DuplicatePolicy, Graph};
pub use planner::{PathFinder, DESTINATION_ID, SOURCE_ID};
