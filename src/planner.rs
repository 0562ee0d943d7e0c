//! The find-path request: geocode a destination, then route to it from the
//! current position.
//!
//! Only the lookup suspends. Starting a new request bumps a generation
//! counter; any older request still waiting on its lookup drops the lookup
//! future and reports [`PathError::Cancelled`].

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::dijkstra::{shortest_path, Route};
use crate::error::{GeocodeError, PathError, PathResult};
use crate::geo::{validate_position, Coordinate, LatLng};
use crate::geocode::{Geocoder, DEFAULT_TIMEOUT};
use crate::graph::build_graph;

/// Node id of the device's own position.
pub const SOURCE_ID: &str = "current";
/// Node id given to the geocoded destination.
pub const DESTINATION_ID: &str = "destination";

pub struct PathFinder<G> {
    geocoder: G,
    lookup_timeout: Duration,
    generation: watch::Sender<u64>,
}

impl<G: Geocoder> PathFinder<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            lookup_timeout: DEFAULT_TIMEOUT,
            generation: watch::Sender::new(0),
        }
    }

    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Cancels whatever request is in flight without starting a new one.
    pub fn cancel_pending(&self) {
        self.next_ticket();
    }

    fn next_ticket(&self) -> u64 {
        let mut ticket = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            ticket = *g;
        });
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        *self.generation.borrow() == ticket
    }

    /// Routes from `source` to the place `destination` names.
    pub async fn find_path(&self, source: Option<LatLng>, destination: &str) -> PathResult<Route> {
        let ticket = self.next_ticket();
        let mut newer = self.generation.subscribe();

        let query = destination.trim();
        if query.is_empty() {
            return Err(PathError::InvalidInput("destination is empty".to_string()));
        }
        let source = source.ok_or_else(|| {
            PathError::InvalidInput("current location not available".to_string())
        })?;
        validate_position(SOURCE_ID, source)?;

        info!(query, ticket, "looking up destination");
        let lookup = timeout(self.lookup_timeout, self.geocoder.lookup(query));
        let outcome = tokio::select! {
            outcome = lookup => outcome,
            () = superseded(&mut newer, ticket) => {
                warn!(query, ticket, "lookup superseded");
                return Err(PathError::Cancelled);
            }
        };
        if !self.is_current(ticket) {
            return Err(PathError::Cancelled);
        }

        let position = match outcome {
            Ok(Ok(Some(position))) => position,
            Ok(Ok(None)) => return Err(not_found(query, "no match".to_string())),
            Ok(Err(err)) => {
                warn!(query, error = %err, "geocoding failed");
                return Err(not_found(query, err.to_string()));
            }
            Err(_) => {
                let err = GeocodeError::Timeout(self.lookup_timeout);
                warn!(query, error = %err, "geocoding failed");
                return Err(not_found(query, err.to_string()));
            }
        };
        let target = Coordinate::at(DESTINATION_ID, position);
        target
            .validate()
            .map_err(|e| not_found(query, e.to_string()))?;

        let graph = build_graph(&Coordinate::at(SOURCE_ID, source), &[target])?;
        let route = shortest_path(&graph, SOURCE_ID, DESTINATION_ID)?;
        info!(
            query,
            ticket,
            waypoints = route.waypoints.len(),
            meters = route.total_m(),
            "path found"
        );
        Ok(route)
    }
}

fn not_found(query: &str, reason: String) -> PathError {
    PathError::DestinationNotFound {
        query: query.to_string(),
        reason,
    }
}

// Resolves once the generation moves past `ticket`.
async fn superseded(rx: &mut watch::Receiver<u64>, ticket: u64) {
    loop {
        if *rx.borrow_and_update() != ticket {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
