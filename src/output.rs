use std::io::Write;

use csv::Writer;
use serde::Serialize;

use crate::dijkstra::Route;

/// The polyline handed to the map layer.
#[derive(Debug, Serialize)]
struct Polyline {
    path: Vec<[f64; 2]>,
    distance_m: f64,
}

/// One row per waypoint: `seq,id,latitude,longitude,cumulative_m`.
pub fn write_csv<W: Write>(route: &Route, out: W) -> csv::Result<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(["seq", "id", "latitude", "longitude", "cumulative_m"])?;
    for (seq, waypoint) in route.waypoints.iter().enumerate() {
        let c = &waypoint.location;
        wtr.write_record(&[
            seq.to_string(),
            c.id.clone(),
            format!("{:.7}", c.latitude),
            format!("{:.7}", c.longitude),
            format!("{:.3}", waypoint.cost_m),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `{"path": [[lat, lon], ...], "distance_m": f}`
pub fn write_json<W: Write>(route: &Route, out: W) -> serde_json::Result<()> {
    let polyline = Polyline {
        path: route.lat_lngs(),
        distance_m: route.total_m(),
    };
    serde_json::to_writer_pretty(out, &polyline)
}
