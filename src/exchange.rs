use chrono::Utc;

use crate::distance;
use crate::error::{ExchangeError, StoreError};
use crate::gpx;
use crate::store::RouteStore;
use crate::types::track::{TrackId, TrackPoint, Waypoint};

/// Reads a stored track and renders it as a GPX document.
pub fn export_gpx<S: RouteStore>(store: &S, track_id: TrackId) -> Result<String, ExchangeError> {
    let track = store
        .track(track_id)
        .ok_or(StoreError::TrackNotFound(track_id))?;
    let points = store.points_of(track_id);
    if points.is_empty() {
        return Err(ExchangeError::EmptyTrack(track_id));
    }
    let waypoints = store.waypoints_of(track_id);
    Ok(gpx::serialize(&track, &points, &waypoints)?)
}

/// Parses a GPX document and persists it as a new track.
///
/// The parsed points are re-walked in document order, rebinding each to the
/// new track id and accumulating total distance pairwise, exactly as live
/// recording does. Duration and average speed stay zero: import does not
/// infer timing-derived metrics from the source file.
pub fn import_gpx<S: RouteStore>(store: &S, text: &str) -> Result<TrackId, ExchangeError> {
    let document = gpx::parse(text)?;

    let name = document
        .track_name
        .unwrap_or_else(|| format!("Imported {}", Utc::now().timestamp_millis()));
    let track_id = store.create_track(&name, "Imported")?;

    let mut total_meters = 0.0;
    let mut previous: Option<TrackPoint> = None;
    for point in document.points {
        let point = TrackPoint { track_id, ..point };
        store.append_point(point.clone())?;
        if let Some(previous) = &previous {
            total_meters += distance::distance_meters(previous.position, point.position);
        }
        previous = Some(point);
    }

    for waypoint in document.waypoints {
        store.append_waypoint(Waypoint { track_id, ..waypoint })?;
    }

    store.finalize_track_metrics(track_id, total_meters, 0, 0.0)?;
    tracing::info!(track_id, %name, meters = total_meters, "track imported");
    Ok(track_id)
}
