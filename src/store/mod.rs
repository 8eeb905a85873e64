mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::types::track::{Track, TrackId, TrackPoint, Waypoint, WaypointId};

/// Durable-storage collaborator for tracks, points, and waypoints.
///
/// Instances are constructed explicitly and passed by reference; there is no
/// process-wide singleton. A track owns its points and waypoints: deleting a
/// track removes everything that hangs off it. Writes are idempotent enough
/// to tolerate a late sampling-tick insert arriving after its session was
/// stopped and discarded.
pub trait RouteStore: Send + Sync + 'static {
    /// Creates a track with placeholder metrics and returns its id.
    fn create_track(&self, name: &str, activity_kind: &str) -> Result<TrackId, StoreError>;

    /// Appends one point under `point.track_id`.
    fn append_point(&self, point: TrackPoint) -> Result<(), StoreError>;

    /// Appends one waypoint under `waypoint.track_id`, returning the id the
    /// store assigned to it.
    fn append_waypoint(&self, waypoint: Waypoint) -> Result<WaypointId, StoreError>;

    fn update_waypoint(
        &self,
        id: WaypointId,
        description: &str,
        photo_ref: Option<&str>,
    ) -> Result<(), StoreError>;

    fn delete_waypoint(&self, id: WaypointId) -> Result<(), StoreError>;

    /// Writes the final distance/duration/average-speed triple. Called
    /// exactly once per saved track.
    fn finalize_track_metrics(
        &self,
        id: TrackId,
        distance_meters: f64,
        duration_millis: i64,
        avg_speed_kmh: f64,
    ) -> Result<(), StoreError>;

    fn rename_track(&self, id: TrackId, name: &str) -> Result<(), StoreError>;

    /// Deletes the track and, cascading, all its points and waypoints.
    fn delete_track(&self, id: TrackId) -> Result<(), StoreError>;

    fn track(&self, id: TrackId) -> Option<Track>;

    /// All tracks, most recent first.
    fn list_tracks(&self) -> Vec<Track>;

    /// Points of a track in capture order.
    fn points_of(&self, id: TrackId) -> Vec<TrackPoint>;

    fn waypoints_of(&self, id: TrackId) -> Vec<Waypoint>;
}
