use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the route store. `0` marks a record that has not
/// been bound to a store yet (freshly parsed from GPX).
pub type TrackId = i64;
pub type WaypointId = i64;

pub const UNBOUND_ID: i64 = 0;

/// A latitude/longitude pair in degrees. Value type; equality and distance
/// are defined over it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One timestamped coordinate sample on a track's path. Created by the
/// recording session or the GPX reader, never mutated afterwards. Points of
/// a track are ordered by `captured_at` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub track_id: TrackId,
    pub position: GeoPoint,
    pub elevation: f64,
    pub captured_at: DateTime<Utc>,
}

/// A user-annotated point of interest tied to a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub track_id: TrackId,
    pub position: GeoPoint,
    pub description: String,
    pub photo_ref: Option<String>,
}

/// One recorded or imported route with aggregate metrics. Metrics hold
/// placeholder zeros until the session finalizes them at stop-and-save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub activity_kind: String,
    pub distance_meters: f64,
    /// Wall-clock recording time excluding paused intervals.
    pub duration_millis: i64,
    pub avg_speed_kmh: f64,
    pub created_at: DateTime<Utc>,
}

/// One raw fix from the location-provider collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub position: GeoPoint,
    pub elevation: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Saved,
    Discarded,
}

/// Lifecycle of one recording attempt. `Stopped` is terminal; a new
/// recording always starts a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Paused,
    Stopped(StopOutcome),
}

impl SessionState {
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Recording | SessionState::Paused)
    }
}
