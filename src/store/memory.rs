use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::store::RouteStore;
use crate::types::track::{Track, TrackId, TrackPoint, Waypoint, WaypointId};

/// In-process route store backed by concurrent maps.
///
/// Ids are sequential and process-local. Point appends for a track that no
/// longer exists are dropped, not rejected, so a sampling-tick write that
/// races a discard cannot fail the session.
pub struct MemoryStore {
    tracks: DashMap<TrackId, Track>,
    points: DashMap<TrackId, Vec<TrackPoint>>,
    waypoints: DashMap<WaypointId, Waypoint>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tracks: DashMap::new(),
            points: DashMap::new(),
            waypoints: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteStore for MemoryStore {
    fn create_track(&self, name: &str, activity_kind: &str) -> Result<TrackId, StoreError> {
        let id = self.allocate_id();
        self.tracks.insert(
            id,
            Track {
                id,
                name: name.to_string(),
                activity_kind: activity_kind.to_string(),
                distance_meters: 0.0,
                duration_millis: 0,
                avg_speed_kmh: 0.0,
                created_at: Utc::now(),
            },
        );
        self.points.insert(id, Vec::new());
        Ok(id)
    }

    fn append_point(&self, point: TrackPoint) -> Result<(), StoreError> {
        match self.points.get_mut(&point.track_id) {
            Some(mut points) => points.push(point),
            None => {
                tracing::debug!(track_id = point.track_id, "dropping point for unknown track");
            }
        }
        Ok(())
    }

    fn append_waypoint(&self, waypoint: Waypoint) -> Result<WaypointId, StoreError> {
        if !self.tracks.contains_key(&waypoint.track_id) {
            return Err(StoreError::TrackNotFound(waypoint.track_id));
        }
        let id = self.allocate_id();
        self.waypoints.insert(id, Waypoint { id, ..waypoint });
        Ok(id)
    }

    fn update_waypoint(
        &self,
        id: WaypointId,
        description: &str,
        photo_ref: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut waypoint = self
            .waypoints
            .get_mut(&id)
            .ok_or(StoreError::WaypointNotFound(id))?;
        waypoint.description = description.to_string();
        waypoint.photo_ref = photo_ref.map(str::to_string);
        Ok(())
    }

    fn delete_waypoint(&self, id: WaypointId) -> Result<(), StoreError> {
        self.waypoints
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::WaypointNotFound(id))
    }

    fn finalize_track_metrics(
        &self,
        id: TrackId,
        distance_meters: f64,
        duration_millis: i64,
        avg_speed_kmh: f64,
    ) -> Result<(), StoreError> {
        let mut track = self
            .tracks
            .get_mut(&id)
            .ok_or(StoreError::TrackNotFound(id))?;
        track.distance_meters = distance_meters;
        track.duration_millis = duration_millis;
        track.avg_speed_kmh = avg_speed_kmh;
        Ok(())
    }

    fn rename_track(&self, id: TrackId, name: &str) -> Result<(), StoreError> {
        let mut track = self
            .tracks
            .get_mut(&id)
            .ok_or(StoreError::TrackNotFound(id))?;
        track.name = name.to_string();
        Ok(())
    }

    fn delete_track(&self, id: TrackId) -> Result<(), StoreError> {
        self.tracks
            .remove(&id)
            .ok_or(StoreError::TrackNotFound(id))?;
        self.points.remove(&id);
        self.waypoints.retain(|_, w| w.track_id != id);
        Ok(())
    }

    fn track(&self, id: TrackId) -> Option<Track> {
        self.tracks.get(&id).map(|t| t.clone())
    }

    fn list_tracks(&self) -> Vec<Track> {
        let mut tracks: Vec<Track> = self.tracks.iter().map(|t| t.clone()).collect();
        tracks.sort_by_key(|t| std::cmp::Reverse(t.id));
        tracks
    }

    fn points_of(&self, id: TrackId) -> Vec<TrackPoint> {
        self.points.get(&id).map(|p| p.clone()).unwrap_or_default()
    }

    fn waypoints_of(&self, id: TrackId) -> Vec<Waypoint> {
        let mut waypoints: Vec<Waypoint> = self
            .waypoints
            .iter()
            .filter(|w| w.track_id == id)
            .map(|w| w.clone())
            .collect();
        waypoints.sort_by_key(|w| w.id);
        waypoints
    }
}
