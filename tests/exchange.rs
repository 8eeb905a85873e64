use std::sync::Arc;

use chrono::{TimeZone, Utc};
use trackrec_rs::exchange::{export_gpx, import_gpx};
use trackrec_rs::{
    ExchangeError, GeoPoint, MemoryStore, RouteStore, StoreError, TrackPoint, Waypoint,
};

fn store_with_track(points: usize) -> (Arc<MemoryStore>, i64) {
    let store = Arc::new(MemoryStore::new());
    let track_id = store.create_track("Evening ride", "Bike").expect("create");
    for i in 0..points {
        store
            .append_point(TrackPoint {
                track_id,
                position: GeoPoint::new(0.001 * i as f64, 0.0),
                elevation: 5.0,
                captured_at: Utc.with_ymd_and_hms(2026, 2, 2, 18, 0, 10 * i as u32).unwrap(),
            })
            .expect("append");
    }
    (store, track_id)
}

const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Borrowed route</name><desc>Activity: Bike</desc></metadata>
  <trk><name>Borrowed route</name><trkseg>
    <trkpt lat="0" lon="0"><ele>10</ele><time>2026-02-02T18:00:00Z</time></trkpt>
    <trkpt lat="0.001" lon="0"><ele>11</ele><time>2026-02-02T18:00:10Z</time></trkpt>
    <trkpt lat="0.002" lon="0"><ele>12</ele><time>2026-02-02T18:00:20Z</time></trkpt>
  </trkseg></trk>
  <wpt lat="0.001" lon="0.0005"><name>Kiosk</name></wpt>
</gpx>"#;

#[test]
fn import_rebinds_and_reaccumulates() {
    let store = MemoryStore::new();
    let track_id = import_gpx(&store, SAMPLE_GPX).expect("import");

    let track = store.track(track_id).expect("track");
    assert_eq!(track.name, "Borrowed route");
    assert_eq!(track.activity_kind, "Imported");
    // Two legs of ~111 m each, re-walked by the importer.
    assert!(
        (track.distance_meters - 222.4).abs() < 1.0,
        "distance was {}",
        track.distance_meters
    );
    // Import never infers timing-derived metrics.
    assert_eq!(track.duration_millis, 0);
    assert_eq!(track.avg_speed_kmh, 0.0);

    let points = store.points_of(track_id);
    assert_eq!(points.len(), 3);
    assert!(points.iter().all(|p| p.track_id == track_id));
    assert_eq!(points[2].position, GeoPoint::new(0.002, 0.0));

    let waypoints = store.waypoints_of(track_id);
    assert_eq!(waypoints.len(), 1);
    assert_eq!(waypoints[0].description, "Kiosk");
    assert_eq!(waypoints[0].track_id, track_id);
}

#[test]
fn import_of_malformed_document_persists_nothing() {
    let store = MemoryStore::new();
    assert!(import_gpx(&store, "<gpx><trk></gpx>").is_err());
    assert!(store.list_tracks().is_empty());
}

#[test]
fn export_then_import_round_trips_through_the_store() {
    let (store, track_id) = store_with_track(3);
    store
        .append_waypoint(Waypoint {
            id: 0,
            track_id,
            position: GeoPoint::new(0.001, 0.0005),
            description: "Kiosk".to_string(),
            photo_ref: None,
        })
        .expect("waypoint");

    let xml = export_gpx(store.as_ref(), track_id).expect("export");
    let imported_id = import_gpx(store.as_ref(), &xml).expect("import");
    assert_ne!(imported_id, track_id);

    let original = store.points_of(track_id);
    let imported = store.points_of(imported_id);
    assert_eq!(original.len(), imported.len());
    for (a, b) in original.iter().zip(&imported) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.elevation, b.elevation);
        assert_eq!(a.captured_at, b.captured_at);
    }
    assert_eq!(
        store.waypoints_of(imported_id)[0].description,
        store.waypoints_of(track_id)[0].description
    );
}

#[test]
fn export_of_unknown_track_fails() {
    let store = MemoryStore::new();
    assert!(matches!(
        export_gpx(&store, 99),
        Err(ExchangeError::Store(StoreError::TrackNotFound(99)))
    ));
}

#[test]
fn export_of_empty_track_fails() {
    let (store, track_id) = store_with_track(0);
    assert!(matches!(
        export_gpx(store.as_ref(), track_id),
        Err(ExchangeError::EmptyTrack(_))
    ));
}
