use chrono::{TimeZone, Utc};
use trackrec_rs::gpx::{parse, serialize};
use trackrec_rs::{GeoPoint, Track, TrackPoint, Waypoint};

fn sample_track(name: &str) -> Track {
    Track {
        id: 7,
        name: name.to_string(),
        activity_kind: "Bike".to_string(),
        distance_meters: 222.4,
        duration_millis: 20_000,
        avg_speed_kmh: 40.0,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
    }
}

fn sample_points() -> Vec<TrackPoint> {
    (0u32..3)
        .map(|i| TrackPoint {
            track_id: 7,
            position: GeoPoint::new(52.52 + 0.001 * i as f64, 13.405),
            elevation: 34.0 + i as f64,
            captured_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 10 * i).unwrap(),
        })
        .collect()
}

fn sample_waypoints(descriptions: &[&str]) -> Vec<Waypoint> {
    descriptions
        .iter()
        .enumerate()
        .map(|(i, desc)| Waypoint {
            id: i as i64 + 1,
            track_id: 7,
            position: GeoPoint::new(52.53, 13.41 + 0.001 * i as f64),
            description: desc.to_string(),
            photo_ref: None,
        })
        .collect()
}

#[test]
fn round_trip_preserves_points_and_waypoints() {
    let points = sample_points();
    let waypoints = sample_waypoints(&["Bench", "Fountain"]);
    let xml = serialize(&sample_track("Morning loop"), &points, &waypoints).expect("serialize");

    let doc = parse(&xml).expect("parse");
    assert_eq!(doc.track_name.as_deref(), Some("Morning loop"));
    assert_eq!(doc.points.len(), points.len());
    for (parsed, original) in doc.points.iter().zip(&points) {
        assert_eq!(parsed.position, original.position);
        assert_eq!(parsed.elevation, original.elevation);
        assert_eq!(parsed.captured_at, original.captured_at);
        assert_eq!(parsed.track_id, 0, "parsed points are unbound");
    }
    assert_eq!(doc.waypoints.len(), waypoints.len());
    for (parsed, original) in doc.waypoints.iter().zip(&waypoints) {
        assert_eq!(parsed.position, original.position);
        assert_eq!(parsed.description, original.description);
    }
}

#[test]
fn reserved_characters_are_escaped_and_survive() {
    let track = sample_track(r#"Fish & Chips <"loop">"#);
    let waypoints = sample_waypoints(&["Coffee & cake 'stop'"]);
    let xml = serialize(&track, &sample_points(), &waypoints).expect("serialize");

    assert!(xml.contains("Fish &amp; Chips"));
    assert!(!xml.contains("Fish & Chips"));

    let doc = parse(&xml).expect("parse");
    assert_eq!(doc.track_name.as_deref(), Some(r#"Fish & Chips <"loop">"#));
    assert_eq!(doc.waypoints[0].description, "Coffee & cake 'stop'");
}

#[test]
fn serialized_document_declares_gpx_1_1() {
    let xml = serialize(&sample_track("T"), &sample_points(), &[]).expect("serialize");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("version=\"1.1\""));
    assert!(xml.contains("xmlns=\"http://www.topografix.com/GPX/1/1\""));
    assert!(xml.contains("<time>2026-01-01T12:00:00Z</time>"));
}

#[test]
fn missing_elevation_defaults_to_zero() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><name>Bare</name><trkseg>
    <trkpt lat="1.5" lon="2.5"><time>2026-01-01T00:00:00Z</time></trkpt>
    <trkpt lat="1.6" lon="2.6"><ele>not-a-number</ele></trkpt>
  </trkseg></trk>
</gpx>"#;
    let doc = parse(xml).expect("parse");
    assert_eq!(doc.points.len(), 2);
    assert_eq!(doc.points[0].elevation, 0.0);
    assert_eq!(doc.points[1].elevation, 0.0);
    assert_eq!(doc.track_name.as_deref(), Some("Bare"));
}

#[test]
fn waypoint_without_name_gets_empty_description() {
    let xml = r#"<gpx version="1.1"><wpt lat="1.0" lon="2.0"></wpt><wpt lat="3.0" lon="4.0"/></gpx>"#;
    let doc = parse(xml).expect("parse");
    assert_eq!(doc.waypoints.len(), 2);
    assert_eq!(doc.waypoints[0].description, "");
    assert_eq!(doc.waypoints[1].position, GeoPoint::new(3.0, 4.0));
}

#[test]
fn wpt_name_does_not_leak_into_track_name() {
    let xml = r#"<gpx version="1.1">
  <wpt lat="1.0" lon="2.0"><name>Only a waypoint</name></wpt>
</gpx>"#;
    let doc = parse(xml).expect("parse");
    assert_eq!(doc.track_name, None);
    assert_eq!(doc.waypoints[0].description, "Only a waypoint");
}

#[test]
fn malformed_document_fails_closed() {
    assert!(parse("<gpx><trk></gpx>").is_err());
    assert!(parse("not xml at all <<<").is_err());
}

#[test]
fn non_numeric_coordinates_fail_closed() {
    let xml = r#"<gpx><trk><trkseg><trkpt lat="abc" lon="2.0"/></trkseg></trk></gpx>"#;
    assert!(parse(xml).is_err());
}

#[test]
fn missing_lat_attribute_fails_closed() {
    let xml = r#"<gpx><wpt lon="2.0"><name>x</name></wpt></gpx>"#;
    assert!(parse(xml).is_err());
}
