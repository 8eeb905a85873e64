use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::GpxError;
use crate::types::track::{GeoPoint, TrackPoint, Waypoint, UNBOUND_ID};

/// Everything the parser recovers from one GPX document. Points come back
/// in document order (assumed chronological, never re-sorted) and carry the
/// unbound track id; the caller rebinds them after creating the owning
/// track.
#[derive(Debug, Clone)]
pub struct GpxDocument {
    pub track_name: Option<String>,
    pub points: Vec<TrackPoint>,
    pub waypoints: Vec<Waypoint>,
}

// Capture state scoped to the element being walked, so a trkpt and a
// sibling wpt can never bleed coordinates into each other.
struct PendingPoint {
    position: GeoPoint,
    elevation: Option<f64>,
    time: Option<DateTime<Utc>>,
}

struct PendingWaypoint {
    position: GeoPoint,
    name: Option<String>,
}

/// Parses a GPX document. Fails closed: a document that is not well-formed
/// XML yields an error and no partial data.
pub fn parse(text: &str) -> Result<GpxDocument, GpxError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut document = GpxDocument {
        track_name: None,
        points: Vec::new(),
        waypoints: Vec::new(),
    };
    let mut pending_point: Option<PendingPoint> = None;
    let mut pending_waypoint: Option<PendingWaypoint> = None;
    let mut in_metadata = false;
    let mut in_trk = false;
    let mut current_element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    pending_point = Some(PendingPoint {
                        position: lat_lon(&e)?,
                        elevation: None,
                        time: None,
                    });
                }
                b"wpt" => {
                    pending_waypoint = Some(PendingWaypoint {
                        position: lat_lon(&e)?,
                        name: None,
                    });
                }
                b"metadata" => in_metadata = true,
                b"trk" => in_trk = true,
                name => {
                    current_element = String::from_utf8_lossy(name).into_owned();
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                // Self-closing points carry only their attributes.
                b"trkpt" => document.points.push(TrackPoint {
                    track_id: UNBOUND_ID,
                    position: lat_lon(&e)?,
                    elevation: 0.0,
                    captured_at: Utc::now(),
                }),
                b"wpt" => document.waypoints.push(Waypoint {
                    id: UNBOUND_ID,
                    track_id: UNBOUND_ID,
                    position: lat_lon(&e)?,
                    description: String::new(),
                    photo_ref: None,
                }),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| GpxError::InvalidDocument(e.to_string()))?;
                if let Some(point) = pending_point.as_mut() {
                    match current_element.as_str() {
                        // Lenient on content: a missing or non-numeric
                        // elevation falls back to 0, a bad time to now.
                        "ele" => point.elevation = text.parse().ok(),
                        "time" => point.time = text.parse::<DateTime<Utc>>().ok(),
                        _ => {}
                    }
                } else if let Some(waypoint) = pending_waypoint.as_mut() {
                    if current_element == "name" {
                        waypoint.name = Some(text.into_owned());
                    }
                } else if current_element == "name" {
                    if in_metadata {
                        document.track_name = Some(text.into_owned());
                    } else if in_trk && document.track_name.is_none() {
                        document.track_name = Some(text.into_owned());
                    }
                }
            }
            Ok(Event::End(e)) => {
                match e.local_name().as_ref() {
                    b"trkpt" => {
                        if let Some(point) = pending_point.take() {
                            document.points.push(TrackPoint {
                                track_id: UNBOUND_ID,
                                position: point.position,
                                elevation: point.elevation.unwrap_or(0.0),
                                captured_at: point.time.unwrap_or_else(Utc::now),
                            });
                        }
                    }
                    b"wpt" => {
                        if let Some(waypoint) = pending_waypoint.take() {
                            document.waypoints.push(Waypoint {
                                id: UNBOUND_ID,
                                track_id: UNBOUND_ID,
                                position: waypoint.position,
                                description: waypoint.name.unwrap_or_default(),
                                photo_ref: None,
                            });
                        }
                    }
                    b"metadata" => in_metadata = false,
                    b"trk" => in_trk = false,
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::InvalidDocument(e.to_string())),
            _ => {}
        }
    }

    Ok(document)
}

fn lat_lon(e: &BytesStart<'_>) -> Result<GeoPoint, GpxError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| GpxError::InvalidDocument(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| GpxError::InvalidDocument(e.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"lat" => {
                lat = Some(
                    value
                        .parse()
                        .map_err(|_| GpxError::InvalidDocument(format!("bad lat `{value}`")))?,
                )
            }
            b"lon" => {
                lon = Some(
                    value
                        .parse()
                        .map_err(|_| GpxError::InvalidDocument(format!("bad lon `{value}`")))?,
                )
            }
            _ => {}
        }
    }

    Ok(GeoPoint {
        lat: lat.ok_or(GpxError::MissingAttribute("lat"))?,
        lon: lon.ok_or(GpxError::MissingAttribute("lon"))?,
    })
}
