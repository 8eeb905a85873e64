use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use crate::error::GpxError;
use crate::gpx::{GPX_CREATOR, GPX_NAMESPACE, GPX_VERSION, TIME_FORMAT};
use crate::types::track::{Track, TrackPoint, Waypoint};

type XmlResult = Result<(), quick_xml::Error>;

/// Serializes a track with its ordered points and waypoints to a GPX 1.1
/// document.
///
/// Points are written in the order given; callers pass them in capture
/// order and the writer never re-sorts. Text content (track name, waypoint
/// descriptions) is escaped, so reserved markup characters cannot break the
/// document.
pub fn serialize(
    track: &Track,
    points: &[TrackPoint],
    waypoints: &[Waypoint],
) -> Result<String, GpxError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| GpxError::WriteFailed(e.to_string()))?;

    writer
        .create_element("gpx")
        .with_attributes([
            ("version", GPX_VERSION),
            ("creator", GPX_CREATOR),
            ("xmlns", GPX_NAMESPACE),
        ])
        .write_inner_content(|gpx| -> XmlResult {
            gpx.create_element("metadata")
                .write_inner_content(|meta| -> XmlResult {
                    meta.create_element("name")
                        .write_text_content(BytesText::new(&track.name))?;
                    meta.create_element("desc")
                        .write_text_content(BytesText::new(&format!(
                            "Activity: {}",
                            track.activity_kind
                        )))?;
                    Ok(())
                })?;

            gpx.create_element("trk")
                .write_inner_content(|trk| -> XmlResult {
                    trk.create_element("name")
                        .write_text_content(BytesText::new(&track.name))?;
                    trk.create_element("trkseg")
                        .write_inner_content(|seg| -> XmlResult {
                            for point in points {
                                seg.create_element("trkpt")
                                    .with_attributes([
                                        ("lat", point.position.lat.to_string().as_str()),
                                        ("lon", point.position.lon.to_string().as_str()),
                                    ])
                                    .write_inner_content(|trkpt| -> XmlResult {
                                        trkpt.create_element("ele").write_text_content(
                                            BytesText::new(&point.elevation.to_string()),
                                        )?;
                                        trkpt.create_element("time").write_text_content(
                                            BytesText::new(
                                                &point.captured_at.format(TIME_FORMAT).to_string(),
                                            ),
                                        )?;
                                        Ok(())
                                    })?;
                            }
                            Ok(())
                        })?;
                    Ok(())
                })?;

            for waypoint in waypoints {
                gpx.create_element("wpt")
                    .with_attributes([
                        ("lat", waypoint.position.lat.to_string().as_str()),
                        ("lon", waypoint.position.lon.to_string().as_str()),
                    ])
                    .write_inner_content(|wpt| -> XmlResult {
                        wpt.create_element("name")
                            .write_text_content(BytesText::new(&waypoint.description))?;
                        Ok(())
                    })?;
            }
            Ok(())
        })
        .map_err(|e| GpxError::WriteFailed(e.to_string()))?;

    String::from_utf8(writer.into_inner()).map_err(|e| GpxError::WriteFailed(e.to_string()))
}
