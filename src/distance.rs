use crate::types::track::{GeoPoint, TrackPoint};

/// Spherical Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine).
///
/// Symmetric, zero for identical points, finite for any valid pair
/// including antipodes. Spherical model; ellipsoidal flattening is ignored,
/// which is fine at foot/bike/vehicle track scale.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Floating-point overshoot past 1.0 would make the sqrt NaN.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Total path length of an ordered point sequence: the sum of pairwise
/// distances between consecutive points. Live recording keeps the running
/// total itself; this full walk is only used on import.
pub fn accumulate(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| distance_meters(w[0].position, w[1].position))
        .sum()
}
