//! Spherical Web Mercator (EPSG:3857).

use std::f64::consts::FRAC_PI_4;

use super::wrap_longitude;

/// Web Mercator projects WGS 84 coordinates onto a sphere with the WGS 84
/// semi-major axis as its radius.
const RADIUS: f64 = 6_378_137.0;

/// Longitude and latitude in degrees to easting and northing in metres.
/// Returns `None` at (or beyond) the poles, where the projection diverges.
pub(super) fn forward(lon: f64, lat: f64) -> Option<(f64, f64)> {
    if !lon.is_finite() || !(lat > -90.0 && lat < 90.0) {
        return None;
    }
    let x = RADIUS * lon.to_radians();
    let y = RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    if y.is_finite() {
        Some((x, y))
    } else {
        None
    }
}

/// Easting and northing in metres to longitude and latitude in degrees.
/// Defined everywhere; eastings past the antimeridian wrap around.
pub(super) fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = wrap_longitude((x / RADIUS).to_degrees());
    let lat = (2.0 * (y / RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
    (lon, lat)
}
