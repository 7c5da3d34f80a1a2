//! Transverse Mercator on an ellipsoid, using the Krüger series as given
//! for UTM. Third-order terms are accurate to well under a millimetre within
//! a zone, and to centimetres a few zones away from the central meridian.

use super::{wrap_longitude, Ellipsoid};

/// UTM scale factor on the central meridian.
const UTM_SCALE: f64 = 0.9996;

/// UTM false easting, in metres.
const UTM_FALSE_EASTING: f64 = 500_000.0;

/// UTM false northing for southern zones, in metres.
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A Transverse Mercator projection with fixed parameters.
#[derive(Clone, Debug)]
pub(super) struct TransverseMercator {
    /// Central meridian, in degrees.
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    /// Scale factor times the rectifying radius.
    k0_a: f64,
    /// First eccentricity.
    e: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl TransverseMercator {
    /// The projection for a UTM zone.
    pub(super) fn utm(zone: u8, north: bool, ellipsoid: Ellipsoid) -> TransverseMercator {
        let lon0 = -183.0 + 6.0 * f64::from(zone);
        let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
        TransverseMercator::new(lon0, UTM_SCALE, UTM_FALSE_EASTING, false_northing, ellipsoid)
    }

    fn new(
        lon0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> TransverseMercator {
        let f = ellipsoid.f;
        let n = f / (2.0 - f);
        let (n2, n3) = (n * n, n * n * n);
        let rectifying_radius = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        TransverseMercator {
            lon0,
            false_easting,
            false_northing,
            k0_a: k0 * rectifying_radius,
            e: (f * (2.0 - f)).sqrt(),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }

    /// Longitude and latitude in degrees to easting and northing. Returns
    /// `None` for points 90° or more from the central meridian, where the
    /// projection is undefined.
    pub(super) fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        let dlon = wrap_longitude(lon - self.lon0);
        if dlon.abs() >= 90.0 {
            return None;
        }
        let (phi, dlam) = (lat.to_radians(), dlon.to_radians());

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - self.e * (self.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(dlam.cos());
        let eta_p = (dlam.sin() / (1.0 + t * t).sqrt()).atanh();

        let (mut xi, mut eta) = (xi_p, eta_p);
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let x = self.false_easting + self.k0_a * eta;
        let y = self.false_northing + self.k0_a * xi;
        if x.is_finite() && y.is_finite() {
            Some((x, y))
        } else {
            None
        }
    }

    /// Easting and northing to longitude and latitude in degrees.
    pub(super) fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let xi = (y - self.false_northing) / self.k0_a;
        let eta = (x - self.false_easting) / self.k0_a;

        let (mut xi_p, mut eta_p) = (xi, eta);
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            phi += delta * (2.0 * (j + 1) as f64 * chi).sin();
        }
        let dlam = eta_p.sinh().atan2(xi_p.cos());

        let lon = wrap_longitude(self.lon0 + dlam.to_degrees());
        let lat = phi.to_degrees();
        if lon.is_finite() && lat.is_finite() && (-90.0..=90.0).contains(&lat) {
            Some((lon, lat))
        } else {
            None
        }
    }
}
