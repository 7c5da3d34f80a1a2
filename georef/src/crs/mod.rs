//! Coordinate reference systems and conversions between them.
//!
//! We support the handful of systems that show up when georeferencing
//! scanned map sheets: geographic WGS 84 and ETRS89, spherical Web Mercator
//! (what most tile servers and GeoTIFF exports use) and UTM. Every conversion
//! goes through geographic coordinates. ETRS89 and WGS 84 are treated as the
//! same datum; they drift apart by well under a metre, which is far below the
//! size of a printed place name.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::geo::GeoPoint;

mod transverse_mercator;
mod web_mercator;

use self::transverse_mercator::TransverseMercator;

/// Why a coordinate could not be converted.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ProjectionError {
    /// We don't know this reference system.
    #[error("unsupported reference system {0:?}")]
    UnsupportedCrs(String),

    /// The point can't be represented in (or converted from) this system.
    #[error("({x}, {y}) is outside the valid domain of {crs}")]
    OutOfDomain {
        /// The offending x (or longitude).
        x: f64,
        /// The offending y (or latitude).
        y: f64,
        /// The system in which the point was invalid.
        crs: Crs,
    },
}

/// A geodetic datum. Only the ellipsoid matters to us.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Datum {
    /// World Geodetic System 1984.
    Wgs84,
    /// European Terrestrial Reference System 1989 (GRS 80 ellipsoid).
    Etrs89,
}

impl Datum {
    /// The ellipsoid used by this datum.
    pub(crate) fn ellipsoid(self) -> Ellipsoid {
        match self {
            Datum::Wgs84 => Ellipsoid {
                a: 6_378_137.0,
                f: 1.0 / 298.257_223_563,
            },
            Datum::Etrs89 => Ellipsoid {
                a: 6_378_137.0,
                f: 1.0 / 298.257_222_101,
            },
        }
    }
}

/// Semi-major axis and flattening.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ellipsoid {
    pub(crate) a: f64,
    pub(crate) f: f64,
}

/// A supported coordinate reference system.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Crs {
    /// Longitude and latitude in degrees.
    Geographic(Datum),
    /// Spherical ("pseudo") Web Mercator, EPSG:3857.
    WebMercator,
    /// Universal Transverse Mercator.
    Utm {
        /// Zone number, 1 to 60.
        zone: u8,
        /// Northern hemisphere?
        north: bool,
        /// Datum of the zone.
        datum: Datum,
    },
}

impl Crs {
    /// EPSG:4326.
    pub const WGS84: Crs = Crs::Geographic(Datum::Wgs84);
    /// EPSG:4258.
    pub const ETRS89: Crs = Crs::Geographic(Datum::Etrs89);
    /// EPSG:3857.
    pub const WEB_MERCATOR: Crs = Crs::WebMercator;
    /// EPSG:25832, the system used by the Norwegian place-name register.
    pub const UTM32N_ETRS89: Crs = Crs::Utm {
        zone: 32,
        north: true,
        datum: Datum::Etrs89,
    };

    /// Look up a system by EPSG code.
    pub fn from_epsg(code: u32) -> Result<Crs, ProjectionError> {
        let unsupported = || ProjectionError::UnsupportedCrs(format!("EPSG:{}", code));
        let crs = match code {
            4326 => Crs::WGS84,
            4258 => Crs::ETRS89,
            3857 | 900913 => Crs::WebMercator,
            32601..=32660 => Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
                datum: Datum::Wgs84,
            },
            32701..=32760 => Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
                datum: Datum::Wgs84,
            },
            25828..=25838 => Crs::Utm {
                zone: (code - 25800) as u8,
                north: true,
                datum: Datum::Etrs89,
            },
            _ => return Err(unsupported()),
        };
        Ok(crs)
    }

    /// The EPSG code of this system.
    pub fn epsg(&self) -> u32 {
        match *self {
            Crs::Geographic(Datum::Wgs84) => 4326,
            Crs::Geographic(Datum::Etrs89) => 4258,
            Crs::WebMercator => 3857,
            Crs::Utm {
                zone,
                north: true,
                datum: Datum::Wgs84,
            } => 32600 + u32::from(zone),
            Crs::Utm {
                zone,
                north: false,
                datum: Datum::Wgs84,
            } => 32700 + u32::from(zone),
            // ETRS89 only defines northern zones, and `from_epsg` won't create
            // anything else.
            Crs::Utm {
                zone,
                datum: Datum::Etrs89,
                ..
            } => 25800 + u32::from(zone),
        }
    }

    /// The datum of this system. Web Mercator is defined on WGS 84.
    pub fn datum(&self) -> Datum {
        match *self {
            Crs::Geographic(datum) | Crs::Utm { datum, .. } => datum,
            Crs::WebMercator => Datum::Wgs84,
        }
    }

    /// Convert `(x, y)` in this system to longitude and latitude in degrees.
    fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(self.out_of_domain(x, y));
        }
        match *self {
            Crs::Geographic(_) => {
                if (-180.0..=180.0).contains(&x) && (-90.0..=90.0).contains(&y) {
                    Ok((x, y))
                } else {
                    Err(self.out_of_domain(x, y))
                }
            }
            Crs::WebMercator => Ok(web_mercator::inverse(x, y)),
            Crs::Utm { zone, north, datum } => {
                TransverseMercator::utm(zone, north, datum.ellipsoid())
                    .inverse(x, y)
                    .ok_or_else(|| self.out_of_domain(x, y))
            }
        }
    }

    /// Convert longitude and latitude in degrees to `(x, y)` in this system.
    fn from_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        let result = match *self {
            Crs::Geographic(_) => Some((wrap_longitude(lon), lat)),
            Crs::WebMercator => web_mercator::forward(lon, lat),
            Crs::Utm { zone, north, datum } => {
                TransverseMercator::utm(zone, north, datum.ellipsoid()).forward(lon, lat)
            }
        };
        result.ok_or_else(|| ProjectionError::OutOfDomain {
            x: lon,
            y: lat,
            crs: *self,
        })
    }

    fn out_of_domain(&self, x: f64, y: f64) -> ProjectionError {
        ProjectionError::OutOfDomain { x, y, crs: *self }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = ProjectionError;

    /// Parse `EPSG:3857`, `epsg:3857` or just `3857`.
    fn from_str(s: &str) -> Result<Crs, ProjectionError> {
        let trimmed = s.trim();
        let code = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("epsg:") => &trimmed[5..],
            _ => trimmed,
        };
        let code = code
            .parse::<u32>()
            .map_err(|_| ProjectionError::UnsupportedCrs(s.to_owned()))?;
        Crs::from_epsg(code).map_err(|_| ProjectionError::UnsupportedCrs(s.to_owned()))
    }
}

/// Converts coordinates from one fixed system to another.
#[derive(Clone, Copy, Debug)]
pub struct Reprojector {
    from: Crs,
    to: Crs,
}

impl Reprojector {
    /// Create a reprojector between two systems.
    pub fn new(from: Crs, to: Crs) -> Reprojector {
        Reprojector { from, to }
    }

    /// The source system.
    pub fn from(&self) -> Crs {
        self.from
    }

    /// The target system.
    pub fn to(&self) -> Crs {
        self.to
    }

    /// Does this reprojector leave coordinates untouched?
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    /// Convert a raw coordinate pair.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if self.is_identity() {
            return Ok((x, y));
        }
        let (lon, lat) = self.from.to_geographic(x, y)?;
        self.to.from_geographic(lon, lat)
    }

    /// Convert a point, which must be expressed in our source system.
    pub fn reproject(&self, point: GeoPoint) -> Result<GeoPoint, ProjectionError> {
        debug_assert_eq!(point.crs, self.from, "point is in the wrong system");
        let (x, y) = self.transform(point.x, point.y)?;
        Ok(GeoPoint::new(x, y, self.to))
    }
}

/// Convert `point` from `from` to `to`.
pub fn reproject(point: GeoPoint, from: Crs, to: Crs) -> Result<GeoPoint, ProjectionError> {
    let point = GeoPoint { crs: from, ..point };
    Reprojector::new(from, to).reproject(point)
}

/// Wrap a longitude in degrees into `[-180, 180]`.
pub(crate) fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
