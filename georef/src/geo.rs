//! Points and boxes in a planar reference system.

use serde::Serialize;

use crate::crs::{Crs, ProjectionError, Reprojector};

/// A coordinate pair tagged with the reference system it is expressed in.
///
/// For geographic systems, `x` is the longitude and `y` the latitude, both in
/// degrees. For projected systems they are easting and northing in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Easting or longitude.
    pub x: f64,
    /// Northing or latitude.
    pub y: f64,
    /// The reference system of `x` and `y`.
    #[serde(skip)]
    pub crs: Crs,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(x: f64, y: f64, crs: Crs) -> GeoPoint {
        GeoPoint { x, y, crs }
    }

    /// Express this point in another reference system.
    pub fn to_crs(self, to: Crs) -> Result<GeoPoint, ProjectionError> {
        Reprojector::new(self.crs, to).reproject(self)
    }

    /// The Euclidean distance between two points. Both points are assumed to
    /// be in the same planar system; we don't check.
    ///
    /// ```
    /// use georef::{crs::Crs, geo::GeoPoint};
    ///
    /// let a = GeoPoint::new(0.0, 0.0, Crs::WEB_MERCATOR);
    /// let b = GeoPoint::new(3.0, 4.0, Crs::WEB_MERCATOR);
    /// assert_eq!(5.0, a.distance(&b));
    /// ```
    pub fn distance(&self, other: &GeoPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned box, stored exactly as recorded.
///
/// Detection boxes converted from pixel space often have their "min" and
/// "max" northings swapped, because raster rows grow southward. We keep them
/// that way: the tolerance window in [`crate::tolerance`] is defined in terms
/// of the recorded values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    /// First recorded x.
    pub min_x: f64,
    /// First recorded y.
    pub min_y: f64,
    /// Second recorded x.
    pub max_x: f64,
    /// Second recorded y.
    pub max_y: f64,
    /// The reference system of all four values.
    #[serde(skip)]
    pub crs: Crs,
}

impl BoundingBox {
    /// Create a box from the four recorded values.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, crs: Crs) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
            crs,
        }
    }

    /// The recorded "min" corner.
    pub fn min_corner(&self) -> GeoPoint {
        GeoPoint::new(self.min_x, self.min_y, self.crs)
    }

    /// The recorded "max" corner.
    pub fn max_corner(&self) -> GeoPoint {
        GeoPoint::new(self.max_x, self.max_y, self.crs)
    }

    /// The mean of the recorded values on each axis.
    ///
    /// ```
    /// use georef::{crs::Crs, geo::BoundingBox};
    ///
    /// let bbox = BoundingBox::new(10.0, 20.0, 20.0, 10.0, Crs::WEB_MERCATOR);
    /// let c = bbox.centroid();
    /// assert_eq!((15.0, 15.0), (c.x, c.y));
    /// ```
    pub fn centroid(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            self.crs,
        )
    }

    /// The absolute width of the box.
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).abs()
    }

    /// The absolute height of the box.
    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).abs()
    }

    /// Reproject both recorded corners, keeping their order.
    pub fn reproject(&self, reprojector: &Reprojector) -> Result<Self, ProjectionError> {
        let min = reprojector.reproject(self.min_corner())?;
        let max = reprojector.reproject(self.max_corner())?;
        Ok(BoundingBox::new(min.x, min.y, max.x, max.y, reprojector.to()))
    }
}

/// The extent of one map sheet. Unlike [`BoundingBox`], this always has
/// `min <= max` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MapExtent {
    bbox: BoundingBox,
}

impl MapExtent {
    /// Build an extent from any two opposite corners.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> MapExtent {
        MapExtent {
            bbox: BoundingBox::new(
                a.x.min(b.x),
                a.y.min(b.y),
                a.x.max(b.x),
                a.y.max(b.y),
                a.crs,
            ),
        }
    }

    /// Build an extent from a recorded box, reordering values as needed.
    pub fn from_bbox(bbox: &BoundingBox) -> MapExtent {
        MapExtent::from_corners(bbox.min_corner(), bbox.max_corner())
    }

    /// The smallest x.
    pub fn min_x(&self) -> f64 {
        self.bbox.min_x
    }

    /// The smallest y.
    pub fn min_y(&self) -> f64 {
        self.bbox.min_y
    }

    /// The largest x.
    pub fn max_x(&self) -> f64 {
        self.bbox.max_x
    }

    /// The largest y.
    pub fn max_y(&self) -> f64 {
        self.bbox.max_y
    }

    /// The reference system of this extent.
    pub fn crs(&self) -> Crs {
        self.bbox.crs
    }

    /// Is `point` inside this extent? Edges count as inside.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.bbox.min_x <= point.x
            && point.x <= self.bbox.max_x
            && self.bbox.min_y <= point.y
            && point.y <= self.bbox.max_y
    }

    /// Reproject this extent. Both corners are converted and the result is
    /// reordered, so the invariant holds even if an axis flips.
    pub fn reproject(&self, reprojector: &Reprojector) -> Result<Self, ProjectionError> {
        let min = reprojector.reproject(self.bbox.min_corner())?;
        let max = reprojector.reproject(self.bbox.max_corner())?;
        Ok(MapExtent::from_corners(min, max))
    }
}
