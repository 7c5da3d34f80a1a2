//! Deciding whether a matched place name is plausibly where the text is.

use serde::Serialize;

use crate::geo::{BoundingBox, GeoPoint};

/// The default margin, in multiples of the detection box's own width and
/// height. The published accuracy figures were computed with exactly one
/// box-width of slack on every side.
pub const DEFAULT_TOLERANCE_RATIO: f64 = 1.0;

/// What became of one detected name.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The text matched a place name, and the place is within tolerance of
    /// the text.
    Georeferenced {
        /// Distance from the centre of the text to the place.
        error_distance: f64,
    },
    /// The text matched a place name, but the place is somewhere else.
    Identified,
    /// The text didn't match any place name on this map.
    Unidentified,
}

impl MatchOutcome {
    /// A short, stable name for this outcome.
    pub fn status(&self) -> &'static str {
        match self {
            MatchOutcome::Georeferenced { .. } => "georeferenced",
            MatchOutcome::Identified => "identified",
            MatchOutcome::Unidentified => "unidentified",
        }
    }

    /// The georeferencing error, if any.
    pub fn error_distance(&self) -> Option<f64> {
        match *self {
            MatchOutcome::Georeferenced { error_distance } => Some(error_distance),
            _ => None,
        }
    }
}

/// Accepts points within a margin around a detection's bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToleranceValidator {
    ratio: f64,
}

impl Default for ToleranceValidator {
    fn default() -> Self {
        ToleranceValidator::new(DEFAULT_TOLERANCE_RATIO)
    }
}

impl ToleranceValidator {
    /// Allow `ratio` box-widths (and box-heights) of slack on each side.
    pub fn new(ratio: f64) -> ToleranceValidator {
        ToleranceValidator { ratio }
    }

    /// Is `point` within tolerance of `bbox`?
    ///
    /// The window is `[min_x - w, max_x + w] × [min_y - h, max_y + h]`, with
    /// `w` and `h` the absolute width and height of the box times our ratio,
    /// using the box's values exactly as recorded. Edges are inside.
    pub fn accepts(&self, point: &GeoPoint, bbox: &BoundingBox) -> bool {
        let tol_x = bbox.width() * self.ratio;
        let tol_y = bbox.height() * self.ratio;
        bbox.min_x - tol_x <= point.x
            && point.x <= bbox.max_x + tol_x
            && bbox.min_y - tol_y <= point.y
            && point.y <= bbox.max_y + tol_y
    }

    /// Classify a resolved match at `point` for text at `bbox`.
    pub fn classify(&self, point: &GeoPoint, bbox: &BoundingBox) -> MatchOutcome {
        if self.accepts(point, bbox) {
            MatchOutcome::Georeferenced {
                error_distance: bbox.centroid().distance(point),
            }
        } else {
            MatchOutcome::Identified
        }
    }
}

/// Is `point` within the default tolerance of `bbox`?
pub fn validate(point: &GeoPoint, bbox: &BoundingBox) -> bool {
    ToleranceValidator::default().accepts(point, bbox)
}
