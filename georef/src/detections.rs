//! Detection files: text found on one map sheet, with bounding boxes.
//!
//! Each file is a headerless CSV file with five fields per row. Exactly one
//! row starts with `MAP` and gives the extent of the sheet; every other row
//! is a line of detected text followed by its bounding box:
//!
//! ```text
//! MAP,1195000.0,8370000.0,1205000.0,8380000.0
//! Hamar,1198010.5,8377020.0,1198420.0,8376890.5
//! ```

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use crate::{crs::Crs, errors::Error, geo::BoundingBox, Result};

/// The first field of the record describing the map sheet itself.
pub const MAP_RECORD: &str = "MAP";

/// The number of fields in every record.
const FIELDS_PER_RECORD: usize = 5;

/// A line of text found on a map, with its bounding box as recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// The raw detected text.
    pub text: String,
    /// Where the text is on the map.
    pub bbox: BoundingBox,
}

/// The parsed contents of a detection file, in the map's own reference
/// system.
#[derive(Clone, Debug)]
pub struct DetectionFile {
    /// Where we loaded this from.
    pub path: PathBuf,
    /// The extent of the map sheet, as recorded.
    pub map: BoundingBox,
    /// Detected text, in file order.
    pub detections: Vec<Detection>,
}

impl DetectionFile {
    /// Parse the detection file at `path`. All coordinates are in `crs`.
    pub fn from_path(path: &Path, crs: Crs) -> Result<DetectionFile> {
        let file = File::open(path).map_err(|err| Error::io(path, err))?;
        DetectionFile::from_reader(file, path, crs)
    }

    /// Parse detection file data from `rdr`. `path` is used to label the
    /// result and any errors.
    pub fn from_reader<R: io::Read>(rdr: R, path: &Path, crs: Crs) -> Result<DetectionFile> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);

        let mut map = None;
        let mut detections = vec![];
        for record in rdr.records() {
            let record = record.map_err(|err| Error::csv(path, err))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if record.len() != FIELDS_PER_RECORD {
                return Err(Error::malformed(
                    path,
                    line,
                    format!(
                        "expected {} fields, found {}",
                        FIELDS_PER_RECORD,
                        record.len()
                    ),
                ));
            }

            let coord = |i: usize| parse_coordinate(&record[i], path, line);
            let bbox = BoundingBox::new(coord(1)?, coord(2)?, coord(3)?, coord(4)?, crs);
            if &record[0] == MAP_RECORD {
                if map.is_some() {
                    return Err(Error::malformed(path, line, "more than one MAP record"));
                }
                map = Some(bbox);
            } else {
                detections.push(Detection {
                    text: record[0].to_owned(),
                    bbox,
                });
            }
        }

        let map = map.ok_or_else(|| Error::malformed(path, 0, "no MAP record"))?;
        Ok(DetectionFile {
            path: path.to_owned(),
            map,
            detections,
        })
    }
}

/// Parse a single coordinate. Only plain finite numbers are accepted.
fn parse_coordinate(field: &str, path: &Path, line: u64) -> Result<f64> {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::malformed(
            path,
            line,
            format!("{:?} is not a valid coordinate", field),
        )),
    }
}
