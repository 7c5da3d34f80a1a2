//! Authoritative place names with coordinates.

use std::{fs::File, io, path::Path};

use log::debug;
use serde::Deserialize;

use crate::{
    crs::{Crs, Reprojector},
    errors::Error,
    geo::{GeoPoint, MapExtent},
    Result,
};

/// A single place name and its location.
#[derive(Clone, Debug, PartialEq)]
pub struct GazetteerEntry {
    /// The canonical spelling of the name.
    pub name: String,
    /// Where the place is.
    pub location: GeoPoint,
}

/// One row of a gazetteer CSV file: `name,x,y`.
#[derive(Debug, Deserialize)]
struct GazetteerRow(String, f64, f64);

/// A list of place names, all in the same reference system. The order of
/// entries is significant: it breaks ties when a detection is equally close
/// to several candidates.
#[derive(Clone, Debug)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
    crs: Crs,
}

impl Gazetteer {
    /// Create a gazetteer from entries. Every entry must be in `crs`.
    pub fn new(entries: Vec<GazetteerEntry>, crs: Crs) -> Gazetteer {
        debug_assert!(entries.iter().all(|e| e.location.crs == crs));
        Gazetteer { entries, crs }
    }

    /// Load a headerless `name,x,y` CSV file with coordinates in `crs`.
    pub fn from_path(path: &Path, crs: Crs) -> Result<Gazetteer> {
        let file = File::open(path).map_err(|err| Error::io(path, err))?;
        Gazetteer::from_reader(file, path, crs)
    }

    /// Load gazetteer CSV data from `rdr`. `path` is only used to label
    /// errors.
    pub fn from_reader<R: io::Read>(rdr: R, path: &Path, crs: Crs) -> Result<Gazetteer> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(rdr);
        let mut entries = vec![];
        for row in rdr.deserialize::<GazetteerRow>() {
            let GazetteerRow(name, x, y) = row.map_err(|err| Error::csv(path, err))?;
            entries.push(GazetteerEntry {
                name,
                location: GeoPoint::new(x, y, crs),
            });
        }
        debug!("loaded {} gazetteer entries from {}", entries.len(), path.display());
        Ok(Gazetteer::new(entries, crs))
    }

    /// The reference system of all our entries.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// How many entries do we have?
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Do we have any entries at all?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over our entries in their original order.
    pub fn iter(&self) -> impl Iterator<Item = &GazetteerEntry> {
        self.entries.iter()
    }

    /// Return a copy of this gazetteer expressed in `to`. Fails if any entry
    /// can't be converted.
    pub fn reproject(&self, to: Crs) -> Result<Gazetteer> {
        let reprojector = Reprojector::new(self.crs, to);
        if reprojector.is_identity() {
            return Ok(self.clone());
        }
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                Ok(GazetteerEntry {
                    name: entry.name.clone(),
                    location: reprojector.reproject(entry.location)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Gazetteer::new(entries, to))
    }

    /// All entries inside `extent`, edges included, in their original order.
    /// The extent must already be in our reference system. An empty result is
    /// normal: it just means the map shows none of our places.
    pub fn within(&self, extent: &MapExtent) -> Vec<&GazetteerEntry> {
        debug_assert_eq!(extent.crs(), self.crs, "extent is in the wrong system");
        self.entries
            .iter()
            .filter(|entry| extent.contains(&entry.location))
            .collect()
    }
}
