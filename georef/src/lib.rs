//! Georeferencing place names found on scanned historical maps.
//!
//! Text detected on a map sheet is normalized, matched against a gazetteer
//! of known places, and checked against where it appears on the sheet. A
//! detection is *georeferenced* if it matches a place close to where the text
//! is printed, *identified* if it matches a place somewhere else, and
//! *unidentified* if nothing matches. Results for a whole corpus are
//! summarized as percentages of the places that lie on each map, plus the
//! distribution of georeferencing errors.
//!
//! The main entry points are [`pipeline::Pipeline`] for a single detection
//! file and [`corpus::CorpusAggregator`] for a directory of them.

#![warn(missing_docs)]

pub mod abbreviations;
pub mod config;
pub mod corpus;
pub mod crs;
pub mod detections;
pub mod errors;
pub mod gazetteer;
pub mod geo;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod similarity;
pub mod stats;
pub mod tolerance;
pub mod ui;

pub use self::errors::{Error, Result};
