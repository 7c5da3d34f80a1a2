//! Running one detection file through the whole matching process.

use std::path::{Path, PathBuf};

use log::debug;

use crate::{
    abbreviations::Abbreviations,
    config::MatchConfig,
    crs::Reprojector,
    detections::{Detection, DetectionFile},
    gazetteer::Gazetteer,
    geo::{GeoPoint, MapExtent},
    matcher::DetectedName,
    resolve::resolve,
    stats::CorpusStatistics,
    tolerance::MatchOutcome,
    Result,
};

/// What happened to one distinct piece of detected text.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchRecord {
    /// The raw text of the detection we kept.
    pub detected_text: String,
    /// The normalized text.
    pub normalized_text: String,
    /// The gazetteer name we resolved it to, if any.
    pub matched_name: Option<String>,
    /// Where that place is, in the working reference system.
    pub matched_location: Option<GeoPoint>,
    /// The similarity score of the resolved match.
    pub score: Option<f64>,
    /// How many gazetteer entries passed the threshold.
    pub candidate_count: usize,
    /// The final verdict.
    pub outcome: MatchOutcome,
}

/// The results for a single detection file.
#[derive(Clone, Debug)]
pub struct FileReport {
    /// The file we processed.
    pub path: PathBuf,
    /// How many gazetteer entries lie on this map.
    pub placename_count: usize,
    /// One record per distinct normalized text, in order of first appearance.
    pub records: Vec<MatchRecord>,
}

impl FileReport {
    /// How many records have this status?
    fn count(&self, status: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.status() == status)
            .count()
    }

    /// Summarize this file as partial corpus statistics.
    pub fn statistics(&self) -> CorpusStatistics {
        CorpusStatistics {
            placename_count: self.placename_count as u64,
            georeferenced_count: self.count("georeferenced") as u64,
            identified_count: self.count("identified") as u64,
            error_distances: self
                .records
                .iter()
                .filter_map(|r| r.outcome.error_distance())
                .collect(),
            files_processed: 1,
            files_failed: 0,
        }
    }
}

/// Everything needed to process detection files, shared read-only by every
/// file in a run.
#[derive(Debug)]
pub struct Pipeline {
    config: MatchConfig,
    abbreviations: Abbreviations,
    /// The gazetteer, already in our working reference system.
    gazetteer: Gazetteer,
}

impl Pipeline {
    /// Create a new pipeline. The gazetteer is converted to the working
    /// reference system up front; if any entry can't be converted, we fail.
    ///
    /// Every file shares this gazetteer, so such a failure would fail each
    /// file in the batch anyway, and a batch where no file succeeds is an
    /// error. Reporting it once here ends the run the same way.
    pub fn new(
        config: MatchConfig,
        abbreviations: Abbreviations,
        gazetteer: Gazetteer,
    ) -> Result<Pipeline> {
        config.validate()?;
        let gazetteer = gazetteer.reproject(config.working_crs())?;
        Ok(Pipeline {
            config,
            abbreviations,
            gazetteer,
        })
    }

    /// Our configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Load and process the detection file at `path`.
    pub fn process_path(&self, path: &Path) -> Result<FileReport> {
        let file = DetectionFile::from_path(path, self.config.detection_crs)?;
        self.process(&file)
    }

    /// Process an already-parsed detection file.
    pub fn process(&self, file: &DetectionFile) -> Result<FileReport> {
        let reprojector = Reprojector::new(file.map.crs, self.config.working_crs());
        let extent = MapExtent::from_bbox(&file.map).reproject(&reprojector)?;
        let detections = file
            .detections
            .iter()
            .map(|d| {
                Ok(Detection {
                    text: d.text.clone(),
                    bbox: d.bbox.reproject(&reprojector)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let names = DetectedName::collect(&detections, &self.abbreviations);
        let placenames = self.gazetteer.within(&extent);
        let matches = self.config.matcher().match_all(&names, &placenames);
        let validator = self.config.validator();

        let records = matches
            .iter()
            .map(|list| {
                let detection = list.detection;
                let resolved = resolve(&list.candidates, &detection.bbox);
                let outcome = match resolved {
                    Some(candidate) => {
                        validator.classify(&candidate.entry.location, &detection.bbox)
                    }
                    None => MatchOutcome::Unidentified,
                };
                MatchRecord {
                    detected_text: detection.raw_text.clone(),
                    normalized_text: detection.text.clone(),
                    matched_name: resolved.map(|c| c.entry.name.clone()),
                    matched_location: resolved.map(|c| c.entry.location),
                    score: resolved.map(|c| c.score),
                    candidate_count: list.candidates.len(),
                    outcome,
                }
            })
            .collect::<Vec<_>>();

        let report = FileReport {
            path: file.path.clone(),
            placename_count: placenames.len(),
            records,
        };
        debug!(
            "{}: {} placenames on map, {} distinct detections, {} georeferenced, {} identified",
            file.path.display(),
            report.placename_count,
            report.records.len(),
            report.count("georeferenced"),
            report.count("identified"),
        );
        Ok(report)
    }
}
