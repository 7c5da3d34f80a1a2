//! Fuzzy matching of detected text against gazetteer names.

use std::collections::HashMap;

use log::debug;

use crate::{
    abbreviations::Abbreviations,
    detections::Detection,
    gazetteer::GazetteerEntry,
    geo::BoundingBox,
    normalize::normalize,
    similarity::SimilarityMetric,
};

/// The default minimum similarity for a match.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// A distinct piece of normalized text found on a map.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedName {
    /// The normalized text. Unique within one map.
    pub text: String,
    /// The raw text of the detection we kept.
    pub raw_text: String,
    /// Where that detection is on the map.
    pub bbox: BoundingBox,
}

impl DetectedName {
    /// Normalize `detections`, drop the noise, and collapse detections with
    /// the same normalized text into one. The result is in order of first
    /// appearance, but when text repeats, the last detection's box wins.
    pub fn collect(detections: &[Detection], abbreviations: &Abbreviations) -> Vec<DetectedName> {
        let mut names: Vec<DetectedName> = vec![];
        let mut index: HashMap<String, usize> = HashMap::new();
        for detection in detections {
            let Some(text) = normalize(&detection.text, abbreviations) else {
                continue;
            };
            match index.get(&text) {
                Some(&i) => {
                    debug!("{:?} appears more than once; keeping the last box", text);
                    names[i].raw_text = detection.text.clone();
                    names[i].bbox = detection.bbox;
                }
                None => {
                    index.insert(text.clone(), names.len());
                    names.push(DetectedName {
                        text,
                        raw_text: detection.text.clone(),
                        bbox: detection.bbox,
                    });
                }
            }
        }
        names
    }
}

/// A gazetteer entry whose name is similar enough to a detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchCandidate<'a> {
    /// The matching entry.
    pub entry: &'a GazetteerEntry,
    /// How similar the names are, in `[0, 1]`.
    pub score: f64,
}

/// A detected name, and every candidate that matched it, in gazetteer
/// order.
#[derive(Clone, Debug)]
pub struct CandidateList<'a> {
    /// The detection.
    pub detection: &'a DetectedName,
    /// The candidates. Empty if nothing matched.
    pub candidates: Vec<MatchCandidate<'a>>,
}

/// Compares detected names against gazetteer names.
#[derive(Clone, Copy, Debug)]
pub struct FuzzyMatcher {
    metric: SimilarityMetric,
    threshold: f64,
    fold_case: bool,
}

impl FuzzyMatcher {
    /// Accept pairs scoring at least `threshold` under `metric`.
    pub fn new(metric: SimilarityMetric, threshold: f64) -> FuzzyMatcher {
        FuzzyMatcher {
            metric,
            threshold,
            fold_case: false,
        }
    }

    /// Lower-case gazetteer names before comparing them. Detected text is
    /// always lower-cased by normalization, but gazetteer names are compared
    /// as stored unless this is set.
    pub fn fold_case(mut self, fold_case: bool) -> FuzzyMatcher {
        self.fold_case = fold_case;
        self
    }

    /// Score every detection against every candidate entry. Each detection
    /// may match several entries, and each entry may match several
    /// detections; sorting that out happens later. The result has one list
    /// per detection, in detection order.
    pub fn match_all<'a>(
        &self,
        detections: &'a [DetectedName],
        entries: &[&'a GazetteerEntry],
    ) -> Vec<CandidateList<'a>> {
        let names: Vec<String> = entries
            .iter()
            .map(|entry| {
                if self.fold_case {
                    entry.name.to_lowercase()
                } else {
                    entry.name.clone()
                }
            })
            .collect();

        detections
            .iter()
            .map(|detection| {
                let candidates = entries
                    .iter()
                    .zip(&names)
                    .filter_map(|(&entry, name)| {
                        let score = self.metric.similarity(name, &detection.text);
                        (score >= self.threshold).then_some(MatchCandidate { entry, score })
                    })
                    .collect();
                CandidateList {
                    detection,
                    candidates,
                }
            })
            .collect()
    }
}
