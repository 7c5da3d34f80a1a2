//! Corpus-wide accuracy statistics.

use std::cmp::Ordering;

use serde::Serialize;

/// Running totals for some set of files.
///
/// Partial statistics from different files (or groups of files) can be
/// combined with [`CorpusStatistics::merge`] in any order and any grouping.
/// Only the order of `error_distances` depends on that, and nothing we
/// compute from it cares.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorpusStatistics {
    /// Gazetteer entries found inside map extents.
    pub placename_count: u64,
    /// Detections resolved to a place within tolerance.
    pub georeferenced_count: u64,
    /// Detections resolved to a place outside tolerance.
    pub identified_count: u64,
    /// The error of every georeferenced detection.
    pub error_distances: Vec<f64>,
    /// Files that were processed successfully.
    pub files_processed: u64,
    /// Files that were skipped because of an error.
    pub files_failed: u64,
}

impl CorpusStatistics {
    /// Statistics recording a single failed file.
    pub fn failure() -> CorpusStatistics {
        CorpusStatistics {
            files_failed: 1,
            ..CorpusStatistics::default()
        }
    }

    /// Combine two sets of statistics.
    pub fn merge(mut self, other: CorpusStatistics) -> CorpusStatistics {
        self.placename_count += other.placename_count;
        self.georeferenced_count += other.georeferenced_count;
        self.identified_count += other.identified_count;
        self.error_distances.extend(other.error_distances);
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self
    }

    /// Placenames that were neither georeferenced nor identified.
    ///
    /// This is a plain subtraction. Several detections may resolve to the
    /// same gazetteer entry, so it can come out negative.
    pub fn unidentified_count(&self) -> i64 {
        self.placename_count as i64
            - self.georeferenced_count as i64
            - self.identified_count as i64
    }

    /// Compute percentages and error statistics.
    pub fn summary(&self) -> Summary {
        let percent = |count: f64| {
            (self.placename_count > 0).then(|| count / self.placename_count as f64 * 100.0)
        };
        let error = ErrorStats::from_distances(&self.error_distances);
        Summary {
            placename_count: self.placename_count,
            georeferenced_count: self.georeferenced_count,
            georeferenced_percent: percent(self.georeferenced_count as f64),
            identified_count: self.identified_count,
            identified_percent: percent(self.identified_count as f64),
            unidentified_count: self.unidentified_count(),
            unidentified_percent: percent(self.unidentified_count() as f64),
            error_mean: error.map(|e| e.mean),
            error_median: error.map(|e| e.median),
            error_std_dev: error.map(|e| e.std_dev),
            files_processed: self.files_processed,
            files_failed: self.files_failed,
        }
    }
}

/// Summary statistics of georeferencing errors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorStats {
    /// The arithmetic mean.
    pub mean: f64,
    /// The median. For an even number of values, the mean of the middle two.
    pub median: f64,
    /// The population standard deviation.
    pub std_dev: f64,
}

impl ErrorStats {
    /// Compute statistics for `distances`, or `None` if there aren't any.
    ///
    /// ```
    /// use georef::stats::ErrorStats;
    ///
    /// let stats = ErrorStats::from_distances(&[4.0, 1.0, 2.0, 5.0]).unwrap();
    /// assert_eq!(3.0, stats.mean);
    /// assert_eq!(3.0, stats.median);
    /// assert!(ErrorStats::from_distances(&[]).is_none());
    /// ```
    pub fn from_distances(distances: &[f64]) -> Option<ErrorStats> {
        if distances.is_empty() {
            return None;
        }
        let n = distances.len() as f64;
        let mean = distances.iter().sum::<f64>() / n;
        let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = distances.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(ErrorStats {
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// Final figures for a corpus. Values which can't be computed (percentages
/// of zero placenames, or error statistics without any errors) are `None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    /// Gazetteer entries found inside map extents.
    pub placename_count: u64,
    /// Detections georeferenced within tolerance.
    pub georeferenced_count: u64,
    /// `georeferenced_count` as a percentage of `placename_count`.
    pub georeferenced_percent: Option<f64>,
    /// Detections matched to a place outside tolerance.
    pub identified_count: u64,
    /// `identified_count` as a percentage of `placename_count`.
    pub identified_percent: Option<f64>,
    /// Placenames left over. May be negative.
    pub unidentified_count: i64,
    /// `unidentified_count` as a percentage of `placename_count`.
    pub unidentified_percent: Option<f64>,
    /// Mean georeferencing error.
    pub error_mean: Option<f64>,
    /// Median georeferencing error.
    pub error_median: Option<f64>,
    /// Population standard deviation of the georeferencing error.
    pub error_std_dev: Option<f64>,
    /// Files processed successfully.
    pub files_processed: u64,
    /// Files skipped because of errors.
    pub files_failed: u64,
}
