//! Processing a whole directory of detection files.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use indicatif::ProgressBar;
use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    errors::Error,
    pipeline::{FileReport, Pipeline},
    stats::CorpusStatistics,
    Result,
};

/// How to run a batch.
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// How many worker threads to use. `None` lets `rayon` decide.
    pub jobs: Option<usize>,
    /// Give up on the first file that fails, instead of skipping it.
    pub fail_fast: bool,
}

/// The outcome of a batch run.
#[derive(Debug)]
pub struct BatchResult {
    /// Combined statistics for all files.
    pub statistics: CorpusStatistics,
    /// The detailed results for each successful file, in path order.
    pub reports: Vec<FileReport>,
}

/// List the regular files in `dir`, sorted by path. Subdirectories are
/// ignored.
pub fn detection_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for entry in fs::read_dir(dir).map_err(|err| Error::io(dir, err))? {
        let path = entry.map_err(|err| Error::io(dir, err))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Runs a [`Pipeline`] over many files and adds up the results.
pub struct CorpusAggregator<'p> {
    pipeline: &'p Pipeline,
    options: BatchOptions,
}

impl<'p> CorpusAggregator<'p> {
    /// Create a new aggregator.
    pub fn new(pipeline: &'p Pipeline, options: BatchOptions) -> CorpusAggregator<'p> {
        CorpusAggregator { pipeline, options }
    }

    /// Process every detection file in `dir`.
    pub fn run_dir(&self, dir: &Path, progress: &ProgressBar) -> Result<BatchResult> {
        let paths = detection_files(dir)?;
        debug!("found {} detection files in {}", paths.len(), dir.display());
        self.run(&paths, progress)
    }

    /// Process `paths` in parallel.
    ///
    /// Failed files are logged and counted, unless we're failing fast, in
    /// which case we stop starting new files and report the first failure in
    /// path order. If there was at least one file and none of them
    /// succeeded, that's an error too.
    pub fn run(&self, paths: &[PathBuf], progress: &ProgressBar) -> Result<BatchResult> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = self.options.jobs {
            builder = builder.num_threads(jobs);
        }
        let pool = builder.build().map_err(|err| {
            Error::invalid_config(format!("could not start worker threads: {}", err))
        })?;

        // Under `fail_fast`, this holds the index of the earliest failed
        // file, and files after it are never started. Every file before it
        // still runs, so the error we report is always the first failure in
        // path order.
        let first_failure = AtomicUsize::new(usize::MAX);
        progress.set_length(paths.len() as u64);
        let results: Vec<(&PathBuf, Option<Result<FileReport>>)> = pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(idx, path)| {
                    if self.options.fail_fast && idx > first_failure.load(Ordering::SeqCst) {
                        return (path, None);
                    }
                    let result = self.pipeline.process_path(path);
                    if self.options.fail_fast && result.is_err() {
                        first_failure.fetch_min(idx, Ordering::SeqCst);
                    }
                    progress.inc(1);
                    (path, Some(result))
                })
                .collect()
        });
        progress.finish_and_clear();

        let mut statistics = CorpusStatistics::default();
        let mut reports = vec![];
        for (path, result) in results {
            match result {
                None => {}
                Some(Ok(report)) => {
                    statistics = statistics.merge(report.statistics());
                    reports.push(report);
                }
                Some(Err(err)) if self.options.fail_fast => {
                    return Err(Error::BatchAborted {
                        path: path.to_owned(),
                        source: Box::new(err),
                    });
                }
                Some(Err(err)) => {
                    warn!("skipping {}: {}", path.display(), display_chain(&err));
                    statistics = statistics.merge(CorpusStatistics::failure());
                }
            }
        }

        if statistics.files_processed == 0 && statistics.files_failed > 0 {
            return Err(Error::NoFileSucceeded {
                failed: statistics.files_failed as usize,
            });
        }
        if statistics.unidentified_count() < 0 {
            warn!(
                "more detections were resolved than there are placenames on the maps \
                 ({} unidentified); several detections probably matched the same place",
                statistics.unidentified_count()
            );
        }
        Ok(BatchResult {
            statistics,
            reports,
        })
    }
}

/// Format an error with all of its causes on one line.
fn display_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        abbreviations::{AbbreviationRule, Abbreviations},
        config::MatchConfig,
        crs::Crs,
        gazetteer::{Gazetteer, GazetteerEntry},
        geo::GeoPoint,
    };

    const CRS: Crs = Crs::UTM32N_ETRS89;

    fn pipeline() -> Pipeline {
        let config = MatchConfig {
            detection_crs: CRS,
            gazetteer_crs: CRS,
            ..MatchConfig::default()
        };
        let abbreviations: Abbreviations =
            vec![AbbreviationRule::new("osl", "oslo")].into_iter().collect();
        let entries = [("oslo", 15.0, 15.0), ("hamar", 60.0, 60.0)]
            .iter()
            .map(|&(name, x, y)| GazetteerEntry {
                name: name.to_owned(),
                location: GeoPoint::new(x, y, CRS),
            })
            .collect();
        Pipeline::new(config, abbreviations, Gazetteer::new(entries, CRS)).unwrap()
    }

    fn write_files(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, data) in files {
            fs::write(dir.path().join(name), data).unwrap();
        }
        fs::create_dir(dir.path().join("subdir")).unwrap();
        dir
    }

    const GOOD: &str = "MAP,0,0,100,100\nosl,10,10,20,20\n";

    #[test]
    fn files_are_listed_in_order() {
        let dir = write_files(&[("b.csv", GOOD), ("a.csv", GOOD)]);
        let paths = detection_files(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(vec!["a.csv", "b.csv"], names);
    }

    #[test]
    fn failed_files_are_skipped() {
        let dir = write_files(&[("a.csv", GOOD), ("b.csv", "osl,1,2,3,4\n"), ("c.csv", GOOD)]);
        let pipeline = pipeline();
        let aggregator = CorpusAggregator::new(
            &pipeline,
            BatchOptions {
                jobs: Some(2),
                fail_fast: false,
            },
        );
        let result = aggregator
            .run_dir(dir.path(), &ProgressBar::hidden())
            .unwrap();
        assert_eq!(2, result.statistics.files_processed);
        assert_eq!(1, result.statistics.files_failed);
        assert_eq!(4, result.statistics.placename_count);
        assert_eq!(2, result.statistics.georeferenced_count);
        assert_eq!(Some(50.0), result.statistics.summary().georeferenced_percent);
        assert_eq!(2, result.reports.len());
        assert!(result.reports[0].path.ends_with("a.csv"));
    }

    #[test]
    fn fail_fast_stops_the_batch() {
        let dir = write_files(&[("a.csv", GOOD), ("b.csv", "MAP,0,0,1\n")]);
        let pipeline = pipeline();
        let aggregator = CorpusAggregator::new(
            &pipeline,
            BatchOptions {
                jobs: None,
                fail_fast: true,
            },
        );
        let err = aggregator
            .run_dir(dir.path(), &ProgressBar::hidden())
            .unwrap_err();
        match err {
            Error::BatchAborted { path, source } => {
                assert!(path.ends_with("b.csv"));
                assert!(matches!(*source, Error::MalformedRecord { line: 1, .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn fail_fast_does_not_start_later_files() {
        let dir = write_files(&[
            ("a.csv", "garbage\n"),
            ("b.csv", GOOD),
            ("c.csv", GOOD),
            ("d.csv", GOOD),
            ("e.csv", GOOD),
            ("f.csv", GOOD),
        ]);
        let pipeline = pipeline();
        let aggregator = CorpusAggregator::new(
            &pipeline,
            BatchOptions {
                jobs: Some(1),
                fail_fast: true,
            },
        );
        let progress = ProgressBar::hidden();
        let err = aggregator.run_dir(dir.path(), &progress).unwrap_err();
        match err {
            Error::BatchAborted { path, .. } => assert!(path.ends_with("a.csv")),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(1, progress.position());
    }

    #[test]
    fn fail_fast_reports_the_first_failure_in_path_order() {
        let dir = write_files(&[
            ("a.csv", GOOD),
            ("b.csv", GOOD),
            ("c.csv", "garbage\n"),
            ("d.csv", GOOD),
            ("e.csv", "garbage\n"),
        ]);
        let pipeline = pipeline();
        let aggregator = CorpusAggregator::new(
            &pipeline,
            BatchOptions {
                jobs: Some(4),
                fail_fast: true,
            },
        );
        let err = aggregator
            .run_dir(dir.path(), &ProgressBar::hidden())
            .unwrap_err();
        match err {
            Error::BatchAborted { path, .. } => assert!(path.ends_with("c.csv")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn files_outside_the_projection_are_skipped() {
        // Web Mercator detections, UTM 32N gazetteer.
        let config = MatchConfig::default();
        let entries = vec![GazetteerEntry {
            name: "oslo".to_owned(),
            location: GeoPoint::new(597868.0, 6642681.0, CRS),
        }];
        let pipeline =
            Pipeline::new(config, Abbreviations::default(), Gazetteer::new(entries, CRS)).unwrap();
        // x = 15,000,000 m is about 135°E, far beyond the reach of zone 32.
        let dir = write_files(&[
            ("a.csv", "MAP,15000000,0,15000001,1\noslo,15000000,0,15000001,1\n"),
            ("b.csv", "MAP,1190000,8370000,1200000,8390000\noslo,1195000,8380000,1196000,8381000\n"),
        ]);

        let err = pipeline
            .process_path(&dir.path().join("a.csv"))
            .unwrap_err();
        assert!(matches!(err, Error::Projection(_)), "{}", err);

        let aggregator = CorpusAggregator::new(&pipeline, BatchOptions::default());
        let result = aggregator
            .run_dir(dir.path(), &ProgressBar::hidden())
            .unwrap();
        assert_eq!(1, result.statistics.files_processed);
        assert_eq!(1, result.statistics.files_failed);
        assert_eq!(1, result.reports.len());
        assert!(result.reports[0].path.ends_with("b.csv"));
    }

    #[test]
    fn all_files_failing_is_an_error() {
        let dir = write_files(&[("a.csv", "garbage\n"), ("b.csv", "")]);
        let pipeline = pipeline();
        let aggregator = CorpusAggregator::new(&pipeline, BatchOptions::default());
        let err = aggregator
            .run_dir(dir.path(), &ProgressBar::hidden())
            .unwrap_err();
        assert!(matches!(err, Error::NoFileSucceeded { failed: 2 }), "{}", err);
    }

    #[test]
    fn empty_directory_gives_empty_statistics() {
        let dir = write_files(&[]);
        let pipeline = pipeline();
        let aggregator = CorpusAggregator::new(&pipeline, BatchOptions::default());
        let result = aggregator
            .run_dir(dir.path(), &ProgressBar::hidden())
            .unwrap();
        assert_eq!(CorpusStatistics::default(), result.statistics);
        assert_eq!(None, result.statistics.summary().georeferenced_percent);
    }
}
