//! Command-line tool for georeferencing place names found on historical maps.

use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use georef::{
    abbreviations::Abbreviations,
    config::MatchConfig,
    corpus::{BatchOptions, CorpusAggregator},
    crs::{Crs, Reprojector},
    gazetteer::Gazetteer,
    matcher::DEFAULT_THRESHOLD,
    normalize::normalize,
    pipeline::Pipeline,
    report::{write_audit_csv, write_summary_json},
    similarity::SimilarityMetric,
    tolerance::DEFAULT_TOLERANCE_RATIO,
    ui::Ui,
};

#[derive(Debug, Parser)]
/// Match place names detected on scanned maps against a gazetteer, and
/// measure how well they were georeferenced. (Settings can also be given as
/// GEOREF_* environment variables, or in a .env file.)
#[command(name = "georef", version)]
enum Args {
    /// Process a directory of detection files and print corpus statistics.
    #[command(name = "evaluate")]
    Evaluate {
        /// Directory containing one detection CSV file per map sheet.
        detected_dir: PathBuf,

        /// CSV file of abbreviations and their expansions.
        abbreviations: PathBuf,

        /// CSV file of place names and coordinates.
        gazetteer: PathBuf,

        /// Minimum similarity for a match. Overrides --threshold.
        #[arg(id = "threshold_arg", value_name = "THRESHOLD")]
        threshold: Option<f64>,

        #[command(flatten)]
        matching: MatchOpts,

        #[command(flatten)]
        run: RunOpts,
    },

    /// Process a single detection file and print an audit record for each
    /// distinct piece of text, as CSV.
    #[command(name = "match")]
    Match {
        /// The detection CSV file.
        detection_file: PathBuf,

        /// CSV file of abbreviations and their expansions.
        abbreviations: PathBuf,

        /// CSV file of place names and coordinates.
        gazetteer: PathBuf,

        #[command(flatten)]
        matching: MatchOpts,
    },

    /// Show how a piece of detected text will be normalized.
    #[command(name = "normalize")]
    Normalize {
        /// The text to normalize.
        #[arg(allow_hyphen_values = true)]
        text: String,

        /// CSV file of abbreviations and their expansions.
        abbreviations: PathBuf,
    },

    /// Convert a coordinate from one reference system to another.
    #[command(name = "reproject")]
    Reproject {
        /// The source reference system (for example, "EPSG:4326").
        from: Crs,

        /// The target reference system.
        to: Crs,

        /// Easting, or longitude in degrees.
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// Northing, or latitude in degrees.
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

/// Settings which control matching.
#[derive(Debug, clap::Args)]
struct MatchOpts {
    /// Minimum similarity for a match, between 0 and 1.
    #[arg(long, env = "GEOREF_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// How to measure similarity ("indel" or "levenshtein").
    #[arg(long, env = "GEOREF_METRIC", default_value_t = SimilarityMetric::Indel)]
    metric: SimilarityMetric,

    /// Slack around each detection, in multiples of its own size.
    #[arg(long, env = "GEOREF_TOLERANCE_RATIO", default_value_t = DEFAULT_TOLERANCE_RATIO)]
    tolerance_ratio: f64,

    /// Reference system of the detection files.
    #[arg(long, env = "GEOREF_DETECTION_CRS", default_value = "EPSG:3857")]
    detection_crs: Crs,

    /// Reference system of the gazetteer.
    #[arg(long, env = "GEOREF_GAZETTEER_CRS", default_value = "EPSG:25832")]
    gazetteer_crs: Crs,

    /// Reference system to compare positions in. Defaults to the gazetteer's.
    #[arg(long, env = "GEOREF_WORKING_CRS")]
    working_crs: Option<Crs>,

    /// Ignore case when comparing gazetteer names.
    #[arg(long, env = "GEOREF_FOLD_GAZETTEER_CASE")]
    fold_gazetteer_case: bool,
}

impl MatchOpts {
    fn to_config(&self) -> MatchConfig {
        MatchConfig {
            threshold: self.threshold,
            metric: self.metric,
            tolerance_ratio: self.tolerance_ratio,
            detection_crs: self.detection_crs,
            gazetteer_crs: self.gazetteer_crs,
            working_crs: self.working_crs,
            fold_gazetteer_case: self.fold_gazetteer_case,
        }
    }
}

/// Settings for a batch run.
#[derive(Debug, clap::Args)]
struct RunOpts {
    /// Number of worker threads. Defaults to one per CPU.
    #[arg(long, short = 'j', env = "GEOREF_JOBS")]
    jobs: Option<usize>,

    /// Stop at the first file which can't be processed.
    #[arg(long, env = "GEOREF_FAIL_FAST")]
    fail_fast: bool,

    /// Also write an audit record for every detection to this CSV file.
    #[arg(long)]
    details: Option<PathBuf>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

// Choose and run the appropriate command.
fn main() -> Result<()> {
    dotenv().ok();
    let ui = Ui::init();

    let args: Args = Args::parse();
    match args {
        Args::Evaluate {
            detected_dir,
            abbreviations,
            gazetteer,
            threshold,
            mut matching,
            run,
        } => {
            if let Some(threshold) = threshold {
                matching.threshold = threshold;
            }
            cmd_evaluate(&ui, &detected_dir, &abbreviations, &gazetteer, &matching, &run)
        }
        Args::Match {
            detection_file,
            abbreviations,
            gazetteer,
            matching,
        } => cmd_match(&detection_file, &abbreviations, &gazetteer, &matching),
        Args::Normalize {
            text,
            abbreviations,
        } => cmd_normalize(&text, &abbreviations),
        Args::Reproject { from, to, x, y } => cmd_reproject(from, to, x, y),
    }
}

/// Load our inputs and build a pipeline.
fn load_pipeline(
    matching: &MatchOpts,
    abbreviations: &Path,
    gazetteer: &Path,
) -> Result<Pipeline> {
    let config = matching.to_config();
    config.validate()?;
    let abbreviations = Abbreviations::from_path(abbreviations)?;
    let gazetteer = Gazetteer::from_path(gazetteer, config.gazetteer_crs)?;
    let working_crs = config.working_crs();
    Pipeline::new(config, abbreviations, gazetteer)
        .with_context(|| format!("could not convert gazetteer to {}", working_crs))
}

fn cmd_evaluate(
    ui: &Ui,
    detected_dir: &Path,
    abbreviations: &Path,
    gazetteer: &Path,
    matching: &MatchOpts,
    run: &RunOpts,
) -> Result<()> {
    let pipeline = load_pipeline(matching, abbreviations, gazetteer)?;
    let options = BatchOptions {
        jobs: run.jobs,
        fail_fast: run.fail_fast,
    };

    let progress = ui.new_progress_bar(0);
    progress.set_message("Processing maps");
    let result = CorpusAggregator::new(&pipeline, options)
        .run_dir(detected_dir, &progress)
        .with_context(|| format!("could not evaluate {}", detected_dir.display()))?;

    if let Some(details) = &run.details {
        let file = File::create(details)
            .with_context(|| format!("could not create {}", details.display()))?;
        write_audit_csv(BufWriter::new(file), &result.reports)
            .with_context(|| format!("could not write {}", details.display()))?;
    }

    let summary = result.statistics.summary();
    let out = stdout();
    let mut out = out.lock();
    if run.json {
        write_summary_json(&mut out, &summary).context("could not write summary")?;
    } else {
        write!(out, "{}", summary).context("could not write summary")?;
    }
    Ok(())
}

fn cmd_match(
    detection_file: &Path,
    abbreviations: &Path,
    gazetteer: &Path,
    matching: &MatchOpts,
) -> Result<()> {
    let pipeline = load_pipeline(matching, abbreviations, gazetteer)?;
    let report = pipeline.process_path(detection_file)?;
    let out = stdout();
    write_audit_csv(out.lock(), &[report]).context("could not write audit records")?;
    Ok(())
}

fn cmd_normalize(text: &str, abbreviations: &Path) -> Result<()> {
    let abbreviations = Abbreviations::from_path(abbreviations)?;
    match normalize(text, &abbreviations) {
        Some(normalized) => println!("{}", normalized),
        None => eprintln!("{:?} looks like OCR noise and would be discarded", text),
    }
    Ok(())
}

fn cmd_reproject(from: Crs, to: Crs, x: f64, y: f64) -> Result<()> {
    let (x, y) = Reprojector::new(from, to).transform(x, y)?;
    println!("{} {}", x, y);
    Ok(())
}
