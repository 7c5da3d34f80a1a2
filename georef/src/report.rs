//! Writing out summaries and per-detection audit records.

use std::{fmt, io::Write};

use serde::Serialize;

use crate::{
    pipeline::{FileReport, MatchRecord},
    stats::Summary,
};

/// Columns of the audit CSV file, in order.
const AUDIT_COLUMNS: &[&str] = &[
    "file",
    "detected_text",
    "normalized_text",
    "status",
    "matched_name",
    "matched_x",
    "matched_y",
    "score",
    "candidate_count",
    "error_distance",
];

/// A row in the audit CSV file. Fields must match [`AUDIT_COLUMNS`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
struct AuditRow<'a> {
    file: String,
    detected_text: &'a str,
    normalized_text: &'a str,
    status: &'static str,
    matched_name: Option<&'a str>,
    matched_x: Option<f64>,
    matched_y: Option<f64>,
    score: Option<f64>,
    candidate_count: usize,
    error_distance: Option<f64>,
}

impl<'a> AuditRow<'a> {
    fn new(report: &FileReport, record: &'a MatchRecord) -> AuditRow<'a> {
        AuditRow {
            file: report.path.display().to_string(),
            detected_text: &record.detected_text,
            normalized_text: &record.normalized_text,
            status: record.outcome.status(),
            matched_name: record.matched_name.as_deref(),
            matched_x: record.matched_location.map(|p| p.x),
            matched_y: record.matched_location.map(|p| p.y),
            score: record.score,
            candidate_count: record.candidate_count,
            error_distance: record.outcome.error_distance(),
        }
    }
}

/// Write one audit row for every record in `reports`, with a header row
/// even if there are no records.
pub fn write_audit_csv<W: Write>(wtr: W, reports: &[FileReport]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(wtr);
    wtr.write_record(AUDIT_COLUMNS)?;
    for report in reports {
        for record in &report.records {
            wtr.serialize(AuditRow::new(report, record))?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write `summary` as pretty-printed JSON. Undefined values become `null`.
pub fn write_summary_json<W: Write>(mut wtr: W, summary: &Summary) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut wtr, summary)?;
    writeln!(wtr).map_err(serde_json::Error::io)
}

/// Formats an optional value, or `n/a`.
struct Maybe(Option<f64>);

impl fmt::Display for Maybe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.2}", value),
            None => write!(f, "n/a"),
        }
    }
}

/// Formats an optional percentage, or `n/a`.
struct Percent(Option<f64>);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.2}%", value),
            None => write!(f, "n/a"),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total: {} placenames", self.placename_count)?;
        writeln!(
            f,
            "{} georeferenced ({})",
            self.georeferenced_count,
            Percent(self.georeferenced_percent)
        )?;
        writeln!(
            f,
            "{} identified ({})",
            self.identified_count,
            Percent(self.identified_percent)
        )?;
        writeln!(
            f,
            "{} unidentified ({})",
            self.unidentified_count,
            Percent(self.unidentified_percent)
        )?;
        writeln!(f, "Average georeferencing error: {}", Maybe(self.error_mean))?;
        writeln!(f, "Median georeferencing error: {}", Maybe(self.error_median))?;
        writeln!(f, "Standard deviation: {}", Maybe(self.error_std_dev))?;
        writeln!(
            f,
            "Files: {} processed, {} failed",
            self.files_processed, self.files_failed
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{crs::Crs, geo::GeoPoint, stats::CorpusStatistics, tolerance::MatchOutcome};

    fn report() -> FileReport {
        FileReport {
            path: PathBuf::from("maps/sheet1.csv"),
            placename_count: 3,
            records: vec![
                MatchRecord {
                    detected_text: "Osl".to_owned(),
                    normalized_text: "oslo".to_owned(),
                    matched_name: Some("oslo".to_owned()),
                    matched_location: Some(GeoPoint::new(15.0, 15.5, Crs::UTM32N_ETRS89)),
                    score: Some(1.0),
                    candidate_count: 2,
                    outcome: MatchOutcome::Georeferenced {
                        error_distance: 0.5,
                    },
                },
                MatchRecord {
                    detected_text: "Bergen, Norway".to_owned(),
                    normalized_text: "bergen, norway".to_owned(),
                    matched_name: None,
                    matched_location: None,
                    score: None,
                    candidate_count: 0,
                    outcome: MatchOutcome::Unidentified,
                },
            ],
        }
    }

    #[test]
    fn audit_csv() {
        let mut out = vec![];
        write_audit_csv(&mut out, &[report()]).unwrap();
        let expected = "\
file,detected_text,normalized_text,status,matched_name,matched_x,matched_y,score,candidate_count,error_distance
maps/sheet1.csv,Osl,oslo,georeferenced,oslo,15.0,15.5,1.0,2,0.5
maps/sheet1.csv,\"Bergen, Norway\",\"bergen, norway\",unidentified,,,,,0,
";
        assert_eq!(expected, String::from_utf8(out).unwrap());
    }

    #[test]
    fn audit_csv_always_has_a_header() {
        let mut out = vec![];
        write_audit_csv(&mut out, &[]).unwrap();
        assert_eq!(AUDIT_COLUMNS.join(",") + "\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn text_summary() {
        let summary = report().statistics().summary();
        let expected = "\
Total: 3 placenames
1 georeferenced (33.33%)
0 identified (0.00%)
2 unidentified (66.67%)
Average georeferencing error: 0.50
Median georeferencing error: 0.50
Standard deviation: 0.00
Files: 1 processed, 0 failed
";
        assert_eq!(expected, summary.to_string());
    }

    #[test]
    fn undefined_values() {
        let summary = CorpusStatistics::default().summary();
        let text = summary.to_string();
        assert!(text.contains("0 georeferenced (n/a)"), "{}", text);
        assert!(text.contains("Average georeferencing error: n/a"), "{}", text);

        let mut out = vec![];
        write_summary_json(&mut out, &summary).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(serde_json::Value::Null, json["georeferenced_percent"]);
        assert_eq!(serde_json::Value::Null, json["error_median"]);
        assert_eq!(0, json["placename_count"]);
    }
}
