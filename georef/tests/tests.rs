//! Integration tests for our command-line interface. We actually run the
//! binary and make sure it produces the expected output.

use std::fs;

use cli_test_dir::{ExpectStatus, OutputExt, TestDir};

#[test]
fn show_help() {
    let testdir = TestDir::new("georef", "show_help");
    let output = testdir.cmd().arg("--help").expect_success();
    assert!(output.stdout_str().contains("Usage"));
    assert!(output.stdout_str().contains("evaluate"));
}

#[test]
fn show_version() {
    let testdir = TestDir::new("georef", "show_version");
    let output = testdir.cmd().arg("--version").expect_success();
    assert!(output.stdout_str().starts_with("georef "));
}

#[test]
fn cmd_evaluate() {
    let testdir = TestDir::new("georef", "cmd_evaluate");
    let output = testdir
        .cmd()
        .arg("evaluate")
        .arg(testdir.src_path("fixtures/detected"))
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .arg(testdir.src_path("fixtures/gazetteer.csv"))
        .expect_success();
    let stdout = output.stdout_str();
    assert!(stdout.contains("Total: 7 placenames"), "{}", stdout);
    assert!(stdout.contains("5 georeferenced (71.43%)"), "{}", stdout);
    assert!(stdout.contains("1 identified (14.29%)"), "{}", stdout);
    assert!(stdout.contains("1 unidentified (14.29%)"), "{}", stdout);
    assert!(stdout.contains("Files: 2 processed, 1 failed"), "{}", stdout);
    // The torn file is reported, but doesn't stop the run.
    assert!(output.stderr_str().contains("torn.csv"), "{}", output.stderr_str());
}

#[test]
fn cmd_evaluate_with_threshold_json_and_details() {
    let testdir = TestDir::new("georef", "cmd_evaluate_with_threshold_json_and_details");
    let output = testdir
        .cmd()
        .arg("evaluate")
        .arg(testdir.src_path("fixtures/detected"))
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .arg(testdir.src_path("fixtures/gazetteer.csv"))
        .arg("1.0")
        .args(["--json", "--jobs", "2", "--details", "details.csv"])
        .expect_success();
    let summary: serde_json::Value = serde_json::from_str(output.stdout_str()).unwrap();
    assert_eq!(7, summary["placename_count"]);
    // "drobak" no longer matches "drøbak".
    assert_eq!(4, summary["georeferenced_count"]);
    assert_eq!(2, summary["unidentified_count"]);
    assert_eq!(1, summary["files_failed"]);
    assert!(summary["error_mean"].is_number());

    testdir.expect_contains(
        "details.csv",
        "file,detected_text,normalized_text,status,matched_name",
    );
    testdir.expect_contains("details.csv", "Brumunddal,brumunddal,identified,brumunddal");
    testdir.expect_contains("details.csv", "Mlv.,moelv,georeferenced,moelv");
    testdir.expect_contains("details.csv", "Drobak,drobak,unidentified,,");
    testdir.expect_does_not_contain("details.csv", "---");
}

#[test]
fn cmd_evaluate_fail_fast() {
    let testdir = TestDir::new("georef", "cmd_evaluate_fail_fast");
    let output = testdir
        .cmd()
        .arg("evaluate")
        .arg(testdir.src_path("fixtures/detected"))
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .arg(testdir.src_path("fixtures/gazetteer.csv"))
        .arg("--fail-fast")
        .expect_failure();
    assert!(output.stderr_str().contains("torn.csv"), "{}", output.stderr_str());
}

#[test]
fn cmd_evaluate_fails_if_no_file_succeeds() {
    let testdir = TestDir::new("georef", "cmd_evaluate_fails_if_no_file_succeeds");
    testdir.create_file("maps/torn.csv", "Hamar,1,2,3,4\n");
    let torn = fs::read(testdir.src_path("fixtures/detected/torn.csv")).unwrap();
    testdir.create_file("maps/torn2.csv", torn);
    let output = testdir
        .cmd()
        .arg("evaluate")
        .arg("maps")
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .arg(testdir.src_path("fixtures/gazetteer.csv"))
        .expect_failure();
    assert!(
        output.stderr_str().contains("no detection file could be processed"),
        "{}",
        output.stderr_str()
    );
}

#[test]
fn cmd_evaluate_rejects_bad_threshold() {
    let testdir = TestDir::new("georef", "cmd_evaluate_rejects_bad_threshold");
    let output = testdir
        .cmd()
        .arg("evaluate")
        .arg(testdir.src_path("fixtures/detected"))
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .arg(testdir.src_path("fixtures/gazetteer.csv"))
        .arg("1.5")
        .expect_failure();
    assert!(output.stderr_str().contains("threshold"), "{}", output.stderr_str());
}

#[test]
fn cmd_match() {
    let testdir = TestDir::new("georef", "cmd_match");
    let output = testdir
        .cmd()
        .arg("match")
        .arg(testdir.src_path("fixtures/detected/oslo.csv"))
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .arg(testdir.src_path("fixtures/gazetteer.csv"))
        .expect_success();
    let lines: Vec<&str> = output.stdout_str().lines().collect();
    assert_eq!(3, lines.len(), "{:?}", lines);
    assert!(lines[0].starts_with("file,detected_text"));
    assert!(lines[1].contains(",OSLO,oslo,georeferenced,oslo,597979.9,6643118.99,1.0,1,"));
    assert!(lines[2].contains(",Drobak,drobak,georeferenced,drøbak,"));
}

#[test]
fn cmd_match_with_env_settings() {
    let testdir = TestDir::new("georef", "cmd_match_with_env_settings");
    let output = testdir
        .cmd()
        .env("GEOREF_THRESHOLD", "1.0")
        .arg("match")
        .arg(testdir.src_path("fixtures/detected/oslo.csv"))
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .arg(testdir.src_path("fixtures/gazetteer.csv"))
        .expect_success();
    assert!(output.stdout_str().contains(",Drobak,drobak,unidentified,"));
}

#[test]
fn cmd_normalize() {
    let testdir = TestDir::new("georef", "cmd_normalize");
    let output = testdir
        .cmd()
        .args(["normalize", "Mlv. St."])
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .expect_success();
    assert_eq!("moelv stasjon\n", output.stdout_str());

    let output = testdir
        .cmd()
        .args(["normalize", "-.-"])
        .arg(testdir.src_path("fixtures/abbreviations.csv"))
        .expect_success();
    assert_eq!("", output.stdout_str());
    assert!(output.stderr_str().contains("noise"));
}

#[test]
fn cmd_reproject() {
    let testdir = TestDir::new("georef", "cmd_reproject");
    let output = testdir
        .cmd()
        .args(["reproject", "EPSG:4326", "EPSG:25832", "10.75", "59.91"])
        .expect_success();
    let coords: Vec<f64> = output
        .stdout_str()
        .split_whitespace()
        .map(|s| s.parse().unwrap())
        .collect();
    assert!((coords[0] - 597868.381).abs() < 1e-2, "{:?}", coords);
    assert!((coords[1] - 6642681.510).abs() < 1e-2, "{:?}", coords);
}

#[test]
fn cmd_reproject_negative_and_unknown() {
    let testdir = TestDir::new("georef", "cmd_reproject_negative_and_unknown");
    let output = testdir
        .cmd()
        .args(["reproject", "epsg:4326", "EPSG:3857", "-180", "0"])
        .expect_success();
    assert!(output.stdout_str().starts_with("-20037508.34"));

    testdir
        .cmd()
        .args(["reproject", "EPSG:4326", "EPSG:2154", "0", "0"])
        .expect_failure();
}
