use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, sensors: u8, calibration: bool) -> PathBuf {
    let toml = format!(
        r#"
[array]
sensor_count = {sensors}

[calibration]
enabled = {calibration}
passes = 25
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).expect("valid JSON"))
        .collect()
}

/// Validate the JSONL schema of a tracking run.
#[rstest]
fn jsonl_track_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 8, true);

    let out = Command::cargo_bin("linetrace")
        .unwrap()
        .args(["--json", "--log-level", "error", "--config"])
        .arg(&cfg)
        .args(["track", "--reads", "5", "--line-at", "1000", "--sweep", "20000"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);

    let frames: Vec<_> = lines.iter().filter(|v| v["event"] == "frame").collect();
    assert_eq!(frames.len(), 5);
    for (i, f) in frames.iter().enumerate() {
        assert_eq!(f["seq"].as_u64(), Some(i as u64));
        assert!(f["position"].as_u64().is_some_and(|p| p <= 7000));
        assert_eq!(f["raw"].as_array().map(Vec::len), Some(8));
        let cal = f["calibrated"].as_array().unwrap();
        assert_eq!(cal.len(), 8);
        assert!(cal.iter().all(|v| v.as_u64().is_some_and(|v| v <= 1000)));
        let state = f["state"].as_str().unwrap();
        assert!(state == "tracking" || state == "lost");
        // side is null while tracking, a string when lost
        assert_eq!(f["side"].is_null(), state == "tracking");
    }

    // The line starts under sensor 1, then leaves the array; it was last
    // seen left of centre.
    assert_eq!(frames[0]["state"], "tracking");
    assert_eq!(frames[1]["state"], "lost");
    assert_eq!(frames[1]["side"], "left");
    assert_eq!(frames[1]["position"], 0);

    let end = lines.last().unwrap();
    assert_eq!(end["event"], "track_end");
    assert_eq!(end["reads"], 5);
    assert_eq!(end["stopped"], false);
}

#[rstest]
fn jsonl_calibration_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 5, true);

    let out = Command::cargo_bin("linetrace")
        .unwrap()
        .args(["--json", "--log-level", "error", "--config"])
        .arg(&cfg)
        .args(["calibrate", "--passes", "20"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);
    assert_eq!(lines.len(), 1);
    let v = &lines[0];
    assert_eq!(v["event"], "calibration");
    assert_eq!(v["passes"], 20);
    assert_eq!(v["calibrated"], true);
    let min = v["minimum"].as_array().unwrap();
    let max = v["maximum"].as_array().unwrap();
    assert_eq!(min.len(), 5);
    for (lo, hi) in min.iter().zip(max) {
        assert!(lo.as_u64().unwrap() < hi.as_u64().unwrap());
    }
}

#[rstest]
fn jsonl_replay_reads_frames_in_order() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 3, true);
    let trace = dir.path().join("trace.csv");
    let mut f = fs::File::create(&trace).unwrap();
    writeln!(f, "s0,s1,s2").unwrap();
    writeln!(f, "100,900,120").unwrap();
    writeln!(f, "110,880,130").unwrap();
    writeln!(f, "90,200,950").unwrap();

    let out = Command::cargo_bin("linetrace")
        .unwrap()
        .args(["--json", "--log-level", "error", "--samples", "1", "--config"])
        .arg(&cfg)
        .arg("--trace")
        .arg(&trace)
        .args(["read", "--count", "4"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let raws: Vec<serde_json::Value> = json_lines(&out)
        .into_iter()
        .map(|v| v["raw"].clone())
        .collect();
    assert_eq!(
        raws,
        vec![
            serde_json::json!([100, 900, 120]),
            serde_json::json!([110, 880, 130]),
            serde_json::json!([90, 200, 950]),
            // Last frame repeats once the trace is exhausted.
            serde_json::json!([90, 200, 950]),
        ]
    );
}

/// Errors in --json mode are a single JSON object on stdout.
#[rstest]
fn jsonl_error_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 4, false);

    let out = Command::cargo_bin("linetrace")
        .unwrap()
        .args(["--json", "--log-level", "error", "--config"])
        .arg(&cfg)
        .args(["read", "--calibrated"])
        .assert()
        .code(3)
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);
    let err = lines.iter().find(|v| v["event"] == "error").expect("error line");
    assert_eq!(err["reason"], "NotCalibrated");
    assert_eq!(err["exit_code"], 3);
    assert!(err["message"].as_str().unwrap().contains("What happened"));
}
