use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

const FIXTURE: &str = "tests/fixtures/frame_000001.json";
const CAR_LINE_PREFIX: &str = "Car 0.00 0 -10.00 350.00 260.00 450.00 340.00 1.60 2.00 4.00";

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("simlabel 0.1.0\n");
}

// Label subcommand tests

#[test]
fn label_prints_kitti_lines_to_stdout() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.args(["label", FIXTURE]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(CAR_LINE_PREFIX))
        .stdout(predicate::str::contains("\nPedestrian 0.00 0 -10.00 "))
        .stdout(predicate::str::contains("static").not())
        .stderr(predicate::str::contains(
            "Labeled 2 of 4 agent(s) across 1 frame(s)",
        ));
}

#[test]
fn label_writes_one_file_per_frame() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("label_2");

    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.args(["label", FIXTURE, "--output-dir"]).arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("frame 000001: 2 labeled, 1 unclassified, 1 not visible, 0 too small"));

    let content = fs::read_to_string(out.join("000001.txt")).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.starts_with(CAR_LINE_PREFIX));
}

#[test]
fn label_applies_threshold_overrides() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.args(["label", FIXTURE, "--min-area", "5000"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(CAR_LINE_PREFIX))
        .stdout(predicate::str::contains("Pedestrian").not());
}

#[test]
fn label_reads_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.yaml");
    fs::write(&config, "max_render_depth: 5.0\n").unwrap();

    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.args(["label", FIXTURE, "--report", "json", "--config"])
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("\"insufficient_visibility\": 3"));
}

#[test]
fn label_walks_directory_with_depth_files() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("frames");
    let out = temp.path().join("labels");

    common::write_snapshot(
        &input,
        "a.json",
        &common::snapshot_json(
            3,
            serde_json::json!({"uniform": 1000.0}),
            &[common::car_at(10.0, 0.0).with_id(1)],
        ),
    );
    // a wall at 5 m in front of the car
    common::write_raw_depth(
        &input.join("wall.bin"),
        common::WIDTH,
        common::HEIGHT,
        5.0,
    );
    common::write_snapshot(
        &input.join("nested"),
        "b.json",
        &common::snapshot_json(
            4,
            serde_json::json!({"raw_f32": "../wall.bin"}),
            &[common::car_at(10.0, 0.0).with_id(1)],
        ),
    );

    let csv = temp.path().join("report.csv");
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.arg("label")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .arg("--report-csv")
        .arg(&csv);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Labeled 1 of 2 agent(s) across 2 frame(s)"));

    assert_eq!(fs::read_to_string(out.join("000003.txt")).unwrap().lines().count(), 1);
    assert_eq!(fs::read_to_string(out.join("000004.txt")).unwrap(), "");

    let report = fs::read_to_string(&csv).unwrap();
    assert!(report.contains("3,1,labeled,Car,8,0,0,"));
    assert!(report.contains("4,1,insufficient_visibility,,0,8,0,"));
}

#[test]
fn label_directory_requires_output_dir() {
    let temp = tempfile::tempdir().unwrap();
    fs::copy(FIXTURE, temp.path().join("frame.json")).unwrap();

    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.arg("label").arg(temp.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--output-dir is required"));
}

#[test]
fn label_rejects_depth_file_of_wrong_size() {
    let temp = tempfile::tempdir().unwrap();
    common::write_raw_depth(&temp.path().join("small.bin"), 4, 4, 10.0);
    let snapshot = common::write_snapshot(
        temp.path(),
        "frame.json",
        &common::snapshot_json(1, serde_json::json!({"raw_f32": "small.bin"}), &[]),
    );

    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.arg("label").arg(&snapshot);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode depth buffer"));
}

#[test]
fn label_nonexistent_file_fails() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.args(["label", "nonexistent_frame.json"]);
    cmd.assert().failure();
}

#[test]
fn label_malformed_snapshot_fails() {
    let temp = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(temp.path(), "frame.json", "{\"frame\": 1}");

    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.arg("label").arg(&snapshot);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse frame snapshot"));
}

#[test]
fn verbose_flag_logs_unclassified_agents() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd.args(["-v", "label", FIXTURE]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("unknown object type 'static.prop.box'"));
}

// Config subcommand tests

#[test]
fn config_prints_defaults() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.arg("config");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("max_render_depth: 70.0"))
        .stdout(predicate::str::contains("min_visible_vertices: 4"))
        .stdout(predicate::str::contains("occlusion_test: pixel"));
}

#[test]
fn config_rejects_unknown_fields() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.json");
    fs::write(&config, r#"{"min_area": 10}"#).unwrap();

    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.arg("config").arg("--config").arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn config_rejects_unknown_extension() {
    let mut cmd = Command::cargo_bin("simlabel").unwrap();
    cmd.args(["config", "--config", "thresholds.toml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}
