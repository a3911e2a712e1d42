//! Invocations of the `logdigest` binary over local log directories.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHEET: &str = "Donor ID,Sample_ID,GEX lib,BCR lib,TCR lib\n\
                     D1,D1-BMA-1,L1,L2,\n\
                     D2,D2-SPL-1,L9,,\n";

struct Fixture {
    logs: TempDir,
    meta: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let f = Self {
            logs: TempDir::new().unwrap(),
            meta: TempDir::new().unwrap(),
        };
        fs::write(f.sheet(), SHEET).unwrap();
        f
    }

    fn sheet(&self) -> std::path::PathBuf {
        self.meta.path().join("samples.csv")
    }

    fn log(&self, name: &str, body: &str) {
        fs::write(self.logs.path().join(name), body).unwrap();
    }

    fn cmd(&self, action: &str, process_type: &str, logs_location: &Path) -> Command {
        let mut cmd = Command::cargo_bin("logdigest").unwrap();
        cmd.env_remove("RUST_LOG")
            .arg(action)
            .arg(process_type)
            .args(["D1", "001"])
            .arg(logs_location)
            .args(["v1", "", "", ""])
            .arg("--samples-sheet")
            .arg(self.sheet());
        cmd
    }
}

#[test]
fn print_digest_shows_alertable_lines() {
    let f = Fixture::new();
    f.log(
        "process_sample.D1-BMA-1_GEX.v1.log",
        "INFO start\nERROR: boom\nINFO done\n",
    );

    f.cmd("print_digest", "sample", f.logs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("process_sample.D1-BMA-1_GEX.v1.log:"))
        .stdout(predicate::str::contains("\tERROR: boom"))
        .stdout(predicate::str::contains("INFO start").not());
}

#[test]
fn get_csv_writes_header_and_rows_to_stdout() {
    let f = Fixture::new();
    f.log(
        "process_sample.D1-BMA-1_GEX.v1.log",
        "Final number of cells: 4100, final number of genes: 18000.\nWARNING: low count\n",
    );

    f.cmd("get_csv", "sample", f.logs.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Sample ID,# Cells,Failed?,Warning?,Failure Reason,Warning Reason,",
        ))
        .stdout(predicate::str::contains(
            "D1-BMA-1,4100,No,Yes,,WARNING: low count,-1,-1,-1,-1,",
        ));
}

#[test]
fn missing_sample_log_is_reported_not_fatal() {
    let f = Fixture::new();

    f.cmd("get_csv", "sample", f.logs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("D1-BMA-1,0,Yes,No,NOT FOUND"))
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn lib_metrics_are_appended_to_the_given_file() {
    let f = Fixture::new();
    f.log(
        "process_library.D1_001_GEX_L1.v1.log",
        "Started with a total of 900 cells\nFinal number of cells: 850, final number of genes: 10.\n",
    );
    let out = f.meta.path().join("lib_metrics.csv");

    for _ in 0..2 {
        f.cmd("get_lib_metrics_csv", "library", f.logs.path())
            .arg("--lib-metrics-csv")
            .arg(&out)
            .args(["--lib-types", "GEX"])
            .assert()
            .success();
    }

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("lib_id,"));
    assert_eq!(lines[1], "L1,900,850,?,?,GEX");
    assert_eq!(lines[1], lines[2]);
}

#[test]
fn relative_logs_location_is_a_precondition_failure() {
    let f = Fixture::new();

    f.cmd("print_digest", "sample", Path::new("relative/logs"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("CRITICAL"))
        .stderr(predicate::str::contains("logs_location"));
}

#[test]
fn latest_needs_aws() {
    let f = Fixture::new();
    let mut cmd = Command::cargo_bin("logdigest").unwrap();
    cmd.env_remove("RUST_LOG")
        .args(["print_digest", "sample", "D1", "001"])
        .arg(f.logs.path())
        .args(["latest", "", "", ""])
        .arg("--samples-sheet")
        .arg(f.sheet())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("latest"));
}

#[test]
fn sample_csv_for_libraries_is_unsupported() {
    let f = Fixture::new();

    f.cmd("get_csv", "library", f.logs.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not available for library logs"));
}

#[test]
fn lib_metrics_without_output_path_fails_early() {
    let f = Fixture::new();

    f.cmd("get_lib_metrics_csv", "library", f.logs.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--lib-metrics-csv"));
}

#[test]
fn unknown_action_is_rejected_by_the_parser() {
    Command::cargo_bin("logdigest")
        .unwrap()
        .args(["summarize", "sample", "D1", "001", "/tmp", "v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
