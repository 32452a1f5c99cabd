//! Integration tests for `cr readiness`.

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;

#[test]
fn test_readiness_json_rollup() {
    let env = TestEnv::with_fixtures();
    let output = env.cr().arg("readiness").output().unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["filtered"], false);
    assert_eq!(json["count"], 3);

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows[0]["tool_id"], "TL-002");
    assert_eq!(rows[0]["rag"], "G");
    assert_eq!(rows[0]["readiness_pct"], 100.0);
    assert_eq!(rows[1]["tool_id"], "TL-001");
    assert_eq!(rows[1]["rag"], "R");
    assert_eq!(rows[1]["tasks_blocked"], 1);
    assert_eq!(rows[2]["tool_id"], "TL-100");
    assert_eq!(rows[2]["readiness_pct"], 0.0);
}

#[test]
fn test_readiness_pct_is_weighted() {
    let env = TestEnv::with_fixtures();
    let output = env
        .cr()
        .args(["readiness", "--tool", "TL-001"])
        .output()
        .unwrap();
    let json = parse_json(&output.stdout);
    let pct = json["rows"][0]["readiness_pct"].as_f64().unwrap();
    // Install done (0.40) + PowerOn half done at Medium risk (0.125 / 1.15) over 0.80
    let expected = 100.0 * (0.40 + 0.125 / 1.15) / 0.80;
    assert!((pct - expected).abs() < 1e-9, "{} != {}", pct, expected);
}

#[test]
fn test_readiness_filtered_by_program() {
    let env = TestEnv::with_fixtures();
    let output = env
        .cr()
        .args(["readiness", "--program", "Zephyr"])
        .output()
        .unwrap();
    let json = parse_json(&output.stdout);
    assert_eq!(json["filtered"], true);
    assert_eq!(json["count"], 1);
    assert_eq!(json["rows"][0]["program"], "Zephyr");
}

#[test]
fn test_readiness_all_is_no_filter() {
    let env = TestEnv::with_fixtures();
    let output = env
        .cr()
        .args(["readiness", "--program", "All", "--site", "All"])
        .output()
        .unwrap();
    let json = parse_json(&output.stdout);
    assert_eq!(json["filtered"], false);
    assert_eq!(json["count"], 3);
}

#[test]
fn test_readiness_at_risk() {
    let env = TestEnv::with_fixtures();
    let output = env
        .cr()
        .args(["readiness", "--at-risk", "2"])
        .output()
        .unwrap();
    let json = parse_json(&output.stdout);
    assert_eq!(json["at_risk"], 2);
    let tools: Vec<&str> = json["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["tool_id"].as_str().unwrap())
        .collect();
    // RAG label order first, then lowest percentage
    assert_eq!(tools, vec!["TL-002", "TL-100"]);
}

#[test]
fn test_readiness_human_table() {
    let env = TestEnv::with_fixtures();
    env.cr()
        .args(["readiness", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Readiness\n"))
        .stdout(predicate::str::contains("| program | tool_id | site | area |"))
        .stdout(predicate::str::contains("| Apollo | TL-002 | Fab1 | Etch |"));
}

#[test]
fn test_readiness_missing_dataset() {
    let env = TestEnv::new();
    env.cr()
        .arg("readiness")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing required file"));
}

#[test]
fn test_readiness_missing_columns_are_named() {
    let env = TestEnv::with_fixtures();
    env.write_data(
        "facility_readiness_tasks.csv",
        "task_id,program,tool_id,site,area,task_name,planned_start,planned_finish\n",
    );
    env.cr()
        .args(["readiness", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "))
        .stderr(predicate::str::contains("gate, status, risk_level"));
}

#[test]
fn test_readiness_bad_date_fails() {
    let env = TestEnv::with_fixtures();
    env.write_data(
        "facility_readiness_tasks.csv",
        "task_id,program,tool_id,site,area,task_name,gate,planned_start,planned_finish,status,risk_level\n\
         T-1,Apollo,TL-001,Fab1,Litho,Foundation,Install,soon,2026-01-03,Done,Low\n",
    );
    env.cr()
        .arg("readiness")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("CSV error"));
}

#[test]
fn test_data_dir_flag() {
    let env = TestEnv::with_fixtures();
    std::fs::rename(env.data_path(), env.root().join("elsewhere")).unwrap();

    env.cr().arg("readiness").assert().failure();
    env.cr()
        .args(["readiness", "--data-dir", "elsewhere"])
        .assert()
        .success();
    env.cr()
        .arg("readiness")
        .env("CR_DATA_DIR", "elsewhere")
        .assert()
        .success();
}
