//! Integration tests for `cr critical-path`.

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;

fn names(json: &serde_json::Value) -> Vec<String> {
    json["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["task_name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_critical_path_default_scope() {
    let env = TestEnv::with_fixtures();
    let output = env.cr().arg("critical-path").output().unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["found"], true);
    assert_eq!(json["program"], "Apollo");
    assert_eq!(json["tool_id"], "TL-001");
    assert_eq!(json["total_duration_days"], 9);
    assert_eq!(names(&json), vec!["Foundation", "Hookup", "Qualification"]);
    assert_eq!(json["steps"][2]["cp_rank"], 3);
}

#[test]
fn test_critical_path_scoped_by_filter() {
    let env = TestEnv::with_fixtures();
    let output = env
        .cr()
        .args(["critical-path", "--program", "Apollo", "--tool", "TL-002"])
        .output()
        .unwrap();
    let json = parse_json(&output.stdout);
    assert_eq!(names(&json), vec!["Install"]);
    assert_eq!(json["total_duration_days"], 4);
}

#[test]
fn test_critical_path_unknown_scope_is_empty() {
    let env = TestEnv::with_fixtures();
    let output = env
        .cr()
        .args(["critical-path", "--program", "Nope", "--tool", "TL-999"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["steps"].as_array().unwrap().len(), 0);
    assert_eq!(json["total_duration_days"], 0);
}

const CYCLIC_TASKS: &str = "\
task_id,program,tool_id,site,area,task_name,gate,planned_start,planned_finish,status,risk_level,depends_on
T-1,Apollo,TL-001,Fab1,Litho,Start,Install,2026-01-01,2026-01-03,Done,Low,
T-2,Apollo,TL-001,Fab1,Litho,Ping,PowerOn,2026-01-03,2026-01-06,Done,Low,\"Start, Pong\"
T-3,Apollo,TL-001,Fab1,Litho,Pong,SAT,2026-01-06,2026-01-10,Done,Low,Ping
";

#[test]
fn test_critical_path_drops_cycles_by_default() {
    let env = TestEnv::with_fixtures();
    env.write_data("facility_readiness_tasks.csv", CYCLIC_TASKS);

    let output = env.cr().arg("critical-path").output().unwrap();
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    // Ping is relaxed from Start before the cycle stalls the walk
    assert_eq!(names(&json), vec!["Start", "Ping"]);
    assert_eq!(json["total_duration_days"], 5);
    assert_eq!(json["excluded"], serde_json::json!(["Ping", "Pong"]));
    assert_eq!(json["cycle_policy"], "drop");
}

#[test]
fn test_critical_path_strict_fails_on_cycle() {
    let env = TestEnv::with_fixtures();
    env.write_data("facility_readiness_tasks.csv", CYCLIC_TASKS);

    env.cr()
        .args(["critical-path", "--strict"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cycle detected"))
        .stderr(predicate::str::contains("Ping, Pong"));
}

#[test]
fn test_critical_path_policy_from_config() {
    let env = TestEnv::with_fixtures();
    env.write_data("facility_readiness_tasks.csv", CYCLIC_TASKS);
    env.write_project_config("cycle-policy \"error\"\n");

    env.cr().arg("critical-path").assert().failure();
}

#[test]
fn test_critical_path_human() {
    let env = TestEnv::with_fixtures();
    env.cr()
        .args(["critical-path", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Program: **Apollo**"))
        .stdout(predicate::str::contains("Tool: **TL-001**"))
        .stdout(predicate::str::contains("Total duration: **9 days**"))
        .stdout(predicate::str::contains("| Hookup |"));
}

const TIMED_TASKS: &str = "\
task_id,program,tool_id,site,area,task_name,gate,planned_start,planned_finish,status,risk_level,depends_on
T-1,Apollo,TL-001,Fab1,Litho,Overnight,Install,2026-01-01 20:00:00,2026-01-03 08:00:00,Done,Low,
T-2,Apollo,TL-001,Fab1,Litho,Cutover,PowerOn,2026-01-03 08:00:00,2026-01-05 08:00:00,Done,Low,Overnight
";

#[test]
fn test_critical_path_floors_date_time_durations() {
    let env = TestEnv::with_fixtures();
    env.write_data("facility_readiness_tasks.csv", TIMED_TASKS);

    let output = env.cr().arg("critical-path").output().unwrap();
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(names(&json), vec!["Overnight", "Cutover"]);
    assert_eq!(json["steps"][0]["duration_days"], 1);
    assert_eq!(json["steps"][0]["planned_start"], "2026-01-01 20:00:00");
    assert_eq!(json["total_duration_days"], 3);
}
