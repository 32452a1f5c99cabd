//! Common test utilities for capready integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never read the
//! user's `~/.config/capready/config.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

pub const TASKS_CSV: &str = "\
task_id,program,tool_id,site,area,task_name,workstream,gate,owner,planned_start,planned_finish,status,risk_level,depends_on
T-1,Apollo,TL-001,Fab1,Litho,Foundation,Civil,Install,Ana,2026-01-01,2026-01-03,Done,Low,
T-2,Apollo,TL-001,Fab1,Litho,Hookup,Facilities,PowerOn,Ben,2026-01-03,2026-01-06,In Progress,Medium,Foundation
T-3,Apollo,TL-001,Fab1,Litho,Qualification,Process,SAT,Cy,2026-01-06,2026-01-10,Blocked,High,Hookup
T-4,Apollo,TL-002,Fab1,Etch,Install,Facilities,Install,Dee,2026-01-01,2026-01-05,Done,Low,
T-5,Zephyr,TL-100,Fab2,CMP,Setup,Facilities,Install,Eve,2026-02-01,2026-02-11,Not Started,Medium,
";

pub const CAPEX_CSV: &str = "\
program,tool_id,capex_category,planned_spend_usd,actual_spend_usd,forecast_spend_usd
Apollo,TL-001,Tool,1000000,1200000,1250000
Apollo,TL-002,Facilities,500000,450000,480000
Zephyr,TL-100,Tool,800000,850000,900000
";

pub const LEAD_TIMES_CSV: &str = "\
program,tool_id,vendor,expedite_reason,expedite_spend_usd
Apollo,TL-001,ASML,Late shipment,100
Apollo,TL-002,ASML,Late shipment,50
Zephyr,TL-100,Edwards,Rush,30
";

/// A test environment with an isolated project root.
///
/// Each `TestEnv` creates two temporary directories:
/// - `root_dir`: The project root, with datasets under `data/raw`
/// - `config_dir`: Stands in for the system config directory (via `CR_CONFIG_DIR`)
///
/// The `cr()` method sets the working directory and `CR_CONFIG_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub root_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create an empty test environment.
    pub fn new() -> Self {
        Self {
            root_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment holding the standard fixture datasets.
    pub fn with_fixtures() -> Self {
        let env = Self::new();
        env.write_data("facility_readiness_tasks.csv", TASKS_CSV);
        env.write_data("capex_plan_vs_actuals.csv", CAPEX_CSV);
        env.write_data("lead_times_expedite.csv", LEAD_TIMES_CSV);
        env
    }

    /// Get a Command for the cr binary, isolated from the user's config.
    pub fn cr(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cr"));
        cmd.current_dir(self.root_dir.path());
        cmd.env("CR_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("CR_ROOT");
        cmd.env_remove("CR_DATA_DIR");
        cmd.env_remove("CR_EVIDENCE_DIR");
        cmd.env_remove("CR_LOG");
        cmd
    }

    pub fn root(&self) -> &Path {
        self.root_dir.path()
    }

    pub fn data_path(&self) -> PathBuf {
        self.root().join("data/raw")
    }

    /// Write a dataset file under `data/raw`.
    pub fn write_data(&self, name: &str, content: &str) {
        let dir = self.data_path();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    /// Write the project's `capready.kdl`.
    pub fn write_project_config(&self, content: &str) {
        fs::write(self.root().join("capready.kdl"), content).unwrap();
    }

    /// Write the system `config.kdl`.
    pub fn write_system_config(&self, content: &str) {
        fs::write(self.config_dir.path().join("config.kdl"), content).unwrap();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}
