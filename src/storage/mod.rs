//! Storage layer for capready data.
//!
//! This module handles every touch of the filesystem:
//!
//! - **Datasets**: three CSV files read from the data directory
//!   (`capex_plan_vs_actuals.csv`, `lead_times_expedite.csv`,
//!   `facility_readiness_tasks.csv`), checked for required columns before
//!   any row is deserialized
//! - **Reports**: Markdown evidence files, overwritten in place
//! - **Config**: `capready.kdl` in the project root and `config.kdl` in the
//!   system config directory

use crate::config::CapreadyConfig;
use crate::filter::DashboardFilter;
use crate::models::{CapexRecord, LeadTimeRecord, Task};
use crate::{Error, Result};
use kdl::KdlDocument;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CAPEX_FILE: &str = "capex_plan_vs_actuals.csv";
pub const LEAD_TIMES_FILE: &str = "lead_times_expedite.csv";
pub const TASKS_FILE: &str = "facility_readiness_tasks.csv";

/// Project-level config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "capready.kdl";

/// Overrides the system config directory (mainly for tests).
pub const CONFIG_DIR_ENV: &str = "CR_CONFIG_DIR";

pub const TASK_COLUMNS: &[&str] = &[
    "task_id",
    "program",
    "tool_id",
    "site",
    "area",
    "task_name",
    "gate",
    "planned_start",
    "planned_finish",
    "status",
    "risk_level",
];

pub const CAPEX_COLUMNS: &[&str] = &[
    "program",
    "tool_id",
    "capex_category",
    "planned_spend_usd",
    "actual_spend_usd",
    "forecast_spend_usd",
];

pub const LEAD_TIME_COLUMNS: &[&str] = &["program", "tool_id", "vendor", "expedite_spend_usd"];

/// Where datasets are read from and reports are written to.
///
/// Relative directories are resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub evidence_dir: PathBuf,
}

impl Layout {
    pub fn new(root: &Path, data_dir: &Path, evidence_dir: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            data_dir: root.join(data_dir),
            evidence_dir: root.join(evidence_dir),
        }
    }

    pub fn capex_path(&self) -> PathBuf {
        self.data_dir.join(CAPEX_FILE)
    }

    pub fn lead_times_path(&self) -> PathBuf {
        self.data_dir.join(LEAD_TIMES_FILE)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }
}

/// The three datasets, loaded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub capex: Vec<CapexRecord>,
    pub lead_times: Vec<LeadTimeRecord>,
    pub tasks: Vec<Task>,
}

impl Datasets {
    /// Load all three datasets, failing on the first missing file or schema
    /// violation.
    pub fn load(layout: &Layout) -> Result<Self> {
        Ok(Self {
            capex: load_capex(&layout.capex_path())?,
            lead_times: load_lead_times(&layout.lead_times_path())?,
            tasks: load_tasks(&layout.tasks_path())?,
        })
    }

    /// A filtered copy; `self` is left untouched.
    pub fn filtered(&self, filter: &DashboardFilter) -> Self {
        Self {
            capex: filter.capex(&self.capex),
            lead_times: filter.lead_times(&self.lead_times),
            tasks: filter.tasks(&self.tasks),
        }
    }
}

pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    read_csv(path, TASK_COLUMNS)
}

pub fn load_capex(path: &Path) -> Result<Vec<CapexRecord>> {
    read_csv(path, CAPEX_COLUMNS)
}

pub fn load_lead_times(path: &Path) -> Result<Vec<LeadTimeRecord>> {
    read_csv(path, LEAD_TIME_COLUMNS)
}

/// Read every row of a CSV file.
///
/// Fails with [`Error::MissingFile`] if the path does not exist and with
/// [`Error::MissingColumns`] naming every required header that is absent.
pub fn read_csv<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    check_columns(path, headers.iter(), required)?;

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;

    info!(path = %path.display(), rows = rows.len(), "loaded dataset");
    Ok(rows)
}

/// Verify that every required column is present in `headers`.
pub fn check_columns<'a>(
    path: &Path,
    headers: impl IntoIterator<Item = &'a str>,
    required: &[&str],
) -> Result<()> {
    let present: Vec<&str> = headers.into_iter().collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !present.contains(column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        })
    }
}

/// Write a report, creating parent directories and replacing any previous
/// content.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!(path = %path.display(), bytes = content.len(), "wrote report");
    Ok(())
}

/// Path of the project-level config file.
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_CONFIG_FILE)
}

/// Path of the system-level config file.
///
/// `CR_CONFIG_DIR` wins over the platform config directory. Returns `None`
/// if neither is available.
pub fn system_config_path() -> Option<PathBuf> {
    let dir = match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()?.join("capready"),
    };
    Some(dir.join("config.kdl"))
}

/// Read and parse a KDL config file. A missing file is an empty config.
pub fn read_config(path: &Path) -> Result<CapreadyConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(CapreadyConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e)))?;
    let config = CapreadyConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

/// Write a config file, creating parent directories.
pub fn write_config(path: &Path, config: &CapreadyConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, config.to_kdl().to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TASKS_CSV: &str = "\
task_id,program,tool_id,site,area,task_name,workstream,gate,owner,planned_start,planned_finish,status,risk_level,depends_on
T-1,Project Apollo,TL-001,Arizona,Fab1,Foundation,Civil,Install,Ana,2026-01-01,2026-01-05,Done,Low,
T-2,Project Apollo,TL-001,Arizona,Fab1,Power Hookup,Electrical,PowerOn,Raj,2026-01-05,2026-01-09,Blocked,High,Foundation
";

    fn layout(dir: &TempDir) -> Layout {
        Layout::new(dir.path(), Path::new("data/raw"), Path::new("docs/evidence"))
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_layout_resolves_relative_dirs() {
        let layout = Layout::new(Path::new("/srv/fab"), Path::new("data"), Path::new("out"));
        assert_eq!(layout.tasks_path(), PathBuf::from("/srv/fab/data").join(TASKS_FILE));
        assert_eq!(layout.evidence_dir, PathBuf::from("/srv/fab/out"));
    }

    #[test]
    fn test_layout_keeps_absolute_dirs() {
        let layout = Layout::new(Path::new("/srv/fab"), Path::new("/mnt/data"), Path::new("out"));
        assert_eq!(layout.capex_path(), PathBuf::from("/mnt/data").join(CAPEX_FILE));
    }

    #[test]
    fn test_load_tasks() {
        let dir = TempDir::new().unwrap();
        let layout = layout(&dir);
        write(&layout.data_dir, TASKS_FILE, TASKS_CSV);

        let tasks = load_tasks(&layout.tasks_path()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].task_name, "Power Hookup");
        assert_eq!(tasks[1].depends_on, "Foundation");
        assert_eq!(tasks[0].duration_days(), 4);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TASKS_FILE);
        match load_tasks(&path) {
            Err(Error::MissingFile(p)) => assert_eq!(p, path),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_are_all_named() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), CAPEX_FILE, "program,tool_id,planned_spend_usd\nP,TL-001,10\n");
        match load_capex(&dir.path().join(CAPEX_FILE)) {
            Err(Error::MissingColumns { columns, .. }) => assert_eq!(
                columns,
                vec!["capex_category", "actual_spend_usd", "forecast_spend_usd"]
            ),
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_a_csv_error() {
        let dir = TempDir::new().unwrap();
        let csv = TASKS_CSV.replace("2026-01-05,Done", "someday,Done");
        write(dir.path(), TASKS_FILE, &csv);
        assert!(matches!(
            load_tasks(&dir.path().join(TASKS_FILE)),
            Err(Error::Csv(_))
        ));
    }

    #[test]
    fn test_lead_times_without_reason_column() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            LEAD_TIMES_FILE,
            "program,tool_id,vendor,expedite_spend_usd\nP,TL-001,ASML,1200.5\nP,TL-002,ASML,tbd\n",
        );
        let records = load_lead_times(&dir.path().join(LEAD_TIMES_FILE)).unwrap();
        assert_eq!(records[0].expedite_reason, "");
        assert_eq!(records[0].expedite_spend_usd, 1200.5);
        assert_eq!(records[1].expedite_spend_usd, 0.0);
    }

    #[test]
    fn test_write_report_creates_dirs_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs/evidence/report.md");
        write_report(&path, "first").unwrap();
        write_report(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_read_config_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = read_config(&dir.path().join("nope.kdl")).unwrap();
        assert_eq!(config, CapreadyConfig::default());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = project_config_path(dir.path());
        let config = CapreadyConfig {
            data_dir: Some("fixtures".to_string()),
            ..CapreadyConfig::default()
        };
        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_read_config_rejects_invalid_kdl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&path, "data-dir \"unterminated").unwrap();
        assert!(matches!(read_config(&path), Err(Error::Config(_))));
    }
}
