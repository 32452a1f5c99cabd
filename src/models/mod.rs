//! Data models for the readiness and CapEx datasets.
//!
//! This module defines the three record types loaded from CSV:
//! - `Task` - One facility readiness task with schedule, state and dependencies
//! - `CapexRecord` - Planned, actual and forecast spend for a tool
//! - `LeadTimeRecord` - Vendor expedite spend for a tool
//!
//! Status, risk level and gate are kept as the raw dataset strings. Unknown
//! values are normalized by the lookup tables in [`weights`], never rejected.

pub mod graph;
pub mod weights;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

pub use weights::{
    GATE_WEIGHT, RISK_WEIGHT, STATUS_SCORE, gate_weight, risk_weight, status_score,
};

/// Status label for a completed task.
pub const STATUS_DONE: &str = "Done";
/// Status label for a task that is underway.
pub const STATUS_IN_PROGRESS: &str = "In Progress";
/// Status label for a task that cannot proceed.
pub const STATUS_BLOCKED: &str = "Blocked";
/// Risk label counted by the `high_risk` rollups.
pub const RISK_HIGH: &str = "High";

/// A facility readiness task (one row of `facility_readiness_tasks.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within the dataset (e.g., "T-17")
    pub task_id: String,

    /// Program the task belongs to (e.g., "Project Apollo")
    pub program: String,

    /// Tool being installed (e.g., "TL-004")
    pub tool_id: String,

    /// Factory site
    pub site: String,

    /// Area within the site
    pub area: String,

    /// Task name, referenced by `depends_on` of other tasks in the same scope
    pub task_name: String,

    #[serde(default)]
    pub workstream: String,

    /// Installation gate (Install, PowerOn, Comm, SAT)
    pub gate: String,

    #[serde(default)]
    pub owner: String,

    /// Date-only cells load as midnight
    #[serde(
        serialize_with = "serialize_schedule",
        deserialize_with = "deserialize_schedule"
    )]
    pub planned_start: NaiveDateTime,

    #[serde(
        serialize_with = "serialize_schedule",
        deserialize_with = "deserialize_schedule"
    )]
    pub planned_finish: NaiveDateTime,

    /// Done, In Progress, Blocked, At Risk, Not Started
    pub status: String,

    /// Low, Medium, High, Critical
    pub risk_level: String,

    /// Comma-separated predecessor task names
    #[serde(default)]
    pub depends_on: String,
}

impl Task {
    /// Create a task with the given ID and name.
    ///
    /// Every other field starts empty, with a one-day schedule on the Unix epoch.
    pub fn new(task_id: impl Into<String>, task_name: impl Into<String>) -> Self {
        let day = NaiveDate::default().and_time(NaiveTime::MIN);
        Self {
            task_id: task_id.into(),
            program: String::new(),
            tool_id: String::new(),
            site: String::new(),
            area: String::new(),
            task_name: task_name.into(),
            workstream: String::new(),
            gate: String::new(),
            owner: String::new(),
            planned_start: day,
            planned_finish: day,
            status: String::new(),
            risk_level: String::new(),
            depends_on: String::new(),
        }
    }

    pub fn with_scope(mut self, program: impl Into<String>, tool_id: impl Into<String>) -> Self {
        self.program = program.into();
        self.tool_id = tool_id.into();
        self
    }

    pub fn with_location(mut self, site: impl Into<String>, area: impl Into<String>) -> Self {
        self.site = site.into();
        self.area = area.into();
        self
    }

    pub fn with_gate(mut self, gate: impl Into<String>) -> Self {
        self.gate = gate.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_risk(mut self, risk_level: impl Into<String>) -> Self {
        self.risk_level = risk_level.into();
        self
    }

    /// Schedule on whole days, starting and finishing at midnight.
    pub fn with_schedule(self, start: NaiveDate, finish: NaiveDate) -> Self {
        self.with_schedule_at(start.and_time(NaiveTime::MIN), finish.and_time(NaiveTime::MIN))
    }

    pub fn with_schedule_at(mut self, start: NaiveDateTime, finish: NaiveDateTime) -> Self {
        self.planned_start = start;
        self.planned_finish = finish;
        self
    }

    pub fn with_depends_on(mut self, depends_on: impl Into<String>) -> Self {
        self.depends_on = depends_on.into();
        self
    }

    /// Planned duration in whole days, floored at 1 so no task has zero length.
    ///
    /// Partial days are dropped: 36 hours counts as one day.
    pub fn duration_days(&self) -> i64 {
        (self.planned_finish - self.planned_start).num_days().max(1)
    }

    /// Predecessor names from `depends_on`, trimmed, with empty tokens skipped.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.depends_on
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn is_done(&self) -> bool {
        self.status == STATUS_DONE
    }

    pub fn is_blocked(&self) -> bool {
        self.status == STATUS_BLOCKED
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RISK_HIGH
    }

    /// Returns true if the task belongs to the given program/tool scope.
    pub fn in_scope(&self, program: &str, tool_id: &str) -> bool {
        self.program == program && self.tool_id == tool_id
    }
}

/// Planned vs actual spend for one tool (one row of `capex_plan_vs_actuals.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapexRecord {
    pub program: String,
    pub tool_id: String,
    pub capex_category: String,

    #[serde(deserialize_with = "deserialize_amount")]
    pub planned_spend_usd: f64,

    #[serde(deserialize_with = "deserialize_amount")]
    pub actual_spend_usd: f64,

    #[serde(deserialize_with = "deserialize_amount")]
    pub forecast_spend_usd: f64,
}

impl CapexRecord {
    /// Actual minus planned spend (positive means over plan).
    pub fn variance_usd(&self) -> f64 {
        self.actual_spend_usd - self.planned_spend_usd
    }
}

/// Vendor expedite spend for one tool (one row of `lead_times_expedite.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadTimeRecord {
    pub program: String,
    pub tool_id: String,
    pub vendor: String,

    /// Why delivery was expedited; empty when the dataset has no reason column
    #[serde(default)]
    pub expedite_reason: String,

    /// Non-numeric or missing cells load as 0.0
    #[serde(deserialize_with = "deserialize_amount")]
    pub expedite_spend_usd: f64,
}

/// Coerce a monetary cell to a finite number.
///
/// Returns `None` for blank, non-numeric, or non-finite text.
pub fn coerce_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse a schedule cell.
///
/// Accepts plain dates (read as midnight) as well as date-times, space or
/// `T` separated. RFC 3339 values keep their local wall-clock time.
pub fn parse_schedule(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Render a schedule value: `YYYY-MM-DD` at midnight, else with the time.
pub fn format_schedule(value: &NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.date().to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(0.0);
    };
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    Ok(coerce_amount(&raw).unwrap_or_else(|| {
        warn!(value = %raw, "non-numeric amount coerced to 0.0");
        0.0
    }))
}

pub(crate) fn serialize_schedule<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_schedule(value))
}

pub(crate) fn deserialize_schedule<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_schedule(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {:?}", raw)))
}
