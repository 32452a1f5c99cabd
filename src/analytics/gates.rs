//! Gate slip risk and the blockers list.
//!
//! Both views look only at work that is still open.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{STATUS_BLOCKED, STATUS_IN_PROGRESS, Task};

/// Default number of rows in the blockers list.
pub const DEFAULT_BLOCKERS_LIMIT: usize = 50;

/// Grouping for the gate slip table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateSlipGrouping {
    /// One row per gate
    #[default]
    Gate,
    /// One row per (program, gate)
    ProgramGate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSlipRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    pub gate: String,
    /// Latest planned finish among the gate's open tasks
    #[serde(
        serialize_with = "crate::models::serialize_schedule",
        deserialize_with = "crate::models::deserialize_schedule"
    )]
    pub next_gate_date: NaiveDateTime,
    pub open_tasks: usize,
    pub blocked: usize,
    pub high_risk: usize,
}

/// Why each gate might slip: open work, blockers and high-risk tasks per gate.
///
/// Sorted by `next_gate_date` ascending, then `blocked` and `high_risk`
/// descending. Remaining ties keep group key order.
pub fn gate_slip_risk(tasks: &[Task], grouping: GateSlipGrouping) -> Vec<GateSlipRow> {
    let mut groups: BTreeMap<(Option<&str>, &str), GateSlipRow> = BTreeMap::new();

    for task in tasks.iter().filter(|t| !t.is_done()) {
        let program = match grouping {
            GateSlipGrouping::Gate => None,
            GateSlipGrouping::ProgramGate => Some(task.program.as_str()),
        };
        let row = groups
            .entry((program, task.gate.as_str()))
            .or_insert_with(|| GateSlipRow {
                program: program.map(str::to_string),
                gate: task.gate.clone(),
                next_gate_date: task.planned_finish,
                open_tasks: 0,
                blocked: 0,
                high_risk: 0,
            });
        row.next_gate_date = row.next_gate_date.max(task.planned_finish);
        row.open_tasks += 1;
        if task.is_blocked() {
            row.blocked += 1;
        }
        if task.is_high_risk() {
            row.high_risk += 1;
        }
    }

    let mut rows: Vec<GateSlipRow> = groups.into_values().collect();
    rows.sort_by(|a, b| {
        a.next_gate_date
            .cmp(&b.next_gate_date)
            .then_with(|| b.blocked.cmp(&a.blocked))
            .then_with(|| b.high_risk.cmp(&a.high_risk))
    });
    rows
}

/// What is blocking installation: Blocked or In Progress tasks.
///
/// Sorted by gate, then status, then risk level descending (by label text),
/// then earliest planned finish; at most `limit` rows.
pub fn blockers(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut rows: Vec<Task> = tasks
        .iter()
        .filter(|t| t.status == STATUS_BLOCKED || t.status == STATUS_IN_PROGRESS)
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        a.gate
            .cmp(&b.gate)
            .then_with(|| a.status.cmp(&b.status))
            .then_with(|| b.risk_level.cmp(&a.risk_level))
            .then_with(|| a.planned_finish.cmp(&b.planned_finish))
    });
    rows.truncate(limit);
    rows
}
