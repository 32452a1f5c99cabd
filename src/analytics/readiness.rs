//! Weighted readiness rollup per (program, tool, site, area).
//!
//! Each task contributes `status_score * gate_weight / risk_weight`. A group's
//! percentage compares the sum of contributions against the sum of its gate
//! weights, i.e. the score the group would have if every task were Done at
//! Low risk.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Task, gate_weight, risk_weight, status_score};

/// Guards the percentage against groups whose gate weights sum to zero.
pub const MIN_MAX_WEIGHT: f64 = 1e-9;

/// Percentage at or above which a group is Green.
pub const GREEN_THRESHOLD: f64 = 88.0;

/// Percentage at or above which a group is at least Amber.
pub const AMBER_THRESHOLD: f64 = 75.0;

/// Red/Amber/Green health classification.
///
/// Variants are declared in label order so the derived `Ord` sorts
/// "A" < "G" < "R".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rag {
    #[serde(rename = "A")]
    Amber,
    #[serde(rename = "G")]
    Green,
    #[serde(rename = "R")]
    Red,
}

impl Rag {
    /// Classify a group. Rules are checked in order:
    /// blocked below Green is Red, then Green, then Amber, else Red.
    pub fn classify(readiness_pct: f64, tasks_blocked: usize) -> Self {
        if tasks_blocked > 0 && readiness_pct < GREEN_THRESHOLD {
            return Rag::Red;
        }
        if readiness_pct >= GREEN_THRESHOLD {
            return Rag::Green;
        }
        if readiness_pct >= AMBER_THRESHOLD {
            return Rag::Amber;
        }
        Rag::Red
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rag::Amber => "A",
            Rag::Green => "G",
            Rag::Red => "R",
        }
    }
}

impl fmt::Display for Rag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One group of the readiness rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessRow {
    pub program: String,
    pub tool_id: String,
    pub site: String,
    pub area: String,
    pub readiness_score: f64,
    pub tasks_total: usize,
    pub tasks_done: usize,
    pub tasks_blocked: usize,
    pub high_risk: usize,
    pub max_weight: f64,
    pub readiness_pct: f64,
    pub rag: Rag,
}

type GroupKey = (String, String, String, String);

#[derive(Default)]
struct Accumulator {
    readiness_score: f64,
    max_weight: f64,
    tasks_total: usize,
    tasks_done: usize,
    tasks_blocked: usize,
    high_risk: usize,
}

/// Weighted contribution of a single task.
pub fn weighted_score(task: &Task) -> f64 {
    status_score(&task.status) * gate_weight(&task.gate) / risk_weight(&task.risk_level)
}

/// Compute the readiness rollup.
///
/// Rows are sorted by RAG label ascending, then readiness percentage
/// descending; remaining ties keep group key order. Empty input yields an
/// empty rollup. Tasks with a blank program, tool, site or area belong to no
/// group and are left out.
pub fn compute_readiness(tasks: &[Task]) -> Vec<ReadinessRow> {
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();

    for task in tasks {
        let keys = [&task.program, &task.tool_id, &task.site, &task.area];
        if keys.iter().any(|k| k.trim().is_empty()) {
            debug!(task_id = %task.task_id, "skipping task with blank group key");
            continue;
        }
        let key = (
            task.program.clone(),
            task.tool_id.clone(),
            task.site.clone(),
            task.area.clone(),
        );
        let acc = groups.entry(key).or_default();
        acc.readiness_score += weighted_score(task);
        acc.max_weight += gate_weight(&task.gate);
        acc.tasks_total += 1;
        if task.is_done() {
            acc.tasks_done += 1;
        }
        if task.is_blocked() {
            acc.tasks_blocked += 1;
        }
        if task.is_high_risk() {
            acc.high_risk += 1;
        }
    }

    let mut rows: Vec<ReadinessRow> = groups
        .into_iter()
        .map(|((program, tool_id, site, area), acc)| {
            let readiness_pct = 100.0 * acc.readiness_score / acc.max_weight.max(MIN_MAX_WEIGHT);
            ReadinessRow {
                program,
                tool_id,
                site,
                area,
                readiness_score: acc.readiness_score,
                tasks_total: acc.tasks_total,
                tasks_done: acc.tasks_done,
                tasks_blocked: acc.tasks_blocked,
                high_risk: acc.high_risk,
                max_weight: acc.max_weight,
                readiness_pct,
                rag: Rag::classify(readiness_pct, acc.tasks_blocked),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.rag
            .cmp(&b.rag)
            .then_with(|| b.readiness_pct.total_cmp(&a.readiness_pct))
    });
    rows
}

/// The `limit` groups most at risk: RAG ascending, then lowest percentage first.
pub fn most_at_risk(rows: &[ReadinessRow], limit: usize) -> Vec<ReadinessRow> {
    let mut worst = rows.to_vec();
    worst.sort_by(|a, b| {
        a.rag
            .cmp(&b.rag)
            .then_with(|| a.readiness_pct.total_cmp(&b.readiness_pct))
    });
    worst.truncate(limit);
    worst
}
