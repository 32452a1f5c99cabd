//! Expedite spend grouped by vendor and reason.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::LeadTimeRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpediteRow {
    pub vendor: String,
    pub expedite_reason: String,
    /// Summed expedite spend
    pub expedite_spend_usd: f64,
    /// Number of records in the group
    pub lines: usize,
    /// Number of distinct non-blank tool IDs in the group
    pub tools: usize,
}

fn spend(record: &LeadTimeRecord) -> f64 {
    if record.expedite_spend_usd.is_finite() {
        record.expedite_spend_usd
    } else {
        0.0
    }
}

/// Summarize expedite spend per (vendor, reason), largest spend first.
///
/// Groups with equal spend keep the order in which they were first seen.
pub fn expedite_summary(records: &[LeadTimeRecord]) -> Vec<ExpediteRow> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut rows: Vec<ExpediteRow> = Vec::new();
    let mut tools: Vec<HashSet<&str>> = Vec::new();

    for record in records {
        let key = (record.vendor.as_str(), record.expedite_reason.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            rows.push(ExpediteRow {
                vendor: record.vendor.clone(),
                expedite_reason: record.expedite_reason.clone(),
                expedite_spend_usd: 0.0,
                lines: 0,
                tools: 0,
            });
            tools.push(HashSet::new());
            rows.len() - 1
        });

        let row = &mut rows[slot];
        row.expedite_spend_usd += spend(record);
        row.lines += 1;
        if !record.tool_id.trim().is_empty() {
            tools[slot].insert(record.tool_id.as_str());
        }
    }

    for (row, distinct) in rows.iter_mut().zip(&tools) {
        row.tools = distinct.len();
    }

    rows.sort_by(|a, b| b.expedite_spend_usd.total_cmp(&a.expedite_spend_usd));
    rows
}

/// Total expedite spend across all records.
pub fn total_expedite_spend(records: &[LeadTimeRecord]) -> f64 {
    records.iter().map(spend).sum()
}
