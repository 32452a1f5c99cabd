//! CapEx plan-vs-actual variance and headline KPIs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analytics::expedite::total_expedite_spend;
use crate::models::{CapexRecord, LeadTimeRecord, Task};

/// Grouping for the variance table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapexGrouping {
    /// One row per CapEx category
    #[default]
    Category,
    /// One row per (program, category)
    ProgramCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapexVarianceRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    pub capex_category: String,
    pub planned: f64,
    pub actual: f64,
    pub forecast: f64,
    /// Actual minus planned
    pub variance: f64,
}

/// Plan-vs-actual totals per group, largest overrun first.
///
/// Groups with equal variance keep the order in which they were first seen.
pub fn variance_by(records: &[CapexRecord], grouping: CapexGrouping) -> Vec<CapexVarianceRow> {
    let mut index: HashMap<(Option<&str>, &str), usize> = HashMap::new();
    let mut rows: Vec<CapexVarianceRow> = Vec::new();

    for record in records {
        let program = match grouping {
            CapexGrouping::Category => None,
            CapexGrouping::ProgramCategory => Some(record.program.as_str()),
        };
        let key = (program, record.capex_category.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            rows.push(CapexVarianceRow {
                program: program.map(str::to_string),
                capex_category: record.capex_category.clone(),
                planned: 0.0,
                actual: 0.0,
                forecast: 0.0,
                variance: 0.0,
            });
            rows.len() - 1
        });

        let row = &mut rows[slot];
        row.planned += record.planned_spend_usd;
        row.actual += record.actual_spend_usd;
        row.forecast += record.forecast_spend_usd;
        row.variance += record.variance_usd();
    }

    rows.sort_by(|a, b| b.variance.total_cmp(&a.variance));
    rows
}

/// Headline numbers shown above the dashboard tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub planned_usd: f64,
    pub actual_usd: f64,
    pub forecast_usd: f64,
    pub variance_usd: f64,
    pub expedite_usd: f64,
    /// Tasks whose status is not Done
    pub open_tasks: usize,
}

pub fn headline_kpis(capex: &[CapexRecord], lead: &[LeadTimeRecord], tasks: &[Task]) -> Kpis {
    Kpis {
        planned_usd: capex.iter().map(|r| r.planned_spend_usd).sum(),
        actual_usd: capex.iter().map(|r| r.actual_spend_usd).sum(),
        forecast_usd: capex.iter().map(|r| r.forecast_spend_usd).sum(),
        variance_usd: capex.iter().map(CapexRecord::variance_usd).sum(),
        expedite_usd: total_expedite_spend(lead),
        open_tasks: tasks.iter().filter(|t| !t.is_done()).count(),
    }
}
