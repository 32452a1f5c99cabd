//! Markdown table rendering for human output and evidence reports.
//!
//! Each result row type implements [`TableRow`], naming its columns and
//! formatting its cells. Money and percentages print with two decimals.

use crate::analytics::{
    CapexVarianceRow, CriticalPathStep, ExpediteRow, GateSlipRow, Kpis, ReadinessRow,
};
use crate::models::{Task, format_schedule};

/// A row that can be rendered as part of a Markdown table.
pub trait TableRow {
    /// Column headers, in display order.
    fn headers() -> Vec<&'static str>;

    /// Cell text, one per header.
    fn cells(&self) -> Vec<String>;
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

pub fn money(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn percent(value: f64) -> String {
    format!("{:.2}", value)
}

/// Render rows as a GitHub-flavoured Markdown table.
///
/// An empty slice still renders the header, followed by `_No rows._`.
pub fn markdown_table<T: TableRow>(rows: &[T]) -> String {
    let headers = T::headers();
    let mut out = String::new();

    out.push_str("| ");
    out.push_str(&headers.join(" | "));
    out.push_str(" |\n|");
    for _ in &headers {
        out.push_str("---|");
    }
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| escape(c)).collect();
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
    }

    if rows.is_empty() {
        out.push_str("\n_No rows._\n");
    }
    out
}

/// A titled Markdown document: `# title`, optional preamble lines, then the table.
pub fn markdown_document<T: TableRow>(title: &str, preamble: &[String], rows: &[T]) -> String {
    let mut out = format!("# {}\n\n", title);
    for line in preamble {
        out.push_str(line);
        out.push_str("\n\n");
    }
    out.push_str(&markdown_table(rows));
    out
}

impl TableRow for ReadinessRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "program",
            "tool_id",
            "site",
            "area",
            "readiness_score",
            "tasks_total",
            "tasks_done",
            "tasks_blocked",
            "high_risk",
            "max_weight",
            "readiness_pct",
            "rag",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.program.clone(),
            self.tool_id.clone(),
            self.site.clone(),
            self.area.clone(),
            format!("{:.4}", self.readiness_score),
            self.tasks_total.to_string(),
            self.tasks_done.to_string(),
            self.tasks_blocked.to_string(),
            self.high_risk.to_string(),
            format!("{:.2}", self.max_weight),
            percent(self.readiness_pct),
            self.rag.to_string(),
        ]
    }
}

impl TableRow for CriticalPathStep {
    fn headers() -> Vec<&'static str> {
        vec![
            "program",
            "tool_id",
            "task_id",
            "task_name",
            "workstream",
            "gate",
            "planned_start",
            "planned_finish",
            "status",
            "risk_level",
            "depends_on",
            "cp_rank",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.program.clone(),
            self.tool_id.clone(),
            self.task_id.clone(),
            self.task_name.clone(),
            self.workstream.clone(),
            self.gate.clone(),
            format_schedule(&self.planned_start),
            format_schedule(&self.planned_finish),
            self.status.clone(),
            self.risk_level.clone(),
            self.depends_on.clone(),
            self.cp_rank.to_string(),
        ]
    }
}

impl TableRow for ExpediteRow {
    fn headers() -> Vec<&'static str> {
        vec!["vendor", "expedite_reason", "expedite_spend_usd", "lines", "tools"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.vendor.clone(),
            self.expedite_reason.clone(),
            money(self.expedite_spend_usd),
            self.lines.to_string(),
            self.tools.to_string(),
        ]
    }
}

impl TableRow for CapexVarianceRow {
    fn headers() -> Vec<&'static str> {
        vec!["program", "capex_category", "planned", "actual", "forecast", "variance"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.program.clone().unwrap_or_default(),
            self.capex_category.clone(),
            money(self.planned),
            money(self.actual),
            money(self.forecast),
            money(self.variance),
        ]
    }
}

impl TableRow for GateSlipRow {
    fn headers() -> Vec<&'static str> {
        vec!["program", "gate", "next_gate_date", "open_tasks", "blocked", "high_risk"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.program.clone().unwrap_or_default(),
            self.gate.clone(),
            format_schedule(&self.next_gate_date),
            self.open_tasks.to_string(),
            self.blocked.to_string(),
            self.high_risk.to_string(),
        ]
    }
}

/// Blockers list columns.
impl TableRow for Task {
    fn headers() -> Vec<&'static str> {
        vec![
            "program",
            "site",
            "area",
            "tool_id",
            "task_id",
            "task_name",
            "gate",
            "owner",
            "planned_finish",
            "status",
            "risk_level",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.program.clone(),
            self.site.clone(),
            self.area.clone(),
            self.tool_id.clone(),
            self.task_id.clone(),
            self.task_name.clone(),
            self.gate.clone(),
            self.owner.clone(),
            format_schedule(&self.planned_finish),
            self.status.clone(),
            self.risk_level.clone(),
        ]
    }
}

impl TableRow for Kpis {
    fn headers() -> Vec<&'static str> {
        vec![
            "planned_usd",
            "actual_usd",
            "variance_usd",
            "forecast_usd",
            "expedite_usd",
            "open_tasks",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            money(self.planned_usd),
            money(self.actual_usd),
            money(self.variance_usd),
            money(self.forecast_usd),
            money(self.expedite_usd),
            self.open_tasks.to_string(),
        ]
    }
}
