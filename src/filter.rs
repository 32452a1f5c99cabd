//! Dashboard filter over the three datasets.
//!
//! Tasks honour every criterion. CapEx and expedite records carry no site or
//! gate, so only program and tool apply to them.

use serde::{Deserialize, Serialize};

use crate::models::{CapexRecord, LeadTimeRecord, Task};

/// Selector value that matches everything.
pub const ALL: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
}

/// `None` and `"All"` both mean "no constraint".
fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| *v != ALL)
}

fn matches(criterion: Option<&str>, value: &str) -> bool {
    criterion.is_none_or(|wanted| wanted == value)
}

impl DashboardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_gate(mut self, gate: impl Into<String>) -> Self {
        self.gate = Some(gate.into());
        self
    }

    pub fn program(&self) -> Option<&str> {
        criterion(&self.program)
    }

    pub fn site(&self) -> Option<&str> {
        criterion(&self.site)
    }

    pub fn tool(&self) -> Option<&str> {
        criterion(&self.tool)
    }

    pub fn gate(&self) -> Option<&str> {
        criterion(&self.gate)
    }

    /// Returns true if no criterion constrains anything.
    pub fn is_empty(&self) -> bool {
        self.program().is_none()
            && self.site().is_none()
            && self.tool().is_none()
            && self.gate().is_none()
    }

    pub fn matches_task(&self, task: &Task) -> bool {
        matches(self.program(), &task.program)
            && matches(self.site(), &task.site)
            && matches(self.tool(), &task.tool_id)
            && matches(self.gate(), &task.gate)
    }

    pub fn matches_capex(&self, record: &CapexRecord) -> bool {
        matches(self.program(), &record.program) && matches(self.tool(), &record.tool_id)
    }

    pub fn matches_lead_time(&self, record: &LeadTimeRecord) -> bool {
        matches(self.program(), &record.program) && matches(self.tool(), &record.tool_id)
    }

    pub fn tasks(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches_task(t)).cloned().collect()
    }

    pub fn capex(&self, records: &[CapexRecord]) -> Vec<CapexRecord> {
        records
            .iter()
            .filter(|r| self.matches_capex(r))
            .cloned()
            .collect()
    }

    pub fn lead_times(&self, records: &[LeadTimeRecord]) -> Vec<LeadTimeRecord> {
        records
            .iter()
            .filter(|r| self.matches_lead_time(r))
            .cloned()
            .collect()
    }
}
