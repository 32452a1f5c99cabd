//! Critical path: the longest planned-duration dependency chain for one
//! program/tool scope.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Task;
use crate::models::graph::DependencyGraph;
use crate::{Error, Result};

/// What to do when the scope's dependencies contain a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Leave cyclic tasks out of the topological order and report them in
    /// [`CriticalPath::excluded`]
    #[default]
    Drop,
    /// Fail with [`Error::CycleDetected`]
    Error,
}

impl CyclePolicy {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "drop" => Some(CyclePolicy::Drop),
            "error" => Some(CyclePolicy::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePolicy::Drop => "drop",
            CyclePolicy::Error => "error",
        }
    }
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One task on the critical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathStep {
    pub program: String,
    pub tool_id: String,
    pub task_id: String,
    pub task_name: String,
    pub workstream: String,
    pub gate: String,
    #[serde(
        serialize_with = "crate::models::serialize_schedule",
        deserialize_with = "crate::models::deserialize_schedule"
    )]
    pub planned_start: NaiveDateTime,
    #[serde(
        serialize_with = "crate::models::serialize_schedule",
        deserialize_with = "crate::models::deserialize_schedule"
    )]
    pub planned_finish: NaiveDateTime,
    pub status: String,
    pub risk_level: String,
    pub depends_on: String,
    pub duration_days: i64,
    /// 1-based position along the chain
    pub cp_rank: usize,
}

impl CriticalPathStep {
    fn from_task(task: &Task, cp_rank: usize) -> Self {
        Self {
            program: task.program.clone(),
            tool_id: task.tool_id.clone(),
            task_id: task.task_id.clone(),
            task_name: task.task_name.clone(),
            workstream: task.workstream.clone(),
            gate: task.gate.clone(),
            planned_start: task.planned_start,
            planned_finish: task.planned_finish,
            status: task.status.clone(),
            risk_level: task.risk_level.clone(),
            depends_on: task.depends_on.clone(),
            duration_days: task.duration_days(),
            cp_rank,
        }
    }
}

/// The longest dependency chain in a program/tool scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    pub program: String,
    pub tool_id: String,

    /// Sum of step durations
    pub total_duration_days: i64,

    /// Steps from chain start to chain end
    pub steps: Vec<CriticalPathStep>,

    /// Task names left out of the topological order because of a cycle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<String>,
}

impl CriticalPath {
    pub fn task_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.task_name.as_str()).collect()
    }
}

/// Build the dependency graph for tasks already restricted to one scope.
///
/// Names resolve to the first task carrying them. Unresolved names add no edge.
fn build_graph(scoped: &[&Task]) -> DependencyGraph {
    let mut name_to_index: HashMap<&str, usize> = HashMap::new();
    for (index, task) in scoped.iter().enumerate() {
        name_to_index.entry(task.task_name.as_str()).or_insert(index);
    }

    let mut graph = DependencyGraph::with_nodes(scoped.len());
    for (index, task) in scoped.iter().enumerate() {
        for name in task.dependency_names() {
            match name_to_index.get(name) {
                Some(&predecessor) => graph.add_edge(predecessor, index),
                None => debug!(
                    task_id = %task.task_id,
                    dependency = name,
                    "dropping unresolved dependency"
                ),
            }
        }
    }
    graph
}

/// Compute the critical path for `program` / `tool_id`.
///
/// Only tasks in that exact scope are considered, in dataset order. An empty
/// scope gives an empty path. Under [`CyclePolicy::Error`] a cycle fails with
/// [`Error::CycleDetected`].
pub fn compute_critical_path(
    tasks: &[Task],
    program: &str,
    tool_id: &str,
    policy: CyclePolicy,
) -> Result<CriticalPath> {
    let scoped: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.in_scope(program, tool_id))
        .collect();

    let graph = build_graph(&scoped);
    let topo = graph.topological_order();

    let excluded: Vec<String> = topo
        .excluded
        .iter()
        .map(|&i| scoped[i].task_name.clone())
        .collect();
    if !excluded.is_empty() {
        match policy {
            CyclePolicy::Error => return Err(Error::CycleDetected(excluded)),
            CyclePolicy::Drop => warn!(
                program,
                tool_id,
                excluded = ?excluded,
                "dependency cycle; excluding tasks from critical path"
            ),
        }
    }

    let durations: Vec<i64> = scoped.iter().map(|t| t.duration_days()).collect();
    let (steps, total_duration_days) = match graph.longest_path(&topo, &durations) {
        Some(path) => {
            let steps = path
                .nodes
                .iter()
                .enumerate()
                .map(|(rank, &i)| CriticalPathStep::from_task(scoped[i], rank + 1))
                .collect();
            (steps, path.length)
        }
        None => (Vec::new(), 0),
    };

    debug!(
        program,
        tool_id,
        tasks = scoped.len(),
        length = steps.len(),
        total_duration_days,
        "computed critical path"
    );

    Ok(CriticalPath {
        program: program.to_string(),
        tool_id: tool_id.to_string(),
        total_duration_days,
        steps,
        excluded,
    })
}

/// Scope used when none is named: the first task's program and the first
/// tool listed for that program.
pub fn default_scope(tasks: &[Task]) -> Option<(String, String)> {
    let program = &tasks.first()?.program;
    let tool_id = &tasks.iter().find(|t| &t.program == program)?.tool_id;
    Some((program.clone(), tool_id.clone()))
}
