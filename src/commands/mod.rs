//! Command implementations for the capready CLI.
//!
//! Each command loads what it needs through [`Context`], runs the analytics
//! and returns a result that prints as JSON or as Markdown tables:
//! - `readiness` - readiness rollup, optionally only the most at risk
//! - `critical_path` - longest dependency chain for one program/tool
//! - `expedite`, `capex`, `gates`, `blockers`, `kpis` - dashboard views
//! - `evidence` - write every evidence report in one go
//! - `config_show`, `config_init` - inspect or persist resolved settings

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::Result;
use crate::analytics::{
    self, CapexGrouping, CapexVarianceRow, CriticalPath, CyclePolicy, ExpediteRow,
    GateSlipGrouping, GateSlipRow, Kpis, ReadinessRow,
};
use crate::config::ResolvedConfig;
use crate::filter::DashboardFilter;
use crate::models::Task;
use crate::report::{self, TableRow, markdown_document, markdown_table};
use crate::storage::{self, Datasets, Layout};

/// Evidence file names, in the order they are written.
pub const READINESS_REPORT: &str = "readiness_score_output.md";
pub const CRITICAL_PATH_REPORT: &str = "critical_path_output.md";
pub const EXPEDITE_REPORT: &str = "expedite_summary_output.md";
pub const CAPEX_REPORT: &str = "capex_variance_snapshot.md";
pub const GATE_SLIP_REPORT: &str = "gate_slip_risk_output.md";

const EVIDENCE_AT_RISK: usize = 15;
const EVIDENCE_EXPEDITE_TOP: usize = 20;
const EVIDENCE_CAPEX_TOP: usize = 25;
const EVIDENCE_GATES_TOP: usize = 25;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output: Serialize {
    /// Serialize to a JSON string.
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
    }

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Everything a command needs: where the project lives, how it is
/// configured and which slice of the data to look at.
#[derive(Debug, Clone)]
pub struct Context {
    pub layout: Layout,
    pub config: ResolvedConfig,
    pub filter: DashboardFilter,
}

impl Context {
    pub fn new(root: &Path, config: ResolvedConfig, filter: DashboardFilter) -> Self {
        let layout = Layout::new(root, config.data_dir(), config.evidence_dir());
        Self {
            layout,
            config,
            filter,
        }
    }

    /// Load all three datasets, unfiltered.
    pub fn load(&self) -> Result<Datasets> {
        Datasets::load(&self.layout)
    }

    /// Load all three datasets with the dashboard filter applied.
    pub fn load_filtered(&self) -> Result<Datasets> {
        Ok(self.load()?.filtered(&self.filter))
    }
}

// === Readiness ===

#[derive(Serialize)]
pub struct ReadinessResult {
    /// True when a dashboard filter narrowed the task table
    pub filtered: bool,
    /// Set when only the N most at-risk groups are shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_risk: Option<usize>,
    pub count: usize,
    pub rows: Vec<ReadinessRow>,
}

impl Output for ReadinessResult {
    fn to_human(&self) -> String {
        let title = match self.at_risk {
            Some(n) => format!("Readiness ({} most at risk)", n),
            None => "Readiness".to_string(),
        };
        markdown_document(&title, &[], &self.rows)
    }
}

/// Readiness rollup. With no active filter the full task table is scored.
pub fn readiness(ctx: &Context, at_risk: Option<usize>) -> Result<ReadinessResult> {
    let data = ctx.load()?;
    let filtered = !ctx.filter.is_empty();
    let tasks = if filtered {
        ctx.filter.tasks(&data.tasks)
    } else {
        data.tasks
    };

    let mut rows = analytics::compute_readiness(&tasks);
    if let Some(limit) = at_risk {
        rows = analytics::most_at_risk(&rows, limit);
    }

    Ok(ReadinessResult {
        filtered,
        at_risk,
        count: rows.len(),
        rows,
    })
}

// === Critical path ===

#[derive(Serialize)]
pub struct CriticalPathResult {
    /// False when the task table has nothing to scope to
    pub found: bool,
    pub cycle_policy: CyclePolicy,
    #[serde(flatten)]
    pub path: CriticalPath,
}

impl Output for CriticalPathResult {
    fn to_human(&self) -> String {
        if !self.found {
            return "No tasks to build a critical path from.".to_string();
        }
        let mut preamble = vec![
            format!("Program: **{}**", self.path.program),
            format!("Tool: **{}**", self.path.tool_id),
            format!("Total duration: **{} days**", self.path.total_duration_days),
        ];
        if !self.path.excluded.is_empty() {
            preamble.push(format!(
                "Excluded by dependency cycle: {}",
                self.path.excluded.join(", ")
            ));
        }
        markdown_document("Critical Path", &preamble, &self.path.steps)
    }
}

/// Which program/tool to trace when the filter names only part of it, or
/// nothing at all.
fn critical_path_scope(tasks: &[Task], filter: &DashboardFilter) -> Option<(String, String)> {
    match (filter.program(), filter.tool()) {
        (Some(program), Some(tool)) => Some((program.to_string(), tool.to_string())),
        (Some(program), None) => tasks
            .iter()
            .find(|t| t.program == program)
            .map(|t| (program.to_string(), t.tool_id.clone())),
        // Program of the tool's first row, so the pair always names real tasks
        (None, Some(tool)) => tasks
            .iter()
            .find(|t| t.tool_id == tool)
            .map(|t| (t.program.clone(), tool.to_string())),
        (None, None) => analytics::default_scope(tasks),
    }
}

/// Critical path on the unfiltered task table, scoped by the filter's
/// program/tool or by the default scope.
pub fn critical_path(ctx: &Context) -> Result<CriticalPathResult> {
    let data = ctx.load()?;
    let policy = ctx.config.cycle_policy();

    match critical_path_scope(&data.tasks, &ctx.filter) {
        Some((program, tool_id)) => Ok(CriticalPathResult {
            found: true,
            cycle_policy: policy,
            path: analytics::compute_critical_path(&data.tasks, &program, &tool_id, policy)?,
        }),
        None => Ok(CriticalPathResult {
            found: false,
            cycle_policy: policy,
            path: CriticalPath {
                program: String::new(),
                tool_id: String::new(),
                total_duration_days: 0,
                steps: Vec::new(),
                excluded: Vec::new(),
            },
        }),
    }
}

// === Expedite ===

#[derive(Serialize)]
pub struct ExpediteResult {
    pub total_expedite_usd: f64,
    pub count: usize,
    pub rows: Vec<ExpediteRow>,
}

impl Output for ExpediteResult {
    fn to_human(&self) -> String {
        let preamble = [format!(
            "Total expedite spend: **{}**",
            report::money(self.total_expedite_usd)
        )];
        markdown_document("Expedite Summary", &preamble, &self.rows)
    }
}

pub fn expedite(ctx: &Context, top: Option<usize>) -> Result<ExpediteResult> {
    let data = ctx.load_filtered()?;
    let mut rows = analytics::expedite_summary(&data.lead_times);
    if let Some(n) = top {
        rows.truncate(n);
    }
    Ok(ExpediteResult {
        total_expedite_usd: analytics::total_expedite_spend(&data.lead_times),
        count: rows.len(),
        rows,
    })
}

// === CapEx variance ===

#[derive(Serialize)]
pub struct CapexResult {
    pub grouping: CapexGrouping,
    pub count: usize,
    pub rows: Vec<CapexVarianceRow>,
}

impl Output for CapexResult {
    fn to_human(&self) -> String {
        markdown_document("CapEx Variance", &[], &self.rows)
    }
}

pub fn capex(ctx: &Context, grouping: CapexGrouping, top: Option<usize>) -> Result<CapexResult> {
    let data = ctx.load_filtered()?;
    let mut rows = analytics::variance_by(&data.capex, grouping);
    if let Some(n) = top {
        rows.truncate(n);
    }
    Ok(CapexResult {
        grouping,
        count: rows.len(),
        rows,
    })
}

// === Gates and blockers ===

#[derive(Serialize)]
pub struct GatesResult {
    pub grouping: GateSlipGrouping,
    pub count: usize,
    pub rows: Vec<GateSlipRow>,
}

impl Output for GatesResult {
    fn to_human(&self) -> String {
        markdown_document("Gate Slip Risk", &[], &self.rows)
    }
}

pub fn gates(ctx: &Context, grouping: GateSlipGrouping) -> Result<GatesResult> {
    let data = ctx.load_filtered()?;
    let rows = analytics::gate_slip_risk(&data.tasks, grouping);
    Ok(GatesResult {
        grouping,
        count: rows.len(),
        rows,
    })
}

#[derive(Serialize)]
pub struct BlockersResult {
    pub count: usize,
    pub tasks: Vec<Task>,
}

impl Output for BlockersResult {
    fn to_human(&self) -> String {
        markdown_document("Blockers", &[], &self.tasks)
    }
}

/// Blocked and in-progress tasks. `limit` falls back to the configured
/// `blockers-limit`.
pub fn blockers(ctx: &Context, limit: Option<usize>) -> Result<BlockersResult> {
    let data = ctx.load_filtered()?;
    let limit = limit.unwrap_or_else(|| ctx.config.blockers_limit());
    let tasks = analytics::blockers(&data.tasks, limit);
    Ok(BlockersResult {
        count: tasks.len(),
        tasks,
    })
}

// === KPIs ===

#[derive(Serialize)]
pub struct KpisResult {
    #[serde(flatten)]
    pub kpis: Kpis,
}

impl Output for KpisResult {
    fn to_human(&self) -> String {
        markdown_document("Headline KPIs", &[], std::slice::from_ref(&self.kpis))
    }
}

pub fn kpis(ctx: &Context) -> Result<KpisResult> {
    let data = ctx.load_filtered()?;
    Ok(KpisResult {
        kpis: analytics::headline_kpis(&data.capex, &data.lead_times, &data.tasks),
    })
}

// === Evidence ===

#[derive(Serialize)]
pub struct EvidenceResult {
    pub out_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl Output for EvidenceResult {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Wrote {} evidence reports to {}:",
            self.files.len(),
            self.out_dir.display()
        )];
        lines.extend(self.files.iter().map(|f| format!("  {}", f.display())));
        lines.join("\n")
    }
}

fn top<T: Clone>(rows: &[T], n: usize) -> Vec<T> {
    rows.iter().take(n).cloned().collect()
}

/// Render every evidence report as `(file name, Markdown)`, in write order.
///
/// Reports cover the whole portfolio; the dashboard filter does not apply.
pub fn render_evidence(data: &Datasets, policy: CyclePolicy) -> Result<Vec<(&'static str, String)>> {
    let readiness = analytics::compute_readiness(&data.tasks);
    let at_risk = analytics::most_at_risk(&readiness, EVIDENCE_AT_RISK);

    let critical_path = match analytics::default_scope(&data.tasks) {
        Some((program, tool_id)) => {
            let path = analytics::compute_critical_path(&data.tasks, &program, &tool_id, policy)?;
            let preamble = [
                format!("Program: **{}**", path.program),
                format!("Tool: **{}**", path.tool_id),
            ];
            markdown_document("Critical Path Output", &preamble, &path.steps)
        }
        None => markdown_document::<analytics::CriticalPathStep>("Critical Path Output", &[], &[]),
    };

    let expedite = analytics::expedite_summary(&data.lead_times);
    let capex = analytics::variance_by(&data.capex, CapexGrouping::ProgramCategory);
    let gates = analytics::gate_slip_risk(&data.tasks, GateSlipGrouping::ProgramGate);

    Ok(vec![
        (
            READINESS_REPORT,
            markdown_document(
                &format!("Readiness Score Output ({} Most At-Risk)", EVIDENCE_AT_RISK),
                &[],
                &at_risk,
            ),
        ),
        (CRITICAL_PATH_REPORT, critical_path),
        (
            EXPEDITE_REPORT,
            markdown_document(
                &format!("Expedite Summary Output (Top {})", EVIDENCE_EXPEDITE_TOP),
                &[],
                &top(&expedite, EVIDENCE_EXPEDITE_TOP),
            ),
        ),
        (
            CAPEX_REPORT,
            markdown_document(
                &format!("CapEx Variance Snapshot (Top {})", EVIDENCE_CAPEX_TOP),
                &[],
                &top(&capex, EVIDENCE_CAPEX_TOP),
            ),
        ),
        (
            GATE_SLIP_REPORT,
            markdown_document(
                &format!("Gate Slip Risk Output (Top {})", EVIDENCE_GATES_TOP),
                &[],
                &top(&gates, EVIDENCE_GATES_TOP),
            ),
        ),
    ])
}

/// Write all five evidence reports into the evidence directory, replacing
/// earlier runs.
pub fn evidence(ctx: &Context) -> Result<EvidenceResult> {
    let data = ctx.load()?;
    let out_dir = ctx.layout.evidence_dir.clone();

    let mut files = Vec::new();
    for (name, content) in render_evidence(&data, ctx.config.cycle_policy())? {
        let path = out_dir.join(name);
        storage::write_report(&path, &content)?;
        files.push(path);
    }

    info!(out_dir = %out_dir.display(), files = files.len(), "evidence written");
    Ok(EvidenceResult { out_dir, files })
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

impl TableRow for ConfigEntry {
    fn headers() -> Vec<&'static str> {
        vec!["key", "value", "source"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.key.to_string(), self.value.clone(), self.source.clone()]
    }
}

#[derive(Serialize)]
pub struct ConfigShowResult {
    pub root: PathBuf,
    pub entries: Vec<ConfigEntry>,
}

impl Output for ConfigShowResult {
    fn to_human(&self) -> String {
        format!(
            "Project root: {}\n\n{}",
            self.root.display(),
            markdown_table(&self.entries)
        )
    }
}

/// Resolved settings and where each came from.
pub fn config_show(ctx: &Context) -> ConfigShowResult {
    let c = &ctx.config;
    let entry = |key, value: String, source: &crate::config::ValueSource| ConfigEntry {
        key,
        value,
        source: source.to_string(),
    };

    ConfigShowResult {
        root: ctx.layout.root.clone(),
        entries: vec![
            entry(
                "data-dir",
                c.data_dir().display().to_string(),
                &c.data_dir.source,
            ),
            entry(
                "evidence-dir",
                c.evidence_dir().display().to_string(),
                &c.evidence_dir.source,
            ),
            entry(
                "output-format",
                c.output_format().to_string(),
                &c.output_format.source,
            ),
            entry(
                "cycle-policy",
                c.cycle_policy().to_string(),
                &c.cycle_policy.source,
            ),
            entry(
                "blockers-limit",
                c.blockers_limit().to_string(),
                &c.blockers_limit.source,
            ),
        ],
    }
}

#[derive(Serialize)]
pub struct ConfigInitResult {
    pub path: PathBuf,
    pub written: bool,
}

impl Output for ConfigInitResult {
    fn to_human(&self) -> String {
        if self.written {
            format!("Wrote {}", self.path.display())
        } else {
            format!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            )
        }
    }
}

/// Persist the resolved settings as the project's `capready.kdl`.
///
/// An existing file is left alone unless `force` is set.
pub fn config_init(ctx: &Context, force: bool) -> Result<ConfigInitResult> {
    let path = storage::project_config_path(&ctx.layout.root);
    if path.exists() && !force {
        return Ok(ConfigInitResult {
            path,
            written: false,
        });
    }
    storage::write_config(&path, &ctx.config.to_config())?;
    info!(path = %path.display(), "wrote project config");
    Ok(ConfigInitResult {
        path,
        written: true,
    })
}
