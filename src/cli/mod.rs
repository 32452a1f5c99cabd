//! CLI argument definitions for capready.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::analytics::{CapexGrouping, GateSlipGrouping};
use crate::filter::DashboardFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CR_GIT_COMMIT"),
    " ",
    env!("CR_BUILD_TIMESTAMP"),
    ")"
);

/// Capready - factory readiness and CapEx reporting.
///
/// Reads the capex, lead-time and readiness-task CSVs from the data
/// directory and prints JSON by default (`-H` for Markdown tables).
#[derive(Parser, Debug)]
#[command(name = "cr")]
#[command(author, version, long_version = LONG_VERSION, about = "Factory readiness and CapEx reporting", long_about = None)]
pub struct Cli {
    /// Output Markdown tables instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if cr was started in <path> instead of the current directory.
    /// Can also be set via CR_ROOT environment variable.
    #[arg(short = 'C', long = "root", global = true, env = "CR_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory holding the CSV datasets, relative to the root
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Dashboard filters. "All" is the same as leaving a filter out.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only this program
    #[arg(long, global = true)]
    pub program: Option<String>,

    /// Only this site (tasks only)
    #[arg(long, global = true)]
    pub site: Option<String>,

    /// Only this tool
    #[arg(long, global = true)]
    pub tool: Option<String>,

    /// Only this gate (tasks only)
    #[arg(long, global = true)]
    pub gate: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> DashboardFilter {
        DashboardFilter {
            program: self.program.clone(),
            site: self.site.clone(),
            tool: self.tool.clone(),
            gate: self.gate.clone(),
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Weighted readiness per program/tool/site/area with RAG status
    Readiness {
        /// Show only the N most at-risk groups
        #[arg(long, value_name = "N")]
        at_risk: Option<usize>,
    },

    /// Longest planned-duration dependency chain for one program/tool
    ///
    /// Uses --program/--tool when given, otherwise the first program and
    /// its first tool in the task file.
    CriticalPath {
        /// Fail on dependency cycles instead of leaving cyclic tasks out
        #[arg(long)]
        strict: bool,
    },

    /// Expedite spend by vendor and reason
    Expedite {
        /// Show only the first N rows
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// CapEx plan-vs-actual variance
    Capex {
        /// Grouping for the variance table
        #[arg(long, value_enum, default_value_t = CapexBy::Category)]
        by: CapexBy,

        /// Show only the first N rows
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// Open work, blockers and high-risk tasks per gate
    Gates {
        /// Grouping for the gate table
        #[arg(long, value_enum, default_value_t = GateBy::Gate)]
        by: GateBy,
    },

    /// Blocked and in-progress tasks
    Blockers {
        /// Maximum rows (default from config, else 50)
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Headline CapEx, expedite and open-task numbers
    Kpis,

    /// Write the Markdown evidence reports
    Evidence {
        /// Output directory, relative to the root (default docs/evidence)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each value came from
    Show,

    /// Write the resolved settings to capready.kdl in the root
    Init {
        /// Overwrite an existing capready.kdl
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapexBy {
    Category,
    ProgramCategory,
}

impl From<CapexBy> for CapexGrouping {
    fn from(by: CapexBy) -> Self {
        match by {
            CapexBy::Category => CapexGrouping::Category,
            CapexBy::ProgramCategory => CapexGrouping::ProgramCategory,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateBy {
    Gate,
    ProgramGate,
}

impl From<GateBy> for GateSlipGrouping {
    fn from(by: GateBy) -> Self {
        match by {
            GateBy::Gate => GateSlipGrouping::Gate,
            GateBy::ProgramGate => GateSlipGrouping::ProgramGate,
        }
    }
}
