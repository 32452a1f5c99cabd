//! Reporting analytics.
//!
//! Every function here is pure: it borrows its input records and returns new
//! result rows, so the same input always yields the same output.
//!
//! - [`readiness`] - weighted readiness rollup and RAG status
//! - [`critical_path`] - longest dependency chain for a program/tool
//! - [`expedite`] - expedite spend by vendor and reason
//! - [`capex`] - plan-vs-actual variance and headline KPIs
//! - [`gates`] - gate slip risk and blockers

pub mod capex;
pub mod critical_path;
pub mod expedite;
pub mod gates;
pub mod readiness;

pub use capex::{CapexGrouping, CapexVarianceRow, Kpis, headline_kpis, variance_by};
pub use critical_path::{
    CriticalPath, CriticalPathStep, CyclePolicy, compute_critical_path, default_scope,
};
pub use expedite::{ExpediteRow, expedite_summary, total_expedite_spend};
pub use gates::{DEFAULT_BLOCKERS_LIMIT, GateSlipGrouping, GateSlipRow, blockers, gate_slip_risk};
pub use readiness::{Rag, ReadinessRow, compute_readiness, most_at_risk};
