//! Fixed weight tables used by readiness scoring.
//!
//! Values missing from a table fall back to a neutral default:
//! status scores 0.0, risk divides by 1.0, gates weigh 0.20.

use tracing::debug;

/// Completion credit per task status.
pub const STATUS_SCORE: &[(&str, f64)] = &[
    ("Done", 1.0),
    ("In Progress", 0.5),
    ("Blocked", 0.0),
    ("Not Started", 0.0),
];

/// Divisor applied to a task's contribution; riskier tasks count for less.
pub const RISK_WEIGHT: &[(&str, f64)] = &[("Low", 1.0), ("Medium", 1.15), ("High", 1.35)];

/// Importance of each installation gate.
pub const GATE_WEIGHT: &[(&str, f64)] = &[
    ("Install", 0.40),
    ("PowerOn", 0.25),
    ("Comm", 0.20),
    ("SAT", 0.15),
];

pub const DEFAULT_STATUS_SCORE: f64 = 0.0;
pub const DEFAULT_RISK_WEIGHT: f64 = 1.0;
pub const DEFAULT_GATE_WEIGHT: f64 = 0.20;

fn lookup(table: &[(&str, f64)], key: &str) -> Option<f64> {
    table
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, value)| *value)
}

pub fn status_score(status: &str) -> f64 {
    lookup(STATUS_SCORE, status).unwrap_or_else(|| {
        debug!(status, "unscored status, using {}", DEFAULT_STATUS_SCORE);
        DEFAULT_STATUS_SCORE
    })
}

pub fn risk_weight(risk_level: &str) -> f64 {
    lookup(RISK_WEIGHT, risk_level).unwrap_or_else(|| {
        debug!(risk_level, "unknown risk level, using {}", DEFAULT_RISK_WEIGHT);
        DEFAULT_RISK_WEIGHT
    })
}

pub fn gate_weight(gate: &str) -> f64 {
    lookup(GATE_WEIGHT, gate).unwrap_or_else(|| {
        debug!(gate, "unknown gate, using {}", DEFAULT_GATE_WEIGHT);
        DEFAULT_GATE_WEIGHT
    })
}
