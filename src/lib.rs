//! Capready - factory readiness and CapEx reporting.
//!
//! This library provides the core functionality for the `cr` CLI tool:
//! loading the capex, lead-time and readiness-task datasets, scoring tool
//! readiness, finding the critical path through task dependencies, and
//! summarizing expedite spend, capex variance and gate slip risk.

pub mod analytics;
pub mod cli;
pub mod commands;
pub mod config;
pub mod filter;
pub mod logging;
pub mod models;
pub mod report;
pub mod storage;

use std::path::PathBuf;

/// Library-level error type for capready operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("{} is missing required columns: {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cycle detected in dependencies: {}", .0.join(", "))]
    CycleDetected(Vec<String>),
}

/// Result type alias for capready operations.
pub type Result<T> = std::result::Result<T, Error>;
