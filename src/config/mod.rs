//! Configuration for capready.
//!
//! Settings live in KDL files at two levels:
//!
//! - Project: `<root>/capready.kdl`, checked in next to the datasets
//! - System: `~/.config/capready/config.kdl` (or `$CR_CONFIG_DIR/config.kdl`)
//!
//! Contains:
//! - `data-dir` - Directory holding the CSV datasets (default `data/raw`)
//! - `evidence-dir` - Where evidence reports are written (default `docs/evidence`)
//! - `output-format` - "json" or "human"
//! - `cycle-policy` - "drop" or "error" for dependency cycles
//! - `blockers-limit` - Rows shown by `cr blockers`
//!
//! ## Precedence
//!
//! CLI flag > environment variable > project config > system config > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DATA_DIR_ENV, EVIDENCE_DIR_ENV, Resolved, ResolvedConfig, ValueSource,
    resolve_config, resolve_layers,
};
pub use schema::{CapreadyConfig, OutputFormat};
