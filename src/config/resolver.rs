//! Unified precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`CR_DATA_DIR`, `CR_EVIDENCE_DIR`)
//! 3. Project `capready.kdl` in the project root
//! 4. System `config.kdl` (`~/.config/capready/config.kdl`)
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use crate::Result;
use crate::analytics::{CyclePolicy, DEFAULT_BLOCKERS_LIMIT};
use crate::config::{CapreadyConfig, OutputFormat};
use crate::storage;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CR_DATA_DIR";

/// Environment variable overriding the evidence directory.
pub const EVIDENCE_DIR_ENV: &str = "CR_EVIDENCE_DIR";

pub const DEFAULT_DATA_DIR: &str = "data/raw";
pub const DEFAULT_EVIDENCE_DIR: &str = "docs/evidence";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from the project's capready.kdl
    Project,
    /// Value from the system config.kdl
    System,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Project => write!(f, "project"),
            ValueSource::System => write!(f, "system"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: Resolved<PathBuf>,
    pub evidence_dir: Resolved<PathBuf>,
    pub output_format: Resolved<OutputFormat>,
    pub cycle_policy: Resolved<CyclePolicy>,
    pub blockers_limit: Resolved<usize>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            data_dir: Resolved::new(PathBuf::from(DEFAULT_DATA_DIR), ValueSource::Default),
            evidence_dir: Resolved::new(PathBuf::from(DEFAULT_EVIDENCE_DIR), ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            cycle_policy: Resolved::new(CyclePolicy::Drop, ValueSource::Default),
            blockers_limit: Resolved::new(DEFAULT_BLOCKERS_LIMIT, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn data_dir(&self) -> &Path {
        &self.data_dir.value
    }

    pub fn evidence_dir(&self) -> &Path {
        &self.evidence_dir.value
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    pub fn cycle_policy(&self) -> CyclePolicy {
        self.cycle_policy.value
    }

    pub fn blockers_limit(&self) -> usize {
        self.blockers_limit.value
    }

    /// The plain values, as they would be written to a config file.
    pub fn to_config(&self) -> CapreadyConfig {
        CapreadyConfig {
            data_dir: Some(self.data_dir().display().to_string()),
            evidence_dir: Some(self.evidence_dir().display().to_string()),
            output_format: Some(self.output_format()),
            cycle_policy: Some(self.cycle_policy()),
            blockers_limit: Some(self.blockers_limit()),
        }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub evidence_dir: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
    pub cycle_policy: Option<CyclePolicy>,
    pub blockers_limit: Option<usize>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_evidence_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.evidence_dir = Some(dir.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = Some(policy);
        self
    }

    pub fn with_blockers_limit(mut self, limit: usize) -> Self {
        self.blockers_limit = Some(limit);
        self
    }
}

/// Resolve configuration for the project at `root` with full precedence chain.
pub fn resolve_config(root: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = match storage::system_config_path() {
        Some(path) => storage::read_config(&path)?,
        None => CapreadyConfig::default(),
    };
    let project = storage::read_config(&storage::project_config_path(root))?;

    Ok(resolve_layers(
        overrides,
        |name| std::env::var(name).ok().filter(|v| !v.is_empty()),
        &project,
        &system,
    ))
}

/// Pick the first value present, walking from highest to lowest precedence.
fn pick<T>(layers: impl IntoIterator<Item = (Option<T>, ValueSource)>, default: T) -> Resolved<T> {
    layers
        .into_iter()
        .find_map(|(value, source)| value.map(|v| Resolved::new(v, source)))
        .unwrap_or_else(|| Resolved::new(default, ValueSource::Default))
}

/// Resolve from already-loaded layers.
///
/// `env` looks up an environment variable by name.
pub fn resolve_layers(
    overrides: &ConfigOverrides,
    env: impl Fn(&str) -> Option<String>,
    project: &CapreadyConfig,
    system: &CapreadyConfig,
) -> ResolvedConfig {
    let env_dir = |name: &str| env(name).map(PathBuf::from);
    let file_dir = |value: &Option<String>| value.as_ref().map(PathBuf::from);

    ResolvedConfig {
        data_dir: pick(
            [
                (overrides.data_dir.clone(), ValueSource::CliFlag),
                (env_dir(DATA_DIR_ENV), ValueSource::EnvVar(DATA_DIR_ENV.to_string())),
                (file_dir(&project.data_dir), ValueSource::Project),
                (file_dir(&system.data_dir), ValueSource::System),
            ],
            PathBuf::from(DEFAULT_DATA_DIR),
        ),
        evidence_dir: pick(
            [
                (overrides.evidence_dir.clone(), ValueSource::CliFlag),
                (
                    env_dir(EVIDENCE_DIR_ENV),
                    ValueSource::EnvVar(EVIDENCE_DIR_ENV.to_string()),
                ),
                (file_dir(&project.evidence_dir), ValueSource::Project),
                (file_dir(&system.evidence_dir), ValueSource::System),
            ],
            PathBuf::from(DEFAULT_EVIDENCE_DIR),
        ),
        output_format: pick(
            [
                (overrides.output_format, ValueSource::CliFlag),
                (project.output_format, ValueSource::Project),
                (system.output_format, ValueSource::System),
            ],
            OutputFormat::Json,
        ),
        cycle_policy: pick(
            [
                (overrides.cycle_policy, ValueSource::CliFlag),
                (project.cycle_policy, ValueSource::Project),
                (system.cycle_policy, ValueSource::System),
            ],
            CyclePolicy::Drop,
        ),
        blockers_limit: pick(
            [
                (overrides.blockers_limit, ValueSource::CliFlag),
                (project.blockers_limit, ValueSource::Project),
                (system.blockers_limit, ValueSource::System),
            ],
            DEFAULT_BLOCKERS_LIMIT,
        ),
    }
}
