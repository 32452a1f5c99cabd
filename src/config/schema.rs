//! KDL schema definition for capready config files.
//!
//! This module provides:
//! - A Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

use crate::analytics::CyclePolicy;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Markdown tables for humans
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in `capready.kdl` (project) or `config.kdl` (system).
///
/// # KDL Schema
///
/// ```kdl
/// data-dir "data/raw"
/// evidence-dir "docs/evidence"
/// output-format "human"  // or "json"
/// cycle-policy "drop"    // or "error"
/// blockers-limit 50
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapreadyConfig {
    /// Directory holding the three CSV datasets
    pub data_dir: Option<String>,

    /// Directory evidence reports are written to
    pub evidence_dir: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// How the critical path treats dependency cycles
    pub cycle_policy: Option<CyclePolicy>,

    /// Maximum rows in the blockers list
    pub blockers_limit: Option<usize>,
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

impl CapreadyConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.blockers_limit == Some(0) {
            return Err("blockers-limit must be at least 1".to_string());
        }
        for (key, value) in [("data-dir", &self.data_dir), ("evidence-dir", &self.evidence_dir)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(format!("{} must not be empty", key));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes and unrecognised values are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        config.data_dir = first_string(doc, "data-dir").map(str::to_string);
        config.evidence_dir = first_string(doc, "evidence-dir").map(str::to_string);
        config.output_format = first_string(doc, "output-format").and_then(OutputFormat::parse);
        config.cycle_policy = first_string(doc, "cycle-policy").and_then(CyclePolicy::parse);

        if let Some(node) = doc.get("blockers-limit") {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    if i >= 0 {
                        config.blockers_limit = usize::try_from(i).ok();
                    }
                }
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref dir) = self.data_dir {
            doc.nodes_mut().push(string_node("data-dir", dir));
        }

        if let Some(ref dir) = self.evidence_dir {
            doc.nodes_mut().push(string_node("evidence-dir", dir));
        }

        if let Some(format) = self.output_format {
            doc.nodes_mut().push(string_node("output-format", format.as_str()));
        }

        if let Some(policy) = self.cycle_policy {
            doc.nodes_mut().push(string_node("cycle-policy", policy.as_str()));
        }

        if let Some(limit) = self.blockers_limit {
            let mut node = KdlNode::new("blockers-limit");
            node.push(KdlEntry::new(KdlValue::Integer(limit as i128)));
            doc.nodes_mut().push(node);
        }

        doc
    }
}
