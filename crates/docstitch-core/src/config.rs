//! Generation configuration.
//!
//! A `GenerateConfig` is supplied by the caller (CLI or embedding tool)
//! and threaded through the whole pipeline. It controls which docstring
//! sections are emitted, whether existing docstrings are replaced, and
//! whether files are actually written.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A docstring section that can be enabled or disabled.
///
/// The Summary section is always emitted and is not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// One entry per parameter, in declaration order.
    Args,
    /// The declared (or defaulted) return type.
    Returns,
    /// One entry per distinct raised exception, in first-raise order.
    Raises,
}

impl Section {
    /// All sections, in canonical render order.
    pub fn all() -> BTreeSet<Section> {
        [Section::Args, Section::Returns, Section::Raises]
            .into_iter()
            .collect()
    }

    /// Parse a section name (case-insensitive).
    pub fn parse(s: &str) -> Option<Section> {
        match s.to_ascii_lowercase().as_str() {
            "args" => Some(Section::Args),
            "returns" => Some(Section::Returns),
            "raises" => Some(Section::Raises),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Args => write!(f, "args"),
            Section::Returns => write!(f, "returns"),
            Section::Raises => write!(f, "raises"),
        }
    }
}

/// Configuration for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Replace docstrings that already exist.
    pub overwrite_existing: bool,
    /// Which sections to emit. Summary is always emitted.
    pub sections: BTreeSet<Section>,
    /// Compute everything but write nothing.
    pub dry_run: bool,
    /// When set, write to `<stem><suffix>.py` next to the input instead
    /// of in place ("draft" output).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_suffix: Option<String>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            overwrite_existing: false,
            sections: Section::all(),
            dry_run: false,
            output_suffix: None,
        }
    }
}

impl GenerateConfig {
    /// Whether a section is enabled for this run.
    pub fn emits(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }
}

// ============================================================================
// Tests
// ============================================================================
