//! Docstring Renderer.
//!
//! Renders a `SignatureModel` into the canonical section layout (Summary,
//! Args, Returns, Raises) and re-parses such text back into section data.
//! Rendering is pure and deterministic: no I/O, no clock, fixed `\n` line
//! endings and 4-space entry indentation regardless of surrounding code
//! style. Empty sections are omitted entirely, never rendered blank.
//!
//! The re-parser is the structured-format detector: it accepts exactly
//! what the renderer produces (modulo the summary line, which humans may
//! edit) and rejects free-form docstrings.

use docstitch_core::config::{GenerateConfig, Section};

use crate::model::SignatureModel;
use crate::types::DeclKind;

const ENTRY_INDENT: &str = "    ";

/// Render a model into canonical docstring text.
///
/// The text is unindented (section headers at column zero); the patcher
/// re-indents when embedding into source. No trailing newline.
pub fn render(model: &SignatureModel, config: &GenerateConfig) -> String {
    let mut lines = vec![model.summary.clone()];

    // Classes document only their summary; their methods are documented
    // individually.
    if model.kind != DeclKind::Class {
        if config.emits(Section::Args) && !model.params.is_empty() {
            lines.push(String::new());
            lines.push("Args:".to_string());
            for (name, type_text) in &model.params {
                lines.push(format!(
                    "{ENTRY_INDENT}{name} ({type_text}): Description of {name}."
                ));
            }
        }

        if config.emits(Section::Returns) {
            if let Some(returns) = &model.returns {
                lines.push(String::new());
                lines.push("Returns:".to_string());
                lines.push(format!(
                    "{ENTRY_INDENT}{returns}: Description of return value."
                ));
            }
        }

        if config.emits(Section::Raises) && !model.raises.is_empty() {
            lines.push(String::new());
            lines.push("Raises:".to_string());
            for exc in &model.raises {
                lines.push(format!(
                    "{ENTRY_INDENT}{exc}: Description of when {exc} is raised."
                ));
            }
        }
    }

    lines.join("\n")
}

/// Section data recovered from a structured docstring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocstring {
    pub summary: String,
    /// Sections in document order, each with its entry lines (trimmed).
    pub sections: Vec<(Section, Vec<String>)>,
}

/// Parse docstring text back into section data, or `None` if the text does
/// not follow the structured layout.
///
/// Accepts the cooked string value of a docstring literal, so embedded
/// source indentation is tolerated: every line is matched by its trimmed
/// form. One-line summary, then optional `Args:`/`Returns:`/`Raises:`
/// sections whose entries all carry a `name: text` shape. Anything else
/// is unstructured.
pub fn parse_structured(text: &str) -> Option<ParsedDocstring> {
    let mut lines = text.lines();

    let summary = lines.next()?.trim().to_string();
    if summary.is_empty() || summary.ends_with(':') {
        return None;
    }

    let mut sections: Vec<(Section, Vec<String>)> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(header) = trimmed.strip_suffix(':') {
            if let Some(section) = Section::parse(header) {
                if sections.iter().any(|(s, _)| *s == section) {
                    return None;
                }
                sections.push((section, Vec::new()));
                continue;
            }
        }
        match sections.last_mut() {
            Some((_, entries)) if trimmed.contains(": ") => {
                entries.push(trimmed.to_string());
            }
            // Entry line outside any section, summary continuation, or
            // free-form prose.
            _ => return None,
        }
    }

    // A structured docstring never carries an empty section.
    if sections.iter().any(|(_, entries)| entries.is_empty()) {
        return None;
    }

    Some(ParsedDocstring { summary, sections })
}

// ============================================================================
// Tests
// ============================================================================
