//! Pipeline orchestration.
//!
//! Sequences extract -> model -> render -> patch per file, isolating
//! per-declaration failures (they become skip entries, never aborting
//! sibling declarations), and drives the multi-file run across a rayon
//! worker pool. Each file's pipeline touches only that file, so files are
//! processed in parallel with no shared mutable state; report order stays
//! input order.
//!
//! Writes are all-or-nothing per file: the patched text is written to a
//! temporary file in the target directory and atomically persisted over
//! the destination, and only when bytes actually changed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use docstitch_core::config::GenerateConfig;
use docstitch_core::output::{DeclarationReport, FileReport, RunReport, SkipReport};
use docstitch_core::patch::FileEdits;
use docstitch_core::text::byte_offset_to_position;

use crate::extract::extract;
use crate::model::SignatureModel;
use crate::patcher::docstring_edit;
use crate::render::{parse_structured, render};
use crate::types::{DeclarationRecord, SourceUnit};

/// File-level pipeline failure. Aborts the one file; the run continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{message}")]
    Parse { message: String },

    #[error("{message}")]
    PatchConflict { message: String },
}

impl PipelineError {
    /// The report `kind` string for this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Parse { .. } => "parse",
            PipelineError::PatchConflict { .. } => "patch_conflict",
        }
    }
}

/// Result of processing one source unit in memory.
#[derive(Debug)]
pub struct SourceOutcome {
    /// Patched text, present only when bytes changed.
    pub new_text: Option<String>,
    pub declarations: Vec<DeclarationReport>,
    pub skipped: Vec<SkipReport>,
}

/// Run the full pipeline over one in-memory source unit.
///
/// Declaration failures are recorded and skipped; only a parse failure or
/// a patch conflict abandons the unit, and then the caller writes nothing.
pub fn process_source(
    unit: &SourceUnit,
    config: &GenerateConfig,
) -> Result<SourceOutcome, PipelineError> {
    let records = extract(&unit.text).map_err(|e| PipelineError::Parse {
        message: e.to_string(),
    })?;

    let mut declarations = Vec::new();
    let mut skipped = Vec::new();
    let mut edits = FileEdits::new();

    for record in &records {
        let existing_structured = record
            .existing_docstring
            .as_deref()
            .map(parse_structured);

        if let Some(parsed) = &existing_structured {
            if !config.overwrite_existing {
                let reason = if parsed.is_some() {
                    "existing docstring left in place (structured)"
                } else {
                    "existing docstring left in place (unrecognized format)"
                };
                skipped.push(skip_entry(unit, record, reason));
                continue;
            }
        }

        let mut model = match SignatureModel::build(record) {
            Ok(model) => model,
            Err(err) => {
                skipped.push(skip_entry(unit, record, &err.to_string()));
                continue;
            }
        };

        // A human-edited summary in a structured docstring survives
        // regeneration; only the generated sections are rebuilt.
        if let Some(Some(parsed)) = &existing_structured {
            model.summary = parsed.summary.clone();
        }

        let rendered = render(&model, config);
        match docstring_edit(&unit.text, record, &rendered) {
            Ok(Some(edit)) => {
                edits.push(edit);
                let action = if record.docstring_span.is_some() {
                    "replaced"
                } else {
                    "inserted"
                };
                declarations.push(DeclarationReport {
                    name: model.qualified_name,
                    kind: record.kind.as_str().to_string(),
                    action: action.to_string(),
                    warnings: model.warnings,
                });
            }
            Ok(None) => {
                declarations.push(DeclarationReport {
                    name: model.qualified_name,
                    kind: record.kind.as_str().to_string(),
                    action: "unchanged".to_string(),
                    warnings: model.warnings,
                });
            }
            Err(err) => {
                skipped.push(skip_entry(unit, record, &err.to_string()));
            }
        }
    }

    let new_text = if edits.is_empty() {
        None
    } else {
        let patched = edits
            .apply(unit.bytes())
            .map_err(|e| PipelineError::PatchConflict {
                message: e.to_string(),
            })?;
        let text = String::from_utf8(patched).map_err(|_| PipelineError::PatchConflict {
            message: "patched text is not valid UTF-8".to_string(),
        })?;
        Some(text)
    };

    Ok(SourceOutcome {
        new_text,
        declarations,
        skipped,
    })
}

/// A skip entry whose reason carries the declaration's line number.
fn skip_entry(unit: &SourceUnit, record: &DeclarationRecord, reason: &str) -> SkipReport {
    let (line, _) = byte_offset_to_position(unit.bytes(), record.span.start);
    SkipReport {
        name: record.qualified_name.clone(),
        reason: format!("{reason} (line {line})"),
    }
}

/// The path a patched file is written to.
///
/// In-place by default; with an output suffix, a sibling draft file
/// (`foo.py` with suffix `.draft` becomes `foo.draft.py`).
pub fn output_path(input: &Path, config: &GenerateConfig) -> PathBuf {
    match &config.output_suffix {
        None => input.to_path_buf(),
        Some(suffix) => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = match input.extension() {
                Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
                None => format!("{stem}{suffix}"),
            };
            input.with_file_name(name)
        }
    }
}

/// Process one file on disk, returning its report.
///
/// Never panics and never propagates: every failure mode lands in the
/// report, and a failed file is left byte-identical on disk.
pub fn process_file(path: &Path, config: &GenerateConfig) -> FileReport {
    let label = path.display().to_string();
    debug!(path = %label, "processing file");

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return FileReport::failed(label, "io", e.to_string()),
    };

    let unit = SourceUnit::new(path, text);
    let outcome = match process_source(&unit, config) {
        Ok(outcome) => outcome,
        Err(e) => return FileReport::failed(label, e.kind(), e.to_string()),
    };

    let mut modified = false;
    if let Some(new_text) = &outcome.new_text {
        if !config.dry_run {
            let target = output_path(path, config);
            if let Err(e) = write_atomic(&target, new_text) {
                return FileReport::failed(label, "io", e.to_string());
            }
            modified = true;
        }
    }

    FileReport {
        path: label,
        modified,
        declarations: outcome.declarations,
        skipped: outcome.skipped,
        error: None,
    }
}

/// Process many files in parallel and assemble the run report.
///
/// Report order is input order regardless of scheduling.
pub fn run(paths: &[PathBuf], config: &GenerateConfig) -> RunReport {
    let files: Vec<FileReport> = paths
        .par_iter()
        .map(|path| process_file(path, config))
        .collect();
    debug!(files = files.len(), "run complete");
    RunReport::from_files(files)
}

/// Write `text` to `target` via a temporary file in the same directory,
/// then atomically persist it over the destination.
fn write_atomic(target: &Path, text: &str) -> std::io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
