//! JSON report types and serialization for CLI responses.
//!
//! These types form the caller contract: a structured report per file
//! listing the declarations processed, the declarations skipped with a
//! failure reason, and whether the file was modified.
//!
//! Design principles:
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input produces byte-identical JSON
//! 3. **Versioned:** schema version enables forward compatibility
//! 4. **Nothing dropped:** every failure produces a report entry

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{DocstitchError, OutputErrorCode};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Per-Declaration Entries
// ============================================================================

/// Outcome of one successfully processed declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationReport {
    /// Qualified dotted name (e.g. `Config.load`).
    pub name: String,
    /// Declaration kind: "function", "async function", "method", "class".
    pub kind: String,
    /// What happened: "inserted", "replaced", or "unchanged".
    pub action: String,
    /// Non-fatal notes (e.g. a string-literal forward-reference annotation
    /// rendered verbatim).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A declaration that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReport {
    /// Qualified dotted name.
    pub name: String,
    /// Human-readable cause.
    pub reason: String,
}

// ============================================================================
// Per-File Report
// ============================================================================

/// File-level failure information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Failure kind: "parse", "patch_conflict", or "io".
    pub kind: String,
    /// Human-readable cause.
    pub message: String,
}

/// Report for one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Input path as supplied by the caller.
    pub path: String,
    /// Whether the file on disk was modified (always false under dry-run).
    pub modified: bool,
    /// Declarations that were processed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<DeclarationReport>,
    /// Declarations skipped with their failure reasons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkipReport>,
    /// File-level failure, if the whole file was abandoned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileFailure>,
}

impl FileReport {
    /// Create a report for a file that failed before any declaration work.
    pub fn failed(path: impl Into<String>, kind: impl Into<String>, message: String) -> Self {
        FileReport {
            path: path.into(),
            modified: false,
            declarations: Vec::new(),
            skipped: Vec::new(),
            error: Some(FileFailure {
                kind: kind.into(),
                message,
            }),
        }
    }
}

// ============================================================================
// Run Report
// ============================================================================

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files whose bytes changed on disk.
    pub files_modified: u32,
    /// Files that failed at file level (parse, I/O, patch conflict).
    pub files_failed: u32,
    /// Declarations documented across all files.
    pub declarations_documented: u32,
    /// Declarations skipped across all files.
    pub declarations_skipped: u32,
}

/// The complete response for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Status: "ok" (file-level failures are reported inline, not here).
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Per-file reports, in input order.
    pub files: Vec<FileReport>,
    /// Aggregate counters.
    pub summary: RunSummary,
}

impl RunReport {
    /// Assemble a report from per-file results, computing the summary.
    pub fn from_files(files: Vec<FileReport>) -> Self {
        let mut summary = RunSummary::default();
        for file in &files {
            if file.modified {
                summary.files_modified += 1;
            }
            if file.error.is_some() {
                summary.files_failed += 1;
            }
            summary.declarations_documented +=
                file.declarations.iter().filter(|d| d.action != "unchanged").count() as u32;
            summary.declarations_skipped += file.skipped.len() as u32;
        }
        RunReport {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            files,
            summary,
        }
    }

    /// Whether any file failed at file level.
    pub fn has_file_failures(&self) -> bool {
        self.summary.files_failed > 0
    }

    /// The first file-level failure converted to the unified error type.
    ///
    /// The CLI uses this to derive the process exit code when a run had
    /// file-level failures.
    pub fn first_failure(&self) -> Option<DocstitchError> {
        self.files.iter().find_map(|f| {
            f.error.as_ref().map(|e| match e.kind.as_str() {
                "parse" => DocstitchError::parse(&f.path, e.message.clone()),
                "patch_conflict" => DocstitchError::patch_conflict(&f.path, e.message.clone()),
                "io" => DocstitchError::Io {
                    file: f.path.clone(),
                    message: e.message.clone(),
                },
                _ => DocstitchError::internal(e.message.clone()),
            })
        })
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from a DocstitchError.
    pub fn from_error(err: &DocstitchError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The error.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a DocstitchError.
    pub fn from_error(err: &DocstitchError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Serialize a response as pretty JSON followed by a newline.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file_report() -> FileReport {
        FileReport {
            path: "pkg/mod.py".to_string(),
            modified: true,
            declarations: vec![
                DeclarationReport {
                    name: "add".to_string(),
                    kind: "function".to_string(),
                    action: "inserted".to_string(),
                    warnings: vec![],
                },
                DeclarationReport {
                    name: "Config.load".to_string(),
                    kind: "method".to_string(),
                    action: "unchanged".to_string(),
                    warnings: vec![],
                },
            ],
            skipped: vec![SkipReport {
                name: "broken".to_string(),
                reason: "duplicate parameter name 'x'".to_string(),
            }],
            error: None,
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn counts_documented_and_skipped() {
            let report = RunReport::from_files(vec![sample_file_report()]);
            assert_eq!(report.summary.files_modified, 1);
            assert_eq!(report.summary.files_failed, 0);
            // "unchanged" outcomes are not counted as documented.
            assert_eq!(report.summary.declarations_documented, 1);
            assert_eq!(report.summary.declarations_skipped, 1);
        }

        #[test]
        fn counts_failed_files() {
            let failed = FileReport::failed("bad.py", "parse", "invalid syntax".to_string());
            let report = RunReport::from_files(vec![failed]);
            assert_eq!(report.summary.files_failed, 1);
            assert!(report.has_file_failures());
        }
    }

    mod failure_mapping {
        use super::*;
        use crate::error::OutputErrorCode;

        #[test]
        fn parse_failure_maps_to_parse_error_code() {
            let report = RunReport::from_files(vec![FileReport::failed(
                "bad.py",
                "parse",
                "invalid syntax".to_string(),
            )]);
            let err = report.first_failure().unwrap();
            assert_eq!(err.error_code(), OutputErrorCode::ParseError);
        }

        #[test]
        fn io_failure_maps_to_io_code() {
            let report = RunReport::from_files(vec![FileReport::failed(
                "gone.py",
                "io",
                "No such file or directory".to_string(),
            )]);
            let err = report.first_failure().unwrap();
            assert_eq!(err.error_code(), OutputErrorCode::Io);
        }

        #[test]
        fn clean_run_has_no_failure() {
            let report = RunReport::from_files(vec![sample_file_report()]);
            assert!(report.first_failure().is_none());
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn status_is_first_field() {
            let report = RunReport::from_files(vec![]);
            let json = serde_json::to_string(&report).unwrap();
            assert!(json.starts_with("{\"status\":\"ok\""));
        }

        #[test]
        fn empty_collections_are_omitted() {
            let file = FileReport {
                path: "a.py".to_string(),
                modified: false,
                declarations: vec![],
                skipped: vec![],
                error: None,
            };
            let json = serde_json::to_string(&file).unwrap();
            assert!(!json.contains("declarations"));
            assert!(!json.contains("skipped"));
            assert!(!json.contains("error"));
        }

        #[test]
        fn report_round_trips() {
            let report = RunReport::from_files(vec![sample_file_report()]);
            let json = serde_json::to_string(&report).unwrap();
            let back: RunReport = serde_json::from_str(&json).unwrap();
            assert_eq!(back.files.len(), 1);
            assert_eq!(back.files[0].declarations.len(), 2);
        }

        #[test]
        fn deterministic_output() {
            let a = serde_json::to_string(&RunReport::from_files(vec![sample_file_report()]))
                .unwrap();
            let b = serde_json::to_string(&RunReport::from_files(vec![sample_file_report()]))
                .unwrap();
            assert_eq!(a, b);
        }
    }
}
