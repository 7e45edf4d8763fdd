//! Binary entry point for the docstitch CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Document every undocumented declaration under src/
//! docstitch src/
//!
//! # Regenerate structured docstrings in place, machine-readable report
//! docstitch --overwrite --json src/ tools/build.py
//!
//! # Preview without writing
//! docstitch --dry-run src/
//!
//! # Write drafts next to the originals instead of in place
//! docstitch --output-suffix .draft src/
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use docstitch_core::config::{GenerateConfig, Section};
use docstitch_core::error::{DocstitchError, OutputErrorCode};
use docstitch_core::output::{emit_response, ErrorResponse, FileReport, RunReport};
use docstitch_python::files::{discover, DiscoverError};
use docstitch_python::pipeline::run;

// ============================================================================
// CLI Structure
// ============================================================================

/// Structured docstring synthesis for Python sources.
///
/// Analyzes declarations (functions, methods, classes), builds a
/// signature model from parameters, annotations, and raised exceptions,
/// and splices canonical Summary/Args/Returns/Raises docstrings back
/// into the source without touching any other byte.
#[derive(Parser, Debug)]
#[command(name = "docstitch", version, about = "Structured docstring synthesis for Python")]
struct Cli {
    /// Files or directories to process. Directories are walked for `.py`.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Replace docstrings that already exist (the Summary line of a
    /// structured docstring is preserved).
    #[arg(long)]
    overwrite: bool,

    /// Sections to emit (comma-separated). Summary is always emitted.
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_section,
        default_value = "args,returns,raises"
    )]
    sections: Vec<Section>,

    /// Compute and report everything, write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Write to `<stem><suffix>.<ext>` next to each input instead of in
    /// place.
    #[arg(long, value_name = "SUFFIX")]
    output_suffix: Option<String>,

    /// Emit the full run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Parse a section name for clap.
fn parse_section(s: &str) -> Result<Section, String> {
    Section::parse(s).ok_or_else(|| {
        format!("unknown section '{s}', expected one of: args, returns, raises")
    })
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            // Pre-run failures get the error envelope on stdout; run
            // failures are inline in the report instead.
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the run and derive the process exit code.
fn execute(cli: Cli) -> Result<ExitCode, DocstitchError> {
    let config = GenerateConfig {
        overwrite_existing: cli.overwrite,
        sections: cli.sections.into_iter().collect(),
        dry_run: cli.dry_run,
        output_suffix: cli.output_suffix,
    };

    let files = discover(&cli.paths).map_err(|e| match e {
        DiscoverError::NotFound { .. } => DocstitchError::invalid_args(e.to_string()),
        DiscoverError::Walk { ref path, .. } => DocstitchError::Io {
            file: path.clone(),
            message: e.to_string(),
        },
    })?;

    if files.is_empty() {
        return Err(DocstitchError::invalid_args(
            "no python files found in the given paths",
        ));
    }

    let report = run(&files, &config);

    let mut stdout = io::stdout();
    if cli.json {
        emit_response(&report, &mut stdout).map_err(stdout_error)?;
    } else {
        write_human_report(&report, &mut stdout).map_err(stdout_error)?;
    }

    // Per-declaration failures never affect exit status; file-level
    // failures map through the error code table.
    match report.first_failure() {
        Some(err) => Ok(ExitCode::from(OutputErrorCode::from(&err).code())),
        None => Ok(ExitCode::SUCCESS),
    }
}

fn stdout_error(e: io::Error) -> DocstitchError {
    DocstitchError::Io {
        file: "<stdout>".to_string(),
        message: e.to_string(),
    }
}

/// Human-readable per-file summary lines.
fn write_human_report(report: &RunReport, out: &mut impl Write) -> io::Result<()> {
    for file in &report.files {
        writeln!(out, "{}", describe_file(file))?;
    }
    let s = &report.summary;
    writeln!(
        out,
        "{} files: {} modified, {} failed, {} declarations documented, {} skipped",
        report.files.len(),
        s.files_modified,
        s.files_failed,
        s.declarations_documented,
        s.declarations_skipped
    )
}

fn describe_file(file: &FileReport) -> String {
    if let Some(error) = &file.error {
        return format!("failed {}: {}: {}", file.path, error.kind, error.message);
    }
    let documented = file
        .declarations
        .iter()
        .filter(|d| d.action != "unchanged")
        .count();
    let state = if file.modified { "modified" } else { "unchanged" };
    format!(
        "{state} {}: {documented} documented, {} skipped",
        file.path,
        file.skipped.len()
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod argument_parsing {
        use super::*;

        #[test]
        fn defaults() {
            let cli = Cli::try_parse_from(["docstitch", "src/"]).unwrap();
            assert!(!cli.overwrite);
            assert!(!cli.dry_run);
            assert!(!cli.json);
            assert_eq!(cli.sections.len(), 3);
            assert_eq!(cli.output_suffix, None);
        }

        #[test]
        fn section_list() {
            let cli =
                Cli::try_parse_from(["docstitch", "--sections", "args,raises", "a.py"]).unwrap();
            assert_eq!(cli.sections, vec![Section::Args, Section::Raises]);
        }

        #[test]
        fn unknown_section_rejected() {
            assert!(Cli::try_parse_from(["docstitch", "--sections", "examples", "a.py"]).is_err());
        }

        #[test]
        fn paths_are_required() {
            assert!(Cli::try_parse_from(["docstitch"]).is_err());
        }
    }

    mod report_formatting {
        use super::*;
        use docstitch_core::output::{DeclarationReport, SkipReport};

        #[test]
        fn failed_file_line() {
            let file = FileReport::failed("bad.py", "parse", "invalid syntax".to_string());
            assert_eq!(describe_file(&file), "failed bad.py: parse: invalid syntax");
        }

        #[test]
        fn modified_file_line() {
            let file = FileReport {
                path: "mod.py".to_string(),
                modified: true,
                declarations: vec![
                    DeclarationReport {
                        name: "f".to_string(),
                        kind: "function".to_string(),
                        action: "inserted".to_string(),
                        warnings: vec![],
                    },
                    DeclarationReport {
                        name: "g".to_string(),
                        kind: "function".to_string(),
                        action: "unchanged".to_string(),
                        warnings: vec![],
                    },
                ],
                skipped: vec![SkipReport {
                    name: "h".to_string(),
                    reason: "x".to_string(),
                }],
                error: None,
            };
            assert_eq!(
                describe_file(&file),
                "modified mod.py: 1 documented, 1 skipped"
            );
        }
    }

    mod exit_code_mapping {
        use super::*;
        use docstitch_core::output::RunReport;

        #[test]
        fn parse_failure_maps_to_exit_code_3() {
            let report = RunReport::from_files(vec![FileReport::failed(
                "bad.py",
                "parse",
                "invalid syntax".to_string(),
            )]);
            let err = report.first_failure().unwrap();
            assert_eq!(OutputErrorCode::from(&err).code(), 3);
        }

        #[test]
        fn io_failure_maps_to_exit_code_5() {
            let report = RunReport::from_files(vec![FileReport::failed(
                "gone.py",
                "io",
                "unreadable".to_string(),
            )]);
            let err = report.first_failure().unwrap();
            assert_eq!(OutputErrorCode::from(&err).code(), 5);
        }
    }
}
