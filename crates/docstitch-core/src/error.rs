//! Error types and error code constants for docstitch.
//!
//! This module provides a unified error type (`DocstitchError`) that bridges
//! domain-specific errors from the pipeline stages (extraction, model
//! building, patching) into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! Exit codes are stable integers so agent callers can branch on them:
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Parse errors (source text is not valid Python)
//! - `4`: Patch conflicts (recorded span no longer matches the text)
//! - `5`: I/O errors (file unreadable or unwritable)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Declaration-level validation failures never surface here; they are
//! recorded in the per-file report and do not affect the exit status.
//!
//! ## Design
//!
//! - **Unified type**: `DocstitchError` is the single error type for CLI output
//! - **Bridging**: stage errors reach here via the constructors and the
//!   report's failure kinds
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Source text failed to parse.
    ParseError = 3,
    /// A recorded span no longer matched the text at patch time.
    PatchConflict = 4,
    /// File could not be read or written.
    Io = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// This is the canonical error type that all subsystem errors are converted
/// to before being rendered as JSON output. Each variant carries enough
/// context to produce a helpful message with the affected file path.
#[derive(Debug, Error)]
pub enum DocstitchError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Source text is not syntactically valid Python.
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// A recorded declaration span no longer matches the current text.
    #[error("patch conflict in {file}: {message}")]
    PatchConflict { file: String, message: String },

    /// File unreadable or unwritable.
    #[error("I/O error for {file}: {message}")]
    Io { file: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&DocstitchError> for OutputErrorCode {
    fn from(err: &DocstitchError) -> Self {
        match err {
            DocstitchError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            DocstitchError::Parse { .. } => OutputErrorCode::ParseError,
            DocstitchError::PatchConflict { .. } => OutputErrorCode::PatchConflict,
            DocstitchError::Io { .. } => OutputErrorCode::Io,
            DocstitchError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<DocstitchError> for OutputErrorCode {
    fn from(err: DocstitchError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl DocstitchError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        DocstitchError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a parse error for a file.
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        DocstitchError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a patch conflict error for a file.
    pub fn patch_conflict(file: impl Into<String>, message: impl Into<String>) -> Self {
        DocstitchError::PatchConflict {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error for a file.
    pub fn io(file: impl Into<String>, err: &std::io::Error) -> Self {
        DocstitchError::Io {
            file: file.into(),
            message: err.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DocstitchError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
