//! Shared data types for Python declaration analysis.
//!
//! These are the raw, per-declaration facts read off the syntax tree.
//! Validation and normalization happen later, in the signature model.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use docstitch_core::patch::Span;

/// One file's text, held immutably for the duration of a pipeline run.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Path label used in reports (as supplied by the caller).
    pub path: PathBuf,
    /// Full file text.
    pub text: String,
}

impl SourceUnit {
    /// Create a source unit from a path label and text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        SourceUnit {
            path: path.into(),
            text: text.into(),
        }
    }

    /// The text as bytes, for span arithmetic.
    pub fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// The kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// A module-level or nested `def`.
    Function,
    /// A module-level or nested `async def`.
    AsyncFunction,
    /// A `def` (sync or async) directly inside a class body.
    Method,
    /// A `class` definition.
    Class,
}

impl DeclKind {
    /// Human-readable kind label for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::AsyncFunction => "async function",
            DeclKind::Method => "method",
            DeclKind::Class => "class",
        }
    }

    /// Whether this kind takes an implicit `self`/`cls` first parameter.
    pub fn is_method(&self) -> bool {
        matches!(self, DeclKind::Method)
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One declared parameter, as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name (`*`/`**` prefixes kept for varargs).
    pub name: String,
    /// Annotation source text, exactly as written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// Whether the parameter has a default value.
    pub has_default: bool,
}

/// Raw facts about one function, method, or class declaration.
///
/// Spans are byte offsets into the owning `SourceUnit`. Invariants upheld
/// by the extractor: sibling spans never overlap; a nested declaration's
/// span lies fully within its parent's span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationRecord {
    /// Qualified dotted name (e.g. `Config.load`, `outer.inner`).
    pub qualified_name: String,
    /// Declaration kind.
    pub kind: DeclKind,
    /// Span of the whole declaration (header through last body statement).
    pub span: Span,
    /// Span from the declaration start to the first body statement.
    pub header_span: Span,
    /// Byte offset of the first body statement (docstring insertion point).
    pub body_start: usize,
    /// Span of the existing docstring literal, if the first body statement
    /// is a standalone string literal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring_span: Option<Span>,
    /// Cooked value of the existing docstring, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_docstring: Option<String>,
    /// Parameters in declaration order (empty for classes).
    pub params: Vec<Param>,
    /// Return annotation source text, if written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    /// Exception names from direct `raise` statements, in source order,
    /// duplicates included (the model de-duplicates).
    pub raises: Vec<String>,
    /// Whether the body contains a `return` with a value, outside nested
    /// scopes.
    pub has_value_return: bool,
}

impl DeclarationRecord {
    /// The unqualified trailing name segment.
    pub fn short_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

// ============================================================================
// Tests
// ============================================================================
