//! Source Patcher.
//!
//! Turns rendered docstring text into byte-exact edits against the
//! original source: a replacement of the existing literal's span, or an
//! insertion at the first body statement. Indentation is taken from the
//! body itself, so the spliced literal sits at the declaration's own
//! indent level and no byte outside the docstring region moves.

use thiserror::Error;

use docstitch_core::patch::Edit;
use docstitch_core::text::{extract_span, indentation_at, starts_line};

use crate::types::DeclarationRecord;

/// Reasons a single declaration cannot be spliced.
///
/// These are per-declaration skips, not file failures; the rest of the
/// file proceeds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpliceError {
    /// `def f(): pass` — the body shares a line with the header, so there
    /// is no insertion point that leaves other bytes untouched.
    #[error("body shares a line with its header; no insertion point")]
    OneLineSuite,

    /// The text to embed contains `\"\"\"` and cannot be quoted safely.
    #[error("docstring text contains a triple quote")]
    UnquotableText,

    /// Recorded body offset does not land on a character boundary.
    #[error("body offset does not fall on a character boundary")]
    TornOffset,
}

/// Format rendered docstring text as a triple-quoted literal embedded at
/// `indent`.
///
/// The first line rides on the opening quotes; every later line (blank
/// lines excepted) is prefixed with `indent`, and the closing quotes get
/// their own line. A one-line docstring closes on the same line unless it
/// ends with a quote or backslash, which would fuse with the closer.
pub fn format_literal(rendered: &str, indent: &str) -> Result<String, SpliceError> {
    if rendered.contains("\"\"\"") {
        return Err(SpliceError::UnquotableText);
    }

    let mut lines = rendered.lines();
    let first = lines.next().unwrap_or_default();

    let mut literal = String::from("\"\"\"");
    literal.push_str(first);

    let mut multiline = false;
    for line in lines {
        multiline = true;
        literal.push('\n');
        if !line.is_empty() {
            literal.push_str(indent);
            literal.push_str(line);
        }
    }

    if multiline || rendered.ends_with('"') || rendered.ends_with('\\') {
        literal.push('\n');
        literal.push_str(indent);
    }
    literal.push_str("\"\"\"");
    Ok(literal)
}

/// Build the edit that gives `record` the docstring `rendered`, against
/// the file text the record's offsets were computed from.
///
/// Returns `Ok(None)` when the existing literal already matches the
/// regenerated one byte-for-byte, which is what makes repeated runs
/// no-ops.
pub fn docstring_edit(
    text: &str,
    record: &DeclarationRecord,
    rendered: &str,
) -> Result<Option<Edit>, SpliceError> {
    let content = text.as_bytes();
    let indent = indentation_at(content, record.body_start).ok_or(SpliceError::TornOffset)?;
    let literal = format_literal(rendered, indent)?;

    if let Some(span) = record.docstring_span {
        if extract_span(content, &span) == Some(literal.as_bytes()) {
            return Ok(None);
        }
        return Ok(Some(Edit::replace(content, span, literal)));
    }

    if !starts_line(content, record.body_start) {
        return Err(SpliceError::OneLineSuite);
    }

    // The literal takes over the body's first line; the displaced first
    // statement is re-seated on a fresh line at the same indent.
    let insertion = format!("{literal}\n{indent}");
    Ok(Some(Edit::insert(content, record.body_start, insertion)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use docstitch_core::patch::FileEdits;

    fn apply_one(source: &str, edit: Edit) -> String {
        let mut edits = FileEdits::new();
        edits.push(edit);
        String::from_utf8(edits.apply(source.as_bytes()).unwrap()).unwrap()
    }

    mod literal_formatting {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn one_line_literal() {
            assert_eq!(
                format_literal("Summary of Store.", "    ").unwrap(),
                "\"\"\"Summary of Store.\"\"\""
            );
        }

        #[test]
        fn multiline_literal_indents_and_closes_on_own_line() {
            let rendered = "Summary of f.\n\nArgs:\n    a (int): Description of a.";
            assert_eq!(
                format_literal(rendered, "    ").unwrap(),
                concat!(
                    "\"\"\"Summary of f.\n",
                    "\n",
                    "    Args:\n",
                    "        a (int): Description of a.\n",
                    "    \"\"\"",
                )
            );
        }

        #[test]
        fn blank_lines_carry_no_indent() {
            let literal = format_literal("A.\n\nReturns:\n    int: x.", "        ").unwrap();
            assert!(literal.contains("A.\n\n        Returns:"));
        }

        #[test]
        fn trailing_quote_forces_own_line_close() {
            let literal = format_literal("Summary ending in \"quote\"", "").unwrap();
            assert!(literal.ends_with("\"quote\"\n\"\"\""));
        }

        #[test]
        fn triple_quote_rejected() {
            assert_eq!(
                format_literal("has \"\"\" inside", ""),
                Err(SpliceError::UnquotableText)
            );
        }
    }

    mod edit_building {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn insertion_preserves_everything_else() {
            let source = "def add(a, b):\n    return a + b\n";
            let records = extract(source).unwrap();
            let edit = docstring_edit(source, &records[0], "Summary of add.")
                .unwrap()
                .unwrap();
            let patched = apply_one(source, edit);
            assert_eq!(
                patched,
                "def add(a, b):\n    \"\"\"Summary of add.\"\"\"\n    return a + b\n"
            );
        }

        #[test]
        fn insertion_matches_nested_indent() {
            let source = "class C:\n    def m(self):\n        return 1\n";
            let records = extract(source).unwrap();
            let method = records.iter().find(|r| r.qualified_name == "C.m").unwrap();
            let edit = docstring_edit(source, method, "Summary of m.")
                .unwrap()
                .unwrap();
            let patched = apply_one(source, edit);
            assert_eq!(
                patched,
                concat!(
                    "class C:\n",
                    "    def m(self):\n",
                    "        \"\"\"Summary of m.\"\"\"\n",
                    "        return 1\n",
                )
            );
        }

        #[test]
        fn replacement_touches_only_the_literal() {
            let source = "def f():\n    \"\"\"Old.\"\"\"\n    return 1\n";
            let records = extract(source).unwrap();
            let edit = docstring_edit(source, &records[0], "Summary of f.")
                .unwrap()
                .unwrap();
            let patched = apply_one(source, edit);
            assert_eq!(
                patched,
                "def f():\n    \"\"\"Summary of f.\"\"\"\n    return 1\n"
            );
        }

        #[test]
        fn identical_literal_yields_no_edit() {
            let source = "def f():\n    \"\"\"Summary of f.\"\"\"\n    return 1\n";
            let records = extract(source).unwrap();
            let edit = docstring_edit(source, &records[0], "Summary of f.").unwrap();
            assert!(edit.is_none());
        }

        #[test]
        fn one_line_suite_skipped() {
            let source = "def f(): pass\n";
            let records = extract(source).unwrap();
            let err = docstring_edit(source, &records[0], "Summary of f.").unwrap_err();
            assert_eq!(err, SpliceError::OneLineSuite);
        }

        #[test]
        fn multiline_insertion_full_shape() {
            let source = "def add(a: int, b: int) -> int:\n    return a + b\n";
            let records = extract(source).unwrap();
            let rendered = concat!(
                "Summary of add.\n",
                "\n",
                "Args:\n",
                "    a (int): Description of a.\n",
                "    b (int): Description of b.\n",
                "\n",
                "Returns:\n",
                "    int: Description of return value.",
            );
            let edit = docstring_edit(source, &records[0], rendered)
                .unwrap()
                .unwrap();
            let patched = apply_one(source, edit);
            assert_eq!(
                patched,
                concat!(
                    "def add(a: int, b: int) -> int:\n",
                    "    \"\"\"Summary of add.\n",
                    "\n",
                    "    Args:\n",
                    "        a (int): Description of a.\n",
                    "        b (int): Description of b.\n",
                    "\n",
                    "    Returns:\n",
                    "        int: Description of return value.\n",
                    "    \"\"\"\n",
                    "    return a + b\n",
                )
            );
        }
    }
}
