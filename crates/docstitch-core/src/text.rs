//! Text position utilities for byte offsets and line:column conversions.
//!
//! Coordinate conventions:
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//!
//! Columns count bytes, which is exact for the ASCII-indentation cases the
//! patcher cares about and adequate for diagnostics elsewhere.

use crate::patch::Span;

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds content length, returns the position at end of content.
pub fn byte_offset_to_position(content: &[u8], offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for &byte in &content[..offset] {
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start_of(content: &[u8], offset: usize) -> usize {
    let offset = offset.min(content.len());
    content[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0)
}

/// The indentation prefix of the line containing `offset`.
///
/// Returns the run of spaces and tabs from the line start, as a string
/// slice of the original content. Space/tab runs are always valid UTF-8,
/// so `None` only signals a torn offset.
pub fn indentation_at(content: &[u8], offset: usize) -> Option<&str> {
    let start = line_start_of(content, offset);
    let end = content[start..]
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .map(|p| start + p)
        .unwrap_or(content.len());
    std::str::from_utf8(&content[start..end]).ok()
}

/// True when only indentation (spaces/tabs) precedes `offset` on its line.
///
/// The docstring insertion point must start its own line; a suite folded
/// onto the header line (`def f(): pass`) fails this check.
pub fn starts_line(content: &[u8], offset: usize) -> bool {
    let start = line_start_of(content, offset);
    content[start..offset.min(content.len())]
        .iter()
        .all(|&b| b == b' ' || b == b'\t')
}

/// Extract the text content of a span from byte content.
///
/// Returns `None` if the span extends beyond content bounds.
pub fn extract_span<'a>(content: &'a [u8], span: &Span) -> Option<&'a [u8]> {
    if span.end <= content.len() {
        Some(&content[span.start..span.end])
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
