//! Edit IR: spans, content hashes, and single-file edit batches.
//!
//! This module implements the patching infrastructure for docstitch:
//! - Byte-offset spans with overlap/containment checks
//! - Hash-verified edits (stale spans are detected, never silently applied)
//! - Atomic apply semantics per file (all edits or none)
//!
//! Edits are applied in reverse document order so that splicing text for
//! one edit never invalidates the recorded offsets of edits not yet
//! applied.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Hash type for content verification (SHA-256, hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "Span start ({start}) must be <= end ({end})");
        Span { start, end }
    }

    /// An empty span marking a single position (insertion point).
    pub fn point(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Edits
// ============================================================================

/// A single text change anchored in one file.
///
/// The `expected_before` hash records what the span covered when the edit
/// was computed. Apply refuses to proceed if the bytes have changed since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// The byte range to replace. An empty span means pure insertion.
    pub span: Span,
    /// Replacement text (UTF-8).
    pub text: String,
    /// Hash of the bytes in `span` at edit-construction time.
    pub expected_before: ContentHash,
}

impl Edit {
    /// Create an edit replacing `span` of `content` with `text`.
    ///
    /// # Panics
    /// Panics if `span` is out of bounds for `content`.
    pub fn replace(content: &[u8], span: Span, text: impl Into<String>) -> Self {
        assert!(span.end <= content.len(), "edit span out of bounds");
        Edit {
            span,
            text: text.into(),
            expected_before: ContentHash::compute(&content[span.start..span.end]),
        }
    }

    /// Create an insertion at `offset` in `content`.
    pub fn insert(content: &[u8], offset: usize, text: impl Into<String>) -> Self {
        Self::replace(content, Span::point(offset), text)
    }
}

/// Why a batch of edits could not be applied.
///
/// These are logic errors (stale offsets, overlapping requests); apply is
/// all-or-nothing, so the original content is always left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatchError {
    /// Two edits have overlapping spans.
    #[error("overlapping edits: {first} and {second}")]
    OverlappingSpans { first: Span, second: Span },

    /// A span extends beyond the content.
    #[error("span {span} out of bounds for content of {len} bytes")]
    OutOfBounds { span: Span, len: usize },

    /// The bytes at a span no longer hash to the recorded value.
    #[error("content mismatch at {span}: expected {expected}, found {actual}")]
    HashMismatch {
        span: Span,
        expected: ContentHash,
        actual: ContentHash,
    },
}

/// An ordered batch of edits against one file's content, applied atomically.
#[derive(Debug, Clone, Default)]
pub struct FileEdits {
    edits: Vec<Edit>,
}

impl FileEdits {
    /// Create an empty batch.
    pub fn new() -> Self {
        FileEdits::default()
    }

    /// Add an edit to the batch.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Whether the batch contains any edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of edits in the batch.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Detect overlapping spans within the batch.
    fn detect_overlaps(&self) -> Option<PatchError> {
        for i in 0..self.edits.len() {
            for j in (i + 1)..self.edits.len() {
                let (a, b) = (self.edits[i].span, self.edits[j].span);
                if a.overlaps(&b) {
                    return Some(PatchError::OverlappingSpans {
                        first: a,
                        second: b,
                    });
                }
            }
        }
        None
    }

    /// Apply all edits to `content`, returning the patched bytes.
    ///
    /// Validation happens up front: bounds, overlaps, then hash checks.
    /// If any check fails, nothing is applied. Edits are spliced in
    /// reverse offset order so earlier offsets stay valid.
    pub fn apply(&self, content: &[u8]) -> Result<Vec<u8>, PatchError> {
        for edit in &self.edits {
            if edit.span.end > content.len() {
                return Err(PatchError::OutOfBounds {
                    span: edit.span,
                    len: content.len(),
                });
            }
        }
        if let Some(conflict) = self.detect_overlaps() {
            return Err(conflict);
        }
        for edit in &self.edits {
            let actual = ContentHash::compute(&content[edit.span.start..edit.span.end]);
            if actual != edit.expected_before {
                return Err(PatchError::HashMismatch {
                    span: edit.span,
                    expected: edit.expected_before.clone(),
                    actual,
                });
            }
        }

        let mut sorted: Vec<&Edit> = self.edits.iter().collect();
        sorted.sort_by(|a, b| b.span.start.cmp(&a.span.start));

        let mut out = content.to_vec();
        for edit in sorted {
            out.splice(
                edit.span.start..edit.span.end,
                edit.text.as_bytes().iter().copied(),
            );
        }
        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod span_tests {
        use super::*;

        #[test]
        fn overlap_detection() {
            let a = Span::new(0, 5);
            let b = Span::new(3, 8);
            let c = Span::new(5, 10);
            assert!(a.overlaps(&b));
            assert!(!a.overlaps(&c)); // adjacent, not overlapping
        }

        #[test]
        fn containment() {
            let outer = Span::new(0, 100);
            let inner = Span::new(10, 20);
            assert!(outer.contains(&inner));
            assert!(!inner.contains(&outer));
        }

        #[test]
        fn point_span_is_empty() {
            let p = Span::point(7);
            assert!(p.is_empty());
            assert_eq!(p.len(), 0);
        }

        #[test]
        #[should_panic]
        fn inverted_span_panics() {
            let _ = Span::new(5, 3);
        }
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn replace_single_span() {
            let content = b"def foo(): pass";
            let mut edits = FileEdits::new();
            edits.push(Edit::replace(content, Span::new(4, 7), "bar"));
            let out = edits.apply(content).unwrap();
            assert_eq!(out, b"def bar(): pass");
        }

        #[test]
        fn insert_at_offset() {
            let content = b"abdef";
            let mut edits = FileEdits::new();
            edits.push(Edit::insert(content, 2, "c"));
            let out = edits.apply(content).unwrap();
            assert_eq!(out, b"abcdef");
        }

        #[test]
        fn multiple_edits_apply_end_to_start() {
            let content = b"aaa bbb ccc";
            let mut edits = FileEdits::new();
            // Pushed in document order; apply must not corrupt later spans.
            edits.push(Edit::replace(content, Span::new(0, 3), "xxxxx"));
            edits.push(Edit::replace(content, Span::new(8, 11), "y"));
            let out = edits.apply(content).unwrap();
            assert_eq!(out, b"xxxxx bbb y");
        }

        #[test]
        fn bytes_outside_spans_unchanged() {
            let content = b"keep [OLD] keep";
            let mut edits = FileEdits::new();
            edits.push(Edit::replace(content, Span::new(5, 10), "[NEW!]"));
            let out = edits.apply(content).unwrap();
            assert_eq!(&out[..5], b"keep ");
            assert_eq!(&out[out.len() - 5..], b" keep");
        }

        #[test]
        fn overlapping_edits_rejected() {
            let content = b"0123456789";
            let mut edits = FileEdits::new();
            edits.push(Edit::replace(content, Span::new(0, 5), "a"));
            edits.push(Edit::replace(content, Span::new(4, 8), "b"));
            let err = edits.apply(content).unwrap_err();
            assert!(matches!(err, PatchError::OverlappingSpans { .. }));
        }

        #[test]
        fn stale_content_rejected() {
            let original = b"def foo(): pass";
            let mut edits = FileEdits::new();
            edits.push(Edit::replace(original, Span::new(4, 7), "bar"));
            // Content changed between edit construction and apply.
            let drifted = b"def fxx(): pass";
            let err = edits.apply(drifted).unwrap_err();
            assert!(matches!(err, PatchError::HashMismatch { .. }));
        }

        #[test]
        fn out_of_bounds_rejected() {
            let content = b"short";
            let mut edits = FileEdits::new();
            edits.push(Edit {
                span: Span::new(0, 100),
                text: String::new(),
                expected_before: ContentHash::compute(b""),
            });
            let err = edits.apply(content).unwrap_err();
            assert!(matches!(err, PatchError::OutOfBounds { .. }));
        }

        #[test]
        fn failed_apply_leaves_no_partial_result() {
            let content = b"0123456789";
            let mut edits = FileEdits::new();
            edits.push(Edit::replace(content, Span::new(0, 2), "AA"));
            edits.push(Edit {
                span: Span::new(5, 7),
                text: "BB".to_string(),
                expected_before: ContentHash::compute(b"zz"),
            });
            // Hash mismatch on the second edit fails the whole batch.
            assert!(edits.apply(content).is_err());
        }

        #[test]
        fn empty_batch_is_identity() {
            let content = b"unchanged";
            let edits = FileEdits::new();
            assert_eq!(edits.apply(content).unwrap(), content.to_vec());
        }
    }

    mod content_hash_tests {
        use super::*;

        #[test]
        fn deterministic() {
            assert_eq!(ContentHash::compute(b"abc"), ContentHash::compute(b"abc"));
            assert_ne!(ContentHash::compute(b"abc"), ContentHash::compute(b"abd"));
        }

        #[test]
        fn hex_encoded_sha256_length() {
            let h = ContentHash::compute(b"");
            assert_eq!(h.0.len(), 64);
        }
    }
}
