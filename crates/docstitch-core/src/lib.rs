//! Core infrastructure for docstitch.
//!
//! This crate provides language-agnostic infrastructure:
//! - Span and edit types for byte-exact source patching
//! - Error types and stable error codes
//! - Generation configuration (sections, overwrite, dry-run)
//! - JSON report types for CLI responses
//! - Text utilities for offset/position conversions

pub mod config;
pub mod error;
pub mod output;
pub mod patch;
pub mod text;
