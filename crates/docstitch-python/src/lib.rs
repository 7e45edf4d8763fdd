//! Python language support for docstitch.
//!
//! This crate implements the analysis-and-regeneration pipeline:
//! - Declaration extraction from the Python AST with byte-accurate spans
//! - Signature model construction with strict validation
//! - Canonical structured docstring rendering
//! - Byte-exact docstring splicing back into the source
//! - The per-file orchestrator and multi-file driver

pub mod extract;
pub mod files;
pub mod model;
pub mod patcher;
pub mod pipeline;
pub mod render;
pub mod types;
