//! Signature Model Builder.
//!
//! Normalizes a raw `DeclarationRecord` into a validated `SignatureModel`:
//! missing annotations collapse to documented defaults instead of
//! propagating as absent state, methods lose their `self`/`cls` receiver,
//! and raised exception names are de-duplicated in first-occurrence order.
//! Building is deterministic: the same record always yields the same model.

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::types::{DeclKind, DeclarationRecord};

/// Type string used when a parameter carries no annotation.
pub const ANY_TYPE: &str = "Any";

/// Type string used when a function neither annotates its return nor
/// returns a value.
pub const NONE_TYPE: &str = "None";

/// Error type for model validation.
///
/// Fatal for the one declaration only; the file continues.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("blank parameter name in `{declaration}`")]
    BlankParamName { declaration: String },

    #[error("duplicate parameter `{name}` in `{declaration}`")]
    DuplicateParam { declaration: String, name: String },

    #[error("annotation on `{name}` in `{declaration}` cannot be rendered on one line")]
    UnrenderableAnnotation { declaration: String, name: String },
}

/// Validated, normalized metadata for one declaration.
///
/// Parameter names are unique (enforced at construction); the raises list
/// holds distinct names in the order they first occur in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureModel {
    pub qualified_name: String,
    pub kind: DeclKind,
    /// One-line summary. Defaults to a placeholder; the caller may swap in
    /// a preserved summary from a prior docstring before rendering.
    pub summary: String,
    /// Parameter name to type string, declaration order.
    pub params: IndexMap<String, String>,
    /// Return type string. Always present for callables, absent for classes.
    pub returns: Option<String>,
    pub raises: Vec<String>,
    /// Non-fatal notes surfaced in the report (e.g. forward references).
    pub warnings: Vec<String>,
}

impl SignatureModel {
    /// Build a model from an extracted declaration.
    pub fn build(record: &DeclarationRecord) -> Result<SignatureModel, ModelError> {
        let declaration = record.qualified_name.clone();
        let mut warnings = Vec::new();

        let mut params = IndexMap::new();
        if record.kind != DeclKind::Class {
            for (index, param) in record.params.iter().enumerate() {
                if param.name.is_empty() {
                    return Err(ModelError::BlankParamName { declaration });
                }
                // The receiver is implicit in the call syntax; it never
                // appears in the documented parameter list.
                if index == 0
                    && record.kind.is_method()
                    && (param.name == "self" || param.name == "cls")
                {
                    continue;
                }
                let type_text = match &param.annotation {
                    Some(annotation) => {
                        let rendered = one_line_annotation(annotation).ok_or_else(|| {
                            ModelError::UnrenderableAnnotation {
                                declaration: declaration.clone(),
                                name: param.name.clone(),
                            }
                        })?;
                        if is_forward_reference(&rendered) {
                            warnings.push(format!(
                                "parameter `{}` uses a forward reference annotation {rendered}",
                                param.name
                            ));
                        }
                        rendered
                    }
                    None => ANY_TYPE.to_string(),
                };
                if params.insert(param.name.clone(), type_text).is_some() {
                    return Err(ModelError::DuplicateParam {
                        declaration,
                        name: param.name.clone(),
                    });
                }
            }
        }

        let returns = if record.kind == DeclKind::Class {
            None
        } else {
            match &record.returns {
                Some(annotation) => {
                    let rendered = one_line_annotation(annotation).ok_or_else(|| {
                        ModelError::UnrenderableAnnotation {
                            declaration: declaration.clone(),
                            name: "return".to_string(),
                        }
                    })?;
                    if is_forward_reference(&rendered) {
                        warnings.push(format!(
                            "return uses a forward reference annotation {rendered}"
                        ));
                    }
                    Some(rendered)
                }
                // An unannotated function that returns a value is typed
                // `Any`; one that never does is typed `None`.
                None if record.has_value_return => Some(ANY_TYPE.to_string()),
                None => Some(NONE_TYPE.to_string()),
            }
        };

        let raises: Vec<String> = record
            .raises
            .iter()
            .cloned()
            .collect::<IndexSet<String>>()
            .into_iter()
            .collect();

        Ok(SignatureModel {
            summary: default_summary(record.short_name()),
            qualified_name: record.qualified_name.clone(),
            kind: record.kind,
            params,
            returns,
            raises,
            warnings,
        })
    }
}

/// Deterministic placeholder summary for a declaration name.
pub fn default_summary(short_name: &str) -> String {
    format!("Summary of {short_name}.")
}

/// Collapse an annotation's source text onto a single line.
///
/// Annotations wrapped across lines inside brackets collapse to
/// space-separated text. A comment inside the annotation cannot be
/// collapsed without changing meaning, so it fails.
fn one_line_annotation(text: &str) -> Option<String> {
    if !text.contains('\n') {
        return Some(text.to_string());
    }
    if text.contains('#') {
        return None;
    }
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn is_forward_reference(text: &str) -> bool {
    (text.starts_with('"') && text.ends_with('"'))
        || (text.starts_with('\'') && text.ends_with('\''))
}

// ============================================================================
// Tests
// ============================================================================
