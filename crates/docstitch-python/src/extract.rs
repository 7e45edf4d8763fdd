//! Declaration extraction from Python source.
//!
//! Parses source text into an AST and walks it into a flat, source-ordered
//! list of `DeclarationRecord`s. The walk recurses into class bodies
//! (methods keep their dotted qualified names) and into function bodies
//! (nested defs are declarations of their own), and descends through
//! compound statements so conditionally defined declarations are found.
//!
//! Extraction is read-only: offsets index into the caller's text, which is
//! never mutated here. Annotation and exception names are recorded as the
//! exact source slices, with no resolution of aliases or imports.

use rustpython_parser::ast::Ranged;
use rustpython_parser::{ast, parse, Mode};
use thiserror::Error;

use docstitch_core::patch::Span;

use crate::types::{DeclKind, DeclarationRecord, Param};

/// Error type for extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Source text is not syntactically valid Python.
    #[error("{message}")]
    Parse { message: String },
}

/// Extract all declarations from `source`, in source order.
pub fn extract(source: &str) -> Result<Vec<DeclarationRecord>, ExtractError> {
    let module = parse(source, Mode::Module, "<source>").map_err(|e| ExtractError::Parse {
        message: e.to_string(),
    })?;
    let ast::Mod::Module(module) = module else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    walk_suite(&module.body, source, &mut Vec::new(), false, &mut records);
    Ok(records)
}

fn span_of<N: Ranged>(node: &N) -> Span {
    Span::new(node.start().to_usize(), node.end().to_usize())
}

fn slice<'a, N: Ranged>(source: &'a str, node: &N) -> &'a str {
    &source[node.start().to_usize()..node.end().to_usize()]
}

fn qualify(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope.join("."), name)
    }
}

/// Walk one suite of statements, collecting declarations.
///
/// `in_class` is true while directly inside a class body (including its
/// compound statements), which is what makes a `def` a method.
fn walk_suite(
    stmts: &[ast::Stmt],
    source: &str,
    scope: &mut Vec<String>,
    in_class: bool,
    out: &mut Vec<DeclarationRecord>,
) {
    for stmt in stmts {
        match stmt {
            ast::Stmt::FunctionDef(func) => {
                let kind = if in_class {
                    DeclKind::Method
                } else {
                    DeclKind::Function
                };
                record_function(
                    source,
                    scope,
                    kind,
                    func.name.as_str(),
                    &func.args,
                    func.returns.as_deref(),
                    &func.body,
                    span_of(func),
                    out,
                );
            }
            ast::Stmt::AsyncFunctionDef(func) => {
                let kind = if in_class {
                    DeclKind::Method
                } else {
                    DeclKind::AsyncFunction
                };
                record_function(
                    source,
                    scope,
                    kind,
                    func.name.as_str(),
                    &func.args,
                    func.returns.as_deref(),
                    &func.body,
                    span_of(func),
                    out,
                );
            }
            ast::Stmt::ClassDef(class) => {
                let name = class.name.to_string();
                if let Some((body_start, docstring)) = suite_head(&class.body) {
                    let span = span_of(class);
                    out.push(DeclarationRecord {
                        qualified_name: qualify(scope, &name),
                        kind: DeclKind::Class,
                        span,
                        header_span: Span::new(span.start, body_start),
                        body_start,
                        docstring_span: docstring.as_ref().map(|d| d.0),
                        existing_docstring: docstring.map(|d| d.1),
                        params: Vec::new(),
                        returns: None,
                        raises: Vec::new(),
                        has_value_return: false,
                    });
                }
                scope.push(name);
                walk_suite(&class.body, source, scope, true, out);
                scope.pop();
            }
            // Compound statements stay in the same scope; conditionally
            // defined declarations still belong to it.
            ast::Stmt::If(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
                walk_suite(&s.orelse, source, scope, in_class, out);
            }
            ast::Stmt::While(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
                walk_suite(&s.orelse, source, scope, in_class, out);
            }
            ast::Stmt::For(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
                walk_suite(&s.orelse, source, scope, in_class, out);
            }
            ast::Stmt::AsyncFor(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
                walk_suite(&s.orelse, source, scope, in_class, out);
            }
            ast::Stmt::With(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
            }
            ast::Stmt::AsyncWith(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
            }
            ast::Stmt::Try(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    walk_suite(&h.body, source, scope, in_class, out);
                }
                walk_suite(&s.orelse, source, scope, in_class, out);
                walk_suite(&s.finalbody, source, scope, in_class, out);
            }
            ast::Stmt::TryStar(s) => {
                walk_suite(&s.body, source, scope, in_class, out);
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    walk_suite(&h.body, source, scope, in_class, out);
                }
                walk_suite(&s.orelse, source, scope, in_class, out);
                walk_suite(&s.finalbody, source, scope, in_class, out);
            }
            ast::Stmt::Match(s) => {
                for case in &s.cases {
                    walk_suite(&case.body, source, scope, in_class, out);
                }
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn record_function(
    source: &str,
    scope: &mut Vec<String>,
    kind: DeclKind,
    name: &str,
    args: &ast::Arguments,
    returns: Option<&ast::Expr>,
    body: &[ast::Stmt],
    span: Span,
    out: &mut Vec<DeclarationRecord>,
) {
    let Some((body_start, docstring)) = suite_head(body) else {
        return;
    };

    let mut params = Vec::new();
    for arg in args.posonlyargs.iter().chain(&args.args) {
        params.push(Param {
            name: arg.def.arg.to_string(),
            annotation: arg
                .def
                .annotation
                .as_deref()
                .map(|a| slice(source, a).to_string()),
            has_default: arg.default.is_some(),
        });
    }
    if let Some(vararg) = &args.vararg {
        params.push(Param {
            name: format!("*{}", vararg.arg.as_str()),
            annotation: vararg
                .annotation
                .as_deref()
                .map(|a| slice(source, a).to_string()),
            has_default: false,
        });
    }
    for arg in &args.kwonlyargs {
        params.push(Param {
            name: arg.def.arg.to_string(),
            annotation: arg
                .def
                .annotation
                .as_deref()
                .map(|a| slice(source, a).to_string()),
            has_default: arg.default.is_some(),
        });
    }
    if let Some(kwarg) = &args.kwarg {
        params.push(Param {
            name: format!("**{}", kwarg.arg.as_str()),
            annotation: kwarg
                .annotation
                .as_deref()
                .map(|a| slice(source, a).to_string()),
            has_default: false,
        });
    }

    let mut raises = Vec::new();
    let mut has_value_return = false;
    scan_body(body, source, &mut raises, &mut has_value_return);

    out.push(DeclarationRecord {
        qualified_name: qualify(scope, name),
        kind,
        span,
        header_span: Span::new(span.start, body_start),
        body_start,
        docstring_span: docstring.as_ref().map(|d| d.0),
        existing_docstring: docstring.map(|d| d.1),
        params,
        returns: returns.map(|r| slice(source, r).to_string()),
        raises,
        has_value_return,
    });

    scope.push(name.to_string());
    walk_suite(body, source, scope, false, out);
    scope.pop();
}

/// Locate the first statement of a suite and any leading docstring literal.
///
/// Returns `(body_start, Some((literal_span, cooked_value)))` when the
/// first statement is a standalone string literal.
fn suite_head(body: &[ast::Stmt]) -> Option<(usize, Option<(Span, String)>)> {
    let first = body.first()?;
    let body_start = first.start().to_usize();

    let docstring = if let ast::Stmt::Expr(expr_stmt) = first {
        if let ast::Expr::Constant(constant) = expr_stmt.value.as_ref() {
            if let ast::Constant::Str(value) = &constant.value {
                Some((span_of(constant), value.clone()))
            } else {
                None
            }
        } else {
            None
        }
    } else {
        None
    };

    Some((body_start, docstring))
}

/// Scan a function body for direct `raise` statements and valued returns.
///
/// Descends through compound statements but never into nested `def`,
/// `async def`, or `class` suites. A bare `raise` (re-raise) is skipped.
fn scan_body(
    stmts: &[ast::Stmt],
    source: &str,
    raises: &mut Vec<String>,
    has_value_return: &mut bool,
) {
    for stmt in stmts {
        match stmt {
            ast::Stmt::Raise(raise_stmt) => {
                if let Some(exc) = &raise_stmt.exc {
                    if let Some(name) = exception_name(exc, source) {
                        raises.push(name);
                    }
                }
            }
            ast::Stmt::Return(ret) => {
                if ret.value.is_some() {
                    *has_value_return = true;
                }
            }
            ast::Stmt::If(s) => {
                scan_body(&s.body, source, raises, has_value_return);
                scan_body(&s.orelse, source, raises, has_value_return);
            }
            ast::Stmt::While(s) => {
                scan_body(&s.body, source, raises, has_value_return);
                scan_body(&s.orelse, source, raises, has_value_return);
            }
            ast::Stmt::For(s) => {
                scan_body(&s.body, source, raises, has_value_return);
                scan_body(&s.orelse, source, raises, has_value_return);
            }
            ast::Stmt::AsyncFor(s) => {
                scan_body(&s.body, source, raises, has_value_return);
                scan_body(&s.orelse, source, raises, has_value_return);
            }
            ast::Stmt::With(s) => {
                scan_body(&s.body, source, raises, has_value_return);
            }
            ast::Stmt::AsyncWith(s) => {
                scan_body(&s.body, source, raises, has_value_return);
            }
            ast::Stmt::Try(s) => {
                scan_body(&s.body, source, raises, has_value_return);
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    scan_body(&h.body, source, raises, has_value_return);
                }
                scan_body(&s.orelse, source, raises, has_value_return);
                scan_body(&s.finalbody, source, raises, has_value_return);
            }
            ast::Stmt::TryStar(s) => {
                scan_body(&s.body, source, raises, has_value_return);
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    scan_body(&h.body, source, raises, has_value_return);
                }
                scan_body(&s.orelse, source, raises, has_value_return);
                scan_body(&s.finalbody, source, raises, has_value_return);
            }
            ast::Stmt::Match(s) => {
                for case in &s.cases {
                    scan_body(&case.body, source, raises, has_value_return);
                }
            }
            // Nested def/async def/class open a new scope; their raises
            // belong to them, not to this declaration.
            _ => {}
        }
    }
}

/// The textual name of a raised exception type.
///
/// `raise ValueError(...)` and `raise errors.BadInput(...)` record the
/// call target text; `raise exc_var` and other dynamic forms are skipped.
fn exception_name(expr: &ast::Expr, source: &str) -> Option<String> {
    match expr {
        ast::Expr::Call(call) => match call.func.as_ref() {
            ast::Expr::Name(name) => Some(slice(source, name).to_string()),
            ast::Expr::Attribute(attr) => Some(slice(source, attr).to_string()),
            _ => None,
        },
        ast::Expr::Name(name) => Some(slice(source, name).to_string()),
        ast::Expr::Attribute(attr) => Some(slice(source, attr).to_string()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
