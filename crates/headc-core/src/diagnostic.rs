//! Diagnostics accumulated while binding and lowering a compilation.
//!
//! Most diagnostic kinds are recoverable: the binder substitutes a sentinel
//! symbol and keeps going so later phases still produce useful output for the
//! rest of the program. [`DiagnosticKind::Internal`] and a
//! [`DiagnosticKind::ClassPathDecodeError`] raised while writing the output
//! archive are the only fatal conditions; see [`DiagnosticKind::is_fatal`].

use crate::span::SourceLocation;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// The closed set of error conditions the binder and lowering pipeline can
/// report, per the error handling design.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Raised by the external parser; headc never constructs this itself but
    /// forwards it so a single sink can represent a whole compilation.
    ParseError,
    DuplicateType { name: String },
    SymbolNotFound { name: String },
    AmbiguousName { name: String },
    CyclicHierarchy { class: String },
    CyclicConstant { field: String },
    NotAConstant { expr_description: String },
    BadAnnotationValue { annotation: String, element: String },
    ClassPathDecodeError { class: String, reason: String },
    Internal { reason: String },
}

impl DiagnosticKind {
    /// `Internal` always aborts the binder immediately. A `ClassPathDecodeError`
    /// is recoverable while resolving a classpath symbol (substitute a
    /// sentinel and continue) but fatal if it occurs while materialising the
    /// output archive itself, since at that point there is no sentinel to
    /// substitute for missing bytes.
    pub fn is_fatal_during_binding(&self) -> bool {
        matches!(self, DiagnosticKind::Internal { .. })
    }

    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::ParseError => "ParseError",
            DiagnosticKind::DuplicateType { .. } => "DuplicateType",
            DiagnosticKind::SymbolNotFound { .. } => "SymbolNotFound",
            DiagnosticKind::AmbiguousName { .. } => "AmbiguousName",
            DiagnosticKind::CyclicHierarchy { .. } => "CyclicHierarchy",
            DiagnosticKind::CyclicConstant { .. } => "CyclicConstant",
            DiagnosticKind::NotAConstant { .. } => "NotAConstant",
            DiagnosticKind::BadAnnotationValue { .. } => "BadAnnotationValue",
            DiagnosticKind::ClassPathDecodeError { .. } => "ClassPathDecodeError",
            DiagnosticKind::Internal { .. } => "Internal",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::ParseError => write!(f, "parse error"),
            DiagnosticKind::DuplicateType { name } => {
                write!(f, "duplicate type declaration: {name}")
            }
            DiagnosticKind::SymbolNotFound { name } => write!(f, "cannot find symbol: {name}"),
            DiagnosticKind::AmbiguousName { name } => write!(f, "ambiguous name: {name}"),
            DiagnosticKind::CyclicHierarchy { class } => {
                write!(f, "cyclic inheritance involving {class}")
            }
            DiagnosticKind::CyclicConstant { field } => {
                write!(f, "cyclic constant initializer for {field}")
            }
            DiagnosticKind::NotAConstant { expr_description } => {
                write!(f, "not a constant expression: {expr_description}")
            }
            DiagnosticKind::BadAnnotationValue { annotation, element } => write!(
                f,
                "invalid value for element {element} of annotation {annotation}"
            ),
            DiagnosticKind::ClassPathDecodeError { class, reason } => {
                write!(f, "failed to decode classpath entry {class}: {reason}")
            }
            DiagnosticKind::Internal { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

/// A single reported problem, with the source location it was raised at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            location,
        }
    }

    pub fn message(&self) -> String {
        match &self.location {
            Some(loc) => format!("{loc}: {}", self.kind),
            None => self.kind.to_string(),
        }
    }
}

/// Accumulates diagnostics across the phases of a single binder run.
///
/// The binder never panics or returns early on a recoverable diagnostic; it
/// pushes to the sink and substitutes a sentinel so downstream phases keep
/// making progress. At the end of binding, a non-empty sink means emission is
/// skipped entirely (ERROR-HANDLING-DESIGN, section 7).
#[derive(Default, Debug)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_starts_empty() {
        let sink = DiagnosticSink::new();
        assert!(sink.is_empty());
    }

    #[test]
    fn internal_is_fatal() {
        assert!(DiagnosticKind::Internal {
            reason: "x".into()
        }
        .is_fatal_during_binding());
        assert!(!DiagnosticKind::DuplicateType { name: "A".into() }.is_fatal_during_binding());
    }
}
