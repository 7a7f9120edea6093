//! Shared primitives for headc.
//!
//! This crate is intentionally small and sits below every other headc crate:
//! string interning, source spans, and the diagnostic sink used to report
//! binder and lowering failures back to a caller.

pub mod diagnostic;
pub mod interner;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity};
pub use interner::{Atom, Interner};
pub use span::{SourceFile, SourceLocation, Span};
