//! Source locations for AST nodes and diagnostics.
//!
//! A [`Span`] is a half-open byte range `[start, end)` within a single source
//! file. Spans are small and cheap to copy; they carry no file identity of
//! their own; pair one with a [`SourceFile`] to render a [`SourceLocation`].

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

/// A byte range within a source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn at(pos: u32) -> Self {
        Span {
            start: pos,
            end: pos,
        }
    }

    /// A span with no real source position, used for synthesized declarations
    /// (default constructors, enum synthetics) that have no AST counterpart.
    #[inline]
    pub const fn synthetic() -> Self {
        Span {
            start: u32::MAX,
            end: u32::MAX,
        }
    }

    #[inline]
    pub const fn is_synthetic(&self) -> bool {
        self.start == u32::MAX && self.end == u32::MAX
    }
}

/// An in-memory source file, identified by its path for diagnostic rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: Arc<str>,
    pub text: Arc<str>,
}

impl SourceFile {
    pub fn new(path: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Converts a byte offset into 1-based line/column numbers by scanning
    /// newlines. Compilation units are small enough that this need not be
    /// indexed ahead of time.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.text.len() as u32) as usize;
        let mut line = 1u32;
        let mut col = 1u32;
        for ch in self.text[..offset].chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    pub fn location(&self, span: Span) -> SourceLocation {
        if span.is_synthetic() {
            return SourceLocation {
                file: self.path.clone(),
                line: 0,
                column: 0,
            };
        }
        let (line, column) = self.line_col(span.start);
        SourceLocation {
            file: self.path.clone(),
            line,
            column,
        }
    }
}

/// A human-readable source position, as carried by a [`Diagnostic`](crate::Diagnostic).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_newlines() {
        let file = SourceFile::new("A.java", "class A {\n  int x;\n}\n");
        assert_eq!(file.line_col(0), (1, 1));
        let offset = "class A {\n  ".len() as u32;
        assert_eq!(file.line_col(offset), (2, 3));
    }

    #[test]
    fn synthetic_span_has_no_location() {
        let file = SourceFile::new("A.java", "class A {}");
        let loc = file.location(Span::synthetic());
        assert_eq!(loc.line, 0);
    }
}
