//! Position and span tracking for source code locations
//!
//! The lexer produces byte ranges; the parser converts them into
//! line/column positions so that AST nodes can be reported and sliced
//! against the original source.
//!
//! - [`Position`] - a byte offset plus a 1-based line:column pair
//! - [`SourceSpan`] - a start/end position pair attached to AST nodes
//! - [`SourceLocator`] - byte-offset-to-position conversion via binary
//!   search over precomputed line starts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

/// A position in source code.
///
/// `offset` is a 0-based byte offset; `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A contiguous region of source code covered by an AST node.
///
/// A node's span always contains the spans of all its descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `other` is fully contained within this span.
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Converts byte offsets into [`Position`] values.
///
/// Line starts are collected once up front; each lookup is a binary
/// search, so converting all node spans of a document is O(n log n).
#[derive(Debug, Clone)]
pub struct SourceLocator {
    line_starts: Vec<usize>,
    len: usize,
}

impl SourceLocator {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset into a position. Offsets past the end of
    /// the source clamp to the end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            offset,
            line: line_idx + 1,
            column: offset - self.line_starts[line_idx] + 1,
        }
    }

    /// Convert a byte range into a span.
    pub fn span(&self, range: ByteRange<usize>) -> SourceSpan {
        SourceSpan {
            start: self.position(range.start),
            end: self.position(range.end),
        }
    }
}
