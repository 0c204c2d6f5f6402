//! Source positions and spans.
//!
//! Every token and AST node carries a [`SourceSpan`] so diagnostics and
//! downstream tooling can point back into the original text. Positions
//! hold only line/column/byte-offset numbers, never references into the
//! source buffer, so the tree stays valid after the buffer is dropped.

use serde::{Deserialize, Serialize};

/// A single point in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed).
    pub row: usize,
    /// Column number (0-indexed, counted in characters).
    pub column: usize,
    /// Byte offset from the start of the input.
    pub offset: usize,
}

impl Position {
    pub fn new(row: usize, column: usize, offset: usize) -> Self {
        Self {
            row,
            column,
            offset,
        }
    }

    /// The origin position (start of input).
    pub fn start() -> Self {
        Self {
            row: 0,
            column: 0,
            offset: 0,
        }
    }
}

/// A half-open range of source text: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width span at a single position.
    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &SourceSpan) -> SourceSpan {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        SourceSpan { start, end }
    }
}

impl Default for SourceSpan {
    fn default() -> Self {
        SourceSpan::point(Position::start())
    }
}
