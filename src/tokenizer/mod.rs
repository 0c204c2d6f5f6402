//! Phase 1: lexical analysis.
//!
//! Converts MCP-DSL source text into a flat token stream with source
//! spans, including the synthetic INDENT/DEDENT tokens. The stream
//! always ends in EOF; lexical errors are accumulated as diagnostics
//! rather than aborting the scan.
//!
//! Multiline strings are a joint effort: the lexer emits `|` as a
//! neutral PIPE token and exposes a raw-capture primitive
//! ([`Lexer::capture_block`]) parameterized by a minimum column; the
//! parser, which knows the column of the field that opened the block,
//! drives the capture through [`TokenCursor::capture_multiline`]. The
//! batch [`tokenize`] entry captures blocks itself, recovering the
//! field column from the tokens already emitted for the opening line.
//!
//! Pipeline: **`Source text` → `Tokens`** → `AST` → `Validation` →
//! `JSON` / `DSL`.

pub mod cursor;
pub mod lexer;
pub mod tokens;

pub use cursor::TokenCursor;
pub use lexer::Lexer;
pub use tokens::{keyword_kind, Token, TokenKind, TokenValue};

use crate::diagnostics::Diagnostic;

/// Tokenize MCP-DSL source text.
///
/// Total over all inputs: lexical errors surface in the diagnostic list
/// while scanning continues to end of input.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    Lexer::new(source).run()
}
