//! MCP-DSL compiler and decompiler.
//!
//! MCP-DSL is a compact textual surface syntax for the Model Context
//! Protocol's JSON-RPC 2.0 message family and its declarative
//! artefacts (tools, resources, prompts, resource templates). This
//! crate is the bidirectional codec between the two: DSL source in,
//! conformant JSON-RPC out, and back again, semantically equivalent
//! under round-trip.
//!
//! # Pipeline
//!
//! ```text
//! Source text → Tokens → AST → Validation → JSON-RPC
//!                                         ↘
//!                              DSL text ← Decompiler ← JSON
//! ```
//!
//! - [`tokenizer`] — indentation-aware scanning with spans (Phase 1)
//! - [`parser`] — recursive descent to the typed AST (Phase 2)
//! - [`semantic`] — context-sensitive validation (Phase 3)
//! - [`compiler`] — AST → JSON-RPC messages and artefacts (Phase 4a)
//! - [`decompiler`] — JSON → canonical DSL text (Phase 4b)
//!
//! Every stage accumulates [`diagnostics::Diagnostic`]s instead of
//! failing fast; a compilation is emitted if and only if none of them
//! is Error severity. The whole pipeline is pure and synchronous: no
//! I/O, no global state, no background work, so independent call sites
//! can compile concurrently.
//!
//! # Example
//!
//! ```rust
//! use mcpdsl::compile_source;
//!
//! let (result, diagnostics) = compile_source("> ping#2");
//! let result = result.expect("valid document");
//! assert!(diagnostics.is_empty());
//! assert_eq!(result.messages[0]["method"], "ping");
//! assert_eq!(result.messages[0]["jsonrpc"], "2.0");
//! ```

pub mod api;
pub mod ast;
pub mod compiler;
pub mod decompiler;
pub mod diagnostics;
pub mod parser;
pub mod semantic;
pub mod span;
pub mod tokenizer;

pub use ast::Document;
pub use compiler::{compile, CompileResult};
pub use decompiler::{decompile, decompile_values};
pub use diagnostics::{has_errors, render_diagnostics, Diagnostic, Severity};
pub use parser::{parse, parse_source};
pub use semantic::validate;
pub use span::{Position, SourceSpan};
pub use tokenizer::{tokenize, Token, TokenKind};

/// Run the full pipeline: lex and parse (the parser drives the lexer,
/// including multiline-block capture), validate, compile.
///
/// The result is `Some` exactly when no Error-severity diagnostic was
/// produced; warnings and infos ride along either way.
pub fn compile_source(source: &str) -> (Option<CompileResult>, Vec<Diagnostic>) {
    let (document, mut diagnostics) = parse_source(source);
    diagnostics.extend(validate(&document));

    if has_errors(&diagnostics) {
        (None, diagnostics)
    } else {
        (Some(compile(&document)), diagnostics)
    }
}
