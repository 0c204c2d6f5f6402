//! Phase 4a: compilation, AST → JSON-RPC / MCP artefacts.
//!
//! A visitor over the validated tree producing JSON values. Output maps
//! are `serde_json::Map` (BTree-backed), so key order is lexicographic
//! and stable; tests and round-trips compare `Value`s, which is key
//! order blind anyway.
//!
//! Compilation is total and emits no diagnostics of its own — anything
//! worth reporting was reported by the validator. Whether the result
//! should be *emitted* is the caller's decision, keyed on the absence
//! of Error-severity diagnostics.

pub mod mappings;

mod definitions;
mod messages;
mod schema;
mod values;

use serde::Serialize;
use serde_json::Value as Json;

use crate::ast::{Document, DocumentItem};

/// Everything a document compiles into, in source order per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub messages: Vec<Json>,
    pub tools: Vec<Json>,
    pub resources: Vec<Json>,
    pub prompts: Vec<Json>,
    pub resource_templates: Vec<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<Json>,
}

impl CompileResult {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.tools.is_empty()
            && self.resources.is_empty()
            && self.prompts.is_empty()
            && self.resource_templates.is_empty()
            && self.server_info.is_none()
    }
}

/// Compile a document. Pure: same tree in, same JSON out.
pub fn compile(document: &Document) -> CompileResult {
    let mut compiler = Compiler {
        result: CompileResult::default(),
    };
    compiler.compile_document(document);
    compiler.result
}

pub(crate) struct Compiler {
    pub(crate) result: CompileResult,
}

/// Positional facts threaded through object compilation: they decide
/// the `info` rename and the `ok`→`isError` negation.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ObjCtx {
    pub in_initialize_request: bool,
    pub in_response_result: bool,
}

impl Compiler {
    fn compile_document(&mut self, document: &Document) {
        for item in &document.body {
            match item {
                DocumentItem::Message(message) => {
                    let compiled = self.compile_message(message);
                    self.result.messages.push(compiled);
                }
                DocumentItem::Definition(definition) => self.compile_definition_item(definition),
                DocumentItem::Server(server) => self.compile_server_block(server),
            }
        }
    }
}
