//! Phase 4b: decompilation, JSON → DSL.
//!
//! The inverse visitor. Messages are classified by shape (error before
//! response before request before notification), artefacts by their
//! required fields. Output is canonical DSL text — not byte-identical
//! to any original source, but guaranteed to re-parse and re-compile
//! into the same JSON structure.
//!
//! Decompilation is best-effort over ill-typed input: shapes that
//! cannot be classified come back as comment lines plus a Warning, and
//! unrecognised keys ride along as generic field assignments — data is
//! never silently dropped.

mod definitions;
mod schema;
mod values;
mod writer;

use regex::Regex;
use serde_json::Value as Json;

use crate::compiler::CompileResult;
use crate::diagnostics::Diagnostic;
use crate::span::SourceSpan;

pub(crate) use writer::{layout, number_to_text, quote};

/// Decompile a compilation result into one DSL document.
pub fn decompile(result: &CompileResult) -> (String, Vec<Diagnostic>) {
    let mut decompiler = Decompiler::new();
    let text = decompiler.run_result(result);
    (text, decompiler.diagnostics)
}

/// Classify and decompile a flat list of JSON values (messages and
/// artefacts mixed).
pub fn decompile_values(values: &[Json]) -> (String, Vec<Diagnostic>) {
    let mut decompiler = Decompiler::new();
    let items: Vec<String> = values
        .iter()
        .map(|value| decompiler.render_classified(value))
        .collect();
    (finish_document(items), decompiler.diagnostics)
}

/// Facts about the rendering position, mirroring the compiler's
/// object-context handling in reverse.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RenderCtx {
    /// Inside a response result: `isError` folds back to `ok`.
    pub result: bool,
    /// Inside a definition body: `arguments` must not shorten to
    /// `args`, which re-parses as a type declaration there.
    pub in_definition: bool,
}

pub(crate) struct Decompiler {
    pub(crate) diagnostics: Vec<Diagnostic>,
    template_counter: usize,
    ident_re: Regex,
    cast_re: Regex,
    version_re: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    ErrorMsg,
    Response,
    Request,
    Notification,
    Tool,
    Resource,
    Prompt,
    ResourceTemplate,
    Unknown,
}

pub(crate) fn classify(value: &Json) -> Shape {
    let map = match value.as_object() {
        Some(map) => map,
        None => return Shape::Unknown,
    };

    if let Some(error) = map.get("error").and_then(Json::as_object) {
        if error.contains_key("code") && error.contains_key("message") {
            return Shape::ErrorMsg;
        }
    }
    if map.contains_key("result") && map.contains_key("id") {
        return Shape::Response;
    }
    if map.contains_key("method") {
        return if map.contains_key("id") {
            Shape::Request
        } else {
            Shape::Notification
        };
    }
    // A result-less response still carries the envelope.
    if map.contains_key("jsonrpc") && map.contains_key("id") {
        return Shape::Response;
    }
    if map.contains_key("inputSchema") {
        return Shape::Tool;
    }
    if map.contains_key("uri") {
        return if map.contains_key("name") {
            Shape::Resource
        } else {
            Shape::ResourceTemplate
        };
    }
    if map.contains_key("name")
        && (map.contains_key("messages") || map.contains_key("arguments"))
    {
        return Shape::Prompt;
    }
    Shape::Unknown
}

impl Decompiler {
    pub(crate) fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            template_counter: 0,
            ident_re: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap(),
            cast_re: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(-[A-Za-z0-9_]+)*$").unwrap(),
            version_re: Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").unwrap(),
        }
    }

    fn run_result(&mut self, result: &CompileResult) -> String {
        let mut items = Vec::new();

        if let Some(info) = &result.server_info {
            items.push(self.render_server_info(info));
        }
        for message in &result.messages {
            items.push(self.render_classified(message));
        }
        for tool in &result.tools {
            items.push(self.render_tool(tool));
        }
        for resource in &result.resources {
            items.push(self.render_resource(resource));
        }
        for prompt in &result.prompts {
            items.push(self.render_prompt(prompt));
        }
        for template in &result.resource_templates {
            items.push(self.render_template(template));
        }

        finish_document(items)
    }

    pub(crate) fn render_classified(&mut self, value: &Json) -> String {
        match classify(value) {
            Shape::ErrorMsg => self.render_error(value),
            Shape::Response => self.render_response(value),
            Shape::Request => self.render_request(value),
            Shape::Notification => self.render_notification(value),
            Shape::Tool => self.render_tool(value),
            Shape::Resource => self.render_resource(value),
            Shape::Prompt => self.render_prompt(value),
            Shape::ResourceTemplate => self.render_template(value),
            Shape::Unknown => {
                self.warn("unclassifiable JSON value, emitted as a comment", "D0001");
                format!("# unclassified: {}", value)
            }
        }
    }

    // Messages

    fn render_request(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let method = map
            .get("method")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();
        let id = self.message_id(&map);

        let mut line = format!("> {}#{}", method, id);
        if let Some(Json::Object(params)) = map.get("params") {
            line.push(' ');
            line.push_str(&self.render_object(params, RenderCtx::default(), 0));
        }
        line
    }

    fn render_notification(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let method = map
            .get("method")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();

        let mut line = format!("! {}", method);
        if let Some(Json::Object(params)) = map.get("params") {
            line.push(' ');
            line.push_str(&self.render_object(params, RenderCtx::default(), 0));
        }
        line
    }

    fn render_response(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let id = self.message_id(&map);

        let mut line = format!("< #{}", id);
        if let Some(result) = map.get("result") {
            let ctx = RenderCtx {
                result: true,
                in_definition: false,
            };
            line.push(' ');
            line.push_str(&self.render_value(result, ctx, 0));
        }
        line
    }

    fn render_error(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let id = self.message_id(&map);
        let error = map
            .get("error")
            .and_then(Json::as_object)
            .cloned()
            .unwrap_or_default();

        let code = match error.get("code").and_then(Json::as_i64) {
            Some(code) => code,
            None => {
                self.warn("error object has a non-integer code", "D0002");
                0
            }
        };
        let message = error
            .get("message")
            .and_then(Json::as_str)
            .unwrap_or_default();

        let mut line = format!("x #{} {}:{}", id, code, quote(message));
        if let Some(data) = error.get("data") {
            line.push(' ');
            line.push_str(&self.render_value(data, RenderCtx::default(), 0));
        }
        line
    }

    // Shared helpers

    fn message_id(&mut self, map: &serde_json::Map<String, Json>) -> i64 {
        match map.get("id").and_then(Json::as_i64) {
            Some(id) => id,
            None => {
                self.warn("message has a missing or non-integer id", "D0002");
                0
            }
        }
    }

    pub(crate) fn warn(&mut self, message: &str, code: &str) {
        self.diagnostics
            .push(Diagnostic::warning(message, SourceSpan::default()).with_code(code));
    }

    pub(crate) fn is_ident(&self, text: &str) -> bool {
        self.ident_re.is_match(text)
    }

    pub(crate) fn is_cast_name(&self, text: &str) -> bool {
        self.cast_re.is_match(text)
    }

    pub(crate) fn parse_version_string(&self, text: &str) -> Option<(i64, i64, i64)> {
        let captures = self.version_re.captures(text)?;
        let part = |index: usize| {
            captures
                .get(index)
                .and_then(|m| m.as_str().parse::<i64>().ok())
        };
        Some((part(1)?, part(2)?, part(3)?))
    }

    pub(crate) fn next_template_name(&mut self) -> String {
        let name = format!("rt{}", self.template_counter);
        self.template_counter += 1;
        name
    }
}

fn finish_document(items: Vec<String>) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut text = items.join("\n");
    text.push('\n');
    text
}
