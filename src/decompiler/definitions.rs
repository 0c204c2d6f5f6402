//! Artefacts → DSL definitions, and the server block.

use serde_json::{json, Map, Value as Json};

use super::{layout, Decompiler, RenderCtx};

/// Keys the definition renderers consume themselves; everything else
/// rides along as generic field entries.
const TOOL_KEYS: &[&str] = &["name", "description", "inputSchema", "outputSchema", "annotations"];
const RESOURCE_KEYS: &[&str] = &["name", "uri", "mimeType", "description", "annotations"];
const PROMPT_KEYS: &[&str] = &["name", "description", "arguments", "messages", "annotations"];
const SERVER_KEYS: &[&str] = &["name", "version", "capabilities", "annotations"];

impl Decompiler {
    pub(crate) fn render_tool(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let name = self.definition_name(&map, "tool");
        let mut entries = Vec::new();
        let ctx = RenderCtx {
            result: false,
            in_definition: true,
        };

        if let Some(description) = map.get("description") {
            entries.push(format!("desc: {}", self.render_value(description, ctx, 1)));
        }
        if let Some(schema) = map.get("inputSchema") {
            // The default empty schema is implied by omission.
            if schema != &json!({"type": "object"}) {
                entries.push(format!("in: {}", self.schema_to_type(schema, 1)));
            }
        }
        if let Some(schema) = map.get("outputSchema") {
            entries.push(format!("out: {}", self.schema_to_type(schema, 1)));
        }
        self.push_annotations(&map, ctx, &mut entries);
        self.push_rest(&map, TOOL_KEYS, ctx, &mut entries);

        format!("T {} {}", name, layout('{', '}', &entries, 0))
    }

    pub(crate) fn render_resource(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let name = self.definition_name(&map, "resource");
        let entries = self.resource_entries(&map);
        format!("R {} {}", name, layout('{', '}', &entries, 0))
    }

    pub(crate) fn render_template(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        // Compiled templates carry no name; invent a stable one.
        let name = self.next_template_name();
        let entries = self.resource_entries(&map);
        format!("RT {} {}", name, layout('{', '}', &entries, 0))
    }

    fn resource_entries(&mut self, map: &Map<String, Json>) -> Vec<String> {
        let mut entries = Vec::new();
        let ctx = RenderCtx {
            result: false,
            in_definition: true,
        };

        if let Some(uri) = map.get("uri") {
            entries.push(format!("uri: {}", self.render_value(uri, ctx, 1)));
        }
        if let Some(mime) = map.get("mimeType") {
            entries.push(format!("mime: {}", self.render_value(mime, ctx, 1)));
        }
        if let Some(description) = map.get("description") {
            entries.push(format!("desc: {}", self.render_value(description, ctx, 1)));
        }
        self.push_annotations(map, ctx, &mut entries);
        self.push_rest(map, RESOURCE_KEYS, ctx, &mut entries);
        entries
    }

    pub(crate) fn render_prompt(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let name = self.definition_name(&map, "prompt");
        let mut entries = Vec::new();
        let ctx = RenderCtx {
            result: false,
            in_definition: true,
        };

        if let Some(description) = map.get("description") {
            entries.push(format!("desc: {}", self.render_value(description, ctx, 1)));
        }
        if let Some(arguments) = map.get("arguments") {
            match self.prompt_arguments_to_type(arguments) {
                Some(args_type) => entries.push(format!("args: {}", args_type)),
                None => {
                    self.warn("prompt arguments shape has no declaration form", "D0002");
                    entries.push(format!("arguments: {}", self.render_value(arguments, ctx, 1)));
                }
            }
        }
        if let Some(Json::Array(messages)) = map.get("messages") {
            let rendered: Vec<String> = messages
                .iter()
                .map(|message| self.render_value(message, ctx, 2))
                .collect();
            entries.push(format!("msgs: {}", layout('[', ']', &rendered, 1)));
        } else if let Some(messages) = map.get("messages") {
            entries.push(format!("msgs: {}", self.render_value(messages, ctx, 1)));
        }
        self.push_annotations(&map, ctx, &mut entries);
        self.push_rest(&map, PROMPT_KEYS, ctx, &mut entries);

        format!("P {} {}", name, layout('{', '}', &entries, 0))
    }

    /// `[{name, required?}, …]` → `{name!: str, …}` in array order.
    fn prompt_arguments_to_type(&mut self, arguments: &Json) -> Option<String> {
        let entries = arguments.as_array()?;
        let mut fields = Vec::new();
        for entry in entries {
            let map = entry.as_object()?;
            let name = map.get("name")?.as_str()?;
            if !self.is_ident(name) {
                return None;
            }
            let required = map.get("required") == Some(&json!(true));
            let marker = if required { "!" } else { "" };
            fields.push(format!("{}{}: str", name, marker));
            for key in map.keys() {
                if key != "name" && key != "required" {
                    return None;
                }
            }
        }
        Some(layout('{', '}', &fields, 1))
    }

    pub(crate) fn render_server_info(&mut self, value: &Json) -> String {
        let map = value.as_object().cloned().unwrap_or_default();
        let name = self.definition_name(&map, "server");
        let ctx = RenderCtx {
            result: false,
            in_definition: true,
        };

        let mut header = format!("server {}", name);
        let mut entries = Vec::new();

        match map.get("version").and_then(Json::as_str) {
            Some(version) => match self.parse_version_string(version) {
                Some((major, minor, patch)) => {
                    header.push_str(&format!(" v{}.{}.{}", major, minor, patch));
                }
                None => {
                    entries.push(format!("version: {}", super::quote(version)));
                }
            },
            None => {
                if let Some(version) = map.get("version") {
                    entries.push(format!("version: {}", self.render_value(version, ctx, 1)));
                }
            }
        }

        if let Some(caps) = map.get("capabilities") {
            match caps.as_object().and_then(|caps| self.flatten_caps(caps)) {
                Some(paths) => entries.push(format!("caps: {}", layout('{', '}', &paths, 1))),
                None => {
                    self.warn(
                        "capabilities shape cannot be written as a capability set",
                        "D0002",
                    );
                    entries.push(format!("capabilities: {}", self.render_value(caps, ctx, 1)));
                }
            }
        }

        self.push_annotations(&map, ctx, &mut entries);
        self.push_rest(&map, SERVER_KEYS, ctx, &mut entries);

        format!("{} {}", header, layout('{', '}', &entries, 0))
    }

    // Shared pieces

    fn definition_name(&mut self, map: &Map<String, Json>, fallback: &str) -> String {
        match map.get("name").and_then(Json::as_str) {
            Some(name) if self.is_ident(name) => name.to_string(),
            Some(name) => {
                self.warn(
                    &format!("definition name {:?} is not a DSL identifier", name),
                    "D0002",
                );
                name.to_string()
            }
            None => fallback.to_string(),
        }
    }

    fn push_annotations(
        &mut self,
        map: &Map<String, Json>,
        ctx: RenderCtx,
        entries: &mut Vec<String>,
    ) {
        if let Some(Json::Object(annotations)) = map.get("annotations") {
            entries.extend(self.annotation_entries(annotations, ctx, 1));
        } else if let Some(other) = map.get("annotations") {
            entries.push(format!("annotations: {}", self.render_value(other, ctx, 1)));
        }
    }

    fn push_rest(
        &mut self,
        map: &Map<String, Json>,
        consumed: &[&str],
        ctx: RenderCtx,
        entries: &mut Vec<String>,
    ) {
        let rest: Map<String, Json> = map
            .iter()
            .filter(|(key, _)| !consumed.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !rest.is_empty() {
            entries.extend(self.object_entries(&rest, ctx, 0));
        }
    }
}
