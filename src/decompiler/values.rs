//! Generic value and object rendering, with the reverse field mapping,
//! capability flattening, content/role detection, and annotation
//! reversal.

use serde_json::{json, Map, Value as Json};

use super::{layout, number_to_text, quote, Decompiler, RenderCtx};
use crate::ast::Role;
use crate::compiler::mappings;

/// Keys rendered first, in this order, when present; everything else
/// follows in sorted order.
const PREFERRED_ORDER: &[&str] = &[
    "protocolVersion",
    "name",
    "version",
    "capabilities",
    "clientInfo",
    "serverInfo",
    "role",
    "content",
    "type",
    "uri",
    "mimeType",
    "description",
];

impl Decompiler {
    pub(crate) fn render_value(&mut self, value: &Json, ctx: RenderCtx, indent: usize) -> String {
        match value {
            Json::Null => "null".to_string(),
            Json::Bool(b) => b.to_string(),
            Json::Number(n) => number_to_text(n),
            Json::String(s) => quote(s),
            Json::Array(items) => {
                let entries: Vec<String> = items
                    .iter()
                    .map(|item| self.render_value(item, ctx, indent + 1))
                    .collect();
                layout('[', ']', &entries, indent)
            }
            Json::Object(map) => {
                if let Some(role) = self.try_render_role(map) {
                    return role;
                }
                if let Some(content) = self.try_render_content(map) {
                    return content;
                }
                self.render_object(map, ctx, indent)
            }
        }
    }

    /// Render an object body `{ … }`, reversing the field-name mapping.
    pub(crate) fn render_object(
        &mut self,
        map: &Map<String, Json>,
        ctx: RenderCtx,
        indent: usize,
    ) -> String {
        let entries = self.object_entries(map, ctx, indent);
        layout('{', '}', &entries, indent)
    }

    pub(crate) fn object_entries(
        &mut self,
        map: &Map<String, Json>,
        ctx: RenderCtx,
        indent: usize,
    ) -> Vec<String> {
        let mut entries = Vec::new();
        let drop_client_info = map.contains_key("clientInfo") && map.contains_key("serverInfo");
        if drop_client_info {
            self.warn(
                "object carries both clientInfo and serverInfo; keeping serverInfo as info",
                "D0003",
            );
        }

        for key in ordered_keys(map) {
            let value = &map[&key];
            match key.as_str() {
                "clientInfo" if drop_client_info => continue,
                "clientInfo" | "serverInfo" => {
                    entries.push(format!("info: {}", self.render_value(value, ctx, indent + 1)));
                }
                "capabilities" => match value.as_object().and_then(|caps| self.flatten_caps(caps)) {
                    Some(paths) => {
                        entries.push(format!("caps: {}", layout('{', '}', &paths, indent + 1)));
                    }
                    None => {
                        self.warn(
                            "capabilities shape cannot be written as a capability set",
                            "D0002",
                        );
                        entries.push(format!(
                            "capabilities: {}",
                            self.render_value(value, ctx, indent + 1)
                        ));
                    }
                },
                "isError" if ctx.result => match value {
                    Json::Bool(b) => entries.push(format!("ok: {}", !b)),
                    other => {
                        entries.push(format!("isError: {}", self.render_value(other, ctx, indent + 1)));
                    }
                },
                "ok" if ctx.result => {
                    // `ok` is the DSL spelling of negated isError; a raw
                    // JSON key of that name cannot survive a round trip.
                    self.warn("result field 'ok' collides with the isError rewrite", "D0002");
                    entries.push(format!("ok: {}", self.render_value(value, ctx, indent + 1)));
                }
                "inputSchema" => {
                    let rendered = self.schema_to_type(value, indent + 1);
                    entries.push(format!("in: {}", rendered));
                }
                "outputSchema" => {
                    let rendered = self.schema_to_type(value, indent + 1);
                    entries.push(format!("out: {}", rendered));
                }
                "annotations" => match value.as_object() {
                    Some(annotations) => {
                        entries.extend(self.annotation_entries(annotations, ctx, indent));
                    }
                    None => {
                        entries.push(format!(
                            "annotations: {}",
                            self.render_value(value, ctx, indent + 1)
                        ));
                    }
                },
                other => {
                    let dsl_key = match mappings::dsl_field_name(other) {
                        // `args` re-parses as a type declaration inside
                        // definition bodies; keep the long name there.
                        Some("args") if ctx.in_definition => other,
                        Some(short) => short,
                        None => other,
                    };
                    if !self.is_ident(dsl_key) {
                        self.warn(
                            &format!("field name {:?} is not a DSL identifier", dsl_key),
                            "D0002",
                        );
                    }
                    entries.push(format!(
                        "{}: {}",
                        dsl_key,
                        self.render_value(value, ctx, indent + 1)
                    ));
                }
            }
        }
        entries
    }

    /// Annotation object → `@name` entries, bare where the value equals
    /// the implied one.
    pub(crate) fn annotation_entries(
        &mut self,
        annotations: &Map<String, Json>,
        ctx: RenderCtx,
        indent: usize,
    ) -> Vec<String> {
        let mut entries = Vec::new();
        for (key, value) in annotations {
            match mappings::dsl_annotation_name(key) {
                Some(name) => {
                    let implied = mappings::known_annotation(name).and_then(|known| known.implied);
                    if implied.map(Json::Bool) == Some(value.clone()) {
                        entries.push(format!("@{}", name));
                    } else {
                        entries.push(format!(
                            "@{}:{}",
                            name,
                            self.render_value(value, ctx, indent + 1)
                        ));
                    }
                }
                None => {
                    if value == &Json::Bool(true) {
                        entries.push(format!("@{}", key));
                    } else {
                        entries.push(format!(
                            "@{}:{}",
                            key,
                            self.render_value(value, ctx, indent + 1)
                        ));
                    }
                }
            }
        }
        entries
    }

    /// `{role, content}` pairs come back as role messages when the
    /// content has a DSL spelling.
    fn try_render_role(&mut self, map: &Map<String, Json>) -> Option<String> {
        if map.len() != 2 {
            return None;
        }
        let role = Role::from_json(map.get("role")?.as_str()?)?;
        let content = map.get("content")?;

        let rendered = match content {
            Json::Object(content_map) => {
                // Plain text keeps the string shorthand.
                if let Some(text) = plain_text(content_map) {
                    quote(text)
                } else {
                    self.try_render_content(content_map)?
                }
            }
            Json::Array(parts) => {
                let mut rendered_parts = Vec::new();
                for part in parts {
                    let part_map = part.as_object()?;
                    rendered_parts.push(self.try_render_content(part_map)?);
                }
                if rendered_parts.is_empty() {
                    return None;
                }
                rendered_parts.join(" + ")
            }
            _ => return None,
        };

        Some(format!("{}:{}", role.marker(), rendered))
    }

    /// Known content-block shapes get their literal spelling; anything
    /// with extra keys falls through to generic object rendering.
    pub(crate) fn try_render_content(&mut self, map: &Map<String, Json>) -> Option<String> {
        match map.get("type")?.as_str()? {
            "text" => {
                let text = plain_text(map)?;
                Some(format!("txt {}", quote(text)))
            }
            "image" | "audio" => {
                let is_image = map.get("type")?.as_str()? == "image";
                if !keys_within(map, &["type", "data", "mimeType"]) {
                    return None;
                }
                let data = map.get("data")?.as_str()?;
                let marker = if is_image { "img" } else { "aud" };
                match map.get("mimeType").and_then(Json::as_str) {
                    Some(mime) => {
                        let format = mappings::format_from_mime(mime)?;
                        // `image/jpeg` reverses to ::jpeg, but exotic
                        // subtypes (svg+xml) have no cast spelling.
                        if !self.is_ident(format) {
                            return None;
                        }
                        Some(format!("{} {}::{}", marker, quote(data), format))
                    }
                    None => Some(format!("{} {}", marker, quote(data))),
                }
            }
            "resource" => {
                if !keys_within(map, &["type", "resource"]) {
                    return None;
                }
                let resource = map.get("resource")?.as_object()?;
                if resource.len() == 1 {
                    if let Some(uri) = resource.get("uri").and_then(Json::as_str) {
                        if self.is_ident(uri) {
                            return Some(format!("res {{{}}}", uri));
                        }
                    }
                }
                let body = self.render_object(resource, RenderCtx::default(), 0);
                Some(format!("emb {}", body))
            }
            "tool" => {
                if !keys_within(map, &["type", "name"]) {
                    return None;
                }
                let name = map.get("name")?.as_str()?;
                if self.is_ident(name) {
                    Some(format!("T {{{}}}", name))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Nested capability object → dotted paths. `None` when the shape
    /// has no capability-set spelling.
    pub(crate) fn flatten_caps(&self, map: &Map<String, Json>) -> Option<Vec<String>> {
        let mut paths = Vec::new();
        for (key, value) in map {
            if !self.is_ident(key) {
                return None;
            }
            match value {
                Json::Object(inner) if inner.is_empty() => paths.push(key.clone()),
                Json::Object(inner) => {
                    for sub in self.flatten_true_leaves(inner)? {
                        paths.push(format!("{}.{}", key, sub));
                    }
                }
                _ => return None,
            }
        }
        Some(paths)
    }

    fn flatten_true_leaves(&self, map: &Map<String, Json>) -> Option<Vec<String>> {
        if map.is_empty() {
            return None;
        }
        let mut paths = Vec::new();
        for (key, value) in map {
            if !self.is_ident(key) {
                return None;
            }
            match value {
                Json::Bool(true) => paths.push(key.clone()),
                Json::Object(inner) => {
                    for sub in self.flatten_true_leaves(inner)? {
                        paths.push(format!("{}.{}", key, sub));
                    }
                }
                _ => return None,
            }
        }
        Some(paths)
    }
}

/// The text of a `{type: "text", text: …}` block with no extra keys.
fn plain_text(map: &Map<String, Json>) -> Option<&str> {
    if map.len() == 2 && map.get("type") == Some(&json!("text")) {
        map.get("text").and_then(Json::as_str)
    } else {
        None
    }
}

fn keys_within(map: &Map<String, Json>, allowed: &[&str]) -> bool {
    map.keys().all(|key| allowed.contains(&key.as_str()))
}

fn ordered_keys(map: &Map<String, Json>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for preferred in PREFERRED_ORDER {
        if map.contains_key(*preferred) {
            keys.push((*preferred).to_string());
        }
    }
    for key in map.keys() {
        if !PREFERRED_ORDER.contains(&key.as_str()) {
            keys.push(key.clone());
        }
    }
    keys
}
