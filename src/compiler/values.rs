//! Value and object compilation: field renaming, annotation
//! aggregation, capability merging, content blocks.

use serde_json::{json, Map, Number, Value as Json};

use super::{mappings, Compiler, ObjCtx};
use crate::ast::{
    AnnotationArgs, AnnotationProp, Content, ObjectNode, ObjectProp, Value,
};

impl Compiler {
    /// Compile an object property-by-property, in source order.
    ///
    /// Field names go through the DSL→JSON table before insertion, with
    /// two positional rewrites: `ok` negates into `isError` inside a
    /// response result, and `info` becomes `clientInfo` in initialize
    /// request params and `serverInfo` elsewhere. Annotations aggregate
    /// into one `annotations` object, except `@impl`, which lifts its
    /// (name, version) pair directly into the enclosing object.
    pub(crate) fn compile_object(&mut self, object: &ObjectNode, ctx: ObjCtx) -> Json {
        let mut map = Map::new();
        let mut annotations = Map::new();

        for prop in &object.properties {
            match prop {
                ObjectProp::Field(field) => {
                    if ctx.in_response_result && field.name == "ok" {
                        if let Value::Bool { value, .. } = field.value {
                            map.insert("isError".to_string(), json!(!value));
                            continue;
                        }
                        // A non-boolean `ok` passes through un-negated.
                        let compiled = self.compile_value(&field.value, ctx);
                        map.insert("isError".to_string(), compiled);
                        continue;
                    }

                    let key = if field.name == "info" {
                        if ctx.in_initialize_request {
                            "clientInfo"
                        } else {
                            "serverInfo"
                        }
                    } else {
                        mappings::json_field_name(&field.name).unwrap_or(field.name.as_str())
                    };
                    let compiled = self.compile_value(&field.value, ctx);
                    map.insert(key.to_string(), compiled);
                }
                ObjectProp::Annotation(annotation) => {
                    if annotation.name == "impl" {
                        self.lift_impl(annotation, &mut map, ctx);
                    } else {
                        let (key, value) = self.compile_annotation(annotation, ctx);
                        annotations.insert(key, value);
                    }
                }
                ObjectProp::Capability(capability) => {
                    merge_capability(&mut map, &capability.path);
                }
                ObjectProp::Definition(definition) => {
                    self.compile_definition_item(definition);
                }
            }
        }

        if !annotations.is_empty() {
            let slot = map
                .entry("annotations".to_string())
                .or_insert_with(|| Json::Object(Map::new()));
            match slot {
                Json::Object(existing) => existing.append(&mut annotations),
                _ => *slot = Json::Object(annotations),
            }
        }

        Json::Object(map)
    }

    pub(crate) fn compile_value(&mut self, value: &Value, ctx: ObjCtx) -> Json {
        match value {
            Value::Str { value, .. } => json!(value),
            Value::Int { value, .. } => json!(value),
            Value::Dec { value, .. } => Number::from_f64(*value)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Bool { value, .. } => json!(value),
            Value::Null { .. } => Json::Null,
            // Bare identifiers are string data.
            Value::Ident { name, .. } => json!(name),
            Value::Array { items, .. } => {
                Json::Array(items.iter().map(|item| self.compile_value(item, ctx)).collect())
            }
            Value::Object(object) => self.compile_object(object, ctx),
            Value::Content(content) => self.compile_content(content, ctx),
            Value::Composite(composite) => Json::Array(
                composite
                    .parts
                    .iter()
                    .map(|part| self.compile_content(part, ctx))
                    .collect(),
            ),
            Value::Role(role) => {
                let mut map = Map::new();
                map.insert("role".to_string(), json!(role.role.as_json()));
                let content = match role.content.as_ref() {
                    // A bare string is shorthand for text content.
                    Value::Str { value, .. } => json!({"type": "text", "text": value}),
                    other => self.compile_value(other, ctx),
                };
                map.insert("content".to_string(), content);
                Json::Object(map)
            }
            Value::Annotation(annotation) => {
                if annotation.name == "impl" {
                    let mut map = Map::new();
                    self.lift_impl(annotation, &mut map, ctx);
                    Json::Object(map)
                } else {
                    let (key, compiled) = self.compile_annotation(annotation, ctx);
                    let mut map = Map::new();
                    map.insert(key, compiled);
                    Json::Object(map)
                }
            }
            // Casts on data values carry no JSON position; the payload
            // stands alone. (Content formats are captured structurally
            // at parse time.)
            Value::Cast { value, .. } => self.compile_value(value, ctx),
            Value::Type(ty) => self.compile_schema(ty),
        }
    }

    pub(crate) fn compile_content(&mut self, content: &Content, ctx: ObjCtx) -> Json {
        match content {
            Content::Text { content, .. } => json!({"type": "text", "text": content}),
            Content::Image { data, format, .. } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("image"));
                map.insert("data".to_string(), json!(data));
                if let Some(format) = format {
                    map.insert("mimeType".to_string(), json!(mappings::mime_for_image(format)));
                }
                Json::Object(map)
            }
            Content::Audio { data, format, .. } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("audio"));
                map.insert("data".to_string(), json!(data));
                if let Some(format) = format {
                    map.insert("mimeType".to_string(), json!(mappings::mime_for_audio(format)));
                }
                Json::Object(map)
            }
            Content::ResourceRef { name, .. } => {
                json!({"type": "resource", "resource": {"uri": name}})
            }
            Content::ToolRef { name, .. } => json!({"type": "tool", "name": name}),
            Content::Embedded { body, .. } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("resource"));
                map.insert("resource".to_string(), self.compile_object(body, ctx));
                Json::Object(map)
            }
        }
    }

    /// `@impl(n, v)` → sibling `{name: n, version: v}` keys.
    fn lift_impl(&mut self, annotation: &AnnotationProp, map: &mut Map<String, Json>, ctx: ObjCtx) {
        if let AnnotationArgs::List(values) = &annotation.args {
            if values.len() == 2 {
                let name = self.compile_value(&values[0], ctx);
                let version = self.compile_value(&values[1], ctx);
                map.insert("name".to_string(), name);
                map.insert("version".to_string(), version);
            }
        }
    }

    fn compile_annotation(&mut self, annotation: &AnnotationProp, ctx: ObjCtx) -> (String, Json) {
        let (key, implied) = match mappings::known_annotation(&annotation.name) {
            Some(known) => (known.json_key.to_string(), known.implied),
            None => (annotation.name.clone(), None),
        };
        let value = match &annotation.args {
            AnnotationArgs::None => json!(implied.unwrap_or(true)),
            AnnotationArgs::Value(value) => self.compile_value(value, ctx),
            AnnotationArgs::List(values) => Json::Array(
                values
                    .iter()
                    .map(|value| self.compile_value(value, ctx))
                    .collect(),
            ),
        };
        (key, value)
    }
}

/// Merge one capability path into the nested capability object.
/// `a.b.c` lands as `{a: {b: {c: true}}}`; a bare `a` as `{a: {}}`.
/// Paths merge deeply and never clobber sibling entries.
pub(crate) fn merge_capability(map: &mut Map<String, Json>, path: &[String]) {
    if path.is_empty() {
        return;
    }

    if path.len() == 1 {
        // A dotted path's last segment is a true leaf; a bare name is
        // an empty object. Distinguished by the caller: this function
        // recurses with shrinking slices, so a singleton slice at top
        // level means a bare name.
        map.entry(path[0].clone()).or_insert_with(|| json!({}));
        return;
    }

    let entry = map
        .entry(path[0].clone())
        .or_insert_with(|| json!({}));
    if !entry.is_object() {
        *entry = json!({});
    }
    if let Json::Object(inner) = entry {
        merge_leaf_path(inner, &path[1..]);
    }
}

fn merge_leaf_path(map: &mut Map<String, Json>, path: &[String]) {
    if path.len() == 1 {
        // Leaf of a dotted path: true, unless a deeper object already
        // grew here from another path.
        let entry = map.entry(path[0].clone()).or_insert(Json::Bool(true));
        if !entry.is_object() {
            *entry = Json::Bool(true);
        }
        return;
    }
    let entry = map
        .entry(path[0].clone())
        .or_insert_with(|| json!({}));
    if !entry.is_object() {
        *entry = json!({});
    }
    if let Json::Object(inner) = entry {
        merge_leaf_path(inner, &path[1..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bare_capability_is_empty_object() {
        let mut map = Map::new();
        merge_capability(&mut map, &path(&["sampling"]));
        assert_eq!(Json::Object(map), json!({"sampling": {}}));
    }

    #[test]
    fn test_dotted_capability_nests_true() {
        let mut map = Map::new();
        merge_capability(&mut map, &path(&["roots", "listChanged"]));
        assert_eq!(Json::Object(map), json!({"roots": {"listChanged": true}}));
    }

    #[test]
    fn test_capabilities_merge_deeply() {
        let mut map = Map::new();
        merge_capability(&mut map, &path(&["roots", "listChanged"]));
        merge_capability(&mut map, &path(&["roots", "other"]));
        merge_capability(&mut map, &path(&["sampling"]));
        assert_eq!(
            Json::Object(map),
            json!({"roots": {"listChanged": true, "other": true}, "sampling": {}})
        );
    }

    #[test]
    fn test_bare_then_dotted_keeps_children() {
        let mut map = Map::new();
        merge_capability(&mut map, &path(&["roots"]));
        merge_capability(&mut map, &path(&["roots", "listChanged"]));
        assert_eq!(Json::Object(map), json!({"roots": {"listChanged": true}}));
    }
}
