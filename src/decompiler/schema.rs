//! JSON Schema → type expression text.

use serde_json::{json, Map, Value as Json};

use super::{layout, Decompiler};
use crate::compiler::mappings;

/// Schema keys with a DSL spelling; anything else is flagged.
const KNOWN_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "items",
    "properties",
    "required",
    "enum",
    "contentEncoding",
    "annotations",
    "$ref",
    "oneOf",
];

impl Decompiler {
    pub(crate) fn schema_to_type(&mut self, schema: &Json, indent: usize) -> String {
        let map = match schema.as_object() {
            Some(map) => map,
            None => {
                self.warn("schema is not an object; rendered as {}", "D0002");
                return "{}".to_string();
            }
        };

        if let Some(reference) = map.get("$ref").and_then(Json::as_str) {
            if self.is_ident(reference) {
                return reference.to_string();
            }
            self.warn("$ref target is not a DSL identifier", "D0002");
            return "{}".to_string();
        }

        if let Some(alternatives) = map.get("oneOf").and_then(Json::as_array) {
            let parts: Vec<String> = alternatives
                .iter()
                .map(|alternative| {
                    let part = self.schema_to_type(alternative, indent);
                    let nested_union = alternative
                        .as_object()
                        .map(|m| m.contains_key("oneOf"))
                        .unwrap_or(false);
                    if nested_union {
                        format!("({})", part)
                    } else {
                        part
                    }
                })
                .collect();
            if parts.is_empty() {
                self.warn("empty oneOf; rendered as {}", "D0002");
                return "{}".to_string();
            }
            return parts.join(" | ");
        }

        let type_name = map.get("type").and_then(Json::as_str);
        let mut rendered = match type_name {
            Some("string") => {
                if let Some(values) = map.get("enum").and_then(Json::as_array) {
                    self.enum_to_type(values)
                } else if map.get("contentEncoding") == Some(&json!("base64")) {
                    "blob".to_string()
                } else if map.get("format") == Some(&json!("uri")) {
                    "uri".to_string()
                } else {
                    "str".to_string()
                }
            }
            Some("integer") => "int".to_string(),
            Some("number") => "num".to_string(),
            Some("boolean") => "bool".to_string(),
            Some("array") => match map.get("items") {
                Some(items) => format!("[{}]", self.schema_to_type(items, indent)),
                None => "[]".to_string(),
            },
            Some("object") => self.object_schema_to_type(map, indent),
            _ => {
                self.warn("unrecognised schema shape; rendered as {}", "D0002");
                "{}".to_string()
            }
        };

        if let Some(format) = map.get("format").and_then(Json::as_str) {
            let folded_into_uri = rendered == "uri" && format == "uri";
            if !folded_into_uri {
                if self.is_cast_name(format) && mappings::is_schema_format(format) {
                    rendered.push_str("::");
                    rendered.push_str(format);
                } else {
                    self.warn(
                        &format!("schema format {:?} has no cast spelling", format),
                        "D0002",
                    );
                }
            }
        }

        if let Some(Json::Object(annotations)) = map.get("annotations") {
            for (key, value) in annotations {
                match (key.as_str(), value.as_str()) {
                    ("cast", Some(cast))
                        if self.is_cast_name(cast) && !mappings::is_schema_format(cast) =>
                    {
                        rendered.push_str("::");
                        rendered.push_str(cast);
                    }
                    _ => {
                        self.warn(
                            &format!("schema annotation {:?} has no DSL spelling", key),
                            "D0002",
                        );
                    }
                }
            }
        }

        for key in map.keys() {
            if !KNOWN_SCHEMA_KEYS.contains(&key.as_str()) {
                self.warn(
                    &format!("schema key {:?} has no DSL spelling", key),
                    "D0002",
                );
            }
        }

        rendered
    }

    fn enum_to_type(&mut self, values: &[Json]) -> String {
        let mut names = Vec::new();
        for value in values {
            match value.as_str() {
                Some(name) if self.is_ident(name) => names.push(name.to_string()),
                Some(name) => {
                    self.warn(
                        &format!("enum value {:?} is not a DSL identifier", name),
                        "D0002",
                    );
                    names.push(name.to_string());
                }
                None => {
                    self.warn("non-string enum value dropped", "D0002");
                }
            }
        }
        format!("enum[{}]", names.join(", "))
    }

    /// Required fields come first, in the order of the `required`
    /// array, so that re-compiling rebuilds the identical list; the
    /// remaining fields follow in key order.
    fn object_schema_to_type(&mut self, map: &Map<String, Json>, indent: usize) -> String {
        let properties = match map.get("properties").and_then(Json::as_object) {
            Some(properties) if !properties.is_empty() => properties,
            _ => return "{}".to_string(),
        };
        let required: Vec<&str> = map
            .get("required")
            .and_then(Json::as_array)
            .map(|entries| entries.iter().filter_map(Json::as_str).collect())
            .unwrap_or_default();

        let mut entries = Vec::new();
        for name in &required {
            match properties.get(*name) {
                Some(sub) => {
                    entries.push(format!("{}!: {}", name, self.schema_to_type(sub, indent + 1)));
                }
                None => {
                    self.warn(
                        &format!("required name {:?} is missing from properties", name),
                        "D0002",
                    );
                }
            }
        }
        for (name, sub) in properties {
            if !required.contains(&name.as_str()) {
                entries.push(format!("{}: {}", name, self.schema_to_type(sub, indent + 1)));
            }
        }
        layout('{', '}', &entries, indent)
    }
}
