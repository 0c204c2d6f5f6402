//! Type expressions → JSON Schema.

use serde_json::{json, Map, Value as Json};

use super::{mappings, Compiler};
use crate::ast::{PrimitiveKind, TypeExpr};

impl Compiler {
    pub(crate) fn compile_schema(&mut self, ty: &TypeExpr) -> Json {
        match ty {
            TypeExpr::Primitive { kind, .. } => match kind {
                PrimitiveKind::Str => json!({"type": "string"}),
                PrimitiveKind::Int => json!({"type": "integer"}),
                PrimitiveKind::Num => json!({"type": "number"}),
                PrimitiveKind::Bool => json!({"type": "boolean"}),
                PrimitiveKind::Uri => json!({"type": "string", "format": "uri"}),
                PrimitiveKind::Blob => {
                    json!({"type": "string", "contentEncoding": "base64"})
                }
            },
            TypeExpr::Array { elem, .. } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("array"));
                if let Some(elem) = elem {
                    map.insert("items".to_string(), self.compile_schema(elem));
                }
                Json::Object(map)
            }
            TypeExpr::Object { fields, .. } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("object"));

                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    // A requiredness modifier spelled on the type binds
                    // to the field, not the schema.
                    let (_, inner) = field.ty.split_modifier();
                    properties.insert(field.name.clone(), self.compile_schema(inner));
                    if field.is_required() {
                        required.push(json!(field.name));
                    }
                }
                if !properties.is_empty() {
                    map.insert("properties".to_string(), Json::Object(properties));
                }
                if !required.is_empty() {
                    map.insert("required".to_string(), Json::Array(required));
                }
                Json::Object(map)
            }
            TypeExpr::Enum { values, .. } => {
                json!({"type": "string", "enum": values})
            }
            TypeExpr::Reference { name, .. } => json!({"$ref": name}),
            TypeExpr::Union { types, .. } => {
                let alternatives: Vec<Json> =
                    types.iter().map(|ty| self.compile_schema(ty)).collect();
                json!({"oneOf": alternatives})
            }
            TypeExpr::Cast { base, casts, .. } => {
                let mut schema = self.compile_schema(base);
                if let Json::Object(map) = &mut schema {
                    for cast in casts {
                        if mappings::is_schema_format(cast) {
                            map.insert("format".to_string(), json!(cast));
                        } else {
                            // Not a schema format: retained as a custom
                            // annotation on the schema.
                            let slot = map
                                .entry("annotations".to_string())
                                .or_insert_with(|| json!({}));
                            if let Json::Object(existing) = slot {
                                existing.insert("cast".to_string(), json!(cast));
                            }
                        }
                    }
                }
                schema
            }
            TypeExpr::Modified { base, .. } => self.compile_schema(base),
        }
    }
}
