//! Definition compilation: tools, resources, prompts, templates, and
//! server blocks.

use std::collections::HashSet;

use serde_json::{json, Map, Value as Json};

use super::{Compiler, ObjCtx};
use crate::ast::{
    CollectionDef, DefinitionItem, DefinitionKind, NamedBlockValue, ObjectNode, ServerBlock,
};

impl Compiler {
    pub(crate) fn compile_definition_item(&mut self, item: &DefinitionItem) {
        match item {
            DefinitionItem::Single(definition) => {
                self.compile_definition(definition.kind, &definition.name, Some(&definition.body));
            }
            DefinitionItem::Collection(collection) => self.compile_collection(collection),
        }
    }

    fn compile_collection(&mut self, collection: &CollectionDef) {
        for item in &collection.items {
            match &item.value {
                NamedBlockValue::Object(body) => {
                    self.compile_definition(collection.kind, &item.name, Some(body));
                }
                NamedBlockValue::Str(description) => {
                    let mut map = Map::new();
                    map.insert("description".to_string(), json!(description));
                    self.push_artefact(collection.kind, &item.name, map);
                }
                NamedBlockValue::Type(ty) => {
                    let mut map = Map::new();
                    if collection.kind == DefinitionKind::Tool {
                        let schema = self.compile_schema(ty);
                        map.insert("inputSchema".to_string(), schema);
                    }
                    self.push_artefact(collection.kind, &item.name, map);
                }
            }
        }
    }

    fn compile_definition(&mut self, kind: DefinitionKind, name: &str, body: Option<&ObjectNode>) {
        let map = match body {
            Some(body) => match self.compile_object(body, ObjCtx::default()) {
                Json::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };
        self.push_artefact(kind, name, map);
    }

    fn push_artefact(&mut self, kind: DefinitionKind, name: &str, mut map: Map<String, Json>) {
        match kind {
            DefinitionKind::Tool => {
                map.insert("name".to_string(), json!(name));
                map.entry("inputSchema".to_string())
                    .or_insert_with(|| json!({"type": "object"}));
                self.result.tools.push(Json::Object(map));
            }
            DefinitionKind::Resource => {
                map.insert("name".to_string(), json!(name));
                self.result.resources.push(Json::Object(map));
            }
            DefinitionKind::Prompt => {
                map.insert("name".to_string(), json!(name));
                rebuild_prompt_arguments(&mut map);
                self.result.prompts.push(Json::Object(map));
            }
            // Templates carry no name in their compiled form.
            DefinitionKind::ResourceTemplate => {
                self.result.resource_templates.push(Json::Object(map));
            }
        }
    }

    /// `server name vX.Y.Z { … }` → the server info object. With several
    /// server blocks the first wins; the validator flags the rest.
    pub(crate) fn compile_server_block(&mut self, server: &ServerBlock) {
        let mut map = match self.compile_object(&server.body, ObjCtx::default()) {
            Json::Object(map) => map,
            _ => Map::new(),
        };
        map.insert("name".to_string(), json!(server.name));
        if let Some(version) = &server.version {
            map.insert(
                "version".to_string(),
                json!(format!("{}.{}.{}", version.major, version.minor, version.patch)),
            );
        }
        if self.result.server_info.is_none() {
            self.result.server_info = Some(Json::Object(map));
        }
    }
}

/// Prompt argument declarations are written as an object type but
/// compile to the MCP arguments array: `{city!: str}` becomes
/// `[{"name": "city", "required": true}]`. An explicit array value is
/// left alone.
fn rebuild_prompt_arguments(map: &mut Map<String, Json>) {
    let rebuilt = match map.get("arguments") {
        Some(Json::Object(schema)) if schema.get("type") == Some(&json!("object")) => {
            let required: HashSet<&str> = schema
                .get("required")
                .and_then(Json::as_array)
                .map(|entries| entries.iter().filter_map(Json::as_str).collect())
                .unwrap_or_default();
            let mut arguments = Vec::new();
            if let Some(Json::Object(properties)) = schema.get("properties") {
                for name in properties.keys() {
                    let mut entry = Map::new();
                    entry.insert("name".to_string(), json!(name));
                    if required.contains(name.as_str()) {
                        entry.insert("required".to_string(), json!(true));
                    }
                    arguments.push(Json::Object(entry));
                }
            }
            Some(Json::Array(arguments))
        }
        _ => None,
    };
    if let Some(arguments) = rebuilt {
        map.insert("arguments".to_string(), arguments);
    }
}
