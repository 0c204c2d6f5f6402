//! The validation rules, keyed by object context and definition kind.

use std::collections::HashSet;

use crate::ast::{
    AnnotationArgs, AnnotationProp, CollectionDef, Content, Definition, DefinitionItem,
    DefinitionKind, Document, DocumentItem, Message, NamedBlockValue, ObjectContext, ObjectNode,
    ObjectProp, ServerBlock, TypeExpr, Value, Version,
};
use crate::compiler::mappings::{
    known_annotation, AnnotationTarget, AUDIO_FORMATS, IMAGE_FORMATS, STANDARD_ERROR_RANGE,
};
use crate::diagnostics::Diagnostic;

/// Validate a parsed document, returning diagnostics in pre-order.
/// The document is valid when none of them is Error severity.
pub fn validate(document: &Document) -> Vec<Diagnostic> {
    let mut validator = Validator {
        diagnostics: Vec::new(),
    };
    validator.check_document(document);
    validator.diagnostics
}

struct Validator {
    diagnostics: Vec<Diagnostic>,
}

impl Validator {
    fn check_document(&mut self, document: &Document) {
        let mut seen_server = false;
        for item in &document.body {
            match item {
                DocumentItem::Message(message) => self.check_message(message),
                DocumentItem::Definition(definition) => self.check_definition_item(definition),
                DocumentItem::Server(server) => {
                    if seen_server {
                        self.diagnostics.push(
                            Diagnostic::warning(
                                "duplicate server block; the first one wins",
                                server.span,
                            )
                            .with_code("V0015"),
                        );
                    }
                    seen_server = true;
                    self.check_server_block(server);
                }
            }
        }
    }

    // Messages

    fn check_message(&mut self, message: &Message) {
        match message {
            Message::Request(request) => {
                self.check_id(request.id, request.span);
                let target = if request.method == "initialize" {
                    AnnotationTarget::Initialize
                } else {
                    AnnotationTarget::Any
                };
                if let Some(params) = &request.params {
                    self.check_object(params, target);
                }
            }
            Message::Response(response) => {
                self.check_id(response.id, response.span);
                if let Some(result) = &response.result {
                    self.check_value(result, AnnotationTarget::Any);
                }
            }
            Message::Notification(notification) => {
                if let Some(params) = &notification.params {
                    self.check_object(params, AnnotationTarget::Any);
                }
            }
            Message::Error(error) => {
                self.check_id(error.id, error.span);
                let (low, high) = STANDARD_ERROR_RANGE;
                if error.code < low || error.code > high {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            format!(
                                "error code {} is outside the standard JSON-RPC range [{}, {}]",
                                error.code, low, high
                            ),
                            error.span,
                        )
                        .with_code("V0002"),
                    );
                }
                if let Some(data) = &error.data {
                    self.check_value(data, AnnotationTarget::Any);
                }
            }
        }
    }

    fn check_id(&mut self, id: i64, span: crate::span::SourceSpan) {
        if id < 0 {
            self.diagnostics.push(
                Diagnostic::error(format!("message id must be non-negative, got {}", id), span)
                    .with_code("V0001"),
            );
        }
    }

    // Objects, keyed by ctx

    fn check_object(&mut self, object: &ObjectNode, target: AnnotationTarget) {
        for prop in &object.properties {
            self.check_prop_legality(object.ctx, prop);
            match prop {
                ObjectProp::Field(field) => self.check_value(&field.value, target),
                ObjectProp::Annotation(annotation) => self.check_annotation(annotation, target),
                ObjectProp::Capability(capability) => {
                    if capability.path.is_empty()
                        || capability.path.iter().any(|segment| segment.is_empty())
                    {
                        self.diagnostics.push(
                            Diagnostic::error("capability path must be non-empty", capability.span)
                                .with_code("V0012"),
                        );
                    }
                }
                ObjectProp::Definition(definition) => self.check_definition_item(definition),
            }
        }
    }

    fn check_prop_legality(&mut self, ctx: ObjectContext, prop: &ObjectProp) {
        let violation: Option<&str> = match (ctx, prop) {
            (ObjectContext::CapabilitySet, ObjectProp::Field(_)) => {
                Some("field assignments are not permitted in a capability set")
            }
            (ObjectContext::CapabilitySet, ObjectProp::Annotation(_)) => {
                Some("annotations are not permitted in a capability set")
            }
            (ObjectContext::CapabilitySet, ObjectProp::Definition(_)) => {
                Some("definitions are not permitted in a capability set")
            }
            (ObjectContext::ErrorData, ObjectProp::Annotation(_)) => {
                Some("annotations are not permitted in error data")
            }
            (ObjectContext::ErrorData, ObjectProp::Definition(_)) => {
                Some("definitions are not permitted in error data")
            }
            (ObjectContext::RequestParams, ObjectProp::Definition(_)) => {
                Some("definitions are not permitted in request params")
            }
            (ObjectContext::ResponseResult, ObjectProp::Definition(_)) => {
                Some("definitions are not permitted in a response result")
            }
            (ObjectContext::GeneralValue, ObjectProp::Definition(_)) => {
                Some("definitions are only permitted inside definition bodies")
            }
            (ctx, ObjectProp::Capability(_)) if ctx != ObjectContext::CapabilitySet => {
                Some("capability paths are only permitted in a capability set")
            }
            _ => None,
        };
        if let Some(message) = violation {
            self.diagnostics
                .push(Diagnostic::error(message, prop.span()).with_code("V0003"));
        }
    }

    // Values and content

    fn check_value(&mut self, value: &Value, target: AnnotationTarget) {
        match value {
            Value::Object(object) => self.check_object(object, target),
            Value::Array { items, .. } => {
                for item in items {
                    self.check_value(item, target);
                }
            }
            Value::Cast { value, .. } => self.check_value(value, target),
            Value::Content(content) => self.check_content(content, target),
            Value::Composite(composite) => {
                for part in &composite.parts {
                    self.check_content(part, target);
                }
            }
            Value::Role(role) => self.check_value(&role.content, target),
            Value::Annotation(annotation) => self.check_annotation(annotation, target),
            Value::Type(ty) => self.check_type(ty),
            _ => {}
        }
    }

    fn check_content(&mut self, content: &Content, target: AnnotationTarget) {
        match content {
            Content::Image {
                format: Some(format),
                span,
                ..
            } => {
                if !IMAGE_FORMATS.contains(&format.as_str()) {
                    self.diagnostics.push(
                        Diagnostic::warning(format!("unknown image format '{}'", format), *span)
                            .with_code("V0011"),
                    );
                }
            }
            Content::Audio {
                format: Some(format),
                span,
                ..
            } => {
                if !AUDIO_FORMATS.contains(&format.as_str()) {
                    self.diagnostics.push(
                        Diagnostic::warning(format!("unknown audio format '{}'", format), *span)
                            .with_code("V0011"),
                    );
                }
            }
            Content::Embedded { body, .. } => self.check_object(body, target),
            _ => {}
        }
    }

    // Annotations

    fn check_annotation(&mut self, annotation: &AnnotationProp, target: AnnotationTarget) {
        if annotation.name == "impl" {
            let arity = match &annotation.args {
                AnnotationArgs::List(values) => values.len(),
                AnnotationArgs::Value(_) => 1,
                AnnotationArgs::None => 0,
            };
            if arity != 2 {
                self.diagnostics.push(
                    Diagnostic::error(
                        "@impl requires exactly two arguments (name, version)",
                        annotation.span,
                    )
                    .with_code("V0010"),
                );
            }
            if target != AnnotationTarget::Any && target != AnnotationTarget::Initialize {
                self.diagnostics.push(
                    Diagnostic::warning(
                        "@impl targets initialize messages",
                        annotation.span,
                    )
                    .with_code("V0009"),
                );
            }
            return;
        }

        match known_annotation(&annotation.name) {
            Some(known) => {
                if known.target != AnnotationTarget::Any
                    && target != AnnotationTarget::Any
                    && known.target != target
                {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            format!(
                                "@{} targets {} definitions",
                                annotation.name,
                                known.target.label()
                            ),
                            annotation.span,
                        )
                        .with_code("V0009"),
                    );
                }
            }
            None => {
                self.diagnostics.push(
                    Diagnostic::warning(
                        format!(
                            "unknown annotation @{} (preserved as a custom annotation)",
                            annotation.name
                        ),
                        annotation.span,
                    )
                    .with_code("V0014"),
                );
            }
        }

        match &annotation.args {
            AnnotationArgs::Value(value) => self.check_value(value, target),
            AnnotationArgs::List(values) => {
                for value in values {
                    self.check_value(value, target);
                }
            }
            AnnotationArgs::None => {}
        }
    }

    // Types

    fn check_type(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Enum { values, span } => {
                if values.is_empty() {
                    self.diagnostics.push(
                        Diagnostic::error("enum type must have at least one value", *span)
                            .with_code("V0006"),
                    );
                }
                let mut seen = HashSet::new();
                for value in values {
                    if !seen.insert(value.as_str()) {
                        self.diagnostics.push(
                            Diagnostic::warning(
                                format!("duplicate enum value '{}'", value),
                                *span,
                            )
                            .with_code("V0007"),
                        );
                    }
                }
            }
            TypeExpr::Union { types, span } => {
                if types.len() < 2 {
                    self.diagnostics.push(
                        Diagnostic::error("union type must have at least two alternatives", *span)
                            .with_code("V0008"),
                    );
                }
                for ty in types {
                    self.check_type(ty);
                }
            }
            TypeExpr::Array {
                elem: Some(elem), ..
            } => self.check_type(elem),
            TypeExpr::Object { fields, .. } => {
                for field in fields {
                    self.check_type(&field.ty);
                }
            }
            TypeExpr::Cast { base, .. } => self.check_type(base),
            TypeExpr::Modified { base, .. } => self.check_type(base),
            _ => {}
        }
    }

    // Definitions

    fn check_definition_item(&mut self, item: &DefinitionItem) {
        match item {
            DefinitionItem::Single(definition) => self.check_definition(definition),
            DefinitionItem::Collection(collection) => self.check_collection(collection),
        }
    }

    fn check_definition(&mut self, definition: &Definition) {
        self.check_definition_body(definition.kind, &definition.body, definition.span);
    }

    fn check_collection(&mut self, collection: &CollectionDef) {
        for item in &collection.items {
            match &item.value {
                NamedBlockValue::Object(body) => {
                    self.check_definition_body(collection.kind, body, item.span)
                }
                // A bare string body is the description, so only the
                // uri requirement can fail here.
                NamedBlockValue::Str(_) => self.require_uri_if_resource(collection.kind, item.span),
                NamedBlockValue::Type(ty) => {
                    self.require_uri_if_resource(collection.kind, item.span);
                    if collection.kind == DefinitionKind::Tool {
                        self.diagnostics.push(
                            Diagnostic::warning("tool definition has no description", item.span)
                                .with_code("V0005"),
                        );
                    }
                    self.check_type(ty);
                }
            }
        }
    }

    fn require_uri_if_resource(&mut self, kind: DefinitionKind, span: crate::span::SourceSpan) {
        if matches!(
            kind,
            DefinitionKind::Resource | DefinitionKind::ResourceTemplate
        ) {
            self.diagnostics.push(
                Diagnostic::error(
                    format!("{} definition is missing required field 'uri'", kind.label()),
                    span,
                )
                .with_code("V0004"),
            );
        }
    }

    fn check_definition_body(
        &mut self,
        kind: DefinitionKind,
        body: &ObjectNode,
        span: crate::span::SourceSpan,
    ) {
        match kind {
            DefinitionKind::Resource | DefinitionKind::ResourceTemplate => {
                if body.field("uri").is_none() {
                    self.diagnostics.push(
                        Diagnostic::error(
                            format!("{} definition is missing required field 'uri'", kind.label()),
                            span,
                        )
                        .with_code("V0004"),
                    );
                }
            }
            DefinitionKind::Tool => {
                if body.field("desc").is_none() && body.field("description").is_none() {
                    self.diagnostics.push(
                        Diagnostic::warning("tool definition has no description", span)
                            .with_code("V0005"),
                    );
                }
            }
            DefinitionKind::Prompt => {}
        }

        let target = match kind {
            DefinitionKind::Tool => AnnotationTarget::Tool,
            DefinitionKind::Resource | DefinitionKind::ResourceTemplate => {
                AnnotationTarget::Resource
            }
            DefinitionKind::Prompt => AnnotationTarget::Prompt,
        };
        self.check_object(body, target);
    }

    // Server blocks

    fn check_server_block(&mut self, server: &ServerBlock) {
        if let Some(version) = &server.version {
            self.check_version(version);
        }
        self.check_object(&server.body, AnnotationTarget::Any);
    }

    fn check_version(&mut self, version: &Version) {
        if version.major < 0 || version.minor < 0 || version.patch < 0 {
            self.diagnostics.push(
                Diagnostic::error(
                    format!("version numbers must be non-negative, got {}", version),
                    version.span,
                )
                .with_code("V0013"),
            );
        }
    }
}
