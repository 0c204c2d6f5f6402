//! Value-level AST nodes: objects, content, roles, capabilities.
//!
//! The grammar uses one `{ … }` object form across five different
//! positions. Rather than five object grammars, every object node
//! carries a [`ObjectContext`] classifier assigned by the parser; the
//! validator keys its property-legality rules off that tag.

use serde::{Deserialize, Serialize};

use crate::ast::nodes::DefinitionItem;
use crate::ast::types::TypeExpr;
use crate::span::SourceSpan;

/// Where an object appears, which decides what may appear inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectContext {
    CapabilitySet,
    RequestParams,
    ResponseResult,
    ErrorData,
    DefinitionBlock,
    GeneralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub properties: Vec<ObjectProp>,
    pub ctx: ObjectContext,
    pub span: SourceSpan,
}

impl ObjectNode {
    pub fn new(ctx: ObjectContext, span: SourceSpan) -> Self {
        Self {
            properties: Vec::new(),
            ctx,
            span,
        }
    }

    /// Find a field assignment by its DSL name.
    pub fn field(&self, name: &str) -> Option<&FieldAssignment> {
        self.properties.iter().find_map(|p| match p {
            ObjectProp::Field(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectProp {
    Field(FieldAssignment),
    Annotation(AnnotationProp),
    Capability(Capability),
    Definition(DefinitionItem),
}

impl ObjectProp {
    pub fn span(&self) -> SourceSpan {
        match self {
            ObjectProp::Field(f) => f.span,
            ObjectProp::Annotation(a) => a.span,
            ObjectProp::Capability(c) => c.span,
            ObjectProp::Definition(d) => d.span(),
        }
    }
}

/// `name: value`, optionally with a requiredness modifier on the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub name: String,
    pub modifier: Option<FieldModifier>,
    pub value: Value,
    pub span: SourceSpan,
}

/// `!` (required) or `?` (optional).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldModifier {
    Required,
    Optional,
}

/// `@name`, `@name: value`, or `@name(a, b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationProp {
    pub name: String,
    pub args: AnnotationArgs,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationArgs {
    None,
    Value(Box<Value>),
    List(Vec<Value>),
}

/// A dotted capability path: `roots.listChanged`, or just `sampling`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub path: Vec<String>,
    pub span: SourceSpan,
}

/// `u` / `a` / `s` role indicators on prompt messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_json(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Role::User => "u",
            Role::Assistant => "a",
            Role::System => "s",
        }
    }

    pub fn from_json(role: &str) -> Option<Role> {
        match role {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

/// `u: "hello"` or `a: txt "x" + img "…"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMessage {
    pub role: Role,
    pub content: Box<Value>,
    pub span: SourceSpan,
}

/// Content literals: `txt`, `img`, `aud`, `res {…}`, `T {…}`, `emb {…}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Content {
    Text {
        content: String,
        multiline: bool,
        span: SourceSpan,
    },
    Image {
        data: String,
        format: Option<String>,
        span: SourceSpan,
    },
    Audio {
        data: String,
        format: Option<String>,
        span: SourceSpan,
    },
    ResourceRef {
        name: String,
        span: SourceSpan,
    },
    ToolRef {
        name: String,
        span: SourceSpan,
    },
    Embedded {
        body: ObjectNode,
        span: SourceSpan,
    },
}

impl Content {
    pub fn span(&self) -> SourceSpan {
        match self {
            Content::Text { span, .. }
            | Content::Image { span, .. }
            | Content::Audio { span, .. }
            | Content::ResourceRef { span, .. }
            | Content::ToolRef { span, .. }
            | Content::Embedded { span, .. } => *span,
        }
    }
}

/// Several content parts joined with `+`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeContent {
    pub parts: Vec<Content>,
    pub span: SourceSpan,
}

/// Any value position in the grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Str {
        value: String,
        multiline: bool,
        span: SourceSpan,
    },
    Int {
        value: i64,
        span: SourceSpan,
    },
    Dec {
        value: f64,
        span: SourceSpan,
    },
    Bool {
        value: bool,
        span: SourceSpan,
    },
    Null {
        span: SourceSpan,
    },
    Ident {
        name: String,
        span: SourceSpan,
    },
    Array {
        items: Vec<Value>,
        span: SourceSpan,
    },
    Object(ObjectNode),
    Content(Content),
    Composite(CompositeContent),
    Role(RoleMessage),
    Annotation(AnnotationProp),
    Cast {
        value: Box<Value>,
        casts: Vec<String>,
        span: SourceSpan,
    },
    /// A type expression in value position (`in:`/`out:` fields and
    /// prompt argument declarations).
    Type(TypeExpr),
}

impl Value {
    pub fn span(&self) -> SourceSpan {
        match self {
            Value::Str { span, .. }
            | Value::Int { span, .. }
            | Value::Dec { span, .. }
            | Value::Bool { span, .. }
            | Value::Null { span }
            | Value::Ident { span, .. }
            | Value::Array { span, .. }
            | Value::Cast { span, .. } => *span,
            Value::Object(o) => o.span,
            Value::Content(c) => c.span(),
            Value::Composite(c) => c.span,
            Value::Role(r) => r.span,
            Value::Annotation(a) => a.span,
            Value::Type(t) => t.span(),
        }
    }
}
