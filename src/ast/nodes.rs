//! Document-level AST nodes: messages, definitions, and server blocks.

use serde::{Deserialize, Serialize};

use crate::ast::types::TypeExpr;
use crate::ast::values::{ObjectNode, Value};
use crate::span::SourceSpan;

/// A parsed MCP-DSL document: any mix of messages, definitions, and
/// server blocks, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub body: Vec<DocumentItem>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentItem {
    Message(Message),
    Definition(DefinitionItem),
    Server(ServerBlock),
}

/// The four JSON-RPC 2.0 message shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Request(Request),
    Response(Response),
    Notification(Notification),
    Error(ErrorMessage),
}

impl Message {
    pub fn span(&self) -> SourceSpan {
        match self {
            Message::Request(m) => m.span,
            Message::Response(m) => m.span,
            Message::Notification(m) => m.span,
            Message::Error(m) => m.span,
        }
    }
}

/// `> method#id params?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub id: i64,
    pub params: Option<ObjectNode>,
    pub span: SourceSpan,
}

/// `< #id value?` — carries a result, never an error (errors are their
/// own message shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: i64,
    pub result: Option<Value>,
    pub span: SourceSpan,
}

/// `! method params?` — no id, ever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub method: String,
    pub params: Option<ObjectNode>,
    pub span: SourceSpan,
}

/// `x #id code:"message" data?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub id: i64,
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
    pub span: SourceSpan,
}

/// Which artefact family a definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefinitionKind {
    Resource,
    Tool,
    Prompt,
    ResourceTemplate,
}

impl DefinitionKind {
    /// The DSL marker for this kind.
    pub fn marker(&self) -> &'static str {
        match self {
            DefinitionKind::Resource => "R",
            DefinitionKind::Tool => "T",
            DefinitionKind::Prompt => "P",
            DefinitionKind::ResourceTemplate => "RT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DefinitionKind::Resource => "resource",
            DefinitionKind::Tool => "tool",
            DefinitionKind::Prompt => "prompt",
            DefinitionKind::ResourceTemplate => "resource template",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefinitionItem {
    Single(Definition),
    Collection(CollectionDef),
}

impl DefinitionItem {
    pub fn span(&self) -> SourceSpan {
        match self {
            DefinitionItem::Single(d) => d.span,
            DefinitionItem::Collection(c) => c.span,
        }
    }
}

/// `T name { … }` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    pub body: ObjectNode,
    pub span: SourceSpan,
}

/// `T[] { a: {…}, b: {…} }` — several artefacts of one kind at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDef {
    pub kind: DefinitionKind,
    pub items: Vec<NamedBlock>,
    pub span: SourceSpan,
}

/// One entry of a collection: a name bound to a body, a description
/// string, or a bare input type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedBlock {
    pub name: String,
    pub value: NamedBlockValue,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NamedBlockValue {
    Object(ObjectNode),
    Str(String),
    Type(TypeExpr),
}

/// `server name vX.Y.Z { … }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerBlock {
    pub name: String,
    pub version: Option<Version>,
    pub body: ObjectNode,
    pub span: SourceSpan,
}

/// A `vX.Y.Z` version literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub major: i64,
    pub minor: i64,
    pub patch: i64,
    pub span: SourceSpan,
}

impl Version {
    pub fn triple(&self) -> (i64, i64, i64) {
        (self.major, self.minor, self.patch)
    }
}

/// Versions compare by their numbers; the span is location metadata and
/// takes no part in equality or ordering.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.triple().cmp(&other.triple()))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(major: i64, minor: i64, patch: i64) -> Version {
        Version {
            major,
            minor,
            patch,
            span: SourceSpan::default(),
        }
    }

    #[test]
    fn test_version_ordering() {
        assert!(version(1, 2, 3) < version(1, 10, 0));
        assert!(version(2, 0, 0) > version(1, 99, 99));
        assert_eq!(version(1, 0, 0), version(1, 0, 0));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(version(1, 2, 3).to_string(), "v1.2.3");
    }
}
