//! Typed AST for MCP-DSL documents.
//!
//! The tree is fully owned: spans hold only positions, never references
//! into the source buffer, so a `Document` outlives the token stream it
//! was parsed from. Every node derives serde traits so hosts can dump
//! the tree as JSON.
//!
//! The node families:
//!
//! - [`nodes`] — document structure: messages, definitions, server blocks
//! - [`values`] — runtime values: objects (ctx-tagged), content, roles
//! - [`types`] — type expressions, the schema surface of the DSL

pub mod nodes;
pub mod types;
pub mod values;

pub use nodes::{
    CollectionDef, Definition, DefinitionItem, DefinitionKind, Document, DocumentItem,
    ErrorMessage, Message, NamedBlock, NamedBlockValue, Notification, Request, Response,
    ServerBlock, Version,
};
pub use types::{FieldDef, PrimitiveKind, TypeExpr};
pub use values::{
    AnnotationArgs, AnnotationProp, Capability, CompositeContent, Content, FieldAssignment,
    FieldModifier, ObjectContext, ObjectNode, ObjectProp, Role, RoleMessage, Value,
};
