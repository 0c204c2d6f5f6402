//! Type expressions: the schema surface of the DSL.
//!
//! Precedence, tightest first: parentheses, cast `::`, union `|`,
//! postfix `!`/`?`. A reference type holds only a name; it is never
//! resolved into a pointer here — the compiler emits a `$ref` and any
//! resolution is a downstream concern, which keeps the tree acyclic.

use serde::{Deserialize, Serialize};

use crate::ast::values::FieldModifier;
use crate::span::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Str,
    Int,
    Num,
    Bool,
    Uri,
    Blob,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Str => "str",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Num => "num",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Uri => "uri",
            PrimitiveKind::Blob => "blob",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    Primitive {
        kind: PrimitiveKind,
        span: SourceSpan,
    },
    /// `[]` or `[T]`.
    Array {
        elem: Option<Box<TypeExpr>>,
        span: SourceSpan,
    },
    /// `{ name!: T, … }`.
    Object {
        fields: Vec<FieldDef>,
        span: SourceSpan,
    },
    /// `enum[a, b, c]`.
    Enum {
        values: Vec<String>,
        span: SourceSpan,
    },
    /// A named type, emitted as `$ref`.
    Reference {
        name: String,
        span: SourceSpan,
    },
    /// `A | B | C`.
    Union {
        types: Vec<TypeExpr>,
        span: SourceSpan,
    },
    /// `T::date-time`.
    Cast {
        base: Box<TypeExpr>,
        casts: Vec<String>,
        span: SourceSpan,
    },
    /// `T!` / `T?` — requiredness spelled on the type; it binds to the
    /// enclosing field, not the type itself.
    Modified {
        base: Box<TypeExpr>,
        modifier: FieldModifier,
        span: SourceSpan,
    },
}

impl TypeExpr {
    pub fn span(&self) -> SourceSpan {
        match self {
            TypeExpr::Primitive { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Object { span, .. }
            | TypeExpr::Enum { span, .. }
            | TypeExpr::Reference { span, .. }
            | TypeExpr::Union { span, .. }
            | TypeExpr::Cast { span, .. }
            | TypeExpr::Modified { span, .. } => *span,
        }
    }

    /// Strip a top-level requiredness modifier, returning it and the
    /// underlying type.
    pub fn split_modifier(&self) -> (Option<FieldModifier>, &TypeExpr) {
        match self {
            TypeExpr::Modified { base, modifier, .. } => (Some(*modifier), base),
            other => (None, other),
        }
    }
}

/// One field of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub modifier: Option<FieldModifier>,
    pub ty: TypeExpr,
    pub span: SourceSpan,
}

impl FieldDef {
    /// A field is required when marked `!` on either the name or the
    /// type.
    pub fn is_required(&self) -> bool {
        if self.modifier == Some(FieldModifier::Required) {
            return true;
        }
        matches!(
            self.ty,
            TypeExpr::Modified {
                modifier: FieldModifier::Required,
                ..
            }
        )
    }
}
