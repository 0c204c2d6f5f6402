//! Token definitions for the MCP-DSL scanner.
//!
//! A token carries its kind, the original lexeme, an optional literal
//! value, and a source span. Keywords are recognised as distinct kinds
//! when the lexeme matches; the parser may still treat a keyword token
//! as a plain name where the grammar allows it (`x`, `u`, or `res` are
//! perfectly good field names), which is why every token keeps its
//! lexeme around.

use serde::{Deserialize, Serialize};

use crate::span::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Names and literals
    Identifier,
    MethodPath,
    Integer,
    Decimal,
    Str,
    MultilineStr,

    // Message operators
    RequestMarker,  // >
    ResponseMarker, // <
    Bang,           // ! — notification prefix or required modifier
    ErrorMarker,    // x

    // Definition markers
    ResourceMarker, // R
    ToolMarker,     // T
    PromptMarker,   // P
    TemplateMarker, // RT

    // Keywords
    Server,
    Enum,
    True,
    False,
    Null,

    // Primitive type names
    StrType,
    IntType,
    NumType,
    BoolType,
    UriType,
    BlobType,

    // Content markers
    TxtMarker,
    ImgMarker,
    AudMarker,
    ResMarker,
    EmbMarker,

    // Role indicators
    UserRole,      // u
    AssistantRole, // a
    SystemRole,    // s

    // Delimiters
    Hash,
    Colon,
    DoubleColon,
    Comma,
    Dot,
    Pipe,
    Question,
    At,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Operators
    Equals,
    Plus,
    Minus,

    // Structure and trivia
    Newline,
    Indent,
    Dedent,
    Comment,
    Unknown,
    Eof,
}

impl TokenKind {
    /// Kinds that can stand in for a bare name. Keywords stay usable as
    /// identifiers wherever the grammar expects one.
    pub fn is_name_like(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::ErrorMarker
                | TokenKind::ResourceMarker
                | TokenKind::ToolMarker
                | TokenKind::PromptMarker
                | TokenKind::TemplateMarker
                | TokenKind::Server
                | TokenKind::Enum
                | TokenKind::StrType
                | TokenKind::IntType
                | TokenKind::NumType
                | TokenKind::BoolType
                | TokenKind::UriType
                | TokenKind::BlobType
                | TokenKind::TxtMarker
                | TokenKind::ImgMarker
                | TokenKind::AudMarker
                | TokenKind::ResMarker
                | TokenKind::EmbMarker
                | TokenKind::UserRole
                | TokenKind::AssistantRole
                | TokenKind::SystemRole
        )
    }

    /// Trivia kinds the parser skips between constructs.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Comment | TokenKind::Indent | TokenKind::Dedent
        )
    }
}

/// Classify an identifier lexeme as a keyword kind, if it is one.
pub fn keyword_kind(lexeme: &str) -> Option<TokenKind> {
    let kind = match lexeme {
        "x" => TokenKind::ErrorMarker,
        "R" => TokenKind::ResourceMarker,
        "T" => TokenKind::ToolMarker,
        "P" => TokenKind::PromptMarker,
        "RT" => TokenKind::TemplateMarker,
        "server" => TokenKind::Server,
        "enum" => TokenKind::Enum,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "str" => TokenKind::StrType,
        "int" => TokenKind::IntType,
        "num" => TokenKind::NumType,
        "bool" => TokenKind::BoolType,
        "uri" => TokenKind::UriType,
        "blob" => TokenKind::BlobType,
        "txt" => TokenKind::TxtMarker,
        "img" => TokenKind::ImgMarker,
        "aud" => TokenKind::AudMarker,
        "res" => TokenKind::ResMarker,
        "emb" => TokenKind::EmbMarker,
        "u" => TokenKind::UserRole,
        "a" => TokenKind::AssistantRole,
        "s" => TokenKind::SystemRole,
        _ => return None,
    };
    Some(kind)
}

/// Literal payload attached to literal tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenValue {
    Str(String),
    Int(i64),
    Dec(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub value: Option<TokenValue>,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            value: None,
            span,
        }
    }

    pub fn with_value(
        kind: TokenKind,
        lexeme: impl Into<String>,
        value: TokenValue,
        span: SourceSpan,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            value: Some(value),
            span,
        }
    }

    /// The integer payload, when this token is an integer literal.
    pub fn int_value(&self) -> Option<i64> {
        match self.value {
            Some(TokenValue::Int(n)) => Some(n),
            _ => None,
        }
    }

    /// The string payload, when this token is a string literal.
    pub fn str_value(&self) -> Option<&str> {
        match &self.value {
            Some(TokenValue::Str(s)) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(
                f,
                "Token({:?}, {:?}, {}:{})",
                self.kind,
                value,
                self.span.start.row + 1,
                self.span.start.column + 1
            ),
            None => write!(
                f,
                "Token({:?}, {:?}, {}:{})",
                self.kind,
                self.lexeme,
                self.span.start.row + 1,
                self.span.start.column + 1
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_classification() {
        assert_eq!(keyword_kind("server"), Some(TokenKind::Server));
        assert_eq!(keyword_kind("RT"), Some(TokenKind::TemplateMarker));
        assert_eq!(keyword_kind("u"), Some(TokenKind::UserRole));
        assert_eq!(keyword_kind("search"), None);
        // Keywords are case-sensitive.
        assert_eq!(keyword_kind("Server"), None);
        assert_eq!(keyword_kind("rt"), None);
    }

    #[test]
    fn test_name_like_kinds() {
        assert!(TokenKind::Identifier.is_name_like());
        assert!(TokenKind::ErrorMarker.is_name_like());
        assert!(TokenKind::StrType.is_name_like());
        assert!(!TokenKind::True.is_name_like());
        assert!(!TokenKind::LeftBrace.is_name_like());
    }
}
