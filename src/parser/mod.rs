//! Phase 2: recursive-descent parsing.
//!
//! Builds the typed AST from the token stream. The grammar is LL(k)
//! with k ≤ 4: a handful of dispatch points (`T name {` vs `T[]` vs
//! `T { id }` vs `T { id : … }`) are settled with `peek_sequence`;
//! `mark`/`reset` backtracking stays in reserve for the cursor but the
//! productions here are all predictive.
//!
//! Errors are accumulated, not thrown. A failed top-level construct
//! reports one diagnostic and recovery scans forward to the next
//! top-level starter (`>`, `<`, `!`, `x`, `R`, `T`, `P`, `RT`,
//! `server`) at column zero, so one bad message does not hide the rest
//! of the document.
//!
//! Every object node receives its [`ObjectContext`] classifier here, at
//! construction: params/result/data by message position, definition
//! bodies by definition kind, `caps`-keyed values as capability sets,
//! and everything else as general values.
//!
//! The parser also drives multiline-string capture. Termination of a
//! `|` block depends on the column of the field that opened it, which
//! only the parser knows (from the field-name token's span); that
//! column is tracked as the current *anchor* and handed to the lexer's
//! capture primitive whenever a `|` opener turns up in value position.
//! This is why [`parse_source`] — where the cursor runs a live lexer —
//! is the primary entry; [`parse`] over a pre-lexed vector accepts the
//! blocks the batch tokenizer already captured.

mod definitions;
mod messages;
mod types;
mod values;

use crate::ast::{Document, DocumentItem, Message};
use crate::diagnostics::Diagnostic;
use crate::span::SourceSpan;
use crate::tokenizer::{Lexer, Token, TokenCursor, TokenKind};

/// Parse a pre-lexed token stream into a document plus accumulated
/// diagnostics.
pub fn parse(tokens: Vec<Token>) -> (Document, Vec<Diagnostic>) {
    Parser::new(tokens).parse_document()
}

/// Parse source text, driving the lexer directly. Lexical and
/// syntactic diagnostics come back merged in source-position order.
pub fn parse_source(source: &str) -> (Document, Vec<Diagnostic>) {
    Parser::from_source(source).parse_document()
}

pub struct Parser {
    cursor: TokenCursor,
    diagnostics: Vec<Diagnostic>,
    /// Column of the innermost field (or message/role marker) whose
    /// value is being parsed; a `|` block terminates at or left of it.
    anchor_col: usize,
}

const TOP_LEVEL_STARTERS: &[TokenKind] = &[
    TokenKind::RequestMarker,
    TokenKind::ResponseMarker,
    TokenKind::Bang,
    TokenKind::ErrorMarker,
    TokenKind::ResourceMarker,
    TokenKind::ToolMarker,
    TokenKind::PromptMarker,
    TokenKind::TemplateMarker,
    TokenKind::Server,
];

const SEPARATORS: &[TokenKind] = &[
    TokenKind::Newline,
    TokenKind::Comment,
    TokenKind::Indent,
    TokenKind::Dedent,
];

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            diagnostics: Vec::new(),
            anchor_col: 0,
        }
    }

    pub fn from_source(source: &str) -> Self {
        Self {
            cursor: TokenCursor::from_lexer(Lexer::new(source)),
            diagnostics: Vec::new(),
            anchor_col: 0,
        }
    }

    pub fn parse_document(mut self) -> (Document, Vec<Diagnostic>) {
        let start = self.cursor.current().span;
        let mut body = Vec::new();

        loop {
            self.skip_separators();
            if self.cursor.at_end() {
                break;
            }
            match self.parse_document_item() {
                Ok(item) => body.push(item),
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    self.synchronize();
                }
            }
        }

        let end = self.cursor.current().span;
        let document = Document {
            body,
            span: start.merge(&end),
        };

        let mut diagnostics = self.cursor.take_diagnostics();
        diagnostics.append(&mut self.diagnostics);
        diagnostics.sort_by_key(|d| d.span.start.offset);
        (document, diagnostics)
    }

    fn parse_document_item(&mut self) -> Result<DocumentItem, Diagnostic> {
        match self.cursor.current().kind {
            TokenKind::RequestMarker => Ok(DocumentItem::Message(Message::Request(
                self.parse_request()?,
            ))),
            TokenKind::ResponseMarker => Ok(DocumentItem::Message(Message::Response(
                self.parse_response()?,
            ))),
            TokenKind::Bang => Ok(DocumentItem::Message(Message::Notification(
                self.parse_notification()?,
            ))),
            TokenKind::ErrorMarker => Ok(DocumentItem::Message(Message::Error(
                self.parse_error_message()?,
            ))),
            TokenKind::Server => Ok(DocumentItem::Server(self.parse_server_block()?)),
            TokenKind::ResourceMarker
            | TokenKind::ToolMarker
            | TokenKind::PromptMarker
            | TokenKind::TemplateMarker => {
                Ok(DocumentItem::Definition(self.parse_definition_item()?))
            }
            _ => {
                let token = self.cursor.current();
                Err(Diagnostic::error(
                    format!(
                        "expected a message, definition, or server block, found {:?}",
                        token.kind
                    ),
                    token.span,
                )
                .with_code("P0006"))
            }
        }
    }

    /// Statement-level recovery: scan forward to the next line that
    /// begins with a top-level starter in column zero.
    fn synchronize(&mut self) {
        while !self.cursor.at_end() {
            if self.cursor.check(TokenKind::Newline) {
                self.cursor.advance();
                self.cursor
                    .skip(&[TokenKind::Comment, TokenKind::Indent, TokenKind::Dedent]);
                let token = self.cursor.current();
                if TOP_LEVEL_STARTERS.contains(&token.kind) && token.span.start.column == 0 {
                    return;
                }
            } else {
                self.cursor.advance();
            }
        }
    }

    // Shared small helpers

    pub(crate) fn skip_separators(&mut self) {
        self.cursor.skip(SEPARATORS);
    }

    /// Run `f` with the anchor column set to `col`, restoring the
    /// previous anchor on every exit path.
    pub(crate) fn with_anchor<T>(
        &mut self,
        col: usize,
        f: impl FnOnce(&mut Self) -> Result<T, Diagnostic>,
    ) -> Result<T, Diagnostic> {
        let previous = self.anchor_col;
        self.anchor_col = col;
        let result = f(self);
        self.anchor_col = previous;
        result
    }

    /// Consume a bare name. Keywords are fine: `res`, `u`, or `x` are
    /// ordinary names outside their special positions.
    pub(crate) fn expect_name(&mut self, what: &str) -> Result<(String, SourceSpan), Diagnostic> {
        if self.cursor.current().kind.is_name_like() {
            let token = self.cursor.advance();
            Ok((token.lexeme, token.span))
        } else {
            let token = self.cursor.current();
            Err(Diagnostic::error(
                format!("expected {}, found {:?}", what, token.kind),
                token.span,
            )
            .with_code("P0001"))
        }
    }

    /// Consume a method name: a slash path or a bare name.
    pub(crate) fn expect_method(&mut self, what: &str) -> Result<(String, SourceSpan), Diagnostic> {
        let kind = self.cursor.current().kind;
        if kind == TokenKind::MethodPath || kind.is_name_like() {
            let token = self.cursor.advance();
            Ok((token.lexeme, token.span))
        } else {
            let token = self.cursor.current();
            Err(Diagnostic::error(
                format!("expected {}, found {:?}", what, token.kind),
                token.span,
            )
            .with_code("P0001"))
        }
    }

    /// Consume an integer message id.
    pub(crate) fn expect_message_id(&mut self) -> Result<(i64, SourceSpan), Diagnostic> {
        if self.cursor.check(TokenKind::Integer) {
            let token = self.cursor.advance();
            Ok((token.int_value().unwrap_or(0), token.span))
        } else {
            let token = self.cursor.current();
            Err(
                Diagnostic::error(
                    format!("expected an integer message id after '#', found {:?}", token.kind),
                    token.span,
                )
                .with_code("P0003"),
            )
        }
    }

    /// Cast names may be hyphenated (`date-time`); the lexer splits
    /// those into name/minus/name runs, recombined here when the
    /// pieces are strictly adjacent in the source.
    pub(crate) fn expect_cast_name(&mut self) -> Result<(String, SourceSpan), Diagnostic> {
        let (mut name, mut span) = self.expect_name("a cast name after '::'")?;
        loop {
            if !self.cursor.check(TokenKind::Minus) {
                break;
            }
            let minus_span = self.cursor.current().span;
            if minus_span.start.offset != span.end.offset {
                break;
            }
            let next_kind = self.cursor.peek(1).kind;
            let next_start = self.cursor.peek(1).span.start.offset;
            if !next_kind.is_name_like() || next_start != minus_span.end.offset {
                break;
            }
            self.cursor.advance(); // '-'
            let (part, part_span) = self.expect_name("a cast name after '-'")?;
            name.push('-');
            name.push_str(&part);
            span = span.merge(&part_span);
        }
        Ok((name, span))
    }

    /// True when a line break or end of input terminates the current
    /// construct.
    pub(crate) fn at_line_end(&mut self) -> bool {
        self.cursor.check_any(&[
            TokenKind::Newline,
            TokenKind::Eof,
            TokenKind::Dedent,
            TokenKind::Comment,
        ])
    }
}
