//! Definition, collection, and server-block productions.

use super::Parser;
use crate::ast::{
    CollectionDef, Definition, DefinitionItem, DefinitionKind, NamedBlock, NamedBlockValue,
    ObjectContext, ServerBlock, Version,
};
use crate::diagnostics::Diagnostic;
use crate::span::SourceSpan;
use crate::tokenizer::TokenKind;

impl Parser {
    /// Dispatch after an `R`/`T`/`P`/`RT` marker: single definition,
    /// `[]` collection, or anonymous collection block.
    pub(crate) fn parse_definition_item(&mut self) -> Result<DefinitionItem, Diagnostic> {
        let marker = self.cursor.advance();
        let kind = match marker.kind {
            TokenKind::ResourceMarker => DefinitionKind::Resource,
            TokenKind::ToolMarker => DefinitionKind::Tool,
            TokenKind::PromptMarker => DefinitionKind::Prompt,
            _ => DefinitionKind::ResourceTemplate,
        };

        // `X[] …`
        if self
            .cursor
            .peek_sequence(&[TokenKind::LeftBracket, TokenKind::RightBracket])
        {
            self.cursor.advance();
            self.cursor.advance();

            if self.cursor.check(TokenKind::LeftBrace) {
                let (items, end) = self.parse_named_blocks()?;
                return Ok(DefinitionItem::Collection(CollectionDef {
                    kind,
                    items,
                    span: marker.span.merge(&end),
                }));
            }

            // `X[] name { … }` — a one-item collection.
            let (name, _) = self.expect_name("a definition name after '[]'")?;
            let body = self.parse_object(ObjectContext::DefinitionBlock)?;
            let span = marker.span.merge(&body.span);
            let item_span = body.span;
            return Ok(DefinitionItem::Collection(CollectionDef {
                kind,
                items: vec![NamedBlock {
                    name,
                    value: NamedBlockValue::Object(body),
                    span: item_span,
                }],
                span,
            }));
        }

        // `X { id : … }` — an anonymous collection block.
        if self.cursor.check(TokenKind::LeftBrace) {
            let (items, end) = self.parse_named_blocks()?;
            return Ok(DefinitionItem::Collection(CollectionDef {
                kind,
                items,
                span: marker.span.merge(&end),
            }));
        }

        // `X name { … }`
        let (name, _) = self.expect_name("a definition name")?;
        let body = self.parse_object(ObjectContext::DefinitionBlock)?;
        let span = marker.span.merge(&body.span);
        Ok(DefinitionItem::Single(Definition {
            kind,
            name,
            body,
            span,
        }))
    }

    /// `'{' named_block (',' named_block)* '}'`
    fn parse_named_blocks(&mut self) -> Result<(Vec<NamedBlock>, SourceSpan), Diagnostic> {
        self.cursor
            .expect(TokenKind::LeftBrace, "'{' to open the collection")?;
        let mut items = Vec::new();

        loop {
            self.skip_separators();
            if self.cursor.check(TokenKind::RightBrace) || self.cursor.at_end() {
                break;
            }
            let (name, name_span) = self.expect_name("a collection entry name")?;
            self.cursor
                .expect(TokenKind::Colon, "':' after the entry name")?;

            let value = match self.cursor.current().kind {
                TokenKind::LeftBrace => {
                    NamedBlockValue::Object(self.parse_object(ObjectContext::DefinitionBlock)?)
                }
                TokenKind::Str | TokenKind::MultilineStr => {
                    let token = self.cursor.advance();
                    NamedBlockValue::Str(token.str_value().unwrap_or_default().to_string())
                }
                _ => NamedBlockValue::Type(self.parse_type_expr()?),
            };

            let end = match &value {
                NamedBlockValue::Object(o) => o.span,
                NamedBlockValue::Type(t) => t.span(),
                NamedBlockValue::Str(_) => name_span,
            };
            items.push(NamedBlock {
                name,
                value,
                span: name_span.merge(&end),
            });

            self.skip_separators();
            self.cursor.advance_if(TokenKind::Comma);
        }

        let close = self
            .cursor
            .expect(TokenKind::RightBrace, "'}' to close the collection")?;
        Ok((items, close.span))
    }

    /// `'server' ID version? object`
    pub(crate) fn parse_server_block(&mut self) -> Result<ServerBlock, Diagnostic> {
        let keyword = self.cursor.advance(); // 'server'
        let (name, _) = self.expect_name("a server name")?;

        let version = if self.at_version_literal() {
            Some(self.parse_version()?)
        } else {
            None
        };

        let body = self.parse_object(ObjectContext::DefinitionBlock)?;
        let span = keyword.span.merge(&body.span);
        Ok(ServerBlock {
            name,
            version,
            body,
            span,
        })
    }

    fn at_version_literal(&mut self) -> bool {
        let token = self.cursor.current().clone();
        token.kind == TokenKind::Identifier
            && token.lexeme.len() > 1
            && token.lexeme.starts_with('v')
            && token.lexeme[1..].chars().all(|c| c.is_ascii_digit())
            && self.cursor.peek(1).kind == TokenKind::Dot
    }

    /// `'v' INT '.' INT '.' INT` — the lexer hands this over as an
    /// identifier (`v1`), a dot, and either a decimal (`2.3`) or two
    /// dotted integers; recombine whichever arrived.
    fn parse_version(&mut self) -> Result<Version, Diagnostic> {
        let head = self.cursor.advance(); // `v<major>`
        let invalid = |span| {
            Diagnostic::error("invalid version: expected the form vX.Y.Z", span)
                .with_code("P0005")
        };

        let major = head.lexeme[1..]
            .parse::<i64>()
            .map_err(|_| invalid(head.span))?;
        self.cursor.expect(TokenKind::Dot, "'.' in the version")?;

        let tail = self.cursor.current().clone();
        let (minor, patch, end) = match tail.kind {
            TokenKind::Decimal => {
                self.cursor.advance();
                let mut parts = tail.lexeme.splitn(2, '.');
                let minor = parts
                    .next()
                    .and_then(|p| p.parse::<i64>().ok())
                    .ok_or_else(|| invalid(tail.span))?;
                let patch = parts
                    .next()
                    .and_then(|p| p.parse::<i64>().ok())
                    .ok_or_else(|| invalid(tail.span))?;
                (minor, patch, tail.span)
            }
            TokenKind::Integer => {
                self.cursor.advance();
                let minor = tail.int_value().unwrap_or(0);
                self.cursor.expect(TokenKind::Dot, "'.' in the version")?;
                let patch_token = self
                    .cursor
                    .expect(TokenKind::Integer, "the patch number")?;
                let patch = patch_token.int_value().unwrap_or(0);
                (minor, patch, patch_token.span)
            }
            _ => return Err(invalid(tail.span)),
        };

        Ok(Version {
            major,
            minor,
            patch,
            span: head.span.merge(&end),
        })
    }
}
