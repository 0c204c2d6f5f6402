//! Type expression productions.
//!
//! Precedence, tightest first: parentheses, cast `::` (left-assoc),
//! union `|` (left-assoc), postfix `!`/`?`.

use super::Parser;
use crate::ast::{FieldDef, FieldModifier, PrimitiveKind, TypeExpr};
use crate::diagnostics::Diagnostic;
use crate::tokenizer::TokenKind;

impl Parser {
    /// `cast ('|' cast)*`
    pub(crate) fn parse_type_expr(&mut self) -> Result<TypeExpr, Diagnostic> {
        let first = self.parse_cast_type()?;
        if !self.cursor.check(TokenKind::Pipe) {
            return Ok(first);
        }

        let mut span = first.span();
        let mut types = vec![first];
        while self.cursor.advance_if(TokenKind::Pipe) {
            let next = self.parse_cast_type()?;
            span = span.merge(&next.span());
            types.push(next);
        }
        Ok(TypeExpr::Union { types, span })
    }

    /// `primary_type ('::' ID)*`
    fn parse_cast_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        let base = self.parse_primary_type()?;
        if !self.cursor.check(TokenKind::DoubleColon) {
            return Ok(base);
        }

        let mut span = base.span();
        let mut casts = Vec::new();
        while self.cursor.advance_if(TokenKind::DoubleColon) {
            let (name, cast_span) = self.expect_cast_name()?;
            span = span.merge(&cast_span);
            casts.push(name);
        }
        Ok(TypeExpr::Cast {
            base: Box::new(base),
            casts,
            span,
        })
    }

    /// `base_type ('!'|'?')?`
    fn parse_primary_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        let base = self.parse_base_type()?;

        let modifier = if self.cursor.check(TokenKind::Bang) {
            Some(FieldModifier::Required)
        } else if self.cursor.check(TokenKind::Question) {
            Some(FieldModifier::Optional)
        } else {
            None
        };

        if let Some(modifier) = modifier {
            let marker = self.cursor.advance();
            let span = base.span().merge(&marker.span);
            return Ok(TypeExpr::Modified {
                base: Box::new(base),
                modifier,
                span,
            });
        }
        Ok(base)
    }

    fn parse_base_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        let token = self.cursor.current().clone();
        match token.kind {
            TokenKind::StrType
            | TokenKind::IntType
            | TokenKind::NumType
            | TokenKind::BoolType
            | TokenKind::UriType
            | TokenKind::BlobType => {
                let token = self.cursor.advance();
                let kind = match token.kind {
                    TokenKind::StrType => PrimitiveKind::Str,
                    TokenKind::IntType => PrimitiveKind::Int,
                    TokenKind::NumType => PrimitiveKind::Num,
                    TokenKind::BoolType => PrimitiveKind::Bool,
                    TokenKind::UriType => PrimitiveKind::Uri,
                    _ => PrimitiveKind::Blob,
                };
                Ok(TypeExpr::Primitive {
                    kind,
                    span: token.span,
                })
            }
            TokenKind::LeftBracket => {
                let open = self.cursor.advance();
                if self.cursor.check(TokenKind::RightBracket) {
                    let close = self.cursor.advance();
                    return Ok(TypeExpr::Array {
                        elem: None,
                        span: open.span.merge(&close.span),
                    });
                }
                let elem = self.parse_type_expr()?;
                let close = self
                    .cursor
                    .expect(TokenKind::RightBracket, "']' to close the array type")?;
                Ok(TypeExpr::Array {
                    elem: Some(Box::new(elem)),
                    span: open.span.merge(&close.span),
                })
            }
            TokenKind::LeftBrace => self.parse_object_type(),
            TokenKind::Enum => {
                let keyword = self.cursor.advance();
                self.cursor
                    .expect(TokenKind::LeftBracket, "'[' after 'enum'")?;
                let mut values = Vec::new();
                loop {
                    self.skip_separators();
                    if self.cursor.check(TokenKind::RightBracket) || self.cursor.at_end() {
                        break;
                    }
                    let (name, _) = self.expect_name("an enum value")?;
                    values.push(name);
                    self.skip_separators();
                    self.cursor.advance_if(TokenKind::Comma);
                }
                let close = self
                    .cursor
                    .expect(TokenKind::RightBracket, "']' to close the enum")?;
                Ok(TypeExpr::Enum {
                    values,
                    span: keyword.span.merge(&close.span),
                })
            }
            TokenKind::LeftParen => {
                self.cursor.advance();
                let inner = self.parse_type_expr()?;
                self.cursor
                    .expect(TokenKind::RightParen, "')' to close the type group")?;
                Ok(inner)
            }
            kind if kind.is_name_like() => {
                let token = self.cursor.advance();
                Ok(TypeExpr::Reference {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            other => Err(Diagnostic::error(
                format!("expected a type, found {:?}", other),
                token.span,
            )
            .with_code("P0001")),
        }
    }

    /// `'{' (field (','|NEWLINE)?)* '}'` where each field is
    /// `name ('!'|'?')? ':' type_expr`.
    fn parse_object_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        let open = self.cursor.advance(); // '{'
        let mut fields = Vec::new();

        loop {
            self.skip_separators();
            if self.cursor.check(TokenKind::RightBrace) || self.cursor.at_end() {
                break;
            }
            let (name, name_span) = self.expect_name("a field name")?;
            let modifier = if self.cursor.advance_if(TokenKind::Bang) {
                Some(FieldModifier::Required)
            } else if self.cursor.advance_if(TokenKind::Question) {
                Some(FieldModifier::Optional)
            } else {
                None
            };
            self.cursor
                .expect(TokenKind::Colon, "':' after the field name")?;
            let ty = self.parse_type_expr()?;
            let span = name_span.merge(&ty.span());
            fields.push(FieldDef {
                name,
                modifier,
                ty,
                span,
            });

            self.skip_separators();
            self.cursor.advance_if(TokenKind::Comma);
        }

        let close = self
            .cursor
            .expect(TokenKind::RightBrace, "'}' to close the object type")?;
        Ok(TypeExpr::Object {
            fields,
            span: open.span.merge(&close.span),
        })
    }
}
