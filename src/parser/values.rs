//! Value, object, content, and role-message productions.
//!
//! The overloaded single-character tokens get their meaning here, by
//! position: `|` after `txt` was already folded into a multiline token
//! by the lexer, `!`/`?` after a field name are requiredness modifiers,
//! `T {` in value position is a tool reference while the same tokens at
//! property level open a nested definition.

use super::Parser;
use crate::ast::{
    AnnotationArgs, AnnotationProp, Capability, CompositeContent, Content, FieldAssignment,
    FieldModifier, ObjectContext, ObjectNode, Role, RoleMessage, Value,
};
use crate::diagnostics::Diagnostic;
use crate::tokenizer::{TokenKind, TokenValue};

impl Parser {
    pub(crate) fn parse_value(&mut self) -> Result<Value, Diagnostic> {
        self.parse_value_in(ObjectContext::GeneralValue)
    }

    /// Parse a value; an object in direct position takes `ctx` as its
    /// classifier (message position or `caps` keying decides it).
    pub(crate) fn parse_value_in(&mut self, ctx: ObjectContext) -> Result<Value, Diagnostic> {
        let primary = self.parse_primary(ctx)?;

        if self.cursor.check(TokenKind::DoubleColon) {
            let mut casts = Vec::new();
            let mut end = primary.span();
            while self.cursor.advance_if(TokenKind::DoubleColon) {
                let (name, span) = self.expect_cast_name()?;
                casts.push(name);
                end = span;
            }
            let span = primary.span().merge(&end);
            return Ok(Value::Cast {
                value: Box::new(primary),
                casts,
                span,
            });
        }

        Ok(primary)
    }

    fn parse_primary(&mut self, ctx: ObjectContext) -> Result<Value, Diagnostic> {
        let token = self.cursor.current().clone();
        match token.kind {
            TokenKind::Str => {
                let token = self.cursor.advance();
                Ok(Value::Str {
                    value: token.str_value().unwrap_or_default().to_string(),
                    multiline: false,
                    span: token.span,
                })
            }
            TokenKind::MultilineStr => {
                let token = self.cursor.advance();
                Ok(Value::Str {
                    value: token.str_value().unwrap_or_default().to_string(),
                    multiline: true,
                    span: token.span,
                })
            }
            TokenKind::Integer => {
                let token = self.cursor.advance();
                Ok(Value::Int {
                    value: token.int_value().unwrap_or(0),
                    span: token.span,
                })
            }
            TokenKind::Decimal => {
                let token = self.cursor.advance();
                let value = match token.value {
                    Some(TokenValue::Dec(d)) => d,
                    _ => 0.0,
                };
                Ok(Value::Dec {
                    value,
                    span: token.span,
                })
            }
            TokenKind::True | TokenKind::False => {
                let token = self.cursor.advance();
                Ok(Value::Bool {
                    value: token.kind == TokenKind::True,
                    span: token.span,
                })
            }
            TokenKind::Null => {
                let token = self.cursor.advance();
                Ok(Value::Null { span: token.span })
            }
            TokenKind::Pipe => {
                // A `|` opener: capture the block, terminated by the
                // column of the field under parse.
                match self.cursor.capture_multiline(self.anchor_col) {
                    Some(block) => Ok(Value::Str {
                        value: block.str_value().unwrap_or_default().to_string(),
                        multiline: true,
                        span: block.span,
                    }),
                    None => Err(Diagnostic::error(
                        "expected a value, found '|'",
                        token.span,
                    )
                    .with_code("P0001")),
                }
            }
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::LeftBrace => Ok(Value::Object(self.parse_object(ctx)?)),
            TokenKind::At => Ok(Value::Annotation(self.parse_annotation_prop()?)),
            TokenKind::TxtMarker | TokenKind::ImgMarker | TokenKind::AudMarker => {
                Ok(Value::Content(self.parse_content()?))
            }
            TokenKind::ResMarker | TokenKind::EmbMarker => {
                if self.cursor.peek(1).kind == TokenKind::LeftBrace {
                    Ok(Value::Content(self.parse_content()?))
                } else {
                    let token = self.cursor.advance();
                    Ok(Value::Ident {
                        name: token.lexeme,
                        span: token.span,
                    })
                }
            }
            TokenKind::ToolMarker => {
                // `T { id }` is a tool reference; four tokens decide it.
                if self.cursor.peek(1).kind == TokenKind::LeftBrace
                    && self.cursor.peek(2).kind.is_name_like()
                    && self.cursor.peek(3).kind == TokenKind::RightBrace
                {
                    Ok(Value::Content(self.parse_content()?))
                } else {
                    let token = self.cursor.advance();
                    Ok(Value::Ident {
                        name: token.lexeme,
                        span: token.span,
                    })
                }
            }
            TokenKind::UserRole | TokenKind::AssistantRole | TokenKind::SystemRole => {
                if self.cursor.peek(1).kind == TokenKind::Colon {
                    Ok(Value::Role(self.parse_role_message()?))
                } else {
                    let token = self.cursor.advance();
                    Ok(Value::Ident {
                        name: token.lexeme,
                        span: token.span,
                    })
                }
            }
            kind if kind.is_name_like() => {
                let token = self.cursor.advance();
                Ok(Value::Ident {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            other => Err(Diagnostic::error(
                format!("expected a value, found {:?}", other),
                token.span,
            )
            .with_code("P0001")),
        }
    }

    /// Content literals. Callers have already checked the leading token
    /// makes sense here.
    pub(crate) fn parse_content(&mut self) -> Result<Content, Diagnostic> {
        let token = self.cursor.current().clone();
        match token.kind {
            TokenKind::TxtMarker => {
                let start = self.cursor.advance().span;
                let body = self.cursor.current().clone();
                match body.kind {
                    TokenKind::Str => {
                        let body = self.cursor.advance();
                        Ok(Content::Text {
                            content: body.str_value().unwrap_or_default().to_string(),
                            multiline: false,
                            span: start.merge(&body.span),
                        })
                    }
                    TokenKind::MultilineStr => {
                        let body = self.cursor.advance();
                        Ok(Content::Text {
                            content: body.str_value().unwrap_or_default().to_string(),
                            multiline: true,
                            span: start.merge(&body.span),
                        })
                    }
                    TokenKind::Pipe => match self.cursor.capture_multiline(self.anchor_col) {
                        Some(block) => Ok(Content::Text {
                            content: block.str_value().unwrap_or_default().to_string(),
                            multiline: true,
                            span: start.merge(&block.span),
                        }),
                        None => Err(Diagnostic::error(
                            "expected a string after 'txt', found '|'",
                            body.span,
                        )
                        .with_code("P0001")),
                    },
                    other => Err(Diagnostic::error(
                        format!("expected a string after 'txt', found {:?}", other),
                        body.span,
                    )
                    .with_code("P0001")),
                }
            }
            TokenKind::ImgMarker | TokenKind::AudMarker => {
                let is_image = token.kind == TokenKind::ImgMarker;
                let start = self.cursor.advance().span;
                let data_token = self
                    .cursor
                    .expect(TokenKind::Str, "a data string after the content marker")?;
                let data = data_token.str_value().unwrap_or_default().to_string();
                let mut end = data_token.span;
                let format = if self.cursor.advance_if(TokenKind::DoubleColon) {
                    let (name, span) = self.expect_cast_name()?;
                    end = span;
                    Some(name)
                } else {
                    None
                };
                let span = start.merge(&end);
                Ok(if is_image {
                    Content::Image { data, format, span }
                } else {
                    Content::Audio { data, format, span }
                })
            }
            TokenKind::ResMarker | TokenKind::ToolMarker => {
                let is_resource = token.kind == TokenKind::ResMarker;
                let start = self.cursor.advance().span;
                self.cursor
                    .expect(TokenKind::LeftBrace, "'{' after the reference marker")?;
                let (name, _) = self.expect_name("a referenced name")?;
                let close = self
                    .cursor
                    .expect(TokenKind::RightBrace, "'}' to close the reference")?;
                let span = start.merge(&close.span);
                Ok(if is_resource {
                    Content::ResourceRef { name, span }
                } else {
                    Content::ToolRef { name, span }
                })
            }
            TokenKind::EmbMarker => {
                let start = self.cursor.advance().span;
                let body = self.parse_object(ObjectContext::GeneralValue)?;
                let span = start.merge(&body.span);
                Ok(Content::Embedded { body, span })
            }
            other => Err(Diagnostic::error(
                format!("expected content, found {:?}", other),
                token.span,
            )
            .with_code("P0001")),
        }
    }

    /// `('u'|'a'|'s') ':' (STRING | multiline | content ('+' content)*)`
    ///
    /// The role marker is the anchor for a multiline body: the block
    /// ends at the first line indented at or left of it.
    fn parse_role_message(&mut self) -> Result<RoleMessage, Diagnostic> {
        let role_token = self.cursor.advance();
        let role = match role_token.kind {
            TokenKind::UserRole => Role::User,
            TokenKind::AssistantRole => Role::Assistant,
            _ => Role::System,
        };
        self.cursor
            .expect(TokenKind::Colon, "':' after the role indicator")?;

        let content = self.with_anchor(role_token.span.start.column, |p| {
            let kind = p.cursor.current().kind;
            match kind {
                TokenKind::Str => {
                    let token = p.cursor.advance();
                    Ok(Value::Str {
                        value: token.str_value().unwrap_or_default().to_string(),
                        multiline: false,
                        span: token.span,
                    })
                }
                TokenKind::MultilineStr => {
                    let token = p.cursor.advance();
                    Ok(Value::Str {
                        value: token.str_value().unwrap_or_default().to_string(),
                        multiline: true,
                        span: token.span,
                    })
                }
                TokenKind::Pipe => {
                    let pipe_span = p.cursor.current().span;
                    match p.cursor.capture_multiline(p.anchor_col) {
                        Some(block) => Ok(Value::Str {
                            value: block.str_value().unwrap_or_default().to_string(),
                            multiline: true,
                            span: block.span,
                        }),
                        None => Err(Diagnostic::error(
                            "expected role message content, found '|'",
                            pipe_span,
                        )
                        .with_code("P0001")),
                    }
                }
                TokenKind::TxtMarker
                | TokenKind::ImgMarker
                | TokenKind::AudMarker
                | TokenKind::ResMarker
                | TokenKind::ToolMarker
                | TokenKind::EmbMarker => {
                    let first = p.parse_content()?;
                    if p.cursor.check(TokenKind::Plus) {
                        let mut span = first.span();
                        let mut parts = vec![first];
                        while p.cursor.advance_if(TokenKind::Plus) {
                            let part = p.parse_content()?;
                            span = span.merge(&part.span());
                            parts.push(part);
                        }
                        Ok(Value::Composite(CompositeContent { parts, span }))
                    } else {
                        Ok(Value::Content(first))
                    }
                }
                other => {
                    let token = p.cursor.current();
                    Err(Diagnostic::error(
                        format!("expected role message content, found {:?}", other),
                        token.span,
                    )
                    .with_code("P0001"))
                }
            }
        })?;

        let span = role_token.span.merge(&content.span());
        Ok(RoleMessage {
            role,
            content: Box::new(content),
            span,
        })
    }

    /// `'[' (value (','|NEWLINE)?)* ']'`
    fn parse_array(&mut self) -> Result<Value, Diagnostic> {
        let open = self.cursor.advance(); // '['
        let mut items = Vec::new();

        loop {
            self.skip_separators();
            if self.cursor.check(TokenKind::RightBracket) || self.cursor.at_end() {
                break;
            }
            items.push(self.parse_value()?);
            self.skip_separators();
            self.cursor.advance_if(TokenKind::Comma);
        }

        let close = self
            .cursor
            .expect(TokenKind::RightBracket, "']' to close the array")?;
        Ok(Value::Array {
            items,
            span: open.span.merge(&close.span),
        })
    }

    /// `'{' (property (','|NEWLINE)?)* '}'` with the given classifier.
    pub(crate) fn parse_object(&mut self, ctx: ObjectContext) -> Result<ObjectNode, Diagnostic> {
        let open = self.cursor.expect(TokenKind::LeftBrace, "'{'")?;
        let mut object = ObjectNode::new(ctx, open.span);

        loop {
            self.skip_separators();
            if self.cursor.check(TokenKind::RightBrace) || self.cursor.at_end() {
                break;
            }
            match self.parse_object_prop(ctx) {
                Ok(prop) => object.properties.push(prop),
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    self.recover_in_object();
                }
            }
            self.skip_separators();
            self.cursor.advance_if(TokenKind::Comma);
        }

        let close = self
            .cursor
            .expect(TokenKind::RightBrace, "'}' to close the object")?;
        object.span = open.span.merge(&close.span);
        Ok(object)
    }

    fn parse_object_prop(
        &mut self,
        ctx: ObjectContext,
    ) -> Result<crate::ast::ObjectProp, Diagnostic> {
        use crate::ast::ObjectProp;

        if self.cursor.check(TokenKind::At) {
            return Ok(ObjectProp::Annotation(self.parse_annotation_prop()?));
        }

        // Nested definitions: `T name { … }`, `T[] …`, `T { id : … }`.
        if self.at_nested_definition() {
            return Ok(ObjectProp::Definition(self.parse_definition_item()?));
        }

        // Capability entries: bare or dotted names, no colon in sight.
        if ctx == ObjectContext::CapabilitySet
            && self.cursor.current().kind.is_name_like()
            && !matches!(
                self.cursor.peek(1).kind,
                TokenKind::Colon | TokenKind::Bang | TokenKind::Question
            )
        {
            return Ok(ObjectProp::Capability(self.parse_capability()?));
        }

        Ok(ObjectProp::Field(self.parse_field_assignment(ctx)?))
    }

    fn at_nested_definition(&mut self) -> bool {
        let kind = self.cursor.current().kind;
        if !matches!(
            kind,
            TokenKind::ResourceMarker
                | TokenKind::ToolMarker
                | TokenKind::PromptMarker
                | TokenKind::TemplateMarker
        ) {
            return false;
        }
        // `X[] …` collection
        if self.cursor.peek(1).kind == TokenKind::LeftBracket
            && self.cursor.peek(2).kind == TokenKind::RightBracket
        {
            return true;
        }
        // `X name { … }` single definition
        if self.cursor.peek(1).kind.is_name_like()
            && self.cursor.peek(2).kind == TokenKind::LeftBrace
        {
            return true;
        }
        // `X { id : … }` anonymous collection (but `X { id }` is a
        // reference, handled in value position)
        if self.cursor.peek(1).kind == TokenKind::LeftBrace
            && self.cursor.peek(2).kind.is_name_like()
            && self.cursor.peek(3).kind == TokenKind::Colon
        {
            return true;
        }
        false
    }

    fn parse_capability(&mut self) -> Result<Capability, Diagnostic> {
        let (first, start) = self.expect_name("a capability name")?;
        let mut path = vec![first];
        let mut end = start;
        while self.cursor.advance_if(TokenKind::Dot) {
            let (segment, span) = self.expect_name("a capability segment after '.'")?;
            path.push(segment);
            end = span;
        }
        Ok(Capability {
            path,
            span: start.merge(&end),
        })
    }

    fn parse_field_assignment(
        &mut self,
        ctx: ObjectContext,
    ) -> Result<FieldAssignment, Diagnostic> {
        let (name, name_span) = self.expect_name("a property name")?;

        let modifier = if self.cursor.advance_if(TokenKind::Bang) {
            Some(FieldModifier::Required)
        } else if self.cursor.advance_if(TokenKind::Question) {
            Some(FieldModifier::Optional)
        } else {
            None
        };

        self.cursor
            .expect(TokenKind::Colon, "':' after the field name")?;

        // The field's own column anchors any multiline block in its
        // value: the block ends at the first line indented at or left
        // of the field name.
        let value = self.with_anchor(name_span.start.column, |p| {
            if p.field_takes_type(&name, ctx) && p.at_type_start() {
                p.parse_type_expr().map(Value::Type)
            } else {
                let child_ctx = if name == "caps" || name == "capabilities" {
                    ObjectContext::CapabilitySet
                } else {
                    ObjectContext::GeneralValue
                };
                p.parse_value_in(child_ctx)
            }
        })?;

        let span = name_span.merge(&value.span());
        Ok(FieldAssignment {
            name,
            modifier,
            value,
            span,
        })
    }

    /// Fields whose values are type expressions rather than data:
    /// `in`/`out` everywhere, `args` inside definition bodies (prompt
    /// argument declarations; in request params `args` carries data).
    fn field_takes_type(&self, name: &str, ctx: ObjectContext) -> bool {
        match name {
            "in" | "out" => true,
            "args" => ctx == ObjectContext::DefinitionBlock,
            _ => false,
        }
    }

    fn at_type_start(&mut self) -> bool {
        matches!(
            self.cursor.current().kind,
            TokenKind::StrType
                | TokenKind::IntType
                | TokenKind::NumType
                | TokenKind::BoolType
                | TokenKind::UriType
                | TokenKind::BlobType
                | TokenKind::LeftBrace
                | TokenKind::LeftBracket
                | TokenKind::LeftParen
                | TokenKind::Enum
                | TokenKind::Identifier
        )
    }

    /// `'@' ID (':' value | '(' value (',' value)* ')')?`
    pub(crate) fn parse_annotation_prop(&mut self) -> Result<AnnotationProp, Diagnostic> {
        let at = self.cursor.advance(); // '@'
        let (name, name_span) = self.expect_name("an annotation name after '@'")?;
        let mut end = name_span;

        let args = if self.cursor.advance_if(TokenKind::Colon) {
            let value =
                self.with_anchor(name_span.start.column, |p| p.parse_value())?;
            end = value.span();
            AnnotationArgs::Value(Box::new(value))
        } else if self.cursor.advance_if(TokenKind::LeftParen) {
            let mut values = Vec::new();
            loop {
                self.skip_separators();
                if self.cursor.check(TokenKind::RightParen) || self.cursor.at_end() {
                    break;
                }
                values.push(self.parse_value()?);
                self.skip_separators();
                self.cursor.advance_if(TokenKind::Comma);
            }
            let close = self
                .cursor
                .expect(TokenKind::RightParen, "')' to close the annotation arguments")?;
            end = close.span;
            AnnotationArgs::List(values)
        } else {
            AnnotationArgs::None
        };

        Ok(AnnotationProp {
            name,
            args,
            span: at.span.merge(&end),
        })
    }

    /// Skip to the next property boundary after a malformed property:
    /// past the next comma or newline at this nesting depth, or stop
    /// before the closing brace.
    fn recover_in_object(&mut self) {
        let mut depth = 0usize;
        while !self.cursor.at_end() {
            match self.cursor.current().kind {
                TokenKind::LeftBrace | TokenKind::LeftBracket => {
                    depth += 1;
                    self.cursor.advance();
                }
                // The enclosing object's close: stop in front of it.
                TokenKind::RightBrace if depth == 0 => return,
                TokenKind::RightBrace | TokenKind::RightBracket => {
                    if depth > 0 {
                        depth -= 1;
                    }
                    self.cursor.advance();
                }
                TokenKind::Comma | TokenKind::Newline if depth == 0 => {
                    self.cursor.advance();
                    return;
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}
