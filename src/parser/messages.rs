//! Message productions: request, response, notification, error.

use super::Parser;
use crate::ast::{ErrorMessage, Notification, ObjectContext, ObjectNode, Request, Response};
use crate::diagnostics::Diagnostic;
use crate::tokenizer::TokenKind;

impl Parser {
    /// `'>' method '#' INT params?`
    pub(crate) fn parse_request(&mut self) -> Result<Request, Diagnostic> {
        let start = self.cursor.advance().span; // '>'
        let (method, _) = self.expect_method("a method name after '>'")?;
        self.cursor
            .expect(TokenKind::Hash, "'#' before the message id")?;
        let (id, id_span) = self.expect_message_id()?;
        let params = self.maybe_params()?;

        let end = params.as_ref().map(|p| p.span).unwrap_or(id_span);
        Ok(Request {
            method,
            id,
            params,
            span: start.merge(&end),
        })
    }

    /// `'<' '#' INT value?`
    pub(crate) fn parse_response(&mut self) -> Result<Response, Diagnostic> {
        let start = self.cursor.advance().span; // '<'
        self.cursor
            .expect(TokenKind::Hash, "'#' before the message id")?;
        let (id, id_span) = self.expect_message_id()?;

        let result = if self.at_line_end() {
            None
        } else {
            Some(self.with_anchor(start.start.column, |p| {
                p.parse_value_in(ObjectContext::ResponseResult)
            })?)
        };

        let end = result.as_ref().map(|v| v.span()).unwrap_or(id_span);
        Ok(Response {
            id,
            result,
            span: start.merge(&end),
        })
    }

    /// `'!' method params?`
    pub(crate) fn parse_notification(&mut self) -> Result<Notification, Diagnostic> {
        let start = self.cursor.advance().span; // '!'
        let (method, method_span) = self.expect_method("a method name after '!'")?;
        let params = self.maybe_params()?;

        let end = params.as_ref().map(|p| p.span).unwrap_or(method_span);
        Ok(Notification {
            method,
            params,
            span: start.merge(&end),
        })
    }

    /// `'x' '#' INT [-] INT ':' (STRING|ID) value?`
    ///
    /// The code's sign usually arrives merged into the integer literal;
    /// a free-standing `-` token is recombined here.
    pub(crate) fn parse_error_message(&mut self) -> Result<ErrorMessage, Diagnostic> {
        let start = self.cursor.advance().span; // 'x'
        self.cursor
            .expect(TokenKind::Hash, "'#' before the message id")?;
        let (id, _) = self.expect_message_id()?;

        let negated = self.cursor.advance_if(TokenKind::Minus);
        let code_token = self.cursor.current().clone();
        if code_token.kind != TokenKind::Integer {
            return Err(Diagnostic::error(
                format!("expected an error code, found {:?}", code_token.kind),
                code_token.span,
            )
            .with_code("P0004"));
        }
        self.cursor.advance();
        let mut code = code_token.int_value().unwrap_or(0);
        if negated {
            code = -code;
        }

        self.cursor
            .expect(TokenKind::Colon, "':' between error code and message")?;

        let message_token = self.cursor.current().clone();
        let (message, message_span) = match message_token.kind {
            TokenKind::Str => {
                let token = self.cursor.advance();
                (token.str_value().unwrap_or_default().to_string(), token.span)
            }
            kind if kind.is_name_like() => {
                let token = self.cursor.advance();
                (token.lexeme, token.span)
            }
            other => {
                return Err(Diagnostic::error(
                    format!("expected an error message, found {:?}", other),
                    message_token.span,
                )
                .with_code("P0004"));
            }
        };

        let data = if self.at_line_end() {
            None
        } else {
            Some(self.with_anchor(start.start.column, |p| {
                p.parse_value_in(ObjectContext::ErrorData)
            })?)
        };

        let end = data.as_ref().map(|v| v.span()).unwrap_or(message_span);
        Ok(ErrorMessage {
            id,
            code,
            message,
            data,
            span: start.merge(&end),
        })
    }

    fn maybe_params(&mut self) -> Result<Option<ObjectNode>, Diagnostic> {
        if self.cursor.check(TokenKind::LeftBrace) {
            Ok(Some(self.parse_object(ObjectContext::RequestParams)?))
        } else {
            Ok(None)
        }
    }
}
