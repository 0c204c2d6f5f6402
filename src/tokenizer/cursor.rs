//! Buffered cursor over the token stream.
//!
//! The parser never touches tokens directly; it goes through this
//! view, which offers bounded lookahead (`peek`, `peek_sequence`),
//! conditional consumption (`advance_if`, `expect`), trivia skipping,
//! and mark/reset backtracking for the few ambiguity points the grammar
//! has. `current()` at end of input keeps returning the EOF sentinel,
//! so running off the end is never a panic.
//!
//! The cursor runs over either a pre-lexed token vector or a live
//! [`Lexer`]. In the live case tokens are pulled lazily, which is what
//! lets the parser drive multiline capture: on a `|` opener it calls
//! [`capture_multiline`](TokenCursor::capture_multiline) with the
//! column of the field that opened the block, and the lexer's capture
//! primitive takes over from exactly where scanning stopped.

use crate::diagnostics::Diagnostic;
use crate::span::SourceSpan;
use crate::tokenizer::lexer::Lexer;
use crate::tokenizer::tokens::{Token, TokenKind};

enum TokenSource {
    Fixed,
    Stream(Lexer),
}

pub struct TokenCursor {
    source: TokenSource,
    buffer: Vec<Token>,
    pos: usize,
    marks: Vec<usize>,
    eof: Token,
}

impl TokenCursor {
    /// A cursor over a pre-lexed token vector.
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Eof)
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", SourceSpan::default()));
        Self {
            source: TokenSource::Fixed,
            buffer: tokens,
            pos: 0,
            marks: Vec::new(),
            eof,
        }
    }

    /// A cursor that pulls tokens from a live lexer on demand.
    pub fn from_lexer(lexer: Lexer) -> Self {
        Self {
            source: TokenSource::Stream(lexer),
            buffer: Vec::new(),
            pos: 0,
            marks: Vec::new(),
            eof: Token::new(TokenKind::Eof, "", SourceSpan::default()),
        }
    }

    fn ensure(&mut self, upto: usize) {
        if let TokenSource::Stream(lexer) = &mut self.source {
            while self.buffer.len() <= upto {
                let token = lexer.next_token();
                let is_eof = token.kind == TokenKind::Eof;
                if is_eof {
                    self.eof = token.clone();
                }
                self.buffer.push(token);
                if is_eof {
                    break;
                }
            }
        }
    }

    /// The token under the cursor; the EOF sentinel once exhausted.
    pub fn current(&mut self) -> &Token {
        self.ensure(self.pos);
        self.buffer.get(self.pos).unwrap_or(&self.eof)
    }

    /// Look `k` tokens past the cursor; `peek(0)` is `current()`.
    pub fn peek(&mut self, k: usize) -> &Token {
        self.ensure(self.pos + k);
        self.buffer.get(self.pos + k).unwrap_or(&self.eof)
    }

    /// True when the next tokens match `kinds` exactly, in order.
    pub fn peek_sequence(&mut self, kinds: &[TokenKind]) -> bool {
        for (k, kind) in kinds.iter().enumerate() {
            if self.peek(k).kind != *kind {
                return false;
            }
        }
        true
    }

    pub fn check(&mut self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub fn check_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current().kind)
    }

    /// Consume and return the current token.
    pub fn advance(&mut self) -> Token {
        self.ensure(self.pos);
        let token = self
            .buffer
            .get(self.pos)
            .cloned()
            .unwrap_or_else(|| self.eof.clone());
        if self.pos < self.buffer.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token only if it has the given kind.
    pub fn advance_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or report what was found.
    /// The cursor does not move on failure.
    pub fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.current();
            Err(Diagnostic::error(
                format!("expected {}, found {:?}", what, found.kind),
                found.span,
            )
            .with_code("P0001"))
        }
    }

    /// Skip any run of the given kinds.
    pub fn skip(&mut self, kinds: &[TokenKind]) {
        while kinds.contains(&self.current().kind) && !self.at_end() {
            self.advance();
        }
    }

    /// Capture a multiline block at a `|` opener, taking every
    /// following line indented deeper than `min_col` — the column of
    /// the field that opened the block, supplied by the parser.
    /// Returns `None` when the current token is not a `|`, the rest of
    /// its line is not blank, lookahead has already read past it, or
    /// the cursor runs over a pre-lexed vector (where blocks were
    /// captured at tokenize time).
    pub fn capture_multiline(&mut self, min_col: usize) -> Option<Token> {
        if !self.check(TokenKind::Pipe) {
            return None;
        }
        // Lookahead past the opener would have tokenized the block
        // lines already; the grammar never peeks there.
        if self.pos + 1 < self.buffer.len() {
            return None;
        }
        let pipe_span = self.buffer[self.pos].span;
        let lexer = match &mut self.source {
            TokenSource::Stream(lexer) => lexer,
            TokenSource::Fixed => return None,
        };
        if !lexer.rest_of_line_blank() {
            return None;
        }

        let mut block = lexer.capture_block(min_col);
        block.span = pipe_span.merge(&block.span);
        self.pos += 1; // past the `|`
        self.buffer.push(block.clone());
        self.pos += 1; // past the captured block
        Some(block)
    }

    /// Drain the diagnostics of the underlying lexer, if any.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        match &mut self.source {
            TokenSource::Stream(lexer) => lexer.take_diagnostics(),
            TokenSource::Fixed => Vec::new(),
        }
    }

    /// Record the current position for a later `reset`.
    pub fn mark(&mut self) {
        self.marks.push(self.pos);
    }

    /// Rewind to the most recent mark.
    pub fn reset(&mut self) {
        if let Some(pos) = self.marks.pop() {
            self.pos = pos;
        }
    }

    /// Drop the most recent mark without rewinding.
    pub fn unmark(&mut self) {
        self.marks.pop();
    }

    pub fn at_end(&mut self) -> bool {
        self.current().kind == TokenKind::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn cursor(source: &str) -> TokenCursor {
        let (tokens, _) = tokenize(source);
        TokenCursor::new(tokens)
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut cursor = cursor("a");
        cursor.advance(); // a
        cursor.advance(); // eof
        assert!(cursor.at_end());
        assert_eq!(cursor.advance().kind, TokenKind::Eof);
        assert_eq!(cursor.current().kind, TokenKind::Eof);
    }

    #[test]
    fn test_peek_sequence() {
        let mut cursor = cursor("T[]");
        assert!(cursor.peek_sequence(&[
            TokenKind::ToolMarker,
            TokenKind::LeftBracket,
            TokenKind::RightBracket,
        ]));
        assert!(!cursor.peek_sequence(&[TokenKind::ToolMarker, TokenKind::LeftBrace]));
    }

    #[test]
    fn test_mark_reset() {
        let mut cursor = cursor("a b c");
        cursor.mark();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.current().lexeme, "c");
        cursor.reset();
        assert_eq!(cursor.current().lexeme, "a");
        // unmark leaves the position alone
        cursor.mark();
        cursor.advance();
        cursor.unmark();
        assert_eq!(cursor.current().lexeme, "b");
    }

    #[test]
    fn test_expect_does_not_advance_on_failure() {
        let mut cursor = cursor(": x");
        let err = cursor.expect(TokenKind::Identifier, "a name").unwrap_err();
        assert!(err.message.contains("expected a name"));
        assert_eq!(cursor.current().kind, TokenKind::Colon);
    }

    #[test]
    fn test_streaming_matches_batch() {
        let source = "> ping#2\n! initialized";
        let (batch, _) = tokenize(source);
        let mut streamed = TokenCursor::from_lexer(Lexer::new(source));
        for expected in &batch {
            assert_eq!(&streamed.advance(), expected);
        }
        assert!(streamed.at_end());
    }

    #[test]
    fn test_capture_multiline_uses_supplied_column() {
        let mut cursor = TokenCursor::from_lexer(Lexer::new("note: |\n  body\nnext"));
        cursor.advance(); // note
        cursor.advance(); // :
        let block = cursor
            .capture_multiline(0)
            .expect("pipe opens a block here");
        assert_eq!(block.str_value(), Some("body"));
        assert_eq!(block.kind, TokenKind::MultilineStr);
        // The terminating line scans normally afterwards.
        assert_eq!(cursor.current().lexeme, "next");
    }

    #[test]
    fn test_capture_multiline_rejects_inline_pipe() {
        let mut cursor = TokenCursor::from_lexer(Lexer::new("t: str | int"));
        cursor.advance(); // t
        cursor.advance(); // :
        cursor.advance(); // str
        assert!(cursor.check(TokenKind::Pipe));
        assert!(cursor.capture_multiline(0).is_none());
        // Still usable as a plain union pipe.
        assert_eq!(cursor.advance().kind, TokenKind::Pipe);
        assert_eq!(cursor.current().lexeme, "int");
    }
}
