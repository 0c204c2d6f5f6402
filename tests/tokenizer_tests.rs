//! Tokenizer integration tests: scanning whole documents and checking
//! the token stream shape, spans, and lexical error recovery.

use rstest::rstest;

use mcpdsl::tokenizer::{tokenize, TokenKind};

#[test]
fn test_simple_request_stream() {
    let (tokens, diagnostics) = tokenize("> ping#2");
    assert!(diagnostics.is_empty());
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::RequestMarker,
            TokenKind::Identifier,
            TokenKind::Hash,
            TokenKind::Integer,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_spans_are_tracked() {
    let (tokens, _) = tokenize("> ping#2");
    let ping = &tokens[1];
    assert_eq!(ping.lexeme, "ping");
    assert_eq!(ping.span.start.row, 0);
    assert_eq!(ping.span.start.column, 2);
    assert_eq!(ping.span.end.column, 6);
    assert_eq!(ping.span.start.offset, 2);
}

#[test]
fn test_second_line_positions() {
    let (tokens, _) = tokenize("> ping#2\n! initialized");
    let init = tokens
        .iter()
        .find(|t| t.lexeme == "initialized")
        .expect("identifier token");
    assert_eq!(init.span.start.row, 1);
    assert_eq!(init.span.start.column, 2);
}

#[rstest]
#[case("{", TokenKind::LeftBrace)]
#[case("}", TokenKind::RightBrace)]
#[case("[", TokenKind::LeftBracket)]
#[case("]", TokenKind::RightBracket)]
#[case("(", TokenKind::LeftParen)]
#[case(")", TokenKind::RightParen)]
#[case(",", TokenKind::Comma)]
#[case(".", TokenKind::Dot)]
#[case("?", TokenKind::Question)]
#[case("@", TokenKind::At)]
#[case("=", TokenKind::Equals)]
#[case("+", TokenKind::Plus)]
#[case(">", TokenKind::RequestMarker)]
#[case("<", TokenKind::ResponseMarker)]
#[case("!", TokenKind::Bang)]
fn test_single_character_tokens(#[case] source: &str, #[case] expected: TokenKind) {
    let (tokens, diagnostics) = tokenize(source);
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].kind, expected);
}

#[test]
fn test_colon_vs_double_colon() {
    let (tokens, _) = tokenize("a: b::c");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TokenKind::Colon));
    assert!(kinds.contains(&TokenKind::DoubleColon));
}

#[test]
fn test_method_paths_are_single_tokens() {
    let (tokens, _) = tokenize("> resources/templates/list#4");
    assert_eq!(tokens[1].kind, TokenKind::MethodPath);
    assert_eq!(tokens[1].lexeme, "resources/templates/list");
}

#[test]
fn test_numbers() {
    let (tokens, diagnostics) = tokenize("1 -2 3.5 -4.25");
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].int_value(), Some(1));
    assert_eq!(tokens[1].int_value(), Some(-2));
    assert_eq!(tokens[2].kind, TokenKind::Decimal);
    assert_eq!(tokens[3].kind, TokenKind::Decimal);
    assert_eq!(tokens[3].lexeme, "-4.25");
}

#[test]
fn test_integer_then_dot_is_not_decimal() {
    // `v1.2.3` style splitting: `2.3` is one decimal, but `1.` alone
    // stays an integer followed by a dot.
    let (tokens, _) = tokenize("1.x");
    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[1].kind, TokenKind::Dot);
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
}

#[test]
fn test_string_literal_value() {
    let (tokens, diagnostics) = tokenize(r#""Method not found""#);
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].str_value(), Some("Method not found"));
    assert_eq!(tokens[0].lexeme, r#""Method not found""#);
}

#[test]
fn test_template_markers_pass_through_strings() {
    let (tokens, diagnostics) = tokenize(r#""Hello {{name}}""#);
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].str_value(), Some("Hello {{name}}"));
}

#[test]
fn test_escaped_template_opener() {
    let (tokens, diagnostics) = tokenize(r#""literal \{{ here""#);
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].str_value(), Some("literal {{ here"));
}

#[test]
fn test_lexical_errors_do_not_stop_scanning() {
    let (tokens, diagnostics) = tokenize("~ ` $\n> ping#2");
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics.iter().all(|d| d.is_error()));
    // The request on the next line still tokenizes.
    assert!(tokens.iter().any(|t| t.lexeme == "ping"));
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
}

#[test]
fn test_dedents_flushed_at_eof() {
    let (tokens, _) = tokenize("a\n  b\n    c");
    let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
    assert_eq!(dedents, 2);
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
}

#[test]
fn test_comment_trivia_carries_text() {
    let (tokens, _) = tokenize("# top note\n> ping#1");
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].str_value(), Some("top note"));
}

#[test]
fn test_multiline_string_block() {
    let source = "note: |\n  line one\n  line two\n> ping#9";
    let (tokens, diagnostics) = tokenize(source);
    assert!(diagnostics.is_empty());
    let block = tokens
        .iter()
        .find(|t| t.kind == TokenKind::MultilineStr)
        .expect("multiline string token");
    assert_eq!(block.str_value(), Some("line one\nline two"));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::RequestMarker));
}

#[test]
fn test_multiline_preserves_relative_indent_and_blanks() {
    let source = "note: |\n  a\n    deeper\n\n  b\ndone";
    let (tokens, _) = tokenize(source);
    let block = tokens
        .iter()
        .find(|t| t.kind == TokenKind::MultilineStr)
        .expect("multiline string token");
    assert_eq!(block.str_value(), Some("a\n  deeper\n\nb"));
}

#[test]
fn test_multiline_termination_by_dedent() {
    let source = "outer: |\n    content\nnext: 1";
    let (tokens, _) = tokenize(source);
    // `next` terminates the block and scans normally.
    let names: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Identifier)
        .map(|t| t.lexeme.as_str())
        .collect();
    assert_eq!(names, vec!["outer", "next"]);
}

#[test]
fn test_multiline_keys_on_field_column_not_line_start() {
    // `desc` sits at column 12, after other fields on the same line;
    // the block ends at the first line indented at or left of `desc`,
    // not at the line's own first column.
    let source = "T x { a: 1, desc: |\n              captured\n  tail: 2\n}";
    let (tokens, diagnostics) = tokenize(source);
    assert!(diagnostics.is_empty());
    let block = tokens
        .iter()
        .find(|t| t.kind == TokenKind::MultilineStr)
        .expect("multiline token");
    assert_eq!(block.str_value(), Some("captured"));
    // `  tail: 2` is not part of the block; it scans as tokens.
    assert!(tokens
        .iter()
        .any(|t| t.kind == TokenKind::Identifier && t.lexeme == "tail"));
}
