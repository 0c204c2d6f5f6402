//! Validator integration tests: one scenario per rule, checking
//! severity and code.

use mcpdsl::diagnostics::{has_errors, Severity};
use mcpdsl::parser::parse;
use mcpdsl::semantic::validate;
use mcpdsl::tokenizer::tokenize;
use mcpdsl::Diagnostic;

fn validate_source(source: &str) -> Vec<Diagnostic> {
    let (tokens, lex_diagnostics) = tokenize(source);
    assert!(lex_diagnostics.is_empty(), "lexical errors: {:?}", lex_diagnostics);
    let (document, parse_diagnostics) = parse(tokens);
    assert!(parse_diagnostics.is_empty(), "parse errors: {:?}", parse_diagnostics);
    validate(&document)
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .filter_map(|d| d.code.as_deref())
        .collect()
}

#[test]
fn test_clean_document() {
    let diagnostics = validate_source("> ping#2\n< #2 \"pong\"");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_negative_message_id() {
    let diagnostics = validate_source("> ping#-2");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0001"));
}

#[test]
fn test_error_code_outside_standard_range_warns() {
    let diagnostics = validate_source("x #1 404:\"not found\"");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].code.as_deref(), Some("V0002"));

    let diagnostics = validate_source("x #1 -32601:\"method\"");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_field_assignment_in_capability_set() {
    let diagnostics = validate_source("> initialize#1 {caps:{roots: true}}");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0003"));
}

#[test]
fn test_annotation_in_error_data() {
    let diagnostics = validate_source("x #1 -32000:\"oops\" {@priority:1.0, detail:\"d\"}");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0003"));
}

#[test]
fn test_definition_nested_in_params() {
    let diagnostics = validate_source("> m#1 {T echo { desc:\"d\" }}");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0003"));
}

#[test]
fn test_resource_requires_uri() {
    let diagnostics = validate_source("R broken { mime:\"text/plain\" }");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0004"));

    let diagnostics = validate_source("R fine { uri:\"file:///x\" }");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_resource_template_requires_uri() {
    let diagnostics = validate_source("RT broken { mime:\"text/plain\" }");
    assert!(codes(&diagnostics).contains(&"V0004"));
}

#[test]
fn test_tool_without_description_warns() {
    let diagnostics = validate_source("T bare {}");
    assert!(!has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0005"));

    let diagnostics = validate_source("T described { desc:\"d\" }");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_empty_enum_is_error() {
    let diagnostics = validate_source("T t { desc:\"d\", in:{mode: enum[]} }");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0006"));
}

#[test]
fn test_duplicate_enum_values_warn() {
    let diagnostics = validate_source("T t { desc:\"d\", in:{mode: enum[a, b, a]} }");
    assert!(!has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0007"));
}

#[test]
fn test_annotation_target_mismatch_warns() {
    // @readonly targets tools; a resource is the wrong host.
    let diagnostics = validate_source("R r { uri:\"file:///x\", @readonly }");
    assert!(!has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0009"));

    let diagnostics = validate_source("T t { desc:\"d\", @readonly }");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_impl_arity() {
    let diagnostics = validate_source("> initialize#1 {info: @impl(demo)}");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0010"));

    let diagnostics = validate_source("> initialize#1 {info: @impl(demo, \"1.0.0\")}");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_unknown_image_format_warns() {
    let diagnostics =
        validate_source("< #1 {content:[img \"AAAA\"::heif]}");
    assert!(!has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0011"));

    let diagnostics = validate_source("< #1 {content:[img \"AAAA\"::png]}");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_unknown_annotation_preserved_with_warning() {
    let diagnostics = validate_source("T t { desc:\"d\", @experimental }");
    assert!(!has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0014"));
}

#[test]
fn test_negative_version_is_error() {
    let diagnostics = validate_source("server demo v1.-2.0 { }");
    assert!(has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0013"));
}

#[test]
fn test_duplicate_server_block_warns() {
    let diagnostics = validate_source("server one v1.0.0 { }\nserver two v1.0.0 { }");
    assert!(!has_errors(&diagnostics));
    assert!(codes(&diagnostics).contains(&"V0015"));
}

#[test]
fn test_warnings_do_not_block_compilation() {
    let (result, diagnostics) = mcpdsl::compile_source("T bare {}");
    assert!(result.is_some());
    assert!(!diagnostics.is_empty());
}
