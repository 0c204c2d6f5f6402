//! Decompiler integration tests: canonical text for each shape, the
//! reverse mappings, and best-effort handling of foreign JSON.

use serde_json::json;

use mcpdsl::{compile_source, decompile, decompile_values};

fn decompile_source(source: &str) -> String {
    let (result, diagnostics) = compile_source(source);
    let result = result.unwrap_or_else(|| panic!("compilation failed: {:?}", diagnostics));
    let (text, _) = decompile(&result);
    text
}

#[test]
fn test_request_text() {
    insta::assert_snapshot!(decompile_source("> ping#2").trim_end(), @"> ping#2");
}

#[test]
fn test_notification_text() {
    insta::assert_snapshot!(decompile_source("! initialized").trim_end(), @"! initialized");
}

#[test]
fn test_error_text() {
    insta::assert_snapshot!(
        decompile_source("x #10 -32601:\"Method not found\"").trim_end(),
        @r#"x #10 -32601:"Method not found""#
    );
}

#[test]
fn test_ok_negation_reverses() {
    // isError:false must come back as ok: true, not isError:false.
    let text = decompile_source("< #1 {ok:true}");
    assert_eq!(text, "< #1 {ok: true}\n");
}

#[test]
fn test_capabilities_flatten_to_dotted_paths() {
    let text = decompile_source("> initialize#1 {v:\"2025-06-18\", caps:{roots.listChanged, sampling}}");
    assert_eq!(
        text,
        "> initialize#1 {v: \"2025-06-18\", caps: {roots.listChanged, sampling}}\n"
    );
}

#[test]
fn test_tool_text() {
    let text = decompile_source("T search { desc:\"Search\", in:{ query:str!, limit:int } }");
    assert_eq!(
        text,
        "T search {desc: \"Search\", in: {query!: str, limit: int}}\n"
    );
}

#[test]
fn test_default_input_schema_omitted() {
    let text = decompile_source("T bare { desc:\"d\" }");
    assert_eq!(text, "T bare {desc: \"d\"}\n");
}

#[test]
fn test_resource_annotations_reverse() {
    let text = decompile_source("R main_file { uri:\"file:///x\", mime:\"text/x-rust\", @priority:1.0 }");
    assert!(text.starts_with("R main_file {"));
    assert!(text.contains("uri: \"file:///x\""));
    assert!(text.contains("mime: \"text/x-rust\""));
    assert!(text.contains("@priority:1.0"));
}

#[test]
fn test_bare_annotation_forms() {
    let text = decompile_source("T wipe { desc:\"d\", @readonly, @destructive }");
    assert!(text.contains("@readonly"));
    assert!(text.contains("@destructive"));
    assert!(!text.contains("@readonly:"));
}

#[test]
fn test_string_escaping() {
    let text = decompile_source(r#"< #1 "line one\nand \"quotes\"""#);
    assert_eq!(text, "< #1 \"line one\\nand \\\"quotes\\\"\"\n");
}

#[test]
fn test_long_object_breaks_into_block() {
    let text = decompile_source(
        "R r { uri:\"file:///some/quite/long/path/to/a/file.rs\", mime:\"text/x-rust\", desc:\"a description long enough to overflow\" }",
    );
    assert!(text.contains("{\n"));
    assert!(text.contains("\n  uri: "));
    assert!(text.ends_with("\n}\n"));
}

#[test]
fn test_decompile_raw_message_values() {
    let values = vec![
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
        json!({"jsonrpc": "2.0", "method": "initialized"}),
        json!({"jsonrpc": "2.0", "id": 3, "result": {"isError": false}}),
        json!({"jsonrpc": "2.0", "id": 4, "error": {"code": -32601, "message": "nope"}}),
    ];
    let (text, diagnostics) = decompile_values(&values);
    assert!(diagnostics.is_empty());
    assert_eq!(
        text,
        "> ping#2\n! initialized\n< #3 {ok: true}\nx #4 -32601:\"nope\"\n"
    );
}

#[test]
fn test_decompile_artefact_values() {
    let values = vec![
        json!({"name": "search", "inputSchema": {"type": "object"}, "description": "Search"}),
        json!({"name": "main", "uri": "file:///x"}),
    ];
    let (text, _) = decompile_values(&values);
    assert!(text.contains("T search {desc: \"Search\"}"));
    assert!(text.contains("R main {uri: \"file:///x\"}"));
}

#[test]
fn test_unknown_shape_becomes_comment_with_warning() {
    let values = vec![json!({"mystery": true})];
    let (text, diagnostics) = decompile_values(&values);
    assert!(text.starts_with("# unclassified:"));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some("D0001"));
}

#[test]
fn test_unknown_keys_ride_along() {
    let values = vec![json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "custom",
        "params": {"extra": 7, "flag": true}
    })];
    let (text, diagnostics) = decompile_values(&values);
    assert!(diagnostics.is_empty());
    assert_eq!(text, "> custom#1 {extra: 7, flag: true}\n");
}

#[test]
fn test_resource_template_gets_synthetic_name() {
    let text = decompile_source("RT files { uri:\"file:///{path}\" }");
    assert_eq!(text, "RT rt0 {uri: \"file:///{path}\"}\n");
}

#[test]
fn test_server_info_text() {
    let text = decompile_source("server demo v1.2.3 { caps:{tools.listChanged} }");
    assert_eq!(text, "server demo v1.2.3 {caps: {tools.listChanged}}\n");
}

#[test]
fn test_prompt_text() {
    let text = decompile_source(
        "P greet { desc:\"Hi\", args:{name!: str}, msgs:[u:\"Hello\"] }",
    );
    assert_eq!(
        text,
        "P greet {desc: \"Hi\", args: {name!: str}, msgs: [u:\"Hello\"]}\n"
    );
}

#[test]
fn test_both_info_objects_prefers_server_info() {
    let values = vec![json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "serverInfo": {"name": "srv", "version": "1.0.0"},
            "clientInfo": {"name": "cli", "version": "2.0.0"}
        }
    })];
    let (text, diagnostics) = decompile_values(&values);
    assert!(text.contains("info: {name: \"srv\", version: \"1.0.0\"}"));
    assert!(!text.contains("cli"));
    assert!(diagnostics
        .iter()
        .any(|d| d.code.as_deref() == Some("D0003")));
}
