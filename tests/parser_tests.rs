//! Parser integration tests: document structure, message shapes,
//! definitions, object contexts, and error recovery.

use mcpdsl::ast::{
    Content, DefinitionItem, DefinitionKind, DocumentItem, Message, NamedBlockValue,
    ObjectContext, ObjectProp, Role, TypeExpr, Value,
};
use mcpdsl::parser::parse;
use mcpdsl::tokenizer::tokenize;

fn parse_ok(source: &str) -> mcpdsl::Document {
    let (tokens, lex_diagnostics) = tokenize(source);
    assert!(lex_diagnostics.is_empty(), "lexical errors: {:?}", lex_diagnostics);
    let (document, diagnostics) = parse(tokens);
    assert!(diagnostics.is_empty(), "parse errors: {:?}", diagnostics);
    document
}

fn single_message(source: &str) -> Message {
    let document = parse_ok(source);
    assert_eq!(document.body.len(), 1);
    match &document.body[0] {
        DocumentItem::Message(message) => message.clone(),
        other => panic!("expected a message, got {:?}", other),
    }
}

#[test]
fn test_request_with_id() {
    match single_message("> ping#2") {
        Message::Request(request) => {
            assert_eq!(request.method, "ping");
            assert_eq!(request.id, 2);
            assert!(request.params.is_none());
        }
        other => panic!("expected request, got {:?}", other),
    }
}

#[test]
fn test_request_params_ctx() {
    match single_message("> tools/call#7 {name:\"search\", args:{query:\"rust\"}}") {
        Message::Request(request) => {
            assert_eq!(request.method, "tools/call");
            let params = request.params.expect("params");
            assert_eq!(params.ctx, ObjectContext::RequestParams);
            // Nested objects are general values.
            let args = params.field("args").expect("args field");
            match &args.value {
                Value::Object(object) => {
                    assert_eq!(object.ctx, ObjectContext::GeneralValue)
                }
                other => panic!("expected object, got {:?}", other),
            }
        }
        other => panic!("expected request, got {:?}", other),
    }
}

#[test]
fn test_notification_has_no_id() {
    match single_message("! notifications/progress {progress:3}") {
        Message::Notification(notification) => {
            assert_eq!(notification.method, "notifications/progress");
            assert!(notification.params.is_some());
        }
        other => panic!("expected notification, got {:?}", other),
    }
}

#[test]
fn test_response_result_ctx() {
    match single_message("< #1 {ok:true}") {
        Message::Response(response) => {
            assert_eq!(response.id, 1);
            match response.result.expect("result") {
                Value::Object(object) => {
                    assert_eq!(object.ctx, ObjectContext::ResponseResult)
                }
                other => panic!("expected object result, got {:?}", other),
            }
        }
        other => panic!("expected response, got {:?}", other),
    }
}

#[test]
fn test_error_message_with_merged_sign() {
    match single_message("x #10 -32601:\"Method not found\"") {
        Message::Error(error) => {
            assert_eq!(error.id, 10);
            assert_eq!(error.code, -32601);
            assert_eq!(error.message, "Method not found");
            assert!(error.data.is_none());
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_error_message_with_spaced_sign() {
    // A free-standing `-` token recombines with the following integer.
    match single_message("x #10 - 32601:\"nope\"") {
        Message::Error(error) => assert_eq!(error.code, -32601),
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_error_data_ctx() {
    match single_message("x #4 -32000:\"oops\" {hint:\"retry\"}") {
        Message::Error(error) => match error.data.expect("data") {
            Value::Object(object) => assert_eq!(object.ctx, ObjectContext::ErrorData),
            other => panic!("expected object data, got {:?}", other),
        },
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_capability_set_parsing() {
    let document = parse_ok("> initialize#1 {v:\"2025-06-18\", caps:{roots.listChanged, sampling}}");
    let DocumentItem::Message(Message::Request(request)) = &document.body[0] else {
        panic!("expected request");
    };
    let params = request.params.as_ref().expect("params");
    let caps = params.field("caps").expect("caps field");
    let Value::Object(caps_object) = &caps.value else {
        panic!("expected caps object");
    };
    assert_eq!(caps_object.ctx, ObjectContext::CapabilitySet);

    let paths: Vec<Vec<String>> = caps_object
        .properties
        .iter()
        .filter_map(|prop| match prop {
            ObjectProp::Capability(capability) => Some(capability.path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        paths,
        vec![
            vec!["roots".to_string(), "listChanged".to_string()],
            vec!["sampling".to_string()],
        ]
    );
}

#[test]
fn test_tool_definition() {
    let document = parse_ok("T search { desc:\"Search\", in:{ query:str!, limit:int } }");
    let DocumentItem::Definition(DefinitionItem::Single(definition)) = &document.body[0] else {
        panic!("expected definition");
    };
    assert_eq!(definition.kind, DefinitionKind::Tool);
    assert_eq!(definition.name, "search");
    assert_eq!(definition.body.ctx, ObjectContext::DefinitionBlock);

    let input = definition.body.field("in").expect("in field");
    let Value::Type(TypeExpr::Object { fields, .. }) = &input.value else {
        panic!("expected object type, got {:?}", input.value);
    };
    assert_eq!(fields.len(), 2);
    assert!(fields[0].is_required());
    assert!(!fields[1].is_required());
}

#[test]
fn test_collection_with_named_blocks() {
    let document = parse_ok("T[] { add: {desc:\"Add\"}, sub: \"Subtract\" }");
    let DocumentItem::Definition(DefinitionItem::Collection(collection)) = &document.body[0] else {
        panic!("expected collection");
    };
    assert_eq!(collection.kind, DefinitionKind::Tool);
    assert_eq!(collection.items.len(), 2);
    assert_eq!(collection.items[0].name, "add");
    assert!(matches!(collection.items[0].value, NamedBlockValue::Object(_)));
    assert!(matches!(collection.items[1].value, NamedBlockValue::Str(_)));
}

#[test]
fn test_anonymous_collection_vs_tool_ref() {
    // `T { id : … }` at the top level is a collection…
    let document = parse_ok("T { echo: {desc:\"Echo\"} }");
    assert!(matches!(
        document.body[0],
        DocumentItem::Definition(DefinitionItem::Collection(_))
    ));

    // …while `T { id }` in value position is a tool reference.
    let document = parse_ok("< #1 {content:[T { echo }]}");
    let DocumentItem::Message(Message::Response(response)) = &document.body[0] else {
        panic!("expected response");
    };
    let Some(Value::Object(result)) = &response.result else {
        panic!("expected result object");
    };
    let content = result.field("content").expect("content");
    let Value::Array { items, .. } = &content.value else {
        panic!("expected array");
    };
    assert!(matches!(
        items[0],
        Value::Content(Content::ToolRef { ref name, .. }) if name == "echo"
    ));
}

#[test]
fn test_server_block_with_version() {
    let document = parse_ok("server demo v1.2.3 { caps:{tools} }");
    let DocumentItem::Server(server) = &document.body[0] else {
        panic!("expected server block");
    };
    assert_eq!(server.name, "demo");
    let version = server.version.as_ref().expect("version");
    assert_eq!(version.triple(), (1, 2, 3));
    assert_eq!(server.body.ctx, ObjectContext::DefinitionBlock);
}

#[test]
fn test_server_block_without_version() {
    let document = parse_ok("server demo { caps:{tools} }");
    let DocumentItem::Server(server) = &document.body[0] else {
        panic!("expected server block");
    };
    assert!(server.version.is_none());
}

#[test]
fn test_nested_definition_in_server_block() {
    let document = parse_ok("server demo v1.0.0 {\n  T echo { desc:\"Echo\" }\n}");
    let DocumentItem::Server(server) = &document.body[0] else {
        panic!("expected server block");
    };
    assert!(server
        .body
        .properties
        .iter()
        .any(|prop| matches!(prop, ObjectProp::Definition(_))));
}

#[test]
fn test_role_messages_and_composites() {
    let document = parse_ok("P greet { desc:\"d\", msgs:[u:\"Hi\", a: txt \"Hello\" + img \"AAAA\"::png] }");
    let DocumentItem::Definition(DefinitionItem::Single(prompt)) = &document.body[0] else {
        panic!("expected prompt");
    };
    let msgs = prompt.body.field("msgs").expect("msgs");
    let Value::Array { items, .. } = &msgs.value else {
        panic!("expected array");
    };
    let Value::Role(user) = &items[0] else {
        panic!("expected role message");
    };
    assert_eq!(user.role, Role::User);
    let Value::Role(assistant) = &items[1] else {
        panic!("expected role message");
    };
    match assistant.content.as_ref() {
        Value::Composite(composite) => {
            assert_eq!(composite.parts.len(), 2);
            assert!(matches!(
                composite.parts[1],
                Content::Image { ref format, .. } if format.as_deref() == Some("png")
            ));
        }
        other => panic!("expected composite content, got {:?}", other),
    }
}

#[test]
fn test_multiline_value() {
    let document = parse_ok("T doc {\n  desc: |\n    Long text\n    more\n}");
    let DocumentItem::Definition(DefinitionItem::Single(tool)) = &document.body[0] else {
        panic!("expected tool");
    };
    let desc = tool.body.field("desc").expect("desc");
    match &desc.value {
        Value::Str { value, multiline, .. } => {
            assert!(*multiline);
            assert_eq!(value, "Long text\nmore");
        }
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn test_multiline_terminates_at_field_column() {
    // The parser supplies the `desc` field's column (12) to the
    // capture: `  tail: 2` falls left of it and stays a field.
    let source = "T x { a: 1, desc: |\n              captured\n  tail: 2\n}";
    let (document, diagnostics) = mcpdsl::parse_source(source);
    assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);

    let DocumentItem::Definition(DefinitionItem::Single(tool)) = &document.body[0] else {
        panic!("expected tool definition");
    };
    let desc = tool.body.field("desc").expect("desc field");
    match &desc.value {
        Value::Str { value, multiline, .. } => {
            assert!(*multiline);
            assert_eq!(value, "captured");
        }
        other => panic!("expected string, got {:?}", other),
    }
    assert!(tool.body.field("a").is_some());
    assert!(tool.body.field("tail").is_some());
}

#[test]
fn test_parse_source_matches_parse_of_tokenized() {
    let source = "> initialize#1 {v:\"1\", caps:{roots.listChanged}}\nT t { desc:\"d\" }";
    let (streamed, stream_diagnostics) = mcpdsl::parse_source(source);
    let (tokens, _) = tokenize(source);
    let (batched, batch_diagnostics) = parse(tokens);
    assert!(stream_diagnostics.is_empty());
    assert!(batch_diagnostics.is_empty());
    assert_eq!(streamed, batched);
}

#[test]
fn test_type_expressions() {
    let document = parse_ok("T t { desc:\"d\", in:{a: [str], b: enum[x, y], c: str | int, d: uri, e: str::date-time} }");
    let DocumentItem::Definition(DefinitionItem::Single(tool)) = &document.body[0] else {
        panic!("expected tool");
    };
    let input = tool.body.field("in").expect("in");
    let Value::Type(TypeExpr::Object { fields, .. }) = &input.value else {
        panic!("expected object type");
    };
    assert!(matches!(fields[0].ty, TypeExpr::Array { elem: Some(_), .. }));
    assert!(matches!(fields[1].ty, TypeExpr::Enum { ref values, .. } if values == &["x", "y"]));
    assert!(matches!(fields[2].ty, TypeExpr::Union { ref types, .. } if types.len() == 2));
    assert!(matches!(fields[4].ty, TypeExpr::Cast { ref casts, .. } if casts == &["date-time"]));
}

#[test]
fn test_keywords_usable_as_field_names() {
    let document = parse_ok("> m#1 {x: 1, res: 2, u: 3, str: 4}");
    let DocumentItem::Message(Message::Request(request)) = &document.body[0] else {
        panic!("expected request");
    };
    let params = request.params.as_ref().expect("params");
    for name in ["x", "res", "u", "str"] {
        assert!(params.field(name).is_some(), "missing field {}", name);
    }
}

#[test]
fn test_recovery_collects_multiple_errors() {
    let source = "> bad#\n> ping#2\nx #1 :\n! initialized";
    let (tokens, _) = tokenize(source);
    let (document, diagnostics) = parse(tokens);
    // Two malformed messages, two good ones.
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(document.body.len(), 2);
}

#[test]
fn test_optional_commas() {
    let with_commas = parse_ok("> m#1 {a:1, b:2, c:3}");
    let with_newlines = parse_ok("> m#1 {\n  a:1\n  b:2\n  c:3\n}");
    let count = |document: &mcpdsl::Document| -> usize {
        let DocumentItem::Message(Message::Request(request)) = &document.body[0] else {
            panic!("expected request");
        };
        request.params.as_ref().map(|p| p.properties.len()).unwrap_or(0)
    };
    assert_eq!(count(&with_commas), 3);
    assert_eq!(count(&with_newlines), 3);
}

#[test]
fn test_invalid_version_reported() {
    let (tokens, _) = tokenize("server demo vX.1.2 { }");
    let (_, diagnostics) = parse(tokens);
    assert!(!diagnostics.is_empty());
}
