//! Message compilation: the four JSON-RPC envelopes.

use serde_json::{json, Map, Value as Json};

use super::{Compiler, ObjCtx};
use crate::ast::Message;

impl Compiler {
    pub(crate) fn compile_message(&mut self, message: &Message) -> Json {
        match message {
            Message::Request(request) => {
                let mut map = Map::new();
                map.insert("jsonrpc".to_string(), json!("2.0"));
                map.insert("id".to_string(), json!(request.id));
                map.insert("method".to_string(), json!(request.method));
                if let Some(params) = &request.params {
                    let ctx = ObjCtx {
                        in_initialize_request: request.method == "initialize",
                        in_response_result: false,
                    };
                    map.insert("params".to_string(), self.compile_object(params, ctx));
                }
                Json::Object(map)
            }
            Message::Response(response) => {
                let mut map = Map::new();
                map.insert("jsonrpc".to_string(), json!("2.0"));
                map.insert("id".to_string(), json!(response.id));
                if let Some(result) = &response.result {
                    let ctx = ObjCtx {
                        in_initialize_request: false,
                        in_response_result: true,
                    };
                    map.insert("result".to_string(), self.compile_value(result, ctx));
                }
                Json::Object(map)
            }
            Message::Notification(notification) => {
                let mut map = Map::new();
                map.insert("jsonrpc".to_string(), json!("2.0"));
                map.insert("method".to_string(), json!(notification.method));
                if let Some(params) = &notification.params {
                    map.insert(
                        "params".to_string(),
                        self.compile_object(params, ObjCtx::default()),
                    );
                }
                Json::Object(map)
            }
            Message::Error(error) => {
                let mut body = Map::new();
                body.insert("code".to_string(), json!(error.code));
                body.insert("message".to_string(), json!(error.message));
                if let Some(data) = &error.data {
                    body.insert(
                        "data".to_string(),
                        self.compile_value(data, ObjCtx::default()),
                    );
                }

                let mut map = Map::new();
                map.insert("jsonrpc".to_string(), json!("2.0"));
                map.insert("id".to_string(), json!(error.id));
                map.insert("error".to_string(), Json::Object(body));
                Json::Object(map)
            }
        }
    }
}
