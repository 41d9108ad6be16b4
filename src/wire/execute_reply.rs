use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::wire::jupyter_message::MessageType;
use crate::wire::jupyter_message::Status;

/// The result of evaluating a single entry of `execute_request`'s
/// `user_expressions` map.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UserExpressionResult {
    Ok {
        data: serde_json::Value,
        metadata: serde_json::Value,
    },
    Error {
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
}

/// The bridge's reply to `execute_request`. `code` is never executed; this
/// reply exists so that a frontend's connection-probing `execute_request`
/// gets a well-formed response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecuteReply {
    pub status: Status,
    pub execution_count: u32,
    pub user_expressions: BTreeMap<String, UserExpressionResult>,
}

impl MessageType for ExecuteReply {
    fn message_type() -> String {
        String::from("execute_reply")
    }
}
