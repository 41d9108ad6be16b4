use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::wire::jupyter_message::MessageType;

/// A frontend's request to execute code. The bridge does not execute
/// `code` (see spec Non-goals); the only field it acts on is
/// `user_expressions`, evaluated for protocol-conformance probes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecuteRequest {
    pub code: String,
    #[serde(default)]
    pub silent: bool,
    #[serde(default)]
    pub store_history: bool,
    #[serde(default)]
    pub user_expressions: BTreeMap<String, String>,
    #[serde(default)]
    pub allow_stdin: bool,
    #[serde(default)]
    pub stop_on_error: bool,
}

impl MessageType for ExecuteRequest {
    fn message_type() -> String {
        String::from("execute_request")
    }
}
