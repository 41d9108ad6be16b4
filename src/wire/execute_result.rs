use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::wire::jupyter_message::MessageType;

/// The MIME bundle produced by a finished host cell's result value.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecuteResult {
    pub execution_count: u32,
    pub data: Value,
    pub metadata: Value,
}

impl MessageType for ExecuteResult {
    fn message_type() -> String {
        String::from("execute_result")
    }
}
