use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::wire::jupyter_message::MessageType;

/// A MIME bundle published outside the normal cell-result flow (e.g. a
/// plot or a rich object the host explicitly displayed).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DisplayData {
    pub data: Value,
    pub metadata: Value,
    pub transient: Value,
}

impl MessageType for DisplayData {
    fn message_type() -> String {
        String::from("display_data")
    }
}
