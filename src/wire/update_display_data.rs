use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::wire::jupyter_message::MessageType;

/// Replaces the content of a previously published [`DisplayData`](crate::wire::display_data::DisplayData)
/// whose `transient.display_id` matches.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateDisplayData {
    pub data: Value,
    pub metadata: Value,
    pub transient: Value,
}

impl MessageType for UpdateDisplayData {
    fn message_type() -> String {
        String::from("update_display_data")
    }
}
