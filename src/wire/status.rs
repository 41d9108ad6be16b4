use serde::Deserialize;
use serde::Serialize;

use crate::wire::jupyter_message::MessageType;

/// Broadcast on IOPub before and after the bridge handles a request or a
/// host cell-finished event.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KernelStatus {
    pub execution_state: ExecutionState,
}

impl MessageType for KernelStatus {
    fn message_type() -> String {
        String::from("status")
    }
}

#[derive(Debug, Serialize, Deserialize, strum_macros::Display, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionState {
    Busy,
    Idle,
    Starting,
}
