use serde::Deserialize;
use serde::Serialize;

use crate::wire::jupyter_message::MessageType;

/// A chunk of text captured from the host's standard output streams.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StreamOutput {
    pub name: Stream,
    pub text: String,
}

impl MessageType for StreamOutput {
    fn message_type() -> String {
        String::from("stream")
    }
}

#[derive(Debug, Serialize, Deserialize, strum_macros::Display, strum_macros::EnumString, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stream {
    Stdout,
    Stderr,
}
