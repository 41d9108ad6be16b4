use serde::Deserialize;
use serde::Serialize;

use crate::wire::exception::Exception;
use crate::wire::jupyter_message::MessageType;

/// The IOPub counterpart to a cell's exception. Not to be confused with an
/// error reply on the Shell channel, which this bridge never sends (it
/// does not execute `code`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecuteError {
    #[serde(flatten)]
    pub exception: Exception,
}

impl MessageType for ExecuteError {
    fn message_type() -> String {
        String::from("error")
    }
}
