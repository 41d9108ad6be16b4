use serde::Deserialize;
use serde::Serialize;

use crate::wire::jupyter_message::MessageType;

/// A frontend's request for information about the kernel it's connected to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KernelInfoRequest {}

impl MessageType for KernelInfoRequest {
    fn message_type() -> String {
        String::from("kernel_info_request")
    }
}
