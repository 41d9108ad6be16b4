use serde::Deserialize;
use serde::Serialize;

use crate::wire::help_link::HelpLink;
use crate::wire::jupyter_message::MessageType;
use crate::wire::jupyter_message::Status;
use crate::wire::language_info::LanguageInfo;

/// The bridge's reply to `kernel_info_request`. The bridge is not a real
/// kernel, so `implementation` names it explicitly rather than claiming to
/// be a Python kernel.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KernelInfoReply {
    pub status: Status,
    pub protocol_version: String,
    pub implementation: String,
    pub implementation_version: String,
    pub language_info: LanguageInfo,
    pub banner: String,
    pub debugger: bool,
    pub help_links: Vec<HelpLink>,
}

impl MessageType for KernelInfoReply {
    fn message_type() -> String {
        String::from("kernel_info_reply")
    }
}

impl KernelInfoReply {
    pub fn for_host(python_version: &str) -> Self {
        Self {
            status: Status::Ok,
            protocol_version: "5.3".to_string(),
            implementation: "ipython-bridge".to_string(),
            implementation_version: env!("CARGO_PKG_VERSION").to_string(),
            language_info: LanguageInfo::python(python_version),
            banner: format!("IOPub bridge {}", env!("CARGO_PKG_VERSION")),
            debugger: false,
            help_links: Vec::new(),
        }
    }
}
