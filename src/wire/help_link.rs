use serde::Deserialize;
use serde::Serialize;

/// A single entry in `kernel_info_reply`'s `help_links` list. The bridge
/// never populates this (spec: "an empty `help_links` list"), but the type
/// is part of the wire schema.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HelpLink {
    pub text: String,
    pub url: String,
}
