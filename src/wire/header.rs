use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// The Jupyter protocol version this crate speaks.
pub const PROTOCOL_VERSION: &str = "5.3";

/// The header every Jupyter message carries, identifying its author,
/// session, and kind.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JupyterHeader {
    pub msg_id: String,
    pub msg_type: String,
    pub username: String,
    pub session: String,
    pub date: String,
    pub version: String,
}

impl JupyterHeader {
    /// Creates a fresh header with a globally unique `msg_id` and the
    /// given session's id and username.
    pub fn create(msg_type: String, session_id: String, username: String) -> Self {
        Self {
            msg_id: Uuid::new_v4().to_string(),
            msg_type,
            username,
            session: session_id,
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_stamps_protocol_version_and_fresh_id() {
        let a = JupyterHeader::create(
            "status".to_string(),
            "sess".to_string(),
            "kernel".to_string(),
        );
        let b = JupyterHeader::create(
            "status".to_string(),
            "sess".to_string(),
            "kernel".to_string(),
        );
        assert_eq!(a.version, PROTOCOL_VERSION);
        assert_ne!(a.msg_id, b.msg_id);
        assert_eq!(a.session, "sess");
    }
}
