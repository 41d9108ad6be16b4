use hmac::Hmac;
use hmac::KeyInit;
use hmac::Mac;
use sha2::Sha256;
use uuid::Uuid;

use crate::error::Error;

/// The username every outgoing header carries. The bridge is not a
/// multi-user kernel, so this is a fixed value rather than something
/// negotiated with a frontend.
pub const USERNAME: &str = "ipython-bridge";

/// Groups the two identifiers that are fixed for the lifetime of a bridge:
/// the HMAC signing key (`BridgeKey`) and the session id placed in every
/// outgoing header (`SessionId`).
#[derive(Clone)]
pub struct Session {
    /// The HMAC instance derived from the bridge key, or `None` for an
    /// unsigned (key-less) session.
    pub hmac: Option<Hmac<Sha256>>,
    pub session_id: String,
    pub username: String,
}

impl Session {
    /// Creates a new session from a freshly generated 32-hex-character key.
    pub fn create() -> Result<(Self, String), Error> {
        let key = Uuid::new_v4().simple().to_string();
        let session = Self::from_key(&key)?;
        Ok((session, key))
    }

    /// Creates a session from an existing signing key (used by clients
    /// connecting to a bridge, and by tests).
    pub fn from_key(key: &str) -> Result<Self, Error> {
        let hmac = if key.is_empty() {
            None
        } else {
            Some(Hmac::<Sha256>::new_from_slice(key.as_bytes()).map_err(Error::InvalidKey)?)
        };
        Ok(Self {
            hmac,
            session_id: Uuid::new_v4().simple().to_string(),
            username: USERNAME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_yields_a_32_hex_char_key() {
        let (_session, key) = Session::create().unwrap();
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn empty_key_disables_signing() {
        let session = Session::from_key("").unwrap();
        assert!(session.hmac.is_none());
    }

    #[test]
    fn session_ids_are_unique() {
        let a = Session::from_key("abc").unwrap();
        let b = Session::from_key("abc").unwrap();
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn session_id_is_32_hex_chars() {
        let session = Session::from_key("abc").unwrap();
        assert_eq!(session.session_id.len(), 32);
        assert!(session.session_id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
