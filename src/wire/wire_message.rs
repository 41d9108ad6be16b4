use hmac::Hmac;
use hmac::Mac;
use log::trace;
use serde::de::DeserializeOwned;
use serde_json::json;
use serde_json::Value;
use sha2::Sha256;

use crate::error::Error;
use crate::session::Session;
use crate::socket::Socket;
use crate::wire::header::JupyterHeader;
use crate::wire::jupyter_message::JupyterMessage;
use crate::wire::jupyter_message::ProtocolMessage;

/// Separates the ZeroMQ routing identities from the signed message body.
pub const MSG_DELIM: &[u8] = b"<IDS|MSG>";

/// An untyped Jupyter message as it exists on the wire: routing
/// identities, the four signed JSON parts, still as raw [`Value`]s. Used
/// as an intermediate step before (or after) coercing into a
/// [`JupyterMessage<T>`].
#[derive(Debug)]
pub struct WireMessage {
    pub zmq_identities: Vec<Vec<u8>>,
    pub header: JupyterHeader,
    pub parent_header: Option<JupyterHeader>,
    pub metadata: Value,
    pub content: Value,
}

impl WireMessage {
    /// Reads one multipart message from `socket` and parses its envelope.
    pub fn read_from_socket(socket: &Socket) -> Result<WireMessage, Error> {
        let bufs = socket.recv_multipart()?;
        Self::from_buffers(bufs, socket.session.hmac.as_ref())
    }

    /// Parses a Jupyter message out of the raw frames of a ZeroMQ message.
    pub fn from_buffers(mut bufs: Vec<Vec<u8>>, hmac_key: Option<&Hmac<Sha256>>) -> Result<WireMessage, Error> {
        let pos = bufs
            .iter()
            .position(|buf| buf.as_slice() == MSG_DELIM)
            .ok_or(Error::MissingDelimiter)?;

        let parts: Vec<Vec<u8>> = bufs.drain(pos + 1..).collect();
        bufs.pop(); // drop the delimiter itself

        if parts.len() < 5 {
            return Err(Error::InsufficientParts(parts.len(), 5));
        }

        verify_signature(&parts, hmac_key)?;

        let header: JupyterHeader = parse_part("header", &parts[1])?;
        let parent_header = parse_optional_header(&parts[2])?;
        let metadata = parse_json("metadata", &parts[3])?;
        let content = parse_json("content", &parts[4])?;

        Ok(Self {
            zmq_identities: bufs,
            header,
            parent_header,
            metadata,
            content,
        })
    }

    /// Sends this message on `socket`, signing it with the socket's session
    /// key (or leaving it unsigned when the session has no key).
    pub fn send(&self, socket: &Socket) -> Result<(), Error> {
        trace!(
            "sending '{}' message via {} socket",
            self.header.msg_type,
            socket.name
        );

        let parts = self.to_raw_parts()?;
        let signature = sign(&parts, socket.session.hmac.as_ref());

        let mut frames: Vec<Vec<u8>> = self.zmq_identities.clone();
        frames.push(MSG_DELIM.to_vec());
        frames.push(signature.into_bytes());
        frames.extend(parts);

        socket.send_multipart(&frames)
    }

    fn to_raw_parts(&self) -> Result<Vec<Vec<u8>>, Error> {
        let header = serde_json::to_vec(&self.header).map_err(Error::CannotSerialize)?;
        let parent = match &self.parent_header {
            Some(parent) => serde_json::to_vec(parent).map_err(Error::CannotSerialize)?,
            None => serde_json::to_vec(&json!({})).map_err(Error::CannotSerialize)?,
        };
        let metadata = serde_json::to_vec(&self.metadata).map_err(Error::CannotSerialize)?;
        let content = serde_json::to_vec(&self.content).map_err(Error::CannotSerialize)?;
        Ok(vec![header, parent, metadata, content])
    }
}

/// Computes the lowercase-hex HMAC-SHA256 signature over `parts` in order,
/// or an empty string when `hmac_key` is `None` (an unsigned session).
pub fn sign(parts: &[Vec<u8>], hmac_key: Option<&Hmac<Sha256>>) -> String {
    match hmac_key {
        Some(key) => {
            let mut mac = key.clone();
            for part in parts {
                mac.update(part);
            }
            hex::encode(mac.finalize().into_bytes())
        },
        None => String::new(),
    }
}

/// Verifies the signature frame (`parts[0]`) against the four payload
/// frames that follow it, using a constant-time comparison. A `None` key
/// (unsigned session) always verifies.
fn verify_signature(parts: &[Vec<u8>], hmac_key: Option<&Hmac<Sha256>>) -> Result<(), Error> {
    let key = match hmac_key {
        Some(key) => key,
        None => return Ok(()),
    };

    let signature = &parts[0];
    let decoded = hex::decode(signature).map_err(|err| Error::InvalidHmac(signature.clone(), err))?;

    let mut mac = key.clone();
    for part in &parts[1..] {
        mac.update(part);
    }
    mac.verify_slice(&decoded).map_err(|_| Error::BadSignature)
}

fn parse_json(desc: &str, buf: &[u8]) -> Result<Value, Error> {
    let text = std::str::from_utf8(buf).map_err(|err| Error::Utf8Error(desc.to_string(), err))?;
    serde_json::from_str(text).map_err(|err| Error::JsonParseError(desc.to_string(), err))
}

fn parse_part<T: DeserializeOwned>(desc: &str, buf: &[u8]) -> Result<T, Error> {
    let value = parse_json(desc, buf)?;
    serde_json::from_value(value).map_err(|err| Error::InvalidPart(desc.to_string(), err))
}

/// Per spec §4.2: an orphan (empty-dict) parent header parses to `None`.
fn parse_optional_header(buf: &[u8]) -> Result<Option<JupyterHeader>, Error> {
    let value = parse_json("parent header", buf)?;
    if matches!(&value, Value::Object(map) if map.is_empty()) {
        return Ok(None);
    }
    let header = serde_json::from_value(value).map_err(|err| Error::InvalidPart("parent header".to_string(), err))?;
    Ok(Some(header))
}

impl<T: ProtocolMessage> TryFrom<&JupyterMessage<T>> for WireMessage {
    type Error = Error;

    fn try_from(msg: &JupyterMessage<T>) -> Result<Self, Error> {
        let content = serde_json::to_value(&msg.content).map_err(Error::CannotSerialize)?;
        Ok(Self {
            zmq_identities: msg.zmq_identities.clone(),
            header: msg.header.clone(),
            parent_header: msg.parent_header.clone(),
            metadata: json!({}),
            content,
        })
    }
}
