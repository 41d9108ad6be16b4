use std::fmt;

/// Errors that can occur while driving the bridge's wire protocol, sockets,
/// or connection-file lifecycle.
#[derive(Debug)]
pub enum Error {
    /// A ZeroMQ multipart message did not contain the `<IDS|MSG>` delimiter.
    MissingDelimiter,

    /// Fewer payload frames followed the delimiter than the protocol requires.
    InsufficientParts(usize, usize),

    /// The signature frame was not valid hexadecimal.
    InvalidHmac(Vec<u8>, hex::FromHexError),

    /// The signature frame did not match the computed HMAC.
    BadSignature,

    /// A message part was not valid UTF-8.
    Utf8Error(String, std::str::Utf8Error),

    /// A message part was not valid JSON.
    JsonParseError(String, serde_json::Error),

    /// A message part parsed as JSON but didn't match the expected schema.
    InvalidPart(String, serde_json::Error),

    /// The signing key could not be used to construct an HMAC instance.
    InvalidKey(hmac::digest::InvalidLength),

    /// A ZeroMQ operation failed on the named socket.
    Zmq(String, zmq::Error),

    /// Failed to bind the named socket to the given endpoint.
    SocketBind(String, String, zmq::Error),

    /// Message content could not be serialized to JSON.
    CannotSerialize(serde_json::Error),

    /// Failed to create the connection file's temporary directory.
    CreateConnectionDir(std::io::Error),

    /// Failed to write the connection file.
    WriteConnectionFile(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingDelimiter => {
                write!(f, "ZeroMQ message did not include the <IDS|MSG> delimiter")
            },
            Error::InsufficientParts(found, expected) => {
                write!(
                    f,
                    "message had {} parts after the delimiter, expected at least {}",
                    found, expected
                )
            },
            Error::InvalidHmac(data, err) => {
                write!(f, "signature {:?} is not valid hex: {}", data, err)
            },
            Error::BadSignature => write!(f, "message signature does not match"),
            Error::Utf8Error(part, err) => write!(f, "part '{}' is not valid UTF-8: {}", part, err),
            Error::JsonParseError(part, err) => write!(f, "part '{}' is not valid JSON: {}", part, err),
            Error::InvalidPart(part, err) => {
                write!(f, "part '{}' does not match the expected schema: {}", part, err)
            },
            Error::InvalidKey(err) => write!(f, "signing key cannot be used: {}", err),
            Error::Zmq(name, err) => write!(f, "ZeroMQ error on '{}' socket: {}", name, err),
            Error::SocketBind(name, endpoint, err) => {
                write!(f, "could not bind '{}' socket to {}: {}", name, endpoint, err)
            },
            Error::CannotSerialize(err) => write!(f, "could not serialize message: {}", err),
            Error::CreateConnectionDir(err) => {
                write!(f, "could not create connection file directory: {}", err)
            },
            Error::WriteConnectionFile(err) => write!(f, "could not write connection file: {}", err),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
