use log::trace;

use crate::error::Error;
use crate::session::Session;

/// A bound ZeroMQ socket paired with the session used to sign and verify
/// traffic on it.
///
/// The bridge only ever binds (it is the server side of the Jupyter wire
/// protocol), so this wrapper doesn't support connecting to a remote
/// endpoint the way a frontend client would.
pub struct Socket {
    pub name: String,
    pub socket: zmq::Socket,
    pub session: Session,
}

impl Socket {
    /// Creates a socket of `kind` and binds it to `endpoint`.
    pub fn new(
        session: Session,
        ctx: &zmq::Context,
        name: String,
        kind: zmq::SocketType,
        endpoint: &str,
    ) -> Result<Self, Error> {
        let socket = ctx
            .socket(kind)
            .map_err(|err| Error::Zmq(name.clone(), err))?;
        socket
            .bind(endpoint)
            .map_err(|err| Error::SocketBind(name.clone(), endpoint.to_string(), err))?;
        trace!("bound '{}' socket to {}", name, endpoint);
        Ok(Self { name, socket, session })
    }

    /// The endpoint this socket ended up bound to (resolves `tcp://*:0`
    /// wildcard bindings to their assigned port).
    pub fn endpoint(&self) -> Result<String, Error> {
        self.socket
            .get_last_endpoint()
            .map_err(|err| Error::Zmq(self.name.clone(), err))?
            .map_err(|_| Error::Zmq(self.name.clone(), zmq::Error::EINVAL))
    }

    /// Polls this socket for `timeout_ms` and returns whether it's
    /// readable. Used by responder loops to wake periodically and check
    /// their shutdown flag rather than blocking forever in `recv`.
    pub fn poll_in(&self, timeout_ms: i64) -> Result<bool, Error> {
        let mut items = [self.socket.as_poll_item(zmq::POLLIN)];
        let count = zmq::poll(&mut items, timeout_ms).map_err(|err| Error::Zmq(self.name.clone(), err))?;
        Ok(count > 0 && items[0].is_readable())
    }

    pub fn recv_multipart(&self) -> Result<Vec<Vec<u8>>, Error> {
        self.socket
            .recv_multipart(0)
            .map_err(|err| Error::Zmq(self.name.clone(), err))
    }

    pub fn send_multipart(&self, frames: &[Vec<u8>]) -> Result<(), Error> {
        self.socket
            .send_multipart(frames, 0)
            .map_err(|err| Error::Zmq(self.name.clone(), err))
    }
}
