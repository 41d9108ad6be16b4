//! A minimal stand-in for the Jupyter sidecar: connects to a running
//! [`Bridge`](iopub_bridge::Bridge)'s channels the way a real frontend
//! would, using nothing but the connection file and the crate's public
//! wire types. Grounded on the same role `amalthea`'s
//! `fixtures::dummy_frontend::DummyFrontend` plays for its own test suite,
//! simplified because this bridge has no registration handshake.

use iopub_bridge::connection_file::ConnectionInfo;
use iopub_bridge::session::Session;
use iopub_bridge::wire::jupyter_message::Message;
use iopub_bridge::wire::jupyter_message::ProtocolMessage;
use iopub_bridge::wire::wire_message::sign;
use iopub_bridge::wire::wire_message::WireMessage;
use iopub_bridge::wire::wire_message::MSG_DELIM;

pub struct DummyFrontend {
    pub shell: zmq::Socket,
    pub iopub: zmq::Socket,
    pub heartbeat: zmq::Socket,
    session: Session,
}

impl DummyFrontend {
    /// Connects to every channel named in `connection_file_path`. The
    /// IOPub subscription is given a brief grace period to complete
    /// before returning, since PUB/SUB has no connect handshake of its
    /// own.
    pub fn connect(connection_file_path: &std::path::Path) -> Self {
        let contents = std::fs::read_to_string(connection_file_path).expect("connection file should be readable");
        let info: ConnectionInfo = serde_json::from_str(&contents).expect("connection file should be valid JSON");
        let session = Session::from_key(&info.key).unwrap();

        let ctx = zmq::Context::new();
        let endpoint = |port: u16| format!("{}://{}:{}", info.transport, info.ip, port);

        let shell = ctx.socket(zmq::DEALER).unwrap();
        shell.connect(&endpoint(info.shell_port)).unwrap();

        let iopub = ctx.socket(zmq::SUB).unwrap();
        iopub.set_subscribe(b"").unwrap();
        iopub.connect(&endpoint(info.iopub_port)).unwrap();

        let heartbeat = ctx.socket(zmq::REQ).unwrap();
        heartbeat.connect(&endpoint(info.hb_port)).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(200));

        Self {
            shell,
            iopub,
            heartbeat,
            session,
        }
    }

    pub fn send_shell<T: ProtocolMessage>(&self, content: T) -> String {
        Self::send(&self.shell, &self.session, content)
    }

    fn send<T: ProtocolMessage>(socket: &zmq::Socket, session: &Session, content: T) -> String {
        let header = iopub_bridge::wire::header::JupyterHeader::create(
            T::message_type(),
            session.session_id.clone(),
            session.username.clone(),
        );
        let msg_id = header.msg_id.clone();

        let header_bytes = serde_json::to_vec(&header).unwrap();
        let parent_bytes = serde_json::to_vec(&serde_json::json!({})).unwrap();
        let metadata_bytes = serde_json::to_vec(&serde_json::json!({})).unwrap();
        let content_bytes = serde_json::to_vec(&content).unwrap();

        let parts = vec![header_bytes, parent_bytes, metadata_bytes, content_bytes];
        let signature = sign(&parts, session.hmac.as_ref());

        let mut frames = vec![MSG_DELIM.to_vec(), signature.into_bytes()];
        frames.extend(parts);
        socket.send_multipart(&frames, 0).unwrap();

        msg_id
    }

    pub fn recv_shell(&self) -> Message {
        Self::recv(&self.shell, &self.session)
    }

    pub fn recv_iopub(&self) -> Message {
        Self::recv(&self.iopub, &self.session)
    }

    /// Polls with a generous timeout so a stalled bridge thread fails the
    /// test instead of hanging the suite.
    fn recv(socket: &zmq::Socket, session: &Session) -> Message {
        let mut items = [socket.as_poll_item(zmq::POLLIN)];
        let count = zmq::poll(&mut items, 10_000).unwrap();
        assert!(count > 0, "timed out waiting for a message on {:?}", socket.get_socket_type());

        let bufs = socket.recv_multipart(0).unwrap();
        let wire = WireMessage::from_buffers(bufs, session.hmac.as_ref()).unwrap();
        Message::from_wire(&wire).unwrap().expect("unrecognized message type")
    }

    pub fn send_heartbeat(&self, payload: &[u8]) {
        self.heartbeat.send(payload, 0).unwrap();
    }

    pub fn recv_heartbeat(&self) -> Vec<u8> {
        let mut items = [self.heartbeat.as_poll_item(zmq::POLLIN)];
        let count = zmq::poll(&mut items, 10_000).unwrap();
        assert!(count > 0, "timed out waiting for heartbeat echo");
        self.heartbeat.recv_bytes(0).unwrap()
    }
}
