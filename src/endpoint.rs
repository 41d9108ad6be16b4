use log::info;

use crate::connection_file::ChannelPorts;
use crate::connection_file::ConnectionFile;
use crate::connection_file::ConnectionInfo;
use crate::error::Error;
use crate::session::Session;
use crate::socket::Socket;

/// The bridge's five ZeroMQ sockets, bound and ready, plus the connection
/// file a sidecar reads to find them.
///
/// Per spec §4.3, Control and Stdin are bound (so the connection file is a
/// complete, conformant descriptor) but never driven by a responder loop.
pub struct Endpoint {
    pub shell: Socket,
    pub iopub: Socket,
    pub heartbeat: Socket,
    pub control: Socket,
    pub stdin: Socket,
    connection_file: ConnectionFile,
}

impl Endpoint {
    /// Binds all five channels on `ip` to OS-assigned ports, writes the
    /// connection file, and returns the endpoint.
    pub fn start(ip: &str, session: Session, key: &str) -> Result<Self, Error> {
        let ctx = zmq::Context::new();

        let iopub = Socket::new(session.clone(), &ctx, "iopub".to_string(), zmq::PUB, &tcp(ip))?;
        let shell = Socket::new(session.clone(), &ctx, "shell".to_string(), zmq::ROUTER, &tcp(ip))?;
        let heartbeat = Socket::new(session.clone(), &ctx, "heartbeat".to_string(), zmq::REP, &tcp(ip))?;
        let control = Socket::new(session.clone(), &ctx, "control".to_string(), zmq::ROUTER, &tcp(ip))?;
        let stdin = Socket::new(session.clone(), &ctx, "stdin".to_string(), zmq::ROUTER, &tcp(ip))?;

        let ports = ChannelPorts {
            shell: port_of(&shell)?,
            iopub: port_of(&iopub)?,
            hb: port_of(&heartbeat)?,
            control: port_of(&control)?,
            stdin: port_of(&stdin)?,
        };
        let info = ConnectionInfo::new(ip, key, ports);
        let connection_file = ConnectionFile::write(&info)?;

        info!(
            "bridge listening: shell={} iopub={} hb={} control={} stdin={} connection_file={}",
            ports.shell,
            ports.iopub,
            ports.hb,
            ports.control,
            ports.stdin,
            connection_file.path().display()
        );

        Ok(Self {
            shell,
            iopub,
            heartbeat,
            control,
            stdin,
            connection_file,
        })
    }

    pub fn connection_file_path(&self) -> &std::path::Path {
        self.connection_file.path()
    }

    /// Splits the endpoint into its five sockets and the connection file,
    /// so the caller can hand each socket to its owning thread or object
    /// (spec §5: each socket has a single owner) while retaining the
    /// connection file for removal at shutdown.
    pub fn into_parts(self) -> (Socket, Socket, Socket, Socket, Socket, ConnectionFile) {
        (
            self.shell,
            self.iopub,
            self.heartbeat,
            self.control,
            self.stdin,
            self.connection_file,
        )
    }
}

fn tcp(ip: &str) -> String {
    format!("tcp://{}:0", ip)
}

fn port_of(socket: &Socket) -> Result<u16, Error> {
    let endpoint = socket.endpoint()?;
    endpoint
        .rsplit(':')
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| Error::SocketBind(socket.name.clone(), endpoint.clone(), zmq::Error::EINVAL))
}
