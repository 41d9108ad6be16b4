use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::debug;
use log::warn;

use crate::responder::POLL_TIMEOUT_MS;
use crate::socket::Socket;

/// Echoes whatever bytes it receives on the Heartbeat REP socket, used by
/// clients to detect a live kernel. Owns the HB socket exclusively.
pub struct HeartbeatResponder {
    socket: Socket,
    running: Arc<AtomicBool>,
}

impl HeartbeatResponder {
    pub fn spawn(socket: Socket, running: Arc<AtomicBool>) -> JoinHandle<()> {
        let responder = Self { socket, running };
        std::thread::Builder::new()
            .name("iopub-bridge-heartbeat".to_string())
            .spawn(move || responder.run())
            .expect("failed to spawn heartbeat responder thread")
    }

    fn run(self) {
        debug!("heartbeat responder starting");
        while self.running.load(Ordering::SeqCst) {
            match self.socket.poll_in(POLL_TIMEOUT_MS) {
                Ok(true) => {},
                Ok(false) => continue,
                Err(err) => {
                    warn!("heartbeat socket poll failed, exiting responder: {}", err);
                    break;
                },
            }

            let frames = match self.socket.recv_multipart() {
                Ok(frames) => frames,
                Err(err) => {
                    warn!("heartbeat recv failed, exiting responder: {}", err);
                    break;
                },
            };

            if let Err(err) = self.socket.send_multipart(&frames) {
                warn!("heartbeat echo failed, exiting responder: {}", err);
                break;
            }
        }
        debug!("heartbeat responder exiting");
    }
}
