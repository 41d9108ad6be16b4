use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread::JoinHandle;

use log::debug;
use log::trace;
use log::warn;

use crate::host::Host;
use crate::publisher::Publisher;
use crate::responder::POLL_TIMEOUT_MS;
use crate::session::Session;
use crate::socket::Socket;
use crate::wire::execute_reply::ExecuteReply;
use crate::wire::execute_reply::UserExpressionResult;
use crate::wire::jupyter_message::JupyterMessage;
use crate::wire::jupyter_message::Message;
use crate::wire::jupyter_message::Status;
use crate::wire::kernel_info_reply::KernelInfoReply;

/// Services `kernel_info_request` and `execute_request` on the Shell
/// channel. Owns the Shell socket exclusively (spec §5: "the only thread
/// that receives or sends on the Shell ROUTER socket"); its only shared
/// state is the IOPub `Publisher` and the read-only `Host` collaborator.
pub struct ShellResponder {
    socket: Socket,
    publisher: Arc<Publisher>,
    host: Arc<Mutex<dyn Host>>,
    running: Arc<AtomicBool>,
}

impl ShellResponder {
    pub fn spawn(
        socket: Socket,
        publisher: Arc<Publisher>,
        host: Arc<Mutex<dyn Host>>,
        running: Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        let responder = Self {
            socket,
            publisher,
            host,
            running,
        };
        std::thread::Builder::new()
            .name("iopub-bridge-shell".to_string())
            .spawn(move || responder.run())
            .expect("failed to spawn shell responder thread")
    }

    fn run(self) {
        debug!("shell responder starting");
        while self.running.load(Ordering::SeqCst) {
            match self.socket.poll_in(POLL_TIMEOUT_MS) {
                Ok(true) => {},
                Ok(false) => continue,
                Err(err) => {
                    warn!("shell socket poll failed, exiting responder: {}", err);
                    break;
                },
            }

            match Message::read_from_socket(&self.socket) {
                Ok(Some(message)) => self.dispatch(message),
                Ok(None) => trace!("ignoring unrecognized shell message type"),
                Err(err) => warn!("dropping malformed shell message: {}", err),
            }
        }
        debug!("shell responder exiting");
    }

    fn dispatch(&self, message: Message) {
        match message {
            Message::KernelInfoRequest(request) => self.handle_kernel_info(request),
            Message::ExecuteRequest(request) => self.handle_execute(request),
            _ => trace!("shell responder does not expect this message variant"),
        }
    }

    fn handle_kernel_info(&self, request: JupyterMessage<crate::wire::kernel_info_request::KernelInfoRequest>) {
        let python_version = self.host.lock().unwrap().python_version();
        let reply_content = KernelInfoReply::for_host(&python_version);
        let reply = request.create_reply(reply_content, self.session());

        let parent_header = reply.header.clone();
        if let Err(err) = reply.send(&self.socket) {
            warn!("failed to send kernel_info_reply: {}", err);
            return;
        }

        if let Err(err) = self.publisher.publish_idle_for(parent_header) {
            warn!("failed to publish handshake status: {}", err);
        }
    }

    fn handle_execute(&self, request: JupyterMessage<crate::wire::execute_request::ExecuteRequest>) {
        let mut results = BTreeMap::new();
        {
            let host = self.host.lock().unwrap();
            for (name, expression) in &request.content.user_expressions {
                let result = match host.eval_expression(expression) {
                    Ok(value) => UserExpressionResult::Ok {
                        data: crate::publisher::plain_text_fallback(&host.repr(&value)),
                        metadata: serde_json::json!({}),
                    },
                    Err(exception) => UserExpressionResult::Error {
                        ename: exception.ename,
                        evalue: exception.evalue,
                        traceback: exception.traceback,
                    },
                };
                results.insert(name.clone(), result);
            }
        }

        let reply = request.create_reply(
            ExecuteReply {
                status: Status::Ok,
                execution_count: self.publisher.execution_count(),
                user_expressions: results,
            },
            self.session(),
        );

        if let Err(err) = reply.send(&self.socket) {
            warn!("failed to send execute_reply: {}", err);
        }
    }

    fn session(&self) -> &Session {
        &self.socket.session
    }
}
