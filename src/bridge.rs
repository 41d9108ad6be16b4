use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use log::info;
use log::warn;

use crate::connection_file::ConnectionFile;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::host::CellResult;
use crate::host::DisplayhookGuard;
use crate::host::Host;
use crate::publisher::Publisher;
use crate::responder::heartbeat::HeartbeatResponder;
use crate::responder::shell::ShellResponder;
use crate::session::Session;
use crate::socket::Socket;
use crate::wire::status::ExecutionState;
use crate::wire::stream::Stream;

/// How long `Bridge::close` waits for each responder thread to notice the
/// running flag and exit (spec §4.3).
const RESPONDER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

const RICH_MIME_TYPES: &[&str] = &[
    "text/html",
    "text/latex",
    "text/markdown",
    "image/png",
    "image/jpeg",
    "image/svg+xml",
    "application/json",
    "application/javascript",
    "application/pdf",
];

/// The long-lived object a host process constructs to become a Jupyter
/// IOPub endpoint. Owns the wire endpoint and, once [`Bridge::install`] is
/// called, the host's observer registrations.
pub struct Bridge {
    publisher: Arc<Publisher>,
    host: Arc<Mutex<dyn Host>>,
    running: Arc<AtomicBool>,
    shell_thread: Option<JoinHandle<()>>,
    heartbeat_thread: Option<JoinHandle<()>>,
    _control: Socket,
    _stdin: Socket,
    connection_file: Option<ConnectionFile>,
}

impl Bridge {
    /// Binds the endpoint, writes the connection file, and starts the
    /// Shell and Heartbeat responders. The host is not yet wired up to
    /// the bridge's observer hooks; call [`Bridge::install`] for that.
    pub fn start(ip: &str, host: Arc<Mutex<dyn Host>>) -> Result<Self, Error> {
        let (session, key) = Session::create()?;
        let endpoint = Endpoint::start(ip, session, &key)?;
        let (shell, iopub, heartbeat, control, stdin, connection_file) = endpoint.into_parts();

        let publisher = Arc::new(Publisher::new(iopub, shell.session.clone()));
        let running = Arc::new(AtomicBool::new(true));

        let shell_thread = ShellResponder::spawn(shell, publisher.clone(), host.clone(), running.clone());
        let heartbeat_thread = HeartbeatResponder::spawn(heartbeat, running.clone());

        Ok(Self {
            publisher,
            host,
            running,
            shell_thread: Some(shell_thread),
            heartbeat_thread: Some(heartbeat_thread),
            _control: control,
            _stdin: stdin,
            connection_file: Some(connection_file),
        })
    }

    pub fn connection_file_path(&self) -> &std::path::Path {
        self.connection_file
            .as_ref()
            .expect("connection file is only taken during close")
            .path()
    }

    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }

    /// Attaches the bridge's observer hooks to the host (spec §4.7).
    /// Idempotent only in the sense that the host's own registries are:
    /// calling this twice registers two sets of hooks.
    pub fn install(&self) {
        {
            let mut host = self.host.lock().unwrap();
            for mime_type in RICH_MIME_TYPES {
                host.enable_formatter(mime_type);
            }
        }

        self.register_cell_finished();
        self.wrap_streams();
        self.register_display_publisher();

        if let Err(err) = self.publisher.publish_status(ExecutionState::Idle, None) {
            warn!("failed to publish post-install status: {}", err);
        }
    }

    fn register_cell_finished(&self) {
        let publisher = self.publisher.clone();
        let host = self.host.clone();
        self.host
            .lock()
            .unwrap()
            .register_cell_finished(Box::new(move |result: &CellResult| {
                on_cell_finished(&publisher, &host, result);
            }));
    }

    fn wrap_streams(&self) {
        let stdout_publisher = self.publisher.clone();
        let stderr_publisher = self.publisher.clone();
        let mut host = self.host.lock().unwrap();
        host.wrap_stdout(Box::new(TeeWriter::new(
            Box::new(std::io::stdout()),
            Stream::Stdout,
            stdout_publisher,
        )));
        host.wrap_stderr(Box::new(TeeWriter::new(
            Box::new(std::io::stderr()),
            Stream::Stderr,
            stderr_publisher,
        )));
    }

    fn register_display_publisher(&self) {
        let publisher = self.publisher.clone();
        self.host
            .lock()
            .unwrap()
            .register_display_publisher(Box::new(move |event| {
                let transient = event.transient.clone().unwrap_or_else(|| serde_json::json!({}));
                let result = if event.update {
                    publisher.publish_update_display_data(event.data.clone(), event.metadata.clone(), transient, None)
                } else {
                    publisher.publish_display_data(event.data.clone(), event.metadata.clone(), transient, None)
                };
                if let Err(err) = result {
                    warn!("failed to publish display event: {}", err);
                }
            }));
    }

    /// Shuts the bridge down: stops the responders, tears down the
    /// sockets, and removes the connection file. Safe to call at most
    /// once; subsequent drops are then no-ops.
    pub fn close(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.shell_thread.take() {
            join_with_timeout(handle, RESPONDER_JOIN_TIMEOUT, "shell");
        }
        if let Some(handle) = self.heartbeat_thread.take() {
            join_with_timeout(handle, RESPONDER_JOIN_TIMEOUT, "heartbeat");
        }

        if let Some(connection_file) = self.connection_file.take() {
            connection_file.remove();
        }

        info!("bridge closed");
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if self.connection_file.is_some() {
            self.close();
        }
    }
}

/// Joins `handle`, giving up (and leaking the thread) after `timeout`.
/// `std::thread::JoinHandle` has no native timed join, so a monitor
/// thread performs the blocking join and reports back over a bounded
/// channel.
fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration, name: &str) {
    let (tx, rx) = crossbeam::channel::bounded(1);
    std::thread::spawn(move || {
        let _ = handle.join();
        let _ = tx.send(());
    });
    if rx.recv_timeout(timeout).is_err() {
        warn!("{} responder did not exit within {:?}", name, timeout);
    }
}

/// Implements the busy → (error | execute_result | ∅) → idle bracketing
/// of spec §4.9. The transition to idle always runs, even if formatting
/// or publishing the result itself failed.
fn on_cell_finished(publisher: &Publisher, host: &Arc<Mutex<dyn Host>>, result: &CellResult) {
    let execution_count = publisher.next_execution_count();

    if let Err(err) = publisher.publish_status(ExecutionState::Busy, None) {
        warn!("failed to publish busy status: {}", err);
    }

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        if let Some(exception) = &result.error_in_exec {
            if let Err(err) = publisher.publish_error(
                exception.ename.clone(),
                exception.evalue.clone(),
                exception.traceback.clone(),
                None,
            ) {
                warn!("failed to publish error: {}", err);
            }
        } else if let Some(value) = &result.result {
            let host = host.lock().unwrap();
            let (data, metadata) = host
                .format(value)
                .unwrap_or_else(|| (crate::publisher::plain_text_fallback(&host.repr(value)), serde_json::json!({})));
            drop(host);
            if let Err(err) = publisher.publish_execute_result(data, metadata, execution_count, None) {
                warn!("failed to publish execute_result: {}", err);
            }
        }
    }));

    if outcome.is_err() {
        warn!("cell-finished observer panicked while publishing the result");
    }

    if let Err(err) = publisher.publish_status(ExecutionState::Idle, None) {
        warn!("failed to publish idle status: {}", err);
    }
}

/// Wraps a standard stream so every non-empty write is both forwarded to
/// the original stream and, unless the displayhook is currently active on
/// this thread, published as a `stream` IOPub message (spec §4.7 point 4,
/// §9's "suppress duplicate textual echo").
struct TeeWriter {
    inner: Box<dyn Write + Send>,
    name: Stream,
    publisher: Arc<Publisher>,
}

impl TeeWriter {
    fn new(inner: Box<dyn Write + Send>, name: Stream, publisher: Arc<Publisher>) -> Self {
        Self { inner, name, publisher }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;

        if written > 0 && !DisplayhookGuard::is_active() {
            if let Ok(text) = std::str::from_utf8(&buf[..written]) {
                if !text.is_empty() {
                    if let Err(err) = self.publisher.publish_stream(self.name, text.to_string(), None) {
                        warn!("failed to publish stream output: {}", err);
                    }
                }
            }
        }

        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::jupyter_message::JupyterMessage;

    /// A minimal in-memory `Host` used only to drive
    /// [`on_cell_finished`]'s bracketing directly, without a live socket.
    struct FakeHost;

    impl Host for FakeHost {
        fn enable_formatter(&mut self, _mime_type: &str) {}
        fn format(&self, value: &serde_json::Value) -> Option<(serde_json::Value, serde_json::Value)> {
            Some((crate::publisher::plain_text_fallback(&value.to_string()), serde_json::json!({})))
        }
        fn repr(&self, value: &serde_json::Value) -> String {
            value.to_string()
        }
        fn register_cell_finished(&mut self, _callback: Box<dyn FnMut(&CellResult) + Send>) {}
        fn wrap_stdout(&mut self, _writer: Box<dyn Write + Send>) {}
        fn wrap_stderr(&mut self, _writer: Box<dyn Write + Send>) {}
        fn register_display_publisher(&mut self, _callback: Box<dyn FnMut(&crate::host::DisplayEvent) + Send>) {}
        fn eval_expression(&self, _expression: &str) -> Result<serde_json::Value, crate::wire::exception::Exception> {
            Ok(serde_json::Value::Null)
        }
        fn python_version(&self) -> String {
            "3.11.0".to_string()
        }
    }

    /// Full busy/idle-ordering assertions over the wire live in
    /// `tests/end_to_end.rs`; these unit tests only check the parts that
    /// don't need a subscriber on the other end.
    fn recording_publisher() -> (Arc<Publisher>, Socket) {
        let ctx = zmq::Context::new();
        let session = Session::from_key("test-key").unwrap();
        let socket = Socket::new(session.clone(), &ctx, "iopub".to_string(), zmq::PUB, "tcp://127.0.0.1:0").unwrap();
        let publisher = Arc::new(Publisher::new(
            Socket::new(session.clone(), &ctx, "iopub2".to_string(), zmq::PUB, "tcp://127.0.0.1:0").unwrap(),
            session,
        ));
        (publisher, socket)
    }

    #[test]
    fn on_cell_finished_brackets_result_with_busy_and_idle() {
        let (publisher, _unused_socket) = recording_publisher();
        let host: Arc<Mutex<dyn Host>> = Arc::new(Mutex::new(FakeHost));
        let before = publisher.execution_count();

        on_cell_finished(
            &publisher,
            &host,
            &CellResult {
                result: Some(serde_json::json!(42)),
                error_in_exec: None,
            },
        );

        assert_eq!(publisher.execution_count(), before + 1);
    }

    #[test]
    fn jupyter_message_session_matches_socket_session() {
        let (_publisher, socket) = recording_publisher();
        let msg = JupyterMessage::create(crate::wire::status::KernelStatus {
            execution_state: ExecutionState::Idle,
        }, None, &socket.session);
        assert_eq!(msg.header.session, socket.session.session_id);
    }
}
