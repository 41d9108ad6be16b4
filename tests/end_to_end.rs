mod dummy_frontend;

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use assert_matches::assert_matches;
use dummy_frontend::DummyFrontend;
use iopub_bridge::host::CellResult;
use iopub_bridge::host::DisplayEvent;
use iopub_bridge::host::Host;
use iopub_bridge::wire::exception::Exception;
use iopub_bridge::wire::jupyter_message::Message;
use iopub_bridge::wire::jupyter_message::Status;
use iopub_bridge::wire::kernel_info_request::KernelInfoRequest;
use iopub_bridge::wire::status::ExecutionState;
use iopub_bridge::Bridge;

/// A host double that records its observer registrations so tests can
/// drive them directly, and stores the wrapped streams so tests can write
/// through them the way the real host would.
#[derive(Default)]
struct FakeHost {
    stdout: Option<Box<dyn Write + Send>>,
    cell_finished: Option<Box<dyn FnMut(&CellResult) + Send>>,
    #[allow(dead_code)]
    display_publisher: Option<Box<dyn FnMut(&DisplayEvent) + Send>>,
}

impl Host for FakeHost {
    fn enable_formatter(&mut self, _mime_type: &str) {}

    fn format(&self, value: &serde_json::Value) -> Option<(serde_json::Value, serde_json::Value)> {
        Some((
            serde_json::json!({ "text/plain": value.to_string() }),
            serde_json::json!({}),
        ))
    }

    fn repr(&self, value: &serde_json::Value) -> String {
        value.to_string()
    }

    fn register_cell_finished(&mut self, callback: Box<dyn FnMut(&CellResult) + Send>) {
        self.cell_finished = Some(callback);
    }

    fn wrap_stdout(&mut self, writer: Box<dyn Write + Send>) {
        self.stdout = Some(writer);
    }

    fn wrap_stderr(&mut self, _writer: Box<dyn Write + Send>) {}

    fn register_display_publisher(&mut self, callback: Box<dyn FnMut(&DisplayEvent) + Send>) {
        self.display_publisher = Some(callback);
    }

    fn eval_expression(&self, expression: &str) -> Result<serde_json::Value, Exception> {
        Ok(serde_json::Value::String(expression.to_string()))
    }

    fn python_version(&self) -> String {
        "3.11.4".to_string()
    }
}

fn start_bridge() -> (Bridge, Arc<Mutex<FakeHost>>) {
    let _ = env_logger::try_init();

    let fake = Arc::new(Mutex::new(FakeHost::default()));
    let host: Arc<Mutex<dyn Host>> = fake.clone();
    let bridge = Bridge::start("127.0.0.1", host).expect("bridge should bind");
    (bridge, fake)
}

#[test]
fn heartbeat_round_trips_exact_payload() {
    let (bridge, _fake) = start_bridge();
    let frontend = DummyFrontend::connect(bridge.connection_file_path());

    frontend.send_heartbeat(b"ping");
    assert_eq!(frontend.recv_heartbeat(), b"ping");
}

#[test]
fn kernel_info_handshake_reports_the_bridge_identity() {
    let (mut bridge, _fake) = start_bridge();
    let frontend = DummyFrontend::connect(bridge.connection_file_path());

    let msg_id = frontend.send_shell(KernelInfoRequest {});

    let reply = frontend.recv_shell();
    assert_matches!(reply, Message::KernelInfoReply(msg) => {
        assert_eq!(msg.content.status, Status::Ok);
        assert_eq!(msg.content.implementation, "ipython-bridge");
        assert_eq!(msg.content.language_info.name, "python");
        assert_eq!(msg.parent_header.unwrap().msg_id, msg_id);
    });

    let status = frontend.recv_iopub();
    assert_matches!(status, Message::Status(msg) => {
        assert_eq!(msg.content.execution_state, ExecutionState::Idle);
        assert_eq!(msg.parent_header.unwrap().msg_id, msg_id);
    });

    bridge.close();
}

#[test]
fn execute_request_evaluates_user_expressions_without_running_code() {
    let (mut bridge, _fake) = start_bridge();
    let frontend = DummyFrontend::connect(bridge.connection_file_path());

    let mut user_expressions = BTreeMap::new();
    user_expressions.insert("cwd".to_string(), "__import__('os').getcwd()".to_string());

    frontend.send_shell(iopub_bridge::wire::execute_request::ExecuteRequest {
        code: "this is never executed".to_string(),
        silent: false,
        store_history: true,
        user_expressions,
        allow_stdin: false,
        stop_on_error: false,
    });

    let reply = frontend.recv_shell();
    assert_matches!(reply, Message::ExecuteReply(msg) => {
        assert_eq!(msg.content.status, Status::Ok);
        let cwd = msg.content.user_expressions.get("cwd").expect("cwd entry should be present");
        assert_matches!(cwd, iopub_bridge::wire::execute_reply::UserExpressionResult::Ok { data, .. } => {
            assert!(data.get("text/plain").is_some());
        });
    });

    bridge.close();
}

#[test]
fn stream_writes_are_teed_to_iopub() {
    let (bridge, fake) = start_bridge();
    let frontend = DummyFrontend::connect(bridge.connection_file_path());
    bridge.install();

    {
        let mut host = fake.lock().unwrap();
        let stdout = host.stdout.as_mut().expect("install should have wrapped stdout");
        stdout.write_all(b"hello").unwrap();
    }

    // The post-install idle status arrives first.
    assert_matches!(frontend.recv_iopub(), Message::Status(_));

    let stream = frontend.recv_iopub();
    assert_matches!(stream, Message::Stream(msg) => {
        assert_eq!(msg.content.name.to_string(), "stdout");
        assert_eq!(msg.content.text, "hello");
    });
}

#[test]
fn cell_finished_brackets_the_result_with_busy_and_idle() {
    let (bridge, fake) = start_bridge();
    let frontend = DummyFrontend::connect(bridge.connection_file_path());
    bridge.install();

    assert_matches!(frontend.recv_iopub(), Message::Status(_)); // post-install idle

    {
        let mut host = fake.lock().unwrap();
        let callback = host.cell_finished.as_mut().expect("install should register a cell-finished observer");
        callback(&CellResult {
            result: Some(serde_json::json!(42)),
            error_in_exec: None,
        });
    }

    assert_matches!(frontend.recv_iopub(), Message::Status(msg) => {
        assert_eq!(msg.content.execution_state, ExecutionState::Busy);
    });
    assert_matches!(frontend.recv_iopub(), Message::ExecuteResult(msg) => {
        assert_eq!(msg.content.execution_count, 1);
        assert_eq!(msg.content.data["text/plain"], "42");
    });
    assert_matches!(frontend.recv_iopub(), Message::Status(msg) => {
        assert_eq!(msg.content.execution_state, ExecutionState::Idle);
    });
}

#[test]
fn displayhook_active_writes_are_not_teed_to_iopub() {
    let (bridge, fake) = start_bridge();
    let frontend = DummyFrontend::connect(bridge.connection_file_path());
    bridge.install();

    assert_matches!(frontend.recv_iopub(), Message::Status(_)); // post-install idle

    {
        let mut host = fake.lock().unwrap();
        let stdout = host.stdout.as_mut().expect("install should have wrapped stdout");
        let _guard = iopub_bridge::host::DisplayhookGuard::enter();
        stdout.write_all(b"42\n").unwrap();
    }

    // The suppressed write leaves no stream message behind; the next
    // genuine write (issued outside the guard) is the first one seen.
    {
        let mut host = fake.lock().unwrap();
        let stdout = host.stdout.as_mut().unwrap();
        stdout.write_all(b"real output").unwrap();
    }

    assert_matches!(frontend.recv_iopub(), Message::Stream(msg) => {
        assert_eq!(msg.content.text, "real output");
    });
}

#[test]
fn widget_view_mime_never_reaches_the_wire() {
    let (bridge, _fake) = start_bridge();
    let frontend = DummyFrontend::connect(bridge.connection_file_path());

    let data = serde_json::json!({
        "application/vnd.jupyter.widget-view+json": {"model_id": "abc"},
    });
    bridge
        .publisher()
        .publish_display_data(data.clone(), serde_json::json!({}), serde_json::json!({}), None)
        .unwrap();

    let published = frontend.recv_iopub();
    assert_matches!(published, Message::DisplayData(msg) => {
        assert!(msg.content.data.get("application/vnd.jupyter.widget-view+json").is_none());
        assert!(msg.content.data.get("text/html").is_some());
        assert!(msg.content.data.get("text/plain").is_some());
    });
    assert!(data.get("application/vnd.jupyter.widget-view+json").is_some());
}
