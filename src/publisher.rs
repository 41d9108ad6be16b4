use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use serde_json::json;
use serde_json::Value;

use crate::error::Error;
use crate::session::Session;
use crate::socket::Socket;
use crate::widget::rewrite_widget_data;
use crate::wire::display_data::DisplayData;
use crate::wire::execute_error::ExecuteError;
use crate::wire::execute_result::ExecuteResult;
use crate::wire::exception::Exception;
use crate::wire::header::JupyterHeader;
use crate::wire::jupyter_message::JupyterMessage;
use crate::wire::status::ExecutionState;
use crate::wire::status::KernelStatus;
use crate::wire::stream::Stream;
use crate::wire::stream::StreamOutput;
use crate::wire::update_display_data::UpdateDisplayData;

/// The host-thread API for broadcasting outputs on IOPub.
///
/// Per spec §5 the IOPub socket is written from both the host thread and
/// the Shell responder thread (for the handshake's `status: idle`); the
/// `Mutex` here is what serializes those writers. `execution_count` is
/// the bridge-scoped counter incremented once per observed cell-finished
/// event, ahead of any message published for that event.
pub struct Publisher {
    iopub: Mutex<Socket>,
    session: Session,
    execution_count: AtomicU32,
}

impl Publisher {
    pub fn new(iopub: Socket, session: Session) -> Self {
        Self {
            iopub: Mutex::new(iopub),
            session,
            execution_count: AtomicU32::new(0),
        }
    }

    /// Increments and returns the new execution count. Called once per
    /// observed cell-finished event, before any message is published for
    /// it.
    pub fn next_execution_count(&self) -> u32 {
        self.execution_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn execution_count(&self) -> u32 {
        self.execution_count.load(Ordering::SeqCst)
    }

    pub fn publish_stream(&self, name: Stream, text: String, parent: Option<JupyterHeader>) -> Result<(), Error> {
        self.send(StreamOutput { name, text }, parent)
    }

    pub fn publish_execute_result(
        &self,
        data: Value,
        metadata: Value,
        execution_count: u32,
        parent: Option<JupyterHeader>,
    ) -> Result<(), Error> {
        self.send(
            ExecuteResult {
                execution_count,
                data: rewrite_widget_data(&data),
                metadata,
            },
            parent,
        )
    }

    pub fn publish_display_data(
        &self,
        data: Value,
        metadata: Value,
        transient: Value,
        parent: Option<JupyterHeader>,
    ) -> Result<(), Error> {
        self.send(
            DisplayData {
                data: rewrite_widget_data(&data),
                metadata,
                transient,
            },
            parent,
        )
    }

    pub fn publish_update_display_data(
        &self,
        data: Value,
        metadata: Value,
        transient: Value,
        parent: Option<JupyterHeader>,
    ) -> Result<(), Error> {
        self.send(
            UpdateDisplayData {
                data: rewrite_widget_data(&data),
                metadata,
                transient,
            },
            parent,
        )
    }

    pub fn publish_error(
        &self,
        ename: String,
        evalue: String,
        traceback: Vec<String>,
        parent: Option<JupyterHeader>,
    ) -> Result<(), Error> {
        self.send(
            ExecuteError {
                exception: Exception { ename, evalue, traceback },
            },
            parent,
        )
    }

    pub fn publish_status(&self, state: ExecutionState, parent: Option<JupyterHeader>) -> Result<(), Error> {
        log::trace!("publishing status: {}", state);
        self.send(KernelStatus { execution_state: state }, parent)
    }

    /// Convenience for the reply-and-idle pattern that `kernel_info_reply`
    /// needs on the handshake path: a `status: idle` addressed at the
    /// request's own header so a freshly-connecting consumer has
    /// something to key off of (spec §4.4).
    pub fn publish_idle_for(&self, parent_header: JupyterHeader) -> Result<(), Error> {
        self.publish_status(ExecutionState::Idle, Some(parent_header))
    }

    fn send<T: crate::wire::jupyter_message::ProtocolMessage>(
        &self,
        content: T,
        parent: Option<JupyterHeader>,
    ) -> Result<(), Error> {
        let message = JupyterMessage::create(content, parent, &self.session);
        let iopub = self.iopub.lock().unwrap();
        message.send(&iopub)
    }
}

/// Fallback MIME bundle used when formatting a host value raises (spec
/// §4.7 point 3 / §7 `HostFormattingFailure`).
pub fn plain_text_fallback(repr: &str) -> Value {
    json!({ "text/plain": repr })
}
