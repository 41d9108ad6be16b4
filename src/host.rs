use std::cell::Cell;
use std::io::Write;

use serde_json::Value;

use crate::wire::exception::Exception;

thread_local! {
    /// Raised around a host displayhook invocation on the thread running
    /// it, so a concurrent stream-tee write on that same thread can tell
    /// it's seeing the interpreter's own echo of a result rather than
    /// genuine program output (spec §9: "the displayhook guard is a
    /// thread-local").
    static DISPLAYHOOK_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// RAII guard that raises the current thread's displayhook flag for its
/// lifetime, lowering it again on every exit path including unwinding.
pub struct DisplayhookGuard;

impl DisplayhookGuard {
    pub fn enter() -> Self {
        DISPLAYHOOK_ACTIVE.with(|flag| flag.set(true));
        Self
    }

    /// Whether the current thread is inside a displayhook invocation.
    pub fn is_active() -> bool {
        DISPLAYHOOK_ACTIVE.with(|flag| flag.get())
    }
}

impl Drop for DisplayhookGuard {
    fn drop(&mut self) {
        DISPLAYHOOK_ACTIVE.with(|flag| flag.set(false));
    }
}

/// The outcome of a host cell finishing, as reported to a registered
/// cell-finished callback.
#[derive(Debug, Clone)]
pub struct CellResult {
    pub result: Option<Value>,
    pub error_in_exec: Option<Exception>,
}

/// A display-publish call the host made, as reported to a registered
/// display-publisher callback.
#[derive(Debug, Clone)]
pub struct DisplayEvent {
    pub data: Value,
    pub metadata: Value,
    pub transient: Option<Value>,
    pub update: bool,
}

/// The observer interface a host process implements to let the bridge
/// attach itself, replacing the monkey-patching a dynamic host language
/// would use (spec §9).
pub trait Host: Send {
    /// Enables a MIME formatter that's off by default on a terminal host.
    /// A host with no such formatter for `mime_type` is free to no-op.
    fn enable_formatter(&mut self, mime_type: &str);

    /// Produces the MIME bundle for `value` using the host's
    /// display-formatter machinery, or `None` if nothing can format it.
    fn format(&self, value: &Value) -> Option<(Value, Value)>;

    /// The host's textual representation of `value`, used for the
    /// `text/plain` fallback when `format` fails or the bridge has to
    /// evaluate a user expression.
    fn repr(&self, value: &Value) -> String;

    fn register_cell_finished(&mut self, callback: Box<dyn FnMut(&CellResult) + Send>);

    fn wrap_stdout(&mut self, writer: Box<dyn Write + Send>);
    fn wrap_stderr(&mut self, writer: Box<dyn Write + Send>);

    fn register_display_publisher(&mut self, callback: Box<dyn FnMut(&DisplayEvent) + Send>);

    /// Evaluates a single `user_expressions` entry in the host's global
    /// scope (spec §4.4). Not part of the original monkey-patching
    /// contract in §6 — the Shell responder needs it to answer
    /// `execute_request`'s conformance probe, so it's exposed here rather
    /// than invented ad hoc in the responder.
    fn eval_expression(&self, expression: &str) -> Result<Value, Exception>;

    /// The host's Python version string (`"3.11.4"`-shaped), reported in
    /// `kernel_info_reply.language_info.version`.
    fn python_version(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_active_only_within_its_scope() {
        assert!(!DisplayhookGuard::is_active());
        {
            let _guard = DisplayhookGuard::enter();
            assert!(DisplayhookGuard::is_active());
        }
        assert!(!DisplayhookGuard::is_active());
    }

    #[test]
    fn guard_lowers_on_panic_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _guard = DisplayhookGuard::enter();
            panic!("simulated failure mid-hook");
        });
        assert!(result.is_err());
        assert!(!DisplayhookGuard::is_active());
    }
}
