pub mod heartbeat;
pub mod shell;

/// How long each responder's poll waits before checking its running flag
/// again (spec §4.3/§4.4/§4.5: "polls ... with a 1-second timeout").
pub const POLL_TIMEOUT_MS: i64 = 1000;
