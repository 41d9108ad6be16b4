//! Server-side implementation of the Jupyter wire protocol: turns a host
//! process into an IOPub-publishing kernel endpoint for an external
//! sidecar viewer, without the host having to execute code submitted to
//! it over Shell.

pub mod bridge;
pub mod connection_file;
pub mod endpoint;
pub mod error;
pub mod host;
pub mod publisher;
pub mod responder;
pub mod session;
pub mod socket;
pub mod widget;
pub mod wire;

pub use bridge::Bridge;
pub use error::Error;
pub use error::Result;
pub use host::CellResult;
pub use host::DisplayEvent;
pub use host::Host;
