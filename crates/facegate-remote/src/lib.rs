//! Remote command channel surface.
//!
//! The controller treats the remote channel as an external collaborator:
//! connection management, authentication and wire transport live outside
//! the core. What the core consumes is narrow and lives here:
//!
//! - [`RemoteCommand`] — the inbound command shape (JSON, tagged by
//!   `cmd`).
//! - [`RemoteSink`] — the outbound surface: door status reports and
//!   categorized log entries. Reports are fire-and-forget; a disconnected
//!   channel must never affect local door operation.
//! - [`ReconnectPolicy`] / [`ReconnectSupervisor`] — the capped
//!   exponential backoff schedule driving reconnection, expressed as a
//!   policy object rather than a thread-sleep loop so it is testable and
//!   stops promptly at shutdown.

pub mod backoff;
pub mod command;
pub mod sink;

pub use backoff::{ReconnectPolicy, ReconnectSupervisor};
pub use command::RemoteCommand;
pub use sink::{LogReport, NullSink, RecordingSink, RemoteSink};
