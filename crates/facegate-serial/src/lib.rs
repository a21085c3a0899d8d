//! Serial link to the vision coprocessor.
//!
//! This crate owns the byte stream and the protocol engine around it:
//!
//! - [`Transport`] runs the continuous reader thread: short-timeout reads,
//!   frame reassembly through the protocol scanner, and routing of each
//!   complete frame to either the response hand-off channel or the event
//!   dispatcher.
//! - [`Correlator`] implements send-and-wait command correlation. The wire
//!   format carries no correlation identifier, so the protocol is strictly
//!   single-in-flight: one mutex guards the whole send-and-wait critical
//!   section, and stale responses left over from a timed-out command are
//!   drained before every send.
//! - [`EventDispatcher`] fans classified events out to registered
//!   observers, isolating observer failures from the read loop.
//! - [`VisionLink`] ties the pieces together and exposes the coprocessor's
//!   command set (`PING`, `STATUS`, `START`, ...).
//!
//! The transport is generic over `io::Read`/`io::Write` halves. Production
//! code opens a real serial port via [`VisionLink::open`]; tests use the
//! in-memory link from [`mock`].

pub mod correlator;
pub mod dispatcher;
pub mod link;
pub mod mock;
pub mod transport;

pub use correlator::Correlator;
pub use dispatcher::EventDispatcher;
pub use link::{SerialConfig, VisionLink, VisionStatus};
pub use transport::Transport;
