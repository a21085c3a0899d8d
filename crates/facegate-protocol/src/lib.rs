//! Wire protocol for the vision coprocessor's serial link.
//!
//! Frames are sentinel-delimited ASCII records (`$` … `#`) with
//! comma-separated fields. This crate is pure: it builds outbound command
//! frames and classifies inbound frames, but performs no I/O. The serial
//! transport in `facegate-serial` feeds bytes into the [`FrameScanner`] and
//! hands each complete frame to [`MessageParser::parse`].
//!
//! # Dialects
//!
//! Two outbound dialects exist and both are supported:
//!
//! - Keyword commands: `$CMD,<name>[,<args>...]#` ([`Command`])
//! - Legacy length-prefixed commands: `$<len>,<func_id>,<args>...#`
//!   ([`build_legacy_command`]), where `<len>` is the exact byte length of
//!   the framed string.
//!
//! Inbound frames are either responses (`$RSP,<len>,<status>,<data>...#`)
//! or event packets (`$<len>,<type>,<data>...#`). Anything else is
//! malformed and dropped by the transport.

pub mod command;
pub mod events;
pub mod legacy;
pub mod parser;
pub mod response;
pub mod scanner;

pub use command::{Command, CommandKind};
pub use events::{FaceDetection, FaceRecognition};
pub use legacy::{LegacyPacket, build_legacy_command, parse_legacy_packet};
pub use parser::{InboundMessage, MessageParser};
pub use response::{Response, ResponseStatus};
pub use scanner::FrameScanner;
