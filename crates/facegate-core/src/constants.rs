//! Protocol-level constants shared across the Facegate crates.
//!
//! The vision coprocessor speaks a sentinel-delimited ASCII protocol over a
//! serial link. Every frame is bounded by a `$` start sentinel and a `#`
//! end sentinel, with comma-separated fields in between:
//!
//! ```text
//! $CMD,PING#                      keyword command
//! $RSP,18,PONG,K230#              response
//! $16,06,10,20,30,40#             event packet (face detection)
//! $25,2,alice,Alice#              legacy length-prefixed command
//! ```
//!
//! Two outbound dialects exist. The keyword dialect prefixes frames with
//! `CMD`; the legacy dialect prefixes them with the exact byte length of the
//! whole frame. Both are built by `facegate-protocol`.
//!
//! # Field Semantics
//!
//! | Token | Purpose |
//! |-------|---------|
//! | `$` | Frame start sentinel |
//! | `#` | Frame end sentinel |
//! | `,` | Field separator |
//! | `CMD` | Keyword command tag (outbound) |
//! | `RSP` | Response tag (inbound) |
//! | `06` | Face detection event type code |
//! | `08` | Face recognition event type code |
//!
//! Modifying these values breaks wire compatibility with the coprocessor
//! firmware.

/// Frame start sentinel.
pub const START_SENTINEL: char = '$';

/// Frame end sentinel.
pub const END_SENTINEL: char = '#';

/// Field separator inside a frame.
pub const FIELD_SEPARATOR: char = ',';

/// First field of every keyword-dialect command.
pub const COMMAND_TAG: &str = "CMD";

/// First field of every response frame.
pub const RESPONSE_TAG: &str = "RSP";

/// Event type code for face detection packets (`$<len>,06,x,y,w,h#`).
pub const DETECTION_TYPE_CODE: &str = "06";

/// Event type code for face recognition packets
/// (`$<len>,08,x,y,w,h,name,score#`).
pub const RECOGNITION_TYPE_CODE: &str = "08";

/// Name the coprocessor reports for a face it cannot match.
pub const UNKNOWN_FACE_NAME: &str = "unknown";

/// User id length bounds. Ids travel inside comma-separated frames, so they
/// are validated at construction (see [`crate::types::UserId`]).
pub const MIN_USER_ID_LENGTH: usize = 1;
pub const MAX_USER_ID_LENGTH: usize = 32;

// ============================================================================
// Default command timeouts (milliseconds)
// ============================================================================
//
// The coprocessor answers most commands within a few hundred milliseconds,
// but START reloads the recognition model and REGCAM waits for a live face
// capture. Values mirror the hardware's observed worst cases.

/// Default timeout for ordinary commands (PING, STATUS, DELETE, LIST).
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 2_000;

/// Timeout for START; model initialization on the coprocessor is slow.
pub const START_TIMEOUT_MS: u64 = 10_000;

/// Timeout for STOP.
pub const STOP_TIMEOUT_MS: u64 = 5_000;

/// Timeout for REGCAM; registration waits for a live face capture.
pub const REGISTER_TIMEOUT_MS: u64 = 15_000;

/// Timeout for RELOAD.
pub const RELOAD_TIMEOUT_MS: u64 = 5_000;
