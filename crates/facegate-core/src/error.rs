use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Malformed frame: {message}")]
    MalformedFrame { message: String },

    #[error("Invalid command name: {name}")]
    InvalidCommandName { name: String },

    #[error("Legacy length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Invalid function code: {code}")]
    InvalidFunction { code: u8 },

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    // Serial link errors
    #[error("Serial connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Command '{command}' timed out after {timeout_ms}ms")]
    CommandTimeout { command: String, timeout_ms: u64 },

    #[error("Transport closed")]
    TransportClosed,

    #[error("Reader thread is dead; reconnect before sending commands")]
    ReaderDead,

    // Hardware errors
    #[error("Pulse emitter error: {0}")]
    PulseEmitter(String),

    // Remote channel errors
    #[error("Remote channel error: {0}")]
    Remote(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
