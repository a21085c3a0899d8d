//! Response frames: `$RSP,<len>,<status>,<data>...#`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status token of a response frame.
///
/// Unknown tokens parse as [`ResponseStatus::Err`]: the firmware only ever
/// emits these three, so anything else is treated as an error report rather
/// than dropped (the data fields may still carry a usable message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Ok,
    Pong,
    Err,
}

impl ResponseStatus {
    /// Parse a status token (case-insensitive). Unknown tokens map to `Err`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "OK" => ResponseStatus::Ok,
            "PONG" => ResponseStatus::Pong,
            _ => ResponseStatus::Err,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Ok => "OK",
            ResponseStatus::Pong => "PONG",
            ResponseStatus::Err => "ERR",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed response frame.
///
/// # Examples of wire frames
///
/// ```text
/// $RSP,18,PONG,K230#
/// $RSP,15,OK,0,0#
/// $RSP,21,OK,Started:6#
/// $RSP,25,ERR,Unknown:XXX#
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    pub data: Vec<String>,
}

impl Response {
    pub fn new(status: ResponseStatus, data: Vec<String>) -> Self {
        Response { status, data }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }

    #[must_use]
    pub fn is_pong(&self) -> bool {
        self.status == ResponseStatus::Pong
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Err
    }

    /// Error message carried by an `ERR` response (first data field).
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        if self.is_error() {
            self.data.first().map(|s| s.as_str())
        } else {
            None
        }
    }

    /// Get data field by index.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.data.get(index).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(ResponseStatus::parse("OK"), ResponseStatus::Ok);
        assert_eq!(ResponseStatus::parse("ok"), ResponseStatus::Ok);
        assert_eq!(ResponseStatus::parse("PONG"), ResponseStatus::Pong);
        assert_eq!(ResponseStatus::parse("ERR"), ResponseStatus::Err);
        // Unknown tokens degrade to ERR rather than failing the parse
        assert_eq!(ResponseStatus::parse("WAT"), ResponseStatus::Err);
    }

    #[test]
    fn test_predicates() {
        let ok = Response::new(ResponseStatus::Ok, vec!["1".into(), "8".into()]);
        assert!(ok.is_ok());
        assert!(!ok.is_pong());
        assert_eq!(ok.error_message(), None);
        assert_eq!(ok.field(1), Some("8"));

        let err = Response::new(ResponseStatus::Err, vec!["Unknown:XXX".into()]);
        assert!(err.is_error());
        assert_eq!(err.error_message(), Some("Unknown:XXX"));
    }

    #[test]
    fn test_error_without_data() {
        let err = Response::new(ResponseStatus::Err, vec![]);
        assert_eq!(err.error_message(), None);
    }
}
