use crate::{
    Result,
    constants::{FIELD_SEPARATOR, MAX_USER_ID_LENGTH, MIN_USER_ID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Door position as tracked by the controller.
///
/// The controller is the single writer; the periodic status reporter only
/// reads it. `Unknown` is the state before the first commanded movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorState {
    Open,
    Closed,
    Unknown,
}

impl DoorState {
    /// Wire representation used by the remote status report.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Open => "OPEN",
            DoorState::Closed => "CLOSED",
            DoorState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log category for remote report entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// A recognized face opened the door.
    Success,
    /// A presentation window expired with only failing matches.
    Reject,
    /// Operational events (startup, remote commands, registration).
    System,
}

impl LogKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Success => "success",
            LogKind::Reject => "reject",
            LogKind::System => "system",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Function ids understood by the coprocessor's START command.
///
/// The ids double as event type codes: a running function emits packets
/// whose type field is the zero-padded id (`06`, `08`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum VisionFunction {
    FaceDetection = 6,
    FaceRecognition = 8,
}

impl VisionFunction {
    /// Create a vision function from its numeric id.
    ///
    /// # Errors
    /// Returns `Error::InvalidFunction` if the id is not a known function.
    #[inline]
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            6 => Ok(VisionFunction::FaceDetection),
            8 => Ok(VisionFunction::FaceRecognition),
            _ => Err(Error::InvalidFunction { code }),
        }
    }

    /// Numeric id sent as the START argument.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Zero-padded type code carried by event packets for this function.
    #[inline]
    #[must_use]
    pub fn type_code(self) -> &'static str {
        match self {
            VisionFunction::FaceDetection => "06",
            VisionFunction::FaceRecognition => "08",
        }
    }
}

impl fmt::Display for VisionFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VisionFunction::FaceDetection => write!(f, "FaceDetection"),
            VisionFunction::FaceRecognition => write!(f, "FaceRecognition"),
        }
    }
}

/// User identifier stored in the coprocessor's face database.
///
/// User ids travel inside comma-separated frames (`$CMD,REGCAM,<id>#`), so
/// a raw string containing a separator or sentinel would break framing.
/// Validation at construction makes injection impossible by type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new user id with validation.
    ///
    /// The id is trimmed before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidUserId` if:
    /// - The id is empty or longer than 32 characters after trimming
    /// - The id contains non-ASCII characters
    /// - The id contains a protocol delimiter (`$`, `#`, or `,`)
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();

        let len = id.len();
        if !(MIN_USER_ID_LENGTH..=MAX_USER_ID_LENGTH).contains(&len) {
            return Err(Error::InvalidUserId(format!(
                "User id must be {MIN_USER_ID_LENGTH}-{MAX_USER_ID_LENGTH} chars, got {len}"
            )));
        }

        if !id.is_ascii() {
            return Err(Error::InvalidUserId("User id must be ASCII".to_string()));
        }

        if id.contains(['$', '#', FIELD_SEPARATOR]) {
            return Err(Error::InvalidUserId(format!(
                "User id must not contain protocol delimiters: {id}"
            )));
        }

        Ok(UserId(id.to_string()))
    }

    /// Get the user id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UserId::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        UserId::new(&s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> String {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice", "alice")]
    #[case("  bob  ", "bob")]
    #[case("user_01", "user_01")]
    fn test_user_id_valid(#[case] input: &str, #[case] expected: &str) {
        let id = UserId::new(input).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[rstest]
    #[case("")] // empty
    #[case("   ")] // whitespace only
    #[case("a,b")] // field separator
    #[case("a$b")] // start sentinel
    #[case("a#b")] // end sentinel
    #[case("ünïcode")] // non-ASCII
    fn test_user_id_invalid(#[case] input: &str) {
        assert!(UserId::new(input).is_err());
    }

    #[test]
    fn test_user_id_length_bounds() {
        assert!(UserId::new(&"a".repeat(32)).is_ok());
        assert!(UserId::new(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_user_id_serde_roundtrip() {
        let id = UserId::new("alice").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice\"");

        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        // Deserialization validates too
        let bad: std::result::Result<UserId, _> = serde_json::from_str("\"a,b\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_door_state_str() {
        assert_eq!(DoorState::Open.as_str(), "OPEN");
        assert_eq!(DoorState::Closed.as_str(), "CLOSED");
        assert_eq!(DoorState::Unknown.as_str(), "UNKNOWN");
        assert_eq!(DoorState::Open.to_string(), "OPEN");
    }

    #[test]
    fn test_door_state_serde() {
        assert_eq!(
            serde_json::to_string(&DoorState::Closed).unwrap(),
            "\"CLOSED\""
        );
    }

    #[test]
    fn test_log_kind_str() {
        assert_eq!(LogKind::Success.as_str(), "success");
        assert_eq!(LogKind::Reject.as_str(), "reject");
        assert_eq!(LogKind::System.as_str(), "system");
    }

    #[test]
    fn test_vision_function_codes() {
        assert_eq!(VisionFunction::FaceDetection.code(), 6);
        assert_eq!(VisionFunction::FaceRecognition.code(), 8);
        assert_eq!(VisionFunction::FaceDetection.type_code(), "06");
        assert_eq!(VisionFunction::FaceRecognition.type_code(), "08");

        assert_eq!(
            VisionFunction::from_code(8).unwrap(),
            VisionFunction::FaceRecognition
        );
        assert!(VisionFunction::from_code(7).is_err());
    }
}
