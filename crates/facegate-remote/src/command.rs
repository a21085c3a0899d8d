//! Inbound remote commands.
//!
//! Commands arrive as JSON objects with a `cmd` discriminator plus
//! command-specific fields:
//!
//! ```json
//! {"cmd": "OPEN"}
//! {"cmd": "REGISTER_FACE", "user_id": "alice"}
//! {"cmd": "SET_CONFIG", "angle": 120.0, "speed": 2}
//! ```

use serde::{Deserialize, Serialize};

/// A command received over the remote channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum RemoteCommand {
    /// Open the door.
    #[serde(rename = "OPEN")]
    Open,

    /// Close the door.
    #[serde(rename = "CLOSE")]
    Close,

    /// Register a face for a user via the camera.
    ///
    /// The id is kept raw here; the controller validates it into a
    /// `UserId` so a malformed id yields a reported error instead of a
    /// dropped command.
    #[serde(rename = "REGISTER_FACE")]
    RegisterFace {
        #[serde(default)]
        user_id: String,
    },

    /// Report current status immediately.
    #[serde(rename = "REFRESH")]
    Refresh,

    /// Update runtime configuration.
    #[serde(rename = "SET_CONFIG")]
    SetConfig {
        /// New door opening angle in degrees.
        #[serde(default)]
        angle: Option<f64>,
        /// Speed level (1 = slow, 2 = medium, 3 = fast).
        #[serde(default)]
        speed: Option<u8>,
    },
}

impl RemoteCommand {
    /// Parse a command from its JSON wire form.
    ///
    /// # Errors
    /// Returns `facegate_core::Error::Remote` for unknown commands or
    /// malformed JSON.
    pub fn from_json(json: &str) -> facegate_core::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| facegate_core::Error::Remote(format!("invalid command: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"cmd": "OPEN"}"#, RemoteCommand::Open)]
    #[case(r#"{"cmd": "CLOSE"}"#, RemoteCommand::Close)]
    #[case(r#"{"cmd": "REFRESH"}"#, RemoteCommand::Refresh)]
    fn test_parse_simple(#[case] json: &str, #[case] expected: RemoteCommand) {
        assert_eq!(RemoteCommand::from_json(json).unwrap(), expected);
    }

    #[test]
    fn test_parse_register_face() {
        let cmd =
            RemoteCommand::from_json(r#"{"cmd": "REGISTER_FACE", "user_id": "alice"}"#).unwrap();
        assert_eq!(
            cmd,
            RemoteCommand::RegisterFace {
                user_id: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_parse_register_face_missing_user_defaults_empty() {
        let cmd = RemoteCommand::from_json(r#"{"cmd": "REGISTER_FACE"}"#).unwrap();
        assert_eq!(
            cmd,
            RemoteCommand::RegisterFace {
                user_id: String::new()
            }
        );
    }

    #[test]
    fn test_parse_set_config() {
        let cmd = RemoteCommand::from_json(r#"{"cmd": "SET_CONFIG", "angle": 120.5}"#).unwrap();
        assert_eq!(
            cmd,
            RemoteCommand::SetConfig {
                angle: Some(120.5),
                speed: None
            }
        );

        let cmd =
            RemoteCommand::from_json(r#"{"cmd": "SET_CONFIG", "angle": 90.0, "speed": 3}"#)
                .unwrap();
        assert_eq!(
            cmd,
            RemoteCommand::SetConfig {
                angle: Some(90.0),
                speed: Some(3)
            }
        );
    }

    #[rstest]
    #[case(r#"{"cmd": "SELF_DESTRUCT"}"#)] // unknown command
    #[case(r#"{"angle": 90}"#)] // missing discriminator
    #[case("not json")]
    fn test_parse_invalid(#[case] json: &str) {
        assert!(RemoteCommand::from_json(json).is_err());
    }

    #[test]
    fn test_roundtrip() {
        let cmd = RemoteCommand::SetConfig {
            angle: Some(90.0),
            speed: Some(1),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(RemoteCommand::from_json(&json).unwrap(), cmd);
    }
}
