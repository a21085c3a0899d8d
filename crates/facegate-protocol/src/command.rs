//! Keyword-dialect command frames.
//!
//! Commands are sent to the coprocessor as `$CMD,<name>[,<args>...]#`.
//! The wire format carries no correlation identifier, so the command name
//! is the only thing a caller can match a late response against; the
//! correlator in `facegate-serial` enforces single-command-in-flight
//! instead.
//!
//! # Wire Format Examples
//!
//! ```text
//! $CMD,PING#
//! $CMD,START,8#
//! $CMD,REGCAM,alice#
//! ```

use bytes::Bytes;
use facegate_core::{Error, Result, UserId, VisionFunction, constants::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command names understood by the coprocessor firmware.
///
/// Each variant corresponds to one keyword in the wire format.
///
/// # Examples
///
/// ```
/// use facegate_protocol::CommandKind;
///
/// let cmd = CommandKind::parse("REGCAM").unwrap();
/// assert_eq!(cmd, CommandKind::RegisterFace);
/// assert_eq!(cmd.as_str(), "REGCAM");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Liveness check; answered with a `PONG` response.
    Ping,
    /// Query running state and active function id.
    Status,
    /// Start a vision function (takes the function id as an argument).
    Start,
    /// Stop the running function.
    Stop,
    /// Register a face for a user via the camera.
    RegisterFace,
    /// Delete a user from the face database.
    DeleteUser,
    /// List registered users.
    ListUsers,
    /// Reload the face database from flash.
    Reload,
}

impl CommandKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "PING" => Ok(CommandKind::Ping),
            "STATUS" => Ok(CommandKind::Status),
            "START" => Ok(CommandKind::Start),
            "STOP" => Ok(CommandKind::Stop),
            "REGCAM" => Ok(CommandKind::RegisterFace),
            "DELETE" => Ok(CommandKind::DeleteUser),
            "LIST" => Ok(CommandKind::ListUsers),
            "RELOAD" => Ok(CommandKind::Reload),
            _ => Err(Error::InvalidCommandName {
                name: s.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Ping => "PING",
            CommandKind::Status => "STATUS",
            CommandKind::Start => "START",
            CommandKind::Stop => "STOP",
            CommandKind::RegisterFace => "REGCAM",
            CommandKind::DeleteUser => "DELETE",
            CommandKind::ListUsers => "LIST",
            CommandKind::Reload => "RELOAD",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A keyword command with its ordered argument list.
///
/// Arguments originate from typed constructors ([`Command::start`],
/// [`Command::register_face`], ...) so delimiter injection is not possible:
/// user-supplied text only enters through validated types like
/// [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    kind: CommandKind,
    args: Vec<String>,
}

impl Command {
    pub fn new(kind: CommandKind, args: Vec<String>) -> Self {
        Command { kind, args }
    }

    /// Liveness check.
    pub fn ping() -> Self {
        Command::new(CommandKind::Ping, vec![])
    }

    /// Query running state.
    pub fn status() -> Self {
        Command::new(CommandKind::Status, vec![])
    }

    /// Start a vision function.
    pub fn start(function: VisionFunction) -> Self {
        Command::new(CommandKind::Start, vec![function.code().to_string()])
    }

    /// Stop the running function.
    pub fn stop() -> Self {
        Command::new(CommandKind::Stop, vec![])
    }

    /// Register a face for `user` via the camera.
    pub fn register_face(user: &UserId) -> Self {
        Command::new(CommandKind::RegisterFace, vec![user.as_str().to_string()])
    }

    /// Delete `user` from the face database.
    pub fn delete_user(user: &UserId) -> Self {
        Command::new(CommandKind::DeleteUser, vec![user.as_str().to_string()])
    }

    /// List registered users.
    pub fn list_users() -> Self {
        Command::new(CommandKind::ListUsers, vec![])
    }

    /// Reload the face database.
    pub fn reload() -> Self {
        Command::new(CommandKind::Reload, vec![])
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Encode to wire bytes: `$CMD,<name>[,<args>...]#`.
    ///
    /// # Example
    ///
    /// ```
    /// use facegate_core::VisionFunction;
    /// use facegate_protocol::Command;
    ///
    /// let bytes = Command::start(VisionFunction::FaceRecognition).encode();
    /// assert_eq!(&bytes[..], b"$CMD,START,8#");
    /// ```
    pub fn encode(&self) -> Bytes {
        let mut buffer = String::with_capacity(
            // $CMD, + name + # plus fields with separators
            7 + self.kind.as_str().len()
                + self.args.iter().map(|a| a.len() + 1).sum::<usize>(),
        );

        buffer.push(START_SENTINEL);
        buffer.push_str(COMMAND_TAG);
        buffer.push(FIELD_SEPARATOR);
        buffer.push_str(self.kind.as_str());
        for arg in &self.args {
            buffer.push(FIELD_SEPARATOR);
            buffer.push_str(arg);
        }
        buffer.push(END_SENTINEL);

        Bytes::from(buffer)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.kind, self.args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Command::ping(), "$CMD,PING#")]
    #[case(Command::status(), "$CMD,STATUS#")]
    #[case(Command::stop(), "$CMD,STOP#")]
    #[case(Command::list_users(), "$CMD,LIST#")]
    #[case(Command::reload(), "$CMD,RELOAD#")]
    #[case(Command::start(VisionFunction::FaceDetection), "$CMD,START,6#")]
    #[case(Command::start(VisionFunction::FaceRecognition), "$CMD,START,8#")]
    fn test_encode(#[case] cmd: Command, #[case] wire: &str) {
        assert_eq!(&cmd.encode()[..], wire.as_bytes());
    }

    #[test]
    fn test_encode_with_user_id() {
        let user = UserId::new("alice").unwrap();
        assert_eq!(
            &Command::register_face(&user).encode()[..],
            b"$CMD,REGCAM,alice#"
        );
        assert_eq!(
            &Command::delete_user(&user).encode()[..],
            b"$CMD,DELETE,alice#"
        );
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            CommandKind::Ping,
            CommandKind::Status,
            CommandKind::Start,
            CommandKind::Stop,
            CommandKind::RegisterFace,
            CommandKind::DeleteUser,
            CommandKind::ListUsers,
            CommandKind::Reload,
        ] {
            assert_eq!(CommandKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_invalid_kind() {
        assert!(CommandKind::parse("NOPE").is_err());
        assert!(CommandKind::parse("ping").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::ping().to_string(), "PING");
        assert_eq!(
            Command::start(VisionFunction::FaceRecognition).to_string(),
            "START 8"
        );
    }
}
