//! Legacy length-prefixed dialect.
//!
//! Older coprocessor firmware frames commands as
//! `$<len>,<func_id>,<args>...#` followed by a trailing newline, where
//! `<len>` is the exact byte length of the framed string (`$`…`#`, newline
//! excluded). The length depends on its own digit count, so it is computed
//! by iterating until a fixed point is reached. The length only grows as
//! digits are appended, so the iteration converges within a few rounds; if
//! it somehow does not, the last computed length is used.
//!
//! Inbound legacy packets validate the declared length against the actual
//! frame length; a mismatch is malformed. The event-packet path in
//! [`crate::parser`] deliberately does not share this check.
//!
//! # Example
//!
//! ```
//! use facegate_protocol::{build_legacy_command, parse_legacy_packet};
//!
//! let bytes = build_legacy_command(2, &["alice", "Alice"]);
//! let text = std::str::from_utf8(&bytes).unwrap();
//! assert_eq!(text, "$18,2,alice,Alice#\n");
//!
//! let packet = parse_legacy_packet(text).unwrap();
//! assert_eq!(packet.func_id, 2);
//! assert_eq!(packet.params, vec!["alice", "Alice"]);
//! ```

use bytes::Bytes;
use facegate_core::{Error, Result, constants::*};

/// Fixed-point iteration bound for the length field. Appending digits can
/// only lengthen the frame, so two rounds normally suffice.
const LENGTH_FIXPOINT_ROUNDS: usize = 5;

/// Parsed legacy packet: `$<len>,<func_id>,<params>...#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyPacket {
    pub func_id: u32,
    pub params: Vec<String>,
}

/// Build a legacy command frame.
///
/// The returned bytes are the framed string plus the trailing newline the
/// old firmware expects as a flush hint. The declared length covers only
/// `$`…`#`.
pub fn build_legacy_command(func_id: u32, args: &[&str]) -> Bytes {
    let mut data = func_id.to_string();
    for arg in args {
        data.push(FIELD_SEPARATOR);
        data.push_str(arg);
    }

    // Initial guess: sentinels + one separator + payload. The first format
    // pass corrects for the length field's own digits.
    let mut length = data.len() + 3;
    let mut frame = String::new();

    for _ in 0..LENGTH_FIXPOINT_ROUNDS {
        frame = format!("{START_SENTINEL}{length}{FIELD_SEPARATOR}{data}{END_SENTINEL}");
        if frame.len() == length {
            break;
        }
        length = frame.len();
    }

    frame.push('\n');
    Bytes::from(frame)
}

/// Parse and validate a legacy packet.
///
/// # Errors
///
/// Returns `Error::MalformedFrame` for structural problems and
/// `Error::LengthMismatch` when the declared length does not equal the
/// actual frame length.
pub fn parse_legacy_packet(input: &str) -> Result<LegacyPacket> {
    let input = input.trim();

    let content = input
        .strip_prefix(START_SENTINEL)
        .and_then(|rest| rest.strip_suffix(END_SENTINEL))
        .ok_or_else(|| Error::MalformedFrame {
            message: format!("not bounded by $...#: {input:?}"),
        })?;

    let parts: Vec<&str> = content.split(FIELD_SEPARATOR).collect();
    if parts.len() < 2 {
        return Err(Error::MalformedFrame {
            message: format!("fewer than 2 fields: {input:?}"),
        });
    }

    let declared: usize = parts[0].parse().map_err(|_| Error::MalformedFrame {
        message: format!("non-numeric length field: {input:?}"),
    })?;

    let func_id: u32 = parts[1].parse().map_err(|_| Error::MalformedFrame {
        message: format!("non-numeric function id: {input:?}"),
    })?;

    if declared != input.len() {
        return Err(Error::LengthMismatch {
            declared,
            actual: input.len(),
        });
    }

    Ok(LegacyPacket {
        func_id,
        params: parts[2..].iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5, &[], "$5,5#\n")]
    #[case(2, &["a"], "$7,2,a#\n")]
    #[case(2, &["alice", "Alice"], "$18,2,alice,Alice#\n")]
    fn test_build(#[case] func_id: u32, #[case] args: &[&str], #[case] expected: &str) {
        let bytes = build_legacy_command(func_id, args);
        assert_eq!(&bytes[..], expected.as_bytes());
    }

    #[test]
    fn test_build_length_is_exact() {
        // The declared length must equal the byte length of $...# for a
        // spread of payload sizes, including ones that straddle a digit
        // boundary in the length field itself.
        for extra in 0..30 {
            let arg = "x".repeat(extra);
            let bytes = build_legacy_command(9, &[&arg]);
            let text = std::str::from_utf8(&bytes).unwrap();
            let frame = text.strip_suffix('\n').unwrap();
            let declared: usize = frame[1..frame.find(',').unwrap()].parse().unwrap();
            assert_eq!(declared, frame.len(), "frame: {frame}");
        }
    }

    #[test]
    fn test_roundtrip() {
        let bytes = build_legacy_command(6, &["10", "20"]);
        let text = std::str::from_utf8(&bytes).unwrap();
        let packet = parse_legacy_packet(text).unwrap();
        assert_eq!(packet.func_id, 6);
        assert_eq!(packet.params, vec!["10", "20"]);
    }

    #[test]
    fn test_parse_length_mismatch() {
        let result = parse_legacy_packet("$99,2,alice#");
        match result {
            Err(Error::LengthMismatch { declared, actual }) => {
                assert_eq!(declared, 99);
                assert_eq!(actual, 12);
            }
            other => panic!("expected LengthMismatch, got {other:?}"),
        }
    }

    #[rstest]
    #[case("$12,2,alice")] // missing end sentinel
    #[case("12,2,alice#")] // missing start sentinel
    #[case("$abc,2,alice#")] // non-numeric length
    #[case("$12,two,alice#")] // non-numeric function id
    #[case("$12#")] // fewer than 2 fields
    fn test_parse_malformed(#[case] input: &str) {
        assert!(parse_legacy_packet(input).is_err(), "{input:?}");
    }
}
