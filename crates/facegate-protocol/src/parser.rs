//! Inbound frame classification.
//!
//! Every complete frame extracted by the [`FrameScanner`](crate::scanner)
//! passes through [`MessageParser::parse`], which classifies it as a
//! response or an event packet. The first field decides:
//!
//! - `RSP` → response: `$RSP,<len>,<status>,<data>...#`
//! - all-digits → event packet: `$<len>,<type>,<data>...#`, where type
//!   `06` is a face detection and `08` a face recognition
//!
//! Anything else — a missing sentinel, fewer than two fields, a
//! non-numeric coordinate, an unknown type code — is malformed. Malformed
//! frames never yield a partially populated object; the transport logs and
//! drops them, and scanning continues from the next sentinel.
//!
//! Event packets carry a length field but it is not validated here: the
//! firmware's event path computes it loosely, and rejecting on it would
//! drop usable detections. Only the legacy command dialect enforces its
//! length field (see [`crate::legacy`]).
//!
//! # Examples
//!
//! ```
//! use facegate_protocol::{InboundMessage, MessageParser};
//!
//! let msg = MessageParser::parse("$16,06,10,20,30,40#").unwrap();
//! match msg {
//!     InboundMessage::Detection(d) => assert_eq!((d.x, d.y, d.w, d.h), (10, 20, 30, 40)),
//!     _ => panic!("expected detection"),
//! }
//!
//! assert!(MessageParser::parse("$16,06,10,20,30").is_err()); // no end sentinel
//! assert!(MessageParser::parse("$16,06,ten,20,30,40#").is_err()); // bad coordinate
//! ```

use crate::{
    events::{FaceDetection, FaceRecognition},
    response::{Response, ResponseStatus},
};
use facegate_core::{Error, Result, constants::*};

/// Classified inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Response(Response),
    Detection(FaceDetection),
    Recognition(FaceRecognition),
}

/// Parser for inbound frames.
pub struct MessageParser;

impl MessageParser {
    /// Parse a complete frame into a classified message.
    ///
    /// # Arguments
    ///
    /// * `input` - A complete frame including sentinels (leading/trailing
    ///   whitespace is trimmed)
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedFrame` if the frame is not bounded by
    /// `$`…`#`, has fewer than two fields, carries an unknown first field
    /// or type code, or any required numeric field fails to parse.
    pub fn parse(input: &str) -> Result<InboundMessage> {
        let input = input.trim();

        let content = input
            .strip_prefix(START_SENTINEL)
            .and_then(|rest| rest.strip_suffix(END_SENTINEL))
            .ok_or_else(|| malformed(input, "not bounded by $...#"))?;

        let parts: Vec<&str> = content.split(FIELD_SEPARATOR).collect();
        if parts.len() < 2 {
            return Err(malformed(input, "fewer than 2 fields"));
        }

        let first = parts[0];

        if first == RESPONSE_TAG {
            return Self::parse_response(input, &parts);
        }

        if !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()) {
            return Self::parse_packet(input, &parts);
        }

        Err(malformed(input, "unrecognized first field"))
    }

    /// Parse a response: fields are `RSP, length, status, data...`.
    fn parse_response(input: &str, parts: &[&str]) -> Result<InboundMessage> {
        if parts.len() < 3 {
            return Err(malformed(input, "response needs at least 3 fields"));
        }

        // The length field must at least be numeric, even though the
        // response path does not enforce it against the frame size.
        let _length: usize = parts[1]
            .parse()
            .map_err(|_| malformed(input, "non-numeric response length"))?;

        let status = ResponseStatus::parse(parts[2]);
        let data: Vec<String> = parts[3..].iter().map(|s| s.to_string()).collect();

        Ok(InboundMessage::Response(Response::new(status, data)))
    }

    /// Parse an event packet: fields are `length, type_code, data...`.
    fn parse_packet(input: &str, parts: &[&str]) -> Result<InboundMessage> {
        match parts[1] {
            DETECTION_TYPE_CODE => {
                // length, 06, x, y, w, h
                if parts.len() < 6 {
                    return Err(malformed(input, "detection needs 4 coordinates"));
                }
                Ok(InboundMessage::Detection(FaceDetection {
                    x: parse_coord(input, parts[2])?,
                    y: parse_coord(input, parts[3])?,
                    w: parse_coord(input, parts[4])?,
                    h: parse_coord(input, parts[5])?,
                }))
            }
            RECOGNITION_TYPE_CODE => {
                // length, 08, x, y, w, h, name, score
                if parts.len() < 8 {
                    return Err(malformed(input, "recognition needs 6 fields"));
                }
                Ok(InboundMessage::Recognition(FaceRecognition {
                    x: parse_coord(input, parts[2])?,
                    y: parse_coord(input, parts[3])?,
                    w: parse_coord(input, parts[4])?,
                    h: parse_coord(input, parts[5])?,
                    name: parts[6].to_string(),
                    score: parse_coord(input, parts[7])?,
                }))
            }
            other => Err(malformed(input, &format!("unknown type code '{other}'"))),
        }
    }
}

fn parse_coord(frame: &str, field: &str) -> Result<i32> {
    field
        .parse()
        .map_err(|_| malformed(frame, &format!("non-numeric field '{field}'")))
}

fn malformed(frame: &str, reason: &str) -> Error {
    Error::MalformedFrame {
        message: format!("{reason}: {frame:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_detection() {
        let msg = MessageParser::parse("$16,06,10,20,30,40#").unwrap();
        assert_eq!(
            msg,
            InboundMessage::Detection(FaceDetection {
                x: 10,
                y: 20,
                w: 30,
                h: 40
            })
        );
    }

    #[test]
    fn test_parse_recognition() {
        let msg = MessageParser::parse("$30,08,10,20,30,40,alice,91#").unwrap();
        match msg {
            InboundMessage::Recognition(rec) => {
                assert_eq!(rec.name, "alice");
                assert_eq!(rec.score, 91);
                assert!(rec.is_known());
            }
            other => panic!("expected recognition, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_recognition_unknown_face() {
        let msg = MessageParser::parse("$32,08,10,20,30,40,unknown,0#").unwrap();
        match msg {
            InboundMessage::Recognition(rec) => assert!(!rec.is_known()),
            other => panic!("expected recognition, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_ok() {
        let msg = MessageParser::parse("$RSP,10,OK,1,6#").unwrap();
        match msg {
            InboundMessage::Response(resp) => {
                assert_eq!(resp.status, ResponseStatus::Ok);
                assert_eq!(resp.data, vec!["1".to_string(), "6".to_string()]);
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_pong() {
        let msg = MessageParser::parse("$RSP,18,PONG,K230#").unwrap();
        match msg {
            InboundMessage::Response(resp) => {
                assert_eq!(resp.status, ResponseStatus::Pong);
                assert_eq!(resp.data, vec!["K230".to_string()]);
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_unknown_status_maps_to_err() {
        let msg = MessageParser::parse("$RSP,20,BOGUS,detail#").unwrap();
        match msg {
            InboundMessage::Response(resp) => {
                assert!(resp.is_error());
                assert_eq!(resp.error_message(), Some("detail"));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_without_data() {
        let msg = MessageParser::parse("$RSP,8,OK#").unwrap();
        match msg {
            InboundMessage::Response(resp) => assert!(resp.data.is_empty()),
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let msg = MessageParser::parse("  $RSP,8,OK#\r\n").unwrap();
        assert!(matches!(msg, InboundMessage::Response(_)));
    }

    #[rstest]
    #[case("$16,06,10,20,30,40")] // missing end sentinel
    #[case("16,06,10,20,30,40#")] // missing start sentinel
    #[case("$16,06,ten,20,30,40#")] // non-numeric coordinate
    #[case("$16,06,10,20,30#")] // too few coordinates
    #[case("$30,08,10,20,30,40,alice#")] // recognition missing score
    #[case("$30,08,10,20,30,40,alice,high#")] // non-numeric score
    #[case("$RSP,abc,OK#")] // non-numeric response length
    #[case("$RSP,8#")] // response missing status
    #[case("$hello,world#")] // unrecognized first field
    #[case("$17,07,1,2,3,4#")] // unknown type code
    #[case("$42#")] // fewer than 2 fields
    #[case("$#")] // empty content
    #[case("")] // empty input
    fn test_malformed(#[case] input: &str) {
        let result = MessageParser::parse(input);
        assert!(matches!(result, Err(Error::MalformedFrame { .. })), "{input:?}");
    }
}
