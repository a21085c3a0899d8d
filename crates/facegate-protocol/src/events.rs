//! Event packets emitted by a running vision function.
//!
//! While a function is active the coprocessor streams one packet per
//! processed camera frame. A face-capture burst therefore produces many
//! packets per second; debouncing them into a single door decision is the
//! job of `facegate-face`, not of this crate.

use facegate_core::constants::UNKNOWN_FACE_NAME;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Face detection event: `$<len>,06,<x>,<y>,<w>,<h>#`.
///
/// Coordinates and size are in camera pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Face recognition event: `$<len>,08,<x>,<y>,<w>,<h>,<name>,<score>#`.
///
/// The match score is an integer percentage (0-100) computed on the
/// coprocessor; no image data crosses the serial link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRecognition {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub name: String,
    pub score: i32,
}

impl FaceRecognition {
    /// Whether the coprocessor matched a known face.
    ///
    /// The firmware reports unmatched faces with the literal name
    /// `"unknown"` and a zero score.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.name != UNKNOWN_FACE_NAME && self.score > 0
    }
}

impl fmt::Display for FaceRecognition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.name, self.score)
    }
}
