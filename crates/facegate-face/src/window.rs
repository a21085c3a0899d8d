//! Recognition window state.

use facegate_protocol::FaceRecognition;
use std::time::Instant;

/// State of one face-presentation encounter.
///
/// Invariants:
/// - `active == false` implies every counter is at its reset value.
/// - `success_reported` is set at most once per window, and implies the
///   success callback fired exactly once for that window.
#[derive(Debug, Clone, Default)]
pub struct RecognitionWindow {
    /// When the window opened. `None` while inactive.
    pub start_time: Option<Instant>,

    /// Whether a window is currently open.
    pub active: bool,

    /// Whether this window already fired the success callback.
    pub success_reported: bool,

    /// Number of failing recognition results seen in this window.
    pub failure_count: u32,

    /// Name from the successful recognition, if any.
    pub last_success_user: Option<String>,

    /// Most recent recognition result seen in this window.
    pub last_recognition: Option<FaceRecognition>,
}

impl RecognitionWindow {
    /// A fresh window opened now.
    pub fn opened() -> Self {
        Self {
            start_time: Some(Instant::now()),
            active: true,
            ..Self::default()
        }
    }

    /// Age of the window, zero when inactive.
    pub fn age(&self) -> std::time::Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }
}
