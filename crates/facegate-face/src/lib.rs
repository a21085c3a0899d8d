//! Face decision state machine.
//!
//! A face-capture burst produces many detection and recognition frames per
//! second. Acting on each frame would fire repeated unlock attempts and
//! flag transient low-confidence frames as rejected entries even when a
//! later frame in the same encounter would have succeeded. The
//! [`RecognitionGate`] collapses a burst into one encounter: a sliding
//! debounce window that emits at most one success and at most one reject
//! per presentation.

pub mod gate;
pub mod window;

pub use gate::{GateState, RecognitionGate};
pub use window::RecognitionWindow;
