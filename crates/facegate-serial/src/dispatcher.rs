//! Typed event fan-out.
//!
//! The transport's reader thread hands every classified event to the
//! dispatcher, which invokes the matching subscribers synchronously in
//! registration order. A panicking subscriber is caught and logged; it can
//! neither interrupt delivery to the remaining subscribers nor kill the
//! read loop.

use facegate_protocol::{FaceDetection, FaceRecognition};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::RwLock;
use tracing::error;

type DetectionHandler = Box<dyn Fn(&FaceDetection) + Send + Sync>;
type RecognitionHandler = Box<dyn Fn(&FaceRecognition) + Send + Sync>;

/// Per-event-kind subscriber registry.
///
/// # Example
///
/// ```
/// use facegate_serial::EventDispatcher;
/// use facegate_protocol::FaceDetection;
///
/// let dispatcher = EventDispatcher::new();
/// dispatcher.on_detection(|d| println!("face at ({}, {})", d.x, d.y));
///
/// dispatcher.dispatch_detection(&FaceDetection { x: 1, y: 2, w: 3, h: 4 });
/// ```
#[derive(Default)]
pub struct EventDispatcher {
    detection_handlers: RwLock<Vec<DetectionHandler>>,
    recognition_handlers: RwLock<Vec<RecognitionHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to face detection events.
    pub fn on_detection<F>(&self, handler: F)
    where
        F: Fn(&FaceDetection) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.detection_handlers.write() {
            handlers.push(Box::new(handler));
        }
    }

    /// Subscribe to face recognition events.
    pub fn on_recognition<F>(&self, handler: F)
    where
        F: Fn(&FaceRecognition) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.recognition_handlers.write() {
            handlers.push(Box::new(handler));
        }
    }

    /// Deliver a detection event to every subscriber, in registration order.
    pub fn dispatch_detection(&self, event: &FaceDetection) {
        let Ok(handlers) = self.detection_handlers.read() else {
            return;
        };
        for handler in handlers.iter() {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                error!("detection subscriber panicked; continuing delivery");
            }
        }
    }

    /// Deliver a recognition event to every subscriber, in registration order.
    pub fn dispatch_recognition(&self, event: &FaceRecognition) {
        let Ok(handlers) = self.recognition_handlers.read() else {
            return;
        };
        for handler in handlers.iter() {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                error!("recognition subscriber panicked; continuing delivery");
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let detections = self.detection_handlers.read().map(|h| h.len()).unwrap_or(0);
        let recognitions = self
            .recognition_handlers
            .read()
            .map(|h| h.len())
            .unwrap_or(0);
        f.debug_struct("EventDispatcher")
            .field("detection_handlers", &detections)
            .field("recognition_handlers", &recognitions)
            .finish()
    }
}
