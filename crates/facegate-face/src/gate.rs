//! Debouncing recognition gate.
//!
//! # States
//!
//! The gate is a three-state machine over the [`RecognitionWindow`]:
//!
//! - **Idle** — no window open.
//! - **WindowOpen** — a window is active and has not yet reported success.
//! - **Succeeded** — the window already reported success; later events are
//!   recorded but cannot re-trigger it.
//!
//! # Transitions
//!
//! - A detection while Idle opens a window. A detection while a window is
//!   active is a no-op: windows only open from Idle.
//! - A recognition first runs the expiry check. If the active window aged
//!   past the configured duration without succeeding but with at least one
//!   failure, the reject callback fires for it; the gate then opens a
//!   fresh window and evaluates the new event against that, never against
//!   the expired one.
//! - A qualifying recognition (`is_known` and score at or above the
//!   threshold) fires the success callback exactly once per window; later
//!   qualifying results in the same window are ignored. A failing
//!   recognition increments the failure count regardless of whether
//!   success was already reported.
//! - The periodic [`check_timeout`](RecognitionGate::check_timeout) fires
//!   the reject callback once for an expired window that never succeeded
//!   but saw failures, then resets to Idle.
//!
//! # Concurrency
//!
//! Events arrive from the transport's reader thread while the timeout
//! check runs from the periodic timer thread, so the window lives behind
//! one mutex and all mutation goes through the gate's methods. Callbacks
//! run *after* the lock is released: a slow or panicking callback can
//! neither deadlock the gate nor poison the window state. Panics are
//! caught and logged.

use crate::window::RecognitionWindow;
use facegate_protocol::{FaceDetection, FaceRecognition};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info};

type SuccessHandler = Box<dyn Fn(&str, &FaceRecognition) + Send + Sync>;
type RejectHandler = Box<dyn Fn(u32, Option<&FaceRecognition>) + Send + Sync>;

/// Observable state of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No window open.
    Idle,
    /// Window active, success not yet reported.
    WindowOpen,
    /// Window active, success already reported.
    Succeeded,
}

/// Decision to deliver once the window lock is released.
enum Pending {
    Success(String, FaceRecognition),
    Reject(u32, Option<FaceRecognition>),
}

/// Sliding-window debouncer for face recognition results.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use facegate_face::RecognitionGate;
/// use facegate_protocol::{FaceDetection, FaceRecognition};
///
/// let gate = RecognitionGate::new(
///     Duration::from_secs(5),
///     80,
///     |user, _rec| println!("open for {user}"),
///     |failures, _rec| println!("rejected after {failures} attempts"),
/// );
///
/// gate.handle_detection(&FaceDetection { x: 0, y: 0, w: 64, h: 64 });
/// gate.handle_recognition(&FaceRecognition {
///     x: 0, y: 0, w: 64, h: 64,
///     name: "alice".into(),
///     score: 93,
/// });
/// ```
pub struct RecognitionGate {
    window_duration: Duration,
    score_threshold: i32,
    on_success: SuccessHandler,
    on_reject: RejectHandler,
    window: Mutex<RecognitionWindow>,
}

impl RecognitionGate {
    /// Create a gate.
    ///
    /// # Arguments
    ///
    /// * `window_duration` - How long one encounter aggregates results
    /// * `score_threshold` - Minimum score for a qualifying match
    /// * `on_success` - Fired exactly once per window on the first
    ///   qualifying recognition, with the matched name and the result
    /// * `on_reject` - Fired once per expired window that saw only
    ///   failures, with the failure count and the last result
    pub fn new<S, R>(
        window_duration: Duration,
        score_threshold: i32,
        on_success: S,
        on_reject: R,
    ) -> Self
    where
        S: Fn(&str, &FaceRecognition) + Send + Sync + 'static,
        R: Fn(u32, Option<&FaceRecognition>) + Send + Sync + 'static,
    {
        Self {
            window_duration,
            score_threshold,
            on_success: Box::new(on_success),
            on_reject: Box::new(on_reject),
            window: Mutex::new(RecognitionWindow::default()),
        }
    }

    /// Current gate state.
    pub fn state(&self) -> GateState {
        let Ok(window) = self.window.lock() else {
            return GateState::Idle;
        };
        if !window.active {
            GateState::Idle
        } else if window.success_reported {
            GateState::Succeeded
        } else {
            GateState::WindowOpen
        }
    }

    /// Snapshot of the current window, for status and tests.
    pub fn window_snapshot(&self) -> RecognitionWindow {
        self.window
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    /// Handle a face detection event.
    ///
    /// Opens a window if none is active; otherwise a no-op.
    pub fn handle_detection(&self, _detection: &FaceDetection) {
        let Ok(mut window) = self.window.lock() else {
            return;
        };
        if !window.active {
            *window = RecognitionWindow::opened();
            debug!("recognition window opened");
        }
    }

    /// Handle a recognition result.
    pub fn handle_recognition(&self, recognition: &FaceRecognition) {
        let mut pending = Vec::new();

        {
            let Ok(mut window) = self.window.lock() else {
                return;
            };

            // Expiry first: a stale window settles its outcome before the
            // new event opens a fresh one
            if Self::is_expired(&window, self.window_duration) {
                if window.active && !window.success_reported && window.failure_count > 0 {
                    pending.push(Pending::Reject(
                        window.failure_count,
                        window.last_recognition.clone(),
                    ));
                }
                *window = RecognitionWindow::opened();
                debug!("recognition window opened");
            }

            window.last_recognition = Some(recognition.clone());

            let qualifies =
                recognition.is_known() && recognition.score >= self.score_threshold;

            if qualifies {
                if !window.success_reported {
                    window.success_reported = true;
                    window.last_success_user = Some(recognition.name.clone());
                    pending.push(Pending::Success(
                        recognition.name.clone(),
                        recognition.clone(),
                    ));
                }
                // Later qualifying results in the same window are ignored
            } else {
                window.failure_count += 1;
            }
        }

        self.deliver(pending);
    }

    /// Periodic expiry check.
    ///
    /// Invoked at a fixed cadence from the timer thread, independent of
    /// event arrival, so a window with no further events still settles.
    pub fn check_timeout(&self) {
        let mut pending = Vec::new();

        {
            let Ok(mut window) = self.window.lock() else {
                return;
            };

            if window.active && Self::is_expired(&window, self.window_duration) {
                if !window.success_reported && window.failure_count > 0 {
                    pending.push(Pending::Reject(
                        window.failure_count,
                        window.last_recognition.clone(),
                    ));
                }
                *window = RecognitionWindow::default();
            }
        }

        self.deliver(pending);
    }

    /// An inactive window counts as expired: any event finding one starts
    /// fresh.
    fn is_expired(window: &RecognitionWindow, duration: Duration) -> bool {
        !window.active || window.age() >= duration
    }

    /// Fire callbacks outside the lock; catch and log panics so a broken
    /// observer cannot corrupt window state or stop event processing.
    fn deliver(&self, pending: Vec<Pending>) {
        for decision in pending {
            match decision {
                Pending::Success(user, recognition) => {
                    info!(user = %user, score = recognition.score, "recognition success");
                    let result = catch_unwind(AssertUnwindSafe(|| {
                        (self.on_success)(&user, &recognition)
                    }));
                    if result.is_err() {
                        error!("success callback panicked");
                    }
                }
                Pending::Reject(failures, recognition) => {
                    info!(failures, "recognition rejected");
                    let result = catch_unwind(AssertUnwindSafe(|| {
                        (self.on_reject)(failures, recognition.as_ref())
                    }));
                    if result.is_err() {
                        error!("reject callback panicked");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread::sleep;

    const WINDOW: Duration = Duration::from_millis(80);
    const THRESHOLD: i32 = 80;

    struct Counters {
        successes: AtomicU32,
        rejects: AtomicU32,
        last_reject_failures: AtomicU32,
    }

    fn gate_with_counters() -> (Arc<RecognitionGate>, Arc<Counters>) {
        let counters = Arc::new(Counters {
            successes: AtomicU32::new(0),
            rejects: AtomicU32::new(0),
            last_reject_failures: AtomicU32::new(0),
        });

        let success_counters = counters.clone();
        let reject_counters = counters.clone();

        let gate = Arc::new(RecognitionGate::new(
            WINDOW,
            THRESHOLD,
            move |_user, _rec| {
                success_counters.successes.fetch_add(1, Ordering::SeqCst);
            },
            move |failures, _rec| {
                reject_counters.rejects.fetch_add(1, Ordering::SeqCst);
                reject_counters
                    .last_reject_failures
                    .store(failures, Ordering::SeqCst);
            },
        ));

        (gate, counters)
    }

    fn detection() -> FaceDetection {
        FaceDetection {
            x: 10,
            y: 10,
            w: 64,
            h: 64,
        }
    }

    fn recognition(name: &str, score: i32) -> FaceRecognition {
        FaceRecognition {
            x: 10,
            y: 10,
            w: 64,
            h: 64,
            name: name.to_string(),
            score,
        }
    }

    #[test]
    fn test_idle_until_first_detection() {
        let (gate, counters) = gate_with_counters();
        assert_eq!(gate.state(), GateState::Idle);

        gate.check_timeout();
        assert_eq!(counters.successes.load(Ordering::SeqCst), 0);
        assert_eq!(counters.rejects.load(Ordering::SeqCst), 0);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn test_detection_opens_window_once() {
        let (gate, _counters) = gate_with_counters();

        gate.handle_detection(&detection());
        assert_eq!(gate.state(), GateState::WindowOpen);
        let first_start = gate.window_snapshot().start_time;

        sleep(Duration::from_millis(10));
        gate.handle_detection(&detection());

        // Second detection is a no-op; the window keeps its start time
        assert_eq!(gate.window_snapshot().start_time, first_start);
    }

    #[test]
    fn test_many_qualifying_results_one_success() {
        let (gate, counters) = gate_with_counters();

        gate.handle_detection(&detection());
        for _ in 0..5 {
            gate.handle_recognition(&recognition("alice", 95));
        }

        assert_eq!(counters.successes.load(Ordering::SeqCst), 1);
        assert_eq!(counters.rejects.load(Ordering::SeqCst), 0);
        assert_eq!(gate.state(), GateState::Succeeded);
    }

    #[test]
    fn test_recognition_alone_opens_window() {
        // A recognition with no prior detection finds no active window;
        // the expiry path opens a fresh one and evaluates against it
        let (gate, counters) = gate_with_counters();

        gate.handle_recognition(&recognition("alice", 95));

        assert_eq!(counters.successes.load(Ordering::SeqCst), 1);
        assert_eq!(gate.state(), GateState::Succeeded);
    }

    #[test]
    fn test_failing_results_then_timeout_one_reject() {
        let (gate, counters) = gate_with_counters();

        gate.handle_detection(&detection());
        gate.handle_recognition(&recognition("unknown", 0));
        gate.handle_recognition(&recognition("alice", 40));
        gate.handle_recognition(&recognition("unknown", 0));

        sleep(WINDOW + Duration::from_millis(20));
        gate.check_timeout();
        gate.check_timeout(); // second tick must not re-fire

        assert_eq!(counters.rejects.load(Ordering::SeqCst), 1);
        assert_eq!(counters.last_reject_failures.load(Ordering::SeqCst), 3);
        assert_eq!(counters.successes.load(Ordering::SeqCst), 0);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn test_below_threshold_known_face_is_failure() {
        let (gate, counters) = gate_with_counters();

        gate.handle_detection(&detection());
        gate.handle_recognition(&recognition("alice", THRESHOLD - 1));

        assert_eq!(counters.successes.load(Ordering::SeqCst), 0);
        assert_eq!(gate.window_snapshot().failure_count, 1);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let (gate, counters) = gate_with_counters();

        gate.handle_detection(&detection());
        gate.handle_recognition(&recognition("alice", THRESHOLD));

        assert_eq!(counters.successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_after_success_still_counted_but_no_reject() {
        let (gate, counters) = gate_with_counters();

        gate.handle_detection(&detection());
        gate.handle_recognition(&recognition("alice", 95));
        gate.handle_recognition(&recognition("unknown", 0));
        gate.handle_recognition(&recognition("unknown", 0));

        assert_eq!(gate.window_snapshot().failure_count, 2);
        assert_eq!(gate.state(), GateState::Succeeded);

        sleep(WINDOW + Duration::from_millis(20));
        gate.check_timeout();

        // The window succeeded; its failures never become a reject
        assert_eq!(counters.rejects.load(Ordering::SeqCst), 0);
        assert_eq!(counters.successes.load(Ordering::SeqCst), 1);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn test_expired_window_settles_before_new_event() {
        let (gate, counters) = gate_with_counters();

        gate.handle_detection(&detection());
        gate.handle_recognition(&recognition("unknown", 0));

        sleep(WINDOW + Duration::from_millis(20));

        // This event finds the old window expired: reject fires for it,
        // then a fresh window evaluates the new event
        gate.handle_recognition(&recognition("unknown", 0));

        assert_eq!(counters.rejects.load(Ordering::SeqCst), 1);
        assert_eq!(counters.last_reject_failures.load(Ordering::SeqCst), 1);

        let window = gate.window_snapshot();
        assert!(window.active);
        assert_eq!(window.failure_count, 1);
    }

    #[test]
    fn test_expired_window_without_failures_fires_nothing() {
        let (gate, counters) = gate_with_counters();

        // Window opened by detection but no recognition ever arrived
        gate.handle_detection(&detection());
        sleep(WINDOW + Duration::from_millis(20));
        gate.check_timeout();

        assert_eq!(counters.rejects.load(Ordering::SeqCst), 0);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn test_panicking_callback_does_not_corrupt_state() {
        let rejects = Arc::new(AtomicU32::new(0));
        let reject_counter = rejects.clone();

        let gate = RecognitionGate::new(
            WINDOW,
            THRESHOLD,
            |_user, _rec| panic!("broken observer"),
            move |_failures, _rec| {
                reject_counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        gate.handle_recognition(&recognition("alice", 95));
        assert_eq!(gate.state(), GateState::Succeeded);

        // Subsequent events still process against intact state
        gate.handle_recognition(&recognition("unknown", 0));
        assert_eq!(gate.window_snapshot().failure_count, 1);

        sleep(WINDOW + Duration::from_millis(20));
        gate.check_timeout();
        assert_eq!(gate.state(), GateState::Idle);
        assert_eq!(rejects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_two_encounters_two_decisions() {
        let (gate, counters) = gate_with_counters();

        // First encounter: rejected
        gate.handle_detection(&detection());
        gate.handle_recognition(&recognition("unknown", 0));
        sleep(WINDOW + Duration::from_millis(20));
        gate.check_timeout();

        // Second encounter: succeeds
        gate.handle_detection(&detection());
        gate.handle_recognition(&recognition("bob", 90));

        assert_eq!(counters.rejects.load(Ordering::SeqCst), 1);
        assert_eq!(counters.successes.load(Ordering::SeqCst), 1);
    }
}
