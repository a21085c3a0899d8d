//! Door actuation and auto-close scheduling.

use facegate_core::DoorState;
use facegate_motor::{PulseEmitter, RotationDirection, StepperMotor};
use facegate_remote::RemoteSink;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// The door: motor, tracked state, and the pending auto-close deadline.
///
/// The controller is the single writer of [`DoorState`]; the periodic
/// status reporter only reads it. Rotations run on worker threads so the
/// callback path that triggers them (the transport's reader thread) is
/// never blocked for the length of a pulse train.
///
/// Auto-close is a deadline polled by the controller's timer thread
/// rather than a spawned sleeper: cancelling is a field clear, and
/// shutdown cannot leak a sleeping thread.
pub struct Door<E: PulseEmitter + 'static> {
    motor: StepperMotor<E>,
    state: Mutex<DoorState>,
    open_angle: Mutex<f64>,
    auto_close_delay: Duration,
    close_deadline: Mutex<Option<Instant>>,
    sink: Arc<dyn RemoteSink>,
}

impl<E: PulseEmitter + 'static> Door<E> {
    pub fn new(
        motor: StepperMotor<E>,
        open_angle: f64,
        auto_close_delay: Duration,
        sink: Arc<dyn RemoteSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            motor,
            state: Mutex::new(DoorState::Closed),
            open_angle: Mutex::new(open_angle),
            auto_close_delay,
            close_deadline: Mutex::new(None),
            sink,
        })
    }

    /// Current door state.
    pub fn state(&self) -> DoorState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(DoorState::Unknown)
    }

    /// Opening angle currently in effect.
    pub fn open_angle(&self) -> f64 {
        self.open_angle.lock().map(|a| *a).unwrap_or_default()
    }

    /// Update the opening angle (remote `SET_CONFIG`).
    pub fn set_open_angle(&self, angle: f64) {
        if let Ok(mut stored) = self.open_angle.lock() {
            *stored = angle;
        }
    }

    /// Open the door.
    ///
    /// Cancels any pending auto-close, reports the new state, starts the
    /// opening rotation on a worker thread, and schedules the auto-close.
    /// Re-opening while already open simply reschedules the close.
    pub fn open(self: &Arc<Self>) {
        info!("door opening");
        self.cancel_auto_close();

        self.set_state(DoorState::Open);
        self.report_status();

        self.rotate_async(self.open_angle(), RotationDirection::Open);

        if let Ok(mut deadline) = self.close_deadline.lock() {
            *deadline = Some(Instant::now() + self.auto_close_delay);
        }
    }

    /// Close the door.
    pub fn close(self: &Arc<Self>) {
        info!("door closing");
        self.cancel_auto_close();

        self.set_state(DoorState::Closed);
        self.report_status();

        self.rotate_async(self.open_angle(), RotationDirection::Close);
    }

    /// Report the current state through the remote sink.
    pub fn report_status(&self) {
        self.sink.report_door_status(self.state());
    }

    /// Clear the pending auto-close, if any.
    pub fn cancel_auto_close(&self) {
        if let Ok(mut deadline) = self.close_deadline.lock() {
            *deadline = None;
        }
    }

    /// Fire the auto-close if its deadline has passed. Called from the
    /// periodic timer thread.
    pub fn poll_auto_close(self: &Arc<Self>) {
        let due = self
            .close_deadline
            .lock()
            .map(|deadline| deadline.is_some_and(|at| Instant::now() >= at))
            .unwrap_or(false);

        if due {
            info!("auto-close deadline reached");
            self.close();
        }
    }

    fn set_state(&self, new_state: DoorState) {
        if let Ok(mut state) = self.state.lock() {
            *state = new_state;
        }
    }

    /// Run a rotation on a worker thread. The train always completes once
    /// started; only the spawn point is asynchronous.
    fn rotate_async(self: &Arc<Self>, angle: f64, direction: RotationDirection) {
        let door = self.clone();
        std::thread::spawn(move || {
            if let Err(e) = door.motor.rotate(angle, direction) {
                error!("motor rotation failed: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facegate_motor::{MotorProfile, RecordingEmitter};
    use facegate_remote::RecordingSink;
    use std::thread::sleep;

    fn fast_profile() -> MotorProfile {
        MotorProfile {
            pulses_per_rev: 800,
            min_delay: Duration::from_micros(50),
            max_delay: Duration::from_micros(200),
        }
    }

    fn door_with(
        auto_close: Duration,
    ) -> (Arc<Door<RecordingEmitter>>, RecordingEmitter, Arc<RecordingSink>) {
        let emitter = RecordingEmitter::new();
        let sink = Arc::new(RecordingSink::new());
        let motor = StepperMotor::new(emitter.clone(), fast_profile());
        let door = Door::new(motor, 90.0, auto_close, sink.clone());
        (door, emitter, sink)
    }

    fn wait_until(deadline_ms: u64, predicate: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(deadline_ms);
        while Instant::now() < deadline {
            if predicate() {
                return true;
            }
            sleep(Duration::from_millis(5));
        }
        predicate()
    }

    #[test]
    fn test_starts_closed() {
        let (door, _emitter, sink) = door_with(Duration::from_secs(5));
        assert_eq!(door.state(), DoorState::Closed);
        assert!(sink.statuses().is_empty());
    }

    #[test]
    fn test_open_reports_state_and_rotates() {
        let (door, emitter, sink) = door_with(Duration::from_secs(5));

        door.open();
        assert_eq!(door.state(), DoorState::Open);
        assert_eq!(sink.statuses(), vec![DoorState::Open]);

        // Worker thread emits the 200-pulse train for 90 degrees
        assert!(wait_until(2_000, || emitter.pulse_count() == 200));
    }

    #[test]
    fn test_auto_close_fires_after_delay() {
        let (door, _emitter, sink) = door_with(Duration::from_millis(80));

        door.open();
        sleep(Duration::from_millis(120));
        door.poll_auto_close();

        assert_eq!(door.state(), DoorState::Closed);
        assert_eq!(sink.statuses(), vec![DoorState::Open, DoorState::Closed]);
    }

    #[test]
    fn test_auto_close_not_due_yet() {
        let (door, _emitter, _sink) = door_with(Duration::from_secs(5));

        door.open();
        door.poll_auto_close();
        assert_eq!(door.state(), DoorState::Open);
    }

    #[test]
    fn test_reopen_reschedules_auto_close() {
        let (door, _emitter, _sink) = door_with(Duration::from_millis(100));

        door.open();
        sleep(Duration::from_millis(60));
        // Second open pushes the deadline out again
        door.open();
        sleep(Duration::from_millis(60));
        door.poll_auto_close();

        assert_eq!(door.state(), DoorState::Open);
    }

    #[test]
    fn test_manual_close_cancels_auto_close() {
        let (door, _emitter, sink) = door_with(Duration::from_millis(50));

        door.open();
        door.close();
        sleep(Duration::from_millis(80));
        door.poll_auto_close();

        // One Open and one Closed report; the poll found nothing pending
        assert_eq!(sink.statuses(), vec![DoorState::Open, DoorState::Closed]);
    }

    #[test]
    fn test_set_open_angle_applies_to_next_rotation() {
        let (door, emitter, _sink) = door_with(Duration::from_secs(5));

        door.set_open_angle(45.0);
        assert_eq!(door.open_angle(), 45.0);

        door.open();
        // 45/360 * 800 = 100
        assert!(wait_until(2_000, || emitter.pulse_count() == 100));
    }

    #[test]
    fn test_refresh_reports_without_movement() {
        let (door, emitter, sink) = door_with(Duration::from_secs(5));

        door.report_status();
        assert_eq!(sink.statuses(), vec![DoorState::Closed]);
        assert_eq!(emitter.pulse_count(), 0);
    }
}
