//! The controller proper: startup handshake, observer wiring, the
//! periodic timer thread, remote command handling, and ordered shutdown.

use crate::door::Door;
use facegate_core::{DoorState, Error, LogKind, Result, UserId, VisionFunction};
use facegate_face::RecognitionGate;
use facegate_motor::{PulseEmitter, StepperMotor};
use facegate_remote::{RemoteCommand, RemoteSink};
use facegate_serial::VisionLink;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Pause between stopping and restarting a vision function during the
/// registration flow; the firmware needs a beat to tear down.
const FUNCTION_SWITCH_SETTLE: Duration = Duration::from_millis(500);

/// Bound on joining the timer thread at shutdown.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Controller tunables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Debounce window for one face-presentation encounter.
    pub face_window: Duration,

    /// Minimum score for a qualifying face match.
    pub score_threshold: i32,

    /// Door opening angle in degrees.
    pub open_angle: f64,

    /// Delay before an opened door closes itself.
    pub auto_close_delay: Duration,

    /// Cadence of the periodic status report.
    pub status_interval: Duration,

    /// Tick of the timer thread driving window expiry, auto-close, and
    /// status reporting.
    pub tick_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            face_window: Duration::from_secs(5),
            score_threshold: 80,
            open_angle: 90.0,
            auto_close_delay: Duration::from_secs(5),
            status_interval: Duration::from_secs(30),
            tick_interval: Duration::from_millis(500),
        }
    }
}

/// The assembled door controller.
///
/// Owns the serial link, the decision gate, the door, and the periodic
/// timer thread. Remote commands are pushed in by the channel
/// collaborator via [`handle_remote_command`](Self::handle_remote_command).
pub struct DoorController<E, W>
where
    E: PulseEmitter + 'static,
    W: Write + Send + 'static,
{
    link: Arc<VisionLink<W>>,
    door: Arc<Door<E>>,
    gate: Arc<RecognitionGate>,
    sink: Arc<dyn RemoteSink>,
    running: Arc<AtomicBool>,
    timer_thread: Mutex<Option<JoinHandle<()>>>,
}

impl<E, W> DoorController<E, W>
where
    E: PulseEmitter + 'static,
    W: Write + Send + 'static,
{
    /// Start the controller.
    ///
    /// Startup sequence:
    /// 1. `PING` the coprocessor; failure aborts startup — there is no
    ///    door without it.
    /// 2. Wire the decision gate into the link's event dispatcher.
    /// 3. Start face recognition, falling back to plain face detection
    ///    when the recognition model fails to start.
    /// 4. Spawn the periodic timer thread.
    ///
    /// # Errors
    /// Returns `Error::ConnectionFailed` if the handshake fails, or the
    /// underlying error when the link is already dead.
    pub fn start(
        link: VisionLink<W>,
        motor: StepperMotor<E>,
        sink: Arc<dyn RemoteSink>,
        config: ControllerConfig,
    ) -> Result<Arc<Self>> {
        let link = Arc::new(link);

        if !link.ping()? {
            return Err(Error::ConnectionFailed(
                "coprocessor did not answer PING".to_string(),
            ));
        }
        info!("coprocessor handshake ok");

        let door = Door::new(
            motor,
            config.open_angle,
            config.auto_close_delay,
            sink.clone(),
        );

        let gate = Self::build_gate(&config, &door, &sink);
        Self::wire_observers(&link, &gate);
        Self::start_vision(&link);

        let running = Arc::new(AtomicBool::new(true));
        let timer_thread = Self::spawn_timer(&config, &gate, &door, &running)?;

        info!("door controller started");
        Ok(Arc::new(Self {
            link,
            door,
            gate,
            sink,
            running,
            timer_thread: Mutex::new(Some(timer_thread)),
        }))
    }

    fn build_gate(
        config: &ControllerConfig,
        door: &Arc<Door<E>>,
        sink: &Arc<dyn RemoteSink>,
    ) -> Arc<RecognitionGate> {
        let success_door = door.clone();
        let success_sink = sink.clone();
        let reject_sink = sink.clone();

        Arc::new(RecognitionGate::new(
            config.face_window,
            config.score_threshold,
            move |user, recognition| {
                success_door.open();
                success_sink.report_log(
                    LogKind::Success,
                    &format!("recognized: {user} ({}%)", recognition.score),
                );
            },
            move |failures, _recognition| {
                reject_sink.report_log(
                    LogKind::Reject,
                    &format!("rejected after {failures} attempts"),
                );
            },
        ))
    }

    fn wire_observers(link: &Arc<VisionLink<W>>, gate: &Arc<RecognitionGate>) {
        let detection_gate = gate.clone();
        link.on_detection(move |detection| detection_gate.handle_detection(detection));

        let recognition_gate = gate.clone();
        link.on_recognition(move |recognition| recognition_gate.handle_recognition(recognition));
    }

    /// Start face recognition; fall back to plain detection when the
    /// recognition model will not start.
    fn start_vision(link: &Arc<VisionLink<W>>) {
        match link.start_function(VisionFunction::FaceRecognition) {
            Ok(true) => info!("face recognition started"),
            other => {
                warn!(?other, "face recognition failed to start; trying detection");
                match link.start_function(VisionFunction::FaceDetection) {
                    Ok(true) => info!("face detection started"),
                    other => warn!(?other, "face detection failed to start"),
                }
            }
        }
    }

    fn spawn_timer(
        config: &ControllerConfig,
        gate: &Arc<RecognitionGate>,
        door: &Arc<Door<E>>,
        running: &Arc<AtomicBool>,
    ) -> Result<JoinHandle<()>> {
        let gate = gate.clone();
        let door = door.clone();
        let running = running.clone();
        let tick = config.tick_interval;
        let status_interval = config.status_interval;

        let handle = thread::Builder::new()
            .name("door-timer".to_string())
            .spawn(move || {
                let mut last_report: Option<Instant> = None;

                while running.load(Ordering::Acquire) {
                    gate.check_timeout();
                    door.poll_auto_close();

                    let report_due = last_report
                        .map(|at| at.elapsed() >= status_interval)
                        .unwrap_or(true);
                    if report_due {
                        door.report_status();
                        last_report = Some(Instant::now());
                    }

                    thread::sleep(tick);
                }
            })?;

        Ok(handle)
    }

    /// Current door state.
    pub fn door_state(&self) -> DoorState {
        self.door.state()
    }

    /// Handle a command from the remote channel.
    pub fn handle_remote_command(self: &Arc<Self>, command: RemoteCommand) {
        info!(?command, "remote command");

        match command {
            RemoteCommand::Open => {
                self.door.open();
                self.sink.report_log(LogKind::System, "remote open");
            }
            RemoteCommand::Close => {
                self.door.close();
                self.sink.report_log(LogKind::System, "remote close");
            }
            RemoteCommand::RegisterFace { user_id } => match UserId::new(&user_id) {
                Ok(user) => {
                    let controller = self.clone();
                    thread::spawn(move || controller.register_face_worker(&user));
                }
                Err(e) => {
                    warn!("registration refused: {e}");
                    self.sink
                        .report_log(LogKind::System, &format!("registration refused: {e}"));
                }
            },
            RemoteCommand::Refresh => self.door.report_status(),
            RemoteCommand::SetConfig { angle, speed } => {
                if let Some(angle) = angle {
                    self.door.set_open_angle(angle);
                    self.sink
                        .report_log(LogKind::System, &format!("config updated: open angle={angle}"));
                }
                if let Some(speed) = speed {
                    // Accepted and logged; mapping a level onto delay
                    // bounds is driver-board specific
                    self.sink
                        .report_log(LogKind::System, &format!("config updated: speed level={speed}"));
                }
            }
        }
    }

    /// Registration worker: stop the running function, register via the
    /// camera, then restore recognition. Runs on its own thread so the
    /// command path is never blocked for the capture.
    fn register_face_worker(&self, user: &UserId) {
        info!(user = %user, "registering face");
        self.sink
            .report_log(LogKind::System, &format!("registering: {user}"));

        if let Err(e) = self.link.stop_function() {
            warn!("stop before registration failed: {e}");
        }
        thread::sleep(FUNCTION_SWITCH_SETTLE);

        match self.link.register_face(user) {
            Ok(true) => {
                info!(user = %user, "registration succeeded");
                self.sink
                    .report_log(LogKind::System, &format!("registered: {user}"));
            }
            other => {
                error!(user = %user, ?other, "registration failed");
                self.sink
                    .report_log(LogKind::System, &format!("registration failed: {user}"));
            }
        }

        thread::sleep(FUNCTION_SWITCH_SETTLE);
        if let Err(e) = self.link.start_function(VisionFunction::FaceRecognition) {
            warn!("restart after registration failed: {e}");
        }
    }

    /// Snapshot of the decision gate, for diagnostics.
    pub fn gate(&self) -> &Arc<RecognitionGate> {
        &self.gate
    }

    /// Ordered shutdown: cancel scheduled work, stop the coprocessor
    /// function, stop the reader, and join owned threads with a bounded
    /// timeout. Running motor rotations are never interrupted.
    pub fn stop(&self) {
        info!("door controller stopping");

        self.running.store(false, Ordering::Release);
        self.door.cancel_auto_close();

        if let Err(e) = self.link.stop_function() {
            warn!("stop function at shutdown failed: {e}");
        }
        self.link.shutdown(JOIN_TIMEOUT);

        let handle = self
            .timer_thread
            .lock()
            .ok()
            .and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            if join_timeout(handle, JOIN_TIMEOUT).is_err() {
                error!("timer thread failed to shut down within {JOIN_TIMEOUT:?}");
            }
        }

        info!("door controller stopped");
    }
}

/// Join a thread with a bound; a watchdog performs the join and signals
/// over a channel.
fn join_timeout(handle: JoinHandle<()>, timeout: Duration) -> std::result::Result<(), ()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = handle.join();
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(())) => Ok(()),
        _ => Err(()),
    }
}
