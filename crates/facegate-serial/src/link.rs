//! High-level client for the vision coprocessor.
//!
//! [`VisionLink`] owns the transport (reader thread), the correlator, and
//! the event dispatcher, and exposes the coprocessor's command set with
//! the timeouts each command needs: `START` reloads the recognition model
//! and `REGCAM` waits for a live face capture, so both run far past the
//! default command timeout.
//!
//! Production code opens a real serial port with [`VisionLink::open`];
//! tests wire the in-memory mock through [`VisionLink::connect`].

use crate::{Correlator, EventDispatcher, Transport};
use facegate_core::{Error, Result, UserId, VisionFunction, constants::*};
use facegate_protocol::{Command, FaceDetection, FaceRecognition, Response};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;
use tracing::{debug, info};

/// Serial port configuration.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub port: String,

    /// Baud rate; the coprocessor firmware runs at 115200.
    pub baud_rate: u32,

    /// Read timeout for the poll loop. Bounds shutdown latency.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Running state reported by `STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisionStatus {
    /// Whether a vision function is currently running.
    pub running: bool,

    /// Id of the active function (0 when idle).
    pub function_id: u8,
}

/// Connected serial link to the vision coprocessor.
pub struct VisionLink<W: Write + Send> {
    transport: Mutex<Transport>,
    correlator: Correlator<W>,
    dispatcher: Arc<EventDispatcher>,
}

impl VisionLink<Box<dyn SerialPort>> {
    /// Open the configured serial port and start the reader thread.
    ///
    /// The port is split into independent read and write handles; driver
    /// buffers are cleared so a previous session's bytes cannot leak into
    /// this one.
    ///
    /// # Errors
    /// Returns `Error::ConnectionFailed` if the port cannot be opened or
    /// cloned. This is fatal to startup — there is no door without the
    /// coprocessor.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.read_timeout)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .open()
            .map_err(|e| Error::ConnectionFailed(format!("{}: {e}", config.port)))?;

        let reader = port
            .try_clone()
            .map_err(|e| Error::ConnectionFailed(format!("{}: clone: {e}", config.port)))?;

        if let Err(e) = port.clear(serialport::ClearBuffer::All) {
            debug!("could not clear serial buffers: {e}");
        }

        info!(
            port = %config.port,
            baud = config.baud_rate,
            "serial link opened"
        );

        Self::connect(reader, port)
    }
}

impl<W: Write + Send> VisionLink<W> {
    /// Build a link over arbitrary read/write halves.
    pub fn connect<R>(reader: R, writer: W) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let dispatcher = Arc::new(EventDispatcher::new());
        let (response_tx, response_rx) = mpsc::channel();

        let transport = Transport::spawn(reader, response_tx, dispatcher.clone())?;
        let correlator = Correlator::new(writer, response_rx);

        Ok(Self {
            transport: Mutex::new(transport),
            correlator,
            dispatcher,
        })
    }

    /// Subscribe to face detection events.
    pub fn on_detection<F>(&self, handler: F)
    where
        F: Fn(&FaceDetection) + Send + Sync + 'static,
    {
        self.dispatcher.on_detection(handler);
    }

    /// Subscribe to face recognition events.
    pub fn on_recognition<F>(&self, handler: F)
    where
        F: Fn(&FaceRecognition) + Send + Sync + 'static,
    {
        self.dispatcher.on_recognition(handler);
    }

    /// Whether the reader thread is still alive.
    pub fn is_alive(&self) -> bool {
        self.transport
            .lock()
            .map(|t| t.is_alive())
            .unwrap_or(false)
    }

    /// Send a command and wait for its response.
    ///
    /// # Errors
    /// Returns `Error::ReaderDead` if the reader thread has exited (the
    /// command could never be answered), otherwise the correlator's
    /// errors.
    pub fn send(&self, command: &Command, timeout: Duration) -> Result<Response> {
        if !self.is_alive() {
            return Err(Error::ReaderDead);
        }
        self.correlator.send(command, timeout)
    }

    /// Stop the reader thread and release the link.
    pub fn shutdown(&self, timeout: Duration) {
        if let Ok(mut transport) = self.transport.lock() {
            transport.shutdown(timeout);
        }
    }

    // ==================== Convenience commands ====================

    /// Liveness check.
    pub fn ping(&self) -> Result<bool> {
        let resp = self.send(
            &Command::ping(),
            Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
        )?;
        Ok(resp.is_pong())
    }

    /// Query running state and active function id.
    pub fn status(&self) -> Result<Option<VisionStatus>> {
        let resp = self.send(
            &Command::status(),
            Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
        )?;

        if resp.is_ok() && resp.data.len() >= 2 {
            let function_id = resp.data[1].parse().unwrap_or(0);
            return Ok(Some(VisionStatus {
                running: resp.data[0] == "1",
                function_id,
            }));
        }
        Ok(None)
    }

    /// Start a vision function. Model initialization is slow, hence the
    /// long timeout.
    pub fn start_function(&self, function: VisionFunction) -> Result<bool> {
        let resp = self.send(
            &Command::start(function),
            Duration::from_millis(START_TIMEOUT_MS),
        )?;
        Ok(resp.is_ok())
    }

    /// Stop the running function.
    pub fn stop_function(&self) -> Result<bool> {
        let resp = self.send(&Command::stop(), Duration::from_millis(STOP_TIMEOUT_MS))?;
        Ok(resp.is_ok())
    }

    /// Register a face for `user` via the camera. Waits for a live
    /// capture.
    pub fn register_face(&self, user: &UserId) -> Result<bool> {
        let resp = self.send(
            &Command::register_face(user),
            Duration::from_millis(REGISTER_TIMEOUT_MS),
        )?;
        Ok(resp.is_ok())
    }

    /// Delete `user` from the face database.
    pub fn delete_user(&self, user: &UserId) -> Result<bool> {
        let resp = self.send(
            &Command::delete_user(user),
            Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
        )?;
        Ok(resp.is_ok())
    }

    /// List registered users.
    ///
    /// The firmware packs either one comma-joined data field or one field
    /// per user, depending on version; both shapes are handled.
    pub fn list_users(&self) -> Result<Vec<String>> {
        let resp = self.send(
            &Command::list_users(),
            Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
        )?;

        if !resp.is_ok() {
            return Ok(Vec::new());
        }

        if resp.data.len() == 1 && resp.data[0].contains(FIELD_SEPARATOR) {
            return Ok(resp.data[0]
                .split(FIELD_SEPARATOR)
                .map(|s| s.to_string())
                .collect());
        }
        Ok(resp.data)
    }

    /// Reload the face database from flash.
    pub fn reload_database(&self) -> Result<bool> {
        let resp = self.send(&Command::reload(), Duration::from_millis(RELOAD_TIMEOUT_MS))?;
        Ok(resp.is_ok())
    }
}
