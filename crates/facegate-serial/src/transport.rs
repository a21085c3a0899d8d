//! Reader thread: byte stream in, classified frames out.
//!
//! The transport owns the receive half of the serial link. A background
//! thread performs short-timeout blocking reads so that it can observe the
//! shutdown flag promptly, feeds every chunk into the frame scanner, and
//! routes each complete frame:
//!
//! - responses go into the correlator's hand-off channel;
//! - detection/recognition events go to the [`EventDispatcher`];
//! - malformed frames are logged and dropped, and scanning resumes at the
//!   next start sentinel.
//!
//! Differentiating event frames from response frames *before* the hand-off
//! is what keeps the single-in-flight correlation sound: an event arriving
//! during a command's wait window can never be mistaken for the awaited
//! response.
//!
//! # Error handling
//!
//! Transient read errors are logged and the loop continues after a short
//! backoff. A read of zero bytes means the underlying stream is closed;
//! the loop exits and does not resurrect itself — callers must check
//! [`Transport::is_alive`] before issuing further commands.

use crate::dispatcher::EventDispatcher;
use facegate_protocol::{FrameScanner, InboundMessage, MessageParser, Response};
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Backoff after a transient read error.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Read buffer size; event bursts are small, frames are tiny.
const READ_CHUNK_SIZE: usize = 256;

/// Extension trait for timeout-capable thread joins.
///
/// `JoinHandle::join` blocks forever if the thread is wedged; shutdown
/// paths need a bound. A watchdog thread performs the join and signals
/// completion over a channel.
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = self.join();
            // Receiver may have timed out already
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The watchdog keeps running; the OS reclaims it at exit
                Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Thread join timeout",
                )))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "Thread panicked during join",
            ))),
        }
    }
}

/// Handle to the reader thread.
pub struct Transport {
    running: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
}

impl Transport {
    /// Spawn the reader thread over the receive half of the link.
    ///
    /// `reader` must return `Ok(0)` on stream close and time out on idle
    /// reads (`TimedOut`/`WouldBlock`) rather than blocking indefinitely;
    /// the poll interval bounds shutdown latency.
    ///
    /// # Errors
    /// Returns `Error::Io` if the OS refuses to spawn the thread.
    pub fn spawn<R>(
        reader: R,
        response_tx: Sender<Response>,
        dispatcher: Arc<EventDispatcher>,
    ) -> facegate_core::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let running_flag = running.clone();

        let reader_thread = thread::Builder::new()
            .name("vision-reader".to_string())
            .spawn(move || read_loop(reader, response_tx, dispatcher, running_flag))?;

        Ok(Self {
            running,
            reader_thread: Some(reader_thread),
        })
    }

    /// Whether the reader thread is still running.
    ///
    /// The thread exits on its own when the underlying stream closes;
    /// commands sent after that can only time out.
    pub fn is_alive(&self) -> bool {
        self.reader_thread
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Signal the reader to stop and join it with a bounded timeout.
    pub fn shutdown(&mut self, timeout: Duration) {
        self.running.store(false, Ordering::Release);

        if let Some(handle) = self.reader_thread.take() {
            if handle.join_timeout(timeout).is_err() {
                error!("reader thread failed to shut down within {timeout:?}");
            }
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if self.reader_thread.is_some() {
            self.shutdown(Duration::from_secs(2));
        }
    }
}

fn read_loop<R: Read>(
    mut reader: R,
    response_tx: Sender<Response>,
    dispatcher: Arc<EventDispatcher>,
    running: Arc<AtomicBool>,
) {
    debug!("reader thread started");

    let mut scanner = FrameScanner::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    while running.load(Ordering::Acquire) {
        match reader.read(&mut chunk) {
            Ok(0) => {
                // Stream closed; do not resurrect
                error!("serial stream closed; reader exiting");
                break;
            }
            Ok(n) => {
                trace!(bytes = n, "rx chunk");
                scanner.feed_bytes(&chunk[..n]);
                drain_frames(&mut scanner, &response_tx, &dispatcher);
            }
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::WouldBlock
                        | std::io::ErrorKind::Interrupted
                ) =>
            {
                // Idle poll; loop around to observe the running flag
            }
            Err(e) => {
                if running.load(Ordering::Acquire) {
                    warn!("serial read error: {e}");
                }
                thread::sleep(READ_ERROR_BACKOFF);
            }
        }
    }

    debug!("reader thread exited");
}

fn drain_frames(
    scanner: &mut FrameScanner,
    response_tx: &Sender<Response>,
    dispatcher: &Arc<EventDispatcher>,
) {
    while let Some(frame) = scanner.next_frame() {
        match MessageParser::parse(&frame) {
            Ok(InboundMessage::Response(response)) => {
                trace!(status = %response.status, "response frame");
                if response_tx.send(response).is_err() {
                    // Correlator gone; responses have nowhere to go
                    debug!("response channel closed; dropping response");
                }
            }
            Ok(InboundMessage::Detection(detection)) => {
                dispatcher.dispatch_detection(&detection);
            }
            Ok(InboundMessage::Recognition(recognition)) => {
                trace!(name = %recognition.name, score = recognition.score, "recognition frame");
                dispatcher.dispatch_recognition(&recognition);
            }
            Err(e) => {
                // Dropped silently apart from the log; scanning continues
                // from the next sentinel
                debug!("malformed frame dropped: {e}");
            }
        }
    }
}
