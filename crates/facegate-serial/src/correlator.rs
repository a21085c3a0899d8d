//! Send-and-wait command correlation.
//!
//! The wire format carries no correlation identifier, so the protocol is
//! strictly single-in-flight: response ordering must exactly match send
//! ordering. One mutex guards the entire send-and-wait operation, and any
//! response left in the hand-off channel by a previously timed-out command
//! is drained and discarded before the next send — a late, stale response
//! can never be mistaken for the new command's response.
//!
//! This discipline is a deliberate wire-compatibility assumption. The
//! transport distinguishes event frames from response frames before the
//! hand-off, so bursty event traffic cannot race the awaited response; the
//! remaining exposure is a device that emits an unsolicited `RSP` frame
//! inside a wait window, which nothing on this side could disambiguate.

use facegate_core::{Error, Result};
use facegate_protocol::{Command, Response};
use std::io::Write;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;
use tracing::{debug, info, warn};

struct CorrelatorInner<W> {
    writer: W,
    response_rx: Receiver<Response>,
}

/// Single-in-flight command correlator.
///
/// The transport's reader thread is the producer side of the hand-off
/// channel; the calling thread blocks on it for up to the timeout.
pub struct Correlator<W: Write + Send> {
    inner: Mutex<CorrelatorInner<W>>,
}

impl<W: Write + Send> Correlator<W> {
    /// Create a correlator over the transmit half of the link and the
    /// response hand-off channel fed by the transport.
    pub fn new(writer: W, response_rx: Receiver<Response>) -> Self {
        Self {
            inner: Mutex::new(CorrelatorInner {
                writer,
                response_rx,
            }),
        }
    }

    /// Send a command and block for its response.
    ///
    /// Only one command may be outstanding at a time; a concurrent caller
    /// waits for the critical section, it is never interleaved.
    ///
    /// # Errors
    ///
    /// - `Error::CommandTimeout` if no response arrives within `timeout`.
    ///   The command is never retried here; the caller decides fallback
    ///   behavior.
    /// - `Error::TransportClosed` if the reader thread has exited and the
    ///   hand-off channel is disconnected.
    /// - `Error::Io` if writing the command bytes fails.
    pub fn send(&self, command: &Command, timeout: Duration) -> Result<Response> {
        let mut inner = self.inner.lock().map_err(|_| Error::TransportClosed)?;

        // Drain responses a previous timed-out command left behind
        let mut stale = 0usize;
        loop {
            match inner.response_rx.try_recv() {
                Ok(_) => stale += 1,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(Error::TransportClosed),
            }
        }
        if stale > 0 {
            debug!(stale, "discarded stale responses before send");
        }

        let bytes = command.encode();
        info!(command = %command, "tx");
        inner.writer.write_all(&bytes)?;
        inner.writer.flush()?;

        match inner.response_rx.recv_timeout(timeout) {
            Ok(response) => {
                debug!(status = %response.status, data = ?response.data, "rx response");
                Ok(response)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(command = %command, ?timeout, "command timed out");
                Err(Error::CommandTimeout {
                    command: command.kind().as_str().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(Error::TransportClosed),
        }
    }
}
