//! In-memory serial link for testing and development.
//!
//! [`mock_link`] returns the two halves the transport and correlator
//! expect plus a [`MockLinkHandle`] that a test uses to play the
//! coprocessor's side: push inbound frames, inspect written commands, and
//! close the stream.
//!
//! The reader half behaves like a real serial port opened with a short
//! read timeout: reads block for at most the poll interval and return
//! `TimedOut` when idle, `Ok(0)` once the handle closes the stream.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Poll interval the mock reader blocks for when idle.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Default)]
struct Inbound {
    data: VecDeque<u8>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    inbound: Mutex<Inbound>,
    data_available: Condvar,
    outbound: Mutex<Vec<u8>>,
}

/// Receive half handed to the transport.
pub struct MockReader {
    shared: Arc<Shared>,
}

/// Transmit half handed to the correlator.
pub struct MockWriter {
    shared: Arc<Shared>,
}

/// Test-side control of the link.
#[derive(Clone)]
pub struct MockLinkHandle {
    shared: Arc<Shared>,
}

/// Create an in-memory serial link.
///
/// # Example
///
/// ```
/// use facegate_serial::mock::mock_link;
/// use std::io::Read;
///
/// let (mut reader, _writer, handle) = mock_link();
/// handle.push_frame("$RSP,8,OK#");
///
/// let mut buf = [0u8; 64];
/// let n = reader.read(&mut buf).unwrap();
/// assert_eq!(&buf[..n], b"$RSP,8,OK#");
/// ```
pub fn mock_link() -> (MockReader, MockWriter, MockLinkHandle) {
    let shared = Arc::new(Shared::default());
    (
        MockReader {
            shared: shared.clone(),
        },
        MockWriter {
            shared: shared.clone(),
        },
        MockLinkHandle { shared },
    )
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inbound = self
            .shared
            .inbound
            .lock()
            .map_err(|_| io::Error::other("mock lock poisoned"))?;

        if inbound.data.is_empty() && !inbound.closed {
            let (guard, _timed_out) = self
                .shared
                .data_available
                .wait_timeout(inbound, POLL_INTERVAL)
                .map_err(|_| io::Error::other("mock lock poisoned"))?;
            inbound = guard;
        }

        if !inbound.data.is_empty() {
            let n = buf.len().min(inbound.data.len());
            for slot in buf.iter_mut().take(n) {
                *slot = inbound.data.pop_front().unwrap_or(0);
            }
            return Ok(n);
        }

        if inbound.closed {
            return Ok(0);
        }

        Err(io::Error::new(io::ErrorKind::TimedOut, "mock read timeout"))
    }
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut outbound = self
            .shared
            .outbound
            .lock()
            .map_err(|_| io::Error::other("mock lock poisoned"))?;
        outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MockLinkHandle {
    /// Queue an inbound frame for the reader.
    pub fn push_frame(&self, frame: &str) {
        self.push_bytes(frame.as_bytes());
    }

    /// Queue raw inbound bytes (partial frames, garbage, bursts).
    pub fn push_bytes(&self, bytes: &[u8]) {
        if let Ok(mut inbound) = self.shared.inbound.lock() {
            inbound.data.extend(bytes);
        }
        self.shared.data_available.notify_all();
    }

    /// Close the stream; the reader sees `Ok(0)` once queued data drains.
    pub fn close(&self) {
        if let Ok(mut inbound) = self.shared.inbound.lock() {
            inbound.closed = true;
        }
        self.shared.data_available.notify_all();
    }

    /// Everything written to the transmit half so far.
    pub fn written_text(&self) -> String {
        self.shared
            .outbound
            .lock()
            .map(|o| String::from_utf8_lossy(&o).into_owned())
            .unwrap_or_default()
    }

    /// Block until the written stream contains `needle`, or `timeout`.
    ///
    /// Tests use this to answer a command only after it has actually been
    /// sent — answering earlier would be drained as a stale response.
    pub fn wait_for_command(&self, needle: &str, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if self.written_text().contains(needle) {
                return true;
            }
            if std::time::Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_times_out_when_idle() {
        let (mut reader, _writer, _handle) = mock_link();
        let mut buf = [0u8; 16];

        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_read_returns_zero_after_close() {
        let (mut reader, _writer, handle) = mock_link();
        handle.push_frame("$RSP,8,OK#");
        handle.close();

        let mut buf = [0u8; 64];
        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"$RSP,8,OK#");

        // Queued data drained; stream is closed
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_writes_are_captured() {
        let (_reader, mut writer, handle) = mock_link();
        writer.write_all(b"$CMD,PING#").unwrap();
        writer.flush().unwrap();

        assert_eq!(handle.written_text(), "$CMD,PING#");
        assert!(handle.wait_for_command("PING", Duration::from_millis(10)));
    }

    #[test]
    fn test_small_destination_buffer() {
        let (mut reader, _writer, handle) = mock_link();
        handle.push_frame("$RSP,8,OK#");

        let mut buf = [0u8; 4];
        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"$RSP");
    }
}
