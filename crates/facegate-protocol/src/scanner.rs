//! Stream scanner for sentinel-delimited frames.
//!
//! A serial read returns an arbitrary slice of the byte stream: a partial
//! frame, several complete frames, or garbage between frames. The scanner
//! accumulates chunks and extracts complete `$`…`#` frames in arrival
//! order.
//!
//! # Algorithm
//!
//! On each `feed`:
//!
//! 1. Append the chunk to the buffer.
//! 2. Locate the next `$`. If there is none, the whole buffer is garbage:
//!    discard it and stop.
//! 3. Discard any bytes preceding the `$`.
//! 4. Locate the next `#`. If there is none, keep the partial frame and
//!    wait for more data.
//! 5. Slice out the bounded frame, advance past it, and repeat from 2 to
//!    drain multiple frames received in one chunk.
//!
//! No byte survives once it is classified as a prefix to a found start
//! sentinel, and frames are always yielded in arrival order.
//!
//! # Usage
//!
//! ```
//! use facegate_protocol::FrameScanner;
//!
//! let mut scanner = FrameScanner::new();
//!
//! scanner.feed("noise$RSP,8,O");
//! assert_eq!(scanner.next_frame(), None); // not complete yet
//!
//! scanner.feed("K#$16,06,1");
//! assert_eq!(scanner.next_frame().as_deref(), Some("$RSP,8,OK#"));
//!
//! scanner.feed(",2,3,4#");
//! assert_eq!(scanner.next_frame().as_deref(), Some("$16,06,1,2,3,4#"));
//! ```

use facegate_core::constants::{END_SENTINEL, START_SENTINEL};
use std::collections::VecDeque;

/// Maximum buffer size before the scanner resets itself.
///
/// Real frames are well under a hundred bytes; a buffer this large without
/// a complete frame means the stream is corrupt (e.g. a wedged sender
/// emitting `$` and never `#`). Resetting bounds memory use.
const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Initial buffer capacity, sized for a burst of event packets.
const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Stateful scanner that reassembles frames from partial reads.
#[derive(Debug, Default)]
pub struct FrameScanner {
    /// Accumulated text that has not yet formed a complete frame.
    buffer: String,

    /// Complete frames ready for extraction, in arrival order.
    frames: VecDeque<String>,
}

impl FrameScanner {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(INITIAL_BUFFER_CAPACITY),
            frames: VecDeque::new(),
        }
    }

    /// Feed a chunk of text and extract any complete frames.
    pub fn feed(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
        self.extract_frames();
    }

    /// Feed raw bytes.
    ///
    /// The protocol is ASCII; invalid UTF-8 sequences become replacement
    /// characters, which the sentinel scan then discards as garbage.
    pub fn feed_bytes(&mut self, bytes: &[u8]) {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        self.extract_frames();
    }

    /// Pop the next complete frame, if any.
    pub fn next_frame(&mut self) -> Option<String> {
        self.frames.pop_front()
    }

    /// Number of frames ready for extraction.
    pub fn frames_available(&self) -> usize {
        self.frames.len()
    }

    /// Discard all buffered data and queued frames.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.frames.clear();
    }

    fn extract_frames(&mut self) {
        if self.buffer.len() > MAX_BUFFER_SIZE {
            // Corrupt stream; drop everything and resynchronize on the
            // next start sentinel.
            self.buffer.clear();
            return;
        }

        loop {
            let Some(start) = self.buffer.find(START_SENTINEL) else {
                // No start sentinel anywhere: the entire buffer is garbage.
                self.buffer.clear();
                return;
            };

            if start > 0 {
                self.buffer.drain(..start);
            }

            let Some(end) = self.buffer.find(END_SENTINEL) else {
                // Partial frame; wait for more data.
                return;
            };

            let frame: String = self.buffer.drain(..=end).collect();
            self.frames.push_back(frame);
        }
    }
}
