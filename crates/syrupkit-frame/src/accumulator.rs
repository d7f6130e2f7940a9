//! Fixed-capacity stream buffer that reassembles frames from arbitrary reads.
//!
//! The accumulator performs no I/O. A caller reads into [`Accumulator::write_slice`],
//! commits with [`Accumulator::advance`], then drains frames with
//! [`Accumulator::next_frame`] until it returns `Ok(None)`.
//!
//! ```text
//!  0            read_pos           write_pos          capacity
//!  ├──consumed───┼──────unread───────┼──────free─────────┤
//! ```
//!
//! Once `read_pos` reaches the midpoint the unread region is shifted to the
//! front and both cursors move back, so memory stays bounded without a
//! per-frame allocation.

use syrupkit_value::{Decoder, Value};
use tracing::{debug, trace, warn};

use crate::codec::{decode_frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Default backing buffer size: 64 KiB.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Smallest accepted capacity: a header plus one byte of payload.
const MIN_CAPACITY: usize = HEADER_SIZE + 1;

#[derive(Debug)]
pub struct Accumulator {
    buf: Box<[u8]>,
    read_pos: usize,
    write_pos: usize,
    max_payload: usize,
    /// Payload bytes of a rejected oversized frame still to be skipped.
    discard: usize,
    decoder: Decoder,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    /// Create an accumulator with [`DEFAULT_CAPACITY`] and default limits.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CAPACITY, FrameConfig::default())
    }

    /// Create an accumulator with the given capacity and frame limits.
    ///
    /// Frames larger than `capacity - HEADER_SIZE` can never be buffered,
    /// so the payload limit is clamped to that.
    pub fn with_config(capacity: usize, config: FrameConfig) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            read_pos: 0,
            write_pos: 0,
            max_payload: config.max_payload_size.min(capacity - HEADER_SIZE),
            discard: 0,
            decoder: config.decoder(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Largest payload this accumulator will hand out.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Bytes written but not yet consumed as frames.
    pub fn unread(&self) -> usize {
        self.write_pos - self.read_pos
    }

    pub fn is_empty(&self) -> bool {
        self.unread() == 0
    }

    /// Drop all buffered bytes and any pending discard.
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
        self.discard = 0;
    }

    /// The unwritten tail of the buffer, for the caller to fill.
    ///
    /// Compacts first when the consumed prefix has grown past the midpoint,
    /// or when the tail is exhausted but consumed bytes can be reclaimed.
    pub fn write_slice(&mut self) -> &mut [u8] {
        let capacity = self.capacity();
        if self.read_pos >= capacity / 2 || (self.write_pos == capacity && self.read_pos > 0) {
            self.compact();
        }
        &mut self.buf[self.write_pos..]
    }

    /// Commit `n` bytes written into the slice from [`Self::write_slice`].
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the writable tail.
    pub fn advance(&mut self, n: usize) {
        assert!(
            n <= self.capacity() - self.write_pos,
            "advance({n}) past end of accumulator ({} writable)",
            self.capacity() - self.write_pos
        );
        self.write_pos += n;
        trace!(bytes = n, unread = self.unread(), "accumulator advanced");
    }

    /// Copy as much of `data` as fits; returns the number of bytes taken.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> usize {
        let tail = self.write_slice();
        let n = tail.len().min(data.len());
        tail[..n].copy_from_slice(&data[..n]);
        self.advance(n);
        n
    }

    /// Return the next complete frame's payload.
    ///
    /// `Ok(None)` means more bytes are needed. An oversized frame is reported
    /// once as [`FrameError::MessageTooLarge`]; its payload is then skipped
    /// as it arrives and later frames decode normally.
    pub fn next_frame(&mut self) -> Result<Option<&[u8]>> {
        self.skip_discarded();
        if self.discard > 0 {
            return Ok(None);
        }

        let unread = &self.buf[self.read_pos..self.write_pos];
        let located = decode_frame(unread, self.max_payload).map(|f| f.map(|f| f.consumed));

        match located {
            Ok(Some(consumed)) => {
                let start = self.read_pos + HEADER_SIZE;
                let end = self.read_pos + consumed;
                self.read_pos = end;
                trace!(payload = consumed - HEADER_SIZE, "frame extracted");
                Ok(Some(&self.buf[start..end]))
            }
            Ok(None) => Ok(None),
            Err(FrameError::MessageTooLarge { size, max }) => {
                warn!(size, max, "oversized frame rejected, discarding payload");
                self.read_pos += HEADER_SIZE;
                self.discard = size;
                self.skip_discarded();
                Err(FrameError::MessageTooLarge { size, max })
            }
            Err(err) => Err(err),
        }
    }

    /// Return and decode the next complete frame.
    ///
    /// A payload that fails to decode is still consumed, so the next call
    /// moves on to the following frame.
    pub fn next_value(&mut self) -> Result<Option<Value>> {
        let decoder = self.decoder;
        match self.next_frame()? {
            Some(payload) => Ok(Some(decoder.decode(payload)?)),
            None => Ok(None),
        }
    }

    fn skip_discarded(&mut self) {
        if self.discard == 0 {
            return;
        }
        let n = self.discard.min(self.unread());
        self.read_pos += n;
        self.discard -= n;
        if n > 0 {
            debug!(skipped = n, remaining = self.discard, "discarded oversized payload bytes");
        }
    }

    fn compact(&mut self) {
        let unread = self.unread();
        if unread > 0 {
            self.buf.copy_within(self.read_pos..self.write_pos, 0);
        }
        debug!(reclaimed = self.read_pos, unread, "accumulator compacted");
        self.read_pos = 0;
        self.write_pos = unread;
    }
}
