use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};
use syrupkit_value::Value;
use tracing::{debug, warn};

use crate::codec::{split_frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Partial reads are buffered internally, so callers only ever see whole frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    /// Payload bytes of a rejected oversized frame still to be skipped.
    discard: usize,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discard: 0,
        }
    }

    /// Read the next complete frame's payload (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. An
    /// oversized frame is reported once as [`FrameError::MessageTooLarge`];
    /// its payload is skipped as it arrives and the next call continues
    /// with the following frame.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            self.skip_discarded();
            if self.discard == 0 {
                match split_frame(&mut self.buf, self.config.max_payload_size) {
                    Ok(Some(payload)) => return Ok(payload),
                    Ok(None) => {}
                    Err(FrameError::MessageTooLarge { size, max }) => {
                        warn!(size, max, "oversized frame rejected, discarding payload");
                        self.buf.advance(HEADER_SIZE);
                        self.discard = size;
                        self.skip_discarded();
                        return Err(FrameError::MessageTooLarge { size, max });
                    }
                    Err(err) => return Err(err),
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read and decode the next frame.
    ///
    /// Byte-string payloads in the result share the frame's buffer.
    pub fn read_value(&mut self) -> Result<Value> {
        let payload = self.read_frame()?;
        Ok(self.config.decoder().decode_bytes(&payload)?)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn skip_discarded(&mut self) {
        if self.discard == 0 {
            return;
        }
        let n = self.discard.min(self.buf.len());
        self.buf.advance(n);
        self.discard -= n;
        if n > 0 {
            debug!(skipped = n, remaining = self.discard, "discarded oversized payload bytes");
        }
    }
}
