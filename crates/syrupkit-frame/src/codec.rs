use bytes::{Buf, BufMut, Bytes, BytesMut};
use syrupkit_value::{CodecConfig, Decoder, Encoder, SliceSink, Value};

use crate::error::{FrameError, Result};

/// Frame header: big-endian payload length (4) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Default maximum payload size: 4 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 4 * 1024 * 1024;

/// A complete frame located inside a borrowed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    /// The encoded value carried by the frame.
    pub payload: &'a [u8],
    /// Header plus payload length; where the next frame starts.
    pub consumed: usize,
}

impl RawFrame<'_> {
    /// Decode the payload with the default codec limits.
    pub fn decode(&self) -> Result<Value> {
        Ok(syrupkit_value::decode(self.payload)?)
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 4 MiB.
    pub max_payload_size: usize,
    /// Limits applied when encoding and decoding payloads.
    pub codec: CodecConfig,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            codec: CodecConfig::default(),
        }
    }
}

impl FrameConfig {
    pub fn encoder(&self) -> Encoder {
        Encoder::with_config(self.codec)
    }

    pub fn decoder(&self) -> Decoder {
        Decoder::with_config(self.codec)
    }

    /// Payload limit, never above what the 4-byte header can express.
    fn payload_limit(&self) -> usize {
        self.max_payload_size.min(u32::MAX as usize)
    }
}

/// Encode `value` as a frame appended to `dst`, using the default limits.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────────┐
/// │ Length (4B BE)   │ Payload               │
/// │ payload bytes    │ (canonical value)     │
/// └──────────────────┴──────────────────────┘
/// ```
///
/// Returns the total number of bytes written (header + payload).
pub fn encode_frame(value: &Value, dst: &mut BytesMut) -> Result<usize> {
    encode_frame_with(value, dst, &FrameConfig::default())
}

/// Encode `value` as a frame appended to `dst`.
pub fn encode_frame_with(value: &Value, dst: &mut BytesMut, config: &FrameConfig) -> Result<usize> {
    let encoder = config.encoder();
    let payload_len = encoder.encoded_len(value)?;
    check_size(payload_len, config.payload_limit())?;

    dst.reserve(HEADER_SIZE + payload_len);
    dst.put_u32(payload_len as u32);
    encoder.encode(value, dst)?;
    Ok(HEADER_SIZE + payload_len)
}

/// Encode `value` as a frame into a fixed buffer.
///
/// Nothing is written unless the whole frame fits.
pub fn encode_frame_into(value: &Value, buf: &mut [u8], config: &FrameConfig) -> Result<usize> {
    let encoder = config.encoder();
    let payload_len = encoder.encoded_len(value)?;
    check_size(payload_len, config.payload_limit())?;

    let total = HEADER_SIZE + payload_len;
    if buf.len() < total {
        return Err(FrameError::BufferTooSmall {
            needed: total,
            available: buf.len(),
        });
    }
    buf[..HEADER_SIZE].copy_from_slice(&(payload_len as u32).to_be_bytes());
    encoder.encode(value, &mut SliceSink::new(&mut buf[HEADER_SIZE..total]))?;
    Ok(total)
}

/// Wrap already-encoded payload bytes in a frame appended to `dst`.
pub fn encode_raw_frame(payload: &[u8], dst: &mut BytesMut, max_payload: usize) -> Result<usize> {
    check_size(payload.len(), max_payload.min(u32::MAX as usize))?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32(payload.len() as u32);
    dst.put_slice(payload);
    Ok(HEADER_SIZE + payload.len())
}

/// Locate the first frame in `src` without consuming anything.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// An oversized length is rejected from the header alone, before any
/// payload bytes are awaited.
pub fn decode_frame(src: &[u8], max_payload: usize) -> Result<Option<RawFrame<'_>>> {
    let Some(payload_len) = peek_frame_length(src) else {
        return Ok(None); // Need more data
    };

    check_size(payload_len, max_payload)?;

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    Ok(Some(RawFrame {
        payload: &src[HEADER_SIZE..total],
        consumed: total,
    }))
}

/// Split the first complete frame's payload off the front of `src`.
///
/// Returns `Ok(None)` and leaves `src` untouched if the frame is incomplete.
pub fn split_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    let payload_len = match decode_frame(src, max_payload)? {
        Some(frame) => frame.payload.len(),
        None => return Ok(None),
    };

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Declared payload length of the first frame, if the header is present.
pub fn peek_frame_length(src: &[u8]) -> Option<usize> {
    let header: [u8; HEADER_SIZE] = src.get(..HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(header) as usize)
}

/// Number of complete, acceptable frames at the front of `src`.
///
/// Stops at the first incomplete or oversized frame.
pub fn frame_count(src: &[u8], max_payload: usize) -> usize {
    let mut count = 0;
    let mut rest = src;
    while let Ok(Some(frame)) = decode_frame(rest, max_payload) {
        count += 1;
        rest = &rest[frame.consumed..];
    }
    count
}

fn check_size(size: usize, max: usize) -> Result<()> {
    if size > max {
        return Err(FrameError::MessageTooLarge { size, max });
    }
    Ok(())
}
