//! Length-prefixed framing for canonical syrup messages.
//!
//! Every message on a byte stream is framed with:
//! - A 4-byte big-endian payload length
//! - The payload: exactly one canonically encoded value
//!
//! Payloads above the configured maximum (4 MiB by default) are rejected from
//! the header alone. Incomplete input is never an error: decoders return
//! `Ok(None)` until the whole frame has arrived.

pub mod accumulator;
#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use accumulator::{Accumulator, DEFAULT_CAPACITY};
#[cfg(feature = "async")]
pub use async_codec::SyrupCodec;
pub use codec::{
    decode_frame, encode_frame, encode_frame_into, encode_frame_with, encode_raw_frame,
    frame_count, peek_frame_length, split_frame, FrameConfig, RawFrame, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
