//! `tokio_util` codec for use with `Framed`, `FramedRead` and `FramedWrite`.

use bytes::BytesMut;
use syrupkit_value::Value;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame_with, peek_frame_length, split_frame, FrameConfig, HEADER_SIZE};
use crate::error::FrameError;

/// Length-prefixed syrup codec yielding decoded [`Value`]s.
#[derive(Debug, Clone, Default)]
pub struct SyrupCodec {
    config: FrameConfig,
}

impl SyrupCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for SyrupCodec {
    type Item = Value;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Value>, FrameError> {
        match split_frame(src, self.config.max_payload_size)? {
            Some(payload) => Ok(Some(self.config.decoder().decode_bytes(&payload)?)),
            None => {
                if let Some(len) = peek_frame_length(src) {
                    src.reserve((HEADER_SIZE + len).saturating_sub(src.len()));
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<&Value> for SyrupCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Value, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame_with(item, dst, &self.config).map(|_| ())
    }
}

impl Encoder<Value> for SyrupCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame_with(&item, dst, &self.config).map(|_| ())
    }
}
