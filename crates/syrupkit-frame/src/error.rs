use syrupkit_value::{DecodeError, EncodeError};

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the configured maximum size.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The fixed-capacity destination cannot hold header and payload.
    #[error("destination buffer too small ({needed} bytes needed, {available} available)")]
    BufferTooSmall { needed: usize, available: usize },

    /// The value could not be encoded.
    #[error("encode error: {0}")]
    Encode(EncodeError),

    /// A complete frame carried a payload that is not a canonical value.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl From<EncodeError> for FrameError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::BufferTooSmall { needed, available } => {
                FrameError::BufferTooSmall { needed, available }
            }
            other => FrameError::Encode(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
