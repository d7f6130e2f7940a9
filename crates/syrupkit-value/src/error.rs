/// Errors raised while building a dictionary or set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// Two dictionary entries share a key.
    #[error("duplicate dictionary key: {0}")]
    DuplicateKey(String),

    /// Two set elements are equal under canonical ordering.
    #[error("duplicate set element: {0}")]
    DuplicateElement(String),
}

/// Errors that can occur while encoding a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The fixed-capacity destination cannot hold the encoded value.
    #[error("destination buffer too small ({needed} bytes needed, {available} available)")]
    BufferTooSmall { needed: usize, available: usize },

    /// The value cannot be represented on the wire.
    #[error("unrepresentable value: {0}")]
    UnrepresentableValue(String),
}

/// Errors that can occur while decoding wire bytes.
///
/// Offsets are byte positions into the decoded input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Input ended in the middle of a value.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The byte at `offset` does not start any known value.
    #[error("unknown type marker 0x{byte:02x} at offset {offset}")]
    UnknownTag { byte: u8, offset: usize },

    /// A decimal length or magnitude is malformed or overflows.
    #[error("malformed length at offset {offset}")]
    MalformedLength { offset: usize },

    /// The input is well-formed but not in canonical form.
    #[error("non-canonical encoding at offset {offset}: {reason}")]
    NotCanonical { offset: usize, reason: &'static str },

    /// A string or symbol payload is not valid UTF-8.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A position that requires a specific token holds something else.
    #[error("expected {expected} at offset {offset}")]
    UnexpectedType {
        expected: &'static str,
        offset: usize,
    },

    /// A fixed-arity compound was not closed where expected.
    #[error("missing terminator '{expected}' at offset {offset}")]
    MissingTerminator { expected: char, offset: usize },

    /// Nesting exceeded the configured maximum depth.
    #[error("nesting depth exceeds maximum of {max}")]
    DepthLimitExceeded { max: usize },

    /// Bytes remain after a complete top-level value.
    #[error("trailing bytes after value at offset {offset}")]
    TrailingBytes { offset: usize },
}

impl DecodeError {
    /// True when more input could turn this failure into a success.
    pub fn is_eof(&self) -> bool {
        matches!(self, DecodeError::UnexpectedEof { .. })
    }
}

/// Errors raised while converting between Rust types and values.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerdeError {
    /// Raised by a `Serialize` or `Deserialize` implementation.
    #[error("{0}")]
    Message(String),

    /// A serialized map produced the same key twice.
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(feature = "serde")]
impl serde::ser::Error for SerdeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        SerdeError::Message(msg.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::de::Error for SerdeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        SerdeError::Message(msg.to_string())
    }
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
