//! Canonical syrup values and their byte-exact codec.
//!
//! Every logical value has exactly one encoding. Dictionaries and sets are
//! kept in canonical order by construction, the encoder walks them in that
//! order, and the decoder refuses input that is not already canonical.
//!
//! # Wire tokens
//!
//! ```text
//! null            n
//! undefined       u
//! bool            t | f
//! integer         <decimal magnitude> '+' | '-'      42+  42-  0+
//! float32         'F' <4 bytes big-endian IEEE-754>
//! float64         'D' <8 bytes big-endian IEEE-754>
//! bytes           <len> ':' <raw bytes>               5:hello
//! string          <len> '"' <utf-8 bytes>             3"foo
//! symbol          <len> '\'' <utf-8 bytes>            3'foo
//! list            '[' value* ']'
//! dictionary      '{' (key value)* '}'
//! set             '#' value* '$'
//! record          '<' label field* '>'
//! tagged          '(' string payload ')'
//! error           '!' string string data ';'
//! ```
//!
//! Decimal numbers never carry leading zeros, and zero is always `0+`.
//!
//! # Serde
//!
//! With the `serde` feature, any `Serialize` type converts to a [`Value`] with
//! [`to_value`] and back with [`from_value`]; [`ser::to_vec`] and
//! [`from_slice`] go straight to and from canonical bytes. Structs become
//! records labeled with the type name, maps become canonical dictionaries and
//! `()` becomes the symbol `'nil`.

pub mod compare;
#[cfg(feature = "serde")]
pub mod de;
pub mod decode;
pub mod encode;
pub mod error;
#[cfg(feature = "serde")]
pub mod ser;
pub mod value;

pub use compare::{compare, compare_bytes};
pub use decode::{decode, decode_bytes, decode_prefix, Decoder};
pub use encode::{encode, encode_into, encoded_len, to_vec, Encoder, SliceSink, Sink};
pub use error::{DecodeError, EncodeError, ValueError};
pub use value::{Dictionary, Kind, Set, Value};

#[cfg(feature = "serde")]
pub use de::{from_slice, from_value};
#[cfg(feature = "serde")]
pub use error::SerdeError;
#[cfg(feature = "serde")]
pub use ser::{to_value, Serializer};

pub use num_bigint::BigInt;

/// Default maximum nesting depth for encoding and decoding.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Limits shared by [`Encoder`] and [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Deepest allowed nesting of compound values.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Single-byte type markers.
pub mod marker {
    pub const NULL: u8 = b'n';
    pub const UNDEFINED: u8 = b'u';
    pub const TRUE: u8 = b't';
    pub const FALSE: u8 = b'f';
    pub const FLOAT32: u8 = b'F';
    pub const FLOAT64: u8 = b'D';
    pub const POSITIVE: u8 = b'+';
    pub const NEGATIVE: u8 = b'-';
    pub const BYTES: u8 = b':';
    pub const STRING: u8 = b'"';
    pub const SYMBOL: u8 = b'\'';
    pub const LIST_OPEN: u8 = b'[';
    pub const LIST_CLOSE: u8 = b']';
    pub const DICT_OPEN: u8 = b'{';
    pub const DICT_CLOSE: u8 = b'}';
    pub const SET_OPEN: u8 = b'#';
    pub const SET_CLOSE: u8 = b'$';
    pub const RECORD_OPEN: u8 = b'<';
    pub const RECORD_CLOSE: u8 = b'>';
    pub const TAGGED_OPEN: u8 = b'(';
    pub const TAGGED_CLOSE: u8 = b')';
    pub const ERROR_OPEN: u8 = b'!';
    pub const ERROR_CLOSE: u8 = b';';
}
