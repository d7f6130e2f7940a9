use std::cmp::Ordering;
use std::str::FromStr;

use bytes::Bytes;
use num_bigint::BigInt;

use crate::compare::compare;
use crate::error::{DecodeError, Result};
use crate::value::{Dictionary, Set, Value};
use crate::{marker, CodecConfig};

/// Canonical decoder.
///
/// Decoding is a single forward pass over the input with no state shared
/// between calls. Dictionaries and sets must arrive in strictly ascending
/// canonical order; anything else is rejected as [`DecodeError::NotCanonical`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode exactly one value spanning all of `input`.
    pub fn decode(&self, input: &[u8]) -> Result<Value> {
        self.finish(Reader::new(input, None, self.config.max_depth))
    }

    /// Decode exactly one value, slicing byte-string payloads out of `input`
    /// instead of copying them. The decoded tree keeps `input` alive until the
    /// last such payload is dropped.
    pub fn decode_bytes(&self, input: &Bytes) -> Result<Value> {
        self.finish(Reader::new(input, Some(input), self.config.max_depth))
    }

    /// Decode the first value in `input`, returning it with the bytes consumed.
    pub fn decode_prefix(&self, input: &[u8]) -> Result<(Value, usize)> {
        let mut reader = Reader::new(input, None, self.config.max_depth);
        let value = reader.read_value()?;
        Ok((value, reader.pos))
    }

    fn finish(&self, mut reader: Reader<'_>) -> Result<Value> {
        let value = reader.read_value().inspect_err(|err| {
            tracing::debug!(error = %err, "rejected syrup input");
        })?;
        if reader.pos != reader.input.len() {
            return Err(DecodeError::TrailingBytes { offset: reader.pos });
        }
        Ok(value)
    }
}

/// Decode with the default configuration.
pub fn decode(input: &[u8]) -> Result<Value> {
    Decoder::new().decode(input)
}

pub fn decode_bytes(input: &Bytes) -> Result<Value> {
    Decoder::new().decode_bytes(input)
}

pub fn decode_prefix(input: &[u8]) -> Result<(Value, usize)> {
    Decoder::new().decode_prefix(input)
}

impl TryFrom<&[u8]> for Value {
    type Error = DecodeError;

    fn try_from(input: &[u8]) -> Result<Self> {
        decode(input)
    }
}

/// Parses wire text such as `[1+2"hi]`. Only useful when the encoding holds
/// no floats or non-UTF-8 byte strings.
impl FromStr for Value {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s.as_bytes())
    }
}

/// Largest digit count that always fits a `u64`.
const MAX_U64_DIGITS: usize = 19;

const DICTIONARY_REASONS: [&str; 2] = [
    "duplicate dictionary key",
    "dictionary keys out of canonical order",
];
const SET_REASONS: [&str; 2] = ["duplicate set element", "set elements out of canonical order"];

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    source: Option<&'a Bytes>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8], source: Option<&'a Bytes>, max_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            source,
            depth: 0,
            max_depth,
        }
    }

    fn peek(&self) -> Result<u8> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.input.len() - self.pos;
        if len > remaining {
            return Err(DecodeError::UnexpectedEof {
                offset: self.input.len(),
            });
        }
        let input = self.input;
        let slice = &input[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                max: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Consume `close` if it is next.
    fn eat(&mut self, close: u8) -> Result<bool> {
        if self.peek()? == close {
            self.pos += 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect(&mut self, close: u8) -> Result<()> {
        if self.eat(close)? {
            return Ok(());
        }
        Err(DecodeError::MissingTerminator {
            expected: close as char,
            offset: self.pos,
        })
    }

    fn read_value(&mut self) -> Result<Value> {
        let offset = self.pos;
        let byte = self.peek()?;
        match byte {
            b'0'..=b'9' => self.read_numeric(),
            marker::NULL => self.single(Value::Null),
            marker::UNDEFINED => self.single(Value::Undefined),
            marker::TRUE => self.single(Value::Bool(true)),
            marker::FALSE => self.single(Value::Bool(false)),
            marker::FLOAT32 => {
                self.pos += 1;
                let raw = self.take(4)?;
                Ok(Value::Float32(f32::from_be_bytes([
                    raw[0], raw[1], raw[2], raw[3],
                ])))
            }
            marker::FLOAT64 => {
                self.pos += 1;
                let raw = self.take(8)?;
                let mut be = [0u8; 8];
                be.copy_from_slice(raw);
                Ok(Value::Float64(f64::from_be_bytes(be)))
            }
            marker::LIST_OPEN => self.compound(|r| {
                let mut items = Vec::new();
                while !r.eat(marker::LIST_CLOSE)? {
                    items.push(r.read_value()?);
                }
                Ok(Value::List(items))
            }),
            marker::DICT_OPEN => self.compound(Reader::read_dictionary),
            marker::SET_OPEN => self.compound(Reader::read_set),
            marker::RECORD_OPEN => self.compound(|r| {
                if r.peek()? == marker::RECORD_CLOSE {
                    return Err(DecodeError::UnexpectedType {
                        expected: "record label",
                        offset: r.pos,
                    });
                }
                let label = r.read_value()?;
                let mut fields = Vec::new();
                while !r.eat(marker::RECORD_CLOSE)? {
                    fields.push(r.read_value()?);
                }
                Ok(Value::Record {
                    label: Box::new(label),
                    fields,
                })
            }),
            marker::TAGGED_OPEN => self.compound(|r| {
                let tag = r.read_string("string tag")?;
                let payload = r.read_value()?;
                r.expect(marker::TAGGED_CLOSE)?;
                Ok(Value::Tagged {
                    tag,
                    payload: Box::new(payload),
                })
            }),
            marker::ERROR_OPEN => self.compound(|r| {
                let message = r.read_string("string error message")?;
                let identifier = r.read_string("string error identifier")?;
                let data = r.read_value()?;
                r.expect(marker::ERROR_CLOSE)?;
                Ok(Value::Error {
                    message,
                    identifier,
                    data: Box::new(data),
                })
            }),
            _ => Err(DecodeError::UnknownTag { byte, offset }),
        }
    }

    fn single(&mut self, value: Value) -> Result<Value> {
        self.pos += 1;
        Ok(value)
    }

    /// Skip the opening sigil and decode one level deeper.
    fn compound(&mut self, body: impl FnOnce(&mut Self) -> Result<Value>) -> Result<Value> {
        self.pos += 1;
        self.enter()?;
        let value = body(self)?;
        self.leave();
        Ok(value)
    }

    fn read_dictionary(&mut self) -> Result<Value> {
        let mut entries: Vec<(Value, Value)> = Vec::new();
        while !self.eat(marker::DICT_CLOSE)? {
            let offset = self.pos;
            let key = self.read_value()?;
            if let Some((prev, _)) = entries.last() {
                check_ascending(prev, &key, offset, DICTIONARY_REASONS)?;
            }
            let val = self.read_value()?;
            entries.push((key, val));
        }
        Ok(Value::Dictionary(Dictionary::from_sorted(entries)))
    }

    fn read_set(&mut self) -> Result<Value> {
        let mut items: Vec<Value> = Vec::new();
        while !self.eat(marker::SET_CLOSE)? {
            let offset = self.pos;
            let item = self.read_value()?;
            if let Some(prev) = items.last() {
                check_ascending(prev, &item, offset, SET_REASONS)?;
            }
            items.push(item);
        }
        Ok(Value::Set(Set::from_sorted(items)))
    }

    fn read_string(&mut self, expected: &'static str) -> Result<String> {
        let offset = self.pos;
        match self.read_value()? {
            Value::String(s) => Ok(s),
            _ => Err(DecodeError::UnexpectedType { expected, offset }),
        }
    }

    /// Integers (`42+`) and length-prefixed atoms (`5:hello`).
    fn read_numeric(&mut self) -> Result<Value> {
        let start = self.pos;
        let digits_len = self.input[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let digits = self.take(digits_len)?;
        let suffix_offset = self.pos;
        let suffix = self.peek()?;
        self.pos += 1;

        match suffix {
            marker::POSITIVE | marker::NEGATIVE => {
                if digits.len() > 1 && digits[0] == b'0' {
                    return Err(DecodeError::NotCanonical {
                        offset: start,
                        reason: "integer has leading zeros",
                    });
                }
                let negative = suffix == marker::NEGATIVE;
                if negative && digits == b"0" {
                    return Err(DecodeError::NotCanonical {
                        offset: start,
                        reason: "negative zero",
                    });
                }
                integer_from_digits(digits, negative, start)
            }
            marker::BYTES | marker::STRING | marker::SYMBOL => {
                let len = parse_length(digits, start)?;
                let payload_offset = self.pos;
                let payload = self.take(len)?;
                match suffix {
                    marker::BYTES => Ok(Value::Bytes(self.bytes_payload(payload_offset, payload))),
                    marker::STRING => Ok(Value::String(utf8(payload, payload_offset)?)),
                    _ => Ok(Value::Symbol(utf8(payload, payload_offset)?)),
                }
            }
            _ => Err(DecodeError::MalformedLength {
                offset: suffix_offset,
            }),
        }
    }

    fn bytes_payload(&self, offset: usize, payload: &[u8]) -> Bytes {
        match self.source {
            Some(source) => source.slice(offset..offset + payload.len()),
            None => Bytes::copy_from_slice(payload),
        }
    }
}

fn check_ascending(prev: &Value, next: &Value, offset: usize, reasons: [&'static str; 2]) -> Result<()> {
    let [duplicate, unordered] = reasons;
    match compare(prev, next) {
        Ordering::Less => Ok(()),
        Ordering::Equal => Err(DecodeError::NotCanonical {
            offset,
            reason: duplicate,
        }),
        Ordering::Greater => Err(DecodeError::NotCanonical {
            offset,
            reason: unordered,
        }),
    }
}

fn parse_length(digits: &[u8], offset: usize) -> Result<usize> {
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(DecodeError::NotCanonical {
            offset,
            reason: "length has leading zeros",
        });
    }
    digits.iter().try_fold(0usize, |acc, d| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(usize::from(d - b'0')))
            .ok_or(DecodeError::MalformedLength { offset })
    })
}

fn integer_from_digits(digits: &[u8], negative: bool, offset: usize) -> Result<Value> {
    if digits.len() <= MAX_U64_DIGITS {
        let magnitude = digits
            .iter()
            .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0'));
        if !negative && magnitude <= i64::MAX as u64 {
            return Ok(Value::Integer(magnitude as i64));
        }
        if negative && magnitude <= i64::MIN.unsigned_abs() {
            return Ok(Value::Integer((magnitude as i64).wrapping_neg()));
        }
        let big = BigInt::from(magnitude);
        return Ok(Value::BigInt(if negative { -big } else { big }));
    }

    let big = BigInt::parse_bytes(digits, 10).ok_or(DecodeError::MalformedLength { offset })?;
    Ok(Value::BigInt(if negative { -big } else { big }))
}

fn utf8(payload: &[u8], offset: usize) -> Result<String> {
    std::str::from_utf8(payload)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8 { offset })
}
