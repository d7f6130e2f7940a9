use bytes::{BufMut, BytesMut};
use num_bigint::{BigInt, Sign};

use crate::error::EncodeError;
use crate::value::Value;
use crate::{marker, CodecConfig};

type Result<T> = std::result::Result<T, EncodeError>;

/// Destination for encoded bytes.
pub trait Sink {
    /// Append all of `bytes` or fail without a partial write.
    fn put(&mut self, bytes: &[u8]) -> Result<()>;
}

impl Sink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl Sink for BytesMut {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.put_slice(bytes);
        Ok(())
    }
}

/// Fixed-capacity sink over a borrowed slice.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl Sink for SliceSink<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.remaining() {
            return Err(EncodeError::BufferTooSmall {
                needed: self.pos + bytes.len(),
                available: self.buf.len(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}

/// Canonical encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode `value` into `sink`, returning the number of bytes written.
    ///
    /// On error `sink` may hold a partial encoding; use
    /// [`encode_into`](Self::encode_into) when nothing may be written.
    pub fn encode<S: Sink + ?Sized>(&self, value: &Value, sink: &mut S) -> Result<usize> {
        write_value(value, sink, self.depth())
    }

    /// Encode into a fixed buffer. Fails before writing anything if it is too small.
    pub fn encode_into(&self, value: &Value, buf: &mut [u8]) -> Result<usize> {
        let needed = self.encoded_len(value)?;
        if needed > buf.len() {
            return Err(EncodeError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        write_value(value, &mut SliceSink::new(buf), self.depth())
    }

    pub fn to_vec(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len(value)?);
        write_value(value, &mut out, self.depth())?;
        Ok(out)
    }

    /// Exact encoded size of `value`.
    ///
    /// Fails with [`EncodeError::UnrepresentableValue`] when `value` nests
    /// deeper than the configured limit, so a successful result means
    /// [`encode`](Self::encode) will not fail on depth.
    pub fn encoded_len(&self, value: &Value) -> Result<usize> {
        measure(value, self.depth())
    }

    fn depth(&self) -> Depth {
        Depth {
            current: 0,
            max: self.config.max_depth,
        }
    }
}

/// Nesting level of the compound being walked.
///
/// Recursion stops one level past `max`, however deep the value is.
#[derive(Debug, Clone, Copy)]
struct Depth {
    current: usize,
    max: usize,
}

impl Depth {
    fn descend(self) -> Result<Depth> {
        if self.current >= self.max {
            return Err(EncodeError::UnrepresentableValue(format!(
                "nesting depth exceeds maximum of {}",
                self.max
            )));
        }
        Ok(Depth {
            current: self.current + 1,
            max: self.max,
        })
    }
}

/// Encode with the default configuration.
pub fn encode<S: Sink + ?Sized>(value: &Value, sink: &mut S) -> Result<usize> {
    Encoder::new().encode(value, sink)
}

pub fn encode_into(value: &Value, buf: &mut [u8]) -> Result<usize> {
    Encoder::new().encode_into(value, buf)
}

pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    Encoder::new().to_vec(value)
}

pub fn encoded_len(value: &Value) -> Result<usize> {
    Encoder::new().encoded_len(value)
}

fn write_value<S: Sink + ?Sized>(value: &Value, sink: &mut S, depth: Depth) -> Result<usize> {
    match value {
        Value::Null => put(sink, &[marker::NULL]),
        Value::Undefined => put(sink, &[marker::UNDEFINED]),
        Value::Bool(true) => put(sink, &[marker::TRUE]),
        Value::Bool(false) => put(sink, &[marker::FALSE]),
        Value::Integer(i) => {
            let sign = if *i < 0 {
                marker::NEGATIVE
            } else {
                marker::POSITIVE
            };
            let n = write_decimal(sink, i.unsigned_abs())?;
            Ok(n + put(sink, &[sign])?)
        }
        Value::BigInt(big) => {
            let (sign, digits) = big_digits(big);
            let n = put(sink, digits.as_bytes())?;
            Ok(n + put(sink, &[sign])?)
        }
        Value::Float32(f) => {
            let n = put(sink, &[marker::FLOAT32])?;
            Ok(n + put(sink, &f.to_be_bytes())?)
        }
        Value::Float64(d) => {
            let n = put(sink, &[marker::FLOAT64])?;
            Ok(n + put(sink, &d.to_be_bytes())?)
        }
        Value::Bytes(b) => write_atom(sink, marker::BYTES, b),
        Value::String(s) => write_atom(sink, marker::STRING, s.as_bytes()),
        Value::Symbol(s) => write_atom(sink, marker::SYMBOL, s.as_bytes()),
        Value::List(items) => {
            let depth = depth.descend()?;
            let mut n = put(sink, &[marker::LIST_OPEN])?;
            for item in items {
                n += write_value(item, sink, depth)?;
            }
            Ok(n + put(sink, &[marker::LIST_CLOSE])?)
        }
        Value::Dictionary(dict) => {
            let depth = depth.descend()?;
            let mut n = put(sink, &[marker::DICT_OPEN])?;
            for (key, val) in dict.iter() {
                n += write_value(key, sink, depth)?;
                n += write_value(val, sink, depth)?;
            }
            Ok(n + put(sink, &[marker::DICT_CLOSE])?)
        }
        Value::Set(set) => {
            let depth = depth.descend()?;
            let mut n = put(sink, &[marker::SET_OPEN])?;
            for item in set.iter() {
                n += write_value(item, sink, depth)?;
            }
            Ok(n + put(sink, &[marker::SET_CLOSE])?)
        }
        Value::Record { label, fields } => {
            let depth = depth.descend()?;
            let mut n = put(sink, &[marker::RECORD_OPEN])?;
            n += write_value(label, sink, depth)?;
            for field in fields {
                n += write_value(field, sink, depth)?;
            }
            Ok(n + put(sink, &[marker::RECORD_CLOSE])?)
        }
        Value::Tagged { tag, payload } => {
            let depth = depth.descend()?;
            let mut n = put(sink, &[marker::TAGGED_OPEN])?;
            n += write_atom(sink, marker::STRING, tag.as_bytes())?;
            n += write_value(payload, sink, depth)?;
            Ok(n + put(sink, &[marker::TAGGED_CLOSE])?)
        }
        Value::Error {
            message,
            identifier,
            data,
        } => {
            let depth = depth.descend()?;
            let mut n = put(sink, &[marker::ERROR_OPEN])?;
            n += write_atom(sink, marker::STRING, message.as_bytes())?;
            n += write_atom(sink, marker::STRING, identifier.as_bytes())?;
            n += write_value(data, sink, depth)?;
            Ok(n + put(sink, &[marker::ERROR_CLOSE])?)
        }
    }
}

fn put<S: Sink + ?Sized>(sink: &mut S, bytes: &[u8]) -> Result<usize> {
    sink.put(bytes)?;
    Ok(bytes.len())
}

fn write_atom<S: Sink + ?Sized>(sink: &mut S, sigil: u8, payload: &[u8]) -> Result<usize> {
    let n = write_decimal(sink, payload.len() as u64)?;
    let n = n + put(sink, &[sigil])?;
    Ok(n + put(sink, payload)?)
}

fn write_decimal<S: Sink + ?Sized>(sink: &mut S, mut n: u64) -> Result<usize> {
    let mut digits = [0u8; 20];
    let mut start = digits.len();
    loop {
        start -= 1;
        digits[start] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    put(sink, &digits[start..])
}

fn big_digits(big: &BigInt) -> (u8, String) {
    let sign = if big.sign() == Sign::Minus {
        marker::NEGATIVE
    } else {
        marker::POSITIVE
    };
    (sign, big.magnitude().to_str_radix(10))
}

fn decimal_len(mut n: u64) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

fn atom_len(payload_len: usize) -> usize {
    decimal_len(payload_len as u64) + 1 + payload_len
}

fn measure(value: &Value, depth: Depth) -> Result<usize> {
    let len = match value {
        Value::Null | Value::Undefined | Value::Bool(_) => 1,
        Value::Integer(i) => decimal_len(i.unsigned_abs()) + 1,
        Value::BigInt(big) => big_digits(big).1.len() + 1,
        Value::Float32(_) => 5,
        Value::Float64(_) => 9,
        Value::Bytes(b) => atom_len(b.len()),
        Value::String(s) | Value::Symbol(s) => atom_len(s.len()),
        Value::List(items) => 2 + measure_all(items.iter(), depth.descend()?)?,
        Value::Dictionary(dict) => {
            2 + measure_all(dict.iter().flat_map(|(k, v)| [k, v]), depth.descend()?)?
        }
        Value::Set(set) => 2 + measure_all(set.iter(), depth.descend()?)?,
        Value::Record { label, fields } => {
            let items = std::iter::once(label.as_ref()).chain(fields.iter());
            2 + measure_all(items, depth.descend()?)?
        }
        Value::Tagged { tag, payload } => {
            2 + atom_len(tag.len()) + measure(payload, depth.descend()?)?
        }
        Value::Error {
            message,
            identifier,
            data,
        } => {
            2 + atom_len(message.len())
                + atom_len(identifier.len())
                + measure(data, depth.descend()?)?
        }
    };
    Ok(len)
}

fn measure_all<'a>(items: impl Iterator<Item = &'a Value>, depth: Depth) -> Result<usize> {
    let mut total = 0;
    for item in items {
        total += measure(item, depth)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    fn encoded(value: &Value) -> Vec<u8> {
        to_vec(value).unwrap()
    }

    #[test]
    fn scalar_tokens() {
        assert_eq!(encoded(&Value::Null), b"n");
        assert_eq!(encoded(&Value::Undefined), b"u");
        assert_eq!(encoded(&Value::bool(true)), b"t");
        assert_eq!(encoded(&Value::bool(false)), b"f");
        assert_eq!(encoded(&Value::integer(0)), b"0+");
        assert_eq!(encoded(&Value::integer(42)), b"42+");
        assert_eq!(encoded(&Value::integer(-42)), b"42-");
        assert_eq!(encoded(&Value::integer(i64::MIN)), b"9223372036854775808-");
        assert_eq!(encoded(&Value::float32(0.1)), b"F\x3d\xcc\xcc\xcd");
        assert_eq!(
            encoded(&Value::float64(0.1)),
            b"D\x3f\xb9\x99\x99\x99\x99\x99\x9a"
        );
        assert_eq!(encoded(&Value::bytes(&b"hello"[..])), b"5:hello");
        assert_eq!(encoded(&Value::string("foo")), b"3\"foo");
        assert_eq!(encoded(&Value::symbol("none")), b"4'none");
    }

    #[test]
    fn bigint_token() {
        let big = BigInt::from(u64::MAX) * 10u32;
        assert_eq!(
            encoded(&Value::BigInt(big.clone())),
            b"184467440737095516150+"
        );
        assert_eq!(encoded(&Value::BigInt(-big)), b"184467440737095516150-");
    }

    #[test]
    fn small_bigint_encodes_like_integer() {
        assert_eq!(encoded(&Value::BigInt(BigInt::from(-7))), b"7-");
    }

    #[test]
    fn compound_tokens() {
        let list = Value::list([Value::integer(1), Value::integer(2), Value::integer(3)]);
        assert_eq!(encoded(&list), b"[1+2+3+]");

        let dict = Value::dictionary([
            (Value::string("goo"), Value::string("muck")),
            (Value::string("foo"), Value::string("bar")),
        ])
        .unwrap();
        assert_eq!(encoded(&dict), b"{3\"foo3\"bar3\"goo4\"muck}");

        let record = Value::record(
            Value::symbol("person"),
            [Value::string("Alice"), Value::integer(30), Value::bool(true)],
        );
        assert_eq!(encoded(&record), b"<6'person5\"Alice30+t>");

        let set = Value::set([Value::string("foo"), Value::string("bar")]).unwrap();
        assert_eq!(encoded(&set), b"#3\"bar3\"foo$");

        let tagged = Value::tagged("ok", Value::integer(1));
        assert_eq!(encoded(&tagged), b"(2\"ok1+)");

        let error = Value::error("boom", "E1", Value::Null);
        assert_eq!(encoded(&error), b"!4\"boom2\"E1n;");
    }

    #[test]
    fn insertion_order_does_not_change_bytes() {
        let a = Value::dictionary([
            (Value::symbol("b"), Value::integer(1)),
            (Value::symbol("aa"), Value::integer(2)),
            (Value::integer(3), Value::Null),
        ])
        .unwrap();
        let b = Value::dictionary([
            (Value::integer(3), Value::Null),
            (Value::symbol("aa"), Value::integer(2)),
            (Value::symbol("b"), Value::integer(1)),
        ])
        .unwrap();
        assert_eq!(encoded(&a), encoded(&b));
        assert_eq!(encoded(&a), b"{3+n1'b1+2'aa2+}");
    }

    #[test]
    fn encoded_len_matches_output() {
        let value = Value::record(
            Value::symbol("zoo"),
            [
                Value::list([Value::float64(8.2), Value::bytes(vec![0u8; 300])]),
                Value::BigInt(BigInt::from(i64::MIN) * 3),
                Value::tagged("t", Value::error("m", "i", Value::Undefined)),
            ],
        );
        assert_eq!(encoded_len(&value).unwrap(), encoded(&value).len());
    }

    #[test]
    fn encode_into_fixed_buffer() {
        let value = Value::string("hello syrup");
        let mut buf = [0u8; 32];
        let n = encode_into(&value, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"11\"hello syrup");
    }

    #[test]
    fn encode_into_too_small_writes_nothing() {
        let value = Value::string("hello syrup");
        let mut buf = [0xAAu8; 8];
        let err = encode_into(&value, &mut buf).unwrap_err();
        assert_eq!(
            err,
            EncodeError::BufferTooSmall {
                needed: 14,
                available: 8
            }
        );
        assert!(buf.iter().all(|b| *b == 0xAA));
    }

    #[test]
    fn slice_sink_rejects_overflow() {
        let mut buf = [0u8; 3];
        let mut sink = SliceSink::new(&mut buf);
        let err = encode(&Value::string("abc"), &mut sink).unwrap_err();
        assert!(matches!(err, EncodeError::BufferTooSmall { .. }));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut value = Value::Null;
        for _ in 0..4 {
            value = Value::list([value]);
        }
        let encoder = Encoder::with_config(CodecConfig { max_depth: 3 });
        let err = encoder.to_vec(&value).unwrap_err();
        assert!(matches!(err, EncodeError::UnrepresentableValue(_)));

        let encoder = Encoder::with_config(CodecConfig { max_depth: 4 });
        assert_eq!(encoder.to_vec(&value).unwrap(), b"[[[[n]]]]");
    }

    #[test]
    fn deep_nesting_fails_without_exhausting_stack() {
        let mut value = Value::Null;
        for _ in 0..200_000 {
            value = Value::List(vec![value]);
        }

        let err = to_vec(&value).unwrap_err();
        assert!(matches!(err, EncodeError::UnrepresentableValue(_)));
        assert!(matches!(
            encoded_len(&value).unwrap_err(),
            EncodeError::UnrepresentableValue(_)
        ));
        let mut out = Vec::new();
        assert!(encode(&value, &mut out).is_err());

        // Dropping the tree recursively would overflow; unwind it by hand.
        while let Value::List(mut items) = value {
            value = items.pop().unwrap_or(Value::Null);
        }
    }

    #[test]
    fn encode_into_bytes_mut() {
        let mut buf = BytesMut::new();
        let n = encode(&Value::symbol("x"), &mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf[..], b"1'x");
    }
}
