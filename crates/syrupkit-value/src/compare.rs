//! Canonical total ordering over values.
//!
//! Values are ordered first by type rank:
//!
//! ```text
//! null < undefined < bool < integer < float32 < float64 < bytes < string
//!      < symbol < list < dictionary < set < record < tagged < error
//! ```
//!
//! then by payload. Integers compare by mathematical value across the `i64`
//! and big-integer representations. Floats compare with IEEE `totalOrder`,
//! so `-0.0 < 0.0` and NaNs with different bits are distinct. Byte strings,
//! strings and symbols compare by length first, then byte-wise. Sequences
//! compare element-wise, and a strict prefix sorts first.

use std::cmp::Ordering;

use num_bigint::BigInt;

use crate::value::Value;

/// Fixed rank of each variant. Never reorder: canonical bytes depend on it.
pub fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Undefined => 1,
        Value::Bool(_) => 2,
        Value::Integer(_) | Value::BigInt(_) => 3,
        Value::Float32(_) => 4,
        Value::Float64(_) => 5,
        Value::Bytes(_) => 6,
        Value::String(_) => 7,
        Value::Symbol(_) => 8,
        Value::List(_) => 9,
        Value::Dictionary(_) => 10,
        Value::Set(_) => 11,
        Value::Record { .. } => 12,
        Value::Tagged { .. } => 13,
        Value::Error { .. } => 14,
    }
}

/// Compare two values under the canonical order.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let by_rank = rank(a).cmp(&rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }

    match (a, b) {
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Integer(x), Value::BigInt(y)) => BigInt::from(*x).cmp(y),
        (Value::BigInt(x), Value::Integer(y)) => x.cmp(&BigInt::from(*y)),
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        (Value::Float32(x), Value::Float32(y)) => x.total_cmp(y),
        (Value::Float64(x), Value::Float64(y)) => x.total_cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => compare_bytes(x, y),
        (Value::String(x), Value::String(y)) | (Value::Symbol(x), Value::Symbol(y)) => {
            compare_bytes(x.as_bytes(), y.as_bytes())
        }
        (Value::List(x), Value::List(y)) => compare_seq(x, y),
        (Value::Dictionary(x), Value::Dictionary(y)) => {
            compare_by(x.entries(), y.entries(), |(ka, va), (kb, vb)| {
                compare(ka, kb).then_with(|| compare(va, vb))
            })
        }
        (Value::Set(x), Value::Set(y)) => compare_seq(x.as_slice(), y.as_slice()),
        (
            Value::Record {
                label: la,
                fields: fa,
            },
            Value::Record {
                label: lb,
                fields: fb,
            },
        ) => compare(la, lb).then_with(|| compare_seq(fa, fb)),
        (
            Value::Tagged {
                tag: ta,
                payload: pa,
            },
            Value::Tagged {
                tag: tb,
                payload: pb,
            },
        ) => compare_bytes(ta.as_bytes(), tb.as_bytes()).then_with(|| compare(pa, pb)),
        (
            Value::Error {
                message: ma,
                identifier: ia,
                data: da,
            },
            Value::Error {
                message: mb,
                identifier: ib,
                data: db,
            },
        ) => compare_bytes(ma.as_bytes(), mb.as_bytes())
            .then_with(|| compare_bytes(ia.as_bytes(), ib.as_bytes()))
            .then_with(|| compare(da, db)),
        // Equal ranks always pair the same variant family.
        _ => Ordering::Equal,
    }
}

/// Length first, then lexicographic. `"b" < "aa"`.
pub fn compare_bytes(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_seq(a: &[Value], b: &[Value]) -> Ordering {
    compare_by(a, b, compare)
}

fn compare_by<T>(a: &[T], b: &[T], mut cmp: impl FnMut(&T, &T) -> Ordering) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
