use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::compare::compare;
use crate::error::ValueError;

/// A syrup value.
///
/// Values are immutable trees. Equality, ordering and hashing all follow the
/// canonical comparator in [`crate::compare`], so two values are equal exactly
/// when they encode to the same bytes.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Integer(i64),
    /// Arbitrary-precision integer. Values in `i64` range compare and encode
    /// exactly like the matching [`Value::Integer`].
    BigInt(BigInt),
    Float32(f32),
    Float64(f64),
    Bytes(Bytes),
    String(String),
    Symbol(String),
    List(Vec<Value>),
    Dictionary(Dictionary),
    Set(Set),
    Record {
        label: Box<Value>,
        fields: Vec<Value>,
    },
    Tagged {
        tag: String,
        payload: Box<Value>,
    },
    Error {
        message: String,
        identifier: String,
        data: Box<Value>,
    },
}

/// Variant name, for diagnostics and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Undefined,
    Bool,
    Integer,
    Float32,
    Float64,
    Bytes,
    String,
    Symbol,
    List,
    Dictionary,
    Set,
    Record,
    Tagged,
    Error,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Bool => "bool",
            Kind::Integer => "integer",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Bytes => "bytes",
            Kind::String => "string",
            Kind::Symbol => "symbol",
            Kind::List => "list",
            Kind::Dictionary => "dictionary",
            Kind::Set => "set",
            Kind::Record => "record",
            Kind::Tagged => "tagged",
            Kind::Error => "error",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn bool(b: bool) -> Value {
        Value::Bool(b)
    }

    pub fn integer(i: impl Into<i64>) -> Value {
        Value::Integer(i.into())
    }

    /// Create an integer of any size, narrowing to [`Value::Integer`] when it fits.
    pub fn bigint(i: impl Into<BigInt>) -> Value {
        let big = i.into();
        match big.to_i64() {
            Some(small) => Value::Integer(small),
            None => Value::BigInt(big),
        }
    }

    pub fn float32(f: f32) -> Value {
        Value::Float32(f)
    }

    pub fn float64(d: f64) -> Value {
        Value::Float64(d)
    }

    pub fn bytes(b: impl Into<Bytes>) -> Value {
        Value::Bytes(b.into())
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Value {
        Value::Symbol(s.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    /// Build a canonical dictionary from entries in any order.
    pub fn dictionary(
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<Value, ValueError> {
        Dictionary::from_entries(entries).map(Value::Dictionary)
    }

    /// Build a canonical set from elements in any order.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Result<Value, ValueError> {
        Set::from_items(items).map(Value::Set)
    }

    pub fn record(label: Value, fields: impl IntoIterator<Item = Value>) -> Value {
        Value::Record {
            label: Box::new(label),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn tagged(tag: impl Into<String>, payload: Value) -> Value {
        Value::Tagged {
            tag: tag.into(),
            payload: Box::new(payload),
        }
    }

    pub fn error(message: impl Into<String>, identifier: impl Into<String>, data: Value) -> Value {
        Value::Error {
            message: message.into(),
            identifier: identifier.into(),
            data: Box::new(data),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Undefined => Kind::Undefined,
            Value::Bool(_) => Kind::Bool,
            Value::Integer(_) | Value::BigInt(_) => Kind::Integer,
            Value::Float32(_) => Kind::Float32,
            Value::Float64(_) => Kind::Float64,
            Value::Bytes(_) => Kind::Bytes,
            Value::String(_) => Kind::String,
            Value::Symbol(_) => Kind::Symbol,
            Value::List(_) => Kind::List,
            Value::Dictionary(_) => Kind::Dictionary,
            Value::Set(_) => Kind::Set,
            Value::Record { .. } => Kind::Record,
            Value::Tagged { .. } => Kind::Tagged,
            Value::Error { .. } => Kind::Error,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value if it fits in `i64`, regardless of representation.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::BigInt(big) => big.to_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Label and fields if this is a record.
    pub fn as_record(&self) -> Option<(&Value, &[Value])> {
        match self {
            Value::Record { label, fields } => Some((label, fields)),
            _ => None,
        }
    }

    /// True if this is a record whose label is the symbol `name`.
    pub fn is_record_labeled(&self, name: &str) -> bool {
        matches!(self, Value::Record { label, .. } if label.as_symbol() == Some(name))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other).is_eq()
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().as_str().hash(state);
        match self {
            Value::Null | Value::Undefined => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            // Must agree with `Integer` for in-range values.
            Value::BigInt(big) => match big.to_i64() {
                Some(small) => small.hash(state),
                None => big.hash(state),
            },
            Value::Float32(f) => f.to_bits().hash(state),
            Value::Float64(d) => d.to_bits().hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::String(s) | Value::Symbol(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            Value::Dictionary(d) => d.entries.hash(state),
            Value::Set(s) => s.items.hash(state),
            Value::Record { label, fields } => {
                label.hash(state);
                fields.hash(state);
            }
            Value::Tagged { tag, payload } => {
                tag.hash(state);
                payload.hash(state);
            }
            Value::Error {
                message,
                identifier,
                data,
            } => {
                message.hash(state);
                identifier.hash(state);
                data.hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<BigInt> for Value {
    fn from(big: BigInt) -> Self {
        Value::bigint(big)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Float64(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Dictionary entries, kept sorted by key with no duplicate keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dictionary {
    entries: Vec<(Value, Value)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort entries into canonical order, rejecting duplicate keys.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<Self, ValueError> {
        let mut entries: Vec<(Value, Value)> = entries.into_iter().collect();
        entries.sort_by(|a, b| compare(&a.0, &b.0));
        if let Some(pair) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ValueError::DuplicateKey(pair[0].0.to_string()));
        }
        Ok(Self { entries })
    }

    /// Entries already verified to be strictly ascending by key.
    pub(crate) fn from_sorted(entries: Vec<(Value, Value)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }

    /// Insert a new entry at its canonical position.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), ValueError> {
        match self.search(&key) {
            Ok(_) => Err(ValueError::DuplicateKey(key.to_string())),
            Err(idx) => {
                self.entries.insert(idx, (key, value));
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.search(key).ok().map(|idx| &self.entries[idx].1)
    }

    /// Look up an entry keyed by the symbol `name`.
    pub fn get_symbol(&self, name: &str) -> Option<&Value> {
        self.get(&Value::symbol(name))
    }

    /// Look up an entry keyed by the string `name`.
    pub fn get_str(&self, name: &str) -> Option<&Value> {
        self.get(&Value::string(name))
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.search(key).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(Value, Value)> {
        self.entries
    }

    fn search(&self, key: &Value) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| compare(k, key))
    }
}

/// Set elements, kept sorted with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Set {
    items: Vec<Value>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort elements into canonical order, rejecting duplicates.
    pub fn from_items(items: impl IntoIterator<Item = Value>) -> Result<Self, ValueError> {
        let mut items: Vec<Value> = items.into_iter().collect();
        items.sort_by(compare);
        if let Some(pair) = items.windows(2).find(|w| w[0] == w[1]) {
            return Err(ValueError::DuplicateElement(pair[0].to_string()));
        }
        Ok(Self { items })
    }

    pub(crate) fn from_sorted(items: Vec<Value>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0] < w[1]));
        Self { items }
    }

    pub fn insert(&mut self, item: Value) -> Result<(), ValueError> {
        match self.items.binary_search_by(|candidate| compare(candidate, &item)) {
            Ok(_) => Err(ValueError::DuplicateElement(item.to_string())),
            Err(idx) => {
                self.items.insert(idx, item);
                Ok(())
            }
        }
    }

    pub fn contains(&self, item: &Value) -> bool {
        self.items
            .binary_search_by(|candidate| compare(candidate, item))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::BigInt(big) => write!(f, "{big}"),
            Value::Float32(v) => write!(f, "{v:?}f32"),
            Value::Float64(v) => write!(f, "{v:?}"),
            Value::Bytes(b) => {
                f.write_str("#x\"")?;
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("\"")
            }
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, "'{s}"),
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Value::Dictionary(d) => {
                f.write_str("{")?;
                for (i, (k, v)) in d.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Set(s) => {
                f.write_str("#{")?;
                write_joined(f, s.iter())?;
                f.write_str("}")
            }
            Value::Record { label, fields } => {
                write!(f, "<{label}")?;
                for field in fields {
                    write!(f, " {field}")?;
                }
                f.write_str(">")
            }
            Value::Tagged { tag, payload } => write!(f, "{tag}({payload})"),
            Value::Error {
                message,
                identifier,
                data,
            } => write!(f, "!error({identifier}: {message:?}, {data})"),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
