//! Serde deserializer that reads Rust types out of [`Value`] trees.
//!
//! Accepts the shapes produced by [`crate::ser`], plus a few looser ones:
//! a struct may also come from a bare dictionary, a unit enum variant from a
//! bare symbol or string, and a record label is never checked against the
//! Rust type name.

use serde::de::value::{MapDeserializer, SeqDeserializer, StringDeserializer};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, Expected, IntoDeserializer, Unexpected,
    VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;

use crate::error::SerdeError;
use crate::ser::NIL;
use crate::value::Value;

type Result<T> = std::result::Result<T, SerdeError>;

/// Convert a [`Value`] into any `Deserialize` type.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(value)
}

/// Decode canonical bytes and convert the result.
pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    from_value(crate::decode::decode(input)?)
}

impl Value {
    fn is_nil(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => true,
            Value::Symbol(s) => s == NIL,
            _ => false,
        }
    }

    fn unexpected(&self) -> Unexpected<'_> {
        match self {
            Value::Null | Value::Undefined => Unexpected::Unit,
            Value::Bool(b) => Unexpected::Bool(*b),
            Value::Integer(i) => Unexpected::Signed(*i),
            Value::Float32(f) => Unexpected::Float(f64::from(*f)),
            Value::Float64(d) => Unexpected::Float(*d),
            Value::Bytes(b) => Unexpected::Bytes(b),
            Value::String(s) | Value::Symbol(s) => Unexpected::Str(s),
            Value::List(_) | Value::Set(_) => Unexpected::Seq,
            Value::Dictionary(_) => Unexpected::Map,
            other => Unexpected::Other(other.kind().as_str()),
        }
    }

    fn invalid_type(&self, expected: &dyn Expected) -> SerdeError {
        de::Error::invalid_type(self.unexpected(), expected)
    }
}

fn visit_seq<'de, V: Visitor<'de>>(items: Vec<Value>, visitor: V) -> Result<V::Value> {
    let mut seq = SeqDeserializer::<_, SerdeError>::new(items.into_iter());
    let value = visitor.visit_seq(&mut seq)?;
    seq.end()?;
    Ok(value)
}

fn visit_map<'de, V: Visitor<'de>>(entries: Vec<(Value, Value)>, visitor: V) -> Result<V::Value> {
    let mut map = MapDeserializer::<_, SerdeError>::new(entries.into_iter());
    let value = visitor.visit_map(&mut map)?;
    map.end()?;
    Ok(value)
}

impl<'de> de::Deserializer<'de> for Value {
    type Error = SerdeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self {
            Value::Null | Value::Undefined => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Integer(i) if i < 0 => visitor.visit_i64(i),
            Value::Integer(i) => visitor.visit_u64(i.unsigned_abs()),
            Value::BigInt(big) => {
                if let Ok(small) = i128::try_from(&big) {
                    visitor.visit_i128(small)
                } else if let Ok(wide) = u128::try_from(&big) {
                    visitor.visit_u128(wide)
                } else {
                    Err(de::Error::custom(format!("integer {big} out of range")))
                }
            }
            Value::Float32(f) => visitor.visit_f32(f),
            Value::Float64(d) => visitor.visit_f64(d),
            Value::Bytes(b) => visitor.visit_byte_buf(b.to_vec()),
            Value::String(s) => visitor.visit_string(s),
            Value::Symbol(s) if s == NIL => visitor.visit_unit(),
            Value::Symbol(s) => visitor.visit_string(s),
            Value::List(items) => visit_seq(items, visitor),
            Value::Set(set) => visit_seq(set.into_items(), visitor),
            Value::Dictionary(dict) => visit_map(dict.into_entries(), visitor),
            Value::Record { mut fields, .. } => match fields.len() {
                0 => visitor.visit_unit(),
                // A lone field is a newtype or a struct body.
                1 => match fields.pop() {
                    Some(field) => field.deserialize_any(visitor),
                    None => visitor.visit_unit(),
                },
                _ => visit_seq(fields, visitor),
            },
            other => Err(other.invalid_type(&visitor)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.is_nil() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        match self {
            Value::Record { mut fields, .. } if fields.len() == 1 => match fields.pop() {
                Some(field) => visitor.visit_newtype_struct(field),
                None => visitor.visit_unit(),
            },
            Value::Record { fields, .. } => visitor.visit_newtype_struct(Value::List(fields)),
            other => visitor.visit_newtype_struct(other),
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        match self {
            Value::Record { fields, .. } => visit_seq(fields, visitor),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self {
            Value::Dictionary(dict) => visit_map(dict.into_entries(), visitor),
            Value::Record { mut fields, .. } => match fields.pop() {
                Some(Value::Dictionary(dict)) if fields.is_empty() => {
                    visit_map(dict.into_entries(), visitor)
                }
                Some(field) => {
                    fields.push(field);
                    visit_seq(fields, visitor)
                }
                None => Err(de::Error::invalid_length(0, &visitor)),
            },
            other => Err(other.invalid_type(&visitor)),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let (variant, rest) = match self {
            Value::Symbol(s) | Value::String(s) => (s, Vec::new()),
            Value::Record { mut fields, .. } => {
                if fields.is_empty() {
                    return Err(de::Error::invalid_length(0, &"a variant symbol"));
                }
                match fields.remove(0) {
                    Value::Symbol(s) => (s, fields),
                    other => return Err(other.invalid_type(&"a variant symbol")),
                }
            }
            other => return Err(other.invalid_type(&"an enum record")),
        };
        visitor.visit_enum(EnumDeserializer { variant, rest })
    }

    /// Byte strings also read as sequences of `u8`, so `Vec<u8>` fields work
    /// without a bytes adapter.
    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self {
            Value::Bytes(b) => visit_seq(b.iter().map(|&x| Value::integer(x)).collect(), visitor),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self {
            Value::Bytes(b) => visitor.visit_byte_buf(b.to_vec()),
            Value::String(s) => visitor.visit_string(s),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        unit unit_struct tuple map identifier
    }
}

impl<'de> IntoDeserializer<'de, SerdeError> for Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

struct EnumDeserializer {
    variant: String,
    rest: Vec<Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = SerdeError;
    type Variant = VariantDeserializer;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self::Variant)> {
        let name: StringDeserializer<SerdeError> = self.variant.into_deserializer();
        let value = seed.deserialize(name)?;
        Ok((value, VariantDeserializer { rest: self.rest }))
    }
}

struct VariantDeserializer {
    rest: Vec<Value>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = SerdeError;

    fn unit_variant(self) -> Result<()> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(de::Error::invalid_length(self.rest.len(), &"a unit variant"))
        }
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(mut self, seed: S) -> Result<S::Value> {
        if self.rest.len() != 1 {
            return Err(de::Error::invalid_length(
                self.rest.len(),
                &"a newtype variant",
            ));
        }
        match self.rest.pop() {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::invalid_length(0, &"a newtype variant")),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        visit_seq(self.rest, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        mut self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        if self.rest.len() != 1 {
            return Err(de::Error::invalid_length(self.rest.len(), &visitor));
        }
        match self.rest.pop() {
            Some(Value::Dictionary(dict)) => visit_map(dict.into_entries(), visitor),
            Some(other) => Err(other.invalid_type(&visitor)),
            None => Err(de::Error::invalid_length(0, &visitor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::ser::{to_value, to_vec};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Test {
        int: u32,
        seq: Vec<String>,
    }

    fn sample() -> Test {
        Test {
            int: 42,
            seq: vec!["foo".to_string(), "bar".to_string()],
        }
    }

    #[test]
    fn simple_types() {
        assert!(from_slice::<bool>(b"t").unwrap());
        assert_eq!(from_slice::<i32>(b"42-").unwrap(), -42);
        assert_eq!(from_slice::<String>(b"3\"foo").unwrap(), "foo");
        assert_eq!(from_slice::<String>(b"3'foo").unwrap(), "foo");
        assert_eq!(from_slice::<Vec<u64>>(b"[1+2+3+]").unwrap(), vec![1, 2, 3]);
        assert_eq!(from_slice::<Vec<u64>>(b"#1+2+3+$").unwrap(), vec![1, 2, 3]);
        assert_eq!(
            from_slice::<Vec<Vec<u64>>>(b"[[1+2+3+][4+5+6+]]").unwrap(),
            vec![vec![1, 2, 3], vec![4, 5, 6]]
        );
    }

    #[derive(Debug, PartialEq)]
    struct Blob(Vec<u8>);

    impl<'de> Deserialize<'de> for Blob {
        fn deserialize<D: de::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
            struct BlobVisitor;

            impl Visitor<'_> for BlobVisitor {
                type Value = Blob;

                fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str("a byte string")
                }

                fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<Blob, E> {
                    Ok(Blob(v))
                }
            }

            d.deserialize_byte_buf(BlobVisitor)
        }
    }

    #[test]
    fn byte_strings() {
        assert_eq!(from_slice::<Blob>(b"3:foo").unwrap(), Blob(b"foo".to_vec()));
        assert_eq!(from_slice::<Vec<u8>>(b"3:foo").unwrap(), b"foo".to_vec());
    }

    #[test]
    fn struct_from_record_ignores_label() {
        let expected = sample();
        assert_eq!(
            from_slice::<Test>(br#"<4'Test{3'int42+3'seq[3"foo3"bar]}>"#).unwrap(),
            expected
        );
        assert_eq!(
            from_slice::<Test>(br#"<5'Other{3'int42+3'seq[3"foo3"bar]}>"#).unwrap(),
            expected
        );
    }

    #[test]
    fn struct_from_dictionary() {
        assert_eq!(
            from_slice::<Test>(br#"{3'int42+3'seq[3"foo3"bar]}"#).unwrap(),
            sample()
        );
    }

    #[test]
    fn newtype_struct_from_record() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Pair((String, i32));

        assert_eq!(
            from_slice::<Pair>(br#"<4'Pair3"foo42->"#).unwrap(),
            Pair(("foo".to_string(), -42))
        );
    }

    #[test]
    fn round_trips_through_bytes() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        enum Shape {
            Empty,
            Circle(f64),
            Rect(u32, u32),
            Named { name: String, sides: Option<u8> },
        }

        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Unit;

        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Meters(f32);

        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Scene {
            shapes: Vec<Shape>,
            index: BTreeMap<String, i64>,
            origin: (i8, i8),
            scale: Meters,
            marker: Unit,
            big: u128,
            note: Option<String>,
            done: (),
        }

        let scene = Scene {
            shapes: vec![
                Shape::Empty,
                Shape::Circle(1.5),
                Shape::Rect(3, 4),
                Shape::Named {
                    name: "tri".to_string(),
                    sides: Some(3),
                },
                Shape::Named {
                    name: "blob".to_string(),
                    sides: None,
                },
            ],
            index: [("a".to_string(), -1), ("bb".to_string(), i64::MAX)]
                .into_iter()
                .collect(),
            origin: (-3, 7),
            scale: Meters(0.25),
            marker: Unit,
            big: u128::MAX,
            note: None,
            done: (),
        };

        let bytes = to_vec(&scene).unwrap();
        assert_eq!(from_slice::<Scene>(&bytes).unwrap(), scene);
        assert_eq!(from_value::<Scene>(to_value(&scene).unwrap()).unwrap(), scene);
    }

    #[test]
    fn unit_variant_from_bare_symbol() {
        #[derive(Debug, PartialEq, Deserialize)]
        enum Mode {
            Fast,
            Slow,
        }

        assert_eq!(from_slice::<Mode>(b"4'Slow").unwrap(), Mode::Slow);
        assert_eq!(from_slice::<Mode>(b"<4'Mode4'Fast>").unwrap(), Mode::Fast);
        assert!(from_slice::<Mode>(b"<4'Mode4'Fast1+>").is_err());
    }

    #[test]
    fn type_mismatch_is_reported() {
        let err = from_value::<u8>(Value::string("x")).unwrap_err();
        assert!(matches!(err, SerdeError::Message(msg) if msg.contains("invalid type")));
        assert!(matches!(
            from_slice::<u8>(b"{1'b1+1'a2+}").unwrap_err(),
            SerdeError::Decode(_)
        ));
    }
}
