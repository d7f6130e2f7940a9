//! Serde serializer that builds [`Value`] trees.
//!
//! Rust types map onto values as follows:
//!
//! ```text
//! (), None                  'nil
//! unit struct S             <'S>
//! struct S(x)               <'S x>
//! struct S(x, y)            <'S x y>
//! struct S { a, b }         <'S {'a .. 'b ..}>
//! E::V                      <'E 'V>
//! E::V(x), E::V(x, y)       <'E 'V x>, <'E 'V x y>
//! E::V { a }                <'E 'V {'a ..}>
//! seq, tuple                [..]
//! map                       {..}
//! ```
//!
//! Maps and struct fields end up in canonical key order, so the bytes do not
//! depend on field declaration or map iteration order.

use num_bigint::BigInt;
use serde::ser::{self, Serialize};

use crate::error::SerdeError;
use crate::value::Value;

type Result<T> = std::result::Result<T, SerdeError>;

/// Symbol standing in for `()` and `None`.
pub const NIL: &str = "nil";

/// Convert any `Serialize` type into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(Serializer)
}

/// Serialize straight to canonical bytes.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(crate::encode::to_vec(&to_value(value)?)?)
}

/// Serializer whose output is a [`Value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer;

impl ser::Serializer for Serializer {
    type Ok = Value;
    type Error = SerdeError;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeRecord;
    type SerializeTupleVariant = SerializeRecord;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStruct;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::integer(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::integer(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::integer(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::bigint(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::integer(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::integer(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::integer(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::bigint(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::bigint(BigInt::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::string(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        self.serialize_unit()
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::symbol(NIL))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Ok(Value::record(Value::symbol(name), []))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::record(Value::symbol(name), [Value::symbol(variant)]))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(Value::record(Value::symbol(name), [value.serialize(self)?]))
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(Value::record(
            Value::symbol(name),
            [Value::symbol(variant), value.serialize(self)?],
        ))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList> {
        Ok(SerializeList {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeList> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord {
            label: Value::symbol(name),
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeRecord> {
        let mut fields = Vec::with_capacity(len + 1);
        fields.push(Value::symbol(variant));
        Ok(SerializeRecord {
            label: Value::symbol(name),
            fields,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            label: Value::symbol(name),
            variant: None,
            entries: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            label: Value::symbol(name),
            variant: Some(Value::symbol(variant)),
            entries: Vec::with_capacity(len),
        })
    }
}

#[doc(hidden)]
pub struct SerializeList {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SerializeList {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::List(self.items))
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

#[doc(hidden)]
pub struct SerializeRecord {
    label: Value,
    fields: Vec<Value>,
}

impl ser::SerializeTupleStruct for SerializeRecord {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::record(self.label, self.fields))
    }
}

impl ser::SerializeTupleVariant for SerializeRecord {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeTupleStruct::serialize_field(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeTupleStruct::end(self)
    }
}

#[doc(hidden)]
pub struct SerializeMap {
    entries: Vec<(Value, Value)>,
    next_key: Option<Value>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(Serializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| SerdeError::Message("map value without a key".to_string()))?;
        self.entries.push((key, value.serialize(Serializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::dictionary(self.entries)?)
    }
}

#[doc(hidden)]
pub struct SerializeStruct {
    label: Value,
    variant: Option<Value>,
    entries: Vec<(Value, Value)>,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries
            .push((Value::symbol(key), value.serialize(Serializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let body = Value::dictionary(self.entries)?;
        let fields = match self.variant {
            Some(variant) => vec![variant, body],
            None => vec![body],
        };
        Ok(Value::record(self.label, fields))
    }
}

impl ser::SerializeStructVariant for SerializeStruct {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeStruct::end(self)
    }
}
