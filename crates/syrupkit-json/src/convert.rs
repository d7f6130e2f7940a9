use num_traits::ToPrimitive;
use serde_json::{Map, Number, Value as Json};
use syrupkit_value::{BigInt, Dictionary, Set, Value};

use crate::error::{JsonError, Result};

const BIGINT: &str = "$bigint";
const BYTES: &str = "$bytes";
const SET: &str = "$set";
const DICT: &str = "$dict";
const LABEL: &str = "$label";
const FIELDS: &str = "$fields";
const TAG: &str = "$tag";
const TAG_VALUE: &str = "$value";
const ERROR: &str = "$error";

/// Convert a syrup value to JSON.
///
/// Variants without a JSON counterpart become single-purpose `$`-objects
/// (`{"$bytes": "<hex>"}`, `{"$set": [...]}` and so on). Undefined maps to
/// `null` and symbols to plain strings, so those two distinctions are lost.
pub fn to_json(value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Null | Value::Undefined => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => Json::from(*i),
        Value::BigInt(big) => match big.to_u64() {
            Some(n) => Json::from(n),
            None => sentinel(BIGINT, Json::String(big.to_string())),
        },
        Value::Float32(f) => float(f64::from(*f))?,
        Value::Float64(d) => float(*d)?,
        Value::Bytes(b) => sentinel(BYTES, Json::String(hex::encode(b))),
        Value::String(s) | Value::Symbol(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(array(items)?),
        Value::Dictionary(dict) => dictionary(dict)?,
        Value::Set(set) => sentinel(SET, Json::Array(array(set.as_slice())?)),
        Value::Record { label, fields } => {
            let mut map = Map::new();
            map.insert(LABEL.to_owned(), to_json(label)?);
            map.insert(FIELDS.to_owned(), Json::Array(array(fields)?));
            Json::Object(map)
        }
        Value::Tagged { tag, payload } => {
            let mut map = Map::new();
            map.insert(TAG.to_owned(), Json::String(tag.clone()));
            map.insert(TAG_VALUE.to_owned(), to_json(payload)?);
            Json::Object(map)
        }
        Value::Error {
            message,
            identifier,
            data,
        } => {
            let mut map = Map::new();
            map.insert("message".to_owned(), Json::String(message.clone()));
            map.insert("identifier".to_owned(), Json::String(identifier.clone()));
            map.insert("data".to_owned(), to_json(data)?);
            sentinel(ERROR, Json::Object(map))
        }
    })
}

/// Convert JSON to a syrup value, honouring the `$`-objects written by [`to_json`].
///
/// Integers that fit `i64` become [`Value::Integer`], larger ones a big
/// integer, and every other number a [`Value::Float64`]. Object keys become
/// strings; a string `$label` becomes a symbol.
pub fn from_json(json: &Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => number(n),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(values(items)?),
        Json::Object(map) => object(map)?,
    })
}

/// Parse JSON text and convert it.
pub fn from_json_str(text: &str) -> Result<Value> {
    let json: Json = serde_json::from_str(text)?;
    from_json(&json)
}

/// Convert to JSON text, optionally pretty-printed.
pub fn to_json_string(value: &Value, pretty: bool) -> Result<String> {
    let json = to_json(value)?;
    let text = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}

fn array(items: &[Value]) -> Result<Vec<Json>> {
    items.iter().map(to_json).collect()
}

fn values(items: &[Json]) -> Result<Vec<Value>> {
    items.iter().map(from_json).collect()
}

fn sentinel(name: &str, inner: Json) -> Json {
    let mut map = Map::new();
    map.insert(name.to_owned(), inner);
    Json::Object(map)
}

fn float(f: f64) -> Result<Json> {
    Number::from_f64(f)
        .map(Json::Number)
        .ok_or(JsonError::NonFiniteFloat(f))
}

/// Plain object when every key is a string that can't be mistaken for a
/// sentinel, `{"$dict": [[k, v], ...]}` otherwise.
fn dictionary(dict: &Dictionary) -> Result<Json> {
    let plain = dict
        .keys()
        .all(|key| matches!(key, Value::String(s) if !s.starts_with('$')));

    if plain {
        let mut map = Map::new();
        for (key, value) in dict.iter() {
            if let Value::String(name) = key {
                map.insert(name.clone(), to_json(value)?);
            }
        }
        return Ok(Json::Object(map));
    }

    let pairs = dict
        .iter()
        .map(|(k, v)| Ok(Json::Array(vec![to_json(k)?, to_json(v)?])))
        .collect::<Result<Vec<_>>>()?;
    Ok(sentinel(DICT, Json::Array(pairs)))
}

fn number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Integer(i)
    } else if let Some(u) = n.as_u64() {
        Value::bigint(u)
    } else {
        // serde_json only yields None here for arbitrary-precision numbers.
        Value::Float64(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn object(map: &Map<String, Json>) -> Result<Value> {
    if map.len() == 1 {
        if let Some((key, inner)) = map.iter().next() {
            match key.as_str() {
                BIGINT => return bigint(inner),
                BYTES => return bytes(inner),
                SET => return set(inner),
                DICT => return dict_pairs(inner),
                ERROR => return error(inner),
                _ => {}
            }
        }
    }

    if map.len() == 2 {
        if let (Some(label), Some(fields)) = (map.get(LABEL), map.get(FIELDS)) {
            return record(label, fields);
        }
        if let (Some(tag), Some(payload)) = (map.get(TAG), map.get(TAG_VALUE)) {
            let Json::String(tag) = tag else {
                return Err(JsonError::sentinel(TAG, "tag must be a string"));
            };
            return Ok(Value::tagged(tag.clone(), from_json(payload)?));
        }
    }

    let entries = map
        .iter()
        .map(|(k, v)| Ok((Value::String(k.clone()), from_json(v)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Dictionary(Dictionary::from_entries(entries)?))
}

fn bigint(inner: &Json) -> Result<Value> {
    let Json::String(digits) = inner else {
        return Err(JsonError::sentinel(BIGINT, "expected a decimal string"));
    };
    let big: BigInt = digits
        .parse()
        .map_err(|_| JsonError::sentinel(BIGINT, format!("not an integer: {digits:?}")))?;
    Ok(Value::bigint(big))
}

fn bytes(inner: &Json) -> Result<Value> {
    let Json::String(text) = inner else {
        return Err(JsonError::sentinel(BYTES, "expected a hex string"));
    };
    let raw = hex::decode(text).map_err(|err| JsonError::sentinel(BYTES, err.to_string()))?;
    Ok(Value::bytes(raw))
}

fn set(inner: &Json) -> Result<Value> {
    let Json::Array(items) = inner else {
        return Err(JsonError::sentinel(SET, "expected an array"));
    };
    Ok(Value::Set(Set::from_items(values(items)?)?))
}

fn dict_pairs(inner: &Json) -> Result<Value> {
    let Json::Array(pairs) = inner else {
        return Err(JsonError::sentinel(DICT, "expected an array of pairs"));
    };
    let entries = pairs
        .iter()
        .map(|pair| match pair {
            Json::Array(kv) if kv.len() == 2 => Ok((from_json(&kv[0])?, from_json(&kv[1])?)),
            _ => Err(JsonError::sentinel(DICT, "each entry must be a [key, value] pair")),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Dictionary(Dictionary::from_entries(entries)?))
}

fn record(label: &Json, fields: &Json) -> Result<Value> {
    let label = match label {
        Json::String(name) => Value::symbol(name.clone()),
        other => from_json(other)?,
    };
    let Json::Array(fields) = fields else {
        return Err(JsonError::sentinel(FIELDS, "expected an array"));
    };
    Ok(Value::record(label, values(fields)?))
}

fn error(inner: &Json) -> Result<Value> {
    let field = |name: &str| -> Result<String> {
        match inner.get(name) {
            Some(Json::String(s)) => Ok(s.clone()),
            _ => Err(JsonError::sentinel(ERROR, format!("missing string field {name:?}"))),
        }
    };
    let message = field("message")?;
    let identifier = field("identifier")?;
    let data = match inner.get("data") {
        Some(data) => from_json(data)?,
        None => Value::Null,
    };
    Ok(Value::error(message, identifier, data))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_json_round_trip() {
        let json = json!({
            "name": "alice",
            "age": 30,
            "tags": ["a", "b"],
            "active": true,
            "score": 1.5,
            "nothing": null,
        });
        let value = from_json(&json).unwrap();
        let dict = value.as_dictionary().unwrap();
        assert_eq!(dict.get_str("age"), Some(&Value::integer(30)));
        assert_eq!(dict.get_str("score"), Some(&Value::Float64(1.5)));
        assert_eq!(to_json(&value).unwrap(), json);
    }

    #[test]
    fn symbols_and_undefined_flatten() {
        let value = Value::list([Value::symbol("op:deliver"), Value::Undefined]);
        assert_eq!(to_json(&value).unwrap(), json!(["op:deliver", null]));
    }

    #[test]
    fn large_integers() {
        let huge = Value::bigint("123456789012345678901234567890".parse::<BigInt>().unwrap());
        let json = to_json(&huge).unwrap();
        assert_eq!(json, json!({"$bigint": "123456789012345678901234567890"}));
        assert_eq!(from_json(&json).unwrap(), huge);

        let above_i64 = Value::bigint(u64::MAX);
        assert_eq!(to_json(&above_i64).unwrap(), json!(u64::MAX));
        assert_eq!(from_json(&json!(u64::MAX)).unwrap(), above_i64);
    }

    #[test]
    fn bytes_as_hex() {
        let value = Value::bytes(vec![0x01, 0xff, 0x00]);
        let json = to_json(&value).unwrap();
        assert_eq!(json, json!({"$bytes": "01ff00"}));
        assert_eq!(from_json(&json).unwrap(), value);
    }

    #[test]
    fn sets_records_tagged_errors() {
        let value = Value::list([
            Value::set([Value::integer(2), Value::integer(1)]).unwrap(),
            Value::record(Value::symbol("point"), [Value::integer(1), Value::integer(2)]),
            Value::tagged("ok", Value::string("done")),
            Value::error("boom", "E1", Value::Null),
        ]);
        let json = to_json(&value).unwrap();
        assert_eq!(
            json,
            json!([
                {"$set": [1, 2]},
                {"$label": "point", "$fields": [1, 2]},
                {"$tag": "ok", "$value": "done"},
                {"$error": {"message": "boom", "identifier": "E1", "data": null}},
            ])
        );
        assert_eq!(from_json(&json).unwrap(), value);
    }

    #[test]
    fn non_string_keys_use_pairs() {
        let value = Value::dictionary([
            (Value::integer(1), Value::string("one")),
            (Value::string("two"), Value::integer(2)),
        ])
        .unwrap();
        let json = to_json(&value).unwrap();
        assert_eq!(json, json!({"$dict": [[1, "one"], ["two", 2]]}));
        assert_eq!(from_json(&json).unwrap(), value);
    }

    #[test]
    fn dollar_keys_are_not_mistaken_for_sentinels() {
        let value = Value::dictionary([(Value::string("$bytes"), Value::string("zz"))]).unwrap();
        let json = to_json(&value).unwrap();
        assert_eq!(json, json!({"$dict": [["$bytes", "zz"]]}));
        assert_eq!(from_json(&json).unwrap(), value);
    }

    #[test]
    fn non_finite_float_rejected() {
        assert!(matches!(
            to_json(&Value::Float64(f64::NAN)),
            Err(JsonError::NonFiniteFloat(_))
        ));
        assert!(matches!(
            to_json(&Value::Float32(f32::INFINITY)),
            Err(JsonError::NonFiniteFloat(_))
        ));
    }

    #[test]
    fn malformed_sentinels() {
        assert!(matches!(
            from_json(&json!({"$bytes": "xyz"})),
            Err(JsonError::InvalidSentinel { sentinel: "$bytes", .. })
        ));
        assert!(matches!(
            from_json(&json!({"$bigint": 12})),
            Err(JsonError::InvalidSentinel { sentinel: "$bigint", .. })
        ));
        assert!(matches!(
            from_json(&json!({"$set": [1, 1]})),
            Err(JsonError::Value(_))
        ));
        assert!(matches!(
            from_json(&json!({"$dict": [[1]]})),
            Err(JsonError::InvalidSentinel { sentinel: "$dict", .. })
        ));
    }

    #[test]
    fn string_helpers() {
        let value = from_json_str(r#"{"k": [1, -2]}"#).unwrap();
        assert_eq!(to_json_string(&value, false).unwrap(), r#"{"k":[1,-2]}"#);
        assert!(matches!(from_json_str("{"), Err(JsonError::Parse(_))));
    }
}
