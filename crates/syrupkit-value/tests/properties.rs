//! Property tests for the canonical codec: round-trip, determinism, and
//! ordering laws over arbitrary value trees.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use proptest::prelude::*;
use syrupkit_value::{compare, decode, to_vec, BigInt, Dictionary, Set, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::Undefined),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        any::<i128>().prop_map(|i| Value::bigint(BigInt::from(i))),
        any::<f32>().prop_map(Value::Float32),
        any::<f64>().prop_map(Value::Float64),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::bytes),
        "[a-z\\u{e9}\\u{1F600}]{0,8}".prop_map(Value::string),
        "[a-z:?-]{0,8}".prop_map(Value::symbol),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            proptest::collection::vec((inner.clone(), inner.clone()), 0..6).prop_map(|pairs| {
                let unique: BTreeMap<Value, Value> = pairs.into_iter().collect();
                Value::dictionary(unique).expect("keys are unique")
            }),
            proptest::collection::vec(inner.clone(), 0..6).prop_map(|items| {
                let mut items = items;
                items.sort();
                items.dedup();
                Value::set(items).expect("elements are unique")
            }),
            (inner.clone(), proptest::collection::vec(inner.clone(), 0..4))
                .prop_map(|(label, fields)| Value::record(label, fields)),
            ("[a-z]{0,6}", inner.clone()).prop_map(|(tag, payload)| Value::tagged(tag, payload)),
            ("[a-z ]{0,10}", "[A-Z0-9]{0,4}", inner)
                .prop_map(|(message, id, data)| Value::error(message, id, data)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn round_trip(v in value()) {
        let bytes = to_vec(&v).unwrap();
        let back = decode(&bytes).unwrap();
        prop_assert_eq!(&back, &v);
        prop_assert_eq!(to_vec(&back).unwrap(), bytes);
    }

    #[test]
    fn encoding_is_deterministic(v in value()) {
        prop_assert_eq!(to_vec(&v).unwrap(), to_vec(&v.clone()).unwrap());
    }

    #[test]
    fn dictionary_bytes_ignore_insertion_order(
        pairs in proptest::collection::vec((leaf(), leaf()), 0..10)
    ) {
        let unique: BTreeMap<Value, Value> = pairs.into_iter().collect();
        let forward: Vec<_> = unique.clone().into_iter().collect();
        let mut backward = forward.clone();
        backward.reverse();

        let a = Dictionary::from_entries(forward).unwrap();
        let b = Dictionary::from_entries(backward).unwrap();
        prop_assert_eq!(
            to_vec(&Value::Dictionary(a.clone())).unwrap(),
            to_vec(&Value::Dictionary(b)).unwrap()
        );
        for pair in a.entries().windows(2) {
            prop_assert_eq!(compare(&pair[0].0, &pair[1].0), Ordering::Less);
        }
    }

    #[test]
    fn set_is_sorted_after_construction(items in proptest::collection::vec(leaf(), 0..10)) {
        let mut unique = items.clone();
        unique.sort();
        unique.dedup();
        unique.reverse();
        let set = Set::from_items(unique).unwrap();
        for pair in set.as_slice().windows(2) {
            prop_assert_eq!(compare(&pair[0], &pair[1]), Ordering::Less);
        }
    }

    #[test]
    fn comparator_is_antisymmetric(a in value(), b in value()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn equal_values_encode_identically(a in leaf(), b in leaf()) {
        let same_bytes = to_vec(&a).unwrap() == to_vec(&b).unwrap();
        prop_assert_eq!(same_bytes, a == b);
    }

    #[test]
    fn truncation_never_panics(v in value(), cut in any::<prop::sample::Index>()) {
        let bytes = to_vec(&v).unwrap();
        let end = cut.index(bytes.len() + 1);
        if end < bytes.len() {
            prop_assert!(decode(&bytes[..end]).is_err());
        }
    }
}
