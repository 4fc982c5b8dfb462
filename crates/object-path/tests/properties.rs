use object_path::ObjectPath;
use proptest::prelude::*;
use serde_json::{json, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{1,6}", 1..4)
}

proptest! {
    #[test]
    fn set_then_get_returns_value(path in segments(), value in scalar()) {
        let mut doc = ObjectPath::new(json!({})).unwrap();
        let path = path.join(".");
        doc.set(&path, value.clone()).unwrap();
        prop_assert_eq!(doc.get(&path), Some(&value));
    }

    #[test]
    fn unset_keeps_sequences_contiguous(
        items in proptest::collection::vec(any::<i64>(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let idx = pick.index(items.len());
        let mut doc = ObjectPath::new(json!({"seq": items.clone()})).unwrap();
        let path = format!("seq.{idx}");
        prop_assert!(doc.unset(&path));

        let mut expected = items;
        expected.remove(idx);
        let expected: Vec<Value> = expected.into_iter().map(Value::from).collect();
        let seq = doc.get("seq").unwrap().as_array().unwrap();
        prop_assert_eq!(seq, &expected);
    }

    #[test]
    fn reset_restores_pre_mutation_text(path in segments(), value in scalar()) {
        let mut doc = ObjectPath::new(json!({"keep": {"x": [1, 2, 3]}})).unwrap();
        let original = doc.to_json().unwrap();

        // The write may fail (e.g. through a scalar it created earlier); the
        // snapshot must win either way.
        let _ = doc.set(&path.join("."), value);
        doc.unset("keep.x.0");

        doc.reset().unwrap();
        prop_assert_eq!(doc.to_json().unwrap(), original);
    }

    #[test]
    fn serialized_text_round_trips(
        entries in proptest::collection::vec((segments(), scalar()), 1..6),
    ) {
        let mut doc = ObjectPath::new(json!({})).unwrap();
        for (path, value) in &entries {
            let _ = doc.set(&path.join("."), value.clone());
        }
        let text = doc.to_json().unwrap();
        let reparsed = ObjectPath::from_json(&text).unwrap();
        prop_assert_eq!(reparsed.to_json().unwrap(), text);
    }

    #[test]
    fn warmed_cache_is_transparent(
        entries in proptest::collection::vec((segments(), scalar()), 1..6),
        reads in proptest::collection::vec(segments(), 1..8),
    ) {
        let mut builder = ObjectPath::new(json!({})).unwrap();
        for (path, value) in &entries {
            let _ = builder.set(&path.join("."), value.clone());
        }
        let tree = builder.into_value();
        let mut warmed = ObjectPath::new(tree.clone()).unwrap();
        let mut fresh = ObjectPath::new(tree).unwrap();

        for path in &reads {
            let path = path.join(".");
            let first = warmed.get(&path).cloned();
            // Second read of the same path hits the cache.
            let second = warmed.get(&path).cloned();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &fresh.get(&path).cloned());
        }
    }
}
