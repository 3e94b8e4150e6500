use proptest::prelude::*;
use serde_json::{Map, Value, json};

use grpclog_rs::redact::walk;
use grpclog_rs::{BoxError, LogFields};

fn mask_password(key: &str, value: Value) -> Result<Value, BoxError> {
    if key == "password" {
        return Ok(json!("***"));
    }
    Ok(value)
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![Just("password".to_string()), "[a-z]{1,6}"],
                inner,
                0..5
            )
            .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn no_unmasked_password(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.iter().all(|(key, value)| {
            (key != "password" || value == &json!("***")) && no_unmasked_password(value)
        }),
        Value::Array(items) => items.iter().all(no_unmasked_password),
        _ => true,
    }
}

proptest! {
    #[test]
    fn every_password_is_masked(entries in prop::collection::btree_map(
        prop_oneof![Just("password".to_string()), "[a-z]{1,6}"],
        arb_value(),
        0..6,
    )) {
        let mut fields: LogFields = entries.into_iter().collect();

        walk(&mut fields, &mask_password).expect("redaction");

        prop_assert!(no_unmasked_password(&Value::Object(fields)));
    }
}
