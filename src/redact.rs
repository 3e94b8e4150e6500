//! Recursive redaction of projected request maps.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{BoxError, Error, Result};
use crate::logger::LogFields;

/// Receives a key and its value from the request and returns the value to log.
///
/// Typical use is hiding secrets:
///
/// ```
/// use grpclog_rs::{BoxError, ValueRedactor};
/// use serde_json::Value;
///
/// let redactor: ValueRedactor = std::sync::Arc::new(|key: &str, value: Value| -> Result<Value, BoxError> {
///     if key == "password" {
///         return Ok(Value::String("<sensitive>".into()));
///     }
///     Ok(value)
/// });
/// ```
///
/// Nested objects are visited before the redactor sees the object itself, so a
/// redactor only interested in scalars should hand objects back unchanged.
pub type ValueRedactor = Arc<dyn Fn(&str, Value) -> Result<Value, BoxError> + Send + Sync>;

/// Apply `redactor` to every entry of `map`, nested objects first.
///
/// Objects found inside arrays are walked as well; array elements themselves
/// have no key and are not passed to the redactor.
pub fn walk(
    map: &mut LogFields,
    redactor: &(dyn Fn(&str, Value) -> Result<Value, BoxError> + Send + Sync),
) -> Result<()> {
    for (key, value) in map.iter_mut() {
        descend(value, redactor)?;

        let current = std::mem::take(value);
        *value = redactor(key, current).map_err(|source| Error::RedactionFailed {
            key: key.clone(),
            source,
        })?;
    }

    Ok(())
}

fn descend(
    value: &mut Value,
    redactor: &(dyn Fn(&str, Value) -> Result<Value, BoxError> + Send + Sync),
) -> Result<()> {
    match value {
        Value::Object(inner) => walk(inner, redactor),
        Value::Array(items) => items.iter_mut().try_for_each(|item| descend(item, redactor)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mask_password(key: &str, value: Value) -> Result<Value, BoxError> {
        if key == "password" {
            return Ok(json!("<sensitive>"));
        }
        Ok(value)
    }

    fn fields(value: Value) -> LogFields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("fixture must be an object"),
        }
    }

    #[test]
    fn masks_top_level_and_nested_keys() {
        let mut map = fields(json!({
            "user": "a",
            "password": "p",
            "profile": {"password": "q", "nick": "n"},
        }));

        walk(&mut map, &mask_password).expect("redaction");

        assert_eq!(
            Value::Object(map),
            json!({
                "user": "a",
                "password": "<sensitive>",
                "profile": {"password": "<sensitive>", "nick": "n"},
            })
        );
    }

    #[test]
    fn walks_objects_inside_arrays() {
        let mut map = fields(json!({"accounts": [{"password": "x"}, {"password": "y"}, 3]}));

        walk(&mut map, &mask_password).expect("redaction");

        assert_eq!(
            map["accounts"],
            json!([{"password": "<sensitive>"}, {"password": "<sensitive>"}, 3])
        );
    }

    #[test]
    fn redactor_sees_nested_object_after_its_children() {
        let mut map = fields(json!({"outer": {"secret": "s"}}));
        let redactor = |key: &str, value: Value| -> Result<Value, BoxError> {
            match key {
                "secret" => Ok(json!("***")),
                "outer" => {
                    assert_eq!(value, json!({"secret": "***"}));
                    Ok(value)
                }
                _ => Ok(value),
            }
        };

        walk(&mut map, &redactor).expect("redaction");
    }

    #[test]
    fn failing_redactor_reports_offending_key() {
        let mut map = fields(json!({"token": "t"}));
        let redactor =
            |_key: &str, _value: Value| -> Result<Value, BoxError> { Err("vault offline".into()) };

        let err = walk(&mut map, &redactor).unwrap_err();
        match err {
            Error::RedactionFailed { key, .. } => assert_eq!(key, "token"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
