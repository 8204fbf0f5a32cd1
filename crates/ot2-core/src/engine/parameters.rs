use super::error::EngineError;
use crate::core::models::value::ParamValue;
use std::collections::BTreeMap;

/// Validated parameters ready to embed in a template, with their serialized
/// form fixed at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBlock {
    fields: BTreeMap<String, ParamValue>,
    serialized: String,
}

impl ParameterBlock {
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The data literal that is spliced into templates. Keys appear in sorted
    /// order at every nesting level, so equal inputs give equal bytes.
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    pub fn fields(&self) -> &BTreeMap<String, ParamValue> {
        &self.fields
    }
}

/// Validates `fields` and serializes them into a [`ParameterBlock`].
///
/// Fails with [`EngineError::UnserializableParameter`] on an empty or
/// duplicated key, or on a value without a faithful textual form (non-finite
/// numbers).
pub fn build<K, I>(fields: I) -> Result<ParameterBlock, EngineError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, ParamValue)>,
{
    let mut map = BTreeMap::new();
    for (key, value) in fields {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(EngineError::UnserializableParameter {
                key,
                reason: "parameter names cannot be empty".to_string(),
            });
        }
        if let Some((path, reason)) = value.find_unserializable(&key) {
            return Err(EngineError::UnserializableParameter { key: path, reason });
        }
        if map.contains_key(&key) {
            return Err(EngineError::UnserializableParameter {
                key,
                reason: "parameter is supplied more than once".to_string(),
            });
        }
        map.insert(key, value);
    }

    let serialized =
        serde_json::to_string(&map).map_err(|e| EngineError::UnserializableParameter {
            key: "<block>".to_string(),
            reason: e.to_string(),
        })?;

    Ok(ParameterBlock {
        fields: map,
        serialized,
    })
}

/// Builds a block from loosely-typed JSON, rejecting kinds outside the
/// parameter vocabulary.
pub fn build_from_json(value: serde_json::Value) -> Result<ParameterBlock, EngineError> {
    let serde_json::Value::Object(entries) = value else {
        return Err(EngineError::UnserializableParameter {
            key: "<block>".to_string(),
            reason: "top-level parameters must be a mapping".to_string(),
        });
    };

    let mut fields = Vec::with_capacity(entries.len());
    for (key, raw) in entries {
        let value = ParamValue::try_from(raw)
            .map_err(|reason| EngineError::UnserializableParameter {
                key: key.clone(),
                reason,
            })?;
        fields.push((key, value));
    }
    build(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_is_deterministic_for_identical_input() {
        let first = build([
            ("a", ParamValue::from(1)),
            ("b", ParamValue::from(vec![1, 2])),
        ])
        .unwrap();
        let second = build([
            ("a", ParamValue::from(1)),
            ("b", ParamValue::from(vec![1, 2])),
        ])
        .unwrap();

        assert_eq!(first.serialized(), second.serialized());
        assert_eq!(first.serialized(), r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn build_output_does_not_depend_on_insertion_order() {
        let forward = build([
            ("volume", ParamValue::from(100.0)),
            ("ids", ParamValue::from(vec!["A", "B"])),
            (
                "nested",
                ParamValue::map([("z", ParamValue::from(1)), ("a", ParamValue::from(2))]),
            ),
        ])
        .unwrap();
        let reverse = build([
            (
                "nested",
                ParamValue::map([("a", ParamValue::from(2)), ("z", ParamValue::from(1))]),
            ),
            ("ids", ParamValue::from(vec!["A", "B"])),
            ("volume", ParamValue::from(100.0)),
        ])
        .unwrap();

        assert_eq!(forward.serialized(), reverse.serialized());
        assert_eq!(
            forward.serialized(),
            r#"{"ids":["A","B"],"nested":{"a":2,"z":1},"volume":100.0}"#
        );
    }

    #[test]
    fn non_finite_numbers_are_unserializable() {
        let err = build([(
            "ladder",
            ParamValue::List(vec![ParamValue::Float(1.0), ParamValue::Float(f64::INFINITY)]),
        )])
        .unwrap_err();

        assert!(matches!(
            err,
            EngineError::UnserializableParameter { ref key, .. } if key == "ladder[1]"
        ));
    }

    #[test]
    fn duplicate_and_empty_keys_are_rejected() {
        let dup = build([("a", ParamValue::from(1)), ("a", ParamValue::from(2))]);
        assert!(matches!(dup, Err(EngineError::UnserializableParameter { .. })));

        let empty = build([(" ", ParamValue::from(1))]);
        assert!(matches!(empty, Err(EngineError::UnserializableParameter { .. })));
    }

    #[test]
    fn json_input_with_booleans_is_rejected() {
        let err = build_from_json(json!({"a": 1, "flag": true})).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnserializableParameter { ref key, .. } if key == "flag"
        ));
    }

    #[test]
    fn json_input_round_trips_to_sorted_literal() {
        let block = build_from_json(json!({"b": [1, 2], "a": "x"})).unwrap();
        assert_eq!(block.serialized(), r#"{"a":"x","b":[1,2]}"#);
        assert!(block.contains_key("a"));
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn empty_block_serializes_to_empty_mapping() {
        let block = build(Vec::<(String, ParamValue)>::new()).unwrap();
        assert!(block.is_empty());
        assert_eq!(block.serialized(), "{}");
    }
}
