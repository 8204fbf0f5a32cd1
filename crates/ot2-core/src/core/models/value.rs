use serde::Serialize;
use std::collections::BTreeMap;

/// A value that can be embedded in a protocol's parameter block.
///
/// The set of kinds is closed: numbers, strings, and lists or mappings of the
/// same. Mappings are ordered by key so that serialization is stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Integer(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "string",
            ParamValue::List(_) => "list",
            ParamValue::Map(_) => "mapping",
        }
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ParamValue)>,
    {
        ParamValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Finds the first value that has no faithful textual form, returning a
    /// dotted path to it and the reason.
    pub(crate) fn find_unserializable(&self, path: &str) -> Option<(String, String)> {
        match self {
            ParamValue::Float(f) if !f.is_finite() => {
                Some((path.to_string(), format!("non-finite number {}", f)))
            }
            ParamValue::List(items) => items
                .iter()
                .enumerate()
                .find_map(|(i, item)| item.find_unserializable(&format!("{}[{}]", path, i))),
            ParamValue::Map(entries) => entries
                .iter()
                .find_map(|(k, v)| v.find_unserializable(&format!("{}.{}", path, k))),
            _ => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(ParamValue::Integer)
            .unwrap_or(ParamValue::Float(value as f64))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<BTreeMap<String, T>> for ParamValue {
    fn from(entries: BTreeMap<String, T>) -> Self {
        ParamValue::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl TryFrom<serde_json::Value> for ParamValue {
    type Error = String;

    /// Converts loosely-typed input. Booleans and nulls have no counterpart in
    /// the parameter vocabulary and are rejected.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ParamValue::Float(f))
                } else {
                    Err(format!("number {} is out of range", n))
                }
            }
            Value::String(s) => Ok(ParamValue::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(ParamValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::List),
            Value::Object(entries) => entries
                .into_iter()
                .map(|(k, v)| ParamValue::try_from(v).map(|v| (k, v)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(ParamValue::Map),
            Value::Bool(b) => Err(format!("boolean {} is not a supported parameter kind", b)),
            Value::Null => Err("null is not a supported parameter kind".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_conversion_keeps_integers_and_floats_apart() {
        let value = ParamValue::try_from(json!([1, 2.5, "x"])).unwrap();
        assert_eq!(
            value,
            ParamValue::List(vec![
                ParamValue::Integer(1),
                ParamValue::Float(2.5),
                ParamValue::Text("x".into()),
            ])
        );
    }

    #[test]
    fn json_conversion_rejects_booleans_and_nulls_anywhere() {
        assert!(ParamValue::try_from(json!(true)).is_err());
        assert!(ParamValue::try_from(json!({"a": [1, null]})).is_err());
    }

    #[test]
    fn find_unserializable_reports_nested_path() {
        let value = ParamValue::map([(
            "samples",
            ParamValue::List(vec![ParamValue::map([("volume", ParamValue::Float(f64::NAN))])]),
        )]);

        let (path, reason) = value.find_unserializable("root").unwrap();
        assert_eq!(path, "root.samples[0].volume");
        assert!(reason.contains("non-finite"));
    }
}
