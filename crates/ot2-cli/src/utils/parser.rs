use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    MissingSeparator(String),

    #[error("Key cannot be empty in --set value '{0}'.")]
    EmptyKey(String),

    #[error("Invalid {expected} value for {key}: '{value}'")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Splits a `-S KEY=VALUE` argument on its first `=`. Both sides are trimmed.
pub fn split_key_value(pair: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| ParseError::MissingSeparator(pair.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(pair.to_string()));
    }
    Ok((key, value.trim()))
}

/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, in any case.
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ParseError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value, "boolean")),
    }
}

pub fn parse_number<T: FromStr>(
    key: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, ParseError> {
    value.parse().map_err(|_| invalid(key, value, expected))
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ParseError {
    ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_on_first_equals() {
        assert_eq!(
            split_key_value("selection.target-mass = 800").unwrap(),
            ("selection.target-mass", "800")
        );
        assert_eq!(split_key_value("a=b=c").unwrap(), ("a", "b=c"));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert_eq!(
            split_key_value("selection.target-mass"),
            Err(ParseError::MissingSeparator("selection.target-mass".into()))
        );
        assert!(matches!(split_key_value("=5"), Err(ParseError::EmptyKey(_))));
    }

    #[test]
    fn booleans_accept_common_spellings() {
        for yes in ["true", "YES", "on", "1"] {
            assert!(parse_bool("k", yes).unwrap());
        }
        for no in ["false", "No", "off", "0"] {
            assert!(!parse_bool("k", no).unwrap());
        }
        assert!(parse_bool("k", "maybe").is_err());
    }

    #[test]
    fn numbers_report_expected_kind() {
        assert_eq!(parse_number::<u64>("t", "10", "integer").unwrap(), 10);
        let err = parse_number::<f64>("selection.target-mass", "lots", "float").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid float value for selection.target-mass: 'lots'"
        );
    }
}
