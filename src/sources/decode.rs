//! Lenient field decoders shared by source record types.
//!
//! Backends are inconsistent about JSON types: prices arrive as numbers
//! or numeric strings, counts as integers, floats or strings. These
//! helpers accept all of those and decode to `Option`, leaving the
//! default for each field to the record mapping code.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
    Bool(bool),
}

fn number_like(value: NumberLike) -> Option<f64> {
    match value {
        NumberLike::Number(n) => Some(n),
        NumberLike::Text(s) => s.trim().replace(',', "").parse().ok(),
        NumberLike::Bool(_) => None,
    }
}

/// Number or numeric string → `Option<f64>`; unparseable text is `None`.
pub fn opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberLike>::deserialize(deserializer)?
        .and_then(number_like)
        .filter(|n| n.is_finite()))
}

/// Count-like value → `Option<u32>`, clamping negatives to 0.
pub fn opt_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberLike>::deserialize(deserializer)?
        .and_then(number_like)
        .filter(|n| n.is_finite())
        .map(|n| n.max(0.0).min(u32::MAX as f64) as u32))
}

/// String, number or bool → `Option<String>`.
pub fn opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Bool, `0`/`1` or `"true"`/`"false"` → `Option<bool>`.
pub fn opt_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Decode one raw record into its typed form.
pub fn record<T>(kind: &str, value: &Value) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(value).map_err(|e| AppError::record(kind, e))
}

/// A decoded price must be a non-negative amount.
pub fn price(kind: &str, value: Option<f64>) -> Result<f64> {
    match value {
        None => Ok(0.0),
        Some(p) if p >= 0.0 => Ok(p),
        Some(p) => Err(AppError::record(kind, format!("negative price {p}"))),
    }
}

/// Decode every element of a record list, skipping and logging failures.
pub fn each<T, F>(source: &str, kind: &str, items: &[Value], mut parse: F) -> Vec<T>
where
    F: FnMut(&Value) -> Result<T>,
{
    items
        .iter()
        .filter_map(|item| match parse(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("[{}] Skipping {} record: {}", source, kind, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_f64")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "opt_count")]
        seats: Option<u32>,
        #[serde(default, deserialize_with = "opt_string")]
        number: Option<String>,
        #[serde(default, deserialize_with = "opt_bool")]
        refundable: Option<bool>,
    }

    fn decode(value: Value) -> Sample {
        record("sample", &value).unwrap()
    }

    #[test]
    fn test_numbers_and_strings() {
        let s = decode(json!({"price": "12,500,000", "seats": 3.0, "number": 4471, "refundable": "true"}));
        assert_eq!(s.price, Some(12_500_000.0));
        assert_eq!(s.seats, Some(3));
        assert_eq!(s.number.as_deref(), Some("4471"));
        assert_eq!(s.refundable, Some(true));
    }

    #[test]
    fn test_missing_and_null_fields() {
        let s = decode(json!({"price": null}));
        assert_eq!(s.price, None);
        assert_eq!(s.seats, None);
        assert_eq!(s.number, None);
        assert_eq!(s.refundable, None);
    }

    #[test]
    fn test_garbage_is_none() {
        let s = decode(json!({"price": "call us", "seats": -4, "refundable": {"x": 1}}));
        assert_eq!(s.price, None);
        assert_eq!(s.seats, Some(0));
        assert_eq!(s.refundable, None);
    }

    #[test]
    fn test_record_type_mismatch_is_record_error() {
        let result: Result<Sample> = record("sample", &json!([1, 2, 3]));
        assert!(matches!(result, Err(AppError::Record { .. })));
    }

    #[test]
    fn test_price() {
        assert_eq!(price("x", None).unwrap(), 0.0);
        assert_eq!(price("x", Some(10.0)).unwrap(), 10.0);
        assert!(price("x", Some(-1.0)).is_err());
    }

    #[test]
    fn test_each_skips_failures() {
        let items = vec![json!(1), json!("two"), json!(3)];
        let parsed = each("test", "number", &items, |v| {
            v.as_u64()
                .ok_or_else(|| AppError::record("number", "not a number"))
        });
        assert_eq!(parsed, vec![1, 3]);
    }
}
