//! Value adapters applied once at the backend boundary.
//!
//! The backend has shipped monetary values as JSON numbers, numeric strings
//! and Mongo `{"$numberDecimal": "..."}` wrappers. Everything past
//! deserialization sees a plain `f64`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

const DECIMAL_WRAPPER_KEY: &str = "$numberDecimal";

/// Parse any backend money representation into a finite number.
///
/// Fixed contract: `null`, missing, empty, unparsable, non-finite and
/// non-numeric shapes all yield `0.0`. Strings are trimmed and parsed
/// strictly, so `"12abc"` is `0.0` rather than `12.0`.
pub fn parse_decimal(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => {
            return map.get(DECIMAL_WRAPPER_KEY).map(parse_decimal).unwrap_or(0.0);
        }
        Value::Null | Value::Bool(_) | Value::Array(_) => None,
    };

    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// A monetary amount normalized from whatever the backend sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Amount(pub f64);

impl Amount {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount(value)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Amount(parse_decimal(&raw)))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Boolean-like backend flag (`true`, `1`, `"1"`, `"true"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag(pub bool);

impl Flag {
    pub fn is_set(&self) -> bool {
        self.0
    }
}

fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
        _ => false,
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Flag(parse_flag(&raw)))
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

/// Integer-like backend field (days, enum codes).
///
/// Accepts every shape [`parse_decimal`] does and truncates toward zero;
/// out-of-range values saturate.
pub fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(parse_decimal(&raw) as i64)
}

/// Like [`lenient_int`], but `null` stays absent.
pub fn lenient_opt_int<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Null => None,
        other => Some(parse_decimal(&other) as i64),
    })
}

/// Customer name field: the backend sends either a name or `false`.
pub fn name_or_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Format an amount in rupees with two decimals.
pub fn format_inr(amount: f64) -> String {
    format!("₹{:.2}", amount)
}
