//! Tolerant decoding for the loosely-typed fields the backend sends.
//!
//! MySQL-backed endpoints return `DECIMAL` columns as strings and boolean
//! columns as `0`/`1`, and a few handlers send real JSON booleans instead.
//! These helpers accept every shape seen in practice.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A `0`/`1` column. Decodes from integers, booleans, numeric strings and
/// `null` (false); always encodes as `0`/`1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flag(bool);

impl Flag {
    pub const ON: Self = Self(true);
    pub const OFF: Self = Self(false);

    pub fn is_set(&self) -> bool {
        self.0
    }

    pub fn as_int(&self) -> u8 {
        u8::from(self.0)
    }

    pub fn toggled(&self) -> Self {
        Self(!self.0)
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_int())
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        let flag = match raw {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => {
                let s = s.trim();
                !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
            }
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "expected a 0/1 flag, got {other}"
                )));
            }
        };
        Ok(Self(flag))
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

/// Decode a number that may arrive as a JSON string. `null`/absent become `0`.
pub fn f64_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => value_to_f64(&v)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {v}"))),
    }
}

/// Like [`f64_or_zero`] but keeps absence visible.
pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(v) => value_to_f64(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {v}"))),
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    let exact = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    exact.or_else(|| {
        value_to_f64(value)
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Decode an integer that may arrive as a JSON string or a whole float.
pub fn i64_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(0),
        Some(v) => value_to_i64(&v)
            .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {v}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default)]
        activo: Flag,
        #[serde(default, deserialize_with = "f64_or_zero")]
        precio: f64,
        #[serde(default, deserialize_with = "i64_or_zero")]
        stock: i64,
        #[serde(default, deserialize_with = "opt_f64")]
        total: Option<f64>,
    }

    #[test]
    fn decimal_strings_and_flags() {
        let row: Row =
            serde_json::from_str(r#"{"activo":"1","precio":"12990.00","stock":"4","total":null}"#)
                .unwrap();
        assert!(row.activo.is_set());
        assert_eq!(row.precio, 12990.0);
        assert_eq!(row.stock, 4);
        assert_eq!(row.total, None);
    }

    #[test]
    fn out_of_range_integers_are_rejected() {
        assert!(serde_json::from_str::<Row>(r#"{"stock":1e30}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"stock":"-1e300"}"#).is_err());
        let row: Row = serde_json::from_str(r#"{"stock":"9223372036854775807"}"#).unwrap();
        assert_eq!(row.stock, i64::MAX);
        let row: Row = serde_json::from_str(r#"{"stock":"12.0"}"#).unwrap();
        assert_eq!(row.stock, 12);
    }

    #[test]
    fn absent_fields_default() {
        let row: Row = serde_json::from_str("{}").unwrap();
        assert!(!row.activo.is_set());
        assert_eq!(row.precio, 0.0);
        assert_eq!(row.stock, 0);
    }

    #[test]
    fn flag_shapes() {
        for (raw, expected) in [("1", true), ("0", false), ("true", true), (r#""0""#, false), ("null", false)] {
            let flag: Flag = serde_json::from_str(raw).unwrap();
            assert_eq!(flag.is_set(), expected, "input {raw}");
        }
        assert_eq!(serde_json::to_string(&Flag::ON).unwrap(), "1");
        assert!(serde_json::from_str::<Flag>("{}").is_err());
    }

    #[test]
    fn fractional_integer_is_rejected() {
        assert!(serde_json::from_str::<Row>(r#"{"stock": 1.5}"#).is_err());
    }
}
