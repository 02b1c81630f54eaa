//! Type coercion from normalized cell text to typed scalar values

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The only date pattern understood by the coercer and the cell normalizer
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Declared scalar type of a bound field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Int,
    Long,
    Bool,
    Double,
    Date,
}

impl DataType {
    /// Look up a data type by the name used in field metadata
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(DataType::String),
            "int" => Some(DataType::Int),
            "long" => Some(DataType::Long),
            "bool" => Some(DataType::Bool),
            "double" => Some(DataType::Double),
            "date" => Some(DataType::Date),
            _ => None,
        }
    }

    /// The metadata name of this type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Bool => "bool",
            DataType::Double => "double",
            DataType::Date => "date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced scalar, ready to be written into a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i32),
    Long(i64),
    Bool(bool),
    Double(f64),
    Date(NaiveDate),
}

impl Value {
    /// The data type this value was coerced to
    pub fn data_type(&self) -> DataType {
        match self {
            Value::String(_) => DataType::String,
            Value::Int(_) => DataType::Int,
            Value::Long(_) => DataType::Long,
            Value::Bool(_) => DataType::Bool,
            Value::Double(_) => DataType::Double,
            Value::Date(_) => DataType::Date,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Double(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

/// Why a non-date coercion failed
#[derive(Debug, Error)]
pub enum CoercionError {
    #[error(transparent)]
    Integer(#[from] ParseIntError),

    #[error(transparent)]
    Float(#[from] ParseFloatError),
}

/// Convert a trimmed, non-empty string into a value of the declared type.
///
/// Numeric failures are returned as errors. A date that does not match
/// `dd-MM-yyyy` (or names an impossible calendar day) is not an error: it
/// yields `Ok(None)` and the field is left unset.
pub fn coerce(value: &str, data_type: DataType) -> Result<Option<Value>, CoercionError> {
    let coerced = match data_type {
        DataType::String => Value::String(value.to_string()),
        DataType::Int => Value::Int(value.parse::<i32>()?),
        DataType::Long => Value::Long(value.parse::<i64>()?),
        DataType::Bool => Value::Bool(value.eq_ignore_ascii_case("true")),
        DataType::Double => Value::Double(value.parse::<f64>()?),
        DataType::Date => match NaiveDate::parse_from_str(value, DATE_FORMAT) {
            Ok(date) => Value::Date(date),
            Err(e) => {
                tracing::warn!(value, error = %e, "date does not match dd-MM-yyyy, leaving field unset");
                return Ok(None);
            }
        },
    };
    Ok(Some(coerced))
}

/// Conversion from a coerced [`Value`] into a concrete field type
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(i64::from(i)),
            Value::Long(l) => Some(l),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(f64::from(i)),
            Value::Long(l) => Some(l as f64),
            Value::Double(d) => Some(d),
            _ => None,
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl<F: FromValue> FromValue for Option<F> {
    fn from_value(value: Value) -> Option<Self> {
        F::from_value(value).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_string_is_identity() {
        assert_eq!(
            coerce("INV-001", DataType::String).unwrap(),
            Some(Value::String("INV-001".to_string()))
        );
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce("-42", DataType::Int).unwrap(), Some(Value::Int(-42)));
        assert_eq!(
            coerce("9000000000", DataType::Long).unwrap(),
            Some(Value::Long(9_000_000_000))
        );
        assert_eq!(coerce("2.356", DataType::Double).unwrap(), Some(Value::Double(2.356)));
    }

    #[test]
    fn test_coerce_numeric_failures_propagate() {
        assert!(coerce("abc", DataType::Int).is_err());
        assert!(coerce("9000000000", DataType::Int).is_err());
        assert!(coerce("1.5", DataType::Long).is_err());
        assert!(coerce("n/a", DataType::Double).is_err());
    }

    #[test]
    fn test_coerce_bool_never_fails() {
        assert_eq!(coerce("TRUE", DataType::Bool).unwrap(), Some(Value::Bool(true)));
        assert_eq!(coerce("true", DataType::Bool).unwrap(), Some(Value::Bool(true)));
        assert_eq!(coerce("maybe", DataType::Bool).unwrap(), Some(Value::Bool(false)));
        assert_eq!(coerce("1", DataType::Bool).unwrap(), Some(Value::Bool(false)));
    }

    #[test]
    fn test_coerce_date() {
        assert_eq!(
            coerce("31-12-2024", DataType::Date).unwrap(),
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()))
        );
    }

    #[test]
    fn test_coerce_bad_date_is_swallowed() {
        assert_eq!(coerce("31-02-2024", DataType::Date).unwrap(), None);
        assert_eq!(coerce("2024-12-31", DataType::Date).unwrap(), None);
    }

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::from_name("double"), Some(DataType::Double));
        assert_eq!(DataType::from_name("Double"), None);
        assert_eq!(DataType::from_name("decimal"), None);
        assert_eq!(DataType::default(), DataType::String);
        assert_eq!(DataType::Long.to_string(), "long");
    }

    #[test]
    fn test_from_value_conversions() {
        assert_eq!(i64::from_value(Value::Int(7)), Some(7));
        assert_eq!(String::from_value(Value::Int(7)), None);
        assert_eq!(Option::<f64>::from_value(Value::Double(1.5)), Some(Some(1.5)));
        assert_eq!(Option::<f64>::from_value(Value::Bool(true)), None);
    }

    #[test]
    fn test_integers_widen_into_floats() {
        assert_eq!(f64::from_value(Value::Int(-3)), Some(-3.0));
        assert_eq!(f64::from_value(Value::Long(9_000_000_000)), Some(9.0e9));
        assert_eq!(i32::from_value(Value::Long(1)), None);
        assert_eq!(i64::from_value(Value::Double(1.0)), None);
    }
}
