//! Typed field values.
//!
//! Records store their fields as [`FieldValue`], a small typed enum covering
//! the value kinds the original widget data layer handles: strings, numbers,
//! booleans, and dates. Typed accessors return `Option`; the checked
//! [`FieldValue::convert`] is the only place a wrong-type access becomes an
//! error, and it is a typed one rather than a silent coercion.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// The runtime type of a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Absent or null value.
    Null,
    /// Boolean value.
    Bool,
    /// Signed integer value.
    Int,
    /// Floating point value.
    Float,
    /// String value.
    String,
    /// Calendar date with time of day.
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Date => "date",
        };
        write!(f, "{name}")
    }
}

/// A typed value stored in a record field.
///
/// # Example
///
/// ```
/// use arbor_grid::FieldValue;
///
/// let value = FieldValue::from("Apples");
/// assert_eq!(value.as_str(), Some("Apples"));
/// assert!(value.as_int().is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value. Absent fields and JSON nulls both map here.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Date value with time of day. Comparison truncates to whole days
    /// unless a time-aware comparator is explicitly requested.
    Date(NaiveDateTime),
}

impl FieldValue {
    /// Returns the runtime type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Null => FieldType::Null,
            Self::Bool(_) => FieldType::Bool,
            Self::Int(_) => FieldType::Int,
            Self::Float(_) => FieldType::Float,
            Self::String(_) => FieldType::String,
            Self::Date(_) => FieldType::Date,
        }
    }

    /// Returns `true` if this is `FieldValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as a date.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the numeric magnitude of this value, if it has one.
    ///
    /// Integers and floats both normalize to `f64` so the two can be
    /// compared against each other.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts this value to the requested type.
    ///
    /// Supported conversions are numeric widening/narrowing, rendering any
    /// non-null value to a string, and parsing strings into numbers, booleans,
    /// or dates. Anything else (converting a date to a boolean, converting
    /// null to anything) is a [`DataError::InvalidConversion`].
    pub fn convert(&self, to: FieldType) -> Result<FieldValue> {
        let invalid = || DataError::InvalidConversion {
            from: self.field_type(),
            to,
        };

        if self.field_type() == to {
            return Ok(self.clone());
        }

        match (self, to) {
            (Self::Int(n), FieldType::Float) => Ok(Self::Float(*n as f64)),
            (Self::Float(n), FieldType::Int) => Ok(Self::Int(*n as i64)),
            (_, FieldType::String) if !self.is_null() => Ok(Self::String(self.to_string())),
            (Self::String(s), FieldType::Int) => {
                s.trim().parse::<i64>().map(Self::Int).map_err(|_| invalid())
            }
            (Self::String(s), FieldType::Float) => {
                s.trim().parse::<f64>().map(Self::Float).map_err(|_| invalid())
            }
            (Self::String(s), FieldType::Bool) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(invalid()),
            },
            (Self::String(s), FieldType::Date) => {
                parse_date(s).map(Self::Date).ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

/// Parses a date string in the formats the widget layer produces.
///
/// Accepts ISO date-times with or without fractional seconds, a plain ISO
/// date, and the `MM/DD/YYYY` form; bare dates get a midnight time of day.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Raw equality: same type and same value, except that integers and floats
/// compare by numeric magnitude.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(d: NaiveDateTime) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
