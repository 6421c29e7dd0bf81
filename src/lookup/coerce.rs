//! Typed conversion of configuration values
//!
//! Values are stored as strings and converted on read. The set of targets is
//! closed: see [`TargetType`].

use std::fmt;

/// Conversion targets supported by typed lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// `true` / `false`
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 64-bit float
    Double,
    /// The raw string
    String,
    /// Comma separated list of strings
    List,
}

impl TargetType {
    /// Get the target as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            TargetType::Boolean => "boolean",
            TargetType::Integer => "integer",
            TargetType::Long => "long",
            TargetType::Double => "double",
            TargetType::String => "string",
            TargetType::List => "list",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value converted to one of the [`TargetType`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Boolean value
    Boolean(bool),
    /// 32-bit integer value
    Integer(i32),
    /// 64-bit integer value
    Long(i64),
    /// Floating point value
    Double(f64),
    /// String value
    String(String),
    /// List value
    List(Vec<String>),
}

impl TypedValue {
    /// Target type this value was converted to
    pub fn target(&self) -> TargetType {
        match self {
            TypedValue::Boolean(_) => TargetType::Boolean,
            TypedValue::Integer(_) => TargetType::Integer,
            TypedValue::Long(_) => TargetType::Long,
            TypedValue::Double(_) => TargetType::Double,
            TypedValue::String(_) => TargetType::String,
            TypedValue::List(_) => TargetType::List,
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// 32-bit integer payload
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            TypedValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// 64-bit integer payload; also widens 32-bit integers
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Long(v) => Some(*v),
            TypedValue::Integer(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Floating point payload
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// List payload
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            TypedValue::List(v) => Some(v),
            _ => None,
        }
    }
}

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert '{value}' to {target}")]
pub struct CoercionError {
    /// Raw value.
    pub value: String,
    /// Requested target.
    pub target: TargetType,
}

/// Convert `value` to `target`.
pub fn coerce(value: &str, target: TargetType) -> Result<TypedValue, CoercionError> {
    let err = || CoercionError {
        value: value.to_string(),
        target,
    };

    match target {
        TargetType::Boolean => {
            let trimmed = value.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(TypedValue::Boolean(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(TypedValue::Boolean(false))
            } else {
                Err(err())
            }
        }
        TargetType::Integer => value
            .trim()
            .parse()
            .map(TypedValue::Integer)
            .map_err(|_| err()),
        TargetType::Long => value
            .trim()
            .parse()
            .map(TypedValue::Long)
            .map_err(|_| err()),
        TargetType::Double => value
            .trim()
            .parse()
            .map(TypedValue::Double)
            .map_err(|_| err()),
        TargetType::String => Ok(TypedValue::String(value.to_string())),
        TargetType::List => Ok(TypedValue::List(
            value.split(',').map(str::to_string).collect(),
        )),
    }
}
