//! # Primitive Value Model
//!
//! Defines `Value`, the typed result of reading a projected node's text,
//! and the conversion from raw literals to values via a closed table of
//! primitive kinds.
//!
//! Conversion failures are recoverable: [`parse_literal`] returns a
//! [`LiteralError`] and callers fall back to the unconverted raw text.
//! Sign constraints are enforced at parse time — `unsignedInt` rejects
//! negative literals and `positiveInt` additionally rejects zero.
//!
//! Date and time literals use full precision only (`YYYY-MM-DD`,
//! RFC 3339 datetimes, `HH:MM:SS` with optional fraction). Inputs the
//! parser rejects degrade to raw text by the conversion contract.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LiteralError;

/// The closed set of primitive kinds a literal can convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// `true` or `false`.
    Boolean,
    /// Signed 64-bit integer.
    Integer,
    /// Integer constrained to be non-negative.
    UnsignedInt,
    /// Integer constrained to be strictly positive.
    PositiveInt,
    /// Exact decimal number.
    Decimal,
    /// Any of the string-valued type names.
    String,
    /// Calendar date.
    Date,
    /// Date and time with offset.
    DateTime,
    /// Time of day.
    Time,
}

impl PrimitiveKind {
    /// Map a primitive type name to its kind. Names not in the table are
    /// not primitives.
    pub fn of(type_name: &str) -> Option<Self> {
        match type_name {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "unsignedInt" => Some(Self::UnsignedInt),
            "positiveInt" => Some(Self::PositiveInt),
            "decimal" => Some(Self::Decimal),
            "string" | "code" | "id" | "uri" | "url" | "canonical" | "oid" | "uuid"
            | "markdown" | "base64Binary" | "xhtml" => Some(Self::String),
            "date" => Some(Self::Date),
            "dateTime" | "instant" => Some(Self::DateTime),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::UnsignedInt => "unsignedInt",
            Self::PositiveInt => "positiveInt",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Time => "time",
        };
        f.write_str(name)
    }
}

/// A typed primitive value read from a projected node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Integer value, covering the signed and sign-constrained kinds.
    Int(i64),
    /// Exact decimal value.
    Decimal(Decimal),
    /// String value, also the fallback for unconverted raw text.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time with offset.
    DateTime(DateTime<FixedOffset>),
    /// Time of day.
    Time(NaiveTime),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Time(v) => write!(f, "{v}"),
        }
    }
}

/// Convert a raw text literal to a typed value of the given kind.
///
/// # Errors
///
/// Returns [`LiteralError::Malformed`] when the text does not parse as
/// the kind, or violates a sign constraint.
pub fn parse_literal(text: &str, kind: PrimitiveKind) -> Result<Value, LiteralError> {
    match kind {
        PrimitiveKind::Boolean => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(malformed(text, kind, "expected 'true' or 'false'")),
        },
        PrimitiveKind::Integer => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| malformed(text, kind, &e.to_string())),
        PrimitiveKind::UnsignedInt => {
            let n = text
                .parse::<i64>()
                .map_err(|e| malformed(text, kind, &e.to_string()))?;
            if n < 0 {
                return Err(malformed(text, kind, "value must not be negative"));
            }
            Ok(Value::Int(n))
        }
        PrimitiveKind::PositiveInt => {
            let n = text
                .parse::<i64>()
                .map_err(|e| malformed(text, kind, &e.to_string()))?;
            if n <= 0 {
                return Err(malformed(text, kind, "value must be positive"));
            }
            Ok(Value::Int(n))
        }
        PrimitiveKind::Decimal => text
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|e| malformed(text, kind, &e.to_string())),
        PrimitiveKind::String => Ok(Value::String(text.to_owned())),
        PrimitiveKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|e| malformed(text, kind, &e.to_string())),
        PrimitiveKind::DateTime => DateTime::parse_from_rfc3339(text)
            .map(Value::DateTime)
            .map_err(|e| malformed(text, kind, &e.to_string())),
        PrimitiveKind::Time => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .map(Value::Time)
            .map_err(|e| malformed(text, kind, &e.to_string())),
    }
}

fn malformed(text: &str, kind: PrimitiveKind, reason: &str) -> LiteralError {
    LiteralError::Malformed {
        text: text.to_owned(),
        kind: kind.to_string(),
        reason: reason.to_owned(),
    }
}
