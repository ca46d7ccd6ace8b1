//! Column value normalisation
//!
//! Captured column values are modelled as [`FieldValue`] and turned into JSON
//! by a [`Serializer`] before they are stored in the change log or sent over
//! the wire:
//!
//! - timestamps become ISO-8601 strings in the serializer's fixed offset
//! - enumerated values become their string tag
//! - every other scalar passes through unchanged, `Null` stays `null`
//!
//! The serializer holds no state besides the offset and performs no I/O.

use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use serde_json::{Number, Value as JsonValue};

use crate::error::{PantryError, Result};

/// Offset applied to timestamps when none is configured (UTC+05:00)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 5;

/// A single column value captured from a persisted entity
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Tag of an enumerated column (e.g. a user role)
    Enum(&'static str),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Converts [`FieldValue`]s into JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializer {
    offset: FixedOffset,
}

impl Serializer {
    /// Create a serializer rendering timestamps in `offset`
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Create a serializer from a whole-hour offset east of UTC
    pub fn from_offset_hours(hours: i32) -> Result<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or(PantryError::InvalidOffset(hours))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Normalise one value
    ///
    /// # Errors
    ///
    /// `NonFiniteNumber` when a float is NaN or infinite.
    pub fn normalize(&self, value: &FieldValue) -> Result<JsonValue> {
        let json = match value {
            FieldValue::Null => JsonValue::Null,
            FieldValue::Bool(b) => JsonValue::Bool(*b),
            FieldValue::Int(i) => JsonValue::Number((*i).into()),
            FieldValue::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or(PantryError::NonFiniteNumber { value: *f })?,
            FieldValue::Text(s) => JsonValue::String(s.clone()),
            FieldValue::Timestamp(ts) => JsonValue::String(self.format_timestamp(ts)),
            FieldValue::Enum(tag) => JsonValue::String((*tag).to_string()),
        };
        Ok(json)
    }

    /// Render a timestamp as ISO-8601 in the configured offset
    pub fn format_timestamp(&self, ts: &DateTime<Utc>) -> String {
        ts.with_timezone(&self.offset)
            .to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600).unwrap_or(Utc.fix()))
    }
}
