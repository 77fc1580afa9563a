//! Typed access to a mapping of named field values.
//!
//! `FieldReader` is the only place where raw JSON values are turned into
//! record field types. Three presence rules apply:
//!
//! * required: absent fails with `Missing`, `null` fails with `WrongType`
//! * optional: absent or `null` yields `None`
//! * defaulted: absent yields the default, `null` fails with `WrongType`

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::ValidationConfig;
use crate::error::{SchemaValidationError, ValidationReason};
use crate::records::RecordKind;
use crate::schema::clock;
use crate::schema::enums::Token;

type Result<T> = std::result::Result<T, SchemaValidationError>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Approximate bounds of `Decimal`, used only to classify rejected input
const MAX_DECIMAL_MAGNITUDE: f64 = 7.922_816_251_426_434e28;
const MIN_DECIMAL_MAGNITUDE: f64 = 1e-28;

/// JSON type name used in `WrongType` errors
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Why a JSON value could not become a decimal
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalParseError {
    #[error("not a decimal number")]
    NotNumeric,

    #[error("more significant digits than a decimal can hold")]
    Inexact,

    #[error("outside representable decimal range")]
    OutOfRange,
}

/// Parse an exact decimal from a JSON string or number.
///
/// Floats are parsed from their shortest textual form, so `0.45` becomes
/// exactly `0.45` rather than the nearest binary fraction. Input that cannot
/// be held without rounding is rejected.
pub fn parse_decimal(value: &Value) -> std::result::Result<Decimal, DecimalParseError> {
    match value {
        Value::String(s) => parse_decimal_text(s.trim()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Decimal::from(u))
            } else {
                parse_decimal_text(&n.to_string())
            }
        }
        _ => Err(DecimalParseError::NotNumeric),
    }
}

fn parse_decimal_text(text: &str) -> std::result::Result<Decimal, DecimalParseError> {
    if let Some(decimal) = Decimal::from_str_exact(text)
        .ok()
        .or_else(|| from_scientific_exact(text))
    {
        return Ok(decimal);
    }

    let approx = match text.parse::<f64>() {
        Ok(approx) if approx.is_finite() => approx.abs(),
        _ => return Err(DecimalParseError::NotNumeric),
    };
    if approx > MAX_DECIMAL_MAGNITUDE || (approx != 0.0 && approx < MIN_DECIMAL_MAGNITUDE) {
        Err(DecimalParseError::OutOfRange)
    } else {
        Err(DecimalParseError::Inexact)
    }
}

/// `<mantissa>e<exponent>` without rounding the mantissa
fn from_scientific_exact(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = text.split_once(['e', 'E'])?;
    let mut value = Decimal::from_str_exact(mantissa).ok()?;
    let exponent: i64 = exponent.parse().ok()?;
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }

    let scale = i64::from(value.scale()) - exponent;
    if scale >= 0 {
        value.set_scale(u32::try_from(scale).ok()?).ok()?;
        Some(value)
    } else {
        value.set_scale(0).ok()?;
        let factor = 10i128.checked_pow(u32::try_from(-scale).ok()?)?;
        value.checked_mul(Decimal::try_from_i128_with_scale(factor, 0).ok()?)
    }
}

/// Parse an RFC 3339 timestamp, or a naive one interpreted as UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub struct FieldReader<'a> {
    entity: RecordKind,
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub fn new(entity: RecordKind, fields: &'a Map<String, Value>) -> Self {
        Self { entity, fields }
    }

    pub fn entity(&self) -> RecordKind {
        self.entity
    }

    /// Reject (or log) keys outside `known`, depending on configuration
    pub fn check_unknown(&self, known: &[&str], config: &ValidationConfig) -> Result<()> {
        for key in self.fields.keys() {
            if known.contains(&key.as_str()) {
                continue;
            }
            if config.reject_unknown_fields {
                return Err(self.error(key, ValidationReason::UnknownField));
            }
            debug!("Ignoring unknown field {}.{}", self.entity, key);
        }
        Ok(())
    }

    fn error(&self, field: &str, reason: ValidationReason) -> SchemaValidationError {
        SchemaValidationError::new(self.entity, field, reason)
    }

    fn wrong_type(&self, field: &str, expected: &'static str, found: &Value) -> SchemaValidationError {
        self.error(
            field,
            ValidationReason::WrongType {
                expected,
                found: json_type(found),
            },
        )
    }

    fn required(&self, field: &str) -> Result<&'a Value> {
        self.fields
            .get(field)
            .ok_or_else(|| SchemaValidationError::missing(self.entity, field))
    }

    fn optional(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn defaulted(&self, field: &str) -> Option<&'a Value> {
        let value = self.fields.get(field);
        if value.is_none() {
            debug!("Defaulting {}.{}", self.entity, field);
        }
        value
    }

    // ---- strings ----

    fn as_string(&self, field: &str, value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.wrong_type(field, "string", value))
    }

    pub fn required_str(&self, field: &str) -> Result<String> {
        let value = self.required(field)?;
        self.as_string(field, value)
    }

    pub fn optional_str(&self, field: &str) -> Result<Option<String>> {
        self.optional(field)
            .map(|value| self.as_string(field, value))
            .transpose()
    }

    pub fn string_list_or_empty(&self, field: &str) -> Result<Vec<String>> {
        let Some(value) = self.defaulted(field) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.wrong_type(field, "array of strings", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.as_string(&format!("{field}[{i}]"), item))
            .collect()
    }

    // ---- enumerations ----

    fn as_token<T: Token>(&self, field: &str, value: &Value) -> Result<T> {
        let token = value
            .as_str()
            .ok_or_else(|| self.wrong_type(field, "string token", value))?;
        T::from_token(token).ok_or_else(|| {
            self.error(
                field,
                ValidationReason::UnknownToken {
                    token: token.to_string(),
                    allowed: T::TOKENS,
                },
            )
        })
    }

    pub fn required_token<T: Token>(&self, field: &str) -> Result<T> {
        let value = self.required(field)?;
        self.as_token(field, value)
    }

    pub fn optional_token<T: Token>(&self, field: &str) -> Result<Option<T>> {
        self.optional(field)
            .map(|value| self.as_token(field, value))
            .transpose()
    }

    // ---- dates and timestamps ----

    pub fn required_date(&self, field: &str) -> Result<NaiveDate> {
        let value = self.required(field)?;
        value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .ok_or_else(|| self.wrong_type(field, "date (YYYY-MM-DD)", value))
    }

    pub fn timestamp_or_now(&self, field: &str) -> Result<DateTime<Utc>> {
        match self.defaulted(field) {
            None => Ok(clock::now()),
            Some(value) => value
                .as_str()
                .and_then(parse_timestamp)
                .ok_or_else(|| self.wrong_type(field, "ISO-8601 timestamp", value)),
        }
    }

    // ---- decimals ----

    fn as_decimal(&self, field: &str, value: &Value) -> Result<Decimal> {
        parse_decimal(value).map_err(|e| match e {
            DecimalParseError::NotNumeric => self.wrong_type(field, "decimal", value),
            DecimalParseError::Inexact => {
                self.wrong_type(field, "decimal with at most 28 significant digits", value)
            }
            DecimalParseError::OutOfRange => {
                SchemaValidationError::invariant(self.entity, field, e.to_string())
            }
        })
    }

    pub fn required_decimal(&self, field: &str) -> Result<Decimal> {
        let value = self.required(field)?;
        self.as_decimal(field, value)
    }

    pub fn optional_decimal(&self, field: &str) -> Result<Option<Decimal>> {
        self.optional(field)
            .map(|value| self.as_decimal(field, value))
            .transpose()
    }

    pub fn decimal_or(&self, field: &str, default: Decimal) -> Result<Decimal> {
        match self.defaulted(field) {
            None => Ok(default),
            Some(value) => self.as_decimal(field, value),
        }
    }

    // ---- integers ----

    fn as_count(&self, field: &str, value: &Value) -> Result<u64> {
        value
            .as_u64()
            .ok_or_else(|| self.wrong_type(field, "non-negative integer", value))
    }

    pub fn count_or_zero(&self, field: &str) -> Result<u64> {
        match self.defaulted(field) {
            None => Ok(0),
            Some(value) => self.as_count(field, value),
        }
    }

    pub fn optional_count(&self, field: &str) -> Result<Option<u64>> {
        self.optional(field)
            .map(|value| self.as_count(field, value))
            .transpose()
    }

    // ---- nested structures ----

    fn as_object(&self, field: &str, value: &Value) -> Result<Map<String, Value>> {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| self.wrong_type(field, "object", value))
    }

    pub fn required_object(&self, field: &str) -> Result<Map<String, Value>> {
        let value = self.required(field)?;
        self.as_object(field, value)
    }

    pub fn optional_object(&self, field: &str) -> Result<Option<Map<String, Value>>> {
        self.optional(field)
            .map(|value| self.as_object(field, value))
            .transpose()
    }

    fn as_number_map(&self, field: &str, value: &Value) -> Result<BTreeMap<String, f64>> {
        let object = value
            .as_object()
            .ok_or_else(|| self.wrong_type(field, "object of numbers", value))?;
        object
            .iter()
            .map(|(key, entry)| {
                entry
                    .as_f64()
                    .map(|n| (key.clone(), n))
                    .ok_or_else(|| self.wrong_type(&format!("{field}.{key}"), "number", entry))
            })
            .collect()
    }

    pub fn required_number_map(&self, field: &str) -> Result<BTreeMap<String, f64>> {
        let value = self.required(field)?;
        self.as_number_map(field, value)
    }

    pub fn optional_number_map(&self, field: &str) -> Result<Option<BTreeMap<String, f64>>> {
        self.optional(field)
            .map(|value| self.as_number_map(field, value))
            .transpose()
    }

    pub fn optional_object_list(&self, field: &str) -> Result<Option<Vec<Map<String, Value>>>> {
        let Some(value) = self.optional(field) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.wrong_type(field, "array of objects", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.as_object(&format!("{field}[{i}]"), item))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
