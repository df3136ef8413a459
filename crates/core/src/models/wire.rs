//! Lenient field decoders shared by the data-transfer records.
//!
//! The server is the source of truth for these shapes, so decoding accepts
//! the few representations it is known to vary between.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an identifier sent either as a JSON string or a JSON number.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::custom(format!(
            "expected an id (string or number), got {}",
            kind_of(&other)
        ))),
    }
}

/// Decode an amount sent as a JSON number or a numeric string.
/// `null` and a blank string count as zero.
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::custom(format!("amount {n} is out of range"))),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::custom(format!("invalid amount {s:?}: {e}"))),
        other => Err(Error::custom(format!(
            "expected an amount, got {}",
            kind_of(&other)
        ))),
    }
}

/// Decode a list sent either bare or wrapped as `{ "<key>": [...] }`.
///
/// Decoding goes through an intermediate value so that a bad element reports
/// its own error instead of a generic shape mismatch.
pub fn list<'de, D, T>(deserializer: D, key: &str) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        items @ Value::Array(_) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Null) | None => Value::Array(Vec::new()),
            Some(items) => items,
        },
        other => {
            return Err(Error::custom(format!(
                "expected a list of {key}, got {}",
                kind_of(&other)
            )))
        }
    };
    let Value::Array(items) = items else {
        return Err(Error::custom(format!("expected {key:?} to be an array")));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| Error::custom(format!("{key}[{i}]: {e}")))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a timestamp in any of the formats the API has been seen to emit:
/// RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]`, or a bare date (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a calendar date, accepting a full timestamp and keeping its date part.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| Error::custom(format!("invalid date {raw:?}"))),
    }
}

pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| Error::custom(format!("invalid timestamp {raw:?}"))),
    }
}
