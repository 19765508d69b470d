//! Slow query classification and field extraction

use super::aggregator::MAX_DURATION_MS;
use super::decoder::DecodedRecord;
use serde_json::Value;

/// Message text the server logs for every slow operation.
pub const SLOW_QUERY_MSG: &str = "Slow query";

/// Fingerprint attribute names, in lookup order. Newer servers may log only
/// the shape hash.
pub const FINGERPRINT_FIELDS: [&str; 2] = ["queryHash", "queryShapeHash"];

/// Fields pulled from one slow query log record.
///
/// Empty strings are normalized to `None`, so "absent" and "present but
/// empty" look the same downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEvent {
    pub fingerprint: String,
    pub duration_ms: Option<u64>,
    pub namespace: Option<String>,
    pub plan_summary: Option<String>,
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    WrongType { field: &'static str, found: &'static str },
    InvalidDuration(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::WrongType { field, found } => {
                write!(f, "Unexpected type for attr.{}: {}", field, found)
            }
            ExtractError::InvalidDuration(raw) => {
                write!(f, "Invalid durationMillis: {}", raw)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Classify a decoded record and extract its query event.
///
/// `Ok(None)` means the record is not a slow query event (wrong `msg`, no
/// `attr` object, missing or empty fingerprint). `Err` means the record is a
/// slow query event but one of its fields has a shape we cannot use.
pub fn extract_query_event(record: &DecodedRecord) -> Result<Option<QueryEvent>, ExtractError> {
    if record.get("msg").and_then(Value::as_str) != Some(SLOW_QUERY_MSG) {
        return Ok(None);
    }

    let attr = match record.get("attr") {
        Some(Value::Object(attr)) => attr,
        _ => return Ok(None),
    };

    let mut fingerprint = None;
    for field in FINGERPRINT_FIELDS {
        if let Some(value) = optional_string(attr.get(field), field)? {
            fingerprint = Some(value);
            break;
        }
    }
    let Some(fingerprint) = fingerprint else {
        return Ok(None);
    };

    Ok(Some(QueryEvent {
        fingerprint,
        duration_ms: duration_millis(attr.get("durationMillis"))?,
        namespace: optional_string(attr.get("ns"), "ns")?,
        plan_summary: optional_string(attr.get("planSummary"), "planSummary")?,
        command: command_text(attr.get("command")),
    }))
}

fn optional_string(value: Option<&Value>, field: &'static str) -> Result<Option<String>, ExtractError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ExtractError::WrongType {
            field,
            found: type_name(other),
        }),
    }
}

/// Parse `durationMillis`, accepting plain integers and the extended JSON
/// `$numberLong`/`$numberInt` wrappers. Values past `MAX_DURATION_MS` are
/// rejected.
fn duration_millis(value: Option<&Value>) -> Result<Option<u64>, ExtractError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|ms| *ms <= MAX_DURATION_MS)
            .map(Some)
            .ok_or_else(|| ExtractError::InvalidDuration(n.to_string())),
        Some(Value::Object(wrapper)) => {
            let raw = wrapper
                .get("$numberLong")
                .or_else(|| wrapper.get("$numberInt"))
                .and_then(Value::as_str)
                .ok_or(ExtractError::WrongType {
                    field: "durationMillis",
                    found: "object",
                })?;
            raw.parse::<u64>()
                .ok()
                .filter(|ms| *ms <= MAX_DURATION_MS)
                .map(Some)
                .ok_or_else(|| ExtractError::InvalidDuration(raw.to_string()))
        }
        Some(other) => Err(ExtractError::WrongType {
            field: "durationMillis",
            found: type_name(other),
        }),
    }
}

/// Command text is free-form: strings are kept verbatim, documents become
/// their compact JSON text.
fn command_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
