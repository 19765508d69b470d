//! Line decoding from raw log text to a structured record

use serde_json::{Map, Value};

/// A decoded log line: the top-level JSON object, field name to value.
pub type DecodedRecord = Map<String, Value>;

/// Decode one raw log line.
///
/// Returns `None` for anything that is not a JSON object: blank lines,
/// truncated writes, plain-text transport noise, or JSON scalars/arrays.
pub fn decode_line(line: &str) -> Option<DecodedRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(record)) => Some(record),
        Ok(_) => None,
        Err(e) => {
            log::trace!("Undecodable line: {}", e);
            None
        }
    }
}
