//! Deserializer for raw Gnip activity payloads.

use anyhow::{Result, bail};
use serde_json::Value;

/// Decodes a JSON payload into a sequence of activity records.
///
/// Accepts either a bare JSON array or the Gnip delivery envelope
/// `{"results": [...]}`.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON, or if the document
/// is neither an array nor an envelope with a `results` array. Individual
/// malformed records are tolerated downstream, not here.
pub fn parse_activities(bytes: &[u8]) -> Result<Vec<Value>> {
    let document: Value = serde_json::from_slice(bytes)?;

    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut envelope) => match envelope.remove("results") {
            Some(Value::Array(records)) => Ok(records),
            _ => bail!("expected a JSON array of activity records or a `results` envelope"),
        },
        _ => bail!("expected a JSON array of activity records or a `results` envelope"),
    }
}
