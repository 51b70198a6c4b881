//! Defaulting of sub-documents that are structurally required downstream
//! but frequently absent in real payloads.

use serde_json::{Value, json};

/// Fills `actor.location` and `gnip.language` with empty defaults when
/// absent, so the attribute mapper can read through them unconditionally.
///
/// Idempotent; existing values are never touched. Records whose `actor`
/// or `gnip` sub-documents are missing entirely are left as-is — the
/// mapper reports those as per-record errors.
pub fn sanitize_record(record: &mut Value) {
    if let Some(actor) = record.get_mut("actor").and_then(Value::as_object_mut) {
        actor
            .entry("location")
            .or_insert_with(|| json!({"objectType": "", "displayName": ""}));
    }

    if let Some(gnip) = record.get_mut("gnip").and_then(Value::as_object_mut) {
        gnip.entry("language").or_insert_with(|| json!({"value": ""}));
    }
}
