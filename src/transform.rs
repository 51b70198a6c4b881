//! Per-record transformation and batch partitioning.
//!
//! One malformed record never aborts a batch: every failure is recovered
//! at the record boundary and surfaced as a `translationErrors` entry
//! carrying the original record.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::attributes::{Attributes, map_attributes};
use crate::geometry::EsriPoint;
use crate::location::{ResolvedLocation, resolve_location};
use crate::sanitize::sanitize_record;

/// A fully normalized activity: projected geometry (when a location was
/// resolved) plus the flat attribute record. Serializes to the Esri
/// feature JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub geometry: Option<EsriPoint>,
    pub attributes: Attributes,
}

/// A per-record failure: the failure message, the full error chain, and
/// the offending raw record so callers can correlate it back to input.
#[derive(Debug, Serialize)]
pub struct TranslationError {
    pub message: String,
    pub detail: String,
    pub record: Value,
}

impl TranslationError {
    fn new(error: anyhow::Error, record: &Value) -> Self {
        TranslationError {
            message: error.to_string(),
            detail: format!("{error:?}"),
            record: record.clone(),
        }
    }
}

/// Batch-level options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Treat an exact (0, 0) coordinate pair as "no real location" and
    /// route the record to the unlocated list instead of normalizing it.
    pub exclude_null_islands: bool,
}

/// The three-way partition of an input batch. The lists are disjoint and
/// together cover every input record, each in input order.
#[derive(Debug, Default, Serialize)]
pub struct ParseOutput {
    pub normalized: Vec<NormalizedRecord>,
    pub unlocated: Vec<Value>,
    #[serde(rename = "translationErrors")]
    pub translation_errors: Vec<TranslationError>,
}

/// Normalizes a single record that already passed location resolution.
///
/// Sanitizes a private copy (the caller's record is never mutated), maps
/// the attributes, and projects the resolved coordinates. A record whose
/// location did not resolve still gets attributes and a null geometry.
pub fn transform_record(
    record: &Value,
    location: Option<&ResolvedLocation>,
) -> Result<NormalizedRecord> {
    let mut sanitized = record.clone();
    sanitize_record(&mut sanitized);

    let attributes = map_attributes(&sanitized, location)?;
    let geometry = location.map(|loc| EsriPoint::from_lon_lat(loc.longitude, loc.latitude));

    Ok(NormalizedRecord {
        geometry,
        attributes,
    })
}

/// Partitions a batch of raw records into normalized, unlocated and
/// failed-to-translate lists.
///
/// Records without any location representation are set aside verbatim
/// before the transform runs; only located records pay for sanitization
/// and mapping. No error escapes this call.
pub fn parse_records(records: &[Value], options: &ParseOptions) -> ParseOutput {
    let mut output = ParseOutput::default();

    for record in records {
        match resolve_location(record) {
            Err(error) => {
                warn!(error = %error, "Record location failed to parse");
                output
                    .translation_errors
                    .push(TranslationError::new(error, record));
            }
            Ok(None) => output.unlocated.push(record.clone()),
            Ok(Some(location)) => {
                if options.exclude_null_islands && location.is_null_island() {
                    warn!(
                        source = location.source.as_str(),
                        "Record resolved to null island, treating as unlocated"
                    );
                    output.unlocated.push(record.clone());
                    continue;
                }

                match transform_record(record, Some(&location)) {
                    Ok(normalized) => output.normalized.push(normalized),
                    Err(error) => {
                        warn!(error = %error, "Record translation failed");
                        output
                            .translation_errors
                            .push(TranslationError::new(error, record));
                    }
                }
            }
        }
    }

    output
}
