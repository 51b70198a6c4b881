use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::location::LocationSource;
use crate::transform::ParseOutput;

/// Summary counters for one processed batch, appended as one CSV row per
/// run so successive batches can be compared.
#[derive(Debug, Default, Serialize)]
pub struct BatchStats {
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub total_records: usize,

    // partition outcome
    pub normalized: usize,
    pub unlocated: usize,
    pub translation_errors: usize,

    // which representation located the normalized records
    pub from_geo: usize,
    pub from_bounding_box: usize,
    pub from_profile_locations: usize,
}

impl BatchStats {
    pub fn from_output(output: &ParseOutput) -> Self {
        let mut s = BatchStats {
            timestamp: Utc::now(),
            source: None,
            total_records: output.normalized.len()
                + output.unlocated.len()
                + output.translation_errors.len(),
            normalized: output.normalized.len(),
            unlocated: output.unlocated.len(),
            translation_errors: output.translation_errors.len(),
            from_geo: 0,
            from_bounding_box: 0,
            from_profile_locations: 0,
        };

        for record in &output.normalized {
            match record.attributes.location_source.as_deref() {
                Some(tag) if tag == LocationSource::PointGeo.as_str() => s.from_geo += 1,
                Some(tag) if tag == LocationSource::BoundingBox.as_str() => {
                    s.from_bounding_box += 1
                }
                Some(tag) if tag == LocationSource::ProfileLocation.as_str() => {
                    s.from_profile_locations += 1
                }
                _ => {}
            }
        }

        s
    }

    /// Record where the batch came from (file path or URL).
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn located_pct(&self) -> f64 {
        Self::pct(self.normalized, self.total_records)
    }
}
