//! Trait and types for posting normalized records to a feature layer.

use anyhow::Result;
use esri_gnip::transform::NormalizedRecord;
use serde::Deserialize;

/// Outcome of adding one feature, as reported by the target service.
#[derive(Debug, Clone, Deserialize)]
pub struct AddResult {
    #[serde(rename = "objectId")]
    pub object_id: Option<i64>,
    pub success: bool,
    pub error: Option<AddError>,
}

/// Service-side error detail for a rejected feature.
#[derive(Debug, Clone, Deserialize)]
pub struct AddError {
    pub code: i64,
    pub description: String,
}

/// Abstraction over the outbound feature store (e.g., an ArcGIS feature
/// layer). The core pipeline never talks to it directly; the CLI hands it
/// the normalized partition after a batch completes.
#[async_trait::async_trait]
pub trait FeatureService {
    /// Posts a batch of normalized records, returning one result per
    /// submitted feature in submission order.
    async fn add_features(&self, features: &[NormalizedRecord]) -> Result<Vec<AddResult>>;
}
