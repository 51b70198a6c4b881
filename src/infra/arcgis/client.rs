use anyhow::{Result, bail};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::services::feature_service::{AddResult, FeatureService};
use esri_gnip::transform::NormalizedRecord;

/// Client for a single ArcGIS feature layer REST endpoint.
///
/// The URL must point at a layer (e.g. `.../FeatureServer/0`). Layer
/// metadata is fetched at connect time so a bad URL fails before any
/// records are processed.
pub struct ArcgisClient {
    url: String,
    token: Option<String>,
}

impl ArcgisClient {
    pub async fn connect(url: &str, token: Option<String>) -> Result<Self> {
        if url.is_empty() {
            bail!("a feature layer URL is required, e.g. https://.../FeatureServer/0");
        }

        let client = Self::http_client()?;

        let mut query: Vec<(&str, &str)> = vec![("f", "json")];
        if let Some(t) = &token {
            query.push(("token", t.as_str()));
        }

        let response = client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach feature layer: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Feature layer returned status {}: {}", status, body);
        }

        let metadata: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse layer metadata: {}", e))?;

        // ArcGIS reports errors with a 200 status and an `error` member.
        if let Some(error) = metadata.get("error") {
            bail!(
                "Feature layer rejected the connection: {}",
                error["message"].as_str().unwrap_or("unknown error")
            );
        }

        let layer_name = metadata["name"].as_str().unwrap_or("<unnamed>");
        let geometry_type = metadata["geometryType"].as_str().unwrap_or("");
        if geometry_type != "esriGeometryPoint" {
            warn!(
                layer = layer_name,
                geometry_type, "Target layer is not a point layer"
            );
        }

        info!(layer = layer_name, "Connected to feature layer");

        Ok(Self {
            url: url.to_string(),
            token,
        })
    }

    fn http_client() -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?)
    }
}

#[async_trait]
impl FeatureService for ArcgisClient {
    async fn add_features(&self, features: &[NormalizedRecord]) -> Result<Vec<AddResult>> {
        let payload = serde_json::to_string(features)?;

        let mut form: Vec<(&str, &str)> = vec![("f", "json"), ("features", payload.as_str())];
        if let Some(t) = &self.token {
            form.push(("token", t.as_str()));
        }

        let client = Self::http_client()?;
        let response = client
            .post(format!("{}/addFeatures", self.url))
            .form(&form)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send addFeatures request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("addFeatures failed with status {}: {}", status, body);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse addFeatures response: {}", e))?;

        if let Some(error) = json.get("error") {
            bail!(
                "addFeatures rejected: {}",
                error["message"].as_str().unwrap_or("unknown error")
            );
        }

        let results: Vec<AddResult> = serde_json::from_value(json["addResults"].clone())
            .map_err(|e| anyhow::anyhow!("Unexpected addResults shape: {}", e))?;

        Ok(results)
    }
}
