//! Location resolution for Gnip activity records.
//!
//! An activity can carry its location in one of three mutually exclusive
//! shapes: a direct `geo` point, a `location` bounding box, or the actor's
//! self-asserted `gnip.profileLocations`. Resolution tries them in that
//! order and reports which one won.

use anyhow::{Context, Result};
use serde_json::Value;

/// Which of the three location representations produced the coordinates.
///
/// The variant name doubles as the value of the `location_source` output
/// attribute, matching the source sub-document's field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    PointGeo,
    BoundingBox,
    ProfileLocation,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSource::PointGeo => "geo",
            LocationSource::BoundingBox => "location",
            LocationSource::ProfileLocation => "profileLocations",
        }
    }
}

/// A resolved coordinate pair, always longitude-first, plus its source.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub longitude: f64,
    pub latitude: f64,
    pub source: LocationSource,
}

impl ResolvedLocation {
    /// `(0, 0)` is almost always a sensor default rather than a real
    /// position off the coast of West Africa.
    pub fn is_null_island(&self) -> bool {
        self.longitude == 0.0 && self.latitude == 0.0
    }
}

/// Extracts a single authoritative location from an activity record.
///
/// Resolution order, most precise first:
/// 1. top-level `geo` point — stored latitude-first upstream, so the pair
///    is swapped here;
/// 2. `location.geo` bounding box — centroid of the 4-point ring;
/// 3. first entry of `gnip.profileLocations` — already longitude-first.
///
/// Returns `Ok(None)` when no representation is present; that is a normal
/// outcome, not an error. Returns an error only when a representation is
/// present but its coordinates cannot be read.
pub fn resolve_location(record: &Value) -> Result<Option<ResolvedLocation>> {
    if let Some(geo) = present(record.get("geo")) {
        let pair = coordinate_pair(geo.get("coordinates"))
            .context("`geo` sub-document has an unreadable coordinate pair")?;
        // Upstream stores geo points [lat, lon], unlike everything else.
        return Ok(Some(ResolvedLocation {
            longitude: pair[1],
            latitude: pair[0],
            source: LocationSource::PointGeo,
        }));
    }

    if let Some(geo) = present(record.pointer("/location/geo")) {
        let (longitude, latitude) = bounding_box_centroid(geo)
            .context("`location.geo` sub-document has an unreadable bounding box")?;
        return Ok(Some(ResolvedLocation {
            longitude,
            latitude,
            source: LocationSource::BoundingBox,
        }));
    }

    if let Some(profiles) = record.pointer("/gnip/profileLocations").and_then(Value::as_array) {
        if let Some(geo) = profiles.first().and_then(|first| present(first.get("geo"))) {
            let pair = coordinate_pair(geo.get("coordinates"))
                .context("profile location has an unreadable coordinate pair")?;
            return Ok(Some(ResolvedLocation {
                longitude: pair[0],
                latitude: pair[1],
                source: LocationSource::ProfileLocation,
            }));
        }
    }

    Ok(None)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn coordinate_pair(value: Option<&Value>) -> Option<[f64; 2]> {
    let arr = value?.as_array()?;
    Some([arr.first()?.as_f64()?, arr.get(1)?.as_f64()?])
}

/// Centroid of a 4-point ring ordered bottom-left, top-left, top-right,
/// bottom-right: members 0 and 2 are opposite corners.
fn bounding_box_centroid(geo: &Value) -> Option<(f64, f64)> {
    let ring = geo.get("coordinates")?.get(0)?.as_array()?;
    let bottom_left = coordinate_pair(ring.first())?;
    let top_right = coordinate_pair(ring.get(2))?;
    Some((
        (bottom_left[0] + top_right[0]) / 2.0,
        (bottom_left[1] + top_right[1]) / 2.0,
    ))
}
