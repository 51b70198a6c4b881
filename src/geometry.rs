//! Geographic-to-projected point conversion and the Esri JSON wire shape.

use serde::Serialize;
use std::f64::consts::FRAC_PI_4;

/// Spherical earth radius used by the Web Mercator projection, in meters.
const EARTH_RADIUS: f64 = 6378137.0;

/// Well-known id of the Web Mercator (Auxiliary Sphere) coordinate system.
const WEB_MERCATOR_WKID: u32 = 102100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

/// A projected point in the Esri JSON geometry format, ready to be posted
/// as the spatial component of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EsriPoint {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "spatialReference")]
    pub spatial_reference: SpatialReference,
}

impl EsriPoint {
    /// Projects a geographic (longitude, latitude) pair in degrees into
    /// Web Mercator meters.
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        let x = longitude.to_radians() * EARTH_RADIUS;
        let y = (FRAC_PI_4 + latitude.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;

        EsriPoint {
            x,
            y,
            spatial_reference: SpatialReference {
                wkid: WEB_MERCATOR_WKID,
            },
        }
    }
}
