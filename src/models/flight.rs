//! Airport reference data and distance brackets for EU261 calculations.

use serde::{Deserialize, Serialize};

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, -90 to 90.
    pub latitude: f64,
    /// Longitude, -180 to 180.
    pub longitude: f64,
}

/// An airport from the reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA code (e.g., "OTP").
    pub iata: String,
    /// Display name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Whether the airport lies in an EU member state.
    #[serde(default)]
    pub eu_member: bool,
}

impl Airport {
    /// Returns the airport's coordinates.
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// EU261 distance bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBracket {
    /// Under the short-haul limit (1500 km).
    ShortHaul,
    /// From the short-haul limit up to the medium-haul limit (3500 km).
    MediumHaul,
    /// Beyond the medium-haul limit.
    LongHaul,
}

impl DistanceBracket {
    /// Every bracket, in ascending distance order.
    pub const ALL: [DistanceBracket; 3] = [
        DistanceBracket::ShortHaul,
        DistanceBracket::MediumHaul,
        DistanceBracket::LongHaul,
    ];
}
