//! Delivery address locations.

use super::coordinate::Coordinate;
use super::LocationId;
use serde::{Deserialize, Serialize};

/// Persisted location. Only the coordinate is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub position: Coordinate,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

/// Input for registering a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub position: Coordinate,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl NewLocation {
    pub fn at(position: Coordinate) -> Self {
        Self {
            position,
            address: None,
            city: None,
            postal_code: None,
        }
    }
}
