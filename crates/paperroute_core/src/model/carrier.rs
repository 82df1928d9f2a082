//! Carrier (delivery person) records.

use super::coordinate::Coordinate;
use super::validation::{require_text, validate_phone, ValidationError};
use super::CarrierId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Persisted carrier.
///
/// `position` is the last reported location, `Coordinate::ORIGIN` when it
/// was never set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    pub id: CarrierId,
    pub name: String,
    pub vehicle_type: Option<String>,
    pub vehicle_id: Option<String>,
    pub phone: Option<String>,
    pub hire_date: NaiveDateTime,
    pub is_active: bool,
    pub position: Coordinate,
}

impl Carrier {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        validate_phone(self.phone.as_deref())
    }
}

/// Input for hiring a carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCarrier {
    pub name: String,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub position: Coordinate,
}

impl NewCarrier {
    /// Creates an active carrier input with no vehicle and origin position.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vehicle_type: None,
            vehicle_id: None,
            phone: None,
            is_active: true,
            position: Coordinate::ORIGIN,
        }
    }

    pub fn at(mut self, position: Coordinate) -> Self {
        self.position = position;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        validate_phone(self.phone.as_deref())
    }
}

fn default_active() -> bool {
    true
}
