//! Customer records.

use super::validation::{require_text, validate_phone, ValidationError};
use super::CustomerId;
use serde::{Deserialize, Serialize};

/// Persisted customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

impl Customer {
    /// Validates mutable fields before an update is written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("address", &self.address)?;
        validate_phone(self.phone.as_deref())
    }
}

/// Input for creating a customer. Name and address are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("address", &self.address)?;
        validate_phone(self.phone.as_deref())
    }
}
