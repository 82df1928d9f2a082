//! Publication records.

use super::validation::{require_text, ValidationError};
use super::PublicationId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported publication formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationKind {
    Newspaper,
    Magazine,
}

impl PublicationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newspaper => "newspaper",
            Self::Magazine => "magazine",
        }
    }
}

impl FromStr for PublicationKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "newspaper" => Ok(Self::Newspaper),
            "magazine" => Ok(Self::Magazine),
            other => Err(ValidationError::InvalidPublicationKind(other.to_string())),
        }
    }
}

/// Persisted publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: PublicationId,
    pub title: String,
    /// Serialized as `type` to match the agency's external naming.
    #[serde(rename = "type")]
    pub kind: PublicationKind,
}

impl Publication {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

/// Input for creating a publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPublication {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PublicationKind,
}

impl NewPublication {
    pub fn new(title: impl Into<String>, kind: PublicationKind) -> Self {
        Self {
            title: title.into(),
            kind,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}
