//! Delivery assignment records.
//!
//! # Invariants
//! - `location_ids` keeps link order; the first entry is the delivery target
//!   used by the distributor.
//! - `carrier_id` stays `None` until an assignment run (or an explicit
//!   update) binds the delivery to a carrier.

use super::coordinate::Coordinate;
use super::{CarrierId, DeliveryId, LocationId, PublicationId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted delivery with its linked locations and publications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub carrier_id: Option<CarrierId>,
    pub date: NaiveDate,
    pub address: Option<String>,
    pub location_ids: Vec<LocationId>,
    pub publication_ids: Vec<PublicationId>,
}

impl Delivery {
    pub fn is_assigned(&self) -> bool {
        self.carrier_id.is_some()
    }
}

/// Input for scheduling a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDelivery {
    pub date: NaiveDate,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub carrier_id: Option<CarrierId>,
    #[serde(default)]
    pub location_ids: Vec<LocationId>,
    #[serde(default)]
    pub publication_ids: Vec<PublicationId>,
}

impl NewDelivery {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            address: None,
            carrier_id: None,
            location_ids: Vec::new(),
            publication_ids: Vec::new(),
        }
    }

    pub fn with_locations(mut self, location_ids: impl IntoIterator<Item = LocationId>) -> Self {
        self.location_ids = location_ids.into_iter().collect();
        self
    }

    pub fn with_publications(
        mut self,
        publication_ids: impl IntoIterator<Item = PublicationId>,
    ) -> Self {
        self.publication_ids = publication_ids.into_iter().collect();
        self
    }
}

/// Read model for one unassigned delivery of a date.
///
/// `target` is the coordinate of the first linked location, `None` when the
/// delivery has no location linked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDelivery {
    pub id: DeliveryId,
    pub target: Option<Coordinate>,
}
