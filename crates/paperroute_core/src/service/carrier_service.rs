//! Carrier use-case service.
//!
//! # Responsibility
//! - Hire, update, activate/deactivate and relocate carriers.
//! - Translate repository not-found errors into carrier-level errors.

use crate::model::carrier::{Carrier, NewCarrier};
use crate::model::coordinate::Coordinate;
use crate::model::CarrierId;
use crate::repo::carrier_repo::{CarrierListQuery, CarrierRepository};
use crate::repo::RepoError;
use log::info;
use thiserror::Error;

/// Errors from carrier service operations.
#[derive(Debug, Error)]
pub enum CarrierServiceError {
    #[error("carrier not found: {0}")]
    CarrierNotFound(CarrierId),
    /// Location update without both coordinates.
    #[error("latitude and longitude are required")]
    MissingCoordinate,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for CarrierServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::CarrierNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Carrier service facade over repository implementations.
pub struct CarrierService<R: CarrierRepository> {
    repo: R,
}

impl<R: CarrierRepository> CarrierService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn hire(&self, carrier: &NewCarrier) -> Result<Carrier, CarrierServiceError> {
        let created = self.repo.create_carrier(carrier)?;
        info!(
            "event=carrier_hire module=service status=ok carrier_id={} active={}",
            created.id, created.is_active
        );
        Ok(created)
    }

    pub fn get(&self, id: CarrierId) -> Result<Carrier, CarrierServiceError> {
        self.repo
            .get_carrier(id)?
            .ok_or(CarrierServiceError::CarrierNotFound(id))
    }

    pub fn list(&self, active_only: bool) -> Result<Vec<Carrier>, CarrierServiceError> {
        Ok(self.repo.list_carriers(&CarrierListQuery { active_only })?)
    }

    pub fn update(&self, carrier: &Carrier) -> Result<Carrier, CarrierServiceError> {
        self.repo.update_carrier(carrier)?;
        self.get(carrier.id)
    }

    pub fn remove(&self, id: CarrierId) -> Result<(), CarrierServiceError> {
        self.repo.delete_carrier(id)?;
        info!("event=carrier_remove module=service status=ok carrier_id={id}");
        Ok(())
    }

    pub fn activate(&self, id: CarrierId) -> Result<Carrier, CarrierServiceError> {
        self.set_active(id, true)
    }

    pub fn deactivate(&self, id: CarrierId) -> Result<Carrier, CarrierServiceError> {
        self.set_active(id, false)
    }

    /// Records a carrier's reported position.
    ///
    /// Both components are required; partial updates are rejected rather
    /// than defaulted.
    pub fn update_location(
        &self,
        id: CarrierId,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Carrier, CarrierServiceError> {
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Err(CarrierServiceError::MissingCoordinate);
        };
        self.repo
            .update_position(id, Coordinate::new(latitude, longitude))?;
        self.get(id)
    }

    fn set_active(&self, id: CarrierId, is_active: bool) -> Result<Carrier, CarrierServiceError> {
        self.repo.set_active(id, is_active)?;
        info!(
            "event=carrier_set_active module=service status=ok carrier_id={id} active={is_active}"
        );
        self.get(id)
    }
}
