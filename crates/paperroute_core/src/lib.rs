//! Core domain logic for the paperroute newspaper agency backend.
//! This crate owns the persistence layer, the agency use-cases, and the
//! nearest-neighbor delivery distributor.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AgencyConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use dispatch::{
    distribute, distribute_with_policy, euclidean_distance, Allotment, AllotmentPass,
    DistributionPlan, Positioned, RemainderPolicy,
};
pub use logging::{
    default_log_level, flush_logging, init_logging, logging_status, LogSink, LoggingError,
};
pub use model::carrier::{Carrier, NewCarrier};
pub use model::coordinate::Coordinate;
pub use model::customer::{Customer, NewCustomer};
pub use model::delivery::{Delivery, NewDelivery, PendingDelivery};
pub use model::location::{Location, NewLocation};
pub use model::publication::{NewPublication, Publication, PublicationKind};
pub use model::subscription::{NewSubscription, Subscription, SubscriptionStatus};
pub use model::validation::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::assignment_service::{
    assign_deliveries, AssignmentEntry, AssignmentError, AssignmentReport, AssignmentRequest,
};
pub use service::carrier_service::{CarrierService, CarrierServiceError};
pub use service::subscription_service::{SubscriptionError, SubscriptionService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
