//! Agency domain model.
//!
//! # Responsibility
//! - Define the records stored for customers, publications, subscriptions,
//!   carriers, locations and deliveries.
//! - Keep field-level validation next to the records it guards.
//!
//! # Invariants
//! - Identifiers are SQLite row ids and are never reused by this crate.
//! - `New*` input types are validated before any SQL mutation.

pub mod carrier;
pub mod coordinate;
pub mod customer;
pub mod delivery;
pub mod location;
pub mod publication;
pub mod subscription;
pub mod validation;

pub type CustomerId = i64;
pub type PublicationId = i64;
pub type SubscriptionId = i64;
pub type CarrierId = i64;
pub type LocationId = i64;
pub type DeliveryId = i64;
