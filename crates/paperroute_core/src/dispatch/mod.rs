//! Delivery distribution across carriers.
//!
//! # Responsibility
//! - Rank deliveries by planar distance from each carrier.
//! - Partition one day's unassigned deliveries among active carriers.
//!
//! # Invariants
//! - Pure computation: no I/O, no logging, no mutation of inputs.
//! - Carrier input order decides who picks first and is never reordered.
//! - Within the primary pass a delivery lands in at most one allotment.

mod distance;
mod distributor;
mod plan;

pub use distance::euclidean_distance;
pub use distributor::{
    distribute, distribute_with_policy, Allotment, AllotmentPass, Positioned, RemainderPolicy,
};
pub use plan::DistributionPlan;
