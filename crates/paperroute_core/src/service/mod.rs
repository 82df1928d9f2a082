//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into agency use-cases.
//! - Own the assignment run that feeds the distributor and persists its plan.

pub mod assignment_service;
pub mod carrier_service;
pub mod subscription_service;
