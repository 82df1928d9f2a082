//! Delivery assignment run.
//!
//! # Responsibility
//! - Load the active carriers and the unassigned deliveries of one date.
//! - Check run preconditions, split the quota and call the distributor.
//! - Persist every carrier binding of the run in one transaction.
//!
//! # Invariants
//! - Load, distribution and persistence share one `IMMEDIATE` transaction,
//!   so concurrent runs on the same database are serialized and work on a
//!   frozen snapshot.
//! - Any failure leaves the database untouched (transaction rolled back).
//! - Precondition failures are errors, never empty successful reports.

use crate::dispatch::{
    distribute_with_policy, AllotmentPass, DistributionPlan, Positioned, RemainderPolicy,
};
use crate::model::coordinate::Coordinate;
use crate::model::delivery::PendingDelivery;
use crate::model::{CarrierId, DeliveryId};
use crate::repo::carrier_repo::{CarrierListQuery, CarrierRepository, SqliteCarrierRepository};
use crate::repo::delivery_repo::{DeliveryRepository, SqliteDeliveryRepository};
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that stop an assignment run before anything is persisted.
#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("invalid delivery date `{0}`; expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("no active carriers available")]
    NoActiveCarriers,
    #[error("no unassigned deliveries for {date}")]
    NoUnassignedDeliveries { date: NaiveDate },
    #[error("delivery {0} has no linked location")]
    DeliveryWithoutLocation(DeliveryId),
    #[error("non-finite coordinate on {entity} {id}")]
    MalformedCoordinate { entity: &'static str, id: i64 },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<rusqlite::Error> for AssignmentError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Input for one assignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    /// Delivery date as `YYYY-MM-DD`.
    pub date: String,
    pub policy: RemainderPolicy,
    /// Compute and report the plan, then roll back instead of committing.
    pub dry_run: bool,
}

impl AssignmentRequest {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            policy: RemainderPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_policy(mut self, policy: RemainderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// One `(carrier, deliveries)` entry of a run, in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentEntry {
    pub carrier_id: CarrierId,
    pub pass: AllotmentPass,
    pub delivery_ids: Vec<DeliveryId>,
}

/// Outcome of an assignment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentReport {
    /// Correlates the run with its log events.
    pub run_id: Uuid,
    pub date: NaiveDate,
    pub policy: RemainderPolicy,
    pub plan: DistributionPlan,
    pub carrier_count: usize,
    pub delivery_count: usize,
    pub assigned_count: usize,
    /// Deliveries of the snapshot that no entry received.
    pub unplaced_delivery_ids: Vec<DeliveryId>,
    pub entries: Vec<AssignmentEntry>,
    /// `false` for dry runs.
    pub committed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DeliveryStop {
    id: DeliveryId,
    target: Coordinate,
}

impl Positioned for DeliveryStop {
    fn position(&self) -> Coordinate {
        self.target
    }
}

impl TryFrom<PendingDelivery> for DeliveryStop {
    type Error = AssignmentError;

    fn try_from(pending: PendingDelivery) -> Result<Self, Self::Error> {
        let target = pending
            .target
            .ok_or(AssignmentError::DeliveryWithoutLocation(pending.id))?;
        if !target.is_finite() {
            return Err(AssignmentError::MalformedCoordinate {
                entity: "delivery",
                id: pending.id,
            });
        }
        Ok(Self {
            id: pending.id,
            target,
        })
    }
}

/// Parses a delivery date in `YYYY-MM-DD` form.
pub fn parse_delivery_date(value: &str) -> Result<NaiveDate, AssignmentError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AssignmentError::InvalidDate(value.to_string()))
}

/// Assigns every unassigned delivery of `request.date` to an active carrier.
///
/// # Errors
/// - `InvalidDate` when the date is not `YYYY-MM-DD`.
/// - `NoActiveCarriers` / `NoUnassignedDeliveries` when there is nothing to
///   distribute.
/// - `DeliveryWithoutLocation` / `MalformedCoordinate` for unusable input.
/// - `Repo` for storage failures; nothing is persisted in that case.
///
/// # Side effects
/// - Emits `assign_run` logging events keyed by `run_id`.
pub fn assign_deliveries(
    conn: &mut Connection,
    request: &AssignmentRequest,
) -> Result<AssignmentReport, AssignmentError> {
    let started_at = Instant::now();
    let run_id = Uuid::new_v4();
    let date = parse_delivery_date(&request.date)?;
    info!(
        "event=assign_run module=assignment status=start run_id={run_id} date={date} policy={:?} dry_run={}",
        request.policy, request.dry_run
    );

    let result = run_assignment(conn, run_id, date, request);
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(report) => info!(
            "event=assign_run module=assignment status=ok run_id={run_id} carriers={} deliveries={} assigned={} committed={} duration_ms={duration_ms}",
            report.carrier_count, report.delivery_count, report.assigned_count, report.committed
        ),
        Err(AssignmentError::Repo(err)) => error!(
            "event=assign_run module=assignment status=error run_id={run_id} duration_ms={duration_ms} error={err}"
        ),
        Err(err) => warn!(
            "event=assign_run module=assignment status=rejected run_id={run_id} duration_ms={duration_ms} reason={err}"
        ),
    }
    result
}

fn run_assignment(
    conn: &mut Connection,
    run_id: Uuid,
    date: NaiveDate,
    request: &AssignmentRequest,
) -> Result<AssignmentReport, AssignmentError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let carrier_repo = SqliteCarrierRepository::try_new(&tx)?;
    let delivery_repo = SqliteDeliveryRepository::try_new(&tx)?;

    let carriers = carrier_repo.list_carriers(&CarrierListQuery { active_only: true })?;
    if carriers.is_empty() {
        return Err(AssignmentError::NoActiveCarriers);
    }

    let pending = delivery_repo.list_unassigned_for_date(date)?;
    if pending.is_empty() {
        return Err(AssignmentError::NoUnassignedDeliveries { date });
    }

    let stops = pending
        .into_iter()
        .map(DeliveryStop::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    for carrier in &carriers {
        if !carrier.position.is_finite() {
            return Err(AssignmentError::MalformedCoordinate {
                entity: "carrier",
                id: carrier.id,
            });
        }
        if carrier.position.is_origin() {
            warn!(
                "event=assign_carrier_at_origin module=assignment status=warn run_id={run_id} carrier_id={}",
                carrier.id
            );
        }
    }

    let plan = DistributionPlan::split(stops.len(), carriers.len())
        .ok_or(AssignmentError::NoActiveCarriers)?;
    let allotments = distribute_with_policy(
        &stops,
        &carriers,
        plan.per_carrier,
        plan.remaining,
        request.policy,
    );

    let entries: Vec<AssignmentEntry> = allotments
        .into_iter()
        .map(|allotment| AssignmentEntry {
            carrier_id: allotment.carrier.id,
            pass: allotment.pass,
            delivery_ids: allotment.deliveries.iter().map(|stop| stop.id).collect(),
        })
        .collect();
    let bindings: Vec<(DeliveryId, CarrierId)> = entries
        .iter()
        .flat_map(|entry| {
            entry
                .delivery_ids
                .iter()
                .map(move |&delivery_id| (delivery_id, entry.carrier_id))
        })
        .collect();
    let assigned_count = delivery_repo.assign_carriers(&bindings)?;

    let placed: HashSet<DeliveryId> = bindings
        .iter()
        .map(|&(delivery_id, _)| delivery_id)
        .collect();
    let unplaced_delivery_ids = stops
        .iter()
        .map(|stop| stop.id)
        .filter(|id| !placed.contains(id))
        .collect();

    if request.dry_run {
        tx.rollback()?;
    } else {
        tx.commit()?;
    }

    Ok(AssignmentReport {
        run_id,
        date,
        policy: request.policy,
        plan,
        carrier_count: carriers.len(),
        delivery_count: stops.len(),
        assigned_count,
        unplaced_delivery_ids,
        entries,
        committed: !request.dry_run,
    })
}
