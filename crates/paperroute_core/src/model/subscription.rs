//! Subscription records and lifecycle rules.
//!
//! # Invariants
//! - A customer holds at most one `pending` or `subscribed` row per
//!   publication; the service layer enforces this before inserting.
//! - Status changes take effect only after `NOTICE_PERIOD_DAYS` of notice,
//!   counted from `requested_change_date`.

use super::validation::ValidationError;
use super::{CustomerId, PublicationId, SubscriptionId};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Days of notice required before a subscribe/unsubscribe request applies.
pub const NOTICE_PERIOD_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Requested, waiting for the notice period to pass.
    Pending,
    Subscribed,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Subscribed => "subscribed",
            Self::Unsubscribed => "unsubscribed",
        }
    }

    /// Whether a row in this status blocks a new subscribe request.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Subscribed)
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "subscribed" => Ok(Self::Subscribed),
            "unsubscribed" => Ok(Self::Unsubscribed),
            other => Err(format!("unknown subscription status `{other}`")),
        }
    }
}

/// Persisted subscription of one customer to one publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub customer_id: CustomerId,
    pub publication_id: PublicationId,
    pub status: SubscriptionStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub requested_change_date: NaiveDate,
    pub change_approved: bool,
}

impl Subscription {
    /// Returns whether the subscription is still running on `today`.
    ///
    /// Open-ended subscriptions (`end_date = None`) are always active.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| end >= today)
    }

    /// Returns whether the notice period since the last requested change has
    /// fully elapsed on `today`.
    pub fn notice_elapsed(&self, today: NaiveDate) -> bool {
        today - self.requested_change_date >= Duration::days(NOTICE_PERIOD_DAYS)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => {
                Err(ValidationError::EndBeforeStart { start, end })
            }
            _ => Ok(()),
        }
    }
}

/// Input for recording a new subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub customer_id: CustomerId,
    pub publication_id: PublicationId,
    pub status: SubscriptionStatus,
    pub requested_change_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::{Subscription, SubscriptionStatus};
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn subscription(requested: &str) -> Subscription {
        Subscription {
            id: 1,
            customer_id: 1,
            publication_id: 1,
            status: SubscriptionStatus::Subscribed,
            start_date: None,
            end_date: None,
            requested_change_date: date(requested),
            change_approved: false,
        }
    }

    #[test]
    fn open_ended_subscription_is_active() {
        assert!(subscription("2026-01-01").is_active(date("2030-01-01")));
    }

    #[test]
    fn ended_subscription_is_active_through_end_date() {
        let mut sub = subscription("2026-01-01");
        sub.end_date = Some(date("2026-03-31"));
        assert!(sub.is_active(date("2026-03-31")));
        assert!(!sub.is_active(date("2026-04-01")));
    }

    #[test]
    fn notice_requires_a_full_week() {
        let sub = subscription("2026-03-01");
        assert!(!sub.notice_elapsed(date("2026-03-07")));
        assert!(sub.notice_elapsed(date("2026-03-08")));
    }

    #[test]
    fn end_before_start_fails_validation() {
        let mut sub = subscription("2026-03-01");
        sub.start_date = Some(date("2026-03-10"));
        sub.end_date = Some(date("2026-03-09"));
        assert!(sub.validate().is_err());
    }
}
