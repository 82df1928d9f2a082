//! Subscription use-case service.
//!
//! # Responsibility
//! - Run the subscribe / unsubscribe workflow with its notice period.
//! - Promote pending requests once their notice period has passed.
//!
//! # Invariants
//! - Callers pass `today` explicitly; the service never reads the clock.
//! - A pair with a `pending` or `subscribed` row cannot subscribe again.
//! - Unsubscribing requires `NOTICE_PERIOD_DAYS` since the last requested
//!   change.

use crate::model::subscription::{
    NewSubscription, Subscription, SubscriptionStatus, NOTICE_PERIOD_DAYS,
};
use crate::model::{CustomerId, PublicationId, SubscriptionId};
use crate::repo::subscription_repo::{SubscriptionListQuery, SubscriptionRepository};
use crate::repo::RepoError;
use chrono::{Duration, NaiveDate};
use log::info;
use thiserror::Error;

/// Errors from subscription service operations.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("customer not found: {0}")]
    CustomerNotFound(CustomerId),
    #[error("publication not found: {0}")]
    PublicationNotFound(PublicationId),
    #[error("subscription not found: {0}")]
    SubscriptionNotFound(SubscriptionId),
    #[error("customer {customer_id} is already subscribed to publication {publication_id} or the subscription is pending")]
    AlreadySubscribed {
        customer_id: CustomerId,
        publication_id: PublicationId,
    },
    #[error("customer {customer_id} is not subscribed to publication {publication_id} or the subscription is still pending")]
    NotSubscribed {
        customer_id: CustomerId,
        publication_id: PublicationId,
    },
    /// Less than one week since the last requested change.
    #[error("at least one week's notice is required; earliest change date is {earliest}")]
    NoticePeriodNotElapsed { earliest: NaiveDate },
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for SubscriptionError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::SubscriptionNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Subscription service facade over repository implementations.
pub struct SubscriptionService<R: SubscriptionRepository> {
    repo: R,
}

impl<R: SubscriptionRepository> SubscriptionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records a pending subscription request effective after the notice
    /// period.
    pub fn subscribe(
        &self,
        customer_id: CustomerId,
        publication_id: PublicationId,
        today: NaiveDate,
    ) -> Result<Subscription, SubscriptionError> {
        if !self.repo.customer_exists(customer_id)? {
            return Err(SubscriptionError::CustomerNotFound(customer_id));
        }
        if !self.repo.publication_exists(publication_id)? {
            return Err(SubscriptionError::PublicationNotFound(publication_id));
        }

        let existing = self.repo.find_for_pair(customer_id, publication_id, None)?;
        if existing.is_some_and(|subscription| subscription.status.is_open()) {
            return Err(SubscriptionError::AlreadySubscribed {
                customer_id,
                publication_id,
            });
        }

        let created = self.repo.create_subscription(&NewSubscription {
            customer_id,
            publication_id,
            status: SubscriptionStatus::Pending,
            requested_change_date: today,
        })?;
        info!(
            "event=subscription_request module=service status=ok subscription_id={} customer_id={} publication_id={}",
            created.id, customer_id, publication_id
        );
        Ok(created)
    }

    /// Confirms an unsubscribe for an active subscription.
    pub fn unsubscribe(
        &self,
        customer_id: CustomerId,
        publication_id: PublicationId,
        today: NaiveDate,
    ) -> Result<Subscription, SubscriptionError> {
        let mut subscription = self
            .repo
            .find_for_pair(
                customer_id,
                publication_id,
                Some(SubscriptionStatus::Subscribed),
            )?
            .ok_or(SubscriptionError::NotSubscribed {
                customer_id,
                publication_id,
            })?;

        if !subscription.notice_elapsed(today) {
            return Err(SubscriptionError::NoticePeriodNotElapsed {
                earliest: subscription.requested_change_date + Duration::days(NOTICE_PERIOD_DAYS),
            });
        }

        subscription.status = SubscriptionStatus::Unsubscribed;
        subscription.change_approved = true;
        self.repo.update_subscription(&subscription)?;
        info!(
            "event=subscription_cancel module=service status=ok subscription_id={}",
            subscription.id
        );
        Ok(subscription)
    }

    /// Promotes every pending request whose notice period has elapsed.
    ///
    /// The start date is the first day after the notice period, not `today`.
    pub fn confirm_due(&self, today: NaiveDate) -> Result<Vec<Subscription>, SubscriptionError> {
        let pending = self.repo.list_subscriptions(&SubscriptionListQuery {
            status: Some(SubscriptionStatus::Pending),
            ..SubscriptionListQuery::default()
        })?;

        let mut confirmed = Vec::new();
        for mut subscription in pending {
            if !subscription.notice_elapsed(today) {
                continue;
            }
            subscription.status = SubscriptionStatus::Subscribed;
            subscription.change_approved = true;
            subscription.start_date = Some(
                subscription.requested_change_date + Duration::days(NOTICE_PERIOD_DAYS),
            );
            self.repo.update_subscription(&subscription)?;
            confirmed.push(subscription);
        }

        info!(
            "event=subscription_confirm module=service status=ok confirmed={}",
            confirmed.len()
        );
        Ok(confirmed)
    }

    pub fn set_end_date(
        &self,
        id: SubscriptionId,
        end_date: NaiveDate,
    ) -> Result<Subscription, SubscriptionError> {
        let mut subscription = self.get(id)?;
        subscription.end_date = Some(end_date);
        self.repo.update_subscription(&subscription)?;
        Ok(subscription)
    }

    pub fn get(&self, id: SubscriptionId) -> Result<Subscription, SubscriptionError> {
        self.repo
            .get_subscription(id)?
            .ok_or(SubscriptionError::SubscriptionNotFound(id))
    }

    pub fn list(
        &self,
        query: &SubscriptionListQuery,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        Ok(self.repo.list_subscriptions(query)?)
    }

    /// Hard-deletes a subscription row regardless of status.
    pub fn remove(&self, id: SubscriptionId) -> Result<(), SubscriptionError> {
        self.repo.delete_subscription(id)?;
        Ok(())
    }
}
