//! Subscription repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Pair lookups return the most recent row (`id DESC`) for the pair.
//! - Dates are stored as ISO `YYYY-MM-DD` text.

use super::{
    bool_to_int, ensure_schema_ready, read_date, read_flag, read_optional_date, RepoError,
    RepoResult, TableSpec,
};
use crate::model::subscription::{NewSubscription, Subscription, SubscriptionStatus};
use crate::model::{CustomerId, PublicationId, SubscriptionId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ENTITY: &str = "subscription";
const REQUIRED: &[TableSpec] = &[
    (
        "subscriptions",
        &[
            "id",
            "customer_id",
            "publication_id",
            "status",
            "start_date",
            "end_date",
            "requested_change_date",
            "change_approved",
        ],
    ),
    ("customers", &["id"]),
    ("publications", &["id"]),
];
const SUBSCRIPTION_SELECT_SQL: &str = "SELECT
    id,
    customer_id,
    publication_id,
    status,
    start_date,
    end_date,
    requested_change_date,
    change_approved
FROM subscriptions";

/// Query options for listing subscriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionListQuery {
    pub customer_id: Option<CustomerId>,
    pub status: Option<SubscriptionStatus>,
}

/// Repository interface for subscription operations.
pub trait SubscriptionRepository {
    fn create_subscription(&self, subscription: &NewSubscription) -> RepoResult<Subscription>;
    fn get_subscription(&self, id: SubscriptionId) -> RepoResult<Option<Subscription>>;
    fn list_subscriptions(&self, query: &SubscriptionListQuery) -> RepoResult<Vec<Subscription>>;
    /// Latest subscription for the pair, optionally restricted to one status.
    fn find_for_pair(
        &self,
        customer_id: CustomerId,
        publication_id: PublicationId,
        status: Option<SubscriptionStatus>,
    ) -> RepoResult<Option<Subscription>>;
    fn update_subscription(&self, subscription: &Subscription) -> RepoResult<()>;
    fn delete_subscription(&self, id: SubscriptionId) -> RepoResult<()>;
    fn customer_exists(&self, id: CustomerId) -> RepoResult<bool>;
    fn publication_exists(&self, id: PublicationId) -> RepoResult<bool>;
}

/// SQLite-backed subscription repository.
pub struct SqliteSubscriptionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubscriptionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED)?;
        Ok(Self { conn })
    }

    fn query_subscriptions(&self, sql: &str, bind: Vec<Value>) -> RepoResult<Vec<Subscription>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind))?;
        let mut subscriptions = Vec::new();
        while let Some(row) = rows.next()? {
            subscriptions.push(parse_subscription_row(row)?);
        }
        Ok(subscriptions)
    }

    fn exists(&self, table: &str, id: i64) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl SubscriptionRepository for SqliteSubscriptionRepository<'_> {
    fn create_subscription(&self, subscription: &NewSubscription) -> RepoResult<Subscription> {
        self.conn.execute(
            "INSERT INTO subscriptions (
                customer_id,
                publication_id,
                status,
                requested_change_date,
                change_approved
            ) VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                subscription.customer_id,
                subscription.publication_id,
                subscription.status.as_str(),
                subscription.requested_change_date,
            ],
        )?;

        Ok(Subscription {
            id: self.conn.last_insert_rowid(),
            customer_id: subscription.customer_id,
            publication_id: subscription.publication_id,
            status: subscription.status,
            start_date: None,
            end_date: None,
            requested_change_date: subscription.requested_change_date,
            change_approved: false,
        })
    }

    fn get_subscription(&self, id: SubscriptionId) -> RepoResult<Option<Subscription>> {
        let found = self.query_subscriptions(
            &format!("{SUBSCRIPTION_SELECT_SQL} WHERE id = ?;"),
            vec![Value::Integer(id)],
        )?;
        Ok(found.into_iter().next())
    }

    fn list_subscriptions(&self, query: &SubscriptionListQuery) -> RepoResult<Vec<Subscription>> {
        let mut sql = format!("{SUBSCRIPTION_SELECT_SQL} WHERE 1 = 1");
        let mut bind = Vec::new();

        if let Some(customer_id) = query.customer_id {
            sql.push_str(" AND customer_id = ?");
            bind.push(Value::Integer(customer_id));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY id ASC;");

        self.query_subscriptions(&sql, bind)
    }

    fn find_for_pair(
        &self,
        customer_id: CustomerId,
        publication_id: PublicationId,
        status: Option<SubscriptionStatus>,
    ) -> RepoResult<Option<Subscription>> {
        let mut sql = format!(
            "{SUBSCRIPTION_SELECT_SQL} WHERE customer_id = ? AND publication_id = ?"
        );
        let mut bind = vec![Value::Integer(customer_id), Value::Integer(publication_id)];
        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            bind.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY id DESC LIMIT 1;");

        Ok(self.query_subscriptions(&sql, bind)?.into_iter().next())
    }

    fn update_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        subscription.validate()?;

        let changed = self.conn.execute(
            "UPDATE subscriptions
             SET
                status = ?1,
                start_date = ?2,
                end_date = ?3,
                requested_change_date = ?4,
                change_approved = ?5
             WHERE id = ?6;",
            params![
                subscription.status.as_str(),
                subscription.start_date,
                subscription.end_date,
                subscription.requested_change_date,
                bool_to_int(subscription.change_approved),
                subscription.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: subscription.id,
            });
        }
        Ok(())
    }

    fn delete_subscription(&self, id: SubscriptionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subscriptions WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn customer_exists(&self, id: CustomerId) -> RepoResult<bool> {
        self.exists("customers", id)
    }

    fn publication_exists(&self, id: PublicationId) -> RepoResult<bool> {
        self.exists("publications", id)
    }
}

fn parse_subscription_row(row: &Row<'_>) -> RepoResult<Subscription> {
    let status_text: String = row.get("status")?;
    let status = status_text
        .parse::<SubscriptionStatus>()
        .map_err(RepoError::InvalidData)?;

    Ok(Subscription {
        id: row.get("id")?,
        customer_id: row.get("customer_id")?,
        publication_id: row.get("publication_id")?,
        status,
        start_date: read_optional_date(row, "start_date")?,
        end_date: read_optional_date(row, "end_date")?,
        requested_change_date: read_date(row, "requested_change_date")?,
        change_approved: read_flag(row, "change_approved")?,
    })
}
