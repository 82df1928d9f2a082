//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per agency entity.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Write paths validate model input before SQL mutations.
//! - Repositories refuse connections whose schema is not fully migrated.
//! - Multi-statement writes join the caller's transaction when one is open
//!   and open their own `IMMEDIATE` transaction otherwise.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::coordinate::Coordinate;
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use thiserror::Error;

pub mod carrier_repo;
pub mod customer_repo;
pub mod delivery_repo;
pub mod location_repo;
pub mod publication_repo;
pub mod subscription_repo;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all agency repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    /// Connection schema is not at the expected migrated version.
    #[error("repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("repository requires column `{column}` in table `{table}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted to a valid model.
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Required table with the columns a repository reads or writes.
pub(crate) type TableSpec = (&'static str, &'static [&'static str]);

/// Verifies migration version and required tables/columns on `conn`.
pub(crate) fn ensure_schema_ready(conn: &Connection, tables: &[TableSpec]) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

/// Runs `work` atomically.
///
/// Joins the transaction already open on `conn`, or wraps `work` in a new
/// `IMMEDIATE` transaction that is rolled back when `work` fails.
pub(crate) fn in_write_tx<T>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> RepoResult<T>,
) -> RepoResult<T> {
    if !conn.is_autocommit() {
        return work(conn);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = work(&*tx)?;
    tx.commit()?;
    Ok(value)
}

/// Reads a coordinate pair, rejecting values SQLite stored as non-numbers.
pub(crate) fn read_coordinate(
    row: &Row<'_>,
    latitude_column: &'static str,
    longitude_column: &'static str,
) -> RepoResult<Coordinate> {
    Ok(Coordinate::new(
        read_degrees(row, latitude_column)?,
        read_degrees(row, longitude_column)?,
    ))
}

fn read_degrees(row: &Row<'_>, column: &'static str) -> RepoResult<f64> {
    match row.get_ref(column)? {
        ValueRef::Real(value) => Ok(value),
        ValueRef::Integer(value) => Ok(value as f64),
        ValueRef::Null => Err(RepoError::InvalidData(format!(
            "missing coordinate in column `{column}`"
        ))),
        ValueRef::Text(raw) => Err(RepoError::InvalidData(format!(
            "malformed coordinate `{}` in column `{column}`",
            String::from_utf8_lossy(raw)
        ))),
        ValueRef::Blob(_) => Err(RepoError::InvalidData(format!(
            "malformed coordinate blob in column `{column}`"
        ))),
    }
}

/// Reads a required `YYYY-MM-DD` date column.
pub(crate) fn read_date(row: &Row<'_>, column: &'static str) -> RepoResult<NaiveDate> {
    read_optional_date(row, column)?.ok_or_else(|| {
        RepoError::InvalidData(format!("missing date in column `{column}`"))
    })
}

/// Reads a nullable `YYYY-MM-DD` date column.
pub(crate) fn read_optional_date(
    row: &Row<'_>,
    column: &'static str,
) -> RepoResult<Option<NaiveDate>> {
    match row.get_ref(column)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(raw) => {
            let text = String::from_utf8_lossy(raw);
            NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map(Some)
                .map_err(|_| {
                    RepoError::InvalidData(format!(
                        "malformed date `{text}` in column `{column}`"
                    ))
                })
        }
        _ => Err(RepoError::InvalidData(format!(
            "non-text date in column `{column}`"
        ))),
    }
}

pub(crate) fn read_flag(row: &Row<'_>, column: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in column `{column}`"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
