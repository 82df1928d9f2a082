//! Carrier repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Carrier positions default to `(0.0, 0.0)` when never reported.
//! - Listing is ordered by `id ASC`; assignment runs depend on this order.
//! - Deleting a carrier unassigns its deliveries (schema FK `SET NULL`).

use super::{
    bool_to_int, ensure_schema_ready, read_coordinate, read_flag, RepoError, RepoResult,
    TableSpec,
};
use crate::model::carrier::{Carrier, NewCarrier};
use crate::model::coordinate::Coordinate;
use crate::model::CarrierId;
use chrono::Utc;
use rusqlite::{params, Connection, Row};

const ENTITY: &str = "carrier";
const REQUIRED: &[TableSpec] = &[(
    "carriers",
    &[
        "id",
        "name",
        "vehicle_type",
        "vehicle_id",
        "phone",
        "hire_date",
        "is_active",
        "latitude",
        "longitude",
    ],
)];
const CARRIER_SELECT_SQL: &str = "SELECT
    id,
    name,
    vehicle_type,
    vehicle_id,
    phone,
    hire_date,
    is_active,
    latitude,
    longitude
FROM carriers";

/// Query options for listing carriers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarrierListQuery {
    /// Only return carriers with `is_active = 1`.
    pub active_only: bool,
}

/// Repository interface for carrier operations.
pub trait CarrierRepository {
    fn create_carrier(&self, carrier: &NewCarrier) -> RepoResult<Carrier>;
    fn get_carrier(&self, id: CarrierId) -> RepoResult<Option<Carrier>>;
    fn list_carriers(&self, query: &CarrierListQuery) -> RepoResult<Vec<Carrier>>;
    fn update_carrier(&self, carrier: &Carrier) -> RepoResult<()>;
    fn delete_carrier(&self, id: CarrierId) -> RepoResult<()>;
    fn set_active(&self, id: CarrierId, is_active: bool) -> RepoResult<()>;
    fn update_position(&self, id: CarrierId, position: Coordinate) -> RepoResult<()>;
}

/// SQLite-backed carrier repository.
pub struct SqliteCarrierRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCarrierRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED)?;
        Ok(Self { conn })
    }

    fn expect_changed(changed: usize, id: CarrierId) -> RepoResult<()> {
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }
}

impl CarrierRepository for SqliteCarrierRepository<'_> {
    fn create_carrier(&self, carrier: &NewCarrier) -> RepoResult<Carrier> {
        carrier.validate()?;

        self.conn.execute(
            "INSERT INTO carriers (
                name,
                vehicle_type,
                vehicle_id,
                phone,
                hire_date,
                is_active,
                latitude,
                longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                carrier.name.trim(),
                carrier.vehicle_type.as_deref(),
                carrier.vehicle_id.as_deref(),
                carrier.phone.as_deref(),
                Utc::now().naive_utc(),
                bool_to_int(carrier.is_active),
                carrier.position.latitude,
                carrier.position.longitude,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_carrier(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("carrier {id} missing after insert read-back"))
        })
    }

    fn get_carrier(&self, id: CarrierId) -> RepoResult<Option<Carrier>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CARRIER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_carrier_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_carriers(&self, query: &CarrierListQuery) -> RepoResult<Vec<Carrier>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CARRIER_SELECT_SQL}
             WHERE (?1 = 0 OR is_active = 1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(query.active_only)])?;
        let mut carriers = Vec::new();
        while let Some(row) = rows.next()? {
            carriers.push(parse_carrier_row(row)?);
        }
        Ok(carriers)
    }

    fn update_carrier(&self, carrier: &Carrier) -> RepoResult<()> {
        carrier.validate()?;

        let changed = self.conn.execute(
            "UPDATE carriers
             SET
                name = ?1,
                vehicle_type = ?2,
                vehicle_id = ?3,
                phone = ?4,
                is_active = ?5,
                latitude = ?6,
                longitude = ?7
             WHERE id = ?8;",
            params![
                carrier.name.trim(),
                carrier.vehicle_type.as_deref(),
                carrier.vehicle_id.as_deref(),
                carrier.phone.as_deref(),
                bool_to_int(carrier.is_active),
                carrier.position.latitude,
                carrier.position.longitude,
                carrier.id,
            ],
        )?;
        Self::expect_changed(changed, carrier.id)
    }

    fn delete_carrier(&self, id: CarrierId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM carriers WHERE id = ?1;", [id])?;
        Self::expect_changed(changed, id)
    }

    fn set_active(&self, id: CarrierId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE carriers SET is_active = ?1 WHERE id = ?2;",
            params![bool_to_int(is_active), id],
        )?;
        Self::expect_changed(changed, id)
    }

    fn update_position(&self, id: CarrierId, position: Coordinate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE carriers SET latitude = ?1, longitude = ?2 WHERE id = ?3;",
            params![position.latitude, position.longitude, id],
        )?;
        Self::expect_changed(changed, id)
    }
}

fn parse_carrier_row(row: &Row<'_>) -> RepoResult<Carrier> {
    Ok(Carrier {
        id: row.get("id")?,
        name: row.get("name")?,
        vehicle_type: row.get("vehicle_type")?,
        vehicle_id: row.get("vehicle_id")?,
        phone: row.get("phone")?,
        hire_date: row.get("hire_date")?,
        is_active: read_flag(row, "is_active")?,
        position: read_coordinate(row, "latitude", "longitude")?,
    })
}
