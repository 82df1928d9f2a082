//! Delivery repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `deliveries` plus its location/publication link tables.
//! - Provide the unassigned-delivery snapshot consumed by assignment runs.
//! - Persist an assignment plan as one atomic write.
//!
//! # Invariants
//! - Location links keep insertion order in `delivery_locations.position`.
//! - `assign_carriers` only binds deliveries that are still unassigned; one
//!   conflicting row fails the whole batch.

use super::{
    ensure_schema_ready, in_write_tx, read_coordinate, read_date, RepoError, RepoResult,
    TableSpec,
};
use crate::model::delivery::{Delivery, NewDelivery, PendingDelivery};
use crate::model::{CarrierId, DeliveryId, LocationId, PublicationId};
use chrono::NaiveDate;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};

const ENTITY: &str = "delivery";
const REQUIRED: &[TableSpec] = &[
    ("deliveries", &["id", "carrier_id", "date", "address"]),
    (
        "delivery_locations",
        &["delivery_id", "location_id", "position"],
    ),
    ("delivery_publications", &["delivery_id", "publication_id"]),
    ("locations", &["id", "latitude", "longitude"]),
];
const DELIVERY_SELECT_SQL: &str = "SELECT id, carrier_id, date, address FROM deliveries";

/// Query options for listing deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryListQuery {
    pub date: Option<NaiveDate>,
    pub carrier_id: Option<CarrierId>,
    pub unassigned_only: bool,
}

/// Repository interface for delivery operations.
pub trait DeliveryRepository {
    fn create_delivery(&self, delivery: &NewDelivery) -> RepoResult<Delivery>;
    fn get_delivery(&self, id: DeliveryId) -> RepoResult<Option<Delivery>>;
    fn list_deliveries(&self, query: &DeliveryListQuery) -> RepoResult<Vec<Delivery>>;
    /// Rewrites the delivery row and replaces both link sets.
    fn update_delivery(&self, delivery: &Delivery) -> RepoResult<()>;
    fn delete_delivery(&self, id: DeliveryId) -> RepoResult<()>;
    /// Unassigned deliveries for `date` in `id ASC` order, each with the
    /// coordinate of its first linked location.
    fn list_unassigned_for_date(&self, date: NaiveDate) -> RepoResult<Vec<PendingDelivery>>;
    /// Binds each delivery to its carrier; returns the number of rows bound.
    fn assign_carriers(&self, assignments: &[(DeliveryId, CarrierId)]) -> RepoResult<usize>;
}

/// SQLite-backed delivery repository.
pub struct SqliteDeliveryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeliveryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED)?;
        Ok(Self { conn })
    }
}

impl DeliveryRepository for SqliteDeliveryRepository<'_> {
    fn create_delivery(&self, delivery: &NewDelivery) -> RepoResult<Delivery> {
        in_write_tx(self.conn, |conn| {
            conn.execute(
                "INSERT INTO deliveries (carrier_id, date, address) VALUES (?1, ?2, ?3);",
                params![delivery.carrier_id, delivery.date, delivery.address.as_deref()],
            )?;
            let id = conn.last_insert_rowid();
            write_links(conn, id, &delivery.location_ids, &delivery.publication_ids)?;

            Ok(Delivery {
                id,
                carrier_id: delivery.carrier_id,
                date: delivery.date,
                address: delivery.address.clone(),
                location_ids: delivery.location_ids.clone(),
                publication_ids: delivery.publication_ids.clone(),
            })
        })
    }

    fn get_delivery(&self, id: DeliveryId) -> RepoResult<Option<Delivery>> {
        let mut found = query_deliveries(
            self.conn,
            &format!("{DELIVERY_SELECT_SQL} WHERE id = ?;"),
            vec![Value::Integer(id)],
        )?;
        Ok(found.pop())
    }

    fn list_deliveries(&self, query: &DeliveryListQuery) -> RepoResult<Vec<Delivery>> {
        let mut sql = format!("{DELIVERY_SELECT_SQL} WHERE 1 = 1");
        let mut bind = Vec::new();

        if let Some(date) = query.date {
            sql.push_str(" AND date = ?");
            bind.push(Value::Text(date.format("%Y-%m-%d").to_string()));
        }
        if let Some(carrier_id) = query.carrier_id {
            sql.push_str(" AND carrier_id = ?");
            bind.push(Value::Integer(carrier_id));
        }
        if query.unassigned_only {
            sql.push_str(" AND carrier_id IS NULL");
        }
        sql.push_str(" ORDER BY date ASC, id ASC;");

        query_deliveries(self.conn, &sql, bind)
    }

    fn update_delivery(&self, delivery: &Delivery) -> RepoResult<()> {
        in_write_tx(self.conn, |conn| {
            let changed = conn.execute(
                "UPDATE deliveries SET carrier_id = ?1, date = ?2, address = ?3 WHERE id = ?4;",
                params![
                    delivery.carrier_id,
                    delivery.date,
                    delivery.address.as_deref(),
                    delivery.id
                ],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: ENTITY,
                    id: delivery.id,
                });
            }

            conn.execute(
                "DELETE FROM delivery_locations WHERE delivery_id = ?1;",
                [delivery.id],
            )?;
            conn.execute(
                "DELETE FROM delivery_publications WHERE delivery_id = ?1;",
                [delivery.id],
            )?;
            write_links(
                conn,
                delivery.id,
                &delivery.location_ids,
                &delivery.publication_ids,
            )
        })
    }

    fn delete_delivery(&self, id: DeliveryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM deliveries WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn list_unassigned_for_date(&self, date: NaiveDate) -> RepoResult<Vec<PendingDelivery>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id AS id, l.latitude AS latitude, l.longitude AS longitude
             FROM deliveries d
             LEFT JOIN delivery_locations dl
               ON dl.delivery_id = d.id
              AND dl.position = (
                    SELECT MIN(position)
                    FROM delivery_locations
                    WHERE delivery_id = d.id
                  )
             LEFT JOIN locations l ON l.id = dl.location_id
             WHERE d.date = ?1
               AND d.carrier_id IS NULL
             ORDER BY d.id ASC;",
        )?;
        let mut rows = stmt.query([date])?;
        let mut pending = Vec::new();
        while let Some(row) = rows.next()? {
            let target = match row.get_ref("latitude")? {
                ValueRef::Null => None,
                _ => Some(read_coordinate(row, "latitude", "longitude")?),
            };
            pending.push(PendingDelivery {
                id: row.get("id")?,
                target,
            });
        }
        Ok(pending)
    }

    fn assign_carriers(&self, assignments: &[(DeliveryId, CarrierId)]) -> RepoResult<usize> {
        in_write_tx(self.conn, |conn| {
            let mut stmt = conn.prepare(
                "UPDATE deliveries
                 SET carrier_id = ?1
                 WHERE id = ?2
                   AND carrier_id IS NULL;",
            )?;
            for &(delivery_id, carrier_id) in assignments {
                if stmt.execute(params![carrier_id, delivery_id])? == 0 {
                    return Err(RepoError::NotFound {
                        entity: "unassigned delivery",
                        id: delivery_id,
                    });
                }
            }
            Ok(assignments.len())
        })
    }
}

fn query_deliveries(conn: &Connection, sql: &str, bind: Vec<Value>) -> RepoResult<Vec<Delivery>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind))?;
    let mut deliveries = Vec::new();
    while let Some(row) = rows.next()? {
        deliveries.push(parse_delivery_row(row)?);
    }

    for delivery in &mut deliveries {
        delivery.location_ids = load_ids(
            conn,
            "SELECT location_id FROM delivery_locations
             WHERE delivery_id = ?1
             ORDER BY position ASC;",
            delivery.id,
        )?;
        delivery.publication_ids = load_ids(
            conn,
            "SELECT publication_id FROM delivery_publications
             WHERE delivery_id = ?1
             ORDER BY publication_id ASC;",
            delivery.id,
        )?;
    }
    Ok(deliveries)
}

fn parse_delivery_row(row: &Row<'_>) -> RepoResult<Delivery> {
    Ok(Delivery {
        id: row.get("id")?,
        carrier_id: row.get("carrier_id")?,
        date: read_date(row, "date")?,
        address: row.get("address")?,
        location_ids: Vec::new(),
        publication_ids: Vec::new(),
    })
}

fn load_ids(conn: &Connection, sql: &str, delivery_id: DeliveryId) -> RepoResult<Vec<i64>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map([delivery_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

fn write_links(
    conn: &Connection,
    delivery_id: DeliveryId,
    location_ids: &[LocationId],
    publication_ids: &[PublicationId],
) -> RepoResult<()> {
    for (position, location_id) in location_ids.iter().enumerate() {
        conn.execute(
            "INSERT INTO delivery_locations (delivery_id, location_id, position)
             VALUES (?1, ?2, ?3);",
            params![delivery_id, location_id, position as i64],
        )?;
    }
    for publication_id in publication_ids {
        conn.execute(
            "INSERT OR IGNORE INTO delivery_publications (delivery_id, publication_id)
             VALUES (?1, ?2);",
            params![delivery_id, publication_id],
        )?;
    }
    Ok(())
}
