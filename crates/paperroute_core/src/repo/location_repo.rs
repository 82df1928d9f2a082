//! Location repository contracts and SQLite implementation.

use super::{ensure_schema_ready, read_coordinate, RepoError, RepoResult, TableSpec};
use crate::model::location::{Location, NewLocation};
use crate::model::LocationId;
use rusqlite::{params, Connection, Row};

const ENTITY: &str = "location";
const REQUIRED: &[TableSpec] = &[(
    "locations",
    &["id", "latitude", "longitude", "address", "city", "postal_code"],
)];
const LOCATION_SELECT_SQL: &str =
    "SELECT id, latitude, longitude, address, city, postal_code FROM locations";

/// Repository interface for location CRUD operations.
pub trait LocationRepository {
    fn create_location(&self, location: &NewLocation) -> RepoResult<Location>;
    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>>;
    fn list_locations(&self) -> RepoResult<Vec<Location>>;
    fn update_location(&self, location: &Location) -> RepoResult<()>;
    fn delete_location(&self, id: LocationId) -> RepoResult<()>;
}

/// SQLite-backed location repository.
pub struct SqliteLocationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLocationRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED)?;
        Ok(Self { conn })
    }
}

impl LocationRepository for SqliteLocationRepository<'_> {
    fn create_location(&self, location: &NewLocation) -> RepoResult<Location> {
        self.conn.execute(
            "INSERT INTO locations (latitude, longitude, address, city, postal_code)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                location.position.latitude,
                location.position.longitude,
                location.address.as_deref(),
                location.city.as_deref(),
                location.postal_code.as_deref(),
            ],
        )?;

        Ok(Location {
            id: self.conn.last_insert_rowid(),
            position: location.position,
            address: location.address.clone(),
            city: location.city.clone(),
            postal_code: location.postal_code.clone(),
        })
    }

    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_location_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_locations(&self) -> RepoResult<Vec<Location>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(parse_location_row(row)?);
        }
        Ok(locations)
    }

    fn update_location(&self, location: &Location) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE locations
             SET latitude = ?1, longitude = ?2, address = ?3, city = ?4, postal_code = ?5
             WHERE id = ?6;",
            params![
                location.position.latitude,
                location.position.longitude,
                location.address.as_deref(),
                location.city.as_deref(),
                location.postal_code.as_deref(),
                location.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: location.id,
            });
        }
        Ok(())
    }

    fn delete_location(&self, id: LocationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM locations WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }
}

fn parse_location_row(row: &Row<'_>) -> RepoResult<Location> {
    Ok(Location {
        id: row.get("id")?,
        position: read_coordinate(row, "latitude", "longitude")?,
        address: row.get("address")?,
        city: row.get("city")?,
        postal_code: row.get("postal_code")?,
    })
}
