//! Publication repository contracts and SQLite implementation.

use super::{ensure_schema_ready, RepoError, RepoResult, TableSpec};
use crate::model::publication::{NewPublication, Publication, PublicationKind};
use crate::model::PublicationId;
use rusqlite::{params, Connection, Row};

const ENTITY: &str = "publication";
const REQUIRED: &[TableSpec] = &[("publications", &["id", "title", "kind"])];
const PUBLICATION_SELECT_SQL: &str = "SELECT id, title, kind FROM publications";

/// Repository interface for publication CRUD operations.
pub trait PublicationRepository {
    fn create_publication(&self, publication: &NewPublication) -> RepoResult<Publication>;
    fn get_publication(&self, id: PublicationId) -> RepoResult<Option<Publication>>;
    fn list_publications(&self) -> RepoResult<Vec<Publication>>;
    fn update_publication(&self, publication: &Publication) -> RepoResult<()>;
    fn delete_publication(&self, id: PublicationId) -> RepoResult<()>;
}

/// SQLite-backed publication repository.
pub struct SqlitePublicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublicationRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED)?;
        Ok(Self { conn })
    }
}

impl PublicationRepository for SqlitePublicationRepository<'_> {
    fn create_publication(&self, publication: &NewPublication) -> RepoResult<Publication> {
        publication.validate()?;

        let title = publication.title.trim();
        self.conn.execute(
            "INSERT INTO publications (title, kind) VALUES (?1, ?2);",
            params![title, publication.kind.as_str()],
        )?;

        Ok(Publication {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            kind: publication.kind,
        })
    }

    fn get_publication(&self, id: PublicationId) -> RepoResult<Option<Publication>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_publication_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_publications(&self) -> RepoResult<Vec<Publication>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLICATION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut publications = Vec::new();
        while let Some(row) = rows.next()? {
            publications.push(parse_publication_row(row)?);
        }
        Ok(publications)
    }

    fn update_publication(&self, publication: &Publication) -> RepoResult<()> {
        publication.validate()?;

        let changed = self.conn.execute(
            "UPDATE publications SET title = ?1, kind = ?2 WHERE id = ?3;",
            params![
                publication.title.trim(),
                publication.kind.as_str(),
                publication.id
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: publication.id,
            });
        }
        Ok(())
    }

    fn delete_publication(&self, id: PublicationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM publications WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }
}

fn parse_publication_row(row: &Row<'_>) -> RepoResult<Publication> {
    let kind_text: String = row.get("kind")?;
    let kind = kind_text.parse::<PublicationKind>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid publication kind `{kind_text}` in publications.kind"
        ))
    })?;

    Ok(Publication {
        id: row.get("id")?,
        title: row.get("title")?,
        kind,
    })
}
