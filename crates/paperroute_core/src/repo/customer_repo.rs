//! Customer repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a customer cascades to its subscriptions (schema FK).
//! - Listing is ordered by `id ASC`.

use super::{ensure_schema_ready, RepoError, RepoResult, TableSpec};
use crate::model::customer::{Customer, NewCustomer};
use crate::model::CustomerId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "customer";
const REQUIRED: &[TableSpec] = &[("customers", &["id", "name", "address", "phone"])];
const CUSTOMER_SELECT_SQL: &str = "SELECT id, name, address, phone FROM customers";

/// Repository interface for customer CRUD operations.
pub trait CustomerRepository {
    fn create_customer(&self, customer: &NewCustomer) -> RepoResult<Customer>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
    fn update_customer(&self, customer: &Customer) -> RepoResult<()>;
    fn delete_customer(&self, id: CustomerId) -> RepoResult<()>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED)?;
        Ok(Self { conn })
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn create_customer(&self, customer: &NewCustomer) -> RepoResult<Customer> {
        customer.validate()?;

        self.conn.execute(
            "INSERT INTO customers (name, address, phone) VALUES (?1, ?2, ?3);",
            params![
                customer.name.trim(),
                customer.address.trim(),
                customer.phone.as_deref()
            ],
        )?;

        Ok(Customer {
            id: self.conn.last_insert_rowid(),
            name: customer.name.trim().to_string(),
            address: customer.address.trim().to_string(),
            phone: customer.phone.clone(),
        })
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let customer = self
            .conn
            .query_row(
                &format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_customer_row,
            )
            .optional()?;
        Ok(customer)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} ORDER BY id ASC;"))?;
        let customers = stmt
            .query_map([], parse_customer_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(customers)
    }

    fn update_customer(&self, customer: &Customer) -> RepoResult<()> {
        customer.validate()?;

        let changed = self.conn.execute(
            "UPDATE customers SET name = ?1, address = ?2, phone = ?3 WHERE id = ?4;",
            params![
                customer.name.trim(),
                customer.address.trim(),
                customer.phone.as_deref(),
                customer.id
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: customer.id,
            });
        }
        Ok(())
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }
}

fn parse_customer_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        phone: row.get("phone")?,
    })
}
