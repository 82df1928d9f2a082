use paperroute_core::db::open_db_in_memory;
use paperroute_core::db::migrations::latest_version;
use paperroute_core::repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
use paperroute_core::repo::location_repo::{LocationRepository, SqliteLocationRepository};
use paperroute_core::repo::publication_repo::{
    PublicationRepository, SqlitePublicationRepository,
};
use paperroute_core::{
    Coordinate, NewCustomer, NewLocation, NewPublication, PublicationKind, RepoError,
    ValidationError,
};
use rusqlite::Connection;

#[test]
fn customer_create_get_update_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut new_customer = NewCustomer::new("  Ada Lovelace ", "12 Crescent Rd");
    new_customer.phone = Some("+44 20 7946 0018".to_string());
    let created = repo.create_customer(&new_customer).unwrap();
    assert_eq!(created.name, "Ada Lovelace");

    let loaded = repo.get_customer(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);

    let mut updated = loaded.clone();
    updated.address = "14 Crescent Rd".to_string();
    updated.phone = None;
    repo.update_customer(&updated).unwrap();
    assert_eq!(repo.get_customer(created.id).unwrap(), Some(updated));

    repo.delete_customer(created.id).unwrap();
    assert_eq!(repo.get_customer(created.id).unwrap(), None);
    assert!(matches!(
        repo.delete_customer(created.id),
        Err(RepoError::NotFound {
            entity: "customer",
            ..
        })
    ));
}

#[test]
fn customer_requires_name_and_address_and_plausible_phone() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let blank_address = NewCustomer::new("Ada", "   ");
    assert!(matches!(
        repo.create_customer(&blank_address),
        Err(RepoError::Validation(ValidationError::BlankField("address")))
    ));

    let mut bad_phone = NewCustomer::new("Ada", "12 Crescent Rd");
    bad_phone.phone = Some("call me".to_string());
    assert!(matches!(
        repo.create_customer(&bad_phone),
        Err(RepoError::Validation(ValidationError::InvalidPhone(_)))
    ));
    assert!(repo.list_customers().unwrap().is_empty());
}

#[test]
fn customer_accepts_parenthesised_area_code() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut new_customer = NewCustomer::new("Ada", "12 Crescent Rd");
    new_customer.phone = Some("(01) 555-0199".to_string());
    let created = repo.create_customer(&new_customer).unwrap();

    let loaded = repo.get_customer(created.id).unwrap().unwrap();
    assert_eq!(loaded.phone.as_deref(), Some("(01) 555-0199"));
}

#[test]
fn customers_list_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let first = repo.create_customer(&NewCustomer::new("Zed", "1 A St")).unwrap();
    let second = repo.create_customer(&NewCustomer::new("Amy", "2 B St")).unwrap();

    let ids: Vec<_> = repo.list_customers().unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn publication_crud_keeps_kind() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePublicationRepository::try_new(&conn).unwrap();

    let created = repo
        .create_publication(&NewPublication::new("Morning Herald", PublicationKind::Newspaper))
        .unwrap();
    let mut loaded = repo.get_publication(created.id).unwrap().unwrap();
    assert_eq!(loaded.kind, PublicationKind::Newspaper);

    loaded.kind = PublicationKind::Magazine;
    loaded.title = "Herald Weekend".to_string();
    repo.update_publication(&loaded).unwrap();
    assert_eq!(repo.list_publications().unwrap(), vec![loaded.clone()]);

    repo.delete_publication(loaded.id).unwrap();
    assert!(repo.list_publications().unwrap().is_empty());
}

#[test]
fn publication_update_of_missing_row_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePublicationRepository::try_new(&conn).unwrap();

    let mut publication = repo
        .create_publication(&NewPublication::new("Gazette", PublicationKind::Newspaper))
        .unwrap();
    publication.id += 100;
    assert!(matches!(
        repo.update_publication(&publication),
        Err(RepoError::NotFound {
            entity: "publication",
            ..
        })
    ));
}

#[test]
fn location_crud_round_trips_coordinates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocationRepository::try_new(&conn).unwrap();

    let mut new_location = NewLocation::at(Coordinate::new(53.3498, -6.2603));
    new_location.city = Some("Dublin".to_string());
    let created = repo.create_location(&new_location).unwrap();

    let mut loaded = repo.get_location(created.id).unwrap().unwrap();
    assert_eq!(loaded.position, Coordinate::new(53.3498, -6.2603));
    assert_eq!(loaded.city.as_deref(), Some("Dublin"));

    loaded.position = Coordinate::new(53.0, -6.0);
    repo.update_location(&loaded).unwrap();
    assert_eq!(repo.list_locations().unwrap(), vec![loaded.clone()]);

    repo.delete_location(loaded.id).unwrap();
    assert_eq!(repo.get_location(loaded.id).unwrap(), None);
}

#[test]
fn location_with_text_coordinate_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocationRepository::try_new(&conn).unwrap();
    let created = repo
        .create_location(&NewLocation::at(Coordinate::new(1.0, 2.0)))
        .unwrap();

    conn.execute(
        "UPDATE locations SET latitude = 'north' WHERE id = ?1;",
        [created.id],
    )
    .unwrap();

    assert!(matches!(
        repo.get_location(created.id),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCustomerRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqlitePublicationRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("publications"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE locations (id INTEGER PRIMARY KEY, latitude REAL NOT NULL);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteLocationRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "locations",
            column: "longitude"
        })
    ));
}
