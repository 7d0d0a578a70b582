//! Integration tests for the Describe derive macro.
//!
//! These tests verify that `#[derive(Describe)]` publishes member tables that
//! property paths resolve against, and generates member name constants.

#![cfg(feature = "derive")]
#![allow(dead_code)] // Some fields are intentionally skipped or write-only

use quarry::{
    Describe, EntityQuery, EnumKey, KeyPath, PathError, Query, QueryError, Queryable, Sorter,
    Timestamp, Value, ValueKind,
};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Active,
    Suspended,
    Closed,
}

impl EnumKey for Status {
    fn enum_key(&self) -> u32 {
        match self {
            Status::Active => 0,
            Status::Suspended => 1,
            Status::Closed => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Describe)]
struct Address {
    street: String,
    city: String,
    zip: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Describe)]
struct Person {
    id: u32,
    name: String,
    address: Option<Address>,

    #[query(Enum)]
    status: Status,

    #[query(Timestamp, rename = "joined")]
    joined_at: i64,

    #[query(write_only)]
    password: String,

    #[query(skip)]
    notes: Vec<String>,
}

fn person(id: u32, name: &str, city: Option<&str>, status: Status, joined_at: i64) -> Person {
    Person {
        id,
        name: name.to_string(),
        address: city.map(|city| Address {
            street: format!("{id} Main St"),
            city: city.to_string(),
            zip: None,
        }),
        status,
        joined_at,
        password: "hunter2".to_string(),
        notes: Vec::new(),
    }
}

fn people() -> Vec<Person> {
    vec![
        person(1, "Bob", Some("Oslo"), Status::Closed, 3_000),
        person(2, "T", None, Status::Active, 1_000),
        person(3, "Ted", Some("Bergen"), Status::Suspended, 2_000),
        person(4, "Test", Some("Bergen"), Status::Active, 4_000),
    ]
}

fn ids(rows: Queryable<'_, Person>) -> Vec<u32> {
    rows.iter().map(|p| p.id).collect()
}

// =============================================================================
// Generated code
// =============================================================================

#[test]
fn test_member_constants_generated() {
    assert_eq!(Person::ID, "id");
    assert_eq!(Person::NAME, "name");
    assert_eq!(Person::STATUS, "status");
    assert_eq!(Person::JOINED, "joined");
    assert_eq!(Address::CITY, "city");
    assert_eq!(Address::ZIP, "zip");
}

#[test]
fn test_member_table() {
    let info = Person::type_info();
    assert_eq!(info.name, "Person");
    assert_eq!(info.scalar_kind(), None);

    let names: Vec<&str> = info.members().iter().map(|m| m.name).collect();
    assert_eq!(
        names,
        vec!["id", "name", "address", "status", "joined", "password"]
    );

    let password = info.member("Password").unwrap();
    assert!(!password.is_readable());
    assert_eq!(password.type_info().name, "String");

    let address = info.member("ADDRESS").unwrap();
    assert_eq!(address.type_info().name, "Address");
}

// =============================================================================
// Path resolution
// =============================================================================

#[test]
fn test_nested_path_resolves_case_insensitively() {
    let path = KeyPath::<Person>::resolve("Address.City").unwrap();
    assert_eq!(path.kind(), ValueKind::String);
    assert_eq!(path.segments().collect::<Vec<_>>(), vec!["address", "city"]);

    let items = people();
    assert_eq!(path.extract(&items[0]), Value::String("Oslo"));
    // A missing optional record yields no value.
    assert_eq!(path.extract(&items[1]), Value::None);
}

#[test]
fn test_enum_and_timestamp_members() {
    let items = people();
    let status = KeyPath::<Person>::resolve(Person::STATUS).unwrap();
    assert_eq!(status.kind(), ValueKind::Enum);
    assert_eq!(status.extract(&items[2]), Value::Enum(1));

    let joined = KeyPath::<Person>::resolve("Joined").unwrap();
    assert_eq!(joined.kind(), ValueKind::Timestamp);
    assert_eq!(joined.extract(&items[0]), Value::Timestamp(Timestamp(3_000)));
}

#[test]
fn test_missing_member_is_rejected() {
    let err = KeyPath::<Person>::resolve("Address.NonExisting").unwrap_err();
    assert_eq!(
        err,
        PathError::MissingMember {
            path: "Address.NonExisting".to_string(),
            segment: "NonExisting".to_string(),
            declaring_type: "Address",
        }
    );
}

#[test]
fn test_skipped_and_renamed_fields_are_not_members() {
    assert!(matches!(
        KeyPath::<Person>::resolve("notes"),
        Err(PathError::MissingMember { .. })
    ));
    assert!(matches!(
        KeyPath::<Person>::resolve("joined_at"),
        Err(PathError::MissingMember { .. })
    ));
}

#[test]
fn test_write_only_member_is_rejected() {
    let err = KeyPath::<Person>::resolve("password").unwrap_err();
    assert!(matches!(err, PathError::NoGetter { .. }));
    assert!(err.to_string().contains("does not have a getter"));
}

#[test]
fn test_record_member_is_not_comparable() {
    let err = KeyPath::<Person>::resolve("address").unwrap_err();
    assert!(matches!(
        err,
        PathError::NotComparable {
            type_name: "Address",
            ..
        }
    ));
}

#[test]
fn test_empty_path_is_rejected() {
    assert!(matches!(
        KeyPath::<Person>::resolve(""),
        Err(PathError::Empty)
    ));
    assert!(matches!(
        Sorter::<Person>::by_path(""),
        Err(QueryError::PathResolution(PathError::Empty))
    ));
}

// =============================================================================
// Sorting by path
// =============================================================================

#[test]
fn test_sort_by_nested_path() {
    let items = people();
    let sorter = Sorter::<Person>::by_path("address.city")
        .unwrap()
        .then_by_path_desc(Person::ID)
        .unwrap();
    assert_eq!(sorter.to_string(), "address.city, id desc");

    // The person without an address, then Bergen (4, 3), then Oslo (1).
    let rows = sorter.sort(Queryable::new(&items)).unwrap();
    assert_eq!(ids(rows), vec![2, 4, 3, 1]);
}

#[derive(Debug, Clone, PartialEq, Describe)]
struct Parcel {
    id: u32,
    zip: Option<u32>,
}

#[test]
fn test_optional_path_orders_like_option() {
    let parcels = vec![
        Parcel { id: 1, zip: None },
        Parcel { id: 2, zip: Some(5) },
        Parcel { id: 3, zip: Some(1) },
    ];
    let parcel_ids = |rows: Queryable<'_, Parcel>| rows.iter().map(|p| p.id).collect::<Vec<_>>();

    let by_closure = Sorter::by(|p: &Parcel| p.zip);
    let by_path = Sorter::<Parcel>::by_path(Parcel::ZIP).unwrap();
    let closure_asc = parcel_ids(by_closure.sort(Queryable::new(&parcels)).unwrap());
    let path_asc = parcel_ids(by_path.sort(Queryable::new(&parcels)).unwrap());
    assert_eq!(closure_asc, vec![1, 3, 2]);
    assert_eq!(path_asc, closure_asc);

    let by_closure = Sorter::by_desc(|p: &Parcel| p.zip);
    let by_path = Sorter::<Parcel>::by_path_desc(Parcel::ZIP).unwrap();
    let closure_desc = parcel_ids(by_closure.sort(Queryable::new(&parcels)).unwrap());
    let path_desc = parcel_ids(by_path.sort(Queryable::new(&parcels)).unwrap());
    assert_eq!(closure_desc, vec![2, 3, 1]);
    assert_eq!(path_desc, closure_desc);
}

#[derive(Debug, Clone, PartialEq, Describe)]
struct Shipment {
    id: u32,
    #[query(Timestamp)]
    delivered: Option<i64>,
    #[query(Enum)]
    status: Option<Status>,
}

#[test]
fn test_optional_timestamp_and_enum_members() {
    let shipments = vec![
        Shipment { id: 1, delivered: Some(2_000), status: None },
        Shipment { id: 2, delivered: None, status: Some(Status::Closed) },
        Shipment { id: 3, delivered: Some(1_000), status: Some(Status::Active) },
    ];

    let delivered = KeyPath::<Shipment>::resolve(Shipment::DELIVERED).unwrap();
    assert_eq!(delivered.kind(), ValueKind::Timestamp);
    assert_eq!(delivered.extract(&shipments[0]), Value::Timestamp(Timestamp(2_000)));
    assert_eq!(delivered.extract(&shipments[1]), Value::None);

    let status = KeyPath::<Shipment>::resolve(Shipment::STATUS).unwrap();
    assert_eq!(status.kind(), ValueKind::Enum);
    assert_eq!(status.extract(&shipments[0]), Value::None);
    assert_eq!(status.extract(&shipments[1]), Value::Enum(2));

    let shipment_ids =
        |rows: Queryable<'_, Shipment>| rows.iter().map(|s| s.id).collect::<Vec<_>>();
    let by_delivered = Sorter::<Shipment>::by_path(Shipment::DELIVERED).unwrap();
    assert_eq!(
        shipment_ids(by_delivered.sort(Queryable::new(&shipments)).unwrap()),
        vec![2, 3, 1]
    );
    let by_status = Sorter::<Shipment>::by_path_desc(Shipment::STATUS).unwrap();
    assert_eq!(
        shipment_ids(by_status.sort(Queryable::new(&shipments)).unwrap()),
        vec![2, 3, 1]
    );
}

#[test]
fn test_sort_by_enum_then_timestamp() {
    let items = people();
    let sorter = Sorter::<Person>::by_path(Person::STATUS)
        .unwrap()
        .then_by_path_desc(Person::JOINED)
        .unwrap();
    let rows = sorter.sort(Queryable::new(&items)).unwrap();
    assert_eq!(ids(rows), vec![4, 2, 3, 1]);
}

#[test]
fn test_invalid_path_fails_at_construction() {
    let err = Sorter::<Person>::by_path("Address.NonExisting").unwrap_err();
    assert!(matches!(err, QueryError::PathResolution(_)));
    assert!(err.to_string().contains("NonExisting"));
}

#[test]
fn test_query_over_derived_entities() {
    let items = people();
    let query = Query::matching(|p: &Person| p.name.starts_with('T'))
        .with_sorter(Sorter::by_path("joined").unwrap())
        .skip(1);
    assert_eq!(ids(query.apply(Queryable::new(&items)).unwrap()), vec![3, 4]);
}
