//! Quarry - Composable query specifications for in-memory collections.
//!
//! Quarry lets you describe *which* entities you want and *in what order*
//! as immutable, reusable values, and apply them to any slice later:
//!
//! - [`Filter`]: an AND-chain of predicates
//! - [`Sorter`]: a primary ordering plus tie-breaking orderings, keyed by
//!   closures or by property paths such as `"Address.City"`
//! - [`Query`]: filter, sorter and skip/take pagination together
//! - [`AggregateQuery`] and [`UnionQuery`]: intersection and union of queries
//!
//! Every building block is immutable. Extending a filter or sorter returns a
//! new value sharing the old one, so a base specification can seed any
//! number of derived ones, and all of them are `Send + Sync`.
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{Describe, EntityQuery, Query, Queryable, Sorter};
//!
//! #[derive(Describe)]
//! struct Address {
//!     city: String,
//! }
//!
//! #[derive(Describe)]
//! struct Person {
//!     id: u32,
//!     name: String,
//!     address: Address,
//! }
//!
//! let person = |id: u32, name: &str, city: &str| Person {
//!     id,
//!     name: name.into(),
//!     address: Address { city: city.into() },
//! };
//! let people = vec![
//!     person(1, "Tove", "Oslo"),
//!     person(2, "Bob", "Bergen"),
//!     person(3, "Tor", "Bergen"),
//!     person(4, "Tia", "Oslo"),
//! ];
//!
//! let query = Query::matching(|p: &Person| p.name.starts_with('T'))
//!     .with_sorter(Sorter::by_path("Address.City")?.then_by_path_desc("id")?)
//!     .take(2);
//!
//! let rows = query.apply(Queryable::new(&people))?;
//! let ids: Vec<u32> = rows.iter().map(|p| p.id).collect();
//! assert_eq!(ids, vec![3, 4]);
//! # Ok::<(), quarry::QueryError>(())
//! ```
//!
//! # Application Order
//!
//! ```text
//! apply = filter → sort → skip → take
//! ```
//!
//! `apply_filter` runs the filter alone unless the query is paged; a page is
//! only meaningful in a defined order, so paged queries sort before skipping
//! even when only filtering was asked for. `apply_sort` only sorts.
//!
//! # Property Paths
//!
//! Paths are dotted member names resolved against the [`Describe`] member
//! tables of the entity type. Lookup is case-insensitive, `Option`, `Box`
//! and `Arc` members are looked through, and the final member must be a
//! scalar: a string, number, boolean, timestamp or enum key. Paths are
//! validated when the sorter is built; a bad path is a
//! [`QueryError::PathResolution`] at construction, never a panic later.
//!
//! Absent values (a `None` anywhere along the path) compare like `None`
//! does for `Option`: before every present value when ascending, after
//! them when descending. A path key and a closure key on the same member
//! therefore order rows identically.

mod combine;
mod config;
mod describe;
mod error;
mod filter;
mod ordering;
mod path;
mod query;
mod sequence;
mod sorter;
mod value;

// Re-export public API
pub use combine::{AggregateQuery, UnionQuery};
pub use config::{QueryConfig, SortKey, SortSpec};
pub use describe::{
    enum_type_info, timestamp_type_info, Describe, EnumKey, Field, Getter, Member, Shape,
    TimestampKey, TypeInfo,
};
pub use error::{PathError, QueryError, Result};
pub use filter::{Filter, Predicate};
pub use ordering::Dir;
pub use path::KeyPath;
pub use query::{EntityQuery, Query};
pub use sequence::Queryable;
pub use sorter::Sorter;
pub use value::{Number, Timestamp, Value, ValueKind};

#[cfg(feature = "derive")]
pub use quarry_macros::Describe;
