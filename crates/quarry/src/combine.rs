//! Combinators over [`EntityQuery`]: intersection and union.
//!
//! Both hold their inner queries as shared trait objects, so any query,
//! including another combinator, can be nested.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::Result;
use crate::query::EntityQuery;
use crate::sequence::Queryable;

type SharedQuery<E> = Arc<dyn EntityQuery<E> + Send + Sync>;

/// Runs inner queries one after another, each on the previous one's output.
///
/// The result satisfies every inner filter. Its order is whatever the last
/// applied sorter produced.
///
/// ```
/// use quarry::{AggregateQuery, EntityQuery, Query, Queryable};
///
/// let words = ["Bob", "T", "Ted", "Test"];
/// let both = AggregateQuery::new()
///     .with(Query::matching(|w: &&str| w.to_lowercase().ends_with('t')))
///     .with(Query::matching(|w: &&str| w.starts_with('T')));
///
/// let rows = both.apply(Queryable::new(&words)).unwrap();
/// assert_eq!(rows.cloned(), vec!["T", "Test"]);
/// ```
pub struct AggregateQuery<E> {
    queries: Vec<SharedQuery<E>>,
}

impl<E> AggregateQuery<E> {
    /// An aggregate with no inner queries; it returns its input unchanged.
    pub fn new() -> Self {
        AggregateQuery {
            queries: Vec::new(),
        }
    }

    /// Appends a query.
    pub fn with<Q>(mut self, query: Q) -> Self
    where
        Q: EntityQuery<E> + Send + Sync + 'static,
    {
        self.queries.push(Arc::new(query));
        self
    }

    /// Appends a query if present; `None` is skipped.
    pub fn with_opt<Q>(self, query: Option<Q>) -> Self
    where
        Q: EntityQuery<E> + Send + Sync + 'static,
    {
        match query {
            Some(query) => self.with(query),
            None => self,
        }
    }

    /// Appends an already shared query.
    pub fn with_shared(mut self, query: SharedQuery<E>) -> Self {
        self.queries.push(query);
        self
    }

    /// Returns the number of inner queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Returns `true` if there are no inner queries.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    fn fold<'a, F>(&self, rows: Queryable<'a, E>, step: F) -> Result<Queryable<'a, E>>
    where
        F: Fn(&SharedQuery<E>, Queryable<'a, E>) -> Result<Queryable<'a, E>>,
    {
        self.queries
            .iter()
            .try_fold(rows, |rows, query| step(query, rows))
    }
}

impl<E> EntityQuery<E> for AggregateQuery<E> {
    fn apply<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        self.fold(rows, |query, rows| query.apply(rows))
    }

    fn apply_filter<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        self.fold(rows, |query, rows| query.apply_filter(rows))
    }

    fn apply_sort<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        self.fold(rows, |query, rows| query.apply_sort(rows))
    }
}

impl<E> FromIterator<SharedQuery<E>> for AggregateQuery<E> {
    fn from_iter<I: IntoIterator<Item = SharedQuery<E>>>(iter: I) -> Self {
        AggregateQuery {
            queries: iter.into_iter().collect(),
        }
    }
}

impl<E> Default for AggregateQuery<E> {
    fn default() -> Self {
        AggregateQuery::new()
    }
}

impl<E> Clone for AggregateQuery<E> {
    fn clone(&self) -> Self {
        AggregateQuery {
            queries: self.queries.clone(),
        }
    }
}

impl<E> fmt::Debug for AggregateQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AggregateQuery(x{})", self.queries.len())
    }
}

/// The distinct rows matched by any of the inner queries.
///
/// Every inner query filters the original input; the results are merged in
/// query order, the first occurrence of an entity winning. A union imposes
/// no order of its own, so `apply_sort` leaves rows untouched.
///
/// ```
/// use quarry::{EntityQuery, Query, Queryable, UnionQuery};
///
/// let words = ["Bob", "T", "Ted", "Test"];
/// let either = UnionQuery::new()
///     .with(Query::matching(|w: &&str| *w == "Test"))
///     .with(Query::matching(|w: &&str| *w == "T"));
///
/// let rows = either.apply(Queryable::new(&words)).unwrap();
/// assert_eq!(rows.cloned(), vec!["Test", "T"]);
/// ```
pub struct UnionQuery<E> {
    queries: Vec<SharedQuery<E>>,
}

impl<E> UnionQuery<E> {
    /// A union with no inner queries; it returns its input unchanged.
    pub fn new() -> Self {
        UnionQuery {
            queries: Vec::new(),
        }
    }

    /// Appends a query.
    pub fn with<Q>(mut self, query: Q) -> Self
    where
        Q: EntityQuery<E> + Send + Sync + 'static,
    {
        self.queries.push(Arc::new(query));
        self
    }

    /// Appends an already shared query.
    pub fn with_shared(mut self, query: SharedQuery<E>) -> Self {
        self.queries.push(query);
        self
    }

    /// Returns the number of inner queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Returns `true` if there are no inner queries.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

impl<E: PartialEq> EntityQuery<E> for UnionQuery<E> {
    fn apply<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        self.apply_filter(rows)
    }

    fn apply_filter<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        let Some((first, rest)) = self.queries.split_first() else {
            return Ok(rows);
        };
        let mut merged = first.apply_filter(rows.clone())?;
        for query in rest {
            let matched = query.apply_filter(rows.clone())?;
            trace!(
                merged = merged.len(),
                matched = matched.len(),
                "query.union.merge"
            );
            merged = merged.union(matched);
        }
        Ok(merged)
    }

    fn apply_sort<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        Ok(rows)
    }
}

impl<E> FromIterator<SharedQuery<E>> for UnionQuery<E> {
    fn from_iter<I: IntoIterator<Item = SharedQuery<E>>>(iter: I) -> Self {
        UnionQuery {
            queries: iter.into_iter().collect(),
        }
    }
}

impl<E> Default for UnionQuery<E> {
    fn default() -> Self {
        UnionQuery::new()
    }
}

impl<E> Clone for UnionQuery<E> {
    fn clone(&self) -> Self {
        UnionQuery {
            queries: self.queries.clone(),
        }
    }
}

impl<E> fmt::Debug for UnionQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnionQuery(x{})", self.queries.len())
    }
}
