//! Queries: a filter, a sorter and pagination applied in a fixed order.
//!
//! The [`EntityQuery`] trait is the contract shared by [`Query`] and the
//! combinators in [`crate::combine`], so queries nest freely.

use std::fmt;

use tracing::trace;

use crate::config::QueryConfig;
use crate::describe::Describe;
use crate::error::Result;
use crate::filter::Filter;
use crate::sequence::Queryable;
use crate::sorter::Sorter;

/// Something that can be applied to a [`Queryable`].
///
/// Implementors must keep the three operations consistent: `apply` is the
/// full query, `apply_filter` narrows the rows without imposing an order of
/// its own unless pagination requires one, and `apply_sort` only orders.
pub trait EntityQuery<E> {
    /// Applies the whole query.
    fn apply<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        let filtered = self.apply_filter(rows)?;
        self.apply_sort(filtered)
    }

    /// Applies the filtering part of the query.
    fn apply_filter<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>>;

    /// Applies the ordering part of the query.
    fn apply_sort<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>>;
}

/// A filter, a sorter, and skip/take pagination.
///
/// `apply` runs filter → sort → skip → take. Pagination over an undefined
/// order is meaningless, so whenever skip or take is set the sort is part of
/// filtering too (see [`Query::apply_filter`]).
///
/// # Example
///
/// ```
/// use quarry::{EntityQuery, Filter, Query, Queryable, Sorter};
///
/// let numbers = [7, 3, 9, 1, 4, 8];
/// let query = Query::new()
///     .with_filter(Filter::matching(|n: &i32| *n > 2))
///     .with_sorter(Sorter::by(|n: &i32| *n))
///     .skip(1)
///     .take(2);
///
/// let page = query.apply(Queryable::new(&numbers)).unwrap();
/// assert_eq!(page.cloned(), vec![4, 7]);
/// ```
pub struct Query<E> {
    filter: Option<Filter<E>>,
    sorter: Option<Sorter<E>>,
    skip: usize,
    take: Option<usize>,
}

impl<E> Query<E> {
    /// Creates an empty query, which returns its input unchanged.
    pub fn new() -> Self {
        Query {
            filter: None,
            sorter: None,
            skip: 0,
            take: None,
        }
    }

    /// Creates a query filtering by a single predicate.
    pub fn matching<P>(predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Query::new().with_filter(Filter::matching(predicate))
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Filter<E>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the sorter.
    pub fn with_sorter(mut self, sorter: Sorter<E>) -> Self {
        self.sorter = Some(sorter);
        self
    }

    /// Sets the number of rows to skip.
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Sets the maximum number of rows to return.
    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// Returns the filter, if set.
    pub fn get_filter(&self) -> Option<&Filter<E>> {
        self.filter.as_ref()
    }

    /// Returns the sorter, if set.
    pub fn get_sorter(&self) -> Option<&Sorter<E>> {
        self.sorter.as_ref()
    }

    /// Returns the number of rows to skip.
    pub fn get_skip(&self) -> usize {
        self.skip
    }

    /// Returns the take limit, if set.
    pub fn get_take(&self) -> Option<usize> {
        self.take
    }

    /// Returns `true` if skip or take is set.
    pub fn is_paged(&self) -> bool {
        self.skip > 0 || self.take.is_some()
    }

    fn filter_only<'a>(&self, rows: Queryable<'a, E>) -> Queryable<'a, E> {
        match &self.filter {
            Some(filter) => filter.apply(rows),
            None => rows,
        }
    }

    fn sort_only<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        match &self.sorter {
            Some(sorter) => sorter.sort(rows),
            None => Ok(rows),
        }
    }

    fn paginate<'a>(&self, mut rows: Queryable<'a, E>) -> Queryable<'a, E> {
        if !self.is_paged() {
            return rows;
        }
        trace!(
            skip = self.skip,
            take = ?self.take,
            rows = rows.len(),
            "query.apply.paginate"
        );
        if self.skip > 0 {
            rows = rows.skip(self.skip);
        }
        if let Some(take) = self.take {
            rows = rows.take(take);
        }
        rows
    }
}

impl<E: Describe> Query<E> {
    /// Builds a query from a configuration, resolving its sort paths now.
    ///
    /// A filter can be attached afterwards with [`Query::with_filter`].
    pub fn from_config(config: &QueryConfig) -> Result<Self> {
        let mut query = Query::new().skip(config.skip);
        if let Some(take) = config.take {
            query = query.take(take);
        }
        if let Some(sorter) = config.sort.to_sorter::<E>()? {
            query = query.with_sorter(sorter);
        }
        Ok(query)
    }
}

impl<E> EntityQuery<E> for Query<E> {
    /// Filter, sort, skip, take.
    fn apply<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        let rows = self.filter_only(rows);
        let rows = self.sort_only(rows)?;
        Ok(self.paginate(rows))
    }

    /// Filters only, unless skip or take is set; then the rows are also
    /// sorted and paged, so the page is taken from a defined order.
    fn apply_filter<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        let rows = self.filter_only(rows);
        if !self.is_paged() {
            return Ok(rows);
        }
        let rows = self.sort_only(rows)?;
        Ok(self.paginate(rows))
    }

    fn apply_sort<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        self.sort_only(rows)
    }
}

impl<E> Default for Query<E> {
    fn default() -> Self {
        Query::new()
    }
}

impl<E> Clone for Query<E> {
    fn clone(&self) -> Self {
        Query {
            filter: self.filter.clone(),
            sorter: self.sorter.clone(),
            skip: self.skip,
            take: self.take,
        }
    }
}

impl<E> fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filter", &self.filter)
            .field("sorter", &self.sorter)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: u32,
        name: &'static str,
    }

    fn p(id: u32, name: &'static str) -> Person {
        Person { id, name }
    }

    fn people() -> Vec<Person> {
        vec![
            p(3, "T"),
            p(1, "Bob"),
            p(4, "Test"),
            p(2, "Ted"),
            p(7, "TName"),
            p(5, "Target"),
            p(6, "Name"),
        ]
    }

    fn ids(rows: Queryable<'_, Person>) -> Vec<u32> {
        rows.iter().map(|p| p.id).collect()
    }

    fn paged_query() -> Query<Person> {
        Query::matching(|p: &Person| p.name.starts_with('T'))
            .with_sorter(Sorter::by(|p: &Person| p.id))
            .skip(1)
            .take(2)
    }

    #[test]
    fn apply_filters_sorts_and_pages() {
        let items = people();
        let rows = paged_query().apply(Queryable::new(&items)).unwrap();
        assert_eq!(ids(rows), vec![3, 4]);
    }

    #[test]
    fn apply_filter_with_paging_sorts_first() {
        let items = people();
        let query = paged_query();
        let filtered = query.apply_filter(Queryable::new(&items)).unwrap();
        let applied = query.apply(Queryable::new(&items)).unwrap();
        assert_eq!(filtered, applied);
    }

    #[test]
    fn apply_filter_without_paging_keeps_input_order() {
        let items = people();
        let query = Query::matching(|p: &Person| p.name.starts_with('T'))
            .with_sorter(Sorter::by(|p: &Person| p.id));
        let filtered = query.apply_filter(Queryable::new(&items)).unwrap();
        assert_eq!(ids(filtered), vec![3, 4, 2, 7, 5]);
    }

    #[test]
    fn apply_sort_never_filters() {
        let items = people();
        let sorted = paged_query().apply_sort(Queryable::new(&items)).unwrap();
        assert_eq!(ids(sorted), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn apply_is_sort_of_filter_when_unpaged() {
        let items = people();
        let query = Query::matching(|p: &Person| p.name.len() > 1)
            .with_sorter(Sorter::by_desc(|p: &Person| p.name));
        let applied = query.apply(Queryable::new(&items)).unwrap();
        let composed = query
            .apply_sort(query.apply_filter(Queryable::new(&items)).unwrap())
            .unwrap();
        assert_eq!(applied, composed);
    }

    #[test]
    fn empty_query_returns_input() {
        let items = people();
        let query = Query::<Person>::new();
        assert!(!query.is_paged());
        let rows = query.apply(Queryable::new(&items)).unwrap();
        assert_eq!(rows.cloned(), items);
    }

    #[test]
    fn paging_without_sorter_uses_input_order() {
        let items = people();
        let query = Query::<Person>::new().skip(5);
        assert_eq!(ids(query.apply_filter(Queryable::new(&items)).unwrap()), vec![5, 6]);
        let query = Query::<Person>::new().take(0);
        assert!(query.apply(Queryable::new(&items)).unwrap().is_empty());
    }

    #[test]
    fn seed_sorter_fails_at_apply() {
        let items = people();
        let query = Query::<Person>::new().with_sorter(Sorter::unordered());
        assert_eq!(
            query.apply(Queryable::new(&items)).unwrap_err(),
            QueryError::UnorderedSorter
        );
        // Unpaged filtering does not touch the sorter.
        assert!(query.apply_filter(Queryable::new(&items)).is_ok());
    }

    #[test]
    fn accessors() {
        let query = paged_query();
        assert!(query.get_filter().is_some());
        assert!(query.get_sorter().is_some());
        assert_eq!(query.get_skip(), 1);
        assert_eq!(query.get_take(), Some(2));
        assert!(query.is_paged());
        let debug = format!("{query:?}");
        assert!(debug.contains("skip: 1"));
    }
}
