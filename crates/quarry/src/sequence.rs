//! The in-memory sequence that query specifications are applied to.
//!
//! [`Queryable`] holds references into a caller-owned collection and offers
//! the primitives every filter, sorter and query is expressed in: filter by
//! predicate, stable sort, skip, take and union. Applying a specification
//! never touches the underlying entities.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

/// An ordered sequence of borrowed entities.
///
/// ```
/// use quarry::Queryable;
///
/// let numbers = [5, 1, 4, 2];
/// let rows = Queryable::new(&numbers)
///     .filter(|n| *n > 1)
///     .sort_by(|a, b| a.cmp(b))
///     .skip(1)
///     .take(1);
/// assert_eq!(rows.cloned(), vec![4]);
/// ```
#[derive(Debug)]
pub struct Queryable<'a, E> {
    rows: Vec<&'a E>,
}

impl<'a, E> Queryable<'a, E> {
    /// Creates a sequence over every element of `items`, in order.
    pub fn new(items: &'a [E]) -> Self {
        Queryable {
            rows: items.iter().collect(),
        }
    }

    /// Creates a sequence from already borrowed rows.
    pub fn from_rows(rows: Vec<&'a E>) -> Self {
        Queryable { rows }
    }

    /// Keeps the rows matching `predicate`, preserving order.
    pub fn filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool,
    {
        self.rows.retain(|row| predicate(row));
        self
    }

    /// Sorts the rows with `compare`.
    ///
    /// The sort is stable: rows that compare equal keep their relative order.
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&E, &E) -> Ordering,
    {
        self.rows.sort_by(|a, b| compare(a, b));
        self
    }

    /// Drops the first `n` rows.
    pub fn skip(mut self, n: usize) -> Self {
        if n >= self.rows.len() {
            self.rows.clear();
        } else {
            self.rows.drain(..n);
        }
        self
    }

    /// Keeps at most the first `n` rows.
    pub fn take(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows as a slice.
    pub fn as_slice(&self) -> &[&'a E] {
        &self.rows
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &'a E> + '_ {
        self.rows.iter().copied()
    }

    /// Returns the underlying rows.
    pub fn into_vec(self) -> Vec<&'a E> {
        self.rows
    }

    /// Clones every row into an owned vector.
    pub fn cloned(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.rows.iter().map(|row| (*row).clone()).collect()
    }
}

impl<'a, E: PartialEq> Queryable<'a, E> {
    /// Set union: the distinct rows of `self` followed by the rows of
    /// `other` not already present. The first occurrence of each entity wins.
    ///
    /// Only `PartialEq` is required, so every row is compared against the
    /// rows kept so far: quadratic in the combined length. Prefer
    /// [`union_hashed`](Queryable::union_hashed) for large hashable entities.
    pub fn union(self, other: Queryable<'a, E>) -> Self {
        let mut rows: Vec<&'a E> = Vec::with_capacity(self.rows.len() + other.rows.len());
        for row in self.rows.into_iter().chain(other.rows) {
            if !rows.iter().any(|seen| *seen == row) {
                rows.push(row);
            }
        }
        Queryable { rows }
    }
}

impl<'a, E: Hash + Eq> Queryable<'a, E> {
    /// Set union with the same result as [`union`](Queryable::union), in
    /// linear time.
    pub fn union_hashed(self, other: Queryable<'a, E>) -> Self {
        let mut seen: HashSet<&'a E> = HashSet::with_capacity(self.rows.len() + other.rows.len());
        let rows = self
            .rows
            .into_iter()
            .chain(other.rows)
            .filter(|row| seen.insert(*row))
            .collect();
        Queryable { rows }
    }
}

impl<E> Clone for Queryable<'_, E> {
    fn clone(&self) -> Self {
        Queryable {
            rows: self.rows.clone(),
        }
    }
}

impl<E: PartialEq> PartialEq for Queryable<'_, E> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl<'a, E> From<&'a [E]> for Queryable<'a, E> {
    fn from(items: &'a [E]) -> Self {
        Queryable::new(items)
    }
}

impl<'a, E> From<&'a Vec<E>> for Queryable<'a, E> {
    fn from(items: &'a Vec<E>) -> Self {
        Queryable::new(items)
    }
}

impl<'a, E> FromIterator<&'a E> for Queryable<'a, E> {
    fn from_iter<I: IntoIterator<Item = &'a E>>(iter: I) -> Self {
        Queryable {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a, E> IntoIterator for Queryable<'a, E> {
    type Item = &'a E;
    type IntoIter = std::vec::IntoIter<&'a E>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
