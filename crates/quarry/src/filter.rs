//! Composable entity filters.
//!
//! A [`Filter`] is an immutable chain of predicates combined with AND.
//! Chaining never modifies the original filter: [`Filter::and`] returns a new
//! filter that shares its base, so one base can seed many derived filters.

use std::fmt;
use std::sync::Arc;

use crate::sequence::Queryable;

/// A shareable entity predicate.
pub type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// An immutable AND-chain of predicates.
///
/// # Example
///
/// ```
/// use quarry::{Filter, Queryable};
///
/// let words = ["Tea", "Toast", "Bread", "Tart"];
/// let starts_with_t = Filter::matching(|w: &&str| w.starts_with('T'));
/// let short = starts_with_t.and(|w: &&str| w.len() <= 4);
///
/// let rows = short.apply(Queryable::new(&words));
/// assert_eq!(rows.cloned(), vec!["Tea", "Tart"]);
///
/// // The base filter is unchanged.
/// assert_eq!(starts_with_t.apply(Queryable::new(&words)).len(), 3);
/// ```
pub struct Filter<E> {
    node: Option<Arc<WhereNode<E>>>,
}

struct WhereNode<E> {
    base: Option<Arc<WhereNode<E>>>,
    predicate: Predicate<E>,
}

impl<E> Filter<E> {
    /// The identity filter: returns its input unchanged.
    pub fn all() -> Self {
        Filter { node: None }
    }

    /// A filter with a single predicate.
    pub fn matching<P>(predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Filter::all().and(predicate)
    }

    /// Returns a new filter requiring both this chain and `predicate`.
    pub fn and<P>(&self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.and_predicate(Arc::new(predicate))
    }

    /// Like [`Filter::and`], for an already shared predicate.
    pub fn and_predicate(&self, predicate: Predicate<E>) -> Self {
        Filter {
            node: Some(Arc::new(WhereNode {
                base: self.node.clone(),
                predicate,
            })),
        }
    }

    /// Returns `true` for the identity filter.
    pub fn is_identity(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the number of predicates in the chain.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut node = self.node.as_deref();
        while let Some(current) = node {
            count += 1;
            node = current.base.as_deref();
        }
        count
    }

    /// Returns `true` if the chain has no predicates.
    pub fn is_empty(&self) -> bool {
        self.is_identity()
    }

    /// Evaluates the whole chain against one entity.
    pub fn matches(&self, entity: &E) -> bool {
        let mut node = self.node.as_deref();
        while let Some(current) = node {
            if !(current.predicate)(entity) {
                return false;
            }
            node = current.base.as_deref();
        }
        true
    }

    /// Filters `rows`, applying the base chain first and this node's
    /// predicate last.
    pub fn apply<'a>(&self, rows: Queryable<'a, E>) -> Queryable<'a, E> {
        match &self.node {
            Some(node) => node.apply(rows),
            None => rows,
        }
    }
}

impl<E> WhereNode<E> {
    fn apply<'a>(&self, rows: Queryable<'a, E>) -> Queryable<'a, E> {
        let rows = match &self.base {
            Some(base) => base.apply(rows),
            None => rows,
        };
        rows.filter(|entity| (self.predicate)(entity))
    }
}

impl<E> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Filter {
            node: self.node.clone(),
        }
    }
}

impl<E> Default for Filter<E> {
    fn default() -> Self {
        Filter::all()
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            f.write_str("Filter(unfiltered)")
        } else {
            write!(f, "Filter(where x{})", self.len())
        }
    }
}
