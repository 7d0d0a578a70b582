//! Composable entity sorters.
//!
//! A [`Sorter`] is an immutable chain of sort keys: one primary ordering
//! followed by any number of secondary orderings that only break ties left by
//! the keys before them. Keys come either from a closure or from a property
//! path resolved through [`KeyPath`].
//!
//! ```
//! use quarry::{Queryable, Sorter};
//!
//! let scores = [(31, 'c'), (25, 'b'), (31, 'a')];
//! let sorter = Sorter::by_desc(|s: &(u32, char)| s.0).then_by(|s: &(u32, char)| s.1);
//!
//! let rows = sorter.sort(Queryable::new(&scores)).unwrap();
//! assert_eq!(rows.cloned(), vec![(31, 'a'), (31, 'c'), (25, 'b')]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::describe::Describe;
use crate::error::{QueryError, Result};
use crate::ordering::Dir;
use crate::path::KeyPath;
use crate::sequence::Queryable;

/// Compares two entities by one key.
trait SortKey<E>: Send + Sync {
    fn compare(&self, a: &E, b: &E) -> Ordering;

    /// Path text for display, `None` for closure keys.
    fn describe(&self) -> Option<&str>;
}

struct FnKey<F, K> {
    extract: F,
    _key: PhantomData<fn() -> K>,
}

impl<E, K, F> SortKey<E> for FnKey<F, K>
where
    F: Fn(&E) -> K + Send + Sync,
    K: Ord,
{
    fn compare(&self, a: &E, b: &E) -> Ordering {
        (self.extract)(a).cmp(&(self.extract)(b))
    }

    fn describe(&self) -> Option<&str> {
        None
    }
}

impl<E: Describe> SortKey<E> for KeyPath<E> {
    fn compare(&self, a: &E, b: &E) -> Ordering {
        self.extract(a).total_cmp(&self.extract(b))
    }

    fn describe(&self) -> Option<&str> {
        Some(self.path())
    }
}

/// One link of a sort chain. `base` is `None` for the primary ordering.
struct SortNode<E> {
    base: Option<Arc<SortNode<E>>>,
    key: Arc<dyn SortKey<E>>,
    dir: Dir,
}

/// An immutable chain of orderings.
///
/// [`Sorter::unordered`] is a seed that cannot sort by itself; call one of
/// the `order_by`/`then_by` methods on it to obtain a usable sorter.
pub struct Sorter<E> {
    node: Option<Arc<SortNode<E>>>,
}

impl<E> Sorter<E> {
    /// The seed sorter. Sorting with it fails with
    /// [`QueryError::UnorderedSorter`].
    pub fn unordered() -> Self {
        Sorter { node: None }
    }

    /// Shorthand for `Sorter::unordered().order_by(key)`.
    pub fn by<K, F>(key: F) -> Self
    where
        F: Fn(&E) -> K + Send + Sync + 'static,
        K: Ord + 'static,
    {
        Sorter::unordered().order_by(key)
    }

    /// Shorthand for `Sorter::unordered().order_by_desc(key)`.
    pub fn by_desc<K, F>(key: F) -> Self
    where
        F: Fn(&E) -> K + Send + Sync + 'static,
        K: Ord + 'static,
    {
        Sorter::unordered().order_by_desc(key)
    }

    /// Orders ascending by `key`.
    ///
    /// A new primary ordering replaces any chain built so far.
    pub fn order_by<K, F>(&self, key: F) -> Self
    where
        F: Fn(&E) -> K + Send + Sync + 'static,
        K: Ord + 'static,
    {
        self.primary(fn_key(key), Dir::Asc)
    }

    /// Orders descending by `key`, replacing any chain built so far.
    pub fn order_by_desc<K, F>(&self, key: F) -> Self
    where
        F: Fn(&E) -> K + Send + Sync + 'static,
        K: Ord + 'static,
    {
        self.primary(fn_key(key), Dir::Desc)
    }

    /// Breaks ties left by this chain, ascending by `key`.
    ///
    /// On the seed sorter this becomes the primary ordering.
    pub fn then_by<K, F>(&self, key: F) -> Self
    where
        F: Fn(&E) -> K + Send + Sync + 'static,
        K: Ord + 'static,
    {
        self.secondary(fn_key(key), Dir::Asc)
    }

    /// Breaks ties left by this chain, descending by `key`.
    pub fn then_by_desc<K, F>(&self, key: F) -> Self
    where
        F: Fn(&E) -> K + Send + Sync + 'static,
        K: Ord + 'static,
    {
        self.secondary(fn_key(key), Dir::Desc)
    }

    fn primary(&self, key: Arc<dyn SortKey<E>>, dir: Dir) -> Self {
        Sorter {
            node: Some(Arc::new(SortNode {
                base: None,
                key,
                dir,
            })),
        }
    }

    fn secondary(&self, key: Arc<dyn SortKey<E>>, dir: Dir) -> Self {
        Sorter {
            node: Some(Arc::new(SortNode {
                base: self.node.clone(),
                key,
                dir,
            })),
        }
    }

    /// Returns `true` for the seed sorter.
    pub fn is_unordered(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the number of keys in the chain.
    pub fn len(&self) -> usize {
        self.chain().len()
    }

    /// Returns `true` if the chain has no keys.
    pub fn is_empty(&self) -> bool {
        self.is_unordered()
    }

    /// Compares two entities by the whole chain, primary key first.
    pub fn compare(&self, a: &E, b: &E) -> Ordering {
        compare_chain(&self.chain(), a, b, false)
    }

    /// Sorts `rows` by the chain.
    ///
    /// Each secondary key only reorders rows that tie on every key before
    /// it; rows tying on the whole chain keep their input order.
    pub fn sort<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        self.sort_with(rows, false)
    }

    /// Sorts `rows` with the direction of every key in the chain flipped.
    ///
    /// This is not the reverse of [`Sorter::sort`]: rows tying on the whole
    /// chain still keep their input order.
    pub fn sort_descending<'a>(&self, rows: Queryable<'a, E>) -> Result<Queryable<'a, E>> {
        self.sort_with(rows, true)
    }

    fn sort_with<'a>(&self, rows: Queryable<'a, E>, flip: bool) -> Result<Queryable<'a, E>> {
        if self.is_unordered() {
            return Err(QueryError::UnorderedSorter);
        }
        let chain = self.chain();
        Ok(rows.sort_by(|a, b| compare_chain(&chain, a, b, flip)))
    }

    /// The chain's nodes, primary first.
    fn chain(&self) -> Vec<&SortNode<E>> {
        let mut nodes = Vec::new();
        let mut node = self.node.as_deref();
        while let Some(current) = node {
            nodes.push(current);
            node = current.base.as_deref();
        }
        nodes.reverse();
        nodes
    }
}

impl<E: Describe> Sorter<E> {
    /// Shorthand for `Sorter::unordered().order_by_path(path)`.
    pub fn by_path(path: &str) -> Result<Self> {
        Sorter::unordered().order_by_path(path)
    }

    /// Shorthand for `Sorter::unordered().order_by_path_desc(path)`.
    pub fn by_path_desc(path: &str) -> Result<Self> {
        Sorter::unordered().order_by_path_desc(path)
    }

    /// Orders ascending by the member at `path`, replacing any chain built
    /// so far. The path is resolved and validated here.
    pub fn order_by_path(&self, path: &str) -> Result<Self> {
        Ok(self.primary(Arc::new(KeyPath::<E>::resolve(path)?), Dir::Asc))
    }

    /// Orders descending by the member at `path`.
    pub fn order_by_path_desc(&self, path: &str) -> Result<Self> {
        Ok(self.primary(Arc::new(KeyPath::<E>::resolve(path)?), Dir::Desc))
    }

    /// Breaks ties ascending by the member at `path`.
    pub fn then_by_path(&self, path: &str) -> Result<Self> {
        Ok(self.secondary(Arc::new(KeyPath::<E>::resolve(path)?), Dir::Asc))
    }

    /// Breaks ties descending by the member at `path`.
    pub fn then_by_path_desc(&self, path: &str) -> Result<Self> {
        Ok(self.secondary(Arc::new(KeyPath::<E>::resolve(path)?), Dir::Desc))
    }

    /// Appends `path` to the chain with an explicit direction.
    pub fn then_by_path_dir(&self, path: &str, dir: Dir) -> Result<Self> {
        Ok(self.secondary(Arc::new(KeyPath::<E>::resolve(path)?), dir))
    }
}

fn fn_key<E, K, F>(key: F) -> Arc<dyn SortKey<E>>
where
    F: Fn(&E) -> K + Send + Sync + 'static,
    K: Ord + 'static,
{
    Arc::new(FnKey {
        extract: key,
        _key: PhantomData,
    })
}

fn compare_chain<E>(chain: &[&SortNode<E>], a: &E, b: &E, flip: bool) -> Ordering {
    for node in chain {
        let dir = if flip { node.dir.flip() } else { node.dir };
        let ordering = dir.apply(node.key.compare(a, b));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl<E> Clone for Sorter<E> {
    fn clone(&self) -> Self {
        Sorter {
            node: self.node.clone(),
        }
    }
}

impl<E> Default for Sorter<E> {
    fn default() -> Self {
        Sorter::unordered()
    }
}

/// Renders the chain, e.g. `address.city, <key> desc`.
impl<E> fmt::Display for Sorter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.chain().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(node.key.describe().unwrap_or("<key>"))?;
            if node.dir.is_desc() {
                f.write_str(" desc")?;
            }
        }
        Ok(())
    }
}

impl<E> fmt::Debug for Sorter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unordered() {
            f.write_str("Sorter(unordered)")
        } else {
            write!(f, "Sorter({self})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Row = (u32, &'static str, u32);

    fn rows() -> Vec<Row> {
        vec![(2, "b", 1), (1, "a", 2), (2, "a", 3), (1, "b", 4), (2, "a", 5)]
    }

    fn ids(rows: Queryable<'_, Row>) -> Vec<u32> {
        rows.iter().map(|r| r.2).collect()
    }

    #[test]
    fn seed_cannot_sort() {
        let items = rows();
        let seed = Sorter::<Row>::unordered();
        assert!(seed.is_unordered());
        assert_eq!(
            seed.sort(Queryable::new(&items)).unwrap_err(),
            QueryError::UnorderedSorter
        );
        assert_eq!(
            seed.sort_descending(Queryable::new(&[])).unwrap_err(),
            QueryError::UnorderedSorter
        );
    }

    #[test]
    fn primary_ordering_is_stable() {
        let items = rows();
        let sorted = Sorter::by(|r: &Row| r.0).sort(Queryable::new(&items)).unwrap();
        assert_eq!(ids(sorted), vec![2, 4, 1, 3, 5]);
    }

    #[test]
    fn secondary_breaks_ties_only() {
        let items = rows();
        let sorter = Sorter::by(|r: &Row| r.0).then_by(|r: &Row| r.1);
        assert_eq!(sorter.len(), 2);
        let sorted = sorter.sort(Queryable::new(&items)).unwrap();
        assert_eq!(ids(sorted), vec![2, 4, 3, 5, 1]);
    }

    #[test]
    fn secondary_descending() {
        let items = rows();
        let sorter = Sorter::by(|r: &Row| r.0).then_by_desc(|r: &Row| r.1);
        let sorted = sorter.sort(Queryable::new(&items)).unwrap();
        assert_eq!(ids(sorted), vec![4, 2, 1, 3, 5]);
    }

    #[test]
    fn sort_descending_flips_every_key() {
        let items = rows();
        let sorter = Sorter::by(|r: &Row| r.0).then_by_desc(|r: &Row| r.1);
        let flipped = Sorter::by_desc(|r: &Row| r.0).then_by(|r: &Row| r.1);

        let descending = sorter.sort_descending(Queryable::new(&items)).unwrap();
        let expected = flipped.sort(Queryable::new(&items)).unwrap();
        assert_eq!(descending, expected);
        // Full ties (ids 3 and 5) keep input order instead of reversing.
        assert_eq!(ids(descending), vec![3, 5, 1, 2, 4]);
    }

    #[test]
    fn order_by_replaces_chain() {
        let items = rows();
        let sorter = Sorter::by(|r: &Row| r.1)
            .then_by(|r: &Row| r.2)
            .order_by_desc(|r: &Row| r.2);
        assert_eq!(sorter.len(), 1);
        let sorted = sorter.sort(Queryable::new(&items)).unwrap();
        assert_eq!(ids(sorted), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn then_by_on_seed_is_primary() {
        let items = rows();
        let sorter = Sorter::unordered().then_by(|r: &Row| r.2);
        assert_eq!(sorter.len(), 1);
        let sorted = sorter.sort_descending(Queryable::new(&items)).unwrap();
        assert_eq!(ids(sorted), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn shared_base_is_not_modified() {
        let items = rows();
        let base = Sorter::by(|r: &Row| r.0);
        let by_name = base.then_by(|r: &Row| r.1);
        let by_name_desc = base.then_by_desc(|r: &Row| r.1);

        assert_eq!(base.len(), 1);
        assert_eq!(ids(base.sort(Queryable::new(&items)).unwrap()), vec![2, 4, 1, 3, 5]);
        assert_eq!(ids(by_name.sort(Queryable::new(&items)).unwrap()), vec![2, 4, 3, 5, 1]);
        assert_eq!(
            ids(by_name_desc.sort(Queryable::new(&items)).unwrap()),
            vec![4, 2, 1, 3, 5]
        );
    }

    #[test]
    fn compare_uses_whole_chain() {
        let sorter = Sorter::by(|r: &Row| r.0).then_by_desc(|r: &Row| r.1);
        assert_eq!(sorter.compare(&(1, "a", 0), &(2, "a", 0)), Ordering::Less);
        assert_eq!(sorter.compare(&(1, "a", 0), &(1, "b", 0)), Ordering::Greater);
        assert_eq!(sorter.compare(&(1, "a", 0), &(1, "a", 9)), Ordering::Equal);
    }

    #[test]
    fn display_lists_keys() {
        let sorter = Sorter::by(|r: &Row| r.0).then_by_desc(|r: &Row| r.1);
        assert_eq!(sorter.to_string(), "<key>, <key> desc");
        assert_eq!(format!("{:?}", Sorter::<Row>::unordered()), "Sorter(unordered)");
    }
}
