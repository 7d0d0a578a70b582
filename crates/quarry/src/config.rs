//! Serializable query configuration.
//!
//! A [`QueryConfig`] carries the parts of a query that can be expressed as
//! data: the sort order by property path, and pagination. Sort orders use a
//! compact string form, so a config reads naturally in JSON or TOML:
//!
//! ```json
//! { "sort": "address.city desc, name", "skip": 20, "take": 10 }
//! ```
//!
//! Paths are only resolved when the config is turned into a sorter, against
//! the entity type chosen at that point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::describe::Describe;
use crate::error::{QueryError, Result};
use crate::ordering::Dir;
use crate::sorter::Sorter;

/// Sort and pagination settings for a [`crate::Query`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Sort keys, primary first.
    pub sort: SortSpec,
    /// Rows to skip.
    pub skip: usize,
    /// Maximum rows to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
}

/// One sort key: a property path and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub path: String,
    #[serde(default)]
    pub dir: Dir,
}

impl SortKey {
    pub fn new(path: impl Into<String>, dir: Dir) -> Self {
        SortKey {
            path: path.into(),
            dir,
        }
    }

    pub fn asc(path: impl Into<String>) -> Self {
        SortKey::new(path, Dir::Asc)
    }

    pub fn desc(path: impl Into<String>) -> Self {
        SortKey::new(path, Dir::Desc)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dir {
            Dir::Asc => f.write_str(&self.path),
            Dir::Desc => write!(f, "{} desc", self.path),
        }
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    /// Parses `path` or `path <dir>`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let path = parts
            .next()
            .ok_or_else(|| QueryError::invalid_argument("sort", "empty sort key"))?;
        let dir = match parts.next() {
            Some(dir) => dir.parse()?,
            None => Dir::Asc,
        };
        if let Some(extra) = parts.next() {
            return Err(QueryError::invalid_argument(
                "sort",
                format!("unexpected '{extra}' after sort key '{path} {dir}'"),
            ));
        }
        Ok(SortKey::new(path, dir))
    }
}

/// An ordered list of sort keys.
///
/// Serializes as a comma-separated string such as `"address.city desc, id"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        SortSpec { keys }
    }

    /// Appends a key.
    pub fn then(mut self, key: SortKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolves every path against `E` and builds the sorter.
    ///
    /// Returns `Ok(None)` for an empty spec.
    pub fn to_sorter<E: Describe>(&self) -> Result<Option<Sorter<E>>> {
        let Some((first, rest)) = self.keys.split_first() else {
            return Ok(None);
        };
        let mut sorter = match first.dir {
            Dir::Asc => Sorter::by_path(&first.path)?,
            Dir::Desc => Sorter::by_path_desc(&first.path)?,
        };
        for key in rest {
            sorter = sorter.then_by_path_dir(&key.path, key.dir)?;
        }
        Ok(Some(sorter))
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        SortSpec::new(keys)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for SortSpec {
    type Err = QueryError;

    /// Parses comma-separated keys. A blank string is the empty spec; a
    /// blank key between commas is an error.
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(SortSpec::default());
        }
        let keys = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<SortKey>>>()?;
        Ok(SortSpec { keys })
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SortSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
