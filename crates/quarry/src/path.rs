//! Property-path resolution.
//!
//! A [`KeyPath`] turns a dotted member path such as `"Address.City"` into a
//! key extractor for an entity type. All validation happens in
//! [`KeyPath::resolve`]; extracting a key afterwards cannot fail.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::describe::{Describe, Field, Member, TypeInfo};
use crate::error::PathError;
use crate::value::{Value, ValueKind};

/// A resolved property path on entities of type `E`.
///
/// Cloning is cheap; a resolved path can be kept and reused for any number
/// of sorters.
///
/// # Example
///
/// ```
/// use quarry::{Describe, KeyPath, Value};
///
/// #[derive(Describe)]
/// struct Address {
///     city: String,
/// }
///
/// #[derive(Describe)]
/// struct Person {
///     address: Address,
/// }
///
/// let path = KeyPath::<Person>::resolve("Address.City").unwrap();
/// let person = Person { address: Address { city: "Oslo".into() } };
/// assert_eq!(path.extract(&person), Value::String("Oslo"));
/// ```
pub struct KeyPath<E> {
    inner: Arc<ResolvedPath>,
    _entity: PhantomData<fn(&E)>,
}

struct ResolvedPath {
    path: String,
    members: Vec<&'static Member>,
    kind: ValueKind,
}

impl<E: Describe> KeyPath<E> {
    /// Resolves `path` against the descriptor of `E`.
    ///
    /// Segments are separated by `.`; each one must name a readable member
    /// of the type produced by the previous segment (case-insensitively),
    /// and the last member must be a scalar.
    pub fn resolve(path: &str) -> Result<Self, PathError> {
        let root = E::type_info();
        match resolve_members(root, path) {
            Ok((members, kind)) => {
                debug!(
                    entity = root.name,
                    path,
                    kind = kind.as_str(),
                    "query.key_path.resolved"
                );
                Ok(KeyPath {
                    inner: Arc::new(ResolvedPath {
                        path: path.to_string(),
                        members,
                        kind,
                    }),
                    _entity: PhantomData,
                })
            }
            Err(err) => {
                debug!(entity = root.name, path, error = %err, "query.key_path.rejected");
                Err(err)
            }
        }
    }

    /// Extracts the key for `entity` by walking the member chain.
    ///
    /// A missing value anywhere along the chain yields [`Value::None`].
    pub fn extract<'a>(&self, entity: &'a E) -> Value<'a> {
        let mut field = Field::Record(entity as &(dyn Any + 'static));
        for member in &self.inner.members {
            field = match (field, member.getter) {
                (Field::Record(record), Some(getter)) => getter(record),
                _ => return Value::None,
            };
        }
        field.into_value()
    }
}

impl<E> KeyPath<E> {
    /// Returns the path as given to [`KeyPath::resolve`].
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Returns the kind of the keys this path extracts.
    pub fn kind(&self) -> ValueKind {
        self.inner.kind
    }

    /// Returns the canonical member names along the path.
    pub fn segments(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.members.iter().map(|m| m.name)
    }
}

fn resolve_members(
    root: &'static TypeInfo,
    path: &str,
) -> Result<(Vec<&'static Member>, ValueKind), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let mut members = Vec::new();
    let mut declaring = root;
    for segment in path.split('.') {
        let member = declaring
            .member(segment)
            .ok_or_else(|| PathError::MissingMember {
                path: path.to_string(),
                segment: segment.to_string(),
                declaring_type: declaring.name,
            })?;
        if !member.is_readable() {
            return Err(PathError::NoGetter {
                path: path.to_string(),
                segment: member.name.to_string(),
                declaring_type: declaring.name,
            });
        }
        members.push(member);
        declaring = member.type_info();
    }

    let kind = declaring
        .scalar_kind()
        .ok_or_else(|| PathError::NotComparable {
            path: path.to_string(),
            type_name: declaring.name,
        })?;
    Ok((members, kind))
}

impl<E> Clone for KeyPath<E> {
    fn clone(&self) -> Self {
        KeyPath {
            inner: Arc::clone(&self.inner),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for KeyPath<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPath")
            .field("path", &self.inner.path)
            .field("kind", &self.inner.kind)
            .finish()
    }
}

impl<E> fmt::Display for KeyPath<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.path)
    }
}
