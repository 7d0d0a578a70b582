//! Error types for the quarry crate.

use thiserror::Error;

/// Errors raised while building or applying query specifications.
///
/// Everything except [`QueryError::UnorderedSorter`] is detected when a
/// filter, sorter or query is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An argument to a constructor or combinator is invalid.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// A property path could not be resolved against the entity type.
    #[error(transparent)]
    PathResolution(#[from] PathError),

    /// The seed sorter was asked to sort.
    #[error(
        "the unordered seed sorter cannot sort; call order_by or then_by on it to obtain a usable sorter"
    )]
    UnorderedSorter,
}

impl QueryError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        QueryError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Reasons a property path fails to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path string was empty.
    #[error("the property path should not be an empty string")]
    Empty,

    /// A segment names no member of its declaring type.
    #[error("'{path}' could not be parsed: {declaring_type} does not contain a member named '{segment}'")]
    MissingMember {
        path: String,
        segment: String,
        declaring_type: &'static str,
    },

    /// A segment names a member that cannot be read.
    #[error("'{path}' could not be parsed: the member '{segment}' of {declaring_type} does not have a getter")]
    NoGetter {
        path: String,
        segment: String,
        declaring_type: &'static str,
    },

    /// The final member is a record, which has no natural ordering.
    #[error("'{path}' could not be parsed: {type_name} is not a comparable type")]
    NotComparable {
        path: String,
        type_name: &'static str,
    },
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QueryError>;
