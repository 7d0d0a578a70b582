//! Type descriptors for property-path resolution.
//!
//! Rust has no runtime reflection, so every type that can appear along a
//! property path publishes a static member table through [`Describe`]. The
//! table is normally generated by `#[derive(Describe)]`; scalar leaves
//! (strings, numbers, booleans, timestamps) are described by this module.
//!
//! # Manual Implementation
//!
//! ```
//! use std::any::Any;
//! use quarry::{Describe, Field, Member, TypeInfo};
//!
//! struct Address {
//!     city: String,
//! }
//!
//! impl Describe for Address {
//!     fn type_info() -> &'static TypeInfo {
//!         fn get_city<'a>(entity: &'a (dyn Any + 'static)) -> Field<'a> {
//!             match entity.downcast_ref::<Address>() {
//!                 Some(address) => address.city.as_field(),
//!                 None => Field::MISSING,
//!             }
//!         }
//!         static MEMBERS: &[Member] = &[Member::readable(
//!             "city",
//!             <String as Describe>::type_info,
//!             get_city,
//!         )];
//!         static INFO: TypeInfo = TypeInfo::record("Address", MEMBERS);
//!         &INFO
//!     }
//!
//!     fn as_field(&self) -> Field<'_> {
//!         Field::Record(self)
//!     }
//! }
//!
//! assert!(Address::type_info().member("City").is_some());
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::value::{Number, Timestamp, Value, ValueKind};

/// A type that can be navigated by property paths.
pub trait Describe: Any {
    /// Returns the static descriptor of this type.
    fn type_info() -> &'static TypeInfo;

    /// Returns this value as a step along a path: either a scalar key or a
    /// record whose members can be read further.
    fn as_field(&self) -> Field<'_>;
}

/// Reads one member from a record. The argument is the record itself.
pub type Getter = for<'a> fn(&'a (dyn Any + 'static)) -> Field<'a>;

/// The result of reading a member.
#[derive(Clone, Copy)]
pub enum Field<'a> {
    /// A scalar key, the end of a path.
    Value(Value<'a>),
    /// A record, navigated by the next segment.
    Record(&'a (dyn Any + 'static)),
}

impl Field<'static> {
    /// A missing value (e.g. `None` in an optional member).
    pub const MISSING: Self = Field::Value(Value::None);
}

impl<'a> Field<'a> {
    /// Returns the scalar value, or [`Value::None`] for a record.
    pub fn into_value(self) -> Value<'a> {
        match self {
            Field::Value(value) => value,
            Field::Record(_) => Value::None,
        }
    }
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Field::Record(_) => f.write_str("Record(..)"),
        }
    }
}

/// Static description of a type.
#[derive(Debug)]
pub struct TypeInfo {
    /// Type name used in error messages.
    pub name: &'static str,
    /// Whether the type is a scalar key or a record of members.
    pub shape: Shape,
}

/// The shape of a described type.
#[derive(Debug)]
pub enum Shape {
    /// A leaf with a natural ordering.
    Scalar(ValueKind),
    /// A record with named members.
    Record(&'static [Member]),
}

impl TypeInfo {
    /// Describes a scalar type.
    pub const fn scalar(name: &'static str, kind: ValueKind) -> Self {
        TypeInfo {
            name,
            shape: Shape::Scalar(kind),
        }
    }

    /// Describes a record type.
    pub const fn record(name: &'static str, members: &'static [Member]) -> Self {
        TypeInfo {
            name,
            shape: Shape::Record(members),
        }
    }

    /// Returns the scalar kind, or `None` for records.
    pub fn scalar_kind(&self) -> Option<ValueKind> {
        match self.shape {
            Shape::Scalar(kind) => Some(kind),
            Shape::Record(_) => None,
        }
    }

    /// Returns the members of a record; scalars have none.
    pub fn members(&self) -> &'static [Member] {
        match self.shape {
            Shape::Scalar(_) => &[],
            Shape::Record(members) => members,
        }
    }

    /// Looks up a member by name.
    ///
    /// An exact match wins; otherwise the first member whose name matches
    /// ignoring ASCII case is returned.
    pub fn member(&self, name: &str) -> Option<&'static Member> {
        let members = self.members();
        members
            .iter()
            .find(|m| m.name == name)
            .or_else(|| members.iter().find(|m| m.name.eq_ignore_ascii_case(name)))
    }
}

/// A named member of a record.
pub struct Member {
    /// Member name as matched by property paths.
    pub name: &'static str,
    /// Descriptor of the member's declared type.
    pub ty: fn() -> &'static TypeInfo,
    /// Reads the member; `None` for write-only members.
    pub getter: Option<Getter>,
}

impl Member {
    /// A member that can be read.
    pub const fn readable(
        name: &'static str,
        ty: fn() -> &'static TypeInfo,
        getter: Getter,
    ) -> Self {
        Member {
            name,
            ty,
            getter: Some(getter),
        }
    }

    /// A member that exists but cannot be read, so it can never be a key.
    pub const fn write_only(name: &'static str, ty: fn() -> &'static TypeInfo) -> Self {
        Member {
            name,
            ty,
            getter: None,
        }
    }

    /// Returns `true` if the member has a getter.
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// Returns the descriptor of the member's declared type.
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.ty)()
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("type", &self.type_info().name)
            .field("readable", &self.is_readable())
            .finish()
    }
}

/// Converts an enum to a stable discriminant key.
///
/// Used by `#[derive(Describe)]` for fields marked `#[query(Enum)]`.
///
/// ```
/// use quarry::EnumKey;
///
/// #[derive(Clone, Copy)]
/// enum Status {
///     Pending,
///     Active,
/// }
///
/// impl EnumKey for Status {
///     fn enum_key(&self) -> u32 {
///         match self {
///             Status::Pending => 0,
///             Status::Active => 1,
///         }
///     }
/// }
/// ```
pub trait EnumKey {
    /// Returns the discriminant value for this variant.
    ///
    /// Use explicit values rather than relying on declaration order so the
    /// ordering stays stable.
    fn enum_key(&self) -> u32;

    /// The comparable value of this key. The derive reads members through
    /// this, so an absent key can report [`Value::None`].
    fn enum_value(&self) -> Value<'static> {
        Value::Enum(self.enum_key())
    }
}

/// An optional enum member. `None` is missing when read through a path;
/// its raw `enum_key` is 0.
impl<T: EnumKey> EnumKey for Option<T> {
    fn enum_key(&self) -> u32 {
        self.as_ref().map_or(0, T::enum_key)
    }

    fn enum_value(&self) -> Value<'static> {
        match self {
            Some(inner) => inner.enum_value(),
            None => Value::None,
        }
    }
}

/// Converts a datetime type to a [`Timestamp`] key.
///
/// Used by `#[derive(Describe)]` for fields marked `#[query(Timestamp)]`.
pub trait TimestampKey {
    /// Converts this value to a [`Timestamp`].
    fn timestamp_key(&self) -> Timestamp;

    /// The comparable value of this key. The derive reads members through
    /// this, so an absent key can report [`Value::None`].
    fn timestamp_value(&self) -> Value<'static> {
        Value::Timestamp(self.timestamp_key())
    }
}

impl TimestampKey for i64 {
    fn timestamp_key(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

/// Milliseconds past `i64::MAX` saturate.
impl TimestampKey for u64 {
    fn timestamp_key(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

/// An optional timestamp member. `None` is missing when read through a
/// path; its raw `timestamp_key` is the epoch.
impl<T: TimestampKey> TimestampKey for Option<T> {
    fn timestamp_key(&self) -> Timestamp {
        self.as_ref().map_or(Timestamp::default(), T::timestamp_key)
    }

    fn timestamp_value(&self) -> Value<'static> {
        match self {
            Some(inner) => inner.timestamp_value(),
            None => Value::None,
        }
    }
}

impl TimestampKey for Timestamp {
    fn timestamp_key(&self) -> Timestamp {
        *self
    }
}

/// Descriptor for members whose value is an [`EnumKey`] discriminant.
pub fn enum_type_info() -> &'static TypeInfo {
    static INFO: TypeInfo = TypeInfo::scalar("enum", ValueKind::Enum);
    &INFO
}

/// Descriptor for members whose value is a [`TimestampKey`].
pub fn timestamp_type_info() -> &'static TypeInfo {
    static INFO: TypeInfo = TypeInfo::scalar("Timestamp", ValueKind::Timestamp);
    &INFO
}

macro_rules! describe_number {
    ($($ty:ty),*) => {
        $(
            impl Describe for $ty {
                fn type_info() -> &'static TypeInfo {
                    static INFO: TypeInfo = TypeInfo::scalar(stringify!($ty), ValueKind::Number);
                    &INFO
                }

                fn as_field(&self) -> Field<'_> {
                    Field::Value(Value::Number(Number::from(*self)))
                }
            }
        )*
    };
}

describe_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Describe for String {
    fn type_info() -> &'static TypeInfo {
        static INFO: TypeInfo = TypeInfo::scalar("String", ValueKind::String);
        &INFO
    }

    fn as_field(&self) -> Field<'_> {
        Field::Value(Value::String(self))
    }
}

impl Describe for &'static str {
    fn type_info() -> &'static TypeInfo {
        static INFO: TypeInfo = TypeInfo::scalar("&str", ValueKind::String);
        &INFO
    }

    fn as_field(&self) -> Field<'_> {
        Field::Value(Value::String(self))
    }
}

impl Describe for bool {
    fn type_info() -> &'static TypeInfo {
        static INFO: TypeInfo = TypeInfo::scalar("bool", ValueKind::Bool);
        &INFO
    }

    fn as_field(&self) -> Field<'_> {
        Field::Value(Value::Bool(*self))
    }
}

impl Describe for Timestamp {
    fn type_info() -> &'static TypeInfo {
        timestamp_type_info()
    }

    fn as_field(&self) -> Field<'_> {
        Field::Value(Value::Timestamp(*self))
    }
}

// Wrappers are transparent: a path walks straight through them.

impl<T: Describe> Describe for Option<T> {
    fn type_info() -> &'static TypeInfo {
        T::type_info()
    }

    fn as_field(&self) -> Field<'_> {
        match self {
            Some(inner) => inner.as_field(),
            None => Field::MISSING,
        }
    }
}

impl<T: Describe> Describe for Box<T> {
    fn type_info() -> &'static TypeInfo {
        T::type_info()
    }

    fn as_field(&self) -> Field<'_> {
        (**self).as_field()
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn type_info() -> &'static TypeInfo {
        T::type_info()
    }

    fn as_field(&self) -> Field<'_> {
        (**self).as_field()
    }
}
