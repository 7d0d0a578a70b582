//! Proc macros for quarry.
//!
//! Rust has no runtime reflection, so property paths like `"Address.City"`
//! are resolved against member tables generated at compile time.
//!
//! ## Derive Macros
//!
//! - [`Describe`] - Generate the member table and member name constants for
//!   a struct
//!
//! # Examples
//!
//! For working examples, see `quarry/tests/describe_derive.rs`.

mod describe;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Describe` trait so a struct can be navigated by property
/// paths.
///
/// Every named field becomes a member of the struct's table. By default the
/// field type must itself implement `Describe`: strings, numbers, booleans,
/// `Timestamp`, other derived structs, and `Option`/`Box`/`Arc` of those.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `Enum` | Key the field through its `EnumKey` impl |
/// | `Timestamp` | Key the field through its `TimestampKey` impl |
/// | `write_only` | List the member without a getter; paths naming it are rejected |
/// | `skip` | Leave the field out of the table |
/// | `rename = "..."` | Use a custom member name in paths |
///
/// # Generated Code
///
/// 1. A `pub const` per readable member holding its name (`NAME`, `ZIP_CODE`)
/// 2. Implementation of `Describe::type_info()` and `Describe::as_field()`
///
/// Generic structs are not supported; implement `Describe` by hand for them.
///
/// # Example
///
/// ```ignore
/// use quarry::{Describe, EnumKey, Sorter};
///
/// #[derive(Clone, Copy)]
/// enum Status { Open, Closed }
///
/// impl EnumKey for Status {
///     fn enum_key(&self) -> u32 {
///         match self {
///             Status::Open => 0,
///             Status::Closed => 1,
///         }
///     }
/// }
///
/// #[derive(Describe)]
/// struct Address {
///     #[query(rename = "Town")]
///     city: String,
/// }
///
/// #[derive(Describe)]
/// struct Ticket {
///     id: u32,
///     #[query(Enum)]
///     status: Status,
///     #[query(Timestamp)]
///     opened_at: i64,
///     address: Option<Address>,
///     #[query(write_only)]
///     secret: String,
///     #[query(skip)]
///     attachments: Vec<u8>,
/// }
///
/// let sorter = Sorter::<Ticket>::by_path(Ticket::STATUS)?
///     .then_by_path("address.town")?
///     .then_by_path_desc(Ticket::OPENED_AT)?;
/// ```
#[proc_macro_derive(Describe, attributes(query))]
pub fn describe_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    describe::describe_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
