//! Implementation of the `#[derive(Describe)]` macro.
//!
//! This macro generates an implementation of the `Describe` trait, backed by
//! a static member table with one getter function per readable field, and
//! member name constants for building paths without string typos.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_query_attrs, KeyKind};

/// Main implementation of the Describe derive macro.
pub fn describe_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    // Member tables are statics, which cannot depend on type parameters
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Describe cannot be derived for generic structs; implement it by hand",
        ));
    }

    // Ensure we have a struct with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Describe can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Describe can only be derived for structs",
            ))
        }
    };

    let mut getters: Vec<TokenStream> = Vec::new();
    let mut members: Vec<TokenStream> = Vec::new();
    let mut member_constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let field_ty = &field.ty;

        let query_attrs = parse_query_attrs(&field.attrs)?;
        if query_attrs.skip {
            continue;
        }

        let member_name = query_attrs
            .rename
            .unwrap_or_else(|| field_name.unraw().to_string());

        let type_info = match query_attrs.kind {
            None => quote! { <#field_ty as ::quarry::Describe>::type_info },
            Some(KeyKind::Enum) => quote! { ::quarry::enum_type_info },
            Some(KeyKind::Timestamp) => quote! { ::quarry::timestamp_type_info },
        };

        if query_attrs.write_only {
            members.push(quote! {
                ::quarry::Member::write_only(#member_name, #type_info),
            });
            continue;
        }

        let field_expr = match query_attrs.kind {
            None => quote! { ::quarry::Describe::as_field(&record.#field_name) },
            Some(KeyKind::Enum) => quote! {
                ::quarry::Field::Value(::quarry::EnumKey::enum_value(&record.#field_name))
            },
            Some(KeyKind::Timestamp) => quote! {
                ::quarry::Field::Value(::quarry::TimestampKey::timestamp_value(
                    &record.#field_name
                ))
            },
        };

        let getter_name = format_ident!("__quarry_get_{}", field_name.unraw());
        getters.push(quote! {
            fn #getter_name<'a>(
                record: &'a (dyn ::core::any::Any + 'static),
            ) -> ::quarry::Field<'a> {
                match record.downcast_ref::<#struct_name>() {
                    Some(record) => #field_expr,
                    None => ::quarry::Field::MISSING,
                }
            }
        });
        members.push(quote! {
            ::quarry::Member::readable(#member_name, #type_info, #getter_name),
        });

        // Generate constant name (SCREAMING_SNAKE_CASE)
        let const_name = format_ident!("{}", to_screaming_snake_case(&member_name));
        member_constants.push(quote! {
            /// Member name constant for property paths.
            pub const #const_name: &str = #member_name;
        });
    }

    let type_name = struct_name.unraw().to_string();

    let expanded = quote! {
        impl #struct_name {
            #(#member_constants)*
        }

        impl ::quarry::Describe for #struct_name {
            fn type_info() -> &'static ::quarry::TypeInfo {
                #(#getters)*

                static MEMBERS: &[::quarry::Member] = &[
                    #(#members)*
                ];
                static INFO: ::quarry::TypeInfo = ::quarry::TypeInfo::record(#type_name, MEMBERS);
                &INFO
            }

            fn as_field(&self) -> ::quarry::Field<'_> {
                ::quarry::Field::Record(self)
            }
        }
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("zip_code"), "ZIP_CODE");
        assert_eq!(to_screaming_snake_case("ZipCode"), "ZIP_CODE");
        assert_eq!(to_screaming_snake_case("home-city"), "HOME_CITY");
        assert_eq!(to_screaming_snake_case("URL"), "URL");
    }

    #[test]
    fn test_generates_member_table() {
        let input: DeriveInput = parse_quote! {
            struct Person {
                name: String,
                #[query(rename = "Town")]
                city: String,
                #[query(write_only)]
                password: String,
                #[query(skip)]
                cache: Vec<u8>,
            }
        };
        let output = describe_derive_impl(input).unwrap().to_string();
        assert!(output.contains("__quarry_get_name"));
        assert!(output.contains("\"Town\""));
        assert!(output.contains("write_only"));
        assert!(output.contains("\"password\""));
        assert!(!output.contains("__quarry_get_password"));
        assert!(output.contains("pub const TOWN"));
        assert!(!output.contains("PASSWORD"));
        assert!(!output.contains("cache"));
    }

    #[test]
    fn test_getters_borrow_from_record() {
        let input: DeriveInput = parse_quote! {
            struct Event {
                #[query(Timestamp)]
                at: Option<i64>,
                #[query(Enum)]
                level: Level,
            }
        };
        let output: String = describe_derive_impl(input)
            .unwrap()
            .to_string()
            .split_whitespace()
            .collect();
        assert!(output.contains("fn__quarry_get_at<'a>(record:&'a(dyn"));
        assert!(output.contains("->::quarry::Field<'a>"));
        assert!(output.contains("timestamp_value"));
        assert!(output.contains("enum_value"));
    }

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Status { Open, Closed }
        };
        let err = describe_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Id(u32);
        };
        let err = describe_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_generics() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T> { inner: T }
        };
        let err = describe_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("generic structs"));
    }
}
