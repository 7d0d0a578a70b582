//! Attribute parsing for the Describe derive macro.
//!
//! This module provides parsers for the `#[query(...)]` field attributes
//! used by the `Describe` derive macro.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

/// How a member's key is produced when the field type does not describe
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Enum field: `#[query(Enum)]`, keyed through `EnumKey`.
    Enum,
    /// Timestamp field: `#[query(Timestamp)]`, keyed through `TimestampKey`.
    Timestamp,
}

impl KeyKind {
    /// Parse a key kind from an identifier.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        KeyKind::from_name(&ident.to_string(), ident.span())
    }

    /// Parse a key kind from a name.
    pub fn from_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "Enum" | "enum" | "enumeration" => Ok(KeyKind::Enum),
            "Timestamp" | "timestamp" => Ok(KeyKind::Timestamp),
            other => Err(Error::new(
                span,
                format!(
                    "unknown query attribute: '{}'. Expected one of: Enum, Timestamp, skip, write_only",
                    other
                ),
            )),
        }
    }
}

/// Field-level attributes from `#[query(...)]`.
#[derive(Debug, Clone)]
pub struct QueryAttr {
    /// Explicit key kind; `None` uses the field type's own `Describe` impl.
    pub kind: Option<KeyKind>,
    /// Leave this field out of the member table.
    pub skip: bool,
    /// List the member without a getter.
    pub write_only: bool,
    /// Custom member name for paths (default: field name).
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for QueryAttr {
    fn default() -> Self {
        QueryAttr {
            kind: None,
            skip: false,
            write_only: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for QueryAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = QueryAttr {
            span: input.span(),
            ..QueryAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                // Flags and kinds: query(skip), query(write_only), query(Enum)
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if p.is_ident("write_only") {
                        attr.write_only = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(KeyKind::from_ident(ident)?);
                        attr.span = ident.span();
                    } else {
                        return Err(Error::new(
                            p.span(),
                            "expected Enum, Timestamp, skip, or write_only",
                        ));
                    }
                }

                // rename = "custom_name" or ty = "enum"
                Meta::NameValue(nv) => {
                    let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    else {
                        return Err(Error::new(nv.value.span(), "expected a string literal"));
                    };
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(s.value());
                    } else if nv.path.is_ident("ty") {
                        attr.kind = Some(KeyKind::from_name(&s.value(), s.span())?);
                        attr.span = s.span();
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown query attribute. Expected: Enum, Timestamp, skip, write_only, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        if attr.skip && (attr.write_only || attr.kind.is_some() || attr.rename.is_some()) {
            return Err(Error::new(
                attr.span,
                "skip cannot be combined with other query attributes",
            ));
        }

        Ok(attr)
    }
}

/// Extract `#[query(...)]` attributes from a field's attributes.
pub fn parse_query_attrs(attrs: &[Attribute]) -> Result<QueryAttr> {
    for attr in attrs {
        if attr.path().is_ident("query") {
            return attr.parse_args::<QueryAttr>();
        }
    }
    Ok(QueryAttr::default())
}
