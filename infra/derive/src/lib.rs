#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the Lyceum crates.
//!
//! Every crate in the workspace describes its failures with a single error enum.
//! [`macro@lyceum_error`] turns such an enum into a `thiserror` error with context
//! support through `?` and `.context(..)`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless the enum already derives them.
/// * A `<Name>Ext` trait with `.context(..)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant that carries a source error.
/// * `From<Source>` for every variant that carries a source error.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper used by the `#[error(..)]` strings.
///
/// # Requirements
///
/// * Only enums with named-field variants are accepted.
/// * A `context` field must be typed `Option<Cow<'static, str>>`.
/// * A variant with a source (`source` field, `#[source]` or `#[from]`) must also
///   have a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[lyceum_derive::lyceum_error]
/// pub enum StoreError {
///     #[error("SurrealDB error{}: {source}", format_context(.context))]
///     Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// async fn count(db: &Surreal<Any>) -> Result<usize, StoreError> {
///     let mut response = db.query("SELECT * FROM registration").await.context("Counting")?;
///     let rows: Vec<serde_json::Value> = response.take(0)?;
///     Ok(rows.len())
/// }
/// ```
#[proc_macro_attribute]
pub fn lyceum_error(args: TokenStream, item: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "lyceum_error does not take arguments",
        )
        .to_compile_error()
        .into();
    }

    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).unwrap_or_else(syn::Error::into_compile_error).into()
}
