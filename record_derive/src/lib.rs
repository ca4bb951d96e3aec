//! Procedural macros for queryable records
//!
//! This crate provides the `Record` derive and the `#[model]` convenience
//! attribute. The derive generates the static shape of a struct (table name,
//! ordered field names, relations) and index-based field access, which is what
//! the list-query builder and the field mapper work against.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error};

mod generation;
mod model_macro;
mod parsing;

use generation::{
    generate_dyn_record_impl, generate_field_type_impl, generate_mappable_impl,
    generate_shape_impl,
};
use model_macro::model_attribute;
use parsing::{parse_fields, parse_record_attributes};

/// Derive macro for the `Record` trait family
///
/// Supported attributes:
/// - `#[record(table = "...")]` on the struct; defaults to the snake_case
///   struct name with an `s` suffix
/// - `#[record(crate = "path::to::query_core")]` when the core crate is
///   re-exported under another path
/// - `#[record(relation(table = "...", foreign_key = "...", references = "id"))]`
///   on a field that holds preloaded related rows
/// - `#[record(skip)]` on a field that is neither queried nor mapped
///
/// The struct must implement `Default`. Generated code refers to
/// `query_core::...`, so that name must resolve at the use site, either as a
/// dependency or through `listquery::prelude::*`.
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Default, Record)]
/// #[record(table = "users")]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
///     #[record(relation(table = "orders", foreign_key = "user_id"))]
///     pub orders: Vec<Order>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Error::new_spanned(&input.generics, "Record cannot be derived for generic structs")
            .to_compile_error()
            .into();
    }

    let record_info = match parse_record_attributes(&input) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let fields = match parse_fields(&input) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    let shape_impl = generate_shape_impl(name, &record_info, &fields);
    let dyn_record_impl = generate_dyn_record_impl(name, &record_info, &fields);
    let field_type_impl = generate_field_type_impl(name, &record_info);
    let mappable_impl = generate_mappable_impl(name, &record_info);

    let expanded = quote::quote! {
        #shape_impl
        #dyn_record_impl
        #field_type_impl
        #mappable_impl
    };

    TokenStream::from(expanded)
}

/// Convenience attribute macro that adds `Debug`, `Clone`, `Default` and `Record`
///
/// Usage:
/// ```rust,ignore
/// #[model]
/// #[record(table = "users")]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
