//! Code generation for the `Record` derive
//!
//! Every derived struct gets four impls: the static shape, dynamic field
//! access, the nested-value conversion used when it appears inside another
//! record, and the mapping entry point.

use crate::parsing::{FieldInfo, RecordInfo};
use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

pub fn generate_shape_impl(name: &Ident, info: &RecordInfo, fields: &[FieldInfo]) -> TokenStream {
    let krate = &info.crate_path;
    let table = &info.table;
    let name_str = name.to_string();

    let field_defs = fields.iter().map(|field| {
        let field_name = field.ident.to_string();
        let relation = match &field.relation {
            Some(rel) => {
                let rel_table = &rel.table;
                let foreign_key = &rel.foreign_key;
                let references = &rel.references;
                quote! {
                    ::core::option::Option::Some(#krate::record::RelationDef {
                        table: #rel_table,
                        foreign_key: #foreign_key,
                        references: #references,
                    })
                }
            }
            None => quote! { ::core::option::Option::None },
        };
        quote! {
            #krate::record::FieldDef {
                name: #field_name,
                relation: #relation,
            }
        }
    });

    quote! {
        impl #krate::record::Record for #name {
            fn record_shape() -> &'static #krate::record::RecordShape {
                static SHAPE: #krate::record::RecordShape = #krate::record::RecordShape {
                    type_name: ::core::concat!(::core::module_path!(), "::", #name_str),
                    table: #table,
                    fields: &[#(#field_defs),*],
                };
                &SHAPE
            }
        }
    }
}

pub fn generate_dyn_record_impl(name: &Ident, info: &RecordInfo, fields: &[FieldInfo]) -> TokenStream {
    let krate = &info.crate_path;
    let field_type = quote! { #krate::record::FieldType };
    let value = quote! { #krate::type_mapping::FieldValue };

    let get_arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = &field.ident;
        quote! { #index => ::core::option::Option::Some(#field_type::to_field_value(&self.#ident)), }
    });

    let type_id_arms = fields.iter().enumerate().map(|(index, field)| {
        let ty = &field.ty;
        quote! { #index => ::core::option::Option::Some(<#ty as #field_type>::base_type_id()), }
    });

    let set_arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! {
            #index => match <#ty as #field_type>::from_field_value(value) {
                ::core::option::Option::Some(converted) => {
                    self.#ident = converted;
                    true
                }
                ::core::option::Option::None => false,
            },
        }
    });

    let set_json_arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! {
            #index => match <#ty as #field_type>::from_json_value(value) {
                ::core::option::Option::Some(converted) => {
                    self.#ident = converted;
                    true
                }
                ::core::option::Option::None => false,
            },
        }
    });

    let nested_arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = &field.ident;
        quote! { #index => #field_type::as_record(&self.#ident), }
    });

    let nested_mut_arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = &field.ident;
        quote! { #index => #field_type::as_record_mut(&mut self.#ident), }
    });

    quote! {
        impl #krate::record::DynRecord for #name {
            fn shape(&self) -> &'static #krate::record::RecordShape {
                <Self as #krate::record::Record>::record_shape()
            }

            fn field_value(&self, index: usize) -> ::core::option::Option<#value> {
                match index {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_type_id(&self, index: usize) -> ::core::option::Option<::core::any::TypeId> {
                match index {
                    #(#type_id_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(&mut self, index: usize, value: #value) -> bool {
                match index {
                    #(#set_arms)*
                    _ => false,
                }
            }

            #[allow(unused_variables)]
            fn set_json(&mut self, index: usize, value: #krate::serde_json::Value) -> bool {
                match index {
                    #(#set_json_arms)*
                    _ => false,
                }
            }

            fn nested(&self, index: usize) -> ::core::option::Option<&dyn #krate::record::DynRecord> {
                match index {
                    #(#nested_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn nested_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn #krate::record::DynRecord> {
                match index {
                    #(#nested_mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}

pub fn generate_field_type_impl(name: &Ident, info: &RecordInfo) -> TokenStream {
    let krate = &info.crate_path;
    let value = quote! { #krate::type_mapping::FieldValue };

    quote! {
        impl #krate::record::FieldType for #name {
            fn to_field_value(&self) -> #value {
                #krate::record::record_to_value(self)
            }

            fn from_field_value(value: #value) -> ::core::option::Option<Self> {
                #krate::record::record_from_value::<Self>(value)
            }

            fn as_record(&self) -> ::core::option::Option<&dyn #krate::record::DynRecord> {
                ::core::option::Option::Some(self)
            }

            fn as_record_mut(&mut self) -> ::core::option::Option<&mut dyn #krate::record::DynRecord> {
                ::core::option::Option::Some(self)
            }
        }
    }
}

pub fn generate_mappable_impl(name: &Ident, info: &RecordInfo) -> TokenStream {
    let krate = &info.crate_path;

    quote! {
        impl #krate::record::Mappable for #name {
            fn mapped_shape() -> ::core::option::Option<&'static #krate::record::RecordShape> {
                ::core::option::Option::Some(<Self as #krate::record::Record>::record_shape())
            }

            fn record_view(&self) -> ::core::option::Option<&dyn #krate::record::DynRecord> {
                ::core::option::Option::Some(self)
            }

            fn record_view_mut(&mut self) -> ::core::option::Option<&mut dyn #krate::record::DynRecord> {
                ::core::option::Option::Some(self)
            }

            fn blank() -> Self {
                <Self as ::core::default::Default>::default()
            }
        }
    }
}
