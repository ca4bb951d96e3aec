//! Parsing utilities for record attributes
//!
//! This module handles the parsing of `#[record(...)]` attributes on structs and
//! fields and the validation of table, column and relation names.

use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr, Path, Result, Type};

/// Validate an SQL identifier and return syn::Error for proc macro error reporting
pub fn validate_identifier_syn(kind: &str, name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid {} '{}': {}", kind, name, e)))
}

/// Compile-time counterpart of the runtime identifier check
fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    // PostgreSQL identifier limit
    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    if is_reserved_keyword(name) {
        return Err(format!("Name '{}' is a reserved SQL keyword", name));
    }

    Ok(())
}

fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "JOIN", "INNER", "LEFT",
        "RIGHT", "FULL", "OUTER", "ON", "AS", "AND", "OR", "NOT", "NULL", "TRUE", "FALSE",
        "CASE", "WHEN", "THEN", "ELSE", "END", "EXISTS", "IN", "LIKE", "BETWEEN", "ORDER",
        "BY", "GROUP", "HAVING", "LIMIT", "OFFSET", "UNION", "TABLE", "CREATE", "DROP",
        "ALTER", "INDEX", "PRIMARY", "FOREIGN", "KEY", "REFERENCES", "DISTINCT", "ALL",
        "ANY", "CAST", "CHECK", "COLUMN", "CONSTRAINT", "DEFAULT", "GRANT", "USER",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

/// `UserProfile` -> `user_profile`
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug)]
pub struct RecordInfo {
    pub table: String,
    pub crate_path: Path,
}

#[derive(Debug)]
pub struct RelationInfo {
    pub table: String,
    pub foreign_key: String,
    pub references: String,
}

#[derive(Debug)]
pub struct FieldInfo {
    pub ident: Ident,
    pub ty: Type,
    pub relation: Option<RelationInfo>,
}

pub fn parse_record_attributes(input: &DeriveInput) -> Result<RecordInfo> {
    let mut table = None;
    let mut crate_path = None;

    for attr in record_attrs(&input.attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                validate_identifier_syn("table name", &value.value(), value.span())?;
                table = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("crate") {
                let value: LitStr = meta.value()?.parse()?;
                crate_path = Some(value.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `table` or `crate`"))
            }
        })?;
    }

    let table = match table {
        Some(table) => table,
        None => {
            let derived = format!("{}s", to_snake_case(&input.ident.to_string()));
            validate_identifier_syn("derived table name", &derived, input.ident.span())?;
            derived
        }
    };

    Ok(RecordInfo {
        table,
        crate_path: crate_path.unwrap_or_else(|| syn::parse_quote!(query_core)),
    })
}

pub fn parse_fields(input: &DeriveInput) -> Result<Vec<FieldInfo>> {
    let fields_named = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => fields_named,
            _ => {
                return Err(Error::new_spanned(
                    &input.ident,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "Record can only be derived for structs with named fields",
            ))
        }
    };

    let mut fields = Vec::new();
    for field in &fields_named.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;

        let mut skip = false;
        let mut relation = None;

        for attr in record_attrs(&field.attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("relation") {
                    relation = Some(parse_relation(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported field attribute, expected `skip` or `relation(...)`"))
                }
            })?;
        }

        if skip {
            continue;
        }

        fields.push(FieldInfo {
            ident,
            ty: field.ty.clone(),
            relation,
        });
    }

    Ok(fields)
}

fn parse_relation(meta: &syn::meta::ParseNestedMeta) -> Result<RelationInfo> {
    let mut table = None;
    let mut foreign_key = None;
    let mut references = None;

    meta.parse_nested_meta(|inner| {
        let value: LitStr = inner.value()?.parse()?;
        validate_identifier_syn("relation identifier", &value.value(), value.span())?;
        if inner.path.is_ident("table") {
            table = Some(value.value());
        } else if inner.path.is_ident("foreign_key") {
            foreign_key = Some(value.value());
        } else if inner.path.is_ident("references") {
            references = Some(value.value());
        } else {
            return Err(inner.error("expected `table`, `foreign_key` or `references`"));
        }
        Ok(())
    })?;

    Ok(RelationInfo {
        table: table.ok_or_else(|| meta.error("relation requires `table = \"...\"`"))?,
        foreign_key: foreign_key
            .ok_or_else(|| meta.error("relation requires `foreign_key = \"...\"`"))?,
        references: references.unwrap_or_else(|| "id".to_string()),
    })
}

fn record_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("record"))
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn check(name: &str) -> bool {
        validate_identifier_syn("table name", name, proc_macro2::Span::call_site()).is_ok()
    }

    #[test]
    fn test_valid_table_names() {
        assert!(check("users"));
        assert!(check("user_profiles"));
        assert!(check("_private"));
        assert!(check("table123"));
    }

    #[test]
    fn test_invalid_table_names() {
        assert!(!check("SELECT"));
        assert!(!check("123table"));
        assert!(!check("user-table"));
        assert!(!check(""));
        assert!(!check("users; DROP TABLE users; --"));
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("User"), "user");
        assert_eq!(to_snake_case("ApiKey"), "api_key");
    }

    #[test]
    fn test_default_table_from_struct_name() {
        let input: DeriveInput = syn::parse_quote! {
            struct ApiKey { id: i64 }
        };
        let info = parse_record_attributes(&input).unwrap();
        assert_eq!(info.table, "api_keys");
    }

    #[test]
    fn test_skip_and_relation_attributes() {
        let input: DeriveInput = syn::parse_quote! {
            #[record(table = "users")]
            struct User {
                id: i64,
                #[record(skip)]
                scratch: String,
                #[record(relation(table = "orders", foreign_key = "user_id"))]
                orders: Vec<Order>,
            }
        };
        let info = parse_record_attributes(&input).unwrap();
        assert_eq!(info.table, "users");

        let fields = parse_fields(&input).unwrap();
        assert_eq!(fields.len(), 2);
        let relation = fields[1].relation.as_ref().unwrap();
        assert_eq!(relation.table, "orders");
        assert_eq!(relation.foreign_key, "user_id");
        assert_eq!(relation.references, "id");
    }

    #[test]
    fn test_relation_without_foreign_key_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct User {
                #[record(relation(table = "orders"))]
                orders: Vec<Order>,
            }
        };
        assert!(parse_fields(&input).is_err());
    }
}
