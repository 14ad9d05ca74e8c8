//! Entity derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

use crate::sql_ident::{check_unique_columns, parse_column, parse_table};

struct PersistedField<'a> {
    ident: &'a syn::Ident,
    column: String,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let table = get_table_name(&input)?;

    let mut persisted = Vec::new();
    let mut spans = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let Some(column) = get_column(field)? else {
            continue;
        };
        spans.push((column.clone(), field.span()));
        persisted.push(PersistedField { ident, column });
    }
    check_unique_columns(&spans)?;

    let columns: Vec<&str> = persisted.iter().map(|f| f.column.as_str()).collect();
    let inserts = persisted.iter().map(|f| {
        let ident = f.ident;
        let column = &f.column;
        quote! {
            row.insert(
                ::std::string::String::from(#column),
                ::core::convert::Into::<::myorm::Value>::into(
                    ::core::clone::Clone::clone(&self.#ident),
                ),
            );
        }
    });
    let capacity = persisted.len();

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub const TABLE: &'static str = #table;
            pub const COLUMNS: &'static [&'static str] = &[#(#columns),*];
        }

        impl #impl_generics ::myorm::Entity for #name #ty_generics #where_clause {
            fn table_name(&self) -> &str {
                #table
            }

            fn to_row(&self) -> ::myorm::Row {
                let mut row = ::myorm::Row::with_capacity(#capacity);
                #(#inserts)*
                row
            }
        }
    })
}

fn get_table_name(input: &DeriveInput) -> Result<String> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(parse_table(&lit)?);
                Ok(())
            } else {
                Err(meta.error("unsupported struct attribute, expected `table = \"...\"`"))
            }
        })?;
    }
    table.ok_or_else(|| {
        syn::Error::new_spanned(
            input,
            "Entity requires #[orm(table = \"table_name\")] attribute",
        )
    })
}

/// Column for a field.
///
/// Only `#[orm(column = "...")]` persists a field. Untagged fields, an empty
/// `column = ""` and `#[orm(skip)]` all yield `None`.
fn get_column(field: &syn::Field) -> Result<Option<String>> {
    let mut column = None;
    let mut skip = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                column = parse_column(&lit)?;
                Ok(())
            } else {
                Err(meta.error("unsupported field attribute, expected `column = \"...\"` or `skip`"))
            }
        })?;
    }

    if skip {
        return Ok(None);
    }
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(src: &str) -> Result<String> {
        let input: DeriveInput = syn::parse_str(src)?;
        expand(input).map(|ts| ts.to_string())
    }

    #[test]
    fn generates_columns_in_declaration_order() {
        let out = expand_str(
            r#"
            #[orm(table = "users")]
            struct NewUser {
                #[orm(column = "username")]
                username: String,
                #[orm(column = "email_address")]
                email: Option<String>,
                #[orm(skip)]
                confirm: String,
            }
            "#,
        )
        .unwrap();
        let username = out.find("\"username\"").expect("username column");
        let email = out.find("\"email_address\"").expect("email column");
        assert!(username < email, "{out}");
        assert!(out.contains("\"users\""));
        assert!(!out.contains("confirm"));
    }

    #[test]
    fn table_is_required() {
        let err = expand_str("struct A { x: i64 }").unwrap_err();
        assert!(err.to_string().contains("orm(table"));
    }

    #[test]
    fn rejects_tuple_structs_and_enums() {
        assert!(expand_str(r#"#[orm(table = "t")] struct A(i64);"#).is_err());
        assert!(expand_str(r#"#[orm(table = "t")] enum A { X }"#).is_err());
    }

    #[test]
    fn rejects_invalid_and_duplicate_columns() {
        let err = expand_str(
            r#"#[orm(table = "t")] struct A { #[orm(column = "bad name")] x: i64 }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("valid SQL identifier"));

        let err = expand_str(
            r#"#[orm(table = "t")] struct A { #[orm(column = "a")] a: i64, #[orm(column = "a")] b: i64 }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }

    #[test]
    fn untagged_and_empty_tagged_fields_are_not_persisted() {
        let out = expand_str(
            r#"
            #[orm(table = "signups")]
            struct Signup {
                #[orm(column = "email")]
                email: String,
                remember_me: bool,
                #[orm(column = "")]
                captcha: String,
            }
            "#,
        )
        .unwrap();
        assert!(out.contains("\"email\""), "{out}");
        assert!(!out.contains("remember_me"), "{out}");
        assert!(!out.contains("captcha"), "{out}");
    }

    #[test]
    fn rejects_unknown_attributes() {
        let err = expand_str(r#"#[orm(table = "t")] struct A { #[orm(id)] x: i64 }"#).unwrap_err();
        assert!(err.to_string().contains("unsupported field attribute"));
    }
}
