use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields, FieldsNamed, parse::Parse, parse_macro_input};

/// Reads each named field in declaration order with `RoxHeaderR`.
///
/// A field marked `#[rox_data(skip = expr)]` is not read and takes `expr`.
#[proc_macro_derive(RoxHeaderR, attributes(rox_data))]
pub fn rox_header_r_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let struct_name = &input.ident;
    let fields = match named_fields(&input, "RoxHeaderR") {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    let initializers = fields.named.iter().map(|field| {
        let field_name = &field.ident;

        match get_value_from_attrs::<Expr>(&field.attrs, "rox_data", "skip") {
            Ok(Some(val)) => quote! { #field_name: #val },
            Ok(None) => quote! {
                #field_name: ::rox_data::types::RoxHeaderR::rox_read(reader)?
            },
            Err(e) => e.to_compile_error(),
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::rox_data::types::RoxHeaderR for #struct_name #ty_generics #where_clause {
            fn rox_read<R: ::std::io::Read>(reader: &mut R) -> ::rox_data::error::Result<Self> {
                Ok(Self {
                    #(#initializers),*
                })
            }
        }
    };

    TokenStream::from(expanded)
}

/// Writes each named field in declaration order with `RoxHeaderW`, and sums
/// their sizes for `rox_size`. Skipped fields contribute nothing.
#[proc_macro_derive(RoxHeaderW, attributes(rox_data))]
pub fn rox_header_w_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let ident = &input.ident;
    let fields = match named_fields(&input, "RoxHeaderW") {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    let mut write_statements = Vec::new();
    let mut size_expressions = Vec::new();
    for field in &fields.named {
        match get_value_from_attrs::<Expr>(&field.attrs, "rox_data", "skip") {
            Ok(Some(_)) => {}
            Ok(None) => {
                let field_name = &field.ident;
                write_statements.push(quote! {
                    ::rox_data::types::RoxHeaderW::rox_write(&self.#field_name, writer)?;
                });
                size_expressions.push(quote! {
                    ::rox_data::types::RoxHeaderW::rox_size(&self.#field_name)
                });
            }
            Err(e) => return e.to_compile_error().into(),
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::rox_data::types::RoxHeaderW for #ident #ty_generics #where_clause {
            fn rox_write<W: ::std::io::Write>(&self, writer: &mut W) -> ::rox_data::error::Result<()> {
                #(#write_statements)*
                Ok(())
            }

            fn rox_size(&self) -> usize {
                0 #(+ #size_expressions)*
            }
        }
    };

    TokenStream::from(expanded)
}

fn named_fields<'a>(input: &'a DeriveInput, derive_name: &str) -> syn::Result<&'a FieldsNamed> {
    match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(f) => Ok(f),
            other => Err(syn::Error::new_spanned(
                other,
                format!("{derive_name} can only be derived for structs with named fields."),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive_name} can only be derived for structs."),
        )),
    }
}

fn get_value_from_attrs<T: Parse>(
    attrs: &[syn::Attribute],
    attr_name: &str,
    attr_key: &str,
) -> syn::Result<Option<T>> {
    let mut ret_val = None;

    for attr in attrs {
        if !attr.path().is_ident(attr_name) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(attr_key) {
                let value = meta.value()?;
                let parsed: T = value.parse()?;
                ret_val = Some(parsed);
                Ok(())
            } else {
                Err(meta.error(format!("unsupported `{attr_name}` attribute")))
            }
        })?;
    }

    Ok(ret_val)
}
