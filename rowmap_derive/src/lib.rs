use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, parse_macro_input, spanned::Spanned};

#[proc_macro_derive(Mapped, attributes(mapped))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_mapped(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(MappedEnum, attributes(mapped))]
pub fn derive_mapped_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_mapped_enum(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct TypeOptions {
    table: Option<String>,
    name: Option<String>,
}

#[derive(Default)]
struct FieldOptions {
    column: Option<String>,
    id: bool,
    generated: bool,
    transient: bool,
    encoding: Option<Ident>,
    serializer: Option<syn::Path>,
}

fn expand_mapped(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Mapped cannot be derived for generic structs",
        ));
    }

    let options = parse_type_options(&input.attrs, false)?;

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields,
            _ => {
                return Err(syn::Error::new(
                    struct_name.span(),
                    "Mapped requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Mapped can only be derived for structs",
            ));
        }
    };

    let mut registrations = Vec::<TokenStream2>::new();
    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Mapped requires named fields"))?;
        let field_options = parse_field_options(&field.attrs)?;
        // Transient fields are never registered, so their type needs no
        // column conversion.
        if field_options.transient {
            continue;
        }

        let member_name = ident.to_string().trim_start_matches("r#").to_string();
        let mut chain = quote! {
            mapping.field(
                #member_name,
                |row: &Self| &row.#ident,
                |row: &mut Self| &mut row.#ident,
            )
        };
        if let Some(column) = &field_options.column {
            chain = quote!(#chain.column(#column));
        }
        if field_options.id {
            chain = quote!(#chain.id());
        }
        if field_options.generated {
            chain = quote!(#chain.generated());
        }
        if let Some(encoding) = &field_options.encoding {
            chain = quote!(#chain.enumerated(::rowmap::EnumEncoding::#encoding));
        }
        if let Some(serializer) = &field_options.serializer {
            chain = quote!(#chain.serializer::<#serializer>());
        }
        registrations.push(quote!(#chain;));
    }

    let table = options.table.map(|table| quote!(mapping.table(#table);));
    let type_name = options.name.unwrap_or_else(|| struct_name.to_string());

    Ok(quote! {
        impl ::rowmap::Mapped for #struct_name {
            fn type_name() -> &'static str {
                #type_name
            }

            fn map(mapping: &mut ::rowmap::Mapping<Self>) {
                #table
                #(#registrations)*
            }
        }
    })
}

fn expand_mapped_enum(input: DeriveInput) -> syn::Result<TokenStream2> {
    let enum_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "MappedEnum cannot be derived for generic enums",
        ));
    }

    let options = parse_type_options(&input.attrs, true)?;

    let data_enum = match input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new(
                enum_name.span(),
                "MappedEnum can only be derived for enums",
            ));
        }
    };

    if data_enum.variants.is_empty() {
        return Err(syn::Error::new(
            enum_name.span(),
            "MappedEnum requires at least one variant",
        ));
    }

    let mut variant_idents = Vec::<Ident>::new();
    let mut constants = Vec::<String>::new();
    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "MappedEnum supports unit variants only",
            ));
        }
        let constant = parse_variant_rename(&variant.attrs)?
            .unwrap_or_else(|| variant.ident.to_string());
        if constants.contains(&constant) {
            return Err(syn::Error::new(
                variant.span(),
                format!("Duplicate enum constant '{}'", constant),
            ));
        }
        variant_idents.push(variant.ident.clone());
        constants.push(constant);
    }

    let ordinals = (0..variant_idents.len()).collect::<Vec<usize>>();
    let def_name = options.name.unwrap_or_else(|| enum_name.to_string());

    Ok(quote! {
        impl ::rowmap::MappedEnum for #enum_name {
            const DEF: &'static ::rowmap::EnumDef = &::rowmap::EnumDef {
                name: #def_name,
                constants: &[#(#constants),*],
            };

            fn ordinal(&self) -> usize {
                match self {
                    #(Self::#variant_idents => #ordinals,)*
                }
            }

            fn from_ordinal(ordinal: usize) -> Option<Self> {
                match ordinal {
                    #(#ordinals => Some(Self::#variant_idents),)*
                    _ => None,
                }
            }
        }

        impl ::rowmap::ColumnType for #enum_name {
            fn data_type() -> ::rowmap::DataType {
                ::rowmap::DataType::Enum(<Self as ::rowmap::MappedEnum>::DEF)
            }

            fn to_value(&self) -> ::rowmap::__private::anyhow::Result<::rowmap::Value> {
                ::rowmap::codec::enum_to_value(self)
            }

            fn from_value(value: ::rowmap::Value) -> ::core::result::Result<Self, ::rowmap::Value> {
                ::rowmap::codec::enum_from_value(value)
            }
        }
    })
}

fn parse_type_options(attrs: &[syn::Attribute], is_enum: bool) -> syn::Result<TypeOptions> {
    let mut options = TypeOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("mapped") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") && !is_enum {
                let lit: LitStr = meta.value()?.parse()?;
                options.table = Some(lit.value());
                return Ok(());
            }

            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                options.name = Some(lit.value());
                return Ok(());
            }

            if is_enum {
                Err(meta.error("Unsupported #[mapped(...)] option. Supported: name = \"...\""))
            } else {
                Err(meta.error(
                    "Unsupported #[mapped(...)] option. Supported: table = \"...\", name = \"...\"",
                ))
            }
        })?;
    }

    Ok(options)
}

fn parse_field_options(attrs: &[syn::Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("mapped") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                options.column = Some(lit.value());
                return Ok(());
            }

            if meta.path.is_ident("id") {
                options.id = true;
                return Ok(());
            }

            if meta.path.is_ident("generated") {
                options.generated = true;
                return Ok(());
            }

            if meta.path.is_ident("transient") {
                options.transient = true;
                return Ok(());
            }

            if meta.path.is_ident("ordinal") || meta.path.is_ident("string") {
                if options.encoding.is_some() {
                    return Err(meta.error("Enum encoding specified more than once"));
                }
                let variant = if meta.path.is_ident("ordinal") {
                    "Ordinal"
                } else {
                    "String"
                };
                options.encoding = Some(Ident::new(variant, meta.path.span()));
                return Ok(());
            }

            if meta.path.is_ident("serializer") {
                options.serializer = Some(meta.value()?.parse()?);
                return Ok(());
            }

            Err(meta.error(
                "Unsupported #[mapped(...)] option. Supported: column = \"...\", id, generated, transient, ordinal, string, serializer = Type",
            ))
        })?;
    }

    if options.transient
        && (options.id || options.generated || options.column.is_some() || options.serializer.is_some())
    {
        return Err(syn::Error::new(
            attrs
                .iter()
                .find(|attr| attr.path().is_ident("mapped"))
                .map(|attr| attr.span())
                .unwrap_or_else(proc_macro2::Span::call_site),
            "#[mapped(transient)] cannot be combined with other column options",
        ));
    }

    Ok(options)
}

fn parse_variant_rename(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut rename = None;

    for attr in attrs {
        if !attr.path().is_ident("mapped") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                rename = Some(lit.value());
                return Ok(());
            }

            Err(meta.error("Unsupported #[mapped(...)] option on variant. Supported: rename = \"...\""))
        })?;
    }

    Ok(rename)
}
