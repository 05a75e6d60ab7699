//! `#[derive(Flags)]` implementation.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    Data, DeriveInput, Expr, Fields, GenericArgument, Lit, LitStr, Meta, PathArguments, Token, Type,
    parse_macro_input,
};

pub fn derive_flags(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Flags can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Flags requires a struct with named fields",
        ));
    };

    let container = ContainerAttrs::parse(input)?;
    let ident = &input.ident;
    let type_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut fields = Vec::with_capacity(named.named.len());
    let mut slots = Vec::new();
    let mut documented = Vec::new();

    for (index, field) in named.named.iter().enumerate() {
        let Some(member) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let attrs = FieldAttrs::parse(field)?;
        let key = attrs.document_key(member, container.rename_all);
        let name = attrs.name.clone().unwrap_or_else(|| key.clone());
        let help = attrs.help.as_str();

        let kind = match attrs.role(&field.ty) {
            Role::Skip => quote!(::flagfig::FieldKind::Unsupported),
            Role::Leaf(kind) => {
                let variant = format_ident!("{}", kind);
                slots.push(quote! {
                    #index => ::core::option::Option::Some(::flagfig::Slot::Leaf(&mut self.#member))
                });
                quote!(::flagfig::FieldKind::Leaf(::flagfig::Kind::#variant))
            }
            Role::Record { wrapper, inner, embedded } => {
                let access = wrapper.access(quote!(self.#member));
                slots.push(quote! {
                    #index => ::core::option::Option::Some(::flagfig::Slot::Record(#access))
                });
                quote! {
                    ::flagfig::FieldKind::Nested {
                        shape: &<#inner as ::flagfig::Flags>::SHAPE,
                        embedded: #embedded,
                    }
                }
            }
        };

        let key = if attrs.serde_skip {
            quote!(::flagfig::Key::Skipped)
        } else {
            documented.push(quote! {
                #index => ::core::option::Option::Some(&mut self.#member as &mut dyn ::flagfig::Decode)
            });
            if attrs.serde_flatten {
                quote!(::flagfig::Key::Flattened)
            } else {
                quote!(::flagfig::Key::Named(#key))
            }
        };

        fields.push(quote! {
            ::flagfig::Field {
                name: #name,
                key: #key,
                help: #help,
                kind: #kind,
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::flagfig::Flags for #ident #ty_generics #where_clause {
            const SHAPE: ::flagfig::Shape = ::flagfig::Shape {
                name: #type_name,
                fields: &[#(#fields),*],
            };
        }

        impl #impl_generics ::flagfig::Record for #ident #ty_generics #where_clause {
            fn slot(&mut self, index: usize) -> ::core::option::Option<::flagfig::Slot<'_>> {
                match index {
                    #(#slots,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::flagfig::Decode> {
                match index {
                    #(#documented,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

/// What a field becomes in the generated shape.
enum Role<'a> {
    Skip,
    Leaf(&'static str),
    Record {
        wrapper: Wrapper,
        inner: &'a Type,
        embedded: bool,
    },
}

/// How a record field holds its record.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Wrapper {
    Plain,
    Boxed,
    Optional,
    OptionalBoxed,
}

impl Wrapper {
    /// Expression producing `&mut Inner` from the field, allocating unset
    /// optional records with `Default`.
    fn access(self, field: TokenStream2) -> TokenStream2 {
        match self {
            Wrapper::Plain => quote!(&mut #field),
            Wrapper::Boxed => quote!(&mut *#field),
            Wrapper::Optional => {
                quote!(#field.get_or_insert_with(::core::default::Default::default))
            }
            Wrapper::OptionalBoxed => {
                quote!(&mut **#field.get_or_insert_with(::core::default::Default::default))
            }
        }
    }
}

/// serde's `rename_all` rules, as applied to field names.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            other => {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!("unknown rename rule `{other}`"),
                ));
            }
        })
    }

    /// Field identifiers are assumed to be snake_case.
    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => {
                let mut out = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        out.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            RenameRule::Camel => {
                let pascal = RenameRule::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

#[derive(Default)]
struct ContainerAttrs {
    rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut attrs = ContainerAttrs::default();
        for attr in &input.attrs {
            if !attr.path().is_ident("serde") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    if let Some(lit) = serde_deserialize_name(&meta)? {
                        attrs.rename_all = Some(RenameRule::from_lit(&lit)?);
                    }
                    Ok(())
                } else {
                    skip_meta_value(&meta)
                }
            })?;
        }
        Ok(attrs)
    }
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    nested: bool,
    flatten: bool,
    skip: bool,
    serde_name: Option<String>,
    serde_flatten: bool,
    serde_skip: bool,
    help: String,
}

impl FieldAttrs {
    fn parse(field: &syn::Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        let mut doc = Vec::new();

        for attr in &field.attrs {
            if attr.path().is_ident("flag") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        let value: LitStr = meta.value()?.parse()?;
                        attrs.name = Some(value.value());
                    } else if meta.path.is_ident("nested") {
                        attrs.nested = true;
                    } else if meta.path.is_ident("flatten") {
                        attrs.flatten = true;
                    } else if meta.path.is_ident("skip") {
                        attrs.skip = true;
                    } else {
                        return Err(meta.error("unknown flag attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        if let Some(lit) = serde_deserialize_name(&meta)? {
                            attrs.serde_name = Some(lit.value());
                        }
                        Ok(())
                    } else if meta.path.is_ident("flatten") {
                        attrs.serde_flatten = true;
                        Ok(())
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
                        attrs.serde_skip = true;
                        Ok(())
                    } else {
                        skip_meta_value(&meta)
                    }
                })?;
            } else if attr.path().is_ident("doc")
                && let Meta::NameValue(meta) = &attr.meta
                && let Expr::Lit(expr) = &meta.value
                && let Lit::Str(lit) = &expr.lit
            {
                doc.push(lit.value().trim().to_string());
            }
        }

        // First paragraph only.
        attrs.help = doc
            .into_iter()
            .take_while(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(attrs)
    }

    /// The key serde reads this field from.
    fn document_key(&self, ident: &syn::Ident, rename_all: Option<RenameRule>) -> String {
        if let Some(name) = &self.serde_name {
            return name.clone();
        }
        let ident = ident.unraw().to_string();
        match rename_all {
            Some(rule) => rule.apply(&ident),
            None => ident,
        }
    }

    fn role<'a>(&self, ty: &'a Type) -> Role<'a> {
        if self.skip || self.serde_skip {
            return Role::Skip;
        }
        if self.nested || self.flatten {
            let (wrapper, inner) = unwrap_record(ty);
            return Role::Record {
                wrapper,
                inner,
                embedded: self.flatten || self.serde_flatten,
            };
        }
        match leaf_kind(ty) {
            Some(kind) => Role::Leaf(kind),
            None => Role::Skip,
        }
    }
}

/// Reads `key = "x"` or `key(deserialize = "x")`.
fn serde_deserialize_name(meta: &ParseNestedMeta<'_>) -> syn::Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse()?));
    }
    let mut name = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("deserialize") {
            name = Some(inner.value()?.parse()?);
            Ok(())
        } else {
            skip_meta_value(&inner)
        }
    })?;
    Ok(name)
}

/// Consumes the value of a serde attribute we don't care about.
fn skip_meta_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Lit>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream2>()?;
    }
    Ok(())
}

/// The single type argument of `wrapper<T>`, if `ty` is that wrapper.
fn generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn unwrap_record(ty: &Type) -> (Wrapper, &Type) {
    if let Some(inner) = generic_arg(ty, "Option") {
        return match generic_arg(inner, "Box") {
            Some(boxed) => (Wrapper::OptionalBoxed, boxed),
            None => (Wrapper::Optional, inner),
        };
    }
    match generic_arg(ty, "Box") {
        Some(boxed) => (Wrapper::Boxed, boxed),
        None => (Wrapper::Plain, ty),
    }
}

/// Maps a primitive type (or `Option` of one) to its `flagfig::Kind` variant.
fn leaf_kind(ty: &Type) -> Option<&'static str> {
    let ty = generic_arg(ty, "Option").unwrap_or(ty);
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if !segment.arguments.is_empty() {
        return None;
    }
    match segment.ident.to_string().as_str() {
        "String" => Some("Text"),
        "f32" | "f64" => Some("Float"),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128"
        | "usize" => Some("Integer"),
        _ => None,
    }
}
