use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use crate::parse_field_attrs;

/// The primitive vocabulary a field can decompose into, recognized
/// syntactically from the field's declared type.
enum FieldKind<'a> {
    Int,
    Bool,
    Text,
    /// `Option<T>` with a parcelable `T`: nullable nested value.
    OptionalParcel(&'a Type),
    /// Any other path type: required nested parcelable value.
    Parcel,
}

/// Generates the `encode()` body: one codec call per archived field, in
/// declaration order.
pub(crate) fn generate_encode(data: &syn::DataStruct) -> syn::Result<TokenStream> {
    let fields = named_fields(data)?;

    let writes: Vec<TokenStream> = fields
        .iter()
        .map(|(ident, key, kind)| match kind {
            FieldKind::Int => quote! { coder.encode_int(self.#ident, #key)?; },
            FieldKind::Bool => quote! { coder.encode_bool(self.#ident, #key)?; },
            FieldKind::Text => quote! { coder.encode_string(&self.#ident, #key)?; },
            FieldKind::OptionalParcel(_) => {
                quote! { coder.encode_parcelable(self.#ident.as_ref(), #key)?; }
            }
            FieldKind::Parcel => {
                quote! { coder.encode_parcelable(::std::option::Option::Some(&self.#ident), #key)?; }
            }
        })
        .collect();

    Ok(quote! { #(#writes)* })
}

/// Generates the struct expression for the `decode()` body, reading each
/// key back in the order encode wrote it.
pub(crate) fn generate_decode(
    name: &syn::Ident,
    data: &syn::DataStruct,
) -> syn::Result<TokenStream> {
    let skipped: Vec<TokenStream> = skipped_fields(data)
        .into_iter()
        .map(|ident| quote! { #ident: ::std::default::Default::default() })
        .collect();

    let fields = named_fields(data)?;

    let reads: Vec<TokenStream> = fields
        .iter()
        .map(|(ident, key, kind)| match kind {
            FieldKind::Int => quote! { #ident: coder.decode_int(#key)? },
            FieldKind::Bool => quote! { #ident: coder.decode_bool(#key)? },
            FieldKind::Text => quote! { #ident: coder.decode_string(#key)? },
            FieldKind::OptionalParcel(inner) => {
                quote! { #ident: coder.decode_parcelable::<#inner>(#key)? }
            }
            // A required nested value that is absent or of the wrong
            // variant is a contract violation, like any non-nullable read.
            FieldKind::Parcel => quote! {
                #ident: coder.decode_parcelable(#key)?.ok_or_else(|| {
                    ::keepsake_core::CoderError::MissingKey(#key.to_string())
                })?
            },
        })
        .collect();

    Ok(quote! { #name { #(#reads,)* #(#skipped,)* } })
}

/// Collects the archived fields as (ident, wire key, kind) triples.
fn named_fields(
    data: &syn::DataStruct,
) -> syn::Result<Vec<(&syn::Ident, String, FieldKind<'_>)>> {
    let named = match &data.fields {
        syn::Fields::Named(named) => &named.named,
        syn::Fields::Unit => return Ok(Vec::new()),
        syn::Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "Parcelable fields must be named: every archived field needs a stable key",
            ));
        }
    };

    named
        .iter()
        .filter_map(|field| {
            let attrs = parse_field_attrs(&field.attrs);
            if attrs.skip {
                return None;
            }
            let ident = field.ident.as_ref()?;
            let key = attrs.rename.unwrap_or_else(|| ident.to_string());
            Some(field_kind(&field.ty).map(|kind| (ident, key, kind)))
        })
        .collect()
}

fn skipped_fields(data: &syn::DataStruct) -> Vec<&syn::Ident> {
    match &data.fields {
        syn::Fields::Named(named) => named
            .named
            .iter()
            .filter(|field| parse_field_attrs(&field.attrs).skip)
            .filter_map(|field| field.ident.as_ref())
            .collect(),
        _ => Vec::new(),
    }
}

/// Maps a declared field type to its codec call, syntactically.
fn field_kind(ty: &Type) -> syn::Result<FieldKind<'_>> {
    let Type::Path(type_path) = ty else {
        return Err(unsupported(ty));
    };
    let Some(segment) = type_path.path.segments.last() else {
        return Err(unsupported(ty));
    };

    match segment.ident.to_string().as_str() {
        "i32" => Ok(FieldKind::Int),
        "bool" => Ok(FieldKind::Bool),
        "String" => Ok(FieldKind::Text),
        "Option" => {
            let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
                return Err(unsupported(ty));
            };
            let Some(syn::GenericArgument::Type(inner)) = args.args.first() else {
                return Err(unsupported(ty));
            };
            // Only nested parcelable values are nullable; a nullable
            // primitive has no entry in the archive vocabulary.
            let Type::Path(inner_path) = inner else {
                return Err(unsupported(ty));
            };
            let wraps_primitive = inner_path.path.segments.last().is_some_and(|s| {
                matches!(
                    s.ident.to_string().as_str(),
                    "i32" | "bool" | "String" | "Option"
                )
            });
            if wraps_primitive {
                Err(syn::Error::new_spanned(
                    ty,
                    "Option fields must wrap a Parcelable type; primitives are non-nullable",
                ))
            } else {
                Ok(FieldKind::OptionalParcel(inner))
            }
        }
        _ => Ok(FieldKind::Parcel),
    }
}

fn unsupported(ty: &Type) -> syn::Error {
    syn::Error::new_spanned(
        ty,
        "unsupported Parcelable field type; supported: i32, bool, String, \
         Option<impl Parcelable>, impl Parcelable",
    )
}
