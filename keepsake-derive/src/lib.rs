use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

mod fields;

/// Attribute macro that derives all required traits for Parcelable types.
///
/// This is syntax sugar that expands to:
/// ```ignore
/// #[derive(Debug, Clone, Parcelable)]
/// ```
///
/// Arguments are forwarded to the derive, so
/// `#[parcelable(tag = "app.State")]` overrides the stable type tag.
///
/// # Example
///
/// ```ignore
/// use keepsake_core::parcelable;
///
/// #[parcelable]
/// struct State {
///     count: i32,
/// }
/// ```
#[proc_macro_attribute]
pub fn parcelable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let args: proc_macro2::TokenStream = attr.into();

    let forwarded = if args.is_empty() {
        quote! {}
    } else {
        quote! { #[parcelable(#args)] }
    };

    let output = quote! {
        #[derive(
            ::std::fmt::Debug,
            ::std::clone::Clone,
            ::keepsake_core::Parcelable
        )]
        #forwarded
        #input
    };

    output.into()
}

/// Derive macro for the Parcelable trait.
///
/// Generates `TYPE_TAG`, `encode()` writing each field in declaration
/// order, `decode()` reading the same keys back in the same order, and the
/// registry submission that makes the variant decodable from bytes alone.
///
/// Supported field types: `i32`, `bool`, `String`, `Option<T>` where `T`
/// is itself Parcelable, and any other Parcelable type (required nested
/// value).
///
/// # Attributes
///
/// - `#[parcelable(tag = "name")]` on the struct — override the stable
///   type tag (defaults to the struct name). The tag travels in archives;
///   do not change it once data has been persisted under it.
/// - `#[parcelable(rename = "key")]` on a field — use a custom field key
/// - `#[parcelable(skip)]` on a field — do not archive this field; it is
///   reconstructed with `Default::default()` (field must impl Default)
///
/// # Example
///
/// ```ignore
/// use keepsake_core::Parcelable;
///
/// #[derive(Debug, Clone, Parcelable)]
/// #[parcelable(tag = "app.State")]
/// struct State {
///     count: i32,
///     label: String,
/// }
/// ```
#[proc_macro_derive(Parcelable, attributes(parcelable))]
pub fn derive_parcelable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_parcelable_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_parcelable_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if input.generics.type_params().next().is_some()
        || input.generics.lifetimes().next().is_some()
        || input.generics.const_params().next().is_some()
    {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Parcelable cannot be derived for generic types: each archived variant needs one stable type tag",
        ));
    }

    let data = match &input.data {
        syn::Data::Struct(data) => data,
        syn::Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Parcelable cannot be derived for enums; archive each variant as its own struct",
            ));
        }
        syn::Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Parcelable cannot be derived for unions",
            ));
        }
    };

    let tag = parse_struct_attrs(&input.attrs)?
        .tag
        .unwrap_or_else(|| name.to_string());

    let encode_body = fields::generate_encode(data)?;
    let decode_body = fields::generate_decode(name, data)?;

    Ok(quote! {
        impl ::keepsake_core::Parcelable for #name {
            const TYPE_TAG: &'static str = #tag;

            fn encode(
                &self,
                coder: &mut ::keepsake_core::Coder,
            ) -> ::std::result::Result<(), ::keepsake_core::CoderError> {
                #encode_body
                ::std::result::Result::Ok(())
            }

            fn decode(
                coder: &::keepsake_core::Coder,
            ) -> ::std::result::Result<Self, ::keepsake_core::CoderError> {
                ::std::result::Result::Ok(#decode_body)
            }
        }

        ::keepsake_core::inventory::submit! {
            ::keepsake_core::registry::Variant::of::<#name>()
        }
    })
}

#[derive(Default)]
struct StructAttrs {
    tag: Option<String>,
}

fn parse_struct_attrs(attrs: &[syn::Attribute]) -> syn::Result<StructAttrs> {
    let mut result = StructAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("parcelable") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.tag = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported parcelable attribute; expected `tag`"))
            }
        })?;
    }

    Ok(result)
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub skip: bool,
    pub rename: Option<String>,
}

pub(crate) fn parse_field_attrs(attrs: &[syn::Attribute]) -> FieldAttrs {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("parcelable") {
            continue;
        }

        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
            }
            Ok(())
        });
    }

    result
}
