//! Code generation for the dyaml derives.

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, FieldsNamed, GenericArgument, PathArguments, Type,
    ext::IdentExt,
};

use crate::attr::{ContainerAttrs, FieldAttrs};

fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<&'a FieldsNamed> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                format!("{derive} requires a struct with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} only supports structs"),
        )),
    }
}

fn field_name(field: &Field) -> String {
    field
        .ident
        .as_ref()
        .map(|ident| ident.unraw().to_string())
        .unwrap_or_default()
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|segment| {
        segment.ident == "Option"
            && matches!(
                &segment.arguments,
                PathArguments::AngleBracketed(args)
                    if matches!(args.args.first(), Some(GenericArgument::Type(_)))
            )
    })
}

fn option_str(value: &Option<String>) -> TokenStream {
    match value {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    }
}

/// A value member bound to `field`.
fn value_member(field: &Field, attrs: &FieldAttrs) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let name = field_name(field);
    let key = option_str(&attrs.key);
    let order = attrs.order;
    let comment = &attrs.comment;
    let optional = is_option(ty);
    let clear = if optional {
        quote!(|this: &mut Self| this.#ident = ::core::option::Option::None)
    } else {
        quote!(|_: &mut Self| {})
    };

    quote! {
        ::dyaml::data::member::Member {
            ident: #name,
            key: #key,
            order: #order,
            comment: &[#(#comment),*],
            binding: ::dyaml::data::member::Binding::Value(::dyaml::data::member::Accessor {
                type_desc: <#ty as ::dyaml::Yaml>::type_desc,
                optional: #optional,
                encode: |this: &Self| ::dyaml::Yaml::encode(&this.#ident),
                decode: |this: &mut Self, node: &::dyaml::Document| {
                    this.#ident = <#ty as ::dyaml::Yaml>::decode(node)?;
                    ::core::result::Result::Ok(())
                },
                clear: #clear,
                swap: |a: &mut Self, b: &mut Self| ::core::mem::swap(&mut a.#ident, &mut b.#ident),
            }),
        }
    }
}

/// A member with a binding other than a value.
fn special_member(field: &Field, attrs: &FieldAttrs, binding: TokenStream) -> TokenStream {
    let name = field_name(field);
    let key = option_str(&attrs.key);
    let order = attrs.order;
    let comment = &attrs.comment;
    quote! {
        ::dyaml::data::member::Member {
            ident: #name,
            key: #key,
            order: #order,
            comment: &[#(#comment),*],
            binding: #binding,
        }
    }
}

fn config_member(field: &Field, attrs: &FieldAttrs) -> syn::Result<TokenStream> {
    let special = [
        (attrs.node, "#[node]"),
        (attrs.path_param.is_some(), "#[path_param]"),
        (attrs.all_contents, "#[all_contents]"),
    ];
    let declared: Vec<&str> = special
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();
    if declared.len() > 1 {
        return Err(syn::Error::new_spanned(
            field,
            format!("{} cannot be combined on one field", declared.join(" and ")),
        ));
    }

    let ident = &field.ident;
    let swap = quote!(|a: &mut Self, b: &mut Self| ::core::mem::swap(&mut a.#ident, &mut b.#ident));
    if let Some(param) = &attrs.path_param {
        return Ok(special_member(
            field,
            attrs,
            quote! {
                ::dyaml::data::member::Binding::PathParameter {
                    name: #param,
                    assign: |this: &mut Self, value: &str| this.#ident = ::core::convert::Into::into(value),
                    swap: #swap,
                }
            },
        ));
    }
    if attrs.all_contents {
        return Ok(special_member(
            field,
            attrs,
            quote! {
                ::dyaml::data::member::Binding::AllContents {
                    assign: |this: &mut Self, bytes: ::std::vec::Vec<u8>| this.#ident = ::core::convert::Into::into(bytes),
                    swap: #swap,
                }
            },
        ));
    }
    if !attrs.node {
        return Ok(special_member(
            field,
            attrs,
            quote!(::dyaml::data::member::Binding::Comment),
        ));
    }
    Ok(value_member(field, attrs))
}

fn bindable_impl(input: &DeriveInput, members: &[TokenStream]) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    quote! {
        impl #impl_generics ::dyaml::data::member::Bindable for #name #ty_generics #where_clause {
            fn members() -> ::std::vec::Vec<::dyaml::data::member::Member<Self>> {
                ::std::vec![#(#members),*]
            }
        }
    }
}

pub fn derive_config(input: &DeriveInput) -> syn::Result<TokenStream> {
    let container = ContainerAttrs::from_ast(&input.attrs)?;
    let fields = named_fields(input, "Config")?;

    let mut members = Vec::new();
    for field in &fields.named {
        let attrs = FieldAttrs::from_ast(&field.attrs)?;
        if attrs.is_declared() && !attrs.skip {
            members.push(config_member(field, &attrs)?);
        }
    }

    let Some(path) = &container.path else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Config requires #[config(path = \"...\")] or #[config(inject = \"...\")]",
        ));
    };
    let injecting = container.injecting;
    let namespace = option_str(&container.namespace);
    let git = match &container.git {
        Some(git) => {
            let required = !container.git_optional;
            quote! {
                ::core::option::Option::Some(::dyaml::GitBinding {
                    namespace: #git,
                    required: #required,
                })
            }
        }
        None => quote!(::core::option::Option::None),
    };
    let header = &container.comment;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let bindable = bindable_impl(input, &members);

    Ok(quote! {
        #bindable

        impl #impl_generics ::dyaml::Config for #name #ty_generics #where_clause {
            fn location() -> ::dyaml::Location {
                ::dyaml::Location {
                    path: #path,
                    injecting: #injecting,
                    namespace: #namespace,
                    git: #git,
                }
            }

            fn header() -> &'static [&'static str] {
                &[#(#header),*]
            }
        }
    })
}

pub fn derive_composite(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = named_fields(input, "Composite")?;

    let mut members = Vec::new();
    for field in &fields.named {
        let attrs = FieldAttrs::from_ast(&field.attrs)?;
        if !attrs.skip {
            members.push(value_member(field, &attrs));
        }
    }

    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let bindable = bindable_impl(input, &members);

    Ok(quote! {
        #bindable

        impl #impl_generics ::dyaml::Yaml for #name #ty_generics #where_clause {
            fn type_desc() -> ::dyaml::data::types::TypeDesc {
                ::dyaml::data::types::TypeDesc::Composite(#type_name)
            }

            fn decode(node: &::dyaml::Document) -> ::dyaml::Result<Self> {
                ::dyaml::codec::decode_composite(node)
            }

            fn encode(&self) -> ::dyaml::Value {
                ::dyaml::codec::encode_composite(self)
            }
        }
    })
}

pub fn derive_record(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = named_fields(input, "Record")?;

    let mut decoded = Vec::new();
    let mut encoded = Vec::new();
    for (index, field) in fields.named.iter().enumerate() {
        let attrs = FieldAttrs::from_ast(&field.attrs)?;
        let ident = &field.ident;
        let name = field_name(field);
        let key = option_str(&attrs.key);
        let comment = &attrs.comment;
        let order = Literal::i32_unsuffixed(index as i32);

        decoded.push(quote! {
            #ident: ::dyaml::codec::component(node, #name, #key)?
        });
        encoded.push(quote! {
            ::dyaml::Field::new(
                #order,
                ::dyaml::key::resolve_key(#key, #name),
                &[#(#comment),*],
                ::dyaml::Yaml::encode(&self.#ident),
            )
        });
    }

    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::dyaml::Yaml for #name #ty_generics #where_clause {
            fn type_desc() -> ::dyaml::data::types::TypeDesc {
                ::dyaml::data::types::TypeDesc::Record(#type_name)
            }

            fn decode(node: &::dyaml::Document) -> ::dyaml::Result<Self> {
                ::dyaml::codec::expect_mapping(node)?;
                ::core::result::Result::Ok(Self {
                    #(#decoded),*
                })
            }

            fn encode(&self) -> ::dyaml::Value {
                ::dyaml::Value::Object(::std::vec![#(#encoded),*])
            }
        }
    })
}

pub fn derive_enumeration(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Enumeration only supports enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Enumeration requires at least one variant",
        ));
    }

    let mut idents = Vec::new();
    let mut names = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Enumeration variants must not carry data",
            ));
        }
        idents.push(&variant.ident);
        names.push(variant.ident.unraw().to_string());
    }
    let indices = (0..idents.len()).map(Literal::usize_unsuffixed);

    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::dyaml::Yaml for #name #ty_generics #where_clause {
            fn type_desc() -> ::dyaml::data::types::TypeDesc {
                ::dyaml::data::types::TypeDesc::Enumeration {
                    name: #type_name,
                    variants: &[#(#names),*],
                }
            }

            fn decode(node: &::dyaml::Document) -> ::dyaml::Result<Self> {
                match ::dyaml::codec::decode_enum(node, #type_name, &[#(#names),*])? {
                    #(#indices => ::core::result::Result::Ok(Self::#idents),)*
                    index => ::core::result::Result::Err(::dyaml::Error::TypeMismatch {
                        expected: ::std::string::String::from(#type_name),
                        actual: ::std::string::ToString::to_string(&index),
                    }),
                }
            }

            fn encode(&self) -> ::dyaml::Value {
                let name = match self {
                    #(Self::#idents => #names,)*
                };
                ::dyaml::Value::Enum(::std::string::String::from(name))
            }
        }
    })
}
