//! Derive macros for `dyaml`.
//!
//! - `#[derive(Config)]` - a type bound to a whole document
//! - `#[derive(Composite)]` - a nested object whose fields are all members
//! - `#[derive(Record)]` - a fixed-shape value decoded from all of its
//!   components at once
//! - `#[derive(Enumeration)]` - a fieldless enum matched by variant name
//!
//! Use them through the `dyaml` re-exports; the generated code refers to
//! `::dyaml`.
//!
//! # Container Attributes
//!
//! - `#[config(path = "servers/{id}.yml")]` - document path template
//! - `#[config(inject = "server.properties.yml")]` - overlay onto a document
//!   owned by something else; never creates it
//! - `#[config(namespace = "proxy")]` - prefix the namespace's base path
//! - `#[config(git = "proxy")]`, `#[config(git_optional)]` - read through a
//!   registered git store
//! - `#[comment("line", ...)]` - header printed at the top of the document
//!
//! # Field Attributes
//!
//! - `#[node]`, `#[node(order = 1, key = "display.motd")]` - value member;
//!   an `Option` field is optional and falls back to `None`
//! - `#[node(skip)]` - not a member
//! - `#[comment("line", ...)]` - comment printed above the member; without
//!   `#[node]` on a config field, the member prints only its comment
//! - `#[path_param("id")]` - receives the value used for `{id}` in the path
//! - `#[all_contents]` - receives the raw bytes of the document
//!
//! A field takes at most one of `#[node]`, `#[path_param]` and
//! `#[all_contents]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attr;
mod expand;

/// Derive `Bindable` and `Config`. Only fields carrying one of the field
/// attributes are members.
#[proc_macro_derive(Config, attributes(config, node, comment, path_param, all_contents))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand::derive_config(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `Bindable` and `Yaml` for a nested object. Every field is a
/// member unless marked `#[node(skip)]`; the type must implement `Default`.
#[proc_macro_derive(Composite, attributes(node, comment))]
pub fn derive_composite(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand::derive_composite(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `Yaml` for a record. Every component is mandatory.
#[proc_macro_derive(Record, attributes(node, comment))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand::derive_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `Yaml` for a fieldless enum, matched case-insensitively.
#[proc_macro_derive(Enumeration)]
pub fn derive_enumeration(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand::derive_enumeration(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
