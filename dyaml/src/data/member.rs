//! Static member descriptors.
//!
//! Rust has no runtime field reflection, so every bindable type exposes a
//! list of [`Member`]s instead. The derive macros generate these lists; they
//! can also be written by hand.

use crate::{
    codec::Document,
    data::{types::TypeDesc, value::Value},
    error::Result,
    key::resolve_key,
};

/// A type whose members are bound to document paths.
pub trait Bindable: Sized {
    /// The members of this type in declaration order.
    fn members() -> Vec<Member<Self>>;
}

/// One declared member of a bindable type.
pub struct Member<T> {
    /// The member identifier as written in the type declaration.
    pub ident: &'static str,
    /// Explicit dotted path overriding the derived one.
    pub key: Option<&'static str>,
    /// Print order.
    pub order: i32,
    /// Comment lines printed above the member.
    pub comment: &'static [&'static str],
    pub binding: Binding<T>,
}

/// How a member is bound.
pub enum Binding<T> {
    /// A value read from and written to the document.
    Value(Accessor<T>),
    /// Only a comment is printed at the member's path.
    Comment,
    /// Receives the replacement used for `name` in the document path.
    PathParameter {
        name: &'static str,
        assign: fn(&mut T, &str),
        swap: fn(&mut T, &mut T),
    },
    /// Receives the raw bytes of the backing document.
    AllContents {
        assign: fn(&mut T, Vec<u8>),
        swap: fn(&mut T, &mut T),
    },
}

/// Typed access to a value member.
pub struct Accessor<T> {
    pub type_desc: fn() -> TypeDesc,
    /// Whether a failed decode falls back to an absent value.
    pub optional: bool,
    pub encode: fn(&T) -> Value,
    pub decode: fn(&mut T, &Document) -> Result<()>,
    /// Reset the member to its absent value.
    pub clear: fn(&mut T),
    pub swap: fn(&mut T, &mut T),
}

impl<T> Member<T> {
    /// The dotted document path of this member.
    pub fn path(&self) -> String {
        resolve_key(self.key, self.ident)
    }

    pub fn accessor(&self) -> Option<&Accessor<T>> {
        match &self.binding {
            Binding::Value(accessor) => Some(accessor),
            _ => None,
        }
    }

    /// Exchange the bound state of this member between two instances.
    pub fn swap(&self, a: &mut T, b: &mut T) {
        match &self.binding {
            Binding::Value(accessor) => (accessor.swap)(a, b),
            Binding::PathParameter { swap, .. } | Binding::AllContents { swap, .. } => swap(a, b),
            Binding::Comment => {}
        }
    }
}
