//! Type descriptors and shape classification.
//!
//! Every type the codec understands describes itself with a [`TypeDesc`].
//! [`classify`] turns a descriptor into one of the fixed [`Shape`]s or
//! rejects it, so unsupported member types fail before any I/O happens.

use std::fmt;

use crate::error::{Error, Result};

/// Human readable list of the supported type shapes, used in error messages.
pub const SUPPORTED_TYPES: &[&str] = &[
    "Primitive",
    "String",
    "Composite",
    "Enumeration",
    "Record",
    "List<Primitive>",
    "List<String>",
    "List<Composite>",
    "List<Enumeration>",
    "List<Record>",
    "Set<Primitive>",
    "Set<String>",
    "Set<Composite>",
    "Set<Enumeration>",
    "Set<Record>",
    "Map<String, Primitive>",
    "Map<String, String>",
    "Map<String, Composite>",
    "Map<String, Enumeration>",
    "Map<String, Record>",
];

/// Numeric, boolean and character scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
}

impl Primitive {
    /// The Rust spelling of the primitive.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::Isize => "isize",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::Usize => "usize",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }
}

/// Static description of a bindable type, carrying one level of type
/// parameters for containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDesc {
    /// Numeric, boolean or character scalar.
    Primitive(Primitive),
    /// Owned text.
    Text,
    /// A type whose members are themselves bindable entries.
    Composite(&'static str),
    /// A fieldless enum decoded from its variant name.
    Enumeration {
        name: &'static str,
        variants: &'static [&'static str],
    },
    /// A fixed-shape record built from all of its components at once.
    Record(&'static str),
    /// Ordered homogeneous list.
    List(Box<TypeDesc>),
    /// Unordered homogeneous set.
    Set(Box<TypeDesc>),
    /// Map from keys to homogeneous values.
    Map(Box<TypeDesc>, Box<TypeDesc>),
    /// A value that may be absent.
    Optional(Box<TypeDesc>),
}

impl TypeDesc {
    pub fn list(element: TypeDesc) -> Self {
        TypeDesc::List(Box::new(element))
    }

    pub fn set(element: TypeDesc) -> Self {
        TypeDesc::Set(Box::new(element))
    }

    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        TypeDesc::Map(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: TypeDesc) -> Self {
        TypeDesc::Optional(Box::new(inner))
    }

    fn unsupported(&self) -> Error {
        Error::Unsupported {
            type_name: self.to_string(),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Primitive(p) => f.write_str(p.name()),
            TypeDesc::Text => f.write_str("String"),
            TypeDesc::Composite(name) | TypeDesc::Record(name) => f.write_str(name),
            TypeDesc::Enumeration { name, .. } => f.write_str(name),
            TypeDesc::List(e) => write!(f, "List<{e}>"),
            TypeDesc::Set(e) => write!(f, "Set<{e}>"),
            TypeDesc::Map(k, v) => write!(f, "Map<{k}, {v}>"),
            TypeDesc::Optional(inner) => write!(f, "Option<{inner}>"),
        }
    }
}

/// The closed set of shapes the codec converts between documents and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Primitive,
    Text,
    Composite,
    Enumeration,
    Record,
    List,
    Set,
    Map,
}

impl Shape {
    /// Whether the shape may appear as a list/set element or map value.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Shape::Primitive | Shape::Text | Shape::Composite | Shape::Enumeration | Shape::Record
        )
    }
}

/// Classify a type descriptor.
///
/// Shapes are tested in a fixed precedence order: primitive, text, composite,
/// enumeration, record, list, set, map. Containers additionally require their
/// element (or map value) to be a leaf shape and map keys to be text.
pub fn classify(desc: &TypeDesc) -> Result<Shape> {
    match desc {
        TypeDesc::Primitive(_) => Ok(Shape::Primitive),
        TypeDesc::Text => Ok(Shape::Text),
        TypeDesc::Composite(_) => Ok(Shape::Composite),
        TypeDesc::Enumeration { .. } => Ok(Shape::Enumeration),
        TypeDesc::Record(_) => Ok(Shape::Record),
        TypeDesc::List(element) => {
            leaf(element).map_err(|_| desc.unsupported())?;
            Ok(Shape::List)
        }
        TypeDesc::Set(element) => {
            leaf(element).map_err(|_| desc.unsupported())?;
            Ok(Shape::Set)
        }
        TypeDesc::Map(key, value) => {
            if **key != TypeDesc::Text {
                return Err(desc.unsupported());
            }
            leaf(value).map_err(|_| desc.unsupported())?;
            Ok(Shape::Map)
        }
        TypeDesc::Optional(_) => Err(desc.unsupported()),
    }
}

/// Classify the element type of a container, rejecting nested containers.
pub fn classify_element(desc: &TypeDesc) -> Result<Shape> {
    leaf(desc)
}

/// Classify the declared type of a member.
///
/// A member may be optional; the returned flag reports whether it was.
pub fn classify_member(desc: &TypeDesc) -> Result<(Shape, bool)> {
    match desc {
        TypeDesc::Optional(inner) => Ok((classify(inner)?, true)),
        other => Ok((classify(other)?, false)),
    }
}

fn leaf(desc: &TypeDesc) -> Result<Shape> {
    let shape = classify(desc)?;
    if !shape.is_leaf() {
        return Err(desc.unsupported());
    }
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(
            classify(&TypeDesc::Primitive(Primitive::I32)).unwrap(),
            Shape::Primitive
        );
        assert_eq!(classify(&TypeDesc::Text).unwrap(), Shape::Text);
        assert_eq!(
            classify(&TypeDesc::Record("Point")).unwrap(),
            Shape::Record
        );
    }

    #[test]
    fn test_containers_of_leaves() {
        let list = TypeDesc::list(TypeDesc::Text);
        assert_eq!(classify(&list).unwrap(), Shape::List);

        let set = TypeDesc::set(TypeDesc::Primitive(Primitive::U16));
        assert_eq!(classify(&set).unwrap(), Shape::Set);

        let map = TypeDesc::map(TypeDesc::Text, TypeDesc::Composite("Server"));
        assert_eq!(classify(&map).unwrap(), Shape::Map);
    }

    #[test]
    fn test_nested_containers_rejected() {
        let nested = TypeDesc::list(TypeDesc::list(TypeDesc::Text));
        let err = classify(&nested).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("List<List<String>>"), "{msg}");
        assert!(msg.contains("Map<String, Record>"), "{msg}");
    }

    #[test]
    fn test_non_string_map_key_rejected() {
        let map = TypeDesc::map(
            TypeDesc::Primitive(Primitive::I32),
            TypeDesc::Text,
        );
        assert!(matches!(
            classify(&map),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_optional_only_at_member_level() {
        let opt = TypeDesc::optional(TypeDesc::Text);
        assert_eq!(classify_member(&opt).unwrap(), (Shape::Text, true));
        assert!(classify(&opt).is_err());
        assert!(classify(&TypeDesc::list(opt)).is_err());
    }
}
