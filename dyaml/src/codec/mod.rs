//! Type-directed conversion between parser nodes and typed values.
//!
//! Every bindable type implements [`Yaml`]: it describes its own shape,
//! decodes itself from a parsed [`Document`] node and encodes itself into a
//! [`Value`] the printer can render. Scalars and containers are implemented
//! here; composites, records and enumerations get their implementations from
//! the derive macros, which build on the helpers in this module.

use serde_yaml::Mapping;

use crate::{
    data::{
        member::{Bindable, Binding},
        types::TypeDesc,
        value::{Field, Value},
    },
    error::{Error, Result},
    key::resolve_key,
};

mod collection;
mod primitive;

/// A parsed document node.
pub type Document = serde_yaml::Value;

/// A type that converts to and from document nodes.
pub trait Yaml: Sized {
    /// Static description of the type, used for classification.
    fn type_desc() -> TypeDesc;

    /// Decode a value from a parsed node.
    fn decode(node: &Document) -> Result<Self>;

    /// Encode the value for printing.
    fn encode(&self) -> Value;
}

/// Short description of a node's kind, used in error messages.
pub fn describe(node: &Document) -> String {
    match node {
        Document::Null => "null".to_string(),
        Document::Bool(b) => format!("boolean `{b}`"),
        Document::Number(n) => format!("number `{n}`"),
        Document::String(s) => format!("string `{s}`"),
        Document::Sequence(_) => "sequence".to_string(),
        Document::Mapping(_) => "mapping".to_string(),
        Document::Tagged(tagged) => format!("tagged value `{}`", tagged.tag),
    }
}

/// Find the node at a dotted path below `root`.
pub fn lookup<'a>(root: &'a Document, path: &str) -> Result<&'a Document> {
    path.split('.').try_fold(root, |node, segment| {
        node.as_mapping()
            .and_then(|mapping| mapping.get(segment))
            .ok_or_else(|| Error::MissingNode {
                path: path.to_string(),
            })
    })
}

/// Require a mapping node.
pub fn expect_mapping(node: &Document) -> Result<&Mapping> {
    node.as_mapping()
        .ok_or_else(|| Error::mismatch("mapping", describe(node)))
}

/// Text of a scalar node; numbers and booleans are rendered as written.
pub(crate) fn scalar_text(node: &Document) -> Option<String> {
    match node {
        Document::String(s) => Some(s.clone()),
        Document::Bool(b) => Some(b.to_string()),
        Document::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode a composite: start from `T::default()` and decode every value
/// member from its path below `node`.
pub fn decode_composite<T: Bindable + Default>(node: &Document) -> Result<T> {
    expect_mapping(node)?;
    let mut instance = T::default();
    decode_members(&mut instance, node)?;
    Ok(instance)
}

/// Decode every value member of `instance` from its path below `node`.
///
/// Optional members that are missing or fail to decode are cleared;
/// any other failure aborts, leaving `instance` partially assigned.
pub(crate) fn decode_members<T: Bindable>(instance: &mut T, node: &Document) -> Result<()> {
    for member in T::members() {
        let Binding::Value(accessor) = &member.binding else {
            continue;
        };
        let path = member.path();
        match lookup(node, &path).and_then(|child| (accessor.decode)(instance, child)) {
            Ok(()) => {}
            Err(e) if accessor.optional => {
                warn!("`{path}` falls back to absent: {e}");
                (accessor.clear)(instance);
            }
            Err(e) => return Err(e.at(&path)),
        }
    }
    Ok(())
}

/// Encode the value members of a composite.
pub fn encode_composite<T: Bindable>(instance: &T) -> Value {
    let fields = T::members()
        .iter()
        .filter_map(|member| {
            let accessor = member.accessor()?;
            Some(Field::new(
                member.order,
                member.path(),
                member.comment,
                (accessor.encode)(instance),
            ))
        })
        .collect();
    Value::Object(fields)
}

/// Decode one mandatory record component.
pub fn component<T: Yaml>(node: &Document, ident: &str, key: Option<&str>) -> Result<T> {
    let path = resolve_key(key, ident);
    lookup(node, &path)
        .and_then(T::decode)
        .map_err(|e| e.at(&path))
}

/// Match a scalar against the declared variant names, ignoring case.
///
/// Returns the index of the matching variant.
pub fn decode_enum(node: &Document, type_name: &str, variants: &[&str]) -> Result<usize> {
    let text = scalar_text(node).ok_or_else(|| Error::mismatch(type_name, describe(node)))?;
    variants
        .iter()
        .position(|variant| variant.eq_ignore_ascii_case(&text))
        .ok_or_else(|| Error::InvalidVariant {
            value: text,
            type_name: type_name.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Document {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_lookup_nested() {
        let doc = parse("display:\n  motd: Welcome\n");
        assert_eq!(
            lookup(&doc, "display.motd").unwrap(),
            &Document::String("Welcome".into())
        );
        assert!(lookup(&doc, "display.title").unwrap_err().is_missing_node());
        assert!(lookup(&doc, "display.motd.inner").unwrap_err().is_missing_node());
    }

    #[test]
    fn test_enum_case_insensitive() {
        const COLORS: &[&str] = &["RED", "GREEN", "BLUE"];
        assert_eq!(decode_enum(&parse("red"), "Color", COLORS).unwrap(), 0);
        assert_eq!(decode_enum(&parse("Blue"), "Color", COLORS).unwrap(), 2);

        let err = decode_enum(&parse("PURPLE"), "Color", COLORS).unwrap_err();
        assert!(err.to_string().contains("RED, GREEN, BLUE"), "{err}");
    }

    #[test]
    fn test_component_reports_path() {
        let doc = parse("x: 1\n");
        let err = component::<i32>(&doc, "y", None).unwrap_err();
        assert!(err.is_missing_node());
        assert!(err.to_string().starts_with("`y`"), "{err}");
        assert_eq!(component::<i32>(&doc, "x", None).unwrap(), 1);
    }
}
