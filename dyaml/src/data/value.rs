//! Encoded values.
//!
//! [`Value`] is what a typed value looks like once encoded: opaque to the
//! schema tree, rendered by the printer and convertible to a parser
//! [`Document`] node.

use serde_yaml::{Mapping, Number};

use crate::{
    codec::Document,
    error::{Error, Result},
    key::derive_key,
};

/// An encoded value held by a schema leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value; members holding it are skipped when printing.
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// A variant name of an enumeration.
    Enum(String),
    /// Members of a composite or components of a record.
    Object(Vec<Field>),
    List(Vec<Value>),
    Set(Vec<Value>),
    /// Entries of a map; keys must encode to [`Value::Str`].
    Map(Vec<(Value, Value)>),
}

/// One member of an encoded composite or record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Print order; ties are broken by key.
    pub order: i32,
    /// Dotted document path relative to the owning object.
    pub key: String,
    pub comment: Vec<String>,
    pub value: Value,
}

impl Field {
    pub fn new(order: i32, key: impl Into<String>, comment: &[&str], value: Value) -> Self {
        Field {
            order,
            key: key.into(),
            comment: comment.iter().map(|s| s.to_string()).collect(),
            value,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value is printed inline after its key.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Bool(_)
                | Value::Int(_)
                | Value::UInt(_)
                | Value::Float(_)
                | Value::Str(_)
                | Value::Enum(_)
        )
    }

    /// Short description of the value's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Enum(_) => "enumeration",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    /// The key text of a map entry, derived the same way member keys are.
    pub fn map_key(&self) -> Result<String> {
        match self {
            Value::Str(key) => Ok(derive_key(key)),
            other => Err(Error::NonStringKey(other.kind().to_string())),
        }
    }

    /// Convert into the node shape the parser would produce for this value
    /// once printed.
    pub fn to_document(&self) -> Result<Document> {
        Ok(match self {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(*b),
            Value::Int(i) => Document::Number(Number::from(*i)),
            Value::UInt(u) => Document::Number(Number::from(*u)),
            Value::Float(f) => Document::Number(Number::from(*f)),
            Value::Str(s) | Value::Enum(s) => Document::String(s.clone()),
            Value::Object(fields) => {
                let mut mapping = Mapping::new();
                for field in fields.iter().filter(|f| !f.value.is_null()) {
                    let segments: Vec<&str> = field.key.split('.').collect();
                    insert_path(&mut mapping, &segments, field.value.to_document()?)?;
                }
                Document::Mapping(mapping)
            }
            Value::List(items) | Value::Set(items) => Document::Sequence(
                items
                    .iter()
                    .map(Value::to_document)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Map(entries) => {
                let mut mapping = Mapping::new();
                for (key, value) in entries {
                    let key = Document::String(key.map_key()?);
                    if !mapping.contains_key(&key) {
                        mapping.insert(key, value.to_document()?);
                    }
                }
                Document::Mapping(mapping)
            }
        })
    }
}

fn insert_path(mapping: &mut Mapping, segments: &[&str], value: Document) -> Result<()> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(());
    };
    let key = Document::String(first.to_string());
    if rest.is_empty() {
        if !mapping.contains_key(&key) {
            mapping.insert(key, value);
        }
        return Ok(());
    }
    let child = mapping
        .entry(key)
        .or_insert_with(|| Document::Mapping(Mapping::new()));
    match child {
        Document::Mapping(inner) => insert_path(inner, rest, value),
        _ => Err(Error::LeafChild {
            name: first.to_string(),
        }),
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_to_document_nests_dotted_keys() {
        let value = Value::Object(vec![
            Field::new(0, "port", &[], Value::Int(25565)),
            Field::new(0, "display.motd", &[], Value::from("Welcome")),
            Field::new(0, "skipped", &[], Value::Null),
        ]);
        let doc = value.to_document().unwrap();
        let expected: Document =
            serde_yaml::from_str("port: 25565\ndisplay:\n  motd: Welcome\n").unwrap();
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_map_keys_are_derived() {
        let value = Value::Map(vec![(Value::from("serverOne"), Value::Bool(true))]);
        let doc = value.to_document().unwrap();
        assert_eq!(doc["server-one"], Document::Bool(true));
    }

    #[test]
    fn test_non_string_map_key_rejected() {
        let value = Value::Map(vec![(Value::Int(1), Value::Bool(true))]);
        assert!(matches!(value.to_document(), Err(Error::NonStringKey(_))));
    }
}
