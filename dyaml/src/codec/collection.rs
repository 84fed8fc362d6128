use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    hash::Hash,
};

use crate::{
    codec::{Document, Yaml, describe, expect_mapping},
    data::{
        types::{TypeDesc, classify},
        value::Value,
    },
    error::{Error, Result},
};

fn decode_items<T: Yaml>(desc: &TypeDesc, node: &Document) -> Result<Vec<T>> {
    classify(desc)?;
    let items = node
        .as_sequence()
        .ok_or_else(|| Error::mismatch(desc.to_string(), describe(node)))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| T::decode(item).map_err(|e| e.at(&format!("[{i}]"))))
        .collect()
}

fn decode_entries<V: Yaml>(desc: &TypeDesc, node: &Document) -> Result<Vec<(String, V)>> {
    classify(desc)?;
    let mapping = expect_mapping(node)?;
    mapping
        .iter()
        .map(|(key, value)| {
            let Document::String(key) = key else {
                return Err(Error::NonStringKey(describe(key)));
            };
            let value = V::decode(value).map_err(|e| e.at(key))?;
            Ok((key.clone(), value))
        })
        .collect()
}

fn encode_entries<'a, V: Yaml + 'a>(entries: impl Iterator<Item = (&'a String, &'a V)>) -> Value {
    Value::Map(
        entries
            .map(|(k, v)| (Value::Str(k.clone()), v.encode()))
            .collect(),
    )
}

impl<T: Yaml> Yaml for Option<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::optional(T::type_desc())
    }

    fn decode(node: &Document) -> Result<Self> {
        match node {
            Document::Null => Ok(None),
            other => T::decode(other).map(Some),
        }
    }

    fn encode(&self) -> Value {
        match self {
            Some(value) => value.encode(),
            None => Value::Null,
        }
    }
}

impl<T: Yaml> Yaml for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::list(T::type_desc())
    }

    fn decode(node: &Document) -> Result<Self> {
        decode_items(&Self::type_desc(), node)
    }

    fn encode(&self) -> Value {
        Value::List(self.iter().map(Yaml::encode).collect())
    }
}

impl<T: Yaml + Eq + Hash> Yaml for HashSet<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::set(T::type_desc())
    }

    fn decode(node: &Document) -> Result<Self> {
        Ok(decode_items(&Self::type_desc(), node)?.into_iter().collect())
    }

    fn encode(&self) -> Value {
        Value::Set(self.iter().map(Yaml::encode).collect())
    }
}

impl<T: Yaml + Ord> Yaml for BTreeSet<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::set(T::type_desc())
    }

    fn decode(node: &Document) -> Result<Self> {
        Ok(decode_items(&Self::type_desc(), node)?.into_iter().collect())
    }

    fn encode(&self) -> Value {
        Value::Set(self.iter().map(Yaml::encode).collect())
    }
}

/// Entries are encoded in key order so printing is deterministic.
///
/// Printed keys go through key derivation like member names do:
/// `serverOne` prints as `server-one` and `a_b` as `a.b`. Only keys
/// already in that form read back unchanged.
impl<V: Yaml> Yaml for HashMap<String, V> {
    fn type_desc() -> TypeDesc {
        TypeDesc::map(TypeDesc::Text, V::type_desc())
    }

    fn decode(node: &Document) -> Result<Self> {
        Ok(decode_entries(&Self::type_desc(), node)?.into_iter().collect())
    }

    fn encode(&self) -> Value {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        encode_entries(entries.into_iter())
    }
}

/// Printed keys are derived the same way as for [`HashMap`], so only
/// kebab-case keys without `_` read back unchanged.
impl<V: Yaml> Yaml for BTreeMap<String, V> {
    fn type_desc() -> TypeDesc {
        TypeDesc::map(TypeDesc::Text, V::type_desc())
    }

    fn decode(node: &Document) -> Result<Self> {
        Ok(decode_entries(&Self::type_desc(), node)?.into_iter().collect())
    }

    fn encode(&self) -> Value {
        encode_entries(self.iter())
    }
}
