//! Reconciling schema trees with documents on disk.

use serde_yaml::Mapping;

use crate::{
    codec::Document,
    data::{schema::SchemaNode, value::Value},
    error::Result,
    printer::Printer,
};

/// Produce the document the rest of a load works from.
///
/// An existing document is parsed as written and only gains the defaults of
/// paths it lacks, in memory. Without one, the tree is printed and the text
/// parsed back, so the result has exactly the shape the parser produces.
pub fn reconcile(tree: &SchemaNode, existing: Option<&str>, printer: &Printer) -> Result<Document> {
    let mut document = match existing {
        Some(text) => parse(text)?,
        None => parse(&printer.render(tree)?)?,
    };
    let filled = fill_missing(&mut document, tree)?;
    if filled > 0 {
        debug!("filled {filled} missing value(s) from defaults");
    }
    Ok(document)
}

/// Parse document text; blank text is an empty document.
pub fn parse(text: &str) -> Result<Document> {
    if text.trim().is_empty() {
        return Ok(Document::Mapping(Mapping::new()));
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Insert the value of every leaf whose path is absent from `document`.
///
/// Paths blocked by an existing non-mapping node are left alone. Returns the
/// number of values inserted.
pub fn fill_missing(document: &mut Document, tree: &SchemaNode) -> Result<usize> {
    if document.is_null() {
        *document = Document::Mapping(Mapping::new());
    }
    let mut filled = 0;
    for (path, value) in tree.leaves() {
        let segments: Vec<&str> = path.split('.').collect();
        if insert_absent(document, &segments, value)? {
            filled += 1;
        }
    }
    Ok(filled)
}

fn insert_absent(node: &mut Document, segments: &[&str], value: &Value) -> Result<bool> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(false);
    };
    let Some(mapping) = node.as_mapping_mut() else {
        return Ok(false);
    };
    let key = Document::String(first.to_string());
    if rest.is_empty() {
        if mapping.contains_key(&key) {
            return Ok(false);
        }
        mapping.insert(key, value.to_document()?);
        return Ok(true);
    }
    let child = mapping
        .entry(key)
        .or_insert_with(|| Document::Mapping(Mapping::new()));
    insert_absent(child, rest, value)
}

/// Write the value of every leaf into `document`, replacing what is there
/// and keeping everything the tree doesn't mention.
pub fn overlay(document: &mut Document, tree: &SchemaNode) -> Result<()> {
    for (path, value) in tree.leaves() {
        let segments: Vec<&str> = path.split('.').collect();
        set_path(document, &segments, value.to_document()?);
    }
    Ok(())
}

fn set_path(node: &mut Document, segments: &[&str], value: Document) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_mapping() {
        *node = Document::Mapping(Mapping::new());
    }
    if let Document::Mapping(mapping) = node {
        let child = mapping
            .entry(Document::String(first.to_string()))
            .or_insert(Document::Null);
        set_path(child, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{Target, build_tree};

    fn tree() -> SchemaNode {
        let target = |path: &str, value: Value| Target {
            order: 0,
            path: path.to_string(),
            value: Some(value),
            slot: None,
            comment: Vec::new(),
        };
        build_tree(
            &[],
            &[
                target("port", Value::Int(25565)),
                target("display.motd", Value::from("Welcome")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_generated_document() {
        let doc = reconcile(&tree(), None, &Printer::default()).unwrap();
        assert_eq!(doc["port"].as_i64(), Some(25565));
        assert_eq!(doc["display"]["motd"].as_str(), Some("Welcome"));
    }

    #[test]
    fn test_existing_values_kept() {
        let doc = reconcile(&tree(), Some("port: 80\nextra: true\n"), &Printer::default()).unwrap();
        assert_eq!(doc["port"].as_i64(), Some(80));
        assert_eq!(doc["extra"].as_bool(), Some(true));
        assert_eq!(doc["display"]["motd"].as_str(), Some("Welcome"));
    }

    #[test]
    fn test_fill_missing_skips_conflicts() {
        let mut doc = parse("display: 3\n").unwrap();
        let filled = fill_missing(&mut doc, &tree()).unwrap();
        assert_eq!(filled, 1);
        assert_eq!(doc["display"].as_i64(), Some(3));
    }

    #[test]
    fn test_overlay_preserves_unrelated() {
        let mut doc = parse("port: 80\nother:\n  keep: yes\ndisplay: 3\n").unwrap();
        overlay(&mut doc, &tree()).unwrap();
        assert_eq!(doc["port"].as_i64(), Some(25565));
        assert_eq!(doc["other"]["keep"].as_str(), Some("yes"));
        assert_eq!(doc["display"]["motd"].as_str(), Some("Welcome"));
    }
}
