//! Deterministic document printer.
//!
//! [`Printer`] renders a [`SchemaNode`] tree into text the YAML parser reads
//! back into the same node shape. Its fields also carry the per-load
//! settings: path and comment replacements, injection mode and backups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    data::{
        schema::{NodeKind, SchemaNode, object_tree},
        value::Value,
    },
    error::{Error, Result},
};

/// Printer and load settings.
///
/// ```rust
/// use dyaml::Printer;
///
/// let printer = Printer::default()
///     .with_indent_spaces(2)
///     .with_path_replacement("id", "lobby");
/// assert_eq!(printer.path_replacements().get("id").map(String::as_str), Some("lobby"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Printer {
    indent_spaces: usize,
    indent_comments: bool,
    line_separator: String,
    path_replacements: HashMap<String, String>,
    comment_replacements: HashMap<String, String>,
    injecting: bool,
    backup: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            indent_spaces: 4,
            indent_comments: true,
            line_separator: "\n".to_string(),
            path_replacements: HashMap::new(),
            comment_replacements: HashMap::new(),
            injecting: false,
            backup: false,
        }
    }
}

impl Printer {
    /// Spaces per nesting level.
    pub fn with_indent_spaces(mut self, spaces: usize) -> Self {
        self.indent_spaces = spaces;
        self
    }

    /// Whether comments follow the indentation of the node they annotate.
    pub fn with_indent_comments(mut self, indent: bool) -> Self {
        self.indent_comments = indent;
        self
    }

    /// Text appended after each leaf entry to separate groups.
    pub fn with_line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    /// Replacement for a `{name}` parameter in the document path.
    pub fn with_path_replacement(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_replacements.insert(name.into(), value.into());
        self
    }

    /// Replacement for a `{name}` token in comment text.
    pub fn with_comment_replacement(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.comment_replacements.insert(name.into(), value.into());
        self
    }

    /// Overlay values onto an existing document instead of owning it.
    pub fn with_injecting(mut self, injecting: bool) -> Self {
        self.injecting = injecting;
        self
    }

    /// Copy the previous document aside before overwriting it.
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn indent_spaces(&self) -> usize {
        self.indent_spaces
    }

    pub fn indent_comments(&self) -> bool {
        self.indent_comments
    }

    pub fn line_separator(&self) -> &str {
        &self.line_separator
    }

    pub fn path_replacements(&self) -> &HashMap<String, String> {
        &self.path_replacements
    }

    pub fn comment_replacements(&self) -> &HashMap<String, String> {
        &self.comment_replacements
    }

    pub fn injecting(&self) -> bool {
        self.injecting
    }

    pub fn backup(&self) -> bool {
        self.backup
    }

    /// Apply the comment replacements to every line.
    pub fn substitute_comments(&self, lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                self.comment_replacements
                    .iter()
                    .fold(line.clone(), |acc, (k, v)| acc.replace(&format!("{{{k}}}"), v))
            })
            .collect()
    }

    /// Render a tree into document text.
    pub fn render(&self, root: &SchemaNode) -> Result<String> {
        let mut out = String::new();
        self.write_node(&mut out, root, 0, &self.line_separator)?;
        Ok(out)
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(level * self.indent_spaces)
    }

    fn write_comment(&self, out: &mut String, comment: &[String], level: usize) {
        for line in comment.iter().flat_map(|c| c.lines()) {
            if self.indent_comments {
                out.push_str(&self.indent(level));
            }
            if !line.starts_with('#') {
                out.push_str("# ");
            }
            out.push_str(line);
            out.push('\n');
        }
    }

    fn write_node(&self, out: &mut String, node: &SchemaNode, level: usize, sep: &str) -> Result<()> {
        self.write_comment(out, &node.comment, level);
        match (&node.kind, &node.name) {
            (NodeKind::Branch { children }, None) => {
                for child in children {
                    self.write_node(out, child, level, sep)?;
                }
            }
            (NodeKind::Branch { children }, Some(name)) => {
                out.push_str(&self.indent(level));
                out.push_str(&key_literal(name));
                out.push_str(":\n");
                for child in children {
                    self.write_node(out, child, level + 1, sep)?;
                }
            }
            (NodeKind::Leaf { value: Some(value) }, Some(name)) => {
                self.write_entry(out, name, value, level, sep)?;
            }
            // comment-only, or an unnamed value with nowhere to go
            (NodeKind::Leaf { .. }, _) => {}
        }
        Ok(())
    }

    fn write_entry(
        &self,
        out: &mut String,
        name: &str,
        value: &Value,
        level: usize,
        sep: &str,
    ) -> Result<()> {
        out.push_str(&self.indent(level));
        out.push_str(&key_literal(name));
        out.push(':');
        match value {
            scalar if scalar.is_scalar() => {
                out.push(' ');
                out.push_str(&scalar_literal(scalar));
                out.push('\n');
                out.push_str(sep);
            }
            Value::Object(fields) => match object_tree(fields, self)? {
                Some(tree) => {
                    out.push('\n');
                    self.write_node(out, &tree, level + 1, sep)?;
                }
                None => {
                    out.push_str(" {}\n");
                    out.push_str(sep);
                }
            },
            Value::List(items) | Value::Set(items) => {
                if items.is_empty() {
                    out.push_str(" []\n");
                } else {
                    out.push('\n');
                    for item in items {
                        self.write_item(out, item, level + 1)?;
                    }
                }
                out.push_str(sep);
            }
            Value::Map(entries) => {
                if entries.is_empty() {
                    out.push_str(" {}\n");
                    out.push_str(sep);
                } else {
                    out.push('\n');
                    let tree = map_tree(entries)?;
                    self.write_node(out, &tree, level + 1, sep)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn write_item(&self, out: &mut String, item: &Value, level: usize) -> Result<()> {
        let indent = self.indent(level);
        match item {
            Value::Object(fields) => {
                let Some(tree) = object_tree(fields, self)? else {
                    out.push_str(&indent);
                    out.push_str("- {}\n");
                    return Ok(());
                };
                // rendered flush-left without separators, then shifted under the dash
                let mut body = String::new();
                self.write_node(&mut body, &tree, 0, "")?;
                let mut first = true;
                for line in body.lines().filter(|l| !l.trim().is_empty()) {
                    out.push_str(&indent);
                    if first && line.trim_start().starts_with('#') {
                        out.push_str(line.trim_start());
                    } else {
                        out.push_str(if first { "- " } else { "  " });
                        out.push_str(line);
                        first = false;
                    }
                    out.push('\n');
                }
            }
            Value::List(_) | Value::Set(_) | Value::Map(_) => {
                return Err(Error::Unsupported {
                    type_name: format!("nested {}", item.kind()),
                });
            }
            scalar => {
                out.push_str(&indent);
                out.push_str("- ");
                out.push_str(&scalar_literal(scalar));
                out.push('\n');
            }
        }
        Ok(())
    }
}

/// Build the synthetic branch a map value prints as; the first entry wins
/// when two keys derive to the same text.
fn map_tree(entries: &[(Value, Value)]) -> Result<SchemaNode> {
    let mut root = SchemaNode::branch(None, Vec::new());
    for (key, value) in entries {
        if matches!(value, Value::List(_) | Value::Set(_) | Value::Map(_)) {
            return Err(Error::Unsupported {
                type_name: format!("Map<String, {}>", value.kind()),
            });
        }
        let key = key.map_key()?;
        root.child_or_insert(SchemaNode::leaf(&key, Some(value.clone()), Vec::new()))?;
    }
    Ok(root)
}

fn scalar_literal(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => float_literal(*f),
        // always quoted so variants such as `Null` stay strings
        Value::Str(s) | Value::Enum(s) => quote(s),
        _ => "null".to_string(),
    }
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{f:?}")
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

const RESERVED_KEYS: &[&str] = &["true", "false", "null", "~", "yes", "no", "on", "off"];

fn key_literal(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
        && !RESERVED_KEYS.contains(&name.to_ascii_lowercase().as_str())
        && name.parse::<f64>().is_err();
    if plain { name.to_string() } else { quote(name) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::Document,
        data::{
            schema::{Target, build_tree},
            value::Field,
        },
    };

    fn target(order: i32, path: &str, value: Value, comment: &[&str]) -> Target {
        Target {
            order,
            path: path.to_string(),
            value: Some(value),
            slot: None,
            comment: comment.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn render(targets: &[Target]) -> String {
        let tree = build_tree(&[], targets).unwrap();
        Printer::default().render(&tree).unwrap()
    }

    #[test]
    fn test_render_groups() {
        let text = render(&[
            target(0, "display.motd", Value::from("Welcome"), &[]),
            target(0, "port", Value::UInt(25565), &["The port"]),
        ]);
        assert_eq!(
            text,
            "display:\n    motd: \"Welcome\"\n\n# The port\nport: 25565\n\n"
        );
    }

    #[test]
    fn test_empty_collections() {
        let text = render(&[
            target(0, "names", Value::List(Vec::new()), &[]),
            target(1, "servers", Value::Map(Vec::new()), &[]),
            target(2, "nested", Value::Object(Vec::new()), &[]),
        ]);
        let doc: Document = serde_yaml::from_str(&text).unwrap();
        assert_eq!(doc["names"], Document::Sequence(Vec::new()));
        assert!(doc["servers"].as_mapping().unwrap().is_empty());
        assert!(doc["nested"].as_mapping().unwrap().is_empty());
    }

    #[test]
    fn test_composite_list_reparses() {
        let item = |name: &str, port: u64| {
            Value::Object(vec![
                Field::new(0, "name", &["Server name"], Value::from(name)),
                Field::new(1, "address.port", &[], Value::UInt(port)),
            ])
        };
        let value = Value::List(vec![item("lobby", 1), item("hub", 2)]);
        let text = render(&[target(0, "servers", value.clone(), &[])]);

        let doc: Document = serde_yaml::from_str(&text).unwrap();
        assert_eq!(doc["servers"], value.to_document().unwrap());
        assert!(!text.contains("\n\n    "), "{text}");
    }

    #[test]
    fn test_scalars_reparse() {
        let text = render(&[
            target(0, "quoted", Value::from("a \"b\"\n\\c: #d"), &[]),
            target(1, "flag", Value::Bool(false), &[]),
            target(2, "ratio", Value::Float(0.1), &[]),
            target(3, "whole", Value::Float(2.0), &[]),
            target(4, "color", Value::Enum("RED".into()), &[]),
            target(5, "negative", Value::Int(-3), &[]),
            target(6, "level", Value::Enum("Null".into()), &[]),
        ]);
        let doc: Document = serde_yaml::from_str(&text).unwrap();
        assert_eq!(doc["quoted"].as_str(), Some("a \"b\"\n\\c: #d"));
        assert_eq!(doc["flag"].as_bool(), Some(false));
        assert_eq!(doc["ratio"].as_f64(), Some(0.1));
        assert_eq!(doc["whole"].as_f64(), Some(2.0));
        assert_eq!(doc["color"].as_str(), Some("RED"));
        assert_eq!(doc["negative"].as_i64(), Some(-3));
        assert_eq!(doc["level"].as_str(), Some("Null"));
        assert!(text.contains("level: \"Null\"\n"), "{text}");
    }

    #[test]
    fn test_map_keys_quoted_when_needed() {
        let value = Value::Map(vec![
            (Value::from("true"), Value::Int(1)),
            (Value::from("8080"), Value::Int(2)),
            (Value::from("plain"), Value::Int(3)),
        ]);
        let text = render(&[target(0, "map", value, &[])]);
        let doc: Document = serde_yaml::from_str(&text).unwrap();
        assert_eq!(doc["map"]["true"].as_i64(), Some(1));
        assert_eq!(doc["map"]["8080"].as_i64(), Some(2));
        assert_eq!(doc["map"]["plain"].as_i64(), Some(3));
    }

    #[test]
    fn test_comment_settings() {
        let tree = build_tree(
            &["Header for {name}".to_string()],
            &[target(0, "a.b", Value::Int(1), &["# already marked"])],
        )
        .unwrap();
        let printer = Printer::default()
            .with_indent_spaces(2)
            .with_indent_comments(false)
            .with_line_separator("");
        let text = printer.render(&tree).unwrap();
        assert_eq!(text, "# Header for {name}\na:\n# already marked\n  b: 1\n");

        let substituted = Printer::default()
            .with_comment_replacement("name", "lobby")
            .substitute_comments(&["Header for {name}".to_string()]);
        assert_eq!(substituted, ["Header for lobby"]);
    }

    #[test]
    fn test_nested_sequences_rejected() {
        let value = Value::List(vec![Value::List(vec![Value::Int(1)])]);
        let tree = build_tree(&[], &[target(0, "grid", value, &[])]).unwrap();
        assert!(matches!(
            Printer::default().render(&tree),
            Err(Error::Unsupported { .. })
        ));
    }
}
