//! Schema trees built from declared members.
//!
//! [`generate_targets`] resolves every bindable member of an instance to a
//! [`Target`]; [`build_tree`] folds the targets into an ordered
//! [`SchemaNode`] tree keyed by path segment.

use serde_yaml::Mapping;

use crate::{
    codec::Document,
    data::{
        member::{Bindable, Binding},
        types::classify_member,
        value::{Field, Value},
    },
    error::{Error, Result},
    printer::Printer,
};

/// One position in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Path segment; absent for the root and other pure groupings.
    pub name: Option<String>,
    /// Comment lines printed above the node.
    pub comment: Vec<String>,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Holds a value (or nothing, for comment-only members).
    Leaf { value: Option<Value> },
    /// Holds children in first-inserted order.
    Branch { children: Vec<SchemaNode> },
}

/// A bindable member resolved to its path, order, value and comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub order: i32,
    pub path: String,
    /// Current value; `None` for comment-only targets.
    pub value: Option<Value>,
    /// Index of the backing member in [`Bindable::members`].
    pub slot: Option<usize>,
    pub comment: Vec<String>,
}

impl SchemaNode {
    pub fn branch(name: Option<&str>, comment: Vec<String>) -> Self {
        SchemaNode {
            name: name.map(str::to_string),
            comment,
            kind: NodeKind::Branch {
                children: Vec::new(),
            },
        }
    }

    pub fn leaf(name: &str, value: Option<Value>, comment: Vec<String>) -> Self {
        SchemaNode {
            name: Some(name.to_string()),
            comment,
            kind: NodeKind::Leaf { value },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Leaf { value } => value.as_ref(),
            NodeKind::Branch { .. } => None,
        }
    }

    pub fn children(&self) -> &[SchemaNode] {
        match &self.kind {
            NodeKind::Branch { children } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children()
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
    }

    /// Get the child named like `node`, inserting `node` if there is none.
    ///
    /// Fails when `self` is a leaf: leaves never gain children.
    pub fn child_or_insert(&mut self, node: SchemaNode) -> Result<&mut SchemaNode> {
        match &mut self.kind {
            NodeKind::Branch { children } => {
                let index = match children.iter().position(|c| c.name == node.name) {
                    Some(index) => index,
                    None => {
                        children.push(node);
                        children.len() - 1
                    }
                };
                Ok(&mut children[index])
            }
            NodeKind::Leaf { .. } => Err(Error::LeafChild {
                name: self.name.clone().unwrap_or_default(),
            }),
        }
    }

    /// Find a node by dotted path relative to this one.
    pub fn find(&self, path: &str) -> Option<&SchemaNode> {
        path.split('.')
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Every valued leaf below this node with its dotted path.
    pub fn leaves(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        collect_leaves(self, "", &mut out);
        out
    }

    /// Convert into the node shape the parser produces for the printed tree.
    pub fn to_document(&self) -> Result<Document> {
        match &self.kind {
            NodeKind::Leaf { value } => match value {
                Some(value) => value.to_document(),
                None => Ok(Document::Null),
            },
            NodeKind::Branch { children } => {
                let mut mapping = Mapping::new();
                for child in children {
                    let Some(name) = &child.name else { continue };
                    if child.is_leaf() && child.value().is_none() {
                        continue;
                    }
                    mapping.insert(Document::String(name.clone()), child.to_document()?);
                }
                Ok(Document::Mapping(mapping))
            }
        }
    }
}

fn collect_leaves<'a>(node: &'a SchemaNode, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    let path = match (&node.name, prefix.is_empty()) {
        (None, _) => prefix.to_string(),
        (Some(name), true) => name.clone(),
        (Some(name), false) => format!("{prefix}.{name}"),
    };
    match &node.kind {
        NodeKind::Leaf { value: Some(value) } => out.push((path, value)),
        NodeKind::Leaf { value: None } => {}
        NodeKind::Branch { children } => {
            for child in children {
                collect_leaves(child, &path, out);
            }
        }
    }
}

impl Target {
    fn from_field(field: &Field, printer: &Printer) -> Self {
        Target {
            order: field.order,
            path: field.key.clone(),
            value: Some(field.value.clone()),
            slot: None,
            comment: printer.substitute_comments(&field.comment),
        }
    }
}

/// Sort targets by ascending order, breaking ties by path.
pub fn sort_targets(targets: &mut [Target]) {
    targets.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.path.cmp(&b.path)));
}

/// Resolve the bindable members of `instance` into sorted targets.
///
/// Every value member must classify into a supported shape and carry a
/// value on `instance`; comment text has the printer's comment
/// replacements applied.
pub fn generate_targets<T: Bindable>(instance: &T, printer: &Printer) -> Result<Vec<Target>> {
    let mut targets = Vec::new();
    for (slot, member) in T::members().iter().enumerate() {
        let value = match &member.binding {
            Binding::Value(accessor) => {
                classify_member(&(accessor.type_desc)())?;
                let value = (accessor.encode)(instance);
                if value.is_null() {
                    return Err(Error::MissingDefault {
                        member: member.ident.to_string(),
                    });
                }
                Some(value)
            }
            Binding::Comment if !member.comment.is_empty() => None,
            _ => continue,
        };
        let comment: Vec<String> = member.comment.iter().map(|s| s.to_string()).collect();
        targets.push(Target {
            order: member.order,
            path: member.path(),
            slot: value.as_ref().map(|_| slot),
            value,
            comment: printer.substitute_comments(&comment),
        });
    }
    sort_targets(&mut targets);
    Ok(targets)
}

/// Fold sorted targets into a tree rooted at an unnamed branch.
pub fn build_tree(header: &[String], targets: &[Target]) -> Result<SchemaNode> {
    let mut root = SchemaNode::branch(None, header.to_vec());
    for target in targets {
        let segments: Vec<&str> = target.path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut current = &mut root;
        for segment in parents {
            current = current.child_or_insert(SchemaNode::branch(Some(segment), Vec::new()))?;
            // a comment-only leaf becomes the group it annotates
            if matches!(current.kind, NodeKind::Leaf { value: None }) {
                current.kind = NodeKind::Branch {
                    children: Vec::new(),
                };
            }
        }

        let node = current.child_or_insert(SchemaNode::leaf(last, None, Vec::new()))?;
        match &mut node.kind {
            NodeKind::Leaf { value } => {
                if value.is_none() {
                    *value = target.value.clone();
                }
            }
            NodeKind::Branch { .. } if target.value.is_none() => {}
            NodeKind::Branch { .. } => {
                return Err(Error::LeafChild {
                    name: target.path.clone(),
                });
            }
        }
        node.comment.extend(target.comment.iter().cloned());
    }
    Ok(root)
}

/// Build the synthetic branch a composite or record value prints as.
///
/// Returns `None` when no member is populated.
pub fn object_tree(fields: &[Field], printer: &Printer) -> Result<Option<SchemaNode>> {
    let mut targets: Vec<Target> = fields
        .iter()
        .filter(|f| !f.value.is_null())
        .map(|f| Target::from_field(f, printer))
        .collect();
    if targets.is_empty() {
        return Ok(None);
    }
    sort_targets(&mut targets);
    build_tree(&[], &targets).map(Some)
}
