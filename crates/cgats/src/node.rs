//! Node storage for the CGATS arena.

use crate::{Key, Value};
use serde::Serialize;
use std::fmt;

/// Handle of a node inside a [`crate::Cgats`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The whole input; children are top-level documents.
    Root,
    /// A top-level document tagged with its format identifier (`CTI3`, `CAL`, ...).
    /// The tag is empty for documents opened implicitly by the parser.
    Document(String),
    /// A `BEGIN_<name>` ... `END_<name>` block of verbatim lines.
    Section,
    /// Column names of the sibling `DATA`.
    DataFormat,
    /// Rows, one `Sample` each.
    Data,
    /// One row keyed by column name.
    Sample,
    /// Names of header keys declared with `KEYWORD`.
    Keywords,
}

impl NodeKind {
    /// Type tag as used in the format (`ROOT`, `DATA_FORMAT`, `CTI3`, ...).
    pub fn type_tag(&self) -> &str {
        match self {
            NodeKind::Root => "ROOT",
            NodeKind::Document(tag) => tag,
            NodeKind::Section => "SECTION",
            NodeKind::DataFormat => "DATA_FORMAT",
            NodeKind::Data => "DATA",
            NodeKind::Sample => "SAMPLE",
            NodeKind::Keywords => "KEYWORDS",
        }
    }

    /// Whether children are addressed by position rather than by name.
    pub fn is_indexed(&self) -> bool {
        !matches!(self, NodeKind::Document(_) | NodeKind::Sample)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Document(tag) if tag.is_empty() => f.write_str("untitled document"),
            other => f.write_str(other.type_tag()),
        }
    }
}

/// Content of a slot: a scalar or a child node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    /// Scalar value.
    Value(Value),
    /// Child node.
    Node(NodeId),
}

impl Entry {
    /// Scalar view of the entry.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entry::Value(v) => Some(v),
            Entry::Node(_) => None,
        }
    }

    /// Node view of the entry.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Entry::Node(id) => Some(*id),
            Entry::Value(_) => None,
        }
    }
}

impl From<Value> for Entry {
    fn from(v: Value) -> Self {
        Entry::Value(v)
    }
}

impl From<NodeId> for Entry {
    fn from(id: NodeId) -> Self {
        Entry::Node(id)
    }
}

/// Ordered slots of a node.
#[derive(Debug, Clone)]
pub(crate) enum Slots {
    Indexed(Vec<Entry>),
    Named(Vec<(String, Entry)>),
}

impl Slots {
    pub(crate) fn for_kind(kind: &NodeKind) -> Self {
        if kind.is_indexed() {
            Slots::Indexed(Vec::new())
        } else {
            Slots::Named(Vec::new())
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Slots::Indexed(v) => v.len(),
            Slots::Named(v) => v.len(),
        }
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&Entry> {
        match (self, key) {
            (Slots::Indexed(v), Key::Index(i)) => v.get(*i),
            (Slots::Named(v), Key::Name(n)) => v.iter().find(|(k, _)| k == n).map(|(_, e)| e),
            _ => None,
        }
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        match self {
            Slots::Named(v) => v.iter().position(|(k, _)| k == name),
            Slots::Indexed(_) => None,
        }
    }

    pub(crate) fn keys(&self) -> Vec<Key> {
        match self {
            Slots::Indexed(v) => (0..v.len()).map(Key::Index).collect(),
            Slots::Named(v) => v.iter().map(|(k, _)| Key::Name(k.clone())).collect(),
        }
    }

    pub(crate) fn entries(&self) -> Box<dyn Iterator<Item = &Entry> + '_> {
        match self {
            Slots::Indexed(v) => Box::new(v.iter()),
            Slots::Named(v) => Box::new(v.iter().map(|(_, e)| e)),
        }
    }

    pub(crate) fn entries_mut(&mut self) -> Box<dyn Iterator<Item = &mut Entry> + '_> {
        match self {
            Slots::Indexed(v) => Box::new(v.iter_mut()),
            Slots::Named(v) => Box::new(v.iter_mut().map(|(_, e)| e)),
        }
    }

    /// Inserts or replaces a named slot, keeping the position of an existing key.
    pub(crate) fn set_named(&mut self, name: &str, entry: Entry) -> Option<Entry> {
        let Slots::Named(v) = self else {
            return None;
        };
        match v.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, entry)),
            None => {
                v.push((name.to_string(), entry));
                None
            }
        }
    }
}

/// One node of the arena.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) key: Option<Key>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) datetime: Option<String>,
    pub(crate) vmaxlen: usize,
    pub(crate) slots: Slots,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, key: Option<Key>, parent: Option<NodeId>) -> Self {
        let slots = Slots::for_kind(&kind);
        Self {
            kind,
            key,
            parent,
            datetime: None,
            vmaxlen: 0,
            slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_choose_slot_layout() {
        assert!(NodeKind::Data.is_indexed());
        assert!(NodeKind::Root.is_indexed());
        assert!(!NodeKind::Sample.is_indexed());
        assert!(!NodeKind::Document("CTI1".into()).is_indexed());
    }

    #[test]
    fn named_slots_keep_position_on_replace() {
        let mut slots = Slots::for_kind(&NodeKind::Sample);
        slots.set_named("A", Entry::Value(Value::Int(1)));
        slots.set_named("B", Entry::Value(Value::Int(2)));
        let old = slots.set_named("A", Entry::Value(Value::Int(3)));
        assert_eq!(old, Some(Entry::Value(Value::Int(1))));
        assert_eq!(slots.keys(), vec![Key::from("A"), Key::from("B")]);
        assert_eq!(slots.get(&Key::from("A")), Some(&Entry::Value(Value::Int(3))));
    }

    #[test]
    fn mismatched_key_kind_misses() {
        let mut slots = Slots::for_kind(&NodeKind::DataFormat);
        if let Slots::Indexed(v) = &mut slots {
            v.push(Entry::Value(Value::from("RGB_R")));
        }
        assert!(slots.get(&Key::from("RGB_R")).is_none());
        assert!(slots.get(&Key::Index(0)).is_some());
    }

    #[test]
    fn untitled_document_display() {
        assert_eq!(NodeKind::Document(String::new()).to_string(), "untitled document");
        assert_eq!(NodeKind::DataFormat.to_string(), "DATA_FORMAT");
    }
}
