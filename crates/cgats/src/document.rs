//! The CGATS tree: an arena of nodes addressed by [`NodeId`].
//!
//! A [`Cgats`] owns every node of one parsed input. Node 0 is always the
//! `ROOT`; its children are the top-level documents. Because every node
//! lives in exactly one arena, the document root of any node is the arena
//! itself and the modified flag is a single field on [`Cgats`].
//!
//! Reading goes through [`NodeRef`], a cheap borrowed view:
//!
//! ```rust
//! use cgats::{Cgats, Value};
//!
//! let cgats = Cgats::parse("CTI1\nBEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R\nEND_DATA_FORMAT\n\
//!                           BEGIN_DATA\n1 50.0\nEND_DATA\n").unwrap();
//! let doc = cgats.root().child(0usize).unwrap();
//! assert_eq!(doc.type_tag(), "CTI1");
//! assert_eq!(doc.number_of_sets(), 1);
//! let row = doc.child("DATA").unwrap().child(0usize).unwrap();
//! assert_eq!(row.value("RGB_R"), Some(Value::Float(50.0)));
//! ```

use crate::node::{Node, Slots};
use crate::{CgatsError, CgatsResult, Entry, Key, NodeId, NodeKind, Value};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Header key whose value is always the column count of `DATA_FORMAT`.
pub const NUMBER_OF_FIELDS: &str = "NUMBER_OF_FIELDS";
/// Header key whose value is always the row count of `DATA`.
pub const NUMBER_OF_SETS: &str = "NUMBER_OF_SETS";

/// A parsed (or programmatically built) CGATS input.
///
/// The tree is not synchronized; mutate it from one owner at a time.
#[derive(Debug, Clone)]
pub struct Cgats {
    pub(crate) nodes: Vec<Node>,
    pub(crate) modified: bool,
    pub(crate) filename: Option<PathBuf>,
    pub(crate) mtime: Option<SystemTime>,
}

impl Default for Cgats {
    fn default() -> Self {
        Self::new()
    }
}

impl Cgats {
    /// Handle of the `ROOT` node.
    pub const ROOT: NodeId = NodeId(0);

    /// Creates an empty tree holding only the `ROOT` node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, None, None)],
            modified: false,
            filename: None,
            mtime: None,
        }
    }

    // ---------------------------------------------------------------------
    // Dirty flag
    // ---------------------------------------------------------------------

    /// Whether the tree changed since it was parsed or last checkpointed.
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Sets the modified flag. Every mutation routes through here.
    pub fn set_modified(&mut self, modified: bool) {
        if self.modified != modified {
            tracing::trace!(modified, "cgats modified flag changed");
            self.modified = modified;
        }
    }

    pub(crate) fn touch(&mut self) {
        self.set_modified(true);
    }

    // ---------------------------------------------------------------------
    // Provenance
    // ---------------------------------------------------------------------

    /// File the tree was loaded from or last written to.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Modification time of [`Self::filename`] when it was read or written.
    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    // ---------------------------------------------------------------------
    // Arena access
    // ---------------------------------------------------------------------

    pub(crate) fn raw(&self, id: NodeId) -> CgatsResult<&Node> {
        self.nodes.get(id.0).ok_or(CgatsError::InvalidNode(id))
    }

    pub(crate) fn raw_mut(&mut self, id: NodeId) -> CgatsResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(CgatsError::InvalidNode(id))
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, key: Option<Key>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, key, parent));
        id
    }

    /// Drops every node no longer reachable from `ROOT` and renumbers the rest.
    ///
    /// Removed and replaced nodes otherwise stay in the arena so that their
    /// handles remain readable. All `NodeId`s taken before the call are
    /// invalidated. Returns the number of nodes reclaimed.
    pub fn compact(&mut self) -> usize {
        let mut order = vec![Self::ROOT];
        let mut next = 0;
        while next < order.len() {
            let children = self.child_nodes(order[next]);
            order.extend(children);
            next += 1;
        }

        let mut remap = vec![None; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.0] = Some(NodeId(new));
        }
        let mut old_nodes: Vec<Option<Node>> = std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let reclaimed = old_nodes.len() - order.len();

        self.nodes = order
            .iter()
            .filter_map(|old| old_nodes[old.0].take())
            .map(|mut node| {
                node.parent = node.parent.and_then(|p| remap[p.0]);
                for entry in node.slots.entries_mut() {
                    if let Entry::Node(child) = entry {
                        if let Some(new) = remap[child.0] {
                            *child = new;
                        }
                    }
                }
                node
            })
            .collect();
        tracing::debug!(reclaimed, nodes = self.nodes.len(), "compacted arena");
        reclaimed
    }

    /// Borrowed view of the `ROOT` node.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { cgats: self, id: Self::ROOT }
    }

    /// Borrowed view of any node, `None` for a foreign handle.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.get(id.0).map(|_| NodeRef { cgats: self, id })
    }

    /// Kind of a node.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    /// Parent of a node; `None` for the root and for removed nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Top-level documents in order.
    pub fn documents(&self) -> Vec<NodeId> {
        self.child_nodes(Self::ROOT)
    }

    /// Child node stored under `key`.
    pub fn child(&self, id: NodeId, key: impl Into<Key>) -> Option<NodeId> {
        self.entry(id, &key.into()).and_then(Entry::as_node)
    }

    /// Stored slot under `key`, without computed keys.
    pub fn entry(&self, id: NodeId, key: &Key) -> Option<&Entry> {
        self.nodes.get(id.0)?.slots.get(key)
    }

    /// Slot under `key`, including the computed keys
    /// (`NUMBER_OF_FIELDS`, `NUMBER_OF_SETS`, and `INDEX`/`SAMPLE_ID` on samples).
    pub fn get(&self, id: NodeId, key: impl Into<Key>) -> Option<Entry> {
        let key = key.into();
        let node = self.nodes.get(id.0)?;
        if let Key::Name(name) = &key {
            match (&node.kind, name.as_str()) {
                (NodeKind::Document(_), NUMBER_OF_FIELDS) => {
                    return self.child(id, "DATA_FORMAT").map(|df| Entry::Value(self.len(df).into()));
                }
                (NodeKind::Document(_), NUMBER_OF_SETS) => {
                    return self.child(id, "DATA").map(|data| Entry::Value(self.len(data).into()));
                }
                (NodeKind::Sample, "INDEX" | "SAMPLE_ID") => {
                    return self.sample_position_value(id, name).map(Entry::Value);
                }
                _ => {}
            }
        }
        node.slots.get(&key).cloned()
    }

    /// Scalar under `key`, including computed keys.
    pub fn value(&self, id: NodeId, key: impl Into<Key>) -> Option<Value> {
        match self.get(id, key)? {
            Entry::Value(v) => Some(v),
            Entry::Node(_) => None,
        }
    }

    /// Whether `key` is present, counting the computed header keys.
    pub fn contains(&self, id: NodeId, key: &Key) -> bool {
        let Some(node) = self.nodes.get(id.0) else {
            return false;
        };
        if node.slots.get(key).is_some() {
            return true;
        }
        match (&node.kind, key.as_name()) {
            (NodeKind::Document(_), Some(NUMBER_OF_FIELDS)) => self.child(id, "DATA_FORMAT").is_some(),
            (NodeKind::Document(_), Some(NUMBER_OF_SETS)) => self.child(id, "DATA").is_some(),
            _ => false,
        }
    }

    /// Number of slots of a node.
    pub fn len(&self, id: NodeId) -> usize {
        self.nodes.get(id.0).map_or(0, |n| n.slots.len())
    }

    /// Keys of a node in order.
    pub fn keys(&self, id: NodeId) -> Vec<Key> {
        self.nodes.get(id.0).map_or_else(Vec::new, |n| n.slots.keys())
    }

    /// Child nodes of a node in order, skipping scalars.
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id.0)
            .map(|n| n.slots.entries().filter_map(Entry::as_node).collect())
            .unwrap_or_default()
    }

    /// Column count of the document's `DATA_FORMAT` (0 without one).
    pub fn number_of_fields(&self, document: NodeId) -> usize {
        self.child(document, "DATA_FORMAT").map_or(0, |df| self.len(df))
    }

    /// Row count of the document's `DATA` (0 without one).
    pub fn number_of_sets(&self, document: NodeId) -> usize {
        self.child(document, "DATA").map_or(0, |data| self.len(data))
    }

    /// The `DATA_FORMAT` governing a `DATA` node or a `SAMPLE`.
    pub fn data_format_of(&self, id: NodeId) -> Option<NodeId> {
        let data = match self.kind(id)? {
            NodeKind::Data => id,
            NodeKind::Sample => self.parent(id)?,
            _ => return None,
        };
        self.child(self.parent(data)?, "DATA_FORMAT")
    }

    /// Column names of a `DATA_FORMAT` node.
    pub fn column_names(&self, data_format: NodeId) -> Vec<String> {
        match self.nodes.get(data_format.0).map(|n| &n.slots) {
            Some(Slots::Indexed(v)) => v
                .iter()
                .filter_map(Entry::as_value)
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// First top-level document whose type tag equals `tag`.
    pub fn find_document(&self, tag: &str) -> Option<NodeId> {
        self.documents()
            .into_iter()
            .find(|&doc| self.kind(doc).is_some_and(|k| k.type_tag() == tag))
    }

    /// The `DESCRIPTOR` header of a document, or the stem of the source file.
    pub fn descriptor(&self, document: NodeId) -> Option<String> {
        if let Some(v) = self.value(document, "DESCRIPTOR") {
            return Some(v.to_string());
        }
        self.filename
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned())
    }

    /// Computed `INDEX` / `SAMPLE_ID` of a row.
    ///
    /// Non-numeric stored values are returned verbatim. Numeric ones are
    /// replaced by the row position (`INDEX`), position + 1 (`SAMPLE_ID`
    /// stored as integer) or the position normalized to `0..=1` over the
    /// row count (`SAMPLE_ID` stored as float).
    fn sample_position_value(&self, id: NodeId, name: &str) -> Option<Value> {
        let node = self.nodes.get(id.0)?;
        let stored = node.slots.get(&Key::from(name))?.as_value()?.clone();
        let Some(position) = node.key.as_ref().and_then(Key::as_index) else {
            return Some(stored);
        };
        if !stored.is_numeric() {
            return Some(stored);
        }
        Some(match (name, stored) {
            ("INDEX", _) => Value::Int(position as i64),
            (_, Value::Int(_)) => Value::Int(position as i64 + 1),
            (_, _) => {
                let sets = node.parent.map_or(0, |data| self.len(data));
                if sets > 1 {
                    Value::Float(1.0 / (sets - 1) as f64 * position as f64)
                } else {
                    Value::Float(0.0)
                }
            }
        })
    }
}

/// Borrowed, read-only view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    cgats: &'a Cgats,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a Node {
        &self.cgats.nodes[self.id.0]
    }

    fn view(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef { cgats: self.cgats, id }
    }

    /// Handle of the node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn cgats(&self) -> &'a Cgats {
        self.cgats
    }

    /// Kind of the node.
    pub fn kind(&self) -> &'a NodeKind {
        &self.node().kind
    }

    /// Type tag (`ROOT`, `DATA`, `CTI3`, ...).
    pub fn type_tag(&self) -> &'a str {
        self.node().kind.type_tag()
    }

    /// Key under which the node is stored in its parent.
    pub fn key(&self) -> Option<&'a Key> {
        self.node().key.as_ref()
    }

    /// Parent node.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|p| self.view(p))
    }

    /// `Date:` line attached to a document.
    pub fn datetime(&self) -> Option<&'a str> {
        self.node().datetime.as_deref()
    }

    /// Widest fractional precision seen in a `DATA` node.
    pub fn vmaxlen(&self) -> usize {
        self.node().vmaxlen
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.node().slots.len()
    }

    /// Whether the node has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in order.
    pub fn keys(&self) -> Vec<Key> {
        self.node().slots.keys()
    }

    /// Slot under `key`, including computed keys.
    pub fn get(&self, key: impl Into<Key>) -> Option<Entry> {
        self.cgats.get(self.id, key)
    }

    /// Scalar under `key`, including computed keys.
    pub fn value(&self, key: impl Into<Key>) -> Option<Value> {
        self.cgats.value(self.id, key)
    }

    /// Child node under `key`.
    pub fn child(&self, key: impl Into<Key>) -> Option<NodeRef<'a>> {
        self.cgats.child(self.id, key).map(|id| self.view(id))
    }

    /// Child nodes in order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let cgats = self.cgats;
        self.node()
            .slots
            .entries()
            .filter_map(Entry::as_node)
            .map(move |id| NodeRef { cgats, id })
    }

    /// Column count of this document's `DATA_FORMAT`.
    pub fn number_of_fields(&self) -> usize {
        self.cgats.number_of_fields(self.id)
    }

    /// Row count of this document's `DATA`.
    pub fn number_of_sets(&self) -> usize {
        self.cgats.number_of_sets(self.id)
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", self.kind())
            .field("key", &self.key())
            .finish()
    }
}
