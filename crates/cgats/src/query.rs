//! Tree search by key/value predicates.
//!
//! A search starts at one node and checks the node itself and then its
//! child nodes in order. A child that matches is collected and not
//! searched further; a child that does not match is searched recursively.
//! Scalars are never descended into. Every node is collected at most once.
//!
//! ```rust
//! use cgats::{Cgats, Entry, Predicate, Value};
//!
//! let cgats = Cgats::parse("CTI1\nBEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R RGB_G\nEND_DATA_FORMAT\n\
//!                           BEGIN_DATA\n1 100 0\n2 0 100\nEND_DATA\n").unwrap();
//! let row = cgats
//!     .queryi1(Cgats::ROOT, [("RGB_R", Value::Float(0.0)), ("RGB_G", Value::Float(100.0))])
//!     .unwrap();
//! assert_eq!(cgats.value(row, "SAMPLE_ID"), Some(Value::Int(2)));
//! assert_eq!(cgats.queryv(Cgats::ROOT, Predicate::with_value(["RGB_G"], 100.0)), vec![Entry::Value(Value::Float(100.0))]);
//! ```

use crate::{Cgats, Entry, Key, NodeId, Value};

/// Conditions a node must meet: every key present, and equal to its value
/// where one is given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    terms: Vec<(Key, Option<Value>)>,
}

impl Predicate {
    /// Matches nodes that hold every key in `keys`, whatever the values.
    pub fn keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self {
            terms: keys.into_iter().map(|k| (k.into(), None)).collect(),
        }
    }

    /// Matches nodes whose every key in `keys` equals `value`.
    pub fn with_value<I, K>(keys: I, value: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let value = value.into();
        Self {
            terms: keys.into_iter().map(|k| (k.into(), Some(value.clone()))).collect(),
        }
    }

    /// Matches nodes holding each key with its paired value.
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        Self {
            terms: pairs.into_iter().map(|(k, v)| (k.into(), Some(v.into()))).collect(),
        }
    }

    /// Adds one more condition.
    pub fn and(mut self, key: impl Into<Key>, value: Option<Value>) -> Self {
        self.terms.push((key.into(), value));
        self
    }

    /// The conditions in order.
    pub fn terms(&self) -> &[(Key, Option<Value>)] {
        &self.terms
    }

    /// The key of a single-condition predicate.
    fn single_key(&self) -> Option<&Key> {
        match self.terms.as_slice() {
            [(key, _)] => Some(key),
            _ => None,
        }
    }
}

impl From<&str> for Predicate {
    fn from(key: &str) -> Self {
        Predicate::keys([key])
    }
}

impl From<Key> for Predicate {
    fn from(key: Key) -> Self {
        Predicate::keys([key])
    }
}

impl<const N: usize> From<[&str; N]> for Predicate {
    fn from(keys: [&str; N]) -> Self {
        Predicate::keys(keys)
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Predicate {
    fn from(pairs: [(&str, Value); N]) -> Self {
        Predicate::pairs(pairs)
    }
}

impl From<Vec<(String, Value)>> for Predicate {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        Predicate::pairs(pairs)
    }
}

impl Cgats {
    /// Whether `id` satisfies every term of `predicate`.
    pub fn matches(&self, id: NodeId, predicate: &Predicate) -> bool {
        predicate.terms.iter().all(|(key, expected)| {
            if !self.contains(id, key) {
                return false;
            }
            match expected {
                None => true,
                Some(expected) => matches!(self.get(id, key.clone()), Some(Entry::Value(v)) if v == *expected),
            }
        })
    }

    fn search(&self, id: NodeId, predicate: &Predicate, first: bool, found: &mut Vec<NodeId>) {
        if self.matches(id, predicate) {
            found.push(id);
            if first {
                return;
            }
        }
        self.search_children(id, predicate, first, found);
    }

    fn search_children(&self, id: NodeId, predicate: &Predicate, first: bool, found: &mut Vec<NodeId>) {
        for child in self.child_nodes(id) {
            if first && !found.is_empty() {
                return;
            }
            if self.matches(child, predicate) {
                if !found.contains(&child) {
                    found.push(child);
                }
            } else {
                self.search_children(child, predicate, first, found);
            }
        }
    }

    fn extract(&self, id: NodeId, predicate: &Predicate) -> Option<Entry> {
        match predicate.single_key() {
            Some(key) => self.get(id, key.clone()),
            None => Some(Entry::Node(id)),
        }
    }

    /// Every node under (and including) `id` that matches, in document order.
    pub fn queryi(&self, id: NodeId, predicate: impl Into<Predicate>) -> Vec<NodeId> {
        let predicate = predicate.into();
        tracing::trace!(terms = predicate.terms.len(), "cgats::queryi");
        let mut found = Vec::new();
        self.search(id, &predicate, false, &mut found);
        found
    }

    /// The first matching node.
    pub fn queryi1(&self, id: NodeId, predicate: impl Into<Predicate>) -> Option<NodeId> {
        let predicate = predicate.into();
        let mut found = Vec::new();
        self.search(id, &predicate, true, &mut found);
        found.into_iter().next()
    }

    /// Like [`Self::queryi`], but yields the matched value for a
    /// single-key predicate and the matched node otherwise.
    pub fn queryv(&self, id: NodeId, predicate: impl Into<Predicate>) -> Vec<Entry> {
        let predicate = predicate.into();
        let mut found = Vec::new();
        self.search(id, &predicate, false, &mut found);
        found
            .into_iter()
            .filter_map(|node| self.extract(node, &predicate))
            .collect()
    }

    /// The first result of [`Self::queryv`].
    pub fn queryv1(&self, id: NodeId, predicate: impl Into<Predicate>) -> Option<Entry> {
        let predicate = predicate.into();
        let node = self.queryi1(id, predicate.clone())?;
        self.extract(node, &predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;

    fn chart() -> Cgats {
        Cgats::parse(
            "CTI1\nDESCRIPTOR \"chart\"\nBEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R RGB_G RGB_B\nEND_DATA_FORMAT\n\
             BEGIN_DATA\n1 100.0 0.0 0.0\n2 0.0 100.0 0.0\n3 100.0 0.0 100.0\nEND_DATA\n\
             CAL\nDESCRIPTOR \"cal\"\nBEGIN_DATA_FORMAT\nRGB_I RGB_R\nEND_DATA_FORMAT\n\
             BEGIN_DATA\n0.0 0.0\n1.0 100.0\nEND_DATA\n",
        )
        .unwrap()
    }

    #[test]
    fn multi_key_returns_first_row() {
        let cgats = chart();
        let hit = cgats
            .queryv1(Cgats::ROOT, [("RGB_R", Value::Float(100.0)), ("RGB_G", Value::Float(0.0))])
            .unwrap();
        let row = hit.as_node().unwrap();
        assert_eq!(cgats.value(row, "SAMPLE_ID"), Some(Value::Int(1)));
    }

    #[test]
    fn single_key_returns_values() {
        let cgats = chart();
        let values = cgats.queryv(Cgats::ROOT, Predicate::with_value(["RGB_R"], 100));
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v == &Entry::Value(Value::Float(100.0))));
        assert_eq!(
            cgats.queryv1(Cgats::ROOT, "DESCRIPTOR"),
            Some(Entry::Value(Value::from("chart")))
        );
    }

    #[test]
    fn presence_only_and_computed_keys() {
        let cgats = chart();
        let docs = cgats.queryi(Cgats::ROOT, "NUMBER_OF_SETS");
        assert_eq!(docs, cgats.documents());
        let cal = cgats.queryi1(Cgats::ROOT, Predicate::pairs([("NUMBER_OF_FIELDS", 2)])).unwrap();
        assert_eq!(cgats.kind(cal), Some(&NodeKind::Document("CAL".into())));
        assert_eq!(cgats.queryi(Cgats::ROOT, ["RGB_I", "RGB_R"]).len(), 2);
    }

    #[test]
    fn matching_node_is_not_descended() {
        let cgats = chart();
        let doc = cgats.documents()[0];
        let hits = cgats.queryi(doc, "DESCRIPTOR");
        assert_eq!(hits, vec![doc]);
        assert!(cgats.queryi(Cgats::ROOT, Predicate::with_value(["RGB_B"], "x")).is_empty());
    }

    #[test]
    fn search_is_scoped_to_start_node() {
        let cgats = chart();
        let cal = cgats.find_document("CAL").unwrap();
        assert_eq!(cgats.queryi(cal, "RGB_R").len(), 2);
        assert_eq!(cgats.queryi(Cgats::ROOT, "RGB_R").len(), 5);
        assert_eq!(
            cgats.queryi1(Cgats::ROOT, Predicate::keys(["RGB_I"]).and("RGB_R", Some(Value::Int(100)))),
            cgats.child(cgats.child(cal, "DATA").unwrap(), 1usize)
        );
    }

    #[test]
    fn indexed_keys_match_positions() {
        let cgats = chart();
        let formats = cgats.queryi(Cgats::ROOT, Predicate::pairs([(0usize, "SAMPLE_ID")]));
        assert_eq!(formats.len(), 1);
        assert_eq!(cgats.kind(formats[0]), Some(&NodeKind::DataFormat));
    }
}
