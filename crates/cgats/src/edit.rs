//! Structural edits.
//!
//! Every edit validates its input before touching the tree, so a failed
//! call leaves the tree unchanged, and every successful one marks the tree
//! modified.

use crate::document::{NUMBER_OF_FIELDS, NUMBER_OF_SETS};
use crate::node::Slots;
use crate::value::{decimals, is_numeral};
use crate::{Cgats, CgatsError, CgatsResult, Entry, Key, NodeId, NodeKind, Value};
use std::cmp::Ordering;

/// Payload of [`Cgats::add_data`].
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// A bare string: a document type tag or a section line.
    Text(String),
    /// Positional values: a row or a list of names.
    List(Vec<Value>),
    /// Ordered key/value pairs: a row by column name or header entries.
    Map(Vec<(String, Value)>),
}

impl From<&str> for Data {
    fn from(v: &str) -> Self {
        Data::Text(v.to_string())
    }
}

impl From<String> for Data {
    fn from(v: String) -> Self {
        Data::Text(v)
    }
}

impl From<Vec<Value>> for Data {
    fn from(v: Vec<Value>) -> Self {
        Data::List(v)
    }
}

impl<const N: usize> From<[Value; N]> for Data {
    fn from(v: [Value; N]) -> Self {
        Data::List(v.into())
    }
}

impl From<Vec<(String, Value)>> for Data {
    fn from(v: Vec<(String, Value)>) -> Self {
        Data::Map(v)
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Data {
    fn from(v: [(&str, Value); N]) -> Self {
        Data::Map(v.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// Direction of [`Cgats::move_by_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Every index at or after `start` grows by one.
    Up,
    /// Every index at or after `start` shrinks by one.
    Down,
}

fn is_meta_key(key: &str) -> bool {
    key == NUMBER_OF_FIELDS || key == NUMBER_OF_SETS
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Coerces one row cell for `column`; returns the value and its precision.
fn coerce_cell(column: &str, value: Value) -> CgatsResult<(Value, usize)> {
    match column {
        "INDEX" | "SAMPLE_ID" => match value {
            Value::Str(s) if is_numeral(&s) => Ok((Value::coerce(&s), decimals(&s))),
            Value::Str(s) if is_identifier(&s) => Ok((Value::Str(s), 0)),
            Value::Str(s) => Err(CgatsError::wrong_type(column, "number or identifier", s)),
            number => {
                let precision = number.precision();
                Ok((number, precision))
            }
        },
        "SAMPLE_NAME" | "SAMPLE_LOC" => match value {
            Value::Str(s) => Ok((Value::Str(s), 0)),
            other => Ok((Value::Str(other.to_string()), 0)),
        },
        _ => match value {
            Value::Int(i) => Ok((Value::Float(i as f64), 0)),
            Value::Float(f) => {
                let precision = Value::Float(f).precision();
                Ok((Value::Float(f), precision))
            }
            Value::Str(s) => match s.trim().parse::<f64>() {
                Ok(f) => Ok((Value::Float(f), decimals(s.trim()))),
                Err(_) => Err(CgatsError::wrong_type(column, "float", s)),
            },
        },
    }
}

/// Orders row cells: numbers by magnitude, then strings.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.to_string().cmp(&b.to_string()),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Cgats {
    fn invalid_operation(&self, id: NodeId, operation: &'static str) -> CgatsError {
        CgatsError::InvalidOperation {
            kind: self.kind(id).map_or_else(|| "unknown".to_string(), ToString::to_string),
            operation,
        }
    }

    fn indexed_mut(&mut self, id: NodeId, operation: &'static str) -> CgatsResult<&mut Vec<Entry>> {
        if !self.raw(id)?.kind.is_indexed() {
            return Err(self.invalid_operation(id, operation));
        }
        match &mut self.raw_mut(id)?.slots {
            Slots::Indexed(v) => Ok(v),
            Slots::Named(_) => unreachable!("indexed kinds hold indexed slots"),
        }
    }

    fn rekey(&mut self, moved: Vec<(NodeId, usize)>) {
        for (child, index) in moved {
            if let Some(node) = self.nodes.get_mut(child.0) {
                node.key = Some(Key::Index(index));
            }
        }
    }

    fn detach(&mut self, entry: &Entry) {
        if let Entry::Node(child) = entry {
            if let Some(node) = self.nodes.get_mut(child.0) {
                node.parent = None;
            }
        }
    }

    /// Stores `entry` under `name`, detaching any node it replaces.
    fn set_named(&mut self, id: NodeId, name: &str, entry: Entry) -> CgatsResult<()> {
        let replaced = self.raw_mut(id)?.slots.set_named(name, entry);
        if let Some(old) = replaced {
            self.detach(&old);
        }
        Ok(())
    }

    /// Stores `entry` at `position` of an indexed node, shifting later slots up.
    fn insert_slot(&mut self, id: NodeId, position: usize, entry: Entry) -> CgatsResult<usize> {
        let len = self.len(id);
        let position = position.min(len);
        if position < len {
            self.move_by_one(id, position, Shift::Up)?;
            self.indexed_mut(id, "insert")?[position] = entry.clone();
        } else {
            self.indexed_mut(id, "insert")?.push(entry.clone());
        }
        if let Entry::Node(child) = entry {
            self.rekey(vec![(child, position)]);
        }
        Ok(position)
    }

    /// Reindexes every slot at or after `start` by one.
    ///
    /// Moving up duplicates slot `start` into `start + 1` (walking from the
    /// end so nothing is overwritten) and leaves `start` for the caller to
    /// fill. Moving down overwrites `start - 1` walking forward and leaves a
    /// duplicate in the last slot for the caller to drop; it stops as soon
    /// as a target index would be negative.
    pub fn move_by_one(&mut self, id: NodeId, start: usize, shift: Shift) -> CgatsResult<()> {
        let slots = self.indexed_mut(id, "move_by_one")?;
        let mut moved = Vec::new();
        match shift {
            Shift::Up => {
                if let Some(last) = slots.last().cloned() {
                    if start < slots.len() {
                        slots.push(last);
                        for i in (start + 1..slots.len() - 1).rev() {
                            slots[i] = slots[i - 1].clone();
                        }
                        for (i, entry) in slots.iter().enumerate().skip(start + 1) {
                            if let Entry::Node(child) = entry {
                                moved.push((*child, i));
                            }
                        }
                    }
                }
            }
            Shift::Down => {
                for i in start..slots.len() {
                    let Some(target) = i.checked_sub(1) else {
                        break;
                    };
                    slots[target] = slots[i].clone();
                    if let Entry::Node(child) = &slots[target] {
                        moved.push((*child, target));
                    }
                }
            }
        }
        self.rekey(moved);
        self.touch();
        Ok(())
    }

    /// Universal insertion primitive; behavior depends on the target kind.
    ///
    /// | Target | `data` | Effect |
    /// |--------|--------|--------|
    /// | `DATA` | list / map, one value per column | new `SAMPLE` row |
    /// | `ROOT` | text without newline | new empty document with that type tag |
    /// | `SECTION` | text without newline | new verbatim line |
    /// | `DATA_FORMAT`, `KEYWORDS` | list of names | new column / keyword names |
    /// | document | map (or list of keys) | header entries |
    ///
    /// With `key`, indexed targets insert at that position and shift the
    /// following slots up; otherwise the new slot is appended. Returns the
    /// node created, if any.
    pub fn add_data(&mut self, id: NodeId, data: impl Into<Data>, key: Option<usize>) -> CgatsResult<Option<NodeId>> {
        let data = data.into();
        let node = self.raw(id)?;
        let kind = node.kind.clone();
        let parent_is_root = node.parent == Some(Self::ROOT);
        match kind {
            NodeKind::Data => self.add_row(id, data, key).map(Some),
            NodeKind::Root => self.add_document(data, key).map(Some),
            NodeKind::Section => self.add_line(id, data, key).map(|_| None),
            NodeKind::DataFormat | NodeKind::Keywords => self.add_names(id, data, key).map(|_| None),
            NodeKind::Document(_) if parent_is_root => self.add_header(id, data).map(|_| None),
            _ => Err(self.invalid_operation(id, "add_data")),
        }
    }

    /// Inserts `item` at position `key` (see [`Self::add_data`]).
    pub fn insert(&mut self, id: NodeId, key: usize, item: impl Into<Data>) -> CgatsResult<Option<NodeId>> {
        self.add_data(id, item, Some(key))
    }

    /// Appends `item` (see [`Self::add_data`]).
    pub fn append(&mut self, id: NodeId, item: impl Into<Data>) -> CgatsResult<Option<NodeId>> {
        self.add_data(id, item, None)
    }

    fn add_row(&mut self, data_id: NodeId, data: Data, key: Option<usize>) -> CgatsResult<NodeId> {
        let df = self
            .data_format_of(data_id)
            .ok_or_else(|| CgatsError::key_not_found("DATA_FORMAT"))?;
        let columns = self.column_names(df);
        let values = match data {
            Data::List(values) => {
                if values.len() != columns.len() {
                    return Err(CgatsError::WrongArity {
                        expected: columns.len(),
                        given: values.len(),
                    });
                }
                values
            }
            Data::Map(pairs) => {
                if pairs.len() != columns.len() {
                    return Err(CgatsError::WrongArity {
                        expected: columns.len(),
                        given: pairs.len(),
                    });
                }
                columns
                    .iter()
                    .map(|column| {
                        pairs
                            .iter()
                            .find(|(k, _)| k == column)
                            .map(|(_, v)| v.clone())
                            .ok_or_else(|| CgatsError::key_not_found(column))
                    })
                    .collect::<CgatsResult<Vec<_>>>()?
            }
            Data::Text(text) => return Err(CgatsError::wrong_type("DATA", "mapping or list", text)),
        };

        let mut precision = 0;
        let mut cells = Vec::with_capacity(columns.len());
        for (column, value) in columns.iter().zip(values) {
            let (value, digits) = coerce_cell(column, value)?;
            precision = precision.max(digits);
            cells.push((column.clone(), Entry::Value(value)));
        }

        let position = key.unwrap_or(usize::MAX);
        let sample = self.alloc(NodeKind::Sample, None, Some(data_id));
        self.raw_mut(sample)?.slots = Slots::Named(cells);
        let node = self.raw_mut(data_id)?;
        node.vmaxlen = node.vmaxlen.max(precision);
        self.insert_slot(data_id, position, Entry::Node(sample))?;
        self.touch();
        Ok(sample)
    }

    fn add_document(&mut self, data: Data, key: Option<usize>) -> CgatsResult<NodeId> {
        let tag = match data {
            Data::Text(tag) => tag,
            other => return Err(CgatsError::wrong_type("ROOT", "document type tag", format!("{other:?}"))),
        };
        if tag.contains(['\n', '\r']) {
            return Err(CgatsError::wrong_type("ROOT", "single-line type tag", tag));
        }
        let doc = self.alloc(NodeKind::Document(tag), None, Some(Self::ROOT));
        self.insert_slot(Self::ROOT, key.unwrap_or(usize::MAX), Entry::Node(doc))?;
        self.touch();
        Ok(doc)
    }

    fn add_line(&mut self, id: NodeId, data: Data, key: Option<usize>) -> CgatsResult<()> {
        let line = match data {
            Data::Text(line) => line,
            other => return Err(CgatsError::wrong_type("SECTION", "text line", format!("{other:?}"))),
        };
        if line.contains(['\n', '\r']) {
            return Err(CgatsError::wrong_type("SECTION", "single line", line));
        }
        self.insert_slot(id, key.unwrap_or(usize::MAX), Entry::Value(Value::Str(line)))?;
        self.touch();
        Ok(())
    }

    fn add_names(&mut self, id: NodeId, data: Data, key: Option<usize>) -> CgatsResult<()> {
        let kind = self.raw(id)?.kind.to_string();
        let values = match data {
            Data::List(values) => values,
            other => return Err(CgatsError::wrong_type(kind, "list of names", format!("{other:?}"))),
        };
        let mut names = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Value::Str(name) if is_meta_key(&name) => continue,
                Value::Str(name) if !is_numeral(&name) && !name.is_empty() => names.push(name),
                other => return Err(CgatsError::wrong_type(kind, "name", other)),
            }
        }
        if self.kind(id) == Some(&NodeKind::DataFormat) && !names.is_empty() && self.sibling_rows(id) > 0 {
            return Err(self.invalid_operation(id, "add column while DATA has rows"));
        }
        let mut position = key.unwrap_or(usize::MAX);
        for name in names {
            position = self.insert_slot(id, position, Entry::Value(Value::Str(name)))? + 1;
        }
        self.touch();
        Ok(())
    }

    fn add_header(&mut self, id: NodeId, data: Data) -> CgatsResult<()> {
        let pairs = match data {
            Data::Map(pairs) => pairs,
            Data::List(names) => names
                .into_iter()
                .map(|name| match name {
                    Value::Str(s) if !s.is_empty() => Ok((s, Value::Str(String::new()))),
                    other => Err(CgatsError::wrong_type("header key", "name", other)),
                })
                .collect::<CgatsResult<Vec<_>>>()?,
            Data::Text(text) => return Err(CgatsError::wrong_type("header", "mapping or list", text)),
        };
        for (key, value) in pairs {
            if is_meta_key(&key) {
                tracing::trace!(key = %key, "ignoring computed header key");
                continue;
            }
            if key == "KEYWORD" {
                self.add_keyword(id, &value.to_string(), None)?;
                continue;
            }
            let value = match value {
                Value::Str(s) => Value::coerce(&s),
                other => other,
            };
            self.set_named(id, &key, Entry::Value(value))?;
        }
        self.touch();
        Ok(())
    }

    /// Creates a structural child of a document: `DATA_FORMAT`, `DATA`,
    /// `KEYWORDS`, or a generic `SECTION` for any other name.
    pub fn add_section(&mut self, document: NodeId, name: &str) -> CgatsResult<NodeId> {
        if !matches!(self.raw(document)?.kind, NodeKind::Document(_)) {
            return Err(self.invalid_operation(document, "add_section"));
        }
        if self.entry(document, &Key::from(name)).is_some() {
            return Err(self.invalid_operation(document, "add_section over an existing key"));
        }
        let kind = match name {
            "DATA_FORMAT" => NodeKind::DataFormat,
            "DATA" => NodeKind::Data,
            "KEYWORDS" => NodeKind::Keywords,
            _ => NodeKind::Section,
        };
        let child = self.alloc(kind, Some(Key::from(name)), Some(document));
        self.set_named(document, name, Entry::Node(child))?;
        self.touch();
        Ok(child)
    }

    /// Rows of the `DATA` next to a `DATA_FORMAT` node.
    fn sibling_rows(&self, data_format: NodeId) -> usize {
        self.parent(data_format)
            .and_then(|doc| self.child(doc, "DATA"))
            .map_or(0, |data| self.len(data))
    }

    /// Removes the slot under `key` and returns what it held.
    ///
    /// Indexed nodes close the gap so keys stay `0..N`. A removed node is
    /// detached but stays readable through its handle (see [`Self::compact`]).
    /// Columns, or a whole `DATA_FORMAT`, cannot be removed while `DATA`
    /// has rows.
    pub fn remove(&mut self, id: NodeId, key: impl Into<Key>) -> CgatsResult<Entry> {
        let key = key.into();
        let entry = self
            .entry(id, &key)
            .cloned()
            .ok_or_else(|| CgatsError::key_not_found(&key))?;
        let columns = match self.kind(id) {
            Some(NodeKind::DataFormat) => Some(id),
            _ => entry.as_node().filter(|&n| self.kind(n) == Some(&NodeKind::DataFormat)),
        };
        if columns.is_some_and(|df| self.sibling_rows(df) > 0) {
            return Err(self.invalid_operation(id, "remove column while DATA has rows"));
        }
        match &key {
            Key::Index(index) => {
                let last = self.len(id) - 1;
                if *index != last {
                    self.move_by_one(id, index + 1, Shift::Down)?;
                }
                self.indexed_mut(id, "remove")?.pop();
            }
            Key::Name(name) => {
                let node = self.raw_mut(id)?;
                if let (Some(pos), Slots::Named(v)) = (node.slots.position(name), &mut node.slots) {
                    v.remove(pos);
                }
            }
        }
        self.detach(&entry);
        if let Entry::Node(child) = entry {
            self.raw_mut(child)?.key = None;
        }
        self.touch();
        Ok(entry)
    }

    /// Alias of [`Self::remove`].
    pub fn pop(&mut self, id: NodeId, key: impl Into<Key>) -> CgatsResult<Entry> {
        self.remove(id, key)
    }

    /// Removes a node from its parent.
    pub fn remove_node(&mut self, node: NodeId) -> CgatsResult<Entry> {
        let raw = self.raw(node)?;
        match (raw.parent, raw.key.clone()) {
            (Some(parent), Some(key)) => self.remove(parent, key),
            _ => Err(self.invalid_operation(node, "remove_node")),
        }
    }

    /// Document that holds the header keys for an edit made on `id`.
    fn keyword_context(&self, id: NodeId, operation: &'static str) -> CgatsResult<NodeId> {
        let context = match self.raw(id)?.kind {
            NodeKind::Document(_) => Some(id),
            NodeKind::Data | NodeKind::DataFormat | NodeKind::Keywords | NodeKind::Section => self.parent(id),
            NodeKind::Sample => self.parent(id).and_then(|data| self.parent(data)),
            NodeKind::Root => None,
        };
        match context {
            Some(doc) if matches!(self.kind(doc), Some(NodeKind::Document(_))) => Ok(doc),
            _ => Err(self.invalid_operation(id, operation)),
        }
    }

    /// Declares `keyword` on the document owning `id`, optionally setting its value.
    ///
    /// Creates the document's `KEYWORDS` node on first use. The name
    /// `KEYWORD` itself is reserved and only logged.
    pub fn add_keyword(&mut self, id: NodeId, keyword: &str, value: Option<Value>) -> CgatsResult<()> {
        if keyword == "KEYWORD" {
            tracing::warn!("refusing to register reserved keyword KEYWORD");
            return Ok(());
        }
        let doc = self.keyword_context(id, "add_keyword")?;
        let keywords = match self.child(doc, "KEYWORDS") {
            Some(k) => k,
            None => self.add_section(doc, "KEYWORDS")?,
        };
        if !self.column_names(keywords).iter().any(|k| k == keyword) {
            self.indexed_mut(keywords, "add_keyword")?
                .push(Entry::Value(Value::Str(keyword.to_string())));
        }
        if let Some(value) = value {
            self.set_named(doc, keyword, Entry::Value(value))?;
        }
        self.touch();
        Ok(())
    }

    /// Drops every declaration of `keyword`, and its value when `remove_value`.
    pub fn remove_keyword(&mut self, id: NodeId, keyword: &str, remove_value: bool) -> CgatsResult<()> {
        let doc = self.keyword_context(id, "remove_keyword")?;
        if let Some(keywords) = self.child(doc, "KEYWORDS") {
            let positions: Vec<usize> = self
                .column_names(keywords)
                .iter()
                .enumerate()
                .filter(|(_, k)| *k == keyword)
                .map(|(i, _)| i)
                .collect();
            for position in positions.into_iter().rev() {
                self.remove(keywords, position)?;
            }
        }
        if remove_value && self.entry(doc, &Key::from(keyword)).is_some() {
            self.remove(doc, keyword)?;
        }
        Ok(())
    }

    /// Assigns a single slot.
    ///
    /// Documents take header values (coerced like parsed ones), samples take
    /// a value for one of their columns (coerced per column), sections and
    /// keywords replace an existing line or name by position.
    pub fn set_value(&mut self, id: NodeId, key: impl Into<Key>, value: impl Into<Value>) -> CgatsResult<()> {
        let key = key.into();
        let value = value.into();
        let kind = self.raw(id)?.kind.clone();
        match (&kind, &key) {
            (NodeKind::Document(_), Key::Name(name)) => {
                if is_meta_key(name) {
                    return Err(self.invalid_operation(id, "set_value on a computed key"));
                }
                let value = match value {
                    Value::Str(s) => Value::coerce(&s),
                    other => other,
                };
                self.set_named(id, name, Entry::Value(value))?;
            }
            (NodeKind::Sample, Key::Name(name)) => {
                if self.entry(id, &key).is_none() {
                    return Err(CgatsError::key_not_found(name));
                }
                let (value, digits) = coerce_cell(name, value)?;
                self.set_named(id, name, Entry::Value(value))?;
                if let Some(data) = self.parent(id) {
                    let node = self.raw_mut(data)?;
                    node.vmaxlen = node.vmaxlen.max(digits);
                }
            }
            (NodeKind::Section | NodeKind::Keywords, Key::Index(index)) => {
                let index = *index;
                let is_keywords = kind == NodeKind::Keywords;
                let text = value.to_string();
                if text.contains(['\n', '\r']) || (is_keywords && (text.is_empty() || is_numeral(&text))) {
                    return Err(CgatsError::wrong_type(key.to_string(), "name or line", text));
                }
                let slots = self.indexed_mut(id, "set_value")?;
                let slot = slots.get_mut(index).ok_or_else(|| CgatsError::key_not_found(index))?;
                *slot = Entry::Value(Value::Str(text));
            }
            _ => return Err(self.invalid_operation(id, "set_value")),
        }
        self.touch();
        Ok(())
    }

    /// Sets or clears the `Date:` line of a node.
    pub fn set_datetime(&mut self, id: NodeId, datetime: Option<String>) -> CgatsResult<()> {
        self.raw_mut(id)?.datetime = datetime;
        self.touch();
        Ok(())
    }

    /// Stable-sorts the rows of a `DATA` node (or a document's `DATA`) by `columns`.
    pub fn sort_by(&mut self, id: NodeId, columns: &[&str]) -> CgatsResult<()> {
        let data = match self.raw(id)?.kind {
            NodeKind::Data => id,
            NodeKind::Document(_) => self.child(id, "DATA").ok_or_else(|| CgatsError::key_not_found("DATA"))?,
            _ => return Err(self.invalid_operation(id, "sort_by")),
        };
        let known = self.data_format_of(data).map(|df| self.column_names(df)).unwrap_or_default();
        if let Some(missing) = columns.iter().find(|c| !known.iter().any(|k| k == *c)) {
            return Err(CgatsError::key_not_found(missing));
        }
        let mut rows: Vec<NodeId> = self.child_nodes(data);
        rows.sort_by(|&a, &b| {
            columns
                .iter()
                .map(|c| {
                    let key = Key::from(*c);
                    compare_cells(
                        self.entry(a, &key).and_then(Entry::as_value),
                        self.entry(b, &key).and_then(Entry::as_value),
                    )
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        let moved: Vec<(NodeId, usize)> = rows.iter().enumerate().map(|(i, &row)| (row, i)).collect();
        *self.indexed_mut(data, "sort_by")? = rows.into_iter().map(Entry::Node).collect();
        self.rekey(moved);
        self.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = "CTI1\n\
        BEGIN_DATA_FORMAT\n\
        SAMPLE_ID RGB_R RGB_G RGB_B\n\
        END_DATA_FORMAT\n\
        NUMBER_OF_SETS 2\n\
        BEGIN_DATA\n\
        1 100.0 0.0 0.0\n\
        2 0.0 100.0 0.0\n\
        END_DATA\n";

    fn chart() -> (Cgats, NodeId, NodeId) {
        let cgats = Cgats::parse(CHART).expect("parse failed");
        let doc = cgats.documents()[0];
        let data = cgats.child(doc, "DATA").unwrap();
        (cgats, doc, data)
    }

    fn blue() -> Data {
        Data::from([
            ("SAMPLE_ID", Value::Int(3)),
            ("RGB_R", Value::Float(0.0)),
            ("RGB_G", Value::Float(0.0)),
            ("RGB_B", Value::Float(100.0)),
        ])
    }

    fn assert_contiguous(cgats: &Cgats, id: NodeId) {
        for (i, child) in cgats.child_nodes(id).into_iter().enumerate() {
            assert_eq!(cgats.node(child).unwrap().key(), Some(&Key::Index(i)));
            assert_eq!(cgats.parent(child), Some(id));
        }
    }

    #[test]
    fn append_row_by_name() {
        let (mut cgats, doc, data) = chart();
        let row = cgats.append(data, blue()).unwrap().unwrap();
        assert!(cgats.modified());
        assert_eq!(cgats.number_of_sets(doc), 3);
        assert_eq!(cgats.node(row).unwrap().key(), Some(&Key::Index(2)));
        assert_eq!(cgats.value(row, "RGB_B"), Some(Value::Float(100.0)));
    }

    #[test]
    fn wrong_arity_leaves_tree_untouched() {
        let (mut cgats, doc, data) = chart();
        let err = cgats
            .insert(data, 0, [Value::Int(3), Value::Float(1.0)])
            .unwrap_err();
        assert!(matches!(err, CgatsError::WrongArity { expected: 4, given: 2 }));
        assert_eq!(cgats.number_of_sets(doc), 2);
        assert!(!cgats.modified());
    }

    #[test]
    fn wrong_type_in_float_column() {
        let (mut cgats, _, data) = chart();
        let err = cgats
            .append(data, [Value::Int(3), Value::from("red"), Value::Int(0), Value::Int(0)])
            .unwrap_err();
        assert!(matches!(err, CgatsError::WrongType { ref key, .. } if key == "RGB_R"));
    }

    #[test]
    fn missing_column_in_map() {
        let (mut cgats, _, data) = chart();
        let err = cgats
            .append(
                data,
                [
                    ("SAMPLE_ID", Value::Int(3)),
                    ("RGB_R", Value::Int(0)),
                    ("RGB_G", Value::Int(0)),
                    ("XYZ_X", Value::Int(0)),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, CgatsError::KeyNotFound { ref key } if key == "RGB_B"));
    }

    #[test]
    fn insert_at_zero_shifts_rows() {
        let (mut cgats, _, data) = chart();
        let first = cgats.child(data, 0usize).unwrap();
        let row = cgats.insert(data, 0, blue()).unwrap().unwrap();
        assert_eq!(cgats.child(data, 0usize), Some(row));
        assert_eq!(cgats.child(data, 1usize), Some(first));
        assert_eq!(cgats.len(data), 3);
        assert_contiguous(&cgats, data);
    }

    #[test]
    fn remove_first_row_reindexes() {
        let (mut cgats, doc, data) = chart();
        cgats.append(data, blue()).unwrap();
        let second = cgats.child(data, 1usize).unwrap();
        let removed = cgats.remove(data, 0usize).unwrap();
        let removed = removed.as_node().unwrap();
        assert_eq!(cgats.parent(removed), None);
        assert_eq!(cgats.number_of_sets(doc), 2);
        assert_eq!(cgats.child(data, 0usize), Some(second));
        assert_eq!(cgats.value(second, "RGB_G"), Some(Value::Float(100.0)));
        assert_contiguous(&cgats, data);
    }

    #[test]
    fn remove_last_remaining_row() {
        let (mut cgats, doc, data) = chart();
        cgats.pop(data, 1usize).unwrap();
        let row = cgats.child(data, 0usize).unwrap();
        cgats.remove_node(row).unwrap();
        assert_eq!(cgats.number_of_sets(doc), 0);
        assert!(cgats.child(doc, "DATA").is_some());
        assert!(matches!(cgats.remove(data, 0usize), Err(CgatsError::KeyNotFound { .. })));
    }

    #[test]
    fn move_by_one_up_and_down() {
        let mut cgats = Cgats::new();
        let doc = cgats.append(Cgats::ROOT, "CTI1").unwrap().unwrap();
        let section = cgats.add_section(doc, "COMMENTS").unwrap();
        for line in ["a", "b", "c"] {
            cgats.append(section, line).unwrap();
        }
        cgats.move_by_one(section, 1, Shift::Up).unwrap();
        let lines: Vec<String> = cgats.column_names(section);
        assert_eq!(lines, vec!["a", "b", "b", "c"]);
        cgats.move_by_one(section, 2, Shift::Down).unwrap();
        assert_eq!(cgats.column_names(section), vec!["a", "b", "c", "c"]);
        cgats.move_by_one(section, 0, Shift::Down).unwrap();
        assert_eq!(cgats.column_names(section), vec!["a", "b", "c", "c"]);
    }

    #[test]
    fn sample_rejects_add_data() {
        let (mut cgats, _, data) = chart();
        let row = cgats.child(data, 0usize).unwrap();
        let err = cgats.append(row, blue()).unwrap_err();
        assert!(matches!(err, CgatsError::InvalidOperation { .. }));
    }

    #[test]
    fn root_takes_type_tags_only() {
        let mut cgats = Cgats::new();
        let first = cgats.append(Cgats::ROOT, "CTI3").unwrap().unwrap();
        let cal = cgats.insert(Cgats::ROOT, 0, "CAL").unwrap().unwrap();
        assert_eq!(cgats.documents(), vec![cal, first]);
        assert!(cgats.append(Cgats::ROOT, "A\nB").is_err());
        assert!(cgats.append(Cgats::ROOT, [Value::Int(1)]).is_err());
    }

    #[test]
    fn header_entries_are_coerced_and_meta_keys_ignored() {
        let (mut cgats, doc, _) = chart();
        cgats
            .append(
                doc,
                [
                    ("ORIGINATOR", Value::from("Argyll")),
                    ("WHITE_LEVEL", Value::from("120.5")),
                    ("NUMBER_OF_FIELDS", Value::from("12")),
                ],
            )
            .unwrap();
        assert_eq!(cgats.value(doc, "WHITE_LEVEL"), Some(Value::Float(120.5)));
        assert_eq!(cgats.value(doc, "NUMBER_OF_FIELDS"), Some(Value::Int(4)));
        assert!(cgats.entry(doc, &Key::from("NUMBER_OF_FIELDS")).is_none());
    }

    #[test]
    fn data_format_rejects_numbers_and_late_columns() {
        let (mut cgats, doc, _) = chart();
        let df = cgats.child(doc, "DATA_FORMAT").unwrap();
        assert!(matches!(
            cgats.append(df, [Value::from("1.5")]),
            Err(CgatsError::WrongType { .. })
        ));
        assert!(matches!(
            cgats.append(df, [Value::from("XYZ_X")]),
            Err(CgatsError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn columns_stay_while_rows_exist() {
        let (mut cgats, doc, data) = chart();
        let df = cgats.child(doc, "DATA_FORMAT").unwrap();
        let before = cgats.to_string();
        assert!(matches!(cgats.remove(df, 1usize), Err(CgatsError::InvalidOperation { .. })));
        assert!(matches!(cgats.remove(doc, "DATA_FORMAT"), Err(CgatsError::InvalidOperation { .. })));
        assert!(matches!(cgats.remove_node(df), Err(CgatsError::InvalidOperation { .. })));
        assert_eq!(cgats.column_names(df), vec!["SAMPLE_ID", "RGB_R", "RGB_G", "RGB_B"]);
        assert_eq!(cgats.keys(cgats.child(data, 0usize).unwrap()).len(), 4);
        assert_eq!(cgats.to_string(), before);
        assert!(!cgats.modified());

        cgats.remove(data, 1usize).unwrap();
        cgats.remove(data, 0usize).unwrap();
        cgats.remove(df, 1usize).unwrap();
        assert_eq!(cgats.column_names(df), vec!["SAMPLE_ID", "RGB_G", "RGB_B"]);
    }

    #[test]
    fn keyword_round_trip() {
        let (mut cgats, doc, data) = chart();
        let row = cgats.child(data, 0usize).unwrap();
        cgats
            .add_keyword(row, "ACCURATE_EXPECTED_VALUES", Some(Value::from("true")))
            .unwrap();
        cgats.add_keyword(doc, "ACCURATE_EXPECTED_VALUES", None).unwrap();
        let keywords = cgats.child(doc, "KEYWORDS").unwrap();
        assert_eq!(cgats.column_names(keywords), vec!["ACCURATE_EXPECTED_VALUES"]);
        assert_eq!(cgats.value(doc, "ACCURATE_EXPECTED_VALUES"), Some(Value::from("true")));

        cgats.remove_keyword(data, "ACCURATE_EXPECTED_VALUES", true).unwrap();
        assert!(cgats.column_names(keywords).is_empty());
        assert!(cgats.value(doc, "ACCURATE_EXPECTED_VALUES").is_none());
    }

    #[test]
    fn reserved_keyword_is_ignored() {
        let (mut cgats, doc, _) = chart();
        cgats.add_keyword(doc, "KEYWORD", None).unwrap();
        assert!(cgats.child(doc, "KEYWORDS").is_none());
        assert!(cgats.add_keyword(Cgats::ROOT, "X", None).is_err());
    }

    #[test]
    fn set_value_on_sample_is_coerced() {
        let (mut cgats, _, data) = chart();
        let row = cgats.child(data, 1usize).unwrap();
        cgats.set_value(row, "RGB_B", "12.125").unwrap();
        assert_eq!(cgats.value(row, "RGB_B"), Some(Value::Float(12.125)));
        assert_eq!(cgats.node(data).unwrap().vmaxlen(), 3);
        assert!(cgats.set_value(row, "XYZ_X", 1.0).is_err());
        assert!(cgats.set_value(row, "RGB_B", "blue").is_err());
    }

    #[test]
    fn sort_rows_by_column() {
        let (mut cgats, _, data) = chart();
        cgats.append(data, blue()).unwrap();
        cgats.sort_by(data, &["RGB_R", "RGB_G"]).unwrap();
        let rows = cgats.child_nodes(data);
        assert_eq!(cgats.value(rows[0], "RGB_B"), Some(Value::Float(100.0)));
        assert_eq!(cgats.value(rows[2], "RGB_R"), Some(Value::Float(100.0)));
        assert_contiguous(&cgats, data);
        assert!(cgats.sort_by(data, &["XYZ_Y"]).is_err());
    }
}
