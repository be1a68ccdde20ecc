//! CGATS text output.
//!
//! Output is built as a list of lines and joined at the end, which keeps
//! the blank-line rules local: a blank line goes before a nested section,
//! before the data block and between concatenated documents, unless the
//! previous line is already blank.
//!
//! Row values are written in `DATA_FORMAT` column order with every float
//! of a `DATA` block padded to the widest precision read into it.

use crate::document::{NUMBER_OF_FIELDS, NUMBER_OF_SETS};
use crate::format::{format_scalar, rpad};
use crate::{Cgats, CgatsResult, Entry, Key, NodeId, NodeKind, NodeRef};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tag line written for an untitled document that follows another one,
/// so that it reads back as a document of its own.
const UNTITLED_TAG: &str = "CGATS";

/// Pushes a blank separator unless the output is empty or already ends in one.
fn separate(lines: &mut Vec<String>) {
    if lines.last().is_some_and(|l| !l.is_empty()) {
        lines.push(String::new());
    }
}

impl Cgats {
    /// CGATS text of one node and everything below it.
    pub fn to_cgats_string(&self, id: NodeId) -> String {
        let mut lines = Vec::new();
        self.emit(id, &mut lines);
        lines.join("\n")
    }

    /// Writes the whole tree to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> CgatsResult<()> {
        let text = self.to_cgats_string(Self::ROOT);
        writer.write_all(text.as_bytes())?;
        if !text.is_empty() {
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Writes the whole tree to `path`.
    ///
    /// On success the tree remembers `path` and its new modification time,
    /// and is no longer marked modified.
    pub fn write<P: AsRef<Path>>(&mut self, path: P) -> CgatsResult<()> {
        let path = path.as_ref();
        tracing::trace!(path = %path.display(), "cgats::write");
        {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            self.write_to(&mut writer)?;
            writer.flush()?;
        }
        self.filename = Some(path.to_path_buf());
        self.mtime = fs::metadata(path)?.modified().ok();
        self.set_modified(false);
        Ok(())
    }

    fn emit(&self, id: NodeId, lines: &mut Vec<String>) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        match kind {
            NodeKind::Root => {
                if let Some(datetime) = self.node(id).and_then(|n| n.datetime()) {
                    lines.push(datetime.to_string());
                }
                for (i, doc) in self.child_nodes(id).into_iter().enumerate() {
                    separate(lines);
                    match self.kind(doc) {
                        Some(NodeKind::Document(tag)) if tag.is_empty() && i > 0 => {
                            self.emit_document(doc, UNTITLED_TAG, lines)
                        }
                        _ => self.emit(doc, lines),
                    }
                }
            }
            NodeKind::Document(tag) => self.emit_document(id, tag, lines),
            NodeKind::Section => self.emit_section(id, lines),
            NodeKind::DataFormat => lines.push(self.column_names(id).join(" ")),
            NodeKind::Data => {
                let digits = self.node(id).map_or(0, |n| n.vmaxlen());
                for row in self.child_nodes(id) {
                    lines.push(self.row_line(row, digits));
                }
            }
            NodeKind::Sample => {
                let digits = self.parent(id).and_then(|d| self.node(d)).map_or(0, |n| n.vmaxlen());
                lines.push(self.row_line(id, digits));
            }
            NodeKind::Keywords => {
                for name in self.column_names(id) {
                    lines.push(keyword_line(&name));
                }
            }
        }
    }

    fn emit_document(&self, id: NodeId, tag: &str, lines: &mut Vec<String>) {
        if !tag.is_empty() {
            lines.push(format!("{tag:<7}"));
            lines.push(String::new());
        }
        if let Some(datetime) = self.node(id).and_then(|n| n.datetime()) {
            lines.push(datetime.to_string());
        }

        let keywords = self
            .child(id, "KEYWORDS")
            .map(|k| self.column_names(k))
            .unwrap_or_default();
        let mut declared = Vec::new();

        for key in self.keys(id) {
            let Key::Name(name) = &key else {
                continue;
            };
            match self.entry(id, &key) {
                Some(Entry::Value(value)) => {
                    if keywords.contains(name) && !declared.contains(name) {
                        lines.push(keyword_line(name));
                        declared.push(name.clone());
                    }
                    lines.push(format!("{name} {}", format_scalar(value)));
                }
                Some(Entry::Node(child)) => {
                    if matches!(self.kind(*child), Some(NodeKind::Section)) {
                        separate(lines);
                        self.emit_section(*child, lines);
                    }
                }
                None => {}
            }
        }

        let data_format = self.child(id, "DATA_FORMAT");
        let data = self.child(id, "DATA");
        let pending: Vec<&String> = keywords.iter().filter(|k| !declared.contains(*k)).collect();
        if data_format.is_none() && data.is_none() {
            if !pending.is_empty() {
                separate(lines);
                lines.extend(pending.into_iter().map(|k| keyword_line(k)));
            }
            return;
        }

        separate(lines);
        lines.extend(pending.into_iter().map(|k| keyword_line(k)));
        if let Some(df) = data_format {
            lines.push(format!("{NUMBER_OF_FIELDS} {}", self.len(df)));
            lines.push("BEGIN_DATA_FORMAT".to_string());
            lines.push(self.column_names(df).join(" "));
            lines.push("END_DATA_FORMAT".to_string());
        }
        if let Some(data) = data {
            if data_format.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("{NUMBER_OF_SETS} {}", self.len(data)));
            lines.push("BEGIN_DATA".to_string());
            self.emit(data, lines);
            lines.push("END_DATA".to_string());
        }
    }

    fn emit_section(&self, id: NodeId, lines: &mut Vec<String>) {
        let name = self
            .node(id)
            .and_then(|n| n.key().and_then(Key::as_name))
            .unwrap_or("SECTION");
        lines.push(format!("BEGIN_{name}"));
        lines.extend(self.column_names(id));
        lines.push(format!("END_{name}"));
    }

    /// One row, values in `DATA_FORMAT` column order.
    fn row_line(&self, row: NodeId, digits: usize) -> String {
        let columns = self.data_format_of(row).map(|df| self.column_names(df)).unwrap_or_default();
        columns
            .iter()
            .filter_map(|column| self.entry(row, &Key::from(column.as_str())))
            .filter_map(Entry::as_value)
            .map(|value| rpad(value, digits))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn keyword_line(name: &str) -> String {
    format!("KEYWORD \"{name}\"")
}

impl fmt::Display for Cgats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cgats_string(Self::ROOT))
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cgats().to_cgats_string(self.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    const CHART: &str = "CTI1\n\
        BEGIN_DATA_FORMAT\n\
        SAMPLE_ID RGB_R RGB_G RGB_B\n\
        END_DATA_FORMAT\n\
        NUMBER_OF_SETS 2\n\
        BEGIN_DATA\n\
        1 100.0 0.0 0.0\n\
        2 0.0 100.0 0.0\n\
        END_DATA\n";

    #[test]
    fn canonical_chart() {
        let cgats = Cgats::parse(CHART).unwrap();
        let expected = "CTI1   \n\
                        \n\
                        NUMBER_OF_FIELDS 4\n\
                        BEGIN_DATA_FORMAT\n\
                        SAMPLE_ID RGB_R RGB_G RGB_B\n\
                        END_DATA_FORMAT\n\
                        \n\
                        NUMBER_OF_SETS 2\n\
                        BEGIN_DATA\n\
                        1 100.0 0.0 0.0\n\
                        2 0.0 100.0 0.0\n\
                        END_DATA";
        assert_eq!(cgats.to_string(), expected);
    }

    #[test]
    fn appended_row_is_written() {
        let mut cgats = Cgats::parse(CHART).unwrap();
        let data = cgats.child(cgats.documents()[0], "DATA").unwrap();
        cgats
            .append(
                data,
                [
                    ("SAMPLE_ID", Value::Int(3)),
                    ("RGB_R", Value::Float(0.0)),
                    ("RGB_G", Value::Float(0.0)),
                    ("RGB_B", Value::Float(100.0)),
                ],
            )
            .unwrap();
        let text = cgats.to_string();
        assert!(text.contains("NUMBER_OF_SETS 3\nBEGIN_DATA\n"));
        assert!(text.contains("3 0.0 0.0 100.0\nEND_DATA"));
    }

    #[test]
    fn keyword_declarations_precede_values() {
        let mut cgats = Cgats::parse(CHART).unwrap();
        let doc = cgats.documents()[0];
        cgats
            .add_keyword(doc, "ACCURATE_EXPECTED_VALUES", Some(Value::from("true")))
            .unwrap();
        let text = cgats.to_string();
        assert!(text.contains("KEYWORD \"ACCURATE_EXPECTED_VALUES\"\nACCURATE_EXPECTED_VALUES \"true\"\n"));
    }

    #[test]
    fn valueless_keywords_are_declared_before_data() {
        let mut cgats = Cgats::parse(CHART).unwrap();
        let doc = cgats.documents()[0];
        cgats.add_keyword(doc, "SAMPLE_NORM", None).unwrap();
        let text = cgats.to_string();
        assert!(text.contains("KEYWORD \"SAMPLE_NORM\"\nNUMBER_OF_FIELDS 4\n"));
    }

    #[test]
    fn rows_follow_column_order_and_precision() {
        let mut cgats = Cgats::parse(CHART).unwrap();
        let data = cgats.child(cgats.documents()[0], "DATA").unwrap();
        cgats
            .append(
                data,
                [
                    ("RGB_B", Value::from("12.125")),
                    ("RGB_G", Value::Int(5)),
                    ("RGB_R", Value::Float(0.5)),
                    ("SAMPLE_ID", Value::Int(3)),
                ],
            )
            .unwrap();
        let row = cgats.child(data, 2usize).unwrap();
        assert_eq!(cgats.node(row).unwrap().to_string(), "3 0.500 5.000 12.125");
        let first = cgats.child(data, 0usize).unwrap();
        assert_eq!(cgats.to_cgats_string(first), "1 100.000 0.000 0.000");
    }

    #[test]
    fn sections_dates_and_strings() {
        let text = "CTI3\nDate: 2013/01/09\nDESCRIPTOR \"Test # chart\"\nWHITE_LEVEL 120\n\
                    BEGIN_NOTES\nfirst\nsecond\nEND_NOTES\n\
                    BEGIN_DATA_FORMAT\nSAMPLE_ID SAMPLE_NAME XYZ_Y\nEND_DATA_FORMAT\n\
                    BEGIN_DATA\nA1 \"Patch 1\" 0.25\nEND_DATA\n";
        let cgats = Cgats::parse(text).unwrap();
        let out = cgats.to_string();
        assert!(out.starts_with("CTI3   \n\nDate: 2013/01/09\nDESCRIPTOR \"Test # chart\"\nWHITE_LEVEL 120\n\n"));
        assert!(out.contains("\nBEGIN_NOTES\nfirst\nsecond\nEND_NOTES\n\nNUMBER_OF_FIELDS 3\n"));
        assert!(out.contains("\n\"A1\" \"Patch 1\" 0.25\n"));
    }

    #[test]
    fn second_round_trip_is_a_fixed_point() {
        let text = "CTI3\nKEYWORD \"DEVICE_CLASS\"\nDEVICE_CLASS \"DISPLAY\"\n\
                    BEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R XYZ_X\nEND_DATA_FORMAT\n\
                    BEGIN_DATA\n1 0.5 95.046\n2 1 0.1\nEND_DATA\n\
                    CAL\nBEGIN_DATA_FORMAT\nRGB_I RGB_R\nEND_DATA_FORMAT\n\
                    BEGIN_DATA\n0.0 0.0\n1.0 1.0\nEND_DATA\n";
        let once = Cgats::parse(text).unwrap().to_string();
        let twice = Cgats::parse(&once).unwrap().to_string();
        assert_eq!(once, twice);
        assert!(once.contains("END_DATA\n\nCAL    \n\n"));
    }

    #[test]
    fn single_nodes_render_alone() {
        let cgats = Cgats::parse(CHART).unwrap();
        let doc = cgats.root().child(0usize).unwrap();
        assert_eq!(doc.child("DATA_FORMAT").unwrap().to_string(), "SAMPLE_ID RGB_R RGB_G RGB_B");
        assert_eq!(doc.child("DATA").unwrap().to_string(), "1 100.0 0.0 0.0\n2 0.0 100.0 0.0");
    }

    #[test]
    fn write_clears_modified_and_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ti1");
        let mut cgats = Cgats::parse(CHART).unwrap();
        cgats.set_value(cgats.documents()[0], "ORIGINATOR", "test").unwrap();
        assert!(cgats.modified());

        cgats.write(&path).unwrap();
        assert!(!cgats.modified());
        assert_eq!(cgats.filename(), Some(path.as_path()));
        assert!(cgats.mtime().is_some());

        let reread = Cgats::from_path(&path).unwrap();
        assert_eq!(reread.to_string(), cgats.to_string());
        assert!(fs::read_to_string(&path).unwrap().ends_with("END_DATA\n"));
    }

    #[test]
    fn exponent_cells_keep_their_value() {
        let text = "CTI3\nBEGIN_DATA_FORMAT\nSAMPLE_ID XYZ_X XYZ_Y\nEND_DATA_FORMAT\n\
                    BEGIN_DATA\n1 95.05 1.25e-4\nEND_DATA\n";
        let cgats = Cgats::parse(text).unwrap();
        let out = cgats.to_string();
        assert!(out.contains("\n1 95.050000 0.000125\n"));

        let reparsed = Cgats::parse(&out).unwrap();
        let row = reparsed.queryi1(Cgats::ROOT, "XYZ_Y").unwrap();
        assert_eq!(reparsed.value(row, "XYZ_Y"), Some(Value::Float(1.25e-4)));
    }

    #[test]
    fn later_untitled_documents_get_a_tag_line() {
        let text = "CTI1\nBEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R\nEND_DATA_FORMAT\nBEGIN_DATA\n1 0.5\nEND_DATA\n\
                    BEGIN_DATA_FORMAT\nSAMPLE_ID RGB_G\nEND_DATA_FORMAT\nBEGIN_DATA\n2 0.25\nEND_DATA\n";
        let cgats = Cgats::parse(text).unwrap();
        assert_eq!(cgats.documents().len(), 2);

        let once = cgats.to_string();
        assert!(once.contains("END_DATA\n\nCGATS  \n\nNUMBER_OF_FIELDS 2\n"));
        let reparsed = Cgats::parse(&once).unwrap();
        assert_eq!(reparsed.documents().len(), 2);
        assert_eq!(reparsed.to_string(), once);
    }

    #[test]
    fn untitled_documents_have_no_tag_line() {
        let cgats = Cgats::parse("ORIGINATOR \"me\"\n").unwrap();
        assert_eq!(cgats.to_string(), "ORIGINATOR \"me\"");
    }
}
