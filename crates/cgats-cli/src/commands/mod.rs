//! CLI command implementations

pub mod fmt;
pub mod info;
pub mod keyword;
pub mod query;
pub mod remove_row;

use anyhow::{Context, Result, bail};
use cgats::{Cgats, Key, NodeId, Value};
use std::path::{Path, PathBuf};

/// Load a CGATS file
pub fn load(path: &Path) -> Result<Cgats> {
    Cgats::from_path(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Write to `output`, or print to stdout when there is none
pub fn save(cgats: &mut Cgats, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => cgats
            .write(path)
            .with_context(|| format!("Failed to save: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            cgats.write_to(&mut stdout).context("Failed to write to stdout")
        }
    }
}

/// Expand glob patterns; a pattern without matches is kept when it names a file.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid pattern: {pattern}"))?
            .filter_map(|r| r.ok())
            .collect();
        if matched.is_empty() {
            let literal = PathBuf::from(pattern);
            if !literal.exists() {
                bail!("No files match pattern: {pattern}");
            }
            files.push(literal);
        } else {
            files.extend(matched);
        }
    }
    Ok(files)
}

/// Top-level document by position
pub fn document(cgats: &Cgats, index: usize) -> Result<NodeId> {
    let documents = cgats.documents();
    match documents.get(index) {
        Some(&doc) => Ok(doc),
        None => bail!("Document {} out of range ({} documents)", index, documents.len()),
    }
}

/// Split a `KEY[=VALUE]` term; all-digit keys address positions.
pub fn parse_term(term: &str) -> (Key, Option<Value>) {
    let (key, value) = match term.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (term, None),
    };
    let key = match key.parse::<usize>() {
        Ok(index) => Key::Index(index),
        Err(_) => Key::from(key),
    };
    (key, value.map(|v| Value::coerce(v.trim_matches('"'))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms() {
        assert_eq!(parse_term("RGB_R=100"), (Key::from("RGB_R"), Some(Value::Int(100))));
        assert_eq!(parse_term("DESCRIPTOR"), (Key::from("DESCRIPTOR"), None));
        assert_eq!(parse_term("0=SAMPLE_ID"), (Key::Index(0), Some(Value::from("SAMPLE_ID"))));
        assert_eq!(parse_term("NAME=\"a b\""), (Key::from("NAME"), Some(Value::from("a b"))));
    }

    #[test]
    fn literal_and_globbed_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.ti1", "b.ti1", "c.cal"] {
            std::fs::write(dir.path().join(name), "CTI1\n").unwrap();
        }
        let pattern = dir.path().join("*.ti1").to_string_lossy().into_owned();
        assert_eq!(expand_inputs(&[pattern]).unwrap().len(), 2);

        let literal = dir.path().join("c.cal").to_string_lossy().into_owned();
        assert_eq!(expand_inputs(&[literal]).unwrap().len(), 1);

        let missing = dir.path().join("*.ti3").to_string_lossy().into_owned();
        assert!(expand_inputs(&[missing]).is_err());
    }

    #[test]
    fn document_out_of_range() {
        let cgats = Cgats::from_lines(["CTI1"]).unwrap();
        assert!(document(&cgats, 0).is_ok());
        assert!(document(&cgats, 1).is_err());
    }
}
