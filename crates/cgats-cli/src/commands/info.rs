//! Info command: a summary of every document in one or more files.

use crate::InfoArgs;
use anyhow::{Result, bail};
use cgats::{Cgats, Entry, NodeId, NodeKind, rcut};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Descriptor width in text output.
const DESCRIPTOR_WIDTH: usize = 60;

#[derive(Debug, Serialize)]
struct FileInfo {
    file: PathBuf,
    documents: Vec<DocumentInfo>,
}

#[derive(Debug, Serialize)]
struct DocumentInfo {
    #[serde(rename = "type")]
    type_tag: String,
    descriptor: Option<String>,
    keys: Vec<String>,
    keywords: Vec<String>,
    columns: Vec<String>,
    fields: usize,
    sets: usize,
    sections: Vec<String>,
}

fn describe(cgats: &Cgats, doc: NodeId) -> DocumentInfo {
    let mut keys = Vec::new();
    let mut sections = Vec::new();
    for key in cgats.keys(doc) {
        match cgats.entry(doc, &key) {
            Some(Entry::Value(_)) => keys.push(key.to_string()),
            Some(Entry::Node(child)) if cgats.kind(*child) == Some(&NodeKind::Section) => {
                sections.push(key.to_string())
            }
            _ => {}
        }
    }
    DocumentInfo {
        type_tag: cgats.kind(doc).map(ToString::to_string).unwrap_or_default(),
        descriptor: cgats.descriptor(doc),
        keys,
        keywords: cgats
            .child(doc, "KEYWORDS")
            .map(|k| cgats.column_names(k))
            .unwrap_or_default(),
        columns: cgats
            .child(doc, "DATA_FORMAT")
            .map(|df| cgats.column_names(df))
            .unwrap_or_default(),
        fields: cgats.number_of_fields(doc),
        sets: cgats.number_of_sets(doc),
        sections,
    }
}

fn inspect(path: &Path) -> Result<FileInfo> {
    trace!(path = %path.display(), "info::inspect");
    let cgats = super::load(path)?;
    let documents = cgats.documents().into_iter().map(|doc| describe(&cgats, doc)).collect();
    Ok(FileInfo {
        file: path.to_path_buf(),
        documents,
    })
}

/// Runs the info command; files are read in parallel and reported in input order.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let files = super::expand_inputs(&args.input)?;
    info!(files = files.len(), "Reading CGATS files");

    let results: Vec<Result<FileInfo>> = files.par_iter().map(|path| inspect(path)).collect();

    let mut reports = Vec::new();
    let mut failed = 0;
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                eprintln!("Error: {:#}", e);
            }
        }
    }
    debug!(ok = reports.len(), failed, "info complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_text(report, verbose);
        }
    }

    if failed > 0 {
        bail!("{} files failed", failed);
    }
    Ok(())
}

fn print_text(report: &FileInfo, verbose: u8) {
    println!("{}", report.file.display());
    for doc in &report.documents {
        let descriptor = doc.descriptor.as_deref().unwrap_or("");
        println!("  {:<8} {}", doc.type_tag, rcut(descriptor, DESCRIPTOR_WIDTH));
        if !doc.keys.is_empty() {
            println!("    Keys:     {}", doc.keys.join(", "));
        }
        if !doc.keywords.is_empty() {
            println!("    Keywords: {}", doc.keywords.join(", "));
        }
        println!("    Fields:   {}", doc.fields);
        println!("    Sets:     {}", doc.sets);
        if !doc.sections.is_empty() {
            println!("    Sections: {}", doc.sections.join(", "));
        }
        if verbose > 0 && !doc.columns.is_empty() {
            println!("    Columns:  {}", doc.columns.join(" "));
        }
    }
}
