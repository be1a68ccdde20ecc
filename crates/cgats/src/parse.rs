//! CGATS text parser.
//!
//! The parser is a line classifier driven by a single cursor (the current
//! context node). `BEGIN_*` lines push the cursor into a new child,
//! `END_*` lines pop it back to the parent, and every other line is
//! interpreted according to the kind of node the cursor sits on:
//!
//! | Context | Line handling |
//! |---------|---------------|
//! | `DATA_FORMAT` | whitespace-separated column names |
//! | `DATA` | one row of values |
//! | `SECTION` | stored verbatim |
//! | `ROOT` / document | `Date:` line, `KEY value` pair, or a bare type tag opening a new document |
//!
//! The parser is lenient: lines that fit no shape, or that the edit API
//! rejects, are dropped with a log message instead of failing the parse.

use crate::edit::Data;
use crate::{Cgats, CgatsError, CgatsResult, Key, NodeId, NodeKind, Value};
use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// `KEY [VALUE|"quoted value"]`
fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"^([^"]+?)(?:\s+("[^"]*"|\S+))?$"#).expect("header pattern compiles"))
}

/// Where CGATS text comes from.
pub enum Source {
    /// A file on disk.
    Path(PathBuf),
    /// Text already in memory.
    Text(String),
    /// Any readable stream, read to the end.
    Reader(Box<dyn Read>),
    /// Pre-split lines, e.g. a list of document type tags.
    Lines(Vec<String>),
}

impl Source {
    /// Treats `s` as text when it spans lines, as a path otherwise.
    pub fn from_str_or_path(s: &str) -> Self {
        if s.contains(['\n', '\r']) {
            Source::Text(s.to_string())
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Source::Text(t) => f.debug_tuple("Text").field(&t.len()).finish(),
            Source::Reader(_) => f.write_str("Reader"),
            Source::Lines(l) => f.debug_tuple("Lines").field(&l.len()).finish(),
        }
    }
}

impl From<PathBuf> for Source {
    fn from(p: PathBuf) -> Self {
        Source::Path(p)
    }
}

impl From<&Path> for Source {
    fn from(p: &Path) -> Self {
        Source::Path(p.to_path_buf())
    }
}

impl From<Vec<String>> for Source {
    fn from(lines: Vec<String>) -> Self {
        Source::Lines(lines)
    }
}

/// Decodes UTF-8, falling back to Latin-1 byte-per-char.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Drops control characters (C0, DEL and C1), keeping TAB, printable ASCII
/// and U+00A0 upwards.
fn strip_controls(raw: &str) -> String {
    raw.chars()
        .filter(|&c| c == '\t' || (' '..='~').contains(&c) || c >= '\u{A0}')
        .collect()
}

/// Cuts a trailing `#` comment; `#` inside double quotes is kept.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Splits on whitespace outside double quotes and unquotes each token.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_token = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// `CTI3`, `CAL`, `CGATS.17`, ...
fn is_type_tag(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

struct Parser {
    cgats: Cgats,
    context: NodeId,
}

impl Parser {
    fn new() -> Self {
        Self {
            cgats: Cgats::new(),
            context: Cgats::ROOT,
        }
    }

    fn context_kind(&self) -> NodeKind {
        self.cgats.kind(self.context).cloned().unwrap_or(NodeKind::Root)
    }

    fn finish(mut self) -> Cgats {
        if !matches!(self.context_kind(), NodeKind::Root | NodeKind::Document(_)) {
            tracing::debug!(context = %self.context_kind(), "input ended inside an open block");
        }
        self.cgats.set_modified(false);
        self.cgats
    }

    /// Opens an untitled document and moves the cursor into it.
    fn open_untitled(&mut self) -> CgatsResult<NodeId> {
        let doc = self
            .cgats
            .add_data(Cgats::ROOT, String::new(), None)?
            .ok_or_else(|| CgatsError::key_not_found("document"))?;
        self.context = doc;
        Ok(doc)
    }

    /// The cursor's document, opening one if the cursor is on `ROOT`.
    fn header_context(&mut self) -> CgatsResult<NodeId> {
        match self.context_kind() {
            NodeKind::Root => self.open_untitled(),
            _ => Ok(self.context),
        }
    }

    fn end(&mut self, name: &str) {
        tracing::trace!(block = name, "closing block");
        self.context = self.cgats.parent(self.context).unwrap_or(Cgats::ROOT);
    }

    fn begin(&mut self, name: &str) -> CgatsResult<()> {
        let mut doc = self.header_context()?;
        if self.cgats.entry(doc, &Key::from(name)).is_some() {
            tracing::debug!(block = name, "repeated block opens a new document");
            doc = self.open_untitled()?;
        }
        self.context = self.cgats.add_section(doc, name)?;
        Ok(())
    }

    fn line(&mut self, raw: &str) {
        let cleaned = strip_controls(raw);
        let line = strip_comment(cleaned.trim()).trim();
        if let Err(err) = self.classify(line) {
            tracing::warn!(line, error = %err, "dropping line");
        }
    }

    fn classify(&mut self, line: &str) -> CgatsResult<()> {
        let kind = self.context_kind();
        if let Some(name) = line.strip_prefix("END_") {
            if matches!(kind, NodeKind::Root | NodeKind::Document(_)) {
                tracing::debug!(block = name, "END_ without open block");
            } else {
                self.end(name);
            }
            return Ok(());
        }
        match kind {
            NodeKind::DataFormat | NodeKind::Data | NodeKind::Keywords => {
                if line.starts_with("BEGIN_") {
                    tracing::debug!(line, "implicitly closing {}", kind);
                    self.end(kind.type_tag());
                    return self.classify(line);
                }
                let tokens = tokenize(line);
                if !tokens.is_empty() {
                    let values: Vec<Value> = tokens.into_iter().map(Value::Str).collect();
                    self.cgats.add_data(self.context, values, None)?;
                }
                Ok(())
            }
            NodeKind::Section => {
                self.cgats.add_data(self.context, line, None)?;
                Ok(())
            }
            NodeKind::Root | NodeKind::Document(_) => self.header_line(line),
            NodeKind::Sample => {
                self.end(kind.type_tag());
                self.classify(line)
            }
        }
    }

    fn header_line(&mut self, line: &str) -> CgatsResult<()> {
        if let Some(name) = line.strip_prefix("BEGIN_") {
            if !name.is_empty() {
                return self.begin(name);
            }
        }
        let tokens = tokenize(line);
        match tokens.as_slice() {
            [] => Ok(()),
            [first, _, ..] if first == "Date:" => {
                self.cgats.set_datetime(self.context, Some(line.to_string()))
            }
            [_, _, ..] => {
                let Some(caps) = header_pattern().captures(line) else {
                    tracing::debug!(line, "unrecognized header line");
                    return Ok(());
                };
                let key = caps[1].trim().to_string();
                let value = caps
                    .get(2)
                    .map(|m| m.as_str().trim_matches('"').to_string())
                    .unwrap_or_default();
                let doc = self.header_context()?;
                self.cgats.add_data(doc, Data::Map(vec![(key, Value::Str(value))]), None)?;
                Ok(())
            }
            [token] if token != "Comment:" && token != "Date:" && is_type_tag(token) => {
                self.context = self
                    .cgats
                    .add_data(Cgats::ROOT, token.as_str(), None)?
                    .ok_or_else(|| CgatsError::key_not_found(token))?;
                Ok(())
            }
            [_] => {
                tracing::debug!(line, "unrecognized header line");
                Ok(())
            }
        }
    }
}

fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Cgats {
    let mut parser = Parser::new();
    for line in lines {
        parser.line(line);
    }
    parser.finish()
}

impl Cgats {
    /// Parses CGATS text. Line endings may be `\n`, `\r\n` or `\r`.
    pub fn parse(text: &str) -> CgatsResult<Self> {
        tracing::trace!(bytes = text.len(), "cgats::parse");
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        Ok(parse_lines(normalized.split('\n')))
    }

    /// Reads and parses a file, recording its name and modification time.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CgatsResult<Self> {
        let path = path.as_ref();
        tracing::trace!(path = %path.display(), "cgats::from_path");
        if path.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(CgatsError::InvalidInput(format!("path contains NUL: {}", path.display())));
        }
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(CgatsError::InvalidInput(format!("not a regular file: {}", path.display())));
        }
        let bytes = fs::read(path)?;
        let mut cgats = Self::parse(&decode(&bytes))?;
        cgats.filename = Some(path.to_path_buf());
        cgats.mtime = metadata.modified().ok();
        Ok(cgats)
    }

    /// Reads a stream to the end and parses it.
    pub fn from_reader<R: Read>(mut reader: R) -> CgatsResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse(&decode(&bytes))
    }

    /// Parses pre-split lines.
    ///
    /// ```rust
    /// use cgats::Cgats;
    ///
    /// let cgats = Cgats::from_lines(["CTI3", "CAL"]).unwrap();
    /// assert_eq!(cgats.documents().len(), 2);
    /// ```
    pub fn from_lines<I, S>(lines: I) -> CgatsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<S> = lines.into_iter().collect();
        Ok(parse_lines(lines.iter().map(|s| s.as_ref())))
    }

    /// Loads from any [`Source`].
    pub fn load(source: Source) -> CgatsResult<Self> {
        match source {
            Source::Path(path) => Self::from_path(path),
            Source::Text(text) => Self::parse(&text),
            Source::Reader(reader) => Self::from_reader(reader),
            Source::Lines(lines) => Self::from_lines(lines),
        }
    }
}
