//! Loading documents for the front ends: JSON, JSONL, and Wikipedia abstract
//! dumps (`<feed><doc><title/><url/><abstract/></doc>...</feed>`, plain `.xml`
//! or gzipped `.xml.gz`).
//!
//! Ids are assigned in load order starting from 0, so a document's id is also
//! its position in the returned vector.

use crate::index::{DocId, Document};
use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(alias = "abstract", alias = "body")]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct Feed {
    #[serde(rename = "doc", default)]
    docs: Vec<FeedDoc>,
}

#[derive(Debug, Deserialize)]
struct FeedDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(rename = "abstract", default)]
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Jsonl,
    Xml,
    XmlGz,
}

fn format_of(path: &Path) -> Option<Format> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".xml.gz") {
        Some(Format::XmlGz)
    } else if name.ends_with(".xml") {
        Some(Format::Xml)
    } else if name.ends_with(".jsonl") {
        Some(Format::Jsonl)
    } else if name.ends_with(".json") {
        Some(Format::Json)
    } else {
        None
    }
}

/// Load every document under `path`: a single input file or a directory
/// walked recursively. Any unreadable or malformed input fails the whole load.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let files = input_files(path)?;
    let mut docs = Vec::new();
    for file in &files {
        match format_of(file) {
            Some(Format::Jsonl) => load_jsonl(file, &mut docs)?,
            Some(Format::Xml) => load_xml(file, open(file)?, &mut docs)?,
            Some(Format::XmlGz) => load_xml(file, GzDecoder::new(open(file)?), &mut docs)?,
            // a file named explicitly is read as JSON whatever its extension
            Some(Format::Json) | None => load_json(file, &mut docs)?,
        }
    }
    tracing::info!(path = %path.display(), files = files.len(), num_docs = docs.len(), "loaded documents");
    Ok(docs)
}

fn input_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("input not found: {}", path.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
        let p = entry.path();
        if p.is_file() && format_of(p).is_some() {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}

fn open(file: &Path) -> Result<File> {
    File::open(file).with_context(|| format!("failed to open {}", file.display()))
}

fn load_xml<R: Read>(file: &Path, reader: R, docs: &mut Vec<Document>) -> Result<()> {
    let feed: Feed = quick_xml::de::from_reader(BufReader::new(reader))
        .with_context(|| format!("invalid abstract dump {}", file.display()))?;
    for d in feed.docs {
        push(docs, InputDoc { title: d.title, url: d.url, text: d.text })?;
    }
    Ok(())
}

fn load_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = open(file)?;
    for (lineno, line) in BufReader::new(f).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", file.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("invalid document at {}:{}", file.display(), lineno + 1))?;
        push(docs, doc)?;
    }
    Ok(())
}

fn load_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = open(file)?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("invalid JSON in {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)
                    .with_context(|| format!("invalid document in {}", file.display()))?;
                push(docs, doc)?;
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)
                .with_context(|| format!("invalid document in {}", file.display()))?;
            push(docs, doc)?;
        }
        _ => bail!("expected a JSON object or array in {}", file.display()),
    }
    Ok(())
}

fn push(docs: &mut Vec<Document>, doc: InputDoc) -> Result<()> {
    let id = DocId::try_from(docs.len()).context("too many documents for a 32-bit id")?;
    docs.push(Document { id, text: doc.text, title: doc.title, url: doc.url });
    Ok(())
}
