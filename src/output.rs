//! Output formatting for delivered documents.
//!
//! Provides functions to render a [`Document`] as a path line, a plain text
//! block, or one JSON object per line. Content is written exactly as decoded.

use crate::Document;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Paths,
    Text,
    Json,
}

/// Serialized shape of one document.
#[derive(Debug, Serialize)]
pub struct DocumentRecord<'a> {
    pub source: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<&'a str>,
    pub content: &'a str,
}

impl<'a> From<&'a Document> for DocumentRecord<'a> {
    fn from(document: &'a Document) -> Self {
        Self {
            source: &document.origin().source,
            entry: document.origin().entry.as_deref(),
            content: document.text(),
        }
    }
}

/// Formats one document into a string, including its trailing newline.
pub fn format_document(
    document: &Document,
    format: OutputFormat,
    pretty: bool,
) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Paths => format!("{}\n", document.origin()),
        OutputFormat::Text => format_text(document),
        OutputFormat::Json => {
            let record = DocumentRecord::from(document);
            let mut out = if pretty {
                serde_json::to_string_pretty(&record)?
            } else {
                serde_json::to_string(&record)?
            };
            out.push('\n');
            out
        }
    })
}

/// Writes one formatted document to `out`.
pub fn write_document(
    out: &mut impl Write,
    document: &Document,
    format: OutputFormat,
    pretty: bool,
) -> io::Result<()> {
    let formatted = format_document(document, format, pretty)?;
    out.write_all(formatted.as_bytes())
}

// ----------------------- Internal formatting -----------------------

fn format_text(document: &Document) -> String {
    let content = document.text();
    let mut out = String::with_capacity(content.len() + 64);
    out.push_str(&format!("--- {} ---\n", document.origin()));
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out
}
