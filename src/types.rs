use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead, Cursor, Read};
use std::path::PathBuf;

/// A regular file discovered beneath the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// File name used for filtering and ordering.
    pub display_name: String,
}

/// Where a [`Document`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOrigin {
    /// Absolute path of the file that was opened.
    pub source: PathBuf,
    /// Member name when the document is an archive entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

impl fmt::Display for DocumentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "{} [{}]", self.source.display(), entry),
            None => write!(f, "{}", self.source.display()),
        }
    }
}

/// One decoded text document handed to the consumer.
///
/// The consumer gets a `&mut Document` and reads it through [`Read`] /
/// [`BufRead`] or [`Document::text`]. The visitor drops it as soon as the
/// consumer returns.
#[derive(Debug)]
pub struct Document {
    origin: DocumentOrigin,
    reader: Cursor<String>,
}

impl Document {
    pub(crate) fn new(origin: DocumentOrigin, text: String) -> Self {
        Self {
            origin,
            reader: Cursor::new(text),
        }
    }

    pub fn origin(&self) -> &DocumentOrigin {
        &self.origin
    }

    /// Entry name for archive members, otherwise the file name.
    pub fn display_name(&self) -> String {
        match &self.origin.entry {
            Some(entry) => entry.clone(),
            None => self
                .origin
                .source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// The whole decoded text, independent of how much has been read.
    pub fn text(&self) -> &str {
        self.reader.get_ref()
    }
}

impl Read for Document {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for Document {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt)
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSummary {
    /// Candidate files that passed the name filter.
    pub candidates: u64,
    /// Documents handed to the consumer; the progress counter.
    pub delivered: u64,
    /// Files or archive entries abandoned because of an error.
    pub failed: u64,
    /// Files and archive entries rejected by the name filter.
    pub filtered: u64,
    /// Progress notifications emitted.
    pub progress_reports: u64,
}
