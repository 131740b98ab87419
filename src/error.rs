use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum NestcatError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),
    #[error("Archive error in {path}{}: {message}", entry_suffix(.entry))]
    Archive {
        path: PathBuf,
        entry: Option<String>,
        message: String,
    },
    #[error("Truncated entry in {path}{}: expected {expected} bytes, got {actual}", entry_suffix(.entry))]
    Truncated {
        path: PathBuf,
        entry: Option<String>,
        expected: u64,
        actual: u64,
    },
    #[error("Document {path}{} is too large ({size} > {limit} bytes)", entry_suffix(.entry))]
    TooLarge {
        path: PathBuf,
        entry: Option<String>,
        size: u64,
        limit: u64,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}
impl NestcatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NestcatError::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn archive(
        path: impl Into<PathBuf>,
        entry: Option<&str>,
        message: impl std::fmt::Display,
    ) -> Self {
        NestcatError::Archive {
            path: path.into(),
            entry: entry.map(str::to_owned),
            message: message.to_string(),
        }
    }
}
fn entry_suffix(entry: &Option<String>) -> String {
    match entry {
        Some(name) => format!(" [{}]", name),
        None => String::new(),
    }
}
