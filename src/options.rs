use crate::error::NestcatError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Pattern used when no name filter is configured.
pub const MATCH_ALL: &str = ".*";

/// Configuration of one traversal run.
///
/// Options are plain data and can be loaded from JSON; nothing is validated
/// until they are handed to [`Visitor::new`](crate::Visitor::new).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NestcatOptions {
    /// A single file, a single archive, or a directory of either.
    pub root: PathBuf,
    /// Regular expression that must match the whole name of a file or archive entry.
    pub filter: String,
    /// Emit a progress notification every `report_interval` documents; `0` disables it.
    pub report_interval: usize,
    /// Glob patterns pruned from directory enumeration.
    pub ignore_patterns: Vec<String>,
    pub max_depth: Option<usize>,
    pub follow_links: bool,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    /// Upper bound in bytes for one materialized document.
    pub document_size_limit: Option<u64>,
    /// Upper bound in bytes for a ZIP container, which is buffered whole.
    pub container_size_limit: Option<u64>,
}
impl Default for NestcatOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            filter: MATCH_ALL.to_string(),
            report_interval: 0,
            ignore_patterns: Vec::new(),
            max_depth: None,
            follow_links: false,
            include_hidden: true,
            respect_gitignore: false,
            document_size_limit: None,
            container_size_limit: None,
        }
    }
}
impl NestcatOptions {
    /// Loads options from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, NestcatError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            NestcatError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| NestcatError::Config(format!("invalid {}: {}", path.display(), e)))
    }
}
#[derive(Debug, Default)]
pub struct NestcatBuilder {
    options: NestcatOptions,
}
impl NestcatBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            options: NestcatOptions {
                root: root.into(),
                ..Default::default()
            },
        }
    }
    pub fn from_options(options: NestcatOptions) -> Self {
        Self { options }
    }
    pub fn filter(mut self, pattern: impl Into<String>) -> Self {
        self.options.filter = pattern.into();
        self
    }
    pub fn report_interval(mut self, every: usize) -> Self {
        self.options.report_interval = every;
        self
    }
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.ignore_patterns = patterns;
        self
    }
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = Some(depth);
        self
    }
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.options.follow_links = yes;
        self
    }
    pub fn include_hidden(mut self, yes: bool) -> Self {
        self.options.include_hidden = yes;
        self
    }
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.options.respect_gitignore = yes;
        self
    }
    pub fn document_size_limit(mut self, limit: Option<u64>) -> Self {
        self.options.document_size_limit = limit;
        self
    }
    pub fn container_size_limit(mut self, limit: Option<u64>) -> Self {
        self.options.container_size_limit = limit;
        self
    }
    pub fn build(self) -> NestcatOptions {
        self.options
    }
}
