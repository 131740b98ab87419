use crate::error::NestcatError;
use crate::options::NestcatOptions;
use crate::types::CandidateFile;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
pub(crate) struct Walker {
    root: PathBuf,
    max_depth: Option<usize>,
    follow_links: bool,
    include_hidden: bool,
    respect_gitignore: bool,
    matcher: Option<GlobSet>,
}
impl Walker {
    /// `root` must already be absolute and known to exist.
    pub(crate) fn new(root: PathBuf, options: &NestcatOptions) -> Result<Self, NestcatError> {
        let matcher = if !options.ignore_patterns.is_empty() {
            let mut glob_builder = GlobSetBuilder::new();
            for pattern in &options.ignore_patterns {
                let glob = Glob::new(pattern).map_err(|e| {
                    NestcatError::InvalidGlob(format!("'{}': {}", pattern, e))
                })?;
                glob_builder.add(glob);
            }
            Some(
                glob_builder
                    .build()
                    .map_err(|e| NestcatError::InvalidGlob(e.to_string()))?,
            )
        } else {
            None
        };
        Ok(Self {
            root,
            max_depth: options.max_depth,
            follow_links: options.follow_links,
            include_hidden: options.include_hidden,
            respect_gitignore: options.respect_gitignore,
            matcher,
        })
    }
    pub(crate) fn root(&self) -> &Path {
        &self.root
    }
    /// Lists every regular file reachable from the root, in discovery order.
    ///
    /// Unreadable directories and link loops are logged and skipped.
    pub(crate) fn enumerate(&self) -> Vec<CandidateFile> {
        if self.root.is_file() {
            return vec![candidate(self.root.clone())];
        }
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(!self.include_hidden)
            .max_depth(self.max_depth)
            .follow_links(self.follow_links)
            .ignore(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        if let Some(ref matcher) = self.matcher {
            let matcher = matcher.clone();
            builder.filter_entry(move |entry| !matcher.is_match(entry.path()));
        }
        builder
            .build()
            .filter_map(|result| match result {
                Ok(entry) if is_regular_file(&entry) => Some(candidate(entry.into_path())),
                Ok(_) => None,
                Err(e) => {
                    tracing::error!("failed to list entry: {}", e);
                    None
                }
            })
            .collect()
    }
}
/// Unfollowed links report their own type, so a link is resolved to decide
/// whether it names a file.
fn is_regular_file(entry: &DirEntry) -> bool {
    if !entry.path_is_symlink() {
        return entry.file_type().is_some_and(|t| t.is_file());
    }
    match fs::metadata(entry.path()) {
        Ok(meta) => meta.is_file(),
        Err(e) => {
            tracing::warn!("skipping dangling link {}: {}", entry.path().display(), e);
            false
        }
    }
}
fn candidate(path: PathBuf) -> CandidateFile {
    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    CandidateFile { path, display_name }
}
