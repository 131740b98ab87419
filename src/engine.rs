use crate::archive::{self, ArchiveEntry};
use crate::codec;
use crate::error::NestcatError;
use crate::filter::NameFilter;
use crate::options::NestcatOptions;
use crate::order::sort_by_name;
use crate::sniff::{ArchiveFormat, PeekReader, detect_archive, detect_compression};
use crate::text::decode_file_bytes;
use crate::types::{CandidateFile, Document, DocumentOrigin, VisitSummary};
use crate::walk::Walker;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

/// Drives one traversal: enumerate, filter, sort, unpack and deliver.
///
/// Files are processed strictly one after another. A file that cannot be
/// opened or decoded is logged and skipped; only the consumer can abort a run.
pub struct Visitor {
    walker: Walker,
    filter: NameFilter,
    report_interval: u64,
    size_limit: Option<u64>,
    container_limit: Option<u64>,
    count: u64,
    progress_hook: Option<Box<dyn FnMut(u64)>>,
}

impl Visitor {
    /// Validates `options`; fails if the root does not exist or a pattern is malformed.
    pub fn new(options: NestcatOptions) -> Result<Self, NestcatError> {
        let root = fs::canonicalize(&options.root).map_err(|_| {
            NestcatError::InvalidPath(format!("Path does not exist: {}", options.root.display()))
        })?;
        let filter = NameFilter::new(&options.filter)?;
        let walker = Walker::new(root, &options)?;
        tracing::debug!(
            "visiting {} with filter {}",
            walker.root().display(),
            filter.pattern()
        );
        Ok(Self {
            walker,
            filter,
            report_interval: options.report_interval as u64,
            size_limit: options.document_size_limit,
            container_limit: options.container_size_limit,
            count: 0,
            progress_hook: None,
        })
    }

    /// Registers a callback invoked with the running total at every progress notification.
    pub fn on_progress(mut self, hook: impl FnMut(u64) + 'static) -> Self {
        self.progress_hook = Some(Box::new(hook));
        self
    }

    /// Documents delivered by this visitor so far, across runs.
    pub fn delivered(&self) -> u64 {
        self.count
    }

    /// Hands every document below the root to `consumer`, one at a time.
    ///
    /// The document is dropped as soon as the consumer returns. An error from
    /// the consumer stops the run and is returned unchanged.
    pub fn visit<F, E>(&mut self, mut consumer: F) -> Result<VisitSummary, E>
    where
        F: FnMut(&mut Document) -> Result<(), E>,
    {
        let mut summary = VisitSummary::default();
        let mut files: Vec<CandidateFile> = self
            .walker
            .enumerate()
            .into_iter()
            .filter(|file| {
                let keep = self.filter.matches(&file.display_name);
                if !keep {
                    summary.filtered += 1;
                }
                keep
            })
            .collect();
        sort_by_name(&mut files, |file| file.display_name.as_str());
        summary.candidates = files.len() as u64;

        for file in &files {
            tracing::debug!("reading {}", file.path.display());
            let documents = match self.unpack(&file.path, &mut summary) {
                Ok(documents) => documents,
                Err(e) => {
                    tracing::error!("failed to read {}: {}", file.path.display(), e);
                    summary.failed += 1;
                    continue;
                }
            };
            for mut document in documents {
                let outcome = consumer(&mut document);
                drop(document);
                outcome?;
                self.count(&mut summary);
            }
        }
        Ok(summary)
    }

    fn count(&mut self, summary: &mut VisitSummary) {
        self.count += 1;
        summary.delivered += 1;
        if self.report_interval > 0 && self.count % self.report_interval == 0 {
            tracing::info!("read {} files", self.count);
            summary.progress_reports += 1;
            if let Some(hook) = self.progress_hook.as_mut() {
                hook(self.count);
            }
        }
    }

    /// Opens one candidate and turns it into its documents, in delivery order.
    fn unpack(
        &self,
        path: &Path,
        summary: &mut VisitSummary,
    ) -> Result<Vec<Document>, NestcatError> {
        let handle = File::open(path).map_err(|e| NestcatError::io(path, e))?;
        let mut raw = PeekReader::new(BufReader::new(handle));
        let compression = detect_compression(&mut raw).map_err(|e| NestcatError::io(path, e))?;
        if let Some(codec) = compression {
            tracing::debug!("{} is {} compressed", path.display(), codec);
        }
        let mut decoded = PeekReader::new(codec::wrap(raw, compression));
        match detect_archive(&mut decoded).map_err(|e| NestcatError::io(path, e))? {
            None => {
                let bytes = self.read_single(path, decoded)?;
                let origin = DocumentOrigin {
                    source: path.to_path_buf(),
                    entry: None,
                };
                Ok(vec![Document::new(origin, decode_file_bytes(&bytes))])
            }
            Some(format) => {
                tracing::debug!("{} is a {} archive", path.display(), format);
                Ok(self.demux(path, decoded, format, summary))
            }
        }
    }

    fn read_single<R: Read>(&self, path: &Path, mut reader: R) -> Result<Vec<u8>, NestcatError> {
        let mut bytes = Vec::new();
        match self.size_limit {
            Some(limit) => {
                reader
                    .take(limit.saturating_add(1))
                    .read_to_end(&mut bytes)
                    .map_err(|e| NestcatError::io(path, e))?;
                if bytes.len() as u64 > limit {
                    return Err(NestcatError::TooLarge {
                        path: path.to_path_buf(),
                        entry: None,
                        size: bytes.len() as u64,
                        limit,
                    });
                }
            }
            None => {
                reader
                    .read_to_end(&mut bytes)
                    .map_err(|e| NestcatError::io(path, e))?;
            }
        }
        Ok(bytes)
    }

    /// Reads every admitted member, then orders them by name.
    ///
    /// Members that fail are logged and skipped. If the container breaks
    /// partway, the members read before the break are still returned. A break
    /// right after a failed member is the same fault and is counted once.
    fn demux<R: Read>(
        &self,
        path: &Path,
        reader: R,
        format: ArchiveFormat,
        summary: &mut VisitSummary,
    ) -> Vec<Document> {
        let mut members: Vec<(ArchiveEntry, Vec<u8>)> = Vec::new();
        let mut last_failed = false;
        let walked = archive::for_each_entry(reader, format, path, self.container_limit, |member| {
            last_failed = false;
            let (entry, content) = match member {
                Ok(member) => member,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    summary.failed += 1;
                    last_failed = true;
                    return;
                }
            };
            if !self.filter.matches(&entry.name) {
                summary.filtered += 1;
                return;
            }
            match archive::read_declared(path, &entry, content, self.size_limit) {
                Ok(bytes) => members.push((entry, bytes)),
                Err(e) => {
                    tracing::warn!("skipping entry: {}", e);
                    summary.failed += 1;
                    last_failed = true;
                }
            }
        });
        if let Err(e) = walked {
            tracing::error!(
                "failed to read {} after {} entries: {}",
                path.display(),
                members.len(),
                e
            );
            if !last_failed {
                summary.failed += 1;
            }
        }
        sort_by_name(&mut members, |(entry, _)| entry.name.as_str());
        members
            .into_iter()
            .map(|(entry, bytes)| {
                let origin = DocumentOrigin {
                    source: path.to_path_buf(),
                    entry: Some(entry.name),
                };
                Document::new(origin, decode_file_bytes(&bytes))
            })
            .collect()
    }
}

/// Builds a [`Visitor`] from `options` and runs it once.
pub fn visit<F, E>(options: NestcatOptions, consumer: F) -> Result<VisitSummary, E>
where
    F: FnMut(&mut Document) -> Result<(), E>,
    E: From<NestcatError>,
{
    let mut visitor = Visitor::new(options)?;
    visitor.visit(consumer)
}
