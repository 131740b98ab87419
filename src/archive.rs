//! Sequential access to the members of a detected container.

use crate::error::NestcatError;
use crate::sniff::ArchiveFormat;
use crate::text::decode_entry_name;
use serde::Serialize;
use std::io::{Cursor, Read};
use std::path::Path;

/// Cap on up-front allocation for one entry; declared sizes come from untrusted headers.
const PREALLOC_LIMIT: u64 = 1 << 20;

/// A named member of a container, valid while its archive stream is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    /// Declared uncompressed length in bytes.
    pub size: u64,
}

/// Walks the regular-file members of `reader` in container order.
///
/// `on_entry` receives each member's metadata together with a stream over its
/// content, or the error that made one member unreadable while the container
/// itself can still be walked. An `Err` return means the container could not be
/// read any further; members already passed to `on_entry` stay valid.
///
/// `buffer_limit` caps the bytes held in memory for formats that must be
/// buffered whole (ZIP). Tar is streamed and ignores it.
pub fn for_each_entry<R, F>(
    reader: R,
    format: ArchiveFormat,
    source: &Path,
    buffer_limit: Option<u64>,
    on_entry: F,
) -> Result<(), NestcatError>
where
    R: Read,
    F: FnMut(Result<(ArchiveEntry, &mut dyn Read), NestcatError>),
{
    match format {
        ArchiveFormat::Tar => tar_entries(reader, source, on_entry),
        ArchiveFormat::Zip => zip_entries(reader, source, buffer_limit, on_entry),
    }
}

fn tar_entries<R, F>(reader: R, source: &Path, mut on_entry: F) -> Result<(), NestcatError>
where
    R: Read,
    F: FnMut(Result<(ArchiveEntry, &mut dyn Read), NestcatError>),
{
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| NestcatError::archive(source, None, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| NestcatError::archive(source, None, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let meta = ArchiveEntry {
            name: decode_entry_name(&entry.path_bytes()),
            size: entry.size(),
        };
        let content: &mut dyn Read = &mut entry;
        on_entry(Ok((meta, content)));
    }
    Ok(())
}

/// ZIP keeps its directory at the end of the stream, so the decoded bytes are
/// buffered before members are read.
fn zip_entries<R, F>(
    mut reader: R,
    source: &Path,
    buffer_limit: Option<u64>,
    mut on_entry: F,
) -> Result<(), NestcatError>
where
    R: Read,
    F: FnMut(Result<(ArchiveEntry, &mut dyn Read), NestcatError>),
{
    let mut bytes = Vec::new();
    let cap = buffer_limit.map_or(u64::MAX, |limit| limit.saturating_add(1));
    Read::take(&mut reader, cap)
        .read_to_end(&mut bytes)
        .map_err(|e| NestcatError::io(source, e))?;
    if let Some(limit) = buffer_limit.filter(|&limit| bytes.len() as u64 > limit) {
        return Err(NestcatError::TooLarge {
            path: source.to_path_buf(),
            entry: None,
            size: bytes.len() as u64,
            limit,
        });
    }
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| NestcatError::archive(source, None, e))?;
    for index in 0..archive.len() {
        let mut file = match archive.by_index(index) {
            Ok(file) => file,
            Err(e) => {
                let member = format!("#{}", index);
                on_entry(Err(NestcatError::archive(source, Some(&member), e)));
                continue;
            }
        };
        if file.is_dir() {
            continue;
        }
        let meta = ArchiveEntry {
            name: decode_entry_name(file.name_raw()),
            size: file.size(),
        };
        let content: &mut dyn Read = &mut file;
        on_entry(Ok((meta, content)));
    }
    Ok(())
}

/// Reads exactly the declared length of `entry` from `content`.
///
/// Short reads are retried until the declared length is reached; running out of
/// data first is reported as [`NestcatError::Truncated`]. Bytes beyond the
/// declared length are never returned.
pub fn read_declared(
    source: &Path,
    entry: &ArchiveEntry,
    content: &mut dyn Read,
    limit: Option<u64>,
) -> Result<Vec<u8>, NestcatError> {
    if let Some(limit) = limit {
        if entry.size > limit {
            return Err(NestcatError::TooLarge {
                path: source.to_path_buf(),
                entry: Some(entry.name.clone()),
                size: entry.size,
                limit,
            });
        }
    }
    let mut bytes = Vec::with_capacity(entry.size.min(PREALLOC_LIMIT) as usize);
    Read::take(&mut *content, entry.size)
        .read_to_end(&mut bytes)
        .map_err(|e| NestcatError::archive(source, Some(&entry.name), e))?;
    let actual = bytes.len() as u64;
    if actual < entry.size {
        return Err(NestcatError::Truncated {
            path: source.to_path_buf(),
            entry: Some(entry.name.clone()),
            expected: entry.size,
            actual,
        });
    }
    // ZIP verifies a member's CRC only once its reader reports end of data.
    let mut probe = [0u8; 1];
    content
        .read(&mut probe)
        .map_err(|e| NestcatError::archive(source, Some(&entry.name), e))?;
    Ok(bytes)
}
