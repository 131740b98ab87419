//! Content-based detection of compression codecs and archive containers.
//!
//! Detection never trusts file extensions. It probes a bounded header window on
//! a [`PeekReader`], classifies it, and leaves every probed byte in place so the
//! caller reads the stream from its original position whether or not anything
//! matched.

use serde::Serialize;
use std::fmt;
use std::io::{self, BufRead, Read};

/// Largest window any detector needs: one tar header block.
pub const SIGNATURE_WINDOW: usize = 512;

pub(crate) const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZIP2_MAGIC: &[u8; 3] = b"BZh";
const XZ_MAGIC: [u8; 6] = [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
/// Longest codec signature.
const CODEC_WINDOW: usize = 6;
const ZIP_LOCAL_FILE: &[u8; 4] = b"PK\x03\x04";
const ZIP_END_OF_CENTRAL_DIR: &[u8; 4] = b"PK\x05\x06";
const ZIP_SPANNED: &[u8; 4] = b"PK\x07\x08";
const TAR_BLOCK: usize = 512;
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_CHECKSUM_OFFSET: usize = 148;
const TAR_CHECKSUM_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Compression {
    Gzip,
    Bzip2,
    Xz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArchiveFormat {
    Zip,
    Tar,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Gzip => f.write_str("gzip"),
            Compression::Bzip2 => f.write_str("bzip2"),
            Compression::Xz => f.write_str("xz"),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Zip => f.write_str("zip"),
            ArchiveFormat::Tar => f.write_str("tar"),
        }
    }
}

/// A reader that can look ahead without consuming.
///
/// Peeked bytes are kept in an internal buffer and replayed by [`Read`] before
/// anything else is pulled from the wrapped source.
pub struct PeekReader<R> {
    inner: R,
    head: Vec<u8>,
    pos: usize,
}

impl<R: Read> PeekReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            head: Vec::with_capacity(SIGNATURE_WINDOW),
            pos: 0,
        }
    }

    /// Returns up to `n` upcoming bytes without consuming them.
    ///
    /// Short reads from the source are retried until `n` bytes are buffered or
    /// the source is exhausted, so a shorter slice means end of stream.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        if self.pos > 0 {
            self.head.drain(..self.pos);
            self.pos = 0;
        }
        let mut chunk = [0u8; SIGNATURE_WINDOW];
        while self.head.len() < n {
            let want = (n - self.head.len()).min(chunk.len());
            match self.inner.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(read) => self.head.extend_from_slice(&chunk[..read]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        let end = n.min(self.head.len());
        Ok(&self.head[..end])
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.head.len() {
            let available = &self.head[self.pos..];
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            self.pos += n;
            if self.pos == self.head.len() {
                self.head.clear();
                self.pos = 0;
            }
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

impl<R: Read> BufRead for PeekReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.head.len() {
            self.peek(SIGNATURE_WINDOW)?;
        }
        Ok(&self.head[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.head.len());
        if self.pos == self.head.len() {
            self.head.clear();
            self.pos = 0;
        }
    }
}

/// Identifies the compression codec of the upcoming bytes, if any.
pub fn detect_compression<R: Read>(reader: &mut PeekReader<R>) -> io::Result<Option<Compression>> {
    let header = reader.peek(CODEC_WINDOW)?;
    Ok(classify_compression(header))
}

/// Identifies the archive container of the upcoming bytes, if any.
pub fn detect_archive<R: Read>(reader: &mut PeekReader<R>) -> io::Result<Option<ArchiveFormat>> {
    let header = reader.peek(SIGNATURE_WINDOW)?;
    Ok(classify_archive(header))
}

fn classify_compression(header: &[u8]) -> Option<Compression> {
    if header.starts_with(&GZIP_MAGIC) {
        return Some(Compression::Gzip);
    }
    // the block size digit keeps plain text starting with "BZh" out
    if header.starts_with(BZIP2_MAGIC)
        && header.get(BZIP2_MAGIC.len()).is_some_and(|d| (b'1'..=b'9').contains(d))
    {
        return Some(Compression::Bzip2);
    }
    if header.starts_with(&XZ_MAGIC) {
        return Some(Compression::Xz);
    }
    None
}

fn classify_archive(header: &[u8]) -> Option<ArchiveFormat> {
    if header.starts_with(ZIP_LOCAL_FILE)
        || header.starts_with(ZIP_END_OF_CENTRAL_DIR)
        || header.starts_with(ZIP_SPANNED)
    {
        return Some(ArchiveFormat::Zip);
    }
    if is_tar_header(header) {
        return Some(ArchiveFormat::Tar);
    }
    None
}

fn is_tar_header(header: &[u8]) -> bool {
    if header.len() < TAR_BLOCK {
        return false;
    }
    let magic = &header[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 6];
    if magic == b"ustar\0" || magic == b"ustar " {
        return true;
    }
    // v7 headers carry no magic; accept them only when the checksum verifies.
    if header[..TAR_BLOCK].iter().all(|&b| b == 0) {
        return false;
    }
    match parse_octal(&header[TAR_CHECKSUM_OFFSET..TAR_CHECKSUM_OFFSET + TAR_CHECKSUM_LEN]) {
        Some(stored) => stored == header_checksum(&header[..TAR_BLOCK]),
        None => false,
    }
}

/// Unsigned sum of the header with the checksum field counted as spaces.
fn header_checksum(block: &[u8]) -> u64 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if (TAR_CHECKSUM_OFFSET..TAR_CHECKSUM_OFFSET + TAR_CHECKSUM_LEN).contains(&i) {
                u64::from(b' ')
            } else {
                u64::from(b)
            }
        })
        .sum()
}

fn parse_octal(field: &[u8]) -> Option<u64> {
    let digits: Vec<u8> = field
        .iter()
        .copied()
        .skip_while(|&b| b == b' ')
        .take_while(|&b| (b'0'..=b'7').contains(&b))
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits
        .iter()
        .try_fold(0u64, |acc, &d| acc.checked_mul(8)?.checked_add(u64::from(d - b'0')))
}
