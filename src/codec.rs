//! Decompression layer chosen by [`detect_compression`](crate::sniff::detect_compression).

use crate::sniff::{Compression, GZIP_MAGIC, PeekReader};
use bzip2::read::MultiBzDecoder;
use flate2::bufread::GzDecoder;
use std::io::{self, Read};
use xz2::read::XzDecoder;

/// Wraps `reader` so reads yield decompressed bytes; without a codec the
/// reader is returned as is.
pub fn wrap<'a, R: Read + 'a>(reader: R, codec: Option<Compression>) -> Box<dyn Read + 'a> {
    match codec {
        None => Box::new(reader),
        Some(Compression::Gzip) => Box::new(GzipMembers::new(reader)),
        Some(Compression::Bzip2) => Box::new(MultiBzDecoder::new(reader)),
        Some(Compression::Xz) => Box::new(XzDecoder::new(reader)),
    }
}

/// Decodes consecutive gzip members.
///
/// The stream ends at the first member boundary not followed by gzip magic,
/// so block padding after the last member is ignored.
struct GzipMembers<R: Read> {
    decoder: Option<GzDecoder<PeekReader<R>>>,
}

impl<R: Read> GzipMembers<R> {
    fn new(reader: R) -> Self {
        Self {
            decoder: Some(GzDecoder::new(PeekReader::new(reader))),
        }
    }
}

impl<R: Read> Read for GzipMembers<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let Some(decoder) = self.decoder.as_mut() else {
                return Ok(0);
            };
            let n = decoder.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            let Some(finished) = self.decoder.take() else {
                return Ok(0);
            };
            let mut rest = finished.into_inner();
            if !rest.peek(GZIP_MAGIC.len())?.starts_with(&GZIP_MAGIC) {
                return Ok(0);
            }
            self.decoder = Some(GzDecoder::new(rest));
        }
    }
}
