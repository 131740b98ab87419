//! Fixed character encodings.
//!
//! Document payloads are read as ISO-8859-1 while archive metadata (entry
//! names) is read as UTF-8. Neither is auto-detected.

use encoding_rs::{Encoding, UTF_8};

/// Name of the encoding applied to file and archive-entry content.
pub const FILE_ENCODING: &str = "ISO-8859-1";

/// Encoding applied to archive entry names.
pub static ARCHIVE_NAME_ENCODING: &Encoding = UTF_8;

/// Decodes document bytes; every byte maps to exactly one code point.
pub fn decode_file_bytes(bytes: &[u8]) -> String {
    encoding_rs::mem::decode_latin1(bytes).into_owned()
}

/// Decodes a raw archive entry name, replacing malformed sequences.
pub fn decode_entry_name(raw: &[u8]) -> String {
    let (name, _, _) = ARCHIVE_NAME_ENCODING.decode(raw);
    name.into_owned()
}
