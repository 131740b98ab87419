//! # Nestcat
//!
//! `nestcat` walks a single file, a single archive, or a directory tree mixing
//! both, and hands every text document it finds to a caller-supplied consumer,
//! however deeply that document is nested inside compression and archive layers.
//!
//! Codecs and containers are recognised by content, never by file extension.
//! Gzip, bzip2 and xz streams are decompressed transparently; ZIP and TAR
//! containers are opened and their members delivered one by one. Files are
//! visited in case-insensitive name order, and so are the members of each
//! archive.
//!
//! A file that cannot be opened or decoded is logged and skipped; the run goes
//! on with the next one. Only the consumer can abort a run, by returning an error.
//!
//! # Logging
//!
//! Diagnostics go through [`tracing`]: filter decisions at `trace`, files and
//! detected formats at `debug`, progress at `info`, skipped archive entries at
//! `warn` and skipped files at `error`.
//!
//! # Example
//!
//! ```no_run
//! use nestcat::{NestcatBuilder, Visitor};
//! use std::io::BufRead;
//!
//! let options = NestcatBuilder::new("data/")
//!     .filter(r".*\.(txt|tar\.gz)")
//!     .report_interval(1000)
//!     .build();
//!
//! let mut visitor = Visitor::new(options).expect("invalid configuration");
//! let summary = visitor
//!     .visit(|document| {
//!         let origin = document.origin().to_string();
//!         let lines = document.lines().count();
//!         println!("{}: {} lines", origin, lines);
//!         Ok::<_, std::io::Error>(())
//!     })
//!     .expect("consumer failed");
//!
//! println!("{} documents, {} failures", summary.delivered, summary.failed);
//! ```

mod archive;
mod codec;
mod engine;
mod error;
mod filter;
mod options;
mod order;
pub mod output;
mod sniff;
mod text;
mod types;
mod walk;

pub use archive::{ArchiveEntry, for_each_entry, read_declared};
pub use codec::wrap as wrap_codec;
pub use engine::{Visitor, visit};
pub use error::NestcatError;
pub use filter::NameFilter;
pub use options::{MATCH_ALL, NestcatBuilder, NestcatOptions};
pub use order::{compare_names, sort_by_name};
pub use sniff::{
    ArchiveFormat, Compression, PeekReader, SIGNATURE_WINDOW, detect_archive, detect_compression,
};
pub use text::{ARCHIVE_NAME_ENCODING, FILE_ENCODING, decode_entry_name, decode_file_bytes};
pub use types::{CandidateFile, Document, DocumentOrigin, VisitSummary};
