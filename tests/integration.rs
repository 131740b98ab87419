use flate2::Compression;
use flate2::write::GzEncoder;
use nestcat::{Document, NestcatBuilder, NestcatError, NestcatOptions, Visitor, VisitSummary, visit};
use std::error::Error;
use std::fs;
use std::io::{BufRead, Cursor, Write};
use std::path::Path;
use tempfile::tempdir;

#[derive(Debug, PartialEq)]
struct Seen {
    source: String,
    entry: Option<String>,
    text: String,
}

fn collect(options: NestcatOptions) -> (Vec<Seen>, VisitSummary) {
    let mut seen = Vec::new();
    let summary = visit(options, |document: &mut Document| {
        let origin = document.origin().clone();
        let mut lines = Vec::new();
        for line in document.lines() {
            lines.push(line?);
        }
        seen.push(Seen {
            source: origin
                .source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            entry: origin.entry,
            text: lines.join("\n"),
        });
        Ok::<(), Box<dyn Error>>(())
    })
    .unwrap();
    (seen, summary)
}

fn entries(seen: &[Seen]) -> Vec<String> {
    seen.iter()
        .map(|s| match &s.entry {
            Some(entry) => format!("{}:{}", s.source, entry),
            None => s.source.clone(),
        })
        .collect()
}

fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn bzip2_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn xz_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Deterministic bytes that do not compress.
fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9e37_79b9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        })
        .collect()
}

fn write(path: &Path, bytes: &[u8]) {
    fs::write(path, bytes).unwrap();
}

#[test]
fn tar_entries_are_sorted_by_name() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("snapshot.tar");
    write(
        &archive,
        &tar_bytes(&[("b.txt", &b"second"[..]), ("a.txt", &b"first"[..])]),
    );
    let (seen, summary) = collect(NestcatBuilder::new(&archive).build());
    assert_eq!(entries(&seen), vec!["snapshot.tar:a.txt", "snapshot.tar:b.txt"]);
    assert_eq!(seen[0].text, "first");
    assert_eq!(summary.delivered, 2);
}

#[test]
fn zip_entries_are_sorted_by_name() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("snapshot.zip");
    write(
        &archive,
        &zip_bytes(&[("B.txt", &b"bee"[..]), ("a.txt", &b"ay"[..]), ("c.txt", &b"see"[..])]),
    );
    let (seen, _) = collect(NestcatBuilder::new(&archive).build());
    assert_eq!(
        entries(&seen),
        vec!["snapshot.zip:a.txt", "snapshot.zip:B.txt", "snapshot.zip:c.txt"]
    );
}

#[test]
fn detection_ignores_extensions() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("looks-plain.txt"),
        &gzip_bytes(&tar_bytes(&[("inner.dat", &b"payload"[..])])),
    );
    write(&dir.path().join("looks-packed.tar.gz"), b"just text");
    let (seen, _) = collect(NestcatBuilder::new(dir.path()).build());
    assert_eq!(
        entries(&seen),
        vec!["looks-packed.tar.gz", "looks-plain.txt:inner.dat"]
    );
    assert_eq!(seen[0].text, "just text");
    assert_eq!(seen[1].text, "payload");
}

#[test]
fn gzip_plain_file_is_one_document() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("status.txt.gz");
    write(&file, &gzip_bytes(b"line one\nline two\n"));
    let (seen, _) = collect(NestcatBuilder::new(&file).build());
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].entry, None);
    assert_eq!(seen[0].text, "line one\nline two");
}

#[test]
fn padded_gzip_is_one_document() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dump.gz");
    let mut packed = gzip_bytes(b"hello");
    packed.extend([0u8; 512]);
    write(&file, &packed);
    let (seen, summary) = collect(NestcatBuilder::new(&file).build());
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].text, "hello");
    assert_eq!(summary.failed, 0);
}

#[test]
fn bzip2_tarball_is_unpacked() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("logs.tar.bz2");
    write(
        &file,
        &bzip2_bytes(&tar_bytes(&[("z.log", &b"last"[..]), ("a.log", &b"first"[..])])),
    );
    let (seen, _) = collect(NestcatBuilder::new(&file).build());
    assert_eq!(entries(&seen), vec!["logs.tar.bz2:a.log", "logs.tar.bz2:z.log"]);
    assert_eq!(seen[0].text, "first");
}

#[test]
fn xz_file_is_one_document() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.xz");
    write(&file, &xz_bytes(b"compressed notes\n"));
    let (seen, _) = collect(NestcatBuilder::new(&file).build());
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].entry, None);
    assert_eq!(seen[0].text, "compressed notes");
}

#[test]
fn zip_over_container_limit_is_skipped() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("big.zip"),
        &zip_bytes(&[("a.txt", &noise(8 * 1024)[..])]),
    );
    write(&dir.path().join("small.txt"), b"small");
    let options = NestcatBuilder::new(dir.path())
        .container_size_limit(Some(1024))
        .build();
    let (seen, summary) = collect(options);
    assert_eq!(entries(&seen), vec!["small.txt"]);
    assert_eq!(summary.failed, 1);
}

#[test]
fn gzipped_zip_is_unpacked() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("bundle");
    write(&file, &gzip_bytes(&zip_bytes(&[("x.txt", &b"zipped"[..])])));
    let (seen, _) = collect(NestcatBuilder::new(&file).build());
    assert_eq!(entries(&seen), vec!["bundle:x.txt"]);
    assert_eq!(seen[0].text, "zipped");
}

#[test]
fn directory_mixes_files_and_archives_without_interleaving() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("B.tar"),
        &tar_bytes(&[("z.txt", &b"bz"[..]), ("y.txt", &b"by"[..])]),
    );
    write(
        &dir.path().join("a.zip"),
        &zip_bytes(&[("y.txt", &b"ay"[..]), ("x.txt", &b"ax"[..])]),
    );
    fs::create_dir(dir.path().join("sub")).unwrap();
    write(&dir.path().join("sub").join("c.txt"), b"plain");
    let (seen, summary) = collect(NestcatBuilder::new(dir.path()).build());
    assert_eq!(
        entries(&seen),
        vec!["a.zip:x.txt", "a.zip:y.txt", "B.tar:y.txt", "B.tar:z.txt", "c.txt"]
    );
    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.delivered, 5);
}

#[test]
fn filter_applies_to_entry_names() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.tar");
    write(
        &archive,
        &tar_bytes(&[("keep.txt", &b"k"[..]), ("drop.bin", &b"d"[..])]),
    );
    let options = NestcatBuilder::new(dir.path())
        .filter(r".*\.(tar|txt)")
        .build();
    let (seen, summary) = collect(options);
    assert_eq!(entries(&seen), vec!["data.tar:keep.txt"]);
    assert_eq!(summary.filtered, 1);
}

#[test]
fn corrupt_zip_entry_is_skipped() {
    let dir = tempdir().unwrap();
    let mut bytes = zip_bytes(&[
        ("a.txt", &b"alpha"[..]),
        ("b.txt", &b"CORRUPTED-PAYLOAD"[..]),
        ("c.txt", &b"gamma"[..]),
    ]);
    let at = bytes
        .windows(b"CORRUPTED".len())
        .position(|w| w == b"CORRUPTED")
        .unwrap();
    bytes[at] = b'X';
    let archive = dir.path().join("broken.zip");
    write(&archive, &bytes);
    let (seen, summary) = collect(NestcatBuilder::new(&archive).build());
    assert_eq!(entries(&seen), vec!["broken.zip:a.txt", "broken.zip:c.txt"]);
    assert_eq!(summary.failed, 1);
}

#[test]
fn truncated_archive_keeps_readable_entries_and_run_continues() {
    let dir = tempdir().unwrap();
    let tarball = tar_bytes(&[("a.txt", &b"early"[..]), ("b.dat", &noise(64 * 1024)[..])]);
    let mut packed = gzip_bytes(&tarball);
    let cut = packed.len() - 16 * 1024;
    packed.truncate(cut);
    write(&dir.path().join("archive.tar.gz"), &packed);
    write(&dir.path().join("zz.txt"), b"after");
    let (seen, summary) = collect(NestcatBuilder::new(dir.path()).build());
    assert_eq!(entries(&seen), vec!["archive.tar.gz:a.txt", "zz.txt"]);
    assert_eq!(summary.failed, 1);
}

#[test]
fn corrupt_gzip_file_is_skipped() {
    let dir = tempdir().unwrap();
    let mut packed = gzip_bytes(&b"a line that repeats\n".repeat(500));
    let cut = packed.len() / 2;
    packed.truncate(cut);
    write(&dir.path().join("a-broken.gz"), &packed);
    write(&dir.path().join("b-fine.txt"), b"fine");
    let (seen, summary) = collect(NestcatBuilder::new(dir.path()).build());
    assert_eq!(entries(&seen), vec!["b-fine.txt"]);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.candidates, 2);
}

#[test]
fn latin1_content_inside_archive() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("names.zip");
    write(&archive, &zip_bytes(&[("übersicht.txt", &b"Gr\xfc\xdfe"[..])]));
    let (seen, _) = collect(NestcatBuilder::new(&archive).build());
    assert_eq!(seen[0].entry.as_deref(), Some("übersicht.txt"));
    assert_eq!(seen[0].text, "Grüße");
}

#[test]
fn empty_zip_yields_nothing() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("empty.zip");
    write(&archive, &zip_bytes(&[]));
    let (seen, summary) = collect(NestcatBuilder::new(&archive).build());
    assert!(seen.is_empty());
    assert_eq!(summary.failed, 0);
}

#[test]
fn consumer_error_aborts_run() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        write(&dir.path().join(name), name.as_bytes());
    }
    let mut visitor = Visitor::new(NestcatBuilder::new(dir.path()).build()).unwrap();
    let mut calls = 0;
    let result = visitor.visit(|document| {
        calls += 1;
        if document.display_name() == "b.txt" {
            return Err("stop");
        }
        Ok(())
    });
    assert_eq!(result, Err("stop"));
    assert_eq!(calls, 2);
    assert_eq!(visitor.delivered(), 1);
}

#[test]
fn config_error_surfaces_through_visit() {
    let dir = tempdir().unwrap();
    let options = NestcatBuilder::new(dir.path().join("nope")).build();
    let result = visit(options, |_| Ok::<(), NestcatError>(()));
    assert!(matches!(result, Err(NestcatError::InvalidPath(_))));
}
