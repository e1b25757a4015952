//! Shared test utilities: in-memory archive builders and license fixtures.
//!
//! Archives are assembled byte-for-byte so tests can describe hostile
//! inputs (parent-directory entries, absolute paths, links) that the `tar`
//! builder API would refuse to write.

use std::io::{Cursor, Write};

/// MIT license text with a filled-in copyright line.
pub const MIT_LICENSE: &str = include_str!("../tests/fixtures/LICENSE");

/// MIT license text in Markdown form, as shipped by the .NET packages.
pub const MIT_LICENSE_MARKDOWN: &str = include_str!("../tests/fixtures/LICENSE.md");

/// BSD 3-Clause text with bulleted clauses.
pub const BSD_3_CLAUSE_LICENSE: &str = include_str!("../tests/fixtures/LICENSE-BSD");

/// The Apache License 2.0, as shipped in a LICENSE file.
pub const APACHE_2_LICENSE: &str = include_str!("../licenses/Apache-2.0.txt");

/// An Apache-style NOTICE section, often appended to a LICENSE file.
pub const APACHE_NOTICE: &str = include_str!("../tests/fixtures/NOTICE");

/// A README that mentions a license without being one.
pub const README: &str = include_str!("../tests/fixtures/README.md");

/// A file named like a license whose text matches no template.
pub const PROPRIETARY_NOTICE: &str = include_str!("../tests/fixtures/NOT-A-LICENSE");

/// Leading bytes of a FLAC file, a format no extractor understands.
pub const FLAC_HEADER: &[u8] = b"\x66\x4C\x61\x43\x00\x00\x00\x22";

/// One entry of a fixture tar archive.
#[derive(Clone, Copy, Debug)]
pub enum FixtureEntry<'a> {
    /// A regular file with the given name and contents.
    File(&'a str, &'a [u8]),
    /// A directory entry.
    Dir(&'a str),
    /// A symbolic link pointing at the given target.
    Symlink(&'a str, &'a str),
}

/// Build an uncompressed tar archive holding regular files.
///
/// # Panics
///
/// Panics if an entry name exceeds 100 bytes.
#[must_use]
pub fn tar_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let entries: Vec<FixtureEntry<'_>> = files
        .iter()
        .map(|(name, data)| FixtureEntry::File(name, data))
        .collect();
    tar_from_entries(&entries)
}

/// Build an uncompressed tar archive from arbitrary entries.
///
/// Names are written verbatim, without the validation `tar::Builder`
/// applies, so `../escape` and `/etc/passwd` can be expressed.
///
/// # Panics
///
/// Panics if an entry name or link target exceeds 100 bytes.
#[must_use]
pub fn tar_from_entries(entries: &[FixtureEntry<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        match entry {
            FixtureEntry::File(name, data) => {
                let header = raw_header(name, tar::EntryType::Regular, data.len(), None);
                builder.append(&header, *data).expect("append file entry");
            }
            FixtureEntry::Dir(name) => {
                let header = raw_header(name, tar::EntryType::Directory, 0, None);
                builder.append(&header, std::io::empty()).expect("append dir entry");
            }
            FixtureEntry::Symlink(name, target) => {
                let header = raw_header(name, tar::EntryType::Symlink, 0, Some(target));
                builder.append(&header, std::io::empty()).expect("append symlink entry");
            }
        }
    }
    builder.into_inner().expect("finish tar archive")
}

fn raw_header(
    name: &str,
    entry_type: tar::EntryType,
    size: usize,
    link_target: Option<&str>,
) -> tar::Header {
    let mut header = tar::Header::new_gnu();
    copy_field(&mut header.as_old_mut().name, name);
    if let Some(target) = link_target {
        copy_field(&mut header.as_old_mut().linkname, target);
    }
    header.set_entry_type(entry_type);
    header.set_mode(0o755);
    header.set_size(u64::try_from(size).expect("entry size fits in u64"));
    header.set_cksum();
    header
}

fn copy_field(field: &mut [u8; 100], value: &str) {
    let bytes = value.as_bytes();
    assert!(bytes.len() <= field.len(), "tar field too long: {value}");
    field[..bytes.len()].copy_from_slice(bytes);
}

/// Gzip-compress `bytes`.
///
/// # Panics
///
/// Panics if compression fails.
#[must_use]
pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Bzip2-compress `bytes`.
///
/// # Panics
///
/// Panics if compression fails.
#[must_use]
pub fn bzip2_compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(bytes).expect("bzip2 write");
    encoder.finish().expect("bzip2 finish")
}

/// Xz-compress `bytes`.
///
/// # Panics
///
/// Panics if compression fails.
#[must_use]
pub fn xz_compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(bytes).expect("xz write");
    encoder.finish().expect("xz finish")
}

/// Zstandard-compress `bytes`.
///
/// # Panics
///
/// Panics if compression fails.
#[must_use]
pub fn zstd_compress(bytes: &[u8]) -> Vec<u8> {
    zstd::encode_all(Cursor::new(bytes), 0).expect("zstd encode")
}

/// Build a zip archive holding regular files.
///
/// # Panics
///
/// Panics if the zip writer fails.
#[must_use]
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in files {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(data).expect("write zip entry");
    }
    writer.finish().expect("finish zip archive").into_inner()
}

/// Build a gem-style artefact: an outer tar holding `data.tar.gz`.
#[must_use]
pub fn gem_archive(inner: &[u8]) -> Vec<u8> {
    tar_archive(&[("metadata.gz", b"not scanned"), ("data.tar.gz", inner)])
}
