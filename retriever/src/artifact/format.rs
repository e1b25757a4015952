//! Container format detection from leading bytes.
//!
//! Upstream URLs do not reliably end in an extension that matches their
//! content (`.gem` files are tarballs, some release endpoints serve
//! tarballs without any extension), so the format is sniffed from the
//! stream itself.

use std::fmt;

/// Number of bytes needed to recognise every supported format.
pub const SNIFF_LEN: usize = 512;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const USTAR_MAGIC: &[u8] = b"ustar";
const USTAR_OFFSET: usize = 257;

/// Archive container formats the extractor understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Uncompressed POSIX or GNU tar.
    Tar,
    /// Gzip-compressed tar.
    Gzip,
    /// Bzip2-compressed tar.
    Bzip2,
    /// Xz-compressed tar.
    Xz,
    /// Zstandard-compressed tar.
    Zstd,
    /// Zip archive.
    Zip,
}

impl ArchiveFormat {
    /// Identify the format from the first bytes of a stream.
    ///
    /// `head` should hold up to [`SNIFF_LEN`] bytes; shorter inputs are
    /// accepted and simply cannot match the tar signature.
    ///
    /// # Examples
    ///
    /// ```
    /// use license_retriever::artifact::format::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::detect(&[0x1f, 0x8b, 0x08]), Some(ArchiveFormat::Gzip));
    /// assert_eq!(ArchiveFormat::detect(b"fLaC\x00\x00\x00\x22"), None);
    /// ```
    #[must_use]
    pub fn detect(head: &[u8]) -> Option<Self> {
        if head.starts_with(GZIP_MAGIC) {
            return Some(Self::Gzip);
        }
        if is_bzip2(head) {
            return Some(Self::Bzip2);
        }
        if head.starts_with(XZ_MAGIC) {
            return Some(Self::Xz);
        }
        if head.starts_with(ZSTD_MAGIC) {
            return Some(Self::Zstd);
        }
        if head.starts_with(ZIP_MAGIC) || head.starts_with(ZIP_EMPTY_MAGIC) {
            return Some(Self::Zip);
        }
        if is_tar(head) {
            return Some(Self::Tar);
        }
        None
    }
}

/// `BZh` followed by the block size digit `1` to `9`.
fn is_bzip2(head: &[u8]) -> bool {
    head.starts_with(BZIP2_MAGIC)
        && head
            .get(BZIP2_MAGIC.len())
            .is_some_and(|level| (b'1'..=b'9').contains(level))
}

/// A ustar header, or the all-zero end-of-archive block of an empty tar.
fn is_tar(head: &[u8]) -> bool {
    let has_magic = head
        .get(USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len())
        .is_some_and(|magic| magic == USTAR_MAGIC);
    let is_empty_archive = head
        .get(..SNIFF_LEN)
        .is_some_and(|block| block.iter().all(|byte| *byte == 0));
    has_magic || is_empty_archive
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tar => "tar",
            Self::Gzip => "tar+gzip",
            Self::Bzip2 => "tar+bzip2",
            Self::Xz => "tar+xz",
            Self::Zstd => "tar+zstd",
            Self::Zip => "zip",
        };
        f.write_str(name)
    }
}

/// Render the leading bytes of an unrecognised stream for error messages.
#[must_use]
pub fn describe_signature(head: &[u8]) -> String {
    if head.is_empty() {
        return "empty stream".to_owned();
    }
    let shown: Vec<String> = head
        .iter()
        .take(8)
        .map(|byte| format!("{byte:02x}"))
        .collect();
    format!("leading bytes {}", shown.join(" "))
}
