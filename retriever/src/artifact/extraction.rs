//! Archive extraction with leading-component stripping.
//!
//! Unpacks tar (plain, or gzip, bzip2, xz or zstd compressed) and zip streams into a
//! destination directory. Each entry loses its first `strip_components`
//! path segments; entries left with nothing are skipped. Entries that would
//! land outside the destination are rejected to prevent zip-slip.

use super::format::{ArchiveFormat, SNIFF_LEN, describe_signature};
use log::{debug, warn};
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Trait for extracting archive files, enabling test mocking.
///
/// # Examples
///
/// ```
/// use license_retriever::artifact::extraction::SniffingExtractor;
///
/// let extractor = SniffingExtractor;
/// // Use extractor.extract(archive_path, dest_dir, 1) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`, discarding
    /// `strip_components` leading path segments from every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsupportedFormat`] when the file is not a
    /// recognised archive, [`ExtractError::PathTraversal`] when an entry
    /// escapes `dest_dir`, and [`ExtractError::Io`] or
    /// [`ExtractError::Zip`] for read and write failures.
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        strip_components: usize,
    ) -> Result<(), ExtractError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// I/O error while reading the archive or writing entries.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with a known archive signature.
    #[error("unsupported archive format ({signature})")]
    UnsupportedFormat {
        /// Description of the leading bytes that were seen.
        signature: String,
    },

    /// An entry attempts to escape the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The zip central directory or an entry is malformed.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Default extractor that sniffs the container format from the file.
pub struct SniffingExtractor;

impl ArchiveExtractor for SniffingExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        strip_components: usize,
    ) -> Result<(), ExtractError> {
        let file = fs::File::open(archive_path)?;
        extract(file, dest_dir, strip_components)
    }
}

/// Decompress and unpack `source` into `dest_dir`.
///
/// The container format is detected from the first bytes of the stream.
///
/// # Errors
///
/// See [`ArchiveExtractor::extract`].
pub fn extract<R: Read>(
    mut source: R,
    dest_dir: &Path,
    strip_components: usize,
) -> Result<(), ExtractError> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    source
        .by_ref()
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    let Some(format) = ArchiveFormat::detect(&head) else {
        return Err(ExtractError::UnsupportedFormat {
            signature: describe_signature(&head),
        });
    };
    debug!("detected {format} archive, stripping {strip_components} component(s)");

    let stream = Cursor::new(head).chain(source);
    match format {
        ArchiveFormat::Tar => unpack_tar(stream, dest_dir, strip_components),
        ArchiveFormat::Gzip => {
            unpack_tar(
                flate2::read::MultiGzDecoder::new(stream),
                dest_dir,
                strip_components,
            )
        }
        ArchiveFormat::Bzip2 => unpack_tar(
            bzip2::read::MultiBzDecoder::new(stream),
            dest_dir,
            strip_components,
        ),
        ArchiveFormat::Xz => unpack_tar(
            xz2::read::XzDecoder::new_multi_decoder(stream),
            dest_dir,
            strip_components,
        ),
        ArchiveFormat::Zstd => {
            unpack_tar(zstd::Decoder::new(stream)?, dest_dir, strip_components)
        }
        ArchiveFormat::Zip => unpack_zip(stream, dest_dir, strip_components),
    }
}

fn unpack_tar<R: Read>(
    reader: R,
    dest_dir: &Path,
    strip_components: usize,
) -> Result<(), ExtractError> {
    let mut archive = tar::Archive::new(reader);
    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();
        let Some(relative) = strip_entry_path(&entry_path, strip_components)? else {
            continue;
        };
        let dest_path = dest_dir.join(&relative);

        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() {
            fs::create_dir_all(&dest_path)?;
        } else if entry_type.is_file() || entry_type.is_contiguous() {
            create_parent(&dest_path)?;
            entry.unpack(&dest_path)?;
        } else if entry_type.is_symlink() || entry_type.is_hard_link() {
            warn!("skipping link entry {}", entry_path.display());
        } else {
            debug!(
                "skipping {:?} entry {}",
                entry_type,
                entry_path.display()
            );
        }
    }
    Ok(())
}

fn unpack_zip<R: Read>(
    mut reader: R,
    dest_dir: &Path,
    strip_components: usize,
) -> Result<(), ExtractError> {
    // The zip central directory sits at the end of the file, so the
    // stream has to be buffered before it can be read.
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let entry_path = PathBuf::from(file.name());
        let Some(relative) = strip_entry_path(&entry_path, strip_components)? else {
            continue;
        };
        let dest_path = dest_dir.join(&relative);

        if file.is_dir() {
            fs::create_dir_all(&dest_path)?;
        } else if file.unix_mode().is_some_and(is_symlink_mode) {
            warn!("skipping link entry {}", entry_path.display());
        } else {
            create_parent(&dest_path)?;
            let mut out = fs::File::create(&dest_path)?;
            io::copy(&mut file, &mut out)?;
        }
    }
    Ok(())
}

const fn is_symlink_mode(mode: u32) -> bool {
    mode & 0o170_000 == 0o120_000
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

/// Drop the first `strip_components` components of `path`.
///
/// Returns `Ok(None)` when nothing remains, which is how the wrapping
/// top-level directory itself is discarded.
fn strip_entry_path(path: &Path, strip_components: usize) -> Result<Option<PathBuf>, ExtractError> {
    let remaining: PathBuf = path
        .components()
        .skip(strip_components)
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if remaining.as_os_str().is_empty() {
        debug!("skipping entry {} after stripping", path.display());
        return Ok(None);
    }
    validate_entry_path(&remaining)?;
    Ok(Some(remaining))
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractError> {
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(ExtractError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
