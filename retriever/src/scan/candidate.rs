//! File-name rules deciding which files are read as license candidates.

/// Words that mark a file name as license-bearing.
const LICENSE_WORDS: &[&str] = &[
    "license",
    "licence",
    "licenses",
    "licences",
    "copying",
    "copyright",
    "unlicense",
];

/// Extensions of source, data, document and binary files that are never
/// candidates, even when the stem mentions a license (`license.go`,
/// `licenses.json`, `LICENSE.pdf`).
const EXCLUDED_EXTENSIONS: &[&str] = &[
    // source and markup
    "c", "cc", "class", "cpp", "cs", "css", "erb", "gemspec", "go", "h", "htm", "html", "java",
    "js", "json", "php", "py", "rb", "rs", "sh", "svg", "tmpl", "toml", "ts", "xml", "yaml", "yml",
    // documents
    "doc", "docx", "odt", "pdf", "rtf",
    // images
    "bmp", "gif", "ico", "jpeg", "jpg", "png", "webp",
    // archives and compressed files
    "7z", "bz2", "gz", "jar", "tar", "tgz", "xz", "zip", "zst",
    // binaries
    "a", "bin", "dll", "dylib", "exe", "o", "so",
];

/// Directories never descended into while scanning.
pub const SKIPPED_DIRECTORIES: &[&str] = &[".git", ".hg", ".svn"];

/// Whether a file called `file_name` may contain license text.
///
/// # Examples
///
/// ```
/// use license_retriever::scan::candidate::is_license_candidate;
///
/// assert!(is_license_candidate("LICENSE-MIT"));
/// assert!(is_license_candidate("COPYING.LIB"));
/// assert!(!is_license_candidate("README.md"));
/// assert!(!is_license_candidate("license.go"));
/// ```
#[must_use]
pub fn is_license_candidate(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    if let Some((_, extension)) = lower.rsplit_once('.') {
        if EXCLUDED_EXTENSIONS.contains(&extension) {
            return false;
        }
    }
    lower
        .split(['-', '_', '.'])
        .any(|part| LICENSE_WORDS.contains(&part))
}
