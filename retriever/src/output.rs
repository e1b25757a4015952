//! Output formatting for the `get-licenses` CLI.
//!
//! The default output is the CI step-output line consumed by workflow
//! automation, followed by a human confirmation. `--json` swaps both for a
//! machine-readable report.

use crate::retriever::LicenseReport;
use std::io::Write;

/// Confirmation printed after a completed lookup.
pub const SUCCESS_MESSAGE: &str = "Licenses found!";

/// Format the CI output line, e.g. `::set-output name=licenses::[MIT MIT-0]`.
///
/// # Examples
///
/// ```
/// use license_retriever::output::set_output_line;
///
/// let licenses = vec!["MIT".to_owned(), "MIT-0".to_owned()];
/// assert_eq!(
///     set_output_line(&licenses),
///     "::set-output name=licenses::[MIT MIT-0]"
/// );
/// assert_eq!(set_output_line(&[]), "::set-output name=licenses::[]");
/// ```
#[must_use]
pub fn set_output_line(licenses: &[String]) -> String {
    format!("::set-output name=licenses::[{}]", licenses.join(" "))
}

/// Lines explaining that a dependency was skipped.
#[must_use]
pub fn skip_notice(dependency: &str) -> [String; 2] {
    [
        format!("Skipping license retrieval for {dependency}"),
        "License is not automatically retrievable and may need to be looked up manually"
            .to_owned(),
    ]
}

/// Write the plain-text report to `out`.
///
/// # Errors
///
/// Returns any error raised by `out`.
pub fn write_report(report: &LicenseReport, out: &mut dyn Write) -> std::io::Result<()> {
    if report.is_skipped() {
        for line in skip_notice(&report.dependency) {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{}", set_output_line(&report.licenses))?;
        return Ok(());
    }
    writeln!(out, "{}", set_output_line(&report.licenses))?;
    writeln!(out, "{SUCCESS_MESSAGE}")
}

/// Write the report to `out` as pretty-printed JSON.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] when serialisation or writing fails.
pub fn write_json_report(report: &LicenseReport, out: &mut dyn Write) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out).map_err(serde_json::Error::io)
}
