//! Tests for directory scanning.

use super::*;
use crate::test_utils::{
    APACHE_2_LICENSE, APACHE_NOTICE, BSD_3_CLAUSE_LICENSE, MIT_LICENSE, PROPRIETARY_NOTICE, README,
};
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

#[fixture]
fn tree() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[fixture]
fn scanner() -> LicenseScanner {
    LicenseScanner::new(&ScanConfig::default())
}

fn write(dir: &TempDir, relative: &str, contents: impl AsRef<[u8]>) {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

fn ids(findings: &Findings) -> Vec<&str> {
    findings.keys().map(String::as_str).collect()
}

#[rstest]
fn finds_license_at_root(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "LICENSE", MIT_LICENSE);
    write(&tree, "README.md", README);

    let findings = scanner.scan(tree.path()).expect("scan");

    assert_eq!(ids(&findings), vec!["MIT", "MIT-0"]);
}

#[rstest]
fn finds_licenses_in_nested_directories(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "vendor/bsd/LICENSE-BSD", BSD_3_CLAUSE_LICENSE);
    write(&tree, "docs/licenses/COPYING", MIT_LICENSE);

    let findings = scanner.scan(tree.path()).expect("scan");

    assert!(findings.contains_key("BSD-3-Clause"));
    assert!(findings.contains_key("MIT"));
}

#[rstest]
fn keeps_highest_confidence_per_identifier(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "LICENSE", MIT_LICENSE);
    write(&tree, "sub/LICENSE.txt", MIT_LICENSE);

    let findings = scanner.scan(tree.path()).expect("scan");

    assert_eq!(findings.len(), 2);
    assert!(findings["MIT"] > 0.95);
}

#[rstest]
fn file_holding_two_licenses_reports_both(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "LICENSE", format!("{MIT_LICENSE}\n\n{BSD_3_CLAUSE_LICENSE}"));

    let findings = scanner.scan(tree.path()).expect("scan");

    assert!(findings.contains_key("MIT"), "found {:?}", ids(&findings));
    assert!(findings.contains_key("BSD-3-Clause"), "found {:?}", ids(&findings));
}

#[rstest]
fn apache_license_with_appended_notice(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "LICENSE", format!("{APACHE_2_LICENSE}\n\n{APACHE_NOTICE}"));

    let findings = scanner.scan(tree.path()).expect("scan");

    assert_eq!(ids(&findings), vec!["Apache-2.0"]);
}

#[rstest]
fn dual_license_files_are_merged(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "LICENSE-MIT", MIT_LICENSE);
    write(&tree, "LICENSE-APACHE", APACHE_2_LICENSE);

    let findings = scanner.scan(tree.path()).expect("scan");

    assert_eq!(ids(&findings), vec!["Apache-2.0", "MIT", "MIT-0"]);
}

#[rstest]
fn spdx_tagged_license_file_is_recognised(tree: TempDir, scanner: LicenseScanner) {
    write(
        &tree,
        "LICENSE.txt",
        "SPDX-License-Identifier: GPL-2.0-only\n\nSee COPYING for the full text.\n",
    );

    let findings = scanner.scan(tree.path()).expect("scan");

    assert_eq!(ids(&findings), vec!["GPL-2.0-only"]);
}

#[rstest]
fn binary_license_documents_are_not_read(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "LICENSE", MIT_LICENSE);
    write(&tree, "doc/LICENSE.pdf", b"%PDF-1.7\n\xFF\xFE\x00binary");
    write(&tree, "COPYING.gz", b"\x1f\x8b\x08\x00\xFF\xFE");

    let findings = scanner.scan(tree.path()).expect("scan");

    assert!(findings.contains_key("MIT"));
}

#[rstest]
fn empty_tree_has_no_license(tree: TempDir, scanner: LicenseScanner) {
    let result = scanner.scan(tree.path());

    assert!(matches!(result, Err(ScanError::NoLicenseFound)));
}

#[rstest]
fn unmatched_candidates_yield_no_license(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "NOT-A-LICENSE", PROPRIETARY_NOTICE);
    write(&tree, "README.md", README);

    let result = scanner.scan(tree.path());

    assert!(matches!(result, Err(ScanError::NoLicenseFound)));
}

#[rstest]
fn license_text_in_non_candidate_files_is_ignored(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "src/header.go", MIT_LICENSE);

    assert!(matches!(
        scanner.scan(tree.path()),
        Err(ScanError::NoLicenseFound)
    ));
}

#[rstest]
fn version_control_directories_are_skipped(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, ".git/LICENSE", MIT_LICENSE);

    assert!(matches!(
        scanner.scan(tree.path()),
        Err(ScanError::NoLicenseFound)
    ));
}

#[rstest]
fn byte_order_mark_is_ignored(tree: TempDir, scanner: LicenseScanner) {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(MIT_LICENSE.as_bytes());
    write(&tree, "LICENSE", bytes);

    let findings = scanner.scan(tree.path()).expect("scan");

    assert!(findings.contains_key("MIT"));
}

#[rstest]
fn invalid_utf8_candidate_is_an_error(tree: TempDir, scanner: LicenseScanner) {
    write(&tree, "LICENSE", b"\xFF\xFE\x00 not text");

    let result = scanner.scan(tree.path());

    assert!(matches!(result, Err(ScanError::Encoding { .. })));
}

#[rstest]
fn oversized_candidates_are_skipped(tree: TempDir) {
    let scanner = LicenseScanner::new(&ScanConfig {
        max_file_size: 64,
        ..ScanConfig::default()
    });
    write(&tree, "LICENSE", MIT_LICENSE);

    assert!(matches!(
        scanner.scan(tree.path()),
        Err(ScanError::NoLicenseFound)
    ));
}

#[rstest]
fn missing_root_is_a_walk_error(scanner: LicenseScanner) {
    let result = scanner.scan(Path::new("/definitely/not/a/tree"));

    assert!(matches!(result, Err(ScanError::Walk { .. })));
}

#[test]
fn no_license_message_matches_cli_wording() {
    assert_eq!(ScanError::NoLicenseFound.to_string(), "no license file was found");
}
