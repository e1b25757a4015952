//! Explicit license markers: SPDX tags and well-known license titles.
//!
//! Markers identify licenses that have no embedded template (the GNU
//! family, MPL, PSF, Ruby and others) and short notices that only name a
//! license instead of reproducing it.

use aho_corasick::AhoCorasick;
use log::warn;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const SPDX_TAG: &str = "SPDX-License-Identifier:";

/// Normalised title phrases and the SPDX identifier each one names.
///
/// Phrases are written in normalised word form, joined by single spaces.
const TITLE_PHRASES: &[(&str, &str)] = &[
    ("apache license version 2 0", "Apache-2.0"),
    ("artistic license 2 0", "Artistic-2.0"),
    ("boost software license version 1 0", "BSL-1.0"),
    ("common development and distribution license cddl version 1 0", "CDDL-1.0"),
    ("eclipse public license v 1 0", "EPL-1.0"),
    ("eclipse public license v 2 0", "EPL-2.0"),
    ("gnu affero general public license version 3", "AGPL-3.0"),
    ("gnu general public license version 2", "GPL-2.0"),
    ("gnu general public license version 3", "GPL-3.0"),
    ("gnu lesser general public license version 2 1", "LGPL-2.1"),
    ("gnu lesser general public license version 3", "LGPL-3.0"),
    ("gnu library general public license version 2", "LGPL-2.0"),
    ("mozilla public license version 1 1", "MPL-1.1"),
    ("mozilla public license version 2 0", "MPL-2.0"),
    ("python software foundation license version 2", "PSF-2.0"),
    ("ruby is copyrighted free software by yukihiro matsumoto", "Ruby"),
    ("the php license version 3 0", "PHP-3.0"),
    ("the php license version 3 01", "PHP-3.01"),
];

/// Identifiers declared by `SPDX-License-Identifier:` lines in `text`.
///
/// License expressions are split into their identifiers; `AND`, `OR` and
/// `WITH` operators and the exception named after `WITH` are dropped.
///
/// # Examples
///
/// ```
/// use license_retriever::scan::markers::spdx_tags;
///
/// let tags = spdx_tags("// SPDX-License-Identifier: MIT OR Apache-2.0");
/// assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["Apache-2.0", "MIT"]);
/// ```
#[must_use]
pub fn spdx_tags(text: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    for line in text.lines() {
        let Some((_, expression)) = line.split_once(SPDX_TAG) else {
            continue;
        };
        let expression = expression
            .trim()
            .trim_end_matches("-->")
            .trim_end_matches("*/");
        let mut after_with = false;
        for token in expression.split(|c: char| c.is_whitespace() || c == '(' || c == ')') {
            if token.is_empty() {
                continue;
            }
            if after_with {
                after_with = false;
                continue;
            }
            match token.to_ascii_uppercase().as_str() {
                "AND" | "OR" => {}
                "WITH" => after_with = true,
                _ if is_identifier(token) => {
                    tags.insert(token.to_owned());
                }
                _ => {}
            }
        }
    }
    tags
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'))
}

/// Identifiers whose title phrase appears in the normalised `words`.
#[must_use]
pub fn title_matches(words: &[String]) -> BTreeSet<&'static str> {
    let Some(matcher) = title_matcher() else {
        return BTreeSet::new();
    };
    // Spaces on both sides make every phrase match whole words only.
    let haystack = format!(" {} ", words.join(" "));
    matcher
        .find_overlapping_iter(&haystack)
        .filter_map(|found| TITLE_PHRASES.get(found.pattern().as_usize()))
        .map(|&(_, identifier)| identifier)
        .collect()
}

fn title_matcher() -> Option<&'static AhoCorasick> {
    static MATCHER: OnceLock<Option<AhoCorasick>> = OnceLock::new();
    MATCHER
        .get_or_init(|| {
            let patterns = TITLE_PHRASES
                .iter()
                .map(|(phrase, _)| format!(" {phrase} "));
            AhoCorasick::new(patterns)
                .inspect_err(|err| warn!("license title matcher unavailable: {err}"))
                .ok()
        })
        .as_ref()
}
