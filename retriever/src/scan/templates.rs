//! Embedded corpus of canonical license texts.
//!
//! Each template is keyed by its SPDX identifier. The word-bigram set of
//! every template is computed once per process on first use.

use super::classifier::{bigrams, normalise};
use std::collections::HashSet;
use std::sync::OnceLock;

const TEMPLATE_TEXTS: &[(&str, &str)] = &[
    ("0BSD", include_str!("../../licenses/0BSD.txt")),
    ("Apache-2.0", include_str!("../../licenses/Apache-2.0.txt")),
    ("BSD-2-Clause", include_str!("../../licenses/BSD-2-Clause.txt")),
    ("BSD-3-Clause", include_str!("../../licenses/BSD-3-Clause.txt")),
    ("BSL-1.0", include_str!("../../licenses/BSL-1.0.txt")),
    ("ISC", include_str!("../../licenses/ISC.txt")),
    ("MIT", include_str!("../../licenses/MIT.txt")),
    ("MIT-0", include_str!("../../licenses/MIT-0.txt")),
    ("Unlicense", include_str!("../../licenses/Unlicense.txt")),
    ("Zlib", include_str!("../../licenses/Zlib.txt")),
];

/// A license template prepared for comparison.
#[derive(Debug)]
pub struct Template {
    /// SPDX identifier of the license.
    pub identifier: &'static str,
    /// Word bigrams of the normalised template text.
    pub grams: HashSet<String>,
}

impl Template {
    /// Prepare a template from its identifier and canonical text.
    #[must_use]
    pub fn new(identifier: &'static str, text: &str) -> Self {
        Self {
            identifier,
            grams: bigrams(&normalise(text)),
        }
    }
}

/// The built-in template corpus.
pub fn corpus() -> &'static [Template] {
    static CORPUS: OnceLock<Vec<Template>> = OnceLock::new();
    CORPUS.get_or_init(|| {
        TEMPLATE_TEXTS
            .iter()
            .map(|&(identifier, text)| Template::new(identifier, text))
            .collect()
    })
}

/// SPDX identifiers of every built-in template, in corpus order.
pub fn identifiers() -> impl Iterator<Item = &'static str> {
    TEMPLATE_TEXTS.iter().map(|(identifier, _)| *identifier)
}
