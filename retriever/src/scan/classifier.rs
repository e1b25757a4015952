//! License identification for the text of a single file.
//!
//! Three kinds of evidence are combined, keeping the strongest per
//! identifier:
//!
//! - `SPDX-License-Identifier:` tags, trusted outright
//! - well-known license titles, for licenses without a template
//! - fuzzy matching against the template corpus
//!
//! For fuzzy matching text is normalised (case folded, copyright lines
//! dropped, spelling variants unified) and split into words. Similarity is
//! the Dice coefficient over word bigrams, so reflowed paragraphs, Markdown
//! bullets and filled-in copyright holders barely move the score while a
//! missing or extra clause does. Scores are taken over every run of
//! consecutive paragraphs rather than the whole file, so a license
//! followed by other licenses or notices still matches.

use super::markers::{spdx_tags, title_matches};
use super::templates::{Template, corpus};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Confidence given to an identifier declared by an SPDX tag.
pub const TAG_CONFIDENCE: f32 = 1.0;

/// Confidence given to an identifier named by a license title.
pub const TITLE_CONFIDENCE: f32 = 0.9;

/// One license identified in a file, with the similarity that matched it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LicenseFinding {
    /// SPDX identifier of the matched license.
    pub identifier: String,
    /// Confidence in `[0, 1]` that the file carries the license.
    pub confidence: f32,
}

/// Classifies text by comparing it with every template in a corpus.
#[derive(Debug)]
pub struct TemplateClassifier {
    templates: &'static [Template],
    threshold: f32,
}

impl TemplateClassifier {
    /// Create a classifier over the built-in corpus.
    ///
    /// Licenses found with at least `threshold` confidence are reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use license_retriever::scan::classifier::TemplateClassifier;
    ///
    /// let classifier = TemplateClassifier::new(0.75);
    /// assert!(classifier.classify("no license here").is_empty());
    /// ```
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            templates: corpus(),
            threshold,
        }
    }

    /// Identify every license in `text`.
    ///
    /// Returns every license at or above the threshold, best match first.
    #[must_use]
    pub fn classify(&self, text: &str) -> Vec<LicenseFinding> {
        let mut scores: BTreeMap<String, f32> = BTreeMap::new();
        let mut record = |identifier: &str, confidence: f32| {
            let best = scores.entry(identifier.to_owned()).or_insert(0.0);
            *best = best.max(confidence);
        };

        for tag in spdx_tags(text) {
            record(&tag, TAG_CONFIDENCE);
        }
        for identifier in title_matches(&normalise(text)) {
            record(identifier, TITLE_CONFIDENCE);
        }
        let sections = Sections::new(text);
        for template in self.templates {
            record(
                template.identifier,
                sections.best_score(&template.grams, self.threshold),
            );
        }

        let mut findings: Vec<LicenseFinding> = scores
            .into_iter()
            .filter(|(_, confidence)| *confidence >= self.threshold)
            .map(|(identifier, confidence)| LicenseFinding {
                identifier,
                confidence,
            })
            .collect();
        findings.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        findings
    }
}

/// Normalised paragraphs of a text, as word bigrams.
struct Sections {
    /// Bigrams inside each paragraph, in text order.
    grams: Vec<Vec<String>>,
    /// Bigram joining each paragraph to the previous one.
    joins: Vec<Option<String>>,
}

impl Sections {
    fn new(text: &str) -> Self {
        let paragraphs: Vec<Vec<String>> = split_paragraphs(text)
            .iter()
            .map(|paragraph| normalise(paragraph))
            .filter(|words| !words.is_empty())
            .collect();
        let joins = std::iter::once(None)
            .chain(paragraphs.windows(2).map(|pair| match pair {
                [previous, next] => previous
                    .last()
                    .zip(next.first())
                    .map(|(last, first)| format!("{last} {first}")),
                _ => None,
            }))
            .take(paragraphs.len())
            .collect();
        let grams = paragraphs.iter().map(|words| bigram_list(words)).collect();
        Self { grams, joins }
    }

    /// Best Dice score of any run of consecutive paragraphs against
    /// `template`.
    ///
    /// A window with `w` distinct bigrams scores at most
    /// `2t / (w + t)` against a template of `t` bigrams, so growing a
    /// window stops once `w > t * (2 / threshold - 1)`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "bigram counts are far below f32 mantissa range"
    )]
    fn best_score(&self, template: &HashSet<String>, threshold: f32) -> f32 {
        let limit = if threshold > 0.0 {
            template.len() as f32 * (2.0 / threshold - 1.0)
        } else {
            f32::INFINITY
        };
        let mut best = 0.0_f32;
        let mut window: HashSet<&str> = HashSet::new();
        for start in 0..self.grams.len() {
            window.clear();
            let mut shared = 0;
            for (index, grams) in self.grams.iter().enumerate().skip(start) {
                let join = self
                    .joins
                    .get(index)
                    .filter(|_| index > start)
                    .and_then(Option::as_deref);
                for gram in join.into_iter().chain(grams.iter().map(String::as_str)) {
                    if window.insert(gram) && template.contains(gram) {
                        shared += 1;
                    }
                }
                best = best.max(dice(shared, window.len(), template.len()));
                if window.len() as f32 > limit {
                    break;
                }
            }
        }
        best
    }
}

/// Group `text` into paragraphs separated by blank lines.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

/// Split `text` into normalised words.
pub(crate) fn normalise(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let kept: Vec<&str> = lower
        .lines()
        .filter(|line| !line.trim_start().starts_with("copyright"))
        .collect();
    let unified = kept
        .join("\n")
        .replace("licence", "license")
        .replace('&', " and ");
    unified
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Adjacent word pairs of `words`, in order.
fn bigram_list(words: &[String]) -> Vec<String> {
    words
        .windows(2)
        .filter_map(|pair| match pair {
            [first, second] => Some(format!("{first} {second}")),
            _ => None,
        })
        .collect()
}

/// Distinct adjacent word pairs of `words`.
pub(crate) fn bigrams(words: &[String]) -> HashSet<String> {
    bigram_list(words).into_iter().collect()
}

#[expect(
    clippy::cast_precision_loss,
    reason = "bigram counts are far below f32 mantissa range"
)]
fn dice(shared: usize, left: usize, right: usize) -> f32 {
    let total = left + right;
    if total == 0 {
        return 0.0;
    }
    (2 * shared) as f32 / total as f32
}
