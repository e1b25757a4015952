//! Packaging strategy selection for upstream source artefacts.
//!
//! Upstream projects ship their sources in different shapes. Most wrap the
//! tree in a single top-level directory, a few place files directly at the
//! archive root, and gem-style packages nest the real tree inside an inner
//! `data.tar.gz`. [`StrategyTable`] maps a dependency name onto one of these
//! shapes, or onto [`PackagingStrategy::Skip`] for dependencies whose license
//! cannot be retrieved automatically.

use serde::Deserialize;

/// The extraction policy applied to a dependency's source artefact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackagingStrategy {
    /// No license can be retrieved automatically; the lookup short-circuits
    /// to an empty result without touching the network.
    Skip,
    /// A single extraction pass discarding `strip_components` leading path
    /// segments from every entry.
    Generic {
        /// Number of leading path components to discard.
        strip_components: usize,
    },
    /// The artefact is an archive whose inner archive holds the file tree.
    Nested {
        /// File name of the inner archive inside the outer one.
        inner_archive: String,
    },
}

impl PackagingStrategy {
    /// Short label used in log output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Generic { .. } => "generic",
            Self::Nested { .. } => "nested",
        }
    }
}

/// Static mapping from dependency names to packaging strategies.
///
/// Names are compared case-sensitively. When a name appears in more than one
/// list the first match in the order skip, nested, root-level wins; names in
/// no list use [`Self::default_strip_components`].
///
/// # Examples
///
/// ```
/// use license_retriever::strategy::{PackagingStrategy, StrategyTable};
///
/// let table = StrategyTable::default();
/// assert_eq!(table.select("composer"), PackagingStrategy::Skip);
/// assert_eq!(
///     table.select("dotnet-sdk"),
///     PackagingStrategy::Generic { strip_components: 0 }
/// );
/// assert_eq!(
///     table.select("node"),
///     PackagingStrategy::Generic { strip_components: 1 }
/// );
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyTable {
    /// Dependencies without an automatically retrievable license.
    pub skip: Vec<String>,
    /// Dependencies whose tarballs place files directly at the archive root.
    pub root_level: Vec<String>,
    /// Dependencies shipped as gem-style nested archives.
    pub nested: Vec<String>,
    /// File name of the inner archive for nested dependencies.
    pub inner_archive: String,
    /// Components stripped for every dependency not listed elsewhere.
    pub default_strip_components: usize,
}

impl StrategyTable {
    /// Conventional name of the inner archive inside a `.gem` file.
    pub const DEFAULT_INNER_ARCHIVE: &'static str = "data.tar.gz";

    /// Resolve the packaging strategy for `dependency_name`.
    ///
    /// This is a pure lookup: it performs no I/O and every name maps to
    /// exactly one strategy.
    #[must_use]
    pub fn select(&self, dependency_name: &str) -> PackagingStrategy {
        if contains(&self.skip, dependency_name) {
            return PackagingStrategy::Skip;
        }
        if contains(&self.nested, dependency_name) {
            return PackagingStrategy::Nested {
                inner_archive: self.inner_archive.clone(),
            };
        }
        if contains(&self.root_level, dependency_name) {
            return PackagingStrategy::Generic {
                strip_components: 0,
            };
        }
        PackagingStrategy::Generic {
            strip_components: self.default_strip_components,
        }
    }
}

fn contains(names: &[String], dependency_name: &str) -> bool {
    names.iter().any(|name| name == dependency_name)
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self {
            skip: owned(&["CAAPM", "composer"]),
            root_level: owned(&["dotnet-aspnetcore", "dotnet-runtime", "dotnet-sdk"]),
            nested: owned(&["bundler"]),
            inner_archive: Self::DEFAULT_INNER_ARCHIVE.to_owned(),
            default_strip_components: 1,
        }
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}
