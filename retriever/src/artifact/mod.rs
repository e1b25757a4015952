//! Source artefact handling: download and archive extraction.
//!
//! This module provides:
//! - [`fetch`] - HTTP retrieval of the upstream source artefact
//! - [`format`] - container format detection from magic bytes
//! - [`extraction`] - archive unpacking with component stripping and
//!   path traversal protection

pub mod extraction;
pub mod fetch;
pub mod format;
