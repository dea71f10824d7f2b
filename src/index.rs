//! The immutable property index and the builder that produces it.
//!
//! A [`PropertyIndex`] answers "which properties does this codepoint have" for every codepoint
//! named by any loaded UCD file. It is built once by [`IndexBuilder`] (or loaded from the
//! on-disk cache, see [`crate::cache`]) and never modified afterwards, so it can be shared
//! freely between threads.
//!
//! # Layout
//!
//! Property names and values are stored once each in two string tables. Distinct per-codepoint
//! records (sets of name/value ids) are deduplicated, and consecutive codepoints sharing a
//! record form a [`Run`]. A lookup is a binary search over the runs followed by resolving at
//! most a few dozen ids, which keeps fully expanded ranges such as the CJK ideographs or the
//! private use planes cheap.
//!
//! # Examples
//!
//! ```rust
//! use ucdprops::{IndexBuilder, UcdFile};
//!
//! let index = IndexBuilder::new()
//!     .source(UcdFile::Blocks, "0780..07BF; Thaana\n")
//!     .source(UcdFile::Scripts, "0780..07A5    ; Thaana # Lo  [38] THAANA LETTER HAA..\n")
//!     .build()?;
//!
//! let record = index.lookup(0x078A);
//! assert_eq!(record["Block"], "Thaana");
//! assert_eq!(record["Script"], "Thaana");
//! assert!(index.lookup(0x0041).is_empty());
//! # Ok::<(), ucdprops::Error>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    loader::{self, SourceSet},
    ucd::{self, UcdFile},
    Error, Result,
};

/// Revision of the persisted index layout. Bumped whenever [`PropertyIndex`] changes shape.
pub const INDEX_REVISION: u32 = 1;

/// All properties of one codepoint, sorted by property name.
pub type PropertyRecord = BTreeMap<String, String>;

/// Consecutive codepoints sharing one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Run {
    pub(crate) start: u32,
    pub(crate) end: u32,
    pub(crate) record: u32,
}

/// Immutable map from codepoint to its UCD properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyIndex {
    version: Option<String>,
    names: Vec<String>,
    values: Vec<String>,
    records: Vec<Vec<(u16, u32)>>,
    runs: Vec<Run>,
}

impl PropertyIndex {
    pub(crate) fn from_parts(
        version: Option<String>,
        names: Vec<String>,
        values: Vec<String>,
        records: Vec<Vec<(u16, u32)>>,
        runs: Vec<Run>,
    ) -> Self {
        PropertyIndex {
            version,
            names,
            values,
            records,
            runs,
        }
    }

    fn entries(&self, codepoint: u32) -> &[(u16, u32)] {
        let position = self.runs.partition_point(|run| run.end < codepoint);
        match self.runs.get(position) {
            Some(run) if run.start <= codepoint => self
                .records
                .get(run.record as usize)
                .map_or(&[][..], Vec::as_slice),
            _ => &[],
        }
    }

    /// Returns every known property of `codepoint`.
    ///
    /// Codepoints no loaded file mentions, including values beyond U+10FFFF, yield an empty
    /// record. This never fails.
    #[must_use]
    pub fn lookup(&self, codepoint: u32) -> PropertyRecord {
        self.entries(codepoint)
            .iter()
            .filter_map(|&(name, value)| {
                let name = self.names.get(usize::from(name))?;
                let value = self.values.get(value as usize)?;
                Some((name.clone(), value.clone()))
            })
            .collect()
    }

    /// Returns a single property of `codepoint`.
    #[must_use]
    pub fn get(&self, codepoint: u32, property: &str) -> Option<&str> {
        let name = self.names.iter().position(|name| name == property)?;
        self.entries(codepoint)
            .iter()
            .find(|(id, _)| usize::from(*id) == name)
            .and_then(|(_, value)| self.values.get(*value as usize))
            .map(String::as_str)
    }

    /// Number of codepoints with at least one property.
    #[must_use]
    pub fn codepoint_count(&self) -> usize {
        self.runs
            .iter()
            .map(|run| (run.end - run.start) as usize + 1)
            .sum()
    }

    /// Number of runs of identical records.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// All property names present in the index, sorted.
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The Unicode version the index was built from, e.g. `16.0.0`, when known.
    #[must_use]
    pub fn unicode_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Records the Unicode version the index was built from.
    pub fn set_unicode_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    /// Returns `true` if no codepoint has any property.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Serializes the index, tagged with [`INDEX_REVISION`].
    ///
    /// # Errors
    /// Returns [`Error::Cache`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec((INDEX_REVISION, self), bincode::config::standard())
            .map_err(|e| Error::Cache(format!("failed to serialize property index: {e}")))
    }

    /// Deserializes an index written by [`PropertyIndex::to_bytes`].
    ///
    /// # Errors
    /// Returns [`Error::Cache`] if the bytes are damaged or were written by a different
    /// layout revision.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let ((revision, index), _): ((u32, PropertyIndex), usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| Error::Cache(format!("failed to deserialize property index: {e}")))?;

        if revision != INDEX_REVISION {
            return Err(Error::Cache(format!(
                "property index revision {revision}, expected {INDEX_REVISION}"
            )));
        }

        Ok(index)
    }
}

/// Builds a [`PropertyIndex`] from UCD texts already in memory.
///
/// Every supplied file is parsed; files that are not supplied simply contribute nothing.
/// Derived properties are computed when all of their inputs are present.
#[derive(Debug, Default, Clone)]
pub struct IndexBuilder<'a> {
    sources: SourceSet<'a>,
    version: Option<String>,
}

impl<'a> IndexBuilder<'a> {
    /// Creates a builder with no sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the text of a UCD file. Adding the same file twice keeps the last text.
    #[must_use]
    pub fn source(mut self, file: UcdFile, text: &'a str) -> Self {
        self.sources.insert(file, text);
        self
    }

    /// Adds the text of a UCD file identified by its file name, e.g. `Scripts.txt`.
    ///
    /// # Errors
    /// Returns [`Error::UnrecognizedFormat`] if no parsing strategy handles `name`.
    pub fn named_source(self, name: &str, text: &'a str) -> Result<Self> {
        Ok(self.source(UcdFile::from_name(name)?, text))
    }

    /// Overrides the Unicode version recorded in the index.
    ///
    /// By default it is read from the `DerivedAge.txt` header, if that file is supplied.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Runs all loaders and returns the finished index.
    ///
    /// # Errors
    /// Returns [`Error::Structural`] for a damaged source file and
    /// [`Error::PropertyCollision`] if two loaders define the same property.
    pub fn build(self) -> Result<PropertyIndex> {
        let version = self.version.or_else(|| {
            self.sources
                .text(UcdFile::DerivedAge)
                .ok()
                .and_then(ucd::unicode_version)
        });

        loader::execute_loaders(&self.sources)?.finish(version)
    }
}
