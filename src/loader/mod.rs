//! Property Loader Module
//!
//! This module turns a set of UCD source texts into a populated [`Accumulator`] in a
//! dependency-aware and parallelized manner. It exposes the `PropertyLoader` trait, the
//! dependency graph that orders loaders, and the executor that runs them.
//!
//! # Loaders
//! - One [`SourceLoader`] per supplied UCD file. It parses the raw text and depends on
//!   nothing.
//! - Derived loaders (see `usecategory`) compute new properties from values already in the
//!   accumulator. They depend on the files whose properties they read, and are registered only
//!   when all of those files are supplied.
//!
//! # Execution
//! The graph groups loaders into levels. Within a level every loader runs in parallel with
//! `rayon`; loaders only read shared state there, so parsing and classification are pure.
//! Their outputs are then folded into the accumulator one after another, in key order, so the
//! final index does not depend on thread scheduling.
mod accumulator;
mod graph;
mod usecategory;

use std::collections::BTreeMap;

use log::debug;
use rayon::prelude::*;

pub(crate) use accumulator::Accumulator;

use crate::{
    ucd::{self, Assignment, UcdFile},
    Error, Result,
};

static DERIVED: [&'static dyn PropertyLoader; 1] = [&usecategory::UseCategoryLoader];

/// The source texts handed to one load, keyed by file.
#[derive(Debug, Default, Clone)]
pub(crate) struct SourceSet<'a> {
    texts: BTreeMap<UcdFile, &'a str>,
}

impl<'a> SourceSet<'a> {
    /// Adds (or replaces) the text of `file`.
    pub fn insert(&mut self, file: UcdFile, text: &'a str) {
        self.texts.insert(file, text);
    }

    /// Returns the text of `file`.
    ///
    /// # Errors
    /// Returns [`Error::MissingSource`] if the file was not supplied.
    pub fn text(&self, file: UcdFile) -> Result<&'a str> {
        self.texts
            .get(&file)
            .copied()
            .ok_or_else(|| Error::MissingSource(file.name().to_string()))
    }

    pub fn files(&self) -> impl Iterator<Item = UcdFile> + '_ {
        self.texts.keys().copied()
    }
}

/// Trait for property loaders.
///
/// A loader either parses one source file or derives a property from others. It declares the
/// files it needs and returns the assignments it wants folded into the accumulator; it never
/// writes to the accumulator itself.
pub(crate) trait PropertyLoader: Send + Sync {
    /// Produce this loader's assignments.
    ///
    /// # Arguments
    /// * `sources` - The raw texts of every supplied file.
    /// * `accumulator` - Everything folded by earlier levels, read only.
    ///
    /// # Errors
    /// Returns an error if a source text is structurally broken or missing.
    fn load<'a>(
        &self,
        sources: &SourceSet<'a>,
        accumulator: &Accumulator,
    ) -> Result<Vec<Assignment<'a>>>;

    /// The file this loader parses, `None` for derived loaders.
    fn source(&self) -> Option<UcdFile>;

    /// Files whose properties must be folded before this loader runs.
    fn dependencies(&self) -> &'static [UcdFile];

    /// Name under which this loader owns property names.
    fn name(&self) -> &'static str;
}

/// Parses one UCD file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceLoader(pub UcdFile);

impl PropertyLoader for SourceLoader {
    fn load<'a>(
        &self,
        sources: &SourceSet<'a>,
        _accumulator: &Accumulator,
    ) -> Result<Vec<Assignment<'a>>> {
        ucd::parse(self.0, sources.text(self.0)?)
    }

    fn source(&self) -> Option<UcdFile> {
        Some(self.0)
    }

    fn dependencies(&self) -> &'static [UcdFile] {
        &[]
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }
}

/// Execute all loaders for `sources`, level by level.
///
/// If any loader fails, the process is aborted and the error is returned; no partially
/// filled accumulator escapes.
///
/// # Errors
/// Returns the first loader error in key order, or [`Error::PropertyCollision`] if two
/// loaders write the same property name.
pub(crate) fn execute_loaders(sources: &SourceSet<'_>) -> Result<Accumulator> {
    let source_loaders: Vec<SourceLoader> = sources.files().map(SourceLoader).collect();

    let mut graph = graph::LoaderGraph::new();
    for loader in &source_loaders {
        graph.add_loader(loader);
    }
    for loader in DERIVED {
        graph.add_loader(loader);
    }

    let levels = graph.topological_levels();
    if log::log_enabled!(log::Level::Debug) {
        debug!("Loader execution plan:\n{}", graph.dump_execution_plan());
    }

    let mut accumulator = Accumulator::new();
    for level in levels {
        let results: Vec<Result<Vec<Assignment<'_>>>> = level
            .par_iter()
            .map(|loader| loader.load(sources, &accumulator))
            .collect();

        for (loader, result) in level.iter().zip(results) {
            accumulator.fold(loader.name(), result?)?;
        }
    }

    Ok(accumulator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures;

    #[test]
    fn test_source_set() {
        let mut sources = SourceSet::default();
        assert_eq!(sources.files().count(), 0);
        sources.insert(UcdFile::Blocks, "0780..07BF; Thaana\n");
        assert_eq!(sources.text(UcdFile::Blocks).unwrap(), "0780..07BF; Thaana\n");
        assert_eq!(sources.files().collect::<Vec<_>>(), [UcdFile::Blocks]);
        assert!(matches!(
            sources.text(UcdFile::Scripts),
            Err(Error::MissingSource(name)) if name == "Scripts.txt"
        ));
    }

    #[test]
    fn test_execute_single_level() {
        let mut sources = SourceSet::default();
        sources.insert(UcdFile::Blocks, fixtures::BLOCKS);
        sources.insert(UcdFile::Scripts, fixtures::SCRIPTS);

        let accumulator = execute_loaders(&sources).unwrap();
        assert_eq!(accumulator.value(0x078A, "Block"), Some("Thaana"));
        assert_eq!(accumulator.value(0x078A, "Script"), Some("Thaana"));
        assert_eq!(accumulator.value(0x078A, "USE_Category"), None);
    }

    #[test]
    fn test_execute_with_derived() {
        let accumulator = execute_loaders(&fixtures::source_set()).unwrap();
        assert_eq!(accumulator.value(0x0915, "USE_Category"), Some("B"));
        assert_eq!(accumulator.value(0x094D, "USE_Category"), Some("H"));
    }

    #[test]
    fn test_structural_error_aborts() {
        let mut sources = SourceSet::default();
        sources.insert(UcdFile::Blocks, fixtures::BLOCKS);
        sources.insert(
            UcdFile::UnicodeData,
            "4E00;<CJK Ideograph, First>;Lo;0;L;;;;;N;;;;;\n",
        );

        assert!(matches!(
            execute_loaders(&sources),
            Err(Error::Structural { .. })
        ));
    }
}
