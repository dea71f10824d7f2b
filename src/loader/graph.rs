//! Execution planning for parallel property loading.
//!
//! File loaders parse raw text and depend on nothing; derived loaders read properties folded
//! from files. That gives at most two levels, which this module builds and orders.
//!
//! # Core Components
//!
//! - [`LoaderGraph`]: Registered loaders and the levels they run in
//! - [`LoaderKey`]: Identifier for file or derived loaders
//!
//! # Loading Phases
//!
//! 1. **Level 0**: Every source file, parsed in parallel
//! 2. **Level 1**: Derived properties (`USE_Category`), once their inputs are folded
//!
//! # Thread Safety
//!
//! - Construction: Single-threaded only
//! - Generated plans: Thread-safe for parallel execution
//!
use std::collections::BTreeMap;
use std::fmt::Write;

use log::debug;

use crate::{loader::PropertyLoader, ucd::UcdFile};

/// Unique identifier for loaders in the graph.
///
/// The derived ordering (files first, by file, then derived loaders by sequence) is the order
/// in which the outputs of one level are folded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum LoaderKey {
    /// Loader that parses a specific UCD file
    File(UcdFile),

    /// Loader that derives a property from already loaded ones
    ///
    /// Derived loaders cannot be depended upon by other loaders.
    Derived {
        /// Sequence number for ordering multiple derived loaders
        sequence: usize,
    },
}

/// Registered loaders, keyed so that iteration follows fold order.
///
/// # Lifecycle
///
/// 1. Create with `LoaderGraph::new()`
/// 2. Add every file loader with `add_loader()`
/// 3. Add derived loaders with `add_loader()`; those missing an input are skipped
/// 4. Generate the execution plan with `topological_levels()`
#[derive(Default)]
pub(crate) struct LoaderGraph<'a> {
    loaders: BTreeMap<LoaderKey, &'a dyn PropertyLoader>,
    /// Counter for generating unique sequence numbers for derived loaders
    derived_counter: usize,
}

impl<'a> LoaderGraph<'a> {
    /// Creates a new empty loader graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a loader to the graph.
    ///
    /// The loader's key is determined by `source()`. A derived loader is only registered when
    /// every file it depends on already has a loader, so file loaders must be added first.
    ///
    /// Returns whether the loader was registered.
    pub fn add_loader(&mut self, loader: &'a dyn PropertyLoader) -> bool {
        if let Some(file) = loader.source() {
            self.loaders.insert(LoaderKey::File(file), loader);
            return true;
        }

        let missing: Vec<&str> = loader
            .dependencies()
            .iter()
            .filter(|file| !self.loaders.contains_key(&LoaderKey::File(**file)))
            .map(|file| file.name())
            .collect();
        if !missing.is_empty() {
            debug!(
                "Skipping derived property {}, missing {}",
                loader.name(),
                missing.join(", ")
            );
            return false;
        }

        let key = LoaderKey::Derived {
            sequence: self.derived_counter,
        };
        self.derived_counter += 1;
        self.loaders.insert(key, loader);
        true
    }

    /// Returns loaders grouped by level.
    ///
    /// Level 0 holds every file loader, the next level every derived loader. Within a level,
    /// loaders are sorted by key. Empty levels are omitted.
    pub fn topological_levels(&self) -> Vec<Vec<&'a dyn PropertyLoader>> {
        self.keyed_levels()
            .into_iter()
            .map(|level| {
                level
                    .iter()
                    .filter_map(|key| self.loaders.get(key).copied())
                    .collect()
            })
            .collect()
    }

    fn keyed_levels(&self) -> Vec<Vec<LoaderKey>> {
        let (files, derived): (Vec<LoaderKey>, Vec<LoaderKey>) = self
            .loaders
            .keys()
            .cloned()
            .partition(|key| matches!(key, LoaderKey::File(_)));

        [files, derived]
            .into_iter()
            .filter(|level| !level.is_empty())
            .collect()
    }

    /// Number of derived loaders reading `file`.
    fn needed_by(&self, file: UcdFile) -> usize {
        self.loaders
            .iter()
            .filter(|(key, loader)| {
                matches!(key, LoaderKey::Derived { .. }) && loader.dependencies().contains(&file)
            })
            .count()
    }

    /// Returns the execution plan as a formatted string for debugging.
    pub fn dump_execution_plan(&self) -> String {
        let mut result = String::new();

        for (level_idx, level) in self.keyed_levels().iter().enumerate() {
            let _ = writeln!(result, "Level {level_idx}: [");
            for loader_key in level {
                let deps = self
                    .loaders
                    .get(loader_key)
                    .map(|loader| loader.dependencies())
                    .filter(|deps| !deps.is_empty())
                    .map_or_else(
                        || "None".to_string(),
                        |deps| {
                            let mut names: Vec<&str> = deps.iter().map(|file| file.name()).collect();
                            names.sort_unstable();
                            names.join(", ")
                        },
                    );

                let needed_by = match loader_key {
                    LoaderKey::File(file) => self.needed_by(*file),
                    LoaderKey::Derived { .. } => 0,
                };

                let _ = writeln!(
                    result,
                    "  {loader_key:?} (depends on: {deps}; needed by {needed_by})"
                );
            }
            let _ = writeln!(result, "]");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loader::{Accumulator, SourceLoader, SourceSet},
        ucd::Assignment,
        Result,
    };

    struct TestDerived(&'static [UcdFile]);

    impl PropertyLoader for TestDerived {
        fn load<'a>(
            &self,
            _sources: &SourceSet<'a>,
            _accumulator: &Accumulator,
        ) -> Result<Vec<Assignment<'a>>> {
            Ok(Vec::new())
        }

        fn source(&self) -> Option<UcdFile> {
            None
        }

        fn dependencies(&self) -> &'static [UcdFile] {
            self.0
        }

        fn name(&self) -> &'static str {
            "Test_Derived"
        }
    }

    #[test]
    fn test_levels_are_sorted() {
        let loaders = [
            SourceLoader(UcdFile::Scripts),
            SourceLoader(UcdFile::Blocks),
            SourceLoader(UcdFile::UnicodeData),
        ];
        let derived = TestDerived(&[UcdFile::Blocks, UcdFile::UnicodeData]);

        let mut graph = LoaderGraph::new();
        for loader in &loaders {
            assert!(graph.add_loader(loader));
        }
        assert!(graph.add_loader(&derived));

        let levels = graph.topological_levels();
        assert_eq!(levels.len(), 2);

        let first: Vec<_> = levels[0].iter().map(|loader| loader.name()).collect();
        assert_eq!(first, ["Blocks.txt", "Scripts.txt", "UnicodeData.txt"]);
        assert_eq!(levels[1].len(), 1);
        assert_eq!(levels[1][0].name(), "Test_Derived");

        let plan = graph.dump_execution_plan();
        assert!(plan.contains("Derived { sequence: 0 } (depends on: Blocks.txt, UnicodeData.txt;"));
        assert!(plan.contains("File(Blocks) (depends on: None; needed by 1)"));
        assert!(plan.contains("File(Scripts) (depends on: None; needed by 0)"));
    }

    #[test]
    fn test_derived_without_inputs_is_skipped() {
        let loader = SourceLoader(UcdFile::Blocks);
        let derived = TestDerived(&[UcdFile::Blocks, UcdFile::IndicSyllabicCategory]);

        let mut graph = LoaderGraph::new();
        assert!(graph.add_loader(&loader));
        assert!(!graph.add_loader(&derived));

        let levels = graph.topological_levels();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].len(), 1);
        assert_eq!(levels[0][0].name(), "Blocks.txt");
        assert!(!graph.dump_execution_plan().contains("Derived"));
    }

    #[test]
    fn test_empty_graph_has_no_levels() {
        let graph = LoaderGraph::new();
        assert!(graph.topological_levels().is_empty());
        assert!(graph.dump_execution_plan().is_empty());
    }
}
