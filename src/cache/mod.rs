//! On-disk UCD cache.
//!
//! The cache directory holds three kinds of files:
//!
//! - the raw UCD text files, flattened to their file names (`Scripts.txt`, `emoji-data.txt`,
//!   ...);
//! - `ucd-version`, a marker holding the Unicode version of those files; its modification time
//!   is when the files were last known to be current;
//! - `ucd-index.bin`, the finished [`PropertyIndex`] in bincode form, so later runs can skip
//!   parsing entirely.
//!
//! All access goes through [`Cache::load`], which holds the cross-process [`CacheLock`] for the
//! whole download, parse and persist sequence. Every write goes to a temporary name first and
//! is renamed into place.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ucdprops::cache::{Cache, Config};
//!
//! let cache = Cache::new(Config::with_cache_dir("/var/cache/ucd"));
//! let index = cache.load()?;
//! println!("{} codepoints, Unicode {:?}", index.codepoint_count(), index.unicode_version());
//! # Ok::<(), ucdprops::Error>(())
//! ```
mod config;
mod fetch;
mod lock;

pub use config::{Config, DEFAULT_BASE_URL};
pub use lock::CacheLock;

use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::{
    file::SourceText,
    index::{IndexBuilder, PropertyIndex},
    ucd::{self, UcdFile},
    Error, Result,
};
use fetch::Fetcher;

/// Name of the version marker file.
pub const VERSION_MARKER: &str = "ucd-version";
/// Name of the persisted index.
pub const INDEX_FILE: &str = "ucd-index.bin";
/// Name of the lock file.
pub const LOCK_FILE: &str = ".ucdprops.lock";

/// A UCD cache directory and the policy for keeping it current.
#[derive(Debug, Clone)]
pub struct Cache {
    config: Config,
}

impl Cache {
    /// Creates a cache handle. Nothing is touched until [`Cache::load`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Cache { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.config.cache_dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.config.cache_dir.join(name)
    }

    /// Makes sure the UCD files are present and current, then returns the property index.
    ///
    /// The persisted index is used when it matches the files' Unicode version; otherwise the
    /// files are parsed and the result is persisted for the next run.
    ///
    /// # Errors
    /// - [`Error::LockTimeout`] if another process holds the cache for too long
    /// - [`Error::MissingSource`] if a file is missing in offline mode
    /// - [`Error::Download`] if a required download fails
    /// - [`Error::Structural`] if a file is damaged
    pub fn load(&self) -> Result<PropertyIndex> {
        fs::create_dir_all(self.dir())?;
        let _lock = CacheLock::acquire(&self.path(LOCK_FILE), self.config.lock_timeout)?;

        let version = self.ensure_files()?;

        if self.config.persist_index {
            if let Some(index) = self.read_index(version.as_deref()) {
                debug!("Using persisted index from {}", self.dir().display());
                return Ok(index);
            }
        }

        let index = self.build_index(version)?;
        if self.config.persist_index {
            self.write_index(&index)?;
        }

        Ok(index)
    }

    /// Files the cache directory does not hold yet.
    #[must_use]
    pub fn missing_files(&self) -> Vec<UcdFile> {
        UcdFile::iter()
            .filter(|file| !self.path(file.name()).is_file())
            .collect()
    }

    /// Downloads whatever is missing or outdated and returns the Unicode version of the files.
    fn ensure_files(&self) -> Result<Option<String>> {
        let missing = self.missing_files();
        let marker = self.read_marker();

        if self.config.offline {
            if let Some(file) = missing.first() {
                return Err(Error::MissingSource(file.name().to_string()));
            }
            return Ok(marker.or_else(|| self.local_version()));
        }

        let fetcher = Fetcher::new(&self.config);
        if self.config.force_refresh || !missing.is_empty() || marker.is_none() {
            return self.refresh(&fetcher).map(Some);
        }

        if self.marker_is_stale() {
            match fetcher.remote_version() {
                Ok(Some(remote)) if marker.as_deref() != Some(remote.as_str()) => {
                    info!("Unicode {remote} is available, updating cached files");
                    return self.refresh(&fetcher).map(Some);
                }
                Ok(_) => {
                    if let Some(version) = &marker {
                        self.write_marker(version)?;
                    }
                }
                Err(error) => {
                    warn!("Could not check for a newer UCD, keeping cached files: {error}");
                }
            }
        }

        Ok(marker)
    }

    /// Downloads every file, then records the new version and drops the persisted index.
    fn refresh(&self, fetcher: &Fetcher) -> Result<String> {
        let files: Vec<UcdFile> = UcdFile::iter().collect();
        files
            .par_iter()
            .try_for_each(|file| fetcher.download(*file, self.dir()))?;

        let version = self.local_version().unwrap_or_else(|| {
            warn!("{} has no version header", UcdFile::DerivedAge);
            "unknown".to_string()
        });
        self.write_marker(&version)?;

        match fs::remove_file(self.path(INDEX_FILE)) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => return Err(error.into()),
            _ => {}
        }

        info!("Cached Unicode {version} in {}", self.dir().display());
        Ok(version)
    }

    fn read_marker(&self) -> Option<String> {
        let version = fs::read_to_string(self.path(VERSION_MARKER)).ok()?;
        let version = version.trim();
        (!version.is_empty()).then(|| version.to_string())
    }

    fn write_marker(&self, version: &str) -> Result<()> {
        write_atomic(&self.path(VERSION_MARKER), format!("{version}\n").as_bytes())
    }

    fn marker_is_stale(&self) -> bool {
        let Some(interval) = self.config.refresh_interval else {
            return false;
        };

        fs::metadata(self.path(VERSION_MARKER))
            .and_then(|metadata| metadata.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age > interval)
    }

    /// The version in the header of the cached `DerivedAge.txt`.
    fn local_version(&self) -> Option<String> {
        let file = File::open(self.path(UcdFile::DerivedAge.name())).ok()?;
        let mut header = String::new();
        BufReader::new(file).read_line(&mut header).ok()?;
        ucd::unicode_version(&header)
    }

    fn read_index(&self, version: Option<&str>) -> Option<PropertyIndex> {
        let bytes = fs::read(self.path(INDEX_FILE)).ok()?;
        match PropertyIndex::from_bytes(&bytes) {
            Ok(index) if index.unicode_version() == version => Some(index),
            Ok(index) => {
                debug!(
                    "Persisted index is for Unicode {:?}, files are {version:?}; rebuilding",
                    index.unicode_version()
                );
                None
            }
            Err(error) => {
                warn!("Ignoring corrupt persisted index: {error}");
                None
            }
        }
    }

    fn build_index(&self, version: Option<String>) -> Result<PropertyIndex> {
        let texts = UcdFile::iter()
            .map(|file| Ok((file, SourceText::from_file(&self.path(file.name()))?)))
            .collect::<Result<Vec<_>>>()?;

        let mut builder = IndexBuilder::new();
        for (file, text) in &texts {
            builder = builder.source(*file, text.text()?);
        }
        if let Some(version) = version {
            builder = builder.version(version);
        }

        debug!("Parsing {} UCD files from {}", texts.len(), self.dir().display());
        builder.build()
    }

    fn write_index(&self, index: &PropertyIndex) -> Result<()> {
        write_atomic(&self.path(INDEX_FILE), &index.to_bytes()?)
    }
}

/// Writes `bytes` to `path` through a temporary sibling and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temporary = path.as_os_str().to_owned();
    temporary.push(".tmp");
    let temporary = PathBuf::from(temporary);

    fs::write(&temporary, bytes)?;
    fs::rename(&temporary, path)?;
    Ok(())
}
