//! Cache configuration
//!
//! Controls where the UCD files live, where they come from, and how eagerly they are
//! refreshed.

use std::{path::PathBuf, time::Duration};

/// Default download root: the latest published UCD.
pub const DEFAULT_BASE_URL: &str = "https://www.unicode.org/Public/UCD/latest/ucd/";

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the on-disk UCD cache.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Config {
    /// Directory holding the UCD files, the version marker, the persisted index and the lock
    pub cache_dir: PathBuf,

    /// URL the file paths are resolved against; must end with `/`
    pub base_url: String,

    /// How long to wait for another process holding the cache lock (default: 60s)
    pub lock_timeout: Duration,

    /// Age of the version marker after which the remote version is checked (default: 90 days)
    /// `None` never checks
    pub refresh_interval: Option<Duration>,

    /// Timeout for a single HTTP request (default: 300s)
    pub download_timeout: Duration,

    /// Never touch the network; missing files are an error
    pub offline: bool,

    /// Download all files again, even if the cache looks current
    pub force_refresh: bool,

    /// Read and write the bincode-encoded index next to the files
    pub persist_index: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            base_url: DEFAULT_BASE_URL.to_string(),
            lock_timeout: Duration::from_secs(60),
            refresh_interval: Some(90 * DAY),
            download_timeout: Duration::from_secs(300),
            offline: false,
            force_refresh: false,
            persist_index: true,
        }
    }
}

/// The per-user cache directory, falling back to the system temp directory.
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ucdprops")
}

impl Config {
    /// Creates the default configuration rooted at `dir`.
    #[must_use]
    pub fn with_cache_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Creates a configuration that only uses files already present in `dir`.
    ///
    /// No version checks, no downloads.
    #[must_use]
    pub fn offline(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: dir.into(),
            refresh_interval: None,
            offline: true,
            ..Self::default()
        }
    }

    /// Sets the download root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Sets the lock timeout.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Sets the refresh interval, `None` disables remote version checks.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Enables or disables offline mode.
    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Forces a fresh download on the next load.
    #[must_use]
    pub fn with_force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Enables or disables the persisted index.
    #[must_use]
    pub fn with_persist_index(mut self, persist: bool) -> Self {
        self.persist_index = persist;
        self
    }
}
