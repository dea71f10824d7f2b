//! Cross-process cache lock.
//!
//! Every process that downloads into, parses from or writes to a cache directory holds an
//! exclusive advisory lock on `<cache>/.ucdprops.lock` for the whole sequence. Acquisition polls
//! with a bounded timeout, so a crashed or stuck peer turns into [`Error::LockTimeout`] rather
//! than a hang.

use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use fs2::FileExt;
use log::debug;

use crate::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Scoped exclusive lock on a cache directory, released on drop.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquires the lock file at `path`, waiting at most `timeout`.
    ///
    /// # Errors
    /// Returns [`Error::LockTimeout`] if another holder does not release the lock in time, and
    /// [`Error::FileError`] if the lock file cannot be opened.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!("Acquired cache lock {}", path.display());
                    return Ok(CacheLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(error) if is_contended(&error) => {}
                Err(error) => return Err(error.into()),
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(Error::LockTimeout {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            thread::sleep(POLL_INTERVAL.min(timeout - waited));
        }
    }

    /// The lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            debug!("Failed to release cache lock {}: {error}", self.path.display());
        }
    }
}
