use std::{path::PathBuf, time::Duration};

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two groups: problems with the Unicode data itself (which abort the load
/// phase, so no partially populated index is ever handed out) and problems with the machinery
/// around it (the cache directory, the lock, the network).
///
/// # Error Categories
///
/// ## Data Errors
/// - [`Error::Structural`] - A source file violates a structural invariant of its format
/// - [`Error::UnrecognizedFormat`] - A file name no parsing strategy knows about
/// - [`Error::PropertyCollision`] - Two loaders claim the same property name
/// - [`Error::MissingSource`] - A required file is absent and cannot be fetched
/// - [`Error::Malformed`] - Source bytes that cannot be interpreted at all
///
/// ## Cache and I/O Errors
/// - [`Error::LockTimeout`] - The cross-process cache lock could not be acquired in time
/// - [`Error::Download`] - An HTTP request against the Unicode server failed
/// - [`Error::Cache`] - The persisted index could not be encoded
/// - [`Error::FileError`] - Filesystem I/O errors, including memory-mapping failures
///
/// # Examples
///
/// ```rust,no_run
/// use ucdprops::Error;
///
/// match ucdprops::ucd_data(0x078A) {
///     Ok(record) => println!("{} properties", record.len()),
///     Err(Error::LockTimeout { path, .. }) => {
///         eprintln!("cache at {} is busy, try again later", path.display());
///     }
///     Err(Error::Structural { file, line, message }) => {
///         eprintln!("corrupted download: {file}:{line}: {message}");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A source file violates an invariant of its format.
    ///
    /// The canonical case is a `<..., First>` row in `UnicodeData.txt` that is not followed by
    /// its `<..., Last>` partner, which indicates a truncated or corrupted download. This is
    /// fatal for the load phase.
    #[error("{file}:{line}: {message}")]
    Structural {
        /// Name of the UCD file, e.g. `UnicodeData.txt`
        file: String,
        /// 1-based line number of the offending row
        line: usize,
        /// What was wrong
        message: String,
    },

    /// A configured file name does not map to any parsing strategy.
    #[error("No parsing strategy for UCD file '{0}'")]
    UnrecognizedFormat(String),

    /// Two loaders tried to define the same property name.
    ///
    /// Every property name is owned by exactly one source file (or derived loader). A second
    /// writer means the file table is misconfigured.
    #[error("Property '{property}' is defined by both {owner} and {intruder}")]
    PropertyCollision {
        /// The contested property name
        property: String,
        /// The loader that defined the property first
        owner: &'static str,
        /// The loader that tried to define it again
        intruder: &'static str,
    },

    /// A required UCD file is missing and could not be downloaded.
    #[error("Required UCD file '{0}' is missing and no download was possible")]
    MissingSource(String),

    /// Could not acquire the cache lock within the configured timeout.
    ///
    /// Another process is downloading or parsing into the same cache directory. The whole
    /// operation can be retried later, see [`Error::is_retryable`].
    #[error("Timed out after {waited:?} waiting for cache lock {}", .path.display())]
    LockTimeout {
        /// The lock file
        path: PathBuf,
        /// How long we waited before giving up
        waited: Duration,
    },

    /// An HTTP request failed.
    #[error("Download of {url} failed: {message}")]
    Download {
        /// The requested URL
        url: String,
        /// The transport or status error
        message: String,
    },

    /// Encoding the persisted index failed.
    #[error("Index cache error - {0}")]
    Cache(String),

    /// The data is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for failures that may go away when the whole operation is retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockTimeout { .. } | Error::Download { .. })
    }
}
