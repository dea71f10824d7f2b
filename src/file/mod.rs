//! Raw access to UCD source files.
//!
//! Every UCD file is plain UTF-8 text. This module abstracts over where those bytes live so
//! the parsers only ever see a `&str`:
//!
//! - [`crate::file::physical::Physical`] - Memory-mapped file backend for the on-disk cache
//! - [`crate::file::memory::Memory`] - In-memory buffer backend for embedded or test data
//!
//! [`SourceText`] pairs a backend with the UCD file name it was read from and performs the
//! UTF-8 validation once, when the text is first requested.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ucdprops::SourceText;
//!
//! let source = SourceText::from_file("/var/cache/ucdprops/Blocks.txt")?;
//! println!("{} bytes", source.len());
//! let text = source.text()?;
//! assert!(text.starts_with("# Blocks-"));
//! # Ok::<(), ucdprops::Error>(())
//! ```
pub mod memory;
pub mod physical;

use std::path::Path;

use memory::Memory;
use physical::Physical;

use crate::Result;

/// Backend trait for the different data sources a [`SourceText`] can read from.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The raw bytes of one UCD file, together with the name it is known by.
pub struct SourceText {
    name: String,
    backend: Box<dyn Backend>,
}

impl SourceText {
    /// Memory-maps a file from disk.
    ///
    /// The file name component of `path` becomes the source name, so a file stored as
    /// `<cache>/UnicodeData.txt` is recognized as `UnicodeData.txt`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<SourceText> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(SourceText {
            name,
            backend: Box::new(Physical::new(path)?),
        })
    }

    /// Wraps bytes that are already in memory.
    pub fn from_mem(name: impl Into<String>, data: Vec<u8>) -> SourceText {
        SourceText {
            name: name.into(),
            backend: Box::new(Memory::new(data)),
        }
    }

    /// The UCD file name, e.g. `Scripts.txt`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the raw data in bytes.
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Returns `true` if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    /// The source decoded as UTF-8.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the bytes are not valid UTF-8, which for UCD data
    /// means the download is damaged.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(self.backend.data()).map_err(|error| {
            malformed_error!(
                "{} is not valid UTF-8 (at byte {})",
                self.name,
                error.valid_up_to()
            )
        })
    }
}

impl std::fmt::Debug for SourceText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceText")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}
