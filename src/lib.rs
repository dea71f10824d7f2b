// Copyright 2026 The ucdprops Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # ucdprops
//!
//! Per-codepoint lookup of Unicode Character Database properties.
//!
//! `ucdprops` fetches the canonical UCD text files from the Unicode Consortium, parses their
//! various formats into one compact in-memory index, and answers point queries: given a
//! codepoint, which `General_Category`, `Script`, `Age`, `Case_Folding_Mapping`, ... does it
//! have. It does not implement any Unicode algorithm (normalization, bidi, segmentation); it
//! only looks attributes up.
//!
//! ## Features
//!
//! - **Every common UCD file** - `UnicodeData.txt` with its `First>`/`Last>` ranges, the range
//!   files (`Scripts.txt`, `Blocks.txt`, ...), composite property lists and keyed files such as
//!   `CaseFolding.txt`
//! - **Derived properties** - the Universal Shaping Engine category `USE_Category`
//! - **Parallel loading** - files are parsed concurrently, folded deterministically
//! - **Persistent cache** - downloads and the finished index are cached per user, guarded by a
//!   cross-process lock
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! let record = ucdprops::ucd_data(0x078A)?;
//! assert_eq!(record["General_Category"], "Lo");
//! assert_eq!(record["Script"], "Thaana");
//! assert_eq!(record["Name"], "THAANA LETTER FAAFU");
//! # Ok::<(), ucdprops::Error>(())
//! ```
//!
//! The first call downloads the UCD into the user cache directory (or reuses what is there)
//! and builds the index once per process. Use [`cache::Cache`] with a custom
//! [`cache::Config`] to control the location, offline mode and refresh policy, or
//! [`IndexBuilder`] to build an index from texts you already have.
//!
//! ## Architecture
//!
//! - [`ucd`] - The UCD files and the strategies that parse them
//! - [`IndexBuilder`] / [`PropertyIndex`] - Loading and the immutable lookup structure
//! - [`cache`] - Download, version tracking and the persisted index
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! use ucdprops::Error;
//!
//! match ucdprops::ucd_data(0x01E8) {
//!     Ok(record) => println!("{record:?}"),
//!     Err(e) if e.is_retryable() => println!("Cache busy or network down: {e}"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! ```
use std::sync::OnceLock;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;
pub(crate) mod index;
pub(crate) mod loader;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use ucdprops::prelude::*;
///
/// let index = IndexBuilder::new()
///     .source(UcdFile::Scripts, "0780..07A5    ; Thaana\n")
///     .build()?;
/// assert_eq!(index.get(0x078A, "Script"), Some("Thaana"));
/// # Ok::<(), Error>(())
/// ```
pub mod prelude;

/// UCD files, their formats and parsers.
pub mod ucd;

/// On-disk cache of UCD files and the persisted index.
pub mod cache;

/// `ucdprops` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `ucdprops` Error type
pub use error::Error;

/// Raw UCD file contents, memory-mapped or in memory.
///
/// # Example
///
/// ```rust,no_run
/// use ucdprops::{IndexBuilder, SourceText, UcdFile};
///
/// let scripts = SourceText::from_file("ucd/Scripts.txt")?;
/// let index = IndexBuilder::new()
///     .source(UcdFile::Scripts, scripts.text()?)
///     .build()?;
/// # Ok::<(), ucdprops::Error>(())
/// ```
pub use file::SourceText;

pub use index::{IndexBuilder, PropertyIndex, PropertyRecord, INDEX_REVISION};
pub use ucd::{Assignment, UcdFile};

static SHARED_INDEX: OnceLock<PropertyIndex> = OnceLock::new();

/// Returns the process-wide index, loading it through the default [`cache::Cache`] on first use.
///
/// # Errors
/// Propagates any error of [`cache::Cache::load`]. A failed load is not remembered; the next
/// call tries again.
pub fn shared_index() -> Result<&'static PropertyIndex> {
    if let Some(index) = SHARED_INDEX.get() {
        return Ok(index);
    }

    let index = cache::Cache::new(cache::Config::default()).load()?;
    Ok(SHARED_INDEX.get_or_init(|| index))
}

/// Returns every known UCD property of `codepoint`, keyed by property name.
///
/// Codepoints the UCD says nothing about yield an empty map.
///
/// # Errors
/// Only the first call can fail, while the shared index is loaded; see [`shared_index`].
pub fn ucd_data(codepoint: u32) -> Result<PropertyRecord> {
    Ok(shared_index()?.lookup(codepoint))
}
