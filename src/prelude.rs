//! # ucdprops Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the
//! ucdprops library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ucdprops operations
pub use crate::Error;

/// The result type used throughout ucdprops
pub use crate::Result;

// ================================================================================================
// Lookup
// ================================================================================================

/// Lookup through the shared, lazily loaded index
pub use crate::{shared_index, ucd_data};

/// The index and its builder
pub use crate::{IndexBuilder, PropertyIndex, PropertyRecord};

// ================================================================================================
// Sources and Cache
// ================================================================================================

/// UCD files and parsing
pub use crate::ucd::{parse, Assignment, Format, UcdFile};

/// Cache configuration and access
pub use crate::cache::{Cache, Config};
