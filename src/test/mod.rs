//! Shared helpers for unit tests.
//!
//! The UCD snippets under `tests/samples/ucd/` are small excerpts of the real files: enough
//! rows to exercise every parsing strategy, the `First>`/`Last>` ranges and the derived
//! `USE_Category`, while keeping the whole index build well below a second.
