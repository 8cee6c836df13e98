//! Unified error handling built on the `color-eyre` crate.
//!
//! Fatal failures (clone, version lookup, commit/push, pull request
//! creation) propagate through this type and abort the current upgrade
//! target only. Expected non-error outcomes such as branch-not-found or
//! no-diff are modeled as booleans by their callers, never as errors.

use color_eyre::eyre::Result as EyreResult;

/// Standard result type used throughout wrapperbot.
pub type Result<T> = EyreResult<T>;
