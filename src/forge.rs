//! Pull request gateway for the GitHub forge.
//!
//! The host owns the set of pull requests and is the single source of
//! truth for "has this upgrade already been proposed". Everything here
//! either wraps a host API call or reconciles host state with the
//! deterministic branch naming scheme.

/// Repository connection configuration.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Branch naming and pull request reconciliation helpers.
pub mod pr;

/// Gateway trait for host pull request operations.
pub mod traits;

/// Shared data types for pull requests and users.
pub mod types;
