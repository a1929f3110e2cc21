//! Command-line interface for git-global-log.
//!
//! Provides the `add` and `drop` commands that record commits in, and
//! remove them from, the shared log.

/// Individual CLI command implementations.
pub mod commands;
