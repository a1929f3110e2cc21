//! CLI commands for git-global-log.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Record a commit in the log.
pub mod add;

/// Generate shell completion scripts.
pub mod completions;

/// Remove a commit from the log.
pub mod drop;
