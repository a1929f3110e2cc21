//! git-global-log - one commit log for all your repositories
//!
//! Records metadata about selected commits from any number of local
//! repositories into a single SQLite file, so history can be queried
//! across projects from one place.

pub mod config;
pub mod git;
pub mod storage;
