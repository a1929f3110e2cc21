//! Storage layer for the commit log

pub mod db;
pub mod models;

pub use db::{Database, StoreError, StoreResult};
pub use models::*;
