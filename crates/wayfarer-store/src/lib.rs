//! Local key-value storage for the wayfarer planner.
//!
//! Provides the [`KvStore`] trait plus two backends: [`MemoryStore`] (with an
//! optional byte quota) and [`FileStore`] (one JSON file per key).

pub mod config;
pub mod file;
pub mod kv;
pub mod memory;

pub use config::StoreConfig;
pub use file::FileStore;
pub use kv::{KvStore, StoreError};
pub use memory::MemoryStore;
