//! Planner construction shared by the command handlers.
//!
//! Every invocation is a fresh process: commands restore the saved snapshot,
//! apply their change, and save again before exiting.

use std::sync::Arc;

use anyhow::{Result, bail};

use wayfarer_core::Planner;
use wayfarer_store::FileStore;

use crate::config::WayfarerConfig;
use crate::images::DirectoryImageGenerator;

/// A planner over the configured file store and image directory.
pub fn open(config: &WayfarerConfig) -> Planner {
    let store = Arc::new(FileStore::open(&config.store));
    let images = Arc::new(DirectoryImageGenerator::new(config.images_dir.clone()));
    Planner::new(config.planner.clone(), store, images)
}

/// [`open`], then restore the saved plan or fail with a hint.
pub fn open_saved(config: &WayfarerConfig) -> Result<Planner> {
    let mut planner = open(config);
    if !planner.restore() {
        bail!(
            "no saved plan in {}\nRun `wayfarer import <file> --origin <city> --dest <city>` first.",
            config.store.data_dir().display()
        );
    }
    Ok(planner)
}
