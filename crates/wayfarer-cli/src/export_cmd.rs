//! CLI handlers for `wayfarer export` subcommands.
//!
//! Implements:
//! - `wayfarer export checklist [--output FILE]`
//! - `wayfarer export packing [--output FILE]`
//! - `wayfarer export flights [filter flags] [--output FILE]`
//!
//! Without `--output` the text goes to stdout.

use std::path::Path;

use anyhow::{Context, Result};

use crate::ExportCommands;
use crate::config::WayfarerConfig;
use crate::session;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch an `ExportCommands` variant to the appropriate export.
pub fn run_export_command(config: &WayfarerConfig, what: ExportCommands) -> Result<()> {
    let mut planner = session::open_saved(config)?;

    let (text, output) = match what {
        ExportCommands::Checklist { output } => (planner.export_checklist(), output),
        ExportCommands::Packing { output } => (planner.export_packing_list(), output),
        ExportCommands::Flights { filter, output } => {
            planner.set_filter(filter.criteria())?;
            (planner.export_flights_csv(), output)
        }
    };
    let text = text.unwrap_or_default();

    match output {
        Some(path) => write_export(&path, &text),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn write_export(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}
