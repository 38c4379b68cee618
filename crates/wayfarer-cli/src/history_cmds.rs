//! CLI handlers for `wayfarer history` subcommands.
//!
//! Implements:
//! - `wayfarer history list`        -- past requests, most recent first
//! - `wayfarer history show <id>`   -- trip parameters of one entry as JSON
//! - `wayfarer history clear --yes` -- forget all past requests

use anyhow::{Context, Result, bail};
use chrono::DateTime;

use wayfarer_core::persist::HistoryEntry;

use crate::HistoryCommands;
use crate::config::WayfarerConfig;
use crate::session;

/// Dispatch a `HistoryCommands` variant to the appropriate handler.
pub fn run_history_command(config: &WayfarerConfig, command: HistoryCommands) -> Result<()> {
    match command {
        HistoryCommands::List => cmd_list(config),
        HistoryCommands::Show { id } => cmd_show(config, id),
        HistoryCommands::Clear { yes } => cmd_clear(config, yes),
    }
}

fn cmd_list(config: &WayfarerConfig) -> Result<()> {
    let planner = session::open(config);
    let entries = planner.history().entries();
    if entries.is_empty() {
        println!("No history.");
        return Ok(());
    }
    for entry in entries {
        println!("{}", history_line(entry));
    }
    Ok(())
}

fn cmd_show(config: &WayfarerConfig, id: i64) -> Result<()> {
    let planner = session::open(config);
    let Some(entry) = planner.history().get(id) else {
        bail!("no history entry with id {id}");
    };
    let out =
        serde_json::to_string_pretty(&entry.parameters).context("failed to encode parameters")?;
    println!("{out}");
    Ok(())
}

fn cmd_clear(config: &WayfarerConfig, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to clear history without --yes");
    }
    let mut planner = session::open(config);
    let count = planner.history().len();
    planner.clear_history();
    println!("Cleared {count} history entr{}.", if count == 1 { "y" } else { "ies" });
    Ok(())
}

/// `<id>  <created>  <title>`; the id doubles as the creation time.
pub fn history_line(entry: &HistoryEntry) -> String {
    let created = DateTime::from_timestamp_millis(entry.id)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_owned());
    format!("{}  {created}  {}", entry.id, entry.title)
}
