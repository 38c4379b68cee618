//! CLI handlers for the flight catalog.
//!
//! Implements:
//! - `wayfarer flights [--airline A] [--stops S] [--max-price P] [--pages N]`
//! - `wayfarer select <number> [filter flags]`
//!
//! Numbers refer to positions in the filtered list, so `select` must be
//! given the same filter flags that were used to list the flights.

use std::fmt::Write as _;

use anyhow::{Result, bail};

use wayfarer_core::{Flight, LoadMore};

use crate::FilterArgs;
use crate::config::WayfarerConfig;
use crate::plan_cmds::{self, flight_line, to_index};
use crate::session;

pub async fn cmd_flights(config: &WayfarerConfig, filter: &FilterArgs, pages: usize) -> Result<()> {
    let mut planner = session::open_saved(config)?;
    planner.set_filter(filter.criteria())?;

    for _ in 1..pages.max(1) {
        match planner.load_more()? {
            LoadMore::Started(_) => planner.settle().await,
            LoadMore::AlreadyLoading | LoadMore::Exhausted => break,
        }
    }

    let airlines = planner.airlines().join(", ");
    print!(
        "{}",
        render_flights(
            planner.displayed_flights(),
            planner.filtered_flights().len(),
            planner.selection(),
        )
    );
    println!("Airlines: {airlines}");
    if planner.has_more_flights() {
        println!("More flights available: pass --pages {}", pages.max(1) + 1);
    }
    Ok(())
}

pub fn cmd_select(config: &WayfarerConfig, number: usize, filter: &FilterArgs) -> Result<()> {
    let mut planner = session::open_saved(config)?;
    planner.set_filter(filter.criteria())?;

    let index = to_index(number, "flight")?;
    let Some(flight) = planner.filtered_flights().get(index).cloned() else {
        bail!(
            "flight {number} does not exist; {} flight(s) match the filter",
            planner.filtered_flights().len()
        );
    };

    match planner.select_flight(&flight)? {
        Some(selected) => println!("Selected: {}", flight_line(selected)),
        None => println!("Deselected: {}", flight_line(&flight)),
    }
    if let Some(total) = planner.trip_total() {
        println!("Trip total: {total:.2}");
    }

    plan_cmds::save(&mut planner)?;
    Ok(())
}

/// Numbered flight list; the selected flight is marked with `*`.
pub fn render_flights(displayed: &[Flight], filtered: usize, selection: Option<&Flight>) -> String {
    let mut out = String::new();
    if displayed.is_empty() {
        out.push_str("No flights match the filter.\n");
        return out;
    }
    let _ = writeln!(out, "Showing {} of {filtered} flight(s):", displayed.len());
    for (i, flight) in displayed.iter().enumerate() {
        let marker = if selection == Some(flight) { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {:>3}. {}", i + 1, flight_line(flight));
    }
    out
}
