//! CLI handlers for whole-plan commands.
//!
//! Implements:
//! - `wayfarer import <file>` -- install a plan from raw model output
//! - `wayfarer show`          -- summarize the saved plan
//! - `wayfarer toggle ...`    -- flip a checklist or packing item
//! - `wayfarer save`          -- fill pending images and save
//! - `wayfarer discard --yes` -- remove the saved plan

use std::fmt::Write as _;
use std::io::Read as _;

use anyhow::{Context, Result, bail};

use wayfarer_core::model::{Flight, ImageState, Plan, TripParameters};
use wayfarer_core::{Planner, PlannerError};

use crate::ToggleTarget;
use crate::config::WayfarerConfig;
use crate::session;

// -----------------------------------------------------------------------
// wayfarer import <file>
// -----------------------------------------------------------------------

pub async fn cmd_import(config: &WayfarerConfig, file: &str, params: TripParameters) -> Result<()> {
    let raw = read_input(file)?;

    let mut planner = session::open(config);
    let plan = planner
        .accept_generated(params, &raw)
        .map_err(|e| explain(e, format!("could not install plan from {file}")))?;
    println!(
        "Installed plan with {} destination(s) and {} flight(s).",
        plan.itinerary.len(),
        plan.flights.len()
    );

    planner.settle().await;
    save(&mut planner)?;
    print_image_summary(&planner);
    println!("Saved to {}", config.store.data_dir().display());
    Ok(())
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read plan from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read plan file: {file}"))
}

// -----------------------------------------------------------------------
// wayfarer show
// -----------------------------------------------------------------------

pub fn cmd_show(config: &WayfarerConfig, json: bool) -> Result<()> {
    let planner = session::open_saved(config)?;
    let (Some(plan), Some(params)) = (planner.plan(), planner.parameters()) else {
        bail!("no plan is loaded");
    };

    if json {
        let out = serde_json::to_string_pretty(&*plan).context("failed to encode plan")?;
        println!("{out}");
        return Ok(());
    }

    print!(
        "{}",
        render_summary(&plan, params, planner.selection(), planner.trip_total())
    );
    Ok(())
}

/// Human-readable plan summary.
pub fn render_summary(
    plan: &Plan,
    params: &TripParameters,
    selection: Option<&Flight>,
    trip_total: Option<f64>,
) -> String {
    let mut out = String::new();
    let p = &params.passengers;
    let _ = writeln!(
        out,
        "{} ({}, {}, {})",
        params.title(),
        params.year,
        params.kind,
        params.cabin_class
    );
    let _ = writeln!(
        out,
        "Passengers: {} adult(s), {} child(ren), {} infant(s)",
        p.adults, p.children, p.infants
    );

    out.push_str("\nItinerary:\n");
    for (i, dest) in plan.itinerary.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} [image: {}]", i + 1, dest.name, image_label(&dest.image));
        if !dest.summary.is_empty() {
            let _ = writeln!(out, "     {}", dest.summary);
        }
        for activity in &dest.activities {
            let _ = writeln!(out, "     Day {}: {}", activity.day, activity.text);
        }
    }

    let c = &plan.costs;
    let _ = writeln!(
        out,
        "\nCosts: accommodation {:.2}, food {:.2}, activities {:.2}, transport {:.2}, total {:.2}",
        c.accommodation, c.food, c.activities, c.transport, c.total
    );
    match selection {
        Some(f) => {
            let _ = writeln!(out, "Selected flight: {}", flight_line(f));
        }
        None => out.push_str("Selected flight: none\n"),
    }
    if let Some(total) = trip_total {
        let _ = writeln!(out, "Trip total: {total:.2}");
    }

    if !plan.checklist.is_empty() {
        out.push_str("\nChecklist:\n");
        for (i, item) in plan.checklist.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} {}", i + 1, mark(item.completed), item.task);
        }
    }

    if !plan.packing_list.is_empty() {
        out.push_str("\nPacking:\n");
        for (ci, category) in plan.packing_list.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", ci + 1, category.category);
            for (ii, item) in category.items.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "     {}. {} {} x{}",
                    ii + 1,
                    mark(item.packed),
                    item.item,
                    item.quantity
                );
            }
        }
    }

    if !plan.weather.is_empty() {
        out.push_str("\nWeather:\n");
        for w in &plan.weather {
            let _ = writeln!(
                out,
                "  {}: {:.1} C, {}",
                w.destination, w.avg_temp_celsius, w.forecast_summary
            );
        }
    }
    out
}

pub fn flight_line(f: &Flight) -> String {
    let stops = match f.stops {
        0 => "nonstop".to_owned(),
        1 => "1 stop".to_owned(),
        n => format!("{n} stops"),
    };
    format!("{}, {stops}, {:.2} ({})", f.airline, f.price, f.cabin_class)
}

fn mark(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

fn image_label(image: &ImageState) -> &'static str {
    match image {
        ImageState::Pending => "pending",
        ImageState::Resolved(_) => "ready",
        ImageState::Failed => "unavailable",
    }
}

fn print_image_summary(planner: &Planner) {
    let Some(plan) = planner.plan() else {
        return;
    };
    let ready = plan
        .itinerary
        .iter()
        .filter(|d| matches!(d.image, ImageState::Resolved(_)))
        .count();
    println!("Images: {ready} of {} ready", plan.itinerary.len());
}

// -----------------------------------------------------------------------
// wayfarer toggle
// -----------------------------------------------------------------------

pub fn cmd_toggle(config: &WayfarerConfig, target: ToggleTarget) -> Result<()> {
    let mut planner = session::open_saved(config)?;

    match target {
        ToggleTarget::Checklist { number } => {
            let index = to_index(number, "checklist item")?;
            let completed = planner.toggle_checklist(index)?;
            let task = planner
                .plan()
                .map(|p| p.checklist[index].task.clone())
                .unwrap_or_default();
            println!("{} {task}", mark(completed));
        }
        ToggleTarget::Packing { category, item } => {
            let ci = to_index(category, "packing category")?;
            let ii = to_index(item, "packing item")?;
            let packed = planner.toggle_packing(ci, ii)?;
            let name = planner
                .plan()
                .map(|p| p.packing_list[ci].items[ii].item.clone())
                .unwrap_or_default();
            println!("{} {name}", mark(packed));
        }
    }

    save(&mut planner)?;
    Ok(())
}

/// Convert a 1-based number from the command line to an index.
pub fn to_index(number: usize, what: &str) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("{what} numbers start at 1"),
    }
}

// -----------------------------------------------------------------------
// wayfarer save / discard
// -----------------------------------------------------------------------

pub async fn cmd_save(config: &WayfarerConfig) -> Result<()> {
    let mut planner = session::open_saved(config)?;
    planner.settle().await;
    save(&mut planner)?;
    print_image_summary(&planner);
    println!("Saved.");
    Ok(())
}

/// Save the planner, reporting failures through [`explain`].
pub fn save(planner: &mut Planner) -> Result<()> {
    planner
        .save()
        .map_err(|e| explain(e, "failed to save plan".to_owned()))
}

/// Wrap a planner error with `what`, flagging failures that a fresh
/// generation or another attempt can get past.
pub fn explain(err: PlannerError, what: String) -> anyhow::Error {
    let context = if err.is_retryable() {
        format!("{what} (retryable)")
    } else {
        what
    };
    anyhow::Error::new(err).context(context)
}

pub fn cmd_discard(config: &WayfarerConfig, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to discard the saved plan without --yes");
    }
    let mut planner = session::open(config);
    planner.discard_saved().context("failed to discard plan")?;
    println!("Saved plan discarded.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::assemble;
    use wayfarer_test_utils::{sample_params, sample_payload};

    #[test]
    fn summary_lists_sections_and_selection() {
        let plan = assemble(&sample_payload(&["Paris", "Rome"])).unwrap();
        let params = sample_params(&["Paris", "Rome"]);
        let flight = plan.flights[3].clone();
        let total = plan.trip_total(Some(&flight), &params.passengers);

        let text = render_summary(&plan, &params, Some(&flight), Some(total));
        assert!(text.starts_with("Lisbon to Paris, Rome (2026, international, economy)\n"));
        assert!(text.contains("  1. Paris [image: pending]\n"));
        assert!(text.contains("     Day 1: Walk the old town of Rome\n"));
        assert!(text.contains("Selected flight: TAP, nonstop, 130.00 (economy)\n"));
        assert!(text.contains("Trip total: 1390.00\n"));
        assert!(text.contains("  1. [ ] Passport\n"));
        assert!(text.contains("     2. [ ] Rain jacket x1\n"));
    }

    #[test]
    fn flight_line_pluralizes_stops() {
        let mut f = Flight {
            airline: "Iberia".to_owned(),
            stops: 1,
            price: 99.5,
            cabin_class: "business".to_owned(),
        };
        assert_eq!(flight_line(&f), "Iberia, 1 stop, 99.50 (business)");
        f.stops = 3;
        assert_eq!(flight_line(&f), "Iberia, 3 stops, 99.50 (business)");
    }

    #[test]
    fn explain_marks_retryable_failures() {
        let err = explain(
            PlannerError::MalformedPayload("no JSON object found".to_owned()),
            "could not install plan from a.txt".to_owned(),
        );
        let text = format!("{err:#}");
        assert!(text.starts_with("could not install plan from a.txt (retryable): "));
        assert!(text.contains("malformed plan payload: no JSON object found"));

        let err = explain(
            PlannerError::InvalidParameters("origin must not be empty".to_owned()),
            "could not install plan from a.txt".to_owned(),
        );
        assert_eq!(
            format!("{err:#}"),
            "could not install plan from a.txt: invalid trip parameters: origin must not be empty"
        );
    }

    #[test]
    fn numbers_are_one_based() {
        assert_eq!(to_index(1, "item").unwrap(), 0);
        assert!(to_index(0, "item").is_err());
    }
}
