//! Plain-text exports handed to the download surface.

use std::borrow::Cow;
use std::fmt::Write;

use crate::model::{ChecklistItem, Flight, PackingCategory};

/// Checklist as `[x] task` / `[ ] task` lines, each followed by `- details`.
pub fn checklist_text(items: &[ChecklistItem]) -> String {
    let mut out = String::new();
    for item in items {
        let mark = if item.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "[{mark}] {}", item.task);
        let _ = writeln!(out, "- {}", item.details);
    }
    out
}

/// Packing list grouped by category, with quantities.
pub fn packing_text(categories: &[PackingCategory]) -> String {
    let mut out = String::new();
    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}:", category.category);
        for item in &category.items {
            let mark = if item.packed { 'x' } else { ' ' };
            let _ = writeln!(out, "[{mark}] {} x{}", item.item, item.quantity);
        }
    }
    out
}

/// Flights as CSV with the header `airline,stops,price,class`.
pub fn flights_csv(flights: &[Flight]) -> String {
    let mut out = String::from("airline,stops,price,class\n");
    for flight in flights {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            csv_field(&flight.airline),
            flight.stops,
            flight.price,
            csv_field(&flight.cabin_class),
        );
    }
    out
}

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
