//! Plan assembly: normalize an untrusted generation payload into a [`Plan`].
//!
//! Required sections are `itinerary`, `costs` and `flights`; `checklist`,
//! `packing_list`, `locations` and `weather` default to empty. Completion
//! flags in the input are never trusted: every checklist and packing item
//! starts unchecked, and every destination image starts `Pending`.

use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::model::{
    Activity, ChecklistItem, Costs, DestinationPlan, Flight, FoodRecommendation, ImageState,
    Location, PackingCategory, PackingItem, Plan, WeatherInfo,
};
use crate::payload::{RawCosts, RawDestination, RawFlight, RawPlan, extract_json_object};

/// Assemble a plan from raw model output.
///
/// The output may carry prose or delimiter markers around the JSON; the
/// first balanced object is used.
pub fn assemble(raw: &str) -> Result<Plan, PlannerError> {
    let json = extract_json_object(raw).ok_or_else(|| {
        PlannerError::MalformedPayload("no JSON object found in generation output".to_owned())
    })?;
    let parsed: RawPlan = serde_json::from_str(json)
        .map_err(|e| PlannerError::MalformedPayload(e.to_string()))?;
    normalize(parsed)
}

/// Assemble a plan from an already-parsed JSON value.
pub fn assemble_value(value: serde_json::Value) -> Result<Plan, PlannerError> {
    let parsed: RawPlan = serde_json::from_value(value)
        .map_err(|e| PlannerError::MalformedPayload(e.to_string()))?;
    normalize(parsed)
}

fn normalize(raw: RawPlan) -> Result<Plan, PlannerError> {
    if raw.itinerary.is_empty() {
        return Err(PlannerError::MalformedPayload(
            "itinerary must list at least one destination".to_owned(),
        ));
    }

    let costs = normalize_costs(raw.costs)?;
    let itinerary: Vec<DestinationPlan> =
        raw.itinerary.into_iter().map(normalize_destination).collect();

    let offered = raw.flights.len();
    let flights: Vec<Flight> = raw.flights.into_iter().filter_map(normalize_flight).collect();
    if flights.len() < offered {
        warn!(
            offered,
            kept = flights.len(),
            "dropped invalid flight offers from payload"
        );
    }

    let checklist = raw
        .checklist
        .unwrap_or_default()
        .into_iter()
        .map(|c| ChecklistItem {
            task: c.task,
            details: c.details.unwrap_or_default(),
            completed: false,
        })
        .collect();

    let packing_list = raw
        .packing_list
        .unwrap_or_default()
        .into_iter()
        .map(|cat| PackingCategory {
            category: cat.category,
            items: cat
                .items
                .unwrap_or_default()
                .into_iter()
                .map(|i| PackingItem {
                    item: i.item,
                    quantity: i
                        .quantity
                        .and_then(|q| u32::try_from(q).ok())
                        .unwrap_or(1)
                        .max(1),
                    packed: false,
                })
                .collect(),
        })
        .collect();

    let locations = raw
        .locations
        .unwrap_or_default()
        .into_iter()
        .map(|l| Location {
            city: l.city,
            lat: l.lat,
            lng: l.lng,
        })
        .collect();

    let weather = raw
        .weather
        .unwrap_or_default()
        .into_iter()
        .map(|w| WeatherInfo {
            destination: w.destination,
            avg_temp_celsius: w.avg_temp_celsius,
            forecast_summary: w.forecast_summary.unwrap_or_default(),
        })
        .collect();

    let plan = Plan {
        itinerary,
        costs,
        checklist,
        packing_list,
        flights,
        locations,
        weather,
    };
    debug!(
        destinations = plan.itinerary.len(),
        flights = plan.flights.len(),
        checklist = plan.checklist.len(),
        "assembled plan"
    );
    Ok(plan)
}

fn normalize_costs(raw: RawCosts) -> Result<Costs, PlannerError> {
    let fields = [
        ("accommodation", raw.accommodation),
        ("food", raw.food),
        ("activities", raw.activities),
        ("transport", raw.transport),
        ("total", raw.total),
    ];
    for (name, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(PlannerError::MalformedPayload(format!(
                "cost {name} must be a non-negative number, got {value}"
            )));
        }
    }
    Ok(Costs {
        accommodation: raw.accommodation,
        food: raw.food,
        activities: raw.activities,
        transport: raw.transport,
        total: raw.total,
    })
}

fn normalize_destination(raw: RawDestination) -> DestinationPlan {
    DestinationPlan {
        name: raw.name,
        summary: raw.summary.unwrap_or_default(),
        activities: raw
            .daily_activities
            .unwrap_or_default()
            .into_iter()
            .map(|a| Activity {
                day: a.day,
                text: a.text,
            })
            .collect(),
        transport_tips: raw.transport_tips.map(|t| t.into_text()).unwrap_or_default(),
        safety_tips: raw.safety_tips.map(|t| t.into_text()).unwrap_or_default(),
        food: raw
            .food_recommendations
            .unwrap_or_default()
            .into_iter()
            .map(|f| FoodRecommendation {
                name: f.name,
                description: f.description.unwrap_or_default(),
            })
            .collect(),
        image: ImageState::Pending,
    }
}

/// Keep a flight only if its stop count and price are sane.
fn normalize_flight(raw: RawFlight) -> Option<Flight> {
    let stops = u32::try_from(raw.stops).ok()?;
    if !raw.price.is_finite() || raw.price < 0.0 {
        return None;
    }
    Some(Flight {
        airline: raw.airline,
        stops,
        price: raw.price,
        cabin_class: raw.cabin_class.unwrap_or_default(),
    })
}
