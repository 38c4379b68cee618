use serde::{Deserialize, Serialize};

use super::trip::Passengers;

/// Per-destination image slot.
///
/// Every destination carries exactly one of these once a plan is assembled;
/// there is no "absent" state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ImageState {
    /// A request is outstanding (or has not been issued yet).
    #[default]
    Pending,
    /// Encoded image data returned by the image collaborator.
    Resolved(String),
    /// The request failed, timed out or returned nothing. Never retried.
    Failed,
}

impl ImageState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub day: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecommendation {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationPlan {
    pub name: String,
    pub summary: String,
    /// Daily activities in the order the model returned them.
    pub activities: Vec<Activity>,
    pub transport_tips: String,
    pub safety_tips: String,
    pub food: Vec<FoodRecommendation>,
    pub image: ImageState,
}

/// Estimated spend, all non-negative. `total` excludes the flight fare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Costs {
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub transport: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub task: String,
    pub details: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingItem {
    pub item: String,
    /// Always at least 1.
    pub quantity: u32,
    pub packed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingCategory {
    pub category: String,
    pub items: Vec<PackingItem>,
}

/// A flight offer. Flights have no identity field, so selection compares
/// them structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub airline: String,
    pub stops: u32,
    pub price: f64,
    pub cabin_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub destination: String,
    pub avg_temp_celsius: f64,
    pub forecast_summary: String,
}

/// The assembled travel plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub itinerary: Vec<DestinationPlan>,
    pub costs: Costs,
    pub checklist: Vec<ChecklistItem>,
    pub packing_list: Vec<PackingCategory>,
    pub flights: Vec<Flight>,
    /// Travel order, origin first.
    pub locations: Vec<Location>,
    pub weather: Vec<WeatherInfo>,
}

impl Plan {
    /// Whether `flight` is structurally equal to one of this plan's flights.
    pub fn contains_flight(&self, flight: &Flight) -> bool {
        self.flights.iter().any(|f| f == flight)
    }

    /// Indices and names of destinations whose image is still pending.
    pub fn pending_images(&self) -> impl Iterator<Item = (usize, &str)> {
        self.itinerary
            .iter()
            .enumerate()
            .filter(|(_, d)| d.image.is_pending())
            .map(|(i, d)| (i, d.name.as_str()))
    }

    /// Settle the image slot at `index`.
    ///
    /// Only a `Pending` slot transitions; returns `false` (and leaves the
    /// plan untouched) for an unknown index or an already settled slot.
    pub fn settle_image(&mut self, index: usize, outcome: ImageState) -> bool {
        match self.itinerary.get_mut(index) {
            Some(dest) if dest.image.is_pending() && !outcome.is_pending() => {
                dest.image = outcome;
                true
            }
            _ => false,
        }
    }

    /// Estimated trip cost: the fare-free total plus the selected fare for
    /// every ticketed passenger.
    pub fn trip_total(&self, selection: Option<&Flight>, passengers: &Passengers) -> f64 {
        let seats = f64::from(passengers.adults) + f64::from(passengers.children);
        let fare = selection.map_or(0.0, |f| f.price * seats);
        self.costs.total + fare
    }
}
