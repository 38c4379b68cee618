//! Shared fixtures and collaborator fakes for wayfarer integration tests.
//!
//! Nothing here touches the network or the real filesystem: plan text comes
//! from [`sample_payload`], images from [`FakeImageGenerator`], storage from
//! an in-memory [`MemoryStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};

use wayfarer_core::model::{CabinClass, Passengers, TripKind, TripParameters};
use wayfarer_core::{ImageGenerator, PlanGenerator, Planner, PlannerConfig};
use wayfarer_store::{KvStore, MemoryStore};

/// Airlines used by [`sample_flights`], in first-seen order.
pub const AIRLINES: [&str; 3] = ["TAP", "Iberia", "Ryanair"];

/// Number of flights in [`sample_payload`].
pub const FLIGHT_COUNT: usize = 30;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Trip parameters for the given destinations, departing Lisbon.
pub fn sample_params(destinations: &[&str]) -> TripParameters {
    TripParameters {
        year: 2026,
        kind: TripKind::International,
        origin: "Lisbon".to_owned(),
        destinations: destinations.iter().map(|d| (*d).to_owned()).collect(),
        passengers: Passengers {
            adults: 2,
            children: 1,
            infants: 0,
        },
        start_date: None,
        end_date: None,
        cabin_class: CabinClass::Economy,
        stopover: false,
        style: "culture".to_owned(),
    }
}

/// [`FLIGHT_COUNT`] flights cycling through [`AIRLINES`], with stops
/// `i % 3` and price `100 + 10 * i`.
pub fn sample_flights() -> Value {
    let flights: Vec<Value> = (0..FLIGHT_COUNT)
        .map(|i| {
            json!({
                "airline": AIRLINES[i % AIRLINES.len()],
                "stops": i % 3,
                "price": 100.0 + 10.0 * i as f64,
                "cabin_class": "economy",
            })
        })
        .collect();
    Value::Array(flights)
}

/// A complete, well-formed plan payload for `destinations`.
pub fn sample_payload_value(destinations: &[&str]) -> Value {
    let itinerary: Vec<Value> = destinations
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "summary": format!("Three days in {name}"),
                "daily_activities": [
                    {"day": 1, "text": format!("Walk the old town of {name}")},
                    {"day": 2, "text": "Museum morning"},
                ],
                "transport_tips": ["Buy a day pass", "Trams stop at midnight"],
                "safety_tips": "Mind your pockets on busy trams.",
                "food_recommendations": [
                    {"name": "Local bakery", "description": "Get there early"},
                ],
            })
        })
        .collect();

    json!({
        "itinerary": itinerary,
        "costs": {
            "accommodation": 600.0,
            "food": 250.0,
            "activities": 120.0,
            "transport": 30.0,
            "total": 1000.0,
        },
        "checklist": [
            {"task": "Passport", "details": "Valid for six months", "completed": true},
            {"task": "Travel insurance", "details": "Covers cancellations"},
            {"task": "Adapters", "details": "Type C/F"},
        ],
        "packing_list": [
            {"category": "Clothes", "items": [
                {"item": "Socks", "quantity": 4},
                {"item": "Rain jacket", "quantity": 0},
            ]},
            {"category": "Documents", "items": [
                {"item": "Tickets"},
            ]},
        ],
        "flights": sample_flights(),
        "locations": [
            {"city": "Lisbon", "lat": 38.72, "lng": -9.14},
        ],
        "weather": [
            {"destination": destinations.first().copied().unwrap_or("Lisbon"),
             "avg_temp_celsius": 18.5, "forecast_summary": "Mild"},
        ],
    })
}

/// [`sample_payload_value`] rendered the way a model answers: prose around
/// a fenced JSON block.
pub fn sample_payload(destinations: &[&str]) -> String {
    format!(
        "Here is your plan.\n```json\n{}\n```\nHave a great trip!",
        sample_payload_value(destinations)
    )
}

/// A planner over `store` with the default configuration.
pub fn planner_with(store: Arc<dyn KvStore>, images: Arc<dyn ImageGenerator>) -> Planner {
    Planner::new(PlannerConfig::default(), store, images)
}

/// A planner over a fresh [`MemoryStore`] and a [`FakeImageGenerator`] that
/// resolves everything immediately.
pub fn memory_planner() -> (Arc<MemoryStore>, Planner) {
    let store = Arc::new(MemoryStore::new());
    let planner = planner_with(store.clone(), Arc::new(FakeImageGenerator::new()));
    (store, planner)
}

// ---------------------------------------------------------------------------
// Image generator fake
// ---------------------------------------------------------------------------

/// Scripted result for one destination.
#[derive(Debug, Clone)]
pub enum ImageScript {
    /// Return `img:<destination>`.
    Resolve,
    /// Return the given data.
    Data(String),
    /// Return an empty string.
    Empty,
    /// Return an error.
    Fail,
    /// Panic inside the request.
    Panic,
}

/// Image generator with per-destination outcomes and delays. Unscripted
/// destinations resolve to `img:<destination>` without delay.
#[derive(Default)]
pub struct FakeImageGenerator {
    scripts: HashMap<String, ImageScript>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeImageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, destination: &str, script: ImageScript) -> Self {
        self.scripts.insert(destination.to_owned(), script);
        self
    }

    pub fn with_delay(mut self, destination: &str, delay: Duration) -> Self {
        self.delays.insert(destination.to_owned(), delay);
        self
    }

    /// Destinations requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeImageGenerator {
    async fn generate(&self, destination: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(destination.to_owned());

        if let Some(delay) = self.delays.get(destination) {
            tokio::time::sleep(*delay).await;
        }

        match self.scripts.get(destination).unwrap_or(&ImageScript::Resolve) {
            ImageScript::Resolve => Ok(format!("img:{destination}")),
            ImageScript::Data(data) => Ok(data.clone()),
            ImageScript::Empty => Ok(String::new()),
            ImageScript::Fail => bail!("image service unavailable for {destination}"),
            ImageScript::Panic => panic!("image generator blew up on {destination}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan generator fake
// ---------------------------------------------------------------------------

/// What [`FakePlanGenerator`] answers with.
#[derive(Debug, Clone)]
enum PlanResponse {
    Text(String),
    Sample,
    Fail,
}

/// Plan generator that answers with fixed text, or fails.
pub struct FakePlanGenerator {
    response: PlanResponse,
    calls: Mutex<Vec<TripParameters>>,
}

impl FakePlanGenerator {
    fn with_response(response: PlanResponse) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `text`.
    pub fn answering(text: impl Into<String>) -> Self {
        Self::with_response(PlanResponse::Text(text.into()))
    }

    /// Answer every request with [`sample_payload`] for its destinations.
    pub fn sample() -> Self {
        Self::with_response(PlanResponse::Sample)
    }

    /// Fail every request.
    pub fn failing() -> Self {
        Self::with_response(PlanResponse::Fail)
    }

    pub fn calls(&self) -> Vec<TripParameters> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PlanGenerator for FakePlanGenerator {
    async fn generate(&self, parameters: &TripParameters) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(parameters.clone());

        match &self.response {
            PlanResponse::Text(text) => Ok(text.clone()),
            PlanResponse::Sample => {
                let destinations: Vec<&str> =
                    parameters.destinations.iter().map(String::as_str).collect();
                Ok(sample_payload(&destinations))
            }
            PlanResponse::Fail => bail!("model endpoint returned 503"),
        }
    }
}
