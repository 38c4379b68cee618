//! Raw generation payload: locating the JSON object inside model output and
//! the lenient wire shapes it is decoded into.
//!
//! Models wrap their answer in prose, code fences or custom delimiter
//! markers. [`extract_json_object`] finds the first balanced `{...}` span,
//! skipping braces that appear inside string literals.

use serde::Deserialize;

/// Return the first balanced `{...}` span in `text`, or `None` when there is
/// no opening brace or the object never closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Free text that some models send as a list of bullet strings instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::List(items) => items.join("\n"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlan {
    pub itinerary: Vec<RawDestination>,
    pub costs: RawCosts,
    pub flights: Vec<RawFlight>,
    #[serde(default)]
    pub checklist: Option<Vec<RawChecklistItem>>,
    #[serde(default, alias = "packingList")]
    pub packing_list: Option<Vec<RawPackingCategory>>,
    #[serde(default)]
    pub locations: Option<Vec<RawLocation>>,
    #[serde(default)]
    pub weather: Option<Vec<RawWeather>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDestination {
    #[serde(alias = "destination")]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, alias = "dailyActivities", alias = "daily_plan")]
    pub daily_activities: Option<Vec<RawActivity>>,
    #[serde(default, alias = "transportTips")]
    pub transport_tips: Option<TextOrList>,
    #[serde(default, alias = "safetyTips")]
    pub safety_tips: Option<TextOrList>,
    #[serde(default, alias = "foodRecommendations")]
    pub food_recommendations: Option<Vec<RawFood>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawActivity {
    pub day: u32,
    #[serde(alias = "activity")]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFood {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCosts {
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub transport: f64,
    #[serde(alias = "total_excluding_flights", alias = "totalExcludingFlights")]
    pub total: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawChecklistItem {
    pub task: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPackingCategory {
    pub category: String,
    #[serde(default)]
    pub items: Option<Vec<RawPackingItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPackingItem {
    pub item: String,
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFlight {
    pub airline: String,
    pub stops: i64,
    pub price: f64,
    #[serde(default, alias = "class", alias = "cabinClass")]
    pub cabin_class: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLocation {
    pub city: String,
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawWeather {
    pub destination: String,
    #[serde(alias = "avgTempCelsius", alias = "avg_temp")]
    pub avg_temp_celsius: f64,
    #[serde(default, alias = "forecast", alias = "forecastSummary")]
    pub forecast_summary: Option<String>,
}
