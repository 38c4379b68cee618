//! Flight filter criteria and the conjunctive match predicate.
//!
//! Filtering is pure and total: malformed user input never errors, it
//! widens the filter instead (an unparseable max price means "no limit").

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Flight;

/// Airline facet: a specific carrier or any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirlineFilter {
    #[default]
    Any,
    Exactly(String),
}

impl AirlineFilter {
    /// `"any"` (any case) or blank input means no constraint.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            Self::Any
        } else {
            Self::Exactly(trimmed.to_owned())
        }
    }

    pub fn matches(&self, airline: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(wanted) => wanted == airline,
        }
    }
}

/// Stop-count bucket.
///
/// The UI offers `any`, `0`, `1` and `2+`. Any value other than 0 or 1 lands
/// in the open-ended two-or-more bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopsFilter {
    #[default]
    Any,
    Exactly(u32),
    TwoOrMore,
}

impl StopsFilter {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            return Self::Any;
        }
        match trimmed.parse::<u32>() {
            Ok(n @ (0 | 1)) => Self::Exactly(n),
            _ => Self::TwoOrMore,
        }
    }

    pub fn matches(&self, stops: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(n) => stops == *n,
            Self::TwoOrMore => stops >= 2,
        }
    }
}

impl fmt::Display for StopsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Exactly(n) => write!(f, "{n}"),
            Self::TwoOrMore => f.write_str("2+"),
        }
    }
}

/// The active flight filter. All constraints must hold for a flight to pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub airline: AirlineFilter,
    pub stops: StopsFilter,
    /// Only ever a positive finite number; `None` means unconstrained.
    max_price: Option<f64>,
}

impl FilterCriteria {
    /// Criteria that let every flight through.
    pub fn any() -> Self {
        Self::default()
    }

    /// Build criteria from raw form input.
    pub fn from_inputs(airline: &str, stops: &str, max_price: &str) -> Self {
        Self {
            airline: AirlineFilter::parse(airline),
            stops: StopsFilter::parse(stops),
            max_price: parse_max_price(max_price),
        }
    }

    pub fn with_airline(mut self, airline: AirlineFilter) -> Self {
        self.airline = airline;
        self
    }

    pub fn with_stops(mut self, stops: StopsFilter) -> Self {
        self.stops = stops;
        self
    }

    /// Set the price ceiling. Non-positive or non-finite values clear it.
    pub fn with_max_price(mut self, max_price: Option<f64>) -> Self {
        self.max_price = max_price.filter(|p| p.is_finite() && *p > 0.0);
        self
    }

    pub fn max_price(&self) -> Option<f64> {
        self.max_price
    }

    pub fn matches(&self, flight: &Flight) -> bool {
        self.airline.matches(&flight.airline)
            && self.stops.matches(flight.stops)
            && self.max_price.is_none_or(|max| flight.price <= max)
    }

    /// The flights passing this filter, in their original order.
    pub fn apply(&self, flights: &[Flight]) -> Vec<Flight> {
        flights.iter().filter(|f| self.matches(f)).cloned().collect()
    }
}

fn parse_max_price(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}
