use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether the trip stays inside the origin country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripKind {
    Domestic,
    International,
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Domestic => "domestic",
            Self::International => "international",
        };
        f.write_str(s)
    }
}

impl FromStr for TripKind {
    type Err = TripKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domestic" => Ok(Self::Domestic),
            "international" => Ok(Self::International),
            other => Err(TripKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TripKind`] string.
#[derive(Debug, Clone)]
pub struct TripKindParseError(pub String);

impl fmt::Display for TripKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid trip kind: {:?}", self.0)
    }
}

impl std::error::Error for TripKindParseError {}

// ---------------------------------------------------------------------------

/// Requested cabin class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium_economy",
            Self::Business => "business",
            Self::First => "first",
        };
        f.write_str(s)
    }
}

impl FromStr for CabinClass {
    type Err = CabinClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "economy" => Ok(Self::Economy),
            "premium_economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            other => Err(CabinClassParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`CabinClass`] string.
#[derive(Debug, Clone)]
pub struct CabinClassParseError(pub String);

impl fmt::Display for CabinClassParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cabin class: {:?}", self.0)
    }
}

impl std::error::Error for CabinClassParseError {}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Passenger counts by fare category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Passengers {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
}

impl Passengers {
    /// Passengers who occupy a seat and pay a fare. Infants travel on a lap.
    ///
    /// `None` when the count does not fit in a `u32`.
    pub fn ticketed(&self) -> Option<u32> {
        self.adults.checked_add(self.children)
    }
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

/// The inputs a plan was generated from.
///
/// The planner never interprets these beyond validation; they tag a plan
/// for history and for recomputing the trip total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripParameters {
    /// Year the fares and weather are predicted for.
    pub year: i32,
    pub kind: TripKind,
    pub origin: String,
    /// Ordered, duplicate-free destination names.
    pub destinations: Vec<String>,
    pub passengers: Passengers,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub cabin_class: CabinClass,
    #[serde(default)]
    pub stopover: bool,
    #[serde(default)]
    pub style: String,
}

impl TripParameters {
    /// Check the structural rules: a non-empty origin, at least one
    /// destination, no duplicate destinations, a seated passenger and
    /// `start < end` when both dates are set.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.origin.trim().is_empty() {
            return Err(PlannerError::InvalidParameters(
                "origin must not be empty".to_owned(),
            ));
        }
        if self.destinations.is_empty() {
            return Err(PlannerError::InvalidParameters(
                "at least one destination is required".to_owned(),
            ));
        }
        let mut seen = HashSet::new();
        for name in &self.destinations {
            if name.trim().is_empty() {
                return Err(PlannerError::InvalidParameters(
                    "destination names must not be empty".to_owned(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(PlannerError::InvalidParameters(format!(
                    "duplicate destination: {name:?}"
                )));
            }
        }
        match self.passengers.ticketed() {
            None => {
                return Err(PlannerError::InvalidParameters(format!(
                    "too many passengers: {} adults and {} children",
                    self.passengers.adults, self.passengers.children
                )));
            }
            Some(0) => {
                return Err(PlannerError::InvalidParameters(
                    "at least one adult or child passenger is required".to_owned(),
                ));
            }
            Some(_) => {}
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start >= end {
                return Err(PlannerError::InvalidParameters(format!(
                    "start date {start} must be before end date {end}"
                )));
            }
        }
        Ok(())
    }

    /// Human-readable title used for history entries, e.g.
    /// `"Lisbon to Paris, Rome"`.
    pub fn title(&self) -> String {
        format!("{} to {}", self.origin, self.destinations.join(", "))
    }
}
