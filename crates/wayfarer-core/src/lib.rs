//! Client-side state manager for generated travel plans.
//!
//! [`Planner`] owns the active [`Plan`] and everything derived from it: the
//! flight catalog with its filter and pagination, per-destination image
//! fill, checklist and packing toggles, and the persisted snapshot and
//! history ring. Plan text and destination images come from collaborators
//! behind the [`PlanGenerator`] and [`ImageGenerator`] traits.

pub mod assemble;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod images;
pub mod model;
pub mod payload;
pub mod persist;
pub mod planner;
pub mod tracker;

pub use assemble::assemble;
pub use catalog::{AirlineFilter, FilterCriteria, FlightCatalog, LoadMore, StopsFilter};
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use generate::PlanGenerator;
pub use images::ImageGenerator;
pub use model::{Flight, ImageState, Plan, TripParameters};
pub use planner::{Planner, PlannerEvent};
