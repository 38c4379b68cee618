//! Entity model: trip parameters and the assembled plan aggregate.

pub mod plan;
pub mod trip;

pub use plan::{
    Activity, ChecklistItem, Costs, DestinationPlan, Flight, FoodRecommendation, ImageState,
    Location, PackingCategory, PackingItem, Plan, WeatherInfo,
};
pub use trip::{CabinClass, Passengers, TripKind, TripParameters};
