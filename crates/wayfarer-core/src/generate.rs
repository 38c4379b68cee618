//! The plan-generation collaborator interface.
//!
//! Prompt construction and the model call live behind this trait; the
//! planner only sees the raw text that comes back.

use anyhow::Result;
use async_trait::async_trait;

use crate::model::TripParameters;

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Produce raw model output for `parameters`.
    ///
    /// The output should contain one JSON object matching the plan shape,
    /// possibly wrapped in prose or delimiter markers.
    async fn generate(&self, parameters: &TripParameters) -> Result<String>;
}

// Compile-time assertion: PlanGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanGenerator) {}
};
