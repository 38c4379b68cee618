//! Image fill: one independent generation request per destination.
//!
//! Requests run as separate Tokio tasks. A task never touches the plan; it
//! reports an [`ImageSettled`] event to the planner, which applies it only
//! if the plan instance it was issued for is still the active one.
//!
//! ```text
//! Planner::fill_images
//!     |
//!     +-- spawn(dest 0) --generate()--> ImageSettled{instance, 0, ..} --+
//!     +-- spawn(dest 1) --generate()--> ImageSettled{instance, 1, ..} --+--> mpsc --> Planner::handle_event
//!     +-- spawn(dest n) --generate()--> ImageSettled{instance, n, ..} --+      (identity check, then settle)
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::ImageState;
use crate::planner::PlannerEvent;

/// Adapter interface for the image-generation collaborator.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce one encoded image for `destination`.
    ///
    /// An error or an empty string marks the destination's image as failed.
    async fn generate(&self, destination: &str) -> Result<String>;
}

// Compile-time assertion: ImageGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ImageGenerator) {}
};

/// Completion of one image request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettled {
    /// Plan instance the request was issued for.
    pub instance: Uuid,
    /// Index of the destination in the itinerary.
    pub index: usize,
    pub destination: String,
    /// `Resolved` or `Failed`; never `Pending`.
    pub outcome: ImageState,
}

/// Map a collaborator result onto a settled image state.
pub fn settle_outcome(destination: &str, result: Result<String>) -> ImageState {
    match result {
        Ok(data) if !data.trim().is_empty() => ImageState::Resolved(data),
        Ok(_) => {
            warn!(destination, "image generator returned an empty result");
            ImageState::Failed
        }
        Err(e) => {
            warn!(destination, error = %e, "image generation failed");
            ImageState::Failed
        }
    }
}

/// Spawn one request per `(index, destination)` pair.
///
/// Each task reports exactly one [`ImageSettled`] unless `cancel` fires
/// first, in which case it reports nothing. A panicking generator settles
/// its own slot as failed without affecting the others.
pub fn spawn_image_requests(
    instance: Uuid,
    destinations: Vec<(usize, String)>,
    generator: Arc<dyn ImageGenerator>,
    events: mpsc::UnboundedSender<PlannerEvent>,
    cancel: CancellationToken,
) {
    for (index, destination) in destinations {
        let generator = Arc::clone(&generator);
        let events = events.clone();
        let cancel = cancel.clone();

        tokio::spawn(async move {
            let request = AssertUnwindSafe(generator.generate(&destination)).catch_unwind();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%instance, destination = %destination, "image request cancelled");
                    return;
                }
                result = request => result,
            };

            let outcome = match result {
                Ok(result) => settle_outcome(&destination, result),
                Err(_) => {
                    warn!(destination = %destination, "image generator panicked");
                    ImageState::Failed
                }
            };

            let settled = ImageSettled {
                instance,
                index,
                destination,
                outcome,
            };
            // The planner may already be gone; nothing to report to then.
            let _ = events.send(PlannerEvent::Image(settled));
        });
    }
}
