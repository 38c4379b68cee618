//! The planner: single owner of all plan state.
//!
//! Every mutation happens on `&mut Planner` in reaction to a discrete event:
//! a user action (filter change, toggle, selection, save), or an async
//! completion delivered as a [`PlannerEvent`]. Background work (image
//! requests, the load-more timer) runs on Tokio tasks that hold no state and
//! report back over an `mpsc` channel. The owner drains that channel with
//! [`Planner::next_event`] + [`Planner::handle_event`], or [`Planner::settle`].
//!
//! The plan itself sits behind an `Arc`. Readers take a snapshot with
//! [`Planner::plan`]; writers go through `Arc::make_mut`, so a snapshot is
//! never observed half-updated.
//!
//! Methods that start background work must be called inside a Tokio runtime.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wayfarer_store::KvStore;

use crate::assemble::assemble;
use crate::catalog::{FilterCriteria, FlightCatalog, LoadMore, PageTicket};
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::export;
use crate::generate::PlanGenerator;
use crate::images::{ImageGenerator, ImageSettled, spawn_image_requests};
use crate::model::{Flight, Plan, TripParameters};
use crate::persist::{HistoryRing, PersistenceBridge};
use crate::tracker::{self, InteractionTracker};

/// Completion of background work, addressed to one plan instance.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerEvent {
    Image(ImageSettled),
    PageReady { instance: Uuid, ticket: PageTicket },
}

/// The plan currently on screen plus everything derived from it.
struct ActivePlan {
    /// Fresh per install; background results are matched against it.
    instance: Uuid,
    plan: Arc<Plan>,
    parameters: TripParameters,
    catalog: FlightCatalog,
    images_in_flight: HashSet<usize>,
    image_cancel: CancellationToken,
}

pub struct Planner {
    config: PlannerConfig,
    bridge: PersistenceBridge,
    images: Arc<dyn ImageGenerator>,
    active: Option<ActivePlan>,
    tracker: InteractionTracker,
    history: HistoryRing,
    page_cancel: Option<CancellationToken>,
    shutdown: CancellationToken,
    events_tx: mpsc::UnboundedSender<PlannerEvent>,
    events_rx: mpsc::UnboundedReceiver<PlannerEvent>,
}

impl Planner {
    /// Create an empty planner. The history ring is read from `store`.
    pub fn new(
        config: PlannerConfig,
        store: Arc<dyn KvStore>,
        images: Arc<dyn ImageGenerator>,
    ) -> Self {
        let bridge = PersistenceBridge::new(store);
        let history = bridge.load_history();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config: config.normalized(),
            bridge,
            images,
            active: None,
            tracker: InteractionTracker::new(),
            history,
            page_cancel: None,
            shutdown: CancellationToken::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Plan lifecycle
    // -----------------------------------------------------------------------

    /// Request a new plan from `generator` and install it.
    ///
    /// The current plan is cleared first, so on any failure the planner is
    /// left without a plan. On success the parameters are recorded in
    /// history and image requests are issued.
    pub async fn generate(
        &mut self,
        parameters: TripParameters,
        generator: &dyn PlanGenerator,
    ) -> Result<Arc<Plan>, PlannerError> {
        parameters.validate()?;
        self.clear();

        info!(title = %parameters.title(), "requesting plan");
        let raw = generator
            .generate(&parameters)
            .await
            .map_err(|e| PlannerError::TransportFailure {
                collaborator: "plan generator",
                message: format!("{e:#}"),
            })?;

        self.accept_generated(parameters, &raw)
    }

    /// Assemble raw generation output for `parameters` and install it.
    pub fn accept_generated(
        &mut self,
        parameters: TripParameters,
        raw: &str,
    ) -> Result<Arc<Plan>, PlannerError> {
        parameters.validate()?;
        let plan = match assemble(raw) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "rejecting generated plan");
                self.clear();
                return Err(e);
            }
        };

        let plan = self.install(plan, parameters.clone(), InteractionTracker::new());
        let entry_id = self.history.push(parameters, Utc::now()).id;
        self.bridge.persist_history(&self.history);
        debug!(entry_id, "recorded history entry");

        self.fill_images();
        Ok(plan)
    }

    /// Replace the active plan wholesale.
    fn install(
        &mut self,
        plan: Plan,
        parameters: TripParameters,
        tracker: InteractionTracker,
    ) -> Arc<Plan> {
        self.retire_active();

        let instance = Uuid::new_v4();
        let catalog = FlightCatalog::new(plan.flights.clone(), self.config.page_size);
        let plan = Arc::new(plan);
        info!(
            %instance,
            destinations = plan.itinerary.len(),
            flights = plan.flights.len(),
            "installed plan"
        );

        self.active = Some(ActivePlan {
            instance,
            plan: Arc::clone(&plan),
            parameters,
            catalog,
            images_in_flight: HashSet::new(),
            image_cancel: self.shutdown.child_token(),
        });
        self.tracker = tracker;
        plan
    }

    /// Drop the active plan and cancel its background work.
    fn retire_active(&mut self) {
        self.cancel_page_load();
        if let Some(old) = self.active.take() {
            old.image_cancel.cancel();
            debug!(instance = %old.instance, "retired plan");
        }
    }

    /// Forget the current plan, its selection and edits.
    pub fn clear(&mut self) {
        self.retire_active();
        self.tracker = InteractionTracker::new();
    }

    /// A consistent snapshot of the current plan.
    pub fn plan(&self) -> Option<Arc<Plan>> {
        self.active.as_ref().map(|a| Arc::clone(&a.plan))
    }

    pub fn parameters(&self) -> Option<&TripParameters> {
        self.active.as_ref().map(|a| &a.parameters)
    }

    /// Identity of the active plan instance.
    pub fn instance(&self) -> Option<Uuid> {
        self.active.as_ref().map(|a| a.instance)
    }

    /// Fare-inclusive trip estimate for the current selection.
    pub fn trip_total(&self) -> Option<f64> {
        let active = self.active.as_ref()?;
        Some(
            active
                .plan
                .trip_total(self.tracker.selection(), &active.parameters.passengers),
        )
    }

    // -----------------------------------------------------------------------
    // Image fill
    // -----------------------------------------------------------------------

    /// Issue one image request per pending destination that has none in
    /// flight. Returns the number of requests issued.
    pub fn fill_images(&mut self) -> usize {
        let Some(active) = self.active.as_mut() else {
            return 0;
        };

        let targets: Vec<(usize, String)> = active
            .plan
            .pending_images()
            .filter(|(i, _)| !active.images_in_flight.contains(i))
            .map(|(i, name)| (i, name.to_owned()))
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let issued = targets.len();
        active.images_in_flight.extend(targets.iter().map(|(i, _)| *i));
        debug!(instance = %active.instance, issued, "issuing image requests");
        spawn_image_requests(
            active.instance,
            targets,
            Arc::clone(&self.images),
            self.events_tx.clone(),
            active.image_cancel.clone(),
        );
        issued
    }

    fn apply_image(&mut self, settled: ImageSettled) -> bool {
        let Some(active) = self
            .active
            .as_mut()
            .filter(|a| a.instance == settled.instance)
        else {
            debug!(
                instance = %settled.instance,
                destination = %settled.destination,
                "discarding image for a stale plan"
            );
            return false;
        };

        active.images_in_flight.remove(&settled.index);
        let slot_matches = active
            .plan
            .itinerary
            .get(settled.index)
            .is_some_and(|d| d.name == settled.destination && d.image.is_pending());
        if !slot_matches {
            debug!(index = settled.index, "image slot already settled or gone");
            return false;
        }

        Arc::make_mut(&mut active.plan).settle_image(settled.index, settled.outcome)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Wait for the next background completion.
    pub async fn next_event(&mut self) -> Option<PlannerEvent> {
        self.events_rx.recv().await
    }

    /// Apply one completion. Returns whether it changed any state; results
    /// for a replaced plan or an invalidated page load are dropped.
    pub fn handle_event(&mut self, event: PlannerEvent) -> bool {
        match event {
            PlannerEvent::Image(settled) => self.apply_image(settled),
            PlannerEvent::PageReady { instance, ticket } => self.apply_page(instance, ticket),
        }
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Whether image requests or a page load are outstanding for the
    /// active plan.
    pub fn has_pending_work(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| !a.images_in_flight.is_empty() || a.catalog.is_loading())
    }

    /// Process events until no background work remains for the active plan.
    pub async fn settle(&mut self) {
        while self.has_pending_work() {
            match self.events_rx.recv().await {
                Some(event) => {
                    self.handle_event(event);
                }
                None => break,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Flight catalog
    // -----------------------------------------------------------------------

    pub fn criteria(&self) -> Option<&FilterCriteria> {
        self.active.as_ref().map(|a| a.catalog.criteria())
    }

    /// Replace the flight filter and reset to the first page.
    pub fn set_filter(&mut self, criteria: FilterCriteria) -> Result<(), PlannerError> {
        if self.active.is_none() {
            return Err(PlannerError::NoPlan);
        }
        self.cancel_page_load();
        if let Some(active) = self.active.as_mut() {
            active.catalog.set_criteria(criteria);
            debug!(
                filtered = active.catalog.filtered().len(),
                "flight filter changed"
            );
        }
        Ok(())
    }

    /// Handle a load-more trigger from the last rendered row.
    ///
    /// When a page load starts, the next page lands after the configured
    /// delay as a [`PlannerEvent::PageReady`].
    pub fn load_more(&mut self) -> Result<LoadMore, PlannerError> {
        let active = self.active.as_mut().ok_or(PlannerError::NoPlan)?;
        let outcome = active.catalog.begin_load_more();

        if let LoadMore::Started(ticket) = outcome {
            let cancel = self.shutdown.child_token();
            self.page_cancel = Some(cancel.clone());

            let events = self.events_tx.clone();
            let delay = self.config.load_more_delay();
            let instance = active.instance;
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        let _ = events.send(PlannerEvent::PageReady { instance, ticket });
                    }
                }
            });
        }
        Ok(outcome)
    }

    fn apply_page(&mut self, instance: Uuid, ticket: PageTicket) -> bool {
        let Some(active) = self.active.as_mut().filter(|a| a.instance == instance) else {
            return false;
        };
        let applied = active.catalog.complete_load_more(ticket);
        if applied {
            self.page_cancel = None;
            debug!(
                displayed = active.catalog.displayed().len(),
                filtered = active.catalog.filtered().len(),
                "appended flight page"
            );
        }
        applied
    }

    fn cancel_page_load(&mut self) {
        if let Some(token) = self.page_cancel.take() {
            token.cancel();
        }
        if let Some(active) = self.active.as_mut() {
            if active.catalog.invalidate() {
                debug!("cancelled pending flight page");
            }
        }
    }

    /// The rendered prefix of the filtered flights.
    pub fn displayed_flights(&self) -> &[Flight] {
        match &self.active {
            Some(active) => active.catalog.displayed(),
            None => &[],
        }
    }

    pub fn filtered_flights(&self) -> &[Flight] {
        match &self.active {
            Some(active) => active.catalog.filtered(),
            None => &[],
        }
    }

    pub fn airlines(&self) -> Vec<&str> {
        self.active
            .as_ref()
            .map(|a| a.catalog.airlines())
            .unwrap_or_default()
    }

    pub fn has_more_flights(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.catalog.has_more())
    }

    pub fn is_loading_more(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.catalog.is_loading())
    }

    // -----------------------------------------------------------------------
    // User edits
    // -----------------------------------------------------------------------

    /// Flip checklist item `index`. Returns its new `completed` value.
    pub fn toggle_checklist(&mut self, index: usize) -> Result<bool, PlannerError> {
        let active = self.active.as_mut().ok_or(PlannerError::NoPlan)?;
        if !tracker::checklist_index_valid(&active.plan, index) {
            return Err(PlannerError::NoSuchItem(format!("checklist item {index}")));
        }
        let completed = tracker::toggle_checklist(Arc::make_mut(&mut active.plan), index)?;
        self.tracker.mark_dirty();
        Ok(completed)
    }

    /// Flip packing item `item` of `category`. Returns its new `packed` value.
    pub fn toggle_packing(&mut self, category: usize, item: usize) -> Result<bool, PlannerError> {
        let active = self.active.as_mut().ok_or(PlannerError::NoPlan)?;
        if !tracker::packing_index_valid(&active.plan, category, item) {
            return Err(PlannerError::NoSuchItem(format!(
                "packing item {item} in category {category}"
            )));
        }
        let packed = tracker::toggle_packing(Arc::make_mut(&mut active.plan), category, item)?;
        self.tracker.mark_dirty();
        Ok(packed)
    }

    /// Select `flight`, or clear the selection if it is already selected.
    ///
    /// Cancels any pending page load.
    pub fn select_flight(&mut self, flight: &Flight) -> Result<Option<&Flight>, PlannerError> {
        let active = self.active.as_ref().ok_or(PlannerError::NoPlan)?;
        if !active.plan.contains_flight(flight) {
            return Err(PlannerError::NoSuchItem(format!(
                "flight {} at {}",
                flight.airline, flight.price
            )));
        }
        self.cancel_page_load();
        Ok(self.tracker.select_flight(flight))
    }

    pub fn selection(&self) -> Option<&Flight> {
        self.tracker.selection()
    }

    /// Whether there are edits not yet written by [`Self::save`].
    pub fn is_dirty(&self) -> bool {
        self.active.is_some() && !self.tracker.is_saved()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Persist plan, parameters and selection.
    ///
    /// On failure the in-memory state is untouched and stays dirty.
    pub fn save(&mut self) -> Result<(), PlannerError> {
        let active = self.active.as_ref().ok_or(PlannerError::NoPlan)?;
        self.bridge
            .save(&active.plan, &active.parameters, self.tracker.selection())?;
        self.tracker.mark_saved();
        Ok(())
    }

    /// Restore the last saved snapshot, if a valid one exists.
    ///
    /// Destinations whose image was still pending get fresh requests.
    pub fn restore(&mut self) -> bool {
        let Some(snapshot) = self.bridge.load() else {
            return false;
        };
        self.install(
            snapshot.plan,
            snapshot.trip_parameters,
            InteractionTracker::restored(snapshot.selection),
        );
        self.fill_images();
        true
    }

    /// Remove the saved snapshot.
    pub fn discard_saved(&mut self) -> Result<(), PlannerError> {
        self.bridge.discard()?;
        self.tracker.mark_dirty();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    /// Load a past request: the current plan is cleared and the stored
    /// parameters are returned for the caller to regenerate from.
    pub fn recall_history(&mut self, id: i64) -> Option<TripParameters> {
        let parameters = self.history.get(id)?.parameters.clone();
        self.clear();
        Some(parameters)
    }

    /// Empty the history ring and its stored record. Confirmation is the
    /// caller's job.
    pub fn clear_history(&mut self) {
        self.bridge.clear_history(&mut self.history);
        info!("cleared history");
    }

    // -----------------------------------------------------------------------
    // Exports
    // -----------------------------------------------------------------------

    pub fn export_checklist(&self) -> Option<String> {
        self.active
            .as_ref()
            .map(|a| export::checklist_text(&a.plan.checklist))
    }

    pub fn export_packing_list(&self) -> Option<String> {
        self.active
            .as_ref()
            .map(|a| export::packing_text(&a.plan.packing_list))
    }

    /// CSV of the currently filtered flights.
    pub fn export_flights_csv(&self) -> Option<String> {
        self.active
            .as_ref()
            .map(|a| export::flights_csv(a.catalog.filtered()))
    }
}

impl Drop for Planner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
