//! Flight catalog: the unfiltered flight list, the active filter, and the
//! paginated displayed prefix.
//!
//! Pagination is an explicit two-state machine:
//!
//! ```text
//! Idle    --begin_load_more (more pages)-->  Loading{g}
//! Loading --complete_load_more(ticket g)-->  Idle   (one page appended)
//! Loading --invalidate / set_criteria---->   Idle   (generation bumped,
//!                                                    ticket g now stale)
//! ```
//!
//! The catalog performs no I/O and never sleeps; the caller owns the timer
//! and hands the ticket back when it fires.

pub mod filter;

pub use filter::{AirlineFilter, FilterCriteria, StopsFilter};

use crate::model::Flight;

/// Proof that a page load was started under a particular generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
}

/// Outcome of a load-more trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A page load began; complete it with the ticket after the delay.
    Started(PageTicket),
    /// A load is already in flight; the trigger was ignored.
    AlreadyLoading,
    /// Every filtered flight is already displayed.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading { generation: u64 },
}

#[derive(Debug, Clone)]
pub struct FlightCatalog {
    flights: Vec<Flight>,
    criteria: FilterCriteria,
    filtered: Vec<Flight>,
    pages: usize,
    page_size: usize,
    load: LoadState,
    generation: u64,
}

impl FlightCatalog {
    /// Build a catalog showing the first page of all flights.
    pub fn new(flights: Vec<Flight>, page_size: usize) -> Self {
        let criteria = FilterCriteria::any();
        let filtered = criteria.apply(&flights);
        Self {
            flights,
            criteria,
            filtered,
            pages: 1,
            page_size: page_size.max(1),
            load: LoadState::Idle,
            generation: 0,
        }
    }

    /// The full, unfiltered flight list.
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Flights passing the active filter, in catalog order.
    pub fn filtered(&self) -> &[Flight] {
        &self.filtered
    }

    /// The rendered prefix of [`Self::filtered`].
    pub fn displayed(&self) -> &[Flight] {
        let shown = (self.pages * self.page_size).min(self.filtered.len());
        &self.filtered[..shown]
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.displayed().len() < self.filtered.len()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading { .. })
    }

    /// Distinct airlines across the unfiltered list, in first-seen order.
    pub fn airlines(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for flight in &self.flights {
            if !seen.contains(&flight.airline.as_str()) {
                seen.push(&flight.airline);
            }
        }
        seen
    }

    /// Replace the filter, recompute the filtered list and reset to page 1.
    ///
    /// Any in-flight page load is invalidated.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.filtered = criteria.apply(&self.flights);
        self.criteria = criteria;
        self.pages = 1;
        self.invalidate();
    }

    /// Abandon any in-flight page load. Returns whether one was pending.
    pub fn invalidate(&mut self) -> bool {
        let was_loading = self.is_loading();
        self.generation += 1;
        self.load = LoadState::Idle;
        was_loading
    }

    /// Handle a load-more trigger.
    pub fn begin_load_more(&mut self) -> LoadMore {
        if self.is_loading() {
            return LoadMore::AlreadyLoading;
        }
        if !self.has_more() {
            return LoadMore::Exhausted;
        }
        self.load = LoadState::Loading {
            generation: self.generation,
        };
        LoadMore::Started(PageTicket {
            generation: self.generation,
        })
    }

    /// Append the next page if `ticket` still belongs to the current load.
    ///
    /// Returns `false` for a stale ticket; the catalog is left untouched.
    pub fn complete_load_more(&mut self, ticket: PageTicket) -> bool {
        match self.load {
            LoadState::Loading { generation } if generation == ticket.generation => {
                self.pages += 1;
                self.load = LoadState::Idle;
                true
            }
            _ => false,
        }
    }
}
