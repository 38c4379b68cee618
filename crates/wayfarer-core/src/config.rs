use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the planner.
///
/// Defaults to 10 flights per page and a 500 ms simulated page latency.
/// `WAYFARER_PAGE_SIZE` and `WAYFARER_LOAD_MORE_DELAY_MS` override either
/// through [`PlannerConfig::overlay_env`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Flights appended per page.
    pub page_size: usize,
    /// Simulated latency before a load-more page lands.
    pub load_more_delay_ms: u64,
}

impl PlannerConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 10;
    pub const DEFAULT_LOAD_MORE_DELAY_MS: u64 = 500;

    pub const PAGE_SIZE_ENV: &str = "WAYFARER_PAGE_SIZE";
    pub const LOAD_MORE_DELAY_ENV: &str = "WAYFARER_LOAD_MORE_DELAY_MS";

    /// Replace each field whose variable `lookup` yields a parseable value.
    ///
    /// Blank or unparseable values leave the field as it was.
    pub fn overlay_env(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let page_size = lookup(Self::PAGE_SIZE_ENV)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.page_size);
        let load_more_delay_ms = lookup(Self::LOAD_MORE_DELAY_ENV)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.load_more_delay_ms);
        Self {
            page_size,
            load_more_delay_ms,
        }
        .normalized()
    }

    /// Clamp the page size to at least one flight.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self
    }

    pub fn load_more_delay(&self) -> Duration {
        Duration::from_millis(self.load_more_delay_ms)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            load_more_delay_ms: Self::DEFAULT_LOAD_MORE_DELAY_MS,
        }
    }
}
