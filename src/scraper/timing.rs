use serde::{Deserialize, Serialize};

/// Timing for the in-page state machine.
///
/// Third-party chat pages expose no "generation complete" event, so every
/// synchronization point is a fixed delay or a bounded poll. Keeping the
/// numbers in one explicit plan lets the config tune them and lets tests
/// run with near-zero delays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPlan {
    /// Delay after prompt injection, letting the page enable its submit
    /// control (milliseconds).
    pub settle_ms: u64,

    /// Delay before re-querying for a now-enabled submit button
    /// (milliseconds).
    pub retry_delay_ms: u64,

    /// Delay before the first look at the response area (milliseconds).
    pub initial_wait_ms: u64,

    /// Interval between busy-indicator polls (milliseconds).
    pub poll_interval_ms: u64,

    /// Poll ceiling. Some sites never clear their busy indicator in edge
    /// cases; this caps the worst-case wait without guaranteeing the
    /// response is finished.
    pub max_polls: u32,
}

impl Default for WaitPlan {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            retry_delay_ms: 100,
            initial_wait_ms: 3000,
            poll_interval_ms: 1000,
            max_polls: 10,
        }
    }
}

impl WaitPlan {
    /// Near-instant plan for deterministic tests.
    pub fn fast() -> Self {
        Self {
            settle_ms: 0,
            retry_delay_ms: 0,
            initial_wait_ms: 0,
            poll_interval_ms: 0,
            max_polls: 1,
        }
    }

    /// Worst-case wall clock for one scrape, excluding page work.
    pub fn worst_case_ms(&self) -> u64 {
        self.settle_ms
            + self.retry_delay_ms
            + self.initial_wait_ms
            + self.poll_interval_ms * u64::from(self.max_polls)
    }
}
