//! Host capability for running a script inside an open browser tab.
//!
//! The [`TabHost`] trait is the execution boundary of the whole system:
//! given a target's URL pattern it finds an already-open, already-
//! authenticated tab, and it can evaluate a script in that tab's page
//! context and hand back the string the script resolved to. The production
//! implementation speaks the Chrome DevTools protocol; tests substitute a
//! mock.

mod cdp;

pub use cdp::CdpHost;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Target;

/// Handle to one matched tab. Nothing is persisted across invocations;
/// the handle is only meaningful for the dispatch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRef {
    pub url: String,
}

#[async_trait]
pub trait TabHost: Send + Sync {
    /// Find the first open tab whose URL falls under the target's pattern.
    async fn find_tab(&self, target: &Target) -> Result<Option<TabRef>>;

    /// Evaluate a script in the tab's page context and return the string it
    /// resolves to. Errors here mean the host itself failed (tab closed
    /// mid-operation, protocol error), not that the script reported a
    /// failure by value.
    async fn run_in_tab(&self, tab: &TabRef, script: &str) -> Result<String>;
}
