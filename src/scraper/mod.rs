//! Per-site scraper strategies.
//!
//! Every supported chat site gets the same five-phase contract — locate the
//! input surface, inject the prompt, trigger submission, wait for streaming
//! to finish, extract the response — parameterized by that site's selector
//! cascades and timing. The strategy renders to a self-contained page
//! script; the string it resolves to is the sole success/failure channel
//! across the execution boundary, classified back into a tagged
//! [`ScrapeOutcome`] on this side.

pub mod script;
pub mod selectors;
pub mod timing;

pub use timing::WaitPlan;

use crate::domain::outcome::INPUT_BOX_NOT_FOUND;
use crate::domain::{ScrapeOutcome, Target, TargetId};
use crate::scraper::selectors::{selectors_for, SelectorSet};

/// The scraper strategy for one site: its registry entry plus its selector
/// tables. A fresh strategy is looked up per submission; it holds no state.
#[derive(Debug, Clone, Copy)]
pub struct SiteStrategy {
    target: &'static Target,
    selectors: &'static SelectorSet,
}

impl SiteStrategy {
    pub fn for_target(id: TargetId) -> Self {
        Self {
            target: crate::domain::target::target(id),
            selectors: selectors_for(id),
        }
    }

    pub fn target(&self) -> &'static Target {
        self.target
    }

    /// The page script implementing the five phases for this site.
    pub fn page_script(&self, prompt: &str, plan: &WaitPlan) -> String {
        script::render(self.selectors, plan, prompt)
    }

    /// Classify the string the page script resolved to.
    ///
    /// The script never throws; it returns either extracted text or one of
    /// the reserved sentinels. An empty result means the page swallowed the
    /// script's return value, which is treated like exhausted extraction.
    pub fn classify(&self, raw: String) -> ScrapeOutcome {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ScrapeOutcome::Failure(self.selectors.no_response_sentinel.to_string());
        }
        if trimmed == INPUT_BOX_NOT_FOUND || trimmed == self.selectors.no_response_sentinel {
            return ScrapeOutcome::Failure(trimmed.to_string());
        }
        ScrapeOutcome::Text(raw)
    }
}
