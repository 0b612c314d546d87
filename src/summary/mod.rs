//! Cross-model comparison of the scraped responses.
//!
//! Two interchangeable backends implement the same contract: one delegates
//! to the OpenAI API, the other runs a local heuristic analysis with no
//! network at all. Which one is used is a configuration switch; the rest of
//! the system only sees the trait.

pub mod analysis;
pub mod remote;

pub use analysis::LocalAnalyzer;
pub use remote::RemoteSummarizer;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::TargetId;

/// Error text for a summarization attempt with nothing to compare.
pub const NO_VALID_RESPONSES: &str = "No valid responses to summarize";

/// Produces a human-readable comparison of the valid responses.
///
/// Invoking a backend with zero entries is a defined error, not an empty
/// summary; this is the one path in the system that fails loudly instead
/// of by value.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str, entries: &[(TargetId, String)]) -> Result<String>;
}

/// Which summary backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryBackend {
    Local,
    Remote,
}

impl Default for SummaryBackend {
    fn default() -> Self {
        SummaryBackend::Local
    }
}
