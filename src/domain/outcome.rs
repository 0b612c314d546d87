use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::target::TargetId;

/// Sentinel shown when no open tab matches a target's URL pattern.
pub const NO_TAB_OPEN: &str = "No tab open";

/// Sentinel returned by a scrape when no usable input surface exists.
pub const INPUT_BOX_NOT_FOUND: &str = "Input box not found";

/// Sentinel for a target id the registry does not know.
pub const UNSUPPORTED_TARGET: &str = "Unsupported target";

/// Marker embedded in failure messages; the validity filter rejects any
/// content containing it.
pub const ERROR_MARKER: &str = "Error:";

/// Minimum content length for a scraped response to count as valid.
pub const MIN_VALID_LEN: usize = 10;

/// Outcome of one target's scrape.
///
/// The original extension signalled failure by value, with reserved strings
/// mixed into the same channel as genuine responses. Outcomes here are
/// tagged, and [`ScrapeOutcome::message`] renders the compatible sentinel
/// strings for display and for consumers that parse them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// No open tab matched the target's URL pattern; the strategy never ran.
    NotAttached,
    /// Non-empty response text extracted from the page.
    Text(String),
    /// The strategy or its host reported a failure, described by value.
    Failure(String),
}

impl ScrapeOutcome {
    /// The display/compatibility string for this outcome.
    pub fn message(&self) -> &str {
        match self {
            ScrapeOutcome::NotAttached => NO_TAB_OPEN,
            ScrapeOutcome::Text(content) => content,
            ScrapeOutcome::Failure(reason) => reason,
        }
    }

    /// Whether this outcome may participate in summarization.
    ///
    /// Valid means: extracted text, longer than [`MIN_VALID_LEN`], and not
    /// wording that denotes a failure or missing tab.
    pub fn is_valid(&self) -> bool {
        match self {
            ScrapeOutcome::Text(content) => {
                content.len() > MIN_VALID_LEN
                    && !content.contains(ERROR_MARKER)
                    && !content.contains(NO_TAB_OPEN)
            }
            _ => false,
        }
    }
}

/// Immutable record of one send operation: the prompt and exactly one
/// outcome per enabled target. Built fresh on every dispatch; nothing
/// persists across submissions.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub prompt: String,
    pub started_at: DateTime<Utc>,
    results: BTreeMap<TargetId, ScrapeOutcome>,
}

impl Snapshot {
    pub fn new(prompt: impl Into<String>, results: BTreeMap<TargetId, ScrapeOutcome>) -> Self {
        Self {
            prompt: prompt.into(),
            started_at: Utc::now(),
            results,
        }
    }

    pub fn outcome(&self, id: TargetId) -> Option<&ScrapeOutcome> {
        self.results.get(&id)
    }

    /// Per-target outcomes in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &ScrapeOutcome)> {
        self.results.iter().map(|(id, outcome)| (*id, outcome))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The outcomes that pass the validity filter, in registry order.
    ///
    /// Pure derivation — recomputed on demand, never cached.
    pub fn valid_entries(&self) -> Vec<(TargetId, String)> {
        self.results
            .iter()
            .filter(|(_, outcome)| outcome.is_valid())
            .map(|(id, outcome)| (*id, outcome.message().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: Vec<(TargetId, ScrapeOutcome)>) -> Snapshot {
        Snapshot::new("test prompt", entries.into_iter().collect())
    }

    #[test]
    fn test_sentinel_messages() {
        assert_eq!(ScrapeOutcome::NotAttached.message(), "No tab open");
        assert_eq!(
            ScrapeOutcome::Failure(INPUT_BOX_NOT_FOUND.into()).message(),
            "Input box not found"
        );
        assert_eq!(ScrapeOutcome::Text("hi there".into()).message(), "hi there");
    }

    #[test]
    fn test_validity_rejects_non_text() {
        assert!(!ScrapeOutcome::NotAttached.is_valid());
        assert!(!ScrapeOutcome::Failure("Input box not found".into()).is_valid());
        assert!(!ScrapeOutcome::Failure("Error: tab closed".into()).is_valid());
    }

    #[test]
    fn test_validity_rejects_short_text() {
        assert!(!ScrapeOutcome::Text(String::new()).is_valid());
        assert!(!ScrapeOutcome::Text("0123456789".into()).is_valid()); // exactly 10
        assert!(ScrapeOutcome::Text("0123456789a".into()).is_valid()); // 11
    }

    #[test]
    fn test_validity_rejects_failure_wording() {
        assert!(!ScrapeOutcome::Text("Error: something went wrong".into()).is_valid());
        assert!(!ScrapeOutcome::Text("No tab open for this target".into()).is_valid());
        assert!(ScrapeOutcome::Text("A perfectly fine answer".into()).is_valid());
    }

    #[test]
    fn test_valid_entries_preserve_registry_order() {
        let snap = snapshot(vec![
            (TargetId::Askme, ScrapeOutcome::Text("askme answer text".into())),
            (TargetId::Chatgpt, ScrapeOutcome::Text("chatgpt answer text".into())),
            (TargetId::Claude, ScrapeOutcome::Failure("Error: boom".into())),
        ]);

        let entries = snap.valid_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, TargetId::Chatgpt);
        assert_eq!(entries[1].0, TargetId::Askme);
    }

    #[test]
    fn test_valid_entries_is_pure() {
        let snap = snapshot(vec![(
            TargetId::Claude,
            ScrapeOutcome::Text("a sufficiently long response".into()),
        )]);
        assert_eq!(snap.valid_entries(), snap.valid_entries());
    }
}
