//! Per-site selector tables.
//!
//! Each chat site is an uncontrolled third-party page whose markup changes
//! independently of this tool, so every phase of the scrape is a fallback
//! cascade rather than a single selector. These tables record the cascades;
//! [`super::script`] turns them into the injected page script.

use crate::domain::TargetId;

/// How a content-editable editor is wired for one site.
#[derive(Debug, Clone, Copy)]
pub struct EditorInput {
    /// Rich-text paragraph nodes, most specific first. First match wins.
    pub paragraph_selectors: &'static [&'static str],
    /// The editor container, addressed by its own selector.
    pub container_selector: Option<&'static str>,
    /// The editor container, found from the paragraph via `closest()`.
    pub closest_container: Option<&'static str>,
    /// "Empty placeholder" CSS classes to strip so the page's own
    /// validation doesn't keep the submit control disabled.
    pub strip_classes: &'static [&'static str],
    /// Inject via `innerHTML` (ProseMirror) instead of `textContent`.
    pub set_html: bool,
    /// Also dispatch a bubbling `change` event after `input`.
    pub fire_change: bool,
}

/// One way of locating the submit control.
#[derive(Debug, Clone, Copy)]
pub enum SubmitLocator {
    /// Plain CSS query.
    Css(&'static str),
    /// Query for an icon, then take its enclosing button.
    IconButton(&'static str),
    /// Scan enabled buttons for "Send" in their text or aria-label.
    EnabledSendButton,
}

/// One tier of the response-extraction cascade, most precise first.
#[derive(Debug, Clone, Copy)]
pub enum ExtractTier {
    /// Inner text of the last element matching the selector.
    LastMatch { selector: &'static str },
    /// Join the inner text of every `<p>` under the container.
    JoinParagraphs { container: &'static str },
    /// Walk the most recent matches backwards, taking the first block that
    /// is long enough and carries none of the rejected phrases.
    RecentScan {
        selector: &'static str,
        min_len: usize,
        reject_phrases: &'static [&'static str],
    },
    /// Last resort: sweep the most recent generic divs, rejecting UI
    /// chrome (interactive children, boilerplate phrases, short text).
    DivSweep {
        window: usize,
        min_len: usize,
        reject_phrases: &'static [&'static str],
    },
}

/// Full selector set for one site.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSet {
    pub editor: EditorInput,
    /// Generic text-entry fallback when no editor node matches.
    pub input_fallback: &'static str,
    pub submit: &'static [SubmitLocator],
    /// Re-queried after a brief delay, covering the race where the button
    /// enables only once the injected text registers.
    pub submit_retry: &'static str,
    /// "Response in progress" indicators; polling stops when none match.
    pub busy_indicators: &'static [&'static str],
    pub extract: &'static [ExtractTier],
    /// Returned when every extraction tier comes up empty.
    pub no_response_sentinel: &'static str,
    /// Site-specific overrides of the base wait plan.
    pub initial_wait_ms: Option<u64>,
    pub max_polls: Option<u32>,
}

pub fn selectors_for(id: TargetId) -> &'static SelectorSet {
    match id {
        TargetId::Chatgpt => &CHATGPT,
        TargetId::Claude => &CLAUDE,
        TargetId::Askme => &ASKME,
    }
}

static CHATGPT: SelectorSet = SelectorSet {
    editor: EditorInput {
        paragraph_selectors: &["#prompt-textarea > p"],
        container_selector: Some("#prompt-textarea"),
        closest_container: None,
        strip_classes: &[],
        set_html: false,
        fire_change: true,
    },
    input_fallback: "textarea",
    submit: &[
        SubmitLocator::Css("button[data-testid=\"send-button\"]"),
        SubmitLocator::IconButton("svg[data-testid=\"send-button\"]"),
        SubmitLocator::Css("button[aria-label*=\"Send\"]"),
        SubmitLocator::Css("[data-testid=\"fruitjuice-send-button\"]"),
    ],
    submit_retry: "button[data-testid=\"send-button\"]:not([disabled])",
    busy_indicators: &[
        "[data-testid=\"stop-button\"]",
        ".result-streaming",
        "[data-is-streaming=\"true\"]",
    ],
    extract: &[
        ExtractTier::LastMatch {
            selector: "[data-message-author-role=\"assistant\"]",
        },
        ExtractTier::LastMatch {
            selector: ".markdown, .prose, [class*=\"markdown\"]",
        },
        ExtractTier::RecentScan {
            selector: "[data-testid*=\"conversation\"] div, .conversation div, [role=\"presentation\"] div",
            min_len: 10,
            reject_phrases: &["Copy code"],
        },
        ExtractTier::DivSweep {
            window: 50,
            min_len: 20,
            reject_phrases: &["Send a message", "ChatGPT", "Copy code"],
        },
    ],
    no_response_sentinel: "No response detected - check console for details",
    initial_wait_ms: None,
    max_polls: None,
};

static CLAUDE: SelectorSet = SelectorSet {
    editor: EditorInput {
        paragraph_selectors: &[
            "p[data-placeholder*=\"help you\"]",
            "p[data-placeholder]",
            ".ProseMirror p",
        ],
        container_selector: None,
        closest_container: Some(".ProseMirror"),
        strip_classes: &["is-empty", "is-editor-empty"],
        set_html: true,
        fire_change: false,
    },
    input_fallback: "textarea",
    submit: &[
        SubmitLocator::Css("button[aria-label=\"Send Message\"]"),
        SubmitLocator::Css("button[data-testid=\"send-button\"]"),
        SubmitLocator::IconButton("svg[data-icon=\"send\"]"),
        SubmitLocator::EnabledSendButton,
    ],
    submit_retry: "button[aria-label*=\"Send\"]:not([disabled])",
    busy_indicators: &[
        "[data-is-streaming=\"true\"]",
        ".loading",
        "[aria-label*=\"Stop\"]",
    ],
    extract: &[
        ExtractTier::LastMatch {
            selector: "[data-is-streaming=\"false\"]",
        },
        ExtractTier::LastMatch {
            selector: ".font-claude-message, .prose, [class*=\"message\"]",
        },
        ExtractTier::RecentScan {
            selector: "div[data-testid*=\"conversation\"] div, .conversation div",
            min_len: 10,
            reject_phrases: &["Send a message"],
        },
    ],
    no_response_sentinel: "No Claude response detected - check console for details",
    initial_wait_ms: None,
    max_polls: None,
};

static ASKME: SelectorSet = SelectorSet {
    editor: EditorInput {
        paragraph_selectors: &[
            "p[data-placeholder*=\"help you\"]",
            "p[data-placeholder]",
            ".ProseMirror p",
        ],
        container_selector: None,
        closest_container: Some(".ProseMirror"),
        strip_classes: &["is-empty", "is-editor-empty"],
        set_html: true,
        fire_change: false,
    },
    input_fallback: "textarea",
    submit: &[
        SubmitLocator::Css("button[aria-label=\"Send Message\"]"),
        SubmitLocator::Css("button[data-testid=\"send-button\"]"),
        SubmitLocator::IconButton("svg[data-icon=\"send\"]"),
        SubmitLocator::EnabledSendButton,
    ],
    submit_retry: "button[aria-label*=\"Send\"]:not([disabled])",
    busy_indicators: &[],
    extract: &[
        ExtractTier::JoinParagraphs {
            container: "#response-content-container",
        },
        ExtractTier::LastMatch {
            selector: ".chat-response, .message-content, [data-role='assistant']",
        },
        ExtractTier::RecentScan {
            selector: "div[data-testid*=\"conversation\"] div, .conversation div, .chat-message div",
            min_len: 10,
            reject_phrases: &["Send a message"],
        },
    ],
    no_response_sentinel: "No AskMe response detected - check console for details",
    // The internal tool renders in one burst with no streaming indicator,
    // so it gets a longer flat wait instead of polling.
    initial_wait_ms: Some(8000),
    max_polls: Some(0),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_target_has_a_selector_set() {
        for id in TargetId::all() {
            let set = selectors_for(id);
            assert!(!set.editor.paragraph_selectors.is_empty());
            assert!(!set.submit.is_empty());
            assert!(!set.extract.is_empty());
            assert!(set.no_response_sentinel.contains("response detected"));
        }
    }

    #[test]
    fn test_askme_skips_busy_polling() {
        let set = selectors_for(TargetId::Askme);
        assert!(set.busy_indicators.is_empty());
        assert_eq!(set.max_polls, Some(0));
        assert_eq!(set.initial_wait_ms, Some(8000));
    }

    #[test]
    fn test_most_specific_extraction_tier_first() {
        match selectors_for(TargetId::Chatgpt).extract[0] {
            ExtractTier::LastMatch { selector } => {
                assert!(selector.contains("data-message-author-role"))
            }
            _ => panic!("ChatGPT should lead with the author-role tier"),
        }
    }
}
