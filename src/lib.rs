//! # Chorus
//!
//! Send one prompt to multiple AI chat web applications open as tabs in an
//! already-running browser, scrape each site's rendered answer out of its
//! DOM, and optionally compare the answers.
//!
//! ## Architecture
//!
//! ```text
//! prompt → Orchestrator → per-target SiteStrategy (in-tab script) → Snapshot
//!                                                                      ↓
//!                                             validity filter → Summarizer
//! ```
//!
//! Chorus attaches to a Chrome instance started with
//! `--remote-debugging-port` and drives the user's own logged-in tabs over
//! the DevTools protocol — it holds no credentials for the chat sites and
//! opens no tabs of its own. Each site is handled by a scraper strategy:
//! the same five-phase state machine (locate input, inject prompt, submit,
//! wait out streaming, extract the response) parameterized with that
//! site's selector cascades, executed as a script inside the tab. Every
//! failure is contained as that target's outcome; only summarization fails
//! loudly.
//!
//! ## Quick start
//!
//! ```bash
//! # Start Chrome with debugging enabled, log into your chat sites, then:
//! chorus targets
//! chorus send "Explain the borrow checker" --summarize
//! chorus send "hi" --targets chatgpt,claude
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together config, tab host,
/// orchestrator, and summary backend.
pub mod app;

/// Host capability for running scripts inside open browser tabs.
///
/// - [`TabHost`](browser::TabHost): the execution boundary, mockable in tests
/// - [`CdpHost`](browser::CdpHost): Chrome DevTools protocol implementation
pub mod browser;

/// Command-line interface using clap.
///
/// - `send <prompt> [--targets a,b] [--summarize]`
/// - `targets` - list targets and their attachment status
pub mod cli;

/// Configuration from `~/.config/chorus/config.toml`:
/// browser endpoint, scrape timing, summary backend.
pub mod config;

/// Core domain models.
///
/// - [`TargetId`](domain::TargetId) / [`Target`](domain::Target): the registry
/// - [`ScrapeOutcome`](domain::ScrapeOutcome): tagged per-target result
/// - [`Snapshot`](domain::Snapshot): immutable record of one send
pub mod domain;

/// Concurrent fan-out of one prompt to every enabled target.
pub mod orchestrator;

/// Per-site scraper strategies: selector cascades, timing, and the
/// generated in-page script.
pub mod scraper;

/// Cross-model comparison backends.
///
/// - [`RemoteSummarizer`](summary::RemoteSummarizer): OpenAI API
/// - [`LocalAnalyzer`](summary::LocalAnalyzer): offline heuristics
pub mod summary;
