//! Concurrent dispatch of one prompt to every enabled target.
//!
//! Fan-out/fan-in: each enabled target is scraped in its own task against
//! its own tab, results land in disjoint keys of the snapshot, and the
//! dispatch resolves only once every target has settled. One target's
//! failure — missing tab, broken selectors, the tab navigating away mid-
//! scrape — is recorded as that target's outcome and never disturbs its
//! siblings.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};

use crate::browser::TabHost;
use crate::domain::outcome::UNSUPPORTED_TARGET;
use crate::domain::{ScrapeOutcome, Snapshot, TargetId};
use crate::scraper::{SiteStrategy, WaitPlan};

pub const DEFAULT_WORKERS: usize = 4;

pub struct Orchestrator {
    host: Arc<dyn TabHost>,
    plan: WaitPlan,
    semaphore: Arc<Semaphore>,
    /// One in-flight scrape per target. A dispatch that hits a still-busy
    /// target records a failure for it instead of queuing behind it.
    in_flight: Arc<Mutex<HashSet<TargetId>>>,
}

impl Orchestrator {
    pub fn new(host: Arc<dyn TabHost>, plan: WaitPlan) -> Self {
        Self::with_workers(host, plan, DEFAULT_WORKERS)
    }

    pub fn with_workers(host: Arc<dyn TabHost>, plan: WaitPlan, workers: usize) -> Self {
        Self {
            host,
            plan,
            semaphore: Arc::new(Semaphore::new(workers)),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Send the prompt to every enabled target concurrently and collect one
    /// outcome per target. The snapshot's key set always equals the enabled
    /// set, whatever the individual outcomes.
    pub async fn dispatch(&self, prompt: &str, enabled: &[TargetId]) -> Snapshot {
        let mut handles = Vec::new();

        let unique: Vec<TargetId> = {
            let mut seen = HashSet::new();
            enabled.iter().copied().filter(|id| seen.insert(*id)).collect()
        };

        for id in &unique {
            let id = *id;
            let prompt = prompt.to_string();
            let host = self.host.clone();
            let plan = self.plan.clone();
            let semaphore = self.semaphore.clone();
            let in_flight = self.in_flight.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");
                let outcome = scrape_target(&*host, id, &prompt, &plan, &in_flight).await;
                tracing::info!(site = %id, valid = outcome.is_valid(), "target settled");
                (id, outcome)
            }));
        }

        let mut results: BTreeMap<TargetId, ScrapeOutcome> = BTreeMap::new();
        for (id, handle) in unique.iter().zip(handles) {
            match handle.await {
                Ok((id, outcome)) => {
                    results.insert(id, outcome);
                }
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    results.insert(*id, ScrapeOutcome::Failure(format!("Error: {}", e)));
                }
            }
        }

        Snapshot::new(prompt, results)
    }

    /// Single-target boundary matching the original by-value contract:
    /// always a string, `"Unsupported target"` for names the registry does
    /// not know, without touching any tab.
    pub async fn scrape(&self, prompt: &str, target_name: &str) -> String {
        let Ok(id) = target_name.parse::<TargetId>() else {
            return UNSUPPORTED_TARGET.to_string();
        };

        let snapshot = self.dispatch(prompt, &[id]).await;
        snapshot
            .outcome(id)
            .map(|outcome| outcome.message().to_string())
            .unwrap_or_else(|| UNSUPPORTED_TARGET.to_string())
    }
}

/// Scrape one target, containing every failure as a value.
async fn scrape_target(
    host: &dyn TabHost,
    id: TargetId,
    prompt: &str,
    plan: &WaitPlan,
    in_flight: &Mutex<HashSet<TargetId>>,
) -> ScrapeOutcome {
    if !in_flight.lock().await.insert(id) {
        return ScrapeOutcome::Failure("Scrape already in flight".to_string());
    }

    let outcome = run_strategy(host, id, prompt, plan).await;

    in_flight.lock().await.remove(&id);
    outcome
}

async fn run_strategy(
    host: &dyn TabHost,
    id: TargetId,
    prompt: &str,
    plan: &WaitPlan,
) -> ScrapeOutcome {
    let strategy = SiteStrategy::for_target(id);

    let tab = match host.find_tab(strategy.target()).await {
        Ok(Some(tab)) => tab,
        Ok(None) => return ScrapeOutcome::NotAttached,
        Err(e) => return ScrapeOutcome::Failure(format!("Error: {}", e)),
    };

    let script = strategy.page_script(prompt, plan);
    match host.run_in_tab(&tab, &script).await {
        Ok(raw) => strategy.classify(raw),
        Err(e) => ScrapeOutcome::Failure(format!("Error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::app::{ChorusError, Result};
    use crate::browser::TabRef;
    use crate::domain::Target;

    #[derive(Clone)]
    enum Eval {
        Value(&'static str),
        Error(&'static str),
    }

    /// Host with a fixed set of "open tabs" and canned evaluation results.
    struct MockHost {
        tabs: HashMap<TargetId, String>,
        evals: HashMap<TargetId, Eval>,
        eval_delay: Duration,
        eval_log: Mutex<Vec<TargetId>>,
    }

    impl MockHost {
        fn new() -> Self {
            Self {
                tabs: HashMap::new(),
                evals: HashMap::new(),
                eval_delay: Duration::ZERO,
                eval_log: Mutex::new(Vec::new()),
            }
        }

        fn with_tab(mut self, id: TargetId, eval: Eval) -> Self {
            self.tabs.insert(id, format!("https://{}.test/chat", id));
            self.evals.insert(id, eval);
            self
        }

        async fn evals_run(&self) -> Vec<TargetId> {
            self.eval_log.lock().await.clone()
        }

        fn id_for_url(&self, url: &str) -> Option<TargetId> {
            self.tabs
                .iter()
                .find(|(_, tab_url)| tab_url.as_str() == url)
                .map(|(id, _)| *id)
        }
    }

    #[async_trait]
    impl TabHost for MockHost {
        async fn find_tab(&self, target: &Target) -> Result<Option<TabRef>> {
            Ok(self
                .tabs
                .get(&target.id)
                .map(|url| TabRef { url: url.clone() }))
        }

        async fn run_in_tab(&self, tab: &TabRef, _script: &str) -> Result<String> {
            let id = self
                .id_for_url(&tab.url)
                .ok_or_else(|| ChorusError::Browser("unknown tab".into()))?;
            self.eval_log.lock().await.push(id);
            if !self.eval_delay.is_zero() {
                tokio::time::sleep(self.eval_delay).await;
            }
            match &self.evals[&id] {
                Eval::Value(s) => Ok((*s).to_string()),
                Eval::Error(msg) => Err(ChorusError::Browser((*msg).to_string())),
            }
        }
    }

    fn orchestrator(host: MockHost) -> (Arc<MockHost>, Orchestrator) {
        let host = Arc::new(host);
        let orch = Orchestrator::new(host.clone(), WaitPlan::fast());
        (host, orch)
    }

    #[tokio::test]
    async fn test_key_set_equals_enabled_set() {
        let (_, orch) = orchestrator(
            MockHost::new().with_tab(TargetId::Chatgpt, Eval::Value("a long enough answer")),
        );

        let enabled = [TargetId::Chatgpt, TargetId::Claude, TargetId::Askme];
        let snap = orch.dispatch("hi", &enabled).await;

        assert_eq!(snap.len(), 3);
        for id in enabled {
            assert!(snap.outcome(id).is_some(), "missing outcome for {}", id);
        }
    }

    #[tokio::test]
    async fn test_missing_tab_short_circuits_strategy() {
        let (host, orch) = orchestrator(MockHost::new());

        let snap = orch.dispatch("hi", &[TargetId::Claude]).await;

        assert_eq!(snap.outcome(TargetId::Claude), Some(&ScrapeOutcome::NotAttached));
        assert_eq!(snap.outcome(TargetId::Claude).unwrap().message(), "No tab open");
        assert!(host.evals_run().await.is_empty());
    }

    #[tokio::test]
    async fn test_sibling_isolation() {
        let (_, orch) = orchestrator(
            MockHost::new()
                .with_tab(TargetId::Chatgpt, Eval::Error("tab navigated away"))
                .with_tab(TargetId::Claude, Eval::Value("Claude's perfectly good answer")),
        );

        let snap = orch.dispatch("hi", &[TargetId::Chatgpt, TargetId::Claude]).await;

        match snap.outcome(TargetId::Chatgpt) {
            Some(ScrapeOutcome::Failure(reason)) => {
                assert!(reason.starts_with("Error:"));
                assert!(reason.contains("tab navigated away"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(
            snap.outcome(TargetId::Claude),
            Some(&ScrapeOutcome::Text("Claude's perfectly good answer".into()))
        );
    }

    #[tokio::test]
    async fn test_page_sentinel_becomes_failure() {
        let (_, orch) = orchestrator(
            MockHost::new().with_tab(TargetId::Chatgpt, Eval::Value("Input box not found")),
        );

        let snap = orch.dispatch("hi", &[TargetId::Chatgpt]).await;
        assert_eq!(
            snap.outcome(TargetId::Chatgpt),
            Some(&ScrapeOutcome::Failure("Input box not found".into()))
        );
    }

    #[tokio::test]
    async fn test_scrape_happy_path_by_name() {
        let (_, orch) = orchestrator(
            MockHost::new().with_tab(TargetId::Chatgpt, Eval::Value("Mock AI Response")),
        );

        assert_eq!(orch.scrape("hi", "chatgpt").await, "Mock AI Response");
    }

    #[tokio::test]
    async fn test_scrape_unknown_target_touches_nothing() {
        let (host, orch) = orchestrator(
            MockHost::new().with_tab(TargetId::Chatgpt, Eval::Value("Mock AI Response")),
        );

        assert_eq!(orch.scrape("hi", "unknown").await, "Unsupported target");
        assert!(host.evals_run().await.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_dispatch_is_rejected_per_target() {
        let mut host = MockHost::new().with_tab(TargetId::Chatgpt, Eval::Value("slow but fine answer"));
        host.eval_delay = Duration::from_millis(200);
        let host = Arc::new(host);
        let orch = Arc::new(Orchestrator::new(host, WaitPlan::fast()));

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.dispatch("one", &[TargetId::Chatgpt]).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = orch.dispatch("two", &[TargetId::Chatgpt]).await;

        assert_eq!(
            second.outcome(TargetId::Chatgpt),
            Some(&ScrapeOutcome::Failure("Scrape already in flight".into()))
        );

        let first = first.await.expect("dispatch task");
        assert_eq!(
            first.outcome(TargetId::Chatgpt),
            Some(&ScrapeOutcome::Text("slow but fine answer".into()))
        );
    }

    #[tokio::test]
    async fn test_duplicate_enabled_targets_collapse() {
        let (host, orch) = orchestrator(
            MockHost::new().with_tab(TargetId::Claude, Eval::Value("one answer, one entry")),
        );

        let snap = orch
            .dispatch("hi", &[TargetId::Claude, TargetId::Claude])
            .await;

        assert_eq!(snap.len(), 1);
        assert_eq!(host.evals_run().await.len(), 1);
    }
}
