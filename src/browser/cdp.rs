use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use url::Url;

use crate::app::{ChorusError, Result};
use crate::browser::{TabHost, TabRef};
use crate::domain::Target;

/// Tab host backed by an already-running Chrome instance with remote
/// debugging enabled (`--remote-debugging-port`). The browser is attached
/// to, never launched: the whole point is to reuse the user's logged-in
/// sessions.
pub struct CdpHost {
    browser: Browser,
    /// Pages matched by `find_tab`, keyed by tab URL, so `run_in_tab`
    /// doesn't have to re-enumerate targets.
    matched: Mutex<HashMap<String, Page>>,
}

impl CdpHost {
    /// Attach to the browser behind the given debugging endpoint.
    ///
    /// Accepts either the HTTP endpoint (`http://127.0.0.1:9222`, resolved
    /// through `/json/version`) or a `ws://` debugger URL directly.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let ws_url = if endpoint.starts_with("ws") {
            endpoint.to_string()
        } else {
            discover_ws_url(endpoint).await?
        };

        let (browser, mut handler) = Browser::connect(ws_url).await.map_err(|e| {
            ChorusError::Browser(format!(
                "Failed to attach to browser: {}. Is Chrome running with --remote-debugging-port?",
                e
            ))
        })?;

        // Drive the CDP event stream for the lifetime of the connection.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            matched: Mutex::new(HashMap::new()),
        })
    }
}

/// Resolve the WebSocket debugger URL from the HTTP debugging endpoint.
async fn discover_ws_url(endpoint: &str) -> Result<String> {
    let version_url = Url::parse(endpoint)?.join("json/version")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let info: serde_json::Value = client
        .get(version_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    info["webSocketDebuggerUrl"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| {
            ChorusError::Browser(format!(
                "Debugging endpoint {} returned no webSocketDebuggerUrl",
                endpoint
            ))
        })
}

#[async_trait]
impl TabHost for CdpHost {
    async fn find_tab(&self, target: &Target) -> Result<Option<TabRef>> {
        let pages = self
            .browser
            .pages()
            .await
            .map_err(|e| ChorusError::Browser(format!("Failed to list tabs: {}", e)))?;

        for page in pages {
            let url = match page.url().await {
                Ok(Some(url)) => url,
                // A tab can vanish between enumeration and inspection.
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("Skipping unreadable tab: {}", e);
                    continue;
                }
            };

            if target.matches_url(&url) {
                tracing::debug!(site = %target.id, %url, "matched open tab");
                self.matched.lock().await.insert(url.clone(), page);
                return Ok(Some(TabRef { url }));
            }
        }

        Ok(None)
    }

    async fn run_in_tab(&self, tab: &TabRef, script: &str) -> Result<String> {
        let page = self
            .matched
            .lock()
            .await
            .get(&tab.url)
            .cloned()
            .ok_or_else(|| ChorusError::Browser(format!("Tab no longer tracked: {}", tab.url)))?;

        // The scrape script is an async IIFE; awaitPromise makes the
        // evaluation resolve to its final string.
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| ChorusError::Browser(format!("Failed to build evaluation: {}", e)))?;

        let result: String = page
            .evaluate(params)
            .await
            .map_err(|e| ChorusError::Browser(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| ChorusError::Browser(format!("Failed to parse result: {:?}", e)))?;

        Ok(result)
    }
}
