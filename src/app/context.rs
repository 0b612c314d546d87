use std::sync::Arc;

use crate::app::{ChorusError, Result};
use crate::browser::{CdpHost, TabHost};
use crate::config::{Config, SummaryConfig};
use crate::orchestrator::Orchestrator;
use crate::summary::{LocalAnalyzer, RemoteSummarizer, Summarizer, SummaryBackend};

pub struct AppContext {
    pub config: Config,
    pub host: Arc<dyn TabHost>,
    pub orchestrator: Orchestrator,
    pub summarizer: Arc<dyn Summarizer>,
}

impl AppContext {
    /// Attach to the configured browser and wire everything up.
    pub async fn new(config: Config) -> Result<Self> {
        let host: Arc<dyn TabHost> = Arc::new(CdpHost::connect(&config.browser.endpoint).await?);
        Self::with_host(config, host)
    }

    /// Wire the context around an existing host (tests inject mocks here).
    pub fn with_host(config: Config, host: Arc<dyn TabHost>) -> Result<Self> {
        let orchestrator = Orchestrator::new(host.clone(), config.scrape.clone());
        let summarizer = build_summarizer(&config.summary)?;

        Ok(Self {
            config,
            host,
            orchestrator,
            summarizer,
        })
    }
}

fn build_summarizer(config: &SummaryConfig) -> Result<Arc<dyn Summarizer>> {
    match config.backend {
        SummaryBackend::Local => Ok(Arc::new(LocalAnalyzer::new())),
        SummaryBackend::Remote => {
            let api_key = config.effective_api_key().ok_or_else(|| {
                ChorusError::Config(
                    "Remote summary backend selected but no API key configured \
                     (set OPENAI_API_KEY or summary.api_key)"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(RemoteSummarizer::new(&api_key, &config.model)?))
        }
    }
}
