use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::app::{ChorusError, Result};
use crate::domain::TargetId;
use crate::summary::{Summarizer, NO_VALID_RESPONSES};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are an expert AI analyst. Provide clear, structured \
     comparisons and summaries of AI model responses.";

/// Summary backend that formats the valid responses into a structured
/// instruction prompt and delegates the comparison to the OpenAI API.
pub struct RemoteSummarizer {
    client: Client,
    api_key: String,
    model: String,
}

impl RemoteSummarizer {
    /// The credential is validated for non-emptiness only; whether it is
    /// accepted is the API's business.
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ChorusError::Summary(
                "Missing API key for the remote summary backend".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("chorus/0.1.0")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
        })
    }

    /// The comparison instruction sent to the API: the original prompt,
    /// each model's response, and the five sections the answer must cover.
    fn build_prompt(prompt: &str, entries: &[(TargetId, String)]) -> String {
        let mut out = String::from(
            "Please analyze and summarize the following AI model responses to this prompt:\n\n",
        );
        out.push_str(&format!("**Original Prompt:** \"{}\"\n\n", prompt));
        out.push_str("**Responses:**\n\n");

        for (id, response) in entries {
            out.push_str(&format!(
                "**{}:**\n{}\n\n",
                id.as_str().to_uppercase(),
                response
            ));
        }

        out.push_str("Please provide:\n");
        out.push_str("1. **Key Similarities:** What did all models agree on?\n");
        out.push_str("2. **Key Differences:** Where did the models diverge?\n");
        out.push_str("3. **Unique Insights:** What unique perspectives did each model offer?\n");
        out.push_str("4. **Quality Assessment:** Which response was most comprehensive/accurate?\n");
        out.push_str(
            "5. **Consolidated Answer:** Combine the best elements into one cohesive response.\n\n",
        );
        out.push_str("Format your response clearly with the above sections.");
        out
    }
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    async fn summarize(&self, prompt: &str, entries: &[(TargetId, String)]) -> Result<String> {
        if entries.is_empty() {
            return Err(ChorusError::Summary(NO_VALID_RESPONSES.to_string()));
        }

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::build_prompt(prompt, entries) },
            ],
            "max_tokens": 1500,
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail: serde_json::Value = response.json().await.unwrap_or_default();
            let message = detail["error"]["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ChorusError::Summary(message));
        }

        let data: serde_json::Value = response.json().await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                ChorusError::Summary("API response carried no completion content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_is_rejected() {
        assert!(RemoteSummarizer::new("", "gpt-3.5-turbo").is_err());
        assert!(RemoteSummarizer::new("   ", "gpt-3.5-turbo").is_err());
        assert!(RemoteSummarizer::new("sk-test", "gpt-3.5-turbo").is_ok());
    }

    #[tokio::test]
    async fn test_empty_entries_rejected_before_any_network() {
        let summarizer = RemoteSummarizer::new("sk-test", "gpt-3.5-turbo").unwrap();
        let err = summarizer.summarize("anything", &[]).await.unwrap_err();
        assert!(err.to_string().contains("No valid responses to summarize"));
    }

    #[test]
    fn test_prompt_layout() {
        let entries = vec![
            (TargetId::Chatgpt, "First answer".to_string()),
            (TargetId::Claude, "Second answer".to_string()),
        ];
        let prompt = RemoteSummarizer::build_prompt("compare sorting algorithms", &entries);

        assert!(prompt.contains("**Original Prompt:** \"compare sorting algorithms\""));
        assert!(prompt.contains("**CHATGPT:**\nFirst answer"));
        assert!(prompt.contains("**CLAUDE:**\nSecond answer"));
        assert!(prompt.contains("**Consolidated Answer:**"));
    }
}
