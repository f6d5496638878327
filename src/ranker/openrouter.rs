//! OpenRouter-backed ranking engine.
//!
//! Sends the ranking prompt to an OpenRouter chat-completions model and
//! parses the JSON array out of the reply. Models routinely wrap JSON in
//! markdown code fences, so those are stripped before parsing.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;

use crate::config::RankerConfig;
use crate::models::{Paper, RankingMode};
use crate::ranker::{build_prompt, AiRanker, RankedEntry, RankerError};
use crate::sources::http_client;

/// OpenRouter chat-completions ranking engine
#[derive(Debug, Clone)]
pub struct OpenRouterRanker {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenRouterRanker {
    /// Build a ranker from configuration. Returns `None` without an API key,
    /// in which case the pipeline ranks heuristically.
    pub fn from_config(config: &RankerConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: http_client(),
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }

    /// Point the ranker at a different endpoint (used by tests)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Pull the JSON payload out of a model reply, dropping markdown fences and
/// any prose around them.
fn extract_json(content: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap()
    });

    if let Some(captures) = fence.captures(content) {
        if let Some(inner) = captures.get(1) {
            return inner.as_str();
        }
    }
    content.trim()
}

#[async_trait]
impl AiRanker for OpenRouterRanker {
    async fn rank(
        &self,
        query: &str,
        papers: &[Paper],
        limit: usize,
        mode: RankingMode,
    ) -> Result<Vec<RankedEntry>, RankerError> {
        let prompt = build_prompt(query, papers, limit, mode);

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.2,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RankerError::Timeout
                } else {
                    RankerError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RankerError::Api(format!("OpenRouter returned {}", status)));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| RankerError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| RankerError::Parse("empty choices".to_string()))?;

        let mut entries: Vec<RankedEntry> = serde_json::from_str(extract_json(content))
            .map_err(|e| RankerError::Parse(format!("ranking payload: {}", e)))?;
        entries.truncate(limit);
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}
