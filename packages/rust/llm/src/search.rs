//! Web search tool exposed to the research agent.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use inkflow_shared::{InkflowError, Result, SearchConfig, read_secret};

use crate::{USER_AGENT, endpoint, snippet};

/// Tool name the model uses to call the search capability.
const TOOL_NAME: &str = "search";

/// Tool description shown to the model.
const TOOL_DESCRIPTION: &str = "Useful for answering questions by searching the web";

/// A free-text web search capability.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Function name advertised to the model.
    fn name(&self) -> &str {
        TOOL_NAME
    }

    /// When the model should use this tool.
    fn description(&self) -> &str {
        TOOL_DESCRIPTION
    }

    /// Run `query` and return results rendered as text.
    async fn search(&self, query: &str) -> Result<String>;
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily search API client.
#[derive(Debug, Clone)]
pub struct TavilySearch {
    client: Client,
    endpoint: Url,
    api_key: String,
    max_results: u32,
}

impl TavilySearch {
    pub fn new(base_url: &str, api_key: impl Into<String>, max_results: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| InkflowError::Search(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint(base_url, "search")?,
            api_key: api_key.into(),
            max_results,
        })
    }

    /// Build a client from `[search]`, reading the key from its env var.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_key = read_secret(&config.api_key_env)?;
        Self::new(&config.base_url, api_key, config.max_results)
    }
}

#[async_trait]
impl SearchTool for TavilySearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                max_results: self.max_results,
            })
            .send()
            .await
            .map_err(|e| InkflowError::Search(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InkflowError::Search(format!(
                "HTTP {status}: {}",
                snippet(&body, 200)
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| InkflowError::Search(format!("invalid search response: {e}")))?;

        debug!(hits = parsed.results.len(), "search complete");
        Ok(render_hits(&parsed.results))
    }
}

/// Render hits as a numbered plain-text list for the model.
pub fn render_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   {}\n   {}",
                i + 1,
                hit.title.trim(),
                hit.url.trim(),
                hit.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
