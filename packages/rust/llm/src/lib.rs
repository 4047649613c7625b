//! Hosted-model collaborators for Inkflow.
//!
//! This crate provides:
//! - [`chat`]: OpenAI-compatible chat-completion types, the [`ChatModel`] seam
//!   and its HTTP implementation [`ChatClient`]
//! - [`search`]: the [`SearchTool`] seam and the Tavily-backed [`TavilySearch`]
//! - [`agent`]: [`ToolAgent`], a bounded tool-calling loop over one search tool

pub mod agent;
pub mod chat;
pub mod search;

pub use agent::ToolAgent;
pub use chat::{
    ChatClient, ChatMessage, ChatModel, ChatRequest, FunctionCall, FunctionDefinition, Role,
    ToolCall, ToolDefinition,
};
pub use search::{SearchHit, SearchTool, TavilySearch};

/// User-Agent string for API requests.
pub(crate) const USER_AGENT: &str = concat!("Inkflow/", env!("CARGO_PKG_VERSION"));

/// Join `path` onto an API base URL, treating the base as a directory.
pub(crate) fn endpoint(base_url: &str, path: &str) -> inkflow_shared::Result<url::Url> {
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    url::Url::parse(&base)
        .and_then(|u| u.join(path))
        .map_err(|e| inkflow_shared::InkflowError::config(format!("invalid base_url '{base_url}': {e}")))
}

/// First `max` characters of an error body, for log-friendly messages.
pub(crate) fn snippet(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let url = endpoint("https://api.groq.com/openai/v1", "chat/completions").unwrap();
        assert_eq!(url.as_str(), "https://api.groq.com/openai/v1/chat/completions");

        let url = endpoint("https://api.tavily.com/", "search").unwrap();
        assert_eq!(url.as_str(), "https://api.tavily.com/search");
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(endpoint("::nope::", "search").is_err());
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        assert_eq!(snippet("héllo wörld", 4), "héll");
        assert_eq!(snippet("ok", 200), "ok");
    }
}
