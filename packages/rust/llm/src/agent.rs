//! Bounded tool-calling loop over a single search tool.
//!
//! Each step sends the transcript to the model with the search tool
//! attached. Tool calls are executed and their results appended; a reply
//! without tool calls is the final answer. The loop gives up after
//! `max_steps` model turns.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use inkflow_shared::{InkflowError, Result};

use crate::chat::{ChatMessage, ChatModel, ChatRequest, ToolCall, ToolDefinition};
use crate::search::SearchTool;

const SYSTEM_PROMPT: &str = "You are a diligent research assistant. \
Use the search tool whenever you need current or factual information, \
then answer the task directly once you have enough material.";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

/// A chat model that may call one search tool before answering.
pub struct ToolAgent {
    model: Arc<dyn ChatModel>,
    tool: Arc<dyn SearchTool>,
    model_id: String,
    temperature: f64,
    max_steps: u32,
}

impl ToolAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tool: Arc<dyn SearchTool>,
        model_id: impl Into<String>,
        temperature: f64,
        max_steps: u32,
    ) -> Self {
        Self {
            model,
            tool,
            model_id: model_id.into(),
            temperature,
            max_steps,
        }
    }

    /// Work on `task` until the model answers without calling the tool.
    #[instrument(skip_all, fields(model = %self.model_id, max_steps = self.max_steps))]
    pub async fn run(&self, task: &str) -> Result<String> {
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(task)];
        let tools = vec![self.tool_definition()];

        for step in 1..=self.max_steps {
            let request = ChatRequest {
                model: self.model_id.clone(),
                messages: messages.clone(),
                temperature: self.temperature,
                tools: tools.clone(),
            };
            let reply = self.model.chat(&request).await?;

            if reply.tool_calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                if answer.trim().is_empty() {
                    return Err(InkflowError::Agent("model returned an empty answer".into()));
                }
                info!(step, "agent produced final answer");
                return Ok(answer);
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                let result = self.execute(call).await?;
                debug!(step, call_id = %call.id, chars = result.len(), "tool result");
                messages.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        Err(InkflowError::Agent(format!(
            "no final answer after {} steps",
            self.max_steps
        )))
    }

    async fn execute(&self, call: &ToolCall) -> Result<String> {
        if call.function.name != self.tool.name() {
            return Err(InkflowError::Agent(format!(
                "model called unknown tool '{}'",
                call.function.name
            )));
        }

        let args: SearchArgs = serde_json::from_str(&call.function.arguments).map_err(|e| {
            InkflowError::Agent(format!(
                "malformed arguments for '{}': {e}",
                call.function.name
            ))
        })?;

        info!(query = %args.query, "agent searching");
        self.tool.search(&args.query).await
    }

    fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.tool.name(),
            self.tool.description(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Free-text web search query"
                    }
                },
                "required": ["query"]
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatClient, TavilySearch};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_call_reply(name: &str, arguments: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": name, "arguments": arguments }
                    }]
                }
            }]
        })
    }

    fn answer_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        })
    }

    async fn agent_for(server: &MockServer, max_steps: u32) -> ToolAgent {
        let model = ChatClient::new(&server.uri(), "k", None).unwrap();
        let tool = TavilySearch::new(&server.uri(), "t", 5).unwrap();
        ToolAgent::new(Arc::new(model), Arc::new(tool), "llama3-70b-8192", 0.7, max_steps)
    }

    async fn mount_search(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{ "title": "T", "url": "https://x.example", "content": "fresh fact" }]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn searches_then_answers() {
        let server = MockServer::start().await;
        mount_search(&server).await;

        // Once a tool result is in the transcript the model answers.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("fresh fact"))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer_reply("- point one")))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(tool_call_reply("search", r#"{"query":"Title B"}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let agent = agent_for(&server, 5).await;
        let answer = agent.run("Research Title B").await.unwrap();
        assert_eq!(answer, "- point one");
    }

    #[tokio::test]
    async fn answers_without_tool() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains(r#""name":"search""#))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer_reply("- known")))
            .mount(&server)
            .await;

        let agent = agent_for(&server, 3).await;
        assert_eq!(agent.run("task").await.unwrap(), "- known");
    }

    #[tokio::test]
    async fn gives_up_after_max_steps() {
        let server = MockServer::start().await;
        mount_search(&server).await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(tool_call_reply("search", r#"{"query":"again"}"#)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let agent = agent_for(&server, 2).await;
        let err = agent.run("task").await.unwrap_err();
        assert!(matches!(err, InkflowError::Agent(_)));
        assert!(err.to_string().contains("2 steps"));
    }

    #[tokio::test]
    async fn unknown_tool_is_agent_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tool_call_reply("calculator", "{}")),
            )
            .mount(&server)
            .await;

        let agent = agent_for(&server, 3).await;
        let err = agent.run("task").await.unwrap_err();
        assert!(err.to_string().contains("unknown tool 'calculator'"));
    }

    #[tokio::test]
    async fn malformed_arguments_are_agent_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tool_call_reply("search", "not json")),
            )
            .mount(&server)
            .await;

        let agent = agent_for(&server, 3).await;
        let err = agent.run("task").await.unwrap_err();
        assert!(err.to_string().contains("malformed arguments"));
    }

    #[tokio::test]
    async fn search_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(tool_call_reply("search", r#"{"query":"q"}"#)),
            )
            .mount(&server)
            .await;

        let agent = agent_for(&server, 3).await;
        let err = agent.run("task").await.unwrap_err();
        assert!(matches!(err, InkflowError::Search(_)));
    }
}
