//! Scripted collaborators shared by the stage tests.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use inkflow_llm::{ChatMessage, ChatModel, ChatRequest};
use inkflow_shared::{InkflowError, Result};

use crate::research::Researcher;

/// Replies with queued results in order and records every request.
pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok((*t).to_string())).collect())
    }

    pub(crate) fn failing() -> Self {
        Self::new(vec![Err(InkflowError::Completion("HTTP 401: bad key".into()))])
    }

    pub(crate) fn request(&self, index: usize) -> ChatRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InkflowError::Completion("script exhausted".into())));
        next.map(ChatMessage::assistant)
    }
}

/// Researcher returning a fixed result and recording the topics it saw.
pub(crate) struct FixedResearcher {
    reply: std::result::Result<String, String>,
    pub topics: Mutex<Vec<String>>,
}

impl FixedResearcher {
    pub(crate) fn ok(summary: &str) -> Self {
        Self {
            reply: Ok(summary.to_string()),
            topics: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn err(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            topics: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Researcher for FixedResearcher {
    async fn research(&self, topic: &str) -> Result<String> {
        self.topics.lock().unwrap().push(topic.to_string());
        self.reply.clone().map_err(InkflowError::Agent)
    }
}

pub(crate) fn temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("inkflow-{prefix}-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
