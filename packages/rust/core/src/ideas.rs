//! Idea generation: ask the model for a list of titles in a domain.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{error, info, instrument};

use inkflow_artifacts::{ArtifactMeta, save_ideas};
use inkflow_llm::{ChatMessage, ChatModel, ChatRequest};
use inkflow_shared::{AppConfig, IdeaSet, Result};

/// Build the instruction sent to the model.
pub fn idea_prompt(domain: &str, count: u32) -> String {
    format!(
        "Suggest {count} trending and highly relevant article or blog post titles \
         related to the domain '{domain}'. Each title should be catchy and under 15 words. \
         Return only a numbered list of titles without extra explanation."
    )
}

/// Split a model reply into titles.
///
/// Blank lines are dropped. A leading list marker (`-`, `•`, `* `, `1.`,
/// `1)`) is removed; the remaining text is kept as-is, so a title is never
/// renumbered or reworded.
pub fn parse_ideas(text: &str) -> Vec<String> {
    // Bullets, then an optional ordinal. The ordinal must not run into a
    // digit, so `3.5 ways` keeps its number; group 1 restores the first
    // character after a spaceless ordinal (`1.Title`).
    static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(?:(?:[-•]|\*\s)\s*)*(?:\d+[.)](\D|$))?").expect("valid regex")
    });

    text.lines()
        .map(str::trim)
        .map(|line| MARKER_RE.replace(line, "${1}").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Generates article titles for a domain.
pub struct IdeaGenerator {
    model: Arc<dyn ChatModel>,
    model_id: String,
    temperature: f64,
}

impl IdeaGenerator {
    pub fn new(model: Arc<dyn ChatModel>, model_id: impl Into<String>, temperature: f64) -> Self {
        Self {
            model,
            model_id: model_id.into(),
            temperature,
        }
    }

    pub fn from_config(config: &AppConfig, model: Arc<dyn ChatModel>) -> Self {
        Self::new(
            model,
            &config.completion.model,
            config.completion.idea_temperature,
        )
    }

    /// Ask for `count` titles in `domain`.
    ///
    /// Any model failure is logged and yields an empty list; callers treat
    /// an empty list as "no ideas".
    #[instrument(skip_all, fields(domain = %domain, count))]
    pub async fn generate(&self, domain: &str, count: u32) -> Vec<String> {
        let request = ChatRequest::new(
            &self.model_id,
            self.temperature,
            vec![ChatMessage::user(idea_prompt(domain, count))],
        );

        match self.model.complete(&request).await {
            Ok(text) => {
                let ideas = parse_ideas(&text);
                info!(ideas = ideas.len(), "ideas generated");
                ideas
            }
            Err(e) => {
                error!(error = %e, "idea generation failed");
                Vec::new()
            }
        }
    }
}

/// Write the idea artifact for `domain` to `path`.
pub fn persist(path: &Path, ideas: &[String], domain: &str) -> Result<ArtifactMeta> {
    save_ideas(path, &IdeaSet::new(domain, ideas.to_vec()))
}
