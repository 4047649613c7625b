//! Research stage: pick a topic from the idea artifact and summarize it.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use inkflow_artifacts::{ArtifactMeta, read_artifact, save_summary};
use inkflow_llm::{ChatModel, TavilySearch, ToolAgent};
use inkflow_shared::{AppConfig, IdeaSet, ResearchSummary, Result};

/// Produces a bullet-point summary for a topic.
#[async_trait]
pub trait Researcher: Send + Sync {
    async fn research(&self, topic: &str) -> Result<String>;
}

/// Task handed to the research agent.
pub fn research_prompt(topic: &str) -> String {
    format!(
        "Do detailed research on the topic: '{topic}'. \
         Summarize recent and relevant info in bullet points."
    )
}

/// Researcher backed by the tool-calling agent and web search.
pub struct AgentResearcher {
    agent: ToolAgent,
}

impl AgentResearcher {
    pub fn new(agent: ToolAgent) -> Self {
        Self { agent }
    }

    /// Wire the agent from config. Fails when the search key is missing.
    pub fn from_config(config: &AppConfig, model: Arc<dyn ChatModel>) -> Result<Self> {
        let search = TavilySearch::from_config(&config.search)?;
        Ok(Self::new(ToolAgent::new(
            model,
            Arc::new(search),
            &config.completion.model,
            config.completion.research_temperature,
            config.research.max_steps,
        )))
    }
}

#[async_trait]
impl Researcher for AgentResearcher {
    async fn research(&self, topic: &str) -> Result<String> {
        self.agent.run(&research_prompt(topic)).await
    }
}

/// Run `researcher` on `topic`, logging any failure and returning "" for it.
#[instrument(skip_all, fields(topic = %topic))]
pub async fn research(researcher: &dyn Researcher, topic: &str) -> String {
    match researcher.research(topic).await {
        Ok(summary) => {
            info!(chars = summary.len(), "research complete");
            summary
        }
        Err(e) => {
            error!(error = %e, "research failed");
            String::new()
        }
    }
}

/// Remove a leading "N. " ordinal from a title.
pub fn strip_ordinal(title: &str) -> &str {
    static ORDINAL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid regex"));

    match ORDINAL_RE.find(title) {
        Some(m) => &title[m.end()..],
        None => title,
    }
}

/// Read the idea artifact at `path` and return the title at the 1-based
/// `selection`, stripped of any ordinal prefix.
///
/// Returns an empty string when the file is missing or malformed, the
/// selection is out of range, or the chosen title is blank.
pub fn lookup_topic(path: &Path, selection: usize) -> String {
    let ideas: IdeaSet = match read_artifact(path) {
        Ok(ideas) => ideas,
        Err(e) => {
            warn!(error = %e, "could not read ideas");
            return String::new();
        }
    };

    let Some(raw) = selection
        .checked_sub(1)
        .and_then(|i| ideas.topic_ideas.get(i))
    else {
        warn!(
            selection,
            available = ideas.topic_ideas.len(),
            "selected idea does not exist"
        );
        return String::new();
    };

    strip_ordinal(raw.trim()).trim().to_string()
}

/// Write the summary artifact for `topic` to `path`.
pub fn persist(path: &Path, summary: &str, topic: &str) -> Result<ArtifactMeta> {
    save_summary(path, &ResearchSummary::new(topic, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedResearcher, temp_dir};
    use inkflow_artifacts::save_ideas;

    fn write_ideas(dir: &Path, titles: &[&str]) -> std::path::PathBuf {
        let path = dir.join("idea_generated.json");
        let titles = titles.iter().map(|t| (*t).to_string()).collect();
        save_ideas(&path, &IdeaSet::new("Tech", titles)).unwrap();
        path
    }

    #[test]
    fn lookup_second_title() {
        let tmp = temp_dir("lookup");
        let path = write_ideas(&tmp, &["Title A", "Title B", "Title C"]);
        assert_eq!(lookup_topic(&path, 2), "Title B");
        assert_eq!(lookup_topic(&path, 1), "Title A");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn lookup_strips_ordinal_prefix() {
        let tmp = temp_dir("lookup-ordinal");
        let path = write_ideas(&tmp, &["1. First", "2. The Rise of Agents"]);
        assert_eq!(lookup_topic(&path, 2), "The Rise of Agents");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn lookup_out_of_range_is_empty() {
        let tmp = temp_dir("lookup-range");
        let path = write_ideas(&tmp, &["Only one"]);
        assert_eq!(lookup_topic(&path, 2), "");
        assert_eq!(lookup_topic(&path, 0), "");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn lookup_missing_or_malformed_file_is_empty() {
        let tmp = temp_dir("lookup-missing");
        assert_eq!(lookup_topic(&tmp.join("nope.json"), 2), "");

        let bad = tmp.join("idea_generated.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(lookup_topic(&bad, 2), "");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ordinal_only_stripped_at_start() {
        assert_eq!(strip_ordinal("3. Ten Tips"), "Ten Tips");
        assert_eq!(strip_ordinal("Top 10. Tips"), "Top 10. Tips");
        assert_eq!(strip_ordinal("2025 outlook"), "2025 outlook");
    }

    #[test]
    fn prompt_quotes_topic() {
        assert_eq!(
            research_prompt("Title B"),
            "Do detailed research on the topic: 'Title B'. \
             Summarize recent and relevant info in bullet points."
        );
    }

    #[tokio::test]
    async fn research_failure_is_empty() {
        let researcher = FixedResearcher::err("search quota exceeded");
        assert_eq!(research(&researcher, "Title B").await, "");
        assert_eq!(*researcher.topics.lock().unwrap(), vec!["Title B"]);
    }

    #[tokio::test]
    async fn research_passes_summary_through() {
        let researcher = FixedResearcher::ok("- point one\n- point two");
        assert_eq!(research(&researcher, "T").await, "- point one\n- point two");
    }

    #[test]
    fn persist_trims_summary() {
        let tmp = temp_dir("summary");
        let path = tmp.join("research_summary.json");
        persist(&path, "\n- point one\n", "Title B").unwrap();

        let saved: ResearchSummary = read_artifact(&path).unwrap();
        assert_eq!(saved.topic, "Title B");
        assert_eq!(saved.summary, "- point one");
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
