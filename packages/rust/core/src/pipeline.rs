//! End-to-end pipeline: domain → ideas → topic → research → article.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use inkflow_artifacts::{ArtifactKind, ArtifactMeta, ArtifactStore};
use inkflow_llm::{ChatClient, ChatModel};
use inkflow_shared::{AppConfig, DefaultsConfig, InkflowError, Result, RunId, Stage, Tone};

use crate::ideas::{self, IdeaGenerator};
use crate::research::{self, AgentResearcher, Researcher};
use crate::writer::Writer;

/// Parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Subject area for idea generation.
    pub domain: String,
    /// Number of titles to request.
    pub idea_count: u32,
    /// 1-based index of the idea to research.
    pub selection: usize,
    /// Directory receiving the three artifacts.
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    /// Start from the configured defaults for `domain`.
    pub fn from_defaults(defaults: &DefaultsConfig, domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            idea_count: defaults.idea_count,
            selection: defaults.selection,
            output_dir: PathBuf::from(&defaults.output_dir),
        }
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub run_id: RunId,
    pub ideas: Vec<String>,
    pub topic: String,
    pub summary: String,
    pub tone: Tone,
    pub article: String,
    /// Artifacts written during the run, in stage order.
    pub saved: Vec<ArtifactMeta>,
    pub output_dir: PathBuf,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &PipelineOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &PipelineOutcome) {}
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The three stage workers a run needs.
pub struct Collaborators {
    pub ideas: IdeaGenerator,
    pub researcher: Arc<dyn Researcher>,
    pub writer: Writer,
}

impl Collaborators {
    /// Share one chat model between idea generation and writing.
    pub fn new(config: &AppConfig, model: Arc<dyn ChatModel>, researcher: Arc<dyn Researcher>) -> Self {
        Self {
            ideas: IdeaGenerator::from_config(config, model.clone()),
            researcher,
            writer: Writer::from_config(config, model),
        }
    }

    /// Build the hosted clients from config. Fails when either key is missing.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let model: Arc<dyn ChatModel> = Arc::new(ChatClient::from_config(&config.completion)?);
        let researcher = AgentResearcher::from_config(config, model.clone())?;
        Ok(Self::new(config, model, Arc::new(researcher)))
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Run all stages in order, aborting at the first stage with no output.
///
/// The topic is re-read from the idea artifact, so failing to write that
/// artifact aborts the run at the ideas stage. The summary write is
/// best-effort: a failure is logged and the run continues.
pub async fn run_pipeline(
    config: &PipelineConfig,
    agents: &Collaborators,
    progress: &dyn ProgressReporter,
) -> Result<PipelineOutcome> {
    let run_id = RunId::new();
    let span = info_span!(
        "run_pipeline",
        run_id = %run_id,
        domain = %config.domain,
        count = config.idea_count,
        selection = config.selection
    );
    run_stages(run_id.clone(), config, agents, progress)
        .instrument(span)
        .await
}

async fn run_stages(
    run_id: RunId,
    config: &PipelineConfig,
    agents: &Collaborators,
    progress: &dyn ProgressReporter,
) -> Result<PipelineOutcome> {
    let start = Instant::now();
    let store = ArtifactStore::new(&config.output_dir);
    store.ensure_dir()?;
    let mut saved = Vec::new();

    info!(dir = %store.dir().display(), "starting pipeline");

    // --- Stage 1: Ideas ---
    progress.phase("Generating ideas");
    let ideas = agents
        .ideas
        .generate(&config.domain, config.idea_count)
        .await;
    if ideas.is_empty() {
        return Err(InkflowError::stage(Stage::GenerateIdeas, "No ideas generated."));
    }

    let ideas_path = store.path(ArtifactKind::Ideas);
    match ideas::persist(&ideas_path, &ideas, &config.domain) {
        Ok(meta) => saved.push(meta),
        Err(e) => {
            warn!(error = %e, "failed to save ideas");
            return Err(InkflowError::stage(
                Stage::GenerateIdeas,
                format!("Failed to save ideas: {e}"),
            ));
        }
    }

    // --- Stage 2: Topic ---
    progress.phase("Selecting topic");
    let topic = research::lookup_topic(&ideas_path, config.selection);
    if topic.is_empty() {
        return Err(InkflowError::stage(Stage::SelectTopic, "No valid topic found."));
    }
    info!(topic = %topic, "topic selected");

    // --- Stage 3: Research ---
    progress.phase(&format!("Researching: {topic}"));
    let summary = research::research(agents.researcher.as_ref(), &topic).await;
    if summary.is_empty() {
        return Err(InkflowError::stage(Stage::Research, "Research failed."));
    }

    match research::persist(&store.path(ArtifactKind::Summary), &summary, &topic) {
        Ok(meta) => saved.push(meta),
        Err(e) => warn!(error = %e, "failed to save research summary"),
    }

    // --- Stage 4: Article ---
    progress.phase("Writing article");
    let draft = agents.writer.draft(&summary, &topic, store.dir()).await;
    if draft.text.is_empty() {
        return Err(InkflowError::stage(Stage::WriteArticle, "Article generation failed."));
    }
    saved.extend(draft.saved);

    let outcome = PipelineOutcome {
        run_id,
        ideas,
        topic,
        summary,
        tone: draft.tone,
        article: draft.text,
        saved,
        output_dir: config.output_dir.clone(),
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        tone = %outcome.tone.name,
        artifacts = outcome.saved.len(),
        elapsed_ms = outcome.elapsed.as_millis(),
        "pipeline complete"
    );

    Ok(outcome)
}
