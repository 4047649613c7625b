//! Article writing: turn a research summary into a styled article.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use inkflow_artifacts::{ARTICLE_FILE, ArtifactMeta, save_article};
use inkflow_llm::{ChatMessage, ChatModel, ChatRequest};
use inkflow_shared::{AppConfig, Article, InkflowError, Tone};

use crate::tone::ToneTable;

/// Topic recorded in the article artifact when none is supplied.
pub const DEFAULT_TOPIC: &str = "Generated Article";

/// System instruction for a given tone.
pub fn writer_instruction(tone: &Tone) -> String {
    format!(
        "You are an expert article writer. Your job is to take research bullet points \
         and convert them into a beautiful article in the following style: {tone}"
    )
}

/// User message carrying the research.
pub fn writer_prompt(summary: &str) -> String {
    format!("Write an article based on the following research:\n\n{summary}")
}

/// Why saving an article failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistFailure {
    Permission,
    Filesystem,
    Other,
}

impl PersistFailure {
    pub fn classify(err: &InkflowError) -> Self {
        match err {
            InkflowError::Io { source, .. } if source.kind() == ErrorKind::PermissionDenied => {
                Self::Permission
            }
            InkflowError::Io { .. } => Self::Filesystem,
            _ => Self::Other,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Permission => "permission",
            Self::Filesystem => "filesystem",
            Self::Other => "other",
        }
    }
}

/// Writes articles in a tone chosen from the research content.
pub struct Writer {
    model: Arc<dyn ChatModel>,
    model_id: String,
    temperature: f64,
    tones: ToneTable,
}

impl Writer {
    pub fn new(
        model: Arc<dyn ChatModel>,
        model_id: impl Into<String>,
        temperature: f64,
        tones: ToneTable,
    ) -> Self {
        Self {
            model,
            model_id: model_id.into(),
            temperature,
            tones,
        }
    }

    pub fn from_config(config: &AppConfig, model: Arc<dyn ChatModel>) -> Self {
        Self::new(
            model,
            &config.completion.model,
            config.completion.writer_temperature,
            ToneTable::from_config(config),
        )
    }

    /// Write an article from `summary` and save it under `output_dir`.
    ///
    /// Returns "" when `output_dir` cannot be created or the model fails.
    /// A failed save is logged but the article text is still returned.
    pub async fn compose(&self, summary: &str, topic: &str, output_dir: &Path) -> String {
        self.draft(summary, topic, output_dir).await.text
    }

    /// Like [`Writer::compose`] but also reports the tone and saved file.
    #[instrument(skip_all, fields(topic = %topic, dir = %output_dir.display()))]
    pub async fn draft(&self, summary: &str, topic: &str, output_dir: &Path) -> Draft {
        let tone = self.tones.select_tone(summary).clone();
        let mut draft = Draft {
            text: String::new(),
            tone,
            saved: None,
        };

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            error!(error = %e, "could not create output directory");
            return draft;
        }
        info!(tone = %draft.tone.name, "tone selected");

        let request = ChatRequest::new(
            &self.model_id,
            self.temperature,
            vec![
                ChatMessage::system(writer_instruction(&draft.tone)),
                ChatMessage::user(writer_prompt(summary)),
            ],
        );

        draft.text = match self.model.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "article generation failed");
                return draft;
            }
        };

        let topic = if topic.trim().is_empty() {
            DEFAULT_TOPIC
        } else {
            topic
        };
        let path = output_dir.join(ARTICLE_FILE);
        match save_article(&path, &Article::new(topic, &draft.text)) {
            Ok(meta) => {
                info!(path = %meta.path.display(), bytes = meta.size_bytes, "article saved");
                draft.saved = Some(meta);
            }
            Err(e) => {
                let kind = PersistFailure::classify(&e);
                warn!(kind = kind.as_str(), error = %e, "failed to save article");
            }
        }

        draft
    }
}

/// Result of one writing attempt.
#[derive(Debug, Clone)]
pub struct Draft {
    /// Article text, empty when generation failed.
    pub text: String,
    pub tone: Tone,
    /// Set when the article artifact was written.
    pub saved: Option<ArtifactMeta>,
}
