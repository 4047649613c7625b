//! Error types for Inkflow.
//!
//! Library crates use [`InkflowError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::Stage;

/// Top-level error type for all Inkflow operations.
#[derive(Debug, thiserror::Error)]
pub enum InkflowError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Chat-completion API error (transport, status, or response shape).
    #[error("completion error: {0}")]
    Completion(String),

    /// Web-search tool error.
    #[error("search error: {0}")]
    Search(String),

    /// Tool-calling agent error (bad tool call, step limit).
    #[error("agent error: {0}")]
    Agent(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed artifact, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A pipeline stage produced no output and the run was aborted.
    #[error("{stage} failed: {message}")]
    Stage { stage: Stage, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InkflowError>;

impl InkflowError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Abort a pipeline run at `stage`.
    pub fn stage(stage: Stage, msg: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: msg.into(),
        }
    }

    /// The stage that aborted the run, if this is a stage failure.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = InkflowError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = InkflowError::validation("topic_ideas is not an array");
        assert!(err.to_string().contains("topic_ideas"));
    }

    #[test]
    fn stage_error_names_the_stage() {
        let err = InkflowError::stage(Stage::GenerateIdeas, "No ideas generated.");
        assert_eq!(err.to_string(), "idea generation failed: No ideas generated.");
        assert_eq!(err.failed_stage(), Some(Stage::GenerateIdeas));
        assert_eq!(InkflowError::Search("x".into()).failed_stage(), None);
    }
}
