//! In-memory session state shared by all screens.

use std::path::PathBuf;

use inkflow_artifacts::ArtifactKind;
use inkflow_shared::DefaultsConfig;

/// Largest idea count the form accepts.
pub(crate) const MAX_IDEAS: u32 = 10;

/// Work requested by a screen and carried out by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    GenerateIdeas,
    Research,
    WriteArticle,
    RunPipeline,
    Export(ArtifactKind),
}

impl Action {
    /// Status text shown while the action runs.
    pub(crate) fn busy_message(&self) -> String {
        match self {
            Self::GenerateIdeas => "Generating ideas...".into(),
            Self::Research => "Researching topic...".into(),
            Self::WriteArticle => "Writing article...".into(),
            Self::RunPipeline => "Running full pipeline...".into(),
            Self::Export(kind) => format!("Exporting {kind}..."),
        }
    }
}

/// Outcome message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Info(String),
    Success(String),
    Error(String),
}

impl Notice {
    pub(crate) fn text(&self) -> &str {
        match self {
            Self::Info(s) | Self::Success(s) | Self::Error(s) => s,
        }
    }
}

/// Everything the user has produced so far in this session.
pub(crate) struct Session {
    pub domain: String,
    /// Raw text of the idea-count field.
    pub count: String,
    pub ideas: Vec<String>,
    /// Index into `ideas` of the highlighted idea.
    pub selected: usize,
    /// Title the current summary was researched for.
    pub topic: Option<String>,
    pub summary: String,
    pub article: String,
    pub tone: Option<String>,
    pub output_dir: PathBuf,
}

impl Session {
    pub(crate) fn new(defaults: &DefaultsConfig) -> Self {
        Self {
            domain: "AI".to_string(),
            count: defaults.idea_count.min(MAX_IDEAS).to_string(),
            ideas: Vec::new(),
            selected: 0,
            topic: None,
            summary: String::new(),
            article: String::new(),
            tone: None,
            output_dir: PathBuf::from(&defaults.output_dir),
        }
    }

    /// Forget ideas, summary and article before a fresh generation.
    pub(crate) fn clear_outputs(&mut self) {
        self.ideas.clear();
        self.selected = 0;
        self.topic = None;
        self.summary.clear();
        self.article.clear();
        self.tone = None;
    }

    pub(crate) fn selected_idea(&self) -> Option<&str> {
        self.ideas.get(self.selected).map(String::as_str)
    }

    pub(crate) fn select_next(&mut self) {
        if self.selected + 1 < self.ideas.len() {
            self.selected += 1;
        }
    }

    pub(crate) fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Parse the count field, accepting 1 through [`MAX_IDEAS`].
    pub(crate) fn idea_count(&self) -> Result<u32, String> {
        match self.count.trim().parse::<u32>() {
            Ok(n) if (1..=MAX_IDEAS).contains(&n) => Ok(n),
            _ => Err(format!(
                "Number of ideas must be between 1 and {MAX_IDEAS}."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&DefaultsConfig::default())
    }

    #[test]
    fn starts_with_form_defaults() {
        let s = session();
        assert_eq!(s.domain, "AI");
        assert_eq!(s.idea_count(), Ok(5));
        assert!(s.selected_idea().is_none());
        assert_eq!(s.output_dir, PathBuf::from("./output"));
    }

    #[test]
    fn count_must_be_in_range() {
        let mut s = session();
        for bad in ["0", "11", "", "five"] {
            s.count = bad.to_string();
            assert!(s.idea_count().is_err(), "{bad} accepted");
        }
        s.count = " 10 ".to_string();
        assert_eq!(s.idea_count(), Ok(10));
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut s = session();
        s.select_prev();
        s.select_next();
        assert_eq!(s.selected, 0);

        s.ideas = vec!["A".into(), "B".into()];
        s.select_next();
        s.select_next();
        assert_eq!(s.selected_idea(), Some("B"));
        s.select_prev();
        s.select_prev();
        assert_eq!(s.selected_idea(), Some("A"));
    }

    #[test]
    fn clearing_forgets_everything_downstream() {
        let mut s = session();
        s.ideas = vec!["A".into(), "B".into()];
        s.selected = 1;
        s.topic = Some("B".into());
        s.summary = "- fact".into();
        s.article = "Body".into();
        s.tone = Some("Professional".into());

        s.clear_outputs();
        assert!(s.ideas.is_empty());
        assert_eq!(s.selected, 0);
        assert!(s.topic.is_none() && s.tone.is_none());
        assert!(s.summary.is_empty() && s.article.is_empty());
        assert_eq!(s.domain, "AI");
    }
}
