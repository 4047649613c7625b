//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI. Screens keep only view
//! state (focus, scroll); the work product lives in the shared [`Session`].

mod article;
mod ideas;
mod outputs;
mod research;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;

use crate::session::{Action, Session};

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Ideas,
    Research,
    Article,
    Outputs,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ideas => write!(f, "Ideas"),
            Self::Research => write!(f, "Research"),
            Self::Article => write!(f, "Article"),
            Self::Outputs => write!(f, "Outputs"),
        }
    }
}

/// View state for every screen.
pub(crate) struct Screens {
    ideas: ideas::IdeasScreen,
    research: research::ResearchScreen,
    article: article::ArticleScreen,
    outputs: outputs::OutputsScreen,
}

impl Screens {
    pub(crate) fn new() -> Self {
        Self {
            ideas: ideas::IdeasScreen::new(),
            research: research::ResearchScreen::new(),
            article: article::ArticleScreen::new(),
            outputs: outputs::OutputsScreen::new(),
        }
    }

    /// Whether the given screen has an active text input field.
    pub(crate) fn is_editing(&self, id: ScreenId) -> bool {
        match id {
            ScreenId::Ideas => self.ideas.is_editing(),
            _ => false,
        }
    }

    pub(crate) fn draw(&self, id: ScreenId, f: &mut Frame, area: Rect, session: &Session) {
        match id {
            ScreenId::Ideas => self.ideas.draw(f, area, session),
            ScreenId::Research => self.research.draw(f, area, session),
            ScreenId::Article => self.article.draw(f, area, session),
            ScreenId::Outputs => self.outputs.draw(f, area, session),
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        id: ScreenId,
        code: KeyCode,
        modifiers: KeyModifiers,
        session: &mut Session,
    ) -> Option<Action> {
        match id {
            ScreenId::Ideas => self.ideas.handle_key(code, modifiers, session),
            ScreenId::Research => self.research.handle_key(code, modifiers, session),
            ScreenId::Article => self.article.handle_key(code, modifiers, session),
            ScreenId::Outputs => self.outputs.handle_key(code, modifiers, session),
        }
    }

    /// Refresh anything that mirrors files on disk.
    pub(crate) fn refresh(&mut self, session: &Session) {
        self.outputs.reload(session);
    }
}
