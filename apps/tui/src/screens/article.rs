//! "Article" screen: the written article and its tone.

use crossterm::event::{KeyCode, KeyModifiers};
use inkflow_artifacts::ArtifactKind;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::session::{Action, Session};

pub(crate) struct ArticleScreen {
    scroll: u16,
}

impl ArticleScreen {
    pub(crate) fn new() -> Self {
        Self { scroll: 0 }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(3),    // Article
                Constraint::Length(1), // Action hint
            ])
            .split(area);

        let title = match (&session.topic, &session.tone) {
            (Some(topic), Some(tone)) => format!(" {topic} · {tone} "),
            _ => " Generated Article ".to_string(),
        };
        let body = if session.article.is_empty() {
            "No article yet. Research a topic, then press 'w' to write it."
        } else {
            session.article.as_str()
        };
        let article = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(article, chunks[0]);

        let hint = Paragraph::new("w rewrite article · d download JSON · ↑/↓ scroll")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[1]);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
        _session: &mut Session,
    ) -> Option<Action> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                None
            }
            KeyCode::Char('w') => {
                self.scroll = 0;
                Some(Action::WriteArticle)
            }
            KeyCode::Char('d') => Some(Action::Export(ArtifactKind::Article)),
            _ => None,
        }
    }
}
