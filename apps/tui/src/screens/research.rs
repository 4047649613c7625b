//! "Research" screen: selected idea and its research summary.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::session::{Action, Session};

pub(crate) struct ResearchScreen {
    scroll: u16,
}

impl ResearchScreen {
    pub(crate) fn new() -> Self {
        Self { scroll: 0 }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Selected idea
                Constraint::Min(3),    // Summary
                Constraint::Length(1), // Action hint
            ])
            .split(area);

        let idea = session
            .selected_idea()
            .unwrap_or("No idea selected. Generate ideas on the Ideas tab.");
        let idea_p = Paragraph::new(idea).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Selected idea "),
        );
        f.render_widget(idea_p, chunks[0]);

        let (title, body) = match &session.topic {
            Some(topic) if !session.summary.is_empty() => {
                (format!(" Research Summary: {topic} "), session.summary.as_str())
            }
            _ => (
                " Research Summary ".to_string(),
                "No research yet. Press 'r' to research the selected idea.",
            ),
        };
        let summary = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(summary, chunks[1]);

        let hint = Paragraph::new("r research selected idea · w write article · ↑/↓ scroll")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[2]);
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
            KeyCode::Char('r') => {
                self.scroll = 0;
                Some(Action::Research)
            }
            KeyCode::Char('w') => Some(Action::WriteArticle),
            _ => None,
        }
    }
}
