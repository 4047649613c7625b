//! "Outputs" screen: preview and download the JSON artifacts.

use crossterm::event::{KeyCode, KeyModifiers};
use inkflow_artifacts::{ArtifactKind, ArtifactStore};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::session::{Action, Session};
use crate::widgets::selected_style;

pub(crate) struct OutputsScreen {
    selected: usize,
    content: String,
    scroll: u16,
}

impl OutputsScreen {
    pub(crate) fn new() -> Self {
        Self {
            selected: 0,
            content: "Select an artifact from the list to preview.".to_string(),
            scroll: 0,
        }
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::ALL[self.selected]
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(3),    // List + preview
                Constraint::Length(1), // Action hint
            ])
            .split(area);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(46), // Artifact list
                Constraint::Min(1),     // Preview
            ])
            .split(chunks[0]);

        let store = ArtifactStore::new(&session.output_dir);
        let items: Vec<ListItem> = ArtifactKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let selected = i == self.selected;
                let prefix = if selected { "▸ " } else { "  " };
                let label = if store.exists(*kind) {
                    format!("{prefix}{kind}")
                } else {
                    format!("{prefix}{kind} (not yet generated)")
                };
                ListItem::new(label).style(selected_style(selected))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Artifacts in {} ", session.output_dir.display())),
        );
        f.render_widget(list, panes[0]);

        let preview = Paragraph::new(self.content.as_str())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.kind())),
            );
        f.render_widget(preview, panes[1]);

        let hint = Paragraph::new("↑/↓ select · Enter reload · d download to working directory · PgUp/PgDn scroll")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[1]);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
        session: &mut Session,
    ) -> Option<Action> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.reload(session);
                }
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < ArtifactKind::ALL.len() {
                    self.selected += 1;
                    self.reload(session);
                }
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
            KeyCode::Enter => {
                self.reload(session);
                None
            }
            KeyCode::Char('d') | KeyCode::Char('e') => Some(Action::Export(self.kind())),
            _ => None,
        }
    }

    /// Re-read the selected artifact from disk.
    pub(crate) fn reload(&mut self, session: &Session) {
        let store = ArtifactStore::new(&session.output_dir);
        let kind = self.kind();
        self.scroll = 0;
        self.content = if store.exists(kind) {
            match store.read_raw(kind) {
                Ok(data) => data,
                Err(e) => format!("Failed to read {kind}: {e}"),
            }
        } else {
            format!("{kind} not yet generated.")
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkflow_shared::{DefaultsConfig, IdeaSet};

    fn session_in(dir: &std::path::Path) -> Session {
        let mut session = Session::new(&DefaultsConfig::default());
        session.output_dir = dir.to_path_buf();
        session
    }

    #[test]
    fn preview_follows_selection() {
        let tmp = std::env::temp_dir().join(format!("inkflow-tui-{}", uuid::Uuid::now_v7()));
        let store = ArtifactStore::new(&tmp);
        store.ensure_dir().unwrap();
        store
            .write_ideas(&IdeaSet::new("AI", vec!["Title A".into()]))
            .unwrap();
        let mut session = session_in(&tmp);
        let mut screen = OutputsScreen::new();

        screen.reload(&session);
        assert!(screen.content.contains("\"topic_ideas\""));

        screen.handle_key(KeyCode::Down, KeyModifiers::NONE, &mut session);
        assert_eq!(screen.content, "research_summary.json not yet generated.");

        let action = screen.handle_key(KeyCode::Char('d'), KeyModifiers::NONE, &mut session);
        assert_eq!(action, Some(Action::Export(ArtifactKind::Summary)));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
