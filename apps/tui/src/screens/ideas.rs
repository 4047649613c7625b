//! "Ideas" screen: domain and count inputs, generated idea list.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::session::{Action, Session};
use crate::widgets::{field_style, selected_style};

/// Which part of the form is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Domain,
    Count,
    Ideas,
}

pub(crate) struct IdeasScreen {
    focused: Field,
    editing: bool,
}

impl IdeasScreen {
    pub(crate) fn new() -> Self {
        Self {
            focused: Field::Domain,
            editing: false,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Domain + count
                Constraint::Min(3),    // Ideas
                Constraint::Length(1), // Action hint
            ])
            .split(area);

        let inputs = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(chunks[0]);

        let domain = Paragraph::new(session.domain.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Domain (e.g., AI, marketing) ")
                .border_style(field_style(self.focused == Field::Domain, self.editing)),
        );
        f.render_widget(domain, inputs[0]);

        let count = Paragraph::new(session.count.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Number of ideas ")
                .border_style(field_style(self.focused == Field::Count, self.editing)),
        );
        f.render_widget(count, inputs[1]);

        let list_block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Generated Ideas ({}) ", session.ideas.len()))
            .border_style(field_style(self.focused == Field::Ideas, false));

        if session.ideas.is_empty() {
            let empty = Paragraph::new("No ideas yet. Press 'g' to generate ideas for the domain.")
                .alignment(Alignment::Center)
                .block(list_block);
            f.render_widget(empty, chunks[1]);
        } else {
            let items: Vec<ListItem> = session
                .ideas
                .iter()
                .enumerate()
                .map(|(i, idea)| {
                    let selected = i == session.selected;
                    let prefix = if selected { "▸ " } else { "  " };
                    ListItem::new(format!("{prefix}{}. {idea}", i + 1))
                        .style(selected_style(selected))
                })
                .collect();
            f.render_widget(List::new(items).block(list_block), chunks[1]);
        }

        let hint = if self.editing {
            "Type to edit · Esc to stop editing · Tab to next field"
        } else {
            "Enter edit/research · ↑/↓ move · g generate · r research · w write · p full run"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[2]);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
        session: &mut Session,
    ) -> Option<Action> {
        if self.editing {
            match code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.editing = false;
                }
                KeyCode::Tab => {
                    self.next_field();
                    self.editing = self.focused != Field::Ideas;
                }
                KeyCode::Backspace => {
                    self.current_field_mut(session).pop();
                }
                KeyCode::Char(c) => {
                    if self.focused != Field::Count || c.is_ascii_digit() {
                        self.current_field_mut(session).push(c);
                    }
                }
                _ => {}
            }
            return None;
        }

        match code {
            KeyCode::Enter if self.focused == Field::Ideas => Some(Action::Research),
            KeyCode::Enter => {
                self.editing = true;
                None
            }
            KeyCode::Up if self.focused == Field::Ideas && session.selected > 0 => {
                session.select_prev();
                None
            }
            KeyCode::Down if self.focused == Field::Ideas => {
                session.select_next();
                None
            }
            KeyCode::Up => {
                self.prev_field();
                None
            }
            KeyCode::Down => {
                self.next_field();
                None
            }
            KeyCode::Char('g') => Some(Action::GenerateIdeas),
            KeyCode::Char('r') => Some(Action::Research),
            KeyCode::Char('w') => Some(Action::WriteArticle),
            KeyCode::Char('p') => Some(Action::RunPipeline),
            _ => None,
        }
    }

    fn current_field_mut<'a>(&self, session: &'a mut Session) -> &'a mut String {
        match self.focused {
            Field::Domain | Field::Ideas => &mut session.domain,
            Field::Count => &mut session.count,
        }
    }

    fn next_field(&mut self) {
        self.focused = match self.focused {
            Field::Domain => Field::Count,
            Field::Count => Field::Ideas,
            Field::Ideas => Field::Domain,
        };
    }

    fn prev_field(&mut self) {
        self.focused = match self.focused {
            Field::Domain => Field::Ideas,
            Field::Count => Field::Domain,
            Field::Ideas => Field::Count,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkflow_shared::DefaultsConfig;

    fn press(screen: &mut IdeasScreen, session: &mut Session, code: KeyCode) -> Option<Action> {
        screen.handle_key(code, KeyModifiers::NONE, session)
    }

    #[test]
    fn edits_domain_and_count() {
        let mut screen = IdeasScreen::new();
        let mut session = Session::new(&DefaultsConfig::default());
        session.domain.clear();
        session.count.clear();

        press(&mut screen, &mut session, KeyCode::Enter);
        assert!(screen.is_editing());
        for c in "Health".chars() {
            press(&mut screen, &mut session, KeyCode::Char(c));
        }
        press(&mut screen, &mut session, KeyCode::Tab);
        for c in "7x".chars() {
            press(&mut screen, &mut session, KeyCode::Char(c));
        }
        press(&mut screen, &mut session, KeyCode::Esc);

        assert!(!screen.is_editing());
        assert_eq!(session.domain, "Health");
        assert_eq!(session.count, "7");
    }

    #[test]
    fn letters_trigger_actions_outside_editing() {
        let mut screen = IdeasScreen::new();
        let mut session = Session::new(&DefaultsConfig::default());

        assert_eq!(press(&mut screen, &mut session, KeyCode::Char('g')), Some(Action::GenerateIdeas));
        assert_eq!(press(&mut screen, &mut session, KeyCode::Char('p')), Some(Action::RunPipeline));

        press(&mut screen, &mut session, KeyCode::Enter);
        assert_eq!(press(&mut screen, &mut session, KeyCode::Char('g')), None);
        assert!(session.domain.ends_with('g'));
    }

    #[test]
    fn list_navigation_and_enter_researches() {
        let mut screen = IdeasScreen::new();
        let mut session = Session::new(&DefaultsConfig::default());
        session.ideas = vec!["A".into(), "B".into(), "C".into()];

        press(&mut screen, &mut session, KeyCode::Down);
        press(&mut screen, &mut session, KeyCode::Down);
        press(&mut screen, &mut session, KeyCode::Down);
        assert_eq!(session.selected_idea(), Some("B"));

        press(&mut screen, &mut session, KeyCode::Up);
        assert_eq!(session.selected_idea(), Some("A"));
        assert_eq!(press(&mut screen, &mut session, KeyCode::Enter), Some(Action::Research));

        // Up from the top of the list returns to the count field.
        press(&mut screen, &mut session, KeyCode::Up);
        assert_eq!(press(&mut screen, &mut session, KeyCode::Enter), None);
        assert!(screen.is_editing());
    }
}
