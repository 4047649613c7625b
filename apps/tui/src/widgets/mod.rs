//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::session::Notice;

/// Bottom status bar, colored by outcome.
pub(crate) fn status_bar(notice: &Notice) -> Paragraph<'_> {
    let fg = match notice {
        Notice::Info(_) => Color::White,
        Notice::Success(_) => Color::Green,
        Notice::Error(_) => Color::LightRed,
    };
    Paragraph::new(format!(" {}", notice.text()))
        .style(Style::default().bg(Color::DarkGray).fg(fg))
}

/// Border style for a form field: yellow while editing, cyan when focused.
pub(crate) fn field_style(focused: bool, editing: bool) -> Style {
    match (focused, editing) {
        (true, true) => Style::default().fg(Color::Yellow),
        (true, false) => Style::default().fg(Color::Cyan),
        _ => Style::default(),
    }
}

/// Style for the highlighted row of a list.
pub(crate) fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}
