//! Core TUI application state, event loop, and action execution.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use inkflow_artifacts::{ArtifactKind, ArtifactStore};
use inkflow_core::ideas;
use inkflow_core::pipeline::{Collaborators, PipelineConfig, SilentProgress, run_pipeline};
use inkflow_core::research::{self, strip_ordinal};
use inkflow_shared::{AppConfig, load_config};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use tokio::runtime::Runtime;
use tracing::{error, info};

use crate::screens::{ScreenId, Screens};
use crate::session::{Action, Notice, Session};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Available screens.
    pub screens: Vec<ScreenId>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: Notice,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Per-screen view state.
    views: Screens,
    /// Work produced so far.
    session: Session,
    config: AppConfig,
    /// Built on first use so a missing key is reported, not fatal.
    agents: Option<Collaborators>,
    runtime: Runtime,
}

impl App {
    pub(crate) fn new() -> Result<Self> {
        let (config, status) = match load_config() {
            Ok(config) => (config, Notice::Info("Ready. Press ? for help".to_string())),
            Err(e) => (AppConfig::default(), Notice::Error(format!("{e} (using defaults)"))),
        };
        let session = Session::new(&config.defaults);
        let mut views = Screens::new();
        views.refresh(&session);

        Ok(Self {
            active_tab: 0,
            screens: vec![
                ScreenId::Ideas,
                ScreenId::Research,
                ScreenId::Article,
                ScreenId::Outputs,
            ],
            should_quit: false,
            status,
            show_help: false,
            views,
            session,
            config,
            agents: None,
            runtime: Runtime::new()?,
        })
    }

    fn current_id(&self) -> ScreenId {
        self.screens[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.views.is_editing(self.current_id())
    }

    fn switch_to(&mut self, idx: usize) {
        self.active_tab = idx;
        self.status = Notice::Info(self.screens[idx].to_string());
    }

    /// Run `action` to completion and record its outcome in the status bar.
    fn perform(&mut self, action: Action) {
        info!(?action, "performing action");
        let notice = match action {
            Action::Export(kind) => export(&self.session, kind),
            _ => match self.init_agents() {
                Err(notice) => notice,
                Ok(()) => match &self.agents {
                    Some(agents) => run_action(
                        &self.runtime,
                        agents,
                        &mut self.session,
                        self.config.defaults.selection,
                        action,
                    ),
                    None => Notice::Error("collaborators unavailable".to_string()),
                },
            },
        };

        if let Notice::Error(msg) = &notice {
            error!(?action, %msg, "action failed");
        }
        self.status = notice;
        self.views.refresh(&self.session);

        // Jump to where the result is shown.
        let target = match (&self.status, action) {
            (Notice::Success(_), Action::Research) => Some(ScreenId::Research),
            (Notice::Success(_), Action::WriteArticle | Action::RunPipeline) => {
                Some(ScreenId::Article)
            }
            _ => None,
        };
        if let Some(idx) = target.and_then(|id| self.screens.iter().position(|s| *s == id)) {
            self.active_tab = idx;
        }
    }

    fn init_agents(&mut self) -> std::result::Result<(), Notice> {
        if self.agents.is_none() {
            let agents = Collaborators::from_config(&self.config)
                .map_err(|e| Notice::Error(e.to_string()))?;
            self.agents = Some(agents);
        }
        Ok(())
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run() -> Result<()> {
    let mut app = App::new()?;

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = handle_key(app, key.code, key.modifiers) {
                    // Show the busy message before blocking on the request.
                    app.status = Notice::Info(action.busy_message());
                    terminal.draw(|f| draw(f, app))?;
                    app.perform(action);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return None;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return None;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return None;
        }
        // Tab navigation with number keys
        KeyCode::Char(c @ '1'..='4') if !app.is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            if idx < app.screens.len() {
                app.switch_to(idx);
            }
            return None;
        }
        KeyCode::Tab if !app.is_editing() => {
            app.switch_to((app.active_tab + 1) % app.screens.len());
            return None;
        }
        KeyCode::BackTab if !app.is_editing() => {
            let idx = if app.active_tab == 0 {
                app.screens.len() - 1
            } else {
                app.active_tab - 1
            };
            app.switch_to(idx);
            return None;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return None;
    }

    // Delegate to current screen
    let id = app.current_id();
    app.views.handle_key(id, code, modifiers, &mut app.session)
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

fn run_action(
    rt: &Runtime,
    agents: &Collaborators,
    session: &mut Session,
    default_selection: usize,
    action: Action,
) -> Notice {
    match action {
        Action::GenerateIdeas => generate_ideas(rt, agents, session),
        Action::Research => research_selected(rt, agents, session),
        Action::WriteArticle => write_article(rt, agents, session),
        Action::RunPipeline => run_all(rt, agents, session, default_selection),
        Action::Export(kind) => export(session, kind),
    }
}

fn generate_ideas(rt: &Runtime, agents: &Collaborators, session: &mut Session) -> Notice {
    let domain = session.domain.trim().to_string();
    if domain.is_empty() {
        return Notice::Error("Enter a domain first.".to_string());
    }
    let count = match session.idea_count() {
        Ok(n) => n,
        Err(msg) => return Notice::Error(msg),
    };

    session.clear_outputs();
    let titles = rt.block_on(agents.ideas.generate(&domain, count));
    if titles.is_empty() {
        return Notice::Error("Failed to generate ideas.".to_string());
    }

    let store = ArtifactStore::new(&session.output_dir);
    let saved = store
        .ensure_dir()
        .and_then(|()| ideas::persist(&store.path(ArtifactKind::Ideas), &titles, &domain));
    let n = titles.len();
    session.ideas = titles;

    match saved {
        Ok(_) => Notice::Success(format!("Generated {n} ideas!")),
        Err(e) => Notice::Error(format!("Generated {n} ideas but could not save them: {e}")),
    }
}

fn research_selected(rt: &Runtime, agents: &Collaborators, session: &mut Session) -> Notice {
    let Some(idea) = session.selected_idea() else {
        return Notice::Error("Generate ideas and select one first.".to_string());
    };
    let topic = strip_ordinal(idea.trim()).to_string();

    let summary = rt.block_on(research::research(agents.researcher.as_ref(), &topic));
    if summary.is_empty() {
        return Notice::Error("Research failed.".to_string());
    }

    let store = ArtifactStore::new(&session.output_dir);
    let saved = store
        .ensure_dir()
        .and_then(|()| research::persist(&store.path(ArtifactKind::Summary), &summary, &topic));

    session.topic = Some(topic);
    session.summary = summary;
    session.article.clear();
    session.tone = None;

    match saved {
        Ok(_) => Notice::Success("Research completed!".to_string()),
        Err(e) => Notice::Error(format!("Research completed but could not be saved: {e}")),
    }
}

fn write_article(rt: &Runtime, agents: &Collaborators, session: &mut Session) -> Notice {
    if session.summary.is_empty() {
        return Notice::Error("Research a topic first.".to_string());
    }
    let topic = session.topic.clone().unwrap_or_default();

    let draft = rt.block_on(
        agents
            .writer
            .draft(&session.summary, &topic, &session.output_dir),
    );
    if draft.text.is_empty() {
        return Notice::Error("Article generation failed.".to_string());
    }

    session.article = draft.text;
    session.tone = Some(draft.tone.name);

    match draft.saved {
        Some(_) => Notice::Success("Article generated!".to_string()),
        None => Notice::Error(format!(
            "Article generated but could not be saved to {}",
            session.output_dir.display()
        )),
    }
}

fn run_all(
    rt: &Runtime,
    agents: &Collaborators,
    session: &mut Session,
    default_selection: usize,
) -> Notice {
    let domain = session.domain.trim().to_string();
    if domain.is_empty() {
        return Notice::Error("Enter a domain first.".to_string());
    }
    let count = match session.idea_count() {
        Ok(n) => n,
        Err(msg) => return Notice::Error(msg),
    };
    let selection = if session.ideas.is_empty() {
        default_selection
    } else {
        session.selected + 1
    };

    let config = PipelineConfig {
        domain,
        idea_count: count,
        selection,
        output_dir: session.output_dir.clone(),
    };

    match rt.block_on(run_pipeline(&config, agents, &SilentProgress)) {
        Ok(outcome) => {
            session.ideas = outcome.ideas;
            session.selected = selection.saturating_sub(1).min(session.ideas.len().saturating_sub(1));
            session.topic = Some(outcome.topic.clone());
            session.summary = outcome.summary;
            session.article = outcome.article;
            session.tone = Some(outcome.tone.name.clone());
            Notice::Success(format!(
                "Pipeline complete: {} ({})",
                outcome.topic, outcome.tone.name
            ))
        }
        Err(e) => Notice::Error(format!("Error: {e}")),
    }
}

/// Copy an artifact into the working directory.
fn export(session: &Session, kind: ArtifactKind) -> Notice {
    let store = ArtifactStore::new(&session.output_dir);
    if !store.exists(kind) {
        return Notice::Error(format!("{kind} not yet generated."));
    }
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => return Notice::Error(format!("cannot determine working directory: {e}")),
    };
    match store.export(kind, &cwd) {
        Ok(path) => Notice::Success(format!("Downloaded {}", path.display())),
        Err(e) => Notice::Error(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = app
        .screens
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Inkflow "),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area: delegate to screen
    app.views.draw(app.current_id(), f, chunks[1], &app.session);

    // Status bar
    f.render_widget(status_bar(&app.status), chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-4          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Pipeline:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  g            Generate ideas"),
        Line::from("  r            Research selected idea"),
        Line::from("  w            Write article"),
        Line::from("  p            Run the full pipeline"),
        Line::from("  d            Download artifact to working directory"),
        Line::from(""),
        Line::from("Screen-specific:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Edit field / Research idea"),
        Line::from("  Esc          Stop editing"),
        Line::from("  ↑/↓          Navigate lists / scroll"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (press any key to close) ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
