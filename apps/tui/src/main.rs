//! Inkflow TUI: interactive terminal front end for the content pipeline.
//!
//! Collects a domain and idea count, lets the user pick an idea, research
//! it, write the article, and export the JSON artifacts. Built with
//! `ratatui` + `crossterm`.

mod app;
mod screens;
mod session;
mod widgets;

use std::sync::Mutex;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    init_tracing();
    app::run()
}

/// Log to `~/.inkflow/inkflow-tui.log` so output never lands on the screen.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let Ok(dir) = inkflow_shared::config_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("inkflow-tui.log"))
    else {
        return;
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("inkflow=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}
