//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use inkflow_artifacts::{ArtifactKind, ArtifactMeta, ArtifactStore};
use inkflow_core::ideas::{self, IdeaGenerator};
use inkflow_core::pipeline::{
    Collaborators, PipelineConfig, PipelineOutcome, ProgressReporter, run_pipeline,
};
use inkflow_core::research::{self, AgentResearcher};
use inkflow_core::writer::Writer;
use inkflow_llm::{ChatClient, ChatModel};
use inkflow_shared::{
    AppConfig, init_config, load_config, validate_api_key, validate_search_key,
};
use tracing::info;

/// Characters of the article shown after a run.
const PREVIEW_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Inkflow: from a domain to a finished article.
#[derive(Parser)]
#[command(
    name = "inkflow",
    version,
    about = "Generate article ideas, research one on the web, and write it in a fitting tone.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full pipeline: ideas, research, article.
    Run {
        /// Subject area for ideas (prompted when omitted).
        #[arg(short, long)]
        domain: Option<String>,

        /// Number of ideas to generate (prompted when omitted).
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        count: Option<u32>,

        /// 1-based index of the idea to research.
        #[arg(short, long)]
        select: Option<usize>,

        /// Output directory for the JSON artifacts.
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Generate ideas only and save them.
    Ideas {
        /// Subject area for ideas (prompted when omitted).
        #[arg(short, long)]
        domain: Option<String>,

        /// Number of ideas to generate.
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        count: Option<u32>,

        /// Output directory for the JSON artifacts.
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Research a saved idea and save the summary.
    Research {
        /// 1-based index of the idea to research.
        #[arg(short, long)]
        select: Option<usize>,

        /// Directory holding the idea artifact.
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Write an article from the saved research summary.
    Write {
        /// Topic recorded with the article (defaults to the summary's topic).
        #[arg(short, long)]
        topic: Option<String>,

        /// Directory holding the summary artifact.
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "inkflow=info",
        1 => "inkflow=debug",
        _ => "inkflow=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            domain,
            count,
            select,
            out,
        } => cmd_run(domain, count, select, out).await,
        Command::Ideas { domain, count, out } => cmd_ideas(domain, count, out).await,
        Command::Research { select, out } => cmd_research(select, out).await,
        Command::Write { topic, out } => cmd_write(topic, out).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    domain: Option<String>,
    count: Option<u32>,
    select: Option<usize>,
    out: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;
    validate_search_key(&config)?;

    println!("=== Content Writing Pipeline ===");
    let domain = match domain {
        Some(d) => d,
        None => prompt("Enter a domain (e.g., AI, marketing): ")?,
    };
    let count = match count {
        Some(n) => n,
        None => prompt_count(config.defaults.idea_count)?,
    };

    let mut pipeline = PipelineConfig::from_defaults(&config.defaults, domain);
    pipeline.idea_count = count;
    if let Some(k) = select {
        pipeline.selection = k;
    }
    if let Some(dir) = out {
        pipeline.output_dir = PathBuf::from(dir);
    }

    info!(
        domain = %pipeline.domain,
        count = pipeline.idea_count,
        selection = pipeline.selection,
        "running content pipeline"
    );

    let agents = Collaborators::from_config(&config)?;
    let reporter = CliProgress::new();

    match run_pipeline(&pipeline, &agents, &reporter).await {
        Ok(outcome) => {
            println!("\n Final Article Preview:\n");
            println!("{}", preview(&outcome.article, PREVIEW_CHARS));
            print_summary(&outcome);
        }
        Err(e) => {
            reporter.finish();
            println!(" Error: {e}");
        }
    }

    Ok(())
}

async fn cmd_ideas(domain: Option<String>, count: Option<u32>, out: Option<String>) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let domain = match domain {
        Some(d) => d,
        None => prompt("Enter a domain (e.g., AI, health, marketing): ")?,
    };
    let count = count.unwrap_or(config.defaults.idea_count);
    let store = output_store(&config, out);
    store.ensure_dir()?;

    let generator = IdeaGenerator::from_config(&config, chat_model(&config)?);
    let reporter = CliProgress::new();
    reporter.phase("Generating ideas");
    let titles = generator.generate(&domain, count).await;
    reporter.finish();

    if titles.is_empty() {
        println!(" No ideas generated.");
        return Ok(());
    }

    println!("\n Generated Ideas:\n");
    for (i, title) in titles.iter().enumerate() {
        println!("{}. {title}", i + 1);
    }

    let meta = ideas::persist(&store.path(ArtifactKind::Ideas), &titles, &domain)?;
    print_saved(&[meta]);
    Ok(())
}

async fn cmd_research(select: Option<usize>, out: Option<String>) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;
    validate_search_key(&config)?;

    let store = output_store(&config, out);
    let selection = select.unwrap_or(config.defaults.selection);
    let topic = research::lookup_topic(&store.path(ArtifactKind::Ideas), selection);
    if topic.is_empty() {
        return Err(eyre!(
            "no idea #{selection} in {}; run `inkflow ideas` first",
            store.path(ArtifactKind::Ideas).display()
        ));
    }
    println!(" Selected Topic: {topic}");

    let researcher = AgentResearcher::from_config(&config, chat_model(&config)?)?;
    let reporter = CliProgress::new();
    reporter.phase(&format!("Researching: {topic}"));
    let summary = research::research(&researcher, &topic).await;
    reporter.finish();

    if summary.is_empty() {
        println!(" Research failed.");
        return Ok(());
    }

    println!("\n Research Summary:\n");
    println!("{summary}");

    let meta = research::persist(&store.path(ArtifactKind::Summary), &summary, &topic)?;
    print_saved(&[meta]);
    Ok(())
}

async fn cmd_write(topic: Option<String>, out: Option<String>) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let store = output_store(&config, out);
    let summary = store.read_summary().map_err(|e| {
        eyre!("{e}; run `inkflow research` first")
    })?;
    let topic = topic.unwrap_or(summary.topic);

    let writer = Writer::from_config(&config, chat_model(&config)?);
    let reporter = CliProgress::new();
    reporter.phase("Writing article");
    let draft = writer.draft(&summary.summary, &topic, store.dir()).await;
    reporter.finish();

    if draft.text.is_empty() {
        println!(" Article generation failed.");
        return Ok(());
    }

    println!("\n Article ({}):\n", draft.tone.name);
    println!("{}", preview(&draft.text, PREVIEW_CHARS));
    if let Some(meta) = draft.saved {
        print_saved(&[meta]);
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn chat_model(config: &AppConfig) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(ChatClient::from_config(&config.completion)?))
}

fn output_store(config: &AppConfig, out: Option<String>) -> ArtifactStore {
    ArtifactStore::new(out.unwrap_or_else(|| config.defaults.output_dir.clone()))
}

/// Print `label` and read one trimmed line from stdin.
fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_count(default: u32) -> Result<u32> {
    let answer = prompt(&format!("Enter number of ideas to generate (default {default}): "))?;
    parse_count(&answer, default)
}

/// Parse an idea count, using `default` for a blank answer.
fn parse_count(answer: &str, default: u32) -> Result<u32> {
    if answer.is_empty() {
        return Ok(default);
    }
    match answer.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(eyre!("invalid number of ideas: '{answer}'")),
    }
}

/// First `max` characters of `text`, with `...` appended when cut.
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn print_saved(saved: &[ArtifactMeta]) {
    println!();
    for meta in saved {
        println!(
            "  Saved {} ({} bytes, sha256 {})",
            meta.path.display(),
            meta.size_bytes,
            &meta.sha256[..12.min(meta.sha256.len())]
        );
    }
}

fn print_summary(outcome: &PipelineOutcome) {
    print_saved(&outcome.saved);
    println!();
    println!("  Run:    {}", outcome.run_id);
    println!("  Topic:  {}", outcome.topic);
    println!("  Tone:   {}", outcome.tone.name);
    println!("  Ideas:  {}", outcome.ideas.len());
    println!("  Output: {}", outcome.output_dir.display());
    println!("  Time:   {:.1}s", outcome.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &PipelineOutcome) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(preview("Once upon a time...", 500), "Once upon a time...");
        let exact = "x".repeat(500);
        assert_eq!(preview(&exact, 500), exact);
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "a".repeat(501);
        let shown = preview(&text, 500);
        assert_eq!(shown.len(), 503);
        assert!(shown.ends_with("a..."));
    }

    #[test]
    fn cut_respects_char_boundaries() {
        let text = "é".repeat(600);
        let shown = preview(&text, 500);
        assert_eq!(shown.chars().count(), 503);
    }

    #[test]
    fn blank_count_uses_default() {
        assert_eq!(parse_count("", 5).unwrap(), 5);
        assert_eq!(parse_count("7", 5).unwrap(), 7);
        assert!(parse_count("many", 5).is_err());
        assert!(parse_count("0", 5).is_err());
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "inkflow", "run", "--domain", "AI", "--count", "3", "--select", "1", "--out", "/tmp/o",
        ])
        .unwrap();
        match cli.command {
            Command::Run {
                domain,
                count,
                select,
                out,
            } => {
                assert_eq!(domain.as_deref(), Some("AI"));
                assert_eq!(count, Some(3));
                assert_eq!(select, Some(1));
                assert_eq!(out.as_deref(), Some("/tmp/o"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn verbosity_and_log_format_are_global() {
        let cli = Cli::try_parse_from(["inkflow", "config", "show", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }
}
