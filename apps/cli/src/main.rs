//! Inkflow CLI: generate article ideas, research one, and write it up.
//!
//! Runs the idea → research → article pipeline against a hosted chat model
//! and a web-search API, leaving JSON artifacts in the output directory.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
