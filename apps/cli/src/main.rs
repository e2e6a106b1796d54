//! wikimd CLI: convert Wikipedia articles into Markdown files.
//!
//! Fetches an article across an ordered list of language editions, renders
//! its sections and display math as Markdown, links outbound article names,
//! and optionally downloads the article's images.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
