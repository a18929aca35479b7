//! readmepage CLI — build a static showcase page from a remote README.
//!
//! Fetches the markdown, highlights its code blocks, adds a table of
//! contents and writes one HTML file.

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
