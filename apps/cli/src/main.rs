//! ContextKeys CLI — generate keywords for Markdown notes and merge them
//! into each note's frontmatter.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let log_handle = commands::init_tracing(&cli);
    let config = commands::load_app_config(&cli)?;
    commands::apply_config_logging(&log_handle, &cli, config.defaults.debug)?;
    commands::run(cli, config).await
}
