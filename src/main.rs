use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chorus::app::AppContext;
use chorus::cli::{commands, Cli, Commands};
use chorus::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config).await?;

    match cli.command {
        Commands::Send {
            prompt,
            targets,
            summarize,
        } => {
            commands::send(&ctx, &prompt, &targets, summarize).await?;
        }
        Commands::Targets => {
            commands::list_targets(&ctx).await?;
        }
    }

    Ok(())
}
