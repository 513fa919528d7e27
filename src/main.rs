//! Reelcrew CLI entry point.

use anyhow::Result;
use clap::Parser;
use reelcrew::cli::{commands, Cli, Commands};
use reelcrew::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let mut settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("reelcrew={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // CLI flags win over file and environment
    if let Some(model) = &cli.model {
        settings.model.name = model.clone();
    }
    if let Some(max_turns) = cli.max_turns {
        settings.team.max_turns = max_turns;
    }
    settings.validate()?;

    match &cli.command {
        None | Some(Commands::Chat) => {
            commands::run_chat(settings).await?;
        }

        Some(Commands::Once { task }) => {
            commands::run_once(task, settings).await?;
        }

        Some(Commands::Doctor) => {
            commands::run_doctor(&settings, config_path.as_deref()).await?;
        }

        Some(Commands::Config { action }) => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
