//! Debate Arena - terminal debate moderator
//!
#![doc = "Debate Arena - terminal debate moderator"]
#![doc = "Main entry point for the debate-arena binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use debate_arena::cli::{Cli, Commands};
use debate_arena::commands;
use debate_arena::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { .. } => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { topic, .. } => {
            tracing::debug!("Topic: {}", topic);
            commands::ask::run_ask(config, topic).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with the streamed reply on
/// stdout.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "debate_arena=debug"
    } else {
        "debate_arena=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
