//! Parley binary entry point.

use std::sync::Arc;

use clap::Parser;
use parley::agent::{Agent, TurnHandler};
use parley::chat::{self, TerminalSurface};
use parley::cli::Cli;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> parley::error::Result<()> {
    // Missing GEMINI_API_KEY stops us here, before any session exists.
    let config = cli.load_config()?;
    tracing::debug!(?config, "configuration loaded");

    let agent = Arc::new(Agent::tutor(&config));
    let handler = TurnHandler::new(agent).with_turn_timeout(config.turn_timeout());
    let surface = TerminalSurface::stdout();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let input = chat::detached_reader(std::io::stdin())?;
    chat::run_chat(&handler, input, &surface, cancel).await?;
    Ok(())
}
