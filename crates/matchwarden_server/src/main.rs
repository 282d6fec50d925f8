//! Matchwarden - CLI entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use matchwarden_server::{
    Arbiter, ChannelOutbox, InboundEvent, MatchRegistry, MemoryOutbox, ServerConfig, pump_events,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;
    initialize_tracing(&config);

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Replay { script } => replay(&config, &script),
    }
}

fn initialize_tracing(config: &ServerConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the event loop over stdin/stdout
#[instrument(skip(config))]
async fn serve(config: ServerConfig) -> Result<()> {
    info!("Starting matchwarden");

    let (outbox, mut outbound) = ChannelOutbox::new();
    let registry = MatchRegistry::with_policy(config.expiry_policy());
    let arbiter = Arc::new(Arbiter::new(registry, outbox));

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(notification) = outbound.recv().await {
            let mut line = serde_json::to_vec(&notification)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let sweeper = {
        let arbiter = Arc::clone(&arbiter);
        let period = config.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let expired = arbiter.sweep(Instant::now());
                if !expired.is_empty() {
                    debug!(?expired, "Sweep reclaimed sessions");
                }
            }
        })
    };

    info!("Ready - send one JSON event per line");
    let summary = pump_events(BufReader::new(tokio::io::stdin()), &*arbiter).await?;
    info!(handled = summary.handled, skipped = summary.skipped, "Intake finished");
    if summary.halted {
        error!("Intake halted before end of input");
    }

    info!("Input closed, shutting down");
    sweeper.abort();
    let _ = sweeper.await;
    // Dropping the last arbiter handle closes the channel and ends the writer.
    drop(arbiter);
    writer.await??;
    Ok(())
}

/// Run a scripted event file
#[instrument(skip(config), fields(script = %script.display()))]
fn replay(config: &ServerConfig, script: &Path) -> Result<()> {
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;

    let arbiter = Arbiter::new(MatchRegistry::with_policy(config.expiry_policy()), MemoryOutbox::new());

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: InboundEvent = serde_json::from_str(line)
            .with_context(|| format!("Invalid event on line {}", number + 1))?;
        arbiter.handle(event)?;
        for notification in arbiter.outbox().drain() {
            println!("{}", serde_json::to_string(&notification)?);
        }
    }

    let registry = arbiter.registry();
    info!(sessions = registry.len(), "Replay finished");
    for id in registry.match_ids() {
        if let Some(session) = registry.get_match(&id) {
            info!(match_id = %id, phase = ?session.phase(), "Final board:\n{}", session.board().display());
        }
    }
    Ok(())
}
