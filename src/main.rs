// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments (and BEAGLE_* env vars) using clap
// 2. Set up logging to stderr, so stdout only ever carries result lines
// 3. Load the site list; if that fails, nothing is checked
// 4. Check every site with at most N checks in flight, printing one line
//    per site as each check completes
// 5. Exit 0 after a completed run, 1 if the run could not start
// =============================================================================

mod checker;
mod cli;
mod config;
mod dispatch;
mod output;
mod sites;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use checker::HttpChecker;
use cli::Cli;
use config::RunConfig;
use dispatch::{Dispatcher, Limiter};
use output::ResultSink;

#[tokio::main]
async fn main() {
    let config = RunConfig::from(Cli::parse());
    init_logging(config.verbose);

    let exit_code = match run(config).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise warnings only, or debug with --verbose.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "beagle=debug" } else { "beagle=warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(config: RunConfig) -> Result<()> {
    let sites = sites::load_sites(&config.site_list).await?;
    let checker = HttpChecker::new(&config.user_agent, config.request_timeout)?;

    info!(
        sites = sites.len(),
        identity = %config.identity,
        concurrency = config.concurrency.get(),
        timeout_secs = config.request_timeout.as_secs(),
        "starting run"
    );

    // The limiter clamps the concurrency, so size the sink from it
    let limiter = Limiter::new(config.concurrency);
    let sink = ResultSink::start(tokio::io::stdout(), limiter.capacity());
    let dispatcher = Dispatcher::new(Arc::new(checker), limiter, config.identity.as_str());

    let summary = dispatcher.run(sites, &sink.emitter()).await;
    sink.stop().await.context("failed to write results")?;

    info!(%summary, "run complete");
    Ok(())
}
