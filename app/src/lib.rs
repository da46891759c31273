//! Harvest command-line application shell.
//!
//! This is the thin front end that loads configuration, submits one request
//! to the orchestrator and relays its events as server-sent-event frames.
//! Core logic lives in the `crates/` directory.

pub mod cli;
pub mod error;
pub mod sse;
pub mod state;

use anyhow::{Context, Result};
use cli::{CliArgs, CliCommand};
use error::CommandError;
use futures::StreamExt;
use harvest_core::{AppConfig, RunRequest};
use harvest_scanner::{ProgressTracker, ScrapeEvent, StreamOutcome};
use sse::SseWriter;
use state::AppState;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

/// How a single invocation ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The request ran and its stream ended
    Finished(StreamOutcome),
    /// The request failed validation
    Rejected(CommandError),
}

impl RunOutcome {
    /// 0 on `done`, 1 on `error` or a truncated stream, 2 on rejection.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Finished(StreamOutcome::Completed) => 0,
            Self::Finished(_) => 1,
            Self::Rejected(_) => 2,
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &CliArgs) -> Result<AppConfig> {
    let mut config = match &cli.config_path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load_with_env().context("failed to load config")?,
    };
    if let Some(engine) = cli.engine {
        config.browser.engine = engine;
    }
    Ok(config)
}

/// Submit `request`, relay its events to `out`, and optionally write the
/// final snapshot to `results_path`.
pub async fn execute<W: Write>(
    state: &AppState,
    request: RunRequest,
    mut out: W,
    results_path: Option<&Path>,
) -> Result<RunOutcome> {
    let mut run = match state.orchestrator.start(request).await {
        Ok(run) => run,
        Err(e) => {
            tracing::warn!("Request rejected: {}", e);
            let body = CommandError::from(e);
            writeln!(out, "{}", serde_json::to_string(&body)?)?;
            return Ok(RunOutcome::Rejected(body));
        }
    };

    info!("Run {} accepted", run.id);
    let mut writer = SseWriter::new(out);
    let mut tracker = ProgressTracker::new();
    while let Some(event) = run.events.next().await {
        tracker.observe(&event);
        writer.send(&event).context("failed to write event")?;
        if matches!(event, ScrapeEvent::Result { .. }) {
            debug!(
                "Processed {}/{} sites ({:.0}%)",
                tracker.processed_sites(),
                tracker.total_sites(),
                tracker.percent()
            );
        }
    }
    let outcome = tracker.finish();
    if outcome == StreamOutcome::Truncated {
        tracing::error!("Run {} ended without a terminal event", run.id);
    }

    if let Some(path) = results_path {
        let snapshot = state.orchestrator.snapshot(&run.id).await;
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        info!("Results written to {}", path.display());
    }

    Ok(RunOutcome::Finished(outcome))
}

/// Entry point for the `harvest` binary.
pub async fn run<I>(args: I) -> ExitCode
where
    I: IntoIterator<Item = String>,
{
    let cli = match cli::parse_args(args) {
        Ok(CliCommand::Run(cli)) => cli,
        Ok(CliCommand::Help) => {
            print!("{}", cli::USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(CliCommand::Version) => {
            println!("harvest {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}\n\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    match run_cli(&cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run_cli(cli: &CliArgs) -> Result<RunOutcome> {
    let config = load_config(cli)?;
    init_tracing(&config.logging.filter);
    info!("Starting Harvest v{}", env!("CARGO_PKG_VERSION"));

    let text = cli.request.read()?;
    let request = match cli::parse_request(&text) {
        Ok(request) => request,
        Err(e) => {
            let body = CommandError::new("INVALID_REQUEST", format!("{e:#}"));
            println!("{}", serde_json::to_string(&body)?);
            return Ok(RunOutcome::Rejected(body));
        }
    };

    let state = AppState::new(config)?;
    let stdout = std::io::stdout();
    execute(&state, request, stdout.lock(), cli.results_path.as_deref()).await
}
