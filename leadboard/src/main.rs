//! leadboard - lead pipeline sync client
//!
//! Pulls leads from the CRM backend, lays them out in pipeline columns and
//! moves them between stages.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/leadboard/ (~/.local/state/leadboard/)
//! - Config: $XDG_CONFIG_HOME/leadboard/config.toml (~/.config/leadboard/config.toml)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use leadboard_core::pipeline::{
    column, column_summaries, format_currency, BoardStats, FetchOutcome, IntervalTicker,
    MountedBoard, MoveOutcome, SyncController, SyncEvent,
};
use leadboard_core::{Config, HttpLeadStore, PipelineStage};

#[derive(Parser)]
#[command(name = "leadboard")]
#[command(about = "Lead pipeline sync client for the CRM backend")]
#[command(version)]
struct Args {
    /// Config file (defaults to ~/.config/leadboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the pipeline once and print every column
    Board {
        /// List the leads in each column, not just totals
        #[arg(short, long)]
        verbose: bool,
    },
    /// Move a lead to another stage
    Move {
        /// Lead id
        id: String,
        /// Target stage (new, contacted, qualified, showing, under_contract, closing, closed_won)
        stage: PipelineStage,
    },
    /// Keep the pipeline synced, printing totals after every refresh
    Watch,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;

    let _log_guard =
        leadboard_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(base_url = %config.api.base_url, "leadboard starting");

    let store = HttpLeadStore::new(config.api.clone()).context("failed to create API client")?;
    let controller = SyncController::new(Arc::new(store));

    match args.command {
        Command::Board { verbose } => board(&controller, verbose).await,
        Command::Move { id, stage } => move_lead(&controller, &id, stage).await,
        Command::Watch => watch(controller, &config).await,
    }
}

async fn fetch(controller: &SyncController) -> Result<usize> {
    match controller.fetch_all().await {
        FetchOutcome::Refreshed { count } => Ok(count),
        FetchOutcome::Failed { error } => bail!("failed to fetch leads: {}", error),
        FetchOutcome::Discarded => bail!("board was unmounted during fetch"),
    }
}

async fn board(controller: &SyncController, verbose: bool) -> Result<()> {
    fetch(controller).await?;
    let leads = controller.leads();

    for summary in column_summaries(&leads) {
        println!(
            "{:<16} {:>4}  {}",
            summary.stage.display_name(),
            summary.count,
            format_currency(summary.value)
        );
        if verbose {
            for lead in column(&leads, summary.stage) {
                println!("    [{}] {} ({})", lead.priority, lead.name, lead.id);
            }
        }
    }

    print_stats(&BoardStats::compute(&leads));
    Ok(())
}

async fn move_lead(controller: &SyncController, id: &str, stage: PipelineStage) -> Result<()> {
    fetch(controller).await?;

    match controller.move_and_persist(id, stage).await {
        MoveOutcome::Persisted => {
            println!("Moved {} to {}", id, stage.display_name());
            Ok(())
        }
        MoveOutcome::UnknownLead => bail!("lead {} is not on the board", id),
        MoveOutcome::Discarded => bail!("board was unmounted before the move"),
        MoveOutcome::Resynced { error, fetch } => {
            let current = controller
                .stage_of(id)
                .map(|s| s.display_name())
                .unwrap_or("unknown");
            tracing::debug!(?fetch, "Resync after failed move");
            bail!("failed to move {}: {} (now in {})", id, error, current)
        }
    }
}

async fn watch(controller: SyncController, config: &Config) -> Result<()> {
    let ticker = IntervalTicker::new(config.sync.poll_interval());
    let board = MountedBoard::mount(controller, ticker).await;
    let mut events = board.controller().subscribe();

    match board.controller().last_error() {
        Some(error) => println!("Initial fetch failed: {}", error),
        None => print_stats(&BoardStats::compute(&board.controller().leads())),
    }
    println!(
        "Watching pipeline every {}s (Ctrl-C to stop)",
        config.sync.poll_interval_secs
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(SyncEvent::Refreshed { .. }) => {
                    print_stats(&BoardStats::compute(&board.controller().leads()));
                }
                Ok(SyncEvent::FetchFailed { error }) => {
                    println!("Refresh failed, showing last good data: {}", error);
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Watch output lagged behind events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    let polls = board.unmount().await;
    tracing::info!(polls, "leadboard watch stopped");
    Ok(())
}

fn print_stats(stats: &BoardStats) {
    println!(
        "Leads: {}  Pipeline: {}  Closed: {} ({})",
        stats.total_leads,
        format_currency(stats.pipeline_value),
        stats.closed_won,
        format_currency(stats.closed_value)
    );
}
