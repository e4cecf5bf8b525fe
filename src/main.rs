mod agent;
mod cli;
mod core;
mod execution;
mod media;
mod persistence;

use anyhow::{bail, Context, Result};
use cli::commands::{HistoryCommand, RunCommand, ValidateCommand};
use cli::output::*;
use cli::{Cli, Command};
use crate::core::config::NovacastConfig;
use crate::core::{PipelineRequest, RunStatus, Stage};
use execution::{Collaborators, ExecutionEvent, Orchestrator, OrchestratorConfig, StageTimeouts};
use persistence::{PersistenceBackend, RunSummary};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate(cmd)?,
        Command::History(cmd) => show_history(cmd).await?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<NovacastConfig> {
    let config = match path {
        Some(path) => NovacastConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => NovacastConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

async fn open_store() -> Result<Arc<dyn PersistenceBackend>> {
    #[cfg(feature = "sqlite")]
    {
        Ok(Arc::new(persistence::SqliteRunStore::with_default_path().await?))
    }
    #[cfg(not(feature = "sqlite"))]
    {
        warn!("Built without sqlite support; history is not kept");
        Ok(Arc::new(persistence::InMemoryPersistence::new()))
    }
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let request = cmd.to_request()?;
    let config = load_config(cmd.config.as_deref())?;

    let collaborators = Collaborators::from_config(&config, cmd.offline)?;
    let orchestrator_config =
        OrchestratorConfig::default().with_timeouts(StageTimeouts::from(&config.stages));
    let mut orchestrator = Orchestrator::new(collaborators).with_config(orchestrator_config);

    // Progress display
    let progress = (!cmd.json).then(|| create_progress_bar(Stage::ALL.len()));
    if let Some(progress) = progress.clone() {
        orchestrator.add_event_handler(move |event| {
            if let ExecutionEvent::StageStarted { stage, .. } = &event {
                progress.set_message(stage.to_string());
            }
            if let ExecutionEvent::StageCompleted { .. } = &event {
                progress.inc(1);
            }
            progress.println(format_execution_event(&event));
        });
    }

    // Ctrl-C stops the run before the next stage
    let cancel = orchestrator.cancellation_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing the current stage");
            cancel.cancel();
        }
    });

    let outcome = orchestrator.run_pipeline(&request).await;
    if let Some(progress) = &progress {
        progress.finish_and_clear();
    }

    // Save to history
    if let Some(run_id) = orchestrator.run_id() {
        if !cmd.no_history {
            let store = open_store().await?;
            let summary = RunSummary::new(run_id, &request, &outcome, orchestrator.ledger());
            store.save_run(&summary).await?;
            if !cmd.json {
                println!(
                    "{} Run saved to history (ID: {})",
                    INFO,
                    style(&run_id.to_string()[..8]).dim()
                );
            }
        }
    }

    let status = RunStatus::from_outcome(&outcome);
    if cmd.json {
        let data = match &outcome {
            Ok(result) => serde_json::json!({
                "status": status,
                "result": result,
                "stats": result.script_stats(),
                "tasks": orchestrator.task_history(),
            }),
            Err(e) => serde_json::json!({
                "status": status,
                "stage": e.stage(),
                "error": e.to_string(),
                "tasks": orchestrator.task_history(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{}", style(separator()).dim());
        for record in orchestrator.task_history() {
            println!("{}", format_stage_record(record));
        }
        println!("{}", style(separator()).dim());
    }

    match outcome {
        Ok(result) => {
            if !cmd.json {
                println!(
                    "\n{} {} completed {}",
                    CHECK,
                    style(&request.topic).bold(),
                    style("successfully").green()
                );
                println!("  Idea: {}", result.idea());
                println!("  Script: {}", format_script_stats(&result.script_stats()));
                println!("  Audio: {}", style(result.audio_path()).cyan());
                println!("  Video: {}", style(result.video_path()).cyan());
            }
            Ok(())
        }
        Err(e) => {
            if !cmd.json {
                println!(
                    "\n{} {} {}",
                    CROSS,
                    style(&request.topic).bold(),
                    format_status(status)
                );
            }
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn validate(cmd: &ValidateCommand) -> Result<()> {
    if cmd.request.is_none() && cmd.config.is_none() {
        bail!("Nothing to validate: pass --request and/or --config");
    }

    let mut report = serde_json::Map::new();
    let mut failed = false;

    if let Some(path) = &cmd.request {
        println!("{} Validating request {}...", INFO, path.display());
        match PipelineRequest::from_file(path) {
            Ok(request) => {
                println!("{} Request is valid!", CHECK);
                println!("  Topic: {}", style(&request.topic).bold());
                println!("  Language: {}", style(&request.language).cyan());
                report.insert("request".into(), serde_json::to_value(&request)?);
            }
            Err(e) => {
                println!("{} Validation failed:", CROSS);
                println!("  {}", style(format!("{:#}", e)).red());
                failed = true;
            }
        }
    }

    if let Some(path) = &cmd.config {
        println!("{} Validating config {}...", INFO, path.display());
        match load_config(Some(path)) {
            Ok(config) => {
                println!("{} Configuration is valid!", CHECK);
                println!(
                    "  Model: {} via {}",
                    style(&config.model.model).bold(),
                    config.model.command
                );
                println!("  Output: {}", style(config.media.output_dir.display()).cyan());
                report.insert("config".into(), serde_json::to_value(&config)?);
            }
            Err(e) => {
                println!("{} Validation failed:", CROSS);
                println!("  {}", style(format!("{:#}", e)).red());
                failed = true;
            }
        }
    }

    if cmd.json && !failed {
        println!("\n{}", serde_json::to_string_pretty(&report)?);
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = open_store().await?;

    // If specific run ID is requested
    if let Some(run_id) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id).context("Invalid run ID format")?;
        match store.load_run(run_id).await? {
            Some(summary) => print_run_details(&summary, cmd.json)?,
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    let runs = store.list_runs(cmd.limit).await?;
    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, cmd.limit);
    for summary in &runs {
        println!("  {}", format_run_summary(summary));
    }

    Ok(())
}

fn print_run_details(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{} Run Details", INFO);
    println!("  ID: {}", style(summary.run_id).cyan());
    println!("  Topic: {}", style(&summary.topic).bold());
    println!("  Status: {}", format_status(summary.status));
    println!("  Started: {}", style(summary.started_at.to_rfc3339()).dim());
    if let Ok(duration) = summary
        .completed_at
        .signed_duration_since(summary.started_at)
        .to_std()
    {
        println!("  Duration: {}", style(format_duration(duration)).dim());
    }
    if let Some(error) = &summary.error {
        println!("  Error: {}", style(error).red());
    }

    println!("\n  {}", style("Stages:").bold());
    for record in &summary.records {
        println!("    {}", format_stage_record(record));
    }

    Ok(())
}
