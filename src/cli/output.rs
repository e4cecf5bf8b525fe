//! CLI output formatting

use crate::core::{RunStatus, ScriptStats, StageRecord};
use crate::execution::ExecutionEvent;
use crate::persistence::RunSummary;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Longest preview shown for a stage output
pub const PREVIEW_CHARS: usize = 80;

/// Create a progress bar over the pipeline stages
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Single-line preview, cut at `max` characters with an ellipsis
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}…", cut.trim_end())
    }
}

/// `[STAGE] → preview` for successes, `[STAGE] ✖ error` for failures
pub fn format_stage_record(record: &StageRecord) -> String {
    let stage = format!("[{}]", record.stage());
    match (record.output(), record.error()) {
        (Some(output), _) => format!(
            "{} → {}",
            style(stage).green(),
            preview(&output.as_text(), PREVIEW_CHARS)
        ),
        (None, Some(error)) => format!(
            "{} ✖ {}",
            style(stage).red(),
            style(preview(error, PREVIEW_CHARS)).dim()
        ),
        (None, None) => stage,
    }
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
        RunStatus::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

/// One-line run summary for history listings
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = match summary.status {
        RunStatus::Completed => CHECK,
        RunStatus::Failed => CROSS,
        RunStatus::Cancelled => WARN,
    };

    let failed = summary
        .failed_stage
        .map(|stage| format!(" at {}", stage))
        .unwrap_or_default();

    format!(
        "{} {} - {} - {}{} ({}/5) - {}",
        status_icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(preview(&summary.topic, 40)).bold(),
        format_status(summary.status),
        failed,
        summary.completed_stages(),
        style(summary.started_at.format("%Y-%m-%d %H:%M")).dim()
    )
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted { run_id, topic } => format!(
            "{} Starting run for {} ({})",
            ROCKET,
            style(topic).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StageStarted { stage, .. } => {
            format!("{} {}", SPINNER, style(stage).cyan())
        }
        ExecutionEvent::StageCompleted { stage, output, .. } => format!(
            "{} {} → {}",
            CHECK,
            style(stage).green(),
            preview(&output.as_text(), PREVIEW_CHARS)
        ),
        ExecutionEvent::StageFailed { stage, error, .. } => {
            format!("{} {}: {}", CROSS, style(stage).red(), style(error).dim())
        }
        ExecutionEvent::PipelineFinished { run_id, status } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Word count and estimated narration time
pub fn format_script_stats(stats: &ScriptStats) -> String {
    format!(
        "{} words, ~{:.2} min, {} paragraph breaks",
        style(stats.word_count).cyan(),
        stats.estimated_duration_min,
        stats.section_count
    )
}

/// Horizontal rule spanning the terminal width (80 when unknown)
pub fn separator() -> String {
    let width = term_size::dimensions_stdout().map(|(w, _)| w).unwrap_or(80);
    "─".repeat(width)
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
