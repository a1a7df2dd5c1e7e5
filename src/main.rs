//! Bulk Lifecycle Engine CLI
//!
//! Command-line interface for bulk suspend/restore of directory accounts
//! from a CSV export.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- suspend --csv users.csv
//! cargo run -- suspend --csv users.csv --dry-run
//! cargo run -- restore --csv users.csv --all --non-interactive
//! cargo run -- suspend --csv users.csv --test --max-retries 5 --retry-delay 2.0
//! ```
//!
//! Credentials come from the environment (`ORG_ID`, `API_KEY`), optionally
//! seeded from a `.env` file. The per-run outcome report is written under
//! the logs directory.
//!
//! # Exit Codes
//!
//! - 0: Success (including no-op and dry runs)
//! - 1: Error (missing configuration, unreadable CSV, persistence failure)
//! - 130: Interrupted by the operator

use std::io::Write as _;
use std::process;
use std::sync::atomic::Ordering;

use bulk_lifecycle_engine::cli;
use bulk_lifecycle_engine::config::{self, ApiConfig};
use bulk_lifecycle_engine::core::{
    eligible, BatchRunner, Checkpoint, CheckpointStore, ResumeDecision, RunConfig,
};
use bulk_lifecycle_engine::io::{read_batch, report_path, write_report};
use bulk_lifecycle_engine::remote::RestDirectoryClient;
use bulk_lifecycle_engine::types::{EngineError, Operation, RowBatch, RunSummary};

fn main() {
    // Environment mutation happens before any worker thread exists;
    // set_var is not safe once the runtime is running.
    config::load_env_file();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::parse_args();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            process::exit(1);
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => {}
        Err(EngineError::Cancelled) => {
            eprintln!("Operation interrupted by operator; checkpoint kept for resume");
            process::exit(130);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run(args: cli::CliArgs) -> Result<(), EngineError> {
    let api = ApiConfig::from_env()?;
    let client = RestDirectoryClient::new(&api)?;
    let run_config = args.to_run_config();
    let operation = args.operation;

    // Surface bad credentials before touching any row. Dry runs make no
    // remote calls at all, including this one.
    if !run_config.dry_run {
        client.verify_credentials().await?;
    }

    let batch = read_batch(&args.csv)?;
    for invalid in &batch.invalid {
        tracing::warn!(line = invalid.line, reason = %invalid.reason, "skipping invalid row");
    }

    if !confirm_batch(&batch, operation, &run_config) {
        println!("Aborted, nothing processed.");
        return Ok(());
    }

    let fingerprint = batch.fingerprint.clone();
    let store = CheckpointStore::new(&api.state_dir, operation, &fingerprint);
    let mut runner = BatchRunner::new(&client, run_config, store);

    // Honor Ctrl-C between rows; the current row finishes (or fails) first.
    let cancel = runner.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received, stopping after the current row...");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let summary = runner.run(operation, batch, prompt_resume).await?;

    print_summary(&summary);
    save_report(&api, &summary, &fingerprint)?;

    Ok(())
}

/// Show what is about to happen and ask for confirmation
///
/// Non-interactive mode (and dry-run, which mutates nothing) proceeds
/// without prompting.
fn confirm_batch(batch: &RowBatch, operation: Operation, config: &RunConfig) -> bool {
    let eligible_rows: Vec<_> = batch
        .rows
        .iter()
        .filter(|row| {
            eligible(
                operation,
                row.normalized_status(),
                config.all,
                batch.status_column_present,
            )
        })
        .collect();

    println!(
        "{} eligible row(s) for {} ({} total, {} invalid){}",
        eligible_rows.len(),
        operation,
        batch.rows.len(),
        batch.invalid.len(),
        if config.dry_run { " [DRY RUN]" } else { "" },
    );
    for row in eligible_rows.iter().take(5) {
        match &row.display_name {
            Some(name) => println!("  - {} ({})", row.email, name),
            None => println!("  - {}", row.email),
        }
    }
    if eligible_rows.len() > 5 {
        println!("  ... and {} more", eligible_rows.len() - 5);
    }

    if eligible_rows.is_empty() || config.non_interactive || config.dry_run {
        return true;
    }

    matches!(
        prompt("Continue? (yes/y to confirm)").as_deref(),
        Some("yes") | Some("y")
    )
}

/// Resume prompt used when an interactive run finds a prior checkpoint
fn prompt_resume(checkpoint: &Checkpoint) -> ResumeDecision {
    println!(
        "Found a checkpoint with {} processed identifier(s) from {}.",
        checkpoint.processed_identifiers.len(),
        checkpoint.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    match prompt("Continue from where you left off? (yes/y to resume)").as_deref() {
        Some("yes") | Some("y") => ResumeDecision::Resume,
        _ => ResumeDecision::StartFresh,
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{} > ", label);
    std::io::stdout().flush().ok()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).ok()?;
    Some(input.trim().to_lowercase())
}

fn print_summary(summary: &RunSummary) {
    let mode = if summary.dry_run {
        " [DRY RUN - no changes were made]"
    } else if summary.test_mode {
        " [TEST MODE - first eligible row only]"
    } else {
        ""
    };

    println!("\nFinal statistics - {}{}", summary.operation, mode);
    println!("  succeeded:          {}", summary.succeeded());
    println!("  failed:             {}", summary.failed());
    println!("  already done:       {}", summary.already_done);
    println!("  skipped ineligible: {}", summary.skipped_ineligible);
    println!("  invalid rows:       {}", summary.invalid.len());

    for outcome in summary.outcomes.iter().filter(|o| !o.succeeded) {
        let reason = outcome
            .error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  ✗ {} - {}", outcome.row.email, reason);
    }
}

fn save_report(
    api: &ApiConfig,
    summary: &RunSummary,
    fingerprint: &str,
) -> Result<(), EngineError> {
    std::fs::create_dir_all(&api.state_dir)?;
    let path = report_path(&api.state_dir, summary, fingerprint);
    let mut file = std::fs::File::create(&path)?;
    write_report(summary, &mut file)?;
    println!("\nReport saved to {}", path.display());
    Ok(())
}
