//! Batch runner
//!
//! Orchestrates one bulk lifecycle run:
//! `Idle → SchemaResolved → Filtered → (Resuming?) → Running → Completed|Aborted`.
//!
//! Schema resolution happens in the reader; the runner takes over from the
//! `Filtered` transition. Rows are processed strictly sequentially, one
//! outstanding remote call at a time, and no row begins before the previous
//! row's outcome has been durably checkpointed. That ordering is what makes
//! resume-after-crash safe.
//!
//! Row-level errors never escape the runner: they become [`RowOutcome`]
//! entries and the run continues. Run-level errors (persistence,
//! cancellation, concurrent-run) abort and leave the checkpoint intact.
//!
//! A run that covers every eligible row keeps its checkpoint as a
//! completed-run record, so re-running the same CSV and operation reports
//! every row as already done instead of re-issuing mutations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::checkpoint::{Checkpoint, CheckpointStore};
use crate::core::filter::eligible;
use crate::core::retry::RetryPolicy;
use crate::core::traits::DirectoryClient;
use crate::types::{EngineError, Operation, RemoteError, Row, RowBatch, RowOutcome, RunSummary};

/// Every tunable the engine consumes, passed explicitly into the runner
///
/// No global mutable state: callers construct this once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Additional remote attempts after the first, per row
    pub max_retries: u32,

    /// Fixed delay between retry attempts
    pub retry_delay: Duration,

    /// Delay between successive rows, independent of retries
    pub base_delay: Duration,

    /// Bypass the eligibility filter entirely
    pub all: bool,

    /// Simulate execution: no remote calls, no checkpoint mutation
    pub dry_run: bool,

    /// Process only the first eligible, non-checkpointed row
    pub test: bool,

    /// Suppress prompts; resume decisions use the fixed policy (resume)
    pub non_interactive: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            base_delay: Duration::from_millis(500),
            all: false,
            dry_run: false,
            test: false,
            non_interactive: false,
        }
    }
}

/// Explicit resume-or-restart input to the runner
///
/// Resolved interactively by the CLI, or by the fixed policy (resume) when
/// running non-interactively. Never an implicit runtime branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    /// Keep the existing checkpoint and skip identifiers it contains
    Resume,

    /// Discard the existing checkpoint and process every eligible row
    StartFresh,
}

/// Drives eligible rows through the remote capability
///
/// Owns the checkpoint store exclusively for the run's lifetime; no
/// concurrent runs against the same `(csv_fingerprint, operation)` pair are
/// supported.
pub struct BatchRunner<'a, C: DirectoryClient> {
    client: &'a C,
    config: RunConfig,
    store: CheckpointStore,
    cancel: Arc<AtomicBool>,
}

impl<'a, C: DirectoryClient> BatchRunner<'a, C> {
    /// Create a runner over the given client, configuration, and store
    pub fn new(client: &'a C, config: RunConfig, store: CheckpointStore) -> Self {
        BatchRunner {
            client,
            config,
            store,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag the caller may set to request cancellation
    ///
    /// Honored between rows, never mid-call; the checkpoint is left intact.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the operation over the batch
    ///
    /// `decide_resume` is consulted only when a non-empty checkpoint exists
    /// and the run is interactive; declining discards the checkpoint and
    /// starts fresh.
    ///
    /// # Errors
    ///
    /// Returns an error on checkpoint persistence failure, on detecting a
    /// concurrently active run, or on operator cancellation. Row-level
    /// failures are reported in the summary, not as errors.
    pub async fn run<F>(
        &mut self,
        operation: Operation,
        batch: RowBatch,
        decide_resume: F,
    ) -> Result<RunSummary, EngineError>
    where
        F: FnOnce(&Checkpoint) -> ResumeDecision,
    {
        // Filtered: the eligible subset is a pure function of the row and
        // flags, so a resumed run recomputes an identical set.
        let (eligible_rows, ineligible): (Vec<Row>, Vec<Row>) =
            batch.rows.into_iter().partition(|row| {
                eligible(
                    operation,
                    row.normalized_status(),
                    self.config.all,
                    batch.status_column_present,
                )
            });
        let skipped_ineligible = ineligible.len();

        tracing::info!(
            operation = %operation,
            eligible = eligible_rows.len(),
            skipped_ineligible,
            invalid = batch.invalid.len(),
            dry_run = self.config.dry_run,
            test = self.config.test,
            "batch filtered"
        );

        // Empty eligible set terminates with a no-op success, not an error.
        if eligible_rows.is_empty() {
            return Ok(RunSummary {
                operation,
                dry_run: self.config.dry_run,
                test_mode: self.config.test,
                outcomes: Vec::new(),
                skipped_ineligible,
                already_done: 0,
                invalid: batch.invalid,
            });
        }

        let checkpoint = self.prepare_checkpoint(operation, &batch.fingerprint, decide_resume)?;
        let summary = self
            .run_rows(operation, eligible_rows, checkpoint, skipped_ineligible, batch.invalid)
            .await?;

        Ok(summary)
    }

    /// Resuming?: load, guard, and resolve the checkpoint for this run
    ///
    /// Dry-run consults an existing checkpoint read-only (so skip
    /// classification matches a real run) but never mutates or owns it.
    fn prepare_checkpoint<F>(
        &self,
        operation: Operation,
        fingerprint: &str,
        decide_resume: F,
    ) -> Result<Checkpoint, EngineError>
    where
        F: FnOnce(&Checkpoint) -> ResumeDecision,
    {
        let existing = self.store.load()?;

        if self.config.dry_run {
            return Ok(existing.unwrap_or_else(|| Checkpoint::new(operation, fingerprint)));
        }

        let Some(checkpoint) = existing else {
            return Ok(Checkpoint::new(operation, fingerprint));
        };

        // A completed record means this exact input was already applied;
        // its identifiers classify rows as already done without prompting.
        if checkpoint.completed {
            tracing::info!(
                processed = checkpoint.processed_identifiers.len(),
                "input already fully processed, rows will report as already done"
            );
            return Ok(checkpoint);
        }

        // A checkpoint with a fresh updated_at belongs to a live run.
        if checkpoint.is_active() {
            return Err(EngineError::ConcurrentRun {
                age_secs: checkpoint.age().num_seconds(),
            });
        }

        if checkpoint.is_empty() {
            return Ok(checkpoint);
        }

        let decision = if self.config.non_interactive {
            ResumeDecision::Resume
        } else {
            decide_resume(&checkpoint)
        };

        match decision {
            ResumeDecision::Resume => {
                tracing::info!(
                    processed = checkpoint.processed_identifiers.len(),
                    "resuming from checkpoint"
                );
                Ok(checkpoint)
            }
            ResumeDecision::StartFresh => {
                tracing::info!("discarding checkpoint, starting fresh");
                self.store.clear()?;
                Ok(Checkpoint::new(operation, fingerprint))
            }
        }
    }

    /// Running: the sequential row loop
    async fn run_rows(
        &self,
        operation: Operation,
        rows: Vec<Row>,
        mut checkpoint: Checkpoint,
        skipped_ineligible: usize,
        invalid: Vec<crate::types::InvalidRow>,
    ) -> Result<RunSummary, EngineError> {
        let retry = RetryPolicy::new(self.config.max_retries, self.config.retry_delay);
        let total = rows.len();
        let mut outcomes = Vec::new();
        let mut already_done = 0;
        let mut stopped_early = false;

        for (index, row) in rows.into_iter().enumerate() {
            // Aborted: cancellation is honored between rows, never mid-call.
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!("cancellation requested, leaving checkpoint intact");
                return Err(EngineError::Cancelled);
            }

            let identifier = row.identifier().to_string();
            if checkpoint.contains(&identifier) {
                tracing::info!(identifier = %identifier, "already done, skipping");
                already_done += 1;
                continue;
            }

            let outcome = if self.config.dry_run {
                tracing::info!(
                    identifier = %identifier,
                    operation = %operation,
                    "DRY RUN: no remote call made"
                );
                RowOutcome {
                    row,
                    attempted: false,
                    succeeded: true,
                    error: None,
                    retries_used: 0,
                }
            } else {
                let outcome = self.process_row(row, operation, &retry).await;
                if outcome.succeeded {
                    checkpoint.record(&identifier);
                    tracing::info!(
                        identifier = %identifier,
                        operation = %operation,
                        retries = outcome.retries_used,
                        "row succeeded"
                    );
                } else {
                    tracing::warn!(
                        identifier = %identifier,
                        operation = %operation,
                        retries = outcome.retries_used,
                        error = %outcome.error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
                        "row failed"
                    );
                }
                // Durable flush before the next row starts; a write failure
                // aborts the run rather than proceeding without resume safety.
                self.store.save(&mut checkpoint)?;
                outcome
            };

            outcomes.push(outcome);

            if self.config.test {
                tracing::info!("test mode: stopping after first eligible row");
                stopped_early = index + 1 < total;
                break;
            }

            if !self.config.dry_run && index + 1 < total {
                tokio::time::sleep(self.config.base_delay).await;
            }
        }

        // Completed: all eligible rows attempted; the checkpoint is kept,
        // marked completed, as the durable record for repeat runs. A
        // test-mode run that sampled only part of the batch stays resumable.
        if !self.config.dry_run && !stopped_early {
            checkpoint.completed = true;
            self.store.save(&mut checkpoint)?;
        }

        Ok(RunSummary {
            operation,
            dry_run: self.config.dry_run,
            test_mode: self.config.test,
            outcomes,
            skipped_ineligible,
            already_done,
            invalid,
        })
    }

    /// Attempt one row: resolve the identifier, then change status
    ///
    /// The CSV-provided account id is preferred; the email lookup is only a
    /// fallback. Both legs run under the retry policy.
    async fn process_row(
        &self,
        row: Row,
        operation: Operation,
        retry: &RetryPolicy,
    ) -> RowOutcome {
        let (account_id, lookup_retries) = match row.resolved_account_id() {
            Some(id) => (id.to_string(), 0),
            None => {
                let email = row.email.clone();
                let (result, retries) =
                    retry.run(|| self.client.find_account_id(&email)).await;
                match result {
                    Ok(Some(id)) => (id, retries),
                    Ok(None) => {
                        return RowOutcome {
                            row,
                            attempted: true,
                            succeeded: false,
                            error: Some(EngineError::Remote(RemoteError::NotFound)),
                            retries_used: retries,
                        }
                    }
                    Err(e) => {
                        return RowOutcome {
                            row,
                            attempted: true,
                            succeeded: false,
                            error: Some(EngineError::Remote(e)),
                            retries_used: retries,
                        }
                    }
                }
            }
        };

        let (result, change_retries) = retry
            .run(|| self.client.change_status(&account_id, operation))
            .await;
        let retries_used = lookup_retries + change_retries;

        match result {
            Ok(()) => RowOutcome {
                row,
                attempted: true,
                succeeded: true,
                error: None,
                retries_used,
            },
            Err(e) => RowOutcome {
                row,
                attempted: true,
                succeeded: false,
                error: Some(EngineError::Remote(e)),
                retries_used,
            },
        }
    }
}
