//! The orchestrator: symbols in, tables plus failures out.
//!
//! One task is spawned per input symbol. Each task fetches and
//! normalizes its symbol, then reports `(input_index, outcome)` over an
//! mpsc channel to the single aggregating owner. The owner fills a
//! write-once slot per index, so results are logged in completion order
//! but assembled in input order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use harvester_core::{normalize_record, FailureKind, FetchFailure, RecordRows, Symbol, TableSet};
use telemetry::metrics;
use usda_client::{FetchConfig, Fetcher, PlantsApi};

use crate::progress::Progress;
use crate::summary::RunSummary;

/// Everything a finished run produces.
#[derive(Debug)]
pub struct HarvestReport {
    pub tables: TableSet,
    pub failures: Vec<FetchFailure>,
    pub summary: RunSummary,
}

/// Terminal state of one input symbol.
#[derive(Debug)]
enum SymbolOutcome {
    Rows { symbol: Symbol, rows: RecordRows },
    Failed(FetchFailure),
}

/// Runs the full harvest over `symbols` and returns the report.
///
/// Every input symbol lands in exactly one place: its rows in
/// `tables`, or an entry in `failures`. Cancelling `cancel` stops new
/// work promptly; symbols already resolved stay in the report and the
/// rest are recorded as cancelled failures.
pub async fn run_harvest(
    api: Arc<dyn PlantsApi>,
    symbols: Vec<Symbol>,
    config: &FetchConfig,
    progress: Option<mpsc::Sender<Progress>>,
    cancel: CancellationToken,
) -> HarvestReport {
    let started_at = Utc::now();
    let total = symbols.len();
    info!(
        symbols = total,
        concurrency = config.concurrency,
        max_attempts = config.max_attempts,
        "Starting harvest"
    );

    let fetcher = Arc::new(Fetcher::new(api, config, cancel));
    let (tx, mut rx) = mpsc::channel::<(usize, SymbolOutcome)>(total.max(1));

    for (index, symbol) in symbols.iter().cloned().enumerate() {
        let fetcher = fetcher.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = resolve_symbol(&fetcher, &symbol).await;
            // Capacity covers every task, so this never blocks.
            let _ = tx.send((index, outcome)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<SymbolOutcome>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);
    let mut completed = 0usize;

    while let Some((index, outcome)) = rx.recv().await {
        completed += 1;
        log_resolution(&outcome, completed, total);
        emit_progress(&progress, &outcome, completed, total).await;
        slots[index] = Some(outcome);
    }

    let mut tables = TableSet::default();
    let mut failures = Vec::new();
    let mut succeeded = 0usize;
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(SymbolOutcome::Rows { rows, .. }) => {
                succeeded += 1;
                tables.push_record(rows);
            }
            Some(SymbolOutcome::Failed(failure)) => failures.push(failure),
            None => {
                // A task that panics drops its sender without reporting.
                warn!(symbol = %symbols[index], "Symbol task ended without reporting");
                failures.push(FetchFailure {
                    symbol: symbols[index].clone(),
                    kind: FailureKind::Permanent,
                    attempts: 0,
                    detail: "symbol task ended without reporting".to_string(),
                });
            }
        }
    }
    let finished_at = Utc::now();
    let summary = RunSummary::new(total, succeeded, &failures, started_at, finished_at);
    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        rows = tables.row_count(),
        elapsed_ms = summary.elapsed_ms,
        "Harvest finished"
    );

    HarvestReport {
        tables,
        failures,
        summary,
    }
}

/// Fetches and normalizes one symbol into its terminal outcome.
async fn resolve_symbol(fetcher: &Fetcher, symbol: &Symbol) -> SymbolOutcome {
    let outcome = fetcher.fetch_record(symbol).await;
    let attempts = outcome.attempts;
    let result = outcome
        .result
        .and_then(|record| normalize_record(symbol, record));

    match result {
        Ok(rows) => SymbolOutcome::Rows {
            symbol: symbol.clone(),
            rows,
        },
        Err(error) => SymbolOutcome::Failed(FetchFailure {
            symbol: symbol.clone(),
            kind: error.failure_kind(),
            attempts,
            detail: error.to_string(),
        }),
    }
}

fn log_resolution(outcome: &SymbolOutcome, completed: usize, total: usize) {
    match outcome {
        SymbolOutcome::Rows { symbol, rows } => {
            metrics().symbols_succeeded.inc();
            info!(
                symbol = %symbol,
                completed = completed,
                total = total,
                native_statuses = rows.native_statuses.len(),
                ancestors = rows.ancestors.len(),
                characteristics = rows.characteristics.len(),
                "Symbol resolved"
            );
        }
        SymbolOutcome::Failed(failure) => {
            metrics().symbols_failed.inc();
            match failure.kind {
                FailureKind::RetriesExhausted => metrics().failures_retries_exhausted.inc(),
                FailureKind::Permanent => metrics().failures_permanent.inc(),
                FailureKind::Normalization => metrics().failures_normalization.inc(),
                FailureKind::Cancelled => metrics().failures_cancelled.inc(),
            }
            warn!(
                symbol = %failure.symbol,
                completed = completed,
                total = total,
                kind = failure.kind.as_str(),
                attempts = failure.attempts,
                detail = %failure.detail,
                "Symbol failed"
            );
        }
    }
}

async fn emit_progress(
    progress: &Option<mpsc::Sender<Progress>>,
    outcome: &SymbolOutcome,
    completed: usize,
    total: usize,
) {
    if let Some(tx) = progress {
        let event = match outcome {
            SymbolOutcome::Rows { symbol, rows } => Progress::Resolved {
                symbol: symbol.clone(),
                completed,
                total,
                rows: 1 + rows.native_statuses.len()
                    + rows.ancestors.len()
                    + rows.characteristics.len(),
            },
            SymbolOutcome::Failed(failure) => Progress::Failed {
                symbol: failure.symbol.clone(),
                completed,
                total,
                kind: failure.kind,
            },
        };
        let _ = tx.send(event).await;
    }
}
