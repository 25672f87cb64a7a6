//! The scenario runner: a claim-by-index worker pool.

use crate::cancel::CancelToken;
use crate::error::{ExecutorError, PersistenceError};
use crate::sink::ResultSink;
use lpgsim_engine::run_replica;
use lpgsim_types::{
    derive_replica_seed, EngineError, KpiRow, ReplicaOutput, RunStatus, Scenario, ScenarioResult,
    SeriesRow, DEFAULT_BASE_SEED,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Default number of replicas whose full time series is persisted.
pub const DEFAULT_SERIES_SAMPLE: u64 = 50;

/// Progress callback, invoked with `(completed, total)` as replicas finish.
pub type ProgressObserver = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Options for one scenario run.
pub struct RunOptions {
    /// Scenario identity folded into every replica seed and row.
    pub scenario_id: u64,
    /// Number of replicas to run.
    pub num_replicas: u64,
    /// Worker threads (clamped to at least 1).
    pub max_workers: usize,
    /// First `series_sample` replica indices persist their full series.
    pub series_sample: u64,
    /// Cooperative cancellation flag.
    pub cancel: CancelToken,
    /// Replica indices already persisted by an earlier run; they are counted
    /// as completed and not recomputed.
    pub skip_completed: HashSet<u64>,
    /// Optional progress observer.
    pub on_progress: Option<ProgressObserver>,
}

impl RunOptions {
    /// Options with the defaults: scenario id 0, series sample of
    /// [`DEFAULT_SERIES_SAMPLE`], no cancellation, nothing skipped.
    pub fn new(num_replicas: u64, max_workers: usize) -> Self {
        Self {
            scenario_id: 0,
            num_replicas,
            max_workers,
            series_sample: DEFAULT_SERIES_SAMPLE,
            cancel: CancelToken::new(),
            skip_completed: HashSet::new(),
            on_progress: None,
        }
    }
}

enum WorkerMsg {
    Finished { index: u64, output: ReplicaOutput },
    Failed { index: u64, error: EngineError },
    Skipped { index: u64 },
}

/// Run all replicas of one scenario across a worker pool.
///
/// Workers claim the next unclaimed replica index from a shared atomic
/// counter; each replica's seed depends only on `(base seed, scenario_id,
/// index)`, so the stored results are identical for any worker count.
/// Completion order is nondeterministic, but the returned rows are sorted
/// by replica index.
///
/// Each finished KPI row is appended to `sink` as it completes (retried
/// once on failure); replicas with `index < series_sample` also persist
/// their full series. Engine failures are recorded in `n_failed` without
/// stopping the experiment.
pub fn run_scenario(
    scenario: &Scenario,
    opts: &RunOptions,
    sink: &dyn ResultSink,
) -> Result<ScenarioResult, ExecutorError> {
    scenario.validate()?;

    let base_seed = scenario.seed.unwrap_or(DEFAULT_BASE_SEED);
    let total = opts.num_replicas;
    let workers = opts.max_workers.max(1);

    info!(
        scenario_id = opts.scenario_id,
        num_replicas = total,
        max_workers = workers,
        base_seed,
        resumed = opts.skip_completed.len(),
        "Starting Monte Carlo run"
    );

    let next_index = AtomicU64::new(0);
    let completed_count = AtomicU64::new(0);
    let (tx, rx) = crossbeam::channel::unbounded::<WorkerMsg>();

    let collected = std::thread::scope(|scope| -> Result<Collected, ExecutorError> {
        for _ in 0..workers {
            let tx = tx.clone();
            let next_index = &next_index;
            let completed_count = &completed_count;
            let cancel = &opts.cancel;
            let skip = &opts.skip_completed;
            let series_sample = opts.series_sample;
            scope.spawn(move || {
                loop {
                    if cancel.is_canceled() {
                        break;
                    }
                    let index = next_index.fetch_add(1, Ordering::Relaxed);
                    if index >= total {
                        break;
                    }
                    if skip.contains(&index) {
                        completed_count.fetch_add(1, Ordering::Relaxed);
                        if tx.send(WorkerMsg::Skipped { index }).is_err() {
                            break;
                        }
                        continue;
                    }
                    let seed = derive_replica_seed(base_seed, opts.scenario_id, index);
                    let msg = match run_replica(scenario, seed) {
                        Ok(mut output) => {
                            // Only the sampled prefix keeps its series; the
                            // rest is dropped here to bound live memory.
                            if index >= series_sample {
                                output.series = Vec::new();
                            }
                            completed_count.fetch_add(1, Ordering::Relaxed);
                            WorkerMsg::Finished { index, output }
                        }
                        Err(error) => {
                            completed_count.fetch_add(1, Ordering::Relaxed);
                            WorkerMsg::Failed { index, error }
                        }
                    };
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut rows: Vec<Option<KpiRow>> = vec![None; total as usize];
        let mut sampled_series = Vec::new();
        let mut n_failed = 0u64;
        let mut n_skipped = 0u64;
        let mut persist_error: Option<PersistenceError> = None;

        for msg in rx.iter() {
            match msg {
                WorkerMsg::Finished { index, output } => {
                    let row = KpiRow::new(opts.scenario_id, index, output.kpis);
                    if persist_error.is_none() {
                        if let Err(e) = append_row_with_retry(sink, &row) {
                            // Stop claiming new work, but drain what is in
                            // flight so the pool shuts down cleanly.
                            opts.cancel.cancel();
                            persist_error = Some(e);
                        } else if !output.series.is_empty() {
                            let series = SeriesRow {
                                scenario_id: opts.scenario_id,
                                replica_index: index,
                                records: output.series,
                            };
                            match append_series_with_retry(sink, &series) {
                                Ok(()) => sampled_series.push(series),
                                Err(e) => {
                                    opts.cancel.cancel();
                                    persist_error = Some(e);
                                }
                            }
                        }
                    }
                    rows[index as usize] = Some(row);
                }
                WorkerMsg::Failed { index, error } => {
                    warn!(index, %error, "replica failed");
                    n_failed += 1;
                }
                WorkerMsg::Skipped { index } => {
                    debug!(index, "replica already persisted, skipped");
                    n_skipped += 1;
                }
            }
            if let Some(observer) = &opts.on_progress {
                observer(completed_count.load(Ordering::Relaxed), total);
            }
        }

        if let Some(e) = persist_error {
            return Err(e.into());
        }
        Ok(Collected {
            rows,
            sampled_series,
            n_failed,
            n_skipped,
        })
    })?;

    let rows: Vec<KpiRow> = collected.rows.into_iter().flatten().collect();
    let mut sampled_series = collected.sampled_series;
    sampled_series.sort_by_key(|s| s.replica_index);
    let n_completed = rows.len() as u64 + collected.n_skipped;
    let processed = n_completed + collected.n_failed;
    let status = if processed < total {
        RunStatus::Partial
    } else {
        RunStatus::Completed
    };

    info!(
        scenario_id = opts.scenario_id,
        n_completed,
        n_failed = collected.n_failed,
        ?status,
        "Monte Carlo run finished"
    );

    Ok(ScenarioResult {
        scenario_id: opts.scenario_id,
        status,
        n_requested: total,
        n_completed,
        n_failed: collected.n_failed,
        rows,
        sampled_series,
    })
}

struct Collected {
    rows: Vec<Option<KpiRow>>,
    sampled_series: Vec<SeriesRow>,
    n_failed: u64,
    n_skipped: u64,
}

fn append_row_with_retry(sink: &dyn ResultSink, row: &KpiRow) -> Result<(), PersistenceError> {
    match sink.append_row(row) {
        Ok(()) => Ok(()),
        Err(first) => {
            warn!(replica_index = row.replica_index, %first, "sink append failed, retrying once");
            sink.append_row(row)
        }
    }
}

fn append_series_with_retry(
    sink: &dyn ResultSink,
    series: &SeriesRow,
) -> Result<(), PersistenceError> {
    match sink.append_series(series) {
        Ok(()) => Ok(()),
        Err(first) => {
            warn!(replica_index = series.replica_index, %first, "sink append failed, retrying once");
            sink.append_series(series)
        }
    }
}
