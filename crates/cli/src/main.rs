//! lpgsim CLI
//!
//! Run Monte Carlo resilience experiments from the command line.
//!
//! # Example
//!
//! ```bash
//! # 10k replicas of a scenario document, streaming results to ./out
//! lpgsim run --scenario scenario.json --replicas 10000 --out out/
//!
//! # Continue an interrupted run without recomputing finished replicas
//! lpgsim run --scenario scenario.json --replicas 10000 --out out/ --resume
//!
//! # The built-in 2x3 capacity x disruption factorial with ANOVA output
//! lpgsim factorial --replicas 1000
//! ```

use clap::{Parser, Subcommand};
use lpgsim_executor::{
    run_factorial, run_scenario, CancelToken, FactorialDesign, JsonlSink, RunOptions,
    DEFAULT_SERIES_SAMPLE,
};
use lpgsim_stats::{aggregate_factorial, aggregate_series, summarize_scenario, CellData};
use lpgsim_types::{KpiField, Scenario};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// LPG supply-chain resilience simulator.
///
/// Deterministic: a fixed scenario document and base seed reproduce the
/// exact same KPI table for any worker count.
#[derive(Parser, Debug)]
#[command(name = "lpgsim")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scenario and print its aggregate summary as JSON.
    Run {
        /// Path to the scenario JSON document.
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of Monte Carlo replicas.
        #[arg(short, long, default_value = "1000")]
        replicas: u64,

        /// Worker threads. Defaults to the available parallelism.
        #[arg(short, long)]
        workers: Option<usize>,

        /// Directory for the streamed kpis.jsonl / series.jsonl output.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip replicas already present in the output directory.
        #[arg(long)]
        resume: bool,

        /// Number of replicas whose full time series is persisted.
        #[arg(long, default_value_t = DEFAULT_SERIES_SAMPLE)]
        series_sample: u64,
    },

    /// Run the built-in 2x3 capacity x disruption-duration factorial and
    /// print the ANOVA document as JSON.
    Factorial {
        /// Replicas per design cell.
        #[arg(short, long, default_value = "1000")]
        replicas: u64,

        /// Worker threads. Defaults to the available parallelism.
        #[arg(short, long)]
        workers: Option<usize>,

        /// KPI column analyzed as the response variable.
        #[arg(long, default_value = "service_level_pct")]
        response: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    match args.command {
        Command::Run {
            scenario,
            replicas,
            workers,
            out,
            resume,
            series_sample,
        } => run_single(scenario, replicas, workers, out, resume, series_sample),
        Command::Factorial {
            replicas,
            workers,
            response,
        } => run_factorial_experiment(replicas, workers, &response),
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
}

#[derive(Serialize)]
struct RunReport<'a> {
    scenario_id: u64,
    status: lpgsim_types::RunStatus,
    n_requested: u64,
    n_completed: u64,
    n_failed: u64,
    summary: std::collections::BTreeMap<String, lpgsim_stats::SummaryStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bands: Option<lpgsim_stats::SeriesBands>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<&'a str>,
}

fn run_single(
    scenario_path: PathBuf,
    replicas: u64,
    workers: Option<usize>,
    out: Option<PathBuf>,
    resume: bool,
    series_sample: u64,
) -> Result<(), String> {
    let raw = std::fs::read_to_string(&scenario_path)
        .map_err(|e| format!("reading {}: {e}", scenario_path.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).map_err(|e| format!("parsing scenario document: {e}"))?;
    scenario.validate().map_err(|e| e.to_string())?;

    let mut opts = RunOptions::new(replicas, workers.unwrap_or_else(default_workers));
    opts.series_sample = series_sample;
    opts.on_progress = Some(Box::new(|done, total| {
        if done % 1_000 == 0 || done == total {
            info!(done, total, "progress");
        }
    }));

    let (result, rows, series, out_label) = match &out {
        Some(dir) => {
            if resume {
                opts.skip_completed = JsonlSink::completed_indices(dir)
                    .map_err(|e| format!("scanning {} for resume: {e}", dir.display()))?;
                info!(skipped = opts.skip_completed.len(), "resuming");
            }
            let sink = JsonlSink::open(dir).map_err(|e| e.to_string())?;
            let result = run_scenario(&scenario, &opts, &sink).map_err(|e| e.to_string())?;
            // Aggregate over everything on disk, including resumed rows.
            let rows = JsonlSink::load_rows(dir).map_err(|e| e.to_string())?;
            let series = JsonlSink::load_series(dir).map_err(|e| e.to_string())?;
            (result, rows, series, Some(dir.display().to_string()))
        }
        None => {
            let sink = lpgsim_executor::MemorySink::new();
            let result = run_scenario(&scenario, &opts, &sink).map_err(|e| e.to_string())?;
            let rows = result.rows.clone();
            let series = result.sampled_series.clone();
            (result, rows, series, None)
        }
    };

    let summary = summarize_scenario(&rows).map_err(|e| e.to_string())?;
    let bands = if series.is_empty() {
        None
    } else {
        Some(aggregate_series(&series).map_err(|e| e.to_string())?)
    };

    let report = RunReport {
        scenario_id: result.scenario_id,
        status: result.status,
        n_requested: result.n_requested,
        n_completed: result.n_completed,
        n_failed: result.n_failed,
        summary,
        bands,
        output_dir: out_label.as_deref(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn run_factorial_experiment(
    replicas: u64,
    workers: Option<usize>,
    response: &str,
) -> Result<(), String> {
    let field = KpiField::ALL
        .into_iter()
        .find(|f| f.name() == response)
        .ok_or_else(|| format!("unknown response column: {response}"))?;

    let design = FactorialDesign::baseline();
    let result = run_factorial(
        &design,
        &Scenario::baseline(),
        replicas,
        workers.unwrap_or_else(default_workers),
        CancelToken::new(),
    )
    .map_err(|e| e.to_string())?;

    let cells: Vec<CellData> = result
        .cells
        .iter()
        .map(|(key, rows)| {
            CellData::new(
                key.level_a.clone(),
                key.level_b.clone(),
                rows.iter().map(|r| field.extract(&r.kpis)).collect(),
            )
        })
        .collect();

    let anova = aggregate_factorial(&cells).map_err(|e| e.to_string())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&anova).map_err(|e| e.to_string())?
    );
    Ok(())
}
