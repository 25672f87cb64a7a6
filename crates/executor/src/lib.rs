//! Monte Carlo executor.
//!
//! Runs large replica ensembles of the deterministic engine across a worker
//! pool. The contract, in brief:
//!
//! - replica `i` always runs with the seed derived from
//!   `(base_seed, scenario_id, i)`, so results are independent of worker
//!   count and completion order;
//! - workers claim indices from a shared atomic counter; the engine itself
//!   is share-nothing, so the counter and the result sink are the only
//!   synchronized state;
//! - every finished KPI vector is appended to a durable sink as it
//!   completes; a deterministic prefix of replicas also persists its full
//!   time series;
//! - cancellation is cooperative and observed at replica boundaries; a
//!   canceled experiment is a valid partial result;
//! - replica failures are counted and reported without aborting the
//!   experiment.

mod cancel;
mod error;
mod experiment;
mod runner;
mod sink;

pub use cancel::CancelToken;
pub use error::{ExecutorError, PersistenceError};
pub use experiment::{
    run_factorial, CellKey, DisruptionProfile, FactorialDesign, FactorialResult,
    CAPACITY_PROPOSED, CAPACITY_STATUS_QUO,
};
pub use runner::{run_scenario, ProgressObserver, RunOptions, DEFAULT_SERIES_SAMPLE};
pub use sink::{JsonlSink, MemorySink, ResultSink};
