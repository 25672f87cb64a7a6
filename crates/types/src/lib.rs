//! Core types for the LPG supply-chain resilience simulator.
//!
//! This crate provides the foundational types shared by the engine, the
//! Monte Carlo executor and the statistics layer:
//!
//! - **Scenario**: the immutable configuration document, with validation
//! - **Seeds**: deterministic replica/stream seed derivation
//! - **Records**: per-day time series, KPI vectors, replica and scenario results
//! - **Errors**: configuration and runtime error kinds
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer.

mod error;
mod record;
mod scenario;
mod seed;

pub use error::{ConfigurationError, EngineError};
pub use record::{
    DailyRecord, KpiField, KpiRow, KpiVector, ReplicaOutput, RunStatus, ScenarioResult, SeriesRow,
};
pub use scenario::Scenario;
pub use seed::{derive_replica_seed, domain_seed, mix64, StreamDomain};

/// Default base seed used when a scenario does not pin one.
pub const DEFAULT_BASE_SEED: u64 = 42;
