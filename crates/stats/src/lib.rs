//! Aggregation and statistics over Monte Carlo KPI tables.
//!
//! Everything in this crate is a pure function of its inputs: summaries,
//! time-series bands, the two-way ANOVA and the Tukey post-hoc tests all
//! operate on finished KPI tables and never call back into the engine.
//! Aggregating the same table twice yields identical results.
//!
//! The special functions needed for p-values (incomplete beta/gamma, the F
//! and studentized-range distributions) are implemented directly in
//! [`dist`]; no numerical library is pulled in for them.

mod anova;
mod bands;
mod describe;
pub mod dist;
mod error;
mod tukey;

pub use anova::{aggregate_factorial, AnovaResult, AnovaRow, CellData, CellMean, Effects};
pub use bands::{aggregate_series, DailyBand, DailyProbability, SeriesBands};
pub use describe::{mean, percentile, sample_std, summarize_scenario, SummaryStats};
pub use error::StatsError;
pub use tukey::{tukey_hsd, TukeyRow};
