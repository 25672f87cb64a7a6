//! Aggregated time-series bands over sampled replicas.

use crate::describe::{mean, percentile};
use crate::error::StatsError;
use lpgsim_types::SeriesRow;
use serde::Serialize;

/// Per-day mean and 5/95 percentile band of one series variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBand {
    /// Day index, 1-based.
    pub day: u32,
    /// Mean across replicas.
    pub mean: f64,
    /// 5th percentile across replicas.
    pub p5: f64,
    /// 95th percentile across replicas.
    pub p95: f64,
}

/// Per-day probability of a boolean series variable across replicas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProbability {
    /// Day index, 1-based.
    pub day: u32,
    /// Fraction of replicas where the flag was set, in [0, 1].
    pub probability: f64,
}

/// The aggregated bands over the sampled full time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesBands {
    /// Replicas aggregated.
    pub n_replicas: usize,
    /// Inventory level band.
    pub inventory: Vec<DailyBand>,
    /// Autonomy band.
    pub autonomy_days: Vec<DailyBand>,
    /// Per-day stockout probability.
    pub stockout_probability: Vec<DailyProbability>,
    /// Per-day route-blocked probability.
    pub route_blocked_probability: Vec<DailyProbability>,
}

/// Aggregate the sampled series into per-day bands.
///
/// All series must share the same horizon; replicas are weighted equally.
pub fn aggregate_series(series: &[SeriesRow]) -> Result<SeriesBands, StatsError> {
    let Some(first) = series.first() else {
        return Err(StatsError::Empty("no sampled series to aggregate"));
    };
    let horizon = first.records.len();
    for s in series {
        if s.records.len() != horizon {
            return Err(StatsError::LengthMismatch(format!(
                "replica {} has {} days, expected {horizon}",
                s.replica_index,
                s.records.len()
            )));
        }
    }

    let mut inventory = Vec::with_capacity(horizon);
    let mut autonomy = Vec::with_capacity(horizon);
    let mut stockout = Vec::with_capacity(horizon);
    let mut blocked = Vec::with_capacity(horizon);
    let n = series.len() as f64;

    for day_index in 0..horizon {
        let day = first.records[day_index].day;
        let levels: Vec<f64> = series
            .iter()
            .map(|s| s.records[day_index].inventory)
            .collect();
        let autonomies: Vec<f64> = series
            .iter()
            .map(|s| s.records[day_index].autonomy_days)
            .collect();
        inventory.push(DailyBand {
            day,
            mean: mean(&levels),
            p5: percentile(&levels, 5.0),
            p95: percentile(&levels, 95.0),
        });
        autonomy.push(DailyBand {
            day,
            mean: mean(&autonomies),
            p5: percentile(&autonomies, 5.0),
            p95: percentile(&autonomies, 95.0),
        });
        let stockouts = series
            .iter()
            .filter(|s| s.records[day_index].stockout)
            .count();
        stockout.push(DailyProbability {
            day,
            probability: stockouts as f64 / n,
        });
        let blocked_count = series
            .iter()
            .filter(|s| s.records[day_index].route_blocked)
            .count();
        blocked.push(DailyProbability {
            day,
            probability: blocked_count as f64 / n,
        });
    }

    Ok(SeriesBands {
        n_replicas: series.len(),
        inventory,
        autonomy_days: autonomy,
        stockout_probability: stockout,
        route_blocked_probability: blocked,
    })
}
