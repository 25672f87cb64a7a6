//! Descriptive statistics over KPI tables.

use crate::error::StatsError;
use lpgsim_types::{KpiField, KpiRow};
use serde::Serialize;
use std::collections::BTreeMap;

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (ddof = 1). Zero for fewer than two samples.
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// Percentile with linear interpolation between closest ranks,
/// `p` in [0, 100].
pub fn percentile(xs: &[f64], p: f64) -> f64 {
    debug_assert!((0.0..=100.0).contains(&p));
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("KPI values are never NaN"));
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let w = rank - lo as f64;
        sorted[lo] * (1.0 - w) + sorted[hi] * w
    }
}

/// Summary of one sample: moments, extremes, the standard percentile set
/// and the large-n 95 % confidence interval for the mean (1.96 sigma/sqrt n).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Sample size.
    pub n: usize,
    /// Mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
    /// 5th percentile.
    pub p5: f64,
    /// 25th percentile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 95th percentile.
    pub p95: f64,
    /// Lower bound of the 95 % CI for the mean.
    pub ci_low: f64,
    /// Upper bound of the 95 % CI for the mean.
    pub ci_high: f64,
}

impl SummaryStats {
    /// Summarize one sample.
    pub fn from_samples(xs: &[f64]) -> Result<Self, StatsError> {
        if xs.is_empty() {
            return Err(StatsError::Empty("summary over no samples"));
        }
        let m = mean(xs);
        let s = sample_std(xs);
        let half_width = 1.96 * s / (xs.len() as f64).sqrt();
        let min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            n: xs.len(),
            mean: m,
            std: s,
            min,
            max,
            p5: percentile(xs, 5.0),
            p25: percentile(xs, 25.0),
            p50: percentile(xs, 50.0),
            p75: percentile(xs, 75.0),
            p95: percentile(xs, 95.0),
            ci_low: m - half_width,
            ci_high: m + half_width,
        })
    }
}

/// Per-scenario summary: one [`SummaryStats`] per KPI column, keyed by the
/// persisted column name.
pub fn summarize_scenario(rows: &[KpiRow]) -> Result<BTreeMap<String, SummaryStats>, StatsError> {
    if rows.is_empty() {
        return Err(StatsError::Empty("summary over no KPI rows"));
    }
    let mut out = BTreeMap::new();
    for field in KpiField::ALL {
        let column: Vec<f64> = rows.iter().map(|r| field.extract(&r.kpis)).collect();
        out.insert(field.name().to_string(), SummaryStats::from_samples(&column)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&xs), 5.0);
        // Sample variance of this classic set is 32/7.
        assert!((sample_std(&xs) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&xs, 0.0), 1.0);
        assert_eq!(percentile(&xs, 100.0), 4.0);
        assert_eq!(percentile(&xs, 50.0), 2.5);
        assert_eq!(percentile(&xs, 25.0), 1.75);
    }

    #[test]
    fn test_percentile_is_order_independent() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        let shuffled = [4.0, 1.0, 5.0, 2.0, 3.0];
        for p in [5.0, 25.0, 50.0, 75.0, 95.0] {
            assert_eq!(percentile(&sorted, p), percentile(&shuffled, p));
        }
    }

    #[test]
    fn test_summary_ci_formula() {
        let xs: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let s = SummaryStats::from_samples(&xs).unwrap();
        let half = 1.96 * s.std / 10.0;
        assert!((s.ci_high - s.mean - half).abs() < 1e-12);
        assert!((s.mean - s.ci_low - half).abs() < 1e-12);
        assert_eq!(s.n, 100);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 100.0);
    }

    #[test]
    fn test_empty_sample_is_rejected() {
        assert!(SummaryStats::from_samples(&[]).is_err());
    }
}
