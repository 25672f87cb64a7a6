//! Two-way ANOVA with interaction over a balanced factorial KPI table.

use crate::describe::{mean, sample_std};
use crate::dist::f_cdf;
use crate::error::StatsError;
use crate::tukey::{tukey_hsd, TukeyRow};
use serde::Serialize;
use std::collections::BTreeMap;

/// Family-wise significance level of the post-hoc tests.
const TUKEY_ALPHA: f64 = 0.05;

/// Response values of one factorial cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    /// Level of factor A.
    pub level_a: String,
    /// Level of factor B.
    pub level_b: String,
    /// Response values, one per replica.
    pub values: Vec<f64>,
}

impl CellData {
    /// Build one cell.
    pub fn new(level_a: impl Into<String>, level_b: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            level_a: level_a.into(),
            level_b: level_b.into(),
            values,
        }
    }
}

/// One row of the ANOVA table. The residual row carries no F or p.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaRow {
    /// Effect name: "A", "B", "AB" or "Residual".
    pub source: String,
    /// Sum of squares.
    #[serde(rename = "SS")]
    pub ss: f64,
    /// Degrees of freedom.
    pub df: f64,
    /// Mean square.
    #[serde(rename = "MS")]
    pub ms: f64,
    /// F statistic against the residual mean square.
    #[serde(rename = "F")]
    pub f: Option<f64>,
    /// Right-tail p-value under the F distribution.
    pub p: Option<f64>,
}

/// Values per effect (main effects, eta squared).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Effects {
    /// Factor A.
    #[serde(rename = "A")]
    pub a: f64,
    /// Factor B.
    #[serde(rename = "B")]
    pub b: f64,
    /// A x B interaction.
    #[serde(rename = "AB")]
    pub ab: f64,
}

/// Mean summary of one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellMean {
    /// Level of factor A.
    #[serde(rename = "level_A")]
    pub level_a: String,
    /// Level of factor B.
    #[serde(rename = "level_B")]
    pub level_b: String,
    /// Cell mean.
    pub mean: f64,
    /// Cell sample standard deviation.
    pub std: f64,
    /// Cell size.
    pub n: usize,
    /// Lower 95 % CI bound for the cell mean.
    pub ci_low: f64,
    /// Upper 95 % CI bound for the cell mean.
    pub ci_high: f64,
}

/// The full two-way ANOVA document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaResult {
    /// Rows for A, B, AB and Residual.
    pub anova_table: Vec<AnovaRow>,
    /// Spread of level means per effect (max minus min; std of cell means
    /// for the interaction).
    pub main_effects: Effects,
    /// Share of total variance per effect.
    pub eta_squared: Effects,
    /// Adjusted R-squared of the full model.
    pub adj_r_squared: f64,
    /// Per-cell means with confidence intervals.
    pub cell_means: Vec<CellMean>,
    /// Tukey HSD comparisons between factor A levels.
    #[serde(rename = "tukey_A")]
    pub tukey_a: Vec<TukeyRow>,
    /// Tukey HSD comparisons between factor B levels.
    #[serde(rename = "tukey_B")]
    pub tukey_b: Vec<TukeyRow>,
}

/// Two-way ANOVA with interaction (Type II sums of squares) over a
/// balanced factorial table, plus eta squared, adjusted R-squared, cell
/// means and Tukey HSD per factor.
///
/// The design must be a full a x b grid with equal cell sizes >= 2; with
/// balanced cells the partial (Type II) and sequential sums of squares
/// coincide, and the decomposition satisfies
/// `SS_A + SS_B + SS_AB + SS_residual = SS_total` exactly.
pub fn aggregate_factorial(cells: &[CellData]) -> Result<AnovaResult, StatsError> {
    if cells.is_empty() {
        return Err(StatsError::Empty("no factorial cells"));
    }

    let levels_a = distinct(cells.iter().map(|c| c.level_a.as_str()));
    let levels_b = distinct(cells.iter().map(|c| c.level_b.as_str()));
    if levels_a.len() < 2 {
        return Err(StatsError::TooFewLevels { factor: "A" });
    }
    if levels_b.len() < 2 {
        return Err(StatsError::TooFewLevels { factor: "B" });
    }

    let a = levels_a.len();
    let b = levels_b.len();
    if cells.len() != a * b {
        return Err(StatsError::Unbalanced(format!(
            "expected {a}x{b} = {} cells, got {}",
            a * b,
            cells.len()
        )));
    }
    let n = cells[0].values.len();
    if n < 2 {
        return Err(StatsError::Unbalanced(
            "cells need at least two replicas".to_string(),
        ));
    }
    if cells.iter().any(|c| c.values.len() != n) {
        return Err(StatsError::Unbalanced(
            "cells have unequal replica counts".to_string(),
        ));
    }

    let mut by_cell: BTreeMap<(usize, usize), &CellData> = BTreeMap::new();
    for cell in cells {
        let i = levels_a.iter().position(|l| *l == cell.level_a).unwrap();
        let j = levels_b.iter().position(|l| *l == cell.level_b).unwrap();
        if by_cell.insert((i, j), cell).is_some() {
            return Err(StatsError::Unbalanced(format!(
                "duplicate cell ({}, {})",
                cell.level_a, cell.level_b
            )));
        }
    }

    let grand: Vec<f64> = cells.iter().flat_map(|c| c.values.iter().copied()).collect();
    let grand_mean = mean(&grand);
    let n_total = grand.len() as f64;

    // Level and cell means.
    let mean_a: Vec<f64> = (0..a)
        .map(|i| {
            let xs: Vec<f64> = (0..b)
                .flat_map(|j| by_cell[&(i, j)].values.iter().copied())
                .collect();
            mean(&xs)
        })
        .collect();
    let mean_b: Vec<f64> = (0..b)
        .map(|j| {
            let xs: Vec<f64> = (0..a)
                .flat_map(|i| by_cell[&(i, j)].values.iter().copied())
                .collect();
            mean(&xs)
        })
        .collect();
    let cell_mean: BTreeMap<(usize, usize), f64> = by_cell
        .iter()
        .map(|(&k, c)| (k, mean(&c.values)))
        .collect();

    // Balanced decomposition.
    let ss_a = (b * n) as f64 * mean_a.iter().map(|m| (m - grand_mean).powi(2)).sum::<f64>();
    let ss_b = (a * n) as f64 * mean_b.iter().map(|m| (m - grand_mean).powi(2)).sum::<f64>();
    let ss_cells = n as f64
        * cell_mean
            .values()
            .map(|m| (m - grand_mean).powi(2))
            .sum::<f64>();
    let ss_ab = ss_cells - ss_a - ss_b;
    let ss_total = grand.iter().map(|x| (x - grand_mean).powi(2)).sum::<f64>();
    let ss_res = ss_total - ss_cells;

    let df_a = (a - 1) as f64;
    let df_b = (b - 1) as f64;
    let df_ab = df_a * df_b;
    let df_res = (a * b * (n - 1)) as f64;
    let ms_res = ss_res / df_res;

    let effect_row = |source: &str, ss: f64, df: f64| -> AnovaRow {
        let ms = ss / df;
        let f = ms / ms_res;
        AnovaRow {
            source: source.to_string(),
            ss,
            df,
            ms,
            f: Some(f),
            p: Some((1.0 - f_cdf(f, df, df_res)).clamp(0.0, 1.0)),
        }
    };
    let anova_table = vec![
        effect_row("A", ss_a, df_a),
        effect_row("B", ss_b, df_b),
        effect_row("AB", ss_ab.max(0.0), df_ab),
        AnovaRow {
            source: "Residual".to_string(),
            ss: ss_res,
            df: df_res,
            ms: ms_res,
            f: None,
            p: None,
        },
    ];

    // Main effects: spread between extreme level means; the interaction is
    // summarized as the dispersion of cell means.
    let spread = |means: &[f64]| -> f64 {
        let lo = means.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = means.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    };
    let cell_mean_values: Vec<f64> = cell_mean.values().copied().collect();
    let main_effects = Effects {
        a: spread(&mean_a),
        b: spread(&mean_b),
        ab: sample_std(&cell_mean_values),
    };

    let eta_squared = Effects {
        a: ss_a / ss_total,
        b: ss_b / ss_total,
        ab: ss_ab.max(0.0) / ss_total,
    };
    let adj_r_squared = 1.0 - (ss_res / df_res) / (ss_total / (n_total - 1.0));

    // Cell means with the large-n 95 % CI.
    let cell_means = by_cell
        .values()
        .map(|c| {
            let m = mean(&c.values);
            let s = sample_std(&c.values);
            let half = 1.96 * s / (c.values.len() as f64).sqrt();
            CellMean {
                level_a: c.level_a.clone(),
                level_b: c.level_b.clone(),
                mean: m,
                std: s,
                n: c.values.len(),
                ci_low: m - half,
                ci_high: m + half,
            }
        })
        .collect();

    // Post-hoc per factor, pooling across the other factor.
    let groups_a: Vec<(String, Vec<f64>)> = levels_a
        .iter()
        .enumerate()
        .map(|(i, level)| {
            let xs: Vec<f64> = (0..b)
                .flat_map(|j| by_cell[&(i, j)].values.iter().copied())
                .collect();
            (level.to_string(), xs)
        })
        .collect();
    let groups_b: Vec<(String, Vec<f64>)> = levels_b
        .iter()
        .enumerate()
        .map(|(j, level)| {
            let xs: Vec<f64> = (0..a)
                .flat_map(|i| by_cell[&(i, j)].values.iter().copied())
                .collect();
            (level.to_string(), xs)
        })
        .collect();

    Ok(AnovaResult {
        anova_table,
        main_effects,
        eta_squared,
        adj_r_squared,
        cell_means,
        tukey_a: tukey_hsd(&groups_a, TUKEY_ALPHA)?,
        tukey_b: tukey_hsd(&groups_b, TUKEY_ALPHA)?,
    })
}

/// Distinct values in first-seen order.
fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
