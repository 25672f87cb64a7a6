//! Tukey HSD pairwise comparisons.

use crate::describe::mean;
use crate::dist::ptukey;
use crate::error::StatsError;
use serde::Serialize;

/// One pairwise comparison of the Tukey HSD test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TukeyRow {
    /// First group of the pair.
    pub level_i: String,
    /// Second group of the pair.
    pub level_j: String,
    /// Mean of group j minus mean of group i.
    pub mean_diff: f64,
    /// Family-wise adjusted p-value from the studentized range.
    pub p_adj: f64,
    /// Whether the difference is significant at the given alpha.
    pub reject: bool,
}

/// All pairwise mean comparisons between groups, controlling the
/// family-wise error rate at `alpha` via the studentized range.
///
/// The pooled error variance is the one-way within-group mean square over
/// the supplied groups; each pair's studentized statistic is
/// `|diff| / sqrt(MSE/2 * (1/n_i + 1/n_j))`.
pub fn tukey_hsd(
    groups: &[(String, Vec<f64>)],
    alpha: f64,
) -> Result<Vec<TukeyRow>, StatsError> {
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::TooFewLevels { factor: "tukey" });
    }
    let n_total: usize = groups.iter().map(|(_, xs)| xs.len()).sum();
    let df = n_total - k;
    if df == 0 {
        return Err(StatsError::Empty("tukey needs replication within groups"));
    }
    if groups.iter().any(|(_, xs)| xs.is_empty()) {
        return Err(StatsError::Empty("a tukey group has no samples"));
    }

    let means: Vec<f64> = groups.iter().map(|(_, xs)| mean(xs)).collect();
    let ss_within: f64 = groups
        .iter()
        .zip(&means)
        .map(|((_, xs), m)| xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>())
        .sum();
    let mse = ss_within / df as f64;

    let mut rows = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let (ni, nj) = (groups[i].1.len() as f64, groups[j].1.len() as f64);
            let diff = means[j] - means[i];
            let se = (mse / 2.0 * (1.0 / ni + 1.0 / nj)).sqrt();
            let p_adj = if se == 0.0 {
                if diff == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                (1.0 - ptukey(diff.abs() / se, k, df as f64)).clamp(0.0, 1.0)
            };
            rows.push(TukeyRow {
                level_i: groups[i].0.clone(),
                level_j: groups[j].0.clone(),
                mean_diff: diff,
                p_adj,
                reject: p_adj < alpha,
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, xs: &[f64]) -> (String, Vec<f64>) {
        (name.to_string(), xs.to_vec())
    }

    #[test]
    fn test_identical_groups_are_not_rejected() {
        let groups = vec![
            group("a", &[10.0, 11.0, 9.0, 10.0]),
            group("b", &[10.0, 9.0, 11.0, 10.0]),
            group("c", &[11.0, 10.0, 9.0, 10.0]),
        ];
        let rows = tukey_hsd(&groups, 0.05).unwrap();
        assert_eq!(rows.len(), 3);
        for row in rows {
            assert!(!row.reject, "{row:?}");
            assert!(row.p_adj > 0.5);
        }
    }

    #[test]
    fn test_separated_groups_are_rejected() {
        let groups = vec![
            group("low", &[1.0, 1.1, 0.9, 1.0, 1.05]),
            group("mid", &[5.0, 5.1, 4.9, 5.0, 5.05]),
            group("high", &[9.0, 9.1, 8.9, 9.0, 9.05]),
        ];
        let rows = tukey_hsd(&groups, 0.05).unwrap();
        for row in &rows {
            assert!(row.reject, "{row:?}");
            assert!(row.p_adj < 0.001);
        }
        // Diff direction: level_j mean minus level_i mean.
        assert!(rows[0].mean_diff > 0.0);
    }

    #[test]
    fn test_p_values_are_probabilities() {
        let groups = vec![
            group("a", &[1.0, 2.0, 3.0]),
            group("b", &[2.0, 3.0, 4.0]),
            group("c", &[1.5, 2.5, 3.5]),
        ];
        for row in tukey_hsd(&groups, 0.05).unwrap() {
            assert!((0.0..=1.0).contains(&row.p_adj));
        }
    }

    #[test]
    fn test_single_group_is_rejected() {
        let groups = vec![group("only", &[1.0, 2.0])];
        assert!(tukey_hsd(&groups, 0.05).is_err());
    }
}
