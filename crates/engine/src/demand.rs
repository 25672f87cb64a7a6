//! Daily demand process.

use lpgsim_types::Scenario;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Demand sampler: multiplicative Normal noise around a base rate, with an
/// optional sinusoidal seasonal factor peaking at the configured day.
pub struct DemandModel {
    base_tm: f64,
    noise: Normal<f64>,
    seasonality: Option<Seasonality>,
}

struct Seasonality {
    amplitude: f64,
    peak_day: f64,
}

impl DemandModel {
    /// Build the sampler from a validated scenario.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let noise = Normal::new(1.0, scenario.demand_noise_sigma)
            .expect("demand_noise_sigma validated non-negative");
        let seasonality = scenario.seasonality_enabled.then(|| Seasonality {
            amplitude: scenario.seasonality_amplitude,
            peak_day: scenario.seasonality_peak_day as f64,
        });
        Self {
            base_tm: scenario.demand_base_daily_tm,
            noise,
            seasonality,
        }
    }

    /// Sample the demand for `day`, consuming one draw from `rng`.
    ///
    /// Negative noise samples clamp to zero, so demand is never negative.
    pub fn sample(&self, day: u32, rng: &mut ChaCha8Rng) -> f64 {
        let seasonal = match &self.seasonality {
            Some(s) => {
                let phase = std::f64::consts::TAU * (day as f64 - s.peak_day) / 365.0;
                1.0 + s.amplitude * phase.sin()
            }
            None => 1.0,
        };
        let noise = self.noise.sample(rng).max(0.0);
        self.base_tm * seasonal * noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;

    fn scenario(sigma: f64, seasonal: bool) -> Scenario {
        let mut s = Scenario::baseline();
        s.demand_noise_sigma = sigma;
        s.seasonality_enabled = seasonal;
        s
    }

    #[test]
    fn test_zero_sigma_without_seasonality_is_constant() {
        let model = DemandModel::from_scenario(&scenario(0.0, false));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for day in 1..=10 {
            assert_eq!(model.sample(day, &mut rng), 52.5);
        }
    }

    #[test]
    fn test_demand_is_never_negative() {
        // Extreme noise: many raw samples go negative and must clamp.
        let model = DemandModel::from_scenario(&scenario(1.0, false));
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for day in 1..=5_000 {
            assert!(model.sample(day, &mut rng) >= 0.0);
        }
    }

    #[test]
    fn test_seasonal_factor_peaks_at_quarter_past_peak_day() {
        // sin(2π(t − peak)/365) is maximal a quarter period after peak_day.
        let mut s = scenario(0.0, true);
        s.seasonality_peak_day = 100;
        s.seasonality_amplitude = 0.3;
        let model = DemandModel::from_scenario(&s);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let at_peak_phase = model.sample(100 + 91, &mut rng);
        let at_trough_phase = model.sample(100 + 274, &mut rng);
        assert!(at_peak_phase > 52.5 * 1.29 && at_peak_phase < 52.5 * 1.31);
        assert!(at_trough_phase > 52.5 * 0.69 && at_trough_phase < 52.5 * 0.71);
    }

    #[test]
    fn test_sample_mean_tracks_base_rate() {
        let model = DemandModel::from_scenario(&scenario(0.15, false));
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 20_000;
        let mean: f64 = (0..n).map(|d| model.sample(d, &mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 52.5).abs() < 0.5, "sample mean {mean}");
    }
}
