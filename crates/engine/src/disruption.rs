//! Route disruption generator.
//!
//! Disruption arrivals form a homogeneous Poisson process with rate
//! `disruption_rate_per_year / 365` per day. The whole schedule is
//! pre-sampled from Exp(λ) inter-arrival times before the day loop runs:
//! unlike a per-day Bernoulli approximation this is insensitive to
//! discretization and preserves the exact Poisson distribution of event
//! counts over the horizon.

use lpgsim_types::Scenario;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Triangular};

/// One pre-sampled disruption arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disruption {
    /// Day the disruption activates, 1-based.
    pub arrival_day: u32,
    /// Duration in whole days (ceiled), >= 1.
    pub duration_days: u32,
}

/// The pre-sampled disruption schedule of one replica.
#[derive(Debug, Clone)]
pub struct DisruptionSchedule {
    events: Vec<Disruption>,
    cursor: usize,
}

impl DisruptionSchedule {
    /// Sample the full schedule for the scenario horizon.
    ///
    /// Inter-arrival times are drawn until their cumulative sum exceeds the
    /// horizon; a continuous arrival time `t` activates on day `ceil(t)`.
    /// Durations are Triangular(min, mode, max) ceiled to whole days, with
    /// the degenerate min == max case short-circuited to the fixed value.
    pub fn sample(scenario: &Scenario, rng: &mut ChaCha8Rng) -> Self {
        let mut events = Vec::new();
        if scenario.disruption_rate_per_year > 0.0 {
            let lambda_per_day = scenario.disruption_rate_per_year / 365.0;
            let inter_arrival =
                Exp::new(lambda_per_day).expect("disruption rate validated positive");
            let duration = DurationSampler::new(scenario);

            let horizon = scenario.horizon_days as f64;
            let mut t = 0.0;
            loop {
                t += inter_arrival.sample(rng);
                if t > horizon {
                    break;
                }
                events.push(Disruption {
                    arrival_day: (t.ceil() as u32).max(1),
                    duration_days: duration.sample(rng),
                });
            }
        }
        Self { events, cursor: 0 }
    }

    /// Pop every disruption activating on `day`.
    ///
    /// Must be called with nondecreasing days; arrivals are consumed in
    /// schedule order.
    pub fn take_arrivals(&mut self, day: u32) -> Vec<Disruption> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].arrival_day == day {
            self.cursor += 1;
        }
        self.events[start..self.cursor].to_vec()
    }

    /// All pre-sampled events (for tests and diagnostics).
    pub fn events(&self) -> &[Disruption] {
        &self.events
    }
}

/// Triangular duration sampler with the degenerate case folded in.
struct DurationSampler {
    triangular: Option<Triangular<f64>>,
    fixed_days: u32,
}

impl DurationSampler {
    fn new(scenario: &Scenario) -> Self {
        let (min, mode, max) = (
            scenario.disruption_duration_min_d,
            scenario.disruption_duration_mode_d,
            scenario.disruption_duration_max_d,
        );
        if min == max {
            return Self {
                triangular: None,
                fixed_days: (max.ceil() as u32).max(1),
            };
        }
        Self {
            triangular: Some(
                Triangular::new(min, max, mode).expect("triangular ordering validated"),
            ),
            fixed_days: 0,
        }
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> u32 {
        match &self.triangular {
            Some(dist) => (dist.sample(rng).ceil() as u32).max(1),
            None => self.fixed_days,
        }
    }
}
