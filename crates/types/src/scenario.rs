//! The immutable scenario configuration document.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

fn default_max_concurrent_orders() -> u32 {
    2
}

/// Fully specified simulation scenario.
///
/// A scenario is immutable once loaded and is shared read-only across all
/// replicas of an experiment. Unknown keys in the serialized document are
/// rejected; optional fields (`max_concurrent_orders`, `seed`) have
/// documented defaults.
///
/// All tonnage fields are metric tonnes (tm), all durations are days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Storage capacity of the hub.
    pub capacity_tm: f64,
    /// Inventory level at or below which a replenishment order fires.
    pub reorder_point_tm: f64,
    /// Fixed order quantity of the (Q, R) policy.
    pub order_quantity_tm: f64,
    /// Initial fill of the hub, percent of capacity in [0, 100].
    pub initial_inventory_pct: f64,
    /// Mean daily demand.
    pub demand_base_daily_tm: f64,
    /// Standard deviation of the multiplicative demand noise, in [0, 1].
    pub demand_noise_sigma: f64,
    /// Whether the sinusoidal seasonal factor is applied to demand.
    pub seasonality_enabled: bool,
    /// Seasonal amplitude in [0, 1]; ignored when seasonality is disabled.
    pub seasonality_amplitude: f64,
    /// Day of the annual demand peak, in [1, 365].
    pub seasonality_peak_day: u32,
    /// Expected number of route disruptions per year (homogeneous Poisson).
    pub disruption_rate_per_year: f64,
    /// Triangular disruption duration: minimum, days.
    pub disruption_duration_min_d: f64,
    /// Triangular disruption duration: mode, days.
    pub disruption_duration_mode_d: f64,
    /// Triangular disruption duration: maximum, days.
    pub disruption_duration_max_d: f64,
    /// Order lead time absent disruption, whole days.
    pub nominal_lead_time_d: u32,
    /// Simulation horizon, whole days.
    pub horizon_days: u32,
    /// Cap on concurrently open (in-transit) orders.
    #[serde(default = "default_max_concurrent_orders")]
    pub max_concurrent_orders: u32,
    /// Base seed of the experiment. `None` means the executor default.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Scenario {
    /// A small, fully valid scenario used as a starting point by tests and
    /// the factorial builder. Values follow the historical calibration of
    /// the modeled hub (431 tm tank farm, 52.5 tm/day demand).
    pub fn baseline() -> Self {
        Self {
            capacity_tm: 431.0,
            reorder_point_tm: 394.0,
            order_quantity_tm: 230.0,
            initial_inventory_pct: 60.0,
            demand_base_daily_tm: 52.5,
            demand_noise_sigma: 0.15,
            seasonality_enabled: true,
            seasonality_amplitude: 0.30,
            seasonality_peak_day: 200,
            disruption_rate_per_year: 4.0,
            disruption_duration_min_d: 3.0,
            disruption_duration_mode_d: 7.0,
            disruption_duration_max_d: 21.0,
            nominal_lead_time_d: 6,
            horizon_days: 365,
            max_concurrent_orders: 2,
            seed: Some(42),
        }
    }

    /// Validate every scenario invariant.
    ///
    /// Called once at load time; the engine assumes a validated scenario.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        fn finite_positive(
            field: &'static str,
            value: f64,
        ) -> Result<(), ConfigurationError> {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::invalid(
                    field,
                    format!("must be a positive finite number, got {value}"),
                ));
            }
            Ok(())
        }

        finite_positive("capacity_tm", self.capacity_tm)?;
        finite_positive("reorder_point_tm", self.reorder_point_tm)?;
        finite_positive("order_quantity_tm", self.order_quantity_tm)?;
        finite_positive("demand_base_daily_tm", self.demand_base_daily_tm)?;

        if self.reorder_point_tm > self.capacity_tm {
            return Err(ConfigurationError::invalid(
                "reorder_point_tm",
                format!(
                    "must not exceed capacity ({} > {})",
                    self.reorder_point_tm, self.capacity_tm
                ),
            ));
        }
        if self.order_quantity_tm > self.capacity_tm {
            return Err(ConfigurationError::invalid(
                "order_quantity_tm",
                format!(
                    "must not exceed capacity ({} > {})",
                    self.order_quantity_tm, self.capacity_tm
                ),
            ));
        }
        if !(0.0..=100.0).contains(&self.initial_inventory_pct) {
            return Err(ConfigurationError::invalid(
                "initial_inventory_pct",
                format!("must be in [0, 100], got {}", self.initial_inventory_pct),
            ));
        }
        if !(0.0..=1.0).contains(&self.demand_noise_sigma) {
            return Err(ConfigurationError::invalid(
                "demand_noise_sigma",
                format!("must be in [0, 1], got {}", self.demand_noise_sigma),
            ));
        }
        if !(0.0..=1.0).contains(&self.seasonality_amplitude) {
            return Err(ConfigurationError::invalid(
                "seasonality_amplitude",
                format!("must be in [0, 1], got {}", self.seasonality_amplitude),
            ));
        }
        if !(1..=365).contains(&self.seasonality_peak_day) {
            return Err(ConfigurationError::invalid(
                "seasonality_peak_day",
                format!("must be in [1, 365], got {}", self.seasonality_peak_day),
            ));
        }
        if !self.disruption_rate_per_year.is_finite() || self.disruption_rate_per_year < 0.0 {
            return Err(ConfigurationError::invalid(
                "disruption_rate_per_year",
                format!(
                    "must be a non-negative finite number, got {}",
                    self.disruption_rate_per_year
                ),
            ));
        }
        finite_positive("disruption_duration_min_d", self.disruption_duration_min_d)?;
        finite_positive("disruption_duration_mode_d", self.disruption_duration_mode_d)?;
        finite_positive("disruption_duration_max_d", self.disruption_duration_max_d)?;
        if !(self.disruption_duration_min_d <= self.disruption_duration_mode_d
            && self.disruption_duration_mode_d <= self.disruption_duration_max_d)
        {
            return Err(ConfigurationError::invalid(
                "disruption_duration_mode_d",
                format!(
                    "triangular ordering min <= mode <= max violated: {} / {} / {}",
                    self.disruption_duration_min_d,
                    self.disruption_duration_mode_d,
                    self.disruption_duration_max_d
                ),
            ));
        }
        if self.nominal_lead_time_d == 0 {
            return Err(ConfigurationError::invalid(
                "nominal_lead_time_d",
                "must be at least 1 day",
            ));
        }
        if self.horizon_days == 0 {
            return Err(ConfigurationError::invalid(
                "horizon_days",
                "must be at least 1 day",
            ));
        }
        if self.max_concurrent_orders == 0 {
            return Err(ConfigurationError::invalid(
                "max_concurrent_orders",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Initial inventory in tonnes.
    pub fn initial_inventory_tm(&self) -> f64 {
        self.capacity_tm * self.initial_inventory_pct / 100.0
    }

    /// Days of demand the full hub covers at the base rate.
    pub fn theoretical_autonomy_days(&self) -> f64 {
        self.capacity_tm / self.demand_base_daily_tm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_valid() {
        Scenario::baseline().validate().unwrap();
    }

    #[test]
    fn test_rejects_reorder_point_above_capacity() {
        let mut s = Scenario::baseline();
        s.reorder_point_tm = s.capacity_tm + 1.0;
        let err = s.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidField { field: "reorder_point_tm", .. }
        ));
    }

    #[test]
    fn test_rejects_triangular_disorder() {
        let mut s = Scenario::baseline();
        s.disruption_duration_mode_d = 30.0; // above max
        assert!(s.validate().is_err());

        let mut s = Scenario::baseline();
        s.disruption_duration_min_d = 10.0; // above mode
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_percentages() {
        let mut s = Scenario::baseline();
        s.initial_inventory_pct = 101.0;
        assert!(s.validate().is_err());

        let mut s = Scenario::baseline();
        s.demand_noise_sigma = 1.5;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_horizon_and_lead_time() {
        let mut s = Scenario::baseline();
        s.horizon_days = 0;
        assert!(s.validate().is_err());

        let mut s = Scenario::baseline();
        s.nominal_lead_time_d = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_is_identity() {
        let s = Scenario::baseline();
        let json = serde_json::to_string(&s).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut doc = serde_json::to_value(Scenario::baseline()).unwrap();
        doc.as_object_mut()
            .unwrap()
            .insert("truck_count".into(), 10.into());
        let parsed: Result<Scenario, _> = serde_json::from_value(doc);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_optional_fields_take_defaults() {
        let mut doc = serde_json::to_value(Scenario::baseline()).unwrap();
        let obj = doc.as_object_mut().unwrap();
        obj.remove("max_concurrent_orders");
        obj.remove("seed");
        let parsed: Scenario = serde_json::from_value(doc).unwrap();
        assert_eq!(parsed.max_concurrent_orders, 2);
        assert_eq!(parsed.seed, None);
    }
}
