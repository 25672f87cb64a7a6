//! Per-day recording and end-of-run KPI reduction.

use crate::hub::Hub;
use crate::route::Route;
use lpgsim_types::{DailyRecord, EngineError, KpiVector, Scenario};

/// Tolerance factor for the mass balance check, relative to capacity.
const MASS_BALANCE_TOL: f64 = 1e-6;

/// Collects one [`DailyRecord`] per simulated day and reduces the series to
/// the fixed KPI vector at end of run.
pub struct Monitor {
    records: Vec<DailyRecord>,
    total_demand_tm: f64,
    satisfied_demand_tm: f64,
}

impl Monitor {
    /// Recorder pre-sized for the horizon.
    pub fn with_capacity(horizon_days: u32) -> Self {
        Self {
            records: Vec::with_capacity(horizon_days as usize),
            total_demand_tm: 0.0,
            satisfied_demand_tm: 0.0,
        }
    }

    /// Append the record for one day.
    pub fn record(&mut self, record: DailyRecord) {
        self.total_demand_tm += record.demand;
        self.satisfied_demand_tm += record.demand_satisfied;
        self.records.push(record);
    }

    /// Recorded days so far.
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    /// Reduce the series to the KPI vector, verifying mass balance.
    pub fn reduce(
        &self,
        scenario: &Scenario,
        hub: &Hub,
        route: &Route,
        initial_inventory_tm: f64,
    ) -> Result<KpiVector, EngineError> {
        let n = self.records.len();
        debug_assert_eq!(n as u32, scenario.horizon_days);

        let final_inventory_tm = hub.level();
        let residual = initial_inventory_tm + hub.total_received()
            - hub.total_dispatched()
            - final_inventory_tm;
        if residual.abs() > MASS_BALANCE_TOL * scenario.capacity_tm {
            return Err(EngineError::InvariantViolation {
                day: 0,
                detail: format!(
                    "mass balance residual {residual:.9} tm \
                     (initial {initial_inventory_tm}, received {}, dispatched {}, final {final_inventory_tm})",
                    hub.total_received(),
                    hub.total_dispatched(),
                ),
            });
        }

        let inventories = Column::over(&self.records, |r| r.inventory);
        let autonomies = Column::over(&self.records, |r| r.autonomy_days);
        let demands = Column::over(&self.records, |r| r.demand);
        let stockout_days = self.records.iter().filter(|r| r.stockout).count() as u32;

        let service_level_pct = if self.total_demand_tm > 0.0 {
            100.0 * self.satisfied_demand_tm / self.total_demand_tm
        } else {
            0.0
        };

        Ok(KpiVector {
            service_level_pct,
            stockout_days,
            stockout_probability_pct: 100.0 * stockout_days as f64 / n as f64,
            avg_inventory_tm: inventories.mean,
            min_inventory_tm: inventories.min,
            max_inventory_tm: inventories.max,
            std_inventory_tm: inventories.population_std,
            avg_autonomy_days: autonomies.mean,
            min_autonomy_days: autonomies.min,
            total_demand_tm: self.total_demand_tm,
            satisfied_demand_tm: self.satisfied_demand_tm,
            unsatisfied_demand_tm: self.total_demand_tm - self.satisfied_demand_tm,
            avg_daily_demand_tm: demands.mean,
            max_daily_demand_tm: demands.max,
            min_daily_demand_tm: demands.min,
            total_received_tm: hub.total_received(),
            total_dispatched_tm: hub.total_dispatched(),
            disruption_count: route.disruption_count(),
            blocked_days_total: route.total_blocked_days(),
            blocked_time_pct: 100.0 * route.total_blocked_days() as f64 / n as f64,
            simulated_days: n as u32,
            initial_inventory_tm,
            final_inventory_tm,
        })
    }

    /// Hand the series over to the caller.
    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }
}

/// Mean/min/max/population-std over one record column.
struct Column {
    mean: f64,
    min: f64,
    max: f64,
    population_std: f64,
}

impl Column {
    fn over(records: &[DailyRecord], pick: impl Fn(&DailyRecord) -> f64) -> Self {
        let n = records.len() as f64;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for r in records {
            let x = pick(r);
            sum += x;
            min = min.min(x);
            max = max.max(x);
        }
        let mean = sum / n;
        let var = records
            .iter()
            .map(|r| {
                let d = pick(r) - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        Self {
            mean,
            min,
            max,
            population_std: var.sqrt(),
        }
    }
}
