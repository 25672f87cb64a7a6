//! Per-day records, KPI vectors and result containers.

use serde::{Deserialize, Serialize};

/// One day of the simulated time series. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Day index, 1-based.
    pub day: u32,
    /// End-of-day inventory level (tm).
    pub inventory: f64,
    /// Demand sampled for the day (tm).
    pub demand: f64,
    /// Demand actually served from inventory (tm).
    pub demand_satisfied: f64,
    /// Supply accepted into the hub during the arrivals phase (tm).
    pub supply_received: f64,
    /// Whether any demand went unserved.
    pub stockout: bool,
    /// Whether the route was blocked on this day.
    pub route_blocked: bool,
    /// Open in-transit orders at end of day.
    pub pending_orders: u32,
    /// Days of base-rate demand covered by the stock available for the day
    /// (post-arrival, pre-demand level over `demand_base_daily_tm`).
    pub autonomy_days: f64,
}

/// The fixed KPI vector reduced from one replica's time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiVector {
    /// 100 · Σ demand_satisfied / Σ demand.
    pub service_level_pct: f64,
    /// Count of days with a stockout.
    pub stockout_days: u32,
    /// 100 · stockout_days / horizon_days.
    pub stockout_probability_pct: f64,
    /// Mean end-of-day inventory (tm).
    pub avg_inventory_tm: f64,
    /// Minimum end-of-day inventory (tm).
    pub min_inventory_tm: f64,
    /// Maximum end-of-day inventory (tm).
    pub max_inventory_tm: f64,
    /// Population standard deviation of end-of-day inventory (tm).
    pub std_inventory_tm: f64,
    /// Mean autonomy (days of base-rate demand covered).
    pub avg_autonomy_days: f64,
    /// Minimum autonomy over the horizon.
    pub min_autonomy_days: f64,
    /// Σ demand (tm).
    pub total_demand_tm: f64,
    /// Σ demand_satisfied (tm).
    pub satisfied_demand_tm: f64,
    /// Σ (demand − demand_satisfied) (tm).
    pub unsatisfied_demand_tm: f64,
    /// Mean daily demand (tm).
    pub avg_daily_demand_tm: f64,
    /// Maximum daily demand (tm).
    pub max_daily_demand_tm: f64,
    /// Minimum daily demand (tm).
    pub min_daily_demand_tm: f64,
    /// Σ supply accepted into the hub (tm).
    pub total_received_tm: f64,
    /// Σ demand served from the hub (tm).
    pub total_dispatched_tm: f64,
    /// Number of distinct disruption arrivals.
    pub disruption_count: u32,
    /// Total days the route spent blocked.
    pub blocked_days_total: u32,
    /// 100 · blocked_days_total / horizon_days.
    pub blocked_time_pct: f64,
    /// Days simulated (= horizon_days).
    pub simulated_days: u32,
    /// Inventory at day zero (tm).
    pub initial_inventory_tm: f64,
    /// Inventory at the end of the horizon (tm).
    pub final_inventory_tm: f64,
}

/// Name handles for the real-valued KPI columns, used by the aggregation
/// layer to iterate the KPI table generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum KpiField {
    ServiceLevelPct,
    StockoutDays,
    StockoutProbabilityPct,
    AvgInventoryTm,
    MinInventoryTm,
    MaxInventoryTm,
    StdInventoryTm,
    AvgAutonomyDays,
    MinAutonomyDays,
    TotalDemandTm,
    SatisfiedDemandTm,
    UnsatisfiedDemandTm,
    AvgDailyDemandTm,
    MaxDailyDemandTm,
    MinDailyDemandTm,
    TotalReceivedTm,
    TotalDispatchedTm,
    DisruptionCount,
    BlockedDaysTotal,
    BlockedTimePct,
    SimulatedDays,
    InitialInventoryTm,
    FinalInventoryTm,
}

impl KpiField {
    /// All KPI columns in schema order.
    pub const ALL: [KpiField; 23] = [
        KpiField::ServiceLevelPct,
        KpiField::StockoutDays,
        KpiField::StockoutProbabilityPct,
        KpiField::AvgInventoryTm,
        KpiField::MinInventoryTm,
        KpiField::MaxInventoryTm,
        KpiField::StdInventoryTm,
        KpiField::AvgAutonomyDays,
        KpiField::MinAutonomyDays,
        KpiField::TotalDemandTm,
        KpiField::SatisfiedDemandTm,
        KpiField::UnsatisfiedDemandTm,
        KpiField::AvgDailyDemandTm,
        KpiField::MaxDailyDemandTm,
        KpiField::MinDailyDemandTm,
        KpiField::TotalReceivedTm,
        KpiField::TotalDispatchedTm,
        KpiField::DisruptionCount,
        KpiField::BlockedDaysTotal,
        KpiField::BlockedTimePct,
        KpiField::SimulatedDays,
        KpiField::InitialInventoryTm,
        KpiField::FinalInventoryTm,
    ];

    /// Column name as persisted in KPI rows.
    pub fn name(self) -> &'static str {
        match self {
            KpiField::ServiceLevelPct => "service_level_pct",
            KpiField::StockoutDays => "stockout_days",
            KpiField::StockoutProbabilityPct => "stockout_probability_pct",
            KpiField::AvgInventoryTm => "avg_inventory_tm",
            KpiField::MinInventoryTm => "min_inventory_tm",
            KpiField::MaxInventoryTm => "max_inventory_tm",
            KpiField::StdInventoryTm => "std_inventory_tm",
            KpiField::AvgAutonomyDays => "avg_autonomy_days",
            KpiField::MinAutonomyDays => "min_autonomy_days",
            KpiField::TotalDemandTm => "total_demand_tm",
            KpiField::SatisfiedDemandTm => "satisfied_demand_tm",
            KpiField::UnsatisfiedDemandTm => "unsatisfied_demand_tm",
            KpiField::AvgDailyDemandTm => "avg_daily_demand_tm",
            KpiField::MaxDailyDemandTm => "max_daily_demand_tm",
            KpiField::MinDailyDemandTm => "min_daily_demand_tm",
            KpiField::TotalReceivedTm => "total_received_tm",
            KpiField::TotalDispatchedTm => "total_dispatched_tm",
            KpiField::DisruptionCount => "disruption_count",
            KpiField::BlockedDaysTotal => "blocked_days_total",
            KpiField::BlockedTimePct => "blocked_time_pct",
            KpiField::SimulatedDays => "simulated_days",
            KpiField::InitialInventoryTm => "initial_inventory_tm",
            KpiField::FinalInventoryTm => "final_inventory_tm",
        }
    }

    /// Read this column from a KPI vector as a real number.
    pub fn extract(self, kpis: &KpiVector) -> f64 {
        match self {
            KpiField::ServiceLevelPct => kpis.service_level_pct,
            KpiField::StockoutDays => kpis.stockout_days as f64,
            KpiField::StockoutProbabilityPct => kpis.stockout_probability_pct,
            KpiField::AvgInventoryTm => kpis.avg_inventory_tm,
            KpiField::MinInventoryTm => kpis.min_inventory_tm,
            KpiField::MaxInventoryTm => kpis.max_inventory_tm,
            KpiField::StdInventoryTm => kpis.std_inventory_tm,
            KpiField::AvgAutonomyDays => kpis.avg_autonomy_days,
            KpiField::MinAutonomyDays => kpis.min_autonomy_days,
            KpiField::TotalDemandTm => kpis.total_demand_tm,
            KpiField::SatisfiedDemandTm => kpis.satisfied_demand_tm,
            KpiField::UnsatisfiedDemandTm => kpis.unsatisfied_demand_tm,
            KpiField::AvgDailyDemandTm => kpis.avg_daily_demand_tm,
            KpiField::MaxDailyDemandTm => kpis.max_daily_demand_tm,
            KpiField::MinDailyDemandTm => kpis.min_daily_demand_tm,
            KpiField::TotalReceivedTm => kpis.total_received_tm,
            KpiField::TotalDispatchedTm => kpis.total_dispatched_tm,
            KpiField::DisruptionCount => kpis.disruption_count as f64,
            KpiField::BlockedDaysTotal => kpis.blocked_days_total as f64,
            KpiField::BlockedTimePct => kpis.blocked_time_pct,
            KpiField::SimulatedDays => kpis.simulated_days as f64,
            KpiField::InitialInventoryTm => kpis.initial_inventory_tm,
            KpiField::FinalInventoryTm => kpis.final_inventory_tm,
        }
    }
}

/// One persisted KPI row: the KPI vector of one replica plus its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRow {
    /// Scenario the replica belongs to.
    pub scenario_id: u64,
    /// Replica index within the scenario.
    pub replica_index: u64,
    /// The replica's KPI vector, flattened into the row.
    #[serde(flatten)]
    pub kpis: KpiVector,
}

impl KpiRow {
    /// Build a row from a finished replica.
    pub fn new(scenario_id: u64, replica_index: u64, kpis: KpiVector) -> Self {
        Self {
            scenario_id,
            replica_index,
            kpis,
        }
    }
}

/// One persisted full time series for a sampled replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// Scenario the replica belongs to.
    pub scenario_id: u64,
    /// Replica index within the scenario.
    pub replica_index: u64,
    /// The ordered per-day records, length = horizon_days.
    pub records: Vec<DailyRecord>,
}

/// Output of a single replica run: the reduced KPI vector plus the full
/// per-day series. The executor drops the series for non-sampled replicas.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaOutput {
    /// Reduced KPI vector.
    pub kpis: KpiVector,
    /// Full per-day series, length = horizon_days.
    pub series: Vec<DailyRecord>,
}

/// Completion status of a Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All requested replicas ran.
    Completed,
    /// The run was canceled; aggregates cover the completed subset.
    Partial,
}

/// Result of running all replicas of one scenario.
///
/// Rows are ordered by replica index regardless of completion order, so
/// downstream statistics are deterministic for a fixed
/// (scenario, base seed, replica count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario identity within the experiment.
    pub scenario_id: u64,
    /// Completion status.
    pub status: RunStatus,
    /// Replicas requested.
    pub n_requested: u64,
    /// Replicas that produced a KPI vector (including resumed ones).
    pub n_completed: u64,
    /// Replicas that aborted on a runtime invariant violation.
    pub n_failed: u64,
    /// KPI rows produced by this run, sorted by replica index.
    pub rows: Vec<KpiRow>,
    /// Full series retained for the deterministic sample of replicas.
    pub sampled_series: Vec<SeriesRow>,
}
