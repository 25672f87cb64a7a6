//! Factorial experiment designs.
//!
//! The reference experiment crosses two hub capacities (the status-quo tank
//! farm and the proposed expansion) with three disruption duration profiles.
//! The layer is generic over the two categorical factors: any capacity and
//! profile lists form a valid design, and each cell becomes its own scenario
//! with derived policy parameters.

use crate::cancel::CancelToken;
use crate::error::ExecutorError;
use crate::runner::{run_scenario, RunOptions};
use crate::sink::MemorySink;
use lpgsim_types::{KpiRow, Scenario};
use tracing::info;

/// Status-quo hub capacity (tm).
pub const CAPACITY_STATUS_QUO: f64 = 431.0;
/// Proposed expanded hub capacity (tm).
pub const CAPACITY_PROPOSED: f64 = 681.0;

/// One level of the disruption-duration factor.
#[derive(Debug, Clone)]
pub struct DisruptionProfile {
    /// Level name, e.g. "Short".
    pub name: String,
    /// Triangular minimum (days).
    pub min_d: f64,
    /// Triangular mode (days).
    pub mode_d: f64,
    /// Triangular maximum (days).
    pub max_d: f64,
}

impl DisruptionProfile {
    /// Build a named profile.
    pub fn new(name: impl Into<String>, min_d: f64, mode_d: f64, max_d: f64) -> Self {
        Self {
            name: name.into(),
            min_d,
            mode_d,
            max_d,
        }
    }
}

/// The identity of one cell in a two-factor design.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey {
    /// Level of factor A (capacity).
    pub level_a: String,
    /// Level of factor B (disruption duration).
    pub level_b: String,
}

/// A full two-factor design: capacities x disruption profiles.
#[derive(Debug, Clone)]
pub struct FactorialDesign {
    /// Factor A levels: (name, capacity in tm).
    pub capacities: Vec<(String, f64)>,
    /// Factor B levels.
    pub disruption_profiles: Vec<DisruptionProfile>,
}

impl FactorialDesign {
    /// The reference 2x3 design: {SQ, P} x {Short, Medium, Long}.
    pub fn baseline() -> Self {
        Self {
            capacities: vec![
                ("SQ".to_string(), CAPACITY_STATUS_QUO),
                ("P".to_string(), CAPACITY_PROPOSED),
            ],
            disruption_profiles: vec![
                DisruptionProfile::new("Short", 3.0, 5.0, 7.0),
                DisruptionProfile::new("Medium", 3.0, 7.0, 14.0),
                DisruptionProfile::new("Long", 3.0, 10.5, 21.0),
            ],
        }
    }

    /// Expand the design into per-cell scenarios on top of `base`.
    ///
    /// Policy parameters scale with the cell's capacity: reorder point at
    /// 91 %, order quantity at 53 % and initial fill at 60 % of capacity.
    pub fn cell_scenarios(&self, base: &Scenario) -> Vec<(CellKey, Scenario)> {
        let mut cells = Vec::with_capacity(self.capacities.len() * self.disruption_profiles.len());
        for (cap_name, capacity) in &self.capacities {
            for profile in &self.disruption_profiles {
                let mut scenario = base.clone();
                scenario.capacity_tm = *capacity;
                scenario.reorder_point_tm = capacity * 0.91;
                scenario.order_quantity_tm = capacity * 0.53;
                scenario.initial_inventory_pct = 60.0;
                scenario.disruption_duration_min_d = profile.min_d;
                scenario.disruption_duration_mode_d = profile.mode_d;
                scenario.disruption_duration_max_d = profile.max_d;
                cells.push((
                    CellKey {
                        level_a: cap_name.clone(),
                        level_b: profile.name.clone(),
                    },
                    scenario,
                ));
            }
        }
        cells
    }
}

/// KPI tables for every cell of a factorial run.
#[derive(Debug, Clone)]
pub struct FactorialResult {
    /// Per-cell KPI rows, in design order.
    pub cells: Vec<(CellKey, Vec<KpiRow>)>,
    /// Replicas that failed across all cells.
    pub n_failed: u64,
}

/// Run every cell of the design with `replicas_per_cell` replicas.
///
/// Cells run sequentially (each cell parallelizes internally); each cell
/// gets a distinct scenario id so its replica seeds are independent of
/// every other cell's.
pub fn run_factorial(
    design: &FactorialDesign,
    base: &Scenario,
    replicas_per_cell: u64,
    max_workers: usize,
    cancel: CancelToken,
) -> Result<FactorialResult, ExecutorError> {
    let cells = design.cell_scenarios(base);
    info!(
        cells = cells.len(),
        replicas_per_cell, "Starting factorial experiment"
    );

    let mut results = Vec::with_capacity(cells.len());
    let mut n_failed = 0;
    for (cell_index, (key, scenario)) in cells.into_iter().enumerate() {
        let mut opts = RunOptions::new(replicas_per_cell, max_workers);
        opts.scenario_id = cell_index as u64 + 1;
        opts.series_sample = 0; // factorial analysis only needs KPI rows
        opts.cancel = cancel.clone();
        let sink = MemorySink::new();
        let result = run_scenario(&scenario, &opts, &sink)?;
        n_failed += result.n_failed;
        results.push((key, result.rows));
        if cancel.is_canceled() {
            break;
        }
    }
    Ok(FactorialResult {
        cells: results,
        n_failed,
    })
}
