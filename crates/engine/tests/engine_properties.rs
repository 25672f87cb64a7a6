//! Property and boundary tests for the replica engine.
//!
//! These pin the public contracts: state invariants hold for every scenario
//! and seed, the per-day phase order is observable in the time series, and
//! the named boundary scenarios produce their exact expected KPIs.

use lpgsim_engine::run_replica;
use lpgsim_types::{derive_replica_seed, ReplicaOutput, Scenario};

/// Scenario variants exercised by the property tests.
fn property_scenarios() -> Vec<Scenario> {
    let mut variants = Vec::new();

    let baseline = Scenario::baseline();
    variants.push(baseline.clone());

    let mut no_disruptions = baseline.clone();
    no_disruptions.disruption_rate_per_year = 0.0;
    variants.push(no_disruptions);

    let mut harsh = baseline.clone();
    harsh.disruption_rate_per_year = 24.0;
    harsh.disruption_duration_max_d = 45.0;
    harsh.disruption_duration_mode_d = 20.0;
    variants.push(harsh);

    let mut tight = baseline.clone();
    tight.capacity_tm = 200.0;
    tight.reorder_point_tm = 180.0;
    tight.order_quantity_tm = 100.0;
    tight.initial_inventory_pct = 20.0;
    tight.max_concurrent_orders = 1;
    variants.push(tight);

    let mut noisy = baseline;
    noisy.demand_noise_sigma = 0.9;
    noisy.seasonality_enabled = false;
    variants.push(noisy);

    variants
}

#[test]
fn test_inventory_stays_within_bounds_for_all_seeds() {
    for scenario in property_scenarios() {
        for replica in 0..20 {
            let seed = derive_replica_seed(42, 0, replica);
            let out = run_replica(&scenario, seed).unwrap();
            for r in &out.series {
                assert!(
                    r.inventory >= 0.0 && r.inventory <= scenario.capacity_tm,
                    "inventory {} out of [0, {}] on day {}",
                    r.inventory,
                    scenario.capacity_tm,
                    r.day
                );
            }
        }
    }
}

#[test]
fn test_mass_balance_holds() {
    for scenario in property_scenarios() {
        for replica in 0..20 {
            let seed = derive_replica_seed(7, 1, replica);
            let k = run_replica(&scenario, seed).unwrap().kpis;
            let residual = k.initial_inventory_tm + k.total_received_tm
                - k.total_dispatched_tm
                - k.final_inventory_tm;
            assert!(
                residual.abs() <= 1e-6 * scenario.capacity_tm,
                "mass balance residual {residual}"
            );
        }
    }
}

#[test]
fn test_satisfied_demand_never_exceeds_demand_or_stock() {
    for scenario in property_scenarios() {
        let seed = derive_replica_seed(11, 2, 0);
        let out = run_replica(&scenario, seed).unwrap();
        for r in &out.series {
            assert!(r.demand_satisfied <= r.demand + 1e-12);
            // End-of-day inventory plus what was served cannot exceed the
            // pre-demand stock, which is itself capped by capacity.
            assert!(r.demand_satisfied + r.inventory <= scenario.capacity_tm + 1e-9);
            assert_eq!(r.stockout, r.demand_satisfied < r.demand);
        }
    }
}

#[test]
fn test_pending_orders_respect_cap() {
    for scenario in property_scenarios() {
        for replica in 0..10 {
            let seed = derive_replica_seed(3, 3, replica);
            let out = run_replica(&scenario, seed).unwrap();
            for r in &out.series {
                assert!(r.pending_orders <= scenario.max_concurrent_orders);
            }
        }
    }
}

#[test]
fn test_replica_output_is_bytewise_reproducible() {
    let scenario = Scenario::baseline();
    let seed = derive_replica_seed(42, 0, 17);
    let a = run_replica(&scenario, seed).unwrap();
    let b = run_replica(&scenario, seed).unwrap();

    let bytes_a = serde_json::to_vec(&a.kpis).unwrap();
    let bytes_b = serde_json::to_vec(&b.kpis).unwrap();
    assert_eq!(bytes_a, bytes_b);

    let series_a = serde_json::to_vec(&a.series).unwrap();
    let series_b = serde_json::to_vec(&b.series).unwrap();
    assert_eq!(series_a, series_b);
}

// ═══════════════════════════════════════════════════════════════════════
// Phase-order contract
// ═══════════════════════════════════════════════════════════════════════

/// Deterministic scenario with a hand-computed trace: arrivals before
/// demand, reorder on the post-demand level.
#[test]
fn test_phase_order_matches_hand_computed_trace() {
    let scenario = Scenario {
        capacity_tm: 100.0,
        reorder_point_tm: 45.0,
        order_quantity_tm: 40.0,
        initial_inventory_pct: 50.0,
        demand_base_daily_tm: 10.0,
        demand_noise_sigma: 0.0,
        seasonality_enabled: false,
        seasonality_amplitude: 0.0,
        seasonality_peak_day: 200,
        disruption_rate_per_year: 0.0,
        disruption_duration_min_d: 1.0,
        disruption_duration_mode_d: 1.0,
        disruption_duration_max_d: 1.0,
        nominal_lead_time_d: 2,
        horizon_days: 8,
        max_concurrent_orders: 2,
        seed: Some(1),
    };
    scenario.validate().unwrap();
    let out = run_replica(&scenario, 99).unwrap();
    let s = &out.series;

    // Day 1: pre-demand level 50 is above R = 45, post-demand 40 is not.
    // The order fires, proving reorder evaluates after the demand phase.
    assert_eq!(s[0].inventory, 40.0);
    assert_eq!(s[0].pending_orders, 1);

    // Day 2: second order (30 <= 45, one slot free).
    assert_eq!(s[1].inventory, 30.0);
    assert_eq!(s[1].pending_orders, 2);

    // Day 3: the day-1 order (lead 2) arrives BEFORE demand: 30 + 40 - 10.
    assert_eq!(s[2].supply_received, 40.0);
    assert_eq!(s[2].inventory, 60.0);
    assert_eq!(s[2].autonomy_days, 7.0); // post-arrival 70 over base 10
    assert_eq!(s[2].pending_orders, 1);

    // Day 4: second arrival tops to capacity exactly (60 + 40), then demand.
    assert_eq!(s[3].supply_received, 40.0);
    assert_eq!(s[3].inventory, 90.0);
    assert_eq!(s[3].pending_orders, 0);

    // Days 5-8: pure drawdown, level stays above R.
    for (i, expected) in [(4, 80.0), (5, 70.0), (6, 60.0), (7, 50.0)] {
        assert_eq!(s[i].inventory, expected);
        assert_eq!(s[i].pending_orders, 0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Boundary scenarios
// ═══════════════════════════════════════════════════════════════════════

/// Effectively infinite capacity and no disruptions: perfect service.
#[test]
fn test_boundary_infinite_capacity_no_disruptions() {
    let mut scenario = Scenario::baseline();
    scenario.capacity_tm = 1_000_000.0;
    scenario.reorder_point_tm = 1_000.0;
    scenario.order_quantity_tm = 1_000.0;
    scenario.initial_inventory_pct = 100.0;
    scenario.disruption_rate_per_year = 0.0;
    scenario.horizon_days = 365;
    scenario.validate().unwrap();

    let out = run_replica(&scenario, derive_replica_seed(42, 0, 0)).unwrap();
    assert_eq!(out.kpis.service_level_pct, 100.0);
    assert_eq!(out.kpis.stockout_days, 0);
    assert_eq!(out.kpis.disruption_count, 0);
    assert_eq!(out.kpis.blocked_days_total, 0);
}

/// Zero starting inventory and a block covering the whole horizon: total
/// stockout. The lead time exceeds the horizon so that even an order placed
/// before the block activates can never deliver.
#[test]
fn test_boundary_zero_inventory_permanent_block() {
    let mut scenario = Scenario::baseline();
    scenario.initial_inventory_pct = 0.0;
    scenario.demand_noise_sigma = 0.0;
    scenario.seasonality_enabled = false;
    scenario.disruption_rate_per_year = 3_650.0; // ~10 arrivals/day
    scenario.disruption_duration_min_d = 10.0;
    scenario.disruption_duration_mode_d = 10.0;
    scenario.disruption_duration_max_d = 10.0;
    scenario.horizon_days = 10;
    scenario.nominal_lead_time_d = 31;
    scenario.validate().unwrap();

    let out = run_replica(&scenario, derive_replica_seed(42, 0, 0)).unwrap();
    assert_eq!(out.kpis.service_level_pct, 0.0);
    assert_eq!(out.kpis.stockout_days, scenario.horizon_days);
    assert_eq!(out.kpis.satisfied_demand_tm, 0.0);
    assert!(out.kpis.disruption_count > 0);
}

/// Calibration baseline: a hub topped up daily holds its theoretical
/// autonomy of capacity / base demand ~= 10.4 days.
#[test]
fn test_boundary_calibration_autonomy() {
    let mut scenario = Scenario::baseline();
    scenario.capacity_tm = 431.0;
    scenario.reorder_point_tm = 394.0;
    scenario.order_quantity_tm = 230.0;
    scenario.initial_inventory_pct = 100.0;
    scenario.demand_base_daily_tm = 41.3;
    scenario.demand_noise_sigma = 0.15;
    scenario.seasonality_enabled = false;
    scenario.disruption_rate_per_year = 0.0;
    scenario.nominal_lead_time_d = 1;
    scenario.horizon_days = 365;
    scenario.validate().unwrap();

    let replicas = 100;
    let mean_autonomy: f64 = (0..replicas)
        .map(|i| {
            let seed = derive_replica_seed(42, 0, i);
            run_replica(&scenario, seed).unwrap().kpis.avg_autonomy_days
        })
        .sum::<f64>()
        / replicas as f64;

    assert!(
        (mean_autonomy - 10.4).abs() <= 0.5,
        "mean autonomy {mean_autonomy} outside 10.4 +/- 0.5"
    );
}

/// Aggressive reorder point with a long lead time saturates the order cap.
#[test]
fn test_boundary_reorder_cap_saturates() {
    let mut scenario = Scenario::baseline();
    scenario.reorder_point_tm = scenario.capacity_tm;
    scenario.nominal_lead_time_d = 10;
    scenario.disruption_rate_per_year = 0.0;
    scenario.max_concurrent_orders = 2;
    scenario.validate().unwrap();

    let out = run_replica(&scenario, derive_replica_seed(42, 0, 1)).unwrap();
    let max_pending = out.series.iter().map(|r| r.pending_orders).max().unwrap();
    assert_eq!(max_pending, 2);
}

/// A disruption activating while an order is in transit pushes its arrival
/// to the first day after the block.
#[test]
fn test_boundary_lead_time_extension() {
    let mut scenario = Scenario::baseline();
    scenario.capacity_tm = 400.0;
    scenario.reorder_point_tm = 380.0;
    scenario.order_quantity_tm = 200.0;
    scenario.initial_inventory_pct = 50.0;
    scenario.demand_base_daily_tm = 40.0;
    scenario.demand_noise_sigma = 0.0;
    scenario.seasonality_enabled = false;
    scenario.disruption_rate_per_year = 100.0;
    scenario.disruption_duration_min_d = 10.0;
    scenario.disruption_duration_mode_d = 10.0;
    scenario.disruption_duration_max_d = 10.0;
    scenario.nominal_lead_time_d = 6;
    scenario.horizon_days = 60;
    scenario.validate().unwrap();

    // Scan seeds for a replica whose first disruption lands on days 2..=6,
    // i.e. after the day-1 order is placed but before its day-7 arrival.
    let mut checked = false;
    for replica in 0..500 {
        let out = match run_replica(&scenario, derive_replica_seed(5, 0, replica)) {
            Ok(out) => out,
            Err(e) => panic!("replica failed: {e}"),
        };
        let s = &out.series;
        let Some(first_blocked) = s.iter().position(|r| r.route_blocked) else {
            continue;
        };
        let block_start_day = s[first_blocked].day;
        if !(2..=6).contains(&block_start_day) {
            continue;
        }
        if s[first_blocked - 1].pending_orders == 0 {
            continue;
        }

        // Last day of the first consecutive blocked run.
        let mut unblock_day = block_start_day;
        for r in &s[first_blocked..] {
            if r.route_blocked {
                unblock_day = r.day;
            } else {
                break;
            }
        }
        if unblock_day + 1 > scenario.horizon_days {
            continue;
        }

        // No delivery may land on a blocked day; the bumped order arrives
        // exactly on unblock_day + 1.
        for r in s.iter().filter(|r| r.day <= unblock_day) {
            assert_eq!(r.supply_received, 0.0, "delivery on day {}", r.day);
        }
        let after = &s[unblock_day as usize]; // day unblock_day + 1
        assert!(
            after.supply_received > 0.0,
            "bumped order did not arrive on day {}",
            unblock_day + 1
        );
        checked = true;
        break;
    }
    assert!(checked, "no seed produced the required disruption window");
}

/// Helper used by the remaining assertions: blocked days in the series
/// agree with the blocked-day KPI counters.
#[test]
fn test_blocked_day_counters_agree_with_series() {
    let mut scenario = Scenario::baseline();
    scenario.disruption_rate_per_year = 12.0;
    let out: ReplicaOutput = run_replica(&scenario, derive_replica_seed(9, 0, 4)).unwrap();
    let blocked_in_series = out.series.iter().filter(|r| r.route_blocked).count() as u32;
    assert_eq!(blocked_in_series, out.kpis.blocked_days_total);
    let stockouts_in_series = out.series.iter().filter(|r| r.stockout).count() as u32;
    assert_eq!(stockouts_in_series, out.kpis.stockout_days);
}
