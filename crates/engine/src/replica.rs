//! The single-replica engine: the five-phase day loop.

use crate::demand::DemandModel;
use crate::disruption::DisruptionSchedule;
use crate::hub::Hub;
use crate::monitor::Monitor;
use crate::orders::OrderBook;
use crate::rng::ReplicaRng;
use crate::route::Route;
use lpgsim_types::{DailyRecord, EngineError, ReplicaOutput, Scenario};
use tracing::trace;

/// Run one replica of `scenario` with the given derived seed.
///
/// Pure and deterministic: the same `(scenario, replica_seed)` pair yields
/// bytewise-identical output on every run. The caller is responsible for
/// validating the scenario once at load time.
///
/// Day phases execute in the contractual order: arrivals, disruption update,
/// demand, reorder evaluation, monitoring. An invariant violation aborts the
/// replica with [`EngineError::InvariantViolation`].
pub fn run_replica(scenario: &Scenario, replica_seed: u64) -> Result<ReplicaOutput, EngineError> {
    debug_assert!(scenario.validate().is_ok());

    let mut rng = ReplicaRng::from_replica_seed(replica_seed);
    let mut hub = Hub::new(scenario.capacity_tm, scenario.initial_inventory_tm());
    let mut route = Route::new();
    let mut book = OrderBook::new(scenario.max_concurrent_orders);
    let demand_model = DemandModel::from_scenario(scenario);
    let mut disruptions = DisruptionSchedule::sample(scenario, rng.route());
    let mut monitor = Monitor::with_capacity(scenario.horizon_days);

    let initial_inventory_tm = hub.level();

    for day in 1..=scenario.horizon_days {
        // Phase 1: arrivals. Orders leave the book before their quantity is
        // deposited; deposits cap at capacity and drop the excess.
        let mut supply_received = 0.0;
        for order in book.pop_arrivals(day) {
            supply_received += hub.deposit(order.quantity_tm);
        }

        // Phase 2: disruption update. The route reverts first, then any
        // disruption arriving today activates. Every change to the unblock
        // day walks the whole order book and pushes covered arrivals past
        // the block.
        route.update(day);
        for event in disruptions.take_arrivals(day) {
            let unblock_day = route.block(day, event.duration_days);
            book.bump_arrivals(unblock_day);
        }
        if !route.is_operational() {
            route.note_blocked_day();
        }

        // Autonomy reads the stock available to cover demand from today on:
        // the post-arrival, pre-demand level at the constant base rate.
        let autonomy_days = hub.level() / scenario.demand_base_daily_tm;

        // Phase 3: demand.
        let demand = demand_model.sample(day, rng.demand());
        let demand_satisfied = hub.withdraw(demand);
        let stockout = demand_satisfied < demand;

        // Phase 4: reorder evaluation, on the post-demand level so a single
        // day never double-orders.
        if hub.level() <= scenario.reorder_point_tm
            && route.is_operational()
            && book
                .try_place(day, scenario.order_quantity_tm, scenario.nominal_lead_time_d)
                .is_some()
        {
            trace!(day, level = hub.level(), "reorder placed");
        }

        // Phase 5: monitoring.
        monitor.record(DailyRecord {
            day,
            inventory: hub.level(),
            demand,
            demand_satisfied,
            supply_received,
            stockout,
            route_blocked: !route.is_operational(),
            pending_orders: book.pending() as u32,
            autonomy_days,
        });

        if hub.level() < 0.0 || hub.level() > scenario.capacity_tm {
            return Err(EngineError::InvariantViolation {
                day,
                detail: format!(
                    "inventory {} outside [0, {}]",
                    hub.level(),
                    scenario.capacity_tm
                ),
            });
        }
        if book.pending() > scenario.max_concurrent_orders as usize {
            return Err(EngineError::InvariantViolation {
                day,
                detail: format!(
                    "{} open orders exceed cap {}",
                    book.pending(),
                    scenario.max_concurrent_orders
                ),
            });
        }
    }

    let kpis = monitor.reduce(scenario, &hub, &route, initial_inventory_tm)?;
    Ok(ReplicaOutput {
        kpis,
        series: monitor.into_records(),
    })
}
