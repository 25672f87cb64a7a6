//! Deterministic discrete-event kernel for the LPG resilience simulator.
//!
//! One replica simulates a single hub served by a single supply route over
//! an integer-day horizon. Within each day the phases execute in a fixed,
//! contractual order:
//!
//! ```text
//! 1. Arrivals          in-transit orders due today deliver into the hub
//! 2. Disruption update route unblocks / new disruptions activate,
//!                      in-transit arrivals are pushed past the block
//! 3. Demand            daily demand is sampled and served from inventory
//! 4. Reorder           (Q, R) policy, capped open orders, route must be up
//! 5. Monitoring        one DailyRecord is appended
//! ```
//!
//! The kernel is share-nothing: all state belongs to the replica, the only
//! inputs are the immutable [`Scenario`](lpgsim_types::Scenario) and a
//! derived seed, and the only output is a [`ReplicaOutput`]. Given the same
//! seed it produces bytewise-identical results every run.

mod demand;
mod disruption;
mod hub;
mod monitor;
mod orders;
mod replica;
mod rng;
mod route;

pub use demand::DemandModel;
pub use disruption::{Disruption, DisruptionSchedule};
pub use hub::Hub;
pub use monitor::Monitor;
pub use orders::{Order, OrderBook};
pub use replica::run_replica;
pub use rng::ReplicaRng;
pub use route::Route;

pub use lpgsim_types::ReplicaOutput;
