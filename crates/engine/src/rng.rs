//! Per-replica random streams.

use lpgsim_types::{domain_seed, StreamDomain};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The random streams owned by one replica.
///
/// Demand and route draws come from independent ChaCha8 streams derived from
/// the replica seed, so the two domains never perturb each other: adding a
/// disruption draw does not shift any demand sample.
///
/// Draw order is part of the reproducibility contract:
/// - the **route** stream is consumed entirely up front by
///   [`DisruptionSchedule::sample`](crate::DisruptionSchedule::sample),
///   alternating inter-arrival and duration draws;
/// - the **demand** stream is consumed one draw per simulated day.
pub struct ReplicaRng {
    demand: ChaCha8Rng,
    route: ChaCha8Rng,
}

impl ReplicaRng {
    /// Derive both streams from a replica seed.
    pub fn from_replica_seed(replica_seed: u64) -> Self {
        Self {
            demand: ChaCha8Rng::seed_from_u64(domain_seed(replica_seed, StreamDomain::Demand)),
            route: ChaCha8Rng::seed_from_u64(domain_seed(replica_seed, StreamDomain::Route)),
        }
    }

    /// Stream feeding the daily demand noise.
    pub fn demand(&mut self) -> &mut ChaCha8Rng {
        &mut self.demand
    }

    /// Stream feeding disruption inter-arrivals and durations.
    pub fn route(&mut self) -> &mut ChaCha8Rng {
        &mut self.route
    }
}
