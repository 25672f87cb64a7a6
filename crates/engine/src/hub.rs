//! Hub inventory state.

/// The single storage hub of the supply chain.
///
/// Every mutation preserves `0 <= level <= capacity`. Deposits are capped at
/// capacity and report the accepted amount; withdrawals report the amount
/// actually served. The hub also accumulates the lifetime totals the mass
/// balance check is defined over.
#[derive(Debug, Clone)]
pub struct Hub {
    inventory_tm: f64,
    capacity_tm: f64,
    total_received_tm: f64,
    total_dispatched_tm: f64,
}

impl Hub {
    /// Create a hub with the given capacity and starting inventory.
    pub fn new(capacity_tm: f64, initial_inventory_tm: f64) -> Self {
        debug_assert!(capacity_tm > 0.0);
        debug_assert!((0.0..=capacity_tm).contains(&initial_inventory_tm));
        Self {
            inventory_tm: initial_inventory_tm,
            capacity_tm,
            total_received_tm: 0.0,
            total_dispatched_tm: 0.0,
        }
    }

    /// Current inventory level (tm).
    pub fn level(&self) -> f64 {
        self.inventory_tm
    }

    /// Storage capacity (tm).
    pub fn capacity(&self) -> f64 {
        self.capacity_tm
    }

    /// Withdraw up to `amount`, returning what was actually served.
    pub fn withdraw(&mut self, amount: f64) -> f64 {
        let served = if self.inventory_tm >= amount {
            amount
        } else {
            self.inventory_tm
        };
        self.inventory_tm -= served;
        self.total_dispatched_tm += served;
        served
    }

    /// Deposit up to capacity, returning the accepted amount.
    ///
    /// Excess above capacity is dropped; only the accepted amount enters the
    /// received total, which keeps the mass balance exact.
    pub fn deposit(&mut self, amount: f64) -> f64 {
        let accepted = amount.min(self.capacity_tm - self.inventory_tm).max(0.0);
        // Rounding in `level + (capacity - level)` may land one ulp above
        // capacity; the level itself is clamped so the bound stays exact.
        self.inventory_tm = (self.inventory_tm + accepted).min(self.capacity_tm);
        self.total_received_tm += accepted;
        accepted
    }

    /// Lifetime total of accepted supply (tm).
    pub fn total_received(&self) -> f64 {
        self.total_received_tm
    }

    /// Lifetime total of served demand (tm).
    pub fn total_dispatched(&self) -> f64 {
        self.total_dispatched_tm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_is_bounded_by_level() {
        let mut hub = Hub::new(100.0, 30.0);
        assert_eq!(hub.withdraw(20.0), 20.0);
        assert_eq!(hub.level(), 10.0);
        assert_eq!(hub.withdraw(50.0), 10.0);
        assert_eq!(hub.level(), 0.0);
        assert_eq!(hub.withdraw(5.0), 0.0);
        assert_eq!(hub.total_dispatched(), 30.0);
    }

    #[test]
    fn test_deposit_caps_at_capacity() {
        let mut hub = Hub::new(100.0, 90.0);
        assert_eq!(hub.deposit(30.0), 10.0);
        assert_eq!(hub.level(), 100.0);
        assert_eq!(hub.deposit(5.0), 0.0);
        // Only the accepted tonnage counts as received.
        assert_eq!(hub.total_received(), 10.0);
    }

    #[test]
    fn test_level_stays_in_bounds() {
        let mut hub = Hub::new(50.0, 25.0);
        for i in 0..1_000 {
            if i % 3 == 0 {
                hub.deposit(7.3);
            } else {
                hub.withdraw(4.1);
            }
            assert!(hub.level() >= 0.0);
            assert!(hub.level() <= hub.capacity());
        }
    }
}
