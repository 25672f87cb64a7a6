//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancel flag, polled by workers between replicas.
///
/// No replica is ever killed mid-run: a cancel observed while a replica is
/// executing lets that replica finish, and everything already streamed to
/// the sink stays valid.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, un-canceled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let peer = token.clone();
        assert!(!peer.is_canceled());
        token.cancel();
        assert!(peer.is_canceled());
    }
}
