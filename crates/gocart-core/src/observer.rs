//! Change notification.

use std::fmt;

use crate::snapshot::CartSnapshot;

/// Observer notified whenever the cart publishes a new snapshot.
///
/// Observers only ever receive fully-computed, invariant-preserving
/// snapshots, never partial or intermediate state. They are always called
/// outside the store's internal locks, so an observer may freely call back
/// into the store.
pub trait CartObserver: Send + Sync {
    /// Called after a new snapshot has been published.
    fn on_change(&self, snapshot: &CartSnapshot);
}

impl<F> CartObserver for F
where
    F: Fn(&CartSnapshot) + Send + Sync,
{
    fn on_change(&self, snapshot: &CartSnapshot) {
        self(snapshot)
    }
}

/// Handle identifying a registered observer, returned by
/// [`subscribe`](crate::CartStore::subscribe) and accepted by
/// [`unsubscribe`](crate::CartStore::unsubscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
