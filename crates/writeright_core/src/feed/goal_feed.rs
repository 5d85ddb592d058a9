//! Per-user goal list observers.

use crate::model::goal::{Goal, UserId};
use log::debug;
use std::collections::BTreeMap;

/// Handle returned by [`GoalFeed::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Observer callback receiving the complete current list.
pub type GoalListObserver = Box<dyn Fn(&[Goal])>;

struct Subscriber {
    user_id: UserId,
    observer: GoalListObserver,
}

/// Observer registry keyed by subscription id.
#[derive(Default)]
pub struct GoalFeed {
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
    next_id: u64,
}

impl GoalFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` for changes to `user_id`'s goals.
    pub fn subscribe(&mut self, user_id: UserId, observer: GoalListObserver) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.insert(id, Subscriber { user_id, observer });
        debug!(
            "event=feed_subscribe module=feed status=ok subscription_id={} subscribers={}",
            id.0,
            self.subscribers.len()
        );
        id
    }

    /// Removes one subscription. Returns `false` when it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Number of subscriptions registered for one user.
    pub fn subscriber_count(&self, user_id: UserId) -> usize {
        self.subscribers
            .values()
            .filter(|subscriber| subscriber.user_id == user_id)
            .count()
    }

    /// Delivers `goals` to every observer registered for `user_id`.
    ///
    /// Returns the number of observers notified.
    pub fn publish(&self, user_id: UserId, goals: &[Goal]) -> usize {
        let mut delivered = 0;
        for subscriber in self.subscribers.values() {
            if subscriber.user_id != user_id {
                continue;
            }
            (subscriber.observer)(goals);
            delivered += 1;
        }
        debug!(
            "event=feed_publish module=feed status=ok goals={} delivered={delivered}",
            goals.len()
        );
        delivered
    }
}
