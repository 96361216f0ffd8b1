use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Created,
    Updated,
    Deleted,
    Failed,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Created => "created",
            Topic::Updated => "updated",
            Topic::Deleted => "deleted",
            Topic::Failed => "failed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub topic: Topic,
    pub resource: String,
    pub message: String,
}

impl Notification {
    pub fn new(topic: Topic, resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic,
            resource: resource.into(),
            message: message.into(),
        }
    }
}

pub type SubscriptionId = u64;

type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    topic: Option<Topic>,
    callback: Callback,
}

struct BusInner {
    next_id: SubscriptionId,
    subscribers: Vec<Subscriber>,
    history: VecDeque<Notification>,
}

/// Success and failure notices for the current session.
///
/// Delivery is synchronous and best-effort: subscribers present at
/// publish time are called in subscription order. The last
/// `history_capacity` notifications are kept for diagnostics.
pub struct NotificationBus {
    capacity: usize,
    inner: Mutex<BusInner>,
}

impl NotificationBus {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            capacity: history_capacity,
            inner: Mutex::new(BusInner {
                next_id: 1,
                subscribers: Vec::new(),
                history: VecDeque::with_capacity(history_capacity),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, topic: Option<Topic>, callback: Callback) -> SubscriptionId {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            topic,
            callback,
        });
        id
    }

    /// Receive every notification.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.add(None, Arc::new(callback))
    }

    /// Receive notifications of one topic only.
    pub fn subscribe_to<F>(&self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.add(Some(topic), Arc::new(callback))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| s.id != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub fn publish(&self, notification: Notification) {
        let targets: Vec<Callback> = {
            let mut inner = self.lock();
            if self.capacity > 0 {
                if inner.history.len() == self.capacity {
                    inner.history.pop_front();
                }
                inner.history.push_back(notification.clone());
            }
            inner
                .subscribers
                .iter()
                .filter(|s| s.topic.is_none_or(|t| t == notification.topic))
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };
        debug!(
            "notification {} for {} to {} subscriber(s)",
            notification.topic,
            notification.resource,
            targets.len()
        );
        for callback in targets {
            callback(&notification);
        }
    }

    /// Most recent notifications, oldest first.
    pub fn history(&self) -> Vec<Notification> {
        self.lock().history.iter().cloned().collect()
    }

    /// Drop every subscriber and the history.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.subscribers.clear();
        inner.history.clear();
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(50)
    }
}
