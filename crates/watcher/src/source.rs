//! Event source abstraction
//!
//! A source hands out a live notification feed plus a one-shot terminal
//! signal. The feed is a capacity-1 channel: ingestion waits on the
//! debouncer instead of queueing.

use async_trait::async_trait;
use tally_core::{Notification, Result, TallyError};
use tokio::sync::{mpsc, oneshot};

/// Producer of change notifications
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Start a live subscription
    async fn subscribe(&self) -> Result<Subscription>;
}

/// Consumer side of a subscription
pub struct Subscription {
    /// Ordered notification feed
    pub events: mpsc::Receiver<Notification>,
    /// Fires once when the stream ends or fails
    pub terminated: oneshot::Receiver<TallyError>,
}

/// Producer side of a subscription, owned by the ingestion task
pub struct SubscriptionFeed {
    events: mpsc::Sender<Notification>,
    terminated: oneshot::Sender<TallyError>,
}

impl Subscription {
    /// Create a connected feed/subscription pair
    pub fn channel() -> (SubscriptionFeed, Subscription) {
        let (events_tx, events_rx) = mpsc::channel(1);
        let (terminated_tx, terminated_rx) = oneshot::channel();

        (
            SubscriptionFeed {
                events: events_tx,
                terminated: terminated_tx,
            },
            Subscription {
                events: events_rx,
                terminated: terminated_rx,
            },
        )
    }
}

impl SubscriptionFeed {
    /// Forward one notification; false once the consumer is gone
    pub async fn publish(&self, notification: Notification) -> bool {
        self.events.send(notification).await.is_ok()
    }

    /// True once the subscriber dropped its feed
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// Report the end of the stream; consumes the feed
    pub fn terminate(self, reason: TallyError) {
        // Subscriber may already be gone, nothing left to tell
        let _ = self.terminated.send(reason);
    }
}
