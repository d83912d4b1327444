//! Live Docker event subscription

use async_trait::async_trait;
use bollard::models::EventMessage;
use bollard::system::EventsOptions;
use bollard::Docker;
use futures::StreamExt;
use std::collections::{BTreeMap, HashMap};
use tally_core::{Actor, Notification, Result, TallyError};
use tally_watcher::{EventSource, Subscription, SubscriptionFeed};
use tracing::{debug, warn};

/// `EventSource` backed by the daemon's event stream
pub struct DockerEvents {
    docker: Docker,
    filters: BTreeMap<String, Vec<String>>,
}

impl DockerEvents {
    pub fn new(docker: Docker, filters: BTreeMap<String, Vec<String>>) -> Self {
        Self { docker, filters }
    }

    fn options(&self) -> EventsOptions<String> {
        EventsOptions {
            filters: self
                .filters
                .iter()
                .map(|(key, values)| (key.clone(), values.clone()))
                .collect::<HashMap<_, _>>(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EventSource for DockerEvents {
    async fn subscribe(&self) -> Result<Subscription> {
        // The stream itself connects lazily; fail here if the daemon is down
        self.docker
            .ping()
            .await
            .map_err(|e| TallyError::Source(e.to_string()))?;

        debug!(filters = ?self.filters, "Subscribed to Docker events");

        let (feed, subscription) = Subscription::channel();
        tokio::spawn(ingest(self.docker.clone(), self.options(), feed));
        Ok(subscription)
    }
}

/// Forward decoded events until the stream ends or errors
async fn ingest(docker: Docker, options: EventsOptions<String>, feed: SubscriptionFeed) {
    let mut stream = Box::pin(docker.events(Some(options)));

    let reason = loop {
        match stream.next().await {
            Some(Ok(message)) => {
                if !feed.publish(notification_from(message)).await {
                    debug!("Event consumer gone, stopping ingestion");
                    return;
                }
            }
            Some(Err(e)) => break format!("event stream error: {}", e),
            None => break "event stream closed by daemon".to_string(),
        }
    };

    warn!("{}", reason);
    feed.terminate(TallyError::SourceTerminated(reason));
}

/// Convert a daemon event into the template-facing notification
pub fn notification_from(message: EventMessage) -> Notification {
    let actor = message.actor.unwrap_or_default();

    let mut notification = Notification {
        kind: message.typ.map(|t| t.to_string()).unwrap_or_default(),
        action: message.action.unwrap_or_default(),
        actor: Actor {
            id: actor.id.unwrap_or_default(),
            attributes: actor.attributes.unwrap_or_default().into_iter().collect(),
        },
        scope: message.scope.map(|s| s.to_string()).unwrap_or_default(),
        time: message.time.unwrap_or_default(),
        time_nano: message.time_nano.unwrap_or_default(),
        ..Notification::default()
    };
    notification.fill_legacy_fields();
    notification
}
