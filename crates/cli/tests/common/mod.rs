//! Fake collaborators for pipeline integration tests

use async_trait::async_trait;
use cli_lib::Sink;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tally_core::{Notification, Result, TallyError};
use tally_render::Renderer;
use tally_watcher::{EventSource, Subscription, SubscriptionFeed};

/// In-memory artifact shared with the test body
#[derive(Clone, Default)]
pub struct SharedSink {
    contents: Arc<Mutex<Vec<u8>>>,
    replacements: Arc<Mutex<usize>>,
    writes: Arc<Mutex<usize>>,
    fail_on_write: Option<usize>,
}

impl SharedSink {
    /// Sink whose `nth` write (1-based) fails with an I/O error
    pub fn failing_on_write(nth: usize) -> Self {
        Self {
            fail_on_write: Some(nth),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.contents.lock()).into_owned()
    }

    pub fn replacements(&self) -> usize {
        *self.replacements.lock()
    }
}

impl Sink for SharedSink {
    fn truncate(&mut self) -> Result<()> {
        self.contents.lock().clear();
        Ok(())
    }

    fn write_from_start(&mut self, bytes: &[u8]) -> Result<()> {
        let attempt = {
            let mut writes = self.writes.lock();
            *writes += 1;
            *writes
        };
        if self.fail_on_write == Some(attempt) {
            return Err(TallyError::sink(
                "memory",
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }

        let mut contents = self.contents.lock();
        contents.clear();
        contents.extend_from_slice(bytes);
        *self.replacements.lock() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Renders "rendered:<kind>-<action>" and logs start/end of every render
#[derive(Clone, Default)]
pub struct ScriptedRenderer {
    log: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
    panic_on: Option<String>,
    delay: Duration,
}

impl ScriptedRenderer {
    /// Fail whenever the notification action equals `action`
    pub fn failing_on(action: &str) -> Self {
        Self {
            fail_on: Some(action.to_string()),
            ..Self::default()
        }
    }

    /// Panic whenever the notification action equals `action`
    pub fn panicking_on(action: &str) -> Self {
        Self {
            panic_on: Some(action.to_string()),
            ..Self::default()
        }
    }

    /// Take `delay` to render, yielding to the runtime meanwhile
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Labels of renders that completed
    pub fn rendered(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix("end ").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn render(&self, notification: &Notification) -> Result<Vec<u8>> {
        let label = notification.describe();
        self.log.lock().push(format!("start {}", label));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.panic_on.as_deref() == Some(notification.action.as_str()) {
            panic!("renderer blew up on {}", label);
        }

        if self.fail_on.as_deref() == Some(notification.action.as_str()) {
            self.log.lock().push(format!("fail {}", label));
            return Err(TallyError::Render(format!("cannot render {}", label)));
        }

        self.log.lock().push(format!("end {}", label));
        Ok(format!("rendered:{}", label).into_bytes())
    }
}

/// Hands out one prepared subscription and records what the artifact held
/// at the moment it was asked to subscribe
pub struct ScriptedSource {
    subscription: Mutex<Option<Subscription>>,
    sink: SharedSink,
    seen_at_subscribe: Mutex<Option<String>>,
    fail: bool,
}

impl ScriptedSource {
    pub fn new(sink: SharedSink) -> (Self, SubscriptionFeed) {
        let (feed, subscription) = Subscription::channel();
        let source = Self {
            subscription: Mutex::new(Some(subscription)),
            sink,
            seen_at_subscribe: Mutex::new(None),
            fail: false,
        };
        (source, feed)
    }

    /// A source whose subscribe call always fails
    pub fn failing(sink: SharedSink) -> Self {
        Self {
            subscription: Mutex::new(None),
            sink,
            seen_at_subscribe: Mutex::new(None),
            fail: true,
        }
    }

    /// Artifact contents when subscribe was called, `None` if never called
    pub fn seen_at_subscribe(&self) -> Option<String> {
        self.seen_at_subscribe.lock().clone()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn subscribe(&self) -> Result<Subscription> {
        *self.seen_at_subscribe.lock() = Some(self.sink.contents());

        if self.fail {
            return Err(TallyError::Source("daemon unreachable".to_string()));
        }
        self.subscription
            .lock()
            .take()
            .ok_or_else(|| TallyError::Source("already subscribed".to_string()))
    }
}

pub fn event(kind: &str, action: &str) -> Notification {
    Notification::new(kind, action)
}
