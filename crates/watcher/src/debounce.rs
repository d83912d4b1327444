//! Notification debouncing
//!
//! Collapses bursts of notifications into single render requests. A batch
//! opens on the first notification after an emission and closes when either
//! the quiet period (reset by every notification) or the max wait (never
//! reset) runs out. Only the last notification of a batch is emitted.

use std::time::Duration;
use tally_core::{DebouncePolicy, Notification};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Used when a configured duration would overflow the clock
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Which deadline closed a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// No new notification for the quiet period
    Quiet,
    /// Batch stayed open for the max wait
    MaxWait,
}

/// Batch state with two nullable deadlines
///
/// Pure state machine: the caller supplies `now`, so timing behaviour can be
/// checked without a runtime.
#[derive(Debug)]
pub struct DebounceState {
    policy: DebouncePolicy,
    pending: Option<Notification>,
    quiet_deadline: Option<Instant>,
    max_deadline: Option<Instant>,
}

impl DebounceState {
    pub fn new(policy: DebouncePolicy) -> Self {
        Self {
            policy,
            pending: None,
            quiet_deadline: None,
            max_deadline: None,
        }
    }

    /// Absorb a notification into the current batch, opening one if needed
    pub fn absorb(&mut self, notification: Notification, now: Instant) {
        self.pending = Some(notification);
        self.quiet_deadline = Some(deadline_after(now, self.policy.quiet_period));
        if self.max_deadline.is_none() {
            self.max_deadline = Some(deadline_after(now, self.policy.max_wait));
        }
    }

    /// Earliest armed deadline, `None` when no batch is open
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.quiet_deadline, self.max_deadline) {
            (Some(q), Some(m)) => Some(q.min(m)),
            (q, m) => q.or(m),
        }
    }

    /// Close the batch if a deadline has passed, returning its last notification
    pub fn poll_expired(&mut self, now: Instant) -> Option<(Notification, Trigger)> {
        let trigger = match (self.quiet_deadline, self.max_deadline) {
            (_, Some(m)) if m <= now => Trigger::MaxWait,
            (Some(q), _) if q <= now => Trigger::Quiet,
            _ => return None,
        };

        // Both alarms go together; the next notification starts a fresh batch
        self.quiet_deadline = None;
        self.max_deadline = None;
        self.pending.take().map(|n| (n, trigger))
    }

    /// True while a batch is open
    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&Notification> {
        self.pending.as_ref()
    }
}

fn deadline_after(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Debouncing stage
///
/// Runs as its own task between the event feed and the pipeline driver.
pub struct Debouncer {
    policy: DebouncePolicy,
}

impl Debouncer {
    pub fn new(policy: DebouncePolicy) -> Self {
        Self { policy }
    }

    /// Spawn the debouncer and return the render-now feed
    ///
    /// The feed closes when `input` closes. A batch still open at that point
    /// is dropped, not flushed.
    pub fn spawn(self, input: mpsc::Receiver<Notification>) -> mpsc::Receiver<Notification> {
        let (output, renders) = mpsc::channel(1);
        tokio::spawn(self.run(input, output));
        renders
    }

    /// Run the debounce loop until the input closes or the consumer goes away
    pub async fn run(
        self,
        mut input: mpsc::Receiver<Notification>,
        output: mpsc::Sender<Notification>,
    ) {
        let mut state = DebounceState::new(self.policy);

        loop {
            let deadline = state.next_deadline();
            let alarm = sleep_until(deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                // Expired deadlines win over new input so a flooded feed
                // cannot push emissions past max wait.
                biased;

                _ = alarm, if deadline.is_some() => {
                    if let Some((notification, trigger)) = state.poll_expired(Instant::now()) {
                        debug!(
                            event = %notification.describe(),
                            ?trigger,
                            "Debounced batch ready"
                        );
                        if output.send(notification).await.is_err() {
                            debug!("Render feed closed, stopping debouncer");
                            return;
                        }
                    }
                }

                received = input.recv() => match received {
                    Some(notification) => state.absorb(notification, Instant::now()),
                    None => {
                        if let Some(pending) = state.pending() {
                            debug!(
                                event = %pending.describe(),
                                "Event feed closed, discarding pending notification"
                            );
                        }
                        return;
                    }
                },
            }
        }
    }
}
