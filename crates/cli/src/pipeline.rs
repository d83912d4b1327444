//! Pipeline driver
//!
//! Renders once at startup, then once per debounced notification, strictly
//! one at a time. Any failure ends the pipeline; the caller gets a single
//! error describing why.

use crate::output::Sink;
use tally_core::{DebouncePolicy, Notification, Result, TallyError};
use tally_render::Renderer;
use tally_watcher::{Debouncer, EventSource};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Renderer and output artifact, driven by render-now requests
pub struct Pipeline<R, S> {
    renderer: R,
    sink: S,
}

impl<R: Renderer, S: Sink> Pipeline<R, S> {
    pub fn new(renderer: R, sink: S) -> Self {
        Self { renderer, sink }
    }

    /// Render with the empty notification so the artifact exists before
    /// any event arrives
    pub async fn render_startup(&mut self) -> Result<()> {
        let bytes = self.renderer.render(&Notification::default()).await?;
        self.sink.replace(&bytes)?;
        info!("Generated on startup in {}", self.sink.describe());
        Ok(())
    }

    /// Render for one notification and replace the artifact
    ///
    /// A failed render leaves the previous artifact untouched.
    pub async fn regenerate(&mut self, notification: &Notification) -> Result<()> {
        let bytes = self.renderer.render(notification).await?;
        self.sink.replace(&bytes)?;
        info!(
            "Generated on {} in {}",
            notification.describe(),
            self.sink.describe()
        );
        Ok(())
    }

    /// Process render requests until the feed closes or a render fails
    pub async fn drive(mut self, mut renders: mpsc::Receiver<Notification>) -> Result<()> {
        while let Some(notification) = renders.recv().await {
            self.regenerate(&notification).await?;
        }
        debug!("Render feed closed");
        Ok(())
    }
}

/// Run the whole pipeline until something fatal happens
///
/// Order: startup render, subscribe, then debounce and render concurrently
/// while waiting on the source's termination signal. Never returns while the
/// pipeline is healthy.
pub async fn run<R, S>(
    mut pipeline: Pipeline<R, S>,
    source: &dyn EventSource,
    policy: DebouncePolicy,
) -> TallyError
where
    R: Renderer + 'static,
    S: Sink + 'static,
{
    if let Err(e) = pipeline.render_startup().await {
        return e;
    }

    let subscription = match source.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => return e,
    };

    let renders = Debouncer::new(policy).spawn(subscription.events);
    let mut driver = tokio::spawn(pipeline.drive(renders));
    let mut terminated = subscription.terminated;

    tokio::select! {
        result = &mut driver => match result {
            Ok(Err(e)) => e,
            Ok(Ok(())) => termination_reason(terminated.await),
            Err(e) => TallyError::Task(format!("render driver: {}", e)),
        },
        reason = &mut terminated => {
            // Sink writes are synchronous, so this cannot cut one short
            driver.abort();
            termination_reason(reason)
        }
    }
}

fn termination_reason(
    reason: std::result::Result<TallyError, tokio::sync::oneshot::error::RecvError>,
) -> TallyError {
    reason.unwrap_or_else(|_| TallyError::SourceTerminated("event source went away".to_string()))
}
