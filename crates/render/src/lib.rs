//! Template rendering for Tally
//!
//! This crate provides:
//! - The `Renderer` seam used by the pipeline driver
//! - A minijinja-backed renderer with inventory and dictionary helpers

pub mod functions;
pub mod helpers;
pub mod template;

use async_trait::async_trait;
use tally_core::{Notification, Result};

pub use template::TemplateRenderer;

/// Turns one notification into the full artifact contents
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render the artifact for `notification`
    ///
    /// Either the whole output or an error; never partial output.
    async fn render(&self, notification: &Notification) -> Result<Vec<u8>>;
}
