//! Template renderer
//!
//! The template is parsed once at startup. Each render runs on a blocking
//! worker so inventory functions can wait on the runtime, and produces the
//! whole artifact in memory before anything is written.

use crate::functions::{self, InventoryBridge};
use crate::Renderer;
use async_trait::async_trait;
use minijinja::{AutoEscape, Environment, Value};
use std::path::Path;
use std::sync::Arc;
use tally_core::{Inventory, Notification, Result, TallyError};
use tokio::runtime::Handle;

/// Renders a single template file with the notification as context
pub struct TemplateRenderer {
    env: Arc<Environment<'static>>,
    name: String,
}

impl TemplateRenderer {
    /// Read and parse a template file
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(path: &Path, inventory: Arc<dyn Inventory>) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| TallyError::Template {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Referenced by its base name, like the file it came from
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_source(name, source, inventory)
    }

    /// Parse template source held in memory
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<String>,
        inventory: Arc<dyn Inventory>,
    ) -> Result<Self> {
        let name = name.into();
        let source: String = source.into();
        let runtime = Handle::try_current().map_err(|e| TallyError::Template {
            path: name.clone(),
            reason: format!("no async runtime: {}", e),
        })?;

        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        // Output is config text, never HTML
        env.set_auto_escape_callback(|_| AutoEscape::None);
        // General string/list/date helpers and Python-style methods
        minijinja_contrib::add_to_environment(&mut env);
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        functions::register(&mut env, InventoryBridge::new(inventory, runtime));

        env.add_template_owned(name.clone(), source)
            .map_err(|e| TallyError::Template {
                path: name.clone(),
                reason: format!("{:#}", e),
            })?;

        Ok(Self {
            env: Arc::new(env),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn render_with(env: &Environment<'static>, name: &str, notification: &Notification) -> Result<Vec<u8>> {
    let template = env
        .get_template(name)
        .map_err(|e| TallyError::Render(format!("{:#}", e)))?;

    template
        .render(Value::from_serialize(notification))
        .map(String::into_bytes)
        .map_err(|e| TallyError::Render(format!("{:#}", e)))
}

#[async_trait]
impl Renderer for TemplateRenderer {
    async fn render(&self, notification: &Notification) -> Result<Vec<u8>> {
        let env = Arc::clone(&self.env);
        let name = self.name.clone();
        let notification = notification.clone();

        tokio::task::spawn_blocking(move || render_with(&env, &name, &notification))
            .await
            .map_err(|e| TallyError::Render(format!("render task failed: {}", e)))?
    }
}
